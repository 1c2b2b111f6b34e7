use std::process::{Command, Stdio};

#[cfg(unix)]
use std::os::unix::process::CommandExt;
#[cfg(windows)]
use std::os::windows::process::CommandExt;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// 建立 ffmpeg 子程序，不繼承 stdin，Windows 上不開新的主控台視窗
///
/// unix 上子程序放在獨立的 process group，終端機的 Ctrl-C 只會送到本程式，
/// 由中斷旗標統一終止子程序並清理輸出
#[must_use]
pub fn ffmpeg_command(program: &str) -> Command {
    let mut cmd = Command::new(program);
    cmd.stdin(Stdio::null());
    #[cfg(unix)]
    cmd.process_group(0);
    #[cfg(windows)]
    cmd.creation_flags(CREATE_NO_WINDOW);
    cmd
}

/// 確認 ffmpeg 可以被執行
pub fn ffmpeg_available(program: &str) -> bool {
    ffmpeg_command(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}
