use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

pub fn validate_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("路徑不存在: {}", path.display());
    }
    if !path.is_dir() {
        bail!("路徑不是資料夾: {}", path.display());
    }
    Ok(())
}

pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("無法建立資料夾: {}", path.display()))?;
    }
    Ok(())
}

/// 寫入再刪除一個探測檔，確認資料夾可寫
pub fn validate_directory_writable(path: &Path) -> Result<()> {
    validate_directory_exists(path)?;
    let probe = path.join(".batch_video_remix_write_test");
    fs::write(&probe, b"")
        .with_context(|| format!("資料夾無法寫入: {}", path.display()))?;
    let _ = fs::remove_file(&probe);
    Ok(())
}
