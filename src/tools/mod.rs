mod cpu_monitor;
mod ffmpeg_process;
mod file_scanner;
mod path_validator;

pub use cpu_monitor::CpuMonitor;
pub use ffmpeg_process::{ffmpeg_available, ffmpeg_command};
pub use file_scanner::list_files;
pub use path_validator::{
    ensure_directory_exists, validate_directory_exists, validate_directory_writable,
};
