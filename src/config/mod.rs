pub mod load;
pub mod save;
pub mod types;

pub use types::{
    Config, DEFAULT_CONCURRENCY, FileCategory, FileTypeTable, LastDirectories, RemixerSettings,
    ScheduleMode, UserSettings,
};
