use crate::config::{FileCategory, FileTypeTable};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 列出資料夾第一層中符合分類副檔名的檔案，依檔名排序
pub fn list_files(
    directory: &Path,
    file_type_table: &FileTypeTable,
    category: FileCategory,
) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = entry.with_context(|| format!("無法讀取資料夾: {}", directory.display()))?;
        if entry.file_type().is_file() && file_type_table.matches(entry.path(), category) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}
