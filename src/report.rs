use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::paths::walk_files;

/// One file recovered by an extraction run.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedFile {
    /// Path relative to the extraction root.
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub size_display: String,
}

/// Everything an extraction run left under its output directory, nested
/// results included.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    pub extract_path: PathBuf,
    pub files: Vec<ExtractedFile>,
}

impl ExtractionReport {
    pub fn collect(extract_path: &Path) -> io::Result<ExtractionReport> {
        let mut files = Vec::new();

        if extract_path.is_dir() {
            for path in walk_files(extract_path)? {
                let size = fs::metadata(&path)?.len();
                let name = path
                    .strip_prefix(extract_path)
                    .unwrap_or(&path)
                    .display()
                    .to_string();

                files.push(ExtractedFile {
                    name,
                    size_display: format_file_size(size),
                    size,
                    path,
                });
            }
        }

        Ok(ExtractionReport {
            extract_path: extract_path.to_path_buf(),
            files,
        })
    }
}

/// Human-readable file size, one decimal place past the KB boundary.
pub fn format_file_size(size: u64) -> String {
    if size < 1024 {
        format!("{size} B")
    } else if size < 1024 * 1024 {
        format!("{:.1} KB", size as f64 / 1024.0)
    } else {
        format!("{:.1} MB", size as f64 / (1024.0 * 1024.0))
    }
}
