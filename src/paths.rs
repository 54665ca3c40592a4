use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Characters that are illegal or reserved in file names on Windows.
const ILLEGAL_NAME_CHARS: &[char] = &['\\', '/', ':', '"', '*', '?', '<', '>', '|'];

/// Make `name` safe for use as a file name on any supported filesystem:
/// non-printable characters are escaped, then runs of illegal characters are
/// replaced with a single underscore.
pub fn safe_name(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_control() {
            escaped.extend(ch.escape_default());
        } else {
            escaped.push(ch);
        }
    }

    let mut safe = String::with_capacity(escaped.len());
    let mut in_illegal_run = false;
    for ch in escaped.chars() {
        if ILLEGAL_NAME_CHARS.contains(&ch) {
            if !in_illegal_run {
                safe.push('_');
            }
            in_illegal_run = true;
        } else {
            safe.push(ch);
            in_illegal_run = false;
        }
    }

    safe
}

/// Sibling directory a nested file is extracted into.
pub fn extract_folder(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push("_extracted");
    path.with_file_name(name)
}

/// Every regular file under `root`, recursively.
pub fn walk_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_files(root, &mut files)?;
    Ok(files)
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            collect_files(&entry.path(), files)?;
        } else if file_type.is_file() {
            files.push(entry.path());
        }
    }

    Ok(())
}

/// Recreate `dir` from scratch, discarding any previous contents.
pub fn reset_dir(dir: &Path) -> io::Result<()> {
    if dir.is_dir() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)
}
