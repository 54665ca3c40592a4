use std::path::Path;
use std::process::{Command, Stdio};

use thiserror::Error;

/// Exit statuses accepted from the archive tool: 0 is success, 1 is
/// completed with warnings (e.g. a few locked or odd members).
const ACCEPTED_STATUSES: [i32; 2] = [0, 1];

#[derive(Debug, Error)]
pub enum DecompressError {
    #[error("failed to run decompression tool: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("decompression tool exited with status {0:?}")]
    Failed(Option<i32>),

    #[error("archive failed verification with status {0:?}")]
    VerifyFailed(Option<i32>),

    #[error("output directory missing after decompression")]
    MissingOutput,
}

/// Decompression collaborator: turns an archive file into extracted files
/// under an output directory. The extraction core only ever talks to this
/// trait, so it can be driven without any external program present.
pub trait Decompress {
    /// Whether this collaborator can handle the archive at all.
    fn supports(&self, archive: &Path, password: Option<&str>) -> bool;

    /// Extract every member of `archive` into `out_dir`, creating the
    /// directory as needed. With `strict` set, the archive (and password)
    /// are verified before any member is written.
    fn decompress(
        &self,
        archive: &Path,
        out_dir: &Path,
        password: Option<&str>,
        strict: bool,
    ) -> Result<(), DecompressError>;
}

/// 7-Zip command-line implementation of [`Decompress`].
pub struct SevenZip {
    executable: String,
}

impl SevenZip {
    pub fn new() -> SevenZip {
        let executable = if cfg!(windows) { "7z.exe" } else { "7z" };
        SevenZip {
            executable: executable.to_string(),
        }
    }

    pub fn with_executable(executable: impl Into<String>) -> SevenZip {
        SevenZip {
            executable: executable.into(),
        }
    }

    fn command(&self, operation: &str, password: Option<&str>) -> Command {
        let mut command = Command::new(&self.executable);
        command.arg(operation).arg("-y");
        if let Some(password) = password {
            command.arg(format!("-p{password}"));
        }
        command.stdout(Stdio::null()).stderr(Stdio::null());
        command
    }
}

impl Default for SevenZip {
    fn default() -> SevenZip {
        SevenZip::new()
    }
}

fn accepted(code: Option<i32>) -> bool {
    code.is_some_and(|code| ACCEPTED_STATUSES.contains(&code))
}

impl Decompress for SevenZip {
    fn supports(&self, _archive: &Path, _password: Option<&str>) -> bool {
        // 7-Zip sniffs the archive format itself; unsupported input surfaces
        // as a failed extraction instead.
        true
    }

    fn decompress(
        &self,
        archive: &Path,
        out_dir: &Path,
        password: Option<&str>,
        strict: bool,
    ) -> Result<(), DecompressError> {
        if strict {
            let mut test = self.command("t", password);
            test.arg(archive);
            log::debug!("verifying archive: {test:?}");
            let status = test.status()?;
            if !accepted(status.code()) {
                return Err(DecompressError::VerifyFailed(status.code()));
            }
        }

        let mut extract = self.command("x", password);
        extract.arg(format!("-o{}", out_dir.display())).arg(archive);
        log::debug!("extracting archive: {extract:?}");

        let status = extract.status()?;
        if !accepted(status.code()) {
            return Err(DecompressError::Failed(status.code()));
        }

        if !out_dir.is_dir() {
            return Err(DecompressError::MissingOutput);
        }

        Ok(())
    }
}
