use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use crate::display::{print_header, printer};
use crate::ifdpacker::{self, SFX_PASSWORD};
use crate::iflash::{self, IFLASH_HEADER_LEN};
use crate::image_tags;
use crate::paths::{extract_folder, reset_dir, safe_name, walk_files};
use crate::sevenzip::Decompress;

/// The format a sub-parser looks for is absent. Not an error; the caller
/// decides whether "nothing matched" matters.
pub const EXIT_NOT_APPLICABLE: u32 = 127;

/// The decompression collaborator reported failure.
pub const EXIT_DECOMPRESS_FAILED: u32 = 125;

/// The collaborator does not support the carved archive.
pub const EXIT_UNSUPPORTED_ARCHIVE: u32 = 126;

/// Directory the SFX archive is unpacked into, under the extraction root.
const SFX_DIR_NAME: &str = "Insyde iFdPacker SFX";

/// Temporary archive written before handing off to the collaborator.
const SFX_ARCHIVE_NAME: &str = "Insyde_iFdPacker_SFX.7z";

/// Whether `buffer` holds either supported format.
pub fn check_format(buffer: &[u8]) -> bool {
    !iflash::detect(buffer).is_empty() || ifdpacker::locate(buffer).is_some()
}

fn sub_parser_ok(code: u32) -> bool {
    code == 0 || code == EXIT_NOT_APPLICABLE
}

/// Extraction orchestrator for Insyde iFlash / iFdPacker update images.
///
/// Both formats are tried independently against the same buffer; a
/// multi-image container can itself carry a trailing SFX archive. Every file
/// the archive yields is fed back through the orchestrator, so nested
/// containers unwrap into sibling `<file>_extracted` directories.
pub struct Extractor<D> {
    decompressor: D,
    max_depth: usize,
}

impl<D: Decompress> Extractor<D> {
    /// Real update images nest two or three levels; anything deeper is
    /// treated as pathological and skipped.
    pub const DEFAULT_MAX_DEPTH: usize = 8;

    pub fn new(decompressor: D) -> Extractor<D> {
        Extractor {
            decompressor,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(decompressor: D, max_depth: usize) -> Extractor<D> {
        Extractor {
            decompressor,
            max_depth,
        }
    }

    /// Run both extractions against `buffer`, writing results under
    /// `extract_path`. Absence of a format never fails the run; a buffer
    /// matching neither format succeeds trivially (callers that care should
    /// consult [`check_format`] first).
    pub fn process(&self, buffer: &[u8], extract_path: &Path) -> io::Result<bool> {
        self.process_nested(buffer, extract_path, 0, 0)
    }

    fn process_nested(
        &self,
        buffer: &[u8],
        extract_path: &Path,
        padding: usize,
        depth: usize,
    ) -> io::Result<bool> {
        let iflash_code = self.extract_iflash(buffer, extract_path, padding)?;

        let sfx_path = extract_path.join(SFX_DIR_NAME);
        let packer_code = self.extract_packer(buffer, &sfx_path, padding, depth)?;

        Ok(sub_parser_ok(iflash_code) && sub_parser_ok(packer_code))
    }

    /// Extract every embedded iFlash image into `extract_path`. Purely
    /// additive: the directory is created if missing and never cleared.
    /// Returns the number of images that failed, or `EXIT_NOT_APPLICABLE`.
    fn extract_iflash(&self, buffer: &[u8], extract_path: &Path, padding: usize) -> io::Result<u32> {
        let headers = iflash::detect(buffer);

        if headers.is_empty() {
            return Ok(EXIT_NOT_APPLICABLE);
        }

        printer("Detected Insyde iFlash Update image!", padding);
        fs::create_dir_all(extract_path)?;

        let mut failures = 0u32;

        for (offset, header) in headers {
            let img_bgn = offset + IFLASH_HEADER_LEN;
            let img_end = img_bgn + header.image_size as usize;
            let image = &buffer[img_bgn..img_end.min(buffer.len())];

            if image.len() != header.image_size as usize {
                log::warn!(
                    "iFlash image at 0x{img_bgn:X} truncated: {} of {} bytes",
                    image.len(),
                    header.image_size
                );
                failures += 1;
            }

            let tag = header.image_tag();
            let known = image_tags::lookup(&tag);
            let (display, ext) = known.unwrap_or((tag.as_str(), "bin"));

            let image_name = format!("{display} [0x{img_bgn:08X}-0x{img_end:08X}]");
            printer(&image_name, padding + 4);
            println!();

            print_header(&header, padding + 8);

            if known.is_none() {
                printer(&format!("Note: Detected new Insyde iFlash tag {display}!"), padding + 12);
            }

            let out_path = extract_path.join(safe_name(&format!("{image_name}.{ext}")));
            let mut out_file = File::create(&out_path)?;
            out_file.write_all(image)?;

            printer(&format!("Successful Insyde iFlash > {display} extraction!"), padding + 12);
        }

        Ok(failures)
    }

    /// Carve the trailing SFX archive into `extract_path`, hand it to the
    /// decompression collaborator, and re-process everything it yields.
    /// The directory is recreated from scratch so reruns are reproducible.
    fn extract_packer(
        &self,
        buffer: &[u8],
        extract_path: &Path,
        padding: usize,
        depth: usize,
    ) -> io::Result<u32> {
        let boundary = match ifdpacker::locate(buffer) {
            Some(boundary) => boundary,
            None => return Ok(EXIT_NOT_APPLICABLE),
        };

        printer("Detected Insyde iFdPacker Update image!", padding);
        reset_dir(extract_path)?;

        let mut payload = ifdpacker::payload(buffer, boundary);

        if ifdpacker::is_obfuscated(&payload) {
            printer("Detected Insyde iFdPacker > 7-Zip SFX > Obfuscation!", padding + 4);
            ifdpacker::deobfuscate(&mut payload);
            printer("Removed Insyde iFdPacker > 7-Zip SFX > Obfuscation!", padding + 8);
        }

        printer("Extracting Insyde iFdPacker > 7-Zip SFX archive...", padding + 4);

        if ifdpacker::embedded_password(buffer, boundary) {
            printer("Detected Insyde iFdPacker > 7-Zip SFX > Password!", padding + 8);
            printer(SFX_PASSWORD, padding + 12);
        }

        let archive_path = extract_path.join(SFX_ARCHIVE_NAME);
        fs::write(&archive_path, &payload)?;

        if !self.decompressor.supports(&archive_path, Some(SFX_PASSWORD)) {
            return Ok(EXIT_UNSUPPORTED_ARCHIVE);
        }

        match self
            .decompressor
            .decompress(&archive_path, extract_path, Some(SFX_PASSWORD), true)
        {
            Ok(()) => {
                printer("Successful Insyde iFdPacker > 7-Zip SFX decompression!", padding + 8);
                fs::remove_file(&archive_path)?;
            }
            Err(err) => {
                // The archive stays behind for inspection.
                log::error!("iFdPacker SFX decompression failed: {err}");
                return Ok(EXIT_DECOMPRESS_FAILED);
            }
        }

        let mut failures = 0u32;

        for file in walk_files(extract_path)? {
            let data = match fs::read(&file) {
                Ok(data) => data,
                Err(err) => {
                    log::debug!("skipping unreadable file {}: {err}", file.display());
                    continue;
                }
            };

            if !check_format(&data) {
                continue;
            }

            if depth + 1 > self.max_depth {
                log::warn!("nesting limit reached, not descending into {}", file.display());
                continue;
            }

            let name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            printer(&name, padding + 12);

            let nested_ok = self.process_nested(&data, &extract_folder(&file), padding + 16, depth + 1)?;
            if !nested_ok {
                failures += 1;
            }
        }

        Ok(failures)
    }
}
