use crate::signature::{find, scan};

/// Install-section terminator emitted by the iFdPacker SFX stub.
pub const INSTALL_END_MARKER: &[u8] = b"\x0D\x0A;!@InstallEnd@!\x0D\x0A";

/// First five bytes of a 7-Zip archive.
pub const SFX_7Z_SIGNATURE: &[u8] = b"7z\xBC\xAF\x27";

/// The same five bytes after the stub's byte-wise obfuscation.
pub const SFX_OBFUSCATED_SIGNATURE: &[u8] = &[0x6E, 0xF4, 0x79, 0x5F, 0x4E];

/// Fixed vendor password for iFdPacker SFX archives.
pub const SFX_PASSWORD: &str = "Y`t~i!L@i#t$U%h^s7A*l(f)E-d=y+S_n?i";

/// Boundary of an iFdPacker SFX archive located inside a larger buffer.
/// The archive signature sits directly after the install-end marker, so the
/// payload begins at the signature and runs to the end of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SfxBoundary {
    /// Offset of the install-end marker.
    pub marker_start: usize,
    /// Offset of the archive payload (the 5-byte signature itself).
    pub payload_start: usize,
}

/// Search for the install-end marker followed by a plain or obfuscated 7-Zip
/// signature. Marker bytes followed by anything else are coincidental and are
/// skipped; None means the buffer carries no SFX archive, a normal outcome.
pub fn locate(buffer: &[u8]) -> Option<SfxBoundary> {
    for marker_start in scan(buffer, INSTALL_END_MARKER) {
        let payload_start = marker_start + INSTALL_END_MARKER.len();

        let signature = match buffer.get(payload_start..payload_start + SFX_7Z_SIGNATURE.len()) {
            Some(signature) => signature,
            None => continue,
        };

        if signature == SFX_7Z_SIGNATURE || signature == SFX_OBFUSCATED_SIGNATURE {
            return Some(SfxBoundary {
                marker_start,
                payload_start,
            });
        }
    }

    None
}

/// Carve the archive payload: every byte from the signature to buffer end.
pub fn payload(buffer: &[u8], boundary: SfxBoundary) -> Vec<u8> {
    buffer[boundary.payload_start..].to_vec()
}

/// Whether a carved payload opens with the obfuscated signature and needs
/// decoding before it can be handed to a decompressor.
pub fn is_obfuscated(payload: &[u8]) -> bool {
    payload.get(..SFX_OBFUSCATED_SIGNATURE.len()) == Some(SFX_OBFUSCATED_SIGNATURE)
}

/// Undo the stub's obfuscation in place. Each stored byte is the original
/// rotated left by one bit (`b/2 + 128*(b%2)` recovers it), applied to the
/// entire payload, not just the signature.
pub fn deobfuscate(payload: &mut [u8]) {
    for byte in payload.iter_mut() {
        *byte = byte.rotate_right(1);
    }
}

/// Some vendors leave the SFX password embedded as a visible UTF-16 string
/// ahead of the install marker. Purely diagnostic; the password is passed to
/// the decompressor whether or not it is found here.
pub fn embedded_password(buffer: &[u8], boundary: SfxBoundary) -> bool {
    let needle: Vec<u8> = SFX_PASSWORD.encode_utf16().flat_map(u16::to_le_bytes).collect();
    find(&buffer[..boundary.marker_start], &needle).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_sfx_buffer(prefix: &[u8], signature: &[u8], archive_body: &[u8]) -> Vec<u8> {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(prefix);
        buffer.extend_from_slice(INSTALL_END_MARKER);
        buffer.extend_from_slice(signature);
        buffer.extend_from_slice(archive_body);
        buffer
    }

    #[test]
    fn test_locate_plain_signature() {
        let buffer = build_sfx_buffer(b"sfx stub code", SFX_7Z_SIGNATURE, b"archive data");

        let boundary = locate(&buffer).unwrap();
        assert_eq!(boundary.marker_start, 13);
        assert_eq!(boundary.payload_start, 13 + INSTALL_END_MARKER.len());
    }

    #[test]
    fn test_locate_obfuscated_signature() {
        let buffer = build_sfx_buffer(b"stub", SFX_OBFUSCATED_SIGNATURE, b"data");
        assert!(locate(&buffer).is_some());
    }

    #[test]
    fn test_locate_absent() {
        assert_eq!(locate(b"no marker anywhere in here"), None);
        assert_eq!(locate(b""), None);
    }

    #[test]
    fn test_locate_marker_without_archive_signature() {
        let buffer = build_sfx_buffer(b"", b"PLAIN", b"not an archive");
        assert_eq!(locate(&buffer), None);
    }

    #[test]
    fn test_locate_marker_at_buffer_tail() {
        // Marker present but no room for a signature after it.
        let mut buffer = b"stub".to_vec();
        buffer.extend_from_slice(INSTALL_END_MARKER);
        assert_eq!(locate(&buffer), None);
    }

    #[test]
    fn test_locate_skips_false_marker() {
        // First marker is followed by junk, second by a real signature.
        let mut buffer = build_sfx_buffer(b"", b"JUNK!", b"filler");
        let real_marker = buffer.len();
        buffer.extend_from_slice(INSTALL_END_MARKER);
        buffer.extend_from_slice(SFX_7Z_SIGNATURE);
        buffer.extend_from_slice(b"payload");

        let boundary = locate(&buffer).unwrap();
        assert_eq!(boundary.marker_start, real_marker);
    }

    #[test]
    fn test_payload_includes_signature() {
        let buffer = build_sfx_buffer(b"stub", SFX_7Z_SIGNATURE, b"rest");
        let boundary = locate(&buffer).unwrap();

        let payload = payload(&buffer, boundary);
        assert!(payload.starts_with(SFX_7Z_SIGNATURE));
        assert!(payload.ends_with(b"rest"));
        assert_eq!(payload.len(), SFX_7Z_SIGNATURE.len() + 4);
    }

    #[test]
    fn test_deobfuscate_recovers_7z_signature() {
        let mut bytes = SFX_OBFUSCATED_SIGNATURE.to_vec();
        deobfuscate(&mut bytes);
        assert_eq!(bytes, SFX_7Z_SIGNATURE);
    }

    #[test]
    fn test_deobfuscate_matches_halving_transform() {
        let mut bytes: Vec<u8> = (0..=255).collect();
        deobfuscate(&mut bytes);

        for (original, decoded) in (0..=255u8).zip(bytes) {
            let expected = original / 2 + if original % 2 == 1 { 128 } else { 0 };
            assert_eq!(decoded, expected);
        }
    }

    #[test]
    fn test_deobfuscate_is_not_idempotent() {
        // The transform is one-directional; applying it twice must not give
        // back the single-pass result.
        let mut once = SFX_OBFUSCATED_SIGNATURE.to_vec();
        deobfuscate(&mut once);
        let mut twice = once.clone();
        deobfuscate(&mut twice);
        assert_ne!(once, twice);
    }

    #[test]
    fn test_is_obfuscated_gates_on_leading_signature() {
        assert!(is_obfuscated(SFX_OBFUSCATED_SIGNATURE));
        assert!(!is_obfuscated(SFX_7Z_SIGNATURE));
        assert!(!is_obfuscated(b"random data"));
        assert!(!is_obfuscated(b""));
    }

    #[test]
    fn test_embedded_password_detected() {
        let password_utf16: Vec<u8> = SFX_PASSWORD.encode_utf16().flat_map(u16::to_le_bytes).collect();
        let mut prefix = b"stub ".to_vec();
        prefix.extend_from_slice(&password_utf16);
        prefix.extend_from_slice(b" more stub");
        let buffer = build_sfx_buffer(&prefix, SFX_7Z_SIGNATURE, b"archive");

        let boundary = locate(&buffer).unwrap();
        assert!(embedded_password(&buffer, boundary));
    }

    #[test]
    fn test_embedded_password_absent() {
        let buffer = build_sfx_buffer(b"plain stub", SFX_7Z_SIGNATURE, b"archive");
        let boundary = locate(&buffer).unwrap();
        assert!(!embedded_password(&buffer, boundary));
    }

    #[test]
    fn test_embedded_password_after_marker_is_ignored() {
        // Only the region before the marker is searched.
        let password_utf16: Vec<u8> = SFX_PASSWORD.encode_utf16().flat_map(u16::to_le_bytes).collect();
        let mut body = b"archive ".to_vec();
        body.extend_from_slice(&password_utf16);
        let buffer = build_sfx_buffer(b"stub", SFX_7Z_SIGNATURE, &body);

        let boundary = locate(&buffer).unwrap();
        assert!(!embedded_password(&buffer, boundary));
    }
}
