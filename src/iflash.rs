use crate::signature::scan;

/// 8-byte magic opening every iFlash image record.
pub const IFLASH_SIGNATURE: &[u8] = b"$_IFLASH";

/// Fixed header length: signature, tag, and the two size fields.
pub const IFLASH_HEADER_LEN: usize = 24;

/// Size-field values that mark a false-positive signature match.
const SIZE_NAN: [u32; 2] = [0, 0xFFFF_FFFF];

/// Fixed 24-byte little-endian record at the start of an embedded image.
/// Both size fields count bytes from the end of the header; `total_size`
/// includes the padding that follows the image proper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IflashHeader {
    image_tag: [u8; 8],
    pub total_size: u32,
    pub image_size: u32,
}

impl IflashHeader {
    /// Materialize a header from the bytes at the start of `data`. Returns
    /// None when the slice is too short or does not open with the signature.
    pub fn parse(data: &[u8]) -> Option<IflashHeader> {
        if data.len() < IFLASH_HEADER_LEN || &data[..IFLASH_SIGNATURE.len()] != IFLASH_SIGNATURE {
            return None;
        }

        let mut image_tag = [0u8; 8];
        image_tag.copy_from_slice(&data[8..16]);

        let total_size = u32::from_le_bytes([data[16], data[17], data[18], data[19]]);
        let image_size = u32::from_le_bytes([data[20], data[21], data[22], data[23]]);

        Some(IflashHeader {
            image_tag,
            total_size,
            image_size,
        })
    }

    /// Image tag with the underscore padding removed. Non-ASCII bytes are
    /// dropped; vendor tags are plain ASCII identifiers.
    pub fn image_tag(&self) -> String {
        self.image_tag
            .iter()
            .filter(|b| b.is_ascii())
            .map(|&b| b as char)
            .collect::<String>()
            .trim_matches('_')
            .to_string()
    }

    /// Trailing padding after the image proper.
    pub fn padding_size(&self) -> u32 {
        self.total_size - self.image_size
    }

    fn is_valid(&self, offset: usize, buffer_len: usize) -> bool {
        !SIZE_NAN.contains(&self.total_size)
            && !SIZE_NAN.contains(&self.image_size)
            && self.total_size >= self.image_size
            && offset + IFLASH_HEADER_LEN + self.total_size as usize <= buffer_len
    }
}

/// Find every valid iFlash header in `buffer`, in scan order. The magic can
/// occur coincidentally in unrelated data, so signature matches whose header
/// fails validation are skipped silently rather than reported as errors.
pub fn detect(buffer: &[u8]) -> Vec<(usize, IflashHeader)> {
    let mut headers = Vec::new();

    for start in scan(buffer, IFLASH_SIGNATURE) {
        // Needs more than a bare header after the match to hold any image.
        if buffer.len() - start <= IFLASH_HEADER_LEN {
            continue;
        }

        let header = match IflashHeader::parse(&buffer[start..]) {
            Some(header) => header,
            None => continue,
        };

        if !header.is_valid(start, buffer.len()) {
            log::debug!("discarding iFlash signature match at 0x{start:X}");
            continue;
        }

        headers.push((start, header));
    }

    headers
}
