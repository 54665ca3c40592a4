/// Known Insyde iFlash image tags mapped to display name and extension.
const KNOWN_TAGS: [(&str, &str, &str); 12] = [
    ("BIOSCER", "Certificate", "bin"),
    ("BIOSCR2", "Certificate 2nd", "bin"),
    ("BIOSIMG", "BIOS-UEFI", "bin"),
    ("DRV_IMG", "isflash", "efi"),
    ("EC_IMG", "Embedded Controller", "bin"),
    ("INI_IMG", "platform", "ini"),
    ("IOM_IMG", "IO Manageability", "bin"),
    ("ISH_IMG", "Integrated Sensor Hub", "bin"),
    ("ME_IMG", "Management Engine", "bin"),
    ("OEM_ID", "OEM Identifier", "bin"),
    ("PDT_IMG", "Platform Descriptor Table", "bin"),
    ("TBT_IMG", "Integrated Thunderbolt", "bin"),
];

/// Resolve an image tag to its display name and file extension. Unknown tags
/// are a normal occurrence (new vendor components appear regularly); callers
/// fall back to the tag text itself with a `bin` extension.
pub fn lookup(tag: &str) -> Option<(&'static str, &'static str)> {
    KNOWN_TAGS
        .iter()
        .find(|(known, _, _)| *known == tag)
        .map(|(_, name, ext)| (*name, *ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_bios_image() {
        assert_eq!(lookup("BIOSIMG"), Some(("BIOS-UEFI", "bin")));
    }

    #[test]
    fn test_lookup_driver_image_extension() {
        assert_eq!(lookup("DRV_IMG"), Some(("isflash", "efi")));
    }

    #[test]
    fn test_lookup_platform_ini() {
        assert_eq!(lookup("INI_IMG"), Some(("platform", "ini")));
    }

    #[test]
    fn test_lookup_management_engine() {
        assert_eq!(lookup("ME_IMG"), Some(("Management Engine", "bin")));
    }

    #[test]
    fn test_lookup_unknown_tag() {
        assert_eq!(lookup("XYZ_IMG"), None);
        assert_eq!(lookup(""), None);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert_eq!(lookup("biosimg"), None);
    }

    #[test]
    fn test_every_known_tag_resolves() {
        for (tag, name, ext) in KNOWN_TAGS {
            assert_eq!(lookup(tag), Some((name, ext)));
        }
    }
}
