use crate::iflash::IflashHeader;

/// Print a narration line indented by `padding` spaces, matching the nested
/// console trace the vendor tooling produces. Multi-line messages keep the
/// indent on every line.
pub fn printer(message: &str, padding: usize) {
    for line in message.split('\n') {
        println!("{}{}", " ".repeat(padding), line);
    }
}

/// Dump the fields of a validated iFlash header, indented.
pub fn print_header(header: &IflashHeader, padding: usize) {
    printer("Signature : $_IFLASH", padding);
    printer(&format!("Image Name: {}", header.image_tag()), padding);
    printer(&format!("Image Size: 0x{:X}", header.image_size), padding);
    printer(&format!("Total Size: 0x{:X}", header.total_size), padding);
    printer(&format!("Padd Size : 0x{:X}", header.padding_size()), padding);
}
