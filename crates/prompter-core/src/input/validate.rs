//! Magic-byte checks before a full decode.

use super::InputFormat;

/// Identify the format from the leading bytes of a file.
///
/// Returns `Ok` for JPEG and PNG. For anything else returns `Err` with a
/// short name of what the bytes look like ("gif", "webp", ..., or
/// "unknown"), used in the unsupported-format message.
pub fn sniff_format(header: &[u8]) -> Result<InputFormat, &'static str> {
    if header.len() < 4 {
        return Err("unknown");
    }

    // JPEG: FF D8 FF
    if header[0] == 0xFF && header[1] == 0xD8 && header[2] == 0xFF {
        return Ok(InputFormat::Jpeg);
    }

    // PNG: 89 50 4E 47
    if header[0] == 0x89 && header[1] == b'P' && header[2] == b'N' && header[3] == b'G' {
        return Ok(InputFormat::Png);
    }

    if header.starts_with(b"GIF8") {
        return Err("gif");
    }

    // WebP: RIFF....WEBP
    if header.starts_with(b"RIFF") && header.len() >= 12 && &header[8..12] == b"WEBP" {
        return Err("webp");
    }

    if header.starts_with(b"BM") {
        return Err("bmp");
    }

    // TIFF: II or MM followed by version 42
    if header.starts_with(&[b'I', b'I', 0x2A, 0x00]) || header.starts_with(&[b'M', b'M', 0x00, 0x2A])
    {
        return Err("tiff");
    }

    // HEIC/HEIF/AVIF: ftyp box at offset 4
    if header.len() >= 8 && &header[4..8] == b"ftyp" {
        return Err("heif");
    }

    Err("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_bytes_jpeg() {
        let header = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(sniff_format(&header), Ok(InputFormat::Jpeg));
    }

    #[test]
    fn test_magic_bytes_png() {
        let header = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        assert_eq!(sniff_format(&header), Ok(InputFormat::Png));
    }

    #[test]
    fn test_magic_bytes_webp_rejected() {
        let header = [b'R', b'I', b'F', b'F', 0, 0, 0, 0, b'W', b'E', b'B', b'P'];
        assert_eq!(sniff_format(&header), Err("webp"));
    }

    #[test]
    fn test_magic_bytes_gif_rejected() {
        assert_eq!(sniff_format(b"GIF89a\0\0"), Err("gif"));
    }

    #[test]
    fn test_magic_bytes_tiff_rejected() {
        let header = [b'I', b'I', 0x2A, 0x00, 0, 0, 0, 0];
        assert_eq!(sniff_format(&header), Err("tiff"));
    }

    #[test]
    fn test_magic_bytes_invalid() {
        assert_eq!(sniff_format(&[0, 0, 0, 0, 0, 0]), Err("unknown"));
    }

    #[test]
    fn test_too_short() {
        assert_eq!(sniff_format(&[0xFF, 0xD8]), Err("unknown"));
    }
}
