/// Sniff the MIME type of a reference image from its magic bytes.
///
/// Anything unrecognized is labelled `image/png` and left for the model to
/// reject.
pub fn detect_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        _ => {
            tracing::warn!(
                "Unrecognized reference image format (leading bytes: {:02X?}), sending as image/png",
                &bytes[..bytes.len().min(4)]
            );
            "image/png"
        }
    }
}
