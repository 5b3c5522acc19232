//! Synthetic JPEG bytes for tests.

/// Minimal JPEG (SOI, APP1/Exif, EOI) whose primary image carries
/// `DateTimeOriginal = datetime`. `payload` is appended after EOI so
/// callers can make otherwise identical files differ.
pub fn jpeg_with_capture_time(datetime: &str, payload: &[u8]) -> Vec<u8> {
    let mut ascii = datetime.as_bytes().to_vec();
    ascii.push(0);
    assert!(ascii.len() > 4, "value must live outside the IFD entry");

    // Little-endian TIFF: IFD0 at 8 holds the Exif IFD pointer,
    // the Exif IFD at 26 holds DateTimeOriginal, its string at 44.
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II\x2a\x00");
    tiff.extend_from_slice(&8u32.to_le_bytes());

    tiff.extend_from_slice(&1u16.to_le_bytes());
    push_entry(&mut tiff, 0x8769, 4, 1, 26);
    tiff.extend_from_slice(&0u32.to_le_bytes());

    tiff.extend_from_slice(&1u16.to_le_bytes());
    push_entry(&mut tiff, 0x9003, 2, ascii.len() as u32, 44);
    tiff.extend_from_slice(&0u32.to_le_bytes());
    tiff.extend_from_slice(&ascii);

    let mut app1 = b"Exif\0\0".to_vec();
    app1.extend_from_slice(&tiff);

    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    out.extend_from_slice(&((app1.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&app1);
    out.extend_from_slice(&[0xFF, 0xD9]);
    out.extend_from_slice(payload);
    out
}

/// JPEG with no metadata segments at all.
pub fn plain_jpeg(payload: &[u8]) -> Vec<u8> {
    let mut out = vec![0xFF, 0xD8, 0xFF, 0xD9];
    out.extend_from_slice(payload);
    out
}

fn push_entry(buf: &mut Vec<u8>, tag: u16, kind: u16, count: u32, value: u32) {
    buf.extend_from_slice(&tag.to_le_bytes());
    buf.extend_from_slice(&kind.to_le_bytes());
    buf.extend_from_slice(&count.to_le_bytes());
    buf.extend_from_slice(&value.to_le_bytes());
}
