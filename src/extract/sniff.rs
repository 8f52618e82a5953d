//! Magic-byte content sniffing
//!
//! Only the first [`SNIFF_LEN`] bytes of a stream are inspected. Anything
//! that is not a recognized container or a skipped binary format is scanned
//! as text.

/// Number of prefix bytes read before routing a stream
pub const SNIFF_LEN: usize = 261;

/// How a stream should be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// Scan line by line
    PlainText,
    /// Single gzip member, decompress and sniff again
    Gzip,
    /// Zip archive, sniff every entry
    Zip,
    /// Binary content that is never scanned (video, bzip2)
    Skip,
}

/// Classifies a stream from its prefix
pub fn sniff(header: &[u8]) -> ContentKind {
    if is_gzip_magic(header) {
        ContentKind::Gzip
    } else if is_zip_magic(header) {
        ContentKind::Zip
    } else if is_bzip2_magic(header) || is_video_magic(header) {
        ContentKind::Skip
    } else {
        ContentKind::PlainText
    }
}

/// gzip member header
pub fn is_gzip_magic(header: &[u8]) -> bool {
    header.starts_with(&[0x1f, 0x8b])
}

/// Local file header, empty archive, or spanned archive marker
pub fn is_zip_magic(header: &[u8]) -> bool {
    if header.len() < 4 || header[0] != b'P' || header[1] != b'K' {
        return false;
    }
    matches!((header[2], header[3]), (3, 4) | (5, 6) | (7, 8))
}

fn is_bzip2_magic(header: &[u8]) -> bool {
    header.starts_with(b"BZh")
}

fn is_video_magic(header: &[u8]) -> bool {
    // ISO base media (mp4, mov, m4v, 3gp)
    if header.len() >= 8 && &header[4..8] == b"ftyp" {
        return true;
    }
    // AVI
    if header.len() >= 12 && header.starts_with(b"RIFF") && &header[8..12] == b"AVI " {
        return true;
    }
    header.starts_with(&[0x1a, 0x45, 0xdf, 0xa3]) // matroska, webm
        || header.starts_with(b"FLV\x01")
        || header.starts_with(&[0x00, 0x00, 0x01, 0xba]) // mpeg-ps
        || header.starts_with(&[0x00, 0x00, 0x01, 0xb3]) // mpeg video
        || header.starts_with(&[0x30, 0x26, 0xb2, 0x75, 0x8e, 0x66, 0xcf, 0x11]) // asf, wmv
}
