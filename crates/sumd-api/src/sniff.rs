//! Content-type sniffing for streamed artifacts.
//!
//! Follows the WHATWG MIME Sniffing algorithm over at most [`SNIFF_LEN`]
//! leading bytes: known signatures first, then a text/binary heuristic,
//! defaulting to `application/octet-stream`.

/// Maximum number of leading bytes consulted.
pub const SNIFF_LEN: usize = 512;

const OCTET_STREAM: &str = "application/octet-stream";
const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Tags that identify HTML when they open a document (case-insensitive,
/// followed by a space or `>`).
const HTML_TAGS: &[&[u8]] = &[
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
];

/// Byte signatures. `None` in a pattern matches any byte.
const SIGNATURES: &[(&[Option<u8>], &str)] = &[
    (&bytes(b"%PDF-"), "application/pdf"),
    (&bytes(b"%!PS-Adobe-"), "application/postscript"),
    (&bytes(b"\xFE\xFF"), "text/plain; charset=utf-16be"),
    (&bytes(b"\xFF\xFE"), "text/plain; charset=utf-16le"),
    (&bytes(b"\xEF\xBB\xBF"), TEXT_PLAIN),
    (&bytes(b"GIF87a"), "image/gif"),
    (&bytes(b"GIF89a"), "image/gif"),
    (&bytes(b"\x89PNG\r\n\x1A\n"), "image/png"),
    (&bytes(b"\xFF\xD8\xFF"), "image/jpeg"),
    (&bytes(b"BM"), "image/bmp"),
    (&bytes(b"\x00\x00\x01\x00"), "image/x-icon"),
    (&bytes(b"\x00\x00\x02\x00"), "image/x-icon"),
    (
        &[
            Some(b'R'), Some(b'I'), Some(b'F'), Some(b'F'), None, None, None, None,
            Some(b'W'), Some(b'E'), Some(b'B'), Some(b'P'), Some(b'V'), Some(b'P'),
        ],
        "image/webp",
    ),
    (
        &[
            Some(b'R'), Some(b'I'), Some(b'F'), Some(b'F'), None, None, None, None,
            Some(b'W'), Some(b'A'), Some(b'V'), Some(b'E'),
        ],
        "audio/wave",
    ),
    (&bytes(b"OggS\x00"), "application/ogg"),
    (&bytes(b"ID3"), "audio/mpeg"),
    (&bytes(b"\x1F\x8B\x08"), "application/x-gzip"),
    (&bytes(b"PK\x03\x04"), "application/zip"),
    (&bytes(b"Rar!\x1A\x07\x00"), "application/x-rar-compressed"),
    (&bytes(b"Rar!\x1A\x07\x01\x00"), "application/x-rar-compressed"),
    (&bytes(b"BZh"), "application/x-bzip2"),
    (&bytes(b"\xFD7zXZ\x00"), "application/x-xz"),
    (&bytes(b"\x28\xB5\x2F\xFD"), "application/zstd"),
    (&bytes(b"7z\xBC\xAF\x27\x1C"), "application/x-7z-compressed"),
    (&bytes(b"\x00asm"), "application/wasm"),
    (&bytes(b"\x7FELF"), "application/x-executable"),
];

/// Offset of the POSIX tar magic.
const TAR_MAGIC_OFFSET: usize = 257;

/// Lift a literal into an all-exact pattern.
const fn bytes<const N: usize>(lit: &[u8; N]) -> [Option<u8>; N] {
    let mut out = [None; N];
    let mut i = 0;
    while i < N {
        out[i] = Some(lit[i]);
        i += 1;
    }
    out
}

/// Best-effort content type of a file whose first bytes are `head`.
pub fn content_type(head: &[u8]) -> &'static str {
    let head = &head[..head.len().min(SNIFF_LEN)];

    let trimmed = skip_whitespace(head);
    if is_html(trimmed) {
        return "text/html; charset=utf-8";
    }
    if trimmed.starts_with(b"<?xml") {
        return "text/xml; charset=utf-8";
    }

    for (pattern, ct) in SIGNATURES {
        if matches_pattern(head, pattern) {
            return ct;
        }
    }

    if head.get(TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + 5) == Some(b"ustar".as_slice()) {
        return "application/x-tar";
    }

    if head.iter().any(|&b| is_binary_byte(b)) {
        OCTET_STREAM
    } else {
        TEXT_PLAIN
    }
}

fn skip_whitespace(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' '))
        .unwrap_or(data.len());
    &data[start..]
}

fn is_html(data: &[u8]) -> bool {
    HTML_TAGS.iter().any(|tag| {
        data.len() > tag.len()
            && data[..tag.len()].eq_ignore_ascii_case(tag)
            && matches!(data[tag.len()], b' ' | b'>')
    })
}

fn matches_pattern(data: &[u8], pattern: &[Option<u8>]) -> bool {
    data.len() >= pattern.len()
        && pattern
            .iter()
            .zip(data)
            .all(|(p, b)| p.map_or(true, |p| p == *b))
}

/// Control bytes that never appear in text.
fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}
