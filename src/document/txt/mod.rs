use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};

pub mod pagination;

pub use pagination::{DEFAULT_PAGE_SIZE, Pagination, PaginationState, paginate};

pub fn decode_text(bytes: &[u8]) -> String {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return decode_with_encoding(&bytes[3..], UTF_8);
    }
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return decode_with_encoding(&bytes[2..], UTF_16LE);
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return decode_with_encoding(&bytes[2..], UTF_16BE);
    }

    if let Ok(as_utf8) = std::str::from_utf8(bytes) {
        return as_utf8.to_string();
    }

    // Fallback for legacy Windows text files.
    decode_with_encoding(bytes, WINDOWS_1252)
}

// Text is always written back as UTF-8, whatever it was read as.
pub fn encode_text(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

fn decode_with_encoding(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_utf8_bom() {
        assert_eq!(decode_text(&[0xEF, 0xBB, 0xBF, b'h', b'i']), "hi");
    }

    #[test]
    fn decodes_utf16_by_byte_order_mark() {
        assert_eq!(decode_text(&[0xFF, 0xFE, b'o', 0, b'k', 0]), "ok");
        assert_eq!(decode_text(&[0xFE, 0xFF, 0, b'o', 0, b'k']), "ok");
    }

    #[test]
    fn falls_back_to_windows_1252() {
        assert_eq!(decode_text(&[b'c', b'a', b'f', 0xE9]), "café");
    }
}
