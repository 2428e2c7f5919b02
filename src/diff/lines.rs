use std::fmt::Display;

use bytes::Bytes;

/// Scan up to this many leading bytes for a NUL when testing for binary data.
pub const BINARY_CHECK_SIZE: usize = 65536;

/// A NUL byte was found in the buffer header; the data is not line-oriented
/// text and the diff refuses to run on it. Callers report "binary differs"
/// instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryInput;

impl Display for BinaryInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "binary input: NUL byte within the first {BINARY_CHECK_SIZE} bytes")
    }
}

impl std::error::Error for BinaryInput {}

/// Split a buffer into terminator-stripped line views.
///
/// Accepts `\n`, `\r` and `\r\n` terminators; a `\r\n` pair ends one line at
/// the `\r`. A trailing unterminated line is emitted. Lines are zero-copy
/// slices of the input buffer; a blank line is a zero-length view.
pub fn split_lines(data: &Bytes) -> Result<Vec<Bytes>, BinaryInput> {
    let mut lines = Vec::with_capacity((data.len() / 32).min(500));
    let mut prev = 0usize;
    let mut last = 0u8;

    for (i, &b) in data.iter().enumerate() {
        if b == b'\n' && last == b'\r' {
            // second half of a CRLF pair, the line already ended at the '\r'
            prev = i + 1;
        } else if b == b'\n' || b == b'\r' {
            lines.push(data.slice(prev..i));
            prev = i + 1;
        } else if b == 0 && i < BINARY_CHECK_SIZE {
            return Err(BinaryInput);
        }
        last = b;
    }

    if data.len() > prev {
        lines.push(data.slice(prev..));
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn split(text: &'static [u8]) -> Vec<Bytes> {
        split_lines(&Bytes::from_static(text)).expect("text input")
    }

    #[test]
    fn splits_lf_terminated_lines() {
        assert_eq!(split(b"a\nbb\nccc\n"), vec!["a", "bb", "ccc"]);
    }

    #[test]
    fn splits_cr_and_crlf_terminated_lines() {
        assert_eq!(split(b"a\r\nb"), vec!["a", "b"]);
        assert_eq!(split(b"a\rb\nc"), vec!["a", "b", "c"]);
        assert_eq!(split(b"a\r\rb"), vec!["a", "", "b"]);
    }

    #[test]
    fn emits_trailing_unterminated_line() {
        assert_eq!(split(b"a\nb"), vec!["a", "b"]);
        assert_eq!(split(b"no newline"), vec!["no newline"]);
    }

    #[test]
    fn blank_lines_are_zero_length_views() {
        assert_eq!(split(b"a\n\nb\n"), vec!["a", "", "b"]);
    }

    #[test]
    fn empty_buffer_has_no_lines() {
        assert_eq!(split(b""), Vec::<Bytes>::new());
    }

    #[test]
    fn nul_in_header_is_binary() {
        let data = Bytes::from_static(b"text\0more");
        assert_eq!(split_lines(&data), Err(BinaryInput));
    }

    #[test]
    fn nul_past_the_header_is_not_binary() {
        let mut data = vec![b'x'; BINARY_CHECK_SIZE];
        data.push(0);
        let lines = split_lines(&Bytes::from(data)).expect("NUL past header");
        assert_eq!(lines.len(), 1);
    }
}
