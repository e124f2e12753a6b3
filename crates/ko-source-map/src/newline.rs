/*
 * newline.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Newline style detection

use serde::{Deserialize, Serialize};

/// The line terminator style of a text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Newline {
    #[default]
    Lf,
    CrLf,
    Cr,
}

impl Newline {
    /// Detect the style from the first newline sequence in `text`.
    ///
    /// Returns `None` for single-line text.
    pub fn detect(text: &str) -> Option<Newline> {
        let bytes = text.as_bytes();
        let idx = memchr::memchr2(b'\n', b'\r', bytes)?;

        Some(match bytes[idx] {
            b'\n' => Newline::Lf,
            _ if bytes.get(idx + 1) == Some(&b'\n') => Newline::CrLf,
            _ => Newline::Cr,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Newline::Lf => "\n",
            Newline::CrLf => "\r\n",
            Newline::Cr => "\r",
        }
    }

    /// Byte width of the terminator
    pub fn width(&self) -> usize {
        self.as_str().len()
    }
}

/// Length of the newline sequence starting at `idx`, if any.
///
/// `\r\n` is one terminator; lone `\r` and `\n` are terminators too.
pub(crate) fn terminator_len(bytes: &[u8], idx: usize) -> Option<usize> {
    match bytes.get(idx)? {
        b'\n' => Some(1),
        b'\r' if bytes.get(idx + 1) == Some(&b'\n') => Some(2),
        b'\r' => Some(1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_single_line() {
        assert_eq!(Newline::detect(""), None);
        assert_eq!(Newline::detect("hello"), None);
    }

    #[test]
    fn test_detect_styles() {
        assert_eq!(Newline::detect("a\nb"), Some(Newline::Lf));
        assert_eq!(Newline::detect("a\r\nb"), Some(Newline::CrLf));
        assert_eq!(Newline::detect("a\rb"), Some(Newline::Cr));
    }

    #[test]
    fn test_detect_uses_first_occurrence() {
        assert_eq!(Newline::detect("a\r\nb\nc"), Some(Newline::CrLf));
        assert_eq!(Newline::detect("a\nb\r\nc"), Some(Newline::Lf));
        // A trailing lone CR is not mistaken for CRLF
        assert_eq!(Newline::detect("a\r"), Some(Newline::Cr));
    }

    #[test]
    fn test_terminator_len() {
        let bytes = b"a\r\nb\rc\nd";
        assert_eq!(terminator_len(bytes, 0), None);
        assert_eq!(terminator_len(bytes, 1), Some(2));
        assert_eq!(terminator_len(bytes, 4), Some(1));
        assert_eq!(terminator_len(bytes, 6), Some(1));
        assert_eq!(terminator_len(bytes, 100), None);
    }
}
