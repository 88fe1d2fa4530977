//! Target text encoding for lyric files.
//!
//! Providers hand back UTF-8 text. Players on some platforms only read
//! `.lrc` files in a legacy code page, so the text is re-encoded right
//! before it is written.

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};

use crate::error::{Error, Result};

/// A validated output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetEncoding {
    encoding: &'static Encoding,
}

impl TargetEncoding {
    /// Look up an encoding by its WHATWG label (`utf-8`, `gbk`, `shift_jis`, ...).
    ///
    /// Labels are matched case-insensitively. Unknown labels are a
    /// configuration error.
    pub fn from_label(label: &str) -> Result<Self> {
        Encoding::for_label(label.trim().as_bytes())
            .map(|encoding| Self { encoding })
            .ok_or_else(|| Error::config(format!("unsupported text encoding: {label}")))
    }

    pub fn utf8() -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
        }
    }

    /// Canonical name of the encoding.
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Convert UTF-8 text into bytes in this encoding.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        // WHATWG encoders never produce UTF-16, so do those by hand
        if self.encoding == UTF_16LE {
            return text.encode_utf16().flat_map(u16::to_le_bytes).collect();
        }
        if self.encoding == UTF_16BE {
            return text.encode_utf16().flat_map(u16::to_be_bytes).collect();
        }

        let (bytes, _, had_unmappable) = self.encoding.encode(text);
        if had_unmappable {
            tracing::debug!(
                encoding = self.name(),
                "Some characters were not representable and were replaced"
            );
        }
        bytes.into_owned()
    }
}

impl Default for TargetEncoding {
    fn default() -> Self {
        Self::utf8()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_label_is_config_error() {
        let err = TargetEncoding::from_label("NOT-A-REAL-ENCODING").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("NOT-A-REAL-ENCODING"));
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        let enc = TargetEncoding::from_label("GBK").unwrap();
        assert_eq!(enc.name(), "GBK");
        let enc = TargetEncoding::from_label(" utf-8 ").unwrap();
        assert_eq!(enc, TargetEncoding::utf8());
    }

    #[test]
    fn test_utf8_is_identity() {
        let text = "[00:12.50]Hello 世界";
        assert_eq!(TargetEncoding::utf8().encode(text), text.as_bytes());
    }

    #[test]
    fn test_gbk_roundtrip() {
        let enc = TargetEncoding::from_label("gbk").unwrap();
        let text = "[00:01.00]你好，世界";
        let bytes = enc.encode(text);
        assert_ne!(bytes, text.as_bytes());

        let (decoded, _, had_errors) = encoding_rs::GBK.decode(&bytes);
        assert!(!had_errors);
        assert_eq!(decoded, text);
    }

    #[test]
    fn test_utf16le_output() {
        let enc = TargetEncoding::from_label("utf-16le").unwrap();
        assert_eq!(enc.encode("Hi"), vec![b'H', 0, b'i', 0]);
    }

    #[test]
    fn test_utf16be_output() {
        let enc = TargetEncoding::from_label("utf-16be").unwrap();
        assert_eq!(enc.encode("Hi"), vec![0, b'H', 0, b'i']);
    }
}
