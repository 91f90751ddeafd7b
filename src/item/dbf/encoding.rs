use encoding_rs::{Encoding, IBM866};

use crate::error::BatchError;

/// Converts raw DBF field values from the table code page to UTF-8.
///
/// Values are trimmed of surrounding spaces, tabs, line breaks, NUL and vertical tab
/// bytes before decoding.
/// Byte sequences the code page cannot map are replaced with U+FFFD.
#[derive(Debug, Clone, Copy)]
pub struct FieldEncoder {
    encoding: &'static Encoding,
}

impl Default for FieldEncoder {
    /// FIAS tables are stored in CP866.
    fn default() -> Self {
        Self { encoding: IBM866 }
    }
}

impl FieldEncoder {
    pub fn new(encoding: &'static Encoding) -> Self {
        Self { encoding }
    }

    /// Looks up the source code page by label, e.g. `cp866` or `windows-1251`.
    pub fn for_label(label: &str) -> Result<Self, BatchError> {
        Encoding::for_label(label.trim().as_bytes())
            .map(Self::new)
            .ok_or_else(|| BatchError::Configuration(format!("unknown encoding '{}'", label)))
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn encode(&self, raw: &[u8]) -> String {
        let (text, _) = self.encoding.decode_without_bom_handling(trim(raw));
        text.into_owned()
    }
}

fn is_padding(byte: &u8) -> bool {
    matches!(*byte, b' ' | b'\t' | b'\n' | b'\r' | 0x00 | 0x0B)
}

fn trim(raw: &[u8]) -> &[u8] {
    let start = raw.iter().position(|b| !is_padding(b)).unwrap_or(raw.len());
    let end = raw.iter().rposition(|b| !is_padding(b)).map_or(start, |i| i + 1);
    &raw[start..end]
}
