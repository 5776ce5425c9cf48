use crate::error::Diagnostic;

/// Bytes beyond this point of a single write are never looked at.
pub const WRITE_CAP: usize = 64;

/// Result of splitting one written buffer.
#[derive(Debug, PartialEq)]
pub struct Split<'a> {
    /// Complete records, delimiter stripped, in order
    pub records: Vec<&'a [u8]>,
    /// Bytes the caller should consider written
    pub consumed: usize,
    /// Set when a non-empty write held no complete record
    pub truncated: Option<Diagnostic>,
}

/// Splits `buf` into `\n` terminated records.
///
/// Only the first `WRITE_CAP` bytes are scanned. A trailing record without its
/// newline is dropped. If there is no newline at all, the whole `buf.len()` is
/// reported as consumed so that a caller retrying unwritten bytes cannot spin
/// forever on the same partial record.
pub fn split(buf: &[u8]) -> Split<'_> {
    let scanned = &buf[..buf.len().min(WRITE_CAP)];

    let mut records = Vec::new();
    let mut p = 0;
    for (i, b) in scanned.iter().enumerate() {
        if *b == b'\n' {
            records.push(&scanned[p..i]);
            p = i + 1;
        }
    }

    if p == 0 && !buf.is_empty() {
        return Split {
            records,
            consumed: buf.len(),
            truncated: Some(Diagnostic::TruncatedInput { len: buf.len() }),
        };
    }

    if p < scanned.len() {
        trace!("dropping {} trailing bytes", scanned.len() - p);
    }

    Split {
        records,
        consumed: p,
        truncated: None,
    }
}
