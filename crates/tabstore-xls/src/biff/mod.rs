//! BIFF8 record framing
//!
//! A workbook stream is a run of records, each a little-endian `u16` type
//! and `u16` body length followed by the body. Bodies longer than
//! [`MAX_RECORD_DATA`] spill into CONTINUE records that directly follow.

pub mod parser;
pub mod records;
pub mod strings;

use crate::error::{XlsError, XlsResult};

/// Largest body a single record may carry
pub const MAX_RECORD_DATA: usize = 8224;

/// One logical record, CONTINUE bodies appended
#[derive(Debug)]
pub struct BiffRecord {
    pub record_type: u16,
    pub data: Vec<u8>,
    /// Where each appended CONTINUE body starts within `data`
    ///
    /// SST strings that straddle a boundary restate their encoding flag
    /// there, so the string decoder needs to know where they are.
    pub continue_offsets: Vec<usize>,
    /// Offset of the record header in the stream; BOUNDSHEET points here
    pub stream_offset: usize,
}

/// Cut a workbook stream into records, folding CONTINUE bodies into the
/// record before them
///
/// Trailing bytes too short for a header are ignored. A CONTINUE with
/// nothing before it is dropped.
pub fn split_records(stream: &[u8]) -> XlsResult<Vec<BiffRecord>> {
    let mut out: Vec<BiffRecord> = Vec::new();
    let mut at = 0;

    while let Some(header) = stream.get(at..at + 4) {
        let record_type = u16::from_le_bytes([header[0], header[1]]);
        let len = usize::from(u16::from_le_bytes([header[2], header[3]]));
        let body = stream.get(at + 4..at + 4 + len).ok_or_else(|| {
            XlsError::Parse(format!(
                "record 0x{record_type:04X} at offset {at} runs past the stream end"
            ))
        })?;

        match (record_type, out.last_mut()) {
            (records::CONTINUE, Some(prev)) => {
                prev.continue_offsets.push(prev.data.len());
                prev.data.extend_from_slice(body);
            }
            (records::CONTINUE, None) => {}
            _ => out.push(BiffRecord {
                record_type,
                data: body.to_vec(),
                continue_offsets: Vec::new(),
                stream_offset: at,
            }),
        }
        at += 4 + len;
    }

    Ok(out)
}

/// `(version, substream type)` of a BOF record
pub fn parse_bof(data: &[u8]) -> XlsResult<(u16, u16)> {
    let mut off = 0;
    let version = parser::read_u16(data, &mut off)?;
    let substream = parser::read_u16(data, &mut off)?;
    Ok((version, substream))
}

/// In-memory BIFF8 record stream builder.
///
/// Bodies longer than [`MAX_RECORD_DATA`] are split into CONTINUE records.
#[derive(Debug, Default)]
pub struct BiffWriter {
    buf: Vec<u8>,
}

impl BiffWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stream offset, i.e. where the next record header will land
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    /// Append one record
    pub fn record(&mut self, record_type: u16, data: &[u8]) {
        let mut chunks = data.chunks(MAX_RECORD_DATA);
        let first = chunks.next().unwrap_or(&[]);
        self.raw(record_type, first);
        for chunk in chunks {
            self.raw(records::CONTINUE, chunk);
        }
    }

    /// Append a record whose body is already known to fit
    pub(crate) fn raw(&mut self, record_type: u16, data: &[u8]) {
        self.buf.extend_from_slice(&record_type.to_le_bytes());
        self.buf.extend_from_slice(&(data.len() as u16).to_le_bytes());
        self.buf.extend_from_slice(data);
    }

    /// Overwrite a little-endian u32 at an absolute stream offset
    pub fn patch_u32(&mut self, at: usize, value: u32) {
        if let Some(slot) = self.buf.get_mut(at..at + 4) {
            slot.copy_from_slice(&value.to_le_bytes());
        }
    }

    /// Append an already serialized stream
    pub fn append(&mut self, other: BiffWriter) {
        self.buf.extend_from_slice(&other.buf);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_long_record_is_split_and_merged_back() {
        let body: Vec<u8> = (0..MAX_RECORD_DATA + 100).map(|i| i as u8).collect();
        let mut w = BiffWriter::new();
        w.record(records::MERGECELLS, &body);
        w.record(records::EOF, &[]);

        let bytes = w.into_bytes();
        // header + first chunk, then a CONTINUE header
        let continue_at = 4 + MAX_RECORD_DATA;
        assert_eq!(
            u16::from_le_bytes([bytes[continue_at], bytes[continue_at + 1]]),
            records::CONTINUE
        );

        let recs = split_records(&bytes).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].data, body);
        assert_eq!(recs[0].continue_offsets, vec![MAX_RECORD_DATA]);
        assert_eq!(recs[1].record_type, records::EOF);
        assert_eq!(recs[1].stream_offset, bytes.len() - 4);
    }

    #[test]
    fn test_split_records_edges() {
        let mut w = BiffWriter::new();
        w.raw(records::CONTINUE, &[1, 2]);
        w.record(records::BOF, &[0x00, 0x06, 0x05, 0x00]);
        let mut bytes = w.into_bytes();
        bytes.extend_from_slice(&[0x0A, 0x00]);

        let recs = split_records(&bytes).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].stream_offset, 6);
        assert_eq!(
            parse_bof(&recs[0].data).unwrap(),
            (records::BIFF8_VERSION, records::BOF_WORKBOOK_GLOBALS)
        );

        let truncated = [0x09, 0x08, 0x10, 0x00, 0x00];
        assert!(matches!(split_records(&truncated), Err(XlsError::Parse(_))));
        assert!(parse_bof(&[0x00, 0x06]).is_err());
    }

    #[test]
    fn test_patch_u32() {
        let mut w = BiffWriter::new();
        w.record(records::BOUNDSHEET, &[0, 0, 0, 0, 0, 0]);
        w.patch_u32(4, 0xDEADBEEF);
        let bytes = w.into_bytes();
        assert_eq!(&bytes[4..8], &0xDEADBEEFu32.to_le_bytes());
    }
}
