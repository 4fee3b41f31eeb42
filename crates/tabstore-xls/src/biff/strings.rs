//! BIFF8 Unicode string encoding and decoding.
//!
//! BIFF8 strings have a complex encoding:
//! - Header: char_count (2 bytes) + flags (1 byte)
//! - Flags bit 0 (`fHighByte`): 0 = compressed Latin-1, 1 = uncompressed UTF-16LE
//! - Flags bit 2 (`fExtSt`): extended string data follows (Asian phonetic)
//! - Flags bit 3 (`fRichSt`): rich text run array follows
//! - If fRichSt: 2-byte run count follows the flags
//! - If fExtSt: 4-byte extended data size follows
//! - Then the character data
//! - Then the rich text runs (4 bytes each) if fRichSt
//! - Then the extended data if fExtSt
//!
//! In SST records, strings can span CONTINUE records. The CONTINUE record
//! can change the encoding (compressed ↔ uncompressed) mid-string via a
//! new flags byte at the start of the continuation.

use super::parser::{read_u16, read_u32, read_u8};
use super::{records, BiffWriter, MAX_RECORD_DATA};
use crate::error::{XlsError, XlsResult};

/// Longest text a cell may hold
pub const MAX_CELL_TEXT: usize = 32_767;

/// Read a BIFF8 "short" string (1-byte length prefix, used in BOUNDSHEET etc.).
pub fn read_short_string(data: &[u8], offset: &mut usize) -> XlsResult<String> {
    let char_count = read_u8(data, offset)? as u16;
    let flags = read_u8(data, offset)?;
    read_character_data(data, offset, char_count, flags)
}

/// Read a BIFF8 Unicode string with a 2-byte length prefix (used in LABEL, STRING, etc.).
///
/// This does NOT handle CONTINUE boundaries; [`parse_sst`] does that for
/// the shared string table.
pub fn read_unicode_string(data: &[u8], offset: &mut usize) -> XlsResult<String> {
    let char_count = read_u16(data, offset)?;
    let flags = read_u8(data, offset)?;

    let is_rich = (flags & 0x08) != 0;
    let has_ext = (flags & 0x04) != 0;

    let run_count = if is_rich { read_u16(data, offset)? } else { 0 };
    let ext_size = if has_ext { read_u32(data, offset)? } else { 0 };

    let text = read_character_data(data, offset, char_count, flags)?;

    // Rich text runs are 4 bytes each: char_pos u16 + font_idx u16
    if is_rich {
        *offset += run_count as usize * 4;
    }
    if has_ext {
        *offset += ext_size as usize;
    }

    Ok(text)
}

/// Read character data (no header) given char_count and flags byte.
fn read_character_data(
    data: &[u8],
    offset: &mut usize,
    char_count: u16,
    flags: u8,
) -> XlsResult<String> {
    let mut units = Vec::with_capacity(char_count as usize);
    push_units(data, offset, char_count as usize, (flags & 0x01) != 0, &mut units)?;
    String::from_utf16(&units).map_err(|e| XlsError::Parse(format!("invalid UTF-16 string: {e}")))
}

fn push_units(
    data: &[u8],
    offset: &mut usize,
    count: usize,
    is_wide: bool,
    units: &mut Vec<u16>,
) -> XlsResult<()> {
    let byte_len = if is_wide { count * 2 } else { count };
    if *offset + byte_len > data.len() {
        return Err(XlsError::Parse(format!(
            "string data too short: need {} bytes at offset {}, have {}",
            byte_len,
            *offset,
            data.len().saturating_sub(*offset)
        )));
    }
    let bytes = &data[*offset..*offset + byte_len];
    if is_wide {
        units.extend(
            bytes
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]])),
        );
    } else {
        units.extend(bytes.iter().map(|&b| b as u16));
    }
    *offset += byte_len;
    Ok(())
}

/// Read one SST entry whose character data may cross CONTINUE boundaries.
fn read_sst_string(data: &[u8], offset: &mut usize, breaks: &[usize]) -> XlsResult<String> {
    let char_count = read_u16(data, offset)? as usize;
    let flags = read_u8(data, offset)?;

    let is_rich = (flags & 0x08) != 0;
    let has_ext = (flags & 0x04) != 0;
    let run_count = if is_rich { read_u16(data, offset)? } else { 0 };
    let ext_size = if has_ext { read_u32(data, offset)? } else { 0 };

    let mut is_wide = (flags & 0x01) != 0;
    let mut units = Vec::with_capacity(char_count);
    let mut remaining = char_count;

    while remaining > 0 {
        if breaks.contains(offset) {
            // Continuation restates the encoding of the rest of the string
            is_wide = (read_u8(data, offset)? & 0x01) != 0;
        }
        let chunk_end = breaks
            .iter()
            .copied()
            .find(|&b| b > *offset)
            .unwrap_or(data.len())
            .min(data.len());
        let available = chunk_end.saturating_sub(*offset);
        let take = (if is_wide { available / 2 } else { available }).min(remaining);
        if take == 0 {
            return Err(XlsError::Parse(format!(
                "SST string truncated at offset {}",
                *offset
            )));
        }
        push_units(data, offset, take, is_wide, &mut units)?;
        remaining -= take;
    }

    *offset += run_count as usize * 4 + ext_size as usize;
    String::from_utf16(&units).map_err(|e| XlsError::Parse(format!("invalid UTF-16 string: {e}")))
}

/// Parse the entire SST (Shared String Table) from a concatenated buffer
/// (SST body + all CONTINUE bodies already joined).
///
/// The SST body starts with:
/// - `total_strings` (4 bytes, u32) - total string refs in workbook
/// - `unique_strings` (4 bytes, u32) - number of unique strings in this table
/// - Then `unique_strings` Unicode string entries
pub fn parse_sst(data: &[u8], continue_offsets: &[usize]) -> XlsResult<Vec<String>> {
    let mut offset = 0;

    let _total_strings = read_u32(data, &mut offset)?;
    let unique_count = read_u32(data, &mut offset)? as usize;

    let mut strings = Vec::with_capacity(unique_count.min(data.len()));

    for i in 0..unique_count {
        match read_sst_string(data, &mut offset, continue_offsets) {
            Ok(s) => strings.push(s),
            Err(e) => {
                // Some files pad or truncate the SST; keep what decoded cleanly.
                log::warn!("SST parse error at string {i}/{unique_count}: {e}");
                break;
            }
        }
    }

    Ok(strings)
}

// ── Encoding ────────────────────────────────────────────────────────────

fn is_compressible(s: &str) -> bool {
    s.chars().all(|c| (c as u32) <= 0xFF)
}

/// UTF-16 code units of `s`, plus whether they all fit in one byte
fn encode_units(s: &str) -> (Vec<u16>, bool) {
    (s.encode_utf16().collect(), is_compressible(s))
}

fn push_character_data(out: &mut Vec<u8>, units: &[u16], compressed: bool) {
    if compressed {
        out.extend(units.iter().map(|&u| u as u8));
    } else {
        for unit in units {
            out.extend_from_slice(&unit.to_le_bytes());
        }
    }
}

/// Append a string with a 1-byte length prefix (sheet names, font names).
pub fn push_short_string(out: &mut Vec<u8>, s: &str) -> XlsResult<()> {
    let (units, compressed) = encode_units(s);
    let len = u8::try_from(units.len())
        .map_err(|_| XlsError::Limit(format!("string too long for a short string: {s:?}")))?;
    out.push(len);
    out.push(if compressed { 0x00 } else { 0x01 });
    push_character_data(out, &units, compressed);
    Ok(())
}

/// Append a string with a 2-byte length prefix.
pub fn push_unicode_string(out: &mut Vec<u8>, s: &str) -> XlsResult<()> {
    let (units, compressed) = encode_units(s);
    let len = u16::try_from(units.len())
        .map_err(|_| XlsError::Limit(format!("string of {} characters", units.len())))?;
    out.extend_from_slice(&len.to_le_bytes());
    out.push(if compressed { 0x00 } else { 0x01 });
    push_character_data(out, &units, compressed);
    Ok(())
}

/// Append an SST record (plus CONTINUE records as needed) to `w`.
///
/// String headers are never split. Character data that crosses a record
/// boundary restarts with a one-byte encoding flag in the CONTINUE body,
/// and UTF-16 code units are kept whole.
pub fn write_sst(w: &mut BiffWriter, strings: &[String], total_refs: u32) -> XlsResult<()> {
    let mut record_type = records::SST;
    let mut buf: Vec<u8> = Vec::with_capacity(MAX_RECORD_DATA);
    buf.extend_from_slice(&total_refs.to_le_bytes());
    buf.extend_from_slice(&(strings.len() as u32).to_le_bytes());

    let mut flush = |buf: &mut Vec<u8>, record_type: &mut u16| {
        w.raw(*record_type, buf);
        buf.clear();
        *record_type = records::CONTINUE;
    };

    for s in strings {
        let (units, compressed) = encode_units(s);
        let cch = u16::try_from(units.len())
            .map_err(|_| XlsError::Limit(format!("string of {} characters", units.len())))?;
        let flag = if compressed { 0x00 } else { 0x01 };
        let unit_size = if compressed { 1 } else { 2 };

        if MAX_RECORD_DATA - buf.len() < 3 + unit_size {
            flush(&mut buf, &mut record_type);
        }
        buf.extend_from_slice(&cch.to_le_bytes());
        buf.push(flag);

        let mut rest = &units[..];
        loop {
            let fits = (MAX_RECORD_DATA - buf.len()) / unit_size;
            let take = fits.min(rest.len());
            push_character_data(&mut buf, &rest[..take], compressed);
            rest = &rest[take..];
            if rest.is_empty() {
                break;
            }
            flush(&mut buf, &mut record_type);
            buf.push(flag);
        }
    }

    flush(&mut buf, &mut record_type);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biff::split_records;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_compressed_string() {
        // char_count = 3 (u16 LE), flags = 0x00, data = "ABC"
        let data = [0x03, 0x00, 0x00, b'A', b'B', b'C'];
        let mut offset = 0;
        let s = read_unicode_string(&data, &mut offset).unwrap();
        assert_eq!(s, "ABC");
        assert_eq!(offset, 6);
    }

    #[test]
    fn test_read_wide_string() {
        // char_count = 2 (u16 LE), flags = 0x01, data = H\0i\0
        let data = [0x02, 0x00, 0x01, b'H', 0x00, b'i', 0x00];
        let mut offset = 0;
        let s = read_unicode_string(&data, &mut offset).unwrap();
        assert_eq!(s, "Hi");
        assert_eq!(offset, 7);
    }

    #[test]
    fn test_read_short_string() {
        let data = [0x02, 0x00, b'O', b'K'];
        let mut offset = 0;
        let s = read_short_string(&data, &mut offset).unwrap();
        assert_eq!(s, "OK");
    }

    #[test]
    fn test_parse_sst() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&2u32.to_le_bytes()); // total
        buf.extend_from_slice(&2u32.to_le_bytes()); // unique
        buf.extend_from_slice(&[0x01, 0x00, 0x00, b'A']);
        buf.extend_from_slice(&[0x02, 0x00, 0x00, b'B', b'C']);

        let strings = parse_sst(&buf, &[]).unwrap();
        assert_eq!(strings, vec!["A", "BC"]);
    }

    #[test]
    fn test_parse_sst_switches_encoding_at_continue() {
        // "ab" compressed, then a CONTINUE restating the string as UTF-16 for "€"
        let mut buf = Vec::new();
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&[0x03, 0x00, 0x00, b'a', b'b']);
        let boundary = buf.len();
        buf.push(0x01);
        buf.extend_from_slice(&0x20ACu16.to_le_bytes());

        let strings = parse_sst(&buf, &[boundary]).unwrap();
        assert_eq!(strings, vec!["ab€"]);
    }

    #[test]
    fn test_push_strings() {
        let mut out = Vec::new();
        push_short_string(&mut out, "Sheet1").unwrap();
        push_unicode_string(&mut out, "é€").unwrap();

        let mut off = 0;
        assert_eq!(read_short_string(&out, &mut off).unwrap(), "Sheet1");
        assert_eq!(read_unicode_string(&out, &mut off).unwrap(), "é€");
        assert_eq!(off, out.len());

        assert!(push_short_string(&mut Vec::new(), &"x".repeat(300)).is_err());
    }

    #[test]
    fn test_write_sst_splits_long_strings() {
        let strings = vec![
            "short".to_string(),
            "x".repeat(MAX_RECORD_DATA),
            "ü€".repeat(3000),
            String::new(),
        ];
        let mut w = BiffWriter::new();
        write_sst(&mut w, &strings, 9).unwrap();

        let recs = split_records(&w.into_bytes()).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].record_type, records::SST);
        assert!(!recs[0].continue_offsets.is_empty());
        assert_eq!(parse_sst(&recs[0].data, &recs[0].continue_offsets).unwrap(), strings);
    }
}
