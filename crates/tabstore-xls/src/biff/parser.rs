//! Little-endian readers over record payloads
//!
//! Every reader takes the payload and a cursor and moves the cursor past
//! what it consumed. Reading past the end of the payload is a parse error,
//! never a panic.

use crate::error::{XlsError, XlsResult};

fn take<'a>(data: &'a [u8], offset: &mut usize, len: usize) -> XlsResult<&'a [u8]> {
    let bytes = offset
        .checked_add(len)
        .and_then(|end| data.get(*offset..end))
        .ok_or_else(|| {
            XlsError::Parse(format!(
                "record of {} bytes has no {len} bytes at offset {}",
                data.len(),
                *offset
            ))
        })?;
    *offset += len;
    Ok(bytes)
}

fn take_array<const N: usize>(data: &[u8], offset: &mut usize) -> XlsResult<[u8; N]> {
    let mut out = [0u8; N];
    out.copy_from_slice(take(data, offset, N)?);
    Ok(out)
}

pub fn read_u8(data: &[u8], offset: &mut usize) -> XlsResult<u8> {
    let [b] = take_array(data, offset)?;
    Ok(b)
}

pub fn read_u16(data: &[u8], offset: &mut usize) -> XlsResult<u16> {
    take_array(data, offset).map(u16::from_le_bytes)
}

pub fn read_u32(data: &[u8], offset: &mut usize) -> XlsResult<u32> {
    take_array(data, offset).map(u32::from_le_bytes)
}

pub fn read_f64(data: &[u8], offset: &mut usize) -> XlsResult<f64> {
    take_array(data, offset).map(f64::from_le_bytes)
}

/// `units` UTF-16 code units, cut at the first NUL
///
/// Hyperlink records count the terminator in their lengths.
pub fn read_utf16(data: &[u8], offset: &mut usize, units: usize) -> XlsResult<String> {
    let len = units
        .checked_mul(2)
        .ok_or_else(|| XlsError::Parse(format!("{units} UTF-16 units do not fit in memory")))?;
    let raw: Vec<u16> = take(data, offset, len)?
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .take_while(|&unit| unit != 0)
        .collect();
    String::from_utf16(&raw).map_err(|e| XlsError::Parse(format!("bad UTF-16 text: {e}")))
}

/// Decode a packed RK number
///
/// Bit 1 picks the payload of bits 2..32: a signed integer when set, else
/// the high 30 bits of a double. Bit 0 set divides the result by 100.
pub fn decode_rk(rk: u32) -> f64 {
    let value = if rk & 0x02 != 0 {
        f64::from((rk as i32) >> 2)
    } else {
        f64::from_bits(u64::from(rk & !0x03) << 32)
    };
    if rk & 0x01 != 0 {
        value / 100.0
    } else {
        value
    }
}

pub fn read_rk(data: &[u8], offset: &mut usize) -> XlsResult<f64> {
    read_u32(data, offset).map(decode_rk)
}
