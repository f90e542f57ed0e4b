//! Base64 variable-length quantities as used by the `mappings` field.
//!
//! A value is zigzag-folded (sign in the lowest bit) and emitted in 5-bit
//! groups, least significant first. Bit `0x20` of a digit marks that another
//! digit follows.

use crate::{InsightError, Result};

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const CONTINUATION_BIT: u32 = 0b10_0000;
const DIGIT_MASK: u32 = 0b01_1111;
const INVALID: u8 = 0xFF;

const DECODE_TABLE: [u8; 128] = {
    let mut table = [INVALID; 128];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Appends the VLQ digits of `value` to `out`.
pub fn encode(value: i64, out: &mut String) {
    let mut folded: u64 = if value < 0 {
        (value.unsigned_abs() << 1) | 1
    } else {
        (value as u64) << 1
    };
    loop {
        let mut digit = (folded & DIGIT_MASK as u64) as u32;
        folded >>= 5;
        if folded > 0 {
            digit |= CONTINUATION_BIT;
        }
        out.push(ALPHABET[digit as usize] as char);
        if folded == 0 {
            break;
        }
    }
}

/// Decodes one value starting at `*pos`, never reading at or past `end`.
/// On success `*pos` points just after the last digit.
pub fn decode(bytes: &[u8], pos: &mut usize, end: usize) -> Result<i64> {
    let mut folded: u64 = 0;
    let mut shift = 0u32;
    loop {
        if *pos >= end {
            return Err(InsightError::InvalidVlq { pos: *pos });
        }
        let byte = bytes[*pos];
        let digit = DECODE_TABLE
            .get(byte as usize)
            .copied()
            .filter(|d| *d != INVALID)
            .ok_or(InsightError::InvalidVlq { pos: *pos })? as u32;
        if shift > 60 {
            return Err(InsightError::InvalidVlq { pos: *pos });
        }
        *pos += 1;
        folded |= ((digit & DIGIT_MASK) as u64) << shift;
        shift += 5;
        if digit & CONTINUATION_BIT == 0 {
            break;
        }
    }

    let magnitude = (folded >> 1) as i64;
    if folded & 1 == 1 {
        // "-0" is how the reference codecs spell i32::MIN.
        if magnitude == 0 {
            Ok(i32::MIN as i64)
        } else {
            Ok(-magnitude)
        }
    } else {
        Ok(magnitude)
    }
}
