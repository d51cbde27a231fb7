// SPDX-License-Identifier: Apache-2.0

// Integer parsing for the 16-bit atlas fields, modelled on core::num's radix parser

/// Error type for the strict 16-bit parser.
#[cfg(feature = "int-range-error")]
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ConstParseIntegerError {
    /// The input byte slice was empty.
    Empty,
    /// The input consisted only of a sign character (`+` or `-`).
    SignOnly,
    /// A byte that is not a base-10 digit, including `.`, `e` and `E`.
    InvalidDigit,
    /// The value is negative or above `u16::MAX`.
    Overflow,
}

/// Parses the leading decimal integer of `src` and narrows it to 16 bits.
///
/// Parsing stops at the first non-digit, so `b"12.9"` yields 12 and `b"1e3"`
/// yields 1. The result is the value modulo 2^16: `b"-1"` yields 65535 and
/// `b"70000"` yields 4464. Input without digits yields 0.
#[cfg(feature = "int-wrap")]
pub const fn from_ascii_u16_wrapping(src: &[u8]) -> u16 {
    let (is_negative, mut digits) = match src {
        [b'+', rest @ ..] => (false, rest),
        [b'-', rest @ ..] => (true, rest),
        _ => (false, src),
    };

    let mut result: u16 = 0;
    while let Some((&byte, rest)) = digits.split_first() {
        if !byte.is_ascii_digit() {
            break;
        }
        result = result.wrapping_mul(10).wrapping_add((byte - b'0') as u16);
        digits = rest;
    }

    if is_negative {
        result.wrapping_neg()
    } else {
        result
    }
}

/// Parses `src` as a plain decimal integer in `0..=u16::MAX`.
///
/// `-0` is accepted as zero. This function is guaranteed not to panic.
#[cfg(feature = "int-range-error")]
pub const fn from_ascii_u16(src: &[u8]) -> Result<u16, ConstParseIntegerError> {
    let (is_negative, mut digits) = match src {
        [] => return Err(ConstParseIntegerError::Empty),
        [b'+', rest @ ..] => (false, rest),
        [b'-', rest @ ..] => (true, rest),
        _ => (false, src),
    };

    if digits.is_empty() {
        return Err(ConstParseIntegerError::SignOnly);
    }

    let mut result: u16 = 0;
    while let Some((&byte, rest)) = digits.split_first() {
        let digit = match byte {
            b'0'..=b'9' => (byte - b'0') as u16,
            _ => return Err(ConstParseIntegerError::InvalidDigit),
        };

        result = match result.checked_mul(10) {
            Some(val) => val,
            None => return Err(ConstParseIntegerError::Overflow),
        };
        result = match result.checked_add(digit) {
            Some(val) => val,
            None => return Err(ConstParseIntegerError::Overflow),
        };

        digits = rest;
    }

    if is_negative && result != 0 {
        return Err(ConstParseIntegerError::Overflow);
    }
    Ok(result)
}
