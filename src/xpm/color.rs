//! Parsing of XPM color specifications: `#RGB`-style hex literals and X11 color names.

use std::fmt;

use super::x11colors;

/// A color with 16 bits per channel, independent of the precision it was written with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb16 {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

/// Reasons a color specification could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorError {
    /// The digits after `#` do not form three groups of 1 to 4 hex digits
    BadHexLength(usize),
    /// A hex group contains a character other than 0-9, a-f, A-F
    BadHexDigit,
    /// The name is not in the X11 color database
    UnknownName,
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadHexLength(n) => f.write_fmt(format_args!(
                "Invalid hex RGB color: {} digits is not 3 groups of 1 to 4",
                n
            )),
            Self::BadHexDigit => f.write_str("Invalid hex RGB color: non-hex digit"),
            Self::UnknownName => f.write_str("Unknown color name"),
        }
    }
}

impl std::error::Error for ColorError {}

fn parse_hex(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'A'..=b'F' => Some(b - b'A' + 10),
        b'a'..=b'f' => Some(b - b'a' + 10),
        _ => None,
    }
}

/// Parse one channel of `1..=4` hex digits and scale it to the full 16-bit range,
/// rounding down.
fn parse_hex_group(digits: &[u8]) -> Result<u16, ColorError> {
    let mut x: u32 = 0;
    for d in digits {
        x = (x << 4) | parse_hex(*d).ok_or(ColorError::BadHexDigit)? as u32;
    }
    let max = (1u32 << (4 * digits.len())) - 1;
    Ok((x * 65535 / max) as u16)
}

/// Parse the part of a `#RGB`-style color after the `#`.
fn parse_hex_color(data: &[u8]) -> Result<Rgb16, ColorError> {
    let width = data.len() / 3;
    if data.len() % 3 != 0 || !(1..=4).contains(&width) {
        return Err(ColorError::BadHexLength(data.len()));
    }
    let (r, rest) = data.split_at(width);
    let (g, b) = rest.split_at(width);
    Ok(Rgb16 {
        red: parse_hex_group(r)?,
        green: parse_hex_group(g)?,
        blue: parse_hex_group(b)?,
    })
}

/// Resolve a single color specification.
///
/// Specifications starting with `#` are hex literals with 1, 2, 3 or 4 digits per
/// channel; anything else is looked up in the X11 color name table. The special name
/// `none` is not handled here.
pub fn parse_color(spec: &[u8]) -> Result<Rgb16, ColorError> {
    match spec.strip_prefix(b"#") {
        Some(hex) => parse_hex_color(hex),
        None => x11colors::lookup(spec).ok_or(ColorError::UnknownName),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(red: u16, green: u16, blue: u16) -> Rgb16 {
        Rgb16 { red, green, blue }
    }

    #[test]
    fn hex_widths() {
        assert_eq!(parse_color(b"#f00"), Ok(rgb(65535, 0, 0)));
        assert_eq!(parse_color(b"#ff0000"), Ok(rgb(65535, 0, 0)));
        assert_eq!(parse_color(b"#FFF000000"), Ok(rgb(65535, 0, 0)));
        assert_eq!(parse_color(b"#ffff00000000"), Ok(rgb(65535, 0, 0)));
        assert_eq!(parse_color(b"#FFFFFF"), Ok(rgb(65535, 65535, 65535)));
    }

    #[test]
    fn hex_scaling_rounds_down() {
        // 0x8 * 65535 / 15
        assert_eq!(parse_color(b"#800").unwrap().red, 34952);
        // 0x80 * 65535 / 255
        assert_eq!(parse_color(b"#800000").unwrap().red, 32896);
        // 0x800 * 65535 / 4095
        assert_eq!(parse_color(b"#800000000").unwrap().red, 32775);
        assert_eq!(parse_color(b"#123400000000").unwrap().red, 0x1234);
        assert_eq!(parse_color(b"#0a0b0c"), Ok(rgb(2570, 2827, 3084)));
    }

    #[test]
    fn bad_hex() {
        assert_eq!(parse_color(b"#"), Err(ColorError::BadHexLength(0)));
        assert_eq!(parse_color(b"#ff00"), Err(ColorError::BadHexLength(4)));
        assert_eq!(parse_color(b"#000000000000000"), Err(ColorError::BadHexLength(15)));
        assert_eq!(parse_color(b"#ggg"), Err(ColorError::BadHexDigit));
        assert_eq!(parse_color(b"#12 456"), Err(ColorError::BadHexDigit));
    }

    #[test]
    fn names() {
        assert_eq!(parse_color(b"Black"), Ok(rgb(0, 0, 0)));
        assert_eq!(parse_color(b"NAVY"), Ok(rgb(0, 0, 32896)));
        assert_eq!(parse_color(b"no such color"), Err(ColorError::UnknownName));
        assert_eq!(parse_color(b"None"), Err(ColorError::UnknownName));
    }
}
