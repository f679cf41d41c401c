use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// RGBA colour used to paint highlighted keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parses `#RRGGBB` or `#RRGGBBAA`.
    pub fn parse(input: &str) -> Result<Self, ColorParseError> {
        let hex = input
            .trim()
            .strip_prefix('#')
            .ok_or(ColorParseError::MissingHash)?;
        if hex.len() != 6 && hex.len() != 8 {
            return Err(ColorParseError::InvalidLength);
        }
        if !hex.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidHex);
        }
        let mut components = [255u8; 4];
        for (index, slot) in components.iter_mut().take(hex.len() / 2).enumerate() {
            let pair = &hex[index * 2..index * 2 + 2];
            *slot = u8::from_str_radix(pair, 16).map_err(|_| ColorParseError::InvalidHex)?;
        }
        Ok(Color {
            r: components[0],
            g: components[1],
            b: components[2],
            a: components[3],
        })
    }

    /// Formats as `#RRGGBB`, appending alpha only when not opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("missing leading '#'")]
    MissingHash,
    #[error("expected 6 or 8 hex digits")]
    InvalidLength,
    #[error("contains non-hex digits")]
    InvalidHex,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_opaque_and_translucent_colours() {
        assert_eq!(Color::parse("#0000FF").unwrap(), Color::BLUE);
        let translucent = Color::parse(" #11223380 ").unwrap();
        assert_eq!(translucent.a, 0x80);
        assert_eq!(translucent.to_hex(), "#11223380");
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(Color::parse("0000FF"), Err(ColorParseError::MissingHash));
        assert_eq!(Color::parse("#00F"), Err(ColorParseError::InvalidLength));
        assert_eq!(Color::parse("#GG00FF"), Err(ColorParseError::InvalidHex));
    }
}
