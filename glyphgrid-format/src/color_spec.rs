//! Color arguments of formatting commands
//!
//! A color is written as
//! - `r,g,b` or `r,g,b,a`, where each channel is a byte or `x` to keep the
//!   glyph's current value (three channels means opaque)
//! - `default`, the surface default for the targeted channel
//! - a color name or `#rrggbb[aa]`

use glyphgrid_core::Color;

use crate::error::{CommandError, Result};

/// One channel of a channel list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Keep,
    Set(u8),
}

impl Channel {
    fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("x") {
            return Ok(Channel::Keep);
        }
        text.parse::<u8>()
            .map(Channel::Set)
            .map_err(|_| CommandError::InvalidChannel(text.to_string()))
    }

    fn apply(self, current: u8) -> u8 {
        match self {
            Channel::Keep => current,
            Channel::Set(value) => value,
        }
    }
}

/// A parsed color argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpec {
    /// RGBA channels, each set or kept
    Channels([Channel; 4]),
    /// The surface default for the targeted channel
    Default,
    /// A fixed color
    Fixed(Color),
}

impl ColorSpec {
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();

        if text.contains(',') {
            let parts: Vec<&str> = text.split(',').collect();
            let alpha = match parts.len() {
                3 => Channel::Set(255),
                4 => Channel::parse(parts[3])?,
                n => return Err(CommandError::ChannelCount(n)),
            };
            return Ok(ColorSpec::Channels([
                Channel::parse(parts[0])?,
                Channel::parse(parts[1])?,
                Channel::parse(parts[2])?,
                alpha,
            ]));
        }

        if text.eq_ignore_ascii_case("default") {
            return Ok(ColorSpec::Default);
        }

        if text.starts_with('#') {
            return text
                .parse::<Color>()
                .map(ColorSpec::Fixed)
                .map_err(|_| CommandError::UnknownColor(text.to_string()));
        }

        Color::from_name(text)
            .map(ColorSpec::Fixed)
            .ok_or_else(|| CommandError::UnknownColor(text.to_string()))
    }

    /// Final color given the glyph's current color and the surface default
    pub fn resolve(&self, current: Color, default: Color) -> Color {
        match self {
            ColorSpec::Channels([r, g, b, a]) => Color::rgba(
                r.apply(current.r),
                g.apply(current.g),
                b.apply(current.b),
                a.apply(current.a),
            ),
            ColorSpec::Default => default,
            ColorSpec::Fixed(color) => *color,
        }
    }

    /// Color for contexts without a current color, such as gradient stops
    pub fn to_color(&self, default: Color) -> Color {
        self.resolve(Color::BLACK, default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_channels_are_opaque() {
        let spec = ColorSpec::parse("10,20,30").unwrap();
        assert_eq!(
            spec.resolve(Color::TRANSPARENT, Color::WHITE),
            Color::rgba(10, 20, 30, 255)
        );
    }

    #[test]
    fn test_palette_names() {
        for (name, expected) in [
            ("cornflowerblue", Color::rgb(100, 149, 237)),
            ("gold", Color::rgb(255, 215, 0)),
            ("navy", Color::rgb(0, 0, 128)),
            ("MediumSeaGreen", Color::rgb(60, 179, 113)),
            ("papayawhip", Color::rgb(255, 239, 213)),
        ] {
            assert_eq!(ColorSpec::parse(name), Ok(ColorSpec::Fixed(expected)), "{name}");
        }
    }

    #[test]
    fn test_keep_channels() {
        let spec = ColorSpec::parse("x,0,x,x").unwrap();
        let current = Color::rgba(1, 2, 3, 4);
        assert_eq!(spec.resolve(current, Color::WHITE), Color::rgba(1, 0, 3, 4));
    }

    #[test]
    fn test_channel_errors() {
        assert_eq!(ColorSpec::parse("1,2"), Err(CommandError::ChannelCount(2)));
        assert_eq!(
            ColorSpec::parse("1,2,3,4,5"),
            Err(CommandError::ChannelCount(5))
        );
        assert_eq!(
            ColorSpec::parse("1,2,300"),
            Err(CommandError::InvalidChannel("300".to_string()))
        );
    }

    #[test]
    fn test_named_and_default() {
        assert_eq!(
            ColorSpec::parse("Red").unwrap(),
            ColorSpec::Fixed(Color::RED)
        );
        assert_eq!(
            ColorSpec::parse("default")
                .unwrap()
                .resolve(Color::RED, Color::GRAY),
            Color::GRAY
        );
        assert!(matches!(
            ColorSpec::parse("notacolor"),
            Err(CommandError::UnknownColor(_))
        ));
    }

    #[test]
    fn test_hex() {
        assert_eq!(
            ColorSpec::parse("#00ff00").unwrap(),
            ColorSpec::Fixed(Color::rgb(0, 255, 0))
        );
    }
}
