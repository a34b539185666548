//! Color representation for glyph cells
//!
//! Colors are straight (non-premultiplied) RGBA with 8 bits per channel.
//! A table of named colors backs the `[c:r f:red]` style lookups done by
//! the format parser and the color strings used in scene files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 128, 0);
    pub const LIME: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const CYAN: Color = Color::rgb(0, 255, 255);
    pub const MAGENTA: Color = Color::rgb(255, 0, 255);
    pub const ORANGE: Color = Color::rgb(255, 165, 0);
    pub const PURPLE: Color = Color::rgb(128, 0, 128);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
    pub const DARK_GRAY: Color = Color::rgb(169, 169, 169);
    pub const LIGHT_GRAY: Color = Color::rgb(211, 211, 211);

    /// Create an opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    /// Create a color with an explicit alpha channel
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    /// Channels as an array in r, g, b, a order
    pub fn channels(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Build a color from channels in r, g, b, a order
    pub fn from_channels(channels: [u8; 4]) -> Self {
        Color::rgba(channels[0], channels[1], channels[2], channels[3])
    }

    /// Linear interpolation between two colors; `amount` is clamped to 0..=1
    pub fn lerp(from: Color, to: Color, amount: f32) -> Color {
        let t = amount.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| -> u8 {
            let v = a as f32 + (b as f32 - a as f32) * t;
            v.round().clamp(0.0, 255.0) as u8
        };
        Color::rgba(
            mix(from.r, to.r),
            mix(from.g, to.g),
            mix(from.b, to.b),
            mix(from.a, to.a),
        )
    }

    /// Look up a named color (case-insensitive, spaces and underscores ignored)
    pub fn from_name(name: &str) -> Option<Color> {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .map(|c| c.to_ascii_lowercase())
            .collect();

        NAMED_COLORS
            .iter()
            .find(|(n, _)| *n == key)
            .map(|(_, color)| *color)
    }

    /// Hex notation, `#rrggbb` for opaque colors and `#rrggbbaa` otherwise
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::TRANSPARENT
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Error returned when a color string cannot be understood
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized color '{0}'")]
pub struct ParseColorError(pub String);

impl FromStr for Color {
    type Err = ParseColorError;

    /// Accepts a color name, `#rrggbb`, `#rrggbbaa` or `r,g,b[,a]`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseColorError(s.to_string());

        if let Some(hex) = s.strip_prefix('#') {
            if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
                return Err(err());
            }
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
            let a = if hex.len() == 8 { byte(6)? } else { 255 };
            return Ok(Color::rgba(byte(0)?, byte(2)?, byte(4)?, a));
        }

        if s.contains(',') {
            let parts: Vec<&str> = s.split(',').map(str::trim).collect();
            if parts.len() != 3 && parts.len() != 4 {
                return Err(err());
            }
            let mut channels = [255u8; 4];
            for (slot, part) in channels.iter_mut().zip(&parts) {
                *slot = part.parse().map_err(|_| err())?;
            }
            return Ok(Color::from_channels(channels));
        }

        Color::from_name(s).ok_or_else(err)
    }
}

/// Named colors (the CSS / XNA palette plus the classic ANSI eight), keys
/// are lowercase without separators
const NAMED_COLORS: &[(&str, Color)] = &[
    ("transparent", Color::TRANSPARENT),
    ("transparentblack", Color::TRANSPARENT),
    ("aliceblue", Color::rgb(240, 248, 255)),
    ("antiquewhite", Color::rgb(250, 235, 215)),
    ("aqua", Color::CYAN),
    ("aquamarine", Color::rgb(127, 255, 212)),
    ("azure", Color::rgb(240, 255, 255)),
    ("beige", Color::rgb(245, 245, 220)),
    ("bisque", Color::rgb(255, 228, 196)),
    ("black", Color::BLACK),
    ("blanchedalmond", Color::rgb(255, 235, 205)),
    ("blue", Color::BLUE),
    ("blueviolet", Color::rgb(138, 43, 226)),
    ("brown", Color::rgb(165, 42, 42)),
    ("burlywood", Color::rgb(222, 184, 135)),
    ("cadetblue", Color::rgb(95, 158, 160)),
    ("chartreuse", Color::rgb(127, 255, 0)),
    ("chocolate", Color::rgb(210, 105, 30)),
    ("coral", Color::rgb(255, 127, 80)),
    ("cornflowerblue", Color::rgb(100, 149, 237)),
    ("cornsilk", Color::rgb(255, 248, 220)),
    ("crimson", Color::rgb(220, 20, 60)),
    ("cyan", Color::CYAN),
    ("darkblue", Color::rgb(0, 0, 139)),
    ("darkcyan", Color::rgb(0, 139, 139)),
    ("darkgoldenrod", Color::rgb(184, 134, 11)),
    ("darkgray", Color::DARK_GRAY),
    ("darkgrey", Color::DARK_GRAY),
    ("darkgreen", Color::rgb(0, 100, 0)),
    ("darkkhaki", Color::rgb(189, 183, 107)),
    ("darkmagenta", Color::rgb(139, 0, 139)),
    ("darkolivegreen", Color::rgb(85, 107, 47)),
    ("darkorange", Color::rgb(255, 140, 0)),
    ("darkorchid", Color::rgb(153, 50, 204)),
    ("darkred", Color::rgb(139, 0, 0)),
    ("darksalmon", Color::rgb(233, 150, 122)),
    ("darkseagreen", Color::rgb(143, 188, 139)),
    ("darkslateblue", Color::rgb(72, 61, 139)),
    ("darkslategray", Color::rgb(47, 79, 79)),
    ("darkslategrey", Color::rgb(47, 79, 79)),
    ("darkturquoise", Color::rgb(0, 206, 209)),
    ("darkviolet", Color::rgb(148, 0, 211)),
    ("deeppink", Color::rgb(255, 20, 147)),
    ("deepskyblue", Color::rgb(0, 191, 255)),
    ("dimgray", Color::rgb(105, 105, 105)),
    ("dimgrey", Color::rgb(105, 105, 105)),
    ("dodgerblue", Color::rgb(30, 144, 255)),
    ("firebrick", Color::rgb(178, 34, 34)),
    ("floralwhite", Color::rgb(255, 250, 240)),
    ("forestgreen", Color::rgb(34, 139, 34)),
    ("fuchsia", Color::MAGENTA),
    ("gainsboro", Color::rgb(220, 220, 220)),
    ("ghostwhite", Color::rgb(248, 248, 255)),
    ("gold", Color::rgb(255, 215, 0)),
    ("goldenrod", Color::rgb(218, 165, 32)),
    ("gray", Color::GRAY),
    ("grey", Color::GRAY),
    ("green", Color::GREEN),
    ("greenyellow", Color::rgb(173, 255, 47)),
    ("honeydew", Color::rgb(240, 255, 240)),
    ("hotpink", Color::rgb(255, 105, 180)),
    ("indianred", Color::rgb(205, 92, 92)),
    ("indigo", Color::rgb(75, 0, 130)),
    ("ivory", Color::rgb(255, 255, 240)),
    ("khaki", Color::rgb(240, 230, 140)),
    ("lavender", Color::rgb(230, 230, 250)),
    ("lavenderblush", Color::rgb(255, 240, 245)),
    ("lawngreen", Color::rgb(124, 252, 0)),
    ("lemonchiffon", Color::rgb(255, 250, 205)),
    ("lightblue", Color::rgb(173, 216, 230)),
    ("lightcoral", Color::rgb(240, 128, 128)),
    ("lightcyan", Color::rgb(224, 255, 255)),
    ("lightgoldenrodyellow", Color::rgb(250, 250, 210)),
    ("lightgray", Color::LIGHT_GRAY),
    ("lightgrey", Color::LIGHT_GRAY),
    ("lightgreen", Color::rgb(144, 238, 144)),
    ("lightpink", Color::rgb(255, 182, 193)),
    ("lightsalmon", Color::rgb(255, 160, 122)),
    ("lightseagreen", Color::rgb(32, 178, 170)),
    ("lightskyblue", Color::rgb(135, 206, 250)),
    ("lightslategray", Color::rgb(119, 136, 153)),
    ("lightslategrey", Color::rgb(119, 136, 153)),
    ("lightsteelblue", Color::rgb(176, 196, 222)),
    ("lightyellow", Color::rgb(255, 255, 224)),
    ("lime", Color::LIME),
    ("limegreen", Color::rgb(50, 205, 50)),
    ("linen", Color::rgb(250, 240, 230)),
    ("magenta", Color::MAGENTA),
    ("maroon", Color::rgb(128, 0, 0)),
    ("mediumaquamarine", Color::rgb(102, 205, 170)),
    ("mediumblue", Color::rgb(0, 0, 205)),
    ("mediumorchid", Color::rgb(186, 85, 211)),
    ("mediumpurple", Color::rgb(147, 112, 219)),
    ("mediumseagreen", Color::rgb(60, 179, 113)),
    ("mediumslateblue", Color::rgb(123, 104, 238)),
    ("mediumspringgreen", Color::rgb(0, 250, 154)),
    ("mediumturquoise", Color::rgb(72, 209, 204)),
    ("mediumvioletred", Color::rgb(199, 21, 133)),
    ("midnightblue", Color::rgb(25, 25, 112)),
    ("mintcream", Color::rgb(245, 255, 250)),
    ("mistyrose", Color::rgb(255, 228, 225)),
    ("moccasin", Color::rgb(255, 228, 181)),
    ("navajowhite", Color::rgb(255, 222, 173)),
    ("navy", Color::rgb(0, 0, 128)),
    ("oldlace", Color::rgb(253, 245, 230)),
    ("olive", Color::rgb(128, 128, 0)),
    ("olivedrab", Color::rgb(107, 142, 35)),
    ("orange", Color::ORANGE),
    ("orangered", Color::rgb(255, 69, 0)),
    ("orchid", Color::rgb(218, 112, 214)),
    ("palegoldenrod", Color::rgb(238, 232, 170)),
    ("palegreen", Color::rgb(152, 251, 152)),
    ("paleturquoise", Color::rgb(175, 238, 238)),
    ("palevioletred", Color::rgb(219, 112, 147)),
    ("papayawhip", Color::rgb(255, 239, 213)),
    ("peachpuff", Color::rgb(255, 218, 185)),
    ("peru", Color::rgb(205, 133, 63)),
    ("pink", Color::rgb(255, 192, 203)),
    ("plum", Color::rgb(221, 160, 221)),
    ("powderblue", Color::rgb(176, 224, 230)),
    ("purple", Color::PURPLE),
    ("rebeccapurple", Color::rgb(102, 51, 153)),
    ("red", Color::RED),
    ("rosybrown", Color::rgb(188, 143, 143)),
    ("royalblue", Color::rgb(65, 105, 225)),
    ("saddlebrown", Color::rgb(139, 69, 19)),
    ("salmon", Color::rgb(250, 128, 114)),
    ("sandybrown", Color::rgb(244, 164, 96)),
    ("seagreen", Color::rgb(46, 139, 87)),
    ("seashell", Color::rgb(255, 245, 238)),
    ("sienna", Color::rgb(160, 82, 45)),
    ("silver", Color::rgb(192, 192, 192)),
    ("skyblue", Color::rgb(135, 206, 235)),
    ("slateblue", Color::rgb(106, 90, 205)),
    ("slategray", Color::rgb(112, 128, 144)),
    ("slategrey", Color::rgb(112, 128, 144)),
    ("snow", Color::rgb(255, 250, 250)),
    ("springgreen", Color::rgb(0, 255, 127)),
    ("steelblue", Color::rgb(70, 130, 180)),
    ("tan", Color::rgb(210, 180, 140)),
    ("teal", Color::rgb(0, 128, 128)),
    ("thistle", Color::rgb(216, 191, 216)),
    ("tomato", Color::rgb(255, 99, 71)),
    ("turquoise", Color::rgb(64, 224, 208)),
    ("violet", Color::rgb(238, 130, 238)),
    ("wheat", Color::rgb(245, 222, 179)),
    ("white", Color::WHITE),
    ("whitesmoke", Color::rgb(245, 245, 245)),
    ("yellow", Color::YELLOW),
    ("yellowgreen", Color::rgb(154, 205, 50)),
    ("ansiblack", Color::rgb(0, 0, 0)),
    ("ansired", Color::rgb(170, 0, 0)),
    ("ansigreen", Color::rgb(0, 170, 0)),
    ("ansiyellow", Color::rgb(170, 85, 0)),
    ("ansiblue", Color::rgb(0, 0, 170)),
    ("ansimagenta", Color::rgb(170, 0, 170)),
    ("ansicyan", Color::rgb(0, 170, 170)),
    ("ansiwhite", Color::rgb(170, 170, 170)),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_default_is_transparent() {
        assert_eq!(Color::default(), Color::TRANSPARENT);
        assert_eq!(Color::default().a, 0);
    }

    #[test]
    fn test_color_rgb_is_opaque() {
        let color = Color::rgb(255, 128, 64);
        assert_eq!(color.channels(), [255, 128, 64, 255]);
    }

    #[test]
    fn test_lerp_endpoints_and_midpoint() {
        assert_eq!(Color::lerp(Color::BLACK, Color::WHITE, 0.0), Color::BLACK);
        assert_eq!(Color::lerp(Color::BLACK, Color::WHITE, 1.0), Color::WHITE);
        assert_eq!(
            Color::lerp(Color::BLACK, Color::WHITE, 0.5),
            Color::rgb(128, 128, 128)
        );
        // Out of range amounts are clamped
        assert_eq!(Color::lerp(Color::BLACK, Color::WHITE, 3.0), Color::WHITE);
    }

    #[test]
    fn test_named_lookup() {
        assert_eq!(Color::from_name("Red"), Some(Color::RED));
        assert_eq!(Color::from_name("dark_gray"), Some(Color::DARK_GRAY));
        assert_eq!(Color::from_name("Light Gray"), Some(Color::LIGHT_GRAY));
        assert_eq!(Color::from_name("not-a-color"), None);
    }

    #[test]
    fn test_full_palette() {
        assert_eq!(Color::from_name("CornflowerBlue"), Some(Color::rgb(100, 149, 237)));
        assert_eq!(Color::from_name("navy"), Some(Color::rgb(0, 0, 128)));
        assert_eq!(Color::from_name("gold"), Some(Color::rgb(255, 215, 0)));
        assert_eq!(Color::from_name("light_goldenrod_yellow"), Some(Color::rgb(250, 250, 210)));
        assert_eq!(Color::from_name("YellowGreen"), Some(Color::rgb(154, 205, 50)));
        assert_eq!(Color::from_name("TransparentBlack"), Some(Color::TRANSPARENT));
        assert!(NAMED_COLORS.len() > 140);
    }

    #[test]
    fn test_parse_error_message() {
        let err = "mauve-ish".parse::<Color>().unwrap_err();
        assert_eq!(err.to_string(), "unrecognized color 'mauve-ish'");
    }

    #[test]
    fn test_from_str_forms() {
        assert_eq!("white".parse::<Color>(), Ok(Color::WHITE));
        assert_eq!("#ff8000".parse::<Color>(), Ok(Color::rgb(255, 128, 0)));
        assert_eq!(
            "#ff800080".parse::<Color>(),
            Ok(Color::rgba(255, 128, 0, 128))
        );
        assert_eq!("10, 20, 30".parse::<Color>(), Ok(Color::rgb(10, 20, 30)));
        assert_eq!("1,2,3,4".parse::<Color>(), Ok(Color::rgba(1, 2, 3, 4)));
        assert!("1,2".parse::<Color>().is_err());
        assert!("#12".parse::<Color>().is_err());
        assert!("300,0,0".parse::<Color>().is_err());
    }

    #[test]
    fn test_hex_round_trip() {
        let color = Color::rgba(1, 2, 3, 4);
        assert_eq!(color.to_hex().parse::<Color>(), Ok(color));
        assert_eq!(Color::RED.to_string(), "#ff0000");
    }
}
