//! Color gradients
//!
//! A gradient is an ordered list of color stops positioned in `0.0..=1.0`.
//! Fades interpolate along a gradient over time, the `[c:g]` format command
//! spreads one across a run of glyphs.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{Error, Result};

/// A single color stop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub color: Color,
    /// Position of the stop, 0.0 at the start of the gradient and 1.0 at the end
    pub stop: f32,
}

/// Color gradient made of two or more stops
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGradient")]
pub struct ColorGradient {
    stops: Vec<GradientStop>,
}

/// Unchecked stops as they appear in saved state
#[derive(Deserialize)]
struct RawGradient {
    stops: Vec<GradientStop>,
}

impl TryFrom<RawGradient> for ColorGradient {
    type Error = Error;

    fn try_from(raw: RawGradient) -> Result<Self> {
        Self::from_stops(raw.stops)
    }
}

impl ColorGradient {
    /// Create a gradient with evenly spaced stops.
    ///
    /// A single color is duplicated so the gradient is a solid color.
    pub fn new(colors: &[Color]) -> Result<Self> {
        match colors {
            [] => Err(Error::InvalidGradient(
                "at least one color is required".to_string(),
            )),
            [only] => Ok(Self::between(*only, *only)),
            _ => {
                let step = 1.0 / (colors.len() - 1) as f32;
                let stops = colors
                    .iter()
                    .enumerate()
                    .map(|(i, &color)| GradientStop {
                        color,
                        stop: i as f32 * step,
                    })
                    .collect();
                Ok(Self { stops })
            }
        }
    }

    /// Create a two stop gradient
    pub fn between(start: Color, end: Color) -> Self {
        Self {
            stops: vec![
                GradientStop {
                    color: start,
                    stop: 0.0,
                },
                GradientStop {
                    color: end,
                    stop: 1.0,
                },
            ],
        }
    }

    /// Create a gradient from explicit stops; stops are sorted by position
    pub fn with_stops(colors: &[Color], stops: &[f32]) -> Result<Self> {
        if colors.len() != stops.len() {
            return Err(Error::InvalidGradient(format!(
                "{} colors but {} stops",
                colors.len(),
                stops.len()
            )));
        }
        let stops = colors
            .iter()
            .zip(stops)
            .map(|(&color, &stop)| GradientStop { color, stop })
            .collect();
        Self::from_stops(stops)
    }

    /// Clamp positions into 0..=1 and order the stops; non-finite positions
    /// are rejected
    fn from_stops(mut stops: Vec<GradientStop>) -> Result<Self> {
        if stops.is_empty() {
            return Err(Error::InvalidGradient(
                "at least one stop is required".to_string(),
            ));
        }
        for stop in &mut stops {
            if !stop.stop.is_finite() {
                return Err(Error::InvalidGradient(format!(
                    "stop position {} is not a number",
                    stop.stop
                )));
            }
            stop.stop = stop.stop.clamp(0.0, 1.0);
        }
        stops.sort_by(|a, b| a.stop.total_cmp(&b.stop));
        Ok(Self { stops })
    }

    /// The gradient stops, ordered by position
    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// First color of the gradient
    pub fn first(&self) -> Color {
        self.stops.first().map(|s| s.color).unwrap_or_default()
    }

    /// Last color of the gradient
    pub fn last(&self) -> Color {
        self.stops.last().map(|s| s.color).unwrap_or_default()
    }

    /// Color at `amount` (clamped to 0..=1)
    pub fn lerp(&self, amount: f32) -> Color {
        self.sample(amount, |i| self.stops[i].color)
    }

    /// Color at `amount` with the color of one stop replaced.
    ///
    /// Used by fades that start (or end) on the cell's own color without
    /// rewriting the shared gradient.
    pub fn lerp_replacing(&self, amount: f32, stop_index: usize, color: Color) -> Color {
        self.sample(amount, |i| {
            if i == stop_index {
                color
            } else {
                self.stops[i].color
            }
        })
    }

    /// Spread the gradient across `count` evenly spaced samples
    pub fn to_color_array(&self, count: usize) -> Vec<Color> {
        match count {
            0 => Vec::new(),
            1 => vec![self.first()],
            _ => (0..count)
                .map(|i| self.lerp(i as f32 / (count - 1) as f32))
                .collect(),
        }
    }

    fn sample(&self, amount: f32, color_of: impl Fn(usize) -> Color) -> Color {
        let len = self.stops.len();
        if len == 0 {
            return Color::default();
        }

        let amount = amount.clamp(0.0, 1.0);
        if len == 1 || amount <= self.stops[0].stop {
            return color_of(0);
        }
        if amount >= self.stops[len - 1].stop {
            return color_of(len - 1);
        }

        // Find the segment containing amount
        let upper = self
            .stops
            .iter()
            .position(|s| s.stop >= amount)
            .unwrap_or(len - 1)
            .max(1);
        let lower = upper - 1;

        let span = self.stops[upper].stop - self.stops[lower].stop;
        let t = if span <= f32::EPSILON {
            1.0
        } else {
            (amount - self.stops[lower].stop) / span
        };

        Color::lerp(color_of(lower), color_of(upper), t)
    }
}

impl From<Color> for ColorGradient {
    fn from(color: Color) -> Self {
        ColorGradient::between(color, color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_requires_a_color() {
        assert!(ColorGradient::new(&[]).is_err());
    }

    #[test]
    fn test_single_color_is_solid() {
        let gradient = ColorGradient::new(&[Color::RED]).unwrap();
        assert_eq!(gradient.stops().len(), 2);
        assert_eq!(gradient.lerp(0.0), Color::RED);
        assert_eq!(gradient.lerp(0.7), Color::RED);
    }

    #[test]
    fn test_lerp_three_stops() {
        let gradient = ColorGradient::new(&[Color::BLACK, Color::WHITE, Color::BLACK]).unwrap();
        assert_eq!(gradient.lerp(0.0), Color::BLACK);
        assert_eq!(gradient.lerp(0.5), Color::WHITE);
        assert_eq!(gradient.lerp(1.0), Color::BLACK);
        assert_eq!(gradient.lerp(0.25), Color::rgb(128, 128, 128));
    }

    #[test]
    fn test_lerp_replacing_start() {
        let gradient = ColorGradient::between(Color::TRANSPARENT, Color::WHITE);
        assert_eq!(gradient.lerp_replacing(0.0, 0, Color::RED), Color::RED);
        assert_eq!(gradient.lerp_replacing(1.0, 0, Color::RED), Color::WHITE);
        // Shared gradient is untouched
        assert_eq!(gradient.first(), Color::TRANSPARENT);
    }

    #[test]
    fn test_with_stops_mismatch() {
        assert!(ColorGradient::with_stops(&[Color::RED], &[0.0, 1.0]).is_err());
        let gradient =
            ColorGradient::with_stops(&[Color::WHITE, Color::BLACK], &[1.0, 0.0]).unwrap();
        assert_eq!(gradient.first(), Color::BLACK);
    }

    #[test]
    fn test_deserialize_sorts_and_clamps() {
        let json = r#"{"stops":[
            {"color":{"r":255,"g":255,"b":255,"a":255},"stop":1.5},
            {"color":{"r":0,"g":0,"b":0,"a":255},"stop":-0.5}
        ]}"#;
        let gradient: ColorGradient = serde_json::from_str(json).unwrap();
        assert_eq!(gradient.stops()[0].stop, 0.0);
        assert_eq!(gradient.stops()[1].stop, 1.0);
        assert_eq!(gradient.first(), Color::BLACK);
        assert_eq!(gradient.lerp(1.0), Color::WHITE);
    }

    #[test]
    fn test_deserialize_rejects_empty() {
        assert!(serde_json::from_str::<ColorGradient>(r#"{"stops":[]}"#).is_err());
    }

    #[test]
    fn test_to_color_array() {
        let gradient = ColorGradient::between(Color::BLACK, Color::WHITE);
        let colors = gradient.to_color_array(3);
        assert_eq!(
            colors,
            vec![Color::BLACK, Color::rgb(128, 128, 128), Color::WHITE]
        );
        assert!(gradient.to_color_array(0).is_empty());
        assert_eq!(gradient.to_color_array(1), vec![Color::BLACK]);
    }
}
