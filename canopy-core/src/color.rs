//! RGB colours with channels in `[0, 1]`

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Linear RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    pub const RED: Color = Color::new(1.0, 0.0, 0.0);
    pub const YELLOW: Color = Color::new(1.0, 1.0, 0.0);

    /// Create a colour from its channels
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create a gray colour with all channels set to `value`
    pub const fn gray(value: f32) -> Self {
        Self::new(value, value, value)
    }

    /// Create a colour from a `0xRRGGBB` value
    pub fn from_hex(hex: u32) -> Self {
        Self::new(
            ((hex >> 16) & 0xff) as f32 / 255.0,
            ((hex >> 8) & 0xff) as f32 / 255.0,
            (hex & 0xff) as f32 / 255.0,
        )
    }

    /// Pack into a `0xRRGGBB` value, rounding each channel
    pub fn to_hex(&self) -> u32 {
        let c = self.clamped();
        let channel = |v: f32| (v * 255.0).round() as u32;
        (channel(c.r) << 16) | (channel(c.g) << 8) | channel(c.b)
    }

    /// Multiply every channel by `factor`
    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor)
    }

    /// Multiply each channel by its own factor
    pub fn tinted(self, r: f32, g: f32, b: f32) -> Self {
        Self::new(self.r * r, self.g * g, self.b * b)
    }

    /// Clamp every channel into `[0, 1]`. NaN channels become 0.
    pub fn clamped(self) -> Self {
        let clamp = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        Self::new(clamp(self.r), clamp(self.g), clamp(self.b))
    }

    /// Whether every channel lies in `[0, 1]`
    pub fn is_normalized(&self) -> bool {
        [self.r, self.g, self.b]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }

    /// Relative luminance (Rec. 709 weights); equals the channel value for grays
    pub fn luminance(&self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[f32; 3]> for Color {
    fn from(c: [f32; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

/// Serde adapter storing a colour as a `"#RRGGBB"` string
pub mod hex {
    use super::Color;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(color: &Color, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("#{:06X}", color.to_hex()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
        let text = String::deserialize(deserializer)?;
        let digits = text.trim_start_matches('#').trim_start_matches("0x");
        if digits.len() != 6 {
            return Err(de::Error::custom(format!("expected 6 hex digits, got {:?}", text)));
        }
        u32::from_str_radix(digits, 16)
            .map(Color::from_hex)
            .map_err(|e| de::Error::custom(format!("invalid colour {:?}: {}", text, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_hex() {
        let brown = Color::from_hex(0x8B4513);
        assert_relative_eq!(brown.r, 139.0 / 255.0);
        assert_relative_eq!(brown.g, 69.0 / 255.0);
        assert_relative_eq!(brown.b, 19.0 / 255.0);
        assert_eq!(brown.to_hex(), 0x8B4513);
    }

    #[test]
    fn test_clamped() {
        let c = Color::new(1.4, -0.2, f32::NAN).clamped();
        assert_eq!(c, Color::new(1.0, 0.0, 0.0));
        assert!(c.is_normalized());
    }

    #[test]
    fn test_gray_luminance() {
        assert_relative_eq!(Color::gray(0.25).luminance(), 0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_hex_serde() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            #[serde(with = "hex")]
            color: Color,
        }

        let parsed: Wrapper = serde_json::from_str(r##"{"color":"#2E8B57"}"##).unwrap();
        assert_eq!(parsed.color.to_hex(), 0x2E8B57);

        let text = serde_json::to_string(&parsed).unwrap();
        assert_eq!(text, r##"{"color":"#2E8B57"}"##);

        assert!(serde_json::from_str::<Wrapper>(r#"{"color":"green"}"#).is_err());
    }
}
