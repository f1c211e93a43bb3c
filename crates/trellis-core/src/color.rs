/// Straight-alpha RGBA.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color(pub u8, pub u8, pub u8, pub u8);

impl Color {
    pub const BLACK: Color = Color(0, 0, 0, 255);
    pub const WHITE: Color = Color(255, 255, 255, 255);

    /// Packed `0xAARRGGBB`, the form colors take in the model.
    pub fn from_argb(argb: u32) -> Self {
        let [a, r, g, b] = argb.to_be_bytes();
        Color(r, g, b, a)
    }

    pub fn to_argb(self) -> u32 {
        u32::from_be_bytes([self.3, self.0, self.1, self.2])
    }

    /// `#RRGGBB` or `#AARRGGBB`; anything unparsable is opaque black.
    pub fn from_hex(hex: &str) -> Self {
        let digits = hex.trim_start_matches('#');
        match (digits.len(), u32::from_str_radix(digits, 16)) {
            (6, Ok(rgb)) => Color::from_argb(0xFF00_0000 | rgb),
            (8, Ok(argb)) => Color::from_argb(argb),
            _ => Color::BLACK,
        }
    }
}
