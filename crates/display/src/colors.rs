use hostmon_core::Tier;

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const GREEN:  Self = Self::rgb(0x00, 0x80, 0x00);
    pub const ORANGE: Self = Self::rgb(0xff, 0xa5, 0x00);
    pub const RED:    Self = Self::rgb(0xff, 0x00, 0x00);
    pub const GRAY:   Self = Self::rgb(0x80, 0x80, 0x80);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<Color> for crossterm::style::Color {
    fn from(c: Color) -> Self {
        Self::Rgb { r: c.r, g: c.g, b: c.b }
    }
}

/// Palette for the three urgency tiers plus the neutral one.
pub fn tier_color(tier: Tier) -> Color {
    match tier {
        Tier::Healthy  => Color::GREEN,
        Tier::Warning  => Color::ORANGE,
        Tier::Critical => Color::RED,
        Tier::Unknown  => Color::GRAY,
    }
}
