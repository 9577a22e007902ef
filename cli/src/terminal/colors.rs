use colored::Color;

pub const PRIMARY: Color = Color::TrueColor { r: 200, g: 196, b: 169 };
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::TrueColor { r: 128, g: 128, b: 128 };
pub const SUCCESS: Color = Color::TrueColor { r: 85, g: 170, b: 255 };
pub const ATTENTION: Color = Color::TrueColor { r: 255, g: 168, b: 96 };
pub const DISABLED: Color = Color::TrueColor { r: 255, g: 80, b: 80 };
pub const ACCENT: Color = Color::TrueColor { r: 85, g: 255, b: 127 };
