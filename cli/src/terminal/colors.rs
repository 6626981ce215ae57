use colored::Color;

pub const PRIMARY: Color = Color::BrightGreen;
pub const ACCENT: Color = Color::BrightYellow;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;

pub const IPV4_ADDR: Color = Color::BrightBlue;
pub const IPV6_ADDR: Color = Color::BrightCyan;

pub const OPEN: Color = Color::Green;
pub const CLOSED: Color = Color::Red;
pub const FILTERED: Color = Color::Yellow;
