//! Accent colors for session groups.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six fixed accent colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccentColor {
    Blue,
    Teal,
    Green,
    Orange,
    Coral,
    Amber,
}

/// Palette in assignment order.
pub const PALETTE: [AccentColor; 6] = [
    AccentColor::Blue,
    AccentColor::Teal,
    AccentColor::Green,
    AccentColor::Orange,
    AccentColor::Coral,
    AccentColor::Amber,
];

impl AccentColor {
    /// Lowercase color name.
    pub fn as_str(self) -> &'static str {
        match self {
            AccentColor::Blue => "blue",
            AccentColor::Teal => "teal",
            AccentColor::Green => "green",
            AccentColor::Orange => "orange",
            AccentColor::Coral => "coral",
            AccentColor::Amber => "amber",
        }
    }
}

impl fmt::Display for AccentColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Picks the color for a new session given the colors already used this week.
///
/// Returns the first palette entry not in `in_use`. Once every color is taken,
/// cycles through the palette by the number of sessions already present.
pub fn next_accent_color(in_use: &[AccentColor]) -> AccentColor {
    PALETTE
        .iter()
        .copied()
        .find(|color| !in_use.contains(color))
        .unwrap_or(PALETTE[in_use.len() % PALETTE.len()])
}
