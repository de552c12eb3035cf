//! The fixed palette of named primary colors.

use serde::{Deserialize, Serialize};

/// A named palette color.
///
/// Variant order matches [`PALETTE`] order, so `Ord` sorts colors the same way
/// the classifier iterates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrimaryColor {
    Red,
    Green,
    Blue,
    Yellow,
    Cyan,
    Magenta,
    Orange,
    Purple,
    Pink,
    Brown,
    Gray,
    Black,
    White,
    DarkRed,
    DarkGreen,
    DarkBlue,
    LightRed,
    LightGreen,
    LightBlue,
    LightYellow,
    LightCyan,
    LightMagenta,
    Beige,
    Olive,
    Teal,
}

/// Number of palette colors.
pub const PALETTE_SIZE: usize = 25;

/// Reference RGB triple for every palette color, in classification order.
///
/// Nearest-color ties go to the entry that appears first here.
pub const PALETTE: [(PrimaryColor, [u8; 3]); PALETTE_SIZE] = [
    (PrimaryColor::Red, [255, 0, 0]),
    (PrimaryColor::Green, [0, 255, 0]),
    (PrimaryColor::Blue, [0, 0, 255]),
    (PrimaryColor::Yellow, [255, 255, 0]),
    (PrimaryColor::Cyan, [0, 255, 255]),
    (PrimaryColor::Magenta, [255, 0, 255]),
    (PrimaryColor::Orange, [255, 165, 0]),
    (PrimaryColor::Purple, [128, 0, 128]),
    (PrimaryColor::Pink, [255, 192, 203]),
    (PrimaryColor::Brown, [139, 69, 19]),
    (PrimaryColor::Gray, [128, 128, 128]),
    (PrimaryColor::Black, [0, 0, 0]),
    (PrimaryColor::White, [255, 255, 255]),
    (PrimaryColor::DarkRed, [139, 0, 0]),
    (PrimaryColor::DarkGreen, [0, 100, 0]),
    (PrimaryColor::DarkBlue, [0, 0, 139]),
    (PrimaryColor::LightRed, [255, 182, 193]),
    (PrimaryColor::LightGreen, [144, 238, 144]),
    (PrimaryColor::LightBlue, [173, 216, 230]),
    (PrimaryColor::LightYellow, [255, 255, 224]),
    (PrimaryColor::LightCyan, [224, 255, 255]),
    (PrimaryColor::LightMagenta, [255, 224, 255]),
    (PrimaryColor::Beige, [245, 245, 220]),
    (PrimaryColor::Olive, [128, 128, 0]),
    (PrimaryColor::Teal, [0, 128, 128]),
];

impl PrimaryColor {
    /// Position of this color in [`PALETTE`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Reference RGB triple for this color.
    pub fn rgb(self) -> [u8; 3] {
        PALETTE[self.index()].1
    }

    /// Display name, e.g. "LightBlue".
    pub fn name(self) -> &'static str {
        match self {
            PrimaryColor::Red => "Red",
            PrimaryColor::Green => "Green",
            PrimaryColor::Blue => "Blue",
            PrimaryColor::Yellow => "Yellow",
            PrimaryColor::Cyan => "Cyan",
            PrimaryColor::Magenta => "Magenta",
            PrimaryColor::Orange => "Orange",
            PrimaryColor::Purple => "Purple",
            PrimaryColor::Pink => "Pink",
            PrimaryColor::Brown => "Brown",
            PrimaryColor::Gray => "Gray",
            PrimaryColor::Black => "Black",
            PrimaryColor::White => "White",
            PrimaryColor::DarkRed => "DarkRed",
            PrimaryColor::DarkGreen => "DarkGreen",
            PrimaryColor::DarkBlue => "DarkBlue",
            PrimaryColor::LightRed => "LightRed",
            PrimaryColor::LightGreen => "LightGreen",
            PrimaryColor::LightBlue => "LightBlue",
            PrimaryColor::LightYellow => "LightYellow",
            PrimaryColor::LightCyan => "LightCyan",
            PrimaryColor::LightMagenta => "LightMagenta",
            PrimaryColor::Beige => "Beige",
            PrimaryColor::Olive => "Olive",
            PrimaryColor::Teal => "Teal",
        }
    }
}

impl std::fmt::Display for PrimaryColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
