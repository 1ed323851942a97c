use std::fmt;
use std::str::FromStr;

use crate::foundation::error::CheckergenError;

/// Named reference point of a board.
///
/// Each anchor maps to a per-axis direction flag. `+1` grows right/down from the anchor, `-1`
/// grows left/up (the anchor is the far corner of the grid), `0` centers the grid on the anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    /// Top left corner.
    TopLeft,
    /// Top right corner.
    TopRight,
    /// Bottom left corner.
    BtmLeft,
    /// Bottom right corner.
    BtmRight,
    /// Middle of the top edge.
    TopCenter,
    /// Middle of the bottom edge.
    BtmCenter,
    /// Middle of the left edge.
    CenterLeft,
    /// Middle of the right edge.
    CenterRight,
    /// Center of the grid.
    Center,
}

impl Anchor {
    /// Every anchor, in listing order.
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::TopRight,
        Anchor::BtmLeft,
        Anchor::BtmRight,
        Anchor::TopCenter,
        Anchor::BtmCenter,
        Anchor::CenterLeft,
        Anchor::CenterRight,
        Anchor::Center,
    ];

    /// Name used on the command line and in project files.
    pub fn name(self) -> &'static str {
        match self {
            Anchor::TopLeft => "topleft",
            Anchor::TopRight => "topright",
            Anchor::BtmLeft => "btmleft",
            Anchor::BtmRight => "btmright",
            Anchor::TopCenter => "topcenter",
            Anchor::BtmCenter => "btmcenter",
            Anchor::CenterLeft => "centerleft",
            Anchor::CenterRight => "centerright",
            Anchor::Center => "center",
        }
    }

    /// `(x, y)` direction flags, y pointing down.
    pub fn flags(self) -> [i8; 2] {
        match self {
            Anchor::TopLeft => [1, 1],
            Anchor::TopRight => [-1, 1],
            Anchor::BtmLeft => [1, -1],
            Anchor::BtmRight => [-1, -1],
            Anchor::TopCenter => [0, 1],
            Anchor::BtmCenter => [0, -1],
            Anchor::CenterLeft => [1, 0],
            Anchor::CenterRight => [-1, 0],
            Anchor::Center => [0, 0],
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Anchor {
    type Err = CheckergenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Anchor::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| {
                let names = Anchor::ALL.map(Anchor::name).join(", ");
                CheckergenError::invalid_config(format!(
                    "unknown origin \"{s}\" (choices: {names})"
                ))
            })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/board/anchor.rs"]
mod tests;
