use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::foundation::error::{CheckergenError, CheckergenResult};
use crate::foundation::math::{decimal_fraction, reduce};

/// Absolute 0-based frame index within a rendering session.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawFps")]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> CheckergenResult<Self> {
        if den == 0 {
            return Err(CheckergenError::invalid_config("fps den must be > 0"));
        }
        if num == 0 {
            return Err(CheckergenError::invalid_config("fps must be > 0"));
        }
        let (n, d) = reduce(u128::from(num), u128::from(den));
        // Reducing never grows either term, so both still fit.
        Ok(Self {
            num: n as u32,
            den: d as u32,
        })
    }

    /// Build from a positive decimal such as `59.94`.
    pub fn from_decimal(d: Decimal) -> CheckergenResult<Self> {
        if d <= Decimal::ZERO {
            return Err(CheckergenError::invalid_config("fps must be > 0"));
        }
        let (num, den) = decimal_fraction(d)
            .ok_or_else(|| CheckergenError::invalid_config("fps out of range"))?;
        let (num, den) = reduce(num, den);
        match (u32::try_from(num), u32::try_from(den)) {
            (Ok(num), Ok(den)) => Self::new(num, den),
            _ => Err(CheckergenError::invalid_config(format!(
                "fps {d} has too much precision"
            ))),
        }
    }

    /// Exact decimal value when it terminates, otherwise rounded to decimal precision.
    pub fn as_decimal(self) -> Decimal {
        Decimal::from(self.num) / Decimal::from(self.den)
    }

    /// Wall-clock duration of one frame.
    pub fn frame_duration(self) -> Duration {
        Duration::from_secs(u64::from(self.den)) / self.num
    }
}

#[derive(serde::Deserialize)]
struct RawFps {
    num: u32,
    den: u32,
}

impl TryFrom<RawFps> for Fps {
    type Error = CheckergenError;

    fn try_from(raw: RawFps) -> Result<Self, Self::Error> {
        Self::new(raw.num, raw.den)
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 60, den: 1 }
    }
}

impl fmt::Display for Fps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            return write!(f, "{}", self.num);
        }
        // Terminates in base 10 iff den has no prime factors besides 2 and 5.
        let mut rest = self.den;
        while rest % 2 == 0 {
            rest /= 2;
        }
        while rest % 5 == 0 {
            rest /= 5;
        }
        if rest == 1 {
            write!(f, "{}", self.as_decimal().normalize())
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl FromStr for Fps {
    type Err = CheckergenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some((num, den)) = s.split_once('/') {
            let num = num
                .trim()
                .parse::<u32>()
                .map_err(|_| CheckergenError::invalid_config(format!("invalid fps \"{s}\"")))?;
            let den = den
                .trim()
                .parse::<u32>()
                .map_err(|_| CheckergenError::invalid_config(format!("invalid fps \"{s}\"")))?;
            return Self::new(num, den);
        }
        let d = s
            .parse::<Decimal>()
            .map_err(|_| CheckergenError::invalid_config(format!("invalid fps \"{s}\"")))?;
        Self::from_decimal(d)
    }
}

/// Output surface dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawResolution")]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Resolution {
    /// Create a validated resolution.
    pub fn new(width: u32, height: u32) -> CheckergenResult<Self> {
        if width == 0 || height == 0 {
            return Err(CheckergenError::invalid_config(
                "resolution width/height must be > 0",
            ));
        }
        Ok(Self { width, height })
    }
}

#[derive(serde::Deserialize)]
struct RawResolution {
    width: u32,
    height: u32,
}

impl TryFrom<RawResolution> for Resolution {
    type Error = CheckergenError;

    fn try_from(raw: RawResolution) -> Result<Self, Self::Error> {
        Self::new(raw.width, raw.height)
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.width, self.height)
    }
}

/// Opaque RGB8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Build a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Mid gray, the default project background.
    pub const GRAY: Self = Self::new(127, 127, 127);
    /// Black.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// White.
    pub const WHITE: Self = Self::new(255, 255, 255);
}

const NAMED_COLORS: &[(&str, Rgb8)] = &[
    ("black", Rgb8::BLACK),
    ("white", Rgb8::WHITE),
    ("gray", Rgb8::GRAY),
    ("grey", Rgb8::GRAY),
    ("red", Rgb8::new(255, 0, 0)),
    ("green", Rgb8::new(0, 255, 0)),
    ("blue", Rgb8::new(0, 0, 255)),
    ("yellow", Rgb8::new(255, 255, 0)),
    ("cyan", Rgb8::new(0, 255, 255)),
    ("magenta", Rgb8::new(255, 0, 255)),
];

impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{};{}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb8 {
    type Err = CheckergenError;

    /// Accepts `R;G;B`, `R,G,B`, `#RRGGBB` or a color name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let bad = || CheckergenError::invalid_config(format!("invalid color \"{s}\""));

        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(bad());
            }
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| bad());
            return Ok(Self::new(byte(0)?, byte(2)?, byte(4)?));
        }

        let lower = s.to_ascii_lowercase();
        if let Some((_, c)) = NAMED_COLORS.iter().find(|(name, _)| *name == lower) {
            return Ok(*c);
        }

        let parts = s
            .split([';', ','])
            .map(|p| p.trim().parse::<u8>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| bad())?;
        match parts.as_slice() {
            [r, g, b] => Ok(Self::new(*r, *g, *b)),
            _ => Err(bad()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
