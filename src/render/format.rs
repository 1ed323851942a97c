use std::fmt;
use std::str::FromStr;

use crate::foundation::error::CheckergenError;

/// Still image formats available for export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Windows bitmap.
    Bmp,
    /// Truevision TGA.
    Tga,
    /// JPEG.
    Jpg,
    /// PNG.
    #[default]
    Png,
}

impl ImageFormat {
    /// Every supported format.
    pub const ALL: [ImageFormat; 4] = [
        ImageFormat::Bmp,
        ImageFormat::Tga,
        ImageFormat::Jpg,
        ImageFormat::Png,
    ];

    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Bmp => "bmp",
            ImageFormat::Tga => "tga",
            ImageFormat::Jpg => "jpg",
            ImageFormat::Png => "png",
        }
    }

    pub(crate) fn to_image_format(self) -> image::ImageFormat {
        match self {
            ImageFormat::Bmp => image::ImageFormat::Bmp,
            ImageFormat::Tga => image::ImageFormat::Tga,
            ImageFormat::Jpg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = CheckergenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ImageFormat::ALL
            .into_iter()
            .find(|f| f.extension() == s)
            .ok_or_else(|| {
                CheckergenError::format(format!(
                    "image format \"{s}\" not recognized or supported (choices: bmp, tga, jpg, png)"
                ))
            })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/format.rs"]
mod tests;
