//! Shared types used across all pipeline stages.
//!
//! A file moves through the pipeline as a [`FileRecord`] (catalog), gains a
//! [`VariantTag`] in [`naming`](crate::naming), and is slotted into a group by
//! [`group`](crate::group). These types are the common vocabulary of those
//! stages and of the run configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Image extensions recognized by the catalog. Matching is case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageExtension {
    Jpg,
    Jpeg,
    Png,
    Bmp,
    Tif,
    Tiff,
    Gif,
}

impl ImageExtension {
    pub const ALL: [ImageExtension; 7] = [
        ImageExtension::Jpg,
        ImageExtension::Jpeg,
        ImageExtension::Png,
        ImageExtension::Bmp,
        ImageExtension::Tif,
        ImageExtension::Tiff,
        ImageExtension::Gif,
    ];

    /// Parse an extension without the leading dot, ignoring ASCII case.
    ///
    /// - `"jpg"`, `"JPG"`, `"Jpg"` → `Some(Jpg)`
    /// - `"webp"` → `None`
    pub fn from_ext(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(ext))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ImageExtension::Jpg => "jpg",
            ImageExtension::Jpeg => "jpeg",
            ImageExtension::Png => "png",
            ImageExtension::Bmp => "bmp",
            ImageExtension::Tif => "tif",
            ImageExtension::Tiff => "tiff",
            ImageExtension::Gif => "gif",
        }
    }
}

impl fmt::Display for ImageExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single image file found in the source directory.
///
/// Only the filename is kept; the directory is known to the caller. The
/// extension text as written on disk (e.g. `JPG`) is recoverable through
/// [`FileRecord::ext_text`] so renames keep the original spelling.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FileRecord {
    pub filename: String,
    pub extension: ImageExtension,
}

impl FileRecord {
    /// Build a record from a bare filename. Returns `None` when the
    /// filename has no extension or the extension is not an image type.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        let extension = ImageExtension::from_ext(ext)?;
        Some(Self {
            filename: filename.to_string(),
            extension,
        })
    }

    /// Filename without the final `.ext`.
    pub fn stem(&self) -> &str {
        self.filename
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.filename)
    }

    /// Extension exactly as it appears in the filename.
    pub fn ext_text(&self) -> &str {
        self.filename
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or_else(|| self.extension.as_str())
    }
}

/// The role a file plays for its logical item.
///
/// Declaration order is the output order: `primary` first, then `mask`,
/// then `annotation`. `Unknown` is only ever produced by the parser for
/// names it cannot place; it never appears inside a group.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum VariantTag {
    Primary,
    Mask,
    Annotation,
    Unknown,
}

impl VariantTag {
    pub fn as_str(self) -> &'static str {
        match self {
            VariantTag::Primary => "primary",
            VariantTag::Mask => "mask",
            VariantTag::Annotation => "annotation",
            VariantTag::Unknown => "unknown",
        }
    }
}

impl FromStr for VariantTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" => Ok(VariantTag::Primary),
            "mask" => Ok(VariantTag::Mask),
            "annotation" => Ok(VariantTag::Annotation),
            other => Err(format!(
                "unknown variant tag '{other}' (expected primary, mask or annotation)"
            )),
        }
    }
}

impl fmt::Display for VariantTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_matching_ignores_case() {
        assert_eq!(ImageExtension::from_ext("JPG"), Some(ImageExtension::Jpg));
        assert_eq!(ImageExtension::from_ext("Tiff"), Some(ImageExtension::Tiff));
        assert_eq!(ImageExtension::from_ext("webp"), None);
        assert_eq!(ImageExtension::from_ext(""), None);
    }

    #[test]
    fn record_from_filename_keeps_original_spelling() {
        let rec = FileRecord::from_filename("S1_00042_mask.PNG").unwrap();
        assert_eq!(rec.extension, ImageExtension::Png);
        assert_eq!(rec.stem(), "S1_00042_mask");
        assert_eq!(rec.ext_text(), "PNG");
    }

    #[test]
    fn record_rejects_non_images() {
        assert!(FileRecord::from_filename("notes.txt").is_none());
        assert!(FileRecord::from_filename("README").is_none());
        assert!(FileRecord::from_filename("index.json").is_none());
    }

    #[test]
    fn record_uses_last_dot_for_extension() {
        let rec = FileRecord::from_filename("strip.01_5.tif").unwrap();
        assert_eq!(rec.stem(), "strip.01_5");
        assert_eq!(rec.extension, ImageExtension::Tif);
    }

    #[test]
    fn variant_tags_order_primary_first() {
        let mut tags = vec![VariantTag::Annotation, VariantTag::Mask, VariantTag::Primary];
        tags.sort();
        assert_eq!(
            tags,
            vec![VariantTag::Primary, VariantTag::Mask, VariantTag::Annotation]
        );
    }

    #[test]
    fn variant_tag_from_str() {
        assert_eq!("Mask".parse::<VariantTag>(), Ok(VariantTag::Mask));
        assert_eq!(" annotation".parse::<VariantTag>(), Ok(VariantTag::Annotation));
        assert!("unknown".parse::<VariantTag>().is_err());
        assert!("rgb".parse::<VariantTag>().is_err());
    }

    #[test]
    fn variant_tag_deserializes_lowercase() {
        let tag: VariantTag = serde_json::from_str("\"mask\"").unwrap();
        assert_eq!(tag, VariantTag::Mask);
    }
}
