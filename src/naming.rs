//! Filename parsing for the strip naming convention.
//!
//! Every image of a strip belongs to a logical item, and each item may have
//! several files playing different roles. The role is encoded as a suffix on
//! the filename stem:
//!
//! - `S3_02858.jpg` → key `S3_02858`, primary image
//! - `S3_02858_mask.png` → key `S3_02858`, mask
//! - `S3_02858_AN.jpg` → key `S3_02858`, annotation
//!
//! Suffixes and extensions match case-insensitively. A suffix match always
//! wins over the primary interpretation, so a mask is never also counted as
//! a primary image. Names that fit no pattern come back as
//! [`VariantTag::Unknown`] and are left for the caller to report.
//!
//! ## Numeric Fields
//!
//! Logical keys usually carry the image number as one of their
//! delimiter-separated fields (`S3_02858` → field 1 is `02858`).
//! [`numeric_field`] extracts it for ID assignment and gap analysis.

use crate::config::NamingConfig;
use crate::types::{FileRecord, ImageExtension, VariantTag};

/// Result of parsing one filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    /// Filename exactly as listed.
    pub filename: String,
    /// Recognized image extension, if any.
    pub extension: Option<ImageExtension>,
    /// Stem with the variant suffix removed. Empty for unknown names.
    pub logical_key: String,
    pub tag: VariantTag,
}

impl ParsedName {
    fn unknown(filename: &str, extension: Option<ImageExtension>) -> Self {
        Self {
            filename: filename.to_string(),
            extension,
            logical_key: String::new(),
            tag: VariantTag::Unknown,
        }
    }

    pub fn is_recognized(&self) -> bool {
        self.tag != VariantTag::Unknown
    }

    /// The file record behind this name. `None` for unknown names.
    pub fn record(&self) -> Option<FileRecord> {
        if !self.is_recognized() {
            return None;
        }
        self.extension.map(|extension| FileRecord {
            filename: self.filename.clone(),
            extension,
        })
    }
}

/// Suffix table driven parser.
///
/// Suffixes are stored lowercased and tried longest first, so `_an_mask`
/// would beat `_mask` if both were configured.
#[derive(Debug, Clone)]
pub struct NameParser {
    suffixes: Vec<(String, VariantTag)>,
}

impl Default for NameParser {
    fn default() -> Self {
        Self::from_config(&NamingConfig::default())
    }
}

impl NameParser {
    pub fn new(mask_suffixes: &[String], annotation_suffixes: &[String]) -> Self {
        let mut suffixes: Vec<(String, VariantTag)> = mask_suffixes
            .iter()
            .map(|s| (s.to_ascii_lowercase(), VariantTag::Mask))
            .chain(
                annotation_suffixes
                    .iter()
                    .map(|s| (s.to_ascii_lowercase(), VariantTag::Annotation)),
            )
            .filter(|(s, _)| !s.is_empty())
            .collect();
        suffixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        Self { suffixes }
    }

    pub fn from_config(config: &NamingConfig) -> Self {
        Self::new(&config.mask_suffixes, &config.annotation_suffixes)
    }

    /// Parse a filename into its logical key and variant tag.
    ///
    /// - `"A_1.jpg"` → key `A_1`, primary
    /// - `"A_1_mask.JPG"` → key `A_1`, mask
    /// - `"A_1_Mask.png"` → key `A_1`, mask
    /// - `"A_1_an.png"` → key `A_1`, annotation
    /// - `"_mask.png"` → unknown (nothing left once the suffix is removed)
    /// - `".jpg"`, `".A_1.jpg"` → unknown (empty or hidden stem)
    /// - `"notes.txt"` → unknown (not an image extension)
    pub fn parse(&self, filename: &str) -> ParsedName {
        let Some((stem, ext)) = filename.rsplit_once('.') else {
            return ParsedName::unknown(filename, None);
        };
        let Some(extension) = ImageExtension::from_ext(ext) else {
            return ParsedName::unknown(filename, None);
        };
        if stem.is_empty() || stem.starts_with('.') {
            return ParsedName::unknown(filename, Some(extension));
        }

        let folded = stem.to_ascii_lowercase();
        for (suffix, tag) in &self.suffixes {
            if !folded.ends_with(suffix.as_str()) {
                continue;
            }
            return match stem.get(..stem.len() - suffix.len()) {
                Some(key) if !key.is_empty() => ParsedName {
                    filename: filename.to_string(),
                    extension: Some(extension),
                    logical_key: key.to_string(),
                    tag: *tag,
                },
                _ => ParsedName::unknown(filename, Some(extension)),
            };
        }

        ParsedName {
            filename: filename.to_string(),
            extension: Some(extension),
            logical_key: stem.to_string(),
            tag: VariantTag::Primary,
        }
    }

    pub fn parse_all<'a, I>(&self, filenames: I) -> Vec<ParsedName>
    where
        I: IntoIterator<Item = &'a str>,
    {
        filenames.into_iter().map(|f| self.parse(f)).collect()
    }

    /// First configured suffix for a tag, as written in the config.
    ///
    /// Used to build rename targets (`{id}_mask.png`).
    pub fn canonical_suffix<'a>(config: &'a NamingConfig, tag: VariantTag) -> &'a str {
        let list = match tag {
            VariantTag::Mask => &config.mask_suffixes,
            VariantTag::Annotation => &config.annotation_suffixes,
            VariantTag::Primary | VariantTag::Unknown => return "",
        };
        list.first().map(String::as_str).unwrap_or("")
    }
}

/// Extract a delimiter-separated field that is entirely ASCII digits.
///
/// Returns the field text (leading zeros intact) and its numeric value.
///
/// - `("S3_02858", "_", 1)` → `Some(("02858", 2858))`
/// - `("S3_02858", "_", 2)` → `None` (no such field)
/// - `("S3_a12", "_", 1)` → `None` (not numeric)
pub fn numeric_field<'a>(key: &'a str, delimiter: &str, field: usize) -> Option<(&'a str, u64)> {
    if delimiter.is_empty() {
        return None;
    }
    let text = key.split(delimiter).nth(field)?;
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value = text.parse::<u64>().ok()?;
    Some((text, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> NameParser {
        NameParser::default()
    }

    #[test]
    fn primary_without_suffix() {
        let p = parser().parse("S3_02858.jpg");
        assert_eq!(p.tag, VariantTag::Primary);
        assert_eq!(p.logical_key, "S3_02858");
        assert_eq!(p.extension, Some(ImageExtension::Jpg));
    }

    #[test]
    fn mask_suffix_stripped() {
        let p = parser().parse("S3_02858_mask.png");
        assert_eq!(p.tag, VariantTag::Mask);
        assert_eq!(p.logical_key, "S3_02858");
    }

    #[test]
    fn suffix_and_extension_case_insensitive() {
        let p = parser().parse("S3_02858_MASK.JPG");
        assert_eq!(p.tag, VariantTag::Mask);
        assert_eq!(p.logical_key, "S3_02858");
        assert_eq!(p.extension, Some(ImageExtension::Jpg));

        let p = parser().parse("img_7_AN.Jpeg");
        assert_eq!(p.tag, VariantTag::Annotation);
        assert_eq!(p.logical_key, "img_7");
    }

    #[test]
    fn key_keeps_original_case() {
        let p = parser().parse("Strip_A_Mask.png");
        assert_eq!(p.logical_key, "Strip_A");
    }

    #[test]
    fn mask_never_counted_as_primary() {
        // "_mask" would also satisfy the primary pattern; the suffix wins.
        let names = ["x_mask.png", "x_Mask.PNG", "x_an.jpg"];
        for name in names {
            let p = parser().parse(name);
            assert_ne!(p.tag, VariantTag::Primary, "{name} parsed as primary");
            assert_eq!(p.logical_key, "x");
        }
    }

    #[test]
    fn suffix_only_name_is_unknown() {
        let p = parser().parse("_mask.png");
        assert_eq!(p.tag, VariantTag::Unknown);
        assert!(p.record().is_none());
    }

    #[test]
    fn empty_stem_is_unknown() {
        let p = parser().parse(".jpg");
        assert_eq!(p.tag, VariantTag::Unknown);
    }

    #[test]
    fn hidden_name_is_unknown() {
        for name in [".B_2.jpg", ".B_2_mask.jpg", "._A_1.JPG"] {
            let p = parser().parse(name);
            assert_eq!(p.tag, VariantTag::Unknown, "{name}");
            assert_eq!(p.logical_key, "");
            assert_eq!(p.extension, Some(ImageExtension::Jpg));
        }
    }

    #[test]
    fn non_image_is_unknown() {
        let p = parser().parse("notes.txt");
        assert_eq!(p.tag, VariantTag::Unknown);
        assert_eq!(p.extension, None);
        let p = parser().parse("Makefile");
        assert_eq!(p.tag, VariantTag::Unknown);
    }

    #[test]
    fn suffix_must_be_at_end_of_stem() {
        let p = parser().parse("mask_01.png");
        assert_eq!(p.tag, VariantTag::Primary);
        assert_eq!(p.logical_key, "mask_01");
    }

    #[test]
    fn longest_suffix_wins() {
        let parser = NameParser::new(&["_mask".into(), "_an_mask".into()], &["_an".into()]);
        let p = parser.parse("k_an_mask.png");
        assert_eq!(p.tag, VariantTag::Mask);
        assert_eq!(p.logical_key, "k");
    }

    #[test]
    fn custom_suffixes() {
        let parser = NameParser::new(&["-m".into()], &["-label".into()]);
        assert_eq!(parser.parse("a-m.png").tag, VariantTag::Mask);
        assert_eq!(parser.parse("a-LABEL.png").tag, VariantTag::Annotation);
        assert_eq!(parser.parse("a_mask.png").tag, VariantTag::Primary);
    }

    #[test]
    fn record_roundtrips_filename() {
        let p = parser().parse("S1_1_mask.TIF");
        let rec = p.record().unwrap();
        assert_eq!(rec.filename, "S1_1_mask.TIF");
        assert_eq!(rec.extension, ImageExtension::Tif);
    }

    #[test]
    fn canonical_suffix_is_first_configured() {
        let config = NamingConfig {
            mask_suffixes: vec!["_mask".into(), "_m".into()],
            annotation_suffixes: vec!["_AN".into()],
        };
        assert_eq!(NameParser::canonical_suffix(&config, VariantTag::Mask), "_mask");
        assert_eq!(NameParser::canonical_suffix(&config, VariantTag::Annotation), "_AN");
        assert_eq!(NameParser::canonical_suffix(&config, VariantTag::Primary), "");
    }

    // =========================================================================
    // Numeric field tests
    // =========================================================================

    #[test]
    fn numeric_field_keeps_leading_zeros() {
        assert_eq!(numeric_field("S3_02858", "_", 1), Some(("02858", 2858)));
    }

    #[test]
    fn numeric_field_missing_position() {
        assert_eq!(numeric_field("S3_02858", "_", 2), None);
        assert_eq!(numeric_field("S3", "_", 1), None);
    }

    #[test]
    fn numeric_field_rejects_non_digits() {
        assert_eq!(numeric_field("S3_a12", "_", 1), None);
        assert_eq!(numeric_field("S3_-12", "_", 1), None);
        assert_eq!(numeric_field("S3__x", "_", 1), None);
    }

    #[test]
    fn numeric_field_first_position() {
        assert_eq!(numeric_field("10_left", "_", 0), Some(("10", 10)));
    }

    #[test]
    fn numeric_field_multichar_delimiter() {
        assert_eq!(numeric_field("a--7--b", "--", 1), Some(("7", 7)));
    }

    #[test]
    fn numeric_field_empty_delimiter() {
        assert_eq!(numeric_field("123", "", 0), None);
    }
}
