//! Style presets and their fixed prompt tables.
//!
//! The preset set is closed: providers and the enhancer key their lookup
//! tables off this enum, so an unknown style cannot reach them.

use serde::{Deserialize, Serialize};

/// The twelve supported artistic styles.
///
/// Serialized in kebab-case (`"oil-painting"`, `"3d-render"`), matching
/// the public API contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StylePreset {
    Photorealistic,
    DigitalArt,
    Anime,
    OilPainting,
    Watercolor,
    #[serde(rename = "3d-render")]
    ThreeDRender,
    PixelArt,
    ComicBook,
    Cinematic,
    Fantasy,
    Abstract,
    Minimalist,
}

impl StylePreset {
    /// All presets, in display order.
    pub const ALL: [StylePreset; 12] = [
        StylePreset::Photorealistic,
        StylePreset::DigitalArt,
        StylePreset::Anime,
        StylePreset::OilPainting,
        StylePreset::Watercolor,
        StylePreset::ThreeDRender,
        StylePreset::PixelArt,
        StylePreset::ComicBook,
        StylePreset::Cinematic,
        StylePreset::Fantasy,
        StylePreset::Abstract,
        StylePreset::Minimalist,
    ];

    /// The kebab-case slug used in the API, storage tags, and enhancer tags.
    pub fn slug(self) -> &'static str {
        match self {
            StylePreset::Photorealistic => "photorealistic",
            StylePreset::DigitalArt => "digital-art",
            StylePreset::Anime => "anime",
            StylePreset::OilPainting => "oil-painting",
            StylePreset::Watercolor => "watercolor",
            StylePreset::ThreeDRender => "3d-render",
            StylePreset::PixelArt => "pixel-art",
            StylePreset::ComicBook => "comic-book",
            StylePreset::Cinematic => "cinematic",
            StylePreset::Fantasy => "fantasy",
            StylePreset::Abstract => "abstract",
            StylePreset::Minimalist => "minimalist",
        }
    }

    /// Descriptive phrase prepended to the user prompt before it is sent
    /// to any provider. Includes the trailing separator.
    pub fn prompt_prefix(self) -> &'static str {
        match self {
            StylePreset::Photorealistic => "Photorealistic photograph, highly detailed, ",
            StylePreset::DigitalArt => "Digital artwork, vibrant colors, ",
            StylePreset::Anime => "Anime style illustration, ",
            StylePreset::OilPainting => "Oil painting, textured brushstrokes, ",
            StylePreset::Watercolor => "Watercolor painting, soft edges, ",
            StylePreset::ThreeDRender => "3D rendered scene, octane render, ",
            StylePreset::PixelArt => "Pixel art style, retro gaming, ",
            StylePreset::ComicBook => "Comic book style, bold lines, ",
            StylePreset::Cinematic => "Cinematic shot, dramatic lighting, film grain, ",
            StylePreset::Fantasy => "Fantasy artwork, magical atmosphere, ",
            StylePreset::Abstract => "Abstract art, non-representational, ",
            StylePreset::Minimalist => "Minimalist design, clean lines, ",
        }
    }

    /// Style-specific quality terms used by the rule-based prompt enhancer.
    ///
    /// `ComicBook` has no entry in the enhancement table; it falls back to
    /// the generic quality terms only.
    pub fn enhancement_terms(self) -> &'static [&'static str] {
        match self {
            StylePreset::Photorealistic => {
                &["8K UHD", "DSLR quality", "natural lighting", "depth of field"]
            }
            StylePreset::DigitalArt => {
                &["vibrant colors", "detailed illustration", "trending on ArtStation"]
            }
            StylePreset::Anime => &["beautiful anime art", "detailed eyes", "studio quality"],
            StylePreset::OilPainting => &["impasto technique", "rich textures", "gallery quality"],
            StylePreset::Watercolor => &["soft washes", "delicate details", "flowing pigments"],
            StylePreset::ThreeDRender => {
                &["octane render", "ray tracing", "volumetric lighting", "8K"]
            }
            StylePreset::PixelArt => &["16-bit style", "retro palette", "clean pixels"],
            StylePreset::ComicBook => &[],
            StylePreset::Cinematic => {
                &["anamorphic lens", "film grain", "dramatic shadows", "35mm"]
            }
            StylePreset::Fantasy => &["magical atmosphere", "ethereal glow", "mythical"],
            StylePreset::Abstract => &["bold composition", "dynamic forms", "color theory"],
            StylePreset::Minimalist => &["clean design", "negative space", "geometric"],
        }
    }
}

/// Build the provider-facing prompt: style prefix followed by the user text.
pub fn styled_prompt(style: StylePreset, prompt: &str) -> String {
    format!("{}{prompt}", style.prompt_prefix())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_round_trip_through_serde() {
        for style in StylePreset::ALL {
            let json = serde_json::to_string(&style).unwrap();
            assert_eq!(json, format!("\"{}\"", style.slug()));
            let back: StylePreset = serde_json::from_str(&json).unwrap();
            assert_eq!(back, style);
        }
    }

    #[test]
    fn every_prefix_ends_with_separator() {
        for style in StylePreset::ALL {
            assert!(style.prompt_prefix().ends_with(", "));
        }
    }

    #[test]
    fn styled_prompt_prepends_prefix() {
        assert_eq!(
            styled_prompt(StylePreset::Anime, "a red fox in snow"),
            "Anime style illustration, a red fox in snow"
        );
    }

    #[test]
    fn comic_book_has_no_enhancement_terms() {
        assert!(StylePreset::ComicBook.enhancement_terms().is_empty());
    }
}
