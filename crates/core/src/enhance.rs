//! Deterministic rule-based prompt enhancement.
//!
//! This is the fallback path behind the AI-backed enhancer: it runs when no
//! backend is configured and when a backend call fails, and both paths call
//! this one function, so the output is identical either way.

use serde::{Deserialize, Serialize};

use crate::style::StylePreset;

/// Generic quality terms; the first three are always appended.
pub const QUALITY_TERMS: [&str; 5] = [
    "highly detailed",
    "professional quality",
    "sharp focus",
    "elegant composition",
    "masterful lighting",
];

/// How many generic quality terms to append.
const GENERIC_TERM_COUNT: usize = 3;
/// How many style-specific terms to append.
const STYLE_TERM_COUNT: usize = 2;
/// How many leading prompt words become tags.
const TAG_WORD_COUNT: usize = 3;

/// Result of enhancing a prompt, from either the AI or the rule-based path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancedPrompt {
    pub original: String,
    pub enhanced: String,
    pub variations: Vec<String>,
    pub tags: Vec<String>,
}

/// Enhance a prompt with fixed term tables and templates.
///
/// Appends the first three generic quality terms plus up to two
/// style-specific terms, synthesizes three fixed-template variations, and
/// derives tags from the style slug plus the first three lowercased words
/// of the prompt. Pure and deterministic.
pub fn rule_based_enhance(prompt: &str, style: Option<StylePreset>) -> EnhancedPrompt {
    let mut terms: Vec<&str> = QUALITY_TERMS[..GENERIC_TERM_COUNT].to_vec();
    if let Some(style) = style {
        terms.extend(style.enhancement_terms().iter().take(STYLE_TERM_COUNT));
    }

    let enhanced = format!("{prompt}, {}", terms.join(", "));

    let variations = vec![
        format!("{prompt}, cinematic lighting, ultra-detailed, 8K resolution"),
        format!("{prompt}, dreamy atmosphere, soft colors, artistic composition"),
        format!("{prompt}, bold contrast, dramatic perspective, award-winning"),
    ];

    let mut tags: Vec<String> = vec![
        style.map(|s| s.slug().to_string()).unwrap_or_else(|| "general".to_string()),
        "ai-generated".to_string(),
    ];
    tags.extend(
        prompt
            .split_whitespace()
            .take(TAG_WORD_COUNT)
            .map(|w| w.to_lowercase()),
    );

    EnhancedPrompt {
        original: prompt.to_string(),
        enhanced,
        variations,
        tags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_identical_input() {
        let a = rule_based_enhance("a cat", Some(StylePreset::Anime));
        let b = rule_based_enhance("a cat", Some(StylePreset::Anime));
        assert_eq!(a, b);
    }

    #[test]
    fn appends_generic_and_style_terms() {
        let result = rule_based_enhance("a cat", Some(StylePreset::Anime));
        assert_eq!(
            result.enhanced,
            "a cat, highly detailed, professional quality, sharp focus, \
             beautiful anime art, detailed eyes"
        );
    }

    #[test]
    fn no_style_appends_generic_terms_only() {
        let result = rule_based_enhance("a cat", None);
        assert_eq!(
            result.enhanced,
            "a cat, highly detailed, professional quality, sharp focus"
        );
        assert_eq!(result.tags[0], "general");
    }

    #[test]
    fn always_three_variations() {
        let result = rule_based_enhance("a castle", Some(StylePreset::Fantasy));
        assert_eq!(result.variations.len(), 3);
        for variation in &result.variations {
            assert!(variation.starts_with("a castle, "));
        }
    }

    #[test]
    fn tags_include_style_and_first_words() {
        let result = rule_based_enhance("A Red Fox in snow", Some(StylePreset::Anime));
        assert_eq!(
            result.tags,
            vec!["anime", "ai-generated", "a", "red", "fox"]
        );
    }

    #[test]
    fn style_without_terms_appends_generics_only() {
        let result = rule_based_enhance("a hero", Some(StylePreset::ComicBook));
        assert_eq!(
            result.enhanced,
            "a hero, highly detailed, professional quality, sharp focus"
        );
    }
}
