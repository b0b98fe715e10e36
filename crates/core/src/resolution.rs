//! Output resolutions.
//!
//! A closed set of five `"WxH"` values. Serde uses the string form so the
//! API and the database `params` payload stay on the same representation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Supported output resolutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "512x512")]
    Square512,
    #[serde(rename = "768x768")]
    Square768,
    #[serde(rename = "1024x1024")]
    Square1024,
    #[serde(rename = "1024x1792")]
    Portrait,
    #[serde(rename = "1792x1024")]
    Landscape,
}

impl Resolution {
    /// All resolutions, in display order.
    pub const ALL: [Resolution; 5] = [
        Resolution::Square512,
        Resolution::Square768,
        Resolution::Square1024,
        Resolution::Portrait,
        Resolution::Landscape,
    ];

    /// Pixel dimensions as `(width, height)`.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Resolution::Square512 => (512, 512),
            Resolution::Square768 => (768, 768),
            Resolution::Square1024 => (1024, 1024),
            Resolution::Portrait => (1024, 1792),
            Resolution::Landscape => (1792, 1024),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = self.dimensions();
        write!(f, "{w}x{h}")
    }
}

impl FromStr for Resolution {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resolution::ALL
            .into_iter()
            .find(|r| r.to_string() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unsupported resolution '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_dimensions() {
        assert_eq!(Resolution::Square1024.to_string(), "1024x1024");
        assert_eq!(Resolution::Portrait.to_string(), "1024x1792");
    }

    #[test]
    fn from_str_round_trips() {
        for res in Resolution::ALL {
            assert_eq!(res.to_string().parse::<Resolution>().unwrap(), res);
        }
    }

    #[test]
    fn from_str_rejects_unknown() {
        assert!("640x480".parse::<Resolution>().is_err());
    }

    #[test]
    fn serde_uses_string_form() {
        let json = serde_json::to_string(&Resolution::Landscape).unwrap();
        assert_eq!(json, "\"1792x1024\"");
    }
}
