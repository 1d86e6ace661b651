use serde::{Deserialize, Serialize};

use crate::challenge::Settings;
use crate::compositor::Fit;
use crate::error::{Error, Result};

pub const DEFAULT_WIDTH: f64 = 320.0;
pub const DEFAULT_HEIGHT: f64 = 160.0;
pub const DEFAULT_PIECE_SIZE: f64 = 44.0;
pub const DEFAULT_TOLERANCE: f64 = 6.0;
pub const DEFAULT_SUCCESS_TEXT: &str = "✅ Verified!";
pub const DEFAULT_FAIL_TEXT: &str = "❌ Try again!";
pub const PROMPT_TEXT: &str = "Slide to verify";

/// Widget extent: a fixed pixel count or any CSS length resolved by layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Pixels(f64),
    Css(String),
}

impl Dimension {
    /// Pixel value known without layout (`320` or `"320px"`).
    pub fn fixed(&self) -> Option<f64> {
        match self {
            Dimension::Pixels(v) => Some(*v),
            Dimension::Css(s) => {
                let s = s.trim();
                s.strip_suffix("px").unwrap_or(s).trim().parse::<f64>().ok()
            }
        }
    }

    /// Value for an inline `style` property.
    pub fn css(&self) -> String {
        match self {
            Dimension::Pixels(v) => format!("{v}px"),
            Dimension::Css(s) => s.clone(),
        }
    }

    /// Logical pixels: the fixed value, else the measured layout size, else
    /// `fallback` when layout reports nothing (detached or hidden host).
    pub fn resolve(&self, measured: f64, fallback: f64) -> f64 {
        self.fixed()
            .unwrap_or(if measured > 0.0 { measured } else { fallback })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const ALL_CLASSES: [&'static str; 2] = ["slider-captcha-light", "slider-captcha-dark"];

    pub fn class(self) -> &'static str {
        match self {
            Theme::Light => Self::ALL_CLASSES[0],
            Theme::Dark => Self::ALL_CLASSES[1],
        }
    }
}

/// Scalar widget options. Callbacks and the mount root live on the JS side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptchaConfig {
    pub width: Dimension,
    pub height: Dimension,
    pub piece_size: f64,
    pub tolerance: f64,
    pub image_url: Option<String>,
    pub fit: Fit,
    pub cross_origin: Option<String>,
    pub theme: Theme,
    pub success_text: Option<String>,
    pub fail_text: Option<String>,
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        CaptchaConfig {
            width: Dimension::Pixels(DEFAULT_WIDTH),
            height: Dimension::Pixels(DEFAULT_HEIGHT),
            piece_size: DEFAULT_PIECE_SIZE,
            tolerance: DEFAULT_TOLERANCE,
            image_url: None,
            fit: Fit::Cover,
            cross_origin: None,
            theme: Theme::Light,
            success_text: None,
            fail_text: None,
        }
    }
}

impl CaptchaConfig {
    /// Parse an options object serialized as JSON. Unknown keys are ignored
    /// and `null` values take the default.
    pub fn from_json(text: &str) -> Result<Self> {
        let mut value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        if let Some(fields) = value.as_object_mut() {
            fields.retain(|_, v| !v.is_null());
        }
        let cfg: CaptchaConfig =
            serde_json::from_value(value).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        cfg.validate()
    }

    pub fn validate(self) -> Result<Self> {
        if !self.piece_size.is_finite() || self.piece_size <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "pieceSize must be a positive number, got {}",
                self.piece_size
            )));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }
        for (name, dim) in [("width", &self.width), ("height", &self.height)] {
            if let Some(v) = dim.fixed()
                && (!v.is_finite() || v <= 0.0)
            {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be positive, got {v}"
                )));
            }
        }
        Ok(self)
    }

    /// Blank strings count as "not configured".
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|s| !s.trim().is_empty())
    }

    pub fn settings(&self) -> Settings {
        Settings {
            piece_size: self.piece_size,
            tolerance: self.tolerance,
            success_text: self
                .success_text
                .clone()
                .unwrap_or_else(|| DEFAULT_SUCCESS_TEXT.to_string()),
            fail_text: self
                .fail_text
                .clone()
                .unwrap_or_else(|| DEFAULT_FAIL_TEXT.to_string()),
        }
    }
}

/// Remote background/piece pair returned by a host `request()` function.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePair {
    pub bg_url: String,
    pub puzzle_url: String,
}

impl ImagePair {
    pub fn from_json(text: &str) -> Result<Self> {
        let pair: ImagePair =
            serde_json::from_str(text).map_err(|e| Error::Request(e.to_string()))?;
        if pair.bg_url.is_empty() || pair.puzzle_url.is_empty() {
            return Err(Error::Request("empty bgUrl or puzzleUrl".to_string()));
        }
        Ok(pair)
    }
}

/// Public placeholder image, made unique per round by `token`.
pub fn placeholder_url(width: f64, height: f64, token: u64) -> String {
    format!(
        "https://picsum.photos/{}/{}?random={}",
        width.round().max(1.0) as u32,
        height.round().max(1.0) as u32,
        token
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_takes_defaults() {
        let cfg = CaptchaConfig::from_json("{}").unwrap();
        assert_eq!(cfg, CaptchaConfig::default());
        let s = cfg.settings();
        assert_eq!(s.piece_size, 44.0);
        assert_eq!(s.tolerance, 6.0);
        assert_eq!(s.success_text, DEFAULT_SUCCESS_TEXT);
        assert_eq!(s.fail_text, DEFAULT_FAIL_TEXT);
    }

    #[test]
    fn host_options_are_read_in_camel_case() {
        let cfg = CaptchaConfig::from_json(
            r##"{"root":"#captcha","width":"100%","height":150,"pieceSize":40,
                "tolerance":10,"fit":"contain","theme":"dark","crossOrigin":"anonymous",
                "successText":"ok","failText":"nope"}"##,
        )
        .unwrap();
        assert_eq!(cfg.width, Dimension::Css("100%".into()));
        assert_eq!(cfg.height, Dimension::Pixels(150.0));
        assert_eq!(cfg.fit, Fit::Contain);
        assert_eq!(cfg.theme.class(), "slider-captcha-dark");
        assert_eq!(cfg.cross_origin.as_deref(), Some("anonymous"));
        assert_eq!(cfg.settings().fail_text, "nope");
    }

    #[test]
    fn null_options_take_defaults() {
        let cfg = CaptchaConfig::from_json(
            r#"{"tolerance":null,"theme":null,"width":null,"pieceSize":null,"fit":null}"#,
        )
        .unwrap();
        assert_eq!(cfg, CaptchaConfig::default());
        let cfg = CaptchaConfig::from_json(r#"{"height":null,"tolerance":10}"#).unwrap();
        assert_eq!(cfg.height, Dimension::Pixels(DEFAULT_HEIGHT));
        assert_eq!(cfg.tolerance, 10.0);
    }

    #[test]
    fn intrinsic_sizes_fall_back_to_layout() {
        let w = Dimension::Css("100%".into());
        assert_eq!(w.fixed(), None);
        assert_eq!(w.resolve(280.0, DEFAULT_WIDTH), 280.0);
        assert_eq!(w.resolve(0.0, DEFAULT_WIDTH), DEFAULT_WIDTH);
        assert_eq!(Dimension::Css("240px".into()).resolve(999.0, 1.0), 240.0);
        assert_eq!(Dimension::Pixels(300.0).css(), "300px");
    }

    #[test]
    fn rejects_nonsensical_numbers() {
        assert!(matches!(
            CaptchaConfig::from_json(r#"{"pieceSize":0}"#),
            Err(Error::InvalidConfig(_))
        ));
        assert!(CaptchaConfig::from_json(r#"{"tolerance":-1}"#).is_err());
        assert!(CaptchaConfig::from_json(r#"{"width":-20}"#).is_err());
        assert!(CaptchaConfig::from_json(r#"{"fit":"tile"}"#).is_err());
    }

    #[test]
    fn blank_image_url_means_placeholder() {
        let cfg = CaptchaConfig {
            image_url: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(cfg.image_url(), None);
        assert_eq!(
            placeholder_url(320.0, 160.0, 42),
            "https://picsum.photos/320/160?random=42"
        );
    }

    #[test]
    fn image_pair_requires_both_urls() {
        let pair = ImagePair::from_json(r#"{"bgUrl":"a.png","puzzleUrl":"b.png"}"#).unwrap();
        assert_eq!(pair.puzzle_url, "b.png");
        assert!(matches!(
            ImagePair::from_json(r#"{"bgUrl":"a.png"}"#),
            Err(Error::Request(_))
        ));
    }
}
