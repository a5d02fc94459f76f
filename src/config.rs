//! Screen configuration.
//!
//! `ScreenConfig` holds everything a [`DialogueScreen`](crate::screen::DialogueScreen)
//! needs at start-up: who is speaking, which images make up the initial background and
//! portrait layers, the script of lines and the surface size.
//!
//! `ScreenConfig` provides defaults via [`Default`], a fluent [`ScreenConfig::builder()`]
//! with validation, and [`ScreenConfig::from_query`] to read the same options from a
//! URL query string (`name`, `bg`, `pt`, `dia` and `font`).
//!
//! # Examples
//!
//! ```rust
//! use dialogue_screen::config::ScreenConfig;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = ScreenConfig::builder()
//!     .speaker_name("Elisanne")
//!     .script(vec!["Hello!".to_string(), "Goodbye!".to_string()])
//!     .surface_size(250, 445)
//!     .build()?;
//! assert_eq!(cfg.script.len(), 2);
//! # Ok(()) }
//! ```
//!
//! A malformed `dia` parameter never fails: the default script is kept instead.
//!
//! ```rust
//! use dialogue_screen::config::{ScreenConfig, default_script};
//!
//! let cfg = ScreenConfig::from_query("?name=Luca&dia=not%20json");
//! assert_eq!(cfg.speaker_name, "Luca");
//! assert_eq!(cfg.script, default_script());
//! ```

use crate::errors::ConfigError;
use crate::render::backend::SurfaceSize;
use crate::settings::{DialogueType, FontTag};

const DEFAULT_SPEAKER: &str = "Rita";
const DEFAULT_BACKGROUND: &str = "images/bg.png";
const DEFAULT_PORTRAIT: &str = "images/rt.png";
const DEFAULT_PLACEHOLDER: &str = "Click / Tap to start";

const DEFAULT_SCRIPT: [&str; 7] = [
    "Guys, guys, so um yesterday I learned that it is possible to like put a game in the Twitter player thing.",
    "And I got like this cool idea where you can like embed a dl-dialogue-generator canvas in there.",
    "Then I just did it... though it seems like it only works on desktop.",
    "Or if you are one of the weird people that browse Twitter on a browser instead of an app it works there as well.",
    "If you are on the app it should open like a little in app browser, so it's like not as cool I guess...",
    "Anyways, I don't really have a plan for this, was just like a cool idea I spent like an hour on.",
    "But who knows lol, Dragalia dialogue generator was also like a cool idea like an year ago.",
];

/// The built-in script used when no (valid) script is supplied.
pub fn default_script() -> Vec<String> {
    DEFAULT_SCRIPT.iter().map(|s| s.to_string()).collect()
}

/// Parses a JSON array of strings into a script.
pub fn parse_script(json: &str) -> Result<Vec<String>, ConfigError> {
    serde_json::from_str::<Vec<String>>(json).map_err(|e| ConfigError::InvalidScript(e.to_string()))
}

/// Parses `json` when given, falling back to [`default_script`] when it is absent or malformed.
pub fn script_or_default(json: Option<&str>) -> Vec<String> {
    let Some(json) = json else {
        return default_script();
    };

    match parse_script(json) {
        Ok(script) => script,
        Err(e) => {
            log::warn!("Ignoring supplied script, using the default one: {}", e);
            default_script()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenConfig {
    /// Speaker shown while revealing lines
    pub speaker_name: String,
    /// Image reference of the bottom layer
    pub background_ref: String,
    /// Image reference of the portrait layer on top of the background
    pub portrait_ref: String,
    /// Lines to cycle through
    pub script: Vec<String>,
    /// Size of the surface to render on
    pub surface_size: SurfaceSize,
    /// Initial box type
    pub dialogue_type: DialogueType,
    /// Initial font tag
    pub font: FontTag,
    /// Text shown before the first line is revealed
    pub placeholder_text: String,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            speaker_name: DEFAULT_SPEAKER.to_string(),
            background_ref: DEFAULT_BACKGROUND.to_string(),
            portrait_ref: DEFAULT_PORTRAIT.to_string(),
            script: default_script(),
            surface_size: SurfaceSize::new(500, 890),
            dialogue_type: DialogueType::Dialogue,
            font: FontTag::En,
            placeholder_text: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

impl ScreenConfig {
    pub fn builder() -> ScreenConfigBuilder {
        ScreenConfigBuilder::default()
    }

    /// Reads the configuration from `(key, value)` pairs. Unknown keys are ignored.
    ///
    /// - `name`: speaker name
    /// - `bg`: background image reference
    /// - `pt`: portrait image reference
    /// - `dia`: JSON array of strings used as script
    /// - `font`: font tag (`en`, `ja`, `zh_tw`, `zh_cn`), unknown tags keep `en`
    pub fn from_params<K, V>(params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut cfg = ScreenConfig::default();

        for (key, value) in params {
            let value = value.as_ref();
            match key.as_ref() {
                "name" => cfg.speaker_name = value.to_string(),
                "bg" => cfg.background_ref = value.to_string(),
                "pt" => cfg.portrait_ref = value.to_string(),
                "dia" => cfg.script = script_or_default(Some(value)),
                "font" => match FontTag::parse(value) {
                    Some(font) => cfg.font = font,
                    None => log::warn!("Ignoring unknown font tag '{}'", value),
                },
                other => log::debug!("Ignoring unknown screen parameter '{}'", other),
            }
        }

        cfg
    }

    /// Reads the configuration from a URL query string, with or without the leading `?`.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_params(url::form_urlencoded::parse(query.as_bytes()))
    }
}

/// Builder for [`ScreenConfig`].
#[derive(Debug, Clone, Default)]
pub struct ScreenConfigBuilder {
    inner: ScreenConfig,
}

impl ScreenConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut ScreenConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn speaker_name<S: Into<String>>(self, name: S) -> Self { self.map(|c| c.speaker_name = name.into()) }
    pub fn background<S: Into<String>>(self, image_ref: S) -> Self { self.map(|c| c.background_ref = image_ref.into()) }
    pub fn portrait<S: Into<String>>(self, image_ref: S) -> Self { self.map(|c| c.portrait_ref = image_ref.into()) }
    pub fn script(self, script: Vec<String>) -> Self { self.map(|c| c.script = script) }
    pub fn surface_size(self, width: u32, height: u32) -> Self { self.map(|c| c.surface_size = SurfaceSize::new(width, height)) }
    pub fn dialogue_type(self, kind: DialogueType) -> Self { self.map(|c| c.dialogue_type = kind) }
    pub fn font(self, font: FontTag) -> Self { self.map(|c| c.font = font) }
    pub fn placeholder_text<S: Into<String>>(self, text: S) -> Self { self.map(|c| c.placeholder_text = text.into()) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<ScreenConfig, ConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

fn validate(c: &ScreenConfig) -> Result<(), ConfigError> {
    if c.surface_size.is_empty() {
        return Err(ConfigError::ZeroSurface);
    }
    Ok(())
}
