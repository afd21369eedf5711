//! Rendering configuration.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use bon::Builder;
use serde::Deserialize;

static DEFAULT_CONFIG: LazyLock<Config> = LazyLock::new(Config::default);
static DEFAULT_OPTIONS: LazyLock<RenderOptions> = LazyLock::new(RenderOptions::default);

/// Application-wide rendering settings.
///
/// Usually loaded once alongside the application's language data and shared
/// across renders.
///
/// # Example
///
/// ```
/// use tml::Config;
///
/// let config: Config = serde_json::from_str(r#"{
///     "data_defaults": { "app": "Acme" },
///     "decoration_defaults": { "strong": "<strong>{$0}</strong>" }
/// }"#).unwrap();
///
/// assert_eq!(config.default_data("app"), Some("Acme"));
/// assert!(config.language_cases);
/// ```
#[derive(Debug, Clone, Builder, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Values for data tokens the caller did not supply, by short name.
    #[builder(default)]
    pub data_defaults: HashMap<String, String>,

    /// Templates for decoration tokens the caller did not supply, by name.
    ///
    /// `{$0}` is replaced with the decorated content; other `{$name}`
    /// placeholders are filled from attribute-map token data.
    #[builder(default)]
    pub decoration_defaults: HashMap<String, String>,

    /// Whether `::case` keys on tokens are applied.
    #[builder(default = true)]
    pub language_cases: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Config {
    /// The shared default configuration.
    pub fn shared() -> &'static Config {
        &DEFAULT_CONFIG
    }

    pub fn default_data(&self, token: &str) -> Option<&str> {
        self.data_defaults.get(token).map(String::as_str)
    }

    pub fn default_decoration(&self, token: &str) -> Option<&str> {
        self.decoration_defaults.get(token).map(String::as_str)
    }
}

/// Per-render options.
#[derive(Debug, Clone, Default, Builder)]
pub struct RenderOptions {
    /// When set, only tokens with these names are substituted.
    pub allowed_tokens: Option<HashSet<String>>,

    /// Leave decoration markup untouched.
    #[builder(default)]
    pub skip_decorations: bool,
}

impl RenderOptions {
    pub fn shared() -> &'static RenderOptions {
        &DEFAULT_OPTIONS
    }

    /// Whether the token named `name` may be substituted.
    pub fn allows(&self, name: &str) -> bool {
        self.allowed_tokens
            .as_ref()
            .is_none_or(|allowed| allowed.contains(name))
    }
}
