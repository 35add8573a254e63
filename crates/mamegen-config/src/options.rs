//! Per-launch system options
//!
//! Every option the generator reads is declared here as a typed key with its
//! default. Lookups never fail: an absent, empty or unparsable value resolves
//! to the key's default, and the caller can still tell the two apart through
//! [`Resolved`].

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Outcome of resolving an option key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved<T> {
    /// The user set the option to a usable value
    Declared(T),
    /// The option was absent, empty, a sentinel or malformed
    Default(T),
}

impl<T> Resolved<T> {
    /// The resolved value, whichever way it was obtained
    pub fn value(self) -> T {
        match self {
            Resolved::Declared(v) | Resolved::Default(v) => v,
        }
    }

    /// The value only if the user declared it
    pub fn declared(self) -> Option<T> {
        match self {
            Resolved::Declared(v) => Some(v),
            Resolved::Default(_) => None,
        }
    }
}

/// A boolean option key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoolOption {
    pub key: &'static str,
    pub default: bool,
}

/// A free-form text option key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextOption {
    pub key: &'static str,
    pub default: &'static str,
    /// Value that means "not set" (e.g. `automatic`)
    pub unset_sentinel: Option<&'static str>,
}

impl TextOption {
    const fn new(key: &'static str, default: &'static str) -> Self {
        Self {
            key,
            default,
            unset_sentinel: None,
        }
    }

    const fn with_sentinel(key: &'static str, default: &'static str, sentinel: &'static str) -> Self {
        Self {
            key,
            default,
            unset_sentinel: Some(sentinel),
        }
    }
}

pub const SOFT_LIST: TextOption = TextOption::with_sentinel("softList", "", "none");
pub const CUSTOM_CFG: BoolOption = BoolOption { key: "customcfg", default: false };
pub const PER_GAME_CFG: BoolOption = BoolOption { key: "pergamecfg", default: false };

pub const VIDEO: TextOption = TextOption::new("video", "opengl");
pub const BGFX_BACKEND: TextOption = TextOption::with_sentinel("bgfxbackend", "auto", "automatic");
pub const BGFX_SHADERS: TextOption = TextOption::with_sentinel("bgfxshaders", "default", "default");
pub const SWITCHRES: BoolOption = BoolOption { key: "switchres", default: false };

pub const ROTATION: TextOption = TextOption::new("rotation", "");
pub const ARTWORK_CROP: BoolOption = BoolOption { key: "artworkcrop", default: false };
pub const ENABLE_UI: BoolOption = BoolOption { key: "enableui", default: true };
pub const HISCORE_PLUGIN: BoolOption = BoolOption { key: "hiscoreplugin", default: true };

pub const ALT_MODEL: TextOption = TextOption::new("altmodel", "");
pub const ALT_ROM_TYPE: TextOption = TextOption::new("altromtype", "");
pub const BOOT_DISK: TextOption = TextOption::new("bootdisk", "");
pub const TI99_32K_RAM: BoolOption = BoolOption { key: "ti99_32kram", default: true };
pub const TI99_SPEECH: BoolOption = BoolOption { key: "ti99_speech", default: true };

pub const ALT_DPAD: TextOption = TextOption::new("altdpad", "0");
pub const ALT_LAYOUT: TextOption = TextOption::new("altlayout", "auto");

pub const BEZEL: TextOption = TextOption::new("bezel", "");
pub const FORCE_NO_BEZEL: BoolOption = BoolOption { key: "forceNoBezel", default: false };
pub const TATTOO: TextOption = TextOption::with_sentinel("bezel.tattoo", "", "0");
pub const TATTOO_FILE: TextOption = TextOption::new("bezel.tattoo_file", "");
pub const TATTOO_CORNER: TextOption = TextOption::new("bezel.tattoo_corner", "NW");

/// Parse a user-facing boolean
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" | "enabled" => Some(true),
        "0" | "false" | "off" | "no" | "disabled" => Some(false),
        _ => None,
    }
}

/// Options selected for one launch of one system
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Logical system name (e.g. `mame`, `ti99`, `macintosh`)
    pub name: String,

    #[serde(default)]
    options: BTreeMap<String, String>,
}

impl SystemConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: BTreeMap::new(),
        }
    }

    /// Builder-style option setter
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.options.insert(key.into(), value.into());
    }

    /// Load option values from a flat TOML table. Keys containing dots
    /// (`"bezel.tattoo" = "system"`) must be quoted.
    pub fn from_toml(name: impl Into<String>, contents: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(contents)?;
        let mut config = Self::new(name);

        for (key, value) in table {
            let value = match value {
                toml::Value::String(s) => s,
                toml::Value::Boolean(b) => String::from(if b { "1" } else { "0" }),
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                other => {
                    return Err(ConfigError::Invalid(format!(
                        "option {} must be a scalar, got {}",
                        key,
                        other.type_str()
                    )));
                }
            };
            config.set(key, value);
        }

        Ok(config)
    }

    /// Raw value of an option; empty strings count as unset
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.options
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.raw(key).is_some()
    }

    /// Resolve a boolean option
    pub fn flag(&self, option: BoolOption) -> Resolved<bool> {
        match self.raw(option.key) {
            None => Resolved::Default(option.default),
            Some(raw) => match parse_bool(raw) {
                Some(value) => Resolved::Declared(value),
                None => {
                    tracing::warn!(
                        "Option {}={:?} is not a boolean, using {}",
                        option.key,
                        raw,
                        option.default
                    );
                    Resolved::Default(option.default)
                }
            },
        }
    }

    /// Shorthand for the resolved value of a boolean option
    pub fn enabled(&self, option: BoolOption) -> bool {
        self.flag(option).value()
    }

    /// Resolve a text option
    pub fn text(&self, option: TextOption) -> Resolved<&str> {
        match self.raw(option.key) {
            Some(raw) if Some(raw) != option.unset_sentinel => Resolved::Declared(raw),
            _ => Resolved::Default(option.default),
        }
    }

    /// Text option only when declared by the user
    pub fn declared(&self, option: TextOption) -> Option<&str> {
        self.text(option).declared()
    }
}
