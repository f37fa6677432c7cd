//! Configuration loading and parsing.
//!
//! Parses `oxhover.toml` (or an override path provided by the binary):
//!
//! ```toml
//! [hover]
//! enabled = true
//! sticky = true
//!
//! [editor]
//! accessibility_support = "auto"
//! typical_halfwidth_character_width = 1.0
//! ```
//!
//! Every field has a default so a missing file, a missing table, or a missing key
//! all yield a usable configuration. Unknown fields are ignored to allow forward
//! evolution. A parse error falls back to defaults and is logged.
//!
//! Hover controllers never read the file structs directly; they consume the flat
//! [`EditorOptions`] snapshot. Reloads are diffed with [`Config::diff`] so a
//! configuration-changed event carries exactly the option groups that moved.

use anyhow::Result;
use core_events::{ChangedOptions, ConfigChange};
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HoverConfig {
    #[serde(default = "HoverConfig::default_enabled")]
    pub enabled: bool,
    /// Keep the hover open while the pointer travels onto it.
    #[serde(default = "HoverConfig::default_sticky")]
    pub sticky: bool,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            sticky: Self::default_sticky(),
        }
    }
}

impl HoverConfig {
    const fn default_enabled() -> bool {
        true
    }
    const fn default_sticky() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccessibilitySupport {
    /// Follow platform detection (treated as off until a screen reader is reported).
    #[default]
    Auto,
    On,
    Off,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EditorConfig {
    #[serde(default)]
    pub accessibility_support: AccessibilitySupport,
    #[serde(default = "EditorConfig::default_char_width")]
    pub typical_halfwidth_character_width: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            accessibility_support: AccessibilitySupport::default(),
            typical_halfwidth_character_width: Self::default_char_width(),
        }
    }
}

impl EditorConfig {
    // One terminal cell.
    const fn default_char_width() -> f32 {
        1.0
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct ConfigFile {
    #[serde(default)]
    pub hover: HoverConfig,
    #[serde(default)]
    pub editor: EditorConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

/// Flat, copyable view of the options a hover controller consults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorOptions {
    pub hover_enabled: bool,
    pub hover_sticky: bool,
    pub accessibility_support: AccessibilitySupport,
    pub typical_halfwidth_character_width: f32,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Config::default().options()
    }
}

impl EditorOptions {
    /// Accessibility is only considered active when explicitly switched on.
    pub fn accessibility_active(&self) -> bool {
        self.accessibility_support == AccessibilitySupport::On
    }
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from("oxhover.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("oxhover").join("oxhover.toml");
    }
    PathBuf::from("oxhover.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_missing_using_defaults");
        return Ok(Config::default());
    };
    Ok(parse(content, &path))
}

fn parse(content: String, path: &std::path::Path) -> Config {
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => Config {
            raw: Some(content),
            file,
        },
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Config::default()
        }
    }
}

impl Config {
    pub fn options(&self) -> EditorOptions {
        EditorOptions {
            hover_enabled: self.file.hover.enabled,
            hover_sticky: self.file.hover.sticky,
            accessibility_support: self.file.editor.accessibility_support,
            typical_halfwidth_character_width: self.file.editor.typical_halfwidth_character_width,
        }
    }

    /// Option groups that differ between `self` (old) and `next`.
    pub fn diff(&self, next: &Config) -> ConfigChange {
        let mut changed = ChangedOptions::empty();
        if self.file.hover != next.file.hover {
            changed |= ChangedOptions::HOVER;
        }
        if self.file.editor.accessibility_support != next.file.editor.accessibility_support {
            changed |= ChangedOptions::ACCESSIBILITY;
        }
        if self.file.editor.typical_halfwidth_character_width
            != next.file.editor.typical_halfwidth_character_width
        {
            changed |= ChangedOptions::FONT_INFO;
        }
        if !changed.is_empty() {
            info!(target: "config", ?changed, "config_diff");
        }
        ConfigChange::new(changed)
    }
}
