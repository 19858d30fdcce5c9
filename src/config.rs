//! Application configuration.
//!
//! Everything tunable lives here: the alphabet the grid draws from, the
//! layout metrics, the clone travel time, and the display styles. A config
//! file is optional; every field has a default so a partial file works.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::types::{Color, NamedColor, Style};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Symbols the generator draws from, one cell character each.
    #[serde(default = "default_alphabet")]
    pub alphabet: String,
    /// Blank margin between the canvas edge and the grid, in terminal cells.
    #[serde(default = "default_padding")]
    pub padding: f32,
    /// Gap between adjacent grid cells, in terminal cells.
    #[serde(default = "default_spacing")]
    pub spacing: f32,
    /// Seconds a clone takes to reach its destination slot.
    #[serde(default = "default_travel_secs")]
    pub travel_secs: f32,
    /// Animation frame rate while a shuffle is in flight.
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_letter_style")]
    pub letter_style: Style,
    #[serde(default = "default_frame_style")]
    pub frame_style: Style,
    #[serde(default = "default_clone_style")]
    pub clone_style: Style,
}

fn default_alphabet() -> String {
    "ABCDEFGHIJKLMNOPQRSTUVWXYZ".into()
}

fn default_padding() -> f32 {
    1.0
}

fn default_spacing() -> f32 {
    1.0
}

fn default_travel_secs() -> f32 {
    2.0
}

fn default_fps() -> u32 {
    30
}

fn default_letter_style() -> Style {
    Style {
        fg: Some(Color::Named(NamedColor::White)),
        bold: true,
        ..Default::default()
    }
}

fn default_frame_style() -> Style {
    Style {
        fg: Some(Color::Named(NamedColor::Blue)),
        dim: true,
        ..Default::default()
    }
}

fn default_clone_style() -> Style {
    Style {
        fg: Some(Color::Named(NamedColor::Yellow)),
        bold: true,
        ..Default::default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            alphabet: default_alphabet(),
            padding: default_padding(),
            spacing: default_spacing(),
            travel_secs: default_travel_secs(),
            fps: default_fps(),
            letter_style: default_letter_style(),
            frame_style: default_frame_style(),
            clone_style: default_clone_style(),
        }
    }
}

impl AppConfig {
    /// Load from an explicitly named file. A missing or malformed file is an
    /// error here, unlike implicit lookup, because the user asked for it.
    pub fn load(path: &str) -> Result<Self> {
        let json =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
        let config: AppConfig =
            serde_json::from_str(&json).with_context(|| format!("Failed to parse {path}"))?;
        if config.alphabet.is_empty() {
            anyhow::bail!("{path}: alphabet must not be empty");
        }
        Ok(config)
    }

    /// Alphabet as an indexable list of characters.
    pub fn alphabet_chars(&self) -> Vec<char> {
        self.alphabet.chars().collect()
    }
}
