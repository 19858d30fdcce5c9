//! Shared boundary types for the letter-grid display.
//!
//! This module defines the two key data contracts:
//! - Scene → Renderer (in-memory): `ResolvedScene` containing `DrawOp`s
//! - Renderer → Terminal: a grid of `ScreenCell`s plus per-frame `CellChange` diffs

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Shared style primitives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Named(NamedColor),
    Rgb { r: u8, g: u8, b: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

fn is_false(b: &bool) -> bool {
    !*b
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg: Option<Color>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub dim: bool,
}

impl Style {
    pub fn is_default(&self) -> bool {
        self.fg.is_none() && self.bg.is_none() && !self.bold && !self.dim
    }
}

// ---------------------------------------------------------------------------
// Scene → Renderer boundary (in-memory only, never serialized)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DrawOp {
    pub x: u16,
    pub y: u16,
    pub ch: char,
    pub style: Style,
    pub z_order: i32,
}

#[derive(Debug, Clone)]
pub struct ResolvedScene {
    pub width: u16,
    pub height: u16,
    pub ops: Vec<DrawOp>,
}

// ---------------------------------------------------------------------------
// Renderer → Terminal boundary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenCell {
    pub ch: char,
    pub style: Style,
}

impl Default for ScreenCell {
    fn default() -> Self {
        ScreenCell {
            ch: ' ',
            style: Style::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellChange {
    pub x: u16,
    pub y: u16,
    pub cell: ScreenCell,
}
