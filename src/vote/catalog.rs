//! Mood catalog
//!
//! The selectable moods and the chart color of each mood name.

use serde::Serialize;

/// Color used for mood names the catalog does not know
pub const DEFAULT_COLOR: &str = "#9CA3AF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Mood {
    pub emoji: &'static str,
    pub name: &'static str,
    pub color: &'static str,
}

pub const MOODS: &[Mood] = &[
    Mood { emoji: "😀", name: "Happy", color: "#FFB400" },
    Mood { emoji: "😢", name: "Sad", color: "#5B3DF4" },
    Mood { emoji: "😡", name: "Angry", color: "#F43F5E" },
    Mood { emoji: "😴", name: "Tired", color: "#A855F7" },
    Mood { emoji: "😎", name: "Cool", color: "#19C37D" },
];

/// Look up a mood by its emoji glyph
pub fn by_emoji(emoji: &str) -> Option<&'static Mood> {
    MOODS.iter().find(|m| m.emoji == emoji)
}

/// Look up a mood by name, ignoring case
pub fn by_name(name: &str) -> Option<&'static Mood> {
    MOODS.iter().find(|m| m.name.eq_ignore_ascii_case(name))
}

/// Chart color of a mood name, [`DEFAULT_COLOR`] when unmapped
pub fn color_for(name: &str) -> &'static str {
    by_name(name).map(|m| m.color).unwrap_or(DEFAULT_COLOR)
}

/// Accept either a glyph or a mood name
pub fn resolve(input: &str) -> Option<&'static Mood> {
    let input = input.trim();
    by_emoji(input).or_else(|| by_name(input))
}
