//! Theme rotation.
//!
//! The previous theme is whatever the most recently created record stored,
//! read back from the store by the controller, so rotation survives process
//! restarts without any in-memory index.

use postloop_ai::Theme;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Errors from theme configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeError {
    /// The theme list is empty.
    Empty,
    /// The themes file could not be read.
    Io { reason: String },
    /// The themes file could not be parsed.
    Parse { reason: String },
}

impl fmt::Display for ThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "theme list is empty"),
            Self::Io { reason } => write!(f, "failed to read themes file: {reason}"),
            Self::Parse { reason } => write!(f, "failed to parse themes file: {reason}"),
        }
    }
}

impl std::error::Error for ThemeError {}

/// On-disk shape of the themes file.
#[derive(Deserialize)]
struct ThemesFile {
    themes: Vec<Theme>,
}

/// Round-robin rotation over a fixed theme list.
#[derive(Debug, Clone)]
pub struct ThemeRotation {
    themes: Vec<Theme>,
}

impl ThemeRotation {
    /// Creates a rotation over the given list.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty.
    pub fn new(themes: Vec<Theme>) -> Result<Self, ThemeError> {
        if themes.is_empty() {
            return Err(ThemeError::Empty);
        }
        Ok(Self { themes })
    }

    /// Loads a rotation from a JSON themes file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or lists no
    /// themes.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ThemeError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ThemeError::Io {
            reason: e.to_string(),
        })?;
        let parsed: ThemesFile = serde_json::from_str(&raw).map_err(|e| ThemeError::Parse {
            reason: e.to_string(),
        })?;
        Self::new(parsed.themes)
    }

    /// The built-in theme list used when no themes file is configured.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            themes: vec![
                Theme::new("stress", "exam pressure, deadlines, the feeling of too much at once"),
                Theme::new("sleep", "winding down at night when your brain will not stop"),
                Theme::new("focus", "attention in a world of notifications"),
                Theme::new("self-compassion", "being as kind to yourself as you are to friends"),
                Theme::new("gratitude", "noticing small good things without forcing positivity"),
            ],
        }
    }

    /// Returns the theme following `previous` in rotation order.
    ///
    /// With no previous theme, or a previous theme no longer in the list,
    /// rotation restarts at the first entry. A single-entry list repeats;
    /// there is nothing else to pick.
    #[must_use]
    pub fn next_after(&self, previous: Option<&str>) -> &Theme {
        let Some(previous) = previous else {
            return &self.themes[0];
        };
        match self.themes.iter().position(|t| t.label == previous) {
            Some(index) => &self.themes[(index + 1) % self.themes.len()],
            None => &self.themes[0],
        }
    }
}
