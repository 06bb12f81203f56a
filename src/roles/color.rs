//! Fixed display palette
//!
//! The sixteen display colors plus the non-color formatting codes that share
//! the same namespace. Roles may only use the colors.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A palette entry: either a display color or a formatting code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Formatting {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
    Obfuscated,
    Bold,
    Strikethrough,
    Underline,
    Italic,
    Reset,
}

impl Formatting {
    /// Every palette entry, colors first
    pub const ALL: [Formatting; 22] = [
        Formatting::Black,
        Formatting::DarkBlue,
        Formatting::DarkGreen,
        Formatting::DarkAqua,
        Formatting::DarkRed,
        Formatting::DarkPurple,
        Formatting::Gold,
        Formatting::Gray,
        Formatting::DarkGray,
        Formatting::Blue,
        Formatting::Green,
        Formatting::Aqua,
        Formatting::Red,
        Formatting::LightPurple,
        Formatting::Yellow,
        Formatting::White,
        Formatting::Obfuscated,
        Formatting::Bold,
        Formatting::Strikethrough,
        Formatting::Underline,
        Formatting::Italic,
        Formatting::Reset,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Formatting::Black => "black",
            Formatting::DarkBlue => "dark_blue",
            Formatting::DarkGreen => "dark_green",
            Formatting::DarkAqua => "dark_aqua",
            Formatting::DarkRed => "dark_red",
            Formatting::DarkPurple => "dark_purple",
            Formatting::Gold => "gold",
            Formatting::Gray => "gray",
            Formatting::DarkGray => "dark_gray",
            Formatting::Blue => "blue",
            Formatting::Green => "green",
            Formatting::Aqua => "aqua",
            Formatting::Red => "red",
            Formatting::LightPurple => "light_purple",
            Formatting::Yellow => "yellow",
            Formatting::White => "white",
            Formatting::Obfuscated => "obfuscated",
            Formatting::Bold => "bold",
            Formatting::Strikethrough => "strikethrough",
            Formatting::Underline => "underline",
            Formatting::Italic => "italic",
            Formatting::Reset => "reset",
        }
    }

    pub fn is_color(&self) -> bool {
        !matches!(
            self,
            Formatting::Obfuscated
                | Formatting::Bold
                | Formatting::Strikethrough
                | Formatting::Underline
                | Formatting::Italic
                | Formatting::Reset
        )
    }

    /// Case-insensitive lookup; `-` and spaces are accepted for `_`
    pub fn from_name(value: &str) -> Option<Formatting> {
        let normalized: String = value
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        Self::ALL.iter().copied().find(|f| f.name() == normalized)
    }

    /// Iterator over the entries usable as role colors
    pub fn colors() -> impl Iterator<Item = Formatting> {
        Self::ALL.into_iter().filter(Formatting::is_color)
    }

    pub fn color_names() -> Vec<&'static str> {
        Self::colors().map(|c| c.name()).collect()
    }

    /// Uniformly random color (never a formatting code)
    pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Formatting {
        let colors: Vec<Formatting> = Self::colors().collect();
        *colors.choose(rng).unwrap_or(&Formatting::White)
    }

    /// ANSI SGR escape for terminal rendering
    pub fn ansi(&self) -> &'static str {
        match self {
            Formatting::Black => "\x1b[30m",
            Formatting::DarkBlue => "\x1b[34m",
            Formatting::DarkGreen => "\x1b[32m",
            Formatting::DarkAqua => "\x1b[36m",
            Formatting::DarkRed => "\x1b[31m",
            Formatting::DarkPurple => "\x1b[35m",
            Formatting::Gold => "\x1b[33m",
            Formatting::Gray => "\x1b[37m",
            Formatting::DarkGray => "\x1b[90m",
            Formatting::Blue => "\x1b[94m",
            Formatting::Green => "\x1b[92m",
            Formatting::Aqua => "\x1b[96m",
            Formatting::Red => "\x1b[91m",
            Formatting::LightPurple => "\x1b[95m",
            Formatting::Yellow => "\x1b[93m",
            Formatting::White => "\x1b[97m",
            Formatting::Obfuscated => "\x1b[8m",
            Formatting::Bold => "\x1b[1m",
            Formatting::Strikethrough => "\x1b[9m",
            Formatting::Underline => "\x1b[4m",
            Formatting::Italic => "\x1b[3m",
            Formatting::Reset => "\x1b[0m",
        }
    }

    /// Wrap `text` in this entry's escape followed by a reset
    pub fn paint(&self, text: &str) -> String {
        format!("{}{}{}", self.ansi(), text, Formatting::Reset.ansi())
    }
}

impl fmt::Display for Formatting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
