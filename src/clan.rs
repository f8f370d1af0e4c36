// Clan identifiers and display configuration (name + color per clan).

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The fixed set of ApocaMon clans (element/affinity).
///
/// `Unknown` is the unassigned state a profile starts in; the parade draft
/// overwrites it with the player's pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Clan {
    Unknown,
    Ocean,
    Radioactive,
    Toxic,
    Mutaplant,
    Voltage,
    Frost,
    Impact,
    Ash,
    Aerial,
    Psychic,
    Plague,
    Rock,
    Specter,
    Draco,
    Sinister,
    Steel,
    Mirage,
    Inferno,
}

/// All clans in declaration order, `Unknown` included.
pub const ALL_CLANS: &[Clan] = &[
    Clan::Unknown,
    Clan::Ocean,
    Clan::Radioactive,
    Clan::Toxic,
    Clan::Mutaplant,
    Clan::Voltage,
    Clan::Frost,
    Clan::Impact,
    Clan::Ash,
    Clan::Aerial,
    Clan::Psychic,
    Clan::Plague,
    Clan::Rock,
    Clan::Specter,
    Clan::Draco,
    Clan::Sinister,
    Clan::Steel,
    Clan::Mirage,
    Clan::Inferno,
];

impl Clan {
    /// Canonical identifier string, used for TOML config and SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Clan::Unknown => "Unknown",
            Clan::Ocean => "Ocean",
            Clan::Radioactive => "Radioactive",
            Clan::Toxic => "Toxic",
            Clan::Mutaplant => "Mutaplant",
            Clan::Voltage => "Voltage",
            Clan::Frost => "Frost",
            Clan::Impact => "Impact",
            Clan::Ash => "Ash",
            Clan::Aerial => "Aerial",
            Clan::Psychic => "Psychic",
            Clan::Plague => "Plague",
            Clan::Rock => "Rock",
            Clan::Specter => "Specter",
            Clan::Draco => "Draco",
            Clan::Sinister => "Sinister",
            Clan::Steel => "Steel",
            Clan::Mirage => "Mirage",
            Clan::Inferno => "Inferno",
        }
    }

    /// Parse a canonical identifier back into a clan.
    pub fn parse(s: &str) -> Option<Self> {
        ALL_CLANS.iter().copied().find(|c| c.as_str() == s)
    }
}

impl fmt::Display for Clan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Display color
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum ColorParseError {
    #[error("color must be a #RRGGBB hex string, got `{0}`")]
    BadFormat(String),
}

/// An RGB display color, parsed from `#RRGGBB` config strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Parse a `#RRGGBB` hex string.
    pub fn from_hex(s: &str) -> Result<Self, ColorParseError> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::BadFormat(s.to_string()))?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::BadFormat(s.to_string()));
        }
        let parse = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).expect("validated hex digits")
        };
        Ok(Rgb {
            r: parse(0..2),
            g: parse(2..4),
            b: parse(4..6),
        })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

// ---------------------------------------------------------------------------
// Pool entry
// ---------------------------------------------------------------------------

/// One configured entry of the draft pool: a clan with its button label
/// and the color applied to the visual preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClanEntry {
    pub clan: Clan,
    pub name: String,
    pub color: Rgb,
}
