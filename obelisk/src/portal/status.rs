//! Implementation-neutral portal state.
//!
//! This is the canonical form every device wire shape is normalised into and
//! the only shape the rest of the gateway sees.

use serde::{Deserialize, Serialize};

/// The faction holding the portal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    /// Unclaimed.
    #[default]
    Neutral,
    /// Enlightened (green).
    Enlightened,
    /// Resistance (blue).
    Resistance,
}

impl Faction {
    /// One-letter wire form: `E`, `R` or `N`.
    pub fn letter(self) -> char {
        match self {
            Self::Enlightened => 'E',
            Self::Resistance => 'R',
            Self::Neutral => 'N',
        }
    }

    /// Lowercase prefix used by sound-effect names.
    pub fn sfx_prefix(self) -> &'static str {
        match self {
            Self::Enlightened => "e",
            Self::Resistance => "r",
            Self::Neutral => "n",
        }
    }
}

/// One of up to eight resonators at the portal base.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Resonator {
    /// Compass position, one of `E,NE,N,NW,W,SW,S,SE`.
    pub position: String,
    /// Resonator level, 0-8.
    pub level: f32,
    /// Resonator health, 0-100.
    pub health: f32,
    /// Deploying agent.
    pub owner: String,
}

/// A mod installed in one of the portal's four slots.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mod {
    /// Installing agent.
    pub owner: String,
    /// Slot index 0-3.
    pub slot: u8,
    /// Mod type, e.g. `FA`, `HS`, `LA`, `SBUL`, `MH`, `PS`, `AXA`, `T`.
    #[serde(rename = "type")]
    pub kind: String,
    /// `C`ommon, `R`are or `VR` very rare.
    pub rarity: String,
}

/// Canonical portal status.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    /// Portal title.
    pub title: String,
    /// Owning agent.
    pub owner: String,
    /// Portal level, 0-8. Floating point because it is an average of
    /// resonator levels.
    pub level: f32,
    /// Portal health, 0-100.
    pub health: f32,
    /// Controlling faction.
    pub faction: Faction,
    /// Installed mods.
    pub mods: Vec<Mod>,
    /// Deployed resonators; missing positions are undeployed.
    pub resonators: Vec<Resonator>,
}

/// A portal status tagged with whether it describes the home portal the
/// frame pump animates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortalMsg {
    /// Whether the frame pump should consume this message.
    pub home: bool,
    /// The status itself.
    pub status: Status,
}

/// Compass positions in resonator slot order.
pub const COMPASS: [&str; 8] = ["E", "NE", "N", "NW", "W", "SW", "S", "SE"];

/// Slot index for a compass position, if it is one of the eight.
pub fn compass_slot(position: &str) -> Option<usize> {
    COMPASS.iter().position(|&p| p == position)
}

#[cfg(test)]
#[path = "../../tests/unit/portal/status.rs"]
mod tests;
