//! Fixed colour tables for the sculpture.

use std::sync::LazyLock;

use crate::color::space::blend_lab;
use crate::foundation::core::Rgba8;
use crate::portal::status::Faction;

/// Enlightened green, the colour the shaft waves fade to after an ENL capture.
pub const ENL_COLOR: Rgba8 = Rgba8::from_hex(0x00ff00);

/// Resistance blue.
pub const RES_COLOR: Rgba8 = Rgba8::from_hex(0x0000ff);

/// Attack red used by the neutral-loss flare.
pub const FLARE_RED: Rgba8 = Rgba8::from_hex(0xff0000);

/// Resting dim white of an unclaimed portal.
pub const NEUTRAL_WHITE: Rgba8 = Rgba8::from_hex(0xaaaaaa);

/// Nominal colour of a resonator by level 0-8. Level 0 is undeployed (black).
pub const RESONATOR_LEVEL_COLORS: [Rgba8; 9] = [
    Rgba8::from_hex(0x000000), // L0
    Rgba8::from_hex(0xEE8800), // L1
    Rgba8::from_hex(0xFF6600), // L2
    Rgba8::from_hex(0xCC3300), // L3
    Rgba8::from_hex(0x990000), // L4
    Rgba8::from_hex(0xFF0033), // L5
    Rgba8::from_hex(0xCC0066), // L6
    Rgba8::from_hex(0x990066), // L7
    Rgba8::from_hex(0x660066), // L8
];

/// The colour every shaft wave converges on for a faction. Total over all
/// factions; neutral portals rest on dim white.
pub fn faction_color(faction: Faction) -> Rgba8 {
    match faction {
        Faction::Enlightened => ENL_COLOR,
        Faction::Resistance => RES_COLOR,
        Faction::Neutral => NEUTRAL_WHITE,
    }
}

const GRADIENT_STEPS: usize = 101;

fn health_gradient(low: Rgba8, high: Rgba8) -> [Rgba8; GRADIENT_STEPS] {
    let mut table = [Rgba8::BLACK; GRADIENT_STEPS];
    for (i, slot) in table.iter_mut().enumerate() {
        *slot = blend_lab(low, high, i as f64 / GRADIENT_STEPS as f64);
    }
    table
}

/// Lab-blended gradient from weakened to full-strength Enlightened green,
/// indexed by integral health 0-100.
pub static ENL_HEALTH: LazyLock<[Rgba8; GRADIENT_STEPS]> =
    LazyLock::new(|| health_gradient(Rgba8::from_hex(0x0A3306), Rgba8::from_hex(0x36FF1F)));

/// Lab-blended gradient from weakened to full-strength Resistance blue.
pub static RES_HEALTH: LazyLock<[Rgba8; GRADIENT_STEPS]> =
    LazyLock::new(|| health_gradient(Rgba8::from_hex(0x00066B), Rgba8::from_hex(0x000FFF)));

/// Look up the health-gradient colour for a faction's resonator.
///
/// Neutral resonators render as a barely-lit grey so the sculpture still
/// shows their presence during setup.
pub fn health_color(faction: Faction, health: f32) -> Rgba8 {
    let idx = (health.clamp(0.0, 100.0) as usize).min(GRADIENT_STEPS - 1);
    match faction {
        Faction::Enlightened => ENL_HEALTH[idx],
        Faction::Resistance => RES_HEALTH[idx],
        Faction::Neutral => Rgba8::from_hex(0x0d0d0d),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/color/palette.rs"]
mod tests;
