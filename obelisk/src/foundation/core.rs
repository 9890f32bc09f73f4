/// RGBA8 pixel in the animation buffers.
///
/// The alpha channel never reaches the wire: a zero alpha marks a pixel that
/// no effect has written yet, and such pixels are emitted as black.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel; `0` means "uninitialised", it is not emitted.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// Build an opaque pixel from channel values.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Build an opaque pixel from a 24-bit `0xRRGGBB` value.
    pub const fn from_hex(hex: u32) -> Self {
        Self::rgb(
            (hex >> 16 & 0xff) as u8,
            (hex >> 8 & 0xff) as u8,
            (hex & 0xff) as u8,
        )
    }

    /// Zeroed pixel, alpha included. The "never written" state.
    pub const fn uninitialised() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }
}

/// Number of resonator channels at the sculpture base.
pub const NUM_RESONATORS: usize = 8;

/// Number of shaft window universes on the tower.
pub const NUM_SHAFT_WINDOWS: usize = 16;

/// Pixels per window universe.
pub const WINDOW_SIZE: usize = 30;

/// Open Pixel Control channel index.
///
/// Channel 0 is broadcast. Channels 1..=8 are the base resonators,
/// 9..=24 the shaft windows (level1.win1, level1.win2, ... level8.win2);
/// the pixel-server configuration must honour this enumeration.
pub type OpcChannel = u8;

/// First resonator channel.
pub const CHANNEL_RESO_BASE: OpcChannel = 1;

/// First shaft window channel.
pub const CHANNEL_SHAFT_BASE: OpcChannel = 9;

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
