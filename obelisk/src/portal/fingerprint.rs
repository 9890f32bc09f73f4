//! Stable content hash of a canonical status.
//!
//! The emit side collapses identical successive statuses on this fingerprint
//! rather than on arrival order, so a noisy poller cannot retrigger animation
//! rebuilds.

use crate::foundation::math::Fnv1a64;
use crate::portal::status::{Faction, Status};

/// Deterministic 128-bit fingerprint of a status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StatusFingerprint {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

/// Compute a stable fingerprint over every field that can trigger an
/// animation change.
pub fn fingerprint_status(status: &Status) -> StatusFingerprint {
    let mut a = Fnv1a64::new(0xcbf2_9ce4_8422_2325);
    let mut b = Fnv1a64::new(0x9ae1_6a3b_2f90_404f);

    write_str_pair(&mut a, &mut b, &status.title);
    write_str_pair(&mut a, &mut b, &status.owner);
    write_u32_pair(&mut a, &mut b, status.level.to_bits());
    write_u32_pair(&mut a, &mut b, status.health.to_bits());
    write_u8_pair(
        &mut a,
        &mut b,
        match status.faction {
            Faction::Neutral => 0,
            Faction::Enlightened => 1,
            Faction::Resistance => 2,
        },
    );

    write_u64_pair(&mut a, &mut b, status.resonators.len() as u64);
    for reso in &status.resonators {
        write_str_pair(&mut a, &mut b, &reso.position);
        write_u32_pair(&mut a, &mut b, reso.level.to_bits());
        write_u32_pair(&mut a, &mut b, reso.health.to_bits());
        write_str_pair(&mut a, &mut b, &reso.owner);
    }

    write_u64_pair(&mut a, &mut b, status.mods.len() as u64);
    for m in &status.mods {
        write_u8_pair(&mut a, &mut b, m.slot);
        write_str_pair(&mut a, &mut b, &m.kind);
        write_str_pair(&mut a, &mut b, &m.rarity);
        write_str_pair(&mut a, &mut b, &m.owner);
    }

    StatusFingerprint {
        hi: a.finish(),
        lo: b.finish(),
    }
}

fn write_u8_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, v: u8) {
    a.write_u8(v);
    b.write_u8(v);
}

fn write_u32_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, v: u32) {
    a.write_u32(v);
    b.write_u32(v);
}

fn write_u64_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, v: u64) {
    a.write_u64(v);
    b.write_u64(v);
}

fn write_str_pair(a: &mut Fnv1a64, b: &mut Fnv1a64, s: &str) {
    write_u64_pair(a, b, s.len() as u64);
    a.write_bytes(s.as_bytes());
    b.write_bytes(s.as_bytes());
}

/// Dedup gate over a stream of statuses.
///
/// `observe` answers whether the status differs from the last one seen; the
/// frame pump only feeds the animator on `true`.
#[derive(Debug, Default)]
pub struct StatusDedup {
    last: Option<StatusFingerprint>,
}

impl StatusDedup {
    /// A gate that treats the first status as changed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `status`; returns `true` iff its content differs from the
    /// previous observation.
    pub fn observe(&mut self, status: &Status) -> bool {
        let fp = fingerprint_status(status);
        if self.last == Some(fp) {
            return false;
        }
        self.last = Some(fp);
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/portal/fingerprint.rs"]
mod tests;
