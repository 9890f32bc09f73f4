use super::*;
use crate::portal::status::{Mod, Resonator};

fn status() -> Status {
    Status {
        title: "Water Tower".to_owned(),
        owner: "agent".to_owned(),
        level: 5.0,
        health: 80.0,
        faction: Faction::Resistance,
        mods: vec![Mod {
            owner: String::new(),
            slot: 1,
            kind: "HS".to_owned(),
            rarity: "C".to_owned(),
        }],
        resonators: vec![Resonator {
            position: "N".to_owned(),
            level: 6.0,
            health: 75.0,
            owner: "agent".to_owned(),
        }],
    }
}

#[test]
fn byte_identical_clones_fingerprint_identically() {
    let a = status();
    let b = a.clone();
    assert_eq!(fingerprint_status(&a), fingerprint_status(&b));
}

#[test]
fn every_field_reaches_the_fingerprint() {
    let base = fingerprint_status(&status());

    let mut s = status();
    s.health = 79.0;
    assert_ne!(fingerprint_status(&s), base);

    let mut s = status();
    s.faction = Faction::Enlightened;
    assert_ne!(fingerprint_status(&s), base);

    let mut s = status();
    s.resonators[0].level = 7.0;
    assert_ne!(fingerprint_status(&s), base);

    let mut s = status();
    s.mods.clear();
    assert_ne!(fingerprint_status(&s), base);

    let mut s = status();
    s.title.push('!');
    assert_ne!(fingerprint_status(&s), base);
}

#[test]
fn dedup_gate_collapses_identical_statuses() {
    let mut gate = StatusDedup::new();
    let s = status();
    assert!(gate.observe(&s));
    assert!(!gate.observe(&s));
    assert!(!gate.observe(&s.clone()));

    let mut changed = s.clone();
    changed.level = 6.0;
    assert!(gate.observe(&changed));
    // And the old content registers as a change again.
    assert!(gate.observe(&s));
}
