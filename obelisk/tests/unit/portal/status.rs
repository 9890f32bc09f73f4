use super::*;

#[test]
fn compass_slots_cover_all_eight_directions() {
    for (idx, pos) in COMPASS.iter().enumerate() {
        assert_eq!(compass_slot(pos), Some(idx));
    }
    assert_eq!(compass_slot("NNE"), None);
    assert_eq!(compass_slot(""), None);
}

#[test]
fn faction_letters_are_the_wire_codes() {
    assert_eq!(Faction::Enlightened.letter(), 'E');
    assert_eq!(Faction::Resistance.letter(), 'R');
    assert_eq!(Faction::Neutral.letter(), 'N');
    assert_eq!(Faction::default(), Faction::Neutral);
}

#[test]
fn clone_is_structural_and_compares_equal() {
    let status = Status {
        title: "Camp Navarro".to_owned(),
        owner: "agent".to_owned(),
        level: 3.5,
        health: 92.0,
        faction: Faction::Enlightened,
        mods: vec![Mod {
            owner: "agent".to_owned(),
            slot: 0,
            kind: "PS".to_owned(),
            rarity: "VR".to_owned(),
        }],
        resonators: vec![Resonator {
            position: "NE".to_owned(),
            level: 7.0,
            health: 88.0,
            owner: "agent".to_owned(),
        }],
    };

    let copy = status.clone();
    assert_eq!(copy, status);

    // And survives a serde round trip unchanged.
    let json = serde_json::to_string(&status).unwrap();
    let back: Status = serde_json::from_str(&json).unwrap();
    assert_eq!(back, status);
}
