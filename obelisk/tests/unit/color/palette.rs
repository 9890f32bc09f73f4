use super::*;

#[test]
fn faction_color_is_total() {
    for faction in [Faction::Enlightened, Faction::Resistance, Faction::Neutral] {
        let c = faction_color(faction);
        assert_ne!(c.a, 0, "{faction:?} colour must be initialised");
    }
    assert_eq!(faction_color(Faction::Enlightened), Rgba8::from_hex(0x00ff00));
    assert_eq!(faction_color(Faction::Resistance), Rgba8::from_hex(0x0000ff));
}

#[test]
fn resonator_palette_matches_known_levels() {
    assert_eq!(RESONATOR_LEVEL_COLORS.len(), 9);
    assert_eq!(RESONATOR_LEVEL_COLORS[0], Rgba8::from_hex(0x000000));
    assert_eq!(RESONATOR_LEVEL_COLORS[3], Rgba8::from_hex(0xCC3300));
    assert_eq!(RESONATOR_LEVEL_COLORS[7], Rgba8::from_hex(0x990066));
    assert_eq!(RESONATOR_LEVEL_COLORS[8], Rgba8::from_hex(0x660066));
}

#[test]
fn health_gradients_span_their_endpoints() {
    let lowest = ENL_HEALTH[0];
    let weak = Rgba8::from_hex(0x0A3306);
    assert!(lowest.r.abs_diff(weak.r) <= 1);
    assert!(lowest.g.abs_diff(weak.g) <= 1);
    assert!(lowest.b.abs_diff(weak.b) <= 1);

    // Full health sits one blend step shy of the bright endpoint.
    let brightest = ENL_HEALTH[100];
    assert!(brightest.g > 0xE0);

    assert!(RES_HEALTH[100].b > RES_HEALTH[0].b);
}

#[test]
fn health_color_clamps_and_selects() {
    assert_eq!(health_color(Faction::Enlightened, -5.0), ENL_HEALTH[0]);
    assert_eq!(health_color(Faction::Enlightened, 250.0), ENL_HEALTH[100]);
    assert_eq!(health_color(Faction::Resistance, 50.0), RES_HEALTH[50]);
    assert_eq!(health_color(Faction::Neutral, 100.0), Rgba8::from_hex(0x0d0d0d));
}
