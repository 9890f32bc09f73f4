use super::*;
use crate::foundation::core::WINDOW_SIZE;
use crate::portal::status::{Faction, Resonator, COMPASS};
use crate::wire::opc::MemorySink;

fn full_status(faction: Faction, level: f32) -> Status {
    Status {
        title: "Obelisk".to_owned(),
        level,
        health: 100.0,
        faction,
        resonators: COMPASS
            .iter()
            .map(|p| Resonator {
                position: (*p).to_owned(),
                level: 3.0,
                health: 100.0,
                owner: "agent".to_owned(),
            })
            .collect(),
        ..Status::default()
    }
}

#[test]
fn render_emits_all_24_channels_in_order() {
    let t0 = Instant::now();
    let mut pump = FramePump::new();
    let mut sink = MemorySink::new();
    pump.render(t0, &mut sink).unwrap();

    assert_eq!(sink.messages.len(), 24);
    for (idx, msg) in sink.messages.iter().enumerate() {
        assert_eq!(msg.channel as usize, idx + 1);
        assert_eq!(msg.data.len(), 3 * WINDOW_SIZE);
        // Nothing has animated yet; every pixel goes out black.
        assert!(msg.data.iter().all(|&b| b == 0));
    }
}

#[test]
fn ingest_deduplicates_on_content() {
    let t0 = Instant::now();
    let mut pump = FramePump::new();
    let status = full_status(Faction::Enlightened, 3.0);

    assert!(pump.ingest(&status, t0));
    assert!(!pump.ingest(&status, t0 + Duration::from_millis(10)));
    assert!(!pump.ingest(&status.clone(), t0 + Duration::from_millis(20)));
    assert_eq!(pump.animator().sequence_builds(), 1);

    let mut changed = status.clone();
    changed.level = 4.0;
    assert!(pump.ingest(&changed, t0 + Duration::from_millis(30)));
    // A level-only change retimes rather than rebuilds.
    assert_eq!(pump.animator().sequence_builds(), 1);
}

#[test]
fn animation_reaches_the_wire() {
    let t0 = Instant::now();
    let mut pump = FramePump::new();
    pump.ingest(&full_status(Faction::Enlightened, 3.0), t0);

    let mut sink = MemorySink::new();
    // Run well past the resonator fade-in.
    for i in 1..=60 {
        pump.render(t0 + Duration::from_millis(30 * i), &mut sink).unwrap();
    }

    let last_frame = &sink.messages[sink.messages.len() - 24..];
    // Resonator channels show the L3 colour family: red-dominant.
    let reso = &last_frame[0];
    let (r, g, b) = (reso.data[0], reso.data[1], reso.data[2]);
    assert!(r > g && r > b, "expected red-dominant L3 resonator, got {r},{g},{b}");
    assert!(r > 0x40);
}

#[test]
fn debug_pattern_broadcasts_eight_health_pixels() {
    let mut pump = FramePump::new();
    let mut sink = MemorySink::new();

    let mut status = full_status(Faction::Resistance, 5.0);
    status.resonators[2].health = 0.0;
    pump.render_debug(Some(&status), &mut sink).unwrap();

    assert_eq!(sink.messages.len(), 1);
    let msg = &sink.messages[0];
    assert_eq!(msg.channel, 0);
    assert_eq!(msg.data.len(), 3 * 8);

    let pixels = msg.pixels();
    // Healthy Resistance resonators glow blue; the dead one is black.
    assert!(pixels[0].b > pixels[0].r);
    assert_eq!((pixels[2].r, pixels[2].g, pixels[2].b), (0, 0, 0));
}

#[test]
fn debug_pattern_without_status_is_dark() {
    let mut pump = FramePump::new();
    let mut sink = MemorySink::new();
    pump.render_debug(None, &mut sink).unwrap();
    assert!(sink.messages[0].data.iter().all(|&b| b == 0));
}
