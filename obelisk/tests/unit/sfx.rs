use super::*;
use crate::portal::status::Faction;

fn status(faction: Faction) -> Status {
    Status {
        faction,
        ..Status::default()
    }
}

#[test]
fn first_status_only_sets_the_ambient_track() {
    let mut tracker = SfxTracker::new();
    let update = tracker.process(&status(Faction::Enlightened));
    assert!(update.effects.is_empty());
    assert_eq!(update.ambient.as_deref(), Some("e-ambient"));
}

#[test]
fn faction_change_plays_loss_then_capture() {
    let mut tracker = SfxTracker::new();
    tracker.process(&status(Faction::Enlightened));

    let update = tracker.process(&status(Faction::Resistance));
    assert_eq!(update.effects, vec!["e-loss".to_owned(), "r-capture".to_owned()]);
    assert_eq!(update.ambient.as_deref(), Some("r-ambient"));
}

#[test]
fn neutralisation_counts_as_a_faction_change() {
    let mut tracker = SfxTracker::new();
    tracker.process(&status(Faction::Resistance));

    let update = tracker.process(&status(Faction::Neutral));
    assert_eq!(update.effects, vec!["r-loss".to_owned(), "n-capture".to_owned()]);
    assert_eq!(update.ambient.as_deref(), Some("n-ambient"));
}

#[test]
fn unchanged_faction_is_silent() {
    let mut tracker = SfxTracker::new();
    tracker.process(&status(Faction::Enlightened));

    let mut same = status(Faction::Enlightened);
    same.level = 7.0;
    let update = tracker.process(&same);
    assert!(update.effects.is_empty());
    assert!(update.ambient.is_none());
}
