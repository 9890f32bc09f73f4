//! Sound-effect selection from portal state transitions.
//!
//! This subscriber watches home-portal messages and derives the names of the
//! ambient track and one-shot effects a player should queue: `e-loss` when
//! the Enlightened lose the portal, `r-capture` when the Resistance take it,
//! and so on. Actual playback is an external collaborator fed through the
//! bounded channels returned from [`start_sfx`].

use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, select, Receiver, Sender};
use tracing::{debug, warn};

use crate::foundation::error::{ObeliskError, ObeliskResult};
use crate::portal::status::{PortalMsg, Status};

/// Timeout for pushing derived effect names to the player.
const SFX_PUSH_TIMEOUT: Duration = Duration::from_secs(1);

/// What one status transition should sound like.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SfxUpdate {
    /// One-shot effects, in play order.
    pub effects: Vec<String>,
    /// New ambient track, when it changes.
    pub ambient: Option<String>,
}

/// Pure transition tracker.
#[derive(Debug, Default)]
pub struct SfxTracker {
    last: Option<Status>,
}

impl SfxTracker {
    /// A tracker with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in a status and derive the sounds for the transition.
    pub fn process(&mut self, status: &Status) -> SfxUpdate {
        let mut update = SfxUpdate::default();

        let first = self.last.is_none();
        let faction_change = self
            .last
            .as_ref()
            .is_some_and(|last| last.faction != status.faction);

        if faction_change {
            if let Some(last) = &self.last {
                update
                    .effects
                    .push(format!("{}-loss", last.faction.sfx_prefix()));
            }
            update
                .effects
                .push(format!("{}-capture", status.faction.sfx_prefix()));
        }

        if faction_change || first {
            update.ambient = Some(format!("{}-ambient", status.faction.sfx_prefix()));
        }

        self.last = Some(status.clone());
        update
    }
}

/// Channels handed to the audio player.
pub struct SfxEvents {
    /// Ambient track changes.
    pub ambient: Receiver<String>,
    /// One-shot effect batches.
    pub effects: Receiver<Vec<String>>,
}

/// Subscribe to the bus and start the transition-tracking thread.
pub fn start_sfx(
    subscribe: &Sender<Sender<PortalMsg>>,
    quit: Receiver<()>,
) -> ObeliskResult<(SfxEvents, JoinHandle<()>)> {
    // Allow messages to queue; only the newest is processed anyway.
    let (status_tx, status_rx) = bounded::<PortalMsg>(10);
    subscribe
        .send_timeout(status_tx, Duration::from_secs(1))
        .map_err(|_| ObeliskError::backpressure("could not subscribe sfx tracker to bus"))?;

    let (ambient_tx, ambient_rx) = bounded::<String>(3);
    let (effects_tx, effects_rx) = bounded::<Vec<String>>(3);

    // A neutral soundscape until the first real status arrives.
    if ambient_tx
        .send_timeout("n-ambient".to_owned(), Duration::from_millis(100))
        .is_err()
    {
        warn!("unable to start the neutral ambient sfx");
    }

    let handle = std::thread::spawn(move || {
        let mut tracker = SfxTracker::new();
        loop {
            select! {
                recv(status_rx) -> msg => {
                    let Ok(msg) = msg else { return };
                    if !msg.home {
                        continue;
                    }
                    // Skip stale messages when the channel has backed up.
                    if !status_rx.is_empty() {
                        continue;
                    }
                    let update = tracker.process(&msg.status);
                    if let Some(ambient) = update.ambient {
                        debug!(%ambient, "ambient track change");
                        if ambient_tx.send_timeout(ambient, SFX_PUSH_TIMEOUT).is_err() {
                            warn!("ambient change dropped, player not draining");
                        }
                    }
                    if !update.effects.is_empty()
                        && effects_tx.send_timeout(update.effects, SFX_PUSH_TIMEOUT).is_err()
                    {
                        warn!("sound effects dropped, player not draining");
                    }
                }
                recv(quit) -> _ => return,
            }
        }
    });

    Ok((
        SfxEvents {
            ambient: ambient_rx,
            effects: effects_rx,
        },
        handle,
    ))
}

#[cfg(test)]
#[path = "../tests/unit/sfx.rs"]
mod tests;
