//! The frame pump: bus subscriber, dedup gate, animation tick and OPC
//! emission.
//!
//! Two cadences share one loop: a 200 ms ingest tick that feeds deduplicated
//! status changes into the animator, and a 30 ms emit tick that pushes the
//! 24 channel frames through the pixel map and out the sink. While the sink
//! is failing the emit tick widens to 250 ms; it snaps back on the first
//! successful write.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{at, bounded, select, tick, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::color::palette::health_color;
use crate::foundation::core::{Rgba8, NUM_RESONATORS};
use crate::foundation::error::{ObeliskError, ObeliskResult};
use crate::mapping::layout::{sculpture_universes, strand_lengths};
use crate::mapping::universe::{PixelMap, UniverseId};
use crate::portal::choreo::{PortalAnimator, PortalSnapshot};
use crate::portal::fingerprint::StatusDedup;
use crate::portal::status::{PortalMsg, Status};
use crate::wire::opc::{sink_for, OpcMessage, PixelSink};

/// Nominal emit cadence.
pub const EMIT_INTERVAL: Duration = Duration::from_millis(30);

/// Emit cadence while the sink is failing.
pub const DEGRADED_INTERVAL: Duration = Duration::from_millis(250);

/// Cadence of the status ingest check.
pub const INGEST_INTERVAL: Duration = Duration::from_millis(200);

/// Where a channel's window lives in the physical buffers.
struct ChannelSlot {
    universe: UniverseId,
    board: usize,
    strand: usize,
    start: usize,
    size: usize,
}

/// The stateful core of the emitter, separated from its threads so tests can
/// drive it with synthetic clocks and sinks.
pub struct FramePump {
    animator: PortalAnimator,
    dedup: StatusDedup,
    map: PixelMap,
    slots: Vec<ChannelSlot>,
}

impl Default for FramePump {
    fn default() -> Self {
        Self::new()
    }
}

impl FramePump {
    /// Build the pump over the sculpture's pixel map.
    pub fn new() -> Self {
        let specs = sculpture_universes();
        let mut map = PixelMap::new(&strand_lengths(&specs));
        let mut slots = Vec::with_capacity(specs.len());
        for spec in &specs {
            if !map.add_universe(&spec.name, &spec.ranges) {
                warn!(universe = %spec.name, "duplicate universe in sculpture table");
                continue;
            }
            let Some(universe) = map.id_for(&spec.name) else {
                continue;
            };
            let r = spec.ranges[0];
            slots.push(ChannelSlot {
                universe,
                board: r.board,
                strand: r.strand,
                start: r.start_pixel,
                size: r.size,
            });
        }
        Self {
            animator: PortalAnimator::new(),
            dedup: StatusDedup::new(),
            map,
            slots,
        }
    }

    /// Feed a status through the dedup gate into the animator. Returns
    /// whether the status was new content.
    pub fn ingest(&mut self, status: &Status, now: Instant) -> bool {
        if !self.dedup.observe(status) {
            return false;
        }
        self.animator.update_status(status, now);
        true
    }

    /// Borrow the animator, mainly for tests asserting on its counters.
    pub fn animator(&self) -> &PortalAnimator {
        &self.animator
    }

    /// Advance the animation one tick and emit all 24 channels.
    ///
    /// Frames are scattered into the pixel map by universe, then each
    /// channel's window is read back out of its strand buffer and framed as
    /// one Set Pixel Colours message.
    pub fn render(&mut self, now: Instant, sink: &mut dyn PixelSink) -> ObeliskResult<()> {
        let frames = self.animator.get_frame(now);
        for (frame, slot) in frames.iter().zip(&self.slots) {
            self.map.update_universe(slot.universe, &frame.data)?;
        }

        for (idx, slot) in self.slots.iter().enumerate() {
            let strand = self.map.strand_data(slot.board, slot.strand)?;
            let window = &strand[slot.start..slot.start + slot.size];
            let msg = OpcMessage::set_pixels((idx + 1) as u8, window)?;
            sink.write(&msg)?;
        }
        Ok(())
    }

    /// Broadcast the simple per-resonator health pattern instead of the
    /// animation output. Eight pixels on channel 0, coloured from the
    /// faction health gradient.
    pub fn render_debug(
        &mut self,
        status: Option<&Status>,
        sink: &mut dyn PixelSink,
    ) -> ObeliskResult<()> {
        let mut pixels = [Rgba8::uninitialised(); NUM_RESONATORS];
        if let Some(status) = status {
            let snapshot = PortalSnapshot::from_status(status);
            for (px, reso) in pixels.iter_mut().zip(snapshot.resonators.iter()) {
                *px = if reso.health > 0.0 {
                    health_color(status.faction, reso.health)
                } else {
                    Rgba8::BLACK
                };
            }
        }
        sink.write(&OpcMessage::set_pixels(0, &pixels)?)
    }
}

/// Configuration for the emitter threads.
pub struct EmitterConfig {
    /// Pixel server address, or `/dev/null` for the discard sink.
    pub server: String,
    /// Emit the 8-LED health debug pattern instead of the animation.
    pub debug_leds: bool,
}

/// Subscribe to the bus and start the listener and pump threads.
pub fn start_frame_emitter(
    cfg: EmitterConfig,
    subscribe: &Sender<Sender<PortalMsg>>,
    error_tx: Sender<ObeliskError>,
    quit: Receiver<()>,
) -> ObeliskResult<Vec<JoinHandle<()>>> {
    let (status_tx, status_rx) = bounded::<PortalMsg>(1);
    subscribe
        .send_timeout(status_tx, Duration::from_secs(1))
        .map_err(|_| ObeliskError::backpressure("could not subscribe frame emitter to bus"))?;

    let last: Arc<Mutex<Option<Status>>> = Arc::new(Mutex::new(None));

    let listener_last = Arc::clone(&last);
    let listener_quit = quit.clone();
    let listener = std::thread::spawn(move || {
        loop {
            select! {
                recv(status_rx) -> msg => {
                    let Ok(msg) = msg else { return };
                    if msg.home {
                        *listener_last.lock() = Some(msg.status);
                    }
                }
                recv(listener_quit) -> _ => return,
            }
        }
    });

    let pump_thread = std::thread::spawn(move || {
        let mut pump = FramePump::new();
        let mut sink = sink_for(&cfg.server);
        let mut refresh = EMIT_INTERVAL;
        let mut degraded = false;
        let ingest = tick(INGEST_INTERVAL);
        let mut next_emit = Instant::now() + refresh;

        loop {
            select! {
                recv(quit) -> _ => return,
                recv(ingest) -> _ => {
                    let status = last.lock().clone();
                    if let Some(status) = status {
                        pump.ingest(&status, Instant::now());
                    }
                }
                recv(at(next_emit)) -> _ => {
                    let result = if cfg.debug_leds {
                        let status = last.lock().clone();
                        pump.render_debug(status.as_ref(), sink.as_mut())
                    } else {
                        pump.render(Instant::now(), sink.as_mut())
                    };
                    match result {
                        Ok(()) => {
                            if degraded {
                                info!(server = %cfg.server, "pixel server recovered");
                                degraded = false;
                            }
                            refresh = EMIT_INTERVAL;
                        }
                        Err(err) => {
                            if !degraded {
                                warn!(server = %cfg.server, %err, "pixel write failing; slowing emit cadence");
                                let _ = error_tx.send_timeout(err, Duration::from_millis(500));
                                degraded = true;
                            }
                            refresh = DEGRADED_INTERVAL;
                        }
                    }
                    next_emit = Instant::now() + refresh;
                }
            }
        }
    });

    Ok(vec![listener, pump_thread])
}

#[cfg(test)]
#[path = "../../tests/unit/wire/emitter.rs"]
mod tests;
