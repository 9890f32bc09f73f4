//! The portal choreographer: turns status transitions into sequences.
//!
//! Owns the shaft-window sequence runner and a parallel per-resonator
//! pipeline of small looping effect queues. `update_status` diffs the
//! incoming snapshot against the cached one and synthesises the appropriate
//! sequences; `get_frame` advances everything one tick and hands back the
//! 24 channel buffers in wire order.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, warn};

use crate::color::palette::{faction_color, FLARE_RED, NEUTRAL_WHITE, RESONATOR_LEVEL_COLORS};
use crate::effects::effect::Effect;
use crate::foundation::core::{
    OpcChannel, Rgba8, NUM_RESONATORS, NUM_SHAFT_WINDOWS, WINDOW_SIZE,
};
use crate::mapping::universe::UniverseId;
use crate::portal::status::{compass_slot, Faction, Status};
use crate::sequence::runner::SequenceRunner;
use crate::sequence::step::{Operation, Sequence, Step};

/// How much a resonator pulse dims its colour.
const RESO_DIM_RATIO: f64 = 0.7;

/// Full cycle time of the resonator pulse.
const RESO_PULSE_PERIOD: Duration = Duration::from_secs(3);

/// Capacity of each resonator effect queue and of the pending-sequence
/// queue.
const QUEUE_CAPACITY: usize = 5;

/// Hold time of the owned-wave solid step for a portal level.
fn solid_hold(level: f32) -> Duration {
    Duration::from_secs_f64(0.125 * f64::from(level.clamp(0.0, 8.0)))
}

/// Animation-side view of one resonator.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ResonatorState {
    /// Level 0 (undeployed) to 8.
    pub level: u8,
    /// Health 0-100.
    pub health: f32,
}

/// Animation-side snapshot of the portal, slotted and normalised.
#[derive(Clone, Debug, PartialEq)]
pub struct PortalSnapshot {
    /// Owning faction.
    pub faction: Faction,
    /// Portal level 0-8.
    pub level: f32,
    /// Resonators in compass slot order.
    pub resonators: [ResonatorState; NUM_RESONATORS],
}

impl Default for PortalSnapshot {
    fn default() -> Self {
        Self {
            faction: Faction::Neutral,
            level: 0.0,
            resonators: [ResonatorState::default(); NUM_RESONATORS],
        }
    }
}

impl PortalSnapshot {
    /// Slot a canonical status into the fixed eight compass positions.
    ///
    /// Positions absent from the status are undeployed; a resonator naming
    /// an unknown position is ignored.
    pub fn from_status(status: &Status) -> Self {
        let mut resonators = [ResonatorState::default(); NUM_RESONATORS];
        for reso in &status.resonators {
            match compass_slot(&reso.position) {
                Some(slot) => {
                    resonators[slot] = ResonatorState {
                        level: reso.level.clamp(0.0, 8.0) as u8,
                        health: reso.health.clamp(0.0, 100.0),
                    };
                }
                None => {
                    warn!(position = %reso.position, "resonator at unknown compass position ignored");
                }
            }
        }
        if status.resonators.len() < NUM_RESONATORS {
            debug!(
                deployed = status.resonators.len(),
                "missing resonators treated as undeployed"
            );
        }
        Self {
            faction: status.faction,
            level: status.level,
            resonators,
        }
    }
}

/// Bounded FIFO of effects for one resonator window.
#[derive(Debug, Default)]
struct EffectRing {
    queue: VecDeque<Effect>,
}

impl EffectRing {
    fn clear(&mut self) {
        self.queue.clear();
    }

    fn enqueue(&mut self, effect: Effect) {
        if self.queue.len() >= QUEUE_CAPACITY {
            warn!("resonator effect queue full; dropping enqueue");
            return;
        }
        self.queue.push_back(effect);
    }

    fn head_mut(&mut self) -> Option<&mut Effect> {
        self.queue.front_mut()
    }

    fn advance(&mut self) -> Option<&mut Effect> {
        self.queue.pop_front();
        self.queue.front_mut()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }
}

/// Frame data for one OPC channel.
#[derive(Clone, Debug)]
pub struct ChannelFrame {
    /// Wire channel, 1-based.
    pub channel: OpcChannel,
    /// Pixel data for the channel's window.
    pub data: Vec<Rgba8>,
}

/// The animation state of the whole portal.
pub struct PortalAnimator {
    current: PortalSnapshot,
    runner: SequenceRunner,
    pending: VecDeque<Sequence>,
    resonators: Vec<EffectRing>,
    frames: Vec<ChannelFrame>,
    builds: u64,
}

impl Default for PortalAnimator {
    fn default() -> Self {
        Self::new()
    }
}

impl PortalAnimator {
    /// A dark, neutral portal with nothing scheduled.
    pub fn new() -> Self {
        let sizes = vec![WINDOW_SIZE; NUM_SHAFT_WINDOWS];
        let frames = (0..NUM_RESONATORS + NUM_SHAFT_WINDOWS)
            .map(|idx| ChannelFrame {
                channel: (idx + 1) as OpcChannel,
                data: vec![Rgba8::uninitialised(); WINDOW_SIZE],
            })
            .collect();
        Self {
            current: PortalSnapshot::default(),
            runner: SequenceRunner::new(&sizes),
            pending: VecDeque::new(),
            resonators: (0..NUM_RESONATORS).map(|_| EffectRing::default()).collect(),
            frames,
            builds: 0,
        }
    }

    /// Number of full sequence rebuilds triggered so far. Level-only retimes
    /// and resonator queue resets do not count.
    pub fn sequence_builds(&self) -> u64 {
        self.builds
    }

    /// The shaft sequence runner, for introspection.
    pub fn runner(&self) -> &SequenceRunner {
        &self.runner
    }

    /// Diff `status` against the cached snapshot and react.
    ///
    /// A faction change rebuilds the shaft choreography; a level change under
    /// the same owning faction only retimes the solid hold of the running
    /// waves; each resonator level change resets that resonator's queue.
    pub fn update_status(&mut self, status: &Status, now: Instant) {
        let new = PortalSnapshot::from_status(status);

        if new.faction != self.current.faction {
            self.rebuild_portal(new.faction, new.level, now);
        } else if new.faction != Faction::Neutral && new.level != self.current.level {
            // Retime rather than rebuild: the running waves keep their phase.
            // Pending sequences carry the old hold too, so they are retimed
            // in place as well.
            let hold = solid_hold(new.level);
            for idx in 0..NUM_SHAFT_WINDOWS {
                let name = format!("solid{idx}");
                self.runner.retime_step(&name, hold);
                for pending in &mut self.pending {
                    if let Some(step) = pending.step_mut(&name) {
                        step.effect.set_solid_duration(hold);
                    }
                }
            }
        }

        for idx in 0..NUM_RESONATORS {
            if new.resonators[idx].level != self.current.resonators[idx].level {
                self.update_resonator(idx, new.resonators[idx].level, now);
            }
        }

        self.current = new;
    }

    fn rebuild_portal(&mut self, faction: Faction, level: f32, now: Instant) {
        self.builds += 1;
        self.pending.clear();
        match faction {
            Faction::Neutral => {
                self.runner.install(neutral_portal_sequence(), now);
            }
            owned => {
                // The takeover pulse plays first; the waves start when it
                // finishes.
                self.runner.install(takeover_sequence(owned), now);
                self.enqueue_sequence(owned_portal_sequence(owned, level));
            }
        }
    }

    fn enqueue_sequence(&mut self, sequence: Sequence) {
        if self.pending.len() >= QUEUE_CAPACITY {
            warn!("pending sequence queue full; dropping sequence");
            return;
        }
        self.pending.push_back(sequence);
    }

    fn update_resonator(&mut self, index: usize, level: u8, now: Instant) {
        let ring = &mut self.resonators[index];
        ring.clear();
        if level == 0 {
            ring.enqueue(Effect::interpolate_to_current(
                Rgba8::BLACK,
                Duration::from_secs(1),
            ));
            ring.enqueue(Effect::solid(Rgba8::BLACK));
        } else {
            let color = RESONATOR_LEVEL_COLORS[usize::from(level.min(8))];
            ring.enqueue(Effect::interpolate_to_current(color, Duration::from_secs(1)));
            ring.enqueue(Effect::dimming_pulse(color, RESO_DIM_RATIO, RESO_PULSE_PERIOD));
        }
        if let Some(head) = ring.head_mut() {
            head.start(now);
        }
    }

    /// Produce one frame for every channel: eight resonator slices followed
    /// by sixteen shaft slices.
    ///
    /// The returned buffers are reused between frames; callers must copy
    /// anything they want to keep.
    pub fn get_frame(&mut self, now: Instant) -> &[ChannelFrame] {
        for idx in 0..NUM_RESONATORS {
            self.resonator_frame(idx, now);
        }

        if self.runner.process_frame(now) {
            if let Some(sequence) = self.pending.pop_front() {
                self.runner.install(sequence, now);
            }
        }
        for idx in 0..NUM_SHAFT_WINDOWS {
            let data = self.runner.universe_data(UniverseId(idx));
            self.frames[NUM_RESONATORS + idx].data.copy_from_slice(data);
        }

        &self.frames
    }

    /// Advance one resonator queue and scale its output by health.
    ///
    /// Resonator animations loop: a finished head restarts when it is alone,
    /// otherwise the queue moves on.
    fn resonator_frame(&mut self, index: usize, now: Instant) {
        let ring = &mut self.resonators[index];
        let Some(effect) = ring.head_mut() else {
            return;
        };
        let buf = &mut self.frames[index].data;
        let done = effect.frame(buf, now);
        apply_brightness(buf, self.current.resonators[index].health / 100.0);
        if done {
            if ring.len() == 1 {
                if let Some(head) = ring.head_mut() {
                    head.start(now);
                }
            } else if let Some(next) = ring.advance() {
                next.start(now);
            }
        }
    }
}

/// Uniform RGB scale; alpha is left alone.
fn apply_brightness(buf: &mut [Rgba8], brightness: f32) {
    let b = brightness.clamp(0.0, 1.0);
    for px in buf {
        px.r = (f32::from(px.r) * b) as u8;
        px.g = (f32::from(px.g) * b) as u8;
        px.b = (f32::from(px.b) * b) as u8;
    }
}

/// The owned-portal wave: per universe `in -> solid -> out`, chained across
/// universes as `in[i] -> in[(i+2) mod 16]` so two interleaved waves
/// propagate up the shaft. The cross-links form a cycle, so the sequence
/// runs until something replaces it.
pub fn owned_portal_sequence(faction: Faction, level: f32) -> Sequence {
    let color = faction_color(faction);
    let hold = solid_hold(level);
    let mut seq = Sequence::new();
    for idx in 0..NUM_SHAFT_WINDOWS {
        let universe = UniverseId(idx);
        seq.add_step(
            format!("in{idx}"),
            Step::new(
                universe,
                Effect::interpolate_to_current(color, Duration::from_millis(250)),
            )
            .then_do_immediately(format!("solid{idx}"))
            .then_do_immediately(format!("in{}", (idx + 2) % NUM_SHAFT_WINDOWS)),
        );
        seq.add_step(
            format!("solid{idx}"),
            Step::new(universe, Effect::timed_solid(color, hold))
                .then_do_immediately(format!("out{idx}")),
        );
        seq.add_step(
            format!("out{idx}"),
            Step::new(
                universe,
                Effect::interpolate_to_current(Rgba8::BLACK, Duration::from_millis(500)),
            ),
        );
    }
    seq.add_initial_operation(Operation::immediate("in0"));
    seq.add_initial_operation(Operation::immediate("in1"));
    seq
}

/// The capture flash played before the owned waves: every window drains to
/// black, then runs one full 1.5 s pulse cycle between black and the faction
/// colour. Unlike a free-running pulse this completes, handing over to
/// whatever is queued behind it.
pub fn takeover_sequence(faction: Faction) -> Sequence {
    let color = faction_color(faction);
    let mut seq = Sequence::new();
    for idx in 0..NUM_SHAFT_WINDOWS {
        let universe = UniverseId(idx);
        seq.add_initial_step(
            format!("drain{idx}"),
            Step::new(
                universe,
                Effect::interpolate_to_current(Rgba8::BLACK, Duration::from_millis(250)),
            )
            .then_do_immediately(format!("rise{idx}")),
        );
        seq.add_step(
            format!("rise{idx}"),
            Step::new(
                universe,
                Effect::interpolate_solid(Rgba8::BLACK, color, Duration::from_millis(750)),
            )
            .then_do_immediately(format!("fall{idx}")),
        );
        seq.add_step(
            format!("fall{idx}"),
            Step::new(
                universe,
                Effect::interpolate_solid(color, Rgba8::BLACK, Duration::from_millis(750)),
            ),
        );
    }
    seq
}

/// The neutral-loss choreography: fade to black, flare red, ebb to black,
/// then after a per-window random pause settle on dim white. No tail chain;
/// the sculpture rests lit until the next capture.
pub fn neutral_portal_sequence() -> Sequence {
    let mut rng = rand::rng();
    let mut seq = Sequence::new();
    for idx in 0..NUM_SHAFT_WINDOWS {
        let universe = UniverseId(idx);
        let pause = Duration::from_secs_f64(rng.random_range(0.0..3.0));
        seq.add_initial_step(
            format!("fade{idx}"),
            Step::new(
                universe,
                Effect::interpolate_to_current(Rgba8::BLACK, Duration::from_secs(1)),
            )
            .then_do_immediately(format!("flare{idx}")),
        );
        seq.add_step(
            format!("flare{idx}"),
            Step::new(
                universe,
                Effect::interpolate_to_current(FLARE_RED, Duration::from_millis(250)),
            )
            .then_do_immediately(format!("ebb{idx}")),
        );
        seq.add_step(
            format!("ebb{idx}"),
            Step::new(
                universe,
                Effect::interpolate_to_current(Rgba8::BLACK, Duration::from_millis(1500)),
            )
            .then_do(format!("settle{idx}"), pause),
        );
        seq.add_step(
            format!("settle{idx}"),
            Step::new(
                universe,
                Effect::interpolate_to_current(NEUTRAL_WHITE, Duration::from_secs(1)),
            )
            .then_do_immediately(format!("rest{idx}")),
        );
        seq.add_step(
            format!("rest{idx}"),
            Step::new(universe, Effect::solid(NEUTRAL_WHITE)),
        );
    }
    seq
}

#[cfg(test)]
#[path = "../../tests/unit/portal/choreo.rs"]
mod tests;
