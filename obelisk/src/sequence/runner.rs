//! Frame-by-frame execution of a [`Sequence`].

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use tracing::warn;

use crate::foundation::core::Rgba8;
use crate::mapping::universe::UniverseId;
use crate::sequence::step::{Operation, Sequence};

/// A step waiting for its scheduled start time.
#[derive(Clone, Debug)]
struct ScheduledStep {
    run_at: Instant,
    step: String,
}

/// Executes one sequence, one frame per universe per tick.
///
/// Steps live in the installed sequence's name-keyed map; the scheduling
/// queues hold names, so a step can appear in several places (cycles,
/// restarts) without aliasing its effect state.
pub struct SequenceRunner {
    awaiting_time: Vec<ScheduledStep>,
    active_by_universe: Vec<VecDeque<String>>,
    buffers: Vec<Vec<Rgba8>>,
    current: Sequence,
}

impl SequenceRunner {
    /// Create a runner for universes of the given sizes. Universe IDs index
    /// into the slice and are expected to start at 0 and be consecutive.
    pub fn new(universe_sizes: &[usize]) -> Self {
        Self {
            awaiting_time: Vec::with_capacity(8),
            active_by_universe: universe_sizes
                .iter()
                .map(|_| VecDeque::with_capacity(8))
                .collect(),
            buffers: universe_sizes
                .iter()
                .map(|&size| vec![Rgba8::uninitialised(); size])
                .collect(),
            current: Sequence::new(),
        }
    }

    /// Install `sequence`, replacing any sequence in progress.
    ///
    /// Both queues are cleared, then each initial operation either starts its
    /// step immediately or schedules it at `now + delay`.
    pub fn install(&mut self, sequence: Sequence, now: Instant) {
        self.current = sequence;
        self.awaiting_time.clear();
        for queue in &mut self.active_by_universe {
            queue.clear();
        }

        let initial: Vec<Operation> = self.current.initial_operations().to_vec();
        for operation in initial {
            self.process_operation(operation, now);
        }
    }

    /// Start the named step now or schedule it for later.
    ///
    /// A follow-on naming a non-existent step is discarded with a warning and
    /// the sequence continues.
    fn process_operation(&mut self, operation: Operation, now: Instant) {
        if self.current.step(&operation.step).is_none() {
            warn!(step = %operation.step, "operation names an unknown step; ignoring");
            return;
        }
        if operation.delay > Duration::ZERO {
            self.awaiting_time.push(ScheduledStep {
                run_at: now + operation.delay,
                step: operation.step,
            });
        } else {
            self.start_step(operation.step, now);
        }
    }

    /// Start the effect and join the tail of its universe's queue. A queued
    /// head is never preempted.
    fn start_step(&mut self, name: String, now: Instant) {
        let Some(step) = self.current.step_mut(&name) else {
            return;
        };
        step.effect.start(now);
        let universe = step.universe.0;
        match self.active_by_universe.get_mut(universe) {
            Some(queue) => queue.push_back(name),
            None => warn!(universe, step = %name, "step targets an unknown universe"),
        }
    }

    /// Promote scheduled steps whose time has come.
    fn check_scheduled(&mut self, now: Instant) {
        let mut idx = 0;
        while idx < self.awaiting_time.len() {
            if now >= self.awaiting_time[idx].run_at {
                let due = self.awaiting_time.swap_remove(idx);
                self.start_step(due.step, now);
            } else {
                idx += 1;
            }
        }
    }

    /// Generate frame data for instant `now`, which should be monotonically
    /// increasing across calls.
    ///
    /// Scheduled promotions happen before frame generation, so a step
    /// scheduled for this tick gets a frame this tick. Returns `true` once
    /// every universe queue is empty and nothing remains scheduled.
    pub fn process_frame(&mut self, now: Instant) -> bool {
        self.check_scheduled(now);

        for universe in 0..self.active_by_universe.len() {
            let Some(name) = self.active_by_universe[universe].front().cloned() else {
                continue;
            };
            let done = match self.current.step_mut(&name) {
                Some(step) => step.effect.frame(&mut self.buffers[universe], now),
                // Installed over; the queue entry is stale.
                None => true,
            };
            if done {
                self.complete_step(universe, &name, now);
            }
        }

        self.active_by_universe.iter().all(VecDeque::is_empty) && self.awaiting_time.is_empty()
    }

    /// Remove the completed head and fire its follow-ons in declaration
    /// order.
    fn complete_step(&mut self, universe: usize, name: &str, now: Instant) {
        if let Some(queue) = self.active_by_universe.get_mut(universe) {
            if queue.front().is_some_and(|head| head == name) {
                queue.pop_front();
            }
        }

        let follow_ons: Vec<Operation> = self
            .current
            .step(name)
            .map(|step| step.next.clone())
            .unwrap_or_default();
        for operation in follow_ons {
            self.process_operation(operation, now);
        }
    }

    /// Current data for the universe, updated by `process_frame` and stable
    /// until the next call.
    pub fn universe_data(&self, id: UniverseId) -> &[Rgba8] {
        self.buffers.get(id.0).map_or(&[], Vec::as_slice)
    }

    /// Rewrite the hold duration of the named solid step in the installed
    /// sequence. Returns `false` when the step is missing or not a solid.
    pub fn retime_step(&mut self, name: &str, duration: Duration) -> bool {
        match self.current.step_mut(name) {
            Some(step) => step.effect.set_solid_duration(duration),
            None => false,
        }
    }

    /// The installed sequence.
    pub fn sequence(&self) -> &Sequence {
        &self.current
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/runner.rs"]
mod tests;
