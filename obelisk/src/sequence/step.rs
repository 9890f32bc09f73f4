//! Sequencing primitives: operations, steps and named step graphs.

use std::collections::HashMap;
use std::time::Duration;

use crate::effects::effect::Effect;
use crate::mapping::universe::UniverseId;

/// A follow-on operation: run the named step, optionally after a delay.
#[derive(Clone, Debug)]
pub struct Operation {
    /// Name of the step to run next.
    pub step: String,
    /// Delay applied before the step starts.
    pub delay: Duration,
}

impl Operation {
    /// Operation with a delay.
    pub fn after(step: impl Into<String>, delay: Duration) -> Self {
        Self {
            step: step.into(),
            delay,
        }
    }

    /// Operation that runs immediately.
    pub fn immediate(step: impl Into<String>) -> Self {
        Self::after(step, Duration::ZERO)
    }
}

/// One effect bound to one universe, plus follow-on operations fired when the
/// effect completes.
#[derive(Clone, Debug)]
pub struct Step {
    /// Target universe.
    pub universe: UniverseId,
    /// The effect this step plays.
    pub effect: Effect,
    /// Operations processed, in declaration order, on completion.
    pub next: Vec<Operation>,
}

impl Step {
    /// Bind `effect` to `universe` with no follow-ons.
    pub fn new(universe: UniverseId, effect: Effect) -> Self {
        Self {
            universe,
            effect,
            next: Vec::new(),
        }
    }

    /// Append a follow-on operation with a delay.
    pub fn then_do(mut self, step: impl Into<String>, delay: Duration) -> Self {
        self.next.push(Operation::after(step, delay));
        self
    }

    /// Append a follow-on operation that runs immediately.
    pub fn then_do_immediately(self, step: impl Into<String>) -> Self {
        self.then_do(step, Duration::ZERO)
    }
}

/// A named map of steps plus the initial operations scheduled against the
/// sequence's start time.
#[derive(Clone, Debug, Default)]
pub struct Sequence {
    steps: HashMap<String, Step>,
    initial: Vec<Operation>,
}

impl Sequence {
    /// An empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a step under `name`, replacing any previous step of that name.
    pub fn add_step(&mut self, name: impl Into<String>, step: Step) -> &mut Self {
        self.steps.insert(name.into(), step);
        self
    }

    /// Add an initial operation.
    pub fn add_initial_operation(&mut self, operation: Operation) -> &mut Self {
        self.initial.push(operation);
        self
    }

    /// Add a step and schedule it to run at sequence start.
    pub fn add_initial_step(&mut self, name: impl Into<String>, step: Step) -> &mut Self {
        let name = name.into();
        self.add_step(name.clone(), step);
        self.add_initial_operation(Operation::immediate(name))
    }

    /// Chain the named steps into a cycle, each running the next immediately
    /// on completion, the last looping back to the first.
    pub fn create_step_cycle(&mut self, names: &[&str]) -> &mut Self {
        for idx in 0..names.len() {
            let next = names[(idx + 1) % names.len()].to_owned();
            match self.steps.get_mut(names[idx]) {
                Some(step) => step.next.push(Operation::immediate(next)),
                None => {
                    tracing::warn!(step = names[idx], "cannot cycle through unknown step");
                }
            }
        }
        self
    }

    /// Initial operations in declaration order.
    pub fn initial_operations(&self) -> &[Operation] {
        &self.initial
    }

    /// Borrow a step by name.
    pub fn step(&self, name: &str) -> Option<&Step> {
        self.steps.get(name)
    }

    /// Mutably borrow a step by name.
    pub fn step_mut(&mut self, name: &str) -> Option<&mut Step> {
        self.steps.get_mut(name)
    }

    /// Number of steps in the sequence.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the sequence holds no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Iterate over step names.
    pub fn step_names(&self) -> impl Iterator<Item = &str> {
        self.steps.keys().map(String::as_str)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/step.rs"]
mod tests;
