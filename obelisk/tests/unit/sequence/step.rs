use super::*;
use crate::effects::effect::Effect;
use crate::foundation::core::Rgba8;
use std::time::Duration;

fn step(universe: usize) -> Step {
    Step::new(UniverseId(universe), Effect::solid(Rgba8::BLACK))
}

#[test]
fn follow_ons_keep_declaration_order() {
    let s = step(0)
        .then_do_immediately("second")
        .then_do("third", Duration::from_millis(40));
    assert_eq!(s.next.len(), 2);
    assert_eq!(s.next[0].step, "second");
    assert_eq!(s.next[0].delay, Duration::ZERO);
    assert_eq!(s.next[1].step, "third");
    assert_eq!(s.next[1].delay, Duration::from_millis(40));
}

#[test]
fn add_initial_step_registers_step_and_operation() {
    let mut seq = Sequence::new();
    seq.add_initial_step("kick", step(2));
    assert_eq!(seq.len(), 1);
    assert!(seq.step("kick").is_some());
    assert_eq!(seq.initial_operations().len(), 1);
    assert_eq!(seq.initial_operations()[0].step, "kick");
}

#[test]
fn step_cycle_links_back_to_front() {
    let mut seq = Sequence::new();
    seq.add_step("a", step(0));
    seq.add_step("b", step(1));
    seq.add_step("c", step(2));
    seq.create_step_cycle(&["a", "b", "c"]);

    assert_eq!(seq.step("a").unwrap().next[0].step, "b");
    assert_eq!(seq.step("b").unwrap().next[0].step, "c");
    assert_eq!(seq.step("c").unwrap().next[0].step, "a");
}

#[test]
fn cycling_an_unknown_name_is_harmless() {
    let mut seq = Sequence::new();
    seq.add_step("real", step(0));
    seq.create_step_cycle(&["real", "ghost"]);
    // The known step still points at the ghost; the ghost added nothing.
    assert_eq!(seq.step("real").unwrap().next[0].step, "ghost");
    assert!(seq.step("ghost").is_none());
}

#[test]
fn adding_a_step_twice_replaces_it() {
    let mut seq = Sequence::new();
    seq.add_step("dup", step(0));
    seq.add_step("dup", step(5));
    assert_eq!(seq.len(), 1);
    assert_eq!(seq.step("dup").unwrap().universe, UniverseId(5));
}
