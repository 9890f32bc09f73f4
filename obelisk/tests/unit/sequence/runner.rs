use super::*;
use crate::effects::effect::Effect;
use crate::sequence::step::Step;
use std::time::Instant;

const GREEN: Rgba8 = Rgba8::from_hex(0x00ff00);
const RED: Rgba8 = Rgba8::from_hex(0xff0000);

fn runner(universes: usize) -> SequenceRunner {
    SequenceRunner::new(&vec![4; universes])
}

#[test]
fn initial_step_produces_a_frame_on_the_first_tick() {
    let t0 = Instant::now();
    let mut sr = runner(2);
    let mut seq = Sequence::new();
    seq.add_initial_step("on", Step::new(UniverseId(0), Effect::solid(GREEN)));
    sr.install(seq, t0);

    assert!(!sr.process_frame(t0));
    assert_eq!(sr.universe_data(UniverseId(0))[0], GREEN);
    assert_eq!(sr.universe_data(UniverseId(1))[0], Rgba8::uninitialised());
}

#[test]
fn delayed_step_promoted_this_tick_gets_a_frame_this_tick() {
    let t0 = Instant::now();
    let mut sr = runner(1);
    let mut seq = Sequence::new();
    seq.add_step("late", Step::new(UniverseId(0), Effect::solid(GREEN)));
    seq.add_initial_operation(Operation::after("late", Duration::from_millis(100)));
    sr.install(seq, t0);

    assert!(!sr.process_frame(t0 + Duration::from_millis(50)));
    assert_eq!(sr.universe_data(UniverseId(0))[0], Rgba8::uninitialised());

    // Promotion happens before frame generation within one call.
    assert!(!sr.process_frame(t0 + Duration::from_millis(100)));
    assert_eq!(sr.universe_data(UniverseId(0))[0], GREEN);
}

#[test]
fn chained_steps_run_back_to_back() {
    let t0 = Instant::now();
    let mut sr = runner(1);
    let mut seq = Sequence::new();
    seq.add_initial_step(
        "first",
        Step::new(
            UniverseId(0),
            Effect::timed_solid(GREEN, Duration::from_millis(100)),
        )
        .then_do_immediately("second"),
    );
    seq.add_step("second", Step::new(UniverseId(0), Effect::solid(RED)));
    sr.install(seq, t0);

    sr.process_frame(t0);
    assert_eq!(sr.universe_data(UniverseId(0))[0], GREEN);

    // First completes here; second starts and frames next tick.
    sr.process_frame(t0 + Duration::from_millis(100));
    sr.process_frame(t0 + Duration::from_millis(130));
    assert_eq!(sr.universe_data(UniverseId(0))[0], RED);
}

#[test]
fn queued_step_never_preempts_the_head() {
    let t0 = Instant::now();
    let mut sr = runner(1);
    let mut seq = Sequence::new();
    seq.add_initial_step("head", Step::new(UniverseId(0), Effect::solid(GREEN)));
    seq.add_step("tail", Step::new(UniverseId(0), Effect::solid(RED)));
    seq.add_initial_operation(Operation::immediate("tail"));
    sr.install(seq, t0);

    // The head is endless, so the tail must wait forever.
    for i in 0..20 {
        assert!(!sr.process_frame(t0 + Duration::from_millis(30 * i)));
        assert_eq!(sr.universe_data(UniverseId(0))[0], GREEN);
    }
}

#[test]
fn unknown_follow_on_is_discarded_and_sequence_continues() {
    let t0 = Instant::now();
    let mut sr = runner(2);
    let mut seq = Sequence::new();
    seq.add_initial_step(
        "a",
        Step::new(
            UniverseId(0),
            Effect::timed_solid(GREEN, Duration::from_millis(50)),
        )
        .then_do_immediately("missing")
        .then_do_immediately("b"),
    );
    seq.add_step("b", Step::new(UniverseId(1), Effect::solid(RED)));
    sr.install(seq, t0);

    sr.process_frame(t0);
    sr.process_frame(t0 + Duration::from_millis(60));
    assert!(!sr.process_frame(t0 + Duration::from_millis(90)));
    assert_eq!(sr.universe_data(UniverseId(1))[0], RED);
}

#[test]
fn done_means_no_heads_and_nothing_scheduled() {
    let t0 = Instant::now();
    let mut sr = runner(1);
    let mut seq = Sequence::new();
    seq.add_initial_step(
        "only",
        Step::new(
            UniverseId(0),
            Effect::timed_solid(GREEN, Duration::from_millis(100)),
        ),
    );
    sr.install(seq, t0);

    assert!(!sr.process_frame(t0));
    assert!(sr.process_frame(t0 + Duration::from_millis(150)));
    // Idempotent once drained.
    assert!(sr.process_frame(t0 + Duration::from_millis(200)));
}

#[test]
fn pulse_only_sequence_never_completes() {
    let t0 = Instant::now();
    let mut sr = runner(1);
    let mut seq = Sequence::new();
    seq.add_initial_step(
        "forever",
        Step::new(
            UniverseId(0),
            Effect::pulse(GREEN, RED, Duration::from_millis(500)),
        ),
    );
    sr.install(seq, t0);

    for i in 0..50 {
        assert!(!sr.process_frame(t0 + Duration::from_millis(100 * i)));
    }
}

#[test]
fn cycles_keep_the_runner_live() {
    let t0 = Instant::now();
    let mut sr = runner(1);
    let mut seq = Sequence::new();
    seq.add_initial_step(
        "ping",
        Step::new(
            UniverseId(0),
            Effect::timed_solid(GREEN, Duration::from_millis(50)),
        ),
    );
    seq.add_step(
        "pong",
        Step::new(
            UniverseId(0),
            Effect::timed_solid(RED, Duration::from_millis(50)),
        ),
    );
    seq.create_step_cycle(&["ping", "pong"]);
    sr.install(seq, t0);

    let mut saw_green = false;
    let mut saw_red = false;
    for i in 0..40 {
        assert!(!sr.process_frame(t0 + Duration::from_millis(20 * i)));
        match sr.universe_data(UniverseId(0))[0] {
            c if c == GREEN => saw_green = true,
            c if c == RED => saw_red = true,
            _ => {}
        }
    }
    assert!(saw_green && saw_red);
}

#[test]
fn install_replaces_a_running_sequence() {
    let t0 = Instant::now();
    let mut sr = runner(1);
    let mut first = Sequence::new();
    first.add_initial_step("old", Step::new(UniverseId(0), Effect::solid(GREEN)));
    sr.install(first, t0);
    sr.process_frame(t0);

    let mut second = Sequence::new();
    second.add_initial_step("new", Step::new(UniverseId(0), Effect::solid(RED)));
    sr.install(second, t0 + Duration::from_millis(10));
    sr.process_frame(t0 + Duration::from_millis(10));
    assert_eq!(sr.universe_data(UniverseId(0))[0], RED);
}

#[test]
fn universe_data_is_stable_between_frames() {
    let t0 = Instant::now();
    let mut sr = runner(1);
    let mut seq = Sequence::new();
    seq.add_initial_step(
        "ramp",
        Step::new(
            UniverseId(0),
            Effect::interpolate_solid(Rgba8::BLACK, GREEN, Duration::from_secs(1)),
        ),
    );
    sr.install(seq, t0);
    sr.process_frame(t0 + Duration::from_millis(300));

    let first: Vec<Rgba8> = sr.universe_data(UniverseId(0)).to_vec();
    let second: Vec<Rgba8> = sr.universe_data(UniverseId(0)).to_vec();
    assert_eq!(first, second);
}

#[test]
fn retime_rewrites_the_installed_solid() {
    let t0 = Instant::now();
    let mut sr = runner(1);
    let mut seq = Sequence::new();
    seq.add_initial_step(
        "hold",
        Step::new(
            UniverseId(0),
            Effect::timed_solid(GREEN, Duration::from_millis(375)),
        ),
    );
    sr.install(seq, t0);

    assert!(sr.retime_step("hold", Duration::from_millis(750)));
    assert!(!sr.retime_step("missing", Duration::from_millis(750)));

    // Past the old duration but inside the new one.
    assert!(!sr.process_frame(t0 + Duration::from_millis(500)));
    assert_eq!(sr.universe_data(UniverseId(0))[0], GREEN);
    assert!(sr.process_frame(t0 + Duration::from_millis(800)));
}
