//! End-to-end simulation tests.
//!
//! These tests verify complete runs of small circuits including:
//! - Same-tick propagation through combinational chains
//! - Feedback into latches and timers
//! - Determinism of repeated runs
//! - Batch runs against individual sessions

use circuitry::{
    build_graph, create_default_registry, run_one_tick, BatchRunner, BlockId, Clock, Logic, Page, Stimulus,
    TickExecutor,
};

use circuitry::Logic::{False as F, True as T};

// ============================================================================
// Circuits
// ============================================================================

/// Start/stop station: two buttons drive a reset-priority latch whose output
/// runs a motor.
struct StartStop {
    page: Page,
    start: BlockId,
    stop: BlockId,
    latch: BlockId,
    motor: BlockId,
}

fn start_stop() -> StartStop {
    let mut page = Page::new();
    let motor = page.add_block("Output");
    page.set_label(motor, "motor");
    let motor_in = page.add_input(motor, "a");

    let latch = page.add_block("SR-R");
    page.set_property(latch, "State", "false");
    let set = page.add_input(latch, "S");
    let reset = page.add_input(latch, "R");
    let q = page.add_output(latch, "Q");

    let start = page.add_block("Input");
    page.set_label(start, "start");
    let start_q = page.add_output(start, "q");
    let stop = page.add_block("Input");
    page.set_label(stop, "stop");
    let stop_q = page.add_output(stop, "q");

    // Route the latch output through two relays on its way to the motor.
    let r1 = page.add_relay();
    let r2 = page.add_relay();
    page.connect(q, r1);
    page.connect(r1, r2);
    page.connect(r2, motor_in);
    page.connect(start_q, set);
    page.connect(stop_q, reset);

    StartStop {
        page,
        start,
        stop,
        latch,
        motor,
    }
}

/// A pulse timer whose input is its own inverted output: a free-running
/// blinker.
fn blinker() -> (Page, BlockId) {
    let mut page = Page::new();
    let tp = page.add_block("TP");
    page.set_property(tp, "Delay", "200");
    page.set_property(tp, "Unit", "ms");
    page.set_property(tp, "State", "false");
    let a = page.add_input(tp, "in");
    let q = page.add_output(tp, "q");
    page.connect_inverted(q, a);
    (page, tp)
}

fn session(page: &Page) -> TickExecutor {
    let graph = build_graph(page).unwrap();
    TickExecutor::from_graph(&graph, &create_default_registry(), 100).unwrap()
}

// ============================================================================
// Runs
// ============================================================================

#[test]
fn test_start_stop_station() {
    let circuit = start_stop();
    let stimulus = Stimulus::new()
        .at(0, circuit.start, F)
        .at(0, circuit.stop, F)
        .at(2, circuit.start, T)
        .at(3, circuit.start, F)
        .at(6, circuit.stop, T)
        .at(7, circuit.stop, F);
    let mut exec = session(&circuit.page)
        .with_stimulus(stimulus)
        .with_trace(vec![circuit.motor]);

    exec.run_for(9);

    let motor = exec.trace().unwrap().column(circuit.motor).unwrap();
    assert_eq!(motor, vec![F, F, T, T, T, T, F, F, F]);
    assert_eq!(exec.state(circuit.latch), Some(F));
}

#[test]
fn test_stop_wins_when_both_pressed() {
    let circuit = start_stop();
    let mut exec = session(&circuit.page);

    exec.force(circuit.start, T);
    exec.force(circuit.stop, T);
    exec.step();
    assert_eq!(exec.state(circuit.motor), Some(F));
}

#[test]
fn test_blinker_oscillates() {
    let (page, tp) = blinker();
    let mut exec = session(&page).with_trace(vec![tp]);

    exec.run_for(9);

    let out = exec.trace().unwrap().column(tp).unwrap();
    assert_eq!(out, vec![T, T, F, T, T, F, T, T, F]);
}

#[test]
fn test_feedback_reads_previous_tick() {
    // A set-priority latch whose reset is its own output through a NOT gate.
    let mut page = Page::new();
    let latch = page.add_block("SR-S");
    page.set_property(latch, "State", "false");
    let set = page.add_input(latch, "S");
    let reset = page.add_input(latch, "R");
    let q = page.add_output(latch, "Q");
    let not = page.add_block("NOT");
    let not_in = page.add_input(not, "a");
    let not_out = page.add_output(not, "q");
    let button = page.add_block("Signal");
    let button_q = page.add_output(button, "q");
    page.connect(q, not_in);
    page.connect(not_out, reset);
    page.connect(button_q, set);

    let graph = build_graph(&page).unwrap();
    assert_eq!(graph.evaluation_order(), [not, button, latch]);

    let mut exec = TickExecutor::from_graph(&graph, &create_default_registry(), 100).unwrap();
    exec.force(button, T);
    exec.step();
    // The NOT saw the latch's initial false.
    assert_eq!(exec.state(not), Some(T));
    assert_eq!(exec.state(latch), Some(T));

    exec.force(button, F);
    exec.step();
    assert_eq!(exec.state(not), Some(F));
    assert_eq!(exec.state(latch), Some(T));
}

#[test]
fn test_run_one_tick_directly() {
    let circuit = start_stop();
    let graph = build_graph(&circuit.page).unwrap();
    let mut clock = Clock::new(250);
    let mut sims = create_default_registry().create_simulations(&graph, &clock).unwrap();

    sims.force(circuit.start, T);
    sims.force(circuit.stop, F);
    for _ in 0..4 {
        run_one_tick(&mut sims, &mut clock);
    }

    assert_eq!(clock.cycle(), 4);
    assert_eq!(clock.elapsed().as_millis(), 1000);
    assert_eq!(sims.state(circuit.motor), Some(T));
}

#[test]
fn test_runs_are_deterministic() {
    let circuit = start_stop();
    let stimulus = Stimulus::new()
        .at(1, circuit.start, T)
        .at(4, circuit.start, F)
        .at(5, circuit.stop, T);

    let csv = || {
        let mut exec = session(&circuit.page)
            .with_stimulus(stimulus.clone())
            .with_trace(Vec::new());
        exec.run_for(8);
        exec.trace().unwrap().to_csv()
    };
    assert_eq!(csv(), csv());
}

#[test]
fn test_export_stats() {
    let circuit = start_stop();
    let mut exec = session(&circuit.page);
    exec.force(circuit.start, T);
    exec.run_until(6);

    let stats = exec.export_stats();
    assert_eq!(stats["cycle"], 6);
    assert_eq!(stats["resolution_ms"], 100);
    assert_eq!(stats["ticks_executed"], 6);
    assert_eq!(stats["component_count"], 4);
    assert_eq!(stats["component_runs"], 24);
    assert_eq!(stats["forced_writes"], 1);
}

#[test]
fn test_batch_matches_sessions() {
    let circuit = start_stop();
    let graph = build_graph(&circuit.page).unwrap();
    let registry = create_default_registry();

    let stimuli: Vec<Stimulus> = (0..6)
        .map(|i| {
            Stimulus::new()
                .at(0, circuit.stop, F)
                .at(i, circuit.start, T)
                .at(i + 1, circuit.start, F)
                .at(5, circuit.stop, Logic::from(i % 2 == 0))
        })
        .collect();

    let outcome = BatchRunner::new(&graph, &registry)
        .cycles(8)
        .probes(vec![circuit.motor, circuit.latch])
        .run(&stimuli)
        .unwrap();

    for (stimulus, trace) in stimuli.iter().zip(&outcome.traces) {
        let mut exec = session(&circuit.page)
            .with_stimulus(stimulus.clone())
            .with_trace(vec![circuit.motor, circuit.latch]);
        exec.run_for(8);
        assert_eq!(trace.samples(), exec.trace().unwrap().samples());
    }
    assert_eq!(outcome.traces[0].labels(), ["motor".to_string(), "SR-R".to_string()]);
    assert_eq!(outcome.stats.runs, 6);
}
