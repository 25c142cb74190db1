//! Start/stop motor station example.
//!
//! Two push buttons drive a reset-priority latch. The latch output runs a
//! motor directly and, through an off-delay timer, a cooling fan that keeps
//! running for one second after the motor stops. A NOT gate on the latch
//! output lights a "ready" lamp, showing feedback-free same-tick propagation
//! next to the latch's stored state.
//!
//! Run with: `cargo run --example sr_latch`

use circuitry::{build_graph, create_default_registry, init_logging, BlockId, Logic, Page, Stimulus, TickExecutor};

const RESOLUTION_MS: u64 = 100;
const RUN_TICKS: u64 = 30;

// ============================================================================
// Circuit
// ============================================================================

struct Station {
    page: Page,
    start: BlockId,
    stop: BlockId,
    motor: BlockId,
    fan: BlockId,
    ready: BlockId,
}

fn station() -> Station {
    let mut page = Page::new();

    let start = page.add_block("Input");
    page.set_label(start, "start");
    let start_q = page.add_output(start, "q");

    let stop = page.add_block("Input");
    page.set_label(stop, "stop");
    let stop_q = page.add_output(stop, "q");

    let latch = page.add_block("SR-R");
    page.set_label(latch, "run");
    page.set_property(latch, "State", "false");
    let set = page.add_input(latch, "S");
    let reset = page.add_input(latch, "R");
    let run_q = page.add_output(latch, "Q");
    page.connect(start_q, set);
    page.connect(stop_q, reset);

    // Every consumer of the latch hangs off one relay.
    let bus = page.add_relay();
    page.connect(run_q, bus);

    let motor = page.add_block("Output");
    page.set_label(motor, "motor");
    let motor_in = page.add_input(motor, "a");
    page.connect(bus, motor_in);

    let cooldown = page.add_block("TOF");
    page.set_label(cooldown, "cooldown");
    page.set_property(cooldown, "Delay", "1");
    page.set_property(cooldown, "Unit", "s");
    let cooldown_in = page.add_input(cooldown, "in");
    let cooldown_q = page.add_output(cooldown, "q");
    page.connect(bus, cooldown_in);

    let fan = page.add_block("Output");
    page.set_label(fan, "fan");
    let fan_in = page.add_input(fan, "a");
    page.connect(cooldown_q, fan_in);

    let not = page.add_block("NOT");
    let not_in = page.add_input(not, "a");
    let not_q = page.add_output(not, "q");
    page.connect(bus, not_in);

    let ready = page.add_block("Output");
    page.set_label(ready, "ready");
    let ready_in = page.add_input(ready, "a");
    page.connect(not_q, ready_in);

    Station {
        page,
        start,
        stop,
        motor,
        fan,
        ready,
    }
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    init_logging("info");

    let station = station();
    let graph = match build_graph(&station.page) {
        Ok(graph) => graph,
        Err(err) => {
            eprintln!("failed to resolve circuit: {err}");
            std::process::exit(1);
        }
    };

    println!("{}", graph.dump());

    // Press start at 0.2 s, press stop at 1.2 s.
    let stimulus = Stimulus::new()
        .at(0, station.start, false)
        .at(0, station.stop, false)
        .at(2, station.start, true)
        .at(3, station.start, false)
        .at(12, station.stop, true)
        .at(13, station.stop, false);

    let mut exec = match TickExecutor::from_graph(&graph, &create_default_registry(), RESOLUTION_MS) {
        Ok(exec) => exec
            .with_stimulus(stimulus)
            .with_labelled_trace(&graph, vec![station.start, station.stop, station.motor, station.fan, station.ready]),
        Err(err) => {
            eprintln!("failed to create components: {err}");
            std::process::exit(1);
        }
    };

    exec.run_for(RUN_TICKS);

    if let Some(trace) = exec.trace() {
        println!("{}", trace.to_csv());
    }

    println!(
        "after {:?}: motor={} fan={} ready={}",
        exec.clock().elapsed(),
        exec.state(station.motor).unwrap_or(Logic::Unknown),
        exec.state(station.fan).unwrap_or(Logic::Unknown),
        exec.state(station.ready).unwrap_or(Logic::Unknown),
    );
    println!("{:#}", exec.export_stats());
}
