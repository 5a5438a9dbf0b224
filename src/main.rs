use std::sync::Arc;
use std::time::Duration;

use ansi_term::Colour;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::time::sleep;

use liftsim::event_generator::EventGenerator;
use liftsim::event_log::{EventKind, EventSink, FanOutSink, MemorySink};
use liftsim::world_view::OperationState;
use liftsim::{init, print};

/// How often the status table is refreshed while waiting for the run to settle.
const STATUS_PERIOD: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = init::parse_args();
    if cli.help {
        init::print_help();
        return Ok(());
    }
    let config = init::load_config(&cli)?;

    let history = Arc::new(MemorySink::new());
    let recorder: Arc<dyn EventSink> = history.clone();
    let sink: Arc<dyn EventSink> = Arc::new(FanOutSink::new(vec![init::terminal_sink(&cli), recorder]));

    let (building, manager) = init::build_system(&config, sink.clone()).await?;
    print::info(format!(
        "Building with levels {}..={} ({} floors), {} elevators",
        building.lowest_level(),
        building.highest_level(),
        building.total_levels(),
        config.fleet.count
    ));

    let dispatcher = manager.start().await;

    let generator = EventGenerator::new(building.clone(), config.generator, sink);
    let mut rng = StdRng::from_os_rng();
    let placed = generator.run(&mut rng).await;
    print::info(format!("{placed} passengers placed, waiting for the elevators to finish"));

    loop {
        let wv = manager.world_view().await;
        print::worldview(&wv);
        let running = wv.elevators.iter().any(|e| e.operation == OperationState::Running);
        if wv.is_quiescent() || !running {
            break;
        }
        sleep(STATUS_PERIOD).await;
    }

    let states = manager.shutdown().await;
    if let Err(e) = dispatcher.await {
        print::err(format!("Dispatcher task failed: {e}"));
    }
    print::worldview(&manager.world_view().await);

    for (id, state) in states {
        match state {
            OperationState::Shutdown => print::ok(format!("Elevator #{id} parked")),
            other => print::warn(format!("Elevator #{id} ended in {other:?}")),
        }
    }
    let delivered = history.count(|e| matches!(e.kind, EventKind::Unloaded { .. }));
    let evacuated = history.count(|e| matches!(e.kind, EventKind::Evacuated { .. }));
    let emergencies = manager.emergency_reports().await;
    print::color(
        format!(
            "Run finished: {placed} placed, {delivered} released, {evacuated} evacuated, {} emergencies",
            emergencies.len()
        ),
        Colour::Cyan,
    );
    Ok(())
}
