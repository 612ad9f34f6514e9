//! Run loop: pacing, snapshot delivery and the between-tick hook.

use crate::clock::Pacing;
use crate::error::SimResult;
use crate::sim::{ReactorSimulation, Snapshot};
use rx_plant::PlantState;
use std::time::{Duration, Instant};

/// Receives every accepted snapshot, in time order.
pub trait SnapshotSink {
    fn accept(&mut self, snapshot: &Snapshot);
}

impl<F: FnMut(&Snapshot)> SnapshotSink for F {
    fn accept(&mut self, snapshot: &Snapshot) {
        self(snapshot)
    }
}

/// What a finished run did.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Ticks executed by this call to [`run`].
    pub ticks: u64,
    pub final_time: f64,
    pub final_state: PlantState,
    pub min_reactor_temp: f64,
    pub max_reactor_temp: f64,
    pub wall_time: Duration,
}

/// Tick `sim` until it is stopped.
///
/// After each snapshot is handed to `sink`, `between_ticks` gets mutable
/// access to the simulation; it is the place to apply operator edits and to
/// call [`ReactorSimulation::stop`]. With [`Pacing::RealTime`] each tick
/// waits for its wall-clock boundary, measured from the start of this call;
/// the hook runs again on waking, and a stop issued there cancels the tick.
///
/// Returns the integration error if a tick fails; the simulation is stopped
/// by then.
pub fn run<S, H>(
    sim: &mut ReactorSimulation,
    sink: &mut S,
    mut between_ticks: H,
) -> SimResult<RunSummary>
where
    S: SnapshotSink + ?Sized,
    H: FnMut(&mut ReactorSimulation),
{
    let start = Instant::now();
    tracing::info!(
        t = sim.time(),
        dt = sim.clock().dt(),
        pacing = ?sim.clock().pacing(),
        mode = ?sim.mode(),
        "simulation started"
    );

    let mut ticks = 0_u64;
    let mut min_reactor_temp = sim.state().reactor_temp;
    let mut max_reactor_temp = sim.state().reactor_temp;

    while sim.is_running() {
        if sim.clock().pacing() == Pacing::RealTime {
            let due = sim.clock().boundary(ticks);
            let elapsed = start.elapsed();
            if elapsed < due {
                std::thread::sleep(due - elapsed);
            }
            between_ticks(sim);
            if !sim.is_running() {
                break;
            }
        }

        let snapshot = sim.tick()?;
        ticks += 1;
        min_reactor_temp = min_reactor_temp.min(snapshot.reactor_temp);
        max_reactor_temp = max_reactor_temp.max(snapshot.reactor_temp);
        sink.accept(&snapshot);

        between_ticks(sim);
    }

    let summary = RunSummary {
        ticks,
        final_time: sim.time(),
        final_state: *sim.state(),
        min_reactor_temp,
        max_reactor_temp,
        wall_time: start.elapsed(),
    };
    tracing::info!(
        ticks = summary.ticks,
        final_time = summary.final_time,
        reactor_temp = summary.final_state.reactor_temp,
        jacket_temp = summary.final_state.jacket_temp,
        min_reactor_temp = summary.min_reactor_temp,
        max_reactor_temp = summary.max_reactor_temp,
        wall_time_ms = summary.wall_time.as_millis() as u64,
        "simulation finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimSetup;

    #[test]
    fn runs_until_hook_stops() {
        let mut sim = ReactorSimulation::new(SimSetup::default()).unwrap();
        let mut times = Vec::new();
        let summary = run(
            &mut sim,
            &mut |s: &Snapshot| times.push(s.sim_time),
            |sim| {
                if sim.time() >= 10.0 {
                    sim.stop();
                }
            },
        )
        .unwrap();

        assert_eq!(summary.ticks, 10);
        assert_eq!(summary.final_time, 10.0);
        assert_eq!(times, (1..=10).map(f64::from).collect::<Vec<_>>());
        assert!(summary.min_reactor_temp <= summary.max_reactor_temp);
    }

    #[test]
    fn stopped_simulation_runs_zero_ticks() {
        let mut sim = ReactorSimulation::new(SimSetup::default()).unwrap();
        sim.stop();
        let mut count = 0;
        let summary = run(&mut sim, &mut |_: &Snapshot| count += 1, |_| {}).unwrap();
        assert_eq!(summary.ticks, 0);
        assert_eq!(count, 0);
    }

    #[test]
    fn realtime_pacing_waits_for_boundaries() {
        let mut sim = ReactorSimulation::new(SimSetup {
            dt: 0.02,
            pacing: Pacing::RealTime,
            ..SimSetup::default()
        })
        .unwrap();
        let summary = run(&mut sim, &mut |_: &Snapshot| {}, |sim| {
            if sim.clock().ticks() >= 5 {
                sim.stop();
            }
        })
        .unwrap();
        assert_eq!(summary.ticks, 5);
        assert!(summary.wall_time >= Duration::from_millis(95));
    }

    #[test]
    fn stop_during_pacing_sleep_cancels_the_tick() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicBool, Ordering};

        let mut sim = ReactorSimulation::new(SimSetup {
            dt: 0.3,
            pacing: Pacing::RealTime,
            ..SimSetup::default()
        })
        .unwrap();
        let quit = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&quit);
        let requester = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(100));
            flag.store(true, Ordering::SeqCst);
        });

        let mut emitted = Vec::new();
        let summary = run(
            &mut sim,
            &mut |s: &Snapshot| emitted.push(s.sim_time),
            |sim| {
                if quit.load(Ordering::SeqCst) {
                    sim.stop();
                }
            },
        )
        .unwrap();
        requester.join().unwrap();

        assert_eq!(summary.ticks, 0);
        assert!(emitted.is_empty());
        assert_eq!(sim.time(), 0.0);
    }
}
