use std::mem;
use std::thread;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{info, warn};

use super::metrics::{LoopMetricsSnapshot, TickRateMeter};
use super::scheduler::{Simulation, TickHooks};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub target_tps: u32,
    pub max_frame_delta_ms: u64,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval_ms: u64,
    /// Stop after this many ticks; `None` runs until the process is stopped.
    pub max_ticks: Option<u64>,
    /// Pace ticks against the wall clock instead of running flat out.
    pub realtime: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_frame_delta_ms: 250,
            max_ticks_per_frame: 5,
            metrics_log_interval_ms: 1000,
            max_ticks: Some(3600),
            realtime: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopSummary {
    pub ticks_run: u64,
    pub clamp_events: u32,
    pub final_tick: u64,
    /// The most recent closed metrics window, if the run lasted long enough.
    pub last_metrics: Option<LoopMetricsSnapshot>,
}

pub fn run_headless<P: Default, H: TickHooks<P>>(
    config: &LoopConfig,
    sim: &mut Simulation<P, H>,
) -> LoopSummary {
    let mut pacer = FramePacer::new(config);
    let metrics_window = millis_or(config.metrics_log_interval_ms, Duration::from_secs(1));
    info!(
        target_tps = config.target_tps.max(1),
        max_frame_delta_ms = pacer.frame_cap.as_millis() as u64,
        max_ticks_per_frame = pacer.max_burst,
        metrics_log_interval_ms = metrics_window.as_millis() as u64,
        max_ticks = ?config.max_ticks,
        realtime = config.realtime,
        "loop_config"
    );

    let mut summary = LoopSummary::default();
    let mut meter = TickRateMeter::new(metrics_window, Instant::now());
    let mut last_frame = Instant::now();
    let out_of_ticks =
        |summary: &LoopSummary| config.max_ticks.is_some_and(|cap| summary.ticks_run >= cap);

    while !out_of_ticks(&summary) {
        let burst = if config.realtime {
            let now = Instant::now();
            let frame = pacer.advance(now.saturating_duration_since(last_frame));
            last_frame = now;
            if !frame.discarded.is_zero() {
                summary.clamp_events = summary.clamp_events.saturating_add(1);
                warn!(
                    dropped_backlog_ms = frame.discarded.as_millis() as u64,
                    max_ticks_per_frame = pacer.max_burst,
                    "sim_clamp_triggered"
                );
            }
            frame.ticks
        } else {
            1
        };

        for _ in 0..burst {
            if out_of_ticks(&summary) {
                break;
            }
            let started = Instant::now();
            let report = sim.step();
            meter.record(started.elapsed(), report.handled_cells);
            summary.ticks_run += 1;
            summary.final_tick = report.tick;
        }

        if let Some(snapshot) = meter.close_window(Instant::now()) {
            info!(
                tps = snapshot.tps,
                tick_time_ms = snapshot.tick_time_ms,
                slowest_tick_ms = snapshot.slowest_tick_ms,
                handled_cells = snapshot.handled_cells,
                occupied_cells = sim.world().grid().occupied_count(),
                "loop_metrics"
            );
            summary.last_metrics = Some(snapshot);
        }

        if config.realtime {
            let wait = pacer.until_next_tick();
            if !wait.is_zero() {
                thread::sleep(wait);
            }
        }
    }

    info!(
        ticks_run = summary.ticks_run,
        final_tick = summary.final_tick,
        clamp_events = summary.clamp_events,
        "loop_finished"
    );
    summary
}

fn millis_or(ms: u64, fallback: Duration) -> Duration {
    match Duration::from_millis(ms) {
        zero if zero.is_zero() => fallback,
        duration => duration,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PacedFrame {
    ticks: u32,
    discarded: Duration,
}

/// Converts wall-clock frame time into whole fixed-length ticks. A frame
/// never counts for more than `frame_cap`, and whatever a burst of
/// `max_burst` ticks cannot pay off is thrown away.
#[derive(Debug)]
struct FramePacer {
    tick_len: Duration,
    frame_cap: Duration,
    max_burst: u32,
    owed: Duration,
}

impl FramePacer {
    fn new(config: &LoopConfig) -> Self {
        Self {
            tick_len: Duration::from_secs_f64(1.0 / f64::from(config.target_tps.max(1))),
            frame_cap: millis_or(config.max_frame_delta_ms, Duration::from_millis(250)),
            max_burst: config.max_ticks_per_frame.max(1),
            owed: Duration::ZERO,
        }
    }

    fn advance(&mut self, frame_time: Duration) -> PacedFrame {
        let counted = frame_time.min(self.frame_cap);
        self.owed = self.owed.saturating_add(counted);
        let due = self.owed.as_nanos() / self.tick_len.as_nanos().max(1);
        let ticks = u32::try_from(due).unwrap_or(u32::MAX).min(self.max_burst);
        self.owed = self.owed.saturating_sub(self.tick_len * ticks);

        let discarded = if self.owed >= self.tick_len {
            mem::take(&mut self.owed)
        } else {
            Duration::ZERO
        };
        PacedFrame { ticks, discarded }
    }

    fn until_next_tick(&self) -> Duration {
        self.tick_len.saturating_sub(self.owed)
    }
}
