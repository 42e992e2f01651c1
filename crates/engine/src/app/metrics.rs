use std::time::{Duration, Instant};

/// Tick-rate figures for one reporting window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub tps: f32,
    pub tick_time_ms: f32,
    pub slowest_tick_ms: f32,
    pub handled_cells: u32,
}

#[derive(Debug)]
pub(crate) struct TickRateMeter {
    window: Duration,
    window_start: Instant,
    ticks: u32,
    busy: Duration,
    slowest: Duration,
    handled_cells: u32,
}

impl TickRateMeter {
    pub(crate) fn new(window: Duration, start: Instant) -> Self {
        Self {
            window,
            window_start: start,
            ticks: 0,
            busy: Duration::ZERO,
            slowest: Duration::ZERO,
            handled_cells: 0,
        }
    }

    pub(crate) fn record(&mut self, elapsed: Duration, handled_cells: u32) {
        self.ticks = self.ticks.saturating_add(1);
        self.busy = self.busy.saturating_add(elapsed);
        self.slowest = self.slowest.max(elapsed);
        self.handled_cells = handled_cells;
    }

    /// Reports and restarts the window at `now` once it has run its full length.
    pub(crate) fn close_window(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let span = now.saturating_duration_since(self.window_start);
        if span < self.window {
            return None;
        }
        let tick_time_ms = if self.ticks == 0 {
            0.0
        } else {
            millis(self.busy) / self.ticks as f32
        };
        let snapshot = LoopMetricsSnapshot {
            tps: self.ticks as f32 / span.as_secs_f32().max(f32::EPSILON),
            tick_time_ms,
            slowest_tick_ms: millis(self.slowest),
            handled_cells: self.handled_cells,
        };
        *self = Self::new(self.window, now);
        Some(snapshot)
    }
}

fn millis(duration: Duration) -> f32 {
    duration.as_secs_f32() * 1000.0
}
