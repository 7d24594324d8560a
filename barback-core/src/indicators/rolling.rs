//! Rolling window extrema over bar highs and lows.

use std::collections::VecDeque;

use crate::domain::Bar;
use crate::indicators::Indicator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extremum {
    Max,
    Min,
}

/// Monotonic-deque window extreme.
///
/// Candidates are kept ordered so the window extreme is always at the
/// front; each element is pushed and popped at most once, making updates
/// O(1) amortized. `prev` holds the extreme of the window ending at the
/// bar before the latest update.
#[derive(Debug, Clone)]
struct ExtremeWindow {
    period: usize,
    kind: Extremum,
    /// (bar index, value) candidates, front is the window extreme.
    candidates: VecDeque<(usize, f64)>,
    seen: usize,
    prev: Option<f64>,
}

impl ExtremeWindow {
    fn new(period: usize, kind: Extremum) -> Self {
        assert!(period >= 1, "rolling window period must be >= 1");
        Self {
            period,
            kind,
            candidates: VecDeque::new(),
            seen: 0,
            prev: None,
        }
    }

    fn displaces(&self, incumbent: f64, incoming: f64) -> bool {
        match self.kind {
            Extremum::Max => incumbent <= incoming,
            Extremum::Min => incumbent >= incoming,
        }
    }

    fn push(&mut self, value: f64) {
        self.prev = self.current();
        let index = self.seen;
        while self
            .candidates
            .back()
            .is_some_and(|&(_, incumbent)| self.displaces(incumbent, value))
        {
            self.candidates.pop_back();
        }
        self.candidates.push_back((index, value));
        while self
            .candidates
            .front()
            .is_some_and(|&(i, _)| i + self.period <= index)
        {
            self.candidates.pop_front();
        }
        self.seen += 1;
    }

    fn current(&self) -> Option<f64> {
        if self.seen < self.period {
            return None;
        }
        self.candidates.front().map(|&(_, value)| value)
    }
}

/// Highest high over the trailing `period` bars.
#[derive(Debug, Clone)]
pub struct RollingHigh {
    window: ExtremeWindow,
}

impl RollingHigh {
    pub fn new(period: usize) -> Self {
        Self {
            window: ExtremeWindow::new(period, Extremum::Max),
        }
    }

    pub fn period(&self) -> usize {
        self.window.period
    }

    /// Window high ending at the previous bar.
    ///
    /// Breakout entries compare the current close against this lagged
    /// channel so a new high cannot trigger on the bar that sets it.
    pub fn prev(&self) -> Option<f64> {
        self.window.prev
    }
}

impl Indicator for RollingHigh {
    fn warmup_bars(&self) -> usize {
        self.window.period
    }

    fn update(&mut self, bar: &Bar) {
        self.window.push(bar.high);
    }

    fn value(&self) -> Option<f64> {
        self.window.current()
    }
}

/// Lowest low over the trailing `period` bars.
#[derive(Debug, Clone)]
pub struct RollingLow {
    window: ExtremeWindow,
}

impl RollingLow {
    pub fn new(period: usize) -> Self {
        Self {
            window: ExtremeWindow::new(period, Extremum::Min),
        }
    }

    pub fn period(&self) -> usize {
        self.window.period
    }

    /// Window low ending at the previous bar.
    pub fn prev(&self) -> Option<f64> {
        self.window.prev
    }
}

impl Indicator for RollingLow {
    fn warmup_bars(&self) -> usize {
        self.window.period
    }

    fn update(&mut self, bar: &Bar) {
        self.window.push(bar.low);
    }

    fn value(&self) -> Option<f64> {
        self.window.current()
    }
}
