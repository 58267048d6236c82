//! Per-item stopwatch state machine.
//!
//! # Responsibility
//! - Track elapsed time across `stopped -> running <-> paused` transitions.
//! - Own the interval timer that advances elapsed time.
//! - Publish explicit events for every transition and tick batch.
//!
//! # Invariants
//! - Elapsed time only changes through delivered ticks or an explicit reset.
//! - The timer is armed if and only if the mode is `Running`.
//! - Illegal transitions are no-ops and report `false`.

use crate::event::EventBus;
use crate::schedule::{Clock, IntervalTimer};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// Default tick interval.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopwatchMode {
    Stopped,
    Running,
    Paused,
}

impl StopwatchMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Running => "running",
            Self::Paused => "paused",
        }
    }
}

impl Display for StopwatchMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-facing controls legal in a given mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopwatchControl {
    Start,
    Pause,
    Resume,
    Reset,
}

impl StopwatchControl {
    pub fn label(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Pause => "Pause",
            Self::Resume => "Resume",
            Self::Reset => "Reset",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopwatchEvent {
    ModeChanged {
        from: StopwatchMode,
        to: StopwatchMode,
    },
    /// One or more ticks were applied.
    Ticked { ticks: u32, elapsed: Duration },
}

/// Stopwatch driven by an interval timer against a `Clock`.
pub struct Stopwatch<C: Clock> {
    clock: C,
    mode: StopwatchMode,
    elapsed: Duration,
    timer: IntervalTimer,
    events: EventBus<StopwatchEvent>,
}

impl<C: Clock> Stopwatch<C> {
    pub fn new(clock: C) -> Self {
        Self::with_interval(clock, DEFAULT_TICK_INTERVAL)
    }

    pub fn with_interval(clock: C, interval: Duration) -> Self {
        Self {
            clock,
            mode: StopwatchMode::Stopped,
            elapsed: Duration::ZERO,
            timer: IntervalTimer::new(interval),
            events: EventBus::new(),
        }
    }

    pub fn mode(&self) -> StopwatchMode {
        self.mode
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn elapsed_whole_seconds(&self) -> u64 {
        self.elapsed.as_secs()
    }

    pub fn tick_interval(&self) -> Duration {
        self.timer.interval()
    }

    pub fn subscribe(&self) -> Receiver<StopwatchEvent> {
        self.events.subscribe()
    }

    /// `stopped|paused -> running`. Returns whether the mode changed.
    pub fn start(&mut self) -> bool {
        if self.mode == StopwatchMode::Running {
            return false;
        }
        self.timer.arm(self.clock.now());
        self.transition(StopwatchMode::Running);
        true
    }

    /// `running -> paused`, keeping elapsed time.
    pub fn pause(&mut self) -> bool {
        if self.mode != StopwatchMode::Running {
            return false;
        }
        self.timer.cancel();
        self.transition(StopwatchMode::Paused);
        true
    }

    /// `running|paused -> stopped`, resetting elapsed time to zero.
    pub fn stop(&mut self) -> bool {
        if self.mode == StopwatchMode::Stopped {
            return false;
        }
        self.timer.cancel();
        self.elapsed = Duration::ZERO;
        self.transition(StopwatchMode::Stopped);
        true
    }

    /// Delivers every tick due on the clock and returns how many were applied.
    pub fn pump(&mut self) -> u32 {
        let ticks = self.timer.take_due(self.clock.now());
        if ticks == 0 {
            return 0;
        }
        self.elapsed += self.timer.interval() * ticks;
        self.events.publish(StopwatchEvent::Ticked {
            ticks,
            elapsed: self.elapsed,
        });
        ticks
    }

    pub fn available_controls(&self) -> &'static [StopwatchControl] {
        match self.mode {
            StopwatchMode::Stopped => &[StopwatchControl::Start],
            StopwatchMode::Running => &[StopwatchControl::Pause],
            StopwatchMode::Paused => &[StopwatchControl::Resume, StopwatchControl::Reset],
        }
    }

    /// Applies a control. Controls not legal in the current mode are no-ops.
    pub fn apply(&mut self, control: StopwatchControl) -> bool {
        match control {
            StopwatchControl::Start | StopwatchControl::Resume => self.start(),
            StopwatchControl::Pause => self.pause(),
            StopwatchControl::Reset => self.stop(),
        }
    }

    fn transition(&mut self, to: StopwatchMode) {
        let from = self.mode;
        self.mode = to;
        debug!(
            "event=stopwatch_transition module=stopwatch status=ok from={} to={} elapsed_ms={}",
            from,
            to,
            self.elapsed.as_millis()
        );
        self.events
            .publish(StopwatchEvent::ModeChanged { from, to });
    }
}
