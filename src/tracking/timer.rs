use std::fmt::Display;

use chrono::{DateTime, Duration, Utc};

use crate::error::TrackerError;

/// State of the timer. The machine is cyclic: `Idle -> Running -> Closed -> Running -> ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Idle,
    Running(DateTime<Utc>),
    /// Invariant: end is never before start.
    Closed(DateTime<Utc>, DateTime<Utc>),
}

/// Requests that move the timer between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    Start,
    Stop,
    Resume,
}

impl Display for TimerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TimerAction {
    fn name(&self) -> &'static str {
        match self {
            TimerAction::Start => "start",
            TimerAction::Stop => "stop",
            TimerAction::Resume => "resume",
        }
    }
}

impl TimerState {
    /// Opens a new interval at `now`. Any closed interval is dropped, so it has to be committed to
    /// the ledger before calling this.
    pub fn start(now: DateTime<Utc>) -> Self {
        TimerState::Running(now)
    }

    /// Closes the interval that started at `start`.
    pub fn stop(start: DateTime<Utc>, now: DateTime<Utc>) -> Result<Self, TrackerError> {
        if now < start {
            return Err(TrackerError::InvalidInterval { start, end: now });
        }
        Ok(TimerState::Closed(start, now))
    }

    /// Reopens a closed interval keeping its original start.
    pub fn resume(start: DateTime<Utc>) -> Self {
        TimerState::Running(start)
    }

    /// Transition table. Leaves `self` untouched when the action isn't allowed from the current
    /// state.
    pub fn apply(self, action: TimerAction, now: DateTime<Utc>) -> Result<Self, TrackerError> {
        match (self, action) {
            (_, TimerAction::Start) => Ok(Self::start(now)),
            (TimerState::Running(start), TimerAction::Stop) => Self::stop(start, now),
            (TimerState::Closed(start, _), TimerAction::Resume) => Ok(Self::resume(start)),
            (state, action) => Err(TrackerError::InvalidTransition {
                action: action.name(),
                state: state.name(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TimerState::Idle => "idle",
            TimerState::Running(_) => "running",
            TimerState::Closed(_, _) => "stopped",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, TimerState::Running(_))
    }

    /// Time covered by the current interval. Running intervals are measured up to `now`.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        match *self {
            TimerState::Idle => Duration::zero(),
            TimerState::Running(start) => (now - start).max(Duration::zero()),
            TimerState::Closed(start, end) => end - start,
        }
    }
}
