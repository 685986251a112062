use chrono::{DateTime, FixedOffset, Utc};
use tracing::{debug, error, info, warn};

use crate::{
    error::TrackerError,
    identity::messages::{
        decode_inbound, AuthUser, Credentials, IdentityCommand, IdentityEvent, Inbound,
    },
    tracking::{
        ledger::DailyLedger,
        timer::{TimerAction, TimerState},
    },
};

/// Everything the application knows. Only [update] produces new versions of it.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub timer: TimerState,
    pub ledger: DailyLedger,
    /// End of the part of the current session that is already in the ledger. Set when the timer
    /// stops and kept through a resume so the next stop only adds the new tail.
    pub committed_until: Option<DateTime<Utc>>,
    pub user: Option<AuthUser>,
    pub error: Option<TrackerError>,
    pub zone: FixedOffset,
}

impl AppState {
    pub fn new(zone: FixedOffset) -> Self {
        Self {
            timer: TimerState::Idle,
            ledger: DailyLedger::new(),
            committed_until: None,
            user: None,
            error: None,
            zone,
        }
    }
}

/// Inputs of the reducer. Timer actions carry the instant the host read when the action happened.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Timer(TimerAction, DateTime<Utc>),
    Login(Credentials),
    CreateUser(Credentials),
    SignOut,
    /// Raw message from the identity service.
    Inbound(String),
}

/// Applies one message. Returns the next state and the command to send to the identity service,
/// if any.
pub fn update(state: AppState, message: Message) -> (AppState, Option<IdentityCommand>) {
    match message {
        Message::Timer(action, now) => (apply_timer(state, action, now), None),
        Message::Login(credentials) => (
            AppState {
                error: None,
                ..state
            },
            Some(IdentityCommand::LoginUser(credentials)),
        ),
        Message::CreateUser(credentials) => (
            AppState {
                error: None,
                ..state
            },
            Some(IdentityCommand::CreateUser(credentials)),
        ),
        Message::SignOut => (
            AppState {
                error: None,
                ..state
            },
            Some(IdentityCommand::SignOut),
        ),
        Message::Inbound(raw) => (apply_inbound(state, &raw), None),
    }
}

fn apply_timer(mut state: AppState, action: TimerAction, now: DateTime<Utc>) -> AppState {
    let next = state.timer.apply(action, now).and_then(|next| match (next, state.committed_until) {
        // A resumed session can't end before the part already in the ledger.
        (TimerState::Closed(_, end), Some(committed)) if end < committed => {
            Err(TrackerError::InvalidInterval {
                start: committed,
                end,
            })
        }
        _ => Ok(next),
    });
    let next = match next {
        Ok(next) => next,
        Err(e) => {
            warn!("Rejected timer {action}: {e}");
            state.error = Some(e);
            return state;
        }
    };

    match (action, next) {
        (TimerAction::Stop, TimerState::Closed(start, end)) => {
            let from = state.committed_until.map_or(start, |v| v.max(start));
            state.ledger = state.ledger.record_duration(start, end - from, &state.zone);
            state.committed_until = Some(end);
        }
        (TimerAction::Start, _) => {
            if state.timer.is_running() {
                warn!("Restarting a running timer, its interval is dropped");
            }
            state.committed_until = None;
        }
        _ => {}
    }

    debug!("Timer {} -> {}", state.timer.name(), next.name());
    state.timer = next;
    state.error = None;
    state
}

fn apply_inbound(mut state: AppState, raw: &str) -> AppState {
    let event = match decode_inbound(raw) {
        Ok(Inbound::Event(event)) => event,
        Ok(Inbound::Unrecognized { tag, .. }) => {
            warn!("Ignoring identity message with unknown tag {tag}");
            return state;
        }
        Err(e) => {
            error!("Failed to decode identity message {raw}: {e}");
            state.error = Some(e);
            return state;
        }
    };

    match event {
        IdentityEvent::AuthStateChanged(user) => {
            info!(
                "Auth state changed to {}",
                user.as_ref().map_or("signed out", |v| v.uid.as_str())
            );
            state.user = user;
            state.error = None;
        }
        IdentityEvent::LoginError(payload) | IdentityEvent::SignupError(payload) => {
            info!("Authentication failed with {}", payload.code);
            state.error = Some(payload.into());
        }
        IdentityEvent::UserSignedOut => {
            state.user = None;
        }
    }
    state
}
