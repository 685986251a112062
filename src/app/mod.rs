pub mod shutdown;
pub mod state;

use anyhow::Result;
use chrono::{DateTime, Utc};
use state::{update, AppState, Message};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{
    identity::{messages::Credentials, service::IdentityBridge},
    tracking::timer::TimerAction,
    utils::clock::Clock,
};

/// What the user can look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Status,
    Days,
    Export,
}

/// Requests coming from the user interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiRequest {
    Timer(TimerAction),
    Login(Credentials),
    CreateUser(Credentials),
    SignOut,
    Show(Screen),
    Quit,
}

/// Output side of the user interface.
pub trait Presenter {
    fn render(&mut self, state: &AppState, now: DateTime<Utc>, screen: Screen) -> Result<()>;
}

/// Single actor owning [AppState]. Handles one request or identity event at a time.
pub struct App {
    state: AppState,
    clock: Box<dyn Clock>,
    bridge: IdentityBridge,
    requests: UnboundedReceiver<UiRequest>,
    shutdown: CancellationToken,
}

impl App {
    pub fn new(
        state: AppState,
        clock: Box<dyn Clock>,
        bridge: IdentityBridge,
        requests: UnboundedReceiver<UiRequest>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            state,
            clock,
            bridge,
            requests,
            shutdown,
        }
    }

    /// Executes the application event loop. Returns the final state once the user quits, input
    /// ends or shutdown is requested.
    pub async fn run(mut self, presenter: &mut impl Presenter) -> Result<AppState> {
        let mut state = self.state;
        presenter.render(&state, self.clock.time(), Screen::Status)?;

        loop {
            // Identity events are handled before new user input.
            let input = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => {
                    info!("Shutdown requested");
                    break;
                }
                Some(raw) = self.bridge.events.recv() => Input::Inbound(raw),
                request = self.requests.recv() => match request {
                    None | Some(UiRequest::Quit) => break,
                    Some(request) => Input::Request(request),
                },
            };

            let now = self.clock.time();
            let message = match input {
                Input::Inbound(raw) => Message::Inbound(raw),
                Input::Request(UiRequest::Show(screen)) => {
                    presenter.render(&state, now, screen)?;
                    continue;
                }
                Input::Request(request) => match to_message(request, now) {
                    Some(message) => message,
                    None => continue,
                },
            };

            debug!("Handling {}", message_name(&message));
            let before = state.clone();
            let (next, command) = update(state, message);
            state = next;

            if let Some(command) = command {
                if self.bridge.commands.send(command).is_err() {
                    error!("Identity service is gone, dropping command");
                }
            }

            if state != before {
                presenter.render(&state, now, Screen::Status)?;
            }
        }

        Ok(state)
    }
}

enum Input {
    Request(UiRequest),
    Inbound(String),
}

fn to_message(request: UiRequest, now: DateTime<Utc>) -> Option<Message> {
    match request {
        UiRequest::Timer(action) => Some(Message::Timer(action, now)),
        UiRequest::Login(credentials) => Some(Message::Login(credentials)),
        UiRequest::CreateUser(credentials) => Some(Message::CreateUser(credentials)),
        UiRequest::SignOut => Some(Message::SignOut),
        UiRequest::Show(_) | UiRequest::Quit => None,
    }
}

/// Credentials must stay out of the logs.
fn message_name(message: &Message) -> &'static str {
    match message {
        Message::Timer(TimerAction::Start, _) => "start",
        Message::Timer(TimerAction::Stop, _) => "stop",
        Message::Timer(TimerAction::Resume, _) => "resume",
        Message::Login(_) => "login",
        Message::CreateUser(_) => "create user",
        Message::SignOut => "sign out",
        Message::Inbound(_) => "identity event",
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    use crate::{
        identity::{messages::IdentityCommand, service::IdentityBridge},
        tracking::timer::{TimerAction, TimerState},
        utils::{clock::MockClock, logging::TEST_LOGGING},
    };

    use super::{state::AppState, App, Presenter, Screen, UiRequest};

    const TEST_START_DATE: NaiveDateTime =
        NaiveDateTime::new(NaiveDate::from_ymd_opt(2021, 6, 14).unwrap(), NaiveTime::MIN);

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.from_utc_datetime(&TEST_START_DATE) + Duration::minutes(minutes)
    }

    #[derive(Default)]
    struct RecordingPresenter {
        screens: Vec<Screen>,
    }

    impl Presenter for RecordingPresenter {
        fn render(&mut self, _: &AppState, _: DateTime<Utc>, screen: Screen) -> Result<()> {
            self.screens.push(screen);
            Ok(())
        }
    }

    fn clock_at(minutes: Vec<i64>) -> MockClock {
        let mut clock = MockClock::new();
        let mut times = minutes.into_iter().map(at);
        clock
            .expect_time()
            .returning(move || times.next().unwrap_or_else(|| at(24 * 60)));
        clock
    }

    #[tokio::test]
    async fn timer_requests_use_clock() -> Result<()> {
        *TEST_LOGGING;
        let (command_sender, _command_receiver) = mpsc::unbounded_channel();
        let (_event_sender, event_receiver) = mpsc::unbounded_channel();
        let (request_sender, request_receiver) = mpsc::unbounded_channel();

        // One reading for the initial render, then one per request.
        let clock = clock_at(vec![0, 10, 20, 30, 40, 90]);
        let app = App::new(
            AppState::new(FixedOffset::east_opt(0).unwrap()),
            Box::new(clock),
            IdentityBridge {
                commands: command_sender,
                events: event_receiver,
            },
            request_receiver,
            CancellationToken::new(),
        );

        for action in [TimerAction::Start, TimerAction::Stop] {
            request_sender.send(UiRequest::Timer(action))?;
        }
        request_sender.send(UiRequest::Show(Screen::Days))?;
        for action in [TimerAction::Start, TimerAction::Stop] {
            request_sender.send(UiRequest::Timer(action))?;
        }
        request_sender.send(UiRequest::Quit)?;

        let mut presenter = RecordingPresenter::default();
        let state = app.run(&mut presenter).await?;

        assert_eq!(state.timer, TimerState::Closed(at(40), at(90)));
        assert_eq!(state.ledger.total(), Duration::minutes(60));
        assert!(presenter.screens.contains(&Screen::Days));
        Ok(())
    }

    #[tokio::test]
    async fn identity_events_and_commands() -> Result<()> {
        *TEST_LOGGING;
        let (command_sender, mut command_receiver) = mpsc::unbounded_channel();
        let (event_sender, event_receiver) = mpsc::unbounded_channel();
        let (request_sender, request_receiver) = mpsc::unbounded_channel();

        let app = App::new(
            AppState::new(FixedOffset::east_opt(0).unwrap()),
            Box::new(clock_at(vec![])),
            IdentityBridge {
                commands: command_sender,
                events: event_receiver,
            },
            request_receiver,
            CancellationToken::new(),
        );

        event_sender.send(r#"{"tag":"Unheard","payload":1}"#.to_string())?;
        event_sender.send(r#"{"tag":"AuthStateChanged","payload":{"uid":"u7"}}"#.to_string())?;
        request_sender.send(UiRequest::SignOut)?;
        drop(request_sender);

        let mut presenter = RecordingPresenter::default();
        let state = app.run(&mut presenter).await?;

        assert_eq!(state.user.map(|v| v.uid), Some("u7".to_string()));
        assert_eq!(state.timer, TimerState::Idle);
        assert_eq!(command_receiver.recv().await, Some(IdentityCommand::SignOut));
        // Initial render plus the sign in. The unknown tag doesn't cause a render.
        assert_eq!(presenter.screens, vec![Screen::Status, Screen::Status]);
        Ok(())
    }

    #[tokio::test]
    async fn cancellation_stops_loop() -> Result<()> {
        *TEST_LOGGING;
        let (command_sender, _command_receiver) = mpsc::unbounded_channel();
        let (_event_sender, event_receiver) = mpsc::unbounded_channel();
        let (_request_sender, request_receiver) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();

        let app = App::new(
            AppState::new(FixedOffset::east_opt(0).unwrap()),
            Box::new(clock_at(vec![])),
            IdentityBridge {
                commands: command_sender,
                events: event_receiver,
            },
            request_receiver,
            shutdown.clone(),
        );
        shutdown.cancel();

        let state = app.run(&mut RecordingPresenter::default()).await?;
        assert_eq!(state.timer, TimerState::Idle);
        Ok(())
    }
}
