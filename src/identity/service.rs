use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info};

use super::messages::{AuthErrorPayload, IdentityCommand, IdentityEvent};

/// Seam in front of the hosted identity SDK. A provider answers a command with any number of
/// events, which are delivered to the application as raw messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + 'static {
    async fn handle(&mut self, command: IdentityCommand) -> Result<Vec<IdentityEvent>>;
}

/// Both ends of the identity channels as seen by the application.
pub struct IdentityBridge {
    pub commands: UnboundedSender<IdentityCommand>,
    pub events: UnboundedReceiver<String>,
}

/// Drains commands and forwards provider answers. Stops once every command sender is dropped.
pub struct IdentityService<P> {
    receiver: UnboundedReceiver<IdentityCommand>,
    events: UnboundedSender<String>,
    provider: P,
}

impl<P: IdentityProvider> IdentityService<P> {
    pub fn new(
        receiver: UnboundedReceiver<IdentityCommand>,
        events: UnboundedSender<String>,
        provider: P,
    ) -> Self {
        Self {
            receiver,
            events,
            provider,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        while let Some(command) = self.receiver.recv().await {
            debug!("Processing identity command {}", command_name(&command));
            let fallback = failure_event(&command);
            let events = match self.provider.handle(command).await {
                Ok(events) => events,
                Err(e) => {
                    error!("Identity provider failed {e:?}");
                    vec![fallback]
                }
            };
            for event in events {
                let raw = event.encode()?;
                if self.events.send(raw).is_err() {
                    info!("Application stopped listening to identity events");
                    return Ok(());
                }
            }
        }
        Ok(())
    }
}

/// Event reported when the provider itself fails. Sign-up failures use the sign-up channel, every
/// other command reports through the login one.
fn failure_event(command: &IdentityCommand) -> IdentityEvent {
    let payload = AuthErrorPayload {
        code: "auth/internal-error".into(),
        message: "The identity service is unavailable, try again later".into(),
    };
    match command {
        IdentityCommand::CreateUser(_) => IdentityEvent::SignupError(payload),
        IdentityCommand::LoginUser(_) | IdentityCommand::SignOut => {
            IdentityEvent::LoginError(payload)
        }
    }
}

/// Passwords must never reach the logs, so commands are logged by name only.
fn command_name(command: &IdentityCommand) -> &'static str {
    match command {
        IdentityCommand::LoginUser(_) => "LoginUser",
        IdentityCommand::CreateUser(_) => "CreateUser",
        IdentityCommand::SignOut => "SignOut",
    }
}

/// Creates the two independent channels between the application and a provider.
pub fn connect<P: IdentityProvider>(provider: P) -> (IdentityBridge, IdentityService<P>) {
    let (command_sender, command_receiver) = mpsc::unbounded_channel();
    let (event_sender, event_receiver) = mpsc::unbounded_channel();
    (
        IdentityBridge {
            commands: command_sender,
            events: event_receiver,
        },
        IdentityService::new(command_receiver, event_sender, provider),
    )
}
