use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TrackerError;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Messages sent to the identity service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "tag", content = "payload")]
pub enum IdentityCommand {
    LoginUser(Credentials),
    CreateUser(Credentials),
    SignOut,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthErrorPayload {
    pub code: String,
    pub message: String,
}

impl From<AuthErrorPayload> for TrackerError {
    fn from(AuthErrorPayload { code, message }: AuthErrorPayload) -> Self {
        TrackerError::AuthFailure { code, message }
    }
}

/// Messages received from the identity service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "tag", content = "payload")]
pub enum IdentityEvent {
    /// `None` means the session was cleared.
    AuthStateChanged(Option<AuthUser>),
    LoginError(AuthErrorPayload),
    SignupError(AuthErrorPayload),
    UserSignedOut,
}

/// Result of decoding an inbound message. Tags this application doesn't know about are kept apart
/// so they can be logged and skipped.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Event(IdentityEvent),
    Unrecognized { tag: String, payload: Value },
}

#[derive(Deserialize)]
struct Envelope {
    tag: String,
    #[serde(default)]
    payload: Value,
}

impl IdentityEvent {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn payload<T: for<'de> Deserialize<'de>>(tag: &str, payload: Value) -> Result<T, TrackerError> {
    serde_json::from_value(payload)
        .map_err(|e| TrackerError::DecodeFailure(format!("Invalid payload for {tag}: {e}")))
}

/// Decodes a raw message of the identity service.
pub fn decode_inbound(raw: &str) -> Result<Inbound, TrackerError> {
    let Envelope { tag, payload: body } = serde_json::from_str(raw)
        .map_err(|e| TrackerError::DecodeFailure(format!("Invalid envelope: {e}")))?;

    let event = match tag.as_str() {
        "AuthStateChanged" => IdentityEvent::AuthStateChanged(payload(&tag, body)?),
        "LoginError" => IdentityEvent::LoginError(payload(&tag, body)?),
        "SignupError" => IdentityEvent::SignupError(payload(&tag, body)?),
        "UserSignedOut" => IdentityEvent::UserSignedOut,
        _ => return Ok(Inbound::Unrecognized { tag, payload: body }),
    };
    Ok(Inbound::Event(event))
}
