use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use super::{
    messages::{AuthErrorPayload, AuthUser, Credentials, IdentityCommand, IdentityEvent},
    service::IdentityProvider,
};

const MIN_PASSWORD_LENGTH: usize = 6;

struct Account {
    uid: String,
    password: String,
}

/// In-memory account store speaking the same protocol as the hosted service. Accounts live only as
/// long as the process.
#[derive(Default)]
pub struct LocalIdentityProvider {
    accounts: HashMap<String, Account>,
    signed_in: Option<AuthUser>,
}

impl LocalIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn login(&mut self, Credentials { email, password }: Credentials) -> Vec<IdentityEvent> {
        let user = match self.accounts.get(&email) {
            None => {
                return vec![IdentityEvent::LoginError(auth_error(
                    "auth/user-not-found",
                    "There is no user record corresponding to this email",
                ))]
            }
            Some(account) if account.password != password => {
                return vec![IdentityEvent::LoginError(auth_error(
                    "auth/wrong-password",
                    "The password is invalid",
                ))]
            }
            Some(account) => AuthUser {
                uid: account.uid.clone(),
                email: Some(email),
            },
        };
        info!("Signed in {}", user.uid);
        self.signed_in = Some(user.clone());
        vec![IdentityEvent::AuthStateChanged(Some(user))]
    }

    fn create(&mut self, Credentials { email, password }: Credentials) -> Vec<IdentityEvent> {
        if !is_valid_email(&email) {
            return vec![IdentityEvent::SignupError(auth_error(
                "auth/invalid-email",
                "The email address is badly formatted",
            ))];
        }
        if self.accounts.contains_key(&email) {
            return vec![IdentityEvent::SignupError(auth_error(
                "auth/email-already-in-use",
                "The email address is already in use by another account",
            ))];
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return vec![IdentityEvent::SignupError(auth_error(
                "auth/weak-password",
                "Password should be at least 6 characters",
            ))];
        }

        let uid = format!("local-{}", self.accounts.len() + 1);
        self.accounts.insert(
            email.clone(),
            Account {
                uid: uid.clone(),
                password,
            },
        );
        info!("Created account {uid}");

        // New accounts are signed in straight away.
        let user = AuthUser {
            uid,
            email: Some(email),
        };
        self.signed_in = Some(user.clone());
        vec![IdentityEvent::AuthStateChanged(Some(user))]
    }

    fn sign_out(&mut self) -> Vec<IdentityEvent> {
        if self.signed_in.take().is_some() {
            vec![
                IdentityEvent::UserSignedOut,
                IdentityEvent::AuthStateChanged(None),
            ]
        } else {
            vec![IdentityEvent::UserSignedOut]
        }
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn handle(&mut self, command: IdentityCommand) -> Result<Vec<IdentityEvent>> {
        Ok(match command {
            IdentityCommand::LoginUser(credentials) => self.login(credentials),
            IdentityCommand::CreateUser(credentials) => self.create(credentials),
            IdentityCommand::SignOut => self.sign_out(),
        })
    }
}

fn auth_error(code: &str, message: &str) -> AuthErrorPayload {
    AuthErrorPayload {
        code: code.into(),
        message: message.into(),
    }
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((user, domain)) => !user.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    }
}
