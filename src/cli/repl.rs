use std::io::BufRead;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::error;

use crate::{
    app::{Screen, UiRequest},
    identity::messages::Credentials,
    tracking::timer::TimerAction,
};

/// One line typed by the user.
#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ReplLine {
    #[command(subcommand)]
    command: ReplCommand,
}

#[derive(Subcommand, Debug)]
enum ReplCommand {
    #[command(about = "Start a new timer")]
    Start,
    #[command(about = "Stop the running timer and add it to today's total")]
    Stop,
    #[command(about = "Continue the last stopped timer from its original start")]
    Resume,
    #[command(about = "Sign in with an existing account")]
    Login { email: String, password: String },
    #[command(about = "Create an account and sign in")]
    Signup { email: String, password: String },
    #[command(about = "Sign out")]
    Signout,
    #[command(about = "Show the timer and the signed in user")]
    Status,
    #[command(about = "Show tracked time per day")]
    Days,
    #[command(about = "Print tracked days as JSON lines")]
    Export,
    #[command(about = "Exit the application", visible_alias = "exit")]
    Quit,
}

impl From<ReplCommand> for UiRequest {
    fn from(value: ReplCommand) -> Self {
        match value {
            ReplCommand::Start => UiRequest::Timer(TimerAction::Start),
            ReplCommand::Stop => UiRequest::Timer(TimerAction::Stop),
            ReplCommand::Resume => UiRequest::Timer(TimerAction::Resume),
            ReplCommand::Login { email, password } => {
                UiRequest::Login(Credentials { email, password })
            }
            ReplCommand::Signup { email, password } => {
                UiRequest::CreateUser(Credentials { email, password })
            }
            ReplCommand::Signout => UiRequest::SignOut,
            ReplCommand::Status => UiRequest::Show(Screen::Status),
            ReplCommand::Days => UiRequest::Show(Screen::Days),
            ReplCommand::Export => UiRequest::Show(Screen::Export),
            ReplCommand::Quit => UiRequest::Quit,
        }
    }
}

/// Parses a line of input. Blank lines give `Ok(None)`, anything clap rejects is returned as the
/// text to show to the user.
pub fn parse_line(line: &str) -> Result<Option<UiRequest>, String> {
    let words = line.split_whitespace().collect::<Vec<_>>();
    if words.is_empty() {
        return Ok(None);
    }
    ReplLine::try_parse_from(words)
        .map(|v| Some(v.command.into()))
        .map_err(|e| e.render().to_string())
}

/// Reads stdin on a dedicated thread, since a blocking read can't be cancelled from the runtime.
/// The channel closes when input ends or after `quit`.
pub fn spawn_stdin_reader() -> UnboundedReceiver<UiRequest> {
    let (sender, receiver) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    error!("Failed to read input {e:?}");
                    break;
                }
            };
            match parse_line(&line) {
                Ok(Some(request)) => {
                    let quit = request == UiRequest::Quit;
                    if sender.send(request).is_err() || quit {
                        break;
                    }
                }
                Ok(None) => {}
                Err(help) => println!("{help}"),
            }
        }
    });
    receiver
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::{
        app::{Screen, UiRequest},
        identity::messages::Credentials,
        tracking::timer::TimerAction,
    };

    use super::parse_line;

    #[rstest]
    #[case::start("start", UiRequest::Timer(TimerAction::Start))]
    #[case::stop("  stop ", UiRequest::Timer(TimerAction::Stop))]
    #[case::resume("resume", UiRequest::Timer(TimerAction::Resume))]
    #[case::signout("signout", UiRequest::SignOut)]
    #[case::days("days", UiRequest::Show(Screen::Days))]
    #[case::export("export", UiRequest::Show(Screen::Export))]
    #[case::exit_alias("exit", UiRequest::Quit)]
    fn test_parse_line(#[case] line: &str, #[case] expected: UiRequest) {
        assert_eq!(parse_line(line), Ok(Some(expected)));
    }

    #[test]
    fn parses_credentials() {
        assert_eq!(
            parse_line("login me@mail.com hunter22"),
            Ok(Some(UiRequest::Login(Credentials {
                email: "me@mail.com".into(),
                password: "hunter22".into()
            })))
        );
    }

    #[test]
    fn blank_line_is_skipped() {
        assert_eq!(parse_line("   "), Ok(None));
    }

    #[rstest]
    #[case::unknown("dance")]
    #[case::missing_password("signup me@mail.com")]
    fn rejects_bad_input(#[case] line: &str) {
        assert!(parse_line(line).is_err());
    }
}
