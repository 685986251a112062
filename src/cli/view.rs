use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::{
    app::{state::AppState, Presenter, Screen},
    tracking::{
        format::{format_clock_time, format_day_heading, format_duration},
        timer::TimerState,
    },
};

/// Writes screens as plain text lines.
pub struct ConsolePresenter<W: Write> {
    writer: W,
}

impl<W: Write> ConsolePresenter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn status(&mut self, state: &AppState, now: DateTime<Utc>) -> Result<()> {
        let zone = &state.zone;
        match &state.user {
            Some(user) => writeln!(
                self.writer,
                "Signed in as {}",
                user.email.as_deref().unwrap_or(&user.uid)
            )?,
            None => writeln!(self.writer, "Signed out")?,
        }

        match state.timer {
            TimerState::Idle => writeln!(self.writer, "Timer is idle")?,
            TimerState::Running(start) => writeln!(
                self.writer,
                "Running since {} ({})",
                format_clock_time(start, zone),
                format_duration(state.timer.elapsed(now))
            )?,
            TimerState::Closed(start, end) => writeln!(
                self.writer,
                "Stopped: {} ~ {} ({})",
                format_clock_time(start, zone),
                format_clock_time(end, zone),
                format_duration(state.timer.elapsed(now))
            )?,
        }

        if let Some(error) = &state.error {
            writeln!(self.writer, "Error: {}", error.user_message())?;
        }
        Ok(())
    }

    fn days(&mut self, state: &AppState) -> Result<()> {
        if state.ledger.is_empty() {
            writeln!(self.writer, "No tracked days yet")?;
            return Ok(());
        }
        for day in state.ledger.sorted_days() {
            writeln!(
                self.writer,
                "- {}: {}",
                format_day_heading(day.representative_instant, &state.zone),
                format_duration(day.total_duration)
            )
            .with_context(|| format!("Failed to write day {}", day.date_key))?;
        }
        Ok(())
    }

    fn export(&mut self, state: &AppState) -> Result<()> {
        for day in state.ledger.sorted_days() {
            serde_json::to_writer(&mut self.writer, day)?;
            writeln!(self.writer)?;
        }
        Ok(())
    }
}

impl<W: Write> Presenter for ConsolePresenter<W> {
    fn render(&mut self, state: &AppState, now: DateTime<Utc>, screen: Screen) -> Result<()> {
        match screen {
            Screen::Status => self.status(state, now)?,
            Screen::Days => self.days(state)?,
            Screen::Export => self.export(state)?,
        }
        self.writer.flush()?;
        Ok(())
    }
}
