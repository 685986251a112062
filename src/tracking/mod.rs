//! Time tracking core. Everything here is pure: the current instant and the time zone are always
//! passed in by the caller.
//!  - [timer::TimerState] tracks the open or closed interval.
//!  - [ledger::DailyLedger] folds finished intervals into per day totals.
//!  - [format] turns instants and durations into display strings.

pub mod format;
pub mod ledger;
pub mod timer;
