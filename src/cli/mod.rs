pub mod repl;
pub mod view;

use std::path::PathBuf;

use anyhow::Result;
use chrono::FixedOffset;
use clap::Parser;
use repl::spawn_stdin_reader;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, level_filters::LevelFilter};
use view::ConsolePresenter;

use crate::{
    app::{shutdown::detect_shutdown, state::AppState, App, Presenter, Screen},
    identity::{local::LocalIdentityProvider, service::connect},
    utils::{
        clock::{Clock, DefaultClock},
        config::{resolve_zone, AppConfig},
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, LOG_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Daytally", version, long_about = None)]
#[command(about = "Track time with a simple timer and see it summed up per day")]
struct Args {
    #[arg(
        long,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(
        long = "utc-offset",
        allow_hyphen_values = true,
        help = "Zone used to group time into days, for example +02:00. Defaults to the local zone"
    )]
    utc_offset: Option<FixedOffset>,
    #[arg(long = "log-filter", help = "Log level, for example debug")]
    log: Option<LevelFilter>,
    #[arg(long = "log-console", help = "Also print logs to stderr")]
    log_console: bool,
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = match args.dir {
        Some(dir) => {
            ensure_dir(&dir)?;
            dir
        }
        None => create_application_default_path()?,
    };
    let config = AppConfig::load(&app_dir)?;
    let log_level = match args.log {
        Some(level) => Some(level),
        None => config.log_level()?,
    };
    enable_logging(LOG_PREFIX, &app_dir, log_level, args.log_console)?;

    let zone = resolve_zone(args.utc_offset, &config)?;
    info!("Starting in {app_dir:?} with zone {zone}");

    let shutdown = CancellationToken::new();
    let (bridge, identity_service) = connect(LocalIdentityProvider::new());
    let clock = DefaultClock;
    let app = App::new(
        AppState::new(zone),
        Box::new(DefaultClock),
        bridge,
        spawn_stdin_reader(),
        shutdown.clone(),
    );

    let mut presenter = ConsolePresenter::new(std::io::stdout());
    let (_, identity_result, app_result) = tokio::join!(
        detect_shutdown(shutdown.clone()),
        identity_service.run(),
        async {
            let result = app.run(&mut presenter).await;
            shutdown.cancel();
            result
        },
    );

    if let Err(identity_result) = identity_result {
        error!("Identity service got an error {:?}", identity_result);
    }

    let state = app_result?;
    presenter.render(&state, clock.time(), Screen::Days)?;
    Ok(())
}
