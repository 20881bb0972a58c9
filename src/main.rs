//! CISEval - command-line client for the CIS evaluation platform
//!
//! Main entry point: initializes tracing, loads configuration, wires the
//! session subsystem, and dispatches the chosen command.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ciseval::api::ApiClient;
use ciseval::cli::{Cli, Commands};
use ciseval::commands::{self, AppContext};
use ciseval::config::Config;
use ciseval::session::persist::KeyringCredentials;
use ciseval::session::{ExpiryMonitor, ProfileHydrator, SessionStore};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);

    // Load configuration and apply CLI/env overrides.
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(api_base) = &cli.api_base {
        tracing::debug!("Using API base override: {}", api_base);
        config.api.base_url = api_base.clone();
    }
    config.validate()?;

    let api = ApiClient::new(&config.api)?;
    let store = Arc::new(SessionStore::open(
        Arc::new(KeyringCredentials),
        config.session.storage_ttl_hours,
    ));
    let monitor = Arc::new(ExpiryMonitor::new(
        store.clone(),
        Duration::from_secs(config.session.validity_secs),
        Duration::from_secs(config.session.poll_interval_secs),
    ));
    monitor.start();

    let ctx = AppContext {
        config,
        api,
        store,
        hydrator: ProfileHydrator::new(),
        monitor: monitor.clone(),
    };

    let result = match cli.command {
        Commands::Login { username } => commands::login(&ctx, username).await,
        Commands::Logout => {
            commands::logout(&ctx);
            Ok(())
        }
        Commands::Profile => commands::profile(&ctx).await,
        Commands::Classes => commands::classes(&ctx).await,
        Commands::Students { class_id } => commands::students(&ctx, &class_id).await,
        Commands::Evaluate {
            class_id,
            student_id,
            student_name,
            student_name_ru,
        } => {
            commands::evaluate(
                &ctx,
                &class_id,
                &student_id,
                &student_name,
                student_name_ru.as_deref(),
            )
            .await
        }
        Commands::Evaluations => commands::evaluations(&ctx).await,
        Commands::Stats { classes } => commands::stats(&ctx, classes).await,
    };

    monitor.stop();
    result
}

/// Initialize the tracing subscriber with an env-filter; `--verbose`
/// raises the default level for this crate to debug.
fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "ciseval=debug" } else { "ciseval=info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
