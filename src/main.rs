mod api;
mod cli;
mod config;
mod db;
mod error;
mod git;
mod mail;
mod models;
mod password;
mod push;
#[cfg(test)]
mod test_utils;
mod workspace;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use api::AppState;
use cli::Cli;
use config::{Config, SMTP_PASSWORD_ENV};
use git::{GitRepo, Identity};
use mail::{MailTransport, SmtpMailer, UnconfiguredMailer};
use push::{GitPusher, PushOutbox};
use workspace::{SharedRepo, Workspace};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn commit_identity(config: &Config) -> Option<Identity> {
    match (&config.repository.author_name, &config.repository.author_email) {
        (Some(name), Some(email)) => Some(Identity {
            name: name.clone(),
            email: email.clone(),
        }),
        _ => None,
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(&cli.config)?;
    cli.apply(&mut config);
    config.apply_smtp_password(std::env::var(SMTP_PASSWORD_ENV).ok());

    init_tracing(&config.logging.filter);

    let repo = GitRepo::open(&config.repository.path)?.with_identity(commit_identity(&config));
    info!(path = %config.repository.path.display(), remote = %config.repository.remote, "opened repository");

    let shared = SharedRepo::new(repo);
    let pushes = PushOutbox::spawn_with_limit(
        config.repository.remote.clone(),
        Arc::new(GitPusher::new(shared.clone())),
        config.push.history_limit,
    );
    let workspace = Workspace::new(shared, pushes);

    let db = db::initialize(&config.database.path)
        .await
        .context("Failed to initialize database")?;

    let mailer: Arc<dyn MailTransport> = match SmtpMailer::from_config(&config.smtp) {
        Ok(mailer) => Arc::new(mailer),
        Err(e) => {
            warn!(error = %e, "email sending disabled");
            Arc::new(UnconfiguredMailer::new(e.to_string()))
        }
    };

    let app = api::router(AppState {
        workspace,
        db,
        mailer,
    });

    let listener = tokio::net::TcpListener::bind(config.server.bind)
        .await
        .context(format!("Failed to bind {}", config.server.bind))?;
    info!(addr = %config.server.bind, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await
        .context("Server error")?;

    Ok(())
}
