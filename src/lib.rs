pub mod api;
pub mod clients;
pub mod config;
pub mod constants;
pub mod db;
pub mod entities;
pub mod models;
pub mod services;
pub mod state;

pub mod cli;

pub use config::Config;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut config = Config::load()?;

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let (layer, task) = tracing_loki::builder()
            .label("app", "naukrimili")?
            .extra_field("env", "production")?
            .build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    if config.provider.enabled
        && (config.provider.app_id.is_empty() || config.provider.app_key.is_empty())
    {
        warn!("Adzuna credentials not configured, external provider disabled");
        config.provider.enabled = false;
    }
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Daemon) => run_daemon(config, prometheus_handle).await,

        Some(Commands::Search {
            query,
            location,
            country,
            skills,
            remote,
            limit,
            local_only,
        }) => {
            cli::cmd_search_jobs(
                &config,
                cli::SearchArgs {
                    query: query.join(" "),
                    location,
                    country,
                    skills,
                    remote,
                    limit,
                    local_only,
                },
            )
            .await
        }

        Some(Commands::List { page }) => cli::cmd_list_jobs(&config, page).await,

        Some(Commands::Import { path, dry_run }) => cli::cmd_import(&config, &path, dry_run).await,

        Some(Commands::Init) => {
            if Config::create_default_if_missing()? {
                println!("Created config.toml");
            } else {
                println!("config.toml already exists");
            }
            Ok(())
        }

        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

async fn run_daemon(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!(
        "NaukriMili v{} starting in daemon mode...",
        env!("CARGO_PKG_VERSION")
    );

    if !config.server.enabled {
        anyhow::bail!("server.enabled is false, nothing to run");
    }

    let port = config.server.port;
    let state = api::create_app_state_from_config(config, prometheus_handle).await?;
    let app = api::router(state).await;

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Web API running at http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        warn!("Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}
