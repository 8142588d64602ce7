pub mod api;
pub mod clients;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod models;
pub mod services;
pub mod state;

use std::sync::Arc;
use tokio::signal;

use anyhow::Context;
pub use config::Config;
use state::SharedState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        Some(handle)
    } else {
        None
    };

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let mut log_level = config.general.log_level.clone();
    if config.general.suppress_connection_errors {
        log_level.push_str(",reqwest::retry=off,hyper_util=off");
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let (layer, task) = tracing_loki::builder()
            .label("app", "vettr")?
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

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "daemon" | "-d" | "--daemon" => run_daemon(config, prometheus_handle).await,

        "check" | "c" => {
            if args.len() < 3 {
                println!("Usage: vettr check <idea text>");
                println!("Example: vettr check \"AI meal planner\"");
                return Ok(());
            }
            let idea = args[2..].join(" ");
            cmd_check(config, &idea).await
        }

        "popular" | "p" => {
            let limit = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(10);
            cmd_popular(&config, limit).await
        }

        "init" | "--init" => {
            Config::create_default_if_missing()?;
            println!("✓ Config file created. Edit config.toml and run again.");
            Ok(())
        }

        "help" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        _ => {
            println!("Unknown command: {}", args[1]);
            println!();
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!("Vettr - Startup Idea Validator");
    println!("Checks an idea against app stores, search, launches, repos and more");
    println!();
    println!("USAGE:");
    println!("  vettr <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("  check <idea>      Validate an idea and print the analysis");
    println!("  popular [n]       Show the most requested ideas (default: 10)");
    println!("  daemon            Run the HTTP API server");
    println!("  init              Create default config file");
    println!("  help              Show this help message");
    println!();
    println!("EXAMPLES:");
    println!("  vettr check \"AI meal planner\"      # One-off validation");
    println!("  vettr daemon                       # Start the API server");
    println!();
    println!("CONFIG:");
    println!("  Edit config.toml to configure API tokens, limits, etc.");
    println!("  Tokens also resolve from the environment:");
    println!("  ANTHROPIC_API_KEY, GITHUB_TOKEN, PRODUCT_HUNT_TOKEN, SERP_API_KEY, RAPID_API_KEY");
}

async fn cmd_check(config: Config, idea: &str) -> anyhow::Result<()> {
    if let Err(e) = api::validation::validate_idea_text(idea) {
        println!("{e}");
        return Ok(());
    }

    println!("Checking idea: {idea}");
    println!();

    let shared = SharedState::new(config).await?;
    let outcome = shared
        .check_service
        .run(idea, None, "cli")
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let result = &outcome.result;
    let analysis = &result.analysis;

    println!("Result{}", if result.cached { " (cached)" } else { "" });
    println!("{:-<60}", "");
    println!("Score:    {}/100", analysis.overall_score);
    println!("Verdict:  {}", analysis.verdict);
    println!("Confidence: {}/100", analysis.confidence_score);
    println!();

    if !analysis.top_competitors.is_empty() {
        println!("Top competitors:");
        for competitor in &analysis.top_competitors {
            println!("  • {} [{}]", competitor.name, competitor.source);
            if !competitor.description.is_empty() {
                println!("    {}", competitor.description);
            }
        }
        println!();
    }

    let available: Vec<&str> = result
        .sources
        .domains
        .iter()
        .filter(|d| d.available)
        .map(|d| d.domain.as_str())
        .collect();
    if available.is_empty() {
        println!("Domains:  no candidate domains free");
    } else {
        println!("Domains:  {}", available.join(", "));
    }

    println!(
        "Trends:   interest {}/100 ({:?})",
        result.sources.trends.interest, result.sources.trends.direction
    );
    println!();
    println!("{}", analysis.recommendation);

    Ok(())
}

async fn cmd_popular(config: &Config, limit: u64) -> anyhow::Result<()> {
    let store = db::Store::new(&config.general.database_path).await?;
    let ideas = store.popular_checks(limit).await?;

    if ideas.is_empty() {
        println!("No repeat-requested ideas yet.");
        return Ok(());
    }

    println!("Popular Ideas (top {})", ideas.len());
    println!("{:-<60}", "");

    for row in ideas {
        println!(
            "• {} [{} | {}/100 | requested {}x]",
            row.idea, row.verdict, row.overall_score, row.times_requested
        );
    }

    Ok(())
}

async fn run_daemon(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!(
        "Vettr v{} starting in daemon mode...",
        env!("CARGO_PKG_VERSION")
    );

    if !config.server.enabled {
        anyhow::bail!("Server is disabled in config; nothing to do");
    }

    let port = config.server.port;
    let shared = Arc::new(SharedState::new(config).await?);
    let app_state = api::create_app_state(shared, prometheus_handle);

    let app = api::router(app_state).await;
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let server_handle = tokio::spawn(async move {
        info!("🌐 API server running at http://0.0.0.0:{port}");
        if let Err(e) = axum::serve(listener, app).await {
            error!("Web server error: {}", e);
        }
    });

    info!("Daemon running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    server_handle.abort();
    info!("Daemon stopped");

    Ok(())
}
