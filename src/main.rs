use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ssm_dashboard::models::RuleSummary;
use ssm_dashboard::{Config, DashboardError, Models, RuleController, Scope};

/// Command line view of SSM rules and commands
#[derive(Parser, Debug)]
#[command(name = "ssm-dashboard", version, about, long_about = None)]
struct Cli {
    /// Path to config.json
    #[arg(short = 'c', long = "config", env = "SSM_DASHBOARD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print all rules
    Rules,
    /// Follow one rule until interrupted
    WatchRule { rule_id: i64 },
    /// Print the alerts of a rule
    Alerts { rule_id: i64 },
    /// Print the commands spawned by a rule
    #[command(name = "commands")]
    RuleCommands { rule_id: i64 },
    /// Start a rule
    Start { rule_id: i64 },
    /// Stop a rule
    Stop { rule_id: i64 },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        error!(error = %err, "ssm-dashboard failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), DashboardError> {
    let config = Config::load(cli.config.as_deref()).await;
    let models = Models::from_config(&config)?;

    match cli.command {
        Commands::Rules => print_json(&models.rules().await?.data()),
        Commands::Alerts { rule_id } => print_json(&models.rule_alerts(rule_id).await?.data()),
        Commands::RuleCommands { rule_id } => {
            print_json(&models.rule_commands(rule_id).await?.data())
        }
        Commands::WatchRule { rule_id } => watch_rule(&models, rule_id).await,
        Commands::Start { rule_id } => {
            let rule = find_rule(&models, rule_id).await?;
            models.start(&rule).await?;
            info!(rule_id, "Rule started");
            Ok(())
        }
        Commands::Stop { rule_id } => {
            let rule = find_rule(&models, rule_id).await?;
            models.terminate(&rule).await?;
            info!(rule_id, "Rule stopped");
            Ok(())
        }
    }
}

async fn watch_rule(models: &Models, rule_id: i64) -> Result<(), DashboardError> {
    let scope = Scope::new();
    let interrupt = scope.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, closing view");
            interrupt.destroy();
        }
    });

    let resolved = models
        .subscribe_with_retry(&scope, None, || RuleController::resolve(models, rule_id))
        .await;
    let Some(model) = resolved else {
        return Ok(());
    };

    let mut controller = RuleController::activate(model, &scope);
    print_json(&controller.rule())?;
    while controller.changed().await {
        print_json(&controller.rule())?;
    }
    Ok(())
}

async fn find_rule(models: &Models, rule_id: i64) -> Result<RuleSummary, DashboardError> {
    let rules = models.rules().await?.data();
    rules
        .get(&rule_id)
        .cloned()
        .ok_or_else(|| DashboardError::NotFound(format!("rule {rule_id}")))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), DashboardError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| DashboardError::Decode(err.into()))?;
    println!("{text}");
    Ok(())
}
