mod show;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use parabot_channel_telegram::TelegramChannel;

#[derive(Parser)]
#[command(name = "parabot", about = "Personal class schedule bot for Telegram")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Telegram bot
    Run,
    /// Print a schedule view: today, tomorrow, week or a date like 23.02
    Show {
        #[arg(default_value = "today", num_args = 0..)]
        what: Vec<String>,
    },
    /// Validate configuration and the schedule file
    Check,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            let config = parabot_config::load_bot_config()?;
            let catalog = parabot_config::load_catalog(&config.schedule.schedule_path)?;
            info!(
                schedule = %config.schedule.schedule_path.display(),
                zone = config.schedule.timezone.name(),
                "Configuration loaded"
            );
            let channel = Arc::new(TelegramChannel::new("telegram", &config.bot_token)?);

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(parabot_gateway::run_bot(config, catalog, channel))?;
        }
        Commands::Show { what } => {
            let settings = parabot_config::load_schedule_settings()?;
            let catalog = parabot_config::load_catalog(&settings.schedule_path)?;
            let what = what.join(" ");
            let text = show::render(&catalog, settings.now(), &what)
                .with_context(|| format!("Not a date: {what}"))?;
            println!("{text}");
        }
        Commands::Check => {
            let settings = parabot_config::load_schedule_settings()?;
            let catalog = parabot_config::load_catalog(&settings.schedule_path)?;
            println!("{}", show::summary(&settings, &catalog, settings.now()));
            match parabot_config::load_bot_config() {
                Ok(config) => println!("bot: ok (allowed user {})", config.allowed_user_id),
                Err(e) => println!("bot: {e}"),
            }
        }
    }

    Ok(())
}
