use anyhow::Context;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::env;
use topicscout::client::AnalysisSession;
use topicscout::config::AppConfig;
use topicscout::orchestrator::AnalysisSettings;
use topicscout::server;

/// TopicScout - keyword-to-newsletter analysis service
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the analysis HTTP API
    Serve {
        /// Override the configured bind address
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Analyze a keyword against a running server and print the draft
    Analyze {
        /// Topic keyword to analyze
        keyword: String,
        /// Base URL of a running topicscout server
        #[arg(short, long, default_value = "http://localhost:3000")]
        server: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse the specified (or default) .env file
    let dotenv_path = env::var("TOPICSCOUT_DOTENV_PATH").unwrap_or_else(|_| ".env".to_string());
    let dotenv_result = dotenvy::from_path(&dotenv_path);

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    match dotenv_result {
        Ok(()) => log::info!("Loaded env from {}", dotenv_path),
        Err(err) => log::debug!("No .env loaded from {}: {}", dotenv_path, err),
    }

    let args = Args::parse();
    match args.command {
        Command::Serve { bind } => {
            let mut config = AppConfig::from_env().context("Reading configuration")?;
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            server::serve(config).await
        }
        Command::Analyze { keyword, server } => {
            let mut session = AnalysisSession::new(&server)?;
            session
                .start_analysis(&keyword, AnalysisSettings::default())
                .await;

            let state = session.state();
            if let Some(error) = &state.error {
                anyhow::bail!("{}", error);
            }
            if let Some(draft) = &state.newsletter_draft {
                println!("{}", draft);
            }
            Ok(())
        }
    }
}
