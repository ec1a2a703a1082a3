//! Voice Buddy CLI
//!
//! Command-line front end for voice sessions and history.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::sync::Arc;

use ai_speech::CommandSynthesisEngine;
use anyhow::Context;
use application::{HistoryStore, SettingsStore, ports::KeyValueStorePort};
use clap::Parser;
use infrastructure::{AppConfig, AssistantAdapter, LogFormat, init_logging};
use presentation_cli::{
    Cli, Commands, HistoryAction, ask::ask_once, history, log_filter_from_verbosity,
    talk::TalkSession,
};
use tokio::io::{BufReader, stdin, stdout};

fn open_history(config: &AppConfig, storage: Arc<dyn KeyValueStorePort>) -> Arc<HistoryStore> {
    Arc::new(HistoryStore::open(
        storage,
        config.storage.history_key.clone(),
        config.storage.history_cap,
    ))
}

fn assistant(config: &AppConfig, url: Option<String>) -> anyhow::Result<AssistantAdapter> {
    let mut assistant = config.assistant.clone();
    if let Some(url) = url {
        assistant.base_url = url;
    }
    AssistantAdapter::new(&assistant).context("Failed to create assistant client")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config =
        AppConfig::load_from(cli.config.as_deref()).context("Failed to load configuration")?;

    // Set up logging based on verbosity
    let format = config
        .server
        .log_format
        .parse::<LogFormat>()
        .unwrap_or_default();
    init_logging(format, log_filter_from_verbosity(cli.verbose))?;

    let storage = config.storage.open_store()?;

    match cli.command {
        Commands::Talk { lang, url } => {
            let synthesis = CommandSynthesisEngine::new(&config.speech)
                .context("Invalid speech configuration")?;
            let settings = Arc::new(SettingsStore::open(
                Arc::clone(&storage),
                config.storage.settings_key.clone(),
            ));
            let session = TalkSession::spawn(
                Arc::new(assistant(&config, url)?),
                Arc::new(synthesis),
                &config.speech,
                open_history(&config, storage),
                settings,
                config.session_config(),
                lang,
            );
            session.run(BufReader::new(stdin()), stdout()).await?;
        },

        Commands::Ask { query, lang, url } => {
            let assistant = assistant(&config, url)?;
            let history = open_history(&config, storage);

            match ask_once(&assistant, &history, &query, lang).await {
                Ok(reply) => println!("🤖 {reply}"),
                Err(e) => {
                    eprintln!("❌ {}", e.kind().user_message(lang));
                    eprintln!("   {e}");
                    std::process::exit(1);
                },
            }
        },

        Commands::History { action } => {
            if matches!(action, HistoryAction::Clear { yes: false })
                && !history::confirm_clear(std::io::stdin().lock(), std::io::stdout())?
            {
                println!("Nothing cleared.");
                return Ok(());
            }
            let history = open_history(&config, storage);
            match history::run(&action, &history) {
                Ok(text) => println!("{text}"),
                Err(e) => {
                    eprintln!("❌ {e:#}");
                    std::process::exit(1);
                },
            }
        },
    }

    Ok(())
}
