use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::info;

use resume_chat::{Config, KnowledgeDocument, Orchestrator};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;

#[derive(Parser)]
#[command(name = "resume-chat")]
#[command(about = "Ask Gemini questions about a résumé from the terminal")]
struct Cli {
    /// Résumé text file embedded in every prompt
    #[arg(short, long, env = "RESUME_CHAT_RESUME")]
    resume: Option<PathBuf>,

    /// Gemini model identifier
    #[arg(short, long)]
    model: Option<String>,

    /// Config file (defaults to <config dir>/resume-chat/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = resume_chat::logging::init()?;

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    }
    .with_env();

    if let Some(model) = cli.model {
        config.model = Some(model);
    }
    if let Some(resume) = cli.resume {
        config.resume_path = Some(resume);
    }

    let resume_path = config
        .resume_path
        .clone()
        .ok_or_else(|| anyhow!("No résumé configured. Pass --resume <PATH> or set \"resume_path\" in the config file"))?;
    let knowledge = KnowledgeDocument::load(&resume_path)?;
    let client = config.gemini_client()?;

    info!(
        model = config.model(),
        resume = %resume_path.display(),
        log = %log_path.display(),
        "starting resume chat"
    );

    let orchestrator = Orchestrator::new(Arc::new(client), knowledge);
    let mut app = App::new(orchestrator, config.model().to_string());

    tui::install_panic_hook();
    let mut terminal = tui::init().context("Failed to initialise terminal")?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;

    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut events = tui::EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await,
            None => break,
        }
    }

    info!(messages = app.orchestrator.transcript().len(), "exiting");
    Ok(())
}
