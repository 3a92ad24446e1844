use anyhow::{Context, Result};

use worker_console::tui::{self, EventHandler};
use worker_console::{handler, logging, transport, ui, App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    logging::init(&config.log_path)?;
    tracing::info!(
        base_url = %config.base_url,
        binding = config.transport.as_str(),
        log = %config.log_path.display(),
        "worker-console starting"
    );

    let transport = transport::connect(&config).context("building worker transport")?;
    let mut app = App::new(transport, config.base_url.clone());

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = run(&mut terminal, &mut app).await;

    tui::restore()?;
    if let Err(e) = &result {
        tracing::error!(error = %e, "worker-console exited with error");
    } else {
        tracing::info!(messages = app.conversation.messages().len(), "worker-console exiting");
    }
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();
    app.start_status_fetch();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }

    Ok(())
}
