//! Terminal UI for the film-catalog service.

pub mod app;
pub mod dialog;
pub mod events;
pub mod notify;
pub mod views;
pub mod widgets;

use std::io;
use std::sync::Arc;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::gateway::CatalogApi;

/// Take over the terminal, run the app until quit, restore the terminal.
pub async fn run(api: Arc<dyn CatalogApi>) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut app = app::App::new(api);
    let result = app.run(&mut terminal).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result?;
    Ok(())
}
