//! Terminal User Interface (TUI) for the ask page
//!
//! Renders each template as a card whose pills open option panels, a chat
//! bar holding the current question, and the latest answer. Mouse motion and
//! clicks drive the pills; the keyboard edits and submits the question.

pub mod app;
mod events;
pub mod layout;
pub mod pointer;
pub mod widgets;

use std::sync::Arc;

pub use app::{AppState, TuiApp};
pub use events::{Event, EventHandler};
pub use layout::{PageHit, PageLayout};
pub use pointer::PointerTracker;

use crate::answer::AnswerService;
use crate::page::AskPage;

/// Run the ask page in the terminal until the user quits
pub async fn run(page: AskPage, service: Arc<dyn AnswerService>) -> anyhow::Result<()> {
    let mut app = TuiApp::new(page, service)?;
    let outcome = app.run().await;
    let page = app.finish()?;
    page.close();
    outcome
}
