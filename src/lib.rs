//! question-pills: templated questions with selectable entity pills
//!
//! This library provides:
//! - Question templates: literal text interleaved with entity slots
//! - Immutable per-widget selection state and question building
//! - A disclosure controller for hover (inline) and click (popup) pills
//! - The template widget that ties them together and publishes questions
//! - An ask page that feeds the latest question to an answer service
//! - Terminal UI (TUI) for the ask page

pub mod answer;
pub mod config;
pub mod disclosure;
pub mod page;
pub mod question;
pub mod selection;
pub mod template;
pub mod tui;
pub mod widget;

pub use answer::{Answer, AnswerError, AnswerService, HttpAnswerClient};
pub use config::Config;
pub use disclosure::{DisclosureController, DisclosureState, PresentationMode, TriggerPolicy};
pub use page::{AnswerStatus, AskPage};
pub use selection::{SelectionError, SelectionState};
pub use template::{Template, TemplateDef, ValidationError};
pub use widget::{Gesture, TemplateWidget};
