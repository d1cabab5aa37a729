//! Ask page: several template widgets feeding one chat input
//!
//! Pure state, no rendering. Each widget's subscriber writes its question into
//! the shared chat input, so the input always holds the question of the widget
//! the user touched last (or of the last one mounted). The input is also
//! editable by hand before submitting.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::answer::{Answer, AnswerError, AnswerService};
use crate::disclosure::{PresentationMode, TriggerPolicy};
use crate::template::Template;
use crate::widget::TemplateWidget;

/// Where the page is in the submit cycle
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AnswerStatus {
    #[default]
    Idle,
    Loading,
    Answered(Answer),
    Failed(String),
}

/// Live chat input shared between the page and its widgets' subscribers
#[derive(Debug, Clone, Default)]
pub struct ChatInput(Rc<RefCell<String>>);

impl ChatInput {
    pub fn get(&self) -> String {
        self.0.borrow().clone()
    }

    pub fn set(&self, text: &str) {
        let mut input = self.0.borrow_mut();
        input.clear();
        input.push_str(text);
    }

    pub fn push(&self, c: char) {
        self.0.borrow_mut().push(c);
    }

    pub fn pop(&self) -> Option<char> {
        self.0.borrow_mut().pop()
    }

    /// Subscriber that overwrites the input with each delivered question
    pub fn subscriber(&self) -> impl FnMut(&str) + 'static {
        let input = self.clone();
        move |question: &str| input.set(question)
    }
}

/// Page state: widgets, chat input, answer status
#[derive(Debug)]
pub struct AskPage {
    widgets: Vec<TemplateWidget>,
    input: ChatInput,
    status: AnswerStatus,
    mode: PresentationMode,
}

impl AskPage {
    /// Mount one widget per template, in order
    pub fn new(templates: Vec<Template>, mode: PresentationMode, hover_grace: Duration) -> Self {
        let input = ChatInput::default();
        let policy: TriggerPolicy = mode.policy(hover_grace);
        let widgets = templates
            .into_iter()
            .map(|t| TemplateWidget::mount(Arc::new(t), policy, input.subscriber()))
            .collect();
        Self {
            widgets,
            input,
            status: AnswerStatus::Idle,
            mode,
        }
    }

    pub fn widgets(&self) -> &[TemplateWidget] {
        &self.widgets
    }

    pub fn widget_mut(&mut self, index: usize) -> Option<&mut TemplateWidget> {
        self.widgets.get_mut(index)
    }

    pub fn mode(&self) -> PresentationMode {
        self.mode
    }

    pub fn input(&self) -> &ChatInput {
        &self.input
    }

    pub fn chat_input(&self) -> String {
        self.input.get()
    }

    pub fn status(&self) -> &AnswerStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == AnswerStatus::Loading
    }

    /// Fire elapsed grace periods on every widget
    pub fn tick(&mut self, now: Instant) -> bool {
        self.widgets
            .iter_mut()
            .fold(false, |changed, w| w.tick(now) | changed)
    }

    /// Start a submission
    ///
    /// Returns the question to send, or `None` when the input is blank or a
    /// request is already in flight. Clears the previous answer or error.
    pub fn begin_submit(&mut self) -> Option<String> {
        if self.is_loading() {
            return None;
        }
        let question = self.input.get();
        if question.trim().is_empty() {
            return None;
        }
        self.status = AnswerStatus::Loading;
        Some(question)
    }

    /// Record the outcome of a submission
    ///
    /// Neither outcome touches the chat input or any selection.
    pub fn finish_submit(&mut self, result: Result<Answer, AnswerError>) {
        self.status = match result {
            Ok(answer) => AnswerStatus::Answered(answer),
            Err(e) => {
                tracing::warn!(error = %e, "answer request failed");
                AnswerStatus::Failed(e.to_string())
            }
        };
    }

    /// Submit the chat input through `service` and record the result
    pub async fn submit_with(&mut self, service: &dyn AnswerService) -> bool {
        let Some(question) = self.begin_submit() else {
            return false;
        };
        let result = service.submit(&question).await;
        self.finish_submit(result);
        true
    }

    /// Unmount every widget
    pub fn close(self) {
        for widget in self.widgets {
            widget.unmount();
        }
    }
}
