//! Template widget: one mounted template instance
//!
//! Owns the validated template, its selection state and its disclosure
//! controller. Renderers feed it [`Gesture`]s and draw from [`TemplateWidget::view`];
//! the integrator receives the question string through a subscriber callback.
//!
//! The subscriber is called from exactly one place, [`TemplateWidget::publish`]:
//! once at mount and once after every accepted selection change.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::disclosure::{DisclosureController, DisclosureState, Hit, TriggerPolicy};
use crate::selection::{SelectionError, SelectionState};
use crate::template::{Fragment, Template, TemplateDef, ValidationError};

/// Receives the question string after every change
pub type Subscriber = Box<dyn FnMut(&str)>;

/// Raw user input, already resolved against the renderer's hit regions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gesture {
    /// Pointer moved onto a pill or panel
    PointerEnter(Hit),
    /// Pointer moved off a pill or panel
    PointerLeave(Hit),
    /// Pointer pressed; `None` when nothing of this widget was under it
    Press(Option<Hit>),
    /// An option was picked from a slot's panel
    Choose { key: String, value: String },
}

/// Render model for one slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotView<'a> {
    pub key: &'a str,
    pub value: &'a str,
    pub options: &'a [String],
    pub open: bool,
}

/// Render model for one fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentView<'a> {
    Literal(&'a str),
    Slot(SlotView<'a>),
}

/// A mounted template instance
pub struct TemplateWidget {
    template: Arc<Template>,
    selection: SelectionState,
    disclosure: DisclosureController,
    subscriber: Subscriber,
}

impl fmt::Debug for TemplateWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateWidget")
            .field("template", &self.template.label())
            .field("selection", &self.selection)
            .field("disclosure", self.disclosure.state())
            .finish_non_exhaustive()
    }
}

impl TemplateWidget {
    /// Mount a validated template and deliver its initial question
    pub fn mount(
        template: Arc<Template>,
        policy: TriggerPolicy,
        subscriber: impl FnMut(&str) + 'static,
    ) -> Self {
        let mut widget = Self {
            selection: SelectionState::init(template.clone()),
            template,
            disclosure: DisclosureController::new(policy),
            subscriber: Box::new(subscriber),
        };
        tracing::debug!(template = %widget.template.label(), ?policy, "mounted widget");
        widget.publish();
        widget
    }

    /// Validate a definition and mount it
    ///
    /// An invalid definition never produces a widget and the subscriber is
    /// never called.
    pub fn from_def(
        def: TemplateDef,
        policy: TriggerPolicy,
        subscriber: impl FnMut(&str) + 'static,
    ) -> Result<Self, ValidationError> {
        let template = def.validate()?;
        Ok(Self::mount(Arc::new(template), policy, subscriber))
    }

    pub fn template(&self) -> &Arc<Template> {
        &self.template
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn disclosure(&self) -> &DisclosureState {
        self.disclosure.state()
    }

    pub fn policy(&self) -> TriggerPolicy {
        self.disclosure.policy()
    }

    /// The current question string
    pub fn question(&self) -> String {
        self.selection.question()
    }

    /// Earliest pending close, if any
    pub fn next_deadline(&self) -> Option<Instant> {
        self.disclosure.next_deadline()
    }

    /// Apply a gesture
    ///
    /// Returns true when anything visible changed. A rejected
    /// [`Gesture::Choose`] leaves selection and disclosure untouched.
    pub fn handle(&mut self, gesture: Gesture, now: Instant) -> Result<bool, SelectionError> {
        let changed = match gesture {
            Gesture::PointerEnter(hit) => self.disclosure.pointer_enter(hit),
            Gesture::PointerLeave(hit) => self.disclosure.pointer_leave(&hit, now),
            Gesture::Press(target) => self.disclosure.press(target.as_ref()),
            Gesture::Choose { key, value } => {
                self.choose(&key, &value)?;
                true
            }
        };
        Ok(changed)
    }

    /// Set a slot's value, close its panel and notify the subscriber
    pub fn choose(&mut self, key: &str, value: &str) -> Result<(), SelectionError> {
        self.selection = self.selection.set(key, value)?;
        tracing::info!(key, value, "selection changed");
        self.disclosure.select(key);
        self.publish();
        Ok(())
    }

    /// Let elapsed grace periods fire
    pub fn tick(&mut self, now: Instant) -> bool {
        self.disclosure.poll(now)
    }

    /// Fragments in order, ready to draw
    pub fn view(&self) -> Vec<FragmentView<'_>> {
        self.template
            .fragments()
            .iter()
            .map(|fragment| match fragment {
                Fragment::Literal { text } => FragmentView::Literal(text.as_str()),
                Fragment::Slot(slot) => FragmentView::Slot(SlotView {
                    key: slot.key(),
                    value: self
                        .selection
                        .get(slot.key())
                        .unwrap_or_else(|| slot.default_value()),
                    options: slot.options(),
                    open: self.disclosure.is_open(slot.key()),
                }),
            })
            .collect()
    }

    /// Tear the instance down, cancelling any pending close
    pub fn unmount(mut self) {
        self.disclosure.cancel_pending();
        tracing::debug!(template = %self.template.label(), "unmounted widget");
    }

    fn publish(&mut self) {
        let question = self.selection.question();
        (self.subscriber)(&question);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    fn metric_def() -> TemplateDef {
        TemplateDef::new()
            .text("What are the top ")
            .slot_with_default("metric", ["Net Revenue", "Volume"], "Net Revenue")
            .text(" drivers?")
    }

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl FnMut(&str) + 'static) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        (log, move |q: &str| sink.borrow_mut().push(q.to_string()))
    }

    #[test]
    fn test_mount_delivers_initial_question() {
        let (log, sub) = recorder();
        let widget = TemplateWidget::from_def(metric_def(), TriggerPolicy::hover(), sub).unwrap();
        assert_eq!(*log.borrow(), vec!["What are the top Net Revenue drivers?"]);
        assert_eq!(widget.question(), "What are the top Net Revenue drivers?");
    }

    #[test]
    fn test_invalid_definition_never_mounts() {
        let (log, sub) = recorder();
        let def = TemplateDef::new().slot_with_default("metric", ["A"], "B");
        let err = TemplateWidget::from_def(def, TriggerPolicy::hover(), sub).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidDefault { .. }));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_choose_notifies_and_closes() {
        let (log, sub) = recorder();
        let mut widget =
            TemplateWidget::from_def(metric_def(), TriggerPolicy::ExplicitToggle, sub).unwrap();
        let now = Instant::now();

        widget
            .handle(Gesture::Press(Some(Hit::pill("metric"))), now)
            .unwrap();
        assert_eq!(
            widget.disclosure(),
            &DisclosureState::Open("metric".to_string())
        );

        widget
            .handle(
                Gesture::Choose {
                    key: "metric".to_string(),
                    value: "Volume".to_string(),
                },
                now,
            )
            .unwrap();
        assert_eq!(widget.disclosure(), &DisclosureState::Closed);
        assert_eq!(
            log.borrow().last().map(String::as_str),
            Some("What are the top Volume drivers?")
        );
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_rejected_choice_keeps_state_and_stays_silent() {
        let (log, sub) = recorder();
        let mut widget =
            TemplateWidget::from_def(metric_def(), TriggerPolicy::ExplicitToggle, sub).unwrap();
        let now = Instant::now();
        widget
            .handle(Gesture::Press(Some(Hit::pill("metric"))), now)
            .unwrap();

        let err = widget
            .handle(
                Gesture::Choose {
                    key: "metric".to_string(),
                    value: "Margin".to_string(),
                },
                now,
            )
            .unwrap_err();
        assert!(matches!(err, SelectionError::InvalidOption { .. }));
        assert_eq!(widget.selection().get("metric"), Some("Net Revenue"));
        assert_eq!(
            widget.disclosure(),
            &DisclosureState::Open("metric".to_string())
        );
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_hover_gestures_and_tick() {
        let (_log, sub) = recorder();
        let mut widget = TemplateWidget::from_def(metric_def(), TriggerPolicy::hover(), sub).unwrap();
        let t0 = Instant::now();

        assert!(widget
            .handle(Gesture::PointerEnter(Hit::pill("metric")), t0)
            .unwrap());
        widget
            .handle(Gesture::PointerLeave(Hit::pill("metric")), t0)
            .unwrap();
        assert_eq!(widget.next_deadline(), Some(t0 + Duration::from_millis(140)));
        assert!(widget.tick(t0 + Duration::from_millis(140)));
        assert_eq!(widget.disclosure(), &DisclosureState::Closed);
    }

    #[test]
    fn test_view_reflects_selection_and_open_slot() {
        let (_log, sub) = recorder();
        let mut widget =
            TemplateWidget::from_def(metric_def(), TriggerPolicy::ExplicitToggle, sub).unwrap();
        widget.choose("metric", "Volume").unwrap();
        widget
            .handle(Gesture::Press(Some(Hit::pill("metric"))), Instant::now())
            .unwrap();

        let view = widget.view();
        assert_eq!(view[0], FragmentView::Literal("What are the top "));
        match &view[1] {
            FragmentView::Slot(slot) => {
                assert_eq!(slot.value, "Volume");
                assert!(slot.open);
                assert_eq!(slot.options.len(), 2);
            }
            other => panic!("expected slot, got {:?}", other),
        }
    }

    #[test]
    fn test_unmount_cancels_pending_close() {
        let (_log, sub) = recorder();
        let mut widget = TemplateWidget::from_def(metric_def(), TriggerPolicy::hover(), sub).unwrap();
        let t0 = Instant::now();
        widget
            .handle(Gesture::PointerEnter(Hit::pill("metric")), t0)
            .unwrap();
        widget
            .handle(Gesture::PointerLeave(Hit::pill("metric")), t0)
            .unwrap();
        assert!(widget.next_deadline().is_some());
        widget.unmount();
    }
}
