//! Question builder: template + selections -> question string

use crate::selection::SelectionState;
use crate::template::{Fragment, Template};

/// Concatenate literals and selected values in template order
///
/// Text is copied verbatim, without trimming or re-casing.
///
/// # Panics
///
/// Panics if `state` has no value for one of the template's slots. A state
/// created by [`SelectionState::init`] for the same template always has one,
/// so this only fires when states and templates are mixed up.
pub fn build(template: &Template, state: &SelectionState) -> String {
    let mut question = String::new();
    for fragment in template.fragments() {
        match fragment {
            Fragment::Literal { text } => question.push_str(text),
            Fragment::Slot(slot) => match state.get(slot.key()) {
                Some(value) => question.push_str(value),
                None => panic!(
                    "selection state has no value for slot `{}`; it belongs to another template",
                    slot.key()
                ),
            },
        }
    }
    question
}
