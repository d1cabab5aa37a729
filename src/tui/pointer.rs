//! Mouse to gesture translation
//!
//! Terminals only report positions, so enter/leave is derived by comparing
//! what the layout finds under the pointer with what it found last time.
//! Presses go to every widget: the one under the pointer sees its hit, all
//! others see `None` and treat the press as outside.

use std::time::Instant;

use crate::disclosure::Hit;
use crate::page::AskPage;
use crate::widget::Gesture;

use super::layout::{PageHit, PageLayout};

/// Remembers which region the pointer is over between mouse events
#[derive(Debug, Default, Clone)]
pub struct PointerTracker {
    hovered: Option<(usize, Hit)>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Region currently under the pointer
    pub fn hovered(&self) -> Option<&(usize, Hit)> {
        self.hovered.as_ref()
    }

    /// Pointer moved to `(column, row)`; returns true if a redraw is needed
    pub fn moved(
        &mut self,
        page: &mut AskPage,
        layout: &PageLayout,
        column: u16,
        row: u16,
        now: Instant,
    ) -> bool {
        let current = layout
            .hit_test(column, row)
            .map(|PageHit { widget, hit, .. }| (widget, hit));
        if current == self.hovered {
            return false;
        }

        let mut changed = false;
        if let Some((widget, hit)) = self.hovered.take() {
            changed |= dispatch(page, widget, Gesture::PointerLeave(hit), now);
        }
        if let Some((widget, hit)) = current.clone() {
            changed |= dispatch(page, widget, Gesture::PointerEnter(hit), now);
        }
        self.hovered = current;
        changed
    }

    /// Left button pressed at `(column, row)`
    pub fn pressed(
        &mut self,
        page: &mut AskPage,
        layout: &PageLayout,
        column: u16,
        row: u16,
        now: Instant,
    ) -> bool {
        let target = layout.hit_test(column, row);
        let mut changed = false;

        for index in 0..page.widgets().len() {
            let hit = target
                .as_ref()
                .filter(|t| t.widget == index)
                .map(|t| t.hit.clone());
            changed |= dispatch(page, index, Gesture::Press(hit), now);
        }

        if let Some(PageHit {
            widget,
            hit,
            option: Some(value),
        }) = target
        {
            changed |= dispatch(
                page,
                widget,
                Gesture::Choose {
                    key: hit.key,
                    value,
                },
                now,
            );
        }
        changed
    }
}

fn dispatch(page: &mut AskPage, index: usize, gesture: Gesture, now: Instant) -> bool {
    let Some(widget) = page.widget_mut(index) else {
        return false;
    };
    match widget.handle(gesture, now) {
        Ok(changed) => changed,
        Err(e) => {
            // Options come from the template itself, so this means the layout is stale.
            tracing::warn!(error = %e, "gesture rejected");
            false
        }
    }
}
