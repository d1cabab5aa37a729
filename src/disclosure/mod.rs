//! Disclosure controller: which slot's option list is visible
//!
//! One state machine serves both pill styles. The [`TriggerPolicy`] decides
//! which gestures move it:
//!
//! - `HoverIntent` (inline pills): pointer entry opens immediately, pointer
//!   exit closes only after a grace period during which the pointer stayed
//!   off both the pill and its option panel.
//! - `ExplicitToggle` (popup pills): clicking a pill toggles it or switches
//!   to it, any press outside the open pill and panel closes.
//!
//! The controller never reads a clock or schedules anything itself. Callers
//! pass `now` to the gestures that start a grace period and call
//! [`DisclosureController::poll`] to let elapsed deadlines fire, which keeps
//! it independent of any renderer or runtime.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// Delay between the pointer leaving a hover pill and its panel closing
pub const DEFAULT_HOVER_GRACE: Duration = Duration::from_millis(140);

// ============================================================================
// Policy
// ============================================================================

/// How a widget presents its slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentationMode {
    /// Inline pills revealed on hover
    #[default]
    Inline,
    /// Popup pills toggled on click
    Popup,
}

impl PresentationMode {
    /// Trigger policy used by this mode
    pub fn policy(self, hover_grace: Duration) -> TriggerPolicy {
        match self {
            PresentationMode::Inline => TriggerPolicy::HoverIntent { grace: hover_grace },
            PresentationMode::Popup => TriggerPolicy::ExplicitToggle,
        }
    }
}

impl fmt::Display for PresentationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresentationMode::Inline => write!(f, "inline"),
            PresentationMode::Popup => write!(f, "popup"),
        }
    }
}

impl FromStr for PresentationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inline" | "hover" => Ok(PresentationMode::Inline),
            "popup" | "click" => Ok(PresentationMode::Popup),
            other => Err(format!(
                "unknown presentation mode `{}` (expected inline or popup)",
                other
            )),
        }
    }
}

/// Gestures that drive the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerPolicy {
    HoverIntent { grace: Duration },
    ExplicitToggle,
}

impl TriggerPolicy {
    /// Hover policy with the default grace period
    pub fn hover() -> Self {
        TriggerPolicy::HoverIntent {
            grace: DEFAULT_HOVER_GRACE,
        }
    }
}

// ============================================================================
// Hit targets and state
// ============================================================================

/// Part of a slot the pointer can be over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// The pill showing the current value
    Pill,
    /// The option panel under an open pill
    Panel,
}

/// Result of a hit-test: which slot region lies under the pointer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hit {
    pub key: String,
    pub region: Region,
}

impl Hit {
    pub fn pill(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            region: Region::Pill,
        }
    }

    pub fn panel(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            region: Region::Panel,
        }
    }
}

/// Which slot, if any, has its option list visible
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DisclosureState {
    #[default]
    Closed,
    Open(String),
}

// ============================================================================
// Controller
// ============================================================================

/// Disclosure state machine for one template instance
#[derive(Debug, Clone)]
pub struct DisclosureController {
    policy: TriggerPolicy,
    state: DisclosureState,
    /// Region currently under the pointer (hover policy only)
    pointer: Option<Hit>,
    /// Pending close deadline per slot key, at most one each
    pending: HashMap<String, Instant>,
}

impl DisclosureController {
    pub fn new(policy: TriggerPolicy) -> Self {
        Self {
            policy,
            state: DisclosureState::Closed,
            pointer: None,
            pending: HashMap::new(),
        }
    }

    pub fn policy(&self) -> TriggerPolicy {
        self.policy
    }

    pub fn state(&self) -> &DisclosureState {
        &self.state
    }

    /// Key of the open slot
    pub fn open_key(&self) -> Option<&str> {
        match &self.state {
            DisclosureState::Open(key) => Some(key),
            DisclosureState::Closed => None,
        }
    }

    pub fn is_open(&self, key: &str) -> bool {
        self.open_key() == Some(key)
    }

    /// Whether a close is scheduled for `key`
    pub fn has_pending(&self, key: &str) -> bool {
        self.pending.contains_key(key)
    }

    /// Earliest scheduled close, for callers that want to sleep until it
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    /// Pointer moved onto a pill or panel
    ///
    /// Returns true when the visible state changed.
    pub fn pointer_enter(&mut self, hit: Hit) -> bool {
        if !matches!(self.policy, TriggerPolicy::HoverIntent { .. }) {
            return false;
        }
        // A panel only exists while its slot is open; anything else is stale.
        if hit.region == Region::Panel && !self.is_open(&hit.key) {
            return false;
        }

        self.pending.remove(&hit.key);
        let key = hit.key.clone();
        self.pointer = Some(hit);
        self.transition(DisclosureState::Open(key))
    }

    /// Pointer moved off a pill or panel
    ///
    /// Never changes the state by itself; it schedules a close for the slot,
    /// replacing any close already pending for it.
    pub fn pointer_leave(&mut self, hit: &Hit, now: Instant) -> bool {
        let TriggerPolicy::HoverIntent { grace } = self.policy else {
            return false;
        };
        if self.pointer.as_ref() == Some(hit) {
            self.pointer = None;
        }
        self.pending.insert(hit.key.clone(), now + grace);
        tracing::trace!(key = %hit.key, region = ?hit.region, "grace period started");
        false
    }

    /// Pointer press; `target` is what the hit-test found under it
    ///
    /// Returns true when the visible state changed.
    pub fn press(&mut self, target: Option<&Hit>) -> bool {
        if self.policy != TriggerPolicy::ExplicitToggle {
            return false;
        }
        match target {
            Some(Hit {
                key,
                region: Region::Pill,
            }) => {
                if self.is_open(key) {
                    self.transition(DisclosureState::Closed)
                } else {
                    // Switching goes straight from one open slot to the other.
                    self.transition(DisclosureState::Open(key.clone()))
                }
            }
            Some(Hit {
                key,
                region: Region::Panel,
            }) if self.is_open(key) => false,
            _ => self.transition(DisclosureState::Closed),
        }
    }

    /// An option of `key` was chosen: close it without any grace period
    pub fn select(&mut self, key: &str) -> bool {
        self.pending.remove(key);
        if self.pointer.as_ref() == Some(&Hit::panel(key)) {
            self.pointer = None;
        }
        if self.is_open(key) {
            self.transition(DisclosureState::Closed)
        } else {
            false
        }
    }

    /// Fire every grace period that elapsed at `now`
    ///
    /// A slot closes only if it is still the open one and the pointer is over
    /// neither its pill nor its panel. Returns true when the state changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let due: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();

        let mut changed = false;
        for key in due {
            self.pending.remove(&key);
            let hovered = self.pointer.as_ref().is_some_and(|hit| hit.key == key);
            if !hovered && self.is_open(&key) {
                changed |= self.transition(DisclosureState::Closed);
            }
        }
        changed
    }

    /// Drop every pending close; used on unmount
    pub fn cancel_pending(&mut self) {
        if !self.pending.is_empty() {
            tracing::debug!(count = self.pending.len(), "cancelled pending closes");
        }
        self.pending.clear();
    }

    fn transition(&mut self, next: DisclosureState) -> bool {
        if self.state == next {
            return false;
        }
        tracing::debug!(from = ?self.state, to = ?next, "disclosure transition");
        self.state = next;
        true
    }
}
