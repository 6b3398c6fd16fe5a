//! Fragment-driven view state machine.
//!
//! The fragment is the single entry point for floor and panel changes: user
//! actions write a fragment, and [`ViewStateSync::check`] turns fragments into
//! effects for the controller to apply, in order.

use crate::floor::Floor;
use crate::fragment::ViewFragment;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelChange {
    Open(String),
    Close,
}

/// Effects produced by one evaluation. Apply `floor` before `panel`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    pub floor: Option<Floor>,
    pub panel: Option<PanelChange>,
}

impl Transition {
    pub fn is_empty(&self) -> bool {
        self.floor.is_none() && self.panel.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewStateSync {
    last_hash: Option<String>,
    floor: Option<Floor>,
    open_panel: Option<String>,
}

impl ViewStateSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn floor(&self) -> Option<Floor> {
        self.floor
    }

    #[cfg(test)]
    pub fn open_panel(&self) -> Option<&str> {
        self.open_panel.as_deref()
    }

    /// Fragment describing the current state.
    pub fn fragment(&self) -> Option<ViewFragment> {
        Some(ViewFragment {
            floor: self.floor?,
            content_id: self.open_panel.clone(),
        })
    }

    /// Evaluate `hash`. Nothing happens when it equals the last seen hash
    /// unless `force` is set. `resolvable` says whether a content id can be
    /// shown on the given floor.
    pub fn check(
        &mut self,
        hash: &str,
        force: bool,
        resolvable: impl Fn(Floor, &str) -> bool,
    ) -> Transition {
        if !force && self.last_hash.as_deref() == Some(hash) {
            return Transition::default();
        }
        self.last_hash = Some(hash.to_string());

        let Some(parsed) = ViewFragment::parse(hash) else {
            return Transition::default();
        };

        let mut transition = Transition::default();
        if force || self.floor != Some(parsed.floor) {
            self.floor = Some(parsed.floor);
            self.open_panel = None;
            transition.floor = Some(parsed.floor);
        }

        match parsed.content_id {
            Some(id) if resolvable(parsed.floor, &id) => {
                self.open_panel = Some(id.clone());
                transition.panel = Some(PanelChange::Open(id));
            }
            _ => {
                self.open_panel = None;
                transition.panel = Some(PanelChange::Close);
            }
        }
        transition
    }

    /// Switch floors outside the fragment path (host-driven navigation).
    pub fn set_floor(&mut self, floor: Floor, force: bool) -> Option<Floor> {
        if !force && self.floor == Some(floor) {
            return None;
        }
        self.floor = Some(floor);
        self.open_panel = None;
        Some(floor)
    }

    pub fn close_panel(&mut self) {
        self.open_panel = None;
    }
}
