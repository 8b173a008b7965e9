//! Dashboard state and its transition function.
//!
//! `DashboardState::reduce` takes the prior state and one event and returns
//! the next state plus any host effects to run. Derived data (the filtered
//! subset and its aggregates) is never stored; `snapshot` recomputes it.

use crate::aggregate::{aggregate, Aggregates};
use crate::data::Dataset;
use crate::filter::{compute_subset, FilterState};
use crate::fullscreen::HostError;
use crate::selection::{SelectError, Selection};
use crate::types::{Category, RecordId, RecordView};
use crate::view::{FullscreenTicket, ViewMode};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    SetFilter(Category),
    Select(RecordId),
    Deselect,
    ToggleChartKind,
    ToggleTileLayer,
    ToggleFullscreen,
    /// The host answered a request issued by `ToggleFullscreen`.
    FullscreenResolved {
        ticket: FullscreenTicket,
        outcome: Result<(), HostError>,
    },
    /// The host changed fullscreen on its own.
    HostFullscreenChanged { active: bool },
    DismissNotice,
}

/// Work the controller must perform against the host after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    RequestFullscreen(FullscreenTicket),
}

/// Non-fatal message for the user-facing layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
}

impl From<HostError> for Notice {
    fn from(err: HostError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub filter: FilterState,
    pub selection: Selection,
    pub view: ViewMode,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: DashboardState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(state: DashboardState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }
}

/// Read-only view of the dashboard handed to rendering collaborators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub filter: FilterState,
    pub filtered_subset: Vec<RecordView>,
    pub aggregates: Aggregates,
    pub selection: Selection,
    pub view_mode: ViewMode,
    pub notice: Option<Notice>,
}

impl Snapshot {
    pub fn selected(&self) -> Option<&RecordView> {
        let id = self.selection.id()?;
        self.filtered_subset.iter().find(|r| r.id == id)
    }
}

impl DashboardState {
    pub fn new(view: ViewMode) -> Self {
        Self {
            view,
            ..Self::default()
        }
    }

    /// Apply one event. An invalid selection leaves the state untouched and
    /// returns the error.
    pub fn reduce(&self, dataset: &Dataset, event: Event) -> Result<Transition, SelectError> {
        let mut next = self.clone();

        match event {
            Event::SetFilter(category) => {
                next.filter = self.filter.toggled(category);
                next.selection = self.selection.reconcile(dataset, &next.filter);
            }
            Event::Select(id) => {
                next.selection = self.selection.select(dataset, &self.filter, id)?;
            }
            Event::Deselect => {
                next.selection = self.selection.deselect();
            }
            Event::ToggleChartKind => {
                next.view = self.view.with_chart_toggled();
            }
            Event::ToggleTileLayer => {
                next.view = self.view.with_layer_toggled();
            }
            Event::ToggleFullscreen => {
                let Some(request) = self.view.next_fullscreen_request() else {
                    return Ok(Transition::to(next));
                };
                let ticket = next.view.issue(request);
                return Ok(Transition {
                    state: next,
                    effects: vec![Effect::RequestFullscreen(ticket)],
                });
            }
            Event::FullscreenResolved { ticket, outcome } => {
                if next.view.resolve(ticket, outcome.is_ok()) {
                    next.notice = outcome.err().map(Notice::from);
                }
            }
            Event::HostFullscreenChanged { active } => {
                next.view.host_changed(active);
            }
            Event::DismissNotice => {
                next.notice = None;
            }
        }

        Ok(Transition::to(next))
    }

    pub fn snapshot(&self, dataset: &Dataset) -> Snapshot {
        let subset = compute_subset(dataset, &self.filter);
        Snapshot {
            filter: self.filter.clone(),
            aggregates: aggregate(subset.iter().copied()),
            filtered_subset: subset.into_iter().map(RecordView::from).collect(),
            selection: self.selection,
            view_mode: self.view,
            notice: self.notice.clone(),
        }
    }
}
