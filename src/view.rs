use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Records per category.
    #[default]
    Distribution,
    /// Records per condition.
    Condition,
}

impl ChartKind {
    pub fn toggled(self) -> Self {
        match self {
            ChartKind::Distribution => ChartKind::Condition,
            ChartKind::Condition => ChartKind::Distribution,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileLayer {
    #[default]
    Street,
    Satellite,
}

impl TileLayer {
    pub fn toggled(self) -> Self {
        match self {
            TileLayer::Street => TileLayer::Satellite,
            TileLayer::Satellite => TileLayer::Street,
        }
    }
}

/// Direction of an in-flight fullscreen request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FullscreenRequest {
    Enter,
    Exit,
}

impl FullscreenRequest {
    /// Value `fullscreen` takes once the host accepts this request.
    pub fn target(self) -> bool {
        matches!(self, FullscreenRequest::Enter)
    }
}

/// An issued fullscreen request. Only the answer carrying the ticket that is
/// still pending may change `fullscreen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FullscreenTicket {
    pub request: FullscreenRequest,
    pub id: u64,
}

/// The three independent display-mode axes.
///
/// `fullscreen` only ever changes on a host confirmation or host
/// notification; `pending` records a request the host has not answered yet.
/// A host notification supersedes any pending request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ViewMode {
    pub chart_kind: ChartKind,
    pub tile_layer: TileLayer,
    pub fullscreen: bool,
    pub pending: Option<FullscreenTicket>,
    #[serde(skip)]
    next_ticket: u64,
}

impl ViewMode {
    pub fn new(chart_kind: ChartKind, tile_layer: TileLayer) -> Self {
        Self {
            chart_kind,
            tile_layer,
            ..Self::default()
        }
    }

    pub fn with_chart_toggled(self) -> Self {
        Self {
            chart_kind: self.chart_kind.toggled(),
            ..self
        }
    }

    pub fn with_layer_toggled(self) -> Self {
        Self {
            tile_layer: self.tile_layer.toggled(),
            ..self
        }
    }

    /// Request to issue for a fullscreen toggle, if one may be issued now.
    pub fn next_fullscreen_request(&self) -> Option<FullscreenRequest> {
        if self.pending.is_some() {
            return None;
        }
        Some(if self.fullscreen {
            FullscreenRequest::Exit
        } else {
            FullscreenRequest::Enter
        })
    }

    /// Mark `request` as in flight and return its ticket.
    pub fn issue(&mut self, request: FullscreenRequest) -> FullscreenTicket {
        let ticket = FullscreenTicket {
            request,
            id: self.next_ticket,
        };
        self.next_ticket += 1;
        self.pending = Some(ticket);
        ticket
    }

    /// Apply the host's answer to `ticket`. Answers to superseded tickets
    /// are dropped and leave `fullscreen` as the host last reported it.
    pub fn resolve(&mut self, ticket: FullscreenTicket, accepted: bool) -> bool {
        if self.pending != Some(ticket) {
            return false;
        }
        self.pending = None;
        if accepted {
            self.fullscreen = ticket.request.target();
        }
        true
    }

    /// The host changed fullscreen on its own.
    pub fn host_changed(&mut self, active: bool) {
        self.fullscreen = active;
        self.pending = None;
    }
}
