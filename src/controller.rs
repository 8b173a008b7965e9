//! Single-owner event loop around [`DashboardState::reduce`].
//!
//! Every event goes through one queue and is applied to completion before the
//! next one. Host fullscreen requests run as spawned tasks and post their
//! outcome back into the same queue, so a late confirmation is ordered after
//! anything already enqueued. Spawned tasks only hold weak senders: once the
//! controller is gone their results are dropped.

use crate::data::Dataset;
use crate::fullscreen::FullscreenHost;
use crate::selection::SelectError;
use crate::state::{DashboardState, Effect, Event, Snapshot};
use crate::types::{Category, RecordId};
use crate::view::FullscreenRequest;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    Select(#[from] SelectError),
    #[error("dashboard controller has shut down")]
    Closed,
}

enum Command {
    Dispatch {
        event: Event,
        reply: Option<oneshot::Sender<Result<Snapshot, SelectError>>>,
    },
    Snapshot(oneshot::Sender<Snapshot>),
    Shutdown,
}

/// Handle to a running dashboard controller. Cheap to clone.
#[derive(Clone)]
pub struct Dashboard {
    tx: mpsc::UnboundedSender<Command>,
    dataset: Arc<Dataset>,
}

impl Dashboard {
    /// Start the controller on the current tokio runtime.
    pub fn spawn(dataset: Arc<Dataset>, initial: DashboardState, host: Arc<dyn FullscreenHost>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let weak = tx.downgrade();

        let forwarder = spawn_change_forwarder(host.as_ref(), weak.clone());
        let controller = Controller {
            rx,
            weak,
            dataset: dataset.clone(),
            state: initial,
            host,
        };
        tokio::spawn(controller.run(forwarder));

        info!(records = dataset.len(), "dashboard controller started");
        Self { tx, dataset }
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub async fn dispatch(&self, event: Event) -> Result<Snapshot, DashboardError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Dispatch {
                event,
                reply: Some(reply),
            })
            .map_err(|_| DashboardError::Closed)?;
        let result = rx.await.map_err(|_| DashboardError::Closed)?;
        Ok(result?)
    }

    pub async fn snapshot(&self) -> Result<Snapshot, DashboardError> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(Command::Snapshot(reply)).map_err(|_| DashboardError::Closed)?;
        rx.await.map_err(|_| DashboardError::Closed)
    }

    pub async fn set_filter(&self, category: Category) -> Result<Snapshot, DashboardError> {
        self.dispatch(Event::SetFilter(category)).await
    }

    pub async fn select(&self, id: RecordId) -> Result<Snapshot, DashboardError> {
        self.dispatch(Event::Select(id)).await
    }

    pub async fn deselect(&self) -> Result<Snapshot, DashboardError> {
        self.dispatch(Event::Deselect).await
    }

    pub async fn toggle_chart_kind(&self) -> Result<Snapshot, DashboardError> {
        self.dispatch(Event::ToggleChartKind).await
    }

    pub async fn toggle_tile_layer(&self) -> Result<Snapshot, DashboardError> {
        self.dispatch(Event::ToggleTileLayer).await
    }

    /// Issue a fullscreen request. The returned snapshot still carries the
    /// old `fullscreen` value; it changes once the host answers.
    pub async fn toggle_fullscreen(&self) -> Result<Snapshot, DashboardError> {
        self.dispatch(Event::ToggleFullscreen).await
    }

    pub async fn dismiss_notice(&self) -> Result<Snapshot, DashboardError> {
        self.dispatch(Event::DismissNotice).await
    }

    /// Stop the controller and wait for its queue to close.
    pub async fn shutdown(&self) {
        if self.tx.send(Command::Shutdown).is_ok() {
            self.tx.closed().await;
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

struct Controller {
    rx: mpsc::UnboundedReceiver<Command>,
    weak: mpsc::WeakUnboundedSender<Command>,
    dataset: Arc<Dataset>,
    state: DashboardState,
    host: Arc<dyn FullscreenHost>,
}

impl Controller {
    async fn run(mut self, forwarder: JoinHandle<()>) {
        while let Some(command) = self.rx.recv().await {
            match command {
                Command::Dispatch { event, reply } => {
                    let result = self.apply(event);
                    if let Some(reply) = reply {
                        let _ = reply.send(result);
                    }
                }
                Command::Snapshot(reply) => {
                    let _ = reply.send(self.state.snapshot(&self.dataset));
                }
                Command::Shutdown => break,
            }
        }

        forwarder.abort();
        info!("dashboard controller stopped");
    }

    fn apply(&mut self, event: Event) -> Result<Snapshot, SelectError> {
        debug!(?event, "applying event");
        if let Event::FullscreenResolved { ticket, outcome: Err(err) } = &event {
            warn!(request = ?ticket.request, %err, "fullscreen request failed");
        }

        let transition = self.state.reduce(&self.dataset, event).map_err(|err| {
            warn!(%err, "selection rejected");
            err
        })?;
        self.state = transition.state;
        for effect in transition.effects {
            self.run_effect(effect);
        }
        Ok(self.state.snapshot(&self.dataset))
    }

    fn run_effect(&self, effect: Effect) {
        match effect {
            Effect::RequestFullscreen(ticket) => {
                let host = self.host.clone();
                let weak = self.weak.clone();
                tokio::spawn(async move {
                    let outcome = match ticket.request {
                        FullscreenRequest::Enter => host.request_enter().await,
                        FullscreenRequest::Exit => host.request_exit().await,
                    };
                    post(&weak, Event::FullscreenResolved { ticket, outcome });
                });
            }
        }
    }
}

fn spawn_change_forwarder(host: &dyn FullscreenHost, weak: mpsc::WeakUnboundedSender<Command>) -> JoinHandle<()> {
    let mut changes = host.subscribe();
    tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(change) => {
                    debug!(active = change.active, "host fullscreen changed");
                    if !post(&weak, Event::HostFullscreenChanged { active: change.active }) {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "missed host fullscreen notifications");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Enqueue an event without waiting for it. Returns false once the
/// controller is gone.
fn post(weak: &mpsc::WeakUnboundedSender<Command>, event: Event) -> bool {
    let Some(tx) = weak.upgrade() else {
        debug!(?event, "controller gone, dropping event");
        return false;
    };
    tx.send(Command::Dispatch { event, reply: None }).is_ok()
}
