//! Status events and the port they are published through.
//!
//! The election writes one [`ElectionEvent`] per successful mutation, in the
//! same order the mutations were applied. Delivery is best-effort: a failing
//! [`NotificationPort`] is logged and never undoes the state change.

use ballot_types::{Principal, ProposalIndex, WorkflowPhase};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

/// Events emitted after each successful mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ElectionEvent {
    /// The administrator admitted a voter.
    VoterRegistered { voter: Principal },
    /// The workflow advanced one phase.
    WorkflowStatusChange {
        previous: WorkflowPhase,
        next: WorkflowPhase,
    },
    /// A proposal was appended at `index`.
    ProposalRegistered { index: ProposalIndex },
    /// `voter` cast their vote for `index`.
    Voted {
        voter: Principal,
        index: ProposalIndex,
    },
    /// The tally found several proposals sharing the maximum count.
    TieDetected { indices: Vec<ProposalIndex> },
}

impl ElectionEvent {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::VoterRegistered { .. } => "voter_registered",
            Self::WorkflowStatusChange { .. } => "workflow_status_change",
            Self::ProposalRegistered { .. } => "proposal_registered",
            Self::Voted { .. } => "voted",
            Self::TieDetected { .. } => "tie_detected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    #[error("no subscribers are listening")]
    NoSubscribers,

    #[error("notification rejected: {0}")]
    Rejected(String),
}

/// Where election events are delivered.
///
/// Called while the election's write lock is held, so implementations must not
/// call back into the election and should return quickly.
pub trait NotificationPort: Send + Sync {
    fn publish(&self, event: &ElectionEvent) -> Result<(), NotifyError>;
}

/// Synchronous fan-out event bus.
///
/// Listeners are invoked inline on the publishing thread, in subscription order.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&ElectionEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&ElectionEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationPort for EventBus {
    fn publish(&self, event: &ElectionEvent) -> Result<(), NotifyError> {
        for listener in &self.listeners {
            listener(event);
        }
        Ok(())
    }
}

/// Publishes events on a `tokio` broadcast channel for async subscribers.
///
/// Sending never blocks. A slow receiver that falls more than `capacity`
/// events behind observes `RecvError::Lagged` on its side.
pub struct BroadcastNotifier {
    sender: broadcast::Sender<ElectionEvent>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Open a new subscription. Only events published after this call are seen.
    pub fn subscribe(&self) -> broadcast::Receiver<ElectionEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl NotificationPort for BroadcastNotifier {
    fn publish(&self, event: &ElectionEvent) -> Result<(), NotifyError> {
        self.sender
            .send(event.clone())
            .map(|_| ())
            .map_err(|_| NotifyError::NoSubscribers)
    }
}
