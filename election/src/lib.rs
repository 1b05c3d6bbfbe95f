//! Administration of a single election.
//!
//! Lifecycle: RegisteringVoters → ProposalsRegistrationStarted → ProposalsRegistrationEnded
//! → VotingSessionStarted → VotingSessionEnded → VotesTallied.
//!
//! The administrator admits voters and drives every phase transition. Registered voters
//! submit proposals and cast one vote each. The tally picks the proposal with the most
//! votes, or reports a tie when several share the maximum.
//!
//! Who the caller is comes from an [`AccessControl`] capability; status events go out
//! through a [`NotificationPort`]. Both are supplied by the embedding application.

pub mod access;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod proposals;
pub mod tally;
pub mod voters;
pub mod workflow;

pub use access::AccessControl;
pub use config::{ConfigError, ElectionConfig};
pub use engine::{Election, ElectionSnapshot};
pub use error::ElectionError;
pub use events::{BroadcastNotifier, ElectionEvent, EventBus, NotificationPort, NotifyError};
pub use proposals::{Proposal, ProposalRegistry};
pub use tally::{TallyEngine, TallyResult};
pub use voters::{Voter, VoterRegistry};
pub use workflow::{StatusChange, Transition, WorkflowController};
