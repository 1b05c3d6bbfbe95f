//! The election workflow phases.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// The six ordered phases of an election.
///
/// The declaration order is the only legal order: an election moves from one
/// phase to its immediate successor and never back.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum WorkflowPhase {
    /// The administrator admits voters.
    #[default]
    RegisteringVoters,
    /// Registered voters submit proposals.
    ProposalsRegistrationStarted,
    /// Proposal list is frozen; voting has not opened yet.
    ProposalsRegistrationEnded,
    /// Registered voters cast one vote each.
    VotingSessionStarted,
    /// Voting is closed; awaiting the tally.
    VotingSessionEnded,
    /// Votes have been counted. Terminal.
    VotesTallied,
}

impl WorkflowPhase {
    /// Every phase, in workflow order.
    pub const ALL: [WorkflowPhase; 6] = [
        Self::RegisteringVoters,
        Self::ProposalsRegistrationStarted,
        Self::ProposalsRegistrationEnded,
        Self::VotingSessionStarted,
        Self::VotingSessionEnded,
        Self::VotesTallied,
    ];

    /// The immediate successor, or `None` for the terminal phase.
    pub fn next(&self) -> Option<WorkflowPhase> {
        match self {
            Self::RegisteringVoters => Some(Self::ProposalsRegistrationStarted),
            Self::ProposalsRegistrationStarted => Some(Self::ProposalsRegistrationEnded),
            Self::ProposalsRegistrationEnded => Some(Self::VotingSessionStarted),
            Self::VotingSessionStarted => Some(Self::VotingSessionEnded),
            Self::VotingSessionEnded => Some(Self::VotesTallied),
            Self::VotesTallied => None,
        }
    }

    /// Whether no transition leaves this phase.
    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }

    /// Stable snake_case name, used in logs and config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RegisteringVoters => "registering_voters",
            Self::ProposalsRegistrationStarted => "proposals_registration_started",
            Self::ProposalsRegistrationEnded => "proposals_registration_ended",
            Self::VotingSessionStarted => "voting_session_started",
            Self::VotingSessionEnded => "voting_session_ended",
            Self::VotesTallied => "votes_tallied",
        }
    }
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowPhase {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|phase| phase.as_str() == s)
            .ok_or_else(|| ParseError::UnknownPhase(s.to_string()))
    }
}
