//! The phase state machine.
//!
//! Each [`Transition`] is legal from exactly one phase and leads to its
//! immediate successor. There is no way to skip a phase or go back.

use ballot_types::WorkflowPhase;
use serde::{Deserialize, Serialize};

use crate::error::ElectionError;

/// The administrator-driven phase transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    StartProposalsRegistration,
    EndProposalsRegistration,
    StartVotingSession,
    EndVotingSession,
    TallyVotes,
}

impl Transition {
    pub const ALL: [Transition; 5] = [
        Self::StartProposalsRegistration,
        Self::EndProposalsRegistration,
        Self::StartVotingSession,
        Self::EndVotingSession,
        Self::TallyVotes,
    ];

    /// The only phase this transition may start from.
    pub fn required_phase(&self) -> WorkflowPhase {
        match self {
            Self::StartProposalsRegistration => WorkflowPhase::RegisteringVoters,
            Self::EndProposalsRegistration => WorkflowPhase::ProposalsRegistrationStarted,
            Self::StartVotingSession => WorkflowPhase::ProposalsRegistrationEnded,
            Self::EndVotingSession => WorkflowPhase::VotingSessionStarted,
            Self::TallyVotes => WorkflowPhase::VotingSessionEnded,
        }
    }

    /// The phase this transition leads to.
    pub fn target_phase(&self) -> WorkflowPhase {
        match self {
            Self::StartProposalsRegistration => WorkflowPhase::ProposalsRegistrationStarted,
            Self::EndProposalsRegistration => WorkflowPhase::ProposalsRegistrationEnded,
            Self::StartVotingSession => WorkflowPhase::VotingSessionStarted,
            Self::EndVotingSession => WorkflowPhase::VotingSessionEnded,
            Self::TallyVotes => WorkflowPhase::VotesTallied,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StartProposalsRegistration => "start_proposals_registration",
            Self::EndProposalsRegistration => "end_proposals_registration",
            Self::StartVotingSession => "start_voting_session",
            Self::EndVotingSession => "end_voting_session",
            Self::TallyVotes => "tally_votes",
        }
    }
}

/// A completed phase change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusChange {
    pub previous: WorkflowPhase,
    pub next: WorkflowPhase,
}

/// Holds the current phase and guards every phase-dependent operation.
#[derive(Debug, Default)]
pub struct WorkflowController {
    phase: WorkflowPhase,
}

impl WorkflowController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.phase
    }

    /// Fail with `WrongPhase` unless the election is in `required`.
    pub fn require(&self, required: WorkflowPhase) -> Result<(), ElectionError> {
        if self.phase == required {
            Ok(())
        } else {
            Err(ElectionError::WrongPhase {
                required,
                current: self.phase,
            })
        }
    }

    /// Check that `transition` is legal now, without applying it.
    pub fn check(&self, transition: Transition) -> Result<(), ElectionError> {
        self.require(transition.required_phase())
    }

    /// Apply `transition`, moving to its target phase.
    pub fn apply(&mut self, transition: Transition) -> Result<StatusChange, ElectionError> {
        self.check(transition)?;
        let change = StatusChange {
            previous: self.phase,
            next: transition.target_phase(),
        };
        self.phase = change.next;
        Ok(change)
    }
}
