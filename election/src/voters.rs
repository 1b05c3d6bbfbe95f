//! Registered voters and their ballots.

use ballot_types::{Principal, ProposalIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ElectionError;

/// A registered voter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    pub registered: bool,
    /// Once set, never cleared.
    pub has_voted: bool,
    /// The proposal this voter chose, if they have voted.
    pub voted_proposal_index: Option<ProposalIndex>,
}

/// Tracks which principals may take part and whether they voted.
///
/// Voters are created on registration and never removed.
#[derive(Debug, Default)]
pub struct VoterRegistry {
    voters: HashMap<Principal, Voter>,
    votes_cast: usize,
}

impl VoterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit `principal`.
    pub fn register(&mut self, principal: &Principal) -> Result<(), ElectionError> {
        if self.is_registered(principal) {
            return Err(ElectionError::AlreadyRegistered(principal.clone()));
        }
        self.voters.insert(
            principal.clone(),
            Voter {
                registered: true,
                ..Voter::default()
            },
        );
        Ok(())
    }

    pub fn is_registered(&self, principal: &Principal) -> bool {
        self.voters.get(principal).is_some_and(|v| v.registered)
    }

    pub fn get(&self, principal: &Principal) -> Option<&Voter> {
        self.voters.get(principal)
    }

    /// Look up `principal`, failing with `NotRegisteredVoter` if unknown.
    pub fn require_registered(&self, principal: &Principal) -> Result<&Voter, ElectionError> {
        self.voters
            .get(principal)
            .filter(|v| v.registered)
            .ok_or_else(|| ElectionError::NotRegisteredVoter(principal.clone()))
    }

    /// Fail with `AlreadyVoted` if `principal` has cast their ballot.
    pub fn require_not_voted(&self, principal: &Principal) -> Result<(), ElectionError> {
        match self.require_registered(principal)? {
            v if v.has_voted => Err(ElectionError::AlreadyVoted(principal.clone())),
            _ => Ok(()),
        }
    }

    /// Mark `principal`'s ballot. Callers validate with
    /// [`require_not_voted`](Self::require_not_voted) first.
    pub(crate) fn record_vote(&mut self, principal: &Principal, index: ProposalIndex) {
        if let Some(voter) = self.voters.get_mut(principal) {
            if !voter.has_voted {
                voter.has_voted = true;
                voter.voted_proposal_index = Some(index);
                self.votes_cast += 1;
            }
        }
    }

    /// Number of registered voters.
    pub fn len(&self) -> usize {
        self.voters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voters.is_empty()
    }

    /// Number of voters with `has_voted` set.
    pub fn votes_cast(&self) -> usize {
        self.votes_cast
    }
}
