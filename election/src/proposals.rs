//! Append-only proposal list.

use ballot_types::ProposalIndex;
use serde::{Deserialize, Serialize};

use crate::error::ElectionError;

/// A described option that can receive votes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub description: String,
    pub vote_count: u64,
}

/// Proposals in submission order. A proposal's index never changes.
#[derive(Debug, Default)]
pub struct ProposalRegistry {
    proposals: Vec<Proposal>,
}

impl ProposalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a proposal with no votes and return its index.
    pub fn submit(&mut self, description: impl Into<String>) -> ProposalIndex {
        self.proposals.push(Proposal {
            description: description.into(),
            vote_count: 0,
        });
        self.proposals.len() - 1
    }

    pub fn get(&self, index: ProposalIndex) -> Result<&Proposal, ElectionError> {
        self.proposals
            .get(index)
            .ok_or(ElectionError::InvalidProposalIndex {
                index,
                count: self.proposals.len(),
            })
    }

    /// Fail with `InvalidProposalIndex` unless `index` names a proposal.
    pub fn require_valid(&self, index: ProposalIndex) -> Result<(), ElectionError> {
        self.get(index).map(|_| ())
    }

    /// Add one vote. Callers validate the index first.
    pub(crate) fn add_vote(&mut self, index: ProposalIndex) {
        if let Some(proposal) = self.proposals.get_mut(index) {
            proposal.vote_count += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    pub fn as_slice(&self) -> &[Proposal] {
        &self.proposals
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProposalIndex, &Proposal)> {
        self.proposals.iter().enumerate()
    }

    /// Sum of all vote counters.
    pub fn total_votes(&self) -> u64 {
        self.proposals.iter().map(|p| p.vote_count).sum()
    }
}
