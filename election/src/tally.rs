//! Vote recording and the tie-aware tally.

use ballot_types::{Principal, ProposalIndex};
use serde::{Deserialize, Serialize};

use crate::error::ElectionError;
use crate::proposals::ProposalRegistry;
use crate::voters::VoterRegistry;

/// Outcome of a tally.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TallyResult {
    /// Exactly one proposal holds the maximum count.
    Winner(ProposalIndex),
    /// Two or more proposals share the maximum count, in index order.
    Tie(Vec<ProposalIndex>),
}

impl TallyResult {
    pub fn winner(&self) -> Option<ProposalIndex> {
        match self {
            Self::Winner(index) => Some(*index),
            Self::Tie(_) => None,
        }
    }

    pub fn is_tie(&self) -> bool {
        matches!(self, Self::Tie(_))
    }
}

/// Records ballots and counts them.
///
/// Stateless: it operates on the registries handed to it, so the caller
/// decides what lock protects them.
#[derive(Debug, Default, Clone, Copy)]
pub struct TallyEngine;

impl TallyEngine {
    /// Record `voter`'s ballot for `index`.
    ///
    /// Both checks run before either registry is touched.
    pub fn cast_vote(
        &self,
        voters: &mut VoterRegistry,
        proposals: &mut ProposalRegistry,
        voter: &Principal,
        index: ProposalIndex,
    ) -> Result<(), ElectionError> {
        voters.require_not_voted(voter)?;
        proposals.require_valid(index)?;

        voters.record_vote(voter, index);
        proposals.add_vote(index);
        Ok(())
    }

    /// Find the proposal(s) with the most votes in a single pass.
    ///
    /// The tied set is reset whenever a strictly higher count appears and
    /// extended whenever the current maximum is matched.
    pub fn tally(&self, proposals: &ProposalRegistry) -> Result<TallyResult, ElectionError> {
        let mut max = 0u64;
        let mut tied: Vec<ProposalIndex> = Vec::new();

        for (index, proposal) in proposals.iter() {
            if tied.is_empty() || proposal.vote_count > max {
                max = proposal.vote_count;
                tied.clear();
                tied.push(index);
            } else if proposal.vote_count == max {
                tied.push(index);
            }
        }

        match tied.len() {
            0 => Err(ElectionError::NoProposals),
            1 => Ok(TallyResult::Winner(tied[0])),
            _ => Ok(TallyResult::Tie(tied)),
        }
    }
}
