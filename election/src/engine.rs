//! The election owner: one state object behind one lock.
//!
//! Every mutating operation takes the write lock for its whole
//! check-then-apply sequence and publishes its events before releasing it,
//! so operations never interleave and events leave in operation order.
//! Reads share the read lock and always see a completed state.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ballot_types::{Principal, ProposalIndex, WorkflowPhase};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::access::AccessControl;
use crate::config::ElectionConfig;
use crate::error::ElectionError;
use crate::events::{ElectionEvent, NotificationPort};
use crate::proposals::{Proposal, ProposalRegistry};
use crate::tally::{TallyEngine, TallyResult};
use crate::voters::{Voter, VoterRegistry};
use crate::workflow::{Transition, WorkflowController};

#[derive(Debug, Default)]
struct ElectionState {
    workflow: WorkflowController,
    voters: VoterRegistry,
    proposals: ProposalRegistry,
    result: Option<TallyResult>,
}

/// A consistent, serializable view of an election.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSnapshot {
    pub phase: WorkflowPhase,
    pub registered_voters: usize,
    pub votes_cast: usize,
    pub proposals: Vec<Proposal>,
    pub result: Option<TallyResult>,
}

/// A single election lifecycle.
pub struct Election {
    config: ElectionConfig,
    access: Arc<dyn AccessControl>,
    notifier: Arc<dyn NotificationPort>,
    tally: TallyEngine,
    state: RwLock<ElectionState>,
}

impl Election {
    pub fn new(access: Arc<dyn AccessControl>, notifier: Arc<dyn NotificationPort>) -> Self {
        Self::with_config(ElectionConfig::default(), access, notifier)
    }

    pub fn with_config(
        config: ElectionConfig,
        access: Arc<dyn AccessControl>,
        notifier: Arc<dyn NotificationPort>,
    ) -> Self {
        Self {
            config,
            access,
            notifier,
            tally: TallyEngine,
            state: RwLock::new(ElectionState::default()),
        }
    }

    pub fn config(&self) -> &ElectionConfig {
        &self.config
    }

    // ── Administrator operations ────────────────────────────────────────

    /// Admit `principal` as a voter.
    pub fn register_voter(&self, principal: &Principal) -> Result<(), ElectionError> {
        self.mutate("register_voter", |caller, state| {
            self.require_admin(caller)?;
            state.workflow.require(WorkflowPhase::RegisteringVoters)?;
            if self.access.is_administrator(principal) {
                return Err(ElectionError::SelfRegistrationForbidden);
            }
            state.voters.register(principal)?;

            info!(voter = %principal, "voter registered");
            Ok((
                (),
                vec![ElectionEvent::VoterRegistered {
                    voter: principal.clone(),
                }],
            ))
        })
    }

    pub fn start_proposals_registration(&self) -> Result<(), ElectionError> {
        self.apply_transition(Transition::StartProposalsRegistration)
    }

    pub fn end_proposals_registration(&self) -> Result<(), ElectionError> {
        self.apply_transition(Transition::EndProposalsRegistration)
    }

    pub fn start_voting_session(&self) -> Result<(), ElectionError> {
        self.apply_transition(Transition::StartVotingSession)
    }

    pub fn end_voting_session(&self) -> Result<(), ElectionError> {
        self.apply_transition(Transition::EndVotingSession)
    }

    /// Count the votes and close the election.
    ///
    /// Fails with `NoProposals` if nothing was submitted; the phase then stays
    /// at `VotingSessionEnded`.
    pub fn tally_votes(&self) -> Result<(), ElectionError> {
        self.apply_transition(Transition::TallyVotes)
    }

    // ── Voter operations ────────────────────────────────────────────────

    /// Submit a proposal on behalf of the calling voter.
    pub fn register_proposal(
        &self,
        description: impl Into<String>,
    ) -> Result<ProposalIndex, ElectionError> {
        let description = description.into();
        self.mutate("register_proposal", |caller, state| {
            state
                .workflow
                .require(WorkflowPhase::ProposalsRegistrationStarted)?;
            state.voters.require_registered(caller)?;
            self.validate_description(&description)?;

            let index = state.proposals.submit(description);
            debug!(voter = %caller, index, "proposal registered");
            Ok((index, vec![ElectionEvent::ProposalRegistered { index }]))
        })
    }

    /// Cast the calling voter's single vote.
    pub fn vote(&self, index: ProposalIndex) -> Result<(), ElectionError> {
        self.mutate("vote", |caller, state| {
            state.workflow.require(WorkflowPhase::VotingSessionStarted)?;
            state.voters.require_registered(caller)?;
            let ElectionState {
                voters, proposals, ..
            } = state;
            self.tally.cast_vote(voters, proposals, caller, index)?;

            debug!(voter = %caller, index, "vote recorded");
            Ok((
                (),
                vec![ElectionEvent::Voted {
                    voter: caller.clone(),
                    index,
                }],
            ))
        })
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub fn get_proposal(&self, index: ProposalIndex) -> Result<Proposal, ElectionError> {
        self.read().proposals.get(index).cloned()
    }

    /// The winning proposal, once votes are tallied.
    pub fn get_winner(&self) -> Result<Proposal, ElectionError> {
        let state = self.read();
        state.workflow.require(WorkflowPhase::VotesTallied)?;
        match &state.result {
            Some(TallyResult::Winner(index)) => state.proposals.get(*index).cloned(),
            Some(TallyResult::Tie(indices)) => Err(ElectionError::NoWinner(indices.clone())),
            None => Err(ElectionError::NoWinner(Vec::new())),
        }
    }

    pub fn current_phase(&self) -> WorkflowPhase {
        self.read().workflow.phase()
    }

    pub fn get_voter(&self, principal: &Principal) -> Result<Voter, ElectionError> {
        self.read().voters.require_registered(principal).cloned()
    }

    pub fn proposals(&self) -> Vec<Proposal> {
        self.read().proposals.as_slice().to_vec()
    }

    pub fn proposal_count(&self) -> usize {
        self.read().proposals.len()
    }

    /// `None` until `tally_votes` has succeeded.
    pub fn tally_result(&self) -> Option<TallyResult> {
        self.read().result.clone()
    }

    pub fn snapshot(&self) -> ElectionSnapshot {
        let state = self.read();
        ElectionSnapshot {
            phase: state.workflow.phase(),
            registered_voters: state.voters.len(),
            votes_cast: state.voters.votes_cast(),
            proposals: state.proposals.as_slice().to_vec(),
            result: state.result.clone(),
        }
    }

    // ── Transitions ─────────────────────────────────────────────────────

    /// Apply any administrator transition. The named methods above are
    /// shorthands for this.
    pub fn apply_transition(&self, transition: Transition) -> Result<(), ElectionError> {
        self.mutate(transition.as_str(), |caller, state| {
            self.require_admin(caller)?;
            state.workflow.check(transition)?;

            let result = match transition {
                Transition::TallyVotes => Some(self.tally.tally(&state.proposals)?),
                _ => None,
            };

            let change = state.workflow.apply(transition)?;
            info!(
                previous = %change.previous,
                next = %change.next,
                "workflow status changed"
            );
            let mut events = vec![ElectionEvent::WorkflowStatusChange {
                previous: change.previous,
                next: change.next,
            }];

            match &result {
                Some(TallyResult::Winner(index)) => info!(winner = index, "votes tallied"),
                Some(TallyResult::Tie(indices)) => {
                    info!(?indices, "votes tallied, tie detected");
                    events.push(ElectionEvent::TieDetected {
                        indices: indices.clone(),
                    });
                }
                None => {}
            }
            if result.is_some() {
                state.result = result;
            }
            Ok(((), events))
        })
    }

    // ── Internals ───────────────────────────────────────────────────────

    /// Run `op` under the write lock and publish its events before unlocking.
    fn mutate<T, F>(&self, name: &'static str, op: F) -> Result<T, ElectionError>
    where
        F: FnOnce(&Principal, &mut ElectionState) -> Result<(T, Vec<ElectionEvent>), ElectionError>,
    {
        let caller = self.access.current_caller();
        let mut state = self.write();
        match op(&caller, &mut *state) {
            Ok((value, events)) => {
                for event in &events {
                    self.publish(event);
                }
                Ok(value)
            }
            Err(err) => {
                debug!(operation = name, caller = %caller, error = %err, "operation refused");
                Err(err)
            }
        }
    }

    fn require_admin(&self, caller: &Principal) -> Result<(), ElectionError> {
        if self.access.is_administrator(caller) {
            Ok(())
        } else {
            Err(ElectionError::Unauthorized(caller.clone()))
        }
    }

    fn validate_description(&self, description: &str) -> Result<(), ElectionError> {
        if description.trim().is_empty() {
            return Err(ElectionError::EmptyDescription);
        }
        if description.len() > self.config.max_description_len {
            return Err(ElectionError::DescriptionTooLong {
                len: description.len(),
                max: self.config.max_description_len,
            });
        }
        Ok(())
    }

    fn publish(&self, event: &ElectionEvent) {
        if let Err(e) = self.notifier.publish(event) {
            warn!(event = event.name(), error = %e, "event publication failed");
        }
    }

    // Every mutation validates before it writes, so a poisoned lock still
    // guards a consistent state.
    fn read(&self) -> RwLockReadGuard<'_, ElectionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ElectionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
