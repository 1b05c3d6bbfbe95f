//! Scripted elections: a TOML list of steps replayed against one `Election`.
//!
//! ```toml
//! administrator = "admin"
//!
//! [[steps]]
//! action = "register_voter"
//! voter = "alice"
//!
//! [[steps]]
//! caller = "alice"
//! action = "vote"
//! index = 0
//! expect = "wrong_phase"
//! ```
//!
//! `caller` defaults to the administrator. `expect` names the error code a
//! step should fail with; without it the step is expected to succeed.

use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use ballot_election::{AccessControl, Election, ElectionError, ElectionSnapshot, Proposal};
use ballot_types::{Principal, ProposalIndex};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Clone, Debug, Deserialize)]
pub struct Scenario {
    pub administrator: Principal,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub caller: Option<Principal>,
    #[serde(flatten)]
    pub action: Action,
    #[serde(default)]
    pub expect: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    RegisterVoter { voter: Principal },
    StartProposalsRegistration,
    RegisterProposal { description: String },
    EndProposalsRegistration,
    StartVotingSession,
    Vote { index: ProposalIndex },
    EndVotingSession,
    TallyVotes,
    GetProposal { index: ProposalIndex },
    GetWinner,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RegisterVoter { .. } => "register_voter",
            Self::StartProposalsRegistration => "start_proposals_registration",
            Self::RegisterProposal { .. } => "register_proposal",
            Self::EndProposalsRegistration => "end_proposals_registration",
            Self::StartVotingSession => "start_voting_session",
            Self::Vote { .. } => "vote",
            Self::EndVotingSession => "end_voting_session",
            Self::TallyVotes => "tally_votes",
            Self::GetProposal { .. } => "get_proposal",
            Self::GetWinner => "get_winner",
        }
    }
}

impl Scenario {
    pub fn from_toml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("invalid scenario {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

/// Access control for scripted runs: a fixed administrator and a caller the
/// runner switches before each step.
pub struct ScriptedCaller {
    administrator: Principal,
    caller: Mutex<Principal>,
}

impl ScriptedCaller {
    pub fn new(administrator: Principal) -> Self {
        Self {
            caller: Mutex::new(administrator.clone()),
            administrator,
        }
    }

    fn set(&self, principal: &Principal) {
        *self.caller.lock().unwrap_or_else(|e| e.into_inner()) = principal.clone();
    }
}

impl AccessControl for ScriptedCaller {
    fn current_caller(&self) -> Principal {
        self.caller.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn is_administrator(&self, principal: &Principal) -> bool {
        *principal == self.administrator
    }
}

/// What a successful step returned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StepValue {
    Index(ProposalIndex),
    Proposal(Proposal),
}

#[derive(Clone, Debug, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub caller: Principal,
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<StepValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_error: Option<String>,
    pub as_expected: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub steps: Vec<StepReport>,
    pub unexpected: usize,
    pub election: ElectionSnapshot,
}

/// Replay `scenario` against `election`.
///
/// With `keep_going` unset, the run stops after the first step whose outcome
/// differs from its expectation.
pub fn run(
    scenario: &Scenario,
    election: &Election,
    access: &ScriptedCaller,
    keep_going: bool,
) -> RunReport {
    let mut steps = Vec::with_capacity(scenario.steps.len());
    let mut unexpected = 0;

    for (n, step) in scenario.steps.iter().enumerate() {
        let caller = step
            .caller
            .clone()
            .unwrap_or_else(|| scenario.administrator.clone());
        access.set(&caller);

        let outcome = execute(election, &step.action);
        let code = outcome.as_ref().err().map(ElectionError::code);
        let as_expected = code == step.expect.as_deref();

        match &outcome {
            Ok(_) => info!(step = n, caller = %caller, action = step.action.name(), "step applied"),
            Err(e) => info!(step = n, caller = %caller, action = step.action.name(), error = %e, "step refused"),
        }
        if !as_expected {
            unexpected += 1;
            warn!(
                step = n,
                expected = step.expect.as_deref().unwrap_or("success"),
                actual = code.unwrap_or("success"),
                "step outcome differs from expectation"
            );
        }

        let (value, error) = match outcome {
            Ok(value) => (value, None),
            Err(e) => (None, Some(e.code().to_string())),
        };
        steps.push(StepReport {
            step: n,
            caller,
            action: step.action.name(),
            value,
            error,
            expected_error: step.expect.clone(),
            as_expected,
        });

        if !as_expected && !keep_going {
            break;
        }
    }

    RunReport {
        steps,
        unexpected,
        election: election.snapshot(),
    }
}

fn execute(election: &Election, action: &Action) -> Result<Option<StepValue>, ElectionError> {
    match action {
        Action::RegisterVoter { voter } => election.register_voter(voter).map(|_| None),
        Action::StartProposalsRegistration => {
            election.start_proposals_registration().map(|_| None)
        }
        Action::RegisterProposal { description } => election
            .register_proposal(description.as_str())
            .map(|index| Some(StepValue::Index(index))),
        Action::EndProposalsRegistration => election.end_proposals_registration().map(|_| None),
        Action::StartVotingSession => election.start_voting_session().map(|_| None),
        Action::Vote { index } => election.vote(*index).map(|_| None),
        Action::EndVotingSession => election.end_voting_session().map(|_| None),
        Action::TallyVotes => election.tally_votes().map(|_| None),
        Action::GetProposal { index } => election
            .get_proposal(*index)
            .map(|p| Some(StepValue::Proposal(p))),
        Action::GetWinner => election
            .get_winner()
            .map(|p| Some(StepValue::Proposal(p))),
    }
}
