use ballot_types::{Principal, ProposalIndex, WorkflowPhase};
use thiserror::Error;

/// Every way an election operation can be refused.
///
/// All variants are detected before any state is touched: a call that returns
/// one of these leaves the election exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElectionError {
    #[error("caller {0} is not the election administrator")]
    Unauthorized(Principal),

    #[error("operation requires phase {required}, election is in {current}")]
    WrongPhase {
        required: WorkflowPhase,
        current: WorkflowPhase,
    },

    #[error("voter {0} is already registered")]
    AlreadyRegistered(Principal),

    #[error("the administrator cannot register as a voter")]
    SelfRegistrationForbidden,

    #[error("{0} is not a registered voter")]
    NotRegisteredVoter(Principal),

    #[error("voter {0} has already voted")]
    AlreadyVoted(Principal),

    #[error("proposal index {index} out of range ({count} proposals)")]
    InvalidProposalIndex { index: ProposalIndex, count: usize },

    #[error("no proposals to tally")]
    NoProposals,

    #[error("tally ended in a tie between proposals {0:?}")]
    NoWinner(Vec<ProposalIndex>),

    #[error("proposal description is empty")]
    EmptyDescription,

    #[error("proposal description is {len} bytes, limit is {max}")]
    DescriptionTooLong { len: usize, max: usize },
}

impl ElectionError {
    /// Stable snake_case code for scripts and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::WrongPhase { .. } => "wrong_phase",
            Self::AlreadyRegistered(_) => "already_registered",
            Self::SelfRegistrationForbidden => "self_registration_forbidden",
            Self::NotRegisteredVoter(_) => "not_registered_voter",
            Self::AlreadyVoted(_) => "already_voted",
            Self::InvalidProposalIndex { .. } => "invalid_proposal_index",
            Self::NoProposals => "no_proposals",
            Self::NoWinner(_) => "no_winner",
            Self::EmptyDescription => "empty_description",
            Self::DescriptionTooLong { .. } => "description_too_long",
        }
    }
}
