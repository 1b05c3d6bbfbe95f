//! Caller identity, supplied from outside the election.

use ballot_types::Principal;

/// External capability answering who is calling and whether they administer
/// the election.
///
/// The election never decides privilege on its own; it only consumes these
/// answers. Implementations must be cheap: they are consulted on every call.
pub trait AccessControl: Send + Sync {
    /// The principal on whose behalf the current operation runs.
    fn current_caller(&self) -> Principal;

    /// Whether `principal` is the election administrator.
    fn is_administrator(&self, principal: &Principal) -> bool;
}
