//! Fundamental types for the ballot election administrator.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! principals, workflow phases and proposal indices.

pub mod error;
pub mod phase;
pub mod principal;

pub use error::ParseError;
pub use phase::WorkflowPhase;
pub use principal::Principal;

/// Position of a proposal in the registry. Append order is identity.
pub type ProposalIndex = usize;
