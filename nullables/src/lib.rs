//! Nullable infrastructure for deterministic testing.
//!
//! The election's external collaborators (caller identity and event delivery)
//! are abstracted behind traits. This crate provides test-friendly
//! implementations that:
//! - Can be controlled programmatically
//! - Record everything they are asked to do
//! - Never touch the network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod access;
pub mod notifier;

pub use access::NullAccessControl;
pub use notifier::NullNotifier;
