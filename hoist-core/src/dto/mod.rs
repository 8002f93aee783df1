//! Raw wire shapes
//!
//! Serde mirrors of the server's JSON API payloads. These stay exactly as
//! the server sends them; all derived/computed fields live in
//! [`crate::domain`] instead of being patched into these structs.

pub mod build;
pub mod job;
pub mod queue;
