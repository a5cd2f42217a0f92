//! Offline collaborator implementations.
//!
//! Used when no text-generation backend is configured, and as fixtures in
//! tests. Real backends implement the traits in [`crate::api`].

mod stubs;
mod world;

pub use stubs::{StubNarrator, StubValidator};
pub use world::ScriptedWorld;
