// src/polling/mod.rs

//! Status polling for submitted video jobs.
//!
//! A [`PollSession`] repeatedly asks a [`StatusSource`](crate::client::StatusSource)
//! for one request id until the job completes, fails, or a check errors out.
//! The [`PollRegistry`] makes sure every request id has at most one live
//! session no matter how many viewers watch it.

pub mod registry;
pub mod session;

pub use registry::{PollHandle, PollRegistry};
pub use session::{PollPhase, PollSession, PollSnapshot};
