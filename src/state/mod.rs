//! Durable progress state.
//!
//! This module provides the persisted record of a setup workflow: one
//! [`StepState`] per declared step, collected in a [`WorkflowState`] and
//! written through a [`StateBackend`] after every transition.

pub mod backend;
pub mod session;
pub mod store;

pub use backend::{FileBackend, MemoryBackend, StateBackend};
pub use session::SessionId;
pub use store::{ResultData, StepState, StepStatus, WorkflowState};
