//! Rumormill Runtime - turn pipeline and country orchestration
//!
//! The driver side of the simulation:
//! - **TurnPipeline**: diffusion -> aggregation -> growth for one event,
//!   with a hard join after the diffusion fan-out
//! - **Orchestrator**: per-country state machine over the world's
//!   countries, consolidating each feed into history
//! - **CancelToken**: cooperative cancellation checked at step and turn
//!   boundaries

pub mod cancel;
pub mod config;
pub mod orchestrator;
pub mod pipeline;

pub use cancel::*;
pub use config::*;
pub use orchestrator::*;
pub use pipeline::*;
