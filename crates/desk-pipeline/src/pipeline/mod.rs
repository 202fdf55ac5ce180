//! Report pipeline: fan-out research, bounded revision loop, archival

mod orchestrator;
mod state;

pub use orchestrator::{Orchestrator, build_orchestrator};
pub use state::{LoopOutcome, revision_loop};
