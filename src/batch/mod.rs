//! Batch fetching.
//!
//! - `runner`: bounded concurrent execution of independent tasks
//! - `sequencer`: per-track lyric provider fallback
//! - `orchestrator`: the lyric and album pipelines
//! - `encoding` / `output`: how fetched results land on disk

pub mod encoding;
pub mod orchestrator;
pub mod output;
pub mod runner;
pub mod sequencer;

pub use orchestrator::{LyricOptions, Orchestrator, PipelineReport};
