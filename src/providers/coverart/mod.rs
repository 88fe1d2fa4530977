//! Album artwork via MusicBrainz + Cover Art Archive
//!
//! A recording search on MusicBrainz finds releases for the track, then the
//! Cover Art Archive serves the front image of the first release that has one.
//! No API key required.

pub mod dto;
mod client;

pub use client::{CoverArtProvider, CoverSize};
