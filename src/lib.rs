//! AI-assisted matching and outfit composition for fashion catalogs.
//!
//! `outfit-core` turns a vibe, a photo, a set of photos or a purchase
//! history into a curated list of catalog items. A language model is asked
//! for a structured descriptor once per request; everything after that
//! (weighted field scoring, category-balanced composition, random fallback)
//! is local and deterministic given a seeded RNG.
//!
//! The entry point is [`pipeline::CompositionPipeline`].

pub mod catalog;
pub mod compose;
pub mod config;
pub mod intent;
pub mod pipeline;
pub mod replay;
pub mod sampling;
pub mod scoring;
pub mod types;
