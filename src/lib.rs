//! Hephaestus - intent routing and provider selection for multimodal
//! analysis backends.
//!
//! Classifies incoming requests into task intents, resolves which configured
//! provider should service them, and builds the per-modality analysis calls
//! (vision, transcription, video frame sampling, document summarization).

pub mod analysis;
pub mod cli;
pub mod config;
pub mod routing;
pub mod utils;
