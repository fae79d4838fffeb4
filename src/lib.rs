// Hallpass: role-aware toxicity screening for classroom voice and text.
//
// This is the library root. Each module corresponds to one stage of the
// single-shot analysis pipeline.

pub mod config;
pub mod download;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod policy;
pub mod toxicity;
pub mod transcribe;
