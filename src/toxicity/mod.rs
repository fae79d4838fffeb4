// Toxicity scoring — trait-based abstraction for swappable backends.
//
// The ToxicityScorer trait defines the interface. The production backend is
// a local ONNX export of toxic-bert; tests substitute fakes at the trait.

pub mod onnx;
pub mod traits;
