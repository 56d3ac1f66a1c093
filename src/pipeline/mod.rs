// Score import pipeline: parsing uploads, normalizing source encodings, and
// converting records into dry scores

pub mod processing;

// Re-export key types and functions from each stage
pub use processing::{convert, normalize, parser};
