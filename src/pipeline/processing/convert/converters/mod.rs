// Shared helpers for converters
pub mod base;

// Individual converter implementations
pub mod batch_manual;
pub mod cg_sdvx;
pub mod eamusement_iidx;

// Re-export the main components
pub use base::ConverterUtils;
pub use batch_manual::{BatchManualContext, BatchManualConverter, BatchManualScore, MatchType};
pub use cg_sdvx::{CgSdvxConverter, CgSdvxScore};
pub use eamusement_iidx::{EamusementIidxConverter, IidxCsvContext, IidxCsvScore};
