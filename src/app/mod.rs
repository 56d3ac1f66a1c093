pub mod convert_use_case;
pub mod ports;

pub use convert_use_case::{BatchReport, BatchSummary, ConvertUseCase, ConvertedRecord, FailedRecord};
