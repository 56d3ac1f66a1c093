pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod observability;
pub mod pipeline;

pub use app::{BatchReport, ConvertUseCase};
pub use pipeline::convert::{
    ConverterFailure, ConverterKey, ConverterRegistry, FailureKind, ImportContext, ReferenceResolver,
};
