// Pipeline processing: parsing, normalization, and conversion

pub mod convert;
pub mod normalize;
pub mod parser;
