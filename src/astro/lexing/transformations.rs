//! Token stream transformations applied after base tokenization.

pub mod no_space;
pub mod semantic_indentation;
