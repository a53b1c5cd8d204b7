//! Configuration types
//!
//! Board-agnostic monitor configuration plus the text parser that loads it.

pub mod monitors;
pub mod parser;
pub mod types;

pub use monitors::*;
pub use parser::{parse_config, ParseError};
pub use types::*;
