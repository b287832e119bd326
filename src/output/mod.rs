pub mod json;
pub mod merge;

pub use json::*;
pub use merge::*;
