pub mod sections;
pub mod tables;

pub use sections::*;
pub use tables::*;
