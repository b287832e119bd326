pub mod client;
pub mod listing;

pub use client::*;
pub use listing::*;
