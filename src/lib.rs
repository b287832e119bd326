pub mod cli;
pub mod extract;
pub mod fetch;
pub mod icons;
pub mod model;
pub mod output;
pub mod parse;
pub mod report;
pub mod scrape;

pub use cli::{Cli, Commands};
