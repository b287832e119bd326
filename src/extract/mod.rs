pub mod catalog;
pub mod crafting;
pub mod projects;
mod recipe_pages;
pub mod traders;
pub mod upgrades;
pub mod workshop;

pub use catalog::*;
pub use crafting::*;
pub use projects::*;
pub use traders::*;
pub use upgrades::*;
pub use workshop::*;
