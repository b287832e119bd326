pub mod materials;
pub mod reconcile;
pub mod tier;

pub use materials::*;
pub use reconcile::*;
pub use tier::*;
