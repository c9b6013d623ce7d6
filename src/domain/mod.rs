pub mod analysis;
pub mod odds;
pub mod prediction;

pub use analysis::*;
pub use odds::*;
pub use prediction::*;
