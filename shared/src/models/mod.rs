//! Domain models for the AgriTriFusion crop management demo

mod crop;
mod encoding;
mod features;
mod fertilizer;
mod harvest;
mod yield_estimate;

pub use crop::*;
pub use encoding::*;
pub use features::*;
pub use fertilizer::*;
pub use harvest::*;
pub use yield_estimate::*;
