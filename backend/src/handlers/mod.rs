//! HTTP handlers for the AgriTriFusion API

mod fertilizer;
mod harvest;
mod health;
mod json;
mod multipart;
mod pipeline;
mod stage;
mod yield_estimate;

pub use fertilizer::*;
pub use harvest::*;
pub use health::*;
pub use pipeline::*;
pub use stage::*;
pub use yield_estimate::*;
