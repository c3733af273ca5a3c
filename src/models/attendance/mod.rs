pub mod engine;
pub mod queries;
pub mod types;

pub use engine::*;
pub use queries::*;
pub use types::*;
