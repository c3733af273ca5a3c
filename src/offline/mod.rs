pub mod router;
pub mod store;
pub mod worker;

pub use router::*;
pub use store::*;
pub use worker::*;
