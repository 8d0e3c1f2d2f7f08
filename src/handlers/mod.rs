pub mod models;
pub mod transcriptions;

pub use models::*;
pub use transcriptions::*;
