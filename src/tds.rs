pub mod codec;
mod collation;
pub mod numeric;
pub mod time;

pub use collation::*;
