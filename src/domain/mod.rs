pub mod dates;
pub mod review;

pub use review::*;
