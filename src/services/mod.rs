pub mod capterra_scraper;
pub mod data_persistance;
pub mod droid;
pub mod error;
pub mod g2_scraper;
pub mod pipeline;
pub mod scraper;

pub use capterra_scraper::*;
pub use data_persistance::*;
pub use droid::*;
pub use error::*;
pub use g2_scraper::*;
pub use pipeline::*;
pub use scraper::*;
