pub mod config;
pub mod dataset;
pub mod group;
pub mod observation;

pub use config::*;
pub use dataset::*;
pub use group::*;
pub use observation::*;
