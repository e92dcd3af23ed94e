pub mod dataset;
pub mod loader;

pub use dataset::{Dataset, Observation, Signal};
pub use loader::{load_dataset, read_dataset};
