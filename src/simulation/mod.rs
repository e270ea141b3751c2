pub mod config;
pub mod environment;
pub mod error;
pub mod experiment;
pub mod geometry;
pub mod memory;
pub mod params;
pub mod policy;
pub mod statistics;

pub use config::SimulationConfig;
pub use error::MazeError;
pub use experiment::{run_batch, run_relocation_experiment, run_removal_probe, Session};
