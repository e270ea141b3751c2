//! Learned state owned by the Q-learning mouse.

pub mod value_grid;

pub use value_grid::ValueGrid;
