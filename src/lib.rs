//! Morris water-maze simulation: a mouse learns where a hidden platform is,
//! driven either by a direction-shifting heuristic or by softmax Q-learning.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_wrap)]

pub mod simulation;
pub mod ui;
