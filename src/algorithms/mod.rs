pub mod a_star;
pub mod common;
pub mod heuristic;
pub mod reference;
