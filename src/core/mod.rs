pub mod alias_table;
pub mod bbox;
pub mod color;
pub mod coord;
pub mod error;
pub mod fast_stack;
pub mod film;
pub mod intersection;
pub mod loader;
pub mod ray;
pub mod rng;
pub mod scene;
