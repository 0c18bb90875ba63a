pub mod geometry;
pub mod math;
pub mod orders;
pub mod people;
pub mod rules;
pub mod server;
