pub mod composite;
pub mod generator;
pub mod grid;
