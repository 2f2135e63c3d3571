pub mod materials;
pub mod package;
