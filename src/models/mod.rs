pub mod heatsink;
