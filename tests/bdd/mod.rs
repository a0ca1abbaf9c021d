//! Cucumber world and step definitions

pub mod steps;
pub mod world;
