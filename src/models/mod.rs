// Core data models for Rota
// These structs represent the domain entities

pub mod rotation;
pub mod stage;
pub mod team;

pub use rotation::*;
pub use stage::*;
pub use team::*;
