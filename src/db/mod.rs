// Snapshot store: connection management and schema migrations

pub mod connection;
pub mod migrations;

pub use connection::*;
pub use migrations::*;
