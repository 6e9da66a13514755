pub mod commands;
pub mod error;
pub mod output;
pub mod watch;

pub use commands::*;
pub use output::*;
pub use error::*;
