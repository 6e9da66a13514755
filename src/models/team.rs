use serde::{Deserialize, Serialize};

/// A rotating team
///
/// Teams carry no identity beyond their position in the roster. The
/// `start_offset` is the stage the team occupies at round 0; every later
/// round adds to it modulo the stage count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub name: String,
    pub start_offset: usize,
}

impl Team {
    /// Positional fallback name ("Team 1", "Team 2", ...).
    pub fn default_name(index: usize) -> String {
        format!("Team {}", index + 1)
    }

    /// Default roster entry: positional name, offset equal to the position
    /// (a perfect rotation when every team gets this).
    pub fn with_defaults(index: usize) -> Self {
        Self {
            name: Self::default_name(index),
            start_offset: index,
        }
    }
}
