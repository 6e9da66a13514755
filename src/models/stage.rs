use serde::{Deserialize, Serialize};

/// A fixed station that teams rotate through
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub name: String,
    /// Supervisor on duty at this stage, if one is assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervisor_name: Option<String>,
}

impl Stage {
    /// Positional fallback name ("Stage 1", "Stage 2", ...).
    pub fn default_name(index: usize) -> String {
        format!("Stage {}", index + 1)
    }

    /// Lettered supervisor placeholder, wrapping after Z.
    pub fn default_supervisor(index: usize) -> String {
        let letter = (b'A' + (index % 26) as u8) as char;
        format!("Supervisor {}", letter)
    }

    pub fn with_defaults(index: usize) -> Self {
        Self {
            name: Self::default_name(index),
            supervisor_name: Some(Self::default_supervisor(index)),
        }
    }
}
