use serde::{Deserialize, Serialize};

use crate::engine::wrap_index;
use crate::models::{Stage, Team};

/// Stage count used when nothing valid is stored.
pub const DEFAULT_STAGE_COUNT: usize = 10;
/// Round length in minutes used when nothing valid is stored.
pub const DEFAULT_ROUND_MINUTES: f64 = 10.0;
/// Hard ceiling on the stage count a snapshot may request.
pub const MAX_STAGE_COUNT: usize = 500;

/// How the active round is selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundMode {
    /// Derived from the wall clock and the schedule start.
    Scheduled,
    /// Pinned to `manual_round_index`.
    Manual,
}

impl RoundMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundMode::Scheduled => "scheduled",
            RoundMode::Manual => "manual",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "scheduled" => Some(RoundMode::Scheduled),
            "manual" => Some(RoundMode::Manual),
            _ => None,
        }
    }

    /// Capitalized form for display.
    pub fn label(&self) -> &'static str {
        match self {
            RoundMode::Scheduled => "Scheduled",
            RoundMode::Manual => "Manual",
        }
    }
}

/// Which grouping the display leads with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Stages,
    Teams,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Stages => "stages",
            ViewMode::Teams => "teams",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "stages" => Some(ViewMode::Stages),
            "teams" => Some(ViewMode::Teams),
            _ => None,
        }
    }
}

/// The full rotation snapshot: settings plus both rosters
///
/// A `Rotation` is always well formed: `teams` and `stages` each hold
/// exactly `stage_count` entries, `start_offset` and `manual_round_index`
/// are in `[0, stage_count)`, and `round_length_minutes >= 1`. Anything
/// loaded from outside the process goes through `snapshot::normalize`
/// before it becomes one of these.
///
/// Edits never mutate in place. Each `with_*` method consumes the value
/// and returns a fresh revision, so a caller holding the old value keeps
/// an unchanged picture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rotation {
    pub stage_count: usize,
    pub round_mode: RoundMode,
    pub round_length_minutes: f64,
    /// Local wall-clock instant the schedule starts at. Kept verbatim even
    /// when unparseable; the round selector treats a bad value as absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_start: Option<String>,
    pub manual_round_index: usize,
    pub view: ViewMode,
    pub teams: Vec<Team>,
    pub stages: Vec<Stage>,
}

impl Default for Rotation {
    fn default() -> Self {
        Self::with_defaults(DEFAULT_STAGE_COUNT)
    }
}

impl Rotation {
    /// Fresh rotation with positional team and stage names and a perfect
    /// one-team-per-stage starting layout.
    pub fn with_defaults(stage_count: usize) -> Self {
        let n = stage_count.max(1);
        Rotation {
            stage_count: n,
            round_mode: RoundMode::Scheduled,
            round_length_minutes: DEFAULT_ROUND_MINUTES,
            schedule_start: None,
            manual_round_index: 0,
            view: ViewMode::Stages,
            teams: (0..n).map(Team::with_defaults).collect(),
            stages: (0..n).map(Stage::with_defaults).collect(),
        }
    }

    pub fn with_team_name(mut self, index: usize, name: impl Into<String>) -> Self {
        if let Some(team) = self.teams.get_mut(index) {
            team.name = name.into();
        }
        self
    }

    /// Set a team's starting stage, wrapping into `[0, stage_count)`.
    pub fn with_team_offset(mut self, index: usize, offset: i64) -> Self {
        let n = self.stage_count;
        if let Some(team) = self.teams.get_mut(index) {
            team.start_offset = wrap_index(offset, n);
        }
        self
    }

    pub fn with_stage_name(mut self, index: usize, name: impl Into<String>) -> Self {
        if let Some(stage) = self.stages.get_mut(index) {
            stage.name = name.into();
        }
        self
    }

    pub fn with_stage_supervisor(mut self, index: usize, supervisor: Option<String>) -> Self {
        if let Some(stage) = self.stages.get_mut(index) {
            stage.supervisor_name = supervisor.filter(|s| !s.trim().is_empty());
        }
        self
    }

    pub fn with_mode(mut self, mode: RoundMode) -> Self {
        self.round_mode = mode;
        self
    }

    /// Set the manual round, wrapping into `[0, stage_count)`.
    pub fn with_manual_round(mut self, round: i64) -> Self {
        self.manual_round_index = wrap_index(round, self.stage_count);
        self
    }

    pub fn with_schedule_start(mut self, start: Option<String>) -> Self {
        self.schedule_start = start.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn with_round_length(mut self, minutes: f64) -> Self {
        self.round_length_minutes = minutes;
        self
    }

    pub fn with_view(mut self, view: ViewMode) -> Self {
        self.view = view;
        self
    }

    /// Team names in roster order, for reference resolution.
    pub fn team_names(&self) -> Vec<&str> {
        self.teams.iter().map(|t| t.name.as_str()).collect()
    }

    /// Stage names in roster order, for reference resolution.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name.as_str()).collect()
    }
}
