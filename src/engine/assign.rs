use crate::engine::wrap_index;
use crate::models::Rotation;

/// Occupancy of one stage in one round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageSlot {
    /// No team resolves to this stage.
    Empty,
    /// Exactly one team resolves here; the payload is the team's roster
    /// position.
    Team(usize),
    /// Two or more teams resolve here. Sticky: once a stage collides it
    /// stays collided no matter how many more teams land on it.
    Collision,
}

impl StageSlot {
    pub fn is_collision(&self) -> bool {
        matches!(self, StageSlot::Collision)
    }
}

/// Both directions of the team/stage mapping for a single round
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Stage index occupied by each team, indexed by team position.
    pub stage_of_team: Vec<usize>,
    /// Occupant of each stage, indexed by stage position.
    pub team_at_stage: Vec<StageSlot>,
}

impl Assignment {
    /// Stage indexes holding more than one team, ascending.
    pub fn collision_stages(&self) -> Vec<usize> {
        self.team_at_stage
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_collision())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn has_collision(&self) -> bool {
        self.team_at_stage.iter().any(StageSlot::is_collision)
    }
}

/// Resolve where every team stands in `round`, in one pass over the roster.
///
/// Each team lands on `(start_offset + round) mod stage_count`. The first
/// team to claim a stage occupies it; any later claim turns the slot into
/// a collision.
pub fn assignment_for_round(rotation: &Rotation, round: usize) -> Assignment {
    let n = rotation.stage_count;
    let mut stage_of_team = Vec::with_capacity(rotation.teams.len());
    let mut team_at_stage = vec![StageSlot::Empty; n];

    for (team_index, team) in rotation.teams.iter().enumerate() {
        let stage = wrap_index(team.start_offset as i64 + round as i64, n);
        stage_of_team.push(stage);
        team_at_stage[stage] = match team_at_stage[stage] {
            StageSlot::Empty => StageSlot::Team(team_index),
            _ => StageSlot::Collision,
        };
    }

    Assignment {
        stage_of_team,
        team_at_stage,
    }
}
