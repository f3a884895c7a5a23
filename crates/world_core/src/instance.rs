//! Character instances: placed, simulated occurrences of a template.

use crate::{CellId, InstanceId, TemplateId, ZoneId};

/// One concrete occurrence of a template in the simulated world.
///
/// Membership fields (`commanding_owner`, `is_player_teammate`) are
/// transient and must be re-read on every notification.
#[derive(Clone, Debug)]
pub struct CharacterInstance {
    pub id: InstanceId,
    pub template: TemplateId,
    /// Commanding actor for summoned characters.
    pub commanding_owner: Option<InstanceId>,
    pub is_player_teammate: bool,
    /// Containing spatial cell, if placed.
    pub cell: Option<CellId>,
    /// Zone attached to this instance's placement data; overrides the cell
    /// zone for individually-placed characters in mixed-zone areas.
    pub placed_zone: Option<ZoneId>,
}

impl CharacterInstance {
    pub fn new(id: InstanceId, template: TemplateId, cell: Option<CellId>) -> Self {
        Self {
            id,
            template,
            commanding_owner: None,
            is_player_teammate: false,
            cell,
            placed_zone: None,
        }
    }
}
