//! The host-world seam.
//!
//! The engine never owns characters: templates and instances belong to the
//! host process, which exposes them through this trait. Accessors return
//! snapshots by value so the engine holds no borrows into host storage, and
//! a stale handle simply resolves to `None`.

use crate::{
    AttributeSet, CellId, CharacterInstance, CharacterTemplate, InstanceId, SKILL_COUNT,
    TemplateId, Zone, ZoneId,
};

/// Loaded-state and zone assignment of a spatial cell.
#[derive(Copy, Clone, Debug)]
pub struct Cell {
    pub zone: Option<ZoneId>,
    /// Whether the cell is attached to the running simulation. Characters in
    /// unloaded cells are not relevant yet.
    pub loaded: bool,
}

/// Recomputed attribute and skill values for one instance.
#[derive(Clone, Debug, PartialEq)]
pub struct StatBlock {
    pub attributes: AttributeSet,
    pub skills: [f32; SKILL_COUNT],
}

/// Collaborator interface to the host world.
///
/// Implementations must be callable from concurrent notification threads;
/// the engine serializes its own template-bound writes, but reads may happen
/// in parallel.
pub trait HostWorld: Send + Sync {
    /// Instance-local data, or `None` when the handle no longer resolves.
    fn instance(&self, id: InstanceId) -> Option<CharacterInstance>;

    /// Template record snapshot, including the current effective bounds.
    fn template(&self, id: TemplateId) -> Option<CharacterTemplate>;

    fn cell(&self, id: CellId) -> Option<Cell>;

    fn zone(&self, id: ZoneId) -> Option<Zone>;

    /// Authoritative engine-level zone lookup for an instance. Handles
    /// special-case geometry; takes priority over placement and cell data.
    fn zone_hint(&self, id: InstanceId) -> Option<ZoneId>;

    /// The instance's current simulated level (player-scaled templates
    /// derive it from the player level and the effective bounds).
    fn instance_level(&self, id: InstanceId) -> Option<u16>;

    fn current_health(&self, id: InstanceId) -> Option<f32>;

    /// Rewrite a template's effective level bounds.
    fn set_template_bounds(&self, id: TemplateId, min: u16, max: u16);

    /// Every template flagged for player scaling; used for the
    /// session-start scan that seeds the original-bounds table.
    fn player_scaled_templates(&self) -> Vec<TemplateId>;

    /// Apply recomputed attribute and skill values to an instance.
    fn apply_stats(&self, id: InstanceId, stats: &StatBlock);

    /// Invoke the host's own level-recalculation command for one instance.
    /// Side-effect-prone (may touch inventory state); used only when
    /// configured.
    fn trigger_native_recalc(&self, id: InstanceId);
}
