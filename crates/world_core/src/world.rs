//! In-memory reference host.
//!
//! Owns template/instance/cell/zone tables behind one interior lock so
//! notification producers on worker threads and the simulation thread can
//! share it. Real hosts implement [`HostWorld`] over their own storage.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::host::{Cell, HostWorld, StatBlock};
use crate::{
    CellId, CharacterInstance, CharacterTemplate, InstanceId, TemplateId, Zone, ZoneId,
};

#[derive(Default)]
struct WorldState {
    player_level: u16,
    templates: HashMap<TemplateId, CharacterTemplate>,
    instances: HashMap<InstanceId, CharacterInstance>,
    cells: HashMap<CellId, Cell>,
    zones: HashMap<ZoneId, Zone>,
    zone_hints: HashMap<InstanceId, ZoneId>,
    health: HashMap<InstanceId, f32>,
    applied_stats: HashMap<InstanceId, StatBlock>,
    native_recalcs: Vec<InstanceId>,
    next_instance: u32,
}

pub struct World {
    state: RwLock<WorldState>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(WorldState {
                player_level: 1,
                ..WorldState::default()
            }),
        }
    }

    // A poisoned lock only means some worker panicked mid-read; the tables
    // themselves stay consistent, so recover the guard.
    fn read(&self) -> RwLockReadGuard<'_, WorldState> {
        self.state.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, WorldState> {
        self.state.write().unwrap_or_else(|p| p.into_inner())
    }

    pub fn set_player_level(&self, level: u16) {
        self.write().player_level = level;
    }

    pub fn add_zone(&self, zone: Zone) {
        self.write().zones.insert(zone.id, zone);
    }

    pub fn add_cell(&self, id: CellId, zone: Option<ZoneId>, loaded: bool) {
        self.write().cells.insert(id, Cell { zone, loaded });
    }

    pub fn set_cell_loaded(&self, id: CellId, loaded: bool) {
        if let Some(cell) = self.write().cells.get_mut(&id) {
            cell.loaded = loaded;
        }
    }

    pub fn add_template(&self, template: CharacterTemplate) {
        self.write().templates.insert(template.id, template);
    }

    pub fn remove_template(&self, id: TemplateId) {
        self.write().templates.remove(&id);
    }

    /// Place a new instance of `template` and return its handle.
    pub fn spawn(&self, template: TemplateId, cell: Option<CellId>) -> InstanceId {
        let mut s = self.write();
        let id = InstanceId(s.next_instance);
        s.next_instance = s.next_instance.wrapping_add(1);
        s.instances
            .insert(id, CharacterInstance::new(id, template, cell));
        id
    }

    pub fn despawn(&self, id: InstanceId) {
        let mut s = self.write();
        s.instances.remove(&id);
        s.zone_hints.remove(&id);
        s.health.remove(&id);
    }

    pub fn move_to_cell(&self, id: InstanceId, cell: Option<CellId>) {
        if let Some(inst) = self.write().instances.get_mut(&id) {
            inst.cell = cell;
        }
    }

    pub fn set_commanding_owner(&self, id: InstanceId, owner: Option<InstanceId>) {
        if let Some(inst) = self.write().instances.get_mut(&id) {
            inst.commanding_owner = owner;
        }
    }

    pub fn set_player_teammate(&self, id: InstanceId, teammate: bool) {
        if let Some(inst) = self.write().instances.get_mut(&id) {
            inst.is_player_teammate = teammate;
        }
    }

    pub fn set_placed_zone(&self, id: InstanceId, zone: Option<ZoneId>) {
        if let Some(inst) = self.write().instances.get_mut(&id) {
            inst.placed_zone = zone;
        }
    }

    /// Register an authoritative zone lookup result for an instance.
    pub fn set_zone_hint(&self, id: InstanceId, zone: Option<ZoneId>) {
        let mut s = self.write();
        match zone {
            Some(z) => {
                s.zone_hints.insert(id, z);
            }
            None => {
                s.zone_hints.remove(&id);
            }
        }
    }

    pub fn set_health(&self, id: InstanceId, health: f32) {
        self.write().health.insert(id, health);
    }

    /// Last stat block applied to `id`, if any.
    pub fn applied_stats(&self, id: InstanceId) -> Option<StatBlock> {
        self.read().applied_stats.get(&id).cloned()
    }

    /// Instances the host's native recalculation was triggered for, in order.
    pub fn native_recalcs(&self) -> Vec<InstanceId> {
        self.read().native_recalcs.clone()
    }

    pub fn template_bounds(&self, id: TemplateId) -> Option<(u16, u16)> {
        self.read()
            .templates
            .get(&id)
            .map(|t| (t.calc_level_min, t.calc_level_max))
    }
}

impl HostWorld for World {
    fn instance(&self, id: InstanceId) -> Option<CharacterInstance> {
        self.read().instances.get(&id).cloned()
    }

    fn template(&self, id: TemplateId) -> Option<CharacterTemplate> {
        self.read().templates.get(&id).cloned()
    }

    fn cell(&self, id: CellId) -> Option<Cell> {
        self.read().cells.get(&id).copied()
    }

    fn zone(&self, id: ZoneId) -> Option<Zone> {
        self.read().zones.get(&id).copied()
    }

    fn zone_hint(&self, id: InstanceId) -> Option<ZoneId> {
        self.read().zone_hints.get(&id).copied()
    }

    fn instance_level(&self, id: InstanceId) -> Option<u16> {
        let s = self.read();
        let inst = s.instances.get(&id)?;
        let tpl = s.templates.get(&inst.template)?;
        if !tpl.uses_player_scaling {
            return Some(tpl.level.max(1));
        }
        // Per-mille multiplier against the player level, clamped into the
        // template's effective bounds.
        let scaled = (f32::from(s.player_level) * f32::from(tpl.level) * 0.001).max(1.0) as u16;
        let min = tpl.calc_level_min.max(1);
        let max = if tpl.calc_level_max == 0 {
            u16::MAX
        } else {
            tpl.calc_level_max.max(min)
        };
        Some(scaled.clamp(min, max))
    }

    fn current_health(&self, id: InstanceId) -> Option<f32> {
        self.read().health.get(&id).copied()
    }

    fn set_template_bounds(&self, id: TemplateId, min: u16, max: u16) {
        if let Some(tpl) = self.write().templates.get_mut(&id) {
            tpl.calc_level_min = min;
            tpl.calc_level_max = max;
        }
    }

    fn player_scaled_templates(&self) -> Vec<TemplateId> {
        self.read()
            .templates
            .values()
            .filter(|t| t.uses_player_scaling)
            .map(|t| t.id)
            .collect()
    }

    fn apply_stats(&self, id: InstanceId, stats: &StatBlock) {
        let mut s = self.write();
        s.health.insert(id, stats.attributes.health);
        s.applied_stats.insert(id, stats.clone());
    }

    fn trigger_native_recalc(&self, id: InstanceId) {
        self.write().native_recalcs.push(id);
    }
}
