//! Zone resolution for a placed character instance.
//!
//! Priority chain, first valid match wins:
//! 1. the host's authoritative lookup (special-case geometry),
//! 2. the zone attached to the instance's placement data,
//! 3. the zone of the containing cell.
//!
//! The reserved explicit-no-zone id is identical to absence at every step;
//! the chain looks past it and ends after the cell.

use world_core::{CharacterInstance, HostWorld, Zone, ZoneId};

pub fn resolve_zone(host: &dyn HostWorld, instance: &CharacterInstance) -> Option<Zone> {
    if let Some(zone) = lookup(host, host.zone_hint(instance.id)) {
        log::trace!("zone {:?} found with lookup function", zone.id);
        return Some(zone);
    }
    if let Some(zone) = lookup(host, instance.placed_zone) {
        log::trace!("zone {:?} found in placement data", zone.id);
        return Some(zone);
    }
    let cell_zone = instance.cell.and_then(|c| host.cell(c)).and_then(|c| c.zone);
    if let Some(zone) = lookup(host, cell_zone) {
        log::trace!("zone {:?} found in cell data", zone.id);
        return Some(zone);
    }
    None
}

fn lookup(host: &dyn HostWorld, id: Option<ZoneId>) -> Option<Zone> {
    let id = id?;
    if id.is_explicit_none() {
        return None;
    }
    host.zone(id)
}
