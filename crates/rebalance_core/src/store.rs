//! Pristine-bounds bookkeeping across load cycles.
//!
//! Two tables keyed by template id: a persistent one for authored templates
//! (captured lazily, frozen for the session) and a volatile one for
//! runtime-created templates, whose numeric ids are recycled across load
//! cycles. A volatile record is only trusted while its generation matches
//! the current load cycle and the template still carries the bounds we last
//! wrote; anything else means the identity was recycled or someone else
//! touched the record, and the entry is dropped.

use std::collections::HashMap;

use world_core::{CharacterTemplate, HostWorld, TemplateId};

/// A template's level range as it was before any mutation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OriginalBounds {
    pub min: u16,
    pub max: u16,
}

#[derive(Copy, Clone, Debug)]
struct VolatileEntry {
    original: OriginalBounds,
    last_set_min: u16,
    last_set_max: u16,
    generation: u64,
}

#[derive(Default)]
pub struct BoundsStore {
    persistent: HashMap<TemplateId, OriginalBounds>,
    volatile: HashMap<TemplateId, VolatileEntry>,
    generation: u64,
}

impl BoundsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked persistent identities.
    pub fn tracked(&self) -> usize {
        self.persistent.len()
    }

    /// Fetch the pristine range for `template`, capturing it from the
    /// template's current state on first sight of the identity.
    pub fn original_bounds(&mut self, template: &CharacterTemplate) -> OriginalBounds {
        let current = OriginalBounds {
            min: template.calc_level_min,
            max: template.calc_level_max,
        };
        if template.id.is_runtime() {
            if let Some(entry) = self.volatile.get(&template.id) {
                if entry.generation == self.generation
                    && entry.last_set_min == template.calc_level_min
                    && entry.last_set_max == template.calc_level_max
                {
                    return entry.original;
                }
                // recycled identity or bounds changed behind our back
                self.volatile.remove(&template.id);
            }
            current
        } else {
            *self.persistent.entry(template.id).or_insert(current)
        }
    }

    /// Write new bounds through to the host, recording the volatile entry
    /// needed to recognize the identity later.
    pub fn set_bounds(
        &mut self,
        host: &dyn HostWorld,
        template: &CharacterTemplate,
        original: OriginalBounds,
        min: u16,
        max: u16,
    ) {
        if template.id.is_runtime() {
            self.volatile.insert(
                template.id,
                VolatileEntry {
                    original,
                    last_set_min: min,
                    last_set_max: max,
                    generation: self.generation,
                },
            );
        }
        host.set_template_bounds(template.id, min, max);
    }

    /// Put one template back to its recorded original, if any.
    pub fn restore_template(&mut self, host: &dyn HostWorld, id: TemplateId) {
        if let Some(original) = self.persistent.get(&id).copied() {
            let Some(current) = host.template(id) else {
                return;
            };
            if current.calc_level_min != original.min || current.calc_level_max != original.max {
                log::trace!(
                    "restoring template {:?} to level range {}-{}",
                    id,
                    original.min,
                    original.max
                );
                host.set_template_bounds(id, original.min, original.max);
            }
            return;
        }
        // runtime identity: only a still-valid record can be trusted
        if let Some(entry) = self.volatile.get(&id).copied() {
            let Some(current) = host.template(id) else {
                return;
            };
            if entry.generation == self.generation
                && entry.last_set_min == current.calc_level_min
                && entry.last_set_max == current.calc_level_max
            {
                host.set_template_bounds(id, entry.original.min, entry.original.max);
            }
            self.volatile.remove(&id);
        }
    }

    /// Restore every tracked persistent template. Returns how many actually
    /// changed.
    pub fn restore_all(&self, host: &dyn HostWorld) -> usize {
        let mut count = 0;
        let mut total = 0;
        for (&id, original) in &self.persistent {
            let Some(current) = host.template(id) else {
                continue;
            };
            total += 1;
            if current.calc_level_min != original.min || current.calc_level_max != original.max {
                host.set_template_bounds(id, original.min, original.max);
                count += 1;
            }
        }
        log::debug!("reset level data for {count} of {total} tracked templates");
        count
    }

    /// Seed the persistent table from every player-scaled template's
    /// current (assumed original) bounds. Returns how many were captured.
    pub fn capture_all(&mut self, host: &dyn HostWorld) -> usize {
        let mut count = 0;
        for id in host.player_scaled_templates() {
            let Some(template) = host.template(id) else {
                continue;
            };
            if template.id.is_runtime() {
                continue;
            }
            self.persistent.insert(
                id,
                OriginalBounds {
                    min: template.calc_level_min,
                    max: template.calc_level_max,
                },
            );
            count += 1;
        }
        log::debug!("initialized level data for {count} templates");
        count
    }

    /// A new load cycle begins: runtime identities are about to be recycled,
    /// so every volatile record is invalid from here on.
    pub fn begin_load_cycle(&mut self) {
        self.volatile.clear();
        self.generation = self.generation.wrapping_add(1);
    }
}
