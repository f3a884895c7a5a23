//! Event intake and orchestration.
//!
//! Notification producers may call [`RebalanceEngine::handle_event`] from
//! concurrent worker threads. Filter evaluation and zone resolution run on
//! snapshot data outside any lock; a single mutex guards the bounds store
//! and the lookup-and-mutate critical section. Stat recalculation is never
//! run inline: it lands in a queue the host drains once per simulation tick
//! via [`RebalanceEngine::run_stat_tasks`], after bound mutations are
//! visible.

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};

use data_runtime::{GrowthRules, RaceTable, Settings, StatRecalcMode};
use world_core::{HostWorld, InstanceId};

use crate::store::BoundsStore;
use crate::{bounds, filter, resolve, stats};

/// Notifications the host delivers about a character instance becoming
/// relevant.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HostEvent {
    /// The character reference finished loading into the world.
    Loaded(InstanceId),
    /// Script-side initialization of the character completed.
    Initialized(InstanceId),
    /// The character's containing cell was attached to the simulation.
    CellAttached(InstanceId),
    /// The character moved into an already-attached cell.
    MovedToAttachedCell(InstanceId),
}

impl HostEvent {
    fn instance(self) -> InstanceId {
        match self {
            HostEvent::Loaded(id)
            | HostEvent::Initialized(id)
            | HostEvent::CellAttached(id)
            | HostEvent::MovedToAttachedCell(id) => id,
        }
    }
}

#[derive(Default)]
struct StatQueue {
    order: VecDeque<InstanceId>,
    queued: HashSet<InstanceId>,
}

pub struct RebalanceEngine {
    settings: Settings,
    rules: GrowthRules,
    races: RaceTable,
    store: Mutex<BoundsStore>,
    tasks: Mutex<StatQueue>,
}

// A poisoned lock only means some worker panicked; the tables themselves
// stay consistent, so recover the guard.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|p| p.into_inner())
}

impl RebalanceEngine {
    pub fn new(settings: Settings, rules: GrowthRules, races: RaceTable) -> Self {
        Self {
            settings,
            rules,
            races,
            store: Mutex::new(BoundsStore::new()),
            tasks: Mutex::new(StatQueue::default()),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Route one host notification. All four kinds share the same path:
    /// membership is transient, so everything is re-evaluated per event.
    pub fn handle_event(&self, host: &dyn HostWorld, event: HostEvent) {
        self.process_instance(host, event.instance());
    }

    fn process_instance(&self, host: &dyn HostWorld, id: InstanceId) {
        let Some(instance) = host.instance(id) else {
            return;
        };
        // untyped or malformed instances are expected in a large world
        let Some(template) = host.template(instance.template) else {
            return;
        };
        if !filter::static_filter(&template, &self.settings) {
            return;
        }
        if !filter::filter(host, &instance, &template, &self.settings)
            || self.settings.manual_uninstall
        {
            // the instance may have been releveled before a membership
            // change; undo that
            lock(&self.store).restore_template(host, template.id);
            return;
        }
        // only characters in a loaded, simulated cell are relevant; a later
        // event retriggers the rest
        let Some(cell) = instance.cell.and_then(|c| host.cell(c)) else {
            return;
        };
        if !cell.loaded {
            return;
        }

        log::trace!("releveling instance {:?}", id);
        let zone = resolve::resolve_zone(host, &instance);
        if zone.is_none() {
            if self.settings.no_zone_skip {
                lock(&self.store).restore_template(host, template.id);
                log::trace!("no zone found, skipping instance {:?}", id);
                return;
            }
            log::trace!("no zone found, using the configured default range");
        }
        let (req_min, req_max) = bounds::requested_range(zone.as_ref(), &self.settings);

        {
            let mut store = lock(&self.store);
            // re-read the template inside the critical section: another
            // event may have moved its bounds since the snapshot, and the
            // original must be captured from the unmutated state
            let Some(template) = host.template(instance.template) else {
                return;
            };
            let original = store.original_bounds(&template);
            let (new_min, new_max) = bounds::compute_bounds(
                req_min,
                req_max,
                original,
                template.level,
                &self.settings,
            );
            store.set_bounds(host, &template, original, new_min, new_max);
            log::trace!(
                "releveled template {:?} from range {}-{} to {}-{}",
                template.id,
                original.min,
                original.max,
                new_min,
                new_max
            );
        }

        if self.settings.stat_recalc != StatRecalcMode::Off {
            self.queue_stat_task(id);
        }
    }

    fn queue_stat_task(&self, id: InstanceId) {
        let mut tasks = lock(&self.tasks);
        if tasks.queued.insert(id) {
            tasks.order.push_back(id);
        }
    }

    /// Number of stat recalculations waiting for the next tick.
    pub fn queued_stat_tasks(&self) -> usize {
        lock(&self.tasks).order.len()
    }

    /// Drain the deferred stat queue. The host calls this once per
    /// simulation tick on the main thread. Returns how many instances had
    /// stats applied or the native recalculation triggered.
    pub fn run_stat_tasks(&self, host: &dyn HostWorld) -> usize {
        let drained: Vec<InstanceId> = {
            let mut tasks = lock(&self.tasks);
            tasks.queued.clear();
            tasks.order.drain(..).collect()
        };
        let mut applied = 0;
        for id in drained {
            if self.recalc_instance(host, id) {
                applied += 1;
            }
        }
        applied
    }

    fn recalc_instance(&self, host: &dyn HostWorld, id: InstanceId) -> bool {
        // a vanished instance is the cancellation mechanism, not an error
        let Some(instance) = host.instance(id) else {
            return false;
        };
        match self.settings.stat_recalc {
            StatRecalcMode::Off => false,
            StatRecalcMode::Native => {
                host.trigger_native_recalc(id);
                true
            }
            StatRecalcMode::Emulate => {
                let Some(template) = host.template(instance.template) else {
                    return false;
                };
                let Some(growth) = template.growth.as_ref() else {
                    return false; // no class data on the record
                };
                let Some(race) = template.race.as_deref().and_then(|r| self.races.get(r)) else {
                    return false; // no race data on the record
                };
                let Some(level) = host.instance_level(id) else {
                    return false;
                };
                let block =
                    stats::recalc_stat_block(level, growth, race, &template.offsets, &self.rules);
                if self.settings.smart_skip
                    && host
                        .current_health(id)
                        .is_some_and(|h| h == block.attributes.health)
                {
                    log::trace!("stats for instance {id:?} already current, skipping");
                    return false;
                }
                host.apply_stats(id, &block);
                true
            }
        }
    }

    /// Session start, before any save loads: record the pristine bounds of
    /// every player-scaled template.
    pub fn on_data_init(&self, host: &dyn HostWorld) {
        lock(&self.store).capture_all(host);
    }

    /// A save is about to load: put every tracked template back, then
    /// distrust all volatile records. Runtime ids are recycled and will
    /// refer to different objects once the load finishes.
    pub fn on_pre_load(&self, host: &dyn HostWorld) {
        let mut store = lock(&self.store);
        store.restore_all(host);
        store.begin_load_cycle();
    }

    /// A save finished loading. Loaded data may carry rebalanced levels, so
    /// when the user asked for a manual uninstall they are restored again.
    pub fn on_post_load(&self, host: &dyn HostWorld) {
        if self.settings.manual_uninstall {
            lock(&self.store).restore_all(host);
            log::info!("template levels restored; the rebalancer can be removed now");
        }
    }

    /// The game is about to save: rebalanced bounds are session data and
    /// must not be baked into the save. The next event re-relevels.
    pub fn on_pre_save(&self, host: &dyn HostWorld) {
        lock(&self.store).restore_all(host);
    }
}
