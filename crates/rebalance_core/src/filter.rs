//! Eligibility predicates over an instance, its template and the settings.
//!
//! Two stages, matching how cheap the checks are: [`static_filter`] is
//! origin/template-only and callers bail without side effects when it fails;
//! [`filter`] covers transient membership (summon, teammate) and a failure
//! there means a previously releveled template must be restored.

use data_runtime::Settings;
use world_core::{CharacterInstance, CharacterTemplate, HostWorld};

/// Owner chains longer than this are treated as cyclic host data.
const OWNER_CHAIN_LIMIT: u32 = 8;

/// Origin-independent gate: only player-scaled templates are ever touched,
/// and the optional origin filter can exclude (or exclusively include)
/// templates by data source.
pub fn static_filter(template: &CharacterTemplate, settings: &Settings) -> bool {
    if !template.uses_player_scaling {
        return false;
    }
    origin_filter(template, settings)
}

fn origin_filter(template: &CharacterTemplate, settings: &Settings) -> bool {
    if !settings.origin_filter_active() {
        return true;
    }
    let Some(master) = template.origin_files.first() else {
        log::warn!(
            "cannot find data sources for template {:?}; origin filter may not work as expected",
            template.id
        );
        return true;
    };
    // first entry is the master origin, last the winning override
    let winning = template.origin_files.last().unwrap_or(master);
    let matches = settings.origin_filter_master.iter().any(|f| f == master)
        || settings.origin_filter_winning.iter().any(|f| f == winning)
        || template
            .origin_files
            .iter()
            .any(|f| settings.origin_filter_any.contains(f));
    if settings.origin_filter_invert {
        matches
    } else {
        !matches
    }
}

/// Membership-sensitive eligibility. Re-evaluated on every event because
/// summon and teammate state are transient.
pub fn filter(
    host: &dyn HostWorld,
    instance: &CharacterInstance,
    template: &CharacterTemplate,
    settings: &Settings,
) -> bool {
    filter_at(host, instance, template, settings, 0)
}

fn filter_at(
    host: &dyn HostWorld,
    instance: &CharacterInstance,
    template: &CharacterTemplate,
    settings: &Settings,
    depth: u32,
) -> bool {
    if !settings.relevel_uniques && template.is_unique {
        return false;
    }
    // Only owned characters that are their own summonable form count as
    // summons; an owned non-summonable form is likely reanimated and regular
    // instances of the same template would conflict if treated differently.
    if let Some(owner_id) = instance.commanding_owner
        && template.is_summonable
    {
        if !settings.relevel_summons {
            return false;
        }
        if settings.treat_summons_like_owner {
            if depth >= OWNER_CHAIN_LIMIT {
                log::warn!(
                    "owner chain for instance {:?} exceeds {} links; treating as cyclic",
                    instance.id,
                    OWNER_CHAIN_LIMIT
                );
                return false;
            }
            // An owner that no longer resolves cannot veto the summon.
            if let Some(owner) = host.instance(owner_id)
                && let Some(owner_template) = host.template(owner.template)
                && !filter_at(host, &owner, &owner_template, settings, depth + 1)
            {
                return false;
            }
        }
    }
    if !settings.relevel_followers && instance.is_player_teammate {
        return false;
    }
    true
}
