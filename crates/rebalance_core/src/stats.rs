//! Re-derivation of the host's attribute and skill auto-calc formula.
//!
//! The skill side reproduces the host engine's observed behavior, including
//! the overflow handling at the skill cap. The cap correction in
//! [`recalc_skills`] is an empirical approximation of an undocumented
//! redistribution quirk; divergence from the true host formula near the cap
//! is accepted error, not something to normalize away.

use data_runtime::{GrowthRules, RaceSpec};
use world_core::{AttributeSet, GrowthWeights, SKILL_COUNT, StatBlock};

/// Host actor-value index of the first skill; racial boost indices are
/// offset by this much relative to the skill array.
pub const SKILL_INDEX_OFFSET: i32 = 6;

/// The cap-overflow correction never exceeds this many units per skill.
const MAX_CAP_CORRECTION: f32 = 3.0;
/// Pool points deducted per unit of cap correction.
const POINTS_PER_CORRECTION: i32 = 4;

/// Distribute attribute growth for `level` and produce final values.
///
/// Growth points are handed out in descending weight order (ties keep the
/// fixed health/magicka/stamina order): each attribute takes
/// `floor(remaining * weight / remaining_weight)` and both pools shrink, so
/// the last ranked attribute absorbs the remainder and the total is
/// conserved exactly.
pub fn recalc_attributes(
    level: u16,
    weights: &AttributeSet,
    race: &RaceSpec,
    offsets: &AttributeSet,
    rules: &GrowthRules,
) -> AttributeSet {
    let total = (rules.attribute_points_per_level * f32::from(level.saturating_sub(1))) as i32;
    let w = [weights.health, weights.magicka, weights.stamina];

    let mut order = [0usize, 1, 2];
    // stable sort: equal weights stay in index order
    order.sort_by(|&a, &b| w[b].partial_cmp(&w[a]).unwrap_or(std::cmp::Ordering::Equal));
    let ranked: Vec<usize> = order.into_iter().filter(|&i| w[i] > 0.0).collect();

    let mut alloc = [0i32; 3];
    let mut remaining = total.max(0);
    let mut remaining_weight: f32 = ranked.iter().map(|&i| w[i]).sum();
    for (pos, &i) in ranked.iter().enumerate() {
        let share = if pos + 1 == ranked.len() {
            remaining
        } else {
            ((remaining as f32) * w[i] / remaining_weight).floor() as i32
        };
        alloc[i] = share;
        remaining -= share;
        remaining_weight -= w[i];
    }

    let health = alloc[0] as f32
        + offsets.health
        + race.base_health
        + rules.health_level_bonus * f32::from(level.saturating_sub(1));
    let magicka = alloc[1] as f32 + offsets.magicka + race.base_magicka;
    let stamina = alloc[2] as f32 + offsets.stamina + race.base_stamina;
    AttributeSet::new(health.max(0.0), magicka.max(0.0), stamina.max(0.0))
}

/// Distribute skill growth for `level` and produce final values.
///
/// Every skill starts at the base value plus its racial boost, then the
/// level's growth pool is split proportionally to weight, floored, and
/// clamped at the cap. Skills saturated by the floored allocation charge the
/// empirical cap correction against the pool; whatever is left is handed out
/// one point at a time by largest retained fraction, then lowest current
/// value, then highest index.
pub fn recalc_skills(
    level: u16,
    weights: &[f32; SKILL_COUNT],
    race: &RaceSpec,
    rules: &GrowthRules,
) -> [f32; SKILL_COUNT] {
    let mut skills = [rules.skill_base_value; SKILL_COUNT];
    for boost in &race.skill_boosts {
        let idx = boost.skill - SKILL_INDEX_OFFSET;
        if !(0..SKILL_COUNT as i32).contains(&idx) {
            log::warn!(
                "racial skill boost index {} (race {}) out of range, ignoring",
                boost.skill,
                race.id
            );
            continue;
        }
        skills[idx as usize] += boost.value;
    }

    let weight_sum: f32 = weights.iter().filter(|w| **w > 0.0).sum();
    let total = (rules.skills_per_level_up * f32::from(level.saturating_sub(1))) as i32;
    if weight_sum <= 0.0 || total <= 0 {
        return skills;
    }

    let cap = rules.skill_cap;
    let mut fracs = [0.0f32; SKILL_COUNT];
    let mut pool = total;
    for i in 0..SKILL_COUNT {
        let weight = weights[i];
        if weight <= 0.0 {
            continue; // zero-weight skills never grow
        }
        let headroom = cap - skills[i];
        if headroom <= 0.0 {
            continue; // at the cap from base + boost alone
        }
        let raw = total as f32 * weight / weight_sum;
        let whole = raw.floor();
        if whole >= headroom {
            // the floored allocation saturates the cap; charge the points
            // that fit, then the empirical compensation for the lost ones
            let applied = headroom.floor();
            skills[i] = cap;
            pool -= applied as i32;
            let overflow = raw - applied;
            let per_point = weight / weight_sum;
            let units = (overflow / per_point).round().clamp(0.0, MAX_CAP_CORRECTION);
            pool -= POINTS_PER_CORRECTION * units as i32;
        } else {
            skills[i] += whole;
            pool -= whole as i32;
            fracs[i] = raw - whole; // retained while below the cap
        }
    }

    // leftover points go out one at a time: largest retained fraction, then
    // lowest current value, then highest index; a consumed fraction is spent
    while pool > 0 {
        let mut best: Option<usize> = None;
        for i in 0..SKILL_COUNT {
            if weights[i] <= 0.0 || skills[i] >= cap {
                continue;
            }
            match best {
                None => best = Some(i),
                Some(b) => {
                    let better = fracs[i] > fracs[b]
                        || (fracs[i] == fracs[b]
                            && (skills[i] < skills[b]
                                || (skills[i] == skills[b] && i > b)));
                    if better {
                        best = Some(i);
                    }
                }
            }
        }
        let Some(i) = best else {
            break; // nothing below the cap; the rest of the pool is lost
        };
        skills[i] = (skills[i] + 1.0).min(cap);
        fracs[i] = 0.0;
        pool -= 1;
    }

    skills
}

/// Full stat block for one instance at `level`.
pub fn recalc_stat_block(
    level: u16,
    growth: &GrowthWeights,
    race: &RaceSpec,
    offsets: &AttributeSet,
    rules: &GrowthRules,
) -> StatBlock {
    StatBlock {
        attributes: recalc_attributes(level, &growth.attributes, race, offsets, rules),
        skills: recalc_skills(level, &growth.skills, race, rules),
    }
}
