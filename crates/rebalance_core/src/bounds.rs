//! Level-bound computation.
//!
//! Pure policy: map a requested zone range onto a template's pristine range.
//! Two different zero sentinels meet here and must not be confused: a
//! minimum of 0 is invalid and floors at 1, while a maximum of 0 means "no
//! upper bound".

use data_runtime::Settings;
use world_core::Zone;

use crate::store::OriginalBounds;

/// Requested level range for an instance: the zone's levels when one
/// applies, the configured no-zone defaults otherwise.
pub fn requested_range(zone: Option<&Zone>, settings: &Settings) -> (u16, u16) {
    let (mut min, mut max) = match zone {
        Some(z) => (z.min_level, z.max_level),
        None => (settings.no_zone_min, settings.no_zone_max),
    };
    if min < 1 {
        min = 1;
    }
    if max < 1 {
        max = 0;
    }
    (min, max)
}

/// Derive new effective bounds from a requested range, the template's
/// pristine range and policy.
///
/// `template_level` is the template's static authored level; for
/// player-scaled templates it is a per-mille multiplier, which is why the
/// scaling factor is `level * 0.001`.
pub fn compute_bounds(
    requested_min: u16,
    requested_max: u16,
    original: OriginalBounds,
    template_level: u16,
    settings: &Settings,
) -> (u16, u16) {
    let mut requested_max = requested_max;
    if requested_min > requested_max && requested_max != 0 {
        log::warn!(
            "requested min ({requested_min}) > max ({requested_max}), raising max to min"
        );
        requested_max = requested_min;
    }

    let original_min = original.min;
    let mut original_max = original.max;
    if original_min > original_max && original_max != 0 {
        log::warn!(
            "original min ({original_min}) > max ({original_max}), raising max to min"
        );
        original_max = original_min;
    }

    let mut min_tmp = f32::from(requested_min);
    let mut max_tmp = f32::from(requested_max);

    if settings.include_level_mult {
        let factor = f32::from(template_level) * 0.001;
        min_tmp *= factor;
        max_tmp *= factor;
    }

    if !settings.extend_levels {
        let omin = f32::from(original_min);
        let omax = f32::from(original_max);
        if original_max == 0 {
            // originally unbounded above: only the minimum constrains
            min_tmp = min_tmp.max(omin);
            max_tmp = if requested_max == 0 {
                0.0
            } else {
                max_tmp.max(omin)
            };
        } else {
            min_tmp = min_tmp.max(omin).min(omax);
            max_tmp = if requested_max == 0 {
                // as high as possible, which is the original maximum
                omax
            } else {
                max_tmp.max(omin).min(omax)
            };
        }
    }

    // truncate; a minimum never drops below 1, a maximum at or below zero
    // collapses to the unbounded sentinel
    let new_min = (min_tmp as i64).clamp(1, i64::from(u16::MAX)) as u16;
    let max_trunc = max_tmp as i64;
    let mut new_max = if max_trunc <= 0 {
        0
    } else {
        max_trunc.min(i64::from(u16::MAX)) as u16
    };
    if new_max != 0 && new_min > new_max {
        new_max = new_min;
    }
    (new_min, new_max)
}
