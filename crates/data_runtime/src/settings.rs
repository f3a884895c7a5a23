//! Engine options loaded from a TOML file with sensible defaults.
//!
//! The file is read once at startup and re-persisted with defaults filled
//! in, so users always see the full option set. Values are normalized on
//! load; a malformed range is corrected with a warning, never a hard error.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// How the deferred stat pass recomputes attributes after a relevel.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatRecalcMode {
    /// Leave attributes alone.
    Off,
    /// Re-derive attribute and skill values with the built-in formula.
    Emulate,
    /// Trigger the host's own level-recalculation command (slower, may
    /// duplicate inventory state).
    #[default]
    Native,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 0 has the most data, 6 turns logging off. See [`Settings::level_filter`].
    pub log_level: u8,
    /// Whether unique characters are releveled to the zone range.
    pub relevel_uniques: bool,
    /// Whether summons are releveled. Summons move between zones with the
    /// player, so releveling makes their power location-dependent.
    pub relevel_summons: bool,
    /// Whether followers are releveled; same caveat as summons.
    pub relevel_followers: bool,
    /// Evaluate a summon's eligibility against its commanding owner.
    pub treat_summons_like_owner: bool,
    /// Apply the template's player-level multiplier to the zone bounds.
    pub include_level_mult: bool,
    /// Allow bounds beyond the template's authored range.
    pub extend_levels: bool,
    /// Skip characters outside any zone instead of using the defaults below.
    pub no_zone_skip: bool,
    pub no_zone_min: u16,
    /// Zero means no maximum level.
    pub no_zone_max: u16,
    /// Invert the origin filter: only matching templates are releveled
    /// instead of all but the matching ones.
    pub origin_filter_invert: bool,
    /// Templates whose master (first) origin is listed here are filtered.
    pub origin_filter_master: Vec<String>,
    /// Templates touched by any listed origin are filtered.
    pub origin_filter_any: Vec<String>,
    /// Templates whose winning (last) origin is listed here are filtered.
    pub origin_filter_winning: Vec<String>,
    pub stat_recalc: StatRecalcMode,
    /// Skip the stat pass when the recomputed health already matches.
    pub smart_skip: bool,
    /// Restore every tracked template and suspend rebalancing, so the mod
    /// can be removed from a save.
    pub manual_uninstall: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: 2,
            relevel_uniques: true,
            relevel_summons: true,
            relevel_followers: false,
            treat_summons_like_owner: true,
            include_level_mult: true,
            extend_levels: false,
            no_zone_skip: true,
            no_zone_min: 1,
            no_zone_max: 1000,
            origin_filter_invert: false,
            origin_filter_master: Vec::new(),
            origin_filter_any: Vec::new(),
            origin_filter_winning: Vec::new(),
            stat_recalc: StatRecalcMode::Native,
            smart_skip: true,
            manual_uninstall: false,
        }
    }
}

fn normalize(mut s: Settings) -> Settings {
    if s.log_level > 6 {
        log::warn!("log_level {} out of range, using 6 (off)", s.log_level);
        s.log_level = 6;
    }
    if s.no_zone_min < 1 {
        s.no_zone_min = 1;
    }
    if s.no_zone_max != 0 && s.no_zone_min > s.no_zone_max {
        log::warn!(
            "no_zone_min ({}) > no_zone_max ({}), raising no_zone_max",
            s.no_zone_min,
            s.no_zone_max
        );
        s.no_zone_max = s.no_zone_min;
    }
    s
}

impl Settings {
    /// Load settings from `path`, falling back to defaults when the file is
    /// missing, then re-persist the normalized result so every option is
    /// visible to the user.
    pub fn load(path: impl AsRef<Path>) -> Result<Settings> {
        let path = path.as_ref();
        let settings = if path.is_file() {
            let txt = std::fs::read_to_string(path)
                .with_context(|| format!("read settings: {}", path.display()))?;
            normalize(toml::from_str::<Settings>(&txt).context("parse settings TOML")?)
        } else {
            Settings::default()
        };
        settings.save(path)?;
        Ok(settings)
    }

    /// Write the full option set to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let txt = toml::to_string_pretty(self).context("serialize settings TOML")?;
        std::fs::write(path, txt)
            .with_context(|| format!("write settings: {}", path.display()))?;
        Ok(())
    }

    /// Whether any origin list is populated.
    pub fn origin_filter_active(&self) -> bool {
        !(self.origin_filter_master.is_empty()
            && self.origin_filter_any.is_empty()
            && self.origin_filter_winning.is_empty())
    }

    /// Map the 0..=6 verbosity to a `log` threshold. 5 ("critical") has no
    /// `log` counterpart and maps to `Error`.
    pub fn level_filter(&self) -> log::LevelFilter {
        match self.log_level {
            0 => log::LevelFilter::Trace,
            1 => log::LevelFilter::Debug,
            2 => log::LevelFilter::Info,
            3 => log::LevelFilter::Warn,
            4 | 5 => log::LevelFilter::Error,
            _ => log::LevelFilter::Off,
        }
    }
}
