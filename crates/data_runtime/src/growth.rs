//! Auto-calc tuning constants, loadable from TOML with host-convention
//! defaults.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Constants of the host's attribute/skill growth formula.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthRules {
    /// Attribute growth points granted per level above 1.
    pub attribute_points_per_level: f32,
    /// Skill growth points granted per level above 1.
    pub skills_per_level_up: f32,
    /// Starting value of every skill before racial boosts.
    pub skill_base_value: f32,
    /// Hard ceiling for computed skill values.
    pub skill_cap: f32,
    /// Extra health granted per level above 1, independent of weights.
    pub health_level_bonus: f32,
}

impl Default for GrowthRules {
    fn default() -> Self {
        Self {
            attribute_points_per_level: 10.0,
            skills_per_level_up: 5.0,
            skill_base_value: 15.0,
            skill_cap: 100.0,
            health_level_bonus: 5.0,
        }
    }
}

fn clamp(mut rules: GrowthRules) -> GrowthRules {
    if rules.skill_cap < rules.skill_base_value {
        log::warn!(
            "skill_cap ({}) below skill_base_value ({}), raising",
            rules.skill_cap,
            rules.skill_base_value
        );
        rules.skill_cap = rules.skill_base_value;
    }
    if rules.attribute_points_per_level < 0.0 {
        rules.attribute_points_per_level = 0.0;
    }
    if rules.skills_per_level_up < 0.0 {
        rules.skills_per_level_up = 0.0;
    }
    rules
}

/// Load growth rules from `path`, falling back to defaults when missing.
pub fn load_rules(path: impl AsRef<Path>) -> Result<GrowthRules> {
    let path = path.as_ref();
    if !path.is_file() {
        return Ok(GrowthRules::default());
    }
    let txt = std::fs::read_to_string(path)
        .with_context(|| format!("read growth rules: {}", path.display()))?;
    let parsed: GrowthRules = toml::from_str(&txt).context("parse growth rules TOML")?;
    Ok(clamp(parsed))
}
