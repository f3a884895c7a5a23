//! Race growth data: base attribute values and skill boosts, one JSON spec
//! per race, indexed into an in-memory table.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// A racial bonus for one skill. `skill` is a host actor-value index; the
/// engine maps it onto the skill array and rejects out-of-range values.
#[derive(Copy, Clone, Debug, Deserialize)]
pub struct SkillBoost {
    pub skill: i32,
    pub value: f32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RaceSpec {
    pub id: String,
    pub base_health: f32,
    pub base_magicka: f32,
    pub base_stamina: f32,
    #[serde(default)]
    pub skill_boosts: Vec<SkillBoost>,
}

/// In-memory index of race specs keyed by id.
#[derive(Default)]
pub struct RaceTable {
    races: HashMap<String, RaceSpec>,
}

impl RaceTable {
    pub fn insert(&mut self, spec: RaceSpec) {
        self.races.insert(spec.id.clone(), spec);
    }

    pub fn get(&self, id: &str) -> Option<&RaceSpec> {
        self.races.get(id)
    }

    pub fn len(&self) -> usize {
        self.races.len()
    }

    pub fn is_empty(&self) -> bool {
        self.races.is_empty()
    }

    /// Load every `*.json` race spec under `dir`. Missing directory yields
    /// an empty table; a malformed file is an error.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<RaceTable> {
        let dir = dir.as_ref();
        let mut table = RaceTable::default();
        if !dir.is_dir() {
            return Ok(table);
        }
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("read races dir: {}", dir.display()))?
        {
            let path = entry.context("read races dir entry")?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let txt = std::fs::read_to_string(&path)
                .with_context(|| format!("read race spec: {}", path.display()))?;
            let spec: RaceSpec = serde_json::from_str(&txt)
                .with_context(|| format!("parse race spec: {}", path.display()))?;
            table.insert(spec);
        }
        Ok(table)
    }
}
