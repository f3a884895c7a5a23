//! data_runtime: configuration and data schemas/loaders.
//!
//! Everything here is loaded once at startup and handed read-only to the
//! engine: the option set ([`Settings`]), the auto-calc tuning constants
//! ([`GrowthRules`]) and the race growth data ([`RaceTable`]).

pub mod growth;
pub mod races;
pub mod settings;

pub use growth::GrowthRules;
pub use races::{RaceSpec, RaceTable, SkillBoost};
pub use settings::{Settings, StatRecalcMode};
