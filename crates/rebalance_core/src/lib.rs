//! rebalance_core: zone-driven NPC level rebalancing.
//!
//! Rescales the effective level range of character templates so enemy
//! difficulty matches the zone an instance occupies, reversibly and across
//! save/load boundaries:
//! - [`filter`]: which instances may be touched at all
//! - [`resolve`]: which zone range applies to an instance
//! - [`bounds`]: pure mapping of (zone range, original range, policy) to new
//!   level bounds
//! - [`stats`]: re-derivation of the host's attribute/skill auto-calc
//! - [`store`]: pristine-bounds bookkeeping across load cycles
//! - [`engine`]: event intake and orchestration
//!
//! The host world is consumed through [`world_core::HostWorld`]; the engine
//! never owns characters, it only rewrites template level bounds and pushes
//! recomputed stats back through that seam.

pub mod bounds;
pub mod engine;
pub mod filter;
pub mod resolve;
pub mod stats;
pub mod store;

pub use engine::{HostEvent, RebalanceEngine};
pub use store::OriginalBounds;
