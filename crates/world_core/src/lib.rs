//! world_core: character/zone data model shared by the releveling engine
//! and its hosts.
//!
//! Scope
//! - Id newtypes for templates, instances, cells and zones.
//! - Plain data structs for templates, instances and zones; the engine only
//!   ever mutates a template's effective level bounds through [`HostWorld`].
//! - [`World`], an in-memory reference host used by tests and by embedders
//!   that simulate the host process.

pub mod host;
pub mod instance;
pub mod template;
pub mod world;
pub mod zone;

pub use host::{Cell, HostWorld, StatBlock};
pub use instance::CharacterInstance;
pub use template::{AttributeSet, CharacterTemplate, GrowthWeights, SKILL_COUNT};
pub use world::World;
pub use zone::{Zone, ZoneId};

/// Stable identity of a character template within one load session.
///
/// Ids at or above [`TemplateId::RUNTIME_ID_START`] denote templates created
/// at runtime; their numeric value is recycled across load cycles and must
/// not be trusted across a load boundary.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(pub u32);

impl TemplateId {
    pub const RUNTIME_ID_START: u32 = 0xFF00_0000;

    #[inline]
    pub fn is_runtime(self) -> bool {
        self.0 >= Self::RUNTIME_ID_START
    }
}

/// Handle to a placed character instance. Resolving a stale handle through
/// the host yields `None`; holders must re-resolve rather than cache.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InstanceId(pub u32);

/// Identity of a spatial cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CellId(pub u32);
