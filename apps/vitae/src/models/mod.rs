// Content model: master store entities, role rules, and the derived per-document view.
// Everything here is read-only after load.

pub mod content;
pub mod dates;
pub mod master;
pub mod role;
pub mod view;

pub use master::{MasterStore, SourceKey};
pub use role::{RoleConfig, RoleRegistry};
pub use view::{Audience, Length, SectionKind, View};
