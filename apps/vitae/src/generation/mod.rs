// Derivation: role rules applied to the master store yield one immutable View.
// Pure functions only; nothing here touches the filesystem.

pub mod deriver;
pub mod selector;

pub use deriver::{derive, DeriveError, DeriveOptions};
