//! Linux command builders for the storage manager menus.
//!
//! Everything here produces [`reclaim_exec::CommandSpec`]s or
//! [`ActionPlan`]s; running them and asking questions is left to the caller.

pub mod analysis;
pub mod cleanup;
pub mod docker;
pub mod plan;
pub mod privilege;
pub mod shell;
pub mod space;
pub mod tools;
pub mod visualize;

pub use cleanup::CleanupTask;
pub use docker::DockerAction;
pub use plan::{script_of, ActionPlan};
pub use privilege::{is_root, Privileges};
pub use space::{current_usage_spec, free_space_bytes, SPACE_HOGS};
pub use tools::Tool;
