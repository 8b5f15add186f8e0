//! Shell scripts executed inside the container to replicate the host user.

pub mod groups;
pub mod user;

pub use groups::{GroupReconciliationPlan, GroupRule, GROUPS_OF_INTEREST};
pub use user::{render_create_user_script, CREATE_USER_SCRIPT_PATH};
