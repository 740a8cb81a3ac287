mod delete;
mod get;
mod info;
mod keys;
mod set;

pub use delete::cmd_delete;
pub use get::cmd_get;
pub use info::cmd_info;
pub use keys::cmd_keys;
pub use set::cmd_set;
