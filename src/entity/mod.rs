pub mod actor;
pub mod needs;
pub mod skills;
pub mod tasks;
