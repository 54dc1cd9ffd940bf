//! Colony saves

pub mod snapshot;
pub mod store;

pub use snapshot::{ColonySnapshot, SCHEMA_VERSION};
pub use store::{JsonSaveStore, MemorySaveStore, SaveStore};
