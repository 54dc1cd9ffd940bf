//! Colony world state

pub mod state;

pub use state::WorldState;
