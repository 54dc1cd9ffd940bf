pub mod deferred;
pub mod events;
pub mod hotspot;
pub mod insurance;
pub mod policy;
pub mod population;
pub mod task_broker;
pub mod threat;
pub mod tick;

pub use events::{ColonyEvent, EventSink, NullSink, RecordingSink, TracingSink};
pub use tick::SimulationEngine;
