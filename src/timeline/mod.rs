//! Marker events and interval algebra for slicing a profile by phase.

pub mod events;
pub mod range;

pub use events::EventIndex;
pub use range::Range;
