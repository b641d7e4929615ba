//! Ports - seams for things the store does not own.

pub mod clock;

pub use self::clock::{Clock, ManualClock, SystemClock};
