//! Infrastructure layer - clock and local key-value persistence.

pub mod clock;
pub mod memory_kv;

pub use clock::{Clock, ManualClock, SystemClock};
pub use memory_kv::MemoryKv;
