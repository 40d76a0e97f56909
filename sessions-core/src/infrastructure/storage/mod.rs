pub mod memory;
pub mod rocks;
pub mod traits;
pub mod union;

pub use memory::MemoryTracker;
pub use rocks::RocksTracker;
pub use traits::*;
pub use union::UnionTracker;
