pub mod countable;
pub mod in_memory;
pub mod memmap;
pub mod mmap_slice;
pub mod sample;
pub mod stats;
pub mod suffix_array;
pub mod tokens;
pub mod types;

pub use countable::NgramIndex;
pub use in_memory::InMemoryIndex;
pub use memmap::MemmapIndex;
pub use sample::{KneserNey, KneserNeyCache, Sample};
pub use types::*;
