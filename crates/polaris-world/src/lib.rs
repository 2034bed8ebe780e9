//! World content: chunk columns, the chunk grid, and the flat world provider.

pub mod chunk;
pub mod flat_generator;
pub mod grid;
pub mod location;
pub mod nibble;
pub mod provider;

pub use grid::{ChunkGrid, ChunkId};
pub use location::Location;
pub use provider::WorldProvider;
