//! Small helpers shared across the engine.

pub mod bit_pack;
pub mod name_hash;

pub use bit_pack::BitPackSet;
pub use name_hash::hash_name;
