// core/src/store/mod.rs

//! In-process implementations of the storage ports.

pub mod memory;

pub use memory::MemoryStore;
