//! # Memory Management
//!
//! Arena and bitset primitives for zero-allocation gameplay.
//!
//! ## Design Philosophy
//!
//! All memory is reserved once at scene load. During gameplay:
//! - No heap allocations
//! - No per-object frees
//! - Predictable, flat latency

mod arena;
mod bitset;

pub use arena::{Arena, ArenaAllocator};
pub use bitset::{ActiveBits, BitSet};
