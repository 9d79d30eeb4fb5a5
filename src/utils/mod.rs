//! Utility helpers: the generational registry arena and logging.

pub mod arena;
pub mod logging;

pub use arena::{Arena, SlotId};
