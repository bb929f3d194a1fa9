//! High-level entry points that tie [`core`](crate::core) and [`engine`](crate::engine)
//! together into complete evaluations.

pub mod evaluate;
