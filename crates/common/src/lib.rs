//! Shared value types used across the liftsim workspace.

mod types;

pub use types::{Bounds, Rgb, Transform};
