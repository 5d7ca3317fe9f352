use std::fmt::{Debug, Display};

use num_traits::Float as NumFloat;

/// Marker trait for base floating-point types (`f32`, `f64`).
///
/// Bundles the numeric and utility bounds needed throughout hedgehog.
/// Only primitive float types implement this; [`crate::Active`] wraps an
/// `F: Float`, it never is one.
pub trait Float: NumFloat + Copy + Send + Sync + Default + Debug + Display + 'static {}

impl Float for f32 {}
impl Float for f64 {}
