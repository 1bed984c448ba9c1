//! Exhaustive feature pool generation for a square training window.
//!
//! For every kind, sizes are integer multiples of the kind's unit block that
//! fit the window, and positions are every top-left corner at which the
//! rectangle stays inside the window. A 24×24 window yields 162,336 features.
use super::{Feature, FeatureKind};

/// Rectangle sizes `(width, height)` available to `kind` in the window.
pub fn shapes_for(kind: FeatureKind, window: u32) -> impl Iterator<Item = (u32, u32)> {
    let (uw, uh) = kind.unit();
    (uw..=window)
        .step_by(uw as usize)
        .flat_map(move |w| (uh..=window).step_by(uh as usize).map(move |h| (w, h)))
}

/// Top-left positions at which a `width × height` rectangle fits the window.
pub fn locations_for(width: u32, height: u32, window: u32) -> impl Iterator<Item = (u32, u32)> {
    let max_x = window.saturating_sub(width);
    let max_y = window.saturating_sub(height);
    let fits = width <= window && height <= window;
    (0..=max_x)
        .filter(move |_| fits)
        .flat_map(move |x| (0..=max_y).map(move |y| (x, y)))
}

/// Every placement of a single `width × height` shape of `kind`.
pub fn create_features_with_shape(
    kind: FeatureKind,
    width: u32,
    height: u32,
    window: u32,
) -> Vec<Feature> {
    locations_for(width, height, window)
        .map(|(x, y)| Feature::new(kind, x, y, width, height))
        .collect()
}

/// Every size and placement of `kind`.
pub fn create_features_of_kind(kind: FeatureKind, window: u32) -> Vec<Feature> {
    shapes_for(kind, window)
        .flat_map(|(w, h)| {
            locations_for(w, h, window).map(move |(x, y)| Feature::new(kind, x, y, w, h))
        })
        .collect()
}

/// The full pool over all kinds, in [`FeatureKind::ALL`] order.
pub fn create_all_features(window: u32) -> Vec<Feature> {
    FeatureKind::ALL
        .iter()
        .flat_map(|&kind| create_features_of_kind(kind, window))
        .collect()
}
