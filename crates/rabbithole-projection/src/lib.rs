//! # rabbithole-projection
//!
//! Projects the full embedding history into 3D via centered PCA so the
//! sentence's drift through semantic space can be drawn as a trajectory.
//!
//! The projection is a pure function of the record sequence: it owns no
//! state, and it recomputes every coordinate from scratch on each call,
//! because the principal axes depend on the whole dataset: appending one
//! vector can move every prior point. That makes each run O(n) in the
//! history length (plus a small symmetric eigendecomposition); acceptable
//! for a single evolving sentence, and the first thing to revisit if this
//! ever grows past a few thousand records.

pub mod eigen;
pub mod pca;

pub use pca::{project, ProjectionError};
