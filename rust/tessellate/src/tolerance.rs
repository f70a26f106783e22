// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The shared tolerance bundle.
//!
//! One distance tolerance and one angular tolerance drive every
//! model-facing threshold in the pipeline (coincidence tests, scan-order
//! ties, winding epsilons, the projection's "already canonical" check).
//! Derived squares and cosines are precomputed so hot predicates never
//! take square roots.

use crate::error::{Error, Result};

/// Distance and angular tolerances used throughout triangulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Two points closer than this are coincident.
    pub dist: f64,
    /// `dist * dist`, for squared-distance comparisons and area epsilons.
    pub dist_sq: f64,
    /// Two directions within this angle (radians) are parallel.
    pub angular: f64,
    /// `cos(angular)`, for dot-product comparisons.
    pub cos_angular: f64,
}

impl Tolerance {
    /// Creates a tolerance bundle. Both inputs must be strictly positive
    /// and finite.
    pub fn new(dist: f64, angular: f64) -> Result<Self> {
        if !(dist.is_finite() && dist > 0.0) {
            return Err(Error::InvalidTolerance(format!(
                "distance tolerance must be positive, got {dist}"
            )));
        }
        if !(angular.is_finite() && angular > 0.0) {
            return Err(Error::InvalidTolerance(format!(
                "angular tolerance must be positive, got {angular}"
            )));
        }
        Ok(Self {
            dist,
            dist_sq: dist * dist,
            angular,
            cos_angular: angular.cos(),
        })
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        // Infallible: both constants are positive.
        Self {
            dist: 1e-6,
            dist_sq: 1e-12,
            angular: 1e-6,
            cos_angular: (1e-6_f64).cos(),
        }
    }
}
