// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Alexandre Severino
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

use log::warn;

/// Options controlling triangulation and refinement.
///
/// Angles are in degrees. Setters validate their input; an angle outside its
/// admissible range turns the corresponding quality criterion off and logs a
/// warning instead of failing.
#[derive(Debug, Clone)]
pub struct Behavior {
    /// Refine triangles that violate the angle or area bounds.
    pub quality: bool,
    min_angle: f64,
    max_angle: f64,
    /// Global area cap; zero or negative disables it.
    pub max_area: f64,
    /// Honour per-triangle area caps propagated from region seeds.
    pub var_area: bool,
    /// Keep the convex hull instead of carving away unprotected concavities.
    pub convex: bool,
    /// Mark hull vertices with boundary marker 1 when triangulating a bare
    /// point set.
    pub use_boundary_markers: bool,
    /// Ignore hole seeds.
    pub no_holes: bool,
    /// Spread region ids from region seeds.
    pub use_regions: bool,
    /// Budget for Steiner points; -1 means unlimited.
    pub steiner_points: i32,
    /// 0: segments may always be split, 1: boundary segments are never split,
    /// 2: no segment is ever split.
    pub no_bisect: u8,
    /// Skip the exact fallback of the geometric predicates.
    pub no_exact: bool,
    /// Drop vertices that are no longer part of the mesh from projections.
    pub jettison: bool,

    good_angle: f64,
    max_good_angle: f64,
    offconstant: f64,
}

impl Default for Behavior {
    fn default() -> Self {
        let mut b = Self {
            quality: false,
            min_angle: 20.0,
            max_angle: 0.0,
            max_area: -1.0,
            var_area: false,
            convex: false,
            use_boundary_markers: true,
            no_holes: false,
            use_regions: false,
            steiner_points: -1,
            no_bisect: 0,
            no_exact: false,
            jettison: true,
            good_angle: 0.0,
            max_good_angle: 0.0,
            offconstant: 0.0,
        };
        b.update();
        b
    }
}

impl Behavior {
    /// Quality meshing with the given minimum angle.
    pub fn with_quality(min_angle: f64) -> Self {
        let mut b = Self::default();
        b.quality = true;
        b.set_min_angle(min_angle);
        b
    }

    pub fn min_angle(&self) -> f64 {
        self.min_angle
    }

    pub fn max_angle(&self) -> f64 {
        self.max_angle
    }

    /// Minimum angle, valid in `[0, 60]`.
    pub fn set_min_angle(&mut self, degrees: f64) {
        self.min_angle = degrees;
        self.update();
    }

    /// Maximum angle, valid in `[90, 180]`; zero disables the bound.
    pub fn set_max_angle(&mut self, degrees: f64) {
        self.max_angle = degrees;
        self.update();
    }

    pub fn with_min_angle(mut self, degrees: f64) -> Self {
        self.set_min_angle(degrees);
        self
    }

    pub fn with_max_angle(mut self, degrees: f64) -> Self {
        self.set_max_angle(degrees);
        self
    }

    pub fn with_max_area(mut self, area: f64) -> Self {
        self.max_area = area;
        self
    }

    pub fn with_convex(mut self, convex: bool) -> Self {
        self.convex = convex;
        self
    }

    pub fn with_regions(mut self, use_regions: bool, var_area: bool) -> Self {
        self.use_regions = use_regions;
        self.var_area = var_area;
        self
    }

    pub fn with_steiner_points(mut self, budget: i32) -> Self {
        self.steiner_points = budget;
        self
    }

    pub fn with_no_bisect(mut self, level: u8) -> Self {
        self.no_bisect = level.min(2);
        self
    }

    pub fn with_no_exact(mut self, no_exact: bool) -> Self {
        self.no_exact = no_exact;
        self
    }

    pub fn fixed_area(&self) -> bool {
        self.max_area > 0.0
    }

    /// Squared cosine of the minimum angle.
    pub fn good_angle(&self) -> f64 {
        self.good_angle
    }

    /// Cosine of the maximum angle.
    pub fn max_good_angle(&self) -> f64 {
        self.max_good_angle
    }

    /// Distance factor for off-center Steiner points.
    pub fn offconstant(&self) -> f64 {
        self.offconstant
    }

    fn update(&mut self) {
        if !(0.0..=60.0).contains(&self.min_angle) {
            warn!(
                "Invalid minimum angle {}; the minimum angle bound is disabled",
                self.min_angle
            );
            self.min_angle = 0.0;
        }
        if self.max_angle != 0.0 && !(90.0..=180.0).contains(&self.max_angle) {
            warn!(
                "Invalid maximum angle {}; the maximum angle bound is disabled",
                self.max_angle
            );
            self.max_angle = 0.0;
        }

        let cos_min = self.min_angle.to_radians().cos();
        self.max_good_angle = self.max_angle.to_radians().cos();
        self.offconstant = if cos_min >= 1.0 {
            0.0
        } else {
            0.475 * ((1.0 + cos_min) / (1.0 - cos_min)).sqrt()
        };
        self.good_angle = cos_min * cos_min;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_angles_are_disabled() {
        let b = Behavior::with_quality(75.0).with_max_angle(45.0);
        assert!(b.quality);
        assert_eq!(b.min_angle(), 0.0);
        assert_eq!(b.max_angle(), 0.0);
        assert_eq!(b.offconstant(), 0.0);
    }

    #[test]
    fn derived_constants() {
        let b = Behavior::with_quality(30.0);
        let c = 30f64.to_radians().cos();
        assert!((b.good_angle() - c * c).abs() < 1e-15);
        assert!(b.offconstant() > 0.0);
    }
}
