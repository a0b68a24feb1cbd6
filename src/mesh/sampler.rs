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

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const RANDOM_SEED: u64 = 110503;

/// Empirical factor relating the triangle count to the sample size.
const SAMPLE_FACTOR: usize = 11;

/// Keeps a random sample of triangle ids used to seed point location.
///
/// The sample size grows with the cube root of the triangle count. Ids are
/// drawn from a snapshot of the live triangle keys; a snapshot is rebuilt when
/// a drawn key turns out to be dead or when the mesh has outgrown it.
#[derive(Debug, Clone)]
pub struct Sampler {
    rng: StdRng,
    samples: usize,
    triangle_count: usize,
    keys: Vec<usize>,
    stale: bool,
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler {
    pub fn new() -> Self {
        Self {
            rng: StdRng::seed_from_u64(RANDOM_SEED),
            samples: 1,
            triangle_count: 0,
            keys: Vec::new(),
            stale: true,
        }
    }

    pub fn reset(&mut self) {
        self.samples = 1;
        self.triangle_count = 0;
        self.keys.clear();
        self.stale = true;
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Recomputes the sample size when the triangle count has changed.
    pub fn update(&mut self, count: usize) {
        if self.triangle_count != count {
            self.triangle_count = count;
            while SAMPLE_FACTOR * self.samples * self.samples * self.samples < count {
                self.samples += 1;
            }
            if count > 2 * self.keys.len() {
                self.stale = true;
            }
        }
    }

    pub fn needs_snapshot(&self) -> bool {
        self.stale || self.keys.is_empty()
    }

    pub fn snapshot(&mut self, keys: Vec<usize>) {
        self.keys = keys;
        self.stale = false;
    }

    /// Forces a new snapshot before the next draw.
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    /// Draws `samples` keys, one from each of as many evenly sized slices of
    /// the snapshot.
    pub fn draw(&mut self) -> Vec<usize> {
        let n = self.keys.len();
        if n == 0 {
            return Vec::new();
        }
        let samples = self.samples.min(n);
        let range = n / samples;
        (0..samples)
            .map(|i| {
                let offset = if range > 1 { self.rng.random_range(0..range) } else { 0 };
                self.keys[(i * range + offset).min(n - 1)]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_size_follows_cube_root() {
        let mut s = Sampler::new();
        s.update(10);
        assert_eq!(s.samples(), 1);
        s.update(11 * 27);
        assert_eq!(s.samples(), 3);
        s.update(11 * 27 + 1);
        assert_eq!(s.samples(), 4);
    }

    #[test]
    fn draws_come_from_snapshot() {
        let mut s = Sampler::new();
        s.update(1000);
        s.snapshot((100..1100).collect());
        let drawn = s.draw();
        assert_eq!(drawn.len(), s.samples());
        assert!(drawn.iter().all(|k| (100..1100).contains(k)));
        assert!(!s.needs_snapshot());
        s.invalidate();
        assert!(s.needs_snapshot());
    }
}
