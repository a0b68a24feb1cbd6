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

use std::cmp::Ordering;
use std::ops::{Add, Mul, Sub};

use num_traits::Zero;
use rug::Rational;

/// Arbitrary-precision rational used when a floating-point predicate cannot
/// certify its own sign.
#[derive(Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Exact(pub Rational);

impl Exact {
    /// Every finite `f64` is a dyadic rational, so the conversion is exact.
    /// Non-finite input maps to zero.
    pub fn from_f64(v: f64) -> Self {
        Exact(Rational::from_f64(v).unwrap_or_default())
    }

    /// Returns -1, 0, or +1.
    pub fn sign(&self) -> i8 {
        match self.0.cmp0() {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }

    /// Nearest `f64` carrying the exact sign.
    ///
    /// Products of doubles can underflow below the smallest subnormal, so a
    /// nonzero value that rounds to zero is pushed out to `MIN_POSITIVE`.
    pub fn to_signed_f64(&self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        let approx = self.0.to_f64();
        if approx == 0.0 {
            f64::MIN_POSITIVE * self.sign() as f64
        } else {
            approx
        }
    }
}

impl<'a, 'b> Add<&'b Exact> for &'a Exact {
    type Output = Exact;

    fn add(self, rhs: &'b Exact) -> Exact {
        let mut result = self.0.clone();
        result += &rhs.0;
        Exact(result)
    }
}

// Required by `Zero`.
impl Add for Exact {
    type Output = Exact;
    fn add(self, rhs: Exact) -> Exact {
        &self + &rhs
    }
}

impl<'a, 'b> Sub<&'b Exact> for &'a Exact {
    type Output = Exact;

    fn sub(self, rhs: &'b Exact) -> Exact {
        let mut result = self.0.clone();
        result -= &rhs.0;
        Exact(result)
    }
}

impl<'a, 'b> Mul<&'b Exact> for &'a Exact {
    type Output = Exact;

    fn mul(self, rhs: &'b Exact) -> Exact {
        let mut result = self.0.clone();
        result *= &rhs.0;
        Exact(result)
    }
}

impl Zero for Exact {
    fn zero() -> Self {
        Exact(Rational::new())
    }

    fn is_zero(&self) -> bool {
        self.0.cmp0() == Ordering::Equal
    }
}
