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

use std::f64::consts::SQRT_2;

use crate::mesh::basic_types::Otri;

const QUEUE_COUNT: usize = 4096;

/// A triangle found to violate the quality bounds.
///
/// The corners are captured at enqueue time; by the time the triangle is
/// dequeued it may have been reshaped, which the refinement driver detects by
/// comparing them with the current corners.
#[derive(Debug, Clone, Copy)]
pub struct BadTriangle {
    pub tri: Otri,
    /// Squared length of the shortest edge.
    pub key: f64,
    pub org: usize,
    pub dest: usize,
    pub apex: usize,
    next: Option<usize>,
}

impl BadTriangle {
    pub fn new(tri: Otri, key: f64, org: usize, dest: usize, apex: usize) -> Self {
        Self {
            tri,
            key,
            org,
            dest,
            apex,
            next: None,
        }
    }
}

/// Bucketed priority queue of bad triangles.
///
/// Triangles are binned by the binary exponent of their key (half-exponent
/// resolution), shortest edges first. Within a bucket the order is FIFO.
#[derive(Debug, Clone)]
pub struct BadTriQueue {
    pool: Vec<BadTriangle>,
    free: Vec<usize>,
    front: Vec<Option<usize>>,
    tail: Vec<Option<usize>>,
    next_nonempty: Vec<Option<usize>>,
    first_nonempty: Option<usize>,
    count: usize,
}

impl Default for BadTriQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl BadTriQueue {
    pub fn new() -> Self {
        Self {
            pool: Vec::new(),
            free: Vec::new(),
            front: vec![None; QUEUE_COUNT],
            tail: vec![None; QUEUE_COUNT],
            next_nonempty: vec![None; QUEUE_COUNT],
            first_nonempty: None,
            count: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Bucket index for a squared edge length; 4095 is the highest priority.
    pub fn queue_number(key: f64) -> usize {
        if !(key > 0.0) {
            return QUEUE_COUNT - 1;
        }
        let (mut length, positive_exponent) = if key >= 1.0 { (key, true) } else { (1.0 / key, false) };

        // Approximate log2(length) by repeated squaring.
        let mut exponent: usize = 0;
        while length > 2.0 {
            let mut increment = 1;
            let mut multiplier = 0.5;
            while length * multiplier * multiplier > 1.0 {
                increment *= 2;
                multiplier *= multiplier;
            }
            exponent += increment;
            length *= multiplier;
        }
        let exponent = (2 * exponent + usize::from(length > SQRT_2)).min(2047);

        if positive_exponent { 2047 - exponent } else { 2048 + exponent }
    }

    pub fn enqueue(&mut self, mut bad: BadTriangle) {
        let q = Self::queue_number(bad.key);
        bad.next = None;
        let slot = match self.free.pop() {
            Some(i) => {
                self.pool[i] = bad;
                i
            }
            None => {
                self.pool.push(bad);
                self.pool.len() - 1
            }
        };

        match self.tail[q] {
            None => {
                // Splice the bucket into the list of nonempty buckets.
                match self.first_nonempty {
                    Some(first) if q < first => {
                        let mut i = q + 1;
                        while self.front[i].is_none() {
                            i += 1;
                        }
                        self.next_nonempty[q] = self.next_nonempty[i];
                        self.next_nonempty[i] = Some(q);
                    }
                    _ => {
                        self.next_nonempty[q] = self.first_nonempty;
                        self.first_nonempty = Some(q);
                    }
                }
                self.front[q] = Some(slot);
            }
            Some(t) => self.pool[t].next = Some(slot),
        }
        self.tail[q] = Some(slot);
        self.count += 1;
    }

    pub fn dequeue(&mut self) -> Option<BadTriangle> {
        let q = self.first_nonempty?;
        let slot = self.front[q]?;
        let bad = self.pool[slot];
        self.front[q] = bad.next;
        if bad.next.is_none() {
            self.tail[q] = None;
            self.first_nonempty = self.next_nonempty[q];
            self.next_nonempty[q] = None;
        }
        self.free.push(slot);
        self.count -= 1;
        Some(bad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bad(key: f64, id: usize) -> BadTriangle {
        BadTriangle::new(Otri::new(id, 0), key, 0, 0, 0)
    }

    #[test]
    fn queue_numbers_are_monotone() {
        assert_eq!(BadTriQueue::queue_number(1.0), 2047);
        assert!(BadTriQueue::queue_number(0.25) > BadTriQueue::queue_number(1.0));
        assert!(BadTriQueue::queue_number(4.0) < BadTriQueue::queue_number(1.0));
        assert!(BadTriQueue::queue_number(1.5) < BadTriQueue::queue_number(1.0));
        assert_eq!(BadTriQueue::queue_number(0.0), 4095);
    }

    #[test]
    fn shortest_edges_leave_first() {
        let mut q = BadTriQueue::new();
        q.enqueue(bad(100.0, 1));
        q.enqueue(bad(0.01, 2));
        q.enqueue(bad(1.0, 3));
        q.enqueue(bad(0.01, 4));
        assert_eq!(q.len(), 4);

        let order: Vec<usize> = std::iter::from_fn(|| q.dequeue()).map(|b| b.tri.tri).collect();
        assert_eq!(order, vec![2, 4, 3, 1]);
        assert!(q.is_empty());
    }

    #[test]
    fn reuses_emptied_buckets() {
        let mut q = BadTriQueue::new();
        q.enqueue(bad(1.0, 1));
        assert_eq!(q.dequeue().map(|b| b.tri.tri), Some(1));
        q.enqueue(bad(16.0, 2));
        q.enqueue(bad(1.0, 3));
        assert_eq!(q.dequeue().map(|b| b.tri.tri), Some(3));
        assert_eq!(q.dequeue().map(|b| b.tri.tri), Some(2));
        assert!(q.dequeue().is_none());
    }
}
