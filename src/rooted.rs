// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A polynomial described by its roots: `constant * Π(z - root_i)`.

use crate::complex::Complex;
use crate::polynomial::Polynomial;
use std::fmt;

/// A leading constant and an ordered list of roots.  Root order matters:
/// it decides the classification index, and it breaks distance ties.
#[derive(Clone, Debug, PartialEq)]
pub struct RootedPolynomial<'a> {
    constant: Complex,
    roots: &'a [Complex],
}

impl<'a> RootedPolynomial<'a> {
    /// Borrows the roots; one of these is built for every pixel, so the
    /// root list is shared rather than copied.
    pub fn new(constant: Complex, roots: &'a [Complex]) -> Self {
        RootedPolynomial { constant, roots }
    }

    /// The leading constant.
    pub fn constant(&self) -> Complex {
        self.constant
    }

    /// The roots, in the order given.
    pub fn roots(&self) -> &'a [Complex] {
        self.roots
    }

    /// `constant * Π(z - root_i)`
    pub fn evaluate(&self, z: Complex) -> Complex {
        self.roots
            .iter()
            .fold(self.constant, |acc, root| acc.multiply(z.sub(*root)))
    }

    /// Expands `Π(z - root_i)` into coefficient form.
    ///
    /// The constant is *not* folded into the expansion.  The Newton
    /// iteration has always run on the monic product, and the constant
    /// it is handed is the pixel's own starting point, so multiplying it
    /// in would change every classification.  `evaluate` and
    /// `to_polynomial` therefore disagree by exactly that factor.
    pub fn to_polynomial(&self) -> Polynomial {
        self.roots.iter().fold(Polynomial::constant(Complex::ONE), |acc, root| {
            acc.multiply(&Polynomial::linear(root.negate(), Complex::ONE))
        })
    }

    /// The index of the root closest to `z`, provided it is strictly
    /// closer than `threshold`.  On a tie the earlier root wins.
    pub fn nearest_root_index(&self, z: Complex, threshold: f64) -> Option<usize> {
        let mut found = None;
        let mut min_distance = std::f64::MAX;
        for (i, root) in self.roots.iter().enumerate() {
            let distance = root.distance(z);
            if distance < threshold && distance < min_distance {
                found = Some(i);
                min_distance = distance;
            }
        }
        found
    }
}

/// `f(z) = 2 * (z - 1) * (z - -1)`
impl<'a> fmt::Display for RootedPolynomial<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "f(z) = {}", self.constant)?;
        for root in self.roots {
            write!(f, " * (z - {})", root)?;
        }
        Ok(())
    }
}
