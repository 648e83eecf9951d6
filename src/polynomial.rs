// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Dense polynomials over `Complex`, stored lowest power first.

use crate::complex::Complex;
use crate::errors::{FractalError, Result};
use std::fmt;

/// `coefficients[i]` is the coefficient of `z^i`.  There is always at
/// least one coefficient, and trailing zeros are never trimmed: the
/// order of a product is the sum of the orders of its factors.
#[derive(Clone, Debug, PartialEq)]
pub struct Polynomial {
    coefficients: Vec<Complex>,
}

impl Polynomial {
    /// Fails on an empty coefficient list.
    pub fn new(coefficients: Vec<Complex>) -> Result<Self> {
        if coefficients.is_empty() {
            return Err(FractalError::invalid(
                "a polynomial needs at least one coefficient",
            ));
        }
        Ok(Polynomial { coefficients })
    }

    /// The constant polynomial `c`.
    pub fn constant(c: Complex) -> Self {
        Polynomial {
            coefficients: vec![c],
        }
    }

    /// `constant + slope * z`
    pub fn linear(constant: Complex, slope: Complex) -> Self {
        Polynomial {
            coefficients: vec![constant, slope],
        }
    }

    /// Lowest power first.
    pub fn coefficients(&self) -> &[Complex] {
        &self.coefficients
    }

    /// Highest power, counting zero leading coefficients.
    pub fn order(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// `Σ coefficients[i] * z^i`, each power computed on its own in
    /// polar form.  Slower than Horner's rule, but the classification
    /// thresholds were tuned against exactly these floating values.
    pub fn evaluate(&self, z: Complex) -> Result<Complex> {
        let mut sum = Complex::ZERO;
        for (i, c) in self.coefficients.iter().enumerate() {
            sum = sum.add(c.multiply(z.power(i as i32)?));
        }
        Ok(sum)
    }

    /// The first derivative.  A constant has none we can represent
    /// without an empty coefficient list, so that is an error.
    pub fn derive(&self) -> Result<Polynomial> {
        if self.coefficients.len() < 2 {
            return Err(FractalError::invalid("cannot derive a constant polynomial"));
        }
        let coefficients = self
            .coefficients
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, c)| c.multiply(Complex::new(i as f64, 0.0)))
            .collect();
        Ok(Polynomial { coefficients })
    }

    /// Full convolution of the two coefficient lists.
    pub fn multiply(&self, other: &Polynomial) -> Polynomial {
        let mut coefficients = vec![Complex::ZERO; self.order() + other.order() + 1];
        for (i, a) in self.coefficients.iter().enumerate() {
            for (j, b) in other.coefficients.iter().enumerate() {
                coefficients[i + j] = coefficients[i + j].add(a.multiply(*b));
            }
        }
        Polynomial { coefficients }
    }
}

/// `(1)z^2 + (0)z^1 + (-1)`
impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, c) in self.coefficients.iter().enumerate().skip(1).rev() {
            write!(f, "({})z^{} + ", c, i)?;
        }
        write!(f, "({})", self.coefficients[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex {
        Complex::new(re, im)
    }

    fn poly(coefficients: &[Complex]) -> Polynomial {
        Polynomial::new(coefficients.to_vec()).unwrap()
    }

    #[test]
    fn empty_polynomial_is_rejected() {
        assert!(Polynomial::new(vec![]).is_err());
    }

    #[test]
    fn order_counts_trailing_zeros() {
        let p = poly(&[c(1.0, 0.0), Complex::ZERO, Complex::ZERO]);
        assert_eq!(p.order(), 2);
        assert_eq!(Polynomial::constant(Complex::ONE).order(), 0);
    }

    #[test]
    fn evaluates_term_by_term() {
        // z^2 + 2iz - 3 at 1 + i
        let p = poly(&[c(-3.0, 0.0), c(0.0, 2.0), Complex::ONE]);
        let z = c(1.0, 1.0);
        let expected = z.multiply(z).add(c(0.0, 2.0).multiply(z)).sub(c(3.0, 0.0));
        assert!(p.evaluate(z).unwrap().distance(expected) < 1e-12);
    }

    #[test]
    fn evaluating_at_zero_gives_the_constant_term() {
        let p = poly(&[c(5.0, -1.0), c(2.0, 0.0), c(7.0, 7.0)]);
        assert_eq!(p.evaluate(Complex::ZERO).unwrap(), c(5.0, -1.0));
    }

    #[test]
    fn derive_scales_by_power() {
        let p = poly(&[c(9.0, 0.0), c(1.0, 1.0), c(0.0, 3.0), c(2.0, 0.0)]);
        let d = p.derive().unwrap();
        assert_eq!(d.coefficients(), &[c(1.0, 1.0), c(0.0, 6.0), c(6.0, 0.0)]);
    }

    #[test]
    fn deriving_a_constant_fails() {
        assert!(Polynomial::constant(Complex::ONE).derive().is_err());
    }

    #[test]
    fn multiply_convolves() {
        // (z - 1)(z + 1) = z^2 - 1
        let a = poly(&[c(-1.0, 0.0), Complex::ONE]);
        let b = poly(&[Complex::ONE, Complex::ONE]);
        let p = a.multiply(&b);
        assert_eq!(p.order(), 2);
        assert_eq!(p.coefficients(), &[c(-1.0, 0.0), Complex::ZERO, Complex::ONE]);
    }

    #[test]
    fn multiply_keeps_zero_leading_terms() {
        let a = poly(&[Complex::ONE, Complex::ZERO]);
        let b = poly(&[Complex::ONE, Complex::ZERO, Complex::ZERO]);
        assert_eq!(a.multiply(&b).order(), 3);
    }

    #[test]
    fn display_lists_highest_power_first() {
        let p = poly(&[c(-1.0, 0.0), Complex::ZERO, Complex::ONE]);
        assert_eq!(p.to_string(), "(1)z^2 + (0)z^1 + (-1)");
    }
}
