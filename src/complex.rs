// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! An immutable complex number.
//!
//! `num::Complex` already does most of the arithmetic, but the fractal
//! needs a few contracts it does not give us: division refuses a zero
//! divisor instead of handing back NaN, and integer powers go through
//! the polar form with the angle folded into `[0, 2π)`, which is what
//! the classification results are calibrated against.  So we wrap it.

use crate::errors::{FractalError, Result};
use std::f64::consts::PI;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// A point on the complex plane.  Every operation returns a new value.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Complex {
    /// Real part.
    pub re: f64,
    /// Imaginary part.
    pub im: f64,
}

impl Complex {
    /// 0 + 0i
    pub const ZERO: Complex = Complex { re: 0.0, im: 0.0 };
    /// 1 + 0i
    pub const ONE: Complex = Complex { re: 1.0, im: 0.0 };
    /// -1 + 0i
    pub const ONE_NEG: Complex = Complex { re: -1.0, im: 0.0 };
    /// 0 + 1i
    pub const IM: Complex = Complex { re: 0.0, im: 1.0 };
    /// 0 - 1i
    pub const IM_NEG: Complex = Complex { re: 0.0, im: -1.0 };

    /// Constructor.
    pub const fn new(re: f64, im: f64) -> Self {
        Complex { re, im }
    }

    /// The Euclidean norm, `sqrt(re² + im²)`.
    pub fn module(self) -> f64 {
        (self.re * self.re + self.im * self.im).sqrt()
    }

    /// Euclidean distance between two points.  This, compared against
    /// a threshold, is the only notion of "equal" the engine uses.
    pub fn distance(self, other: Complex) -> f64 {
        self.sub(other).module()
    }

    /// `self + c`
    pub fn add(self, c: Complex) -> Complex {
        Complex::new(self.re + c.re, self.im + c.im)
    }

    /// `self - c`
    pub fn sub(self, c: Complex) -> Complex {
        Complex::new(self.re - c.re, self.im - c.im)
    }

    /// `self * c`
    pub fn multiply(self, c: Complex) -> Complex {
        Complex::new(
            self.re * c.re - self.im * c.im,
            self.re * c.im + self.im * c.re,
        )
    }

    /// `self / c`.  Only a divisor with both parts exactly zero is an
    /// error; any other divisor, however small, gives a quotient.
    ///
    /// Scaled by the larger part of `c` (Smith's method) so that
    /// `|c|²` is never formed and cannot underflow.
    pub fn divide(self, c: Complex) -> Result<Complex> {
        if c.re == 0.0 && c.im == 0.0 {
            return Err(FractalError::DivisionByZero);
        }
        if c.re.abs() >= c.im.abs() {
            let ratio = c.im / c.re;
            let scale = c.re + c.im * ratio;
            Ok(Complex::new(
                (self.re + self.im * ratio) / scale,
                (self.im - self.re * ratio) / scale,
            ))
        } else {
            let ratio = c.re / c.im;
            let scale = c.re * ratio + c.im;
            Ok(Complex::new(
                (self.re * ratio + self.im) / scale,
                (self.im * ratio - self.re) / scale,
            ))
        }
    }

    /// `-self`
    pub fn negate(self) -> Complex {
        Complex::new(-self.re, -self.im)
    }

    /// The angle of the point, folded into `[0, 2π)`.
    fn angle(self) -> f64 {
        let (_, theta) = num::Complex::from(self).to_polar();
        if theta < 0.0 {
            theta + 2.0 * PI
        } else {
            theta
        }
    }

    /// `self^n` for non-negative `n`, computed in polar form.  `n == 0`
    /// is exactly one, even for zero.
    pub fn power(self, n: i32) -> Result<Complex> {
        if n < 0 {
            return Err(FractalError::invalid(format!(
                "power must be non-negative, was {}",
                n
            )));
        }
        if n == 0 {
            return Ok(Complex::ONE);
        }
        let magnitude = self.module().powi(n);
        let angle = self.angle() * f64::from(n);
        Ok(num::Complex::from_polar(&magnitude, &angle).into())
    }

    /// The `n` `n`-th roots of `self`, starting from the principal
    /// root and stepping by `2π/n`.
    pub fn nth_roots(self, n: i32) -> Result<Vec<Complex>> {
        if n <= 0 {
            return Err(FractalError::invalid(format!(
                "root order must be positive, was {}",
                n
            )));
        }
        let (r, theta) = num::Complex::from(self).to_polar();
        let magnitude = r.powf(1.0 / f64::from(n));
        Ok((0..n)
            .map(|k| {
                let angle = (theta + 2.0 * PI * f64::from(k)) / f64::from(n);
                num::Complex::from_polar(&magnitude, &angle).into()
            })
            .collect())
    }

    /// True when both parts are finite.
    pub fn is_finite(self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }
}

impl From<num::Complex<f64>> for Complex {
    fn from(c: num::Complex<f64>) -> Self {
        Complex::new(c.re, c.im)
    }
}

impl From<Complex> for num::Complex<f64> {
    fn from(c: Complex) -> Self {
        num::Complex::new(c.re, c.im)
    }
}

impl Add for Complex {
    type Output = Complex;
    fn add(self, rhs: Complex) -> Complex {
        Complex::add(self, rhs)
    }
}

impl Sub for Complex {
    type Output = Complex;
    fn sub(self, rhs: Complex) -> Complex {
        Complex::sub(self, rhs)
    }
}

impl Mul for Complex {
    type Output = Complex;
    fn mul(self, rhs: Complex) -> Complex {
        self.multiply(rhs)
    }
}

impl Neg for Complex {
    type Output = Complex;
    fn neg(self) -> Complex {
        self.negate()
    }
}

/// `3+4i`, `3-4i`, `7`, `-2.5i`.  Zero prints as `0`.
impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.re == 0.0, self.im == 0.0) {
            (_, true) => write!(f, "{}", self.re),
            (true, false) => write!(f, "{}i", self.im),
            (false, false) if self.im > 0.0 => write!(f, "{}+{}i", self.re, self.im),
            (false, false) => write!(f, "{}{}i", self.re, self.im),
        }
    }
}
