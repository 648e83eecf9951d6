// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Per-pixel Newton-Raphson iteration.
//!
//! Each pixel's point on the complex plane is used as the starting
//! guess for Newton's method against the polynomial whose roots the
//! user supplied.  When the steps get small enough we look at where
//! the iteration ended up, and if that is close to one of the roots,
//! the pixel belongs to that root's basin of attraction.

use crate::complex::Complex;
use crate::errors::{FractalError, Result};
use crate::polynomial::Polynomial;
use crate::rooted::RootedPolynomial;

/// Iteration cap per pixel.
pub const DEFAULT_MAX_ITERATIONS: usize = 16 * 16 * 16;
/// Steps no longer than this count as converged.
pub const DEFAULT_CONVERGENCE: f64 = 0.001;
/// How close the final point must be to a root to be classified.
pub const DEFAULT_ROOT_THRESHOLD: f64 = 0.002;

/// What to do when the derivative vanishes under the iterate, which
/// makes the Newton step a division by zero.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ZeroDerivative {
    /// Nudge the iterate off the critical point by `(ε, ε)` and keep
    /// going.  The nudge counts as an iteration.
    Perturb,
    /// Give up on the pixel and classify it as 0.
    NoConvergence,
    /// Return `DivisionByZero`.  The engine stops the pixel's band and
    /// reports it; other bands are unaffected.
    Fail,
}

/// The knobs of the iteration.  `Default` gives the classic settings:
/// 4096 iterations, ε = 0.001, τ = 0.002, perturb on a zero derivative.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NewtonConfig {
    /// Upper bound on Newton steps per pixel.
    pub max_iterations: usize,
    /// Iteration stops once `|z_next - z| <= convergence`.
    pub convergence: f64,
    /// A root is only matched if strictly closer than this.
    pub root_threshold: f64,
    /// Zero-derivative handling.
    pub zero_derivative: ZeroDerivative,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        NewtonConfig {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            convergence: DEFAULT_CONVERGENCE,
            root_threshold: DEFAULT_ROOT_THRESHOLD,
            zero_derivative: ZeroDerivative::Perturb,
        }
    }
}

impl NewtonConfig {
    /// Replace the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Replace ε.
    pub fn with_convergence(mut self, convergence: f64) -> Self {
        self.convergence = convergence;
        self
    }

    /// Replace τ.
    pub fn with_root_threshold(mut self, root_threshold: f64) -> Self {
        self.root_threshold = root_threshold;
        self
    }

    /// Replace the zero-derivative policy.
    pub fn with_zero_derivative(mut self, zero_derivative: ZeroDerivative) -> Self {
        self.zero_derivative = zero_derivative;
        self
    }

    /// Checks the settings make sense before any pixel is touched.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(FractalError::invalid("max_iterations must be at least 1"));
        }
        if !(self.convergence.is_finite() && self.convergence > 0.0) {
            return Err(FractalError::invalid(format!(
                "convergence must be positive, was {}",
                self.convergence
            )));
        }
        if !(self.root_threshold.is_finite() && self.root_threshold > 0.0) {
            return Err(FractalError::invalid(format!(
                "root threshold must be positive, was {}",
                self.root_threshold
            )));
        }
        Ok(())
    }
}

/// Classifies points by the root Newton's method carries them to.
///
/// The expanded polynomial and its derivative are built once.  The
/// expansion drops the rooted polynomial's constant (see
/// `RootedPolynomial::to_polynomial`), so every pixel would build the
/// same pair anyway.
#[derive(Clone, Debug)]
pub struct PixelClassifier<'a> {
    roots: &'a [Complex],
    polynomial: Polynomial,
    derivative: Polynomial,
    config: NewtonConfig,
}

impl<'a> PixelClassifier<'a> {
    /// Fails when the settings are unusable, when there are no roots
    /// (a constant polynomial has no Newton step), or when there are
    /// more roots than a classification index can name.
    pub fn new(roots: &'a [Complex], config: NewtonConfig) -> Result<Self> {
        config.validate()?;
        if roots.len() >= i16::max_value() as usize {
            return Err(FractalError::invalid(format!(
                "too many roots to classify: {}",
                roots.len()
            )));
        }
        if let Some(bad) = roots.iter().find(|r| !r.is_finite()) {
            return Err(FractalError::invalid(format!("root {} is not finite", bad)));
        }
        let polynomial = RootedPolynomial::new(Complex::ONE, roots).to_polynomial();
        let derivative = polynomial.derive()?;
        Ok(PixelClassifier {
            roots,
            polynomial,
            derivative,
            config,
        })
    }

    /// The iteration settings.
    pub fn config(&self) -> &NewtonConfig {
        &self.config
    }

    /// The roots being classified against.
    pub fn roots(&self) -> &'a [Complex] {
        self.roots
    }

    /// Number of distinct classification values: one per root, plus 0.
    pub fn color_count(&self) -> usize {
        self.roots.len() + 1
    }

    /// Runs the iteration from `z0`.  Returns where it stopped and how
    /// many steps it took, or `None` for the point when the
    /// `NoConvergence` policy gave up on a zero derivative.
    pub fn converge(&self, z0: Complex) -> Result<(Option<Complex>, usize)> {
        let epsilon = self.config.convergence;
        let mut z = z0;
        let mut iterations = 0;
        loop {
            let numerator = self.polynomial.evaluate(z)?;
            let denominator = self.derivative.evaluate(z)?;
            let next = match numerator.divide(denominator) {
                Ok(fraction) => z.sub(fraction),
                Err(FractalError::DivisionByZero) => match self.config.zero_derivative {
                    ZeroDerivative::Perturb => z.add(Complex::new(epsilon, epsilon)),
                    ZeroDerivative::NoConvergence => return Ok((None, iterations + 1)),
                    ZeroDerivative::Fail => return Err(FractalError::DivisionByZero),
                },
                Err(e) => return Err(e),
            };
            iterations += 1;
            let step = z.distance(next);
            z = next;
            // A NaN step compares false and ends the loop.
            let still_moving = step > epsilon;
            if !still_moving || iterations >= self.config.max_iterations {
                return Ok((Some(z), iterations));
            }
        }
    }

    /// The classification index of `z0`: 0 when the iteration did not
    /// end near any root, otherwise the nearest root's index plus one.
    pub fn classify(&self, z0: Complex) -> Result<i16> {
        let rooted = RootedPolynomial::new(z0, self.roots);
        let index = match self.converge(z0)? {
            (Some(z), _) => rooted.nearest_root_index(z, self.config.root_threshold),
            (None, _) => None,
        };
        Ok(index.map_or(0, |i| i as i16 + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex {
        Complex::new(re, im)
    }

    const PLUS_MINUS_ONE: [Complex; 2] = [Complex::ONE, Complex::ONE_NEG];

    #[test]
    fn defaults_are_the_classic_settings() {
        let config = NewtonConfig::default();
        assert_eq!(config.max_iterations, 4096);
        assert_eq!(config.convergence, 0.001);
        assert_eq!(config.root_threshold, 0.002);
        assert_eq!(config.zero_derivative, ZeroDerivative::Perturb);
    }

    #[test]
    fn bad_settings_are_rejected() {
        let roots = PLUS_MINUS_ONE;
        let base = NewtonConfig::default();
        assert!(PixelClassifier::new(&roots, base.with_max_iterations(0)).is_err());
        assert!(PixelClassifier::new(&roots, base.with_convergence(0.0)).is_err());
        assert!(PixelClassifier::new(&roots, base.with_convergence(std::f64::NAN)).is_err());
        assert!(PixelClassifier::new(&roots, base.with_root_threshold(-1.0)).is_err());
    }

    #[test]
    fn no_roots_is_rejected() {
        assert!(PixelClassifier::new(&[], NewtonConfig::default()).is_err());
    }

    #[test]
    fn non_finite_roots_are_rejected() {
        let roots = [Complex::ONE, c(std::f64::INFINITY, 0.0)];
        assert!(PixelClassifier::new(&roots, NewtonConfig::default()).is_err());
    }

    #[test]
    fn points_near_a_root_go_to_that_root() {
        let roots = PLUS_MINUS_ONE;
        let classifier = PixelClassifier::new(&roots, NewtonConfig::default()).unwrap();
        assert_eq!(classifier.classify(c(0.8, 0.3)).unwrap(), 1);
        assert_eq!(classifier.classify(c(-1.7, -0.4)).unwrap(), 2);
        assert_eq!(classifier.classify(c(1.0, 0.0)).unwrap(), 1);
    }

    #[test]
    fn basins_of_z_squared_minus_one_split_on_the_imaginary_axis() {
        let roots = PLUS_MINUS_ONE;
        let classifier = PixelClassifier::new(&roots, NewtonConfig::default()).unwrap();
        for &im in [-3.0, -0.5, 0.0, 0.25, 2.0].iter() {
            assert_eq!(classifier.classify(c(0.1, im)).unwrap(), 1, "im = {}", im);
            assert_eq!(classifier.classify(c(-0.1, im)).unwrap(), 2, "im = {}", im);
        }
    }

    #[test]
    fn cube_roots_of_unity_are_found() {
        let roots = Complex::ONE.nth_roots(3).unwrap();
        let classifier = PixelClassifier::new(&roots, NewtonConfig::default()).unwrap();
        for (i, root) in roots.iter().enumerate() {
            let near = root.add(c(0.05, -0.05));
            assert_eq!(classifier.classify(near).unwrap(), i as i16 + 1);
        }
    }

    #[test]
    fn convergence_stops_early() {
        let roots = PLUS_MINUS_ONE;
        let classifier = PixelClassifier::new(&roots, NewtonConfig::default()).unwrap();
        let (z, iterations) = classifier.converge(c(2.0, 0.0)).unwrap();
        assert!(z.unwrap().distance(Complex::ONE) < 1e-6);
        assert!(iterations < 10);
    }

    #[test]
    fn iteration_cap_is_respected() {
        let roots = PLUS_MINUS_ONE;
        let config = NewtonConfig::default().with_max_iterations(3);
        let classifier = PixelClassifier::new(&roots, config).unwrap();
        let (_, iterations) = classifier.converge(c(0.0, 2.0)).unwrap();
        assert_eq!(iterations, 3);
        // Three steps from 100 are nowhere near a root yet.
        assert_eq!(classifier.classify(c(100.0, 0.0)).unwrap(), 0);
    }

    #[test]
    fn zero_derivative_perturbs_by_default() {
        let roots = PLUS_MINUS_ONE;
        let classifier = PixelClassifier::new(&roots, NewtonConfig::default()).unwrap();
        let index = classifier.classify(Complex::ZERO).unwrap();
        assert!(index == 1 || index == 2);
    }

    #[test]
    fn zero_derivative_can_mean_no_convergence() {
        let roots = PLUS_MINUS_ONE;
        let config = NewtonConfig::default().with_zero_derivative(ZeroDerivative::NoConvergence);
        let classifier = PixelClassifier::new(&roots, config).unwrap();
        assert_eq!(classifier.classify(Complex::ZERO).unwrap(), 0);
        assert_eq!(classifier.converge(Complex::ZERO).unwrap(), (None, 1));
    }

    #[test]
    fn zero_derivative_can_fail() {
        let roots = PLUS_MINUS_ONE;
        let config = NewtonConfig::default().with_zero_derivative(ZeroDerivative::Fail);
        let classifier = PixelClassifier::new(&roots, config).unwrap();
        assert_eq!(
            classifier.classify(Complex::ZERO),
            Err(FractalError::DivisionByZero)
        );
        assert_eq!(classifier.classify(c(0.5, 0.0)).unwrap(), 1);
    }

    #[test]
    fn color_count_is_roots_plus_one() {
        let roots = Complex::ONE.nth_roots(5).unwrap();
        let classifier = PixelClassifier::new(&roots, NewtonConfig::default()).unwrap();
        assert_eq!(classifier.color_count(), 6);
    }
}
