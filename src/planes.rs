//! Contains the Viewport struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0
//! (the image), and a rectangle on the complex plane bounded by
//! `re_min..re_max` and `im_min..im_max`.
//!
//! Image rows grow downward while the imaginary axis grows upward, so
//! row 0 maps to `im_max` and the last row to `im_min`.

use crate::complex::Complex;
use crate::errors::{FractalError, Result};

/// Describes the column, row of a pixel in the image.  Column first,
/// so it reads like x, y.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// The region of the complex plane being rendered, and the size of the
/// image it is rendered into.  Once built, it is known to be sane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    re_min: f64,
    re_max: f64,
    im_min: f64,
    im_max: f64,
    width: usize,
    height: usize,
}

impl Viewport {
    /// Constructor.  The bounds must be finite and strictly ordered,
    /// and the image must have at least one pixel in each direction.
    pub fn new(
        re_min: f64,
        re_max: f64,
        im_min: f64,
        im_max: f64,
        width: usize,
        height: usize,
    ) -> Result<Viewport> {
        if ![re_min, re_max, im_min, im_max].iter().all(|b| b.is_finite()) {
            return Err(FractalError::invalid("viewport bounds must be finite"));
        }
        if re_min >= re_max {
            return Err(FractalError::invalid(format!(
                "re_min ({}) is not to the left of re_max ({})",
                re_min, re_max
            )));
        }
        if im_min >= im_max {
            return Err(FractalError::invalid(format!(
                "im_min ({}) is not below im_max ({})",
                im_min, im_max
            )));
        }
        if width == 0 || height == 0 {
            return Err(FractalError::invalid(format!(
                "image must be at least 1x1, was {}x{}",
                width, height
            )));
        }
        if width.checked_mul(height).is_none() {
            return Err(FractalError::invalid(format!(
                "image of {}x{} pixels is too large to address",
                width, height
            )));
        }
        Ok(Viewport {
            re_min,
            re_max,
            im_min,
            im_max,
            width,
            height,
        })
    }

    /// Built from the left-lower and right-upper corners.
    pub fn from_corners(
        leftlower: Complex,
        rightupper: Complex,
        width: usize,
        height: usize,
    ) -> Result<Viewport> {
        Viewport::new(
            leftlower.re,
            rightupper.re,
            leftlower.im,
            rightupper.im,
            width,
            height,
        )
    }

    /// Image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The total number of points in the integral grid.  Used to
    /// size the result buffer.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Never true for a constructed viewport; here for symmetry with
    /// `len`.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Given a pixel on the image, return the point on the complex plane
    /// it samples.  The first and last columns land exactly on `re_min`
    /// and `re_max`; a one-pixel axis samples its minimum.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex {
        let re = if self.width > 1 {
            pixel.0 as f64 / (self.width as f64 - 1.0) * (self.re_max - self.re_min) + self.re_min
        } else {
            self.re_min
        };
        let im = if self.height > 1 {
            (self.height as f64 - 1.0 - pixel.1 as f64) / (self.height as f64 - 1.0)
                * (self.im_max - self.im_min)
                + self.im_min
        } else {
            self.im_min
        };
        Complex::new(re, im)
    }

    /// Row-major offset of a pixel into the result buffer.
    pub fn offset(&self, pixel: &Pixel) -> usize {
        pixel.1 * self.width + pixel.0
    }
}
