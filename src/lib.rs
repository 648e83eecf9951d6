#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Newton fractal renderer
//!
//! Pick a handful of points on the complex plane and build the
//! polynomial that has exactly those points as its roots.  Now take any
//! other point and run Newton's method on that polynomial starting from
//! it: `z ← z - f(z)/f'(z)`.  Almost always the iteration settles on
//! one of the roots, but *which* root depends on the starting point in
//! a wildly sensitive way near the boundaries between basins.
//!
//! Color every pixel of an image by the root its point settles on and
//! you get a Newton fractal.  This crate computes the classification
//! buffer for such an image: one small integer per pixel, 0 for "went
//! nowhere" and `k + 1` for "settled on root `k`".  Painting the buffer
//! is the caller's business.
//!
//! The work is split into horizontal bands of rows and spread across a
//! fixed pool of threads; see `parallel`.  A single-threaded producer
//! in `sequential` computes exactly the same buffer.

pub mod classifier;
pub mod complex;
pub mod errors;
pub mod palette;
pub mod parallel;
pub mod planes;
pub mod polynomial;
pub mod producer;
pub mod rooted;
pub mod sequential;
pub mod util;

pub use classifier::{NewtonConfig, PixelClassifier, ZeroDerivative};
pub use complex::Complex;
pub use errors::{FractalError, Result};
pub use parallel::{EngineConfig, ParallelProducer};
pub use planes::{Pixel, Viewport};
pub use polynomial::Polynomial;
pub use producer::{FractalProducer, RenderReport, Rendering, ResultSink};
pub use rooted::RootedPolynomial;
pub use sequential::SequentialProducer;
pub use util::{parse_complex, read_roots};
