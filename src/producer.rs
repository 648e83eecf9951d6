// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The contract between the engine and whoever displays its results.
//!
//! A viewer asks a `FractalProducer` for a viewport, tagging the
//! request with an identifier it can match up later.  The producer
//! fills a classification buffer and hands it to a `ResultSink`
//! together with the number of colors needed to paint it.

use crate::errors::{FractalError, Result};
use crate::planes::{Pixel, Viewport};
use std::sync::atomic::AtomicBool;

/// Receives finished buffers.
pub trait ResultSink {
    /// `data` is row-major, `width * height` long; every entry is below
    /// `color_count`.  `request_id` is the one passed to `produce`.
    fn accept_result(&mut self, data: Vec<i16>, color_count: usize, request_id: u64);
}

impl<F> ResultSink for F
where
    F: FnMut(Vec<i16>, usize, u64),
{
    fn accept_result(&mut self, data: Vec<i16>, color_count: usize, request_id: u64) {
        self(data, color_count, request_id)
    }
}

/// One delivered result.
#[derive(Clone, Debug, PartialEq)]
pub struct Rendering {
    /// The classification buffer.
    pub data: Vec<i16>,
    /// Number of roots plus one.
    pub color_count: usize,
    /// Echo of the request identifier.
    pub request_id: u64,
}

/// Collects every delivered result, in order.
impl ResultSink for Vec<Rendering> {
    fn accept_result(&mut self, data: Vec<i16>, color_count: usize, request_id: u64) {
        self.push(Rendering {
            data,
            color_count,
            request_id,
        });
    }
}

/// A band (or the whole image, for the sequential producer) that
/// stopped on an arithmetic error.  Rows from `pixel` onward in that
/// band were left at 0.
#[derive(Clone, Debug, PartialEq)]
pub struct BandFailure {
    /// First row of the failed band.
    pub y_min: usize,
    /// Last row of the failed band, inclusive.
    pub y_max: usize,
    /// The pixel whose iteration failed.
    pub pixel: Pixel,
    /// What went wrong.
    pub error: FractalError,
}

/// How a production went, beyond the buffer itself.  Cancellation and
/// failed bands are both visible here; neither is an `Err`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderReport {
    /// Echo of the request identifier.
    pub request_id: u64,
    /// Number of roots plus one.
    pub color_count: usize,
    /// Number of row bands the image was split into.
    pub bands: usize,
    /// Rows never started because the cancel flag was raised.
    pub rows_skipped: usize,
    /// Bands stopped by an arithmetic error.
    pub failures: Vec<BandFailure>,
}

impl RenderReport {
    /// True when cancellation left rows unfilled.
    pub fn cancelled(&self) -> bool {
        self.rows_skipped > 0
    }

    /// True when every row was computed without error.
    pub fn is_complete(&self) -> bool {
        self.rows_skipped == 0 && self.failures.is_empty()
    }
}

/// Something that can turn a viewport into a classification buffer.
pub trait FractalProducer {
    /// Computes the viewport, delivers the buffer to `sink`, and blocks
    /// until both are done.  `cancel` is polled once per row; rows not
    /// yet started when it is raised stay at 0.  Invalid arguments are
    /// rejected before anything is computed and nothing is delivered.
    fn produce(
        &mut self,
        viewport: &Viewport,
        request_id: u64,
        sink: &mut dyn ResultSink,
        cancel: &AtomicBool,
    ) -> Result<RenderReport>;
}
