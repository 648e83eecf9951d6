// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The single-threaded producer: one pass over the image, row by row,
//! left to right.  It shares no code with the band machinery in
//! `parallel`, which makes it a useful reference: whatever the
//! decomposition, the parallel engine must produce exactly this.

use itertools::iproduct;
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::classifier::{NewtonConfig, PixelClassifier};
use crate::complex::Complex;
use crate::errors::Result;
use crate::planes::{Pixel, Viewport};
use crate::producer::{BandFailure, FractalProducer, RenderReport, ResultSink};

/// Computes `viewport` on the calling thread and delivers the buffer to
/// `sink`.  The cancel flag is checked at the start of every row.
pub fn produce(
    viewport: &Viewport,
    roots: &[Complex],
    newton: &NewtonConfig,
    request_id: u64,
    sink: &mut dyn ResultSink,
    cancel: &AtomicBool,
) -> Result<RenderReport> {
    let classifier = PixelClassifier::new(roots, *newton)?;
    let (width, height) = (viewport.width(), viewport.height());
    info!("request {}: {}x{} pixels, sequential", request_id, width, height);

    let mut data = vec![0 as i16; viewport.len()];
    let mut report = RenderReport {
        request_id,
        color_count: classifier.color_count(),
        bands: 1,
        ..RenderReport::default()
    };

    for (offset, (row, column)) in iproduct!(0..height, 0..width).enumerate() {
        if column == 0 && cancel.load(Ordering::Relaxed) {
            report.rows_skipped = height - row;
            break;
        }
        let pixel = Pixel(column, row);
        match classifier.classify(viewport.pixel_to_point(&pixel)) {
            Ok(index) => data[offset] = index,
            Err(error) => {
                report.failures.push(BandFailure {
                    y_min: 0,
                    y_max: height - 1,
                    pixel,
                    error,
                });
                break;
            }
        }
    }

    info!(
        "request {}: done, {} rows skipped",
        request_id, report.rows_skipped
    );
    sink.accept_result(data, report.color_count, request_id);
    Ok(report)
}

/// A producer for a fixed set of roots, computing on the caller's
/// thread.
#[derive(Clone, Debug)]
pub struct SequentialProducer {
    roots: Vec<Complex>,
    newton: NewtonConfig,
}

impl SequentialProducer {
    /// Default Newton settings.
    pub fn new(roots: Vec<Complex>) -> Self {
        SequentialProducer {
            roots,
            newton: NewtonConfig::default(),
        }
    }

    /// Replace the Newton settings.
    pub fn with_newton(mut self, newton: NewtonConfig) -> Self {
        self.newton = newton;
        self
    }
}

impl FractalProducer for SequentialProducer {
    fn produce(
        &mut self,
        viewport: &Viewport,
        request_id: u64,
        sink: &mut dyn ResultSink,
        cancel: &AtomicBool,
    ) -> Result<RenderReport> {
        produce(viewport, &self.roots, &self.newton, request_id, sink, cancel)
    }
}
