// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The ParallelProducer splits the image into horizontal bands of
//! rows ("tracks") and hands them to a fixed pool of worker threads
//! through a single FIFO queue.  After the last band, one `NoJob`
//! sentinel per worker goes on the queue; a worker that takes one
//! exits.
//!
//! Each band owns a disjoint `&mut` slice of the result buffer, so the
//! workers write without locks and the borrow checker guarantees the
//! bands cannot overlap.  Since every pixel is classified
//! independently, the result is the same however the image is split.

use crossbeam::channel::{self, Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use crossbeam::thread::ScopedJoinHandle;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::classifier::{NewtonConfig, PixelClassifier};
use crate::complex::Complex;
use crate::errors::{FractalError, Result};
use crate::planes::{Pixel, Viewport};
use crate::producer::{BandFailure, FractalProducer, RenderReport, ResultSink};

/// How long a blocking queue operation waits before trying again.
const QUEUE_POLL: Duration = Duration::from_millis(50);
/// How many times a send is retried before the queue is declared dead.
const SEND_ATTEMPTS: usize = 100;

/// Worker and track counts.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Number of worker threads.
    pub workers: usize,
    /// Number of row bands the image is cut into.  Clamped to the image
    /// height at production time.
    pub tracks: usize,
}

impl Default for EngineConfig {
    /// One worker per logical CPU, four tracks per worker.
    fn default() -> Self {
        let workers = num_cpus::get().max(1);
        EngineConfig {
            workers,
            tracks: 4 * workers,
        }
    }
}

impl EngineConfig {
    /// Both counts must be at least 1.
    pub fn new(workers: usize, tracks: usize) -> Result<Self> {
        let config = EngineConfig { workers, tracks };
        config.validate()?;
        Ok(config)
    }

    /// `workers` workers with the default four tracks each.
    pub fn with_workers(workers: usize) -> Result<Self> {
        EngineConfig::new(workers, 4 * workers)
    }

    /// Checks both counts are positive.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(FractalError::invalid("worker count must be at least 1"));
        }
        if self.tracks == 0 {
            return Err(FractalError::invalid(format!(
                "number of tracks must be 1 or greater, was {}",
                self.tracks
            )));
        }
        Ok(())
    }
}

/// An inclusive range of image rows.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Band {
    /// First row.
    pub y_min: usize,
    /// Last row, inclusive.
    pub y_max: usize,
}

impl Band {
    /// Number of rows in the band.
    pub fn rows(&self) -> usize {
        self.y_max - self.y_min + 1
    }
}

/// Cuts `height` rows into `tracks` contiguous bands of
/// `height / tracks` rows, the last band taking the remainder.  More
/// tracks than rows gives one row per band.
pub fn partition(height: usize, tracks: usize) -> Result<Vec<Band>> {
    if tracks == 0 {
        return Err(FractalError::invalid(
            "number of tracks must be 1 or greater, was 0",
        ));
    }
    if height == 0 {
        return Ok(vec![]);
    }
    let tracks = tracks.min(height);
    let per_track = height / tracks;
    Ok((0..tracks)
        .map(|i| Band {
            y_min: i * per_track,
            y_max: if i == tracks - 1 {
                height - 1
            } else {
                (i + 1) * per_track - 1
            },
        })
        .collect())
}

/// What a band left behind.
#[derive(Debug, Default)]
struct BandOutcome {
    rows_skipped: usize,
    failure: Option<BandFailure>,
}

/// Classifies every pixel of `band` into `out`, which holds exactly the
/// band's rows.  The cancel flag is checked before each row; a row that
/// has started always finishes unless a pixel in it fails.
fn render_band(
    classifier: &PixelClassifier,
    viewport: &Viewport,
    band: Band,
    out: &mut [i16],
    cancel: &AtomicBool,
) -> BandOutcome {
    let width = viewport.width();
    for (y, row) in (band.y_min..=band.y_max).zip(out.chunks_mut(width)) {
        if cancel.load(Ordering::Relaxed) {
            return BandOutcome {
                rows_skipped: band.y_max - y + 1,
                failure: None,
            };
        }
        for (x, cell) in row.iter_mut().enumerate() {
            let pixel = Pixel(x, y);
            match classifier.classify(viewport.pixel_to_point(&pixel)) {
                Ok(index) => *cell = index,
                Err(error) => {
                    return BandOutcome {
                        rows_skipped: 0,
                        failure: Some(BandFailure {
                            y_min: band.y_min,
                            y_max: band.y_max,
                            pixel,
                            error,
                        }),
                    }
                }
            }
        }
    }
    BandOutcome::default()
}

/// One unit of work on the queue.
enum Job<'a> {
    Band(Band, &'a mut [i16]),
    NoJob,
}

/// Puts a job on the queue, retrying while the queue is busy.  Only a
/// queue nobody listens to any more is an error.
fn enqueue<'a>(queue: &Sender<Job<'a>>, job: Job<'a>) -> Result<()> {
    let mut job = job;
    for attempt in 1..=SEND_ATTEMPTS {
        match queue.send_timeout(job, QUEUE_POLL) {
            Ok(()) => return Ok(()),
            Err(SendTimeoutError::Timeout(returned)) => {
                debug!("queue busy, retrying send (attempt {})", attempt);
                job = returned;
            }
            Err(SendTimeoutError::Disconnected(_)) => {
                return Err(FractalError::Queue("every worker has exited".to_string()))
            }
        }
    }
    Err(FractalError::Queue(format!(
        "gave up after {} send attempts",
        SEND_ATTEMPTS
    )))
}

/// Takes the next job, waiting as long as it takes.  A queue with no
/// senders left is treated as a shutdown.
fn dequeue<'a>(queue: &Receiver<Job<'a>>) -> Job<'a> {
    loop {
        match queue.recv_timeout(QUEUE_POLL) {
            Ok(job) => return job,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return Job::NoJob,
        }
    }
}

/// What one worker did over its lifetime.
#[derive(Debug, Default)]
struct WorkerTally {
    bands: usize,
    rows_skipped: usize,
    failures: Vec<BandFailure>,
}

fn worker_loop(
    id: usize,
    queue: Receiver<Job>,
    classifier: &PixelClassifier,
    viewport: &Viewport,
    cancel: &AtomicBool,
) -> WorkerTally {
    let mut tally = WorkerTally::default();
    loop {
        match dequeue(&queue) {
            Job::NoJob => break,
            Job::Band(band, out) => {
                let outcome = render_band(classifier, viewport, band, out, cancel);
                debug!(
                    "worker {} finished rows {}..={} ({} skipped)",
                    id, band.y_min, band.y_max, outcome.rows_skipped
                );
                if let Some(failure) = outcome.failure {
                    warn!(
                        "worker {}: band {}..={} stopped at {:?}: {}",
                        id, band.y_min, band.y_max, failure.pixel, failure.error
                    );
                    tally.failures.push(failure);
                }
                tally.bands += 1;
                tally.rows_skipped += outcome.rows_skipped;
            }
        }
    }
    tally
}

/// Computes `viewport` on `engine.workers` threads and delivers the
/// buffer to `sink`.  Blocks until every worker has exited.
///
/// The color count handed to the sink is `roots.len() + 1`.
pub fn produce(
    viewport: &Viewport,
    engine: &EngineConfig,
    roots: &[Complex],
    newton: &NewtonConfig,
    request_id: u64,
    sink: &mut dyn ResultSink,
    cancel: &AtomicBool,
) -> Result<RenderReport> {
    engine.validate()?;
    let classifier = PixelClassifier::new(roots, *newton)?;
    let bands = partition(viewport.height(), engine.tracks)?;
    let workers = engine.workers;
    info!(
        "request {}: {}x{} pixels, {} workers, {} tracks",
        request_id,
        viewport.width(),
        viewport.height(),
        workers,
        bands.len()
    );

    let mut data = vec![0 as i16; viewport.len()];
    let mut report = RenderReport {
        request_id,
        color_count: classifier.color_count(),
        bands: bands.len(),
        ..RenderReport::default()
    };

    let tallies = crossbeam::scope(|spawner| -> Result<Vec<WorkerTally>> {
        let (jobs, queue) = channel::bounded(bands.len() + workers);
        let classifier = &classifier;
        let handles: Vec<ScopedJoinHandle<WorkerTally>> = (0..workers)
            .map(|id| {
                let queue = queue.clone();
                spawner.spawn(move |_| worker_loop(id, queue, classifier, viewport, cancel))
            })
            .collect();
        drop(queue);

        let mut rest: &mut [i16] = &mut data;
        for band in &bands {
            let (rows, tail) =
                std::mem::take(&mut rest).split_at_mut(band.rows() * viewport.width());
            rest = tail;
            enqueue(&jobs, Job::Band(*band, rows))?;
        }
        for _ in 0..workers {
            enqueue(&jobs, Job::NoJob)?;
        }

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .map_err(|_| FractalError::Queue("a worker panicked".to_string()))
            })
            .collect()
    })
    .map_err(|_| FractalError::Queue("a worker panicked".to_string()))??;

    for tally in tallies {
        debug!("request {}: a worker handled {} bands", request_id, tally.bands);
        report.rows_skipped += tally.rows_skipped;
        report.failures.extend(tally.failures);
    }
    report.failures.sort_by_key(|failure| failure.y_min);

    info!(
        "request {}: done, {} rows skipped, {} bands failed",
        request_id,
        report.rows_skipped,
        report.failures.len()
    );
    sink.accept_result(data, report.color_count, request_id);
    Ok(report)
}

/// A producer for a fixed set of roots, computing on a worker pool.
#[derive(Clone, Debug)]
pub struct ParallelProducer {
    roots: Vec<Complex>,
    engine: EngineConfig,
    newton: NewtonConfig,
}

impl ParallelProducer {
    /// Default Newton settings.
    pub fn new(roots: Vec<Complex>, engine: EngineConfig) -> Self {
        ParallelProducer {
            roots,
            engine,
            newton: NewtonConfig::default(),
        }
    }

    /// Replace the Newton settings.
    pub fn with_newton(mut self, newton: NewtonConfig) -> Self {
        self.newton = newton;
        self
    }

    /// The worker and track counts in use.
    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }
}

impl FractalProducer for ParallelProducer {
    fn produce(
        &mut self,
        viewport: &Viewport,
        request_id: u64,
        sink: &mut dyn ResultSink,
        cancel: &AtomicBool,
    ) -> Result<RenderReport> {
        produce(
            viewport,
            &self.engine,
            &self.roots,
            &self.newton,
            request_id,
            sink,
            cancel,
        )
    }
}
