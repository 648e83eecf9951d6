use newtonbrot::classifier::ZeroDerivative;
use newtonbrot::parallel;
use newtonbrot::sequential;
use newtonbrot::{
    Complex, EngineConfig, FractalProducer, NewtonConfig, ParallelProducer, Pixel, Rendering,
    SequentialProducer, Viewport,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn random_roots(rng: &mut StdRng, count: usize) -> Vec<Complex> {
    (0..count)
        .map(|_| Complex::new(rng.gen_range(-1.5, 1.5), rng.gen_range(-1.5, 1.5)))
        .collect()
}

fn parallel_buffer(viewport: &Viewport, roots: &[Complex], workers: usize, tracks: usize) -> Vec<i16> {
    let mut sink: Vec<Rendering> = Vec::new();
    let cancel = AtomicBool::new(false);
    let engine = EngineConfig::new(workers, tracks).unwrap();
    parallel::produce(
        viewport,
        &engine,
        roots,
        &NewtonConfig::default(),
        0,
        &mut sink,
        &cancel,
    )
    .unwrap();
    sink.pop().unwrap().data
}

fn sequential_buffer(viewport: &Viewport, roots: &[Complex]) -> Vec<i16> {
    let mut sink: Vec<Rendering> = Vec::new();
    let cancel = AtomicBool::new(false);
    sequential::produce(viewport, roots, &NewtonConfig::default(), 0, &mut sink, &cancel).unwrap();
    sink.pop().unwrap().data
}

#[test]
fn parallel_matches_sequential_for_random_roots() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let viewport = Viewport::new(-2.0, 2.0, -1.5, 1.5, 40, 30).unwrap();
    for count in 2..6 {
        let roots = random_roots(&mut rng, count);
        let reference = sequential_buffer(&viewport, &roots);
        assert!(reference.iter().all(|&v| v >= 0 && (v as usize) <= count));
        for &(workers, tracks) in [(1, 1), (2, 7), (4, 16), (3, 30), (5, 64)].iter() {
            assert_eq!(
                parallel_buffer(&viewport, &roots, workers, tracks),
                reference,
                "roots = {:?}, workers = {}, tracks = {}",
                roots,
                workers,
                tracks
            );
        }
    }
}

#[test]
fn repeated_runs_are_identical() {
    let roots = Complex::ONE.nth_roots(4).unwrap();
    let viewport = Viewport::new(-1.0, 1.0, -1.0, 1.0, 33, 21).unwrap();
    let first = parallel_buffer(&viewport, &roots, 4, 9);
    let second = parallel_buffer(&viewport, &roots, 4, 9);
    assert_eq!(first, second);
}

#[test]
fn most_pixels_find_a_root() {
    let roots = Complex::ONE.nth_roots(3).unwrap();
    let viewport = Viewport::new(-2.0, 2.0, -2.0, 2.0, 50, 50).unwrap();
    let data = parallel_buffer(&viewport, &roots, 3, 12);
    let found = data.iter().filter(|&&v| v != 0).count();
    assert!(found * 10 >= data.len() * 9, "only {} of {} classified", found, data.len());
    // A small window around z = 1 lies wholly inside that root's basin.
    let near_one = Viewport::new(0.9, 1.1, -0.1, 0.1, 3, 3).unwrap();
    assert!(parallel_buffer(&near_one, &roots, 2, 2).iter().all(|&v| v == 1));
}

#[test]
fn centre_of_the_small_quadratic_viewport_finds_a_root() {
    let roots = vec![Complex::ONE, Complex::ONE_NEG];
    let viewport = Viewport::new(-2.0, 2.0, -2.0, 2.0, 3, 3).unwrap();
    let mut producer = ParallelProducer::new(roots.clone(), EngineConfig::new(2, 2).unwrap());
    let cancel = AtomicBool::new(false);
    let mut sink: Vec<Rendering> = Vec::new();
    producer.produce(&viewport, 11, &mut sink, &cancel).unwrap();
    let result = sink.pop().unwrap();
    assert_eq!(result.request_id, 11);
    assert_eq!(result.color_count, 3);
    let centre = result.data[viewport.offset(&Pixel(1, 1))];
    assert!(centre == 1 || centre == 2);
    assert_eq!(result.data, sequential_buffer(&viewport, &roots));
}

#[test]
fn zero_derivative_policies_only_differ_on_the_critical_point() {
    let roots = vec![Complex::ONE, Complex::ONE_NEG];
    let viewport = Viewport::new(-2.0, 2.0, -2.0, 2.0, 3, 3).unwrap();
    let cancel = AtomicBool::new(false);
    let mut sink: Vec<Rendering> = Vec::new();
    let give_up = NewtonConfig::default().with_zero_derivative(ZeroDerivative::NoConvergence);
    SequentialProducer::new(roots.clone())
        .with_newton(give_up)
        .produce(&viewport, 0, &mut sink, &cancel)
        .unwrap();
    let centre = viewport.offset(&Pixel(1, 1));
    assert_eq!(sink[0].data[centre], 0);
    let perturbed = sequential_buffer(&viewport, &roots);
    assert_ne!(perturbed[centre], 0);
    assert_eq!(sink[0].data[3], perturbed[3]);
    assert_eq!(sink[0].data[5], perturbed[5]);
}

#[test]
fn cancellation_midway_only_blanks_whole_rows() {
    let roots = Complex::ONE.nth_roots(5).unwrap();
    let viewport = Viewport::new(-2.0, 2.0, -2.0, 2.0, 120, 120).unwrap();
    let reference = sequential_buffer(&viewport, &roots);

    let cancel = Arc::new(AtomicBool::new(false));
    let trigger = {
        let cancel = cancel.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(5));
            cancel.store(true, Ordering::Relaxed);
        })
    };
    let mut sink: Vec<Rendering> = Vec::new();
    let engine = EngineConfig::new(2, 8).unwrap();
    let report = parallel::produce(
        &viewport,
        &engine,
        &roots,
        &NewtonConfig::default(),
        3,
        &mut sink,
        &cancel,
    )
    .unwrap();
    trigger.join().unwrap();

    let data = &sink[0].data;
    let mut blank_rows = 0;
    for (row, expected) in data.chunks(120).zip(reference.chunks(120)) {
        if row != expected {
            assert!(row.iter().all(|&v| v == 0), "a partially computed row");
            blank_rows += 1;
        }
    }
    assert!(report.cancelled(), "the render finished before the cancel flag was raised");
    assert!(report.rows_skipped > 0);
    assert!(blank_rows <= report.rows_skipped);
}
