use clap::{App, Arg, ArgMatches};
use image::pnm::PNMEncoder;
use image::pnm::{PNMSubtype, SampleEncoding};
use image::ColorType;
use log::{info, warn};
use std::fs::File;
use std::io;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;

use newtonbrot::palette::colorize;
use newtonbrot::util::parse_pair;
use newtonbrot::{
    read_roots, Complex, EngineConfig, FractalError, FractalProducer, NewtonConfig,
    ParallelProducer, Rendering, Result, SequentialProducer, Viewport, ZeroDerivative,
};

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> std::result::Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> std::result::Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const WORKERS: &str = "workers";
const TRACKS: &str = "tracks";
const ITERATIONS: &str = "iterations";
const ZERO_DERIVATIVE: &str = "zero-derivative";
const SEQUENTIAL: &str = "sequential";

fn args<'a>() -> ArgMatches<'a> {
    App::new("newton")
        .version("0.1.0")
        .about("Newton-Raphson fractal renderer.  Reads roots from standard input, one per line, until 'done'.")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file (binary PPM)"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("600x600")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(LEFTLOWER)
                .required(false)
                .long(LEFTLOWER)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-2,-2")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse left lower corner"))
                .help("Left lower corner of the complex plane, as re,im"),
        )
        .arg(
            Arg::with_name(RIGHTUPPER)
                .required(false)
                .long(RIGHTUPPER)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("2,2")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse right upper corner"))
                .help("Right upper corner of the complex plane, as re,im"),
        )
        .arg(
            Arg::with_name(WORKERS)
                .required(false)
                .long(WORKERS)
                .short("w")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1024,
                        "Could not parse worker count",
                        "Worker count must be between 1 and 1024",
                    )
                })
                .help("Number of worker threads (default: one per CPU)"),
        )
        .arg(
            Arg::with_name(TRACKS)
                .required(false)
                .long(TRACKS)
                .short("t")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        std::usize::MAX,
                        "Could not parse track count",
                        "Number of tracks must be 1 or greater",
                    )
                })
                .help("Number of row bands (default: four per worker)"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("4096")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 1000000",
                    )
                })
                .help("Maximum Newton steps per pixel"),
        )
        .arg(
            Arg::with_name(ZERO_DERIVATIVE)
                .required(false)
                .long(ZERO_DERIVATIVE)
                .takes_value(true)
                .possible_values(&["perturb", "none", "fail"])
                .default_value("perturb")
                .help("What to do when the derivative vanishes"),
        )
        .arg(
            Arg::with_name(SEQUENTIAL)
                .long(SEQUENTIAL)
                .help("Compute on a single thread"),
        )
        .get_matches()
}

/// A value clap has already validated, parsed again for real.
fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T> {
    let text = matches
        .value_of(name)
        .ok_or_else(|| FractalError::invalid(format!("missing --{}", name)))?;
    T::from_str(text).map_err(|_| FractalError::invalid(format!("bad --{}: {}", name, text)))
}

fn pair<T: FromStr>(matches: &ArgMatches, name: &str, separator: char) -> Result<(T, T)> {
    let text = matches.value_of(name).unwrap_or_default();
    parse_pair(text, separator)
        .ok_or_else(|| FractalError::invalid(format!("bad --{}: {}", name, text)))
}

fn write_image(outfile: &str, pixels: &[u8], bounds: (usize, usize)) -> Result<()> {
    let output = File::create(outfile)?;
    let mut encoder =
        PNMEncoder::new(output).with_subtype(PNMSubtype::Pixmap(SampleEncoding::Binary));
    encoder.encode(pixels, bounds.0 as u32, bounds.1 as u32, ColorType::RGB(8))?;
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<()> {
    let (width, height) = pair::<usize>(matches, SIZE, 'x')?;
    let (ll_re, ll_im) = pair::<f64>(matches, LEFTLOWER, ',')?;
    let (ru_re, ru_im) = pair::<f64>(matches, RIGHTUPPER, ',')?;
    let viewport = Viewport::from_corners(
        Complex::new(ll_re, ll_im),
        Complex::new(ru_re, ru_im),
        width,
        height,
    )?;

    let engine = match matches.value_of(WORKERS) {
        Some(_) => EngineConfig::with_workers(value(matches, WORKERS)?)?,
        None => EngineConfig::default(),
    };
    let engine = match matches.value_of(TRACKS) {
        Some(_) => EngineConfig::new(engine.workers, value(matches, TRACKS)?)?,
        None => engine,
    };
    let zero_derivative = match matches.value_of(ZERO_DERIVATIVE) {
        Some("none") => ZeroDerivative::NoConvergence,
        Some("fail") => ZeroDerivative::Fail,
        _ => ZeroDerivative::Perturb,
    };
    let newton = NewtonConfig::default()
        .with_max_iterations(value(matches, ITERATIONS)?)
        .with_zero_derivative(zero_derivative);

    eprintln!("Welcome to the Newton-Raphson iteration-based fractal renderer.");
    eprintln!("Please enter at least two roots, one root per line. Enter 'done' when done.");
    let stdin = io::stdin();
    let roots = read_roots(stdin.lock())?;
    if roots.len() < 2 {
        return Err(FractalError::invalid(format!(
            "at least two roots are needed, got {}",
            roots.len()
        )));
    }

    let mut producer: Box<dyn FractalProducer> = if matches.is_present(SEQUENTIAL) {
        Box::new(SequentialProducer::new(roots).with_newton(newton))
    } else {
        info!("{} workers, {} tracks", engine.workers, engine.tracks);
        Box::new(ParallelProducer::new(roots, engine).with_newton(newton))
    };

    let cancel = AtomicBool::new(false);
    let mut results: Vec<Rendering> = Vec::new();
    let report = producer.produce(&viewport, 1, &mut results, &cancel)?;
    for failure in &report.failures {
        warn!(
            "rows {}..={} stopped at {:?}: {}",
            failure.y_min, failure.y_max, failure.pixel, failure.error
        );
    }

    let rendering = results
        .pop()
        .ok_or_else(|| FractalError::Queue("no result was delivered".to_string()))?;
    let pixels = colorize(&rendering.data, rendering.color_count);
    let outfile = matches.value_of(OUTPUT).unwrap_or_default();
    write_image(outfile, &pixels, (width, height))?;
    info!("wrote {}", outfile);
    Ok(())
}

fn main() {
    env_logger::init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
