// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Text input: complex numbers typed by a person, one per line.
//!
//! Accepted forms are a real part, an imaginary part, or both joined by
//! a sign: `7`, `-2.5i`, `3+4i`, `1 - 2i`.  A bare `i` (`i`, `+i`, `-i`)
//! is the unit imaginary, and the `i` may also be written before its
//! magnitude, as in `1 - i2`.

use crate::complex::Complex;
use crate::errors::{FractalError, Result};
use std::io::BufRead;
use std::str::FromStr;

/// Given a string and a separator, returns the two values
/// separated by the separator.
pub fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    match s.find(separator) {
        None => None,
        Some(index) => match (
            T::from_str(s[..index].trim()),
            T::from_str(s[index + 1..].trim()),
        ) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

/// A cursor over the bytes of the text being parsed.
struct Scanner<'a> {
    text: &'a str,
    at: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Scanner { text, at: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.at).cloned()
    }

    fn done(&self) -> bool {
        self.at == self.text.len()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().map_or(false, |b| b.is_ascii_whitespace()) {
            self.at += 1;
        }
    }

    /// `+` gives 1, `-` gives -1, anything else consumes nothing.
    fn sign(&mut self) -> Option<f64> {
        let sign = match self.peek() {
            Some(b'+') => 1.0,
            Some(b'-') => -1.0,
            _ => return None,
        };
        self.at += 1;
        Some(sign)
    }

    fn imaginary_unit(&mut self) -> bool {
        if self.peek() == Some(b'i') {
            self.at += 1;
            true
        } else {
            false
        }
    }

    /// Digits with at most one decimal point, and at least one digit.
    fn magnitude(&mut self) -> Option<f64> {
        let start = self.at;
        let mut seen_point = false;
        let mut seen_digit = false;
        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' => seen_digit = true,
                b'.' if !seen_point => seen_point = true,
                _ => break,
            }
            self.at += 1;
        }
        if !seen_digit {
            self.at = start;
            return None;
        }
        f64::from_str(&self.text[start..self.at]).ok()
    }

    /// The magnitude of an imaginary term, whichever side of the `i`
    /// it was written on.  Nothing at all means 1.
    fn imaginary(&mut self) -> Option<f64> {
        if self.imaginary_unit() {
            return Some(self.magnitude().unwrap_or(1.0));
        }
        let magnitude = self.magnitude()?;
        if self.imaginary_unit() {
            Some(magnitude)
        } else {
            None
        }
    }
}

/// Reads a complex number.  Surrounding whitespace is ignored, and so is
/// whitespace around the sign joining the two parts.
pub fn parse_complex(text: &str) -> Result<Complex> {
    let trimmed = text.trim();
    let fail = || FractalError::parse(trimmed);
    let mut scanner = Scanner::new(trimmed);

    let leading = scanner.sign().unwrap_or(1.0);
    scanner.skip_whitespace();

    // Only an imaginary part.
    let checkpoint = scanner.at;
    if let Some(im) = scanner.imaginary() {
        if scanner.done() {
            return Ok(Complex::new(0.0, leading * im));
        }
    }
    scanner.at = checkpoint;

    let re = leading * scanner.magnitude().ok_or_else(fail)?;
    scanner.skip_whitespace();
    if scanner.done() {
        return Ok(Complex::new(re, 0.0));
    }

    let sign = scanner.sign().ok_or_else(fail)?;
    scanner.skip_whitespace();
    let im = sign * scanner.imaginary().ok_or_else(fail)?;
    if !scanner.done() {
        return Err(fail());
    }
    Ok(Complex::new(re, im))
}

/// Reads roots one per line until a line reading `done` (in any case)
/// or the end of input.  Blank lines are skipped.  A line that does not
/// parse is reported with its 1-based line number.
pub fn read_roots<R: BufRead>(reader: R) -> Result<Vec<Complex>> {
    let mut roots = vec![];
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("done") {
            break;
        }
        roots.push(parse_complex(line).map_err(|e| e.at_line(number + 1))?);
    }
    Ok(roots)
}
