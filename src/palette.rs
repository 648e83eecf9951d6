//! Turns a classification buffer into pixels.  Index 0 (no
//! convergence) is black; the roots are spread evenly around the hue
//! wheel at full saturation, in root order.

/// An 8-bit RGB triple.
pub type Rgb = [u8; 3];

/// The color for hue `hue` in degrees, `[0, 360)`.
fn hue_to_rgb(hue: f64) -> Rgb {
    let x = (255.0 * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs())).round() as u8;
    match hue {
        h if h < 60.0 => [255, x, 0],
        h if h < 120.0 => [x, 255, 0],
        h if h < 180.0 => [0, 255, x],
        h if h < 240.0 => [0, x, 255],
        h if h < 300.0 => [x, 0, 255],
        _ => [255, 0, x],
    }
}

/// One color per classification index, `color_count` of them.
pub fn palette(color_count: usize) -> Vec<Rgb> {
    let roots = color_count.saturating_sub(1);
    let mut colors = vec![[0, 0, 0]];
    colors.extend((0..roots).map(|i| hue_to_rgb(360.0 * i as f64 / roots as f64)));
    colors
}

/// Interleaved RGB bytes for `data`.  Indices outside the palette,
/// which a well-behaved producer never emits, are painted white.
pub fn colorize(data: &[i16], color_count: usize) -> Vec<u8> {
    let colors = palette(color_count);
    let mut pixels = Vec::with_capacity(data.len() * 3);
    for &index in data {
        let color = if index >= 0 {
            colors.get(index as usize).cloned()
        } else {
            None
        };
        pixels.extend_from_slice(&color.unwrap_or([255, 255, 255]));
    }
    pixels
}
