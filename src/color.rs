use eframe::egui::{Color32, ColorImage};
use ndarray::Array2;
use palette::{Hsl, IntoColor, Srgb};

use topas_viewer::Slice;

// ---------------------------------------------------------------------------
// Colour map: value → Color32
// ---------------------------------------------------------------------------

/// Blue (low) through green to red (high) for `t` in `[0, 1]`.
pub fn heat_color(t: f32) -> Color32 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let hsl = Hsl::new(240.0 * (1.0 - t), 0.85, 0.5);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

/// `n` evenly spaced colours of the map, lowest first.
pub fn color_bar_steps(n: usize) -> Vec<Color32> {
    if n < 2 {
        return vec![heat_color(0.0); n];
    }
    (0..n)
        .map(|i| heat_color(i as f32 / (n - 1) as f32))
        .collect()
}

fn normalise(value: f64, (lo, hi): (f64, f64)) -> f32 {
    if hi > lo {
        ((value - lo) / (hi - lo)) as f32
    } else {
        0.0
    }
}

/// Render `values` as an image. Image rows run top-down while slice rows run
/// towards larger coordinates, so rows are flipped.
pub fn colorize(values: &Array2<f64>, clim: (f64, f64)) -> ColorImage {
    let (rows, columns) = values.dim();
    let mut rgba = Vec::with_capacity(rows * columns * 4);
    for row in values.outer_iter().rev() {
        for &v in row.iter() {
            rgba.extend_from_slice(&heat_color(normalise(v, clim)).to_array());
        }
    }
    ColorImage::from_rgba_unmultiplied([columns, rows], &rgba)
}

// ---------------------------------------------------------------------------
// Contrast
// ---------------------------------------------------------------------------

/// Colour limits as percentages of the slice maximum. While the two sliders
/// are crossed the slice's own range is used.
pub fn contrast_limits(slice: &Slice, min_percent: f64, max_percent: f64) -> (f64, f64) {
    let max = slice.max().unwrap_or(0.0);
    if min_percent < max_percent {
        (max * min_percent / 100.0, max * max_percent / 100.0)
    } else {
        (slice.min().unwrap_or(0.0), max)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use topas_viewer::Axis;

    use super::*;

    fn slice_of(values: Array2<f64>) -> Slice {
        Slice {
            stat: "Sum".into(),
            axis: Axis::Z,
            bin: 0,
            position_cm: 0.0,
            values,
            row_axis: Axis::X,
            column_axis: Axis::Y,
            row_extent_cm: (0.0, 1.0),
            column_extent_cm: (0.0, 1.0),
        }
    }

    #[test]
    fn ends_of_the_map() {
        let low = heat_color(0.0);
        assert!(low.b() > 200 && low.r() < 40 && low.g() < 40);
        let high = heat_color(1.0);
        assert!(high.r() > 200 && high.b() < 40);
        assert_eq!(heat_color(2.0), heat_color(1.0));
        assert_eq!(heat_color(f32::NAN), heat_color(0.0));
        assert_eq!(color_bar_steps(5).len(), 5);
    }

    #[test]
    fn image_size_and_row_flip() {
        let values = array![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]];
        let image = colorize(&values, (0.0, 1.0));
        assert_eq!(image.size, [3, 2]);
        // top image row shows the last slice row
        assert_eq!(image.pixels[0], heat_color(1.0));
        assert_eq!(image.pixels[3], heat_color(0.0));
    }

    #[test]
    fn contrast_in_percent_of_maximum() {
        let cut = slice_of(array![[1.0, 4.0], [2.0, 8.0]]);
        assert_eq!(contrast_limits(&cut, 25.0, 50.0), (2.0, 4.0));
        assert_eq!(contrast_limits(&cut, 60.0, 60.0), (1.0, 8.0));
    }
}
