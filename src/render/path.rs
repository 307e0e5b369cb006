//! Waveform path projection.
//!
//! Maps the visible sample window to polyline points on a logical canvas:
//! sample index to x ([0, count-1] onto [0, width], linear) and amplitude to
//! y ([-1, 1] onto [height, 0], linear and inverted so positive amplitude
//! sits at the top). The path is recomputed from scratch on every frame and
//! never persisted.

/// Projects `samples` onto a `width` x `height` canvas, one point per
/// sample, in canvas coordinates (y = 0 at the top).
///
/// An empty input yields an empty path; a single sample maps to the left
/// edge at its amplitude height.
pub fn project(samples: &[f32], width: f64, height: f64) -> Vec<(f64, f64)> {
    let count = samples.len();
    if count == 0 {
        return Vec::new();
    }

    let x_step = if count > 1 {
        width / (count - 1) as f64
    } else {
        0.0
    };

    samples
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let x = i as f64 * x_step;
            let y = (1.0 - s as f64) / 2.0 * height;
            (x, y)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDTH: f64 = 800.0;
    const HEIGHT: f64 = 300.0;

    #[test]
    fn empty_input_yields_empty_path() {
        assert!(project(&[], WIDTH, HEIGHT).is_empty());
    }

    #[test]
    fn x_spans_the_canvas_linearly() {
        let samples = [0.0f32; 5];
        let path = project(&samples, WIDTH, HEIGHT);

        assert_eq!(path.len(), 5);
        assert_eq!(path[0].0, 0.0);
        assert_eq!(path[1].0, 200.0);
        assert_eq!(path[4].0, WIDTH);
    }

    #[test]
    fn amplitude_maps_inverted_onto_height() {
        let path = project(&[1.0, 0.0, -1.0], WIDTH, HEIGHT);

        assert_eq!(path[0].1, 0.0); // +1 draws at the top
        assert_eq!(path[1].1, HEIGHT / 2.0);
        assert_eq!(path[2].1, HEIGHT); // -1 draws at the bottom
    }

    #[test]
    fn single_sample_sits_on_the_left_edge() {
        let path = project(&[0.5], WIDTH, HEIGHT);
        assert_eq!(path, vec![(0.0, 75.0)]);
    }
}
