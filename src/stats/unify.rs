//! Re-projects percentile tables from different sources onto one shared
//! percentile axis so they can be charted against each other.

use crate::model::stats::Percentiles;

/// The shared axis: whole percents over most of the range, denser points in
/// the tail where load-test distributions do their interesting things.
#[rustfmt::skip]
pub const PERCENTILE_POINTS: [f64; 116] = [
    0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0,
    10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0, 18.0, 19.0,
    20.0, 21.0, 22.0, 23.0, 24.0, 25.0, 26.0, 27.0, 28.0, 29.0,
    30.0, 31.0, 32.0, 33.0, 34.0, 35.0, 36.0, 37.0, 38.0, 39.0,
    40.0, 41.0, 42.0, 43.0, 44.0, 45.0, 46.0, 47.0, 48.0, 49.0,
    50.0, 51.0, 52.0, 53.0, 54.0, 55.0, 56.0, 57.0, 58.0, 59.0,
    60.0, 61.0, 62.0, 63.0, 64.0, 65.0, 66.0, 67.0, 68.0, 69.0,
    70.0, 71.0, 72.0, 73.0, 74.0, 75.0, 76.0, 77.0, 78.0, 79.0,
    80.0, 81.0, 82.0, 83.0, 84.0, 85.0, 86.0, 87.0, 88.0, 89.0,
    90.0, 91.0, 92.0, 93.0, 94.0, 95.0, 96.0, 97.0, 97.5, 98.0,
    98.25, 98.5, 98.75, 99.0, 99.125, 99.25, 99.375, 99.5, 99.625, 99.75,
    99.875, 99.9, 99.99, 99.999, 99.9999, 100.0,
];

/// Several percentile tables sampled at the shared axis. `series[i][j]` is
/// source `i` at `points[j]`, `None` when that source had no data at all.
#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedPercentiles {
    pub points: Vec<f64>,
    pub series: Vec<Vec<Option<i64>>>,
}

/// Samples every source at each axis point. Between two of a source's own
/// points the value is linearly interpolated; outside the source's range it
/// clamps to the first or last value. A source with a single distinct point
/// becomes a constant line.
pub fn unify(sources: &[Percentiles]) -> UnifiedPercentiles {
    let series = sources
        .iter()
        .map(|source| {
            let (xs, ys) = distinct_points(source);
            if xs.is_empty() {
                return vec![None; PERCENTILE_POINTS.len()];
            }
            PERCENTILE_POINTS
                .iter()
                .map(|&x| Some(sample_at(&xs, &ys, x)))
                .collect()
        })
        .collect();
    UnifiedPercentiles { points: PERCENTILE_POINTS.to_vec(), series }
}

/// Drops consecutive points with a repeated percentile, keeping the first of
/// each run, so interpolation never sees a zero-width segment.
fn distinct_points(source: &Percentiles) -> (Vec<f64>, Vec<f64>) {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for (i, (&perc, &value)) in
        source.percentiles.iter().zip(source.values.iter()).enumerate()
    {
        if i == 0 || perc != source.percentiles[i - 1] {
            xs.push(perc);
            ys.push(value as f64);
        }
    }
    (xs, ys)
}

fn sample_at(xs: &[f64], ys: &[f64], x: f64) -> i64 {
    if x <= xs[0] {
        return ys[0].round() as i64;
    }
    if x >= xs[xs.len() - 1] {
        return ys[ys.len() - 1].round() as i64;
    }
    // xs is strictly increasing, so x sits inside some segment.
    let mut k = 0;
    while k + 1 < xs.len() && xs[k + 1] < x {
        k += 1;
    }
    let (x0, x1) = (xs[k], xs[k + 1]);
    let (y0, y1) = (ys[k], ys[k + 1]);
    let y = y0 + (y1 - y0) * (x - x0) / (x1 - x0);
    y.round() as i64
}
