//! Builds summary statistics from decoded samples: aggregate and
//! time-bucketed stats, duration histograms, percentile tables, and status
//! code counts.

use crate::error::{Error, Result};
use crate::model::stats::{CodeCounts, Histogram, Percentiles, Stats, Timeseries};
use crate::model::Sample;
use std::ops::Range;

/// Stats over a whole group of samples. Reorders the slice by duration.
pub fn calc_aggregate_stats(samples: &mut [Sample]) -> Stats {
    samples.sort_by(Sample::cmp_duration);
    create_stats(0, samples)
}

/// Stats per time bucket of `span_millis`. Reorders the slice.
///
/// Buckets are `[i*span, (i+1)*span)`; the last bucket also takes samples
/// landing exactly on its end boundary so none are lost. A bucket without
/// samples yields an empty row, keeping row indexes aligned with time.
pub fn calc_timeseries_stats(samples: &mut [Sample], span_millis: i64) -> Timeseries {
    samples.sort_by(|a, b| a.offset_millis.cmp(&b.offset_millis));
    let num_bins = num_bins(samples, span_millis);
    let ranges = bin_ranges(samples, num_bins, span_millis);
    let mut rows = Vec::with_capacity(num_bins);
    for (i, range) in ranges.into_iter().enumerate() {
        let bin = &mut samples[range];
        bin.sort_by(Sample::cmp_duration);
        rows.push(create_stats(i as i64 * span_millis, bin));
    }
    Timeseries { span_millis, rows }
}

/// One pass over the durations producing both the logarithmic-bucket
/// histogram and the percentile table.
pub fn calc_histogram(samples: &[Sample]) -> Result<(Histogram, Percentiles)> {
    if samples.is_empty() {
        return Ok((Histogram::default(), Percentiles::default()));
    }
    let max_duration = samples
        .iter()
        .map(|s| s.duration_millis.max(0) as u64)
        .max()
        .unwrap_or(0);
    let mut hist = hdrhistogram::Histogram::<u32>::new_with_max(max_duration.max(2), 5)
        .map_err(|e| Error::Internal(format!("creating histogram: {}", e)))?;
    for sample in samples {
        hist.record(sample.duration_millis.max(0) as u64)
            .map_err(|e| Error::Internal(format!("recording duration: {}", e)))?;
    }

    let mut counts = Vec::new();
    let mut bucket_maximums = Vec::new();
    let mut previous_to = -1i64;
    for value in hist.iter_log(1, 1.1) {
        let to = value.value_iterated_to() as i64;
        let count = value.count_since_last_iteration() as i64;
        // A value lands in exactly one bucket, so a repeated to-value with
        // nothing added is just iterator chatter.
        if previous_to == to && count == 0 {
            continue;
        }
        counts.push(count);
        bucket_maximums.push(to);
        previous_to = to;
    }
    let histogram = Histogram { counts, bucket_maximums };

    let mut perc_counts = Vec::new();
    let mut perc_values = Vec::new();
    let mut perc_points = Vec::new();
    for value in hist.iter_quantiles(5) {
        perc_counts.push(value.count_since_last_iteration() as i64);
        perc_values.push(value.value_iterated_to() as i64);
        perc_points.push(value.quantile_iterated_to() * 100.0);
    }
    let percentiles =
        Percentiles { counts: perc_counts, values: perc_values, percentiles: perc_points };

    Ok((histogram, percentiles))
}

/// Status code occurrences over the whole group, as a single bin with
/// `span_millis == 0`.
pub fn calc_aggregate_counts(samples: &[Sample]) -> CodeCounts {
    let mut builder = CodeCounts::builder(0);
    for sample in samples {
        builder.increment(&sample.status_code);
    }
    builder.commit_bin();
    builder.build()
}

/// Status code occurrences per time bucket. Reorders the slice by offset.
pub fn calc_timeseries_counts(samples: &mut [Sample], span_millis: i64) -> CodeCounts {
    samples.sort_by(|a, b| a.offset_millis.cmp(&b.offset_millis));
    let num_bins = num_bins(samples, span_millis);
    let ranges = bin_ranges(samples, num_bins, span_millis);
    let mut builder = CodeCounts::builder(span_millis);
    for range in ranges {
        for sample in &samples[range] {
            builder.increment(&sample.status_code);
        }
        builder.commit_bin();
    }
    builder.build()
}

/// Sorts the slice by label (then offset) and returns one `(label, range)`
/// per distinct label. The ranges index into the re-sorted slice and stay
/// valid until the caller sorts it again.
pub fn sort_and_split_by_label(samples: &mut [Sample]) -> Vec<(String, Range<usize>)> {
    samples.sort_by(Sample::cmp_label_offset);
    let mut groups = Vec::new();
    let mut start = 0usize;
    for i in 1..=samples.len() {
        if i == samples.len() || samples[i].label != samples[start].label {
            groups.push((samples[start].label.to_string(), start..i));
            start = i;
        }
    }
    groups
}

/// Stats over samples already ordered from shortest duration to longest.
fn create_stats(offset_millis: i64, duration_ordered: &[Sample]) -> Stats {
    let mut stats = Stats::empty(offset_millis);
    if !duration_ordered.is_empty() {
        stats.min = Some(duration_ordered[0].duration_millis);
        stats.p25 = Some(percentile_element(duration_ordered, 0.25).duration_millis);
        stats.p50 = Some(percentile_element(duration_ordered, 0.50).duration_millis);
        stats.p75 = Some(percentile_element(duration_ordered, 0.75).duration_millis);
        stats.p90 = Some(percentile_element(duration_ordered, 0.90).duration_millis);
        stats.p95 = Some(percentile_element(duration_ordered, 0.95).duration_millis);
        stats.p99 = Some(percentile_element(duration_ordered, 0.99).duration_millis);
        stats.max = Some(duration_ordered[duration_ordered.len() - 1].duration_millis);
    }
    let mut cumulative_duration = 0i64;
    for sample in duration_ordered {
        cumulative_duration += sample.duration_millis;
        stats.total_response_bytes += sample.response_bytes;
        if !sample.success {
            stats.num_errors += 1;
        }
    }
    stats.num_samples = duration_ordered.len() as i64;
    if stats.num_samples != 0 {
        stats.avg = Some(cumulative_duration / stats.num_samples);
    }
    stats
}

/// The element at percentile `percent` of a duration-ordered slice:
/// index `ceil((n - 1) * percent)`.
fn percentile_element(duration_ordered: &[Sample], percent: f64) -> &Sample {
    let index = ((duration_ordered.len() - 1) as f64 * percent).ceil() as usize;
    &duration_ordered[index]
}

fn num_bins(offset_sorted: &[Sample], span_millis: i64) -> usize {
    let last_offset = offset_sorted.last().map_or(0, |s| s.offset_millis);
    let bins = (last_offset as f64 / span_millis as f64).ceil() as usize;
    bins.max(1)
}

/// Splits an offset-sorted slice into `num_bins` contiguous ranges of
/// `[i*span, (i+1)*span)`. The final range absorbs any samples at or past
/// its start boundary.
fn bin_ranges(offset_sorted: &[Sample], num_bins: usize, span_millis: i64) -> Vec<Range<usize>> {
    let mut ranges = Vec::with_capacity(num_bins);
    let mut start = 0usize;
    for i in 0..num_bins {
        if i == num_bins - 1 {
            ranges.push(start..offset_sorted.len());
            break;
        }
        let end_offset = span_millis * (i as i64 + 1);
        let mut end = start;
        while end < offset_sorted.len() && offset_sorted[end].offset_millis < end_offset {
            end += 1;
        }
        ranges.push(start..end);
        start = end;
    }
    ranges
}
