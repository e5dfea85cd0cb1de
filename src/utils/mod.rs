//! Small numeric helpers shared by the metrics domains.

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Share of `tic_delta` in `tot_delta` as a whole percentage (0..=100),
/// rounded half up.
///
/// With `inverse` the share of everything *except* `tic_delta` is
/// returned, which turns an idle counter into a busy percentage. In that
/// mode an interval with no elapsed ticks counts as fully busy, unless
/// nothing at all was collected yet.
pub fn percentage(tic_delta: u64, tot_delta: u64, inverse: bool) -> u64 {
    let mut tic = tic_delta;
    let mut ans = 0;

    if inverse {
        tic = tot_delta.saturating_sub(tic_delta);
        if tic_delta != 0 || tot_delta != 0 {
            ans = 100;
        }
    }

    if tot_delta > 0 {
        ans = (((tic as f64 / tot_delta as f64) * 100.0 + 0.5) as u64).min(100);
    }
    ans
}

/// Bytes to megabytes, rounded up the way `df` reports sizes.
pub fn bytes_to_megabytes_ceil(bytes: f64) -> u64 {
    (bytes / BYTES_PER_MB).ceil() as u64
}
