//! Trailing-window indicators over a bar sequence

use crate::bar::Bar;

/// Close-price moving average windows, in days
pub const CLOSE_MA_WINDOWS: [usize; 3] = [7, 14, 30];

/// Volume moving average window, in days
pub const VOLUME_MA_WINDOW: usize = 20;

/// A bar is spiking when volume exceeds this multiple of its 20-day mean
pub const SPIKE_FACTOR: f64 = 2.0;

/// Populate the moving-average fields on an ordered bar sequence.
///
/// For window `w`, the field at index `i` is the arithmetic mean over
/// bars `[i-w+1 ..= i]` and is only set once `i >= w-1`; earlier indexes
/// stay `None`. The computation is a pure function of the close/volume
/// history, so re-running it over an already augmented sequence yields
/// identical fields.
pub fn augment(bars: &mut [Bar]) {
    for index in 0..bars.len() {
        bars[index].ma7 = trailing_mean(bars, index, 7, |bar| bar.close);
        bars[index].ma14 = trailing_mean(bars, index, 14, |bar| bar.close);
        bars[index].ma30 = trailing_mean(bars, index, 30, |bar| bar.close);
        bars[index].volume_ma20 =
            trailing_mean(bars, index, VOLUME_MA_WINDOW, |bar| bar.volume);
    }
}

/// Mean of `field` over the `window` bars ending at `index`, or `None`
/// while the window is not yet full.
fn trailing_mean(
    bars: &[Bar],
    index: usize,
    window: usize,
    field: impl Fn(&Bar) -> f64,
) -> Option<f64> {
    if index + 1 < window {
        return None;
    }
    let sum: f64 = bars[index + 1 - window..=index].iter().map(field).sum();
    Some(sum / window as f64)
}

/// Whether a bar's volume counts as a spike.
///
/// Undefined (false) while the 20-day volume window is not yet full.
pub fn is_volume_spike(bar: &Bar) -> bool {
    bar.volume_ma20
        .is_some_and(|ma| bar.volume > SPIKE_FACTOR * ma)
}
