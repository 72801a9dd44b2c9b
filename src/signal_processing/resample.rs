//! Band-limited resampling
//!
//! Ratios that reduce exactly to a small `p/q` go through a polyphase
//! filter: the signal is (conceptually) zero-stuffed by `p`, low-pass
//! filtered with a Kaiser-windowed sinc and decimated by `q`. Only the
//! filter taps that touch real input samples are evaluated. The filter's
//! group delay is compensated so output sample `m` lines up with input
//! position `m·q/p`.
//!
//! Any other positive ratio is handled by evaluating the same kind of
//! windowed sinc directly at the fractional input positions `m / ratio`.

use std::f64::consts::PI;

use crate::constants::{MAX_RATIO_TERM, RATIO_TOLERANCE, RESAMPLE_HALF_LENGTH, RESAMPLE_KAISER_BETA};
use crate::error::{AnalysisError, Result};
use crate::waveform::Waveform;

/// Resample ratio in lowest terms: output rate = input rate · up / down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RationalRatio {
    pub up: usize,
    pub down: usize,
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

impl RationalRatio {
    pub fn new(up: usize, down: usize) -> Result<Self> {
        if up == 0 || down == 0 {
            return Err(AnalysisError::InvalidRatio(up as f64 / down.max(1) as f64));
        }
        let g = gcd(up, down);
        Ok(Self {
            up: up / g,
            down: down / g,
        })
    }

    /// Best continued-fraction approximation of `ratio` whose terms stay
    /// within [`MAX_RATIO_TERM`].
    ///
    /// Returns `None` for non-positive or non-finite ratios and for ratios
    /// with no bounded convergent (beyond `MAX_RATIO_TERM` or below its
    /// reciprocal). The result may be inexact; see [`Self::matches`].
    pub fn approximate(ratio: f64) -> Option<Self> {
        if !(ratio.is_finite() && ratio > 0.0) {
            return None;
        }

        // Convergents h/k of the continued fraction expansion
        let (mut h_prev, mut h) = (0u64, 1u64);
        let (mut k_prev, mut k) = (1u64, 0u64);
        let mut best: Option<(u64, u64)> = None;
        let mut x = ratio;

        for _ in 0..64 {
            let a = x.floor();
            if a > MAX_RATIO_TERM as f64 {
                break;
            }
            let a = a as u64;
            let h_next = a * h + h_prev;
            let k_next = a * k + k_prev;
            if h_next > MAX_RATIO_TERM || k_next > MAX_RATIO_TERM {
                break;
            }
            (h_prev, h) = (h, h_next);
            (k_prev, k) = (k, k_next);
            if h > 0 {
                best = Some((h, k));
                if ((h as f64 / k as f64) - ratio).abs() <= RATIO_TOLERANCE * ratio {
                    break;
                }
            }
            let frac = x - x.floor();
            if frac < 1e-12 {
                break;
            }
            x = 1.0 / frac;
        }

        best.and_then(|(up, down)| Self::new(up as usize, down as usize).ok())
    }

    pub fn as_f64(&self) -> f64 {
        self.up as f64 / self.down as f64
    }

    /// True when this ratio equals `ratio` within [`RATIO_TOLERANCE`].
    pub fn matches(&self, ratio: f64) -> bool {
        (self.as_f64() - ratio).abs() <= RATIO_TOLERANCE * ratio
    }

    /// Number of output samples produced for `input_len` input samples.
    pub fn output_len(&self, input_len: usize) -> usize {
        (input_len * self.up).div_ceil(self.down)
    }
}

/// Zeroth-order modified Bessel function of the first kind (series form).
fn bessel_i0(x: f64) -> f64 {
    let half = x / 2.0;
    let mut term = 1.0;
    let mut sum = 1.0;
    for k in 1..50 {
        term *= (half / k as f64) * (half / k as f64);
        sum += term;
        if term < sum * 1e-16 {
            break;
        }
    }
    sum
}

fn kaiser_window(len: usize, beta: f64) -> Vec<f64> {
    if len == 1 {
        return vec![1.0];
    }
    let denom = bessel_i0(beta);
    let m = (len - 1) as f64;
    (0..len)
        .map(|n| {
            let r = 2.0 * n as f64 / m - 1.0;
            bessel_i0(beta * (1.0 - r * r).max(0.0).sqrt()) / denom
        })
        .collect()
}

/// Polyphase resampler for a fixed rational ratio.
///
/// Holds the prototype filter so the same ratio can be applied to several
/// signals without redesigning it.
pub struct Resampler {
    ratio: RationalRatio,
    taps: Vec<f64>,
    delay: usize,
}

impl Resampler {
    pub fn new(ratio: RationalRatio) -> Self {
        let max_pq = ratio.up.max(ratio.down);
        let half_len = RESAMPLE_HALF_LENGTH * max_pq;
        let len = 2 * half_len + 1;
        let cutoff = 1.0 / max_pq as f64;
        let window = kaiser_window(len, RESAMPLE_KAISER_BETA);

        let mut taps: Vec<f64> = (0..len)
            .map(|i| {
                let x = i as f64 - half_len as f64;
                let sinc = if x == 0.0 {
                    cutoff
                } else {
                    (PI * cutoff * x).sin() / (PI * x)
                };
                sinc * window[i]
            })
            .collect();

        // Unity gain per polyphase branch: the taps sum to `up`
        let sum: f64 = taps.iter().sum();
        if sum.abs() > 0.0 {
            let scale = ratio.up as f64 / sum;
            for t in taps.iter_mut() {
                *t *= scale;
            }
        }

        Self {
            ratio,
            taps,
            delay: half_len,
        }
    }

    pub fn ratio(&self) -> RationalRatio {
        self.ratio
    }

    pub fn num_taps(&self) -> usize {
        self.taps.len()
    }

    pub fn process(&self, input: &[f32]) -> Vec<f32> {
        let RationalRatio { up, down } = self.ratio;
        if up == down {
            return input.to_vec();
        }

        let out_len = self.ratio.output_len(input.len());
        let last_tap = self.taps.len() - 1;
        let mut output = Vec::with_capacity(out_len);

        for m in 0..out_len {
            // Position in the zero-stuffed sequence, delay compensated
            let pos = m * down + self.delay;
            let j_max = (pos / up).min(input.len().saturating_sub(1));
            let j_min = if pos > last_tap {
                (pos - last_tap).div_ceil(up)
            } else {
                0
            };

            let mut acc = 0.0f64;
            let mut j = j_min;
            while j <= j_max && j < input.len() {
                acc += input[j] as f64 * self.taps[pos - j * up];
                j += 1;
            }
            output.push(acc as f32);
        }

        output
    }
}

/// Kaiser-windowed sinc resampling at an arbitrary ratio.
///
/// Output sample `m` is the kernel-weighted sum of the inputs around
/// position `m / ratio`. When downsampling, the kernel is stretched so its
/// cutoff sits at the output Nyquist frequency. Weights are normalised over
/// the full kernel span, so the interior has unity DC gain and the edges
/// roll off as they do in the polyphase path.
fn interpolate(input: &[f32], ratio: f64) -> Vec<f32> {
    let out_len = (input.len() as f64 * ratio).ceil() as usize;
    let cutoff = ratio.min(1.0);
    let half_width = RESAMPLE_HALF_LENGTH as f64 / cutoff;
    let denom = bessel_i0(RESAMPLE_KAISER_BETA);
    let last = input.len() as i64 - 1;

    (0..out_len)
        .map(|m| {
            let x = m as f64 / ratio;
            let j_min = (x - half_width).ceil() as i64;
            let j_max = (x + half_width).floor() as i64;

            let mut acc = 0.0f64;
            let mut norm = 0.0f64;
            for j in j_min..=j_max {
                let t = x - j as f64;
                let r = t / half_width;
                let window = bessel_i0(RESAMPLE_KAISER_BETA * (1.0 - r * r).max(0.0).sqrt()) / denom;
                let arg = PI * cutoff * t;
                let sinc = if arg == 0.0 { 1.0 } else { arg.sin() / arg };
                let weight = sinc * window;
                norm += weight;
                if (0..=last).contains(&j) {
                    acc += input[j as usize] as f64 * weight;
                }
            }
            if norm.abs() > 0.0 { (acc / norm) as f32 } else { 0.0 }
        })
        .collect()
}

/// Resample `values` so the output length scales by `ratio`.
///
/// Ratios that reduce exactly to `p/q` within the term bound (see
/// [`RationalRatio::approximate`]) use the polyphase [`Resampler`] and
/// give `ceil(len·p/q)` samples. Every other positive ratio is
/// interpolated directly and gives `ceil(len·ratio)` samples.
pub fn resample(values: &[f32], ratio: f64) -> Result<Vec<f32>> {
    if !(ratio.is_finite() && ratio > 0.0) {
        return Err(AnalysisError::InvalidRatio(ratio));
    }
    match RationalRatio::approximate(ratio) {
        Some(rational) if rational.matches(ratio) => Ok(Resampler::new(rational).process(values)),
        _ => {
            log::trace!("No exact p/q for ratio {}, interpolating directly", ratio);
            Ok(interpolate(values, ratio))
        }
    }
}

/// Two signals brought to a common sample period.
#[derive(Debug, Clone)]
pub struct AlignedPair {
    pub first: Vec<f32>,
    pub second: Vec<f32>,
    pub sample_period: f64,
}

/// Resample whichever waveform has the larger sample period up to the rate
/// of the other one.
///
/// The upsampling ratio is `larger_period / smaller_period`. Waveforms with
/// equal periods are returned unchanged.
pub fn align_sample_rates(first: &Waveform, second: &Waveform) -> Result<AlignedPair> {
    let p1 = first.sample_period();
    let p2 = second.sample_period();

    if (p1 - p2).abs() <= RATIO_TOLERANCE * p1.max(p2) {
        return Ok(AlignedPair {
            first: first.values(),
            second: second.values(),
            sample_period: p1,
        });
    }

    if p1 > p2 {
        let ratio = p1 / p2;
        log::debug!("Upsampling first signal by {:.4} to {:.6}s period", ratio, p2);
        Ok(AlignedPair {
            first: resample(&first.values(), ratio)?,
            second: second.values(),
            sample_period: p2,
        })
    } else {
        let ratio = p2 / p1;
        log::debug!("Upsampling second signal by {:.4} to {:.6}s period", ratio, p1);
        Ok(AlignedPair {
            first: first.values(),
            second: resample(&second.values(), ratio)?,
            sample_period: p1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI as PI32;

    fn sine(cycles_per_sample: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI32 * cycles_per_sample * i as f32).sin())
            .collect()
    }

    #[test]
    fn test_approximate_simple_ratios() {
        assert_eq!(
            RationalRatio::approximate(2.0).unwrap(),
            RationalRatio { up: 2, down: 1 }
        );
        assert_eq!(
            RationalRatio::approximate(0.125).unwrap(),
            RationalRatio { up: 1, down: 8 }
        );
        assert_eq!(
            RationalRatio::approximate(1.5).unwrap(),
            RationalRatio { up: 3, down: 2 }
        );
        assert_eq!(
            RationalRatio::approximate(256.0 / 100.0).unwrap(),
            RationalRatio { up: 64, down: 25 }
        );
    }

    #[test]
    fn test_approximate_irrational() {
        let r = RationalRatio::approximate(std::f64::consts::PI).unwrap();
        assert!(r.up <= MAX_RATIO_TERM as usize && r.down <= MAX_RATIO_TERM as usize);
        assert!((r.as_f64() - std::f64::consts::PI).abs() < 1e-5);
    }

    #[test]
    fn test_invalid_ratio() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(resample(&[1.0, 2.0], bad), Err(AnalysisError::InvalidRatio(_))));
        }
    }

    #[test]
    fn test_identity_ratio() {
        let input = sine(0.01, 100);
        assert_eq!(resample(&input, 1.0).unwrap(), input);
    }

    #[test]
    fn test_output_length_scaling() {
        for &len in &[1usize, 7, 100, 513] {
            for &ratio in &[0.1, 0.25, 0.5, 0.75, 1.5, 2.0, 2.56, 3.0, std::f64::consts::E, 8.0] {
                let out = resample(&vec![0.5; len], ratio).unwrap();
                let expected = (len as f64 * ratio).round() as i64;
                assert!(
                    (out.len() as i64 - expected).abs() <= 1,
                    "len={} ratio={} got {}",
                    len,
                    ratio,
                    out.len()
                );
            }
        }
    }

    #[test]
    fn test_ratios_beyond_term_bound() {
        assert!(RationalRatio::approximate(2000.0).is_none());
        let up = resample(&[0.5; 40], 2000.0).unwrap();
        assert_eq!(up.len(), 80_000);
        // Inputs 15..25, clear of the kernel's edge roll-off
        assert!(up[30_000..50_000].iter().all(|v| (v - 0.5).abs() < 0.01));

        let down = resample(&vec![0.5; 4000], 1.0 / 1500.0).unwrap();
        assert_eq!(down.len(), 3);
        assert!(down.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_near_unity_ratio_is_not_identity() {
        let ratio = 1.0001;
        let f = 0.001;
        let input = sine(f as f32, 50_000);
        let out = resample(&input, ratio).unwrap();
        assert!((out.len() as i64 - 50_005).abs() <= 1, "got {}", out.len());

        // Output m sits at input position m / ratio
        for m in (40_000..49_000).step_by(997) {
            let expected = (2.0 * std::f64::consts::PI * f * m as f64 / ratio).sin() as f32;
            assert!((out[m] - expected).abs() < 2e-3, "m={} y={} expected={}", m, out[m], expected);
        }
    }

    #[test]
    fn test_align_near_equal_periods() {
        let slow = Waveform::from_values(0.0, 0.1, &vec![1.0; 10_000]).unwrap();
        let fast = Waveform::from_values(0.0, 0.1 / 1.0001, &vec![1.0; 10_000]).unwrap();
        let aligned = align_sample_rates(&slow, &fast).unwrap();
        assert!((aligned.first.len() as i64 - 10_001).abs() <= 1);
        assert_eq!(aligned.second.len(), 10_000);
    }

    #[test]
    fn test_empty_input() {
        assert!(resample(&[], 3.0).unwrap().is_empty());
    }

    #[test]
    fn test_upsample_preserves_sine() {
        let f = 0.02;
        let input = sine(f, 400);
        let out = resample(&input, 3.0).unwrap();
        assert_eq!(out.len(), 1200);
        // Interior samples, away from the zero-padded edges
        for (m, &y) in out.iter().enumerate().skip(200).take(800) {
            let expected = (2.0 * PI32 * f * m as f32 / 3.0).sin();
            assert!((y - expected).abs() < 0.02, "m={} y={} expected={}", m, y, expected);
        }
    }

    #[test]
    fn test_downsample_preserves_sine() {
        let f = 0.01;
        let input = sine(f, 1000);
        let out = resample(&input, 0.5).unwrap();
        assert_eq!(out.len(), 500);
        for (m, &y) in out.iter().enumerate().skip(50).take(400) {
            let expected = (2.0 * PI32 * f * (2 * m) as f32).sin();
            assert!((y - expected).abs() < 0.02, "m={} y={} expected={}", m, y, expected);
        }
    }

    #[test]
    fn test_dc_gain_interior() {
        let out = resample(&vec![1.0; 300], 2.56).unwrap();
        let mid = &out[300..500];
        assert!(mid.iter().all(|v| (v - 1.0).abs() < 0.01));
    }

    #[test]
    fn test_align_upsamples_slower_signal() {
        let slow = Waveform::from_values(0.0, 0.1, &vec![1.0; 50]).unwrap();
        let fast = Waveform::from_values(0.0, 0.025, &vec![1.0; 200]).unwrap();
        let aligned = align_sample_rates(&slow, &fast).unwrap();
        assert_eq!(aligned.first.len(), 200);
        assert_eq!(aligned.second.len(), 200);
        assert!((aligned.sample_period - 0.025).abs() < 1e-12);

        let swapped = align_sample_rates(&fast, &slow).unwrap();
        assert_eq!(swapped.first.len(), 200);
        assert_eq!(swapped.second.len(), 200);
    }
}
