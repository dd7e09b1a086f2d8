//! Daily PnL series metrics.
//!
//! Provides the cumulative curve, win/loss statistics, max drawdown, and a
//! simplified Sharpe ratio (no risk-free offset, not annualized).

use super::ensure_ascending;
use crate::types::PerformanceSample;
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::Serialize;

/// One point of the cumulative PnL curve.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    pub pnl: f64,
    pub cumulative: f64,
}

/// Metrics derived from a PnL series.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    /// Running sum of PnL, one point per sample
    pub curve: Vec<CumulativePoint>,
    pub total_pnl: f64,
    pub sample_count: usize,
    pub win_count: usize,
    pub loss_count: usize,
    /// Winning days as a percentage of all days
    pub win_rate: f64,
    /// Mean PnL of winning days, 0 when there are none
    pub average_win: f64,
    /// Mean magnitude of losing days, 0 when there are none
    pub average_loss: f64,
    /// Largest decline from a running peak, in percent of the peak
    pub max_drawdown: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    sharpe_ratio: Option<f64>,
}

impl PerformanceMetrics {
    /// Mean over population standard deviation of daily PnL.
    ///
    /// Fails with [`Error::ZeroVariance`] when every sample is identical.
    pub fn sharpe_ratio(&self) -> Result<f64> {
        self.sharpe_ratio.ok_or(Error::ZeroVariance)
    }

    /// Last value of the cumulative curve.
    pub fn final_cumulative(&self) -> f64 {
        self.curve.last().map(|p| p.cumulative).unwrap_or(0.0)
    }
}

/// Running mean and sum of squared deviations (Welford).
#[derive(Debug, Default)]
struct Moments {
    n: usize,
    mean: f64,
    m2: f64,
}

impl Moments {
    fn push(&mut self, x: f64) {
        self.n += 1;
        let delta = x - self.mean;
        self.mean += delta / self.n as f64;
        self.m2 += delta * (x - self.mean);
    }

    fn population_std(&self) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        (self.m2 / self.n as f64).sqrt()
    }

    fn sharpe(&self) -> Option<f64> {
        let std = self.population_std();
        if std == 0.0 {
            None
        } else {
            Some(self.mean / std)
        }
    }
}

/// Peak-to-trough tracker over a cumulative curve.
///
/// The peak starts at zero, so a curve that never rises above zero has no
/// drawdown.
#[derive(Debug, Default)]
struct Drawdown {
    peak: f64,
    max: f64,
}

impl Drawdown {
    fn observe(&mut self, cumulative: f64) {
        if cumulative > self.peak {
            self.peak = cumulative;
        }
        if self.peak > 0.0 {
            let drawdown = (self.peak - cumulative) / self.peak * 100.0;
            if drawdown > self.max {
                self.max = drawdown;
            }
        }
    }
}

/// Analyze a date-ascending PnL series.
///
/// Fails with [`Error::UnorderedSeries`] if any sample is not dated after the
/// one before it, and with [`Error::InsufficientData`] for an empty series.
/// Samples are never reordered.
pub fn analyze(samples: &[PerformanceSample]) -> Result<PerformanceMetrics> {
    if samples.is_empty() {
        return Err(Error::InsufficientData(
            "performance series is empty".to_string(),
        ));
    }
    ensure_ascending(samples.iter().map(|s| s.date))?;

    let mut curve = Vec::with_capacity(samples.len());
    let mut cumulative = 0.0;
    let mut win_count = 0;
    let mut loss_count = 0;
    let mut win_sum = 0.0;
    let mut loss_sum = 0.0;
    let mut drawdown = Drawdown::default();
    let mut moments = Moments::default();

    for sample in samples {
        cumulative += sample.pnl;
        curve.push(CumulativePoint {
            date: sample.date,
            pnl: sample.pnl,
            cumulative,
        });

        if sample.pnl > 0.0 {
            win_count += 1;
            win_sum += sample.pnl;
        } else if sample.pnl < 0.0 {
            loss_count += 1;
            loss_sum += -sample.pnl;
        }

        drawdown.observe(cumulative);
        moments.push(sample.pnl);
    }

    let n = samples.len();
    let average_win = if win_count > 0 {
        win_sum / win_count as f64
    } else {
        0.0
    };
    let average_loss = if loss_count > 0 {
        loss_sum / loss_count as f64
    } else {
        0.0
    };

    let metrics = PerformanceMetrics {
        curve,
        total_pnl: cumulative,
        sample_count: n,
        win_count,
        loss_count,
        win_rate: win_count as f64 / n as f64 * 100.0,
        average_win,
        average_loss,
        max_drawdown: drawdown.max,
        sharpe_ratio: moments.sharpe(),
    };

    tracing::debug!(
        samples = n,
        total_pnl = metrics.total_pnl,
        win_rate = metrics.win_rate,
        max_drawdown = metrics.max_drawdown,
        "analyzed performance series"
    );

    Ok(metrics)
}

/// Maximum drawdown of a cumulative PnL curve, in percent of the running peak.
pub fn max_drawdown(cumulative: &[f64]) -> f64 {
    let mut drawdown = Drawdown::default();
    for &value in cumulative {
        drawdown.observe(value);
    }
    drawdown.max
}

/// Simplified Sharpe ratio: mean over population standard deviation.
pub fn sharpe_ratio(pnl: &[f64]) -> Result<f64> {
    if pnl.is_empty() {
        return Err(Error::InsufficientData(
            "Sharpe ratio needs at least one sample".to_string(),
        ));
    }
    let mut moments = Moments::default();
    for &x in pnl {
        moments.push(x);
    }
    moments.sharpe().ok_or(Error::ZeroVariance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn series(pnls: &[f64]) -> Vec<PerformanceSample> {
        let start = NaiveDate::from_ymd_opt(2023, 9, 1).unwrap();
        pnls.iter()
            .enumerate()
            .map(|(i, &pnl)| {
                PerformanceSample::new(start + chrono::Duration::days(i as i64), pnl)
            })
            .collect()
    }

    #[test]
    fn test_analyze_daily_series() {
        let metrics = analyze(&series(&[25.42, 42.17, -12.32, 89.45, 54.23])).unwrap();

        assert_eq!(metrics.sample_count, 5);
        assert_eq!(metrics.win_count, 4);
        assert_eq!(metrics.loss_count, 1);
        assert_relative_eq!(metrics.win_rate, 80.0);
        assert_relative_eq!(metrics.average_loss, 12.32);
        assert_relative_eq!(metrics.average_win, 52.8175, epsilon = 1e-9);
        assert_relative_eq!(metrics.final_cumulative(), 198.95, epsilon = 1e-9);
        assert_eq!(metrics.total_pnl, metrics.final_cumulative());

        // Peak 67.59 after day two, trough 55.27 on day three
        let expected = (67.59 - 55.27) / 67.59 * 100.0;
        assert_relative_eq!(metrics.max_drawdown, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_cumulative_curve() {
        let metrics = analyze(&series(&[10.0, -5.0, 2.5])).unwrap();
        let cumulative: Vec<f64> = metrics.curve.iter().map(|p| p.cumulative).collect();
        assert_eq!(cumulative, vec![10.0, 5.0, 7.5]);
    }

    #[test]
    fn test_sharpe_matches_two_pass_population_std() {
        let pnls = [25.42, 42.17, -12.32, 89.45, 54.23];
        let metrics = analyze(&series(&pnls)).unwrap();

        let n = pnls.len() as f64;
        let mean = pnls.iter().sum::<f64>() / n;
        let std = (pnls.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n).sqrt();

        assert_relative_eq!(metrics.sharpe_ratio().unwrap(), mean / std, epsilon = 1e-9);
        assert_relative_eq!(sharpe_ratio(&pnls).unwrap(), mean / std, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_variance() {
        let metrics = analyze(&series(&[5.0, 5.0, 5.0])).unwrap();
        assert!(matches!(metrics.sharpe_ratio(), Err(Error::ZeroVariance)));
        // Other metrics are still available
        assert_relative_eq!(metrics.win_rate, 100.0);
        assert!(matches!(sharpe_ratio(&[0.0, 0.0]), Err(Error::ZeroVariance)));

        let json = serde_json::to_value(&metrics).unwrap();
        assert!(json.get("sharpeRatio").is_none());
    }

    #[test]
    fn test_flat_days_count_toward_population_only() {
        let metrics = analyze(&series(&[10.0, 0.0, -4.0, 0.0])).unwrap();
        assert_eq!(metrics.win_count, 1);
        assert_eq!(metrics.loss_count, 1);
        assert_relative_eq!(metrics.win_rate, 25.0);
        assert_relative_eq!(metrics.average_win, 10.0);
        assert_relative_eq!(metrics.average_loss, 4.0);
    }

    #[test]
    fn test_no_wins_or_losses() {
        let all_losses = analyze(&series(&[-1.0, -2.0])).unwrap();
        assert_eq!(all_losses.average_win, 0.0);
        assert_eq!(all_losses.win_rate, 0.0);
        // Curve never rises above zero
        assert_eq!(all_losses.max_drawdown, 0.0);

        let all_wins = analyze(&series(&[1.0, 2.0])).unwrap();
        assert_eq!(all_wins.average_loss, 0.0);
        assert_eq!(all_wins.max_drawdown, 0.0);
    }

    #[test]
    fn test_unordered_series_rejected() {
        let mut samples = series(&[1.0, 2.0, 3.0]);
        samples.swap(1, 2);
        assert!(matches!(
            analyze(&samples),
            Err(Error::UnorderedSeries { index: 2 })
        ));
    }

    #[test]
    fn test_duplicate_date_rejected() {
        let mut samples = series(&[1.0, 2.0]);
        samples[1].date = samples[0].date;
        assert!(matches!(
            analyze(&samples),
            Err(Error::UnorderedSeries { index: 1 })
        ));
    }

    #[test]
    fn test_gaps_tolerated() {
        let samples = vec![
            PerformanceSample::new(NaiveDate::from_ymd_opt(2023, 9, 1).unwrap(), 5.0),
            PerformanceSample::new(NaiveDate::from_ymd_opt(2023, 9, 30).unwrap(), -2.0),
        ];
        assert_relative_eq!(analyze(&samples).unwrap().final_cumulative(), 3.0);
    }

    #[test]
    fn test_empty_series() {
        assert!(matches!(analyze(&[]), Err(Error::InsufficientData(_))));
        assert!(matches!(sharpe_ratio(&[]), Err(Error::InsufficientData(_))));
    }

    #[test]
    fn test_analyze_is_idempotent() {
        let samples = series(&[12.5, -80.0, 33.1, 119.9, -0.4, 7.0]);
        let first = analyze(&samples).unwrap();
        let second = analyze(&samples).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            first.sharpe_ratio().unwrap().to_bits(),
            second.sharpe_ratio().unwrap().to_bits()
        );
    }

    #[test]
    fn test_max_drawdown_bounded_for_non_negative_curve() {
        let curve = [0.0, 50.0, 120.0, 30.0, 0.0, 80.0, 200.0, 10.0];
        let mdd = max_drawdown(&curve);
        assert_relative_eq!(mdd, 100.0);
        assert!((0.0..=100.0).contains(&mdd));
    }

    #[test]
    fn test_max_drawdown_below_zero_after_peak() {
        // Falling through zero from a positive peak exceeds 100%
        let mdd = max_drawdown(&[100.0, -50.0]);
        assert_relative_eq!(mdd, 150.0);
    }
}
