//! Revenue trend projection.
//!
//! Two or more observations fit an ordinary least-squares line of revenue against
//! year. A single observation cannot carry a trend, so it compounds a default growth
//! rate instead. Linear predictions never fall below a fixed fraction of the last
//! observed revenue: a declining fit would otherwise reach zero inside the horizon.

use crate::config::{ForecastConfig, DEFAULT_DECLINE_FLOOR, DEFAULT_FALLBACK_GROWTH};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesKind {
    Historical,
    Forecast,
}

impl SeriesKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Historical => "Historical",
            Self::Forecast => "Forecast",
        }
    }
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    #[serde(rename = "Year")]
    pub year: i32,
    pub revenue: f64,
    #[serde(rename = "type")]
    pub kind: SeriesKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Trend {
    CompoundGrowth,
    Linear { slope: f64, intercept: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct FittedTrend {
    trend: Trend,
    cagr: f64,
    last_year: i32,
    last_revenue: f64,
}

#[derive(Debug, Clone)]
pub struct RevenueForecaster {
    years_ahead: u32,
    decline_floor: f64,
    default_growth: f64,
    fitted: Option<FittedTrend>,
}

impl Default for RevenueForecaster {
    fn default() -> Self {
        Self::from_config(&ForecastConfig::default())
    }
}

impl RevenueForecaster {
    pub fn new(years_ahead: u32) -> Self {
        Self {
            years_ahead,
            decline_floor: DEFAULT_DECLINE_FLOOR,
            default_growth: DEFAULT_FALLBACK_GROWTH,
            fitted: None,
        }
    }

    pub fn from_config(config: &ForecastConfig) -> Self {
        Self {
            years_ahead: config.years_ahead,
            decline_floor: config.decline_floor,
            default_growth: config.default_growth,
            fitted: None,
        }
    }

    /// Fits on `(year, revenue)` observations in any order. An empty history leaves the
    /// forecaster unfitted and [`predict`](Self::predict) returns nothing.
    pub fn fit(&mut self, history: &[(i32, f64)]) {
        let mut points = history.to_vec();
        points.sort_by_key(|(year, _)| *year);

        let (Some(&(first_year, first_revenue)), Some(&(last_year, last_revenue))) =
            (points.first(), points.last())
        else {
            self.fitted = None;
            return;
        };

        let fitted = if points.len() < 2 {
            FittedTrend {
                trend: Trend::CompoundGrowth,
                cagr: self.default_growth,
                last_year,
                last_revenue,
            }
        } else {
            let (slope, intercept) = least_squares(&points);
            let elapsed = last_year - first_year;
            let cagr = if elapsed > 0 && first_revenue > 0.0 {
                (last_revenue / first_revenue).powf(1.0 / elapsed as f64) - 1.0
            } else {
                0.0
            };
            FittedTrend {
                trend: Trend::Linear { slope, intercept },
                cagr,
                last_year,
                last_revenue,
            }
        };

        debug!(
            "Fitted {:?} on {} points, CAGR {:.4}",
            fitted.trend,
            points.len(),
            fitted.cagr
        );
        self.fitted = Some(fitted);
    }

    /// The next `years_ahead` years after the last observation, tagged as forecast.
    pub fn predict(&self) -> Vec<ForecastPoint> {
        let Some(fitted) = self.fitted else {
            return Vec::new();
        };

        (1..=self.years_ahead as i32)
            .map(|step| {
                let year = fitted.last_year + step;
                let revenue = match fitted.trend {
                    Trend::CompoundGrowth => {
                        fitted.last_revenue * (1.0 + fitted.cagr).powi(step)
                    }
                    Trend::Linear { slope, intercept } => {
                        let floor = fitted.last_revenue * self.decline_floor;
                        (slope * year as f64 + intercept).max(floor).max(0.0)
                    }
                };
                ForecastPoint {
                    year,
                    revenue,
                    kind: SeriesKind::Forecast,
                }
            })
            .collect()
    }

    /// Empirical first-to-last growth, or the default rate for a single observation.
    /// Zero before fitting.
    pub fn cagr(&self) -> f64 {
        self.fitted.map_or(0.0, |f| f.cagr)
    }

    pub fn last_year(&self) -> Option<i32> {
        self.fitted.map(|f| f.last_year)
    }

    pub fn last_revenue(&self) -> Option<f64> {
        self.fitted.map(|f| f.last_revenue)
    }
}

/// Slope and intercept of revenue against year. Identical years give a flat line at
/// the mean.
fn least_squares(points: &[(i32, f64)]) -> (f64, f64) {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| *x as f64).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| *y).sum::<f64>() / n;

    let (sxy, sxx) = points.iter().fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
        let dx = *x as f64 - mean_x;
        (sxy + dx * (y - mean_y), sxx + dx * dx)
    });

    if sxx == 0.0 {
        return (0.0, mean_y);
    }
    let slope = sxy / sxx;
    (slope, mean_y - slope * mean_x)
}

/// History (ascending by year, tagged historical) followed by the forecast.
pub fn forecast_with_history(history: &[(i32, f64)], years_ahead: u32) -> Vec<ForecastPoint> {
    let mut forecaster = RevenueForecaster::new(years_ahead);
    forecaster.fit(history);

    let mut points: Vec<ForecastPoint> = history
        .iter()
        .map(|&(year, revenue)| ForecastPoint {
            year,
            revenue,
            kind: SeriesKind::Historical,
        })
        .collect();
    points.sort_by_key(|p| p.year);
    points.extend(forecaster.predict());
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_single_point_compounds_default_growth() {
        let mut forecaster = RevenueForecaster::new(3);
        forecaster.fit(&[(2024, 1000.0)]);

        let forecast = forecaster.predict();
        assert_eq!(forecast.len(), 3);
        assert_eq!(forecast[0].year, 2025);
        assert_close(forecast[0].revenue, 1020.0);
        assert_close(forecast[2].revenue, 1000.0 * 1.02_f64.powi(3));
        assert_close(forecaster.cagr(), 0.02);
        assert!(forecast.iter().all(|p| p.kind == SeriesKind::Forecast));
    }

    #[test]
    fn test_linear_trend_on_growing_series() {
        let mut forecaster = RevenueForecaster::new(2);
        forecaster.fit(&[(2022, 121.0), (2020, 100.0), (2021, 110.0)]);

        assert_eq!(forecaster.last_year(), Some(2022));
        assert_eq!(forecaster.last_revenue(), Some(121.0));
        assert_close(forecaster.cagr(), 0.1);

        // Fitted line: slope 10.5, through (2021, 110.333..)
        let forecast = forecaster.predict();
        assert_close(forecast[0].revenue, 110.0 + 1.0 / 3.0 + 2.0 * 10.5);
        assert_close(forecast[1].revenue, 110.0 + 1.0 / 3.0 + 3.0 * 10.5);
    }

    #[test]
    fn test_declining_trend_is_floored_at_thirty_percent() {
        let mut forecaster = RevenueForecaster::new(5);
        forecaster.fit(&[(2021, 1000.0), (2022, 600.0), (2023, 200.0)]);

        let forecast = forecaster.predict();
        assert_eq!(forecast.len(), 5);
        for point in &forecast {
            assert_close(point.revenue, 60.0);
        }
    }

    #[test]
    fn test_floor_never_goes_negative() {
        let mut forecaster = RevenueForecaster::new(1);
        forecaster.fit(&[(2022, 100.0), (2023, -50.0)]);
        assert_close(forecaster.predict()[0].revenue, 0.0);
        assert_close(forecaster.cagr(), -1.5);
    }

    #[test]
    fn test_degenerate_cagr_is_zero() {
        let mut forecaster = RevenueForecaster::new(1);
        forecaster.fit(&[(2023, 0.0), (2024, 100.0)]);
        assert_close(forecaster.cagr(), 0.0);

        forecaster.fit(&[(2024, 100.0), (2024, 120.0)]);
        assert_close(forecaster.cagr(), 0.0);
        assert_close(forecaster.predict()[0].revenue, 110.0);
    }

    #[test]
    fn test_unfitted_forecaster_predicts_nothing() {
        let mut forecaster = RevenueForecaster::default();
        assert!(forecaster.predict().is_empty());
        forecaster.fit(&[]);
        assert!(forecaster.predict().is_empty());
        assert_eq!(forecaster.cagr(), 0.0);
    }

    #[test]
    fn test_history_precedes_forecast() {
        let series = forecast_with_history(&[(2024, 130.0), (2023, 100.0)], 2);

        let years: Vec<i32> = series.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2023, 2024, 2025, 2026]);
        assert_eq!(series[1].kind, SeriesKind::Historical);
        assert_eq!(series[2].kind, SeriesKind::Forecast);
        assert_close(series[2].revenue, 160.0);
    }
}
