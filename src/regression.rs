use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConversionError, Result};

// ---------------------------------------------------------------------------
// RegressionKind – functional form between distance and cost
// ---------------------------------------------------------------------------

/// The relation fitted between Euclidean distance `x` and cost `y`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegressionKind {
    /// `y = slope · x`
    #[default]
    LinearThroughOrigin,
    /// `y = slope · x + intercept`
    Linear,
    /// `ln y = slope · ln x + intercept`
    LogLog,
}

impl RegressionKind {
    pub const ALL: [RegressionKind; 3] = [
        RegressionKind::LinearThroughOrigin,
        RegressionKind::Linear,
        RegressionKind::LogLog,
    ];

    /// Short selector name accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            RegressionKind::LinearThroughOrigin => "linzero",
            RegressionKind::Linear => "linear",
            RegressionKind::LogLog => "log",
        }
    }

    /// Human readable label used in the viewer.
    pub fn label(&self) -> &'static str {
        match self {
            RegressionKind::LinearThroughOrigin => "Linear through origin",
            RegressionKind::Linear => "Linear",
            RegressionKind::LogLog => "Log-log",
        }
    }

    /// Map raw `(distance, cost)` columns into the space the line is fit in.
    ///
    /// Only [`RegressionKind::LogLog`] transforms; it rejects values `<= 0`.
    pub fn transform(&self, x: &[f64], y: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
        match self {
            RegressionKind::LinearThroughOrigin | RegressionKind::Linear => {
                Ok((x.to_vec(), y.to_vec()))
            }
            RegressionKind::LogLog => Ok((log_column(x, "distance")?, log_column(y, "cost")?)),
        }
    }

    /// Fit `(slope, intercept)` on already transformed samples.
    pub fn fit(&self, x: &[f64], y: &[f64]) -> Result<LineFit> {
        match self {
            RegressionKind::LinearThroughOrigin => fit_through_origin(x, y),
            RegressionKind::Linear | RegressionKind::LogLog => fit_line(x, y),
        }
    }
}

impl fmt::Display for RegressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RegressionKind {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linzero" | "linorig" | "linearzero" => Ok(RegressionKind::LinearThroughOrigin),
            "linear" => Ok(RegressionKind::Linear),
            "log" | "log-log" | "loglog" => Ok(RegressionKind::LogLog),
            _ => Err(ConversionError::InvalidArgument(format!(
                "invalid regression kind '{s}' (expected linzero, linear or log)"
            ))),
        }
    }
}

fn log_column(values: &[f64], col: &str) -> Result<Vec<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            if v > 0.0 {
                Ok(v.ln())
            } else {
                Err(ConversionError::DataFormat(format!(
                    "sample {i}: {col} {v} has no logarithm"
                )))
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Least squares
// ---------------------------------------------------------------------------

/// Result of an ordinary least squares fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination in the fitted space.
    pub r_squared: f64,
}

/// Minimise `Σ(y − slope·x)²` with the intercept held at zero.
pub fn fit_through_origin(x: &[f64], y: &[f64]) -> Result<LineFit> {
    check_pairs(x, y, 1)?;
    let sxx: f64 = x.iter().map(|v| v * v).sum();
    if sxx == 0.0 {
        return Err(ConversionError::DataFormat(
            "all distances are zero; slope through the origin is undefined".into(),
        ));
    }
    let sxy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
    let slope = sxy / sxx;
    Ok(LineFit {
        slope,
        intercept: 0.0,
        r_squared: r_squared(x, y, slope, 0.0),
    })
}

/// Ordinary least squares line through mean-centred sums.
pub fn fit_line(x: &[f64], y: &[f64]) -> Result<LineFit> {
    check_pairs(x, y, 2)?;
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let (sxx, sxy) = x.iter().zip(y).fold((0.0, 0.0), |(sxx, sxy), (&a, &b)| {
        let dx = a - mean_x;
        (sxx + dx * dx, sxy + dx * (b - mean_y))
    });
    if sxx == 0.0 {
        return Err(ConversionError::DataFormat(
            "all distances are equal; line fit is undefined".into(),
        ));
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    Ok(LineFit {
        slope,
        intercept,
        r_squared: r_squared(x, y, slope, intercept),
    })
}

fn check_pairs(x: &[f64], y: &[f64], min: usize) -> Result<()> {
    if x.len() != y.len() {
        return Err(ConversionError::DataFormat(format!(
            "x has {} values but y has {}",
            x.len(),
            y.len()
        )));
    }
    if x.len() < min {
        return Err(ConversionError::DataFormat(format!(
            "need at least {min} samples, got {}",
            x.len()
        )));
    }
    Ok(())
}

/// `1 − SSres/SStot`. A constant `y` scores 1 when matched exactly, else 0.
fn r_squared(x: &[f64], y: &[f64], slope: f64, intercept: f64) -> f64 {
    let mean_y = y.iter().sum::<f64>() / y.len() as f64;
    let (ss_res, ss_tot) = x.iter().zip(y).fold((0.0, 0.0), |(res, tot), (&a, &b)| {
        let e = b - (slope * a + intercept);
        let d = b - mean_y;
        (res + e * e, tot + d * d)
    });
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn parses_selectors_case_insensitively() {
        assert_eq!("LinZero".parse::<RegressionKind>().unwrap(), RegressionKind::LinearThroughOrigin);
        assert_eq!("linorig".parse::<RegressionKind>().unwrap(), RegressionKind::LinearThroughOrigin);
        assert_eq!("LINEAR".parse::<RegressionKind>().unwrap(), RegressionKind::Linear);
        for s in ["log", "Log-Log", "loglog"] {
            assert_eq!(s.parse::<RegressionKind>().unwrap(), RegressionKind::LogLog);
        }
        let err = "quadratic".parse::<RegressionKind>().unwrap_err();
        assert!(matches!(err, ConversionError::InvalidArgument(_)));
    }

    #[test]
    fn name_round_trips() {
        for kind in RegressionKind::ALL {
            assert_eq!(kind.name().parse::<RegressionKind>().unwrap(), kind);
        }
    }

    #[test]
    fn through_origin_slope() {
        let fit = fit_through_origin(&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 8.0]).unwrap();
        assert_relative_eq!(fit.slope, 2.0, epsilon = 1e-12);
        assert_eq!(fit.intercept, 0.0);
        assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn through_origin_ignores_best_intercept() {
        // y = x + 1 has no exact fit through the origin.
        let fit = fit_through_origin(&[1.0, 2.0, 3.0], &[2.0, 3.0, 4.0]).unwrap();
        // Σxy / Σx² = 20 / 14
        assert_relative_eq!(fit.slope, 20.0 / 14.0, epsilon = 1e-12);
    }

    #[test]
    fn line_fit() {
        let fit = fit_line(&[1.0, 2.0, 3.0], &[3.0, 5.0, 7.0]).unwrap();
        assert_relative_eq!(fit.slope, 2.0, epsilon = 1e-12);
        assert_relative_eq!(fit.intercept, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn r_squared_for_constant_cost() {
        // Constant y through the origin cannot be matched: slope 1.2 leaves residuals.
        let fit = fit_through_origin(&[1.0, 2.0], &[2.0, 2.0]).unwrap();
        assert_eq!(fit.r_squared, 0.0);

        // A flat line matches constant y exactly.
        let fit = fit_line(&[1.0, 2.0, 3.0], &[4.0, 4.0, 4.0]).unwrap();
        assert_relative_eq!(fit.slope, 0.0, epsilon = 1e-12);
        assert_relative_eq!(fit.intercept, 4.0, epsilon = 1e-12);
        assert_eq!(fit.r_squared, 1.0);
    }

    #[test]
    fn degenerate_fits_fail() {
        assert!(matches!(
            fit_through_origin(&[0.0, 0.0], &[1.0, 2.0]),
            Err(ConversionError::DataFormat(_))
        ));
        assert!(matches!(
            fit_line(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]),
            Err(ConversionError::DataFormat(_))
        ));
        assert!(matches!(fit_line(&[5.0], &[1.0]), Err(ConversionError::DataFormat(_))));
    }

    #[test]
    fn log_transform_rejects_non_positive() {
        let err = RegressionKind::LogLog
            .transform(&[1.0, 0.0], &[1.0, 2.0])
            .unwrap_err();
        assert!(matches!(err, ConversionError::DataFormat(_)));
        let err = RegressionKind::LogLog
            .transform(&[1.0, 2.0], &[1.0, 0.0])
            .unwrap_err();
        assert!(matches!(err, ConversionError::DataFormat(_)));
    }
}
