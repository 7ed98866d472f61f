//! Diagonal-covariance Gaussian density machine.

use serde::Serialize;

use arca_file::ArcaFile;

use crate::error::{MachineError, MachineResult};
use crate::log::LOG_2PI;

/// A multivariate Gaussian with diagonal covariance.
///
/// Holds per-dimension mean, variance, and variance-flooring thresholds.
/// Variances are clamped up to their threshold whenever they are set, and
/// the normalization constant `g_norm = n·ln(2π) + Σ ln σ²` is kept
/// precomputed so [`Gaussian::log_likelihood`] is a single pass.
#[derive(Clone, Debug, Serialize)]
pub struct Gaussian {
    n_inputs: usize,
    mean: Vec<f64>,
    variance: Vec<f64>,
    variance_thresholds: Vec<f64>,
    g_norm: f64,
}

impl Gaussian {
    /// A Gaussian over `n_inputs` dimensions: mean 0, variance 1,
    /// thresholds 0.
    pub fn new(n_inputs: usize) -> Self {
        let mut g = Self {
            n_inputs,
            mean: vec![0.0; n_inputs],
            variance: vec![1.0; n_inputs],
            variance_thresholds: vec![0.0; n_inputs],
            g_norm: 0.0,
        };
        g.precompute_constants();
        g
    }

    /// Load a Gaussian from an open file (see [`Gaussian::load`]).
    pub fn from_file(file: &ArcaFile) -> MachineResult<Self> {
        let mut g = Self::new(0);
        g.load(file)?;
        Ok(g)
    }

    /// Input dimensionality.
    pub fn n_inputs(&self) -> usize {
        self.n_inputs
    }

    /// Reset to `n_inputs` dimensions with default parameters.
    pub fn resize(&mut self, n_inputs: usize) {
        self.n_inputs = n_inputs;
        self.mean = vec![0.0; n_inputs];
        self.variance = vec![1.0; n_inputs];
        self.variance_thresholds = vec![0.0; n_inputs];
        self.precompute_constants();
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn variance(&self) -> &[f64] {
        &self.variance
    }

    pub fn variance_thresholds(&self) -> &[f64] {
        &self.variance_thresholds
    }

    /// The precomputed normalization constant.
    pub fn g_norm(&self) -> f64 {
        self.g_norm
    }

    fn check_dim(&self, name: &'static str, len: usize) -> MachineResult<()> {
        if len != self.n_inputs {
            return Err(MachineError::DimensionMismatch {
                name,
                expected: self.n_inputs,
                actual: len,
            });
        }
        Ok(())
    }

    pub fn set_mean(&mut self, mean: &[f64]) -> MachineResult<()> {
        self.check_dim("mean", mean.len())?;
        self.mean.copy_from_slice(mean);
        Ok(())
    }

    /// Set the variance, applying the flooring thresholds elementwise, and
    /// refresh the normalization constant.
    pub fn set_variance(&mut self, variance: &[f64]) -> MachineResult<()> {
        self.check_dim("variance", variance.len())?;
        for (v, (src, thr)) in self
            .variance
            .iter_mut()
            .zip(variance.iter().zip(&self.variance_thresholds))
        {
            *v = src.max(*thr);
        }
        self.precompute_constants();
        Ok(())
    }

    /// Set the flooring thresholds and re-floor the current variance.
    pub fn set_variance_thresholds(&mut self, thresholds: &[f64]) -> MachineResult<()> {
        self.check_dim("variance_thresholds", thresholds.len())?;
        self.variance_thresholds.copy_from_slice(thresholds);
        let variance = self.variance.clone();
        self.set_variance(&variance)
    }

    /// Set every threshold to `factor` times the current variance.
    pub fn set_variance_threshold_factor(&mut self, factor: f64) -> MachineResult<()> {
        let thresholds: Vec<f64> = self.variance.iter().map(|v| v * factor).collect();
        self.set_variance_thresholds(&thresholds)
    }

    fn precompute_constants(&mut self) {
        let log_det: f64 = self.variance.iter().map(|v| v.ln()).sum();
        self.g_norm = self.n_inputs as f64 * LOG_2PI + log_det;
    }

    /// `ln p(x) = -0.5 (g_norm + Σ (x_i - μ_i)² / σ_i²)`.
    pub fn log_likelihood(&self, x: &[f64]) -> MachineResult<f64> {
        self.check_dim("x", x.len())?;
        let z: f64 = x
            .iter()
            .zip(self.mean.iter().zip(&self.variance))
            .map(|(xi, (mi, vi))| (xi - mi).powi(2) / vi)
            .sum();
        Ok(-0.5 * (self.g_norm + z))
    }

    /// Serialize the parameters through the facade: `mean`, `variance`,
    /// `variance_thresholds` (f64 arrays), `g_norm` (f64), `n_inputs`
    /// (i64). Existing entries are overwritten.
    pub fn save(&self, file: &mut ArcaFile) -> MachineResult<()> {
        file.set_array("mean", &self.mean)?;
        file.set_array("variance", &self.variance)?;
        file.set_array("variance_thresholds", &self.variance_thresholds)?;
        file.set("g_norm", self.g_norm)?;
        file.set("n_inputs", self.n_inputs as i64)?;
        tracing::debug!(n_inputs = self.n_inputs, "saved gaussian");
        Ok(())
    }

    /// Deserialize the parameters from the facade. The dimensionality is
    /// read first to size the vectors; every vector is validated against
    /// it. Any missing or ill-typed entry aborts the load, leaving no
    /// partially-populated machine behind.
    pub fn load(&mut self, file: &ArcaFile) -> MachineResult<()> {
        let n_inputs = file.get::<i64>("n_inputs")? as usize;

        let mean = file.get_array::<f64>("mean")?;
        let variance = file.get_array::<f64>("variance")?;
        let thresholds = file.get_array::<f64>("variance_thresholds")?;
        let g_norm = file.get::<f64>("g_norm")?;

        let check = |name: &'static str, len: usize| -> MachineResult<()> {
            if len != n_inputs {
                return Err(MachineError::DimensionMismatch {
                    name,
                    expected: n_inputs,
                    actual: len,
                });
            }
            Ok(())
        };
        check("mean", mean.len())?;
        check("variance", variance.len())?;
        check("variance_thresholds", thresholds.len())?;

        self.n_inputs = n_inputs;
        self.mean = mean;
        self.variance = variance;
        self.variance_thresholds = thresholds;
        self.g_norm = g_norm;
        tracing::debug!(n_inputs, "loaded gaussian");
        Ok(())
    }
}

/// Parameter equality; the cached `g_norm` is derived and not compared.
impl PartialEq for Gaussian {
    fn eq(&self, other: &Self) -> bool {
        self.n_inputs == other.n_inputs
            && self.mean == other.mean
            && self.variance == other.variance
            && self.variance_thresholds == other.variance_thresholds
    }
}
