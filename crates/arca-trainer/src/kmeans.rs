use rand::rngs::StdRng;
use rand::SeedableRng;

use arca_file::{ArcaFile, ArrayBuffer, ElementKind, FileError, TypeDescriptor};

use crate::em::EmTrainer;
use crate::error::{TrainerError, TrainerResult};

/// A flat k-means codebook: `n_means` centers of dimension `n_inputs`,
/// stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansMachine {
    n_means: usize,
    n_inputs: usize,
    means: Vec<f64>,
}

impl KMeansMachine {
    /// A machine with all means at the origin.
    pub fn new(n_means: usize, n_inputs: usize) -> Self {
        Self {
            n_means,
            n_inputs,
            means: vec![0.0; n_means * n_inputs],
        }
    }

    /// Load a machine from the current working group of `file`.
    pub fn from_file(file: &ArcaFile) -> TrainerResult<Self> {
        let mut machine = Self::new(0, 0);
        machine.load(file)?;
        Ok(machine)
    }

    pub fn n_means(&self) -> usize {
        self.n_means
    }

    pub fn n_inputs(&self) -> usize {
        self.n_inputs
    }

    /// Center `i`, as a row of the codebook.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n_means`, like slice indexing.
    pub fn mean(&self, i: usize) -> &[f64] {
        &self.means[i * self.n_inputs..(i + 1) * self.n_inputs]
    }

    pub(crate) fn mean_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.means[i * self.n_inputs..(i + 1) * self.n_inputs]
    }

    /// Overwrite center `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= n_means`, like slice indexing.
    pub fn set_mean(&mut self, i: usize, mean: &[f64]) -> TrainerResult<()> {
        if mean.len() != self.n_inputs {
            return Err(TrainerError::DimensionMismatch {
                index: i,
                expected: self.n_inputs,
                actual: mean.len(),
            });
        }
        self.mean_mut(i).copy_from_slice(mean);
        Ok(())
    }

    /// Squared Euclidean distance between `x` and center `i`.
    pub fn distance_from_mean(&self, x: &[f64], i: usize) -> f64 {
        self.mean(i)
            .iter()
            .zip(x)
            .map(|(m, v)| (v - m) * (v - m))
            .sum()
    }

    /// The index of the closest center and its squared distance.
    pub fn closest_mean(&self, x: &[f64]) -> (usize, f64) {
        let mut best = (0, f64::MAX);
        for i in 0..self.n_means {
            let d = self.distance_from_mean(x, i);
            if d < best.1 {
                best = (i, d);
            }
        }
        best
    }

    /// The squared distance from `x` to its closest center.
    pub fn min_distance(&self, x: &[f64]) -> f64 {
        self.closest_mean(x).1
    }

    /// Serialize to the current working group of `file`: `means` as a
    /// 2-D float64 dataset plus `n_means` and `n_inputs` scalars.
    pub fn save(&self, file: &mut ArcaFile) -> TrainerResult<()> {
        let shape = vec![self.n_means as u64, self.n_inputs as u64];
        file.create(
            "means",
            TypeDescriptor::new(ElementKind::Float64, shape.clone()),
            false,
        )?;
        let buffer = ArrayBuffer::from_slice(&self.means, shape).map_err(FileError::from)?;
        file.write_buffer("means", 0, &buffer)?;
        file.set("n_means", self.n_means as i64)?;
        file.set("n_inputs", self.n_inputs as i64)?;
        tracing::debug!(n_means = self.n_means, n_inputs = self.n_inputs, "saved k-means");
        Ok(())
    }

    /// Deserialize from the current working group of `file`. The scalars
    /// are read first; the `means` dataset is validated against them.
    pub fn load(&mut self, file: &ArcaFile) -> TrainerResult<()> {
        let n_means = file.get::<i64>("n_means")? as usize;
        let n_inputs = file.get::<i64>("n_inputs")? as usize;
        let means = file.get_array::<f64>("means")?;
        if means.len() != n_means * n_inputs {
            return Err(TrainerError::DimensionMismatch {
                index: 0,
                expected: n_means * n_inputs,
                actual: means.len(),
            });
        }
        self.n_means = n_means;
        self.n_inputs = n_inputs;
        self.means = means;
        Ok(())
    }
}

/// Hard-assignment k-means trained with the EM loop: the E-step assigns
/// every sample to its closest center and accumulates per-cluster sums,
/// the M-step moves each center to the average of its members.
pub struct KMeansTrainer {
    seed: u64,
    convergence_threshold: f64,
    max_iterations: usize,
    sums: Vec<f64>,
    counts: Vec<usize>,
}

impl KMeansTrainer {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            convergence_threshold: 1e-3,
            max_iterations: 10,
            sums: Vec::new(),
            counts: Vec::new(),
        }
    }

    pub fn with_convergence_threshold(mut self, threshold: f64) -> Self {
        self.convergence_threshold = threshold;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    fn check_samples(machine: &KMeansMachine, samples: &[Vec<f64>]) -> TrainerResult<()> {
        for (index, sample) in samples.iter().enumerate() {
            if sample.len() != machine.n_inputs() {
                return Err(TrainerError::DimensionMismatch {
                    index,
                    expected: machine.n_inputs(),
                    actual: sample.len(),
                });
            }
        }
        Ok(())
    }
}

impl EmTrainer<KMeansMachine> for KMeansTrainer {
    /// Seed the centers with distinct randomly chosen samples.
    fn initialization(
        &mut self,
        machine: &mut KMeansMachine,
        samples: &[Vec<f64>],
    ) -> TrainerResult<()> {
        Self::check_samples(machine, samples)?;
        if machine.n_means() == 0 {
            return Err(TrainerError::NoMeans);
        }
        if samples.len() < machine.n_means() {
            return Err(TrainerError::TooFewSamples {
                needed: machine.n_means(),
                got: samples.len(),
            });
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        let chosen = rand::seq::index::sample(&mut rng, samples.len(), machine.n_means());
        for (i, sample_index) in chosen.into_iter().enumerate() {
            machine.set_mean(i, &samples[sample_index])?;
        }
        self.sums = vec![0.0; machine.n_means() * machine.n_inputs()];
        self.counts = vec![0; machine.n_means()];
        Ok(())
    }

    /// Assign each sample to its closest center. Returns the average of
    /// the minimum squared distances.
    fn e_step(&mut self, machine: &mut KMeansMachine, samples: &[Vec<f64>]) -> TrainerResult<f64> {
        self.sums.iter_mut().for_each(|s| *s = 0.0);
        self.counts.iter_mut().for_each(|c| *c = 0);

        let n_inputs = machine.n_inputs();
        let mut total = 0.0;
        for sample in samples {
            let (closest, distance) = machine.closest_mean(sample);
            total += distance;
            self.counts[closest] += 1;
            let sum = &mut self.sums[closest * n_inputs..(closest + 1) * n_inputs];
            for (s, v) in sum.iter_mut().zip(sample) {
                *s += v;
            }
        }
        Ok(total / samples.len() as f64)
    }

    /// Move each center to the average of its assigned samples. A center
    /// that attracted no samples keeps its position.
    fn m_step(&mut self, machine: &mut KMeansMachine, _samples: &[Vec<f64>]) -> TrainerResult<()> {
        let n_inputs = machine.n_inputs();
        for i in 0..machine.n_means() {
            let count = self.counts[i];
            if count == 0 {
                continue;
            }
            let sum = &self.sums[i * n_inputs..(i + 1) * n_inputs];
            for (m, s) in machine.mean_mut(i).iter_mut().zip(sum) {
                *m = s / count as f64;
            }
        }
        Ok(())
    }

    fn convergence_threshold(&self) -> f64 {
        self.convergence_threshold
    }

    fn max_iterations(&self) -> usize {
        self.max_iterations
    }
}

// ---------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------
