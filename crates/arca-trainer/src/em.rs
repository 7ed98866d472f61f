use crate::error::{TrainerError, TrainerResult};

/// Expectation-maximization driver.
///
/// A trainer supplies the three phases; [`EmTrainer::train`] runs the
/// iteration loop: initialize once, then alternate the E-step (which
/// reports the quantity being minimized) and the M-step until the
/// relative improvement drops below [`EmTrainer::convergence_threshold`]
/// or [`EmTrainer::max_iterations`] is reached.
pub trait EmTrainer<M> {
    /// Seed the machine's parameters from the samples.
    fn initialization(&mut self, machine: &mut M, samples: &[Vec<f64>]) -> TrainerResult<()>;

    /// Accumulate statistics over the samples. Returns the average score
    /// being minimized (lower is better).
    fn e_step(&mut self, machine: &mut M, samples: &[Vec<f64>]) -> TrainerResult<f64>;

    /// Update the machine's parameters from the accumulated statistics.
    fn m_step(&mut self, machine: &mut M, samples: &[Vec<f64>]) -> TrainerResult<()>;

    /// Relative improvement below which the loop stops.
    fn convergence_threshold(&self) -> f64 {
        1e-3
    }

    /// Hard cap on EM iterations.
    fn max_iterations(&self) -> usize {
        10
    }

    /// Run the full EM loop. Returns the final average score.
    fn train(&mut self, machine: &mut M, samples: &[Vec<f64>]) -> TrainerResult<f64> {
        if samples.is_empty() {
            return Err(TrainerError::EmptyDataset);
        }
        self.initialization(machine, samples)?;

        let mut previous = f64::MAX;
        let mut score = f64::MAX;
        for iteration in 0..self.max_iterations() {
            score = self.e_step(machine, samples)?;
            self.m_step(machine, samples)?;
            tracing::debug!(iteration, score, "em iteration");

            let improvement = (previous - score).abs() / previous.abs().max(f64::MIN_POSITIVE);
            if improvement < self.convergence_threshold() {
                break;
            }
            previous = score;
        }
        Ok(score)
    }
}
