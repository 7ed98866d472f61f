//! EM-style trainers for arca machines.
//!
//! - [`EmTrainer`] — the generic initialize / E-step / M-step loop
//! - [`KMeansMachine`] and [`KMeansTrainer`] — hard-assignment k-means
//!
//! Machines persist through the same [`arca_file::ArcaFile`] facade as
//! the Gaussians in `arca-machine`: named entries under the current
//! working group, loaded back by name.

pub mod em;
pub mod error;
pub mod kmeans;

pub use em::EmTrainer;
pub use error::{TrainerError, TrainerResult};
pub use kmeans::{KMeansMachine, KMeansTrainer};

#[cfg(test)]
mod tests {
    use super::*;
    use arca_file::{AccessMode, ArcaFile};

    #[test]
    fn kmeans_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kmeans.arca");

        let mut machine = KMeansMachine::new(2, 3);
        machine.set_mean(0, &[1.0, 2.0, 3.0]).unwrap();
        machine.set_mean(1, &[-1.0, 0.5, 4.25]).unwrap();

        let mut file = ArcaFile::open(&path, AccessMode::Truncate).unwrap();
        machine.save(&mut file).unwrap();
        drop(file);

        let file = ArcaFile::open(&path, AccessMode::ReadOnly).unwrap();
        let loaded = KMeansMachine::from_file(&file).unwrap();
        assert_eq!(loaded, machine);

        // The codebook is stored as one 2-D dataset.
        let history = file.describe("means").unwrap();
        assert_eq!(history.last().unwrap().dtype.shape, vec![2, 3]);
    }

    #[test]
    fn trained_machine_survives_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trained.arca");

        let samples: Vec<Vec<f64>> = (0..10)
            .flat_map(|i| {
                let jitter = i as f64 * 0.01;
                [vec![jitter, jitter], vec![5.0 + jitter, 5.0 + jitter]]
            })
            .collect();

        let mut machine = KMeansMachine::new(2, 2);
        KMeansTrainer::new(1).train(&mut machine, &samples).unwrap();

        let mut file = ArcaFile::open(&path, AccessMode::Truncate).unwrap();
        machine.save(&mut file).unwrap();
        let loaded = KMeansMachine::from_file(&file).unwrap();

        for x in &samples {
            assert_eq!(loaded.closest_mean(x), machine.closest_mean(x));
        }
    }
}
