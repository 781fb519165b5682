mod ibzkpt;
pub use ibzkpt::*;

mod vasprun;
pub use vasprun::*;

use log::info;
use types::{PawError, Result};
use vector3::Vector3f64;

use std::path::Path;

// K-point provider interface.
//
// Implementations expose the irreducible k-points a plane-wave calculation
// was run on, in the order the wavefunction file stores them, with weights
// normalized to sum to one.
pub trait KPTS {
    fn get_k_frac(&self, k_index: usize) -> Vector3f64;
    fn get_k_weight(&self, k_index: usize) -> f64;
    fn get_n_kpts(&self) -> usize;

    fn get_k_weights(&self) -> Vec<f64> {
        (0..self.get_n_kpts()).map(|ik| self.get_k_weight(ik)).collect()
    }

    fn display(&self) {
        info!("   {:-^88}", " k-points (fractional) ");
        info!("{:12} {:^6} {}", "", "nkpt =", self.get_n_kpts());
        info!(
            "{:12} {:^6} {:^16} {:^16} {:^16} {:^12}",
            "", "index", "k1", "k2", "k3", "weight"
        );

        for ik in 0..self.get_n_kpts() {
            let xk_frac = self.get_k_frac(ik);

            info!(
                "{:12} {:^6} {} {:12.8}",
                "",
                ik + 1,
                xk_frac,
                self.get_k_weight(ik)
            );
        }
    }
}

// Factory for k-point sources.
pub fn new<P: AsRef<Path>>(scheme: &str, kfile: P) -> Result<Box<dyn KPTS>> {
    match scheme {
        "vasprun" => Ok(Box::new(KptsVasprun::new(kfile)?)),
        "ibzkpt" => Ok(Box::new(KptsIbzkpt::new(kfile)?)),
        other => Err(PawError::Config(format!(
            "unsupported k-point scheme '{}'",
            other
        ))),
    }
}

/// In-memory k-point list; weights are normalized on construction.
pub struct KptsList {
    k_frac: Vec<Vector3f64>,
    k_weight: Vec<f64>,
}

impl KptsList {
    pub fn new(k_frac: Vec<Vector3f64>, k_weight: Vec<f64>) -> Result<KptsList> {
        if k_frac.len() != k_weight.len() {
            return Err(PawError::format(
                "k-points",
                format!(
                    "{} k-points but {} weights",
                    k_frac.len(),
                    k_weight.len()
                ),
            ));
        }

        let k_weight = normalize_weights(k_weight)?;

        Ok(KptsList { k_frac, k_weight })
    }
}

impl KPTS for KptsList {
    fn get_k_frac(&self, k_index: usize) -> Vector3f64 {
        self.k_frac[k_index]
    }

    fn get_k_weight(&self, k_index: usize) -> f64 {
        self.k_weight[k_index]
    }

    fn get_n_kpts(&self) -> usize {
        self.k_frac.len()
    }
}

pub(crate) fn normalize_weights(mut w: Vec<f64>) -> Result<Vec<f64>> {
    let total: f64 = w.iter().sum();

    if w.is_empty() || total <= 0.0 {
        return Err(PawError::format(
            "k-points",
            "k-point weights must be positive",
        ));
    }

    w.iter_mut().for_each(|x| *x /= total);

    Ok(w)
}
