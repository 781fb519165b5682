use types::{PawError, Result};
use vector3::*;

use std::fs;
use std::path::Path;

use crate::{normalize_weights, KPTS};

// IBZKPT written by VASP:
//
// Automatically generated mesh
//        4
// Reciprocal lattice
//     0.00000000000000    0.00000000000000    0.00000000000000             1
//     ...
//
// weights are integer multiplicities; a trailing tetrahedron block is ignored
pub struct KptsIbzkpt {
    k_frac: Vec<Vector3f64>,
    k_weight: Vec<f64>,
}

impl KptsIbzkpt {
    pub fn new<P: AsRef<Path>>(kfile: P) -> Result<KptsIbzkpt> {
        let path = kfile.as_ref();

        let text = fs::read_to_string(path).map_err(|e| PawError::io(path, e))?;

        KptsIbzkpt::parse(&text)
    }

    pub fn parse(text: &str) -> Result<KptsIbzkpt> {
        let lines: Vec<&str> = text.lines().collect();

        if lines.len() < 3 {
            return Err(PawError::format("IBZKPT", "header is incomplete"));
        }

        let nk: usize = lines[1]
            .trim()
            .parse()
            .map_err(|_| PawError::format("IBZKPT", format!("bad k-point count '{}'", lines[1].trim())))?;

        if !lines[2].trim().to_lowercase().starts_with('r') {
            return Err(PawError::format(
                "IBZKPT",
                "only reciprocal (fractional) coordinates are supported",
            ));
        }

        if lines.len() < 3 + nk {
            return Err(PawError::format(
                "IBZKPT",
                format!("expected {} k-points, found {}", nk, lines.len() - 3),
            ));
        }

        let mut k_frac = Vec::with_capacity(nk);
        let mut k_weight = Vec::with_capacity(nk);

        for line in lines[3..3 + nk].iter() {
            let v: Vec<f64> = line
                .split_whitespace()
                .map(|s| {
                    s.parse::<f64>()
                        .map_err(|_| PawError::format("IBZKPT", format!("bad number '{}'", s)))
                })
                .collect::<Result<Vec<f64>>>()?;

            if v.len() < 4 {
                return Err(PawError::format(
                    "IBZKPT",
                    format!("k-point line '{}' needs 4 fields", line.trim()),
                ));
            }

            k_frac.push(Vector3f64::new(v[0], v[1], v[2]));
            k_weight.push(v[3]);
        }

        let k_weight = normalize_weights(k_weight)?;

        Ok(KptsIbzkpt { k_frac, k_weight })
    }
}

impl KPTS for KptsIbzkpt {
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
