use crate::labels::lookup_psp;
use crate::ElementLabels;

use log::debug;
use pspot::CoreRegion;
use types::{PawError, Result};

/// Per-element PAW data flattened into the parallel arrays the engine reads.
///
/// `metadata` holds one (label, nproj, ndata, ngrid) quadruple per element in
/// label order; every other array is the concatenation of the elements'
/// data in that same order:
///
/// - `ls`: nproj entries per element
/// - `proj_grids`: ndata
/// - `radial_grids`: ngrid
/// - `projectors`: nproj * ndata, real-space projectors
/// - `ae_waves`, `ps_waves`: nproj * ngrid
/// - `rmax_strs`: one verbatim max-radius text per element
///
/// `augs` is concatenated as well but its length is not part of the metadata.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProjectorArrays {
    metadata: Vec<i32>,
    ls: Vec<i32>,
    proj_grids: Vec<f64>,
    radial_grids: Vec<f64>,
    augs: Vec<f64>,
    projectors: Vec<f64>,
    ae_waves: Vec<f64>,
    ps_waves: Vec<f64>,
    rmax_strs: Vec<String>,
}

impl ProjectorArrays {
    pub fn build(
        labels: &ElementLabels,
        self_region: &CoreRegion,
        basis_region: &CoreRegion,
    ) -> Result<ProjectorArrays> {
        let mut arrays = ProjectorArrays::default();

        for (label, element) in labels.get_elements().iter().enumerate() {
            let pp = lookup_psp(element, self_region, basis_region)?;

            arrays.metadata.extend_from_slice(&[
                label as i32,
                pp.get_nproj() as i32,
                pp.get_ndata() as i32,
                pp.get_n_grid() as i32,
            ]);

            arrays.ls.extend(pp.get_ls().iter().map(|&l| l as i32));
            arrays.proj_grids.extend_from_slice(pp.get_proj_grid());
            arrays.radial_grids.extend_from_slice(pp.get_grid());
            arrays.augs.extend_from_slice(pp.get_augs());

            for iproj in 0..pp.get_nproj() {
                arrays.projectors.extend_from_slice(pp.get_real_proj(iproj));
                arrays.ae_waves.extend_from_slice(pp.get_ae_wave(iproj));
                arrays.ps_waves.extend_from_slice(pp.get_ps_wave(iproj));
            }

            arrays.rmax_strs.push(pp.get_rmax_str().to_string());
        }

        arrays.verify()?;

        debug!(
            "projector arrays: {} elements, {} projectors, {} projector samples",
            arrays.get_n_elements(),
            arrays.ls.len(),
            arrays.projectors.len()
        );

        Ok(arrays)
    }

    /// Check every concatenated array against the metadata quadruples.
    pub fn verify(&self) -> Result<()> {
        if self.metadata.len() % 4 != 0 {
            return Err(mismatch(format!(
                "metadata holds {} values, not a multiple of 4",
                self.metadata.len()
            )));
        }

        let mut nproj_total = 0;
        let mut ndata_total = 0;
        let mut ngrid_total = 0;
        let mut nproj_samples = 0;
        let mut nwave_samples = 0;

        for (ielem, quad) in self.metadata.chunks_exact(4).enumerate() {
            if quad[0] != ielem as i32 {
                return Err(mismatch(format!(
                    "element {} carries label {}",
                    ielem, quad[0]
                )));
            }

            if quad[1..].iter().any(|&n| n < 0) {
                return Err(mismatch(format!("negative count for element {}", ielem)));
            }

            let (nproj, ndata, ngrid) = (quad[1] as usize, quad[2] as usize, quad[3] as usize);

            nproj_total += nproj;
            ndata_total += ndata;
            ngrid_total += ngrid;
            nproj_samples += nproj * ndata;
            nwave_samples += nproj * ngrid;
        }

        let checks = [
            ("l list", self.ls.len(), nproj_total),
            ("projector grids", self.proj_grids.len(), ndata_total),
            ("radial grids", self.radial_grids.len(), ngrid_total),
            ("real-space projectors", self.projectors.len(), nproj_samples),
            ("all-electron waves", self.ae_waves.len(), nwave_samples),
            ("pseudo waves", self.ps_waves.len(), nwave_samples),
            ("max radius texts", self.rmax_strs.len(), self.get_n_elements()),
        ];

        for (name, found, expected) in checks.iter() {
            if found != expected {
                return Err(mismatch(format!(
                    "{} hold {} values, metadata expects {}",
                    name, found, expected
                )));
            }
        }

        Ok(())
    }

    pub fn get_n_elements(&self) -> usize {
        self.metadata.len() / 4
    }

    pub fn get_metadata(&self) -> &[i32] {
        &self.metadata
    }

    pub fn get_ls(&self) -> &[i32] {
        &self.ls
    }

    pub fn get_proj_grids(&self) -> &[f64] {
        &self.proj_grids
    }

    pub fn get_radial_grids(&self) -> &[f64] {
        &self.radial_grids
    }

    pub fn get_augs(&self) -> &[f64] {
        &self.augs
    }

    pub fn get_projectors(&self) -> &[f64] {
        &self.projectors
    }

    pub fn get_ae_waves(&self) -> &[f64] {
        &self.ae_waves
    }

    pub fn get_ps_waves(&self) -> &[f64] {
        &self.ps_waves
    }

    pub fn get_rmax_strs(&self) -> &[String] {
        &self.rmax_strs
    }
}

fn mismatch(message: String) -> PawError {
    PawError::format("projector arrays", message)
}

#[cfg(test)]
impl ProjectorArrays {
    pub(crate) fn with_ps_waves(mut self, ps_waves: Vec<f64>) -> ProjectorArrays {
        self.ps_waves = ps_waves;
        self
    }

    pub(crate) fn with_label(mut self, ielem: usize, label: i32) -> ProjectorArrays {
        self.metadata[4 * ielem] = label;
        self
    }
}
