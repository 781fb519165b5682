mod cursor;
pub use cursor::*;

mod paw;

use log::info;

/// One element's PAW dataset, as read from a POTCAR.
///
/// Arrays on the radial grid (`grid`) are the potentials, core densities and
/// partial waves; arrays on the projector grid are the real-space projectors.
/// Per-projector entries (`ls`, waves, projectors) share one index.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Pseudopotential {
    rmax: f64,

    // verbatim third token of every "Non local Part" header
    rmax_strs: Vec<String>,

    ndata: usize,
    step: (f64, f64),

    local_channel: f64,
    local_part: Vec<f64>,
    gradxc: i32,
    core_density: Vec<f64>,
    atomic_density: Vec<f64>,
    atomic_density_tail: f64,

    nonlocal_strengths: Vec<Vec<f64>>,

    ls: Vec<usize>,
    proj_grid: Vec<f64>,
    recip_projs: Vec<Vec<f64>>,
    real_projs: Vec<Vec<f64>>,

    augs: Vec<f64>,
    occupancies: Vec<f64>,

    grid: Vec<f64>,
    ae_potential: Vec<f64>,
    ae_core_charge: Vec<f64>,
    kinetic: Vec<f64>,
    ps_potential: Vec<f64>,
    ps_core_charge: Vec<f64>,

    ps_waves: Vec<Vec<f64>>,
    ae_waves: Vec<Vec<f64>>,
}

impl Pseudopotential {
    pub fn get_rmax(&self) -> f64 {
        self.rmax
    }

    /// Max-radius text of the last non-local channel, as the engine expects it.
    pub fn get_rmax_str(&self) -> &str {
        self.rmax_strs.last().map(|s| s.as_str()).unwrap_or("")
    }

    pub fn get_rmax_strs(&self) -> &[String] {
        &self.rmax_strs
    }

    pub fn get_ndata(&self) -> usize {
        self.ndata
    }

    pub fn get_step(&self) -> (f64, f64) {
        self.step
    }

    pub fn get_local_channel(&self) -> f64 {
        self.local_channel
    }

    pub fn get_local_part(&self) -> &[f64] {
        &self.local_part
    }

    pub fn get_gradxc(&self) -> i32 {
        self.gradxc
    }

    pub fn get_core_density(&self) -> &[f64] {
        &self.core_density
    }

    pub fn get_atomic_density(&self) -> &[f64] {
        &self.atomic_density
    }

    pub fn get_atomic_density_tail(&self) -> f64 {
        self.atomic_density_tail
    }

    pub fn get_n_channels(&self) -> usize {
        self.nonlocal_strengths.len()
    }

    pub fn get_nonlocal_strengths(&self, ichannel: usize) -> &[f64] {
        &self.nonlocal_strengths[ichannel]
    }

    /// Number of (energy, l) projectors.
    pub fn get_nproj(&self) -> usize {
        self.ls.len()
    }

    pub fn get_ls(&self) -> &[usize] {
        &self.ls
    }

    pub fn get_lmax(&self) -> usize {
        self.ls.iter().copied().max().unwrap_or(0)
    }

    pub fn get_proj_grid(&self) -> &[f64] {
        &self.proj_grid
    }

    pub fn get_recip_proj(&self, iproj: usize) -> &[f64] {
        &self.recip_projs[iproj]
    }

    pub fn get_real_proj(&self, iproj: usize) -> &[f64] {
        &self.real_projs[iproj]
    }

    pub fn get_augs(&self) -> &[f64] {
        &self.augs
    }

    pub fn get_occupancies(&self) -> &[f64] {
        &self.occupancies
    }

    pub fn get_grid(&self) -> &[f64] {
        &self.grid
    }

    pub fn get_n_grid(&self) -> usize {
        self.grid.len()
    }

    pub fn get_ae_potential(&self) -> &[f64] {
        &self.ae_potential
    }

    pub fn get_ae_core_charge(&self) -> &[f64] {
        &self.ae_core_charge
    }

    pub fn get_kinetic(&self) -> &[f64] {
        &self.kinetic
    }

    pub fn get_ps_potential(&self) -> &[f64] {
        &self.ps_potential
    }

    pub fn get_ps_core_charge(&self) -> &[f64] {
        &self.ps_core_charge
    }

    pub fn get_ps_wave(&self, iproj: usize) -> &[f64] {
        &self.ps_waves[iproj]
    }

    pub fn get_ae_wave(&self, iproj: usize) -> &[f64] {
        &self.ae_waves[iproj]
    }

    pub fn display(&self) {
        info!("{:12} {:^16} {:8.3}", "", "rmax", self.rmax);
        info!("{:12} {:^16} {:8}", "", "ndata", self.ndata);
        info!("{:12} {:^16} {:8}", "", "radial points", self.grid.len());
        info!("{:12} {:^16} {:?}", "", "l", self.ls);
    }
}
