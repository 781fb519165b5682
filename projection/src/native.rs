use crate::*;

use pawpy_sys as ffi;
use types::{PawError, Result};

use std::convert::TryFrom;
use std::ffi::{c_void, CString};
use std::os::raw::{c_char, c_int};
use std::path::Path;

/// `ProjectionEngine` backed by the pawpy C library.
#[derive(Debug, Default)]
pub struct NativeEngine;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NativeSession(*mut ffi::pswf_t);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NativeTable(*mut ffi::ppot_t);

impl NativeEngine {
    pub fn new() -> NativeEngine {
        NativeEngine
    }

    fn state_count(&self, session: NativeSession) -> Result<usize> {
        Ok(self.get_band_count(session)?
            * self.get_kpoint_count(session)?
            * self.get_spin_count(session)?)
    }
}

fn to_c_int(n: usize, what: &str) -> Result<c_int> {
    c_int::try_from(n).map_err(|_| PawError::Engine(format!("{} = {} does not fit a C int", what, n)))
}

fn from_c_int(n: c_int, what: &str) -> Result<usize> {
    usize::try_from(n).map_err(|_| PawError::Engine(format!("engine returned {} = {}", what, n)))
}

fn fft_dims(fft_grid: [usize; 3]) -> Result<[c_int; 3]> {
    Ok([
        to_c_int(fft_grid[0], "fft grid")?,
        to_c_int(fft_grid[1], "fft grid")?,
        to_c_int(fft_grid[2], "fft grid")?,
    ])
}

// engine-owned buffer of n doubles, copied then freed
fn take_buffer(buf: *mut f64, n: usize, what: &str) -> Result<Vec<f64>> {
    if buf.is_null() {
        return Err(PawError::Engine(format!("{} returned no data", what)));
    }

    let v = unsafe { std::slice::from_raw_parts(buf, n).to_vec() };

    unsafe { ffi::free_ptr(buf as *mut c_void) };

    Ok(v)
}

impl ProjectionEngine for NativeEngine {
    type Session = NativeSession;
    type Table = NativeTable;

    fn read_session(&self, path: &Path, kpt_weights: &[f64]) -> Result<NativeSession> {
        // the library does not report a missing file itself
        std::fs::metadata(path).map_err(|e| PawError::io(path, e))?;

        let cpath = CString::new(path.to_string_lossy().as_bytes())
            .map_err(|_| PawError::Engine(format!("invalid path '{}'", path.display())))?;

        let wf = unsafe { ffi::read_wavefunctions(cpath.as_ptr(), kpt_weights.as_ptr()) };

        if wf.is_null() {
            return Err(PawError::Engine(format!(
                "cannot read wavefunctions from '{}'",
                path.display()
            )));
        }

        Ok(NativeSession(wf))
    }

    fn get_band_count(&self, session: NativeSession) -> Result<usize> {
        from_c_int(unsafe { ffi::get_nband(session.0) }, "nband")
    }

    fn get_kpoint_count(&self, session: NativeSession) -> Result<usize> {
        from_c_int(unsafe { ffi::get_nwk(session.0) }, "nwk")
    }

    fn get_spin_count(&self, session: NativeSession) -> Result<usize> {
        from_c_int(unsafe { ffi::get_nspin(session.0) }, "nspin")
    }

    fn pseudo_projection(
        &self,
        basis: NativeSession,
        this: NativeSession,
        band: usize,
    ) -> Result<Vec<f64>> {
        let n = 2 * self.state_count(basis)?;

        let buf = unsafe { ffi::pseudoprojection(basis.0, this.0, to_c_int(band, "band")?) };

        take_buffer(buf, n, "pseudoprojection")
    }

    fn build_projector_table(&self, arrays: &ProjectorArrays) -> Result<NativeTable> {
        let rmax_strs = arrays
            .get_rmax_strs()
            .iter()
            .map(|s| {
                CString::new(s.as_bytes())
                    .map_err(|_| PawError::Engine(format!("invalid max radius text '{}'", s)))
            })
            .collect::<Result<Vec<CString>>>()?;

        let rmax_ptrs: Vec<*const c_char> = rmax_strs.iter().map(|s| s.as_ptr()).collect();

        let pps = unsafe {
            ffi::get_projector_list(
                to_c_int(arrays.get_n_elements(), "element count")?,
                arrays.get_metadata().as_ptr(),
                arrays.get_ls().as_ptr(),
                arrays.get_proj_grids().as_ptr(),
                arrays.get_radial_grids().as_ptr(),
                arrays.get_projectors().as_ptr(),
                arrays.get_ae_waves().as_ptr(),
                arrays.get_ps_waves().as_ptr(),
                rmax_ptrs.as_ptr(),
            )
        };

        if pps.is_null() {
            return Err(PawError::Engine("get_projector_list returned no table".to_string()));
        }

        Ok(NativeTable(pps))
    }

    fn setup_projections(
        &self,
        session: NativeSession,
        table: NativeTable,
        n_elements: usize,
        fft_grid: [usize; 3],
        labels: &[i32],
        coords: &[f64],
    ) -> Result<()> {
        if coords.len() != 3 * labels.len() {
            return Err(PawError::Engine(format!(
                "{} coordinates for {} sites",
                coords.len(),
                labels.len()
            )));
        }

        let fftg = fft_dims(fft_grid)?;

        unsafe {
            ffi::setup_projections(
                session.0,
                table.0,
                to_c_int(n_elements, "element count")?,
                to_c_int(labels.len(), "site count")?,
                fftg.as_ptr(),
                labels.as_ptr(),
                coords.as_ptr(),
            )
        };

        Ok(())
    }

    fn overlap_setup(&self, request: &OverlapRequest<NativeSession, NativeTable>) -> Result<()> {
        let sites = request.sites;

        unsafe {
            ffi::overlap_setup(
                request.basis.0,
                request.this.0,
                request.table.0,
                request.basis_labels.as_ptr(),
                request.self_labels.as_ptr(),
                request.basis_coords.as_ptr(),
                request.self_coords.as_ptr(),
                sites.n_r.as_ptr(),
                sites.n_s.as_ptr(),
                sites.n_rs_r.as_ptr(),
                sites.n_rs_s.as_ptr(),
                to_c_int(sites.n_r.len(), "|N_R|")?,
                to_c_int(sites.n_s.len(), "|N_S|")?,
                to_c_int(sites.n_rs_r.len(), "|N_RS|")?,
            )
        };

        Ok(())
    }

    fn compensation_terms(
        &self,
        request: &CompensationRequest<NativeSession, NativeTable>,
    ) -> Result<Vec<f64>> {
        let n = 2 * self.state_count(request.basis)?;

        let sites = request.sites;
        let fftg = fft_dims(request.fft_grid)?;

        let buf = unsafe {
            ffi::compensation_terms(
                to_c_int(request.band, "band")?,
                request.this.0,
                request.basis.0,
                request.table.0,
                to_c_int(request.n_elements, "element count")?,
                to_c_int(sites.m_r.len(), "|M|")?,
                to_c_int(sites.n_r.len(), "|N_R|")?,
                to_c_int(sites.n_s.len(), "|N_S|")?,
                to_c_int(sites.n_rs_r.len(), "|N_RS|")?,
                sites.m_r.as_ptr(),
                sites.m_s.as_ptr(),
                sites.n_r.as_ptr(),
                sites.n_s.as_ptr(),
                sites.n_rs_r.as_ptr(),
                sites.n_rs_s.as_ptr(),
                request.self_labels.as_ptr(),
                request.self_coords.as_ptr(),
                request.basis_labels.as_ptr(),
                request.basis_coords.as_ptr(),
                fftg.as_ptr(),
            )
        };

        take_buffer(buf, n, "compensation_terms")
    }

    fn get_occupations(&self, session: NativeSession) -> Result<Vec<f64>> {
        let n = self.state_count(session)?;

        let buf = unsafe { ffi::get_occs(session.0) };

        take_buffer(buf, n, "get_occs")
    }

    fn release_session(&self, session: NativeSession) {
        unsafe { ffi::free_pswf(session.0) };
    }

    fn release_projector_table(&self, table: NativeTable, n_elements: usize) {
        // counts come from ProjectorArrays, which already fit a C int
        let n = c_int::try_from(n_elements).unwrap_or(c_int::MAX);

        unsafe { ffi::free_ppot_list(table.0, n) };
    }
}
