#![allow(non_camel_case_types)]

use std::os::raw::*;

// opaque plane-wave wavefunction set
#[repr(C)]
pub struct pswf_t {
    _private: [u8; 0],
}

// opaque list of per-element projector data
#[repr(C)]
pub struct ppot_t {
    _private: [u8; 0],
}

extern "C" {
    pub fn read_wavefunctions(filename: *const c_char, kpt_weights: *const c_double) -> *mut pswf_t;

    pub fn get_nband(wf: *mut pswf_t) -> c_int;
    pub fn get_nwk(wf: *mut pswf_t) -> c_int;
    pub fn get_nspin(wf: *mut pswf_t) -> c_int;

    // 2 * nband * nwk * nspin doubles, interleaved re/im
    pub fn pseudoprojection(wf_ref: *mut pswf_t, wf_proj: *mut pswf_t, band_num: c_int) -> *mut c_double;

    pub fn get_projector_list(
        num_els: c_int,
        labels: *const c_int,
        ls: *const c_int,
        pgrids: *const c_double,
        wgrids: *const c_double,
        projectors: *const c_double,
        aewaves: *const c_double,
        pswaves: *const c_double,
        rmaxs: *const *const c_char,
    ) -> *mut ppot_t;

    pub fn setup_projections(
        wf: *mut pswf_t,
        pps: *mut ppot_t,
        num_elems: c_int,
        num_sites: c_int,
        fftg: *const c_int,
        labels: *const c_int,
        coords: *const c_double,
    );

    pub fn overlap_setup(
        wf_r: *mut pswf_t,
        wf_s: *mut pswf_t,
        pps: *mut ppot_t,
        labels_r: *const c_int,
        labels_s: *const c_int,
        coords_r: *const c_double,
        coords_s: *const c_double,
        n_r: *const c_int,
        n_s: *const c_int,
        n_rs_r: *const c_int,
        n_rs_s: *const c_int,
        num_n_r: c_int,
        num_n_s: c_int,
        num_n_rs: c_int,
    );

    // 2 * nband * nwk * nspin doubles, interleaved re/im
    pub fn compensation_terms(
        band_num: c_int,
        wf_self: *mut pswf_t,
        wf_basis: *mut pswf_t,
        pps: *mut ppot_t,
        num_elems: c_int,
        num_m: c_int,
        num_n_r: c_int,
        num_n_s: c_int,
        num_n_rs: c_int,
        m_r: *const c_int,
        m_s: *const c_int,
        n_r: *const c_int,
        n_s: *const c_int,
        n_rs_r: *const c_int,
        n_rs_s: *const c_int,
        self_labels: *const c_int,
        self_coords: *const c_double,
        basis_labels: *const c_int,
        basis_coords: *const c_double,
        fft_grid: *const c_int,
    ) -> *mut c_double;

    // nband * nwk * nspin doubles
    pub fn get_occs(wf: *mut pswf_t) -> *mut c_double;

    pub fn free_pswf(wf: *mut pswf_t);
    pub fn free_ppot_list(pps: *mut ppot_t, num_els: c_int);
    pub fn free_ptr(ptr: *mut c_void);
}
