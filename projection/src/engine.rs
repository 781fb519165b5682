use crate::{ProjectorArrays, SiteIndexArrays};

use types::Result;

use std::fmt::Debug;
use std::path::Path;

/// Numerical backend that stores plane-wave coefficients and evaluates
/// projector integrals.
///
/// Handles are plain values owned by the engine; the `Session` and
/// `ProjectorTable` guards of this crate make sure each is released once.
/// Interleaved results hold `2 * nband * nkpt * nspin` doubles of the basis
/// session, real and imaginary parts alternating, ordered band, spin, k-point.
pub trait ProjectionEngine {
    type Session: Copy + Debug + PartialEq;
    type Table: Copy + Debug + PartialEq;

    fn read_session(&self, path: &Path, kpt_weights: &[f64]) -> Result<Self::Session>;

    fn get_band_count(&self, session: Self::Session) -> Result<usize>;
    fn get_kpoint_count(&self, session: Self::Session) -> Result<usize>;
    fn get_spin_count(&self, session: Self::Session) -> Result<usize>;

    /// <basis band | pseudo part of `band` of `this`> for every basis state.
    fn pseudo_projection(
        &self,
        basis: Self::Session,
        this: Self::Session,
        band: usize,
    ) -> Result<Vec<f64>>;

    fn build_projector_table(&self, arrays: &ProjectorArrays) -> Result<Self::Table>;

    fn setup_projections(
        &self,
        session: Self::Session,
        table: Self::Table,
        n_elements: usize,
        fft_grid: [usize; 3],
        labels: &[i32],
        coords: &[f64],
    ) -> Result<()>;

    fn overlap_setup(&self, request: &OverlapRequest<Self::Session, Self::Table>) -> Result<()>;

    /// Augmentation-sphere corrections to `pseudo_projection`.
    fn compensation_terms(
        &self,
        request: &CompensationRequest<Self::Session, Self::Table>,
    ) -> Result<Vec<f64>>;

    /// One occupation per state, same ordering as the interleaved results.
    fn get_occupations(&self, session: Self::Session) -> Result<Vec<f64>>;

    fn release_session(&self, session: Self::Session);
    fn release_projector_table(&self, table: Self::Table, n_elements: usize);
}

/// Arguments of `ProjectionEngine::overlap_setup`.
#[derive(Debug)]
pub struct OverlapRequest<'a, S, T> {
    pub basis: S,
    pub this: S,
    pub table: T,
    pub basis_labels: &'a [i32],
    pub self_labels: &'a [i32],
    pub basis_coords: &'a [f64],
    pub self_coords: &'a [f64],
    pub sites: &'a SiteIndexArrays,
}

/// Arguments of `ProjectionEngine::compensation_terms`.
#[derive(Debug)]
pub struct CompensationRequest<'a, S, T> {
    pub band: usize,
    pub this: S,
    pub basis: S,
    pub table: T,
    pub n_elements: usize,
    pub sites: &'a SiteIndexArrays,
    pub self_labels: &'a [i32],
    pub self_coords: &'a [f64],
    pub basis_labels: &'a [i32],
    pub basis_coords: &'a [f64],
    pub fft_grid: [usize; 3],
}
