use crate::*;

use crystal::Crystal;
use kpts::KPTS;
use log::{debug, info};
use pspot::CoreRegion;
use types::{PawError, Result};

use std::path::Path;
use std::rc::Rc;

/// Everything `setup_projection` hands to the engine, kept for the band
/// projections that follow.
pub(crate) struct ProjectionState<E: ProjectionEngine> {
    pub(crate) table: Rc<ProjectorTable<E>>,
    pub(crate) labels: ElementLabels,
    pub(crate) self_labels: Vec<i32>,
    pub(crate) self_coords: Vec<f64>,
    pub(crate) basis_labels: Vec<i32>,
    pub(crate) basis_coords: Vec<f64>,
    pub(crate) sites: SiteCategories,
    pub(crate) site_arrays: SiteIndexArrays,
    pub(crate) basis_session: E::Session,
}

/// All-electron wavefunction of one calculation: structure, PAW datasets and
/// the engine session holding the plane-wave coefficients.
pub struct Wavefunction<E: ProjectionEngine> {
    engine: Rc<E>,

    // dropped first, so the session goes before any projector table
    session: Session<E>,

    crystal: Crystal,
    core_region: Rc<CoreRegion>,
    kpt_weights: Vec<f64>,
    fft_grid: [usize; 3],

    state: Option<ProjectionState<E>>,

    // tables other wavefunctions set this session up against
    attached_tables: Vec<Rc<ProjectorTable<E>>>,
}

impl<E: ProjectionEngine> Wavefunction<E> {
    pub fn new<P: AsRef<Path>>(
        engine: Rc<E>,
        crystal: Crystal,
        core_region: Rc<CoreRegion>,
        wavecar: P,
        kpts: &dyn KPTS,
        fft_grid: [usize; 3],
    ) -> Result<Wavefunction<E>> {
        let kpt_weights = kpts.get_k_weights();

        let session = Session::open(Rc::clone(&engine), wavecar.as_ref(), &kpt_weights)?;

        let nkpt = session.get_kpoint_count()?;

        if nkpt != kpt_weights.len() {
            return Err(PawError::Engine(format!(
                "'{}' holds {} k-points but {} weights were given",
                wavecar.as_ref().display(),
                nkpt,
                kpt_weights.len()
            )));
        }

        Ok(Wavefunction {
            engine,
            session,
            crystal,
            core_region,
            kpt_weights,
            fft_grid,
            state: None,
            attached_tables: Vec::new(),
        })
    }

    /// Read structure, datasets, k-points and wavefunctions from one
    /// calculation directory.
    pub fn from_files<P: AsRef<Path>>(
        engine: Rc<E>,
        structure_file: P,
        wavecar_file: P,
        potcar_file: P,
        kpts_scheme: &str,
        kpts_file: P,
        fft_grid: [usize; 3],
    ) -> Result<Wavefunction<E>> {
        let mut crystal = Crystal::new();
        crystal.read_file(structure_file)?;

        let core_region = Rc::new(CoreRegion::from_potcar_file(potcar_file)?);

        let kpts = kpts::new(kpts_scheme, kpts_file)?;

        Wavefunction::new(engine, crystal, core_region, wavecar_file, kpts.as_ref(), fft_grid)
    }

    pub fn get_crystal(&self) -> &Crystal {
        &self.crystal
    }

    pub fn get_core_region(&self) -> &Rc<CoreRegion> {
        &self.core_region
    }

    pub fn get_kpt_weights(&self) -> &[f64] {
        &self.kpt_weights
    }

    pub fn get_fft_grid(&self) -> [usize; 3] {
        self.fft_grid
    }

    pub fn get_band_count(&self) -> Result<usize> {
        self.session.get_band_count()
    }

    pub fn get_kpoint_count(&self) -> Result<usize> {
        self.session.get_kpoint_count()
    }

    pub fn get_spin_count(&self) -> Result<usize> {
        self.session.get_spin_count()
    }

    pub fn get_state_count(&self) -> Result<usize> {
        self.session.get_state_count()
    }

    pub fn get_occupations(&self) -> Result<Vec<f64>> {
        let occs = self.engine.get_occupations(self.session.handle()?)?;

        let nstates = self.get_state_count()?;

        if occs.len() != nstates {
            return Err(PawError::Engine(format!(
                "{} occupations for {} states",
                occs.len(),
                nstates
            )));
        }

        Ok(occs)
    }

    pub fn is_set_up(&self) -> bool {
        self.state.is_some()
    }

    pub fn get_site_categories(&self) -> Option<&SiteCategories> {
        self.state.as_ref().map(|s| &s.sites)
    }

    pub fn get_element_labels(&self) -> Option<&ElementLabels> {
        self.state.as_ref().map(|s| &s.labels)
    }

    pub(crate) fn engine(&self) -> &E {
        &self.engine
    }

    pub(crate) fn session_handle(&self) -> Result<E::Session> {
        self.session.handle()
    }

    /// State of the last `setup_projection`, which must have been against
    /// `basis`.
    pub(crate) fn projection_state(&self, basis: &Wavefunction<E>) -> Result<&ProjectionState<E>> {
        let state = self.state.as_ref().ok_or_else(|| {
            if self.session.is_released() {
                PawError::UseAfterRelease("session")
            } else {
                PawError::NotSetUp("setup_projection has not been called".to_string())
            }
        })?;

        if state.basis_session != basis.session_handle()? {
            return Err(PawError::NotSetUp(
                "projection was set up against a different basis".to_string(),
            ));
        }

        Ok(state)
    }

    /// Prepare the engine for projecting bands of `self` onto `basis`.
    ///
    /// Builds the element labels and the shared projector table, sets up
    /// projector overlaps for both sessions and registers the site
    /// categories with the engine. Any earlier setup is discarded first; a
    /// failure part way leaves no projection state but keeps the engine-side
    /// effects of the calls that succeeded.
    pub fn setup_projection(&mut self, basis: &mut Wavefunction<E>) -> Result<()> {
        let this = self.session.handle()?;
        let basis_session = basis.session.handle()?;

        self.state = None;

        let labels = ElementLabels::new(&self.core_region, &basis.core_region);
        let n_elements = labels.len();

        let arrays = ProjectorArrays::build(&labels, &self.core_region, &basis.core_region)?;

        let table = Rc::new(ProjectorTable::build(Rc::clone(&self.engine), &arrays)?);
        let table_handle = table.handle()?;

        let self_labels = labels.labels_of(&self.crystal)?;
        let self_coords = self.crystal.get_frac_coords_flat();
        let basis_labels = labels.labels_of(&basis.crystal)?;
        let basis_coords = basis.crystal.get_frac_coords_flat();

        self.engine.setup_projections(
            this,
            table_handle,
            n_elements,
            self.fft_grid,
            &self_labels,
            &self_coords,
        )?;

        // the basis session now refers to the table as well; tables of
        // earlier setups that nobody else holds are released here
        basis.attached_tables.retain(|t| Rc::strong_count(t) > 1);
        basis.attached_tables.push(Rc::clone(&table));

        self.engine.setup_projections(
            basis_session,
            table_handle,
            n_elements,
            self.fft_grid,
            &basis_labels,
            &basis_coords,
        )?;

        let sites = classify(
            &basis.crystal,
            &self.crystal,
            &self.core_region,
            &basis.core_region,
        )?;
        let site_arrays = sites.to_index_arrays();

        self.engine.overlap_setup(&OverlapRequest {
            basis: basis_session,
            this,
            table: table_handle,
            basis_labels: &basis_labels,
            self_labels: &self_labels,
            basis_coords: &basis_coords,
            self_coords: &self_coords,
            sites: &site_arrays,
        })?;

        info!(
            "projection set up: {} elements, {} matched sites, {} overlapping pairs",
            n_elements,
            sites.m_r.len(),
            sites.n_rs.len()
        );

        self.state = Some(ProjectionState {
            table,
            labels,
            self_labels,
            self_coords,
            basis_labels,
            basis_coords,
            sites,
            site_arrays,
            basis_session,
        });

        Ok(())
    }

    /// Release the session and this wavefunction's hold on projector tables.
    /// Every later engine operation fails with `UseAfterRelease`.
    pub fn free_all(&mut self) {
        debug!("free wavefunction of '{}'", self.crystal.get_comment());

        self.session.release();
        self.state = None;
        self.attached_tables.clear();
    }
}
