use crate::*;

use types::{c64, PawError, Result};

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

/// What a fake WAVECAR holds.
#[derive(Debug, Clone)]
pub(crate) struct MockWavecar {
    pub nband: usize,
    pub nkpt: usize,
    pub nspin: usize,
    pub occupations: Vec<f64>,
}

impl MockWavecar {
    pub fn nstates(&self) -> usize {
        self.nband * self.nkpt * self.nspin
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockState {
    pub files: HashMap<String, MockWavecar>,
    pub sessions: HashMap<usize, String>,
    pub tables: HashMap<usize, usize>,
    pub next_handle: usize,

    // (self file, band) -> overlap with every basis state
    pub pseudo: HashMap<(String, usize), Vec<c64>>,
    pub compensation: HashMap<(String, usize), Vec<c64>>,

    pub calls: Vec<String>,
    pub table_arrays: Vec<ProjectorArrays>,
    pub setups: Vec<(usize, usize, usize, [usize; 3], Vec<i32>, Vec<f64>)>,
    pub overlaps: Vec<(usize, usize, usize, SiteIndexArrays)>,
    pub compensation_requests: Vec<(usize, usize, [usize; 3])>,
    pub released_sessions: Vec<usize>,
    pub released_tables: Vec<(usize, usize)>,

    pub fail_on: Option<&'static str>,
}

/// In-memory `ProjectionEngine` that records every call.
#[derive(Debug, Default)]
pub(crate) struct MockEngine {
    pub state: RefCell<MockState>,
}

impl MockEngine {
    pub fn new() -> MockEngine {
        MockEngine::default()
    }

    pub fn add_wavecar(&self, path: &str, wavecar: MockWavecar) {
        self.state.borrow_mut().files.insert(path.to_string(), wavecar);
    }

    pub fn set_pseudo(&self, path: &str, band: usize, overlaps: Vec<c64>) {
        self.state
            .borrow_mut()
            .pseudo
            .insert((path.to_string(), band), overlaps);
    }

    pub fn set_compensation(&self, path: &str, band: usize, overlaps: Vec<c64>) {
        self.state
            .borrow_mut()
            .compensation
            .insert((path.to_string(), band), overlaps);
    }

    pub fn fail_on(&self, call: &'static str) {
        self.state.borrow_mut().fail_on = Some(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    pub fn live_sessions(&self) -> usize {
        self.state.borrow().sessions.len()
    }

    pub fn live_tables(&self) -> usize {
        self.state.borrow().tables.len()
    }

    fn enter(&self, call: &str) -> Result<()> {
        let mut st = self.state.borrow_mut();

        st.calls.push(call.to_string());

        if st.fail_on == Some(call) {
            return Err(PawError::Engine(format!("{} failed", call)));
        }

        Ok(())
    }

    fn wavecar(&self, session: usize) -> Result<MockWavecar> {
        let st = self.state.borrow();

        st.sessions
            .get(&session)
            .and_then(|path| st.files.get(path))
            .cloned()
            .ok_or_else(|| PawError::Engine(format!("unknown session {}", session)))
    }

    fn file_of(&self, session: usize) -> Result<String> {
        self.state
            .borrow()
            .sessions
            .get(&session)
            .cloned()
            .ok_or_else(|| PawError::Engine(format!("unknown session {}", session)))
    }

    fn check_table(&self, table: usize) -> Result<()> {
        if self.state.borrow().tables.contains_key(&table) {
            Ok(())
        } else {
            Err(PawError::Engine(format!("unknown projector table {}", table)))
        }
    }

    fn overlaps(
        &self,
        responses: fn(&MockState) -> &HashMap<(String, usize), Vec<c64>>,
        basis: usize,
        this: usize,
        band: usize,
    ) -> Result<Vec<f64>> {
        let nstates = self.wavecar(basis)?.nstates();
        let key = (self.file_of(this)?, band);

        let st = self.state.borrow();

        Ok(match responses(&*st).get(&key) {
            Some(v) => v.iter().flat_map(|z| [z.re, z.im]).collect(),
            None => vec![0.0; 2 * nstates],
        })
    }
}

impl ProjectionEngine for MockEngine {
    type Session = usize;
    type Table = usize;

    fn read_session(&self, path: &Path, kpt_weights: &[f64]) -> Result<usize> {
        self.enter("read_session")?;

        let key = path.to_string_lossy().to_string();

        let mut st = self.state.borrow_mut();

        let nkpt = st
            .files
            .get(&key)
            .map(|w| w.nkpt)
            .ok_or_else(|| PawError::Engine(format!("cannot read '{}'", key)))?;

        if kpt_weights.len() != nkpt {
            return Err(PawError::Engine(format!(
                "'{}' needs {} weights, got {}",
                key,
                nkpt,
                kpt_weights.len()
            )));
        }

        st.next_handle += 1;

        let handle = st.next_handle;
        st.sessions.insert(handle, key);

        Ok(handle)
    }

    fn get_band_count(&self, session: usize) -> Result<usize> {
        Ok(self.wavecar(session)?.nband)
    }

    fn get_kpoint_count(&self, session: usize) -> Result<usize> {
        Ok(self.wavecar(session)?.nkpt)
    }

    fn get_spin_count(&self, session: usize) -> Result<usize> {
        Ok(self.wavecar(session)?.nspin)
    }

    fn pseudo_projection(&self, basis: usize, this: usize, band: usize) -> Result<Vec<f64>> {
        self.enter("pseudo_projection")?;

        self.overlaps(|st| &st.pseudo, basis, this, band)
    }

    fn build_projector_table(&self, arrays: &ProjectorArrays) -> Result<usize> {
        self.enter("build_projector_table")?;

        let mut st = self.state.borrow_mut();

        st.next_handle += 1;

        let handle = st.next_handle;
        st.tables.insert(handle, arrays.get_n_elements());
        st.table_arrays.push(arrays.clone());

        Ok(handle)
    }

    fn setup_projections(
        &self,
        session: usize,
        table: usize,
        n_elements: usize,
        fft_grid: [usize; 3],
        labels: &[i32],
        coords: &[f64],
    ) -> Result<()> {
        self.enter("setup_projections")?;
        self.wavecar(session)?;
        self.check_table(table)?;

        self.state.borrow_mut().setups.push((
            session,
            table,
            n_elements,
            fft_grid,
            labels.to_vec(),
            coords.to_vec(),
        ));

        Ok(())
    }

    fn overlap_setup(&self, request: &OverlapRequest<usize, usize>) -> Result<()> {
        self.enter("overlap_setup")?;
        self.wavecar(request.basis)?;
        self.wavecar(request.this)?;
        self.check_table(request.table)?;

        self.state.borrow_mut().overlaps.push((
            request.basis,
            request.this,
            request.table,
            request.sites.clone(),
        ));

        Ok(())
    }

    fn compensation_terms(&self, request: &CompensationRequest<usize, usize>) -> Result<Vec<f64>> {
        self.enter("compensation_terms")?;
        self.check_table(request.table)?;

        self.state.borrow_mut().compensation_requests.push((
            request.band,
            request.n_elements,
            request.fft_grid,
        ));

        self.overlaps(|st| &st.compensation, request.basis, request.this, request.band)
    }

    fn get_occupations(&self, session: usize) -> Result<Vec<f64>> {
        Ok(self.wavecar(session)?.occupations)
    }

    fn release_session(&self, session: usize) {
        let mut st = self.state.borrow_mut();

        st.calls.push("release_session".to_string());
        st.sessions.remove(&session);
        st.released_sessions.push(session);
    }

    fn release_projector_table(&self, table: usize, n_elements: usize) {
        let mut st = self.state.borrow_mut();

        st.calls.push("release_projector_table".to_string());
        st.tables.remove(&table);
        st.released_tables.push((table, n_elements));
    }
}
