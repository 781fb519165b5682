use crate::{ProjectionEngine, ProjectorArrays};

use log::debug;
use types::{PawError, Result};

use std::path::Path;
use std::rc::Rc;

/// Plane-wave session, released exactly once (on `release` or drop).
pub struct Session<E: ProjectionEngine> {
    engine: Rc<E>,
    handle: Option<E::Session>,
}

impl<E: ProjectionEngine> Session<E> {
    pub fn open(engine: Rc<E>, path: &Path, kpt_weights: &[f64]) -> Result<Session<E>> {
        let handle = engine.read_session(path, kpt_weights)?;

        debug!("opened session {:?} from '{}'", handle, path.display());

        Ok(Session {
            engine,
            handle: Some(handle),
        })
    }

    pub fn handle(&self) -> Result<E::Session> {
        self.handle.ok_or(PawError::UseAfterRelease("session"))
    }

    pub fn is_released(&self) -> bool {
        self.handle.is_none()
    }

    pub fn get_band_count(&self) -> Result<usize> {
        self.engine.get_band_count(self.handle()?)
    }

    pub fn get_kpoint_count(&self) -> Result<usize> {
        self.engine.get_kpoint_count(self.handle()?)
    }

    pub fn get_spin_count(&self) -> Result<usize> {
        self.engine.get_spin_count(self.handle()?)
    }

    /// Number of (band, spin, k-point) states.
    pub fn get_state_count(&self) -> Result<usize> {
        Ok(self.get_band_count()? * self.get_kpoint_count()? * self.get_spin_count()?)
    }

    pub fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("release session {:?}", handle);
            self.engine.release_session(handle);
        }
    }
}

impl<E: ProjectionEngine> Drop for Session<E> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Engine-side projector table. Shared through `Rc` by every wavefunction
/// whose session was set up against it; the last holder releases it.
pub struct ProjectorTable<E: ProjectionEngine> {
    engine: Rc<E>,
    handle: Option<E::Table>,
    n_elements: usize,
}

impl<E: ProjectionEngine> ProjectorTable<E> {
    pub fn build(engine: Rc<E>, arrays: &ProjectorArrays) -> Result<ProjectorTable<E>> {
        let handle = engine.build_projector_table(arrays)?;

        debug!(
            "built projector table {:?} for {} elements",
            handle,
            arrays.get_n_elements()
        );

        Ok(ProjectorTable {
            engine,
            handle: Some(handle),
            n_elements: arrays.get_n_elements(),
        })
    }

    pub fn handle(&self) -> Result<E::Table> {
        self.handle.ok_or(PawError::UseAfterRelease("projector table"))
    }

    pub fn get_n_elements(&self) -> usize {
        self.n_elements
    }

    pub fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("release projector table {:?}", handle);
            self.engine.release_projector_table(handle, self.n_elements);
        }
    }
}

impl<E: ProjectionEngine> Drop for ProjectorTable<E> {
    fn drop(&mut self) {
        self.release();
    }
}
