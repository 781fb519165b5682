use crate::*;

use dwconsts::*;
use log::{debug, info, warn};
use types::{c64, interleaved_to_c64, PawError, Result};

use std::collections::{BTreeMap, BTreeSet};

impl<E: ProjectionEngine> Wavefunction<E> {
    /// Overlaps of the pseudo part of `band` with every state of `basis`.
    /// Needs no `setup_projection`.
    pub fn pseudo_projection(&self, band: usize, basis: &Wavefunction<E>) -> Result<Vec<c64>> {
        self.check_band(band)?;

        let nstates = basis.get_state_count()?;

        let res = self.engine().pseudo_projection(
            basis.session_handle()?,
            self.session_handle()?,
            band,
        )?;

        check_interleaved_len("pseudo projection", &res, nstates)?;

        Ok(interleaved_to_c64(&res))
    }

    /// All-electron overlaps of `band` with every state of `basis`, ordered
    /// band, spin, k-point of the basis.
    pub fn single_band_projection(&self, band: usize, basis: &Wavefunction<E>) -> Result<Vec<c64>> {
        let state = self.projection_state(basis)?;

        self.check_band(band)?;

        let nstates = basis.get_state_count()?;

        let this = self.session_handle()?;
        let basis_session = basis.session_handle()?;

        let mut res = self
            .engine()
            .pseudo_projection(basis_session, this, band)?;

        check_interleaved_len("pseudo projection", &res, nstates)?;

        let comp = self.engine().compensation_terms(&CompensationRequest {
            band,
            this,
            basis: basis_session,
            table: state.table.handle()?,
            n_elements: state.labels.len(),
            sites: &state.site_arrays,
            self_labels: &state.self_labels,
            self_coords: &state.self_coords,
            basis_labels: &state.basis_labels,
            basis_coords: &state.basis_coords,
            fft_grid: self.get_fft_grid(),
        })?;

        check_interleaved_len("compensation terms", &comp, nstates)?;

        res.iter_mut().zip(comp.iter()).for_each(|(r, c)| *r += c);

        Ok(interleaved_to_c64(&res))
    }

    /// Valence and conduction weight of `band` in the states of `bulk`.
    ///
    /// A bulk state counts as valence when its occupation exceeds one half.
    /// Each |overlap|^2 is weighted by its k-point weight over the spin count.
    /// With `pseudo`, only pseudo overlaps are used and the two weights are
    /// rescaled to sum to one.
    pub fn proportion_conduction(
        &self,
        band: usize,
        bulk: &Wavefunction<E>,
        pseudo: bool,
    ) -> Result<(f64, f64)> {
        let nkpt = bulk.get_kpoint_count()?;
        let nspin = bulk.get_spin_count()? as f64;

        let occs = bulk.get_occupations()?;

        let weights = bulk.get_kpt_weights();

        if weights.len() != nkpt {
            return Err(PawError::Engine(format!(
                "{} k-point weights for {} k-points",
                weights.len(),
                nkpt
            )));
        }

        let res = if pseudo {
            self.pseudo_projection(band, bulk)?
        } else {
            self.single_band_projection(band, bulk)?
        };

        let mut v = 0.0;
        let mut c = 0.0;

        for (i, (z, occ)) in res.iter().zip(occs.iter()).enumerate() {
            let w = z.norm_sqr() * weights[i % nkpt] / nspin;

            if *occ > OCC_VALENCE_THRESHOLD {
                v += w;
            } else {
                c += w;
            }
        }

        if pseudo {
            let total = v + c;

            if total > 0.0 {
                v /= total;
                c /= total;
            } else {
                warn!("band {} has no pseudo overlap with the bulk states", band);
            }
        }

        debug!(
            "band {:5} pseudo = {:5} valence = {:12.8} conduction = {:12.8}",
            band, pseudo, v, c
        );

        Ok((v, c))
    }

    /// Full valence/conduction split of the bands that straddle the gap.
    ///
    /// Every band is screened with the pseudo estimate; a band with both
    /// weights above `bound` is selected together with its neighbours and
    /// re-evaluated with the all-electron overlaps.
    pub fn defect_band_analysis(
        &self,
        bulk: &Wavefunction<E>,
        bound: f64,
    ) -> Result<BTreeMap<usize, (f64, f64)>> {
        let nband = self.get_band_count()?;

        let mut selected = BTreeSet::new();

        for band in 0..nband {
            let (v, c) = self.proportion_conduction(band, bulk, true)?;

            if v > bound && c > bound {
                if band > 0 {
                    selected.insert(band - 1);
                }

                selected.insert(band);

                if band + 1 < nband {
                    selected.insert(band + 1);
                }
            }
        }

        info!("{} of {} bands selected for full projection", selected.len(), nband);

        let mut results = BTreeMap::new();

        for band in selected {
            results.insert(band, self.proportion_conduction(band, bulk, false)?);
        }

        Ok(results)
    }

    fn check_band(&self, band: usize) -> Result<()> {
        let nband = self.get_band_count()?;

        if band >= nband {
            return Err(PawError::Engine(format!(
                "band {} out of range, the session has {} bands",
                band, nband
            )));
        }

        Ok(())
    }
}

fn check_interleaved_len(what: &str, v: &[f64], nstates: usize) -> Result<()> {
    if v.len() != 2 * nstates {
        return Err(PawError::Engine(format!(
            "{} returned {} values, expected {}",
            what,
            v.len(),
            2 * nstates
        )));
    }

    Ok(())
}

/// Print the result of `defect_band_analysis`.
pub fn display_band_analysis(results: &BTreeMap<usize, (f64, f64)>) {
    info!("   {:-^88}", " defect band analysis ");
    info!("{:12} {:^8} {:^16} {:^16}", "", "band", "valence", "conduction");

    for (band, (v, c)) in results.iter() {
        info!("{:12} {:^8} {:16.8} {:16.8}", "", band, v, c);
    }
}
