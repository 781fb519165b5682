use crate::labels::lookup_psp;

use crystal::Crystal;
use dwconsts::*;
use log::debug;
use pspot::CoreRegion;
use types::{PawError, Result};

/// Site correspondence between a basis (R) and a self (S) structure.
///
/// `m_r[i]` and `m_s[i]` are the same site in both structures. Every other
/// site is in `n_r` or `n_s`; `n_rs` pairs (basis, self) sites of those two
/// lists whose augmentation spheres overlap.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SiteCategories {
    pub m_r: Vec<usize>,
    pub m_s: Vec<usize>,
    pub n_r: Vec<usize>,
    pub n_s: Vec<usize>,
    pub n_rs: Vec<(usize, usize)>,
}

/// `SiteCategories` as the `i32` arrays handed to the engine, with `n_rs`
/// split into its basis and self halves.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SiteIndexArrays {
    pub m_r: Vec<i32>,
    pub m_s: Vec<i32>,
    pub n_r: Vec<i32>,
    pub n_s: Vec<i32>,
    pub n_rs_r: Vec<i32>,
    pub n_rs_s: Vec<i32>,
}

impl SiteCategories {
    pub fn to_index_arrays(&self) -> SiteIndexArrays {
        let to_i32 = |v: &[usize]| v.iter().map(|&i| i as i32).collect::<Vec<i32>>();

        SiteIndexArrays {
            m_r: to_i32(&self.m_r),
            m_s: to_i32(&self.m_s),
            n_r: to_i32(&self.n_r),
            n_s: to_i32(&self.n_s),
            n_rs_r: self.n_rs.iter().map(|&(r, _)| r as i32).collect(),
            n_rs_s: self.n_rs.iter().map(|&(_, s)| s as i32).collect(),
        }
    }
}

/// Sort the sites of `basis` and `this` into matched and unmatched sets.
///
/// Distances are nearest-image distances in the lattice of `this`. A self
/// site within `SITE_MATCH_TOLERANCE` of two or more basis sites of its
/// element makes the pairing ambiguous and is rejected.
pub fn classify(
    basis: &Crystal,
    this: &Crystal,
    self_region: &CoreRegion,
    basis_region: &CoreRegion,
) -> Result<SiteCategories> {
    let latt = this.get_latt();

    let basis_sp = basis.get_atom_species();
    let basis_pos = basis.get_atom_positions();
    let self_sp = this.get_atom_species();
    let self_pos = this.get_atom_positions();

    let nbasis = basis.get_n_atoms();
    let nself = this.get_n_atoms();

    let is_same_site = |i: usize, j: usize| -> bool {
        basis_sp[i] == self_sp[j]
            && latt.min_image_distance(&basis_pos[i], &self_pos[j]) <= SITE_MATCH_TOLERANCE
    };

    for j in 0..nself {
        let candidates: Vec<usize> = (0..nbasis).filter(|&i| is_same_site(i, j)).collect();

        if candidates.len() > 1 {
            return Err(PawError::GeometryAmbiguity {
                self_index: j,
                basis_indices: candidates,
            });
        }
    }

    let mut cat = SiteCategories::default();

    let mut claimed = vec![false; nself];

    for i in 0..nbasis {
        if let Some(j) = (0..nself).find(|&j| !claimed[j] && is_same_site(i, j)) {
            claimed[j] = true;

            cat.m_r.push(i);
            cat.m_s.push(j);
        } else {
            cat.n_r.push(i);
        }
    }

    cat.n_s = (0..nself).filter(|&j| !claimed[j]).collect();

    for &i in cat.n_r.iter() {
        let rmax_i = lookup_psp(&basis_sp[i], self_region, basis_region)?.get_rmax();

        for &j in cat.n_s.iter() {
            let rmax_j = lookup_psp(&self_sp[j], self_region, basis_region)?.get_rmax();

            if latt.min_image_distance(&basis_pos[i], &self_pos[j]) < rmax_i + rmax_j {
                cat.n_rs.push((i, j));
            }
        }
    }

    debug!(
        "site categories: {} matched, {} basis-only, {} self-only, {} overlapping pairs",
        cat.m_r.len(),
        cat.n_r.len(),
        cat.n_s.len(),
        cat.n_rs.len()
    );

    Ok(cat)
}
