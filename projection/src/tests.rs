use crate::mock::*;
use crate::*;

use crystal::Crystal;
use kpts::KptsList;
use lattice::Lattice;
use pspot::{split_potcar, CoreRegion};
use types::{c64, PawError};
use vector3::Vector3f64;

use std::rc::Rc;

const POTCAR_SI: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../testdata/POTCAR_Si"));
const POTCAR_GAN: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../testdata/POTCAR_GaN"));

const FFT: [usize; 3] = [24, 24, 24];

fn region(text: &str) -> Rc<CoreRegion> {
    Rc::new(CoreRegion::from_records(&split_potcar(text).unwrap()).unwrap())
}

fn cubic(a: f64) -> Lattice {
    Lattice::new(&[a, 0.0, 0.0], &[0.0, a, 0.0], &[0.0, 0.0, a])
}

fn crystal(a: f64, species: &[&str], frac: &[[f64; 3]]) -> Crystal {
    let pos: Vec<Vector3f64> = frac.iter().map(|p| Vector3f64::from_slice(p)).collect();

    Crystal::from_sites(cubic(a), species, &pos)
}

// two Si sites of a 10 A cubic cell, the second shifted along x by `dx` A
fn si_pair(dx: f64) -> Crystal {
    crystal(10.0, &["Si", "Si"], &[[0.0, 0.0, 0.0], [0.5 + dx / 10.0, 0.5, 0.5]])
}

fn kpts(weights: &[f64]) -> KptsList {
    let k = weights.iter().map(|_| Vector3f64::zeros()).collect();

    KptsList::new(k, weights.to_vec()).unwrap()
}

fn wavecar(nband: usize, nkpt: usize, nspin: usize, occupations: Vec<f64>) -> MockWavecar {
    MockWavecar {
        nband,
        nkpt,
        nspin,
        occupations,
    }
}

fn real(v: &[f64]) -> Vec<c64> {
    v.iter().map(|&x| c64::new(x, 0.0)).collect()
}

// bulk: 4 bands, 2 k-points weighted 1:3, 1 spin, bands 0 and 1 occupied
// defect: 5 bands on the same k-points
fn bulk_and_defect(engine: &Rc<MockEngine>) -> (Wavefunction<MockEngine>, Wavefunction<MockEngine>) {
    engine.add_wavecar(
        "bulk/WAVECAR",
        wavecar(4, 2, 1, vec![1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0]),
    );
    engine.add_wavecar("defect/WAVECAR", wavecar(5, 2, 1, vec![0.0; 10]));

    let si = region(POTCAR_SI);

    let bulk = Wavefunction::new(
        Rc::clone(engine),
        si_pair(0.0),
        Rc::clone(&si),
        "bulk/WAVECAR",
        &kpts(&[1.0, 3.0]),
        FFT,
    )
    .unwrap();

    let defect = Wavefunction::new(
        Rc::clone(engine),
        si_pair(0.03),
        si,
        "defect/WAVECAR",
        &kpts(&[1.0, 3.0]),
        FFT,
    )
    .unwrap();

    (bulk, defect)
}

// site classification

#[test]
fn test_classify_identical_structures() {
    let si = region(POTCAR_SI);
    let s = si_pair(0.0);

    let cat = classify(&s, &s, &si, &si).unwrap();

    assert_eq!(cat.m_r, vec![0, 1]);
    assert_eq!(cat.m_s, vec![0, 1]);
    assert!(cat.n_r.is_empty());
    assert!(cat.n_s.is_empty());
    assert!(cat.n_rs.is_empty());
}

#[test]
fn test_classify_displaced_site_overlaps() {
    let si = region(POTCAR_SI);

    // rmax 1.5 + 1.5 = 3.0 against a 0.03 A separation
    let cat = classify(&si_pair(0.0), &si_pair(0.03), &si, &si).unwrap();

    assert_eq!(cat.m_r, vec![0]);
    assert_eq!(cat.m_s, vec![0]);
    assert_eq!(cat.n_r, vec![1]);
    assert_eq!(cat.n_s, vec![1]);
    assert_eq!(cat.n_rs, vec![(1, 1)]);

    let arrays = cat.to_index_arrays();
    assert_eq!(arrays.n_rs_r, vec![1]);
    assert_eq!(arrays.n_rs_s, vec![1]);
}

#[test]
fn test_classify_within_tolerance_matches() {
    let si = region(POTCAR_SI);

    let cat = classify(&si_pair(0.0), &si_pair(0.015), &si, &si).unwrap();

    assert_eq!(cat.m_r, vec![0, 1]);
    assert!(cat.n_rs.is_empty());
}

#[test]
fn test_classify_distant_pairs_excluded() {
    let si = region(POTCAR_SI);

    let basis = crystal(10.0, &["Si", "Si"], &[[0.0, 0.0, 0.0], [0.3, 0.0, 0.0]]);
    let this = crystal(10.0, &["Si", "Si"], &[[0.5, 0.5, 0.5], [0.32, 0.0, 0.0]]);

    let cat = classify(&basis, &this, &si, &si).unwrap();

    assert!(cat.m_r.is_empty());
    assert_eq!(cat.n_r, vec![0, 1]);
    assert_eq!(cat.n_s, vec![0, 1]);

    // only the 0.2 A pair is closer than 3.0 A
    assert_eq!(cat.n_rs, vec![(1, 1)]);

    let latt = this.get_latt();

    for &(i, j) in cat.n_rs.iter() {
        let d = latt.min_image_distance(
            &basis.get_atom_positions()[i],
            &this.get_atom_positions()[j],
        );
        assert!(d < 3.0);
    }
}

#[test]
fn test_classify_periodic_image() {
    let si = region(POTCAR_SI);

    let basis = crystal(5.0, &["Si"], &[[0.999, 0.0, 0.0]]);
    let this = crystal(5.0, &["Si"], &[[0.001, 0.0, 0.0]]);

    // 0.01 A apart through the cell boundary
    let cat = classify(&basis, &this, &si, &si).unwrap();

    assert_eq!(cat.m_r, vec![0]);
    assert_eq!(cat.m_s, vec![0]);
}

#[test]
fn test_classify_element_must_match() {
    let gan = region(POTCAR_GAN);

    let basis = crystal(6.0, &["Ga"], &[[0.0, 0.0, 0.0]]);
    let this = crystal(6.0, &["N"], &[[0.0, 0.0, 0.0]]);

    let cat = classify(&basis, &this, &gan, &gan).unwrap();

    assert!(cat.m_r.is_empty());
    assert_eq!(cat.n_rs, vec![(0, 0)]);
}

#[test]
fn test_classify_ambiguous_self_site() {
    let si = region(POTCAR_SI);

    let basis = crystal(10.0, &["Si", "Si"], &[[0.0, 0.0, 0.0], [0.001, 0.0, 0.0]]);
    let this = crystal(10.0, &["Si"], &[[0.0005, 0.0, 0.0]]);

    let err = classify(&basis, &this, &si, &si).unwrap_err();

    match err {
        PawError::GeometryAmbiguity {
            self_index,
            basis_indices,
        } => {
            assert_eq!(self_index, 0);
            assert_eq!(basis_indices, vec![0, 1]);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_classify_partitions_every_site() {
    let gan = region(POTCAR_GAN);

    let basis = crystal(
        6.0,
        &["Ga", "Ga", "N", "N"],
        &[[0.0, 0.0, 0.0], [0.5, 0.5, 0.0], [0.25, 0.25, 0.25], [0.75, 0.75, 0.25]],
    );

    // one N removed, one Ga swapped for N, one site added
    let this = crystal(
        6.0,
        &["Ga", "N", "N", "N"],
        &[[0.0, 0.0, 0.0], [0.5, 0.5, 0.0], [0.75, 0.75, 0.25], [0.5, 0.0, 0.5]],
    );

    let cat = classify(&basis, &this, &gan, &gan).unwrap();

    assert_eq!(cat.m_r, vec![0, 3]);
    assert_eq!(cat.m_s, vec![0, 2]);

    let mut r: Vec<usize> = cat.m_r.iter().chain(cat.n_r.iter()).copied().collect();
    let mut s: Vec<usize> = cat.m_s.iter().chain(cat.n_s.iter()).copied().collect();
    r.sort();
    s.sort();

    assert_eq!(r, vec![0, 1, 2, 3]);
    assert_eq!(s, vec![0, 1, 2, 3]);
    assert_eq!(cat.n_r, vec![1, 2]);
    assert_eq!(cat.n_s, vec![1, 3]);
}

#[test]
fn test_classify_missing_element() {
    let si = region(POTCAR_SI);

    let basis = crystal(10.0, &["C"], &[[0.0, 0.0, 0.0]]);
    let this = crystal(10.0, &["Si"], &[[0.5, 0.5, 0.5]]);

    let err = classify(&basis, &this, &si, &si).unwrap_err();
    assert!(matches!(err, PawError::MissingElement(ref e) if e == "C"));
}

// element labels and projector arrays

#[test]
fn test_element_labels_order_and_stability() {
    let gan = region(POTCAR_GAN);
    let si = region(POTCAR_SI);

    let labels = ElementLabels::new(&gan, &si);

    assert_eq!(labels.get_elements(), &["Ga", "N", "Si"]);
    assert_eq!(labels.get_label("Si").unwrap(), 2);
    assert_eq!(labels.get_element(1), "N");
    assert_eq!(labels, ElementLabels::new(&gan, &si));

    let s = crystal(6.0, &["N", "Si", "Ga"], &[[0.0; 3], [0.5; 3], [0.25; 3]]);
    assert_eq!(labels.labels_of(&s).unwrap(), vec![1, 2, 0]);

    assert!(matches!(
        labels.get_label("O").unwrap_err(),
        PawError::MissingElement(_)
    ));
}

#[test]
fn test_element_labels_shared_elements_once() {
    let gan = region(POTCAR_GAN);

    let labels = ElementLabels::new(&gan, &gan);

    assert_eq!(labels.len(), 2);
}

#[test]
fn test_projector_arrays_follow_metadata() {
    let gan = region(POTCAR_GAN);
    let si = region(POTCAR_SI);

    let labels = ElementLabels::new(&gan, &si);
    let arrays = ProjectorArrays::build(&labels, &gan, &si).unwrap();

    assert_eq!(arrays.get_n_elements(), 3);
    assert_eq!(
        arrays.get_metadata(),
        &[0, 5, 7, 10, 1, 4, 6, 8, 2, 3, 6, 8]
    );
    assert_eq!(arrays.get_ls(), &[0, 0, 1, 1, 2, 0, 0, 1, 1, 0, 0, 1]);
    assert_eq!(arrays.get_proj_grids().len(), 7 + 6 + 6);
    assert_eq!(arrays.get_radial_grids().len(), 10 + 8 + 8);
    assert_eq!(arrays.get_projectors().len(), 5 * 7 + 4 * 6 + 3 * 6);
    assert_eq!(arrays.get_ae_waves().len(), 5 * 10 + 4 * 8 + 3 * 8);
    assert_eq!(arrays.get_ps_waves().len(), 5 * 10 + 4 * 8 + 3 * 8);
    assert_eq!(arrays.get_augs().len(), 41 + 9);
    assert_eq!(
        arrays.get_rmax_strs(),
        &["2.30000000000000", "1.50000000000000", "1.90000000000000"]
    );
}

#[test]
fn test_projector_arrays_blocks_follow_elements() {
    let gan = region(POTCAR_GAN);

    let labels = ElementLabels::new(&gan, &gan);
    let arrays = ProjectorArrays::build(&labels, &gan, &gan).unwrap();

    let mut proj_offset = 0;

    for (ielem, quad) in arrays.get_metadata().chunks_exact(4).enumerate() {
        let pp = gan.get_psp(labels.get_element(ielem)).unwrap();

        assert_eq!(quad[1] as usize, pp.get_nproj());
        assert_eq!(quad[2] as usize, pp.get_ndata());
        assert_eq!(quad[3] as usize, pp.get_n_grid());

        // the first real-space projector of each element starts its block
        let ndata = pp.get_ndata();
        assert_eq!(
            &arrays.get_projectors()[proj_offset..proj_offset + ndata],
            pp.get_real_proj(0)
        );

        proj_offset += pp.get_nproj() * ndata;
    }
}

#[test]
fn test_projector_arrays_verify_rejects_mismatch() {
    let si = region(POTCAR_SI);

    let labels = ElementLabels::new(&si, &si);
    let arrays = ProjectorArrays::build(&labels, &si, &si).unwrap();

    let mut ps = arrays.get_ps_waves().to_vec();
    ps.pop();
    let short = arrays.clone().with_ps_waves(ps);
    assert!(matches!(short.verify().unwrap_err(), PawError::Format { .. }));

    let relabeled = arrays.clone().with_label(0, 1);
    assert!(relabeled.verify().is_err());

    assert!(arrays.verify().is_ok());
}

// scoped handles

#[test]
fn test_session_released_once_on_drop() {
    let engine = Rc::new(MockEngine::new());

    {
        let (_bulk, _defect) = bulk_and_defect(&engine);
        assert_eq!(engine.live_sessions(), 2);
    }

    assert_eq!(engine.live_sessions(), 0);

    let released = engine.state.borrow().released_sessions.clone();
    assert_eq!(released.len(), 2);
    assert_ne!(released[0], released[1]);
}

#[test]
fn test_use_after_free_all() {
    let engine = Rc::new(MockEngine::new());
    let (bulk, mut defect) = bulk_and_defect(&engine);

    defect.free_all();
    defect.free_all();

    assert_eq!(engine.state.borrow().released_sessions.len(), 1);

    assert!(matches!(
        defect.get_band_count().unwrap_err(),
        PawError::UseAfterRelease("session")
    ));
    assert!(matches!(
        defect.pseudo_projection(0, &bulk).unwrap_err(),
        PawError::UseAfterRelease(_)
    ));
    assert!(matches!(
        defect.single_band_projection(0, &bulk).unwrap_err(),
        PawError::UseAfterRelease(_)
    ));

    drop(defect);
    assert_eq!(engine.state.borrow().released_sessions.len(), 1);
}

#[test]
fn test_projector_table_released_by_last_holder() {
    let engine = Rc::new(MockEngine::new());
    let (mut bulk, mut defect) = bulk_and_defect(&engine);

    defect.setup_projection(&mut bulk).unwrap();
    assert_eq!(engine.live_tables(), 1);

    defect.free_all();
    assert_eq!(engine.live_tables(), 1);

    drop(bulk);
    assert_eq!(engine.live_tables(), 0);

    let released = engine.state.borrow().released_tables.clone();
    assert_eq!(released.len(), 1);
    assert_eq!(released[0].1, 1);
}

#[test]
fn test_repeated_setup_keeps_one_table() {
    let engine = Rc::new(MockEngine::new());
    let (mut bulk, mut defect) = bulk_and_defect(&engine);

    for _ in 0..3 {
        defect.setup_projection(&mut bulk).unwrap();
    }

    assert_eq!(engine.live_tables(), 1);
    assert_eq!(engine.state.borrow().released_tables.len(), 2);

    let (_, table, _, _, _, _) = engine.state.borrow().setups.last().cloned().unwrap();
    assert!(engine.state.borrow().tables.contains_key(&table));

    assert_eq!(defect.single_band_projection(0, &bulk).unwrap().len(), 8);
}

#[test]
fn test_failed_setup_discards_earlier_state() {
    let engine = Rc::new(MockEngine::new());
    let (mut bulk, mut defect) = bulk_and_defect(&engine);

    defect.setup_projection(&mut bulk).unwrap();
    assert!(defect.is_set_up());

    engine.fail_on("overlap_setup");

    assert!(defect.setup_projection(&mut bulk).is_err());
    assert!(!defect.is_set_up());
    assert!(defect.get_site_categories().is_none());

    let err = defect.single_band_projection(0, &bulk).unwrap_err();
    assert!(matches!(err, PawError::NotSetUp(_)));

    // the first table went with the old state; the basis holds the new one
    assert_eq!(engine.live_tables(), 1);
    assert_eq!(engine.state.borrow().released_tables.len(), 1);

    drop(bulk);
    assert_eq!(engine.live_tables(), 0);
}

#[test]
fn test_unreadable_wavecar() {
    let engine = Rc::new(MockEngine::new());

    let err = Wavefunction::new(
        Rc::clone(&engine),
        si_pair(0.0),
        region(POTCAR_SI),
        "missing/WAVECAR",
        &kpts(&[1.0]),
        FFT,
    )
    .err()
    .unwrap();

    assert!(matches!(err, PawError::Engine(_)));
    assert_eq!(engine.live_sessions(), 0);
}

// orchestration

#[test]
fn test_setup_projection_call_sequence() {
    let engine = Rc::new(MockEngine::new());
    let (mut bulk, mut defect) = bulk_and_defect(&engine);

    defect.setup_projection(&mut bulk).unwrap();

    assert_eq!(
        engine.calls(),
        vec![
            "read_session",
            "read_session",
            "build_projector_table",
            "setup_projections",
            "setup_projections",
            "overlap_setup",
        ]
    );

    let st = engine.state.borrow();

    let bulk_session = 1;
    let defect_session = 2;

    assert_eq!(st.setups.len(), 2);

    let (session, table, n_elements, fft, labels, coords) = &st.setups[0];
    assert_eq!(*session, defect_session);
    assert_eq!(*n_elements, 1);
    assert_eq!(*fft, FFT);
    assert_eq!(labels, &vec![0, 0]);
    assert_eq!(coords.len(), 6);
    assert!((coords[3] - 0.503).abs() < 1e-12);

    let (session, table_basis, _, _, _, coords) = &st.setups[1];
    assert_eq!(*session, bulk_session);
    assert_eq!(table_basis, table);
    assert!((coords[3] - 0.5).abs() < 1e-12);

    let (basis, this, _, sites) = &st.overlaps[0];
    assert_eq!((*basis, *this), (bulk_session, defect_session));
    assert_eq!(sites.n_r, vec![1]);
    assert_eq!(sites.n_s, vec![1]);
    assert_eq!(sites.n_rs_r, vec![1]);
    assert_eq!(sites.n_rs_s, vec![1]);

    drop(st);

    assert!(defect.is_set_up());
    assert_eq!(defect.get_site_categories().unwrap().m_r, vec![0]);
    assert_eq!(defect.get_element_labels().unwrap().get_elements(), &["Si"]);
}

#[test]
fn test_setup_projection_engine_failure() {
    let engine = Rc::new(MockEngine::new());
    let (mut bulk, mut defect) = bulk_and_defect(&engine);

    engine.fail_on("overlap_setup");

    let err = defect.setup_projection(&mut bulk).unwrap_err();

    assert!(matches!(err, PawError::Engine(_)));
    assert!(!defect.is_set_up());

    // both setups ran before the failure and are not rolled back
    assert_eq!(engine.state.borrow().setups.len(), 2);
}

#[test]
fn test_single_band_projection_requires_setup() {
    let engine = Rc::new(MockEngine::new());
    let (mut bulk, mut defect) = bulk_and_defect(&engine);

    let err = defect.single_band_projection(0, &bulk).unwrap_err();
    assert!(matches!(err, PawError::NotSetUp(_)));

    engine.add_wavecar("other/WAVECAR", wavecar(4, 2, 1, vec![0.0; 8]));

    let other = Wavefunction::new(
        Rc::clone(&engine),
        si_pair(0.0),
        region(POTCAR_SI),
        "other/WAVECAR",
        &kpts(&[1.0, 3.0]),
        FFT,
    )
    .unwrap();

    defect.setup_projection(&mut bulk).unwrap();

    let err = defect.single_band_projection(0, &other).unwrap_err();
    assert!(matches!(err, PawError::NotSetUp(_)));
}

#[test]
fn test_single_band_projection_sums_terms() {
    let engine = Rc::new(MockEngine::new());
    let (mut bulk, mut defect) = bulk_and_defect(&engine);

    defect.setup_projection(&mut bulk).unwrap();

    let mut pseudo = vec![c64::new(0.0, 0.0); 8];
    pseudo[0] = c64::new(1.0, 2.0);
    let mut comp = vec![c64::new(0.0, 0.0); 8];
    comp[0] = c64::new(0.5, -1.0);
    comp[7] = c64::new(0.0, 0.25);

    engine.set_pseudo("defect/WAVECAR", 3, pseudo);
    engine.set_compensation("defect/WAVECAR", 3, comp);

    let res = defect.single_band_projection(3, &bulk).unwrap();

    assert_eq!(res.len(), 8);
    assert_eq!(res[0], c64::new(1.5, 1.0));
    assert_eq!(res[7], c64::new(0.0, 0.25));

    let st = engine.state.borrow();
    assert_eq!(st.compensation_requests, vec![(3, 1, FFT)]);
}

#[test]
fn test_single_band_projection_length_for_every_band() {
    let engine = Rc::new(MockEngine::new());
    let (mut bulk, mut defect) = bulk_and_defect(&engine);

    defect.setup_projection(&mut bulk).unwrap();

    let nstates = bulk.get_state_count().unwrap();

    for band in 0..defect.get_band_count().unwrap() {
        assert_eq!(defect.single_band_projection(band, &bulk).unwrap().len(), nstates);
    }

    assert!(defect.single_band_projection(5, &bulk).is_err());
}

#[test]
fn test_engine_result_of_wrong_length() {
    let engine = Rc::new(MockEngine::new());
    let (bulk, defect) = bulk_and_defect(&engine);

    engine.set_pseudo("defect/WAVECAR", 0, real(&[1.0, 0.0]));

    let err = defect.pseudo_projection(0, &bulk).unwrap_err();
    assert!(matches!(err, PawError::Engine(_)));
}

// band analysis

#[test]
fn test_proportion_conduction_pseudo_sums_to_one() {
    let engine = Rc::new(MockEngine::new());
    let (bulk, defect) = bulk_and_defect(&engine);

    engine.set_pseudo(
        "defect/WAVECAR",
        1,
        real(&[0.3, 0.1, 0.7, 0.2, 0.4, 0.9, 0.05, 0.6]),
    );

    let (v, c) = defect.proportion_conduction(1, &bulk, true).unwrap();

    assert!((v + c - 1.0).abs() < 1e-12);
    assert!(v > 0.0 && c > 0.0);
}

#[test]
fn test_proportion_conduction_weights() {
    let engine = Rc::new(MockEngine::new());
    let (mut bulk, mut defect) = bulk_and_defect(&engine);

    defect.setup_projection(&mut bulk).unwrap();

    // states ordered band, k-point; k weights 0.25 and 0.75
    engine.set_pseudo(
        "defect/WAVECAR",
        2,
        real(&[1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0]),
    );
    engine.set_compensation(
        "defect/WAVECAR",
        2,
        real(&[0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0]),
    );

    let (v, c) = defect.proportion_conduction(2, &bulk, false).unwrap();

    assert!((v - 1.0).abs() < 1e-12);
    assert!((c - (0.25 + 4.0 * 0.75)).abs() < 1e-12);

    let (v, c) = defect.proportion_conduction(2, &bulk, true).unwrap();

    assert!((v - 0.5).abs() < 1e-12);
    assert!((c - 0.5).abs() < 1e-12);
}

#[test]
fn test_proportion_conduction_divides_by_spin() {
    let engine = Rc::new(MockEngine::new());

    // 2 bands, 1 k-point, 2 spins; band 0 occupied in both channels
    engine.add_wavecar("bulk/WAVECAR", wavecar(2, 1, 2, vec![1.0, 1.0, 0.0, 0.0]));
    engine.add_wavecar("defect/WAVECAR", wavecar(2, 1, 2, vec![0.0; 4]));

    let si = region(POTCAR_SI);

    let mut bulk = Wavefunction::new(
        Rc::clone(&engine),
        si_pair(0.0),
        Rc::clone(&si),
        "bulk/WAVECAR",
        &kpts(&[1.0]),
        FFT,
    )
    .unwrap();

    let mut defect = Wavefunction::new(
        Rc::clone(&engine),
        si_pair(0.0),
        si,
        "defect/WAVECAR",
        &kpts(&[1.0]),
        FFT,
    )
    .unwrap();

    defect.setup_projection(&mut bulk).unwrap();

    engine.set_pseudo("defect/WAVECAR", 0, real(&[1.0, 1.0, 1.0, 0.0]));

    let (v, c) = defect.proportion_conduction(0, &bulk, false).unwrap();

    assert!((v - 1.0).abs() < 1e-12);
    assert!((c - 0.5).abs() < 1e-12);
}

#[test]
fn test_proportion_conduction_zero_overlap() {
    let engine = Rc::new(MockEngine::new());
    let (bulk, defect) = bulk_and_defect(&engine);

    assert_eq!(defect.proportion_conduction(4, &bulk, true).unwrap(), (0.0, 0.0));
}

#[test]
fn test_defect_band_analysis_selects_neighbours() {
    let engine = Rc::new(MockEngine::new());
    let (mut bulk, mut defect) = bulk_and_defect(&engine);

    defect.setup_projection(&mut bulk).unwrap();

    let valence_only = real(&[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);

    for band in [0, 1, 3, 4] {
        engine.set_pseudo("defect/WAVECAR", band, valence_only.clone());
    }

    // pseudo estimate 0.5 / 0.5
    engine.set_pseudo(
        "defect/WAVECAR",
        2,
        real(&[1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0]),
    );

    let results = defect
        .defect_band_analysis(&bulk, dwconsts::DEFECT_BAND_BOUND)
        .unwrap();

    assert_eq!(results.keys().copied().collect::<Vec<usize>>(), vec![1, 2, 3]);

    let (v, c) = results[&1];
    assert!((v - 0.25).abs() < 1e-12);
    assert_eq!(c, 0.0);

    let (v, c) = results[&2];
    assert!((v - 1.0).abs() < 1e-12);
    assert!((c - 1.0).abs() < 1e-12);

    // full evaluation only for the selected bands
    let st = engine.state.borrow();
    let bands: Vec<usize> = st.compensation_requests.iter().map(|r| r.0).collect();
    assert_eq!(bands, vec![1, 2, 3]);
}

#[test]
fn test_defect_band_analysis_clamps_at_edges() {
    let engine = Rc::new(MockEngine::new());
    let (mut bulk, mut defect) = bulk_and_defect(&engine);

    defect.setup_projection(&mut bulk).unwrap();

    let mixed = real(&[1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0]);

    engine.set_pseudo("defect/WAVECAR", 0, mixed.clone());
    engine.set_pseudo("defect/WAVECAR", 4, mixed);

    let results = defect.defect_band_analysis(&bulk, 0.05).unwrap();

    assert_eq!(results.keys().copied().collect::<Vec<usize>>(), vec![0, 1, 3, 4]);
}

#[test]
fn test_defect_band_analysis_nothing_selected() {
    let engine = Rc::new(MockEngine::new());
    let (bulk, defect) = bulk_and_defect(&engine);

    // no setup needed when no band is selected
    let results = defect.defect_band_analysis(&bulk, 0.05).unwrap();

    assert!(results.is_empty());
}
