// the projection library lays out projector grids with this rounded factor;
// changing it shifts every projector sample
pub const PROJ_GRID_BOHR_PER_ANG: f64 = 1.88973;

// site classification

pub const SITE_MATCH_TOLERANCE: f64 = 0.02; // A

// band analysis

pub const OCC_VALENCE_THRESHOLD: f64 = 0.5;
pub const DEFECT_BAND_BOUND: f64 = 0.05;

// potential datasets

pub const POTCAR_DATASET_END: &str = "End of Dataset";
