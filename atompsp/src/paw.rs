use crate::{make_nums, MarkerCursor, Pseudopotential};

use dwconsts::*;
use log::debug;
use types::{PawError, Result};

// Section markers of a PAW dataset, in file order. The spellings (including
// "sperical" and "uccopancies") are what VASP writes.
const PAW_RADIAL_SETS: &str = "PAW radial sets";
const STEP: &str = "STEP   =";
const LOCAL_PART: &str = "local part";
const GRADIENT_CORRECTIONS: &str = "gradient corrections used for XC";
const CORE_DENSITY_PARTIAL: &str = "core charge-density (partial)";
const ATOMIC_DENSITY: &str = "atomic pseudo charge-density";
const NON_LOCAL_PART: &str = "Non local Part";
const RECIPROCAL_PART: &str = "Reciprocal Space Part";
const REAL_PART: &str = "Real Space Part";

const AUGMENTATION: &str = "augmentation charges (non sperical)";
const OCCUPANCIES: &str = "uccopancies in atom";
const GRID: &str = "grid";
const AE_POTENTIAL: &str = "aepotential";
const CORE_DENSITY: &str = "core charge-density";
const KINETIC: &str = "kinetic energy-density";
const PS_POTENTIAL: &str = "pspotential";
const CORE_DENSITY_PSEUDIZED: &str = "core charge-density (pseudized)";
const PS_WAVE: &str = "pseudo wavefunction";
const AE_WAVE: &str = "ae wavefunction";

impl Pseudopotential {
    /// Parse one PAW dataset.
    ///
    /// `payload` is the dataset text with the "End of Dataset" trailer
    /// removed; `rmax` is the dataset's RMAX header value.
    pub fn parse(payload: &str, rmax: f64) -> Result<Pseudopotential> {
        let mut top = MarkerCursor::new(payload);

        let nonradial = top.take_until(PAW_RADIAL_SETS)?;
        let radial = top.take_rest();

        let mut pp = Pseudopotential {
            rmax,
            ..Default::default()
        };

        pp.parse_nonradial(nonradial)?;
        pp.parse_radial(radial)?;

        pp.proj_grid = projector_grid(rmax, pp.ndata);

        pp.verify()?;

        debug!(
            "PAW dataset: rmax = {}, ndata = {}, {} radial points, l = {:?}",
            pp.rmax,
            pp.ndata,
            pp.grid.len(),
            pp.ls
        );

        Ok(pp)
    }

    fn parse_nonradial(&mut self, text: &str) -> Result<()> {
        let mut cur = MarkerCursor::new(text);

        // header ends with "NDATA  =  n"

        let settings = cur.take_until(STEP)?;

        self.ndata = settings
            .split_whitespace()
            .last()
            .and_then(|t| t.parse::<usize>().ok())
            .ok_or_else(|| PawError::format("NDATA", "cannot read projector grid size"))?;

        // STEP pair and the control values, closed by "END of PSCTR-controll parameters"

        let step_block = cur.take_until(LOCAL_PART)?;
        let step_block = step_block.split("END").next().unwrap_or("");
        let step = make_nums(step_block, STEP)?;

        if step.len() < 2 {
            return Err(PawError::format(STEP, "expected two STEP values"));
        }

        self.step = (step[0], step[1]);

        let local = make_nums(cur.take_until(GRADIENT_CORRECTIONS)?, LOCAL_PART)?;

        let (first, rest) = local
            .split_first()
            .ok_or_else(|| PawError::format(LOCAL_PART, "no local potential values"))?;

        self.local_channel = *first;
        self.local_part = rest.to_vec();

        let gradxc = cur.take_until(CORE_DENSITY_PARTIAL)?.trim();

        self.gradxc = gradxc.parse::<i32>().map_err(|_| {
            PawError::format(
                GRADIENT_CORRECTIONS,
                format!("token '{}' is not an integer", gradxc),
            )
        })?;

        self.core_density = make_nums(cur.take_until(ATOMIC_DENSITY)?, CORE_DENSITY_PARTIAL)?;

        // the atomic density block is closed by one extra scalar

        let mut atomic = make_nums(cur.take_until(NON_LOCAL_PART)?, ATOMIC_DENSITY)?;

        self.atomic_density_tail = atomic
            .pop()
            .ok_or_else(|| PawError::format(ATOMIC_DENSITY, "no atomic density values"))?;
        self.atomic_density = atomic;

        loop {
            let channel = cur.take_until_or_rest(NON_LOCAL_PART);

            self.parse_channel(channel)?;

            if cur.is_exhausted() {
                break;
            }
        }

        Ok(())
    }

    // l, projector count and max radius, the non-local strengths, then one
    // reciprocal/real projector pair per projector
    fn parse_channel(&mut self, text: &str) -> Result<()> {
        let mut cur = MarkerCursor::new(text);

        let header = cur.take_until(RECIPROCAL_PART)?;
        let tokens: Vec<&str> = header.split_whitespace().collect();

        if tokens.len() < 3 {
            return Err(PawError::format(
                NON_LOCAL_PART,
                "header needs l, projector count and max radius",
            ));
        }

        let l = tokens[0].parse::<usize>().map_err(|_| {
            PawError::format(NON_LOCAL_PART, format!("bad angular momentum '{}'", tokens[0]))
        })?;

        let nproj = tokens[1].parse::<usize>().map_err(|_| {
            PawError::format(NON_LOCAL_PART, format!("bad projector count '{}'", tokens[1]))
        })?;

        if tokens[2].parse::<f64>().is_err() {
            return Err(PawError::format(
                NON_LOCAL_PART,
                format!("bad max radius '{}'", tokens[2]),
            ));
        }

        let strengths = make_nums(&tokens[3..].join(" "), NON_LOCAL_PART)?;

        let mut npairs = 0;

        loop {
            let recip = make_nums(cur.take_until(REAL_PART)?, RECIPROCAL_PART)?;
            let real = make_nums(cur.take_until_or_rest(RECIPROCAL_PART), REAL_PART)?;

            self.ls.push(l);
            self.recip_projs.push(recip);
            self.real_projs.push(real);

            npairs += 1;

            if cur.is_exhausted() {
                break;
            }
        }

        if npairs != nproj {
            return Err(PawError::format(
                NON_LOCAL_PART,
                format!(
                    "channel l = {} declares {} projectors but holds {}",
                    l, nproj, npairs
                ),
            ));
        }

        self.rmax_strs.push(tokens[2].to_string());
        self.nonlocal_strengths.push(strengths);

        Ok(())
    }

    fn parse_radial(&mut self, text: &str) -> Result<()> {
        let mut cur = MarkerCursor::new(text);

        cur.take_until(AUGMENTATION)?;

        self.augs = make_nums(cur.take_until(OCCUPANCIES)?, AUGMENTATION)?;
        self.occupancies = make_nums(cur.take_until(GRID)?, OCCUPANCIES)?;
        self.grid = make_nums(cur.take_until(AE_POTENTIAL)?, GRID)?;
        self.ae_potential = make_nums(cur.take_until(CORE_DENSITY)?, AE_POTENTIAL)?;
        self.ae_core_charge = make_nums(cur.take_until(KINETIC)?, CORE_DENSITY)?;
        self.kinetic = make_nums(cur.take_until(PS_POTENTIAL)?, KINETIC)?;
        self.ps_potential = make_nums(cur.take_until(CORE_DENSITY_PSEUDIZED)?, PS_POTENTIAL)?;
        self.ps_core_charge = make_nums(cur.take_until(PS_WAVE)?, CORE_DENSITY_PSEUDIZED)?;

        loop {
            let ps = make_nums(cur.take_until(AE_WAVE)?, PS_WAVE)?;
            let ae = make_nums(cur.take_until_or_rest(PS_WAVE), AE_WAVE)?;

            self.ps_waves.push(ps);
            self.ae_waves.push(ae);

            if cur.is_exhausted() {
                break;
            }
        }

        Ok(())
    }

    fn verify(&self) -> Result<()> {
        let nproj = self.ls.len();

        if self.ps_waves.len() != nproj || self.ae_waves.len() != nproj {
            return Err(PawError::format(
                PS_WAVE,
                format!(
                    "{} projectors but {} pseudo and {} all-electron waves",
                    nproj,
                    self.ps_waves.len(),
                    self.ae_waves.len()
                ),
            ));
        }

        if self.ndata == 0 {
            return Err(PawError::format("NDATA", "projector grid is empty"));
        }

        for (iproj, real) in self.real_projs.iter().enumerate() {
            if real.len() != self.ndata {
                return Err(PawError::format(
                    REAL_PART,
                    format!(
                        "projector {} has {} points, expected NDATA = {}",
                        iproj,
                        real.len(),
                        self.ndata
                    ),
                ));
            }
        }

        let ngrid = self.grid.len();

        if ngrid == 0 {
            return Err(PawError::format(GRID, "radial grid is empty"));
        }

        let radial: [(&str, &[f64]); 5] = [
            (AE_POTENTIAL, &self.ae_potential),
            (CORE_DENSITY, &self.ae_core_charge),
            (KINETIC, &self.kinetic),
            (PS_POTENTIAL, &self.ps_potential),
            (CORE_DENSITY_PSEUDIZED, &self.ps_core_charge),
        ];

        let waves = self
            .ps_waves
            .iter()
            .map(|w| (PS_WAVE, w.as_slice()))
            .chain(self.ae_waves.iter().map(|w| (AE_WAVE, w.as_slice())));

        for (section, v) in radial.iter().copied().chain(waves) {
            if v.len() != ngrid {
                return Err(PawError::format(
                    section,
                    format!("{} values on a radial grid of {}", v.len(), ngrid),
                ));
            }
        }

        Ok(())
    }
}

/// `ndata` points from 0 up to (excluding) rmax converted to the projection
/// library's length unit.
pub(crate) fn projector_grid(rmax: f64, ndata: usize) -> Vec<f64> {
    if ndata == 0 {
        return Vec::new();
    }

    let dr = rmax / PROJ_GRID_BOHR_PER_ANG / ndata as f64;

    (0..ndata).map(|i| i as f64 * dr).collect()
}
