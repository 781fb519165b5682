use itertools::Itertools;
use lattice::Lattice;
use log::info;
use types::{PawError, Result};
use vector3::*;

use std::fs;
use std::path::Path;

// Crystal structure container.
//
// Coordinates:
// - lattice vectors stored in Angstrom, as read from POSCAR/CONTCAR
// - atomic positions stored in fractional coordinates
// - sites keep file order; that order is the site index everywhere else
#[derive(Debug, Default, Clone)]
pub struct Crystal {
    comment: String,
    latt: Lattice,
    atom_positions: Vec<Vector3f64>,
    atom_species: Vec<String>,
}

impl Crystal {
    pub fn new() -> Crystal {
        Crystal::default()
    }

    pub fn from_sites(latt: Lattice, species: &[&str], positions: &[Vector3f64]) -> Crystal {
        Crystal {
            comment: String::new(),
            latt,
            atom_positions: positions.to_vec(),
            atom_species: species.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn get_latt(&self) -> &Lattice {
        &self.latt
    }

    pub fn get_comment(&self) -> &str {
        &self.comment
    }

    pub fn get_n_atoms(&self) -> usize {
        self.atom_positions.len()
    }

    pub fn get_atom_positions(&self) -> &[Vector3f64] {
        &self.atom_positions
    }

    pub fn get_atom_species(&self) -> &[String] {
        &self.atom_species
    }

    pub fn get_unique_species(&self) -> Vec<String> {
        // Preserve first-occurrence order while removing duplicates.
        self.atom_species.iter().unique().cloned().collect()
    }

    /// x0 y0 z0 x1 y1 z1 ... in site order
    pub fn get_frac_coords_flat(&self) -> Vec<f64> {
        vector3::flatten(&self.atom_positions)
    }

    pub fn read_file<P: AsRef<Path>>(&mut self, inpfile: P) -> Result<()> {
        let path = inpfile.as_ref();

        let text = fs::read_to_string(path).map_err(|e| PawError::io(path, e))?;

        self.parse_poscar(&text)
    }

    // VASP 5 POSCAR / CONTCAR:
    // line 1: comment
    // line 2: universal scale (negative means target cell volume)
    // line 3-5: lattice vectors (A)
    // line 6: species symbols
    // line 7: counts per species
    // optional "Selective dynamics"
    // "Direct" or "Cartesian", then one line per site
    pub fn parse_poscar(&mut self, text: &str) -> Result<()> {
        let mut lines = text.lines();

        let mut next_line = |what: &str| {
            lines
                .next()
                .ok_or_else(|| PawError::format("POSCAR", format!("missing {} line", what)))
        };

        self.comment = next_line("comment")?.trim().to_string();

        let scale: f64 = parse_field(next_line("scale")?.split_whitespace().next(), "scale")?;

        let mut vecs = [[0.0; 3]; 3];

        for (i, v) in vecs.iter_mut().enumerate() {
            let line = next_line("lattice vector")?;
            let s: Vec<&str> = line.split_whitespace().collect();

            for j in 0..3 {
                v[j] = parse_field(s.get(j).copied(), &format!("lattice vector {}", i + 1))?;
            }
        }

        let mut latt = Lattice::new(&vecs[0], &vecs[1], &vecs[2]);

        let factor = if scale < 0.0 {
            (scale.abs() / latt.volume()).cbrt()
        } else {
            scale
        };

        latt.scaled_by(factor);

        let species_line = next_line("species")?;
        let symbols: Vec<String> = species_line
            .split_whitespace()
            .map(|s| strip_symbol_suffix(s).to_string())
            .collect();

        if symbols.is_empty() || symbols[0].parse::<f64>().is_ok() {
            return Err(PawError::format(
                "POSCAR",
                "species line is required (VASP 5 format)",
            ));
        }

        let counts: Vec<usize> = next_line("counts")?
            .split_whitespace()
            .map(|s| parse_field(Some(s), "species counts"))
            .collect::<Result<Vec<usize>>>()?;

        if counts.len() != symbols.len() {
            return Err(PawError::format(
                "POSCAR",
                format!(
                    "{} species but {} counts",
                    symbols.len(),
                    counts.len()
                ),
            ));
        }

        let mut mode = next_line("coordinate mode")?.trim().to_string();

        if mode.to_lowercase().starts_with('s') {
            mode = next_line("coordinate mode")?.trim().to_string();
        }

        let cartesian = match mode.chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('c') | Some('k') => true,
            Some('d') => false,
            _ => {
                return Err(PawError::format(
                    "POSCAR",
                    format!("unknown coordinate mode '{}'", mode),
                ))
            }
        };

        let mut atom_species = Vec::new();
        let mut atom_positions = Vec::new();

        for (sp, &n) in symbols.iter().zip(counts.iter()) {
            for _ in 0..n {
                let line = next_line("site")?;
                let s: Vec<&str> = line.split_whitespace().collect();

                let mut pos = [0.0; 3];

                for j in 0..3 {
                    pos[j] = parse_field(s.get(j).copied(), "site coordinates")?;
                }

                let pos_f = if cartesian {
                    let pos_c = [pos[0] * factor, pos[1] * factor, pos[2] * factor];
                    let mut pos_f = [0.0; 3];

                    latt.cart_to_frac(&pos_c, &mut pos_f);

                    pos_f
                } else {
                    pos
                };

                atom_species.push(sp.clone());
                atom_positions.push(Vector3f64::from_slice(&pos_f));
            }
        }

        self.latt = latt;
        self.atom_species = atom_species;
        self.atom_positions = atom_positions;

        Ok(())
    }

    pub fn display(&self) {
        info!("   {:-^88}", " crystal structure ");

        let vec_a = self.latt.get_vector_a();
        let vec_b = self.latt.get_vector_b();
        let vec_c = self.latt.get_vector_c();

        info!("   a = {:20.12}  {:20.12}  {:20.12}", vec_a.x, vec_a.y, vec_a.z);
        info!("   b = {:20.12}  {:20.12}  {:20.12}", vec_b.x, vec_b.y, vec_b.z);
        info!("   c = {:20.12}  {:20.12}  {:20.12}", vec_c.x, vec_c.y, vec_c.z);

        info!("   natoms = {}", self.get_n_atoms());
        info!("   species = {}", self.get_unique_species().join(" "));

        for (i, atom) in self.atom_positions.iter().enumerate() {
            info!(
                "   {:<3} {:>4} : {:16.12}  {:16.12}  {:16.12}",
                i + 1,
                self.atom_species[i],
                atom.x,
                atom.y,
                atom.z
            );
        }
    }
}

// "Si_sv" or "Si/7a3b..." -> "Si"
fn strip_symbol_suffix(s: &str) -> &str {
    s.split(|c| c == '_' || c == '/').next().unwrap_or(s)
}

fn parse_field<T: std::str::FromStr>(token: Option<&str>, what: &str) -> Result<T> {
    let token = token.ok_or_else(|| PawError::format("POSCAR", format!("missing {}", what)))?;

    token
        .parse::<T>()
        .map_err(|_| PawError::format("POSCAR", format!("bad {} '{}'", what, token)))
}
