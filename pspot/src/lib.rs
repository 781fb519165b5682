use atompsp::Pseudopotential;
use dwconsts::*;
use log::{debug, info};
use regex::Regex;
use types::{PawError, Result};

use std::{collections::HashMap, fs, path::Path};

/// Raw dataset of one element as found in a POTCAR.
#[derive(Debug, Clone, PartialEq)]
pub struct PotentialRecord {
    pub element: String,

    // dataset text, "End of Dataset" trailer removed
    pub payload: String,

    pub rmax: f64,
}

impl PotentialRecord {
    /// Read the element symbol from TITEL and the radius from RMAX.
    pub fn from_dataset(payload: &str) -> Result<PotentialRecord> {
        let titel = Regex::new(r"TITEL\s*=\s*\S+\s+(\S+)")
            .map_err(|e| PawError::format("TITEL", e.to_string()))?;
        let rmax = Regex::new(r"RMAX\s*=\s*([-+0-9.EeDd]+)")
            .map_err(|e| PawError::format("RMAX", e.to_string()))?;

        // Si_sv, Ga_d, ... -> Si, Ga
        let element = titel
            .captures(payload)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().split('_').next())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PawError::format("TITEL", "no element symbol in dataset header"))?
            .to_string();

        let rmax_token = rmax
            .captures(payload)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| PawError::format("RMAX", format!("no RMAX for element '{}'", element)))?;

        let rmax = rmax_token.parse::<f64>().map_err(|_| {
            PawError::format("RMAX", format!("token '{}' is not a number", rmax_token))
        })?;

        Ok(PotentialRecord {
            element,
            payload: payload.to_string(),
            rmax,
        })
    }
}

/// Split a (possibly multi-element) POTCAR into per-element records.
pub fn split_potcar(text: &str) -> Result<Vec<PotentialRecord>> {
    let records = text
        .split(POTCAR_DATASET_END)
        .filter(|chunk| !chunk.trim().is_empty())
        .map(PotentialRecord::from_dataset)
        .collect::<Result<Vec<PotentialRecord>>>()?;

    if records.is_empty() {
        return Err(PawError::format("POTCAR", "no datasets found"));
    }

    Ok(records)
}

pub fn read_potcar<P: AsRef<Path>>(path: P) -> Result<Vec<PotentialRecord>> {
    let path = path.as_ref();

    let text = fs::read_to_string(path).map_err(|e| PawError::io(path, e))?;

    split_potcar(&text)
}

/// Element symbol -> parsed dataset, in insertion order.
///
/// Built once and then only read; wavefunctions share it through `Rc`.
#[derive(Debug, Default)]
pub struct CoreRegion {
    species: Vec<String>,
    pots: HashMap<String, Pseudopotential>,
    sources: HashMap<String, PotentialRecord>,
}

impl CoreRegion {
    pub fn from_records(records: &[PotentialRecord]) -> Result<CoreRegion> {
        let mut region = CoreRegion::default();

        for record in records.iter() {
            if let Some(seen) = region.sources.get(&record.element) {
                if seen.payload == record.payload && seen.rmax == record.rmax {
                    debug!("skip repeated dataset of element '{}'", record.element);
                    continue;
                }

                return Err(PawError::DuplicateElement(record.element.clone()));
            }

            let pp = Pseudopotential::parse(&record.payload, record.rmax)?;

            region.species.push(record.element.clone());
            region.pots.insert(record.element.clone(), pp);
            region.sources.insert(record.element.clone(), record.clone());
        }

        Ok(region)
    }

    pub fn from_potcar_file<P: AsRef<Path>>(path: P) -> Result<CoreRegion> {
        let records = read_potcar(path)?;

        CoreRegion::from_records(&records)
    }

    pub fn get_psp(&self, element: &str) -> Result<&Pseudopotential> {
        self.pots
            .get(element)
            .ok_or_else(|| PawError::MissingElement(element.to_string()))
    }

    pub fn get_rmax(&self, element: &str) -> Result<f64> {
        Ok(self.get_psp(element)?.get_rmax())
    }

    pub fn contains(&self, element: &str) -> bool {
        self.pots.contains_key(element)
    }

    pub fn get_species(&self) -> &[String] {
        &self.species
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn display(&self) {
        info!("   {:-^88}", " PAW datasets ");
        info!("{:12} {:^8} {:^10} {:^10} {:^10}", "", "element", "rmax", "nproj", "ngrid");

        for sp in self.species.iter() {
            if let Some(pp) = self.pots.get(sp) {
                info!(
                    "{:12} {:^8} {:^10.3} {:^10} {:^10}",
                    "",
                    sp,
                    pp.get_rmax(),
                    pp.get_nproj(),
                    pp.get_n_grid()
                );
            }
        }
    }
}
