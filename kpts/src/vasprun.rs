use log::debug;
use types::{PawError, Result};
use vector3::*;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use xml::reader::{EventReader, XmlEvent};

use crate::{normalize_weights, KPTS};

enum Block {
    KPOINTLIST,
    WEIGHTS,
    NULL,
}

// k-points and weights from the <kpoints> block of vasprun.xml:
//
// <kpoints>
//  <varray name="kpointlist" > <v> 0.0 0.0 0.0 </v> ... </varray>
//  <varray name="weights" > <v> 0.125 </v> ... </varray>
// </kpoints>
//
// reading stops at </kpoints>, the rest of the file is never parsed
pub struct KptsVasprun {
    k_frac: Vec<Vector3f64>,
    k_weight: Vec<f64>,
}

impl KptsVasprun {
    pub fn new<P: AsRef<Path>>(kfile: P) -> Result<KptsVasprun> {
        let path = kfile.as_ref();

        let file = File::open(path).map_err(|e| PawError::io(path, e))?;

        KptsVasprun::parse(BufReader::new(file))
    }

    pub fn parse<R: Read>(reader: R) -> Result<KptsVasprun> {
        let mut parser = EventReader::new(reader);

        let mut in_kpoints = false;
        let mut in_v = false;
        let mut block = Block::NULL;

        let mut k_frac = Vec::new();
        let mut k_weight = Vec::new();

        loop {
            match parser.next() {
                Ok(XmlEvent::StartElement {
                    name, attributes, ..
                }) => match name.local_name.as_str() {
                    "kpoints" => in_kpoints = true,

                    "varray" if in_kpoints => {
                        let varray_name = attributes
                            .iter()
                            .find(|attr| attr.name.local_name == "name")
                            .map(|attr| attr.value.trim().to_string())
                            .unwrap_or_default();

                        block = match varray_name.as_str() {
                            "kpointlist" => Block::KPOINTLIST,
                            "weights" => Block::WEIGHTS,
                            _ => Block::NULL,
                        };
                    }

                    "v" => in_v = true,

                    _ => {}
                },

                Ok(XmlEvent::Characters(s)) if in_kpoints && in_v => {
                    let v = parse_numbers(&s)?;

                    match block {
                        Block::KPOINTLIST => {
                            if v.len() != 3 {
                                return Err(PawError::format(
                                    "vasprun.xml",
                                    format!("k-point entry '{}' needs 3 values", s.trim()),
                                ));
                            }

                            k_frac.push(Vector3f64::new(v[0], v[1], v[2]));
                        }

                        Block::WEIGHTS => {
                            if v.len() != 1 {
                                return Err(PawError::format(
                                    "vasprun.xml",
                                    format!("weight entry '{}' needs 1 value", s.trim()),
                                ));
                            }

                            k_weight.push(v[0]);
                        }

                        Block::NULL => {}
                    }
                }

                Ok(XmlEvent::EndElement { name }) => match name.local_name.as_str() {
                    "kpoints" => break,
                    "varray" => block = Block::NULL,
                    "v" => in_v = false,
                    _ => {}
                },

                Ok(XmlEvent::EndDocument) => break,

                Ok(_) => {}

                Err(e) => {
                    return Err(PawError::format("vasprun.xml", e.to_string()));
                }
            }
        }

        if k_frac.is_empty() || k_frac.len() != k_weight.len() {
            return Err(PawError::format(
                "vasprun.xml",
                format!(
                    "found {} k-points and {} weights",
                    k_frac.len(),
                    k_weight.len()
                ),
            ));
        }

        debug!("vasprun.xml: {} k-points", k_frac.len());

        let k_weight = normalize_weights(k_weight)?;

        Ok(KptsVasprun { k_frac, k_weight })
    }
}

impl KPTS for KptsVasprun {
    fn get_k_frac(&self, k_index: usize) -> Vector3f64 {
        self.k_frac[k_index]
    }

    fn get_k_weight(&self, k_index: usize) -> f64 {
        self.k_weight[k_index]
    }

    fn get_n_kpts(&self) -> usize {
        self.k_frac.len()
    }
}

fn parse_numbers(s: &str) -> Result<Vec<f64>> {
    s.split_whitespace()
        .map(|t| {
            t.parse::<f64>()
                .map_err(|_| PawError::format("vasprun.xml", format!("bad number '{}'", t)))
        })
        .collect()
}
