use dwconsts::*;
use log::info;
use types::{PawError, Result};

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    str::FromStr,
};

#[derive(Debug, Default)]
pub struct Control {
    verbosity: String,

    task: String, // defect_band_analysis, proportion_conduction, single_band_projection

    bulk_dir: String,
    defect_dir: String,

    structure_file: String,
    potcar_file: String,
    wavecar_file: String,

    kpts_scheme: String, // vasprun, ibzkpt
    kpts_file: String,

    share_potcar: bool, // defect reuses the bulk datasets

    fft_grid: [usize; 3],

    bound: f64,
    band: usize,
    pseudo: bool,
}

const TASKS: [&str; 3] = [
    "defect_band_analysis",
    "proportion_conduction",
    "single_band_projection",
];

const KPTS_SCHEMES: [&str; 2] = ["vasprun", "ibzkpt"];

impl Control {
    pub fn new() -> Control {
        let mut control = Control::default();
        control.set_defaults();
        control
    }

    pub fn get_verbosity(&self) -> &str {
        &self.verbosity
    }

    pub fn get_task(&self) -> &str {
        &self.task
    }

    pub fn get_bulk_dir(&self) -> &str {
        &self.bulk_dir
    }

    pub fn get_defect_dir(&self) -> &str {
        &self.defect_dir
    }

    pub fn get_structure_file(&self) -> &str {
        &self.structure_file
    }

    pub fn get_potcar_file(&self) -> &str {
        &self.potcar_file
    }

    pub fn get_wavecar_file(&self) -> &str {
        &self.wavecar_file
    }

    pub fn get_kpts_scheme(&self) -> &str {
        &self.kpts_scheme
    }

    pub fn get_kpts_file(&self) -> &str {
        &self.kpts_file
    }

    pub fn get_share_potcar(&self) -> bool {
        self.share_potcar
    }

    pub fn get_fft_grid(&self) -> [usize; 3] {
        self.fft_grid
    }

    pub fn get_bound(&self) -> f64 {
        self.bound
    }

    pub fn get_band(&self) -> usize {
        self.band
    }

    pub fn is_pseudo(&self) -> bool {
        self.pseudo
    }

    /// `file` inside the bulk calculation directory.
    pub fn bulk_path(&self, file: &str) -> PathBuf {
        Path::new(&self.bulk_dir).join(file)
    }

    /// `file` inside the defect calculation directory.
    pub fn defect_path(&self, file: &str) -> PathBuf {
        Path::new(&self.defect_dir).join(file)
    }

    fn set_defaults(&mut self) {
        self.verbosity = "info".to_string();

        self.task = "defect_band_analysis".to_string();

        self.bulk_dir = "bulk".to_string();
        self.defect_dir = "defect".to_string();

        self.structure_file = "CONTCAR".to_string();
        self.potcar_file = "POTCAR".to_string();
        self.wavecar_file = "WAVECAR".to_string();

        self.kpts_scheme = "vasprun".to_string();
        self.kpts_file = "vasprun.xml".to_string();

        self.share_potcar = true;

        self.fft_grid = [120, 120, 120];

        self.bound = DEFECT_BAND_BOUND;
        self.band = 0;
        self.pseudo = false;
    }

    pub fn read_file<P: AsRef<Path>>(&mut self, inpfile: P) -> Result<()> {
        let inpfile = inpfile.as_ref();

        let file = File::open(inpfile).map_err(|e| PawError::io(inpfile, e))?;

        let lines = BufReader::new(file)
            .lines()
            .collect::<std::io::Result<Vec<String>>>()
            .map_err(|e| PawError::io(inpfile, e))?;

        self.parse_lines(&lines)
    }

    pub fn parse(&mut self, text: &str) -> Result<()> {
        let lines: Vec<String> = text.lines().map(|s| s.to_string()).collect();

        self.parse_lines(&lines)
    }

    // `key = value` per line; `#` starts a comment
    fn parse_lines(&mut self, lines: &[String]) -> Result<()> {
        self.set_defaults();

        let mut invalid = Vec::new();

        for line in lines.iter() {
            let line = line.split('#').next().unwrap_or("").trim();

            if line.is_empty() {
                continue;
            }

            let s: Vec<&str> = line.splitn(2, '=').map(|x| x.trim()).collect();

            if s.len() != 2 {
                invalid.push(format!("'{}' is not of the form key = value", line));
                continue;
            }

            let (key, value) = (s[0], s[1]);

            match key {
                "verbosity" => self.verbosity = value.to_string(),

                "task" => self.task = value.to_string(),

                "bulk_dir" => self.bulk_dir = value.to_string(),

                "defect_dir" => self.defect_dir = value.to_string(),

                "structure_file" => self.structure_file = value.to_string(),

                "potcar_file" => self.potcar_file = value.to_string(),

                "wavecar_file" => self.wavecar_file = value.to_string(),

                "kpts_scheme" => self.kpts_scheme = value.to_string(),

                "kpts_file" => self.kpts_file = value.to_string(),

                "share_potcar" => self.share_potcar = parse_value(key, value)?,

                "fft_grid" => self.fft_grid = parse_fft_grid(value)?,

                "bound" => self.bound = parse_value(key, value)?,

                "band" => self.band = parse_value(key, value)?,

                "pseudo" => self.pseudo = parse_value(key, value)?,

                _ => invalid.push(format!("unknown parameter '{}'", key)),
            }
        }

        if !invalid.is_empty() {
            return Err(PawError::Config(invalid.join("; ")));
        }

        self.validate()
    }

    fn validate(&self) -> Result<()> {
        if !TASKS.contains(&self.task.as_str()) {
            return Err(PawError::Config(format!(
                "task '{}' is not one of {:?}",
                self.task, TASKS
            )));
        }

        if !KPTS_SCHEMES.contains(&self.kpts_scheme.as_str()) {
            return Err(PawError::Config(format!(
                "kpts_scheme '{}' is not one of {:?}",
                self.kpts_scheme, KPTS_SCHEMES
            )));
        }

        if self.fft_grid.iter().any(|&n| n == 0) {
            return Err(PawError::Config(format!(
                "fft_grid {:?} has an empty dimension",
                self.fft_grid
            )));
        }

        if !(0.0..=1.0).contains(&self.bound) {
            return Err(PawError::Config(format!(
                "bound = {} lies outside [0, 1]",
                self.bound
            )));
        }

        Ok(())
    }

    pub fn display(&self) {
        const OUT_WIDTH1: usize = 28;
        const OUT_WIDTH2: usize = 18;

        info!("   {:-^80}", " control parameters ");

        let fft_grid = format!(
            "{} {} {}",
            self.fft_grid[0], self.fft_grid[1], self.fft_grid[2]
        );

        let rows: [(&str, String); 14] = [
            ("task", self.task.clone()),
            ("verbosity", self.verbosity.clone()),
            ("bulk_dir", self.bulk_dir.clone()),
            ("defect_dir", self.defect_dir.clone()),
            ("structure_file", self.structure_file.clone()),
            ("potcar_file", self.potcar_file.clone()),
            ("wavecar_file", self.wavecar_file.clone()),
            ("kpts_scheme", self.kpts_scheme.clone()),
            ("kpts_file", self.kpts_file.clone()),
            ("share_potcar", self.share_potcar.to_string()),
            ("fft_grid", fft_grid),
            ("bound", self.bound.to_string()),
            ("band", self.band.to_string()),
            ("pseudo", self.pseudo.to_string()),
        ];

        for (key, value) in rows.iter() {
            info!(
                "   {:<width1$} = {:>width2$}",
                key,
                value,
                width1 = OUT_WIDTH1,
                width2 = OUT_WIDTH2
            );
        }
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| PawError::Config(format!("cannot parse '{}' for {}", value, key)))
}

fn parse_fft_grid(value: &str) -> Result<[usize; 3]> {
    let n = value
        .split_whitespace()
        .map(|v| parse_value::<usize>("fft_grid", v))
        .collect::<Result<Vec<usize>>>()?;

    if n.len() != 3 {
        return Err(PawError::Config(format!(
            "fft_grid needs 3 values, got '{}'",
            value
        )));
    }

    Ok([n[0], n[1], n[2]])
}
