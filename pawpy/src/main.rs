use control::Control;
use crystal::Crystal;
use env_logger::Env;
use kpts::KPTS;
use log::{error, info};
use projection::*;
use types::Result;

use std::rc::Rc;

fn main() {
    let stopwatch_main = std::time::Instant::now();

    // read in control parameters

    let mut control = Control::new();

    if let Err(e) = control.read_file("in.ctrl") {
        eprintln!("in.ctrl : {}", e);
        std::process::exit(1);
    }

    env_logger::Builder::from_env(Env::default().default_filter_or(control.get_verbosity())).init();

    control.display();

    if let Err(e) = run(&control) {
        error!("{}", e);
        error!("Program exited abnormally");
        std::process::exit(1);
    }

    info!(
        "   {:<28} = {:>18.2} s",
        "total time",
        stopwatch_main.elapsed().as_secs_f64()
    );
}

fn run(control: &Control) -> Result<()> {
    let engine = Rc::new(NativeEngine::new());

    let fft_grid = control.get_fft_grid();

    // bulk

    let mut bulk = Wavefunction::from_files(
        Rc::clone(&engine),
        control.bulk_path(control.get_structure_file()),
        control.bulk_path(control.get_wavecar_file()),
        control.bulk_path(control.get_potcar_file()),
        control.get_kpts_scheme(),
        control.bulk_path(control.get_kpts_file()),
        fft_grid,
    )?;

    info!("bulk :");
    bulk.get_crystal().display();
    bulk.get_core_region().display();

    // defect

    let mut defect = if control.get_share_potcar() {
        let mut crystal = Crystal::new();
        crystal.read_file(control.defect_path(control.get_structure_file()))?;

        let kpts = kpts::new(
            control.get_kpts_scheme(),
            control.defect_path(control.get_kpts_file()),
        )?;

        kpts.display();

        Wavefunction::new(
            Rc::clone(&engine),
            crystal,
            Rc::clone(bulk.get_core_region()),
            control.defect_path(control.get_wavecar_file()),
            kpts.as_ref(),
            fft_grid,
        )?
    } else {
        Wavefunction::from_files(
            Rc::clone(&engine),
            control.defect_path(control.get_structure_file()),
            control.defect_path(control.get_wavecar_file()),
            control.defect_path(control.get_potcar_file()),
            control.get_kpts_scheme(),
            control.defect_path(control.get_kpts_file()),
            fft_grid,
        )?
    };

    info!("defect :");
    defect.get_crystal().display();

    if !control.get_share_potcar() {
        defect.get_core_region().display();
    }

    info!(
        "   bands : bulk {} defect {}, k-points {}, spins {}",
        bulk.get_band_count()?,
        defect.get_band_count()?,
        bulk.get_kpoint_count()?,
        bulk.get_spin_count()?
    );

    // project the defect bands onto the bulk bands

    let single_pseudo = control.get_task() == "proportion_conduction" && control.is_pseudo();

    if !single_pseudo {
        defect.setup_projection(&mut bulk)?;
    }

    match control.get_task() {
        "proportion_conduction" => {
            let band = control.get_band();

            let (v, c) = defect.proportion_conduction(band, &bulk, control.is_pseudo())?;

            info!("   {:-^88}", " proportion conduction ");
            info!("{:12} {:^8} {:^16} {:^16}", "", "band", "valence", "conduction");
            info!("{:12} {:^8} {:16.8} {:16.8}", "", band, v, c);
        }

        "single_band_projection" => {
            let band = control.get_band();

            let res = defect.single_band_projection(band, &bulk)?;

            info!("   {:-^88}", format!(" projection of defect band {} ", band));
            info!(
                "{:12} {:^8} {:^16} {:^16} {:^16}",
                "", "state", "re", "im", "|overlap|^2"
            );

            for (i, z) in res.iter().enumerate() {
                info!(
                    "{:12} {:^8} {:16.8} {:16.8} {:16.8}",
                    "",
                    i,
                    z.re,
                    z.im,
                    z.norm_sqr()
                );
            }
        }

        _ => {
            let results = defect.defect_band_analysis(&bulk, control.get_bound())?;

            display_band_analysis(&results);
        }
    }

    defect.free_all();
    bulk.free_all();

    Ok(())
}
