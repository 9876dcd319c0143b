/// Prepare a porous-electrode cell from a TOML parameter file
use electrode_setup::config::DEFAULT_CONFIG_FILE;
use electrode_setup::report::REPORT_FILE;
use electrode_setup::{CellConfig, CellSetup, ElectrodeRole};
use std::env;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process;

/// Input parameters are copied here so a run directory is self-describing.
const INPUT_COPY_FILE: &str = "input_params.toml";

struct Args {
    config: PathBuf,
    seed: Option<u64>,
    out: Option<PathBuf>,
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let parsed = match parse_args(&args[1..]) {
        Ok(Some(a)) => a,
        Ok(None) => {
            print_usage();
            return;
        }
        Err(msg) => {
            eprintln!("❌ {}", msg);
            print_usage();
            process::exit(2);
        }
    };
    if let Err(e) = run(parsed) {
        eprintln!("❌ Setup failed: {}", e);
        process::exit(1);
    }
}

fn print_usage() {
    println!("Usage: electrode_setup [params.toml] [--seed N] [--out DIR]\n");
    println!("  params.toml   Cell parameter file (default: {})", DEFAULT_CONFIG_FILE);
    println!("  --seed N      Override the sampling seed");
    println!("  --out DIR     Write {} and {} into DIR", INPUT_COPY_FILE, REPORT_FILE);
}

fn parse_args(args: &[String]) -> Result<Option<Args>, String> {
    let mut config = None;
    let mut seed = None;
    let mut out = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--seed" => {
                let value = iter.next().ok_or("--seed needs a value")?;
                seed = Some(
                    value
                        .parse::<u64>()
                        .map_err(|e| format!("invalid seed '{}': {}", value, e))?,
                );
            }
            "--out" => {
                let value = iter.next().ok_or("--out needs a directory")?;
                out = Some(PathBuf::from(value));
            }
            other if other.starts_with("--") => return Err(format!("unknown option {}", other)),
            other => {
                if config.is_some() {
                    return Err(format!("unexpected argument {}", other));
                }
                config = Some(PathBuf::from(other));
            }
        }
    }
    Ok(Some(Args {
        config: config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE)),
        seed,
        out,
    }))
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    println!("[setup] Loading {}", args.config.display());
    let mut config = CellConfig::load_from_file(&args.config)?;
    if let Some(seed) = args.seed {
        config.sim.seed = Some(seed);
    }
    let setup = CellSetup::from_config(config)?;
    let report = setup.report();

    println!("\n🔋 Cell prepared (seed {})", setup.seed);
    for e in &report.electrodes {
        println!(
            "   {:<8} {:<14} {:>3}x{:<3} {:<9} {:<8} mean len {:.3e} m, cap {:.4e} C/m²",
            e.role.key(), e.material, e.n_vol, e.n_part, e.solid_type, e.shape, e.mean_length, e.capacity_charge
        );
        println!("            {}", e.material_name);
    }
    if !setup.config.has_anode() {
        println!("   anode    lithium foil");
    }
    let limiting = match report.limiting_electrode {
        ElectrodeRole::Anode => "anode",
        ElectrodeRole::Cathode => "cathode",
    };
    println!("   Limiting electrode: {} (z = {:.4})", limiting, report.capacity_ratio);
    println!("   1C current density: {:.4} A/m²", report.one_c_current_density);
    println!("   Standard voltage:   {:.4} V", report.standard_voltage);
    println!("   Diffusive time td:  {:.4e} s", report.scales.t_d);
    println!("   Mesh cells:         {}", report.mesh.len());

    if let Some(dir) = args.out {
        fs::create_dir_all(&dir)?;
        setup.config.write_to_file(dir.join(INPUT_COPY_FILE))?;
        report.write_to_file(dir.join(REPORT_FILE))?;
        println!("\n✅ Wrote {} and {} to {}", INPUT_COPY_FILE, REPORT_FILE, dir.display());
    }
    Ok(())
}
