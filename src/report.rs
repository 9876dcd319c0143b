// report.rs
// Derived cell quantities for reporting: porous mesh, capacities, limiting
// electrode, 1C current, and the output series labels of the solver.

use crate::config::ElectrodeRole;
use crate::electrode::Arity;
use crate::error::SetupResult;
use crate::nondim::{ElectrodeParams, NondimParams, ReferenceScales};
use crate::units::{Constants, SECONDS_PER_HOUR};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Name of the solver model whose variables are reported.
pub const MODEL_NAME: &str = "cell";
/// File name of the JSON report inside an output directory.
pub const REPORT_FILE: &str = "setup_report.json";

/// Finite-volume mesh across anode → separator → cathode.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CellMesh {
    /// Cell centres in units of Lref
    pub centres: Vec<f64>,
    /// Cell faces in units of Lref, starting at 0
    pub faces: Vec<f64>,
    /// Electrolyte volume fraction per cell (1 in the separator)
    pub porosity: Vec<f64>,
    /// Cell centres (m)
    pub centres_m: Vec<f64>,
    /// Cell faces (m)
    pub faces_m: Vec<f64>,
}

impl CellMesh {
    pub fn len(&self) -> usize {
        self.centres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centres.is_empty()
    }
}

/// Build the porous-direction mesh. A lithium-foil anode contributes no cells.
pub fn porous_mesh(params: &NondimParams) -> CellMesh {
    let mut widths = Vec::new();
    let mut porosity = Vec::new();
    let mut push = |n: usize, length: f64, poros: f64| {
        if n == 0 {
            return;
        }
        let dx = length / n as f64;
        widths.extend(std::iter::repeat(dx).take(n));
        porosity.extend(std::iter::repeat(poros).take(n));
    };
    if let Some(anode) = &params.anode {
        push(params.n_vol.anode, anode.length, anode.porosity);
    }
    push(params.n_vol.separator, params.l_separator, 1.0);
    push(params.n_vol.cathode, params.cathode.length, params.cathode.porosity);

    let mut faces = Vec::with_capacity(widths.len() + 1);
    faces.push(0.0);
    let mut x = 0.0;
    for w in &widths {
        x += w;
        faces.push(x);
    }
    let centres: Vec<f64> = faces.windows(2).map(|f| 0.5 * (f[0] + f[1])).collect();
    let l_ref = params.scales.l_ref;
    CellMesh {
        centres_m: centres.iter().map(|c| c * l_ref).collect(),
        faces_m: faces.iter().map(|f| f * l_ref).collect(),
        centres,
        faces,
        porosity,
    }
}

/// Strip the model prefix up to the first '.' and replace remaining dots
/// with underscores. Names without a prefix only have dots replaced.
pub fn series_key(name: &str) -> String {
    let base = match name.find('.') {
        Some(i) => &name[i + 1..],
        None => name,
    };
    base.replace('.', "_")
}

/// Companion key holding the time values of a series.
pub fn times_key(key: &str) -> String {
    format!("{}_times", key)
}

fn trode_suffix(role: ElectrodeRole) -> &'static str {
    match role {
        ElectrodeRole::Anode => "a",
        ElectrodeRole::Cathode => "c",
    }
}

/// Fully qualified solver variable names for a parameter set.
pub fn output_variables(params: &NondimParams) -> Vec<String> {
    let mut names = vec![
        format!("{}.phi_applied", MODEL_NAME),
        format!("{}.current", MODEL_NAME),
    ];
    let mut regions = Vec::new();
    if params.anode.is_some() {
        regions.push("a");
    }
    if params.n_vol.separator > 0 {
        regions.push("s");
    }
    regions.push("c");
    for r in &regions {
        names.push(format!("{}.c_lyte_{}", MODEL_NAME, r));
        names.push(format!("{}.phi_lyte_{}", MODEL_NAME, r));
    }
    for e in params.electrodes() {
        let t = trode_suffix(e.role);
        names.push(format!("{}.ffrac_{}", MODEL_NAME, t));
        let (nv, np) = e.dim();
        let fields: &[&str] = match e.material.arity() {
            Arity::One => &["c", "cbar"],
            Arity::Two => &["c1", "c2", "c1bar", "c2bar"],
        };
        for i in 0..nv {
            for j in 0..np {
                for f in fields {
                    names.push(format!("{}.partTrode{}vol{}part{}.{}", MODEL_NAME, t, i, j, f));
                }
            }
        }
    }
    names
}

/// Per-electrode summary.
#[derive(Clone, Debug, Serialize)]
pub struct ElectrodeSummary {
    pub role: ElectrodeRole,
    pub material: String,
    pub material_name: String,
    pub solid_type: String,
    pub shape: String,
    pub n_vol: usize,
    pub n_part: usize,
    /// Capacity (sites/m²)
    pub capacity: f64,
    /// Capacity as charge per area (C/m²)
    pub capacity_charge: f64,
    pub vstd: f64,
    pub dphi_eq_ref: f64,
    pub mean_length: f64,
    pub min_length: f64,
    pub max_length: f64,
}

impl ElectrodeSummary {
    fn new(e: &ElectrodeParams, lengths: &[f64], constants: &Constants) -> Self {
        let (n_vol, n_part) = e.dim();
        let n = lengths.len().max(1) as f64;
        Self {
            role: e.role,
            material: e.material.tag().to_string(),
            material_name: e.material.display_name().to_string(),
            solid_type: e.solid_type.tag().to_string(),
            shape: e.shape.tag().to_string(),
            n_vol,
            n_part,
            capacity: e.capacity,
            capacity_charge: e.capacity * constants.e,
            vstd: e.vstd,
            dphi_eq_ref: e.dphi_eq_ref,
            mean_length: lengths.iter().sum::<f64>() / n,
            min_length: lengths.iter().cloned().fold(f64::INFINITY, f64::min),
            max_length: lengths.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Everything a run directory records about the prepared cell.
#[derive(Clone, Debug, Serialize)]
pub struct SetupReport {
    pub seed: u64,
    pub constants: Constants,
    pub scales: ReferenceScales,
    pub mesh: CellMesh,
    pub electrodes: Vec<ElectrodeSummary>,
    pub capacity_ratio: f64,
    pub limiting_electrode: ElectrodeRole,
    /// Theoretical 1C current density (A/m²)
    pub one_c_current_density: f64,
    /// Standard cell voltage Vstd_c − Vstd_a (V)
    pub standard_voltage: f64,
    /// Sanitized output series keys with their time companions
    pub series: Vec<(String, String)>,
}

impl SetupReport {
    /// `lengths` yields the discretized particle lengths (m) per electrode.
    pub fn new<F>(seed: u64, params: &NondimParams, lengths: F) -> Self
    where
        F: Fn(ElectrodeRole) -> Vec<f64>,
    {
        let constants = params.scales.constants;
        let electrodes: Vec<ElectrodeSummary> = params
            .electrodes()
            .map(|e| ElectrodeSummary::new(e, &lengths(e.role), &constants))
            .collect();
        let limiting = limiting_electrode(params);
        let limiting_cap = params
            .electrode(limiting)
            .map(|e| e.capacity)
            .unwrap_or(params.cathode.capacity);
        let series = output_variables(params)
            .iter()
            .map(|name| {
                let key = series_key(name);
                let times = times_key(&key);
                (key, times)
            })
            .collect();
        Self {
            seed,
            constants,
            scales: params.scales,
            mesh: porous_mesh(params),
            electrodes,
            capacity_ratio: params.z,
            limiting_electrode: limiting,
            one_c_current_density: limiting_cap * constants.e / SECONDS_PER_HOUR,
            standard_voltage: standard_voltage(params),
            series,
        }
    }

    pub fn to_json(&self) -> SetupResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> SetupResult<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// The electrode with the smaller capacity; the cathode against a lithium foil.
pub fn limiting_electrode(params: &NondimParams) -> ElectrodeRole {
    if params.anode.is_some() && params.z >= 1.0 {
        ElectrodeRole::Anode
    } else {
        ElectrodeRole::Cathode
    }
}

/// Vstd_c − Vstd_a, with a lithium-foil anode at 0 V.
pub fn standard_voltage(params: &NondimParams) -> f64 {
    let anode = params.anode.as_ref().map(|a| a.vstd).unwrap_or(0.0);
    params.cathode.vstd - anode
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CellConfig;
    use crate::nondim::nondimensionalize;
    use crate::particles::synthesize;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params(config: &CellConfig) -> NondimParams {
        let cell = synthesize(config, &mut StdRng::seed_from_u64(0)).unwrap();
        nondimensionalize(config, &cell).unwrap()
    }

    #[test]
    fn series_keys_drop_model_prefix() {
        assert_eq!(series_key("cell.phi_applied"), "phi_applied");
        assert_eq!(
            series_key("cell.partTrodecvol0part1.cbar"),
            "partTrodecvol0part1_cbar"
        );
        assert_eq!(series_key("current"), "current");
        assert_eq!(times_key("phi_applied"), "phi_applied_times");
    }

    #[test]
    fn mesh_spans_separator_and_cathode_against_foil() {
        let config = CellConfig::default();
        let p = params(&config);
        let mesh = porous_mesh(&p);
        assert_eq!(mesh.len(), 5 + 10);
        assert_eq!(mesh.faces.len(), mesh.len() + 1);
        let total = (25e-6 + 50e-6) / 50e-6;
        assert!((mesh.faces[mesh.len()] - total).abs() < 1e-12);
        assert!((mesh.faces_m[mesh.len()] - 75e-6).abs() < 1e-15);
        assert!(mesh.porosity[..5].iter().all(|&p| p == 1.0));
        assert!(mesh.porosity[5..].iter().all(|&p| p == 0.4));
        assert!(mesh.centres.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn mesh_starts_with_anode_when_present() {
        let mut config = CellConfig::default();
        config.sim.n_vol.anode = 4;
        let mesh = porous_mesh(&params(&config));
        assert_eq!(mesh.len(), 4 + 5 + 10);
        let dx_a = (88e-6 / 50e-6) / 4.0;
        assert!((mesh.centres[0] - 0.5 * dx_a).abs() < 1e-12);
    }

    #[test]
    fn foil_cell_is_cathode_limited() {
        let config = CellConfig::default();
        let p = params(&config);
        assert_eq!(limiting_electrode(&p), ElectrodeRole::Cathode);
        assert!((standard_voltage(&p) - 3.422).abs() < 1e-12);

        let report = SetupReport::new(0, &p, |_| vec![100e-9]);
        let expected = p.cathode.capacity * config.constants.e / 3600.0;
        assert!((report.one_c_current_density - expected).abs() / expected < 1e-12);
        assert!(report.series.iter().any(|(k, t)| k == "phi_applied" && t == "phi_applied_times"));
        assert!(report.to_json().unwrap().contains("\"limiting_electrode\""));
    }

    #[test]
    fn larger_cathode_makes_the_anode_limiting() {
        let mut config = CellConfig::default();
        config.sim.n_vol.anode = 2;
        config.geometry.anode.length = 10e-6;
        let p = params(&config);
        assert!(p.z > 1.0);
        assert_eq!(limiting_electrode(&p), ElectrodeRole::Anode);
        assert!((standard_voltage(&p) - (3.422 - 0.12)).abs() < 1e-12);
    }

    #[test]
    fn two_species_particles_report_both_sublattices() {
        let mut config = CellConfig::default();
        config.sim.n_vol.anode = 1;
        config.sim.n_part.anode = 1;
        config.materials.anode.material = "LiC6".to_string();
        let names = output_variables(&params(&config));
        assert!(names.contains(&"cell.partTrodeavol0part0.c1".to_string()));
        assert!(names.contains(&"cell.partTrodeavol0part0.c2bar".to_string()));
        assert!(names.contains(&"cell.partTrodecvol9part1.cbar".to_string()));
    }
}
