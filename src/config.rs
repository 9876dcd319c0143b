// config.rs
// Dimensional cell configuration, loaded from params.toml

use crate::electrode::Transport;
use crate::error::{SetupError, SetupResult};
use crate::geometry::{SolidShape, SolidType};
use crate::units::{self, Constants};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "params.toml";
/// Seed used when `sim.seed` is absent.
pub const DEFAULT_SEED: u64 = 0;

/// Role of an electrode in the cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectrodeRole {
    /// Negative electrode
    Anode,
    /// Positive electrode
    Cathode,
}

impl ElectrodeRole {
    pub fn key(&self) -> &'static str {
        match self {
            ElectrodeRole::Anode => "anode",
            ElectrodeRole::Cathode => "cathode",
        }
    }
}

impl fmt::Display for ElectrodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A value per electrode role.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PerElectrode<T> {
    pub anode: T,
    pub cathode: T,
}

impl<T> PerElectrode<T> {
    pub fn new(anode: T, cathode: T) -> Self {
        Self { anode, cathode }
    }

    pub fn get(&self, role: ElectrodeRole) -> &T {
        match role {
            ElectrodeRole::Anode => &self.anode,
            ElectrodeRole::Cathode => &self.cathode,
        }
    }

    pub fn get_mut(&mut self, role: ElectrodeRole) -> &mut T {
        match role {
            ElectrodeRole::Anode => &mut self.anode,
            ElectrodeRole::Cathode => &mut self.cathode,
        }
    }
}

/// Applied-current or applied-voltage operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileType {
    /// Constant current at `c_rate`
    CC,
    /// Constant voltage at `v_set`
    CV,
}

impl ProfileType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "CC" => Some(ProfileType::CC),
            "CV" => Some(ProfileType::CV),
            _ => None,
        }
    }
}

/// Interfacial reaction kinetics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReactionType {
    /// Butler-Volmer
    BV,
    Marcus,
    /// Marcus-Hush-Chidsey
    MHC,
}

impl ReactionType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "BV" => Some(ReactionType::BV),
            "Marcus" => Some(ReactionType::Marcus),
            "MHC" => Some(ReactionType::MHC),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellConfig {
    pub sim: SimParams,
    pub particles: PerElectrode<ParticleConfig>,
    pub conductivity: PerElectrode<ConductivityConfig>,
    pub materials: PerElectrode<MaterialConfig>,
    pub reactions: PerElectrode<ReactionConfig>,
    pub geometry: GeometryConfig,
    pub electrolyte: ElectrolyteConfig,
    #[serde(default)]
    pub constants: Constants,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    /// "CC" or "CV"
    pub profile_type: String,
    /// Applied C-rate for CC operation (1/h)
    pub c_rate: f64,
    /// Applied voltage for CV operation (V)
    pub v_set: f64,
    /// Fraction of the limiting capacity to cycle
    pub cap_frac: f64,
    /// Total simulated time (s)
    pub t_end: f64,
    /// Number of reported time steps
    pub t_steps: usize,
    /// Absolute temperature (K)
    pub temperature: f64,
    pub n_vol: VolumeCounts,
    /// Particles per electrode volume
    pub n_part: PerElectrode<usize>,
    /// Seed for particle and conductance sampling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Finite volumes along the porous direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeCounts {
    pub anode: usize,
    pub cathode: usize,
    pub separator: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleConfig {
    /// Arithmetic mean particle length (m)
    pub mean: f64,
    /// Arithmetic standard deviation of particle length (m)
    pub stddev: f64,
    /// Initial filling fraction
    pub cs0: f64,
    /// "homog", "homog_sdn", "ACR", "CHR" or "diffn"
    pub solid_type: String,
    /// Discretization step inside resolved particles (m)
    pub solid_disc: f64,
    /// "sphere", "C3" (alias "plate") or "cylinder"
    pub solid_shape: String,
    /// Out-of-plane thickness of C3 and cylindrical particles (m)
    pub part_thick: f64,
}

impl ParticleConfig {
    pub fn solid_type(&self, role: ElectrodeRole) -> SetupResult<SolidType> {
        SolidType::from_tag(&self.solid_type).ok_or_else(|| {
            SetupError::config(
                format!("particles.{}.solid_type", role),
                format!("unknown solid type '{}'", self.solid_type),
            )
        })
    }

    pub fn solid_shape(&self, role: ElectrodeRole) -> SetupResult<SolidShape> {
        SolidShape::from_tag(&self.solid_shape).ok_or_else(|| {
            SetupError::config(
                format!("particles.{}.solid_shape", role),
                format!("unknown solid shape '{}'", self.solid_shape),
            )
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConductivityConfig {
    /// Simulate finite electronic conductivity across the electrode
    pub sim_bulk_cond: bool,
    /// Bulk electronic conductivity (S/m)
    pub mcond: f64,
    /// Simulate particle-to-particle conductance losses
    pub sim_part_cond: bool,
    /// Mean inter-particle conductance (S)
    pub g_mean: f64,
    /// Standard deviation of inter-particle conductance (S)
    pub g_stddev: f64,
    /// Simulate surface conductivity losses along particles
    pub sim_surf_cond: bool,
    /// Surface conductivity (S)
    pub scond: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialConfig {
    /// Regular-solution interaction parameter (J)
    pub omega_a: f64,
    /// Second interaction parameter for graphite models (J)
    #[serde(default)]
    pub omega_b: f64,
    /// Cross-layer interaction parameter for two-species graphite (J)
    #[serde(default)]
    pub omega_c: f64,
    /// Van der Waals-like staging correction for two-species graphite (J)
    #[serde(default)]
    pub e_vdw: f64,
    /// Gradient penalty (J/m)
    pub kappa: f64,
    /// Coherency strain stiffness (J/m³)
    pub b: f64,
    /// Site density (1/m³)
    pub rhos: f64,
    /// Standard potential (V vs Li)
    pub vstd: f64,
    /// Solid diffusivity (m²/s)
    pub dsld: f64,
    /// Surface energy derivative with respect to concentration (J·m)
    pub dgammasdc: f64,
    /// Wetted-surface filling fraction for C3 particles
    pub cwet: f64,
    /// Use a fitted equilibrium potential as reference offset
    pub del_phi_eq_fit: bool,
    /// Material identifier, resolved against the material registry
    pub material: String,
    /// "constant" or "lattice"
    #[serde(default = "default_transport")]
    pub transport: String,
}

fn default_transport() -> String {
    "lattice".to_string()
}

impl MaterialConfig {
    pub fn transport(&self, role: ElectrodeRole) -> SetupResult<Transport> {
        Transport::from_tag(&self.transport).ok_or_else(|| {
            SetupError::config(
                format!("materials.{}.transport", role),
                format!("unknown transport function '{}'", self.transport),
            )
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReactionConfig {
    /// "BV", "Marcus" or "MHC"
    pub rxn_type: String,
    /// Exchange current density (A/m²)
    pub k0: f64,
    /// Symmetry factor
    pub alpha: f64,
    /// Reorganization energy (J)
    pub lambda: f64,
}

impl ReactionConfig {
    pub fn rxn_type(&self, role: ElectrodeRole) -> SetupResult<ReactionType> {
        ReactionType::from_tag(&self.rxn_type).ok_or_else(|| {
            SetupError::config(
                format!("reactions.{}.rxn_type", role),
                format!("unknown reaction type '{}'", self.rxn_type),
            )
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeometryConfig {
    /// Separator thickness (m)
    pub separator_length: f64,
    pub anode: ElectrodeGeometry,
    pub cathode: ElectrodeGeometry,
}

impl GeometryConfig {
    pub fn electrode(&self, role: ElectrodeRole) -> &ElectrodeGeometry {
        match role {
            ElectrodeRole::Anode => &self.anode,
            ElectrodeRole::Cathode => &self.cathode,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElectrodeGeometry {
    /// Electrode thickness (m)
    pub length: f64,
    /// Volume fraction of active material in the solid phase
    pub loading: f64,
    /// Electrolyte volume fraction
    pub porosity: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElectrolyteConfig {
    /// Initial salt concentration (mol/m³)
    pub c0: f64,
    /// Cation diffusivity (m²/s)
    pub dp: f64,
    /// Anion diffusivity (m²/s)
    pub dm: f64,
    /// Cation charge number
    pub zp: f64,
    /// Anion charge number (magnitude)
    pub zm: f64,
}

impl CellConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> SetupResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn load_default() -> SetupResult<Self> {
        Self::load_from_file(DEFAULT_CONFIG_FILE)
    }

    pub fn from_toml_str(content: &str) -> SetupResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> SetupResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Record the exact inputs of a run.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> SetupResult<()> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Electrodes with porous volumes: the cathode always, the anode when
    /// it has at least one volume (otherwise it is a flat lithium foil).
    pub fn electrodes(&self) -> Vec<ElectrodeRole> {
        let mut roles = vec![ElectrodeRole::Cathode];
        if self.sim.n_vol.anode >= 1 {
            roles.push(ElectrodeRole::Anode);
        }
        roles
    }

    pub fn has_anode(&self) -> bool {
        self.sim.n_vol.anode >= 1
    }

    pub fn seed(&self) -> u64 {
        self.sim.seed.unwrap_or(DEFAULT_SEED)
    }

    pub fn n_vol(&self, role: ElectrodeRole) -> usize {
        match role {
            ElectrodeRole::Anode => self.sim.n_vol.anode,
            ElectrodeRole::Cathode => self.sim.n_vol.cathode,
        }
    }
}

impl Default for CellConfig {
    /// LiFePO4 platelets against a lithium foil, with a graphite anode
    /// configured but inactive (`n_vol.anode = 0`).
    fn default() -> Self {
        Self {
            sim: SimParams {
                profile_type: "CC".to_string(),
                c_rate: 1.0,
                v_set: 3.3,
                cap_frac: 1.0,
                t_end: 1.2e3,
                t_steps: 200,
                temperature: units::REFERENCE_TEMPERATURE,
                n_vol: VolumeCounts {
                    anode: 0,
                    cathode: 10,
                    separator: 5,
                },
                n_part: PerElectrode::new(2, 2),
                seed: None,
            },
            particles: PerElectrode {
                anode: ParticleConfig {
                    mean: 100e-9,
                    stddev: 1e-9,
                    cs0: 0.99,
                    solid_type: "homog".to_string(),
                    solid_disc: 1e-9,
                    solid_shape: "sphere".to_string(),
                    part_thick: 20e-9,
                },
                cathode: ParticleConfig {
                    mean: 100e-9,
                    stddev: 1e-9,
                    cs0: 0.01,
                    solid_type: "ACR".to_string(),
                    solid_disc: 1e-9,
                    solid_shape: "C3".to_string(),
                    part_thick: 20e-9,
                },
            },
            conductivity: PerElectrode {
                anode: ConductivityConfig {
                    sim_bulk_cond: false,
                    mcond: 100.0,
                    sim_part_cond: false,
                    g_mean: 1e-14,
                    g_stddev: 0.0,
                    sim_surf_cond: false,
                    scond: 0.0,
                },
                cathode: ConductivityConfig {
                    sim_bulk_cond: false,
                    mcond: 0.1,
                    sim_part_cond: false,
                    g_mean: 1e-14,
                    g_stddev: 0.0,
                    sim_surf_cond: false,
                    scond: 0.0,
                },
            },
            materials: PerElectrode {
                anode: MaterialConfig {
                    omega_a: 1.6e-20,
                    omega_b: 6.8e-21,
                    omega_c: 0.0,
                    e_vdw: 0.0,
                    kappa: 4.0e-7,
                    b: 0.0,
                    rhos: 1.839e28,
                    vstd: 0.12,
                    dsld: 1.4e-14,
                    dgammasdc: 0.0,
                    cwet: 0.98,
                    del_phi_eq_fit: false,
                    material: "LiC6_1param".to_string(),
                    transport: default_transport(),
                },
                cathode: MaterialConfig {
                    omega_a: 1.8560e-20,
                    omega_b: 0.0,
                    omega_c: 0.0,
                    e_vdw: 0.0,
                    kappa: 5.0148e-10,
                    b: 0.1916e9,
                    rhos: 1.3793e28,
                    vstd: 3.422,
                    dsld: 5.3e-19,
                    dgammasdc: 0.0,
                    cwet: 0.98,
                    del_phi_eq_fit: false,
                    material: "LiFePO4".to_string(),
                    transport: default_transport(),
                },
            },
            reactions: PerElectrode {
                anode: ReactionConfig {
                    rxn_type: "BV".to_string(),
                    k0: 10.0,
                    alpha: 0.5,
                    lambda: 6.26e-20,
                },
                cathode: ReactionConfig {
                    rxn_type: "BV".to_string(),
                    k0: 1.6e-1,
                    alpha: 0.5,
                    lambda: 6.26e-20,
                },
            },
            geometry: GeometryConfig {
                separator_length: 25e-6,
                anode: ElectrodeGeometry {
                    length: 88e-6,
                    loading: 0.69,
                    porosity: 0.4,
                },
                cathode: ElectrodeGeometry {
                    length: 50e-6,
                    loading: 0.69,
                    porosity: 0.4,
                },
            },
            electrolyte: ElectrolyteConfig {
                c0: 1000.0,
                dp: 2.2e-10,
                dm: 2.94e-10,
                zp: 1.0,
                zm: 1.0,
            },
            constants: Constants::default(),
        }
    }
}
