// particles/mod.rs
// Particle population synthesizer: log-normal size and conductance
// ensembles with per-particle discretization and geometry.

use crate::config::{CellConfig, ElectrodeRole};
use crate::error::{SetupError, SetupResult};
use crate::geometry::{SolidShape, SolidType};
use ndarray::Array2;
use rand::Rng;
use rand_distr::{Distribution, LogNormal};
use serde::Serialize;

/// Per-electrode ensemble, indexed (volume, particle).
#[derive(Clone, Debug, Serialize)]
pub struct ParticleEnsemble {
    pub role: ElectrodeRole,
    pub solid_type: SolidType,
    pub shape: SolidShape,
    /// Sampled characteristic length before discretization (m)
    pub raw: Array2<f64>,
    /// Number of discretization points per particle
    pub num: Array2<usize>,
    /// Discretized characteristic length (m)
    pub len: Array2<f64>,
    /// Reactive surface area (m²)
    pub area: Array2<f64>,
    /// Particle volume (m³)
    pub vol: Array2<f64>,
    /// Inter-particle exchange conductance (S)
    pub conductance: Array2<f64>,
}

impl ParticleEnsemble {
    /// Derive discretization and geometry from raw sampled lengths.
    pub fn from_sizes(
        role: ElectrodeRole,
        solid_type: SolidType,
        shape: SolidShape,
        step: f64,
        thickness: f64,
        raw: Array2<f64>,
    ) -> Self {
        let discretized = raw.mapv(|r| solid_type.discretize(r, step));
        let num = discretized.mapv(|(n, _)| n);
        let len = discretized.mapv(|(_, l)| l);
        let area = len.mapv(|l| shape.area(l, thickness));
        let vol = len.mapv(|l| shape.volume(l, thickness));
        let conductance = Array2::zeros(raw.dim());
        Self {
            role,
            solid_type,
            shape,
            raw,
            num,
            len,
            area,
            vol,
            conductance,
        }
    }

    /// (volumes, particles per volume)
    pub fn dim(&self) -> (usize, usize) {
        self.raw.dim()
    }

    /// Total solid volume of each electrode volume row.
    pub fn row_volumes(&self) -> Vec<f64> {
        self.vol.rows().into_iter().map(|row| row.sum()).collect()
    }
}

/// Ensembles for every active electrode.
#[derive(Clone, Debug, Serialize)]
pub struct CellEnsemble {
    pub cathode: ParticleEnsemble,
    /// Absent for a lithium-foil counter electrode
    pub anode: Option<ParticleEnsemble>,
}

impl CellEnsemble {
    pub fn get(&self, role: ElectrodeRole) -> Option<&ParticleEnsemble> {
        match role {
            ElectrodeRole::Cathode => Some(&self.cathode),
            ElectrodeRole::Anode => self.anode.as_ref(),
        }
    }
}

/// Log-space (μ, σ) whose log-normal has arithmetic mean `mean` and standard deviation `stddev`.
pub fn lognormal_params(mean: f64, stddev: f64) -> (f64, f64) {
    let var = stddev * stddev;
    let mu = (mean * mean / (var + mean * mean).sqrt()).ln();
    let sigma = (var / (mean * mean) + 1.0).ln().sqrt();
    (mu, sigma)
}

/// Draw a (volumes, particles) array. Zero mean or zero spread is deterministic.
pub fn sample_lognormal<R: Rng + ?Sized>(
    mean: f64,
    stddev: f64,
    dim: (usize, usize),
    rng: &mut R,
) -> SetupResult<Array2<f64>> {
    if mean == 0.0 || stddev == 0.0 {
        return Ok(Array2::from_elem(dim, mean));
    }
    let (mu, sigma) = lognormal_params(mean, stddev);
    let dist = LogNormal::new(mu, sigma).map_err(|e| {
        SetupError::config(
            "particles",
            format!("no log-normal for mean {} stddev {}: {}", mean, stddev, e),
        )
    })?;
    Ok(Array2::from_shape_fn(dim, |_| dist.sample(rng)))
}

/// Sample particle sizes of one electrode and derive its geometry.
pub fn sample_sizes<R: Rng + ?Sized>(
    config: &CellConfig,
    role: ElectrodeRole,
    rng: &mut R,
) -> SetupResult<ParticleEnsemble> {
    let p = config.particles.get(role);
    let solid_type = p.solid_type(role)?;
    let shape = p.solid_shape(role)?;
    let dim = (config.n_vol(role), *config.sim.n_part.get(role));
    let raw = sample_lognormal(p.mean, p.stddev, dim, rng)
        .map_err(|e| relocate(e, format!("particles.{}", role)))?;
    Ok(ParticleEnsemble::from_sizes(
        role,
        solid_type,
        shape,
        p.solid_disc,
        p.part_thick,
        raw,
    ))
}

/// Sample the exchange-conductance ensemble of one electrode.
pub fn sample_conductances<R: Rng + ?Sized>(
    config: &CellConfig,
    role: ElectrodeRole,
    rng: &mut R,
) -> SetupResult<Array2<f64>> {
    let c = config.conductivity.get(role);
    let dim = (config.n_vol(role), *config.sim.n_part.get(role));
    sample_lognormal(c.g_mean, c.g_stddev, dim, rng)
        .map_err(|e| relocate(e, format!("conductivity.{}", role)))
}

/// Synthesize ensembles for all active electrodes.
///
/// Draw order is fixed: sizes for every electrode (cathode first), then
/// conductances in the same order. A given seed reproduces the ensemble.
pub fn synthesize<R: Rng + ?Sized>(config: &CellConfig, rng: &mut R) -> SetupResult<CellEnsemble> {
    let roles = config.electrodes();
    let mut ensembles = Vec::with_capacity(roles.len());
    for &role in &roles {
        ensembles.push(sample_sizes(config, role, rng)?);
    }
    for ensemble in ensembles.iter_mut() {
        ensemble.conductance = sample_conductances(config, ensemble.role, rng)?;
    }

    #[cfg(feature = "setup_debug")]
    for e in &ensembles {
        let (nv, np) = e.dim();
        eprintln!(
            "[psd] {}: {}x{} {} {} particles, mean len {:.3e} m, mean G {:.3e}",
            e.role,
            nv,
            np,
            e.solid_type,
            e.shape,
            e.len.mean().unwrap_or(0.0),
            e.conductance.mean().unwrap_or(0.0)
        );
    }

    let mut cathode = None;
    let mut anode = None;
    for e in ensembles {
        match e.role {
            ElectrodeRole::Cathode => cathode = Some(e),
            ElectrodeRole::Anode => anode = Some(e),
        }
    }
    let cathode = cathode.ok_or_else(|| {
        SetupError::config("sim.n_vol.cathode", "at least one cathode volume required")
    })?;
    Ok(CellEnsemble { cathode, anode })
}

fn relocate(err: SetupError, location: String) -> SetupError {
    match err {
        SetupError::Configuration { message, .. } => SetupError::config(location, message),
        other => other,
    }
}

#[cfg(test)]
mod tests;
