// setup.rs
// One-shot cell setup: validate → synthesize particles → non-dimensionalize →
// bind one constitutive closure per particle. The result is immutable.

use crate::config::{CellConfig, ElectrodeRole};
use crate::electrode::{
    Arity, ChemicalPotential, ChemicalPotentialFn, FillingState, MaterialType, Potential, Transport,
};
use crate::error::SetupResult;
use crate::nondim::{nondimensionalize, ElectrodeParams, NondimParams};
use crate::particles::{synthesize, CellEnsemble};
use crate::report::SetupReport;
use crate::units::Constants;
use crate::validate::validate;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

/// Closures of one electrode, one chemical potential per (volume, particle).
#[derive(Clone, Debug)]
pub struct ElectrodeModels {
    pub role: ElectrodeRole,
    pub material: MaterialType,
    pub transport: Transport,
    pub particles: Array2<ChemicalPotential>,
}

impl ElectrodeModels {
    fn bind(params: &ElectrodeParams, temperature: f64, constants: &Constants) -> Self {
        let particles = Array2::from_shape_fn(params.dim(), |(i, j)| {
            ChemicalPotential::new(
                params.material,
                temperature,
                constants,
                params.material_params(i, j),
            )
        });
        Self {
            role: params.role,
            material: params.material,
            transport: params.transport,
            particles,
        }
    }

    pub fn chemical_potential(&self, vol: usize, part: usize) -> Option<&ChemicalPotential> {
        self.particles.get([vol, part])
    }

    /// Opaque callable for particle (vol, part).
    pub fn closure(&self, vol: usize, part: usize) -> Option<ChemicalPotentialFn> {
        self.chemical_potential(vol, part).map(|cp| cp.clone().into_fn())
    }

    pub fn transport_fn(&self) -> fn(f64) -> f64 {
        self.transport.as_fn()
    }
}

/// Everything the solver needs, prepared once.
#[derive(Clone, Debug)]
pub struct CellSetup {
    pub seed: u64,
    pub config: CellConfig,
    pub ensemble: CellEnsemble,
    pub params: NondimParams,
    pub cathode: ElectrodeModels,
    pub anode: Option<ElectrodeModels>,
}

impl CellSetup {
    /// Build with the seed recorded in the configuration (or the default seed).
    pub fn from_config(config: CellConfig) -> SetupResult<Self> {
        let seed = config.seed();
        Self::build(config, seed)
    }

    pub fn build(config: CellConfig, seed: u64) -> SetupResult<Self> {
        validate(&config)?;

        let mut rng = StdRng::seed_from_u64(seed);
        let ensemble = synthesize(&config, &mut rng)?;
        let params = nondimensionalize(&config, &ensemble)?;

        let cathode = ElectrodeModels::bind(&params.cathode, params.t, &config.constants);
        let anode = params
            .anode
            .as_ref()
            .map(|a| ElectrodeModels::bind(a, params.t, &config.constants));

        #[cfg(feature = "setup_debug")]
        eprintln!(
            "[setup] seed {}: cathode {} ({} particles), anode {}",
            seed,
            cathode.material.tag(),
            cathode.particles.len(),
            anode
                .as_ref()
                .map(|a| a.material.tag())
                .unwrap_or("lithium foil")
        );

        Ok(Self {
            seed,
            config,
            ensemble,
            params,
            cathode,
            anode,
        })
    }

    pub fn models(&self, role: ElectrodeRole) -> Option<&ElectrodeModels> {
        match role {
            ElectrodeRole::Cathode => Some(&self.cathode),
            ElectrodeRole::Anode => self.anode.as_ref(),
        }
    }

    /// Evaluate every particle of an electrode at its uniform initial filling.
    /// Row-major over (volume, particle); evaluated in parallel.
    pub fn initial_potentials(&self, role: ElectrodeRole) -> SetupResult<Vec<Potential>> {
        let (models, params) = match (self.models(role), self.params.electrode(role)) {
            (Some(m), Some(p)) => (m, p),
            _ => return Ok(Vec::new()),
        };
        let cs0 = params.cs0;
        let cells: Vec<((usize, usize), &ChemicalPotential)> = models.particles.indexed_iter().collect();
        cells
            .par_iter()
            .map(|&((i, j), cp)| {
                let n = params.num[[i, j]].max(1);
                let y = vec![cs0; n];
                let state = match cp.material().arity() {
                    Arity::One => FillingState::one(&y, cs0),
                    Arity::Two => FillingState::two(&y, &y, cs0, cs0),
                };
                cp.evaluate(&state)
            })
            .collect()
    }

    pub fn report(&self) -> SetupReport {
        SetupReport::new(self.seed, &self.params, |role| {
            self.ensemble
                .get(role)
                .map(|e| e.len.iter().cloned().collect())
                .unwrap_or_default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SetupError;

    #[test]
    fn default_cell_builds() {
        let setup = CellSetup::from_config(CellConfig::default()).unwrap();
        assert_eq!(setup.seed, 0);
        assert_eq!(setup.cathode.particles.dim(), (10, 2));
        assert!(setup.anode.is_none());
        assert_eq!(setup.cathode.material, MaterialType::LiFePO4);
    }

    #[test]
    fn invalid_config_fails_before_sampling() {
        let mut config = CellConfig::default();
        config.sim.temperature = 300.0;
        assert!(matches!(
            CellSetup::build(config, 1),
            Err(SetupError::Configuration { .. })
        ));
    }

    #[test]
    fn seed_controls_the_ensemble() {
        let mut config = CellConfig::default();
        config.particles.cathode.stddev = 20e-9;
        let a = CellSetup::build(config.clone(), 5).unwrap();
        let b = CellSetup::build(config.clone(), 5).unwrap();
        let c = CellSetup::build(config, 6).unwrap();
        assert_eq!(a.ensemble.cathode.raw, b.ensemble.cathode.raw);
        assert_ne!(a.ensemble.cathode.raw, c.ensemble.cathode.raw);
    }

    #[test]
    fn initial_potentials_cover_every_particle() {
        let mut config = CellConfig::default();
        config.sim.n_vol.anode = 3;
        let setup = CellSetup::from_config(config).unwrap();
        let mu = setup.initial_potentials(ElectrodeRole::Cathode).unwrap();
        assert_eq!(mu.len(), 20);
        assert!(mu.iter().all(|p| p.first().mu.iter().all(|m| m.is_finite())));
        let anode = setup.initial_potentials(ElectrodeRole::Anode).unwrap();
        assert_eq!(anode.len(), 6);
    }

    #[test]
    fn closures_are_bound_with_scaled_parameters() {
        let setup = CellSetup::from_config(CellConfig::default()).unwrap();
        let cp = setup.cathode.chemical_potential(0, 0).unwrap();
        assert_eq!(cp.params().omega_a, setup.params.cathode.omega[[0, 0]]);
        assert!(setup.cathode.chemical_potential(10, 0).is_none());
        let f = setup.cathode.closure(1, 1).unwrap();
        assert!(f(&FillingState::one(&[0.5], 0.5)).is_ok());
        assert_eq!((setup.cathode.transport_fn())(0.5), 0.25);
    }
}
