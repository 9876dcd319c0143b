// electrode/potential.rs
// Chemical potential closures: homogeneous free-energy models plus the
// gradient/strain correction of spatially resolved particles.

use super::material::{Arity, MaterialType};
use crate::error::{SetupError, SetupResult};
use crate::geometry::{self, SolidShape, SolidType};
use crate::units::Constants;
use std::fmt;
use std::sync::Arc;

/// Filling fractions of a one-species particle and their volume average.
#[derive(Clone, Copy, Debug)]
pub struct OneSpeciesState<'a> {
    pub y: &'a [f64],
    pub ybar: f64,
}

/// Filling fractions of both sublattices of a two-species particle.
#[derive(Clone, Copy, Debug)]
pub struct TwoSpeciesState<'a> {
    pub y1: &'a [f64],
    pub y2: &'a [f64],
    pub ybar1: f64,
    pub ybar2: f64,
}

/// Local state handed to a closure. The arity lives in the variant.
#[derive(Clone, Copy, Debug)]
pub enum FillingState<'a> {
    One(OneSpeciesState<'a>),
    Two(TwoSpeciesState<'a>),
}

impl<'a> FillingState<'a> {
    pub fn one(y: &'a [f64], ybar: f64) -> Self {
        FillingState::One(OneSpeciesState { y, ybar })
    }

    pub fn two(y1: &'a [f64], y2: &'a [f64], ybar1: f64, ybar2: f64) -> Self {
        FillingState::Two(TwoSpeciesState { y1, y2, ybar1, ybar2 })
    }

    pub fn arity(&self) -> Arity {
        match self {
            FillingState::One(_) => Arity::One,
            FillingState::Two(_) => Arity::Two,
        }
    }

    /// Number of discretization points.
    pub fn len(&self) -> usize {
        match self {
            FillingState::One(s) => s.y.len(),
            FillingState::Two(s) => s.y1.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Chemical potential (units of kT) of one species, with its activity when
/// the model is thermodynamic.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeciesPotential {
    pub mu: Vec<f64>,
    pub activity: Option<Vec<f64>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Potential {
    One(SpeciesPotential),
    Two(SpeciesPotential, SpeciesPotential),
}

impl Potential {
    pub fn arity(&self) -> Arity {
        match self {
            Potential::One(_) => Arity::One,
            Potential::Two(..) => Arity::Two,
        }
    }

    /// First (or only) species.
    pub fn first(&self) -> &SpeciesPotential {
        match self {
            Potential::One(p) | Potential::Two(p, _) => p,
        }
    }
}

/// Non-dimensional material parameters captured by a closure.
/// Energies are in units of kT; `b` is B/(kT·ρs).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialParams {
    pub omega_a: f64,
    pub omega_b: f64,
    pub omega_c: f64,
    pub e_vdw: f64,
    pub b: f64,
    pub kappa: f64,
    pub beta_s: f64,
    /// Surface filling of C3 particles with fixed surface concentration
    pub cwet: f64,
    pub shape: SolidShape,
    pub solid_type: SolidType,
    /// Reference offset added to every μ (the equilibrium reference potential)
    pub mu_r_ref: f64,
}

impl MaterialParams {
    /// Lumped spherical particle with a single interaction parameter.
    pub fn homogeneous(omega_a: f64) -> Self {
        Self {
            omega_a,
            omega_b: 0.0,
            omega_c: 0.0,
            e_vdw: 0.0,
            b: 0.0,
            kappa: 0.0,
            beta_s: 0.0,
            cwet: 0.98,
            shape: SolidShape::Sphere,
            solid_type: SolidType::Homog,
            mu_r_ref: 0.0,
        }
    }
}

type ModelFn = fn(&ChemicalPotential, &FillingState<'_>) -> SetupResult<Potential>;

/// Opaque callable handed to the solver. Shared read-only across threads.
pub type ChemicalPotentialFn =
    Arc<dyn for<'a> Fn(&FillingState<'a>) -> SetupResult<Potential> + Send + Sync>;

fn share<F>(f: F) -> ChemicalPotentialFn
where
    F: for<'a, 'b> Fn(&'b FillingState<'a>) -> SetupResult<Potential> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A constitutive closure bound to one material, temperature and parameter set.
#[derive(Clone)]
pub struct ChemicalPotential {
    material: MaterialType,
    temperature: f64,
    eokt: f64,
    params: MaterialParams,
    model: ModelFn,
}

impl fmt::Debug for ChemicalPotential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChemicalPotential")
            .field("material", &self.material)
            .field("temperature", &self.temperature)
            .field("params", &self.params)
            .finish()
    }
}

impl ChemicalPotential {
    /// Look up `material` in the registry and bind it.
    pub fn resolve(
        material: &str,
        temperature: f64,
        constants: &Constants,
        params: MaterialParams,
    ) -> SetupResult<Self> {
        let material = MaterialType::from_tag(material)?;
        Ok(Self::new(material, temperature, constants, params))
    }

    pub fn new(
        material: MaterialType,
        temperature: f64,
        constants: &Constants,
        params: MaterialParams,
    ) -> Self {
        Self {
            material,
            temperature,
            eokt: constants.eokt(),
            params,
            model: model_for(material),
        }
    }

    pub fn material(&self) -> MaterialType {
        self.material
    }

    pub fn params(&self) -> &MaterialParams {
        &self.params
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Evaluate μ (and activity) at the given state. Pure.
    pub fn evaluate(&self, state: &FillingState<'_>) -> SetupResult<Potential> {
        let expected = self.material.arity();
        if state.arity() != expected {
            return Err(SetupError::shape_mismatch(
                self.material.tag(),
                format!(
                    "closure takes {:?}-species state, called with {:?}",
                    expected,
                    state.arity()
                ),
            ));
        }
        if let FillingState::Two(s) = state {
            if s.y1.len() != s.y2.len() {
                return Err(SetupError::shape_mismatch(
                    self.material.tag(),
                    format!("sublattice lengths differ: {} vs {}", s.y1.len(), s.y2.len()),
                ));
            }
        }
        (self.model)(self, state)
    }

    /// Wrap into the opaque callable the solver retains.
    pub fn into_fn(self) -> ChemicalPotentialFn {
        share(move |state| self.evaluate(state))
    }

    fn ideal_sln(&self, y: &[f64]) -> Vec<f64> {
        y.iter().map(|&v| self.temperature * (v / (1.0 - v)).ln()).collect()
    }

    fn reg_sln(&self, y: &[f64], omega: f64) -> Vec<f64> {
        y.iter()
            .map(|&v| self.temperature * (v / (1.0 - v)).ln() + omega * (1.0 - 2.0 * v))
            .collect()
    }

    fn activity(&self, mu: &[f64]) -> Vec<f64> {
        mu.iter().map(|m| (m / self.temperature).exp()).collect()
    }

    /// θ (in kT) plus the captured reference offset.
    fn offset(&self) -> f64 {
        let theta = self
            .material
            .standard_potential()
            .map(|v| -self.eokt * v)
            .unwrap_or(0.0);
        theta + self.params.mu_r_ref
    }

    /// μ and activity of a thermodynamic model from its homogeneous part.
    fn thermodynamic(&self, mut mu: Vec<f64>, correction: Vec<f64>) -> SpeciesPotential {
        for (m, c) in mu.iter_mut().zip(correction) {
            *m += c;
        }
        let activity = self.activity(&mu);
        let offset = self.offset();
        for m in mu.iter_mut() {
            *m += offset;
        }
        SpeciesPotential {
            mu,
            activity: Some(activity),
        }
    }

    fn non_homogeneous(&self, y: &[f64], ybar: f64) -> SetupResult<Vec<f64>> {
        let p = &self.params;
        let n = y.len();
        if p.solid_type.is_homogeneous() || n <= 1 {
            return Ok(vec![0.0; n]);
        }
        match p.shape {
            SolidShape::C3 => Ok(rect_fixed_surface(y, ybar, p.b, p.kappa, p.cwet)),
            SolidShape::Sphere | SolidShape::Cylinder => {
                if p.solid_type == SolidType::Acr {
                    return Err(SetupError::geometry(
                        p.shape.tag(),
                        p.solid_type.tag(),
                        format!(
                            "no front-tracking correction for round particles ({})",
                            self.material.tag()
                        ),
                    ));
                }
                let r = geometry::unit_solid_discretization(p.shape, n)
                    .r
                    .unwrap_or_default();
                let dr = r[1] - r[0];
                let curv = geometry::curvature(y, dr, &r, 1.0, p.beta_s, p.shape)?;
                Ok(y.iter()
                    .zip(curv)
                    .map(|(&v, k)| p.b * (v - ybar) - p.kappa * k)
                    .collect())
            }
        }
    }

    fn one_species<'s>(&self, state: &FillingState<'s>) -> SetupResult<OneSpeciesState<'s>> {
        match *state {
            FillingState::One(s) => Ok(s),
            FillingState::Two(_) => Err(SetupError::shape_mismatch(
                self.material.tag(),
                "expected one-species state",
            )),
        }
    }
}

/// μ = -κ∇²y + B(y - ȳ) on a uniform 1-D mesh with the surface pinned at `ywet`.
fn rect_fixed_surface(y: &[f64], ybar: f64, b: f64, kappa: f64, ywet: f64) -> Vec<f64> {
    let n = y.len();
    let dxs = 1.0 / n as f64;
    (0..n)
        .map(|i| {
            let left = if i == 0 { ywet } else { y[i - 1] };
            let right = if i == n - 1 { ywet } else { y[i + 1] };
            let curv = (left - 2.0 * y[i] + right) / (dxs * dxs);
            -kappa * curv + b * (y[i] - ybar)
        })
        .collect()
}

pub fn step_down(x: f64, xc: f64, delta: f64) -> f64 {
    0.5 * (-((x - xc) / delta).tanh() + 1.0)
}

pub fn step_up(x: f64, xc: f64, delta: f64) -> f64 {
    0.5 * (((x - xc) / delta).tanh() + 1.0)
}

const GRAPHITE_WIDTH: f64 = 5e-2;
const GRAPHITE_TAIL: f64 = 5e-2;
const GRAPHITE_SLOPE: f64 = 0.45;

fn graphite_staged(y: f64, omga: f64, omgb: f64) -> f64 {
    let l_tail = -GRAPHITE_TAIL / y.powf(0.85);
    let r_tail = GRAPHITE_TAIL / (1.0 - y).powf(0.85);
    let l_lin = GRAPHITE_SLOPE * omga * 4.0 * (0.26 - y) * step_down(y, 0.5, GRAPHITE_WIDTH);
    let r_lin =
        (GRAPHITE_SLOPE * omga * 4.0 * (0.74 - y) + omgb) * step_up(y, 0.5, GRAPHITE_WIDTH);
    l_tail + r_tail + l_lin + r_lin
}

fn graphite_low_filling(y: f64) -> f64 {
    (40.0 * (-(-y / 0.015).exp())
        + 0.75 * (((y - 0.17) / 0.02).tanh() - 1.0)
        + 1.0 * (((y - 0.22) / 0.040).tanh() - 1.0))
        * step_down(y, 0.35, GRAPHITE_WIDTH)
}

fn graphite_kinked(y: f64, omga: f64, omgb: f64) -> f64 {
    let w = GRAPHITE_WIDTH;
    let l_tail = -GRAPHITE_TAIL / y.powf(0.85);
    let r_tail = GRAPHITE_TAIL / (1.0 - y).powf(0.85);
    let l_lin = GRAPHITE_SLOPE
        * omga
        * 12.0
        * (0.40 - y)
        * step_down(y, 0.49, 0.9 * w)
        * step_up(y, 0.35, w);
    let r_lin = (GRAPHITE_SLOPE * omga * 4.0 * (0.74 - y) + omgb) * step_up(y, 0.5, w);
    graphite_low_filling(y) + l_tail + r_tail + l_lin + r_lin
}

fn graphite_soft(y: f64, omga: f64, omgb: f64) -> f64 {
    let w = GRAPHITE_WIDTH;
    let l_tail = -GRAPHITE_TAIL / y.powf(0.85);
    let r_tail = 10.0 * step_up(y, 1.0, 0.045);
    let l_lin = 0.15
        * omga
        * 12.0
        * (0.40 - y.powf(0.98))
        * step_down(y, 0.49, 0.9 * w)
        * step_up(y, 0.35, w);
    let r_lin = (0.1 * omga * 4.0 * (0.74 - y) + 0.90 * omgb) * step_up(y, 0.5, 0.4 * w);
    0.18 + graphite_low_filling(y) + l_tail + r_tail + l_lin + r_lin
}

fn model_for(material: MaterialType) -> ModelFn {
    match material {
        MaterialType::IdealSolution => ideal_solution,
        MaterialType::RegularSolution => regular_solution,
        MaterialType::RegularSolutionPs | MaterialType::LiFePO4 => phase_separating,
        MaterialType::LiC6 => two_layer_graphite,
        MaterialType::LiC6OneParam => graphite_staged_model,
        MaterialType::LiC6OneParam2 => graphite_kinked_model,
        MaterialType::LiC6OneParam3 => graphite_soft_model,
        MaterialType::LiMn2O4 | MaterialType::LiC6Coke | MaterialType::Nca => solid_solution,
    }
}

fn ideal_solution(cp: &ChemicalPotential, state: &FillingState<'_>) -> SetupResult<Potential> {
    let s = cp.one_species(state)?;
    let mu = cp.ideal_sln(s.y);
    Ok(Potential::One(cp.thermodynamic(mu, Vec::new())))
}

fn regular_solution(cp: &ChemicalPotential, state: &FillingState<'_>) -> SetupResult<Potential> {
    let s = cp.one_species(state)?;
    let mu = cp.reg_sln(s.y, cp.params.omega_a);
    Ok(Potential::One(cp.thermodynamic(mu, Vec::new())))
}

fn phase_separating(cp: &ChemicalPotential, state: &FillingState<'_>) -> SetupResult<Potential> {
    let s = cp.one_species(state)?;
    let mu = cp.reg_sln(s.y, cp.params.omega_a);
    let correction = cp.non_homogeneous(s.y, s.ybar)?;
    Ok(Potential::One(cp.thermodynamic(mu, correction)))
}

fn one_layer_graphite(
    cp: &ChemicalPotential,
    state: &FillingState<'_>,
    fit: fn(f64, f64, f64) -> f64,
) -> SetupResult<Potential> {
    let s = cp.one_species(state)?;
    let p = &cp.params;
    let mu = s.y.iter().map(|&v| fit(v, p.omega_a, p.omega_b)).collect();
    let correction = cp.non_homogeneous(s.y, s.ybar)?;
    Ok(Potential::One(cp.thermodynamic(mu, correction)))
}

fn graphite_staged_model(cp: &ChemicalPotential, state: &FillingState<'_>) -> SetupResult<Potential> {
    one_layer_graphite(cp, state, graphite_staged)
}

fn graphite_kinked_model(cp: &ChemicalPotential, state: &FillingState<'_>) -> SetupResult<Potential> {
    one_layer_graphite(cp, state, graphite_kinked)
}

fn graphite_soft_model(cp: &ChemicalPotential, state: &FillingState<'_>) -> SetupResult<Potential> {
    one_layer_graphite(cp, state, graphite_soft)
}

fn two_layer_graphite(cp: &ChemicalPotential, state: &FillingState<'_>) -> SetupResult<Potential> {
    let s = match *state {
        FillingState::Two(s) => s,
        FillingState::One(_) => {
            return Err(SetupError::shape_mismatch(
                cp.material.tag(),
                "expected two-species state",
            ))
        }
    };
    let p = &cp.params;
    if p.shape == SolidShape::C3 && !p.solid_type.is_homogeneous() && s.y1.len() > 1 {
        return Err(SetupError::geometry(
            p.shape.tag(),
            p.solid_type.tag(),
            format!("no two-species correction for C3 particles ({})", cp.material.tag()),
        ));
    }
    let mut mu1 = cp.reg_sln(s.y1, p.omega_a);
    let mut mu2 = cp.reg_sln(s.y2, p.omega_a);
    for i in 0..s.y1.len() {
        let (a, b) = (s.y1[i], s.y2[i]);
        mu1[i] += p.omega_b * b
            + p.omega_c * b * (1.0 - b) * (1.0 - 2.0 * a)
            + p.e_vdw * 30.0 * a * a * (1.0 - a) * (1.0 - a);
        mu2[i] += p.omega_b * a
            + p.omega_c * a * (1.0 - a) * (1.0 - 2.0 * b)
            + p.e_vdw * 30.0 * b * b * (1.0 - b) * (1.0 - b);
    }
    let c1 = cp.non_homogeneous(s.y1, s.ybar1)?;
    let c2 = cp.non_homogeneous(s.y2, s.ybar2)?;
    Ok(Potential::Two(
        cp.thermodynamic(mu1, c1),
        cp.thermodynamic(mu2, c2),
    ))
}

fn solid_solution(cp: &ChemicalPotential, state: &FillingState<'_>) -> SetupResult<Potential> {
    let s = cp.one_species(state)?;
    let fit = cp
        .material
        .ocv_fit()
        .ok_or_else(|| SetupError::material(cp.material.tag(), "no fitted equilibrium potential"))?;
    let mu = s
        .y
        .iter()
        .map(|&v| -cp.eokt * fit.ocv(v) + cp.params.mu_r_ref)
        .collect();
    Ok(Potential::One(SpeciesPotential { mu, activity: None }))
}
