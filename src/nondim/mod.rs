// nondim/mod.rs
// Parameter non-dimensionalizer: reference scales, global and per-electrode
// scaled parameters, and the inverse mapping back to SI.

use crate::config::{CellConfig, ElectrodeRole, PerElectrode, ProfileType, ReactionType, VolumeCounts};
use crate::electrode::{MaterialParams, MaterialType, OcvFit, Transport};
use crate::error::{SetupError, SetupResult};
use crate::geometry::{SolidShape, SolidType};
use crate::particles::{CellEnsemble, ParticleEnsemble};
use crate::units::{Constants, MOLAR, SECONDS_PER_HOUR};
use ndarray::{Array2, Axis, Zip};
use serde::Serialize;

/// Reference scales every scaled quantity is measured against.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ReferenceScales {
    /// Reference length Lref = cathode thickness (m)
    pub l_ref: f64,
    /// Ambipolar electrolyte diffusivity (m²/s)
    pub d_amb: f64,
    /// Diffusive time td = Lref²/Damb (s)
    pub t_d: f64,
    /// Thermal energy k·Tref (J)
    pub kt: f64,
    /// Thermal voltage k·Tref/e (V)
    pub v_thermal: f64,
    /// Reference concentration, 1 M (mol/m³)
    pub c_ref: f64,
    pub constants: Constants,
}

impl ReferenceScales {
    pub fn new(config: &CellConfig) -> Self {
        let el = &config.electrolyte;
        let constants = config.constants;
        let l_ref = config.geometry.cathode.length;
        let d_amb = ((el.zp + el.zm) * el.dp * el.dm) / (el.zp * el.dp + el.zm * el.dm);
        Self {
            l_ref,
            d_amb,
            t_d: l_ref * l_ref / d_amb,
            kt: constants.thermal_energy(),
            v_thermal: constants.thermal_voltage(),
            c_ref: MOLAR,
            constants,
        }
    }

    pub fn faraday(&self) -> f64 {
        self.constants.faraday()
    }

    pub fn redim_length(&self, l: f64) -> f64 {
        l * self.l_ref
    }

    pub fn redim_time(&self, t: f64) -> f64 {
        t * self.t_d
    }

    pub fn redim_voltage(&self, v: f64) -> f64 {
        v * self.v_thermal
    }

    pub fn redim_diffusivity(&self, d: f64) -> f64 {
        d * self.d_amb
    }

    pub fn redim_temperature(&self, t: f64) -> f64 {
        t * self.constants.t_ref
    }

    /// C-rate from the scaled current set point.
    pub fn redim_c_rate(&self, currset: f64) -> f64 {
        currset * SECONDS_PER_HOUR / self.t_d
    }

    pub fn redim_concentration(&self, c: f64) -> f64 {
        c * self.c_ref
    }
}

/// Per-particle array quantities that can be mapped back to SI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quantity {
    /// Gradient penalty (J/m)
    Kappa,
    /// Exchange rate constant (A/m²)
    K0,
    /// Surface energy gradient dγs/dc
    BetaS,
    /// Volume-to-area length V/A (m)
    DeltaL,
    /// MHC prefactor (A/m²)
    MhcAa,
    /// Surface conductivity (S)
    Scond,
    /// Solid diffusivity (m²/s)
    Dsld,
    /// Inter-particle conductance (S)
    Conductance,
    /// Regular solution parameter (J)
    Omega,
}

/// Scalar per-electrode quantities that can be mapped back to SI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarQuantity {
    /// Electrode thickness (m)
    Length,
    /// Reorganization energy (J)
    Lambda,
    /// Stress coefficient B (Pa)
    B,
    /// Bulk electronic conductivity (S/m)
    Mcond,
    /// Second regular solution parameter of layered materials (J)
    OmegaB,
    /// Third regular solution parameter of layered materials (J)
    OmegaC,
    /// Van der Waals interaction energy (J)
    EVdw,
}

/// Factors such that SI value = scaled value × factor.
#[derive(Clone, Debug, Serialize)]
pub struct ElectrodeScales {
    pub kappa: Array2<f64>,
    pub k0: Array2<f64>,
    pub beta_s: Array2<f64>,
    pub delta_l: Array2<f64>,
    pub scond: Array2<f64>,
    pub dsld: Array2<f64>,
    pub conductance: Array2<f64>,
    pub omega: f64,
    pub length: f64,
    pub lambda: f64,
    pub b: f64,
    pub mcond: f64,
}

/// Scaled parameters of one electrode.
#[derive(Clone, Debug, Serialize)]
pub struct ElectrodeParams {
    pub role: ElectrodeRole,
    pub material: MaterialType,
    pub transport: Transport,
    pub solid_type: SolidType,
    pub shape: SolidShape,
    pub rxn_type: ReactionType,
    pub sim_bulk_cond: bool,
    pub sim_part_cond: bool,
    pub sim_surf_cond: bool,
    /// Initial filling fraction
    pub cs0: f64,
    /// Maximum solid concentration ρs/N_A (mol/m³)
    pub csmax: f64,
    /// Capacity L·(1−ε)·P_L·ρs (sites/m²)
    pub capacity: f64,
    /// Standard voltage (V)
    pub vstd: f64,
    pub alpha: f64,
    pub cwet: f64,
    pub porosity: f64,
    pub loading: f64,
    /// L/Lref
    pub length: f64,
    pub epsbeta: f64,
    pub mcond: f64,
    pub dphi_eq_ref: f64,
    pub lambda: f64,
    pub mhc_erfstretch: f64,
    pub b: f64,
    pub omega_b: f64,
    pub omega_c: f64,
    pub e_vdw: f64,
    pub num: Array2<usize>,
    /// Particle volume over the electrode's total solid volume
    pub vol_frac_tot: Array2<f64>,
    /// Particle volume over its own volume row
    pub vol_frac_vol: Array2<f64>,
    pub kappa: Array2<f64>,
    pub k0: Array2<f64>,
    pub beta_s: Array2<f64>,
    pub delta_l: Array2<f64>,
    pub mhc_aa: Array2<f64>,
    pub scond: Array2<f64>,
    pub dsld: Array2<f64>,
    pub g: Array2<f64>,
    pub omega: Array2<f64>,
    pub scales: ElectrodeScales,
}

impl ElectrodeParams {
    /// SI values of a per-particle quantity.
    pub fn redimensionalize(&self, q: Quantity) -> Array2<f64> {
        let s = &self.scales;
        match q {
            Quantity::Kappa => &self.kappa * &s.kappa,
            Quantity::K0 => &self.k0 * &s.k0,
            Quantity::BetaS => &self.beta_s * &s.beta_s,
            Quantity::DeltaL => &self.delta_l * &s.delta_l,
            Quantity::MhcAa => &self.mhc_aa * &s.k0,
            Quantity::Scond => &self.scond * &s.scond,
            Quantity::Dsld => &self.dsld * &s.dsld,
            Quantity::Conductance => &self.g * &s.conductance,
            Quantity::Omega => self.omega.mapv(|w| w * s.omega),
        }
    }

    pub fn redimensionalize_scalar(&self, q: ScalarQuantity) -> f64 {
        let s = &self.scales;
        match q {
            ScalarQuantity::Length => self.length * s.length,
            ScalarQuantity::Lambda => self.lambda * s.lambda,
            ScalarQuantity::B => self.b * s.b,
            ScalarQuantity::Mcond => self.mcond * s.mcond,
            ScalarQuantity::OmegaB => self.omega_b * s.omega,
            ScalarQuantity::OmegaC => self.omega_c * s.omega,
            ScalarQuantity::EVdw => self.e_vdw * s.omega,
        }
    }

    /// (volumes, particles per volume)
    pub fn dim(&self) -> (usize, usize) {
        self.num.dim()
    }

    /// Parameter bundle captured by the chemical potential of particle (i, j).
    pub fn material_params(&self, i: usize, j: usize) -> MaterialParams {
        MaterialParams {
            omega_a: self.omega[[i, j]],
            omega_b: self.omega_b,
            omega_c: self.omega_c,
            e_vdw: self.e_vdw,
            b: self.b,
            kappa: self.kappa[[i, j]],
            beta_s: self.beta_s[[i, j]],
            cwet: self.cwet,
            shape: self.shape,
            solid_type: self.solid_type,
            mu_r_ref: self.dphi_eq_ref,
        }
    }
}

/// The full scaled parameter set handed to the solver.
#[derive(Clone, Debug, Serialize)]
pub struct NondimParams {
    pub scales: ReferenceScales,
    pub profile_type: ProfileType,
    /// Tabs/Tref
    pub t: f64,
    pub dp: f64,
    pub dm: f64,
    pub zp: f64,
    pub zm: f64,
    /// Cation transference number
    pub tp: f64,
    /// c0 in units of 1 M
    pub c0: f64,
    /// Cathode/anode capacity ratio, 0 against a lithium foil
    pub z: f64,
    pub phi_cathode: f64,
    pub currset: f64,
    pub vset: f64,
    pub tend: f64,
    pub tsteps: usize,
    pub cap_frac: f64,
    /// Separator thickness over Lref
    pub l_separator: f64,
    pub n_vol: VolumeCounts,
    pub n_part: PerElectrode<usize>,
    pub cathode: ElectrodeParams,
    pub anode: Option<ElectrodeParams>,
}

impl NondimParams {
    pub fn electrode(&self, role: ElectrodeRole) -> Option<&ElectrodeParams> {
        match role {
            ElectrodeRole::Cathode => Some(&self.cathode),
            ElectrodeRole::Anode => self.anode.as_ref(),
        }
    }

    pub fn electrodes(&self) -> impl Iterator<Item = &ElectrodeParams> {
        std::iter::once(&self.cathode).chain(self.anode.as_ref())
    }
}

/// Capacity L·(1−ε)·P_L·ρs of one electrode (sites per unit area).
pub fn electrode_capacity(config: &CellConfig, role: ElectrodeRole) -> f64 {
    let g = config.geometry.electrode(role);
    g.length * (1.0 - g.porosity) * g.loading * config.materials.get(role).rhos
}

/// Regular solution parameter whose nucleation barrier matches a C3 particle
/// of the given size (m). Clamped to a floor of 2.
pub fn size2regsln(size: f64) -> f64 {
    const P: [f64; 6] = [-1.168e4, 2985.0, -208.3, -8.491, -10.25, 4.516];
    let av = 3.6338 / (size * 1e9);
    let param = P.iter().fold(0.0, |acc, p| acc * av + p);
    // f64::max drops NaN from degenerate zero sizes
    param.max(2.0)
}

/// Error function, Abramowitz & Stegun 7.1.26 (|ε| < 1.5e-7).
pub fn erf(x: f64) -> f64 {
    if x < 0.0 {
        return -erf(-x);
    }
    let t = 1.0 / (1.0 + 0.3275911 * x);
    let poly = t
        * (0.254829592
            + t * (-0.284496736 + t * (1.421413741 + t * (-1.453152027 + t * 1.061405429))));
    1.0 - poly * (-x * x).exp()
}

fn safe_div(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Scale every physical quantity. Inputs must already be validated.
pub fn nondimensionalize(config: &CellConfig, ensemble: &CellEnsemble) -> SetupResult<NondimParams> {
    let scales = ReferenceScales::new(config);
    let el = &config.electrolyte;
    let sim = &config.sim;
    let profile_type = ProfileType::from_tag(&sim.profile_type).ok_or_else(|| {
        SetupError::config(
            "sim.profile_type",
            format!("unknown profile type '{}'", sim.profile_type),
        )
    })?;

    let cap_c = electrode_capacity(config, ElectrodeRole::Cathode);
    let z = if config.has_anode() {
        cap_c / electrode_capacity(config, ElectrodeRole::Anode)
    } else {
        0.0
    };

    let cathode = electrode_params(config, &scales, &ensemble.cathode)?;
    let anode = match &ensemble.anode {
        Some(e) => Some(electrode_params(config, &scales, e)?),
        None => None,
    };

    let params = NondimParams {
        scales,
        profile_type,
        t: sim.temperature / config.constants.t_ref,
        dp: el.dp / scales.d_amb,
        dm: el.dm / scales.d_amb,
        zp: el.zp,
        zm: el.zm,
        tp: el.zp * el.dp / (el.zp * el.dp + el.zm * el.dm),
        c0: el.c0 / MOLAR,
        z,
        phi_cathode: 0.0,
        currset: sim.c_rate * scales.t_d / SECONDS_PER_HOUR,
        vset: sim.v_set / scales.v_thermal,
        tend: sim.t_end / scales.t_d,
        tsteps: sim.t_steps,
        cap_frac: sim.cap_frac,
        l_separator: config.geometry.separator_length / scales.l_ref,
        n_vol: sim.n_vol,
        n_part: sim.n_part.clone(),
        cathode,
        anode,
    };

    #[cfg(feature = "setup_debug")]
    eprintln!(
        "[setup] Lref {:.3e} m, Damb {:.3e} m²/s, td {:.3e} s, z {:.4}",
        params.scales.l_ref, params.scales.d_amb, params.scales.t_d, params.z
    );

    Ok(params)
}

fn electrode_params(
    config: &CellConfig,
    scales: &ReferenceScales,
    ensemble: &ParticleEnsemble,
) -> SetupResult<ElectrodeParams> {
    let role = ensemble.role;
    let p = config.particles.get(role);
    let m = config.materials.get(role);
    let rx = config.reactions.get(role);
    let cond = config.conductivity.get(role);
    let geom = config.geometry.electrode(role);
    let c = &scales.constants;
    let kt = scales.kt;
    let td = scales.t_d;
    let faraday = scales.faraday();
    let c0 = config.electrolyte.c0;
    let t = config.sim.temperature / c.t_ref;

    let material = MaterialType::from_tag(&m.material)?;
    let transport = m.transport(role)?;
    let rxn_type = rx.rxn_type(role)?;
    let csmax = m.rhos / c.n_a;

    let dphi_eq_ref = if m.del_phi_eq_fit {
        OcvFit::for_material(&m.material)?.dphi_eq(p.cs0, c)
    } else {
        0.0
    };

    let total_vol: f64 = ensemble.vol.sum();
    let vol_frac_tot = ensemble.vol.mapv(|v| safe_div(v, total_vol));
    let row_vol = ensemble.vol.sum_axis(Axis(1));
    let mut vol_frac_vol = ensemble.vol.clone();
    for (mut row, &total) in vol_frac_vol.axis_iter_mut(Axis(0)).zip(row_vol.iter()) {
        row.mapv_inplace(|v| safe_div(v, total));
    }

    let len = &ensemble.len;
    let area = &ensemble.area;
    let vol = &ensemble.vol;

    let lambda = rx.lambda / kt;
    let mhc_erfstretch = 2.0 * lambda.sqrt();
    // −λ/(2√λ) written as −√λ/2 so λ = 0 stays finite
    let mhc_denom = erf(-0.5 * lambda.sqrt()) + 1.0;

    let kappa_scale = len.mapv(|l| kt * m.rhos * l * l);
    let kappa = kappa_scale.mapv(|s| safe_div(m.kappa, s));

    let k0_scale = Zip::from(area)
        .and(vol)
        .map_collect(|&a, &v| safe_div(faraday * csmax, safe_div(a, v) * td));
    let k0 = Zip::from(area)
        .and(vol)
        .map_collect(|&a, &v| safe_div(a, v) * rx.k0 * td / (faraday * csmax));
    let mhc_aa = k0.mapv(|k| k / mhc_denom);

    let beta_scale = len.mapv(|l| safe_div(m.kappa, l * m.rhos));
    let beta_s = len.mapv(|l| safe_div(m.dgammasdc * l * m.rhos, m.kappa));

    let delta_l = Zip::from(vol)
        .and(area)
        .and(len)
        .map_collect(|&v, &a, &l| safe_div(v, a * l));

    let scond_scale = len.mapv(|l| rx.k0 * c.e * l * l / kt);
    let scond = scond_scale.mapv(|s| safe_div(cond.scond, s));

    let dsld_scale = len.mapv(|l| l * l / td);
    let dsld = dsld_scale.mapv(|s| safe_div(m.dsld, s));

    let g_scale = vol.mapv(|v| faraday * csmax * v / (scales.v_thermal * td));
    let g = Zip::from(&ensemble.conductance)
        .and(&g_scale)
        .map_collect(|&g, &s| safe_div(g, s));

    let omega = match ensemble.solid_type {
        SolidType::HomogSdn => len.mapv(|l| t * size2regsln(l)),
        _ => Array2::from_elem(ensemble.dim(), m.omega_a / kt),
    };

    let mcond_scale = scales.l_ref * scales.l_ref * faraday * faraday * c0 / (td * c.k * c.n_a * c.t_ref);

    Ok(ElectrodeParams {
        role,
        material,
        transport,
        solid_type: ensemble.solid_type,
        shape: ensemble.shape,
        rxn_type,
        sim_bulk_cond: cond.sim_bulk_cond,
        sim_part_cond: cond.sim_part_cond,
        sim_surf_cond: cond.sim_surf_cond,
        cs0: p.cs0,
        csmax,
        capacity: electrode_capacity(config, role),
        vstd: m.vstd,
        alpha: rx.alpha,
        cwet: m.cwet,
        porosity: geom.porosity,
        loading: geom.loading,
        length: geom.length / scales.l_ref,
        epsbeta: (1.0 - geom.porosity) * geom.loading * csmax / c0,
        mcond: cond.mcond / mcond_scale,
        dphi_eq_ref,
        lambda,
        mhc_erfstretch,
        b: m.b / (kt * m.rhos),
        omega_b: m.omega_b / kt,
        omega_c: m.omega_c / kt,
        e_vdw: m.e_vdw / kt,
        num: ensemble.num.clone(),
        vol_frac_tot,
        vol_frac_vol,
        kappa,
        k0,
        beta_s,
        delta_l,
        mhc_aa,
        scond,
        dsld,
        g,
        omega,
        scales: ElectrodeScales {
            kappa: kappa_scale,
            k0: k0_scale,
            beta_s: beta_scale,
            delta_l: len.clone(),
            scond: scond_scale,
            dsld: dsld_scale,
            conductance: g_scale,
            omega: kt,
            length: scales.l_ref,
            lambda: kt,
            b: kt * m.rhos,
            mcond: mcond_scale,
        },
    })
}

#[cfg(test)]
mod tests;
