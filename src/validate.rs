// validate.rs
// Consistency predicates run once before particle synthesis

use crate::config::{CellConfig, ElectrodeRole, ProfileType};
use crate::electrode::{MaterialType, OcvFit};
use crate::error::{SetupError, SetupResult};
use crate::geometry::{SolidShape, SolidType};
use crate::units::REFERENCE_TEMPERATURE;

const TEMPERATURE_TOLERANCE: f64 = 1e-9;

/// Reject physically inconsistent or unimplemented configurations.
///
/// Pure: reads the configuration only. The first violated constraint is
/// reported, naming its section and role.
pub fn validate(config: &CellConfig) -> SetupResult<()> {
    let at_reference = (config.sim.temperature - REFERENCE_TEMPERATURE).abs() < TEMPERATURE_TOLERANCE
        && (config.constants.t_ref - REFERENCE_TEMPERATURE).abs() < TEMPERATURE_TOLERANCE;
    if !at_reference {
        return Err(SetupError::config(
            "sim.temperature",
            format!(
                "temperature dependence unsupported away from the {} K reference (T = {}, Tref = {})",
                REFERENCE_TEMPERATURE, config.sim.temperature, config.constants.t_ref
            ),
        ));
    }
    if config.sim.n_vol.cathode < 1 {
        return Err(SetupError::config(
            "sim.n_vol.cathode",
            "at least one cathode volume required",
        ));
    }
    if ProfileType::from_tag(&config.sim.profile_type).is_none() {
        return Err(SetupError::config(
            "sim.profile_type",
            format!("unknown profile type '{}' (expected CC or CV)", config.sim.profile_type),
        ));
    }

    validate_transport_scales(config)?;

    for role in config.electrodes() {
        validate_electrode(config, role)?;
    }
    Ok(())
}

/// Inputs the reference scales divide by.
fn validate_transport_scales(config: &CellConfig) -> SetupResult<()> {
    let lyte = &config.electrolyte;
    check_positive("electrolyte.c0", lyte.c0)?;
    check_positive("electrolyte.dp", lyte.dp)?;
    check_positive("electrolyte.dm", lyte.dm)?;
    check_positive("electrolyte.zp", lyte.zp)?;
    check_positive("electrolyte.zm", lyte.zm)?;
    check_positive("geometry.cathode.length", config.geometry.cathode.length)?;
    let sep = config.geometry.separator_length;
    if !sep.is_finite() || sep < 0.0 {
        return Err(SetupError::config(
            "geometry.separator_length",
            format!("must be finite and non-negative, got {}", sep),
        ));
    }
    Ok(())
}

fn validate_electrode(config: &CellConfig, role: ElectrodeRole) -> SetupResult<()> {
    let particles = config.particles.get(role);
    let conductivity = config.conductivity.get(role);
    let material = config.materials.get(role);

    let solid_type = particles.solid_type(role)?;
    let shape = particles.solid_shape(role)?;
    config.reactions.get(role).rxn_type(role)?;
    material.transport(role)?;
    MaterialType::from_tag(&material.material)?;

    let geometry = config.geometry.electrode(role);
    check_positive(&format!("geometry.{}.length", role), geometry.length)?;
    if !(0.0..1.0).contains(&geometry.porosity) {
        return Err(SetupError::config(
            format!("geometry.{}.porosity", role),
            format!("porosity must lie in [0, 1), got {}", geometry.porosity),
        ));
    }
    if !geometry.loading.is_finite() || geometry.loading < 0.0 {
        return Err(SetupError::config(
            format!("geometry.{}.loading", role),
            format!("loading must be finite and non-negative, got {}", geometry.loading),
        ));
    }
    check_positive(&format!("materials.{}.rhos", role), material.rhos)?;

    if *config.sim.n_part.get(role) < 1 {
        return Err(SetupError::config(
            format!("sim.n_part.{}", role),
            "at least one particle per volume required",
        ));
    }
    check_moments(
        &format!("particles.{}", role),
        "particle size",
        particles.mean,
        particles.stddev,
    )?;
    check_moments(
        &format!("conductivity.{}", role),
        "conductance",
        conductivity.g_mean,
        conductivity.g_stddev,
    )?;
    if conductivity.g_stddev > 0.0 && conductivity.g_mean <= 0.0 {
        return Err(SetupError::config(
            format!("conductivity.{}.g_mean", role),
            "a distributed conductance needs a positive mean",
        ));
    }
    if !solid_type.is_homogeneous() && !(particles.solid_disc > 0.0) {
        return Err(SetupError::config(
            format!("particles.{}.solid_disc", role),
            format!("solid type {} needs a positive discretization step", solid_type),
        ));
    }

    if conductivity.sim_surf_cond && solid_type != SolidType::Acr {
        return Err(SetupError::config(
            format!("conductivity.{}.sim_surf_cond", role),
            "surface-conductance loss requires front-tracking solid type (ACR)",
        ));
    }
    if matches!(solid_type, SolidType::Acr | SolidType::HomogSdn) && shape != SolidShape::C3 {
        return Err(SetupError::config(
            format!("particles.{}.solid_shape", role),
            format!("solid type {} requires C3 particles, got {}", solid_type, shape),
        ));
    }
    if solid_type == SolidType::Chr && !shape.is_round() {
        return Err(SetupError::config(
            format!("particles.{}.solid_shape", role),
            format!("solid type CHR requires sphere or cylinder particles, got {}", shape),
        ));
    }
    if solid_type == SolidType::Diffn && shape != SolidShape::Sphere {
        return Err(SetupError::config(
            format!("particles.{}.solid_shape", role),
            format!("solid type diffn currently requires spheres, got {}", shape),
        ));
    }
    if material.del_phi_eq_fit {
        if !matches!(solid_type, SolidType::Diffn | SolidType::Homog) {
            return Err(SetupError::config(
                format!("materials.{}.del_phi_eq_fit", role),
                format!(
                    "fitted equilibrium for '{}' requires solid type diffn or homog, got {}",
                    material.material, solid_type
                ),
            ));
        }
        OcvFit::for_material(&material.material)?;
    }
    Ok(())
}

fn check_positive(location: &str, value: f64) -> SetupResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SetupError::config(
            location,
            format!("must be finite and positive, got {}", value),
        ))
    }
}

/// Mean and standard deviation must be finite and non-negative.
fn check_moments(section: &str, what: &str, mean: f64, stddev: f64) -> SetupResult<()> {
    if !mean.is_finite() || mean < 0.0 {
        return Err(SetupError::config(
            section,
            format!("{} mean must be finite and non-negative, got {}", what, mean),
        ));
    }
    if !stddev.is_finite() || stddev < 0.0 {
        return Err(SetupError::config(
            section,
            format!("{} stddev must be finite and non-negative, got {}", what, stddev),
        ));
    }
    Ok(())
}
