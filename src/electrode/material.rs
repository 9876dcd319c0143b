// electrode/material.rs
// Closed registry of active materials that have a chemical potential model

use super::ocv_fits::OcvFit;
use crate::error::{SetupError, SetupResult};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of intercalating species (sublattices) tracked per site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arity {
    One,
    Two,
}

/// Known active materials
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialType {
    /// Ideal solution test material
    IdealSolution,
    /// Homogeneous regular solution test material
    RegularSolution,
    /// Phase-separating regular solution with gradient/strain correction
    RegularSolutionPs,
    /// Lithium iron phosphate, regular solution
    LiFePO4,
    /// Two-layer graphite with staging interactions
    LiC6,
    /// Single-layer graphite, staged empirical fit
    LiC6OneParam,
    /// Single-layer graphite, staged fit with a low-filling kink
    LiC6OneParam2,
    /// Single-layer graphite, low-hysteresis fit with a soft tail
    LiC6OneParam3,
    /// Spinel LiMn2O4 solid solution from its OCV fit
    LiMn2O4,
    /// Petroleum-coke LiC6 solid solution from its OCV fit
    LiC6Coke,
    /// NCA solid solution from its OCV fit
    Nca,
}

/// All registered materials.
pub const MATERIALS: &[MaterialType] = &[
    MaterialType::IdealSolution,
    MaterialType::RegularSolution,
    MaterialType::RegularSolutionPs,
    MaterialType::LiFePO4,
    MaterialType::LiC6,
    MaterialType::LiC6OneParam,
    MaterialType::LiC6OneParam2,
    MaterialType::LiC6OneParam3,
    MaterialType::LiMn2O4,
    MaterialType::LiC6Coke,
    MaterialType::Nca,
];

/// Material identifier → material, including the short fit names.
pub static MATERIAL_REGISTRY: Lazy<HashMap<&'static str, MaterialType>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for &material in MATERIALS {
        m.insert(material.tag(), material);
    }
    m.insert("LiMn2O4", MaterialType::LiMn2O4);
    m.insert("NCA1", MaterialType::Nca);
    m
});

impl MaterialType {
    /// Resolve a material identifier. Unknown identifiers are rejected here,
    /// at setup, never at first use.
    pub fn from_tag(tag: &str) -> SetupResult<Self> {
        MATERIAL_REGISTRY.get(tag).copied().ok_or_else(|| {
            SetupError::material(tag, "no chemical potential model registered")
        })
    }

    pub fn tag(&self) -> &'static str {
        match self {
            MaterialType::IdealSolution => "testIS_ss",
            MaterialType::RegularSolution => "testRS",
            MaterialType::RegularSolutionPs => "testRS_ps",
            MaterialType::LiFePO4 => "LiFePO4",
            MaterialType::LiC6 => "LiC6",
            MaterialType::LiC6OneParam => "LiC6_1param",
            MaterialType::LiC6OneParam2 => "LiC6_1param_2",
            MaterialType::LiC6OneParam3 => "LiC6_1param_3",
            MaterialType::LiMn2O4 => "LiMn2O4_ss",
            MaterialType::LiC6Coke => "LiC6_coke_ss",
            MaterialType::Nca => "NCA_ss1",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            MaterialType::LiC6 => Arity::Two,
            _ => Arity::One,
        }
    }

    /// Standard potential θ (V vs Li) folded into the chemical potential.
    pub fn standard_potential(&self) -> Option<f64> {
        match self {
            MaterialType::LiFePO4 => Some(3.422),
            MaterialType::LiC6
            | MaterialType::LiC6OneParam
            | MaterialType::LiC6OneParam2
            | MaterialType::LiC6OneParam3 => Some(0.12),
            _ => None,
        }
    }

    /// Solid-solution materials derive μ directly from an OCV fit.
    pub fn ocv_fit(&self) -> Option<OcvFit> {
        match self {
            MaterialType::LiMn2O4 => Some(OcvFit::LiMn2O4),
            MaterialType::LiC6Coke => Some(OcvFit::LiC6Coke),
            MaterialType::Nca => Some(OcvFit::Nca),
            _ => None,
        }
    }

    /// Thermodynamic models report an activity alongside μ; OCV fits do not.
    pub fn has_activity(&self) -> bool {
        self.ocv_fit().is_none()
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MaterialType::IdealSolution => "Ideal solution (test)",
            MaterialType::RegularSolution => "Regular solution (test)",
            MaterialType::RegularSolutionPs => "Phase-separating regular solution (test)",
            MaterialType::LiFePO4 => "LFP (LiFePO₄)",
            MaterialType::LiC6 => "Graphite, two-layer (LiC₆)",
            MaterialType::LiC6OneParam => "Graphite, staged fit",
            MaterialType::LiC6OneParam2 => "Graphite, kinked fit",
            MaterialType::LiC6OneParam3 => "Graphite, soft-tail fit",
            MaterialType::LiMn2O4 => "Spinel (LiMn₂O₄)",
            MaterialType::LiC6Coke => "Coke (LiC₆)",
            MaterialType::Nca => "NCA (LiNiCoAlO₂)",
        }
    }
}
