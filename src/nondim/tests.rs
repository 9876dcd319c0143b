// nondim/tests.rs
// Reference scales, derived invariants and the SI round trip

#[cfg(test)]
mod scales {
    use crate::config::{CellConfig, ElectrodeRole};
    use crate::nondim::*;
    use crate::particles::synthesize;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scaled(config: &CellConfig) -> NondimParams {
        let cell = synthesize(config, &mut StdRng::seed_from_u64(11)).unwrap();
        nondimensionalize(config, &cell).unwrap()
    }

    #[test]
    fn reference_scales_of_default_cell() {
        let config = CellConfig::default();
        let s = ReferenceScales::new(&config);
        let d_amb = 2.0 * 2.2e-10 * 2.94e-10 / (2.2e-10 + 2.94e-10);
        assert!((s.d_amb - d_amb).abs() < 1e-24);
        assert_eq!(s.l_ref, 50e-6);
        assert!((s.t_d - 50e-6 * 50e-6 / d_amb).abs() < 1e-9);
        assert_eq!(s.c_ref, 1000.0);
    }

    #[test]
    fn global_parameters_round_trip() {
        let config = CellConfig::default();
        let nd = scaled(&config);
        let s = &nd.scales;
        assert!((nd.t - 1.0).abs() < 1e-15);
        assert!((s.redim_temperature(nd.t) - 298.0).abs() < 1e-12);
        assert!((s.redim_c_rate(nd.currset) - config.sim.c_rate).abs() < 1e-12);
        assert!((s.redim_voltage(nd.vset) - config.sim.v_set).abs() < 1e-12);
        assert!((s.redim_time(nd.tend) - config.sim.t_end).abs() < 1e-9);
        assert!((s.redim_diffusivity(nd.dp) - config.electrolyte.dp).abs() < 1e-22);
        assert!((s.redim_diffusivity(nd.dm) - config.electrolyte.dm).abs() < 1e-22);
        assert!((s.redim_length(nd.l_separator) - 25e-6).abs() < 1e-18);
        assert!((s.redim_concentration(nd.c0) - config.electrolyte.c0).abs() < 1e-9);
        assert!((nd.tp - 2.2 / (2.2 + 2.94)).abs() < 1e-12);
        assert_eq!(nd.phi_cathode, 0.0);
        assert_eq!(nd.tsteps, config.sim.t_steps);
    }

    #[test]
    fn capacity_ratio_depends_on_anode_presence() {
        let mut config = CellConfig::default();
        assert_eq!(scaled(&config).z, 0.0);
        assert!(scaled(&config).anode.is_none());

        config.sim.n_vol.anode = 4;
        let nd = scaled(&config);
        let cap_c = 50e-6 * 0.6 * 0.69 * 1.3793e28;
        let cap_a = 88e-6 * 0.6 * 0.69 * 1.839e28;
        assert!((nd.z - cap_c / cap_a).abs() < 1e-12);
        assert!((nd.cathode.capacity - cap_c).abs() / cap_c < 1e-12);
        let anode = nd.electrode(ElectrodeRole::Anode).unwrap();
        assert_eq!(anode.dim(), (4, 2));
        assert_eq!(nd.electrodes().count(), 2);
    }

    #[test]
    fn volume_fractions_are_normalized() {
        let mut config = CellConfig::default();
        config.particles.cathode.stddev = 30e-9;
        config.sim.n_part.cathode = 4;
        let nd = scaled(&config);
        let c = &nd.cathode;
        assert!((c.vol_frac_tot.sum() - 1.0).abs() < 1e-12);
        for row in c.vol_frac_vol.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-12);
        }
    }
}

#[cfg(test)]
mod round_trip {
    use crate::config::CellConfig;
    use crate::nondim::*;
    use crate::particles::synthesize;
    use ndarray::Array2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn close(a: &Array2<f64>, b: &Array2<f64>) {
        assert_eq!(a.dim(), b.dim());
        for (x, y) in a.iter().zip(b.iter()) {
            let scale = x.abs().max(y.abs()).max(1e-300);
            assert!((x - y).abs() / scale < 1e-9, "{} vs {}", x, y);
        }
    }

    fn rich_config() -> CellConfig {
        let mut config = CellConfig::default();
        config.particles.cathode.stddev = 20e-9;
        config.materials.cathode.dgammasdc = 2.5e-30;
        config.conductivity.cathode.scond = 1e-7;
        config.conductivity.cathode.g_stddev = 3e-15;
        config.sim.n_vol.anode = 3;
        config.particles.anode.stddev = 15e-9;
        config
    }

    #[test]
    fn every_particle_quantity_redimensionalizes() {
        let config = rich_config();
        let cell = synthesize(&config, &mut StdRng::seed_from_u64(3)).unwrap();
        let nd = nondimensionalize(&config, &cell).unwrap();
        for params in nd.electrodes() {
            let role = params.role;
            let e = cell.get(role).unwrap();
            let m = config.materials.get(role);
            let rx = config.reactions.get(role);
            let dim = e.dim();
            let full = |v: f64| Array2::from_elem(dim, v);

            close(&params.redimensionalize(Quantity::Kappa), &full(m.kappa));
            close(&params.redimensionalize(Quantity::K0), &full(rx.k0));
            close(&params.redimensionalize(Quantity::Dsld), &full(m.dsld));
            close(&params.redimensionalize(Quantity::Omega), &full(m.omega_a));
            close(
                &params.redimensionalize(Quantity::Scond),
                &full(config.conductivity.get(role).scond),
            );
            close(&params.redimensionalize(Quantity::Conductance), &e.conductance);
            let v_over_a = &e.vol / &e.area;
            close(&params.redimensionalize(Quantity::DeltaL), &v_over_a);
            let lambda = rx.lambda / nd.scales.kt;
            let aa = full(rx.k0 / (erf(-0.5 * lambda.sqrt()) + 1.0));
            close(&params.redimensionalize(Quantity::MhcAa), &aa);

            let l = config.geometry.electrode(role).length;
            assert!((params.redimensionalize_scalar(ScalarQuantity::Length) - l).abs() / l < 1e-12);
            let lam = params.redimensionalize_scalar(ScalarQuantity::Lambda);
            assert!((lam - rx.lambda).abs() / rx.lambda < 1e-12);
            let mcond = config.conductivity.get(role).mcond;
            let back = params.redimensionalize_scalar(ScalarQuantity::Mcond);
            assert!((back - mcond).abs() / mcond < 1e-9);
        }
        let b = nd.cathode.redimensionalize_scalar(ScalarQuantity::B);
        assert!((b - 0.1916e9).abs() / 0.1916e9 < 1e-12);
        close(
            &nd.cathode.redimensionalize(Quantity::BetaS),
            &Array2::from_elem(nd.cathode.dim(), 2.5e-30),
        );
    }

    #[test]
    fn layered_interaction_energies_redimensionalize() {
        let mut config = rich_config();
        config.materials.anode.omega_b = 6.8e-21;
        config.materials.anode.omega_c = 3.1e-21;
        config.materials.anode.e_vdw = 1.2e-21;
        let cell = synthesize(&config, &mut StdRng::seed_from_u64(8)).unwrap();
        let nd = nondimensionalize(&config, &cell).unwrap();
        let anode = nd.anode.as_ref().unwrap();
        for (q, si) in [
            (ScalarQuantity::OmegaB, 6.8e-21),
            (ScalarQuantity::OmegaC, 3.1e-21),
            (ScalarQuantity::EVdw, 1.2e-21),
        ] {
            let back = anode.redimensionalize_scalar(q);
            assert!((back - si).abs() / si < 1e-12, "{:?}: {} vs {}", q, back, si);
        }
        assert!((anode.omega_b - 6.8e-21 / nd.scales.kt).abs() < 1e-12);
    }

    #[test]
    fn fitted_reference_redimensionalizes_to_its_ocv() {
        let mut config = CellConfig::default();
        config.materials.cathode.material = "NCA_ss1".to_string();
        config.materials.cathode.del_phi_eq_fit = true;
        config.particles.cathode.solid_type = "homog".to_string();
        config.particles.cathode.cs0 = 0.45;
        let cell = synthesize(&config, &mut StdRng::seed_from_u64(2)).unwrap();
        let nd = nondimensionalize(&config, &cell).unwrap();
        let ocv = crate::electrode::OcvFit::Nca.ocv(0.45);
        let back = nd.scales.redim_voltage(nd.cathode.dphi_eq_ref);
        assert!((back - ocv).abs() < 1e-9, "{} vs {}", back, ocv);
    }
}

#[cfg(test)]
mod derived {
    use crate::config::CellConfig;
    use crate::electrode::OcvFit;
    use crate::error::SetupError;
    use crate::nondim::*;
    use crate::particles::synthesize;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn erf_matches_tabulated_values() {
        assert!(erf(0.0).abs() < 1e-7);
        assert!((erf(1.0) - 0.842_700_79).abs() < 2e-7);
        assert!((erf(0.5) - 0.520_499_88).abs() < 2e-7);
        assert!((erf(-1.0) + erf(1.0)).abs() < 1e-15);
        assert!((erf(4.0) - 1.0).abs() < 1e-7);
    }

    #[test]
    fn nucleation_fit_is_clamped() {
        assert_eq!(size2regsln(10e-9), 2.0);
        assert_eq!(size2regsln(0.0), 2.0);
        let big = size2regsln(1e-6);
        assert!(big > 4.4 && big < 4.6, "{}", big);
    }

    #[test]
    fn size_dependent_nucleation_sets_omega_per_particle() {
        let mut config = CellConfig::default();
        config.particles.cathode.solid_type = "homog_sdn".to_string();
        config.particles.cathode.stddev = 200e-9;
        config.particles.cathode.mean = 400e-9;
        let cell = synthesize(&config, &mut StdRng::seed_from_u64(8)).unwrap();
        let nd = nondimensionalize(&config, &cell).unwrap();
        for (&w, &l) in nd.cathode.omega.iter().zip(cell.cathode.len.iter()) {
            assert!((w - size2regsln(l)).abs() < 1e-12);
            assert!(w >= 2.0);
        }
    }

    #[test]
    fn fitted_reference_uses_initial_filling() {
        let mut config = CellConfig::default();
        config.materials.cathode.material = "LiMn2O4_ss".to_string();
        config.materials.cathode.del_phi_eq_fit = true;
        config.particles.cathode.solid_type = "homog".to_string();
        config.particles.cathode.cs0 = 0.3;
        let cell = synthesize(&config, &mut StdRng::seed_from_u64(1)).unwrap();
        let nd = nondimensionalize(&config, &cell).unwrap();
        let expected = OcvFit::LiMn2O4.dphi_eq(0.3, &config.constants);
        assert!((nd.cathode.dphi_eq_ref - expected).abs() < 1e-12);
        assert_eq!(nd.cathode.material_params(0, 0).mu_r_ref, nd.cathode.dphi_eq_ref);
    }

    #[test]
    fn missing_fit_fails_with_material_error() {
        let mut config = CellConfig::default();
        config.materials.cathode.del_phi_eq_fit = true;
        let cell = synthesize(&config, &mut StdRng::seed_from_u64(1)).unwrap();
        assert!(matches!(
            nondimensionalize(&config, &cell),
            Err(SetupError::UnsupportedMaterial { .. })
        ));
    }

    #[test]
    fn degenerate_sizes_stay_finite() {
        let mut config = CellConfig::default();
        config.particles.cathode.mean = 0.0;
        config.reactions.cathode.lambda = 0.0;
        let cell = synthesize(&config, &mut StdRng::seed_from_u64(1)).unwrap();
        let nd = nondimensionalize(&config, &cell).unwrap();
        let c = &nd.cathode;
        for a in [&c.kappa, &c.k0, &c.delta_l, &c.mhc_aa, &c.dsld, &c.g, &c.vol_frac_tot] {
            assert!(a.iter().all(|x| x.is_finite()));
        }
    }

    #[test]
    fn zero_reorganization_energy_leaves_prefactor_near_k0() {
        let mut config = CellConfig::default();
        config.reactions.cathode.lambda = 0.0;
        let cell = synthesize(&config, &mut StdRng::seed_from_u64(1)).unwrap();
        let nd = nondimensionalize(&config, &cell).unwrap();
        for (&aa, &k0) in nd.cathode.mhc_aa.iter().zip(nd.cathode.k0.iter()) {
            assert!((aa - k0).abs() / k0 < 1e-6);
        }
    }
}
