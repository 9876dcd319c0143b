// particles/tests.rs
// Sampling laws and geometry invariants of the synthesized ensemble

#[cfg(test)]
mod sampling {
    use crate::config::{CellConfig, ElectrodeRole};
    use crate::particles::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn moment_matched_parameters_reproduce_arithmetic_moments() {
        let (mean, sd) = (100e-9, 25e-9);
        let (mu, sigma) = lognormal_params(mean, sd);
        let m = (mu + 0.5 * sigma * sigma).exp();
        let v = ((sigma * sigma).exp() - 1.0) * (2.0 * mu + sigma * sigma).exp();
        assert!((m - mean).abs() / mean < 1e-12);
        assert!((v.sqrt() - sd).abs() / sd < 1e-9);
    }

    #[test]
    fn zero_stddev_is_deterministic() {
        let mut config = CellConfig::default();
        config.particles.cathode.stddev = 0.0;
        config.conductivity.cathode.g_mean = 1e-14;
        config.conductivity.cathode.g_stddev = 0.0;
        let mut rng = StdRng::seed_from_u64(7);
        let cell = synthesize(&config, &mut rng).unwrap();
        assert!(cell.cathode.raw.iter().all(|&r| r == 100e-9));
        assert!(cell.cathode.conductance.iter().all(|&g| g == 1e-14));
    }

    #[test]
    fn zero_mean_gives_degenerate_sizes() {
        let a = sample_lognormal(0.0, 5.0, (3, 4), &mut StdRng::seed_from_u64(1)).unwrap();
        assert!(a.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn same_seed_same_ensemble() {
        let mut config = CellConfig::default();
        config.particles.cathode.stddev = 30e-9;
        config.conductivity.cathode.g_mean = 1e-14;
        config.conductivity.cathode.g_stddev = 1e-15;
        config.sim.n_vol.anode = 4;
        config.particles.anode.stddev = 1e-6;
        let a = synthesize(&config, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = synthesize(&config, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a.cathode.raw, b.cathode.raw);
        assert_eq!(a.cathode.conductance, b.cathode.conductance);
        assert_eq!(a.anode.as_ref().unwrap().raw, b.anode.as_ref().unwrap().raw);

        let c = synthesize(&config, &mut StdRng::seed_from_u64(43)).unwrap();
        assert_ne!(a.cathode.raw, c.cathode.raw);
    }

    #[test]
    fn sample_moments_converge() {
        let (mean, sd) = (100e-9, 20e-9);
        let mut rng = StdRng::seed_from_u64(2024);
        let a = sample_lognormal(mean, sd, (200, 200), &mut rng).unwrap();
        let n = a.len() as f64;
        let m = a.sum() / n;
        let s = (a.mapv(|x| (x - m) * (x - m)).sum() / (n - 1.0)).sqrt();
        assert!((m - mean).abs() / mean < 0.02, "mean {}", m);
        assert!((s - sd).abs() / sd < 0.05, "stddev {}", s);
        assert!(a.iter().all(|&x| x > 0.0));
    }

    #[test]
    fn cathode_only_scenario() {
        let mut config = CellConfig::default();
        config.sim.n_vol.cathode = 5;
        config.sim.n_vol.anode = 0;
        config.sim.n_part.cathode = 3;
        config.particles.cathode.mean = 100e-9;
        config.particles.cathode.stddev = 0.0;
        let cell = synthesize(&config, &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(cell.cathode.dim(), (5, 3));
        assert!(cell.cathode.raw.iter().all(|&r| r == 100e-9));
        assert!(cell.anode.is_none());
        assert!(cell.get(ElectrodeRole::Anode).is_none());
    }
}

#[cfg(test)]
mod geometry {
    use crate::config::{CellConfig, ElectrodeRole};
    use crate::geometry::{SolidShape, SolidType};
    use crate::particles::*;
    use ndarray::Array2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn front_tracking_lengths_are_multiples_of_step() {
        let mut config = CellConfig::default();
        config.particles.cathode.stddev = 40e-9;
        let step = config.particles.cathode.solid_disc;
        let cell = synthesize(&config, &mut StdRng::seed_from_u64(5)).unwrap();
        let e = &cell.cathode;
        assert_eq!(e.solid_type, SolidType::Acr);
        for ((&len, &n), &raw) in e.len.iter().zip(e.num.iter()).zip(e.raw.iter()) {
            let k = len / step;
            assert!((k - k.round()).abs() < 1e-6, "len {} not a multiple", len);
            assert_eq!(k.round() as usize, n);
            assert!(len >= raw - 1e-15);
        }
    }

    #[test]
    fn lumped_particles_keep_raw_length() {
        let mut config = CellConfig::default();
        config.sim.n_vol.anode = 3;
        config.particles.anode.stddev = 1e-6;
        let cell = synthesize(&config, &mut StdRng::seed_from_u64(9)).unwrap();
        let anode = cell.get(ElectrodeRole::Anode).unwrap();
        assert_eq!(anode.solid_type, SolidType::Homog);
        assert_eq!(anode.len, anode.raw);
        assert!(anode.num.iter().all(|&n| n == 1));
    }

    #[test]
    fn sphere_geometry_follows_radius() {
        let raw = Array2::from_elem((2, 2), 2e-6);
        let e = ParticleEnsemble::from_sizes(
            ElectrodeRole::Anode,
            SolidType::Homog,
            SolidShape::Sphere,
            1e-9,
            0.0,
            raw,
        );
        let r: f64 = 2e-6;
        for (&a, &v) in e.area.iter().zip(e.vol.iter()) {
            assert!((a - 4.0 * std::f64::consts::PI * r * r).abs() < 1e-24);
            assert!((v - 4.0 / 3.0 * std::f64::consts::PI * r.powi(3)).abs() < 1e-30);
        }
        let rows = e.row_volumes();
        assert_eq!(rows.len(), 2);
        assert!((rows[0] - 2.0 * e.vol[[0, 0]]).abs() < 1e-30);
    }

    #[test]
    fn unknown_shape_tag_is_a_configuration_error() {
        let mut config = CellConfig::default();
        config.particles.cathode.solid_shape = "dodecahedron".to_string();
        let err = synthesize(&config, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(err.to_string().contains("particles.cathode.solid_shape"));
    }
}
