use pwsim::simulation::params::Parameters;
use pwsim::{
    integrate_ensemble, integrate_trajectory, DerivedRelations, Envelope, Grid, GuidingField,
    IntegratorConfig, PeriodBranch, Reference, Scenario, ScenarioConfig, SimError, Solver,
    VelocityField, WavePacket, PHASE_PREFACTOR,
};

use std::f64::consts::PI;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Squeezed packet used across the tests: hbar = m = omega = 1, sigma = 0.5, x0 = 4
pub fn squeezed_params() -> Parameters {
    Parameters::new(1.0, 1.0, 1.0, 0.5, 4.0, 0.0)
}

/// Same oscillator with a moving packet
pub fn moving_params(p0: f64) -> Parameters {
    Parameters::new(1.0, 1.0, 1.0, 1.0, 4.0, p0)
}

pub fn solver(method: IntegratorConfig) -> Solver {
    Solver {
        method,
        ..Solver::default()
    }
}

/// Parse and build a scenario from YAML text
pub fn scenario_from(yaml: &str) -> Result<Scenario, SimError> {
    let cfg: ScenarioConfig = serde_yaml::from_str(yaml).unwrap();
    Scenario::build_scenario(cfg)
}

struct Decay;
impl VelocityField for Decay {
    fn velocity(&self, _t: f64, x: f64) -> f64 {
        -x
    }
}

/// `x' = -x`, counting every evaluation
#[derive(Default)]
struct CountingDecay {
    calls: AtomicUsize,
}

impl CountingDecay {
    fn evaluations(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl VelocityField for CountingDecay {
    fn velocity(&self, _t: f64, x: f64) -> f64 {
        self.calls.fetch_add(1, Ordering::Relaxed);
        -x
    }
}

struct Blowup;
impl VelocityField for Blowup {
    fn velocity(&self, _t: f64, x: f64) -> f64 {
        x * x
    }
}

struct Broken;
impl VelocityField for Broken {
    fn velocity(&self, t: f64, _x: f64) -> f64 {
        if t > 0.5 {
            f64::NAN
        } else {
            1.0
        }
    }
}

// ==================================================================================
// Wave packet
// ==================================================================================

#[test]
fn packet_stays_normalized() {
    let packet = WavePacket::new(squeezed_params());
    let grid = Grid::linspace(-10.0, 10.0, 1000).unwrap();

    for t in [0.0, 0.3, PI / 2.0, 2.0, PI, 5.0, 2.0 * PI] {
        let norm = packet.probability(&grid, t);
        assert!((norm - 1.0).abs() < 1e-6, "norm at t = {t} is {norm}");
    }
}

#[test]
fn initial_modulus_is_the_prepared_gaussian() {
    let packet = WavePacket::new(squeezed_params());
    let grid = Grid::linspace(-10.0, 10.0, 1000).unwrap();
    let norm = (0.5 * (2.0 * PI).sqrt()).sqrt();

    for &x in grid.points() {
        let expected = (-0.25 * (x - 4.0).powi(2) / 0.25).exp() / norm;
        let got = packet.amplitude(x, 0.0).norm();
        assert!((got - expected).abs() < 1e-12, "x = {x}: {got} vs {expected}");
    }
}

#[test]
fn phase_factor_has_unit_modulus() {
    let envelope = Envelope::new(moving_params(0.7));
    for t in [0.0, 0.01, 1.0, PI, 4.0, 7.5] {
        for x in [-6.0, -1.0, 0.0, 2.5, 9.0] {
            let m = envelope.phase_factor(x, t).norm();
            assert!((m - 1.0).abs() < 1e-12, "|phase| at ({x}, {t}) is {m}");
        }
    }
}

#[test]
fn whole_period_uses_the_plane_wave_limit() {
    let p = moving_params(1.5);
    let envelope = Envelope::new(p);
    assert_eq!(envelope.branch(0.0), PeriodBranch::WholePeriod);

    let x = 2.0;
    let expected = num_complex::Complex64::from_polar(1.0, p.p0 * x / p.hbar) * PHASE_PREFACTOR;
    let got = envelope.phase_factor(x, 0.0);
    assert!((got - expected).norm() < 1e-15);

    assert_eq!(GuidingField::new(p).velocity(0.0, x), p.p0 / p.mass);
}

#[test]
fn half_period_reverses_the_classical_velocity() {
    let p = moving_params(1.5);
    let field = GuidingField::new(p);
    assert_eq!(Envelope::new(p).branch(PI), PeriodBranch::HalfPeriod);
    assert_eq!(field.velocity(PI, -3.0), -p.p0 / p.mass);
    assert_eq!(field.velocity(PI, 8.0), -p.p0 / p.mass);
}

#[test]
fn near_singular_times_use_the_general_branch() {
    let envelope = Envelope::new(squeezed_params());
    assert_eq!(envelope.branch(1e-9), PeriodBranch::General);
    assert_eq!(envelope.branch(PI + 1e-9), PeriodBranch::General);

    let mut loose = squeezed_params();
    loose.singularity_tol = 1e-6;
    assert_eq!(Envelope::new(loose).branch(PI + 1e-9), PeriodBranch::HalfPeriod);
}

// ==================================================================================
// Guiding field
// ==================================================================================

#[test]
fn velocity_is_the_phase_gradient() {
    let p = moving_params(0.8);
    let envelope = Envelope::new(p);
    let field = GuidingField::new(p);
    let h = 1e-5;

    for t in [0.4, 1.3, 2.9, 4.0] {
        for x in [-2.0, 0.5, 4.0, 6.0] {
            let grad = (envelope.phase(x + h, t) - envelope.phase(x - h, t)) / (2.0 * h);
            let v = field.velocity(t, x);
            assert!((p.hbar / p.mass * grad - v).abs() < 1e-6, "({x}, {t}): {grad} vs {v}");
        }
    }
}

#[test]
fn velocity_is_centroid_motion_plus_stretch() {
    let p = squeezed_params();
    let envelope = Envelope::new(p);
    let field = GuidingField::new(p);
    let h = 1e-5;

    for t in [0.4, 1.3, 2.9, 4.0] {
        let d_centroid = (envelope.centroid(t + h) - envelope.centroid(t - h)) / (2.0 * h);
        let d_width = (envelope.width(t + h) - envelope.width(t - h)) / (2.0 * h);
        for x in [-2.0, 0.5, 4.0, 6.0] {
            let expected = d_centroid + (x - envelope.centroid(t)) * d_width / envelope.width(t);
            let v = field.velocity(t, x);
            assert!((expected - v).abs() < 1e-6, "({x}, {t}): {expected} vs {v}");
        }
    }
}

/// Polynomial form before the common factor m*sin(wt) is cancelled
fn unsimplified_velocity(p: &Parameters, t: f64, x: f64) -> f64 {
    let (s, c) = (p.omega * t).sin_cos();
    let (m, w, hbar2, sigma4) = (p.mass, p.omega, p.hbar * p.hbar, p.sigma.powi(4));
    let den = 4.0 * c * c * m.powi(3) * w * w * s * sigma4 + hbar2 * m * s.powi(3);

    4.0 * c * m * m * w * w * p.p0 * s * sigma4 / den - hbar2 * m * w * s * s * p.x0 / den
        + x * (4.0 * c.powi(3) * m.powi(3) * w.powi(3) * sigma4 / den
            + c * hbar2 * m * w * s * s / den
            - 4.0 * c * m.powi(3) * w.powi(3) * sigma4 / den)
}

#[test]
fn velocity_matches_the_unsimplified_polynomial() {
    for p in [squeezed_params(), moving_params(-0.6), Parameters::new(2.0, 0.5, 1.3, 0.8, -1.0, 0.4)] {
        let field = GuidingField::new(p);
        for t in [0.4, 1.3, 2.9, 4.0, 9.0] {
            for x in [-2.0, 0.5, 4.0, 6.0] {
                let expected = unsimplified_velocity(&p, t, x);
                let v = field.velocity(t, x);
                assert!((expected - v).abs() < 1e-9 * (1.0 + v.abs()), "({x}, {t}): {expected} vs {v}");
            }
        }
    }
}

// ==================================================================================
// Integrators
// ==================================================================================

#[test]
fn both_integrators_solve_exponential_decay() {
    let times = Grid::time_grid(1.0, 11).unwrap();
    for method in [IntegratorConfig::Rk4, IntegratorConfig::Dopri5] {
        let xs = integrate_trajectory(&Decay, 1.0, &times, &solver(method)).unwrap();
        for (x, t) in xs.iter().zip(times.points()) {
            assert!((x - (-t).exp()).abs() < 1e-8, "{method:?} at t = {t}: {x}");
        }
    }
}

#[test]
fn centroid_trajectory_follows_the_classical_orbit() {
    let p = Parameters::new(1.0, 1.0, 1.0, 1.0, 5.0, 0.0);
    let field = GuidingField::new(p);
    let times = Grid::time_grid(10.0, 201).unwrap();

    let xs = integrate_trajectory(&field, 5.0, &times, &solver(IntegratorConfig::Dopri5)).unwrap();
    for (x, t) in xs.iter().zip(times.points()) {
        assert!((x - 5.0 * t.cos()).abs() < 1e-6, "t = {t}: {x}");
    }
}

#[test]
fn trajectories_match_the_analytic_reference() {
    let p = moving_params(0.5);
    let field = GuidingField::new(p);
    let reference = Reference::new(p);
    let times = Grid::time_grid(40.0, 1000).unwrap();
    let initial = Grid::linspace(4.0, 4.5, 10).unwrap().points().to_vec();
    let expected = reference.set(&initial, &times);

    for method in [IntegratorConfig::Rk4, IntegratorConfig::Dopri5] {
        let set = integrate_ensemble(&field, &initial, &times, &solver(method), false).unwrap();
        let dev = set.max_abs_deviation(&expected).unwrap();
        assert!(dev < 1e-5, "{method:?} deviates by {dev}");
    }
}

#[test]
fn parallel_and_serial_agree_exactly() {
    let field = GuidingField::new(squeezed_params());
    let times = Grid::time_grid(10.0, 100).unwrap();
    let initial = Grid::linspace(3.0, 5.0, 16).unwrap().points().to_vec();
    let s = solver(IntegratorConfig::Dopri5);

    let serial = integrate_ensemble(&field, &initial, &times, &s, false).unwrap();
    let parallel = integrate_ensemble(&field, &initial, &times, &s, true).unwrap();
    assert_eq!(serial.positions, parallel.positions);
    assert_eq!(serial.initial, initial);
}

#[test]
fn non_finite_velocity_is_reported() {
    let times = Grid::time_grid(1.0, 5).unwrap();
    for method in [IntegratorConfig::Rk4, IntegratorConfig::Dopri5] {
        let err = integrate_trajectory(&Broken, 0.0, &times, &solver(method)).unwrap_err();
        assert!(matches!(err, SimError::NonFinite { .. }), "{method:?}: {err:?}");
    }
}

#[test]
fn rk4_step_cap_is_enforced_before_stepping() {
    // a tiny step would need a million steps for one interval
    let field = CountingDecay::default();
    let times = Grid::time_grid(1.0, 2).unwrap();
    let s = Solver {
        method: IntegratorConfig::Rk4,
        h0: 1e-6,
        max_steps: 5,
        ..Solver::default()
    };
    let err = integrate_trajectory(&field, 1.0, &times, &s).unwrap_err();
    assert!(matches!(err, SimError::TooManySteps { max_steps: 5, .. }), "{err:?}");
    assert!(field.evaluations() <= 4 * 5, "{} evaluations", field.evaluations());
}

#[test]
fn rk4_step_cap_counts_across_intervals() {
    // two steps per interval; the second interval would take the total to 4
    let field = CountingDecay::default();
    let times = Grid::time_grid(1.0, 3).unwrap();
    let s = Solver {
        method: IntegratorConfig::Rk4,
        h0: 0.25,
        max_steps: 3,
        ..Solver::default()
    };
    let err = integrate_trajectory(&field, 1.0, &times, &s).unwrap_err();
    assert_eq!(err, SimError::TooManySteps { t: 0.5, max_steps: 3 });
    assert_eq!(field.evaluations(), 2 * 4);
}

#[test]
fn dopri5_step_cap_is_enforced() {
    let field = CountingDecay::default();
    let times = Grid::time_grid(10.0, 2).unwrap();
    let s = Solver {
        h0: 1e-3,
        atol: 1e-12,
        rtol: 1e-12,
        max_steps: 3,
        ..Solver::default()
    };
    let err = integrate_trajectory(&field, 1.0, &times, &s).unwrap_err();
    assert!(matches!(err, SimError::TooManySteps { max_steps: 3, .. }), "{err:?}");
    assert!(field.evaluations() <= 7 * 3, "{} evaluations", field.evaluations());
}

#[test]
fn blow_up_ends_in_step_size_underflow() {
    // x' = x^2 from x = 1 diverges at t = 1
    let times = Grid::time_grid(2.0, 2).unwrap();
    let err = integrate_trajectory(&Blowup, 1.0, &times, &solver(IntegratorConfig::Dopri5)).unwrap_err();
    match err {
        SimError::StepSizeUnderflow { t, .. } => assert!((t - 1.0).abs() < 1e-6, "t = {t}"),
        other => panic!("expected StepSizeUnderflow, got {other:?}"),
    }
}

#[test]
fn integrator_rejects_repeated_sample_times() {
    // spacing below one ulp of 1.0 collapses neighbouring points
    let times = Grid::linspace(1.0, 1.0 + 1e-15, 50).unwrap();
    assert_eq!(times.points()[0], times.points()[1]);

    for method in [IntegratorConfig::Rk4, IntegratorConfig::Dopri5] {
        let err = integrate_trajectory(&Decay, 1.0, &times, &solver(method)).unwrap_err();
        assert!(matches!(err, SimError::InvalidTimeGrid { .. }), "{method:?}: {err:?}");
    }
}

#[test]
fn decreasing_times_are_rejected() {
    let err = Grid::from_times(vec![0.0, 1.0, 0.5]).unwrap_err();
    assert!(matches!(err, SimError::InvalidTimeGrid { .. }));
}

// ==================================================================================
// Propagator cross-check
// ==================================================================================

#[test]
fn propagator_relations_match_the_closed_forms() {
    for p in [squeezed_params(), moving_params(1.2)] {
        let envelope = Envelope::new(p);
        let field = GuidingField::new(p);

        for t in [0.7, 2.0, 4.1] {
            let d = DerivedRelations::at(&p, t).unwrap();
            assert!((d.centroid - envelope.centroid(t)).abs() < 1e-9, "centroid at {t}");
            assert!((d.width - envelope.width(t)).abs() < 1e-9, "width at {t}");
            assert!((d.velocity_at_origin - field.velocity(t, 0.0)).abs() < 1e-9, "velocity at {t}");

            let stretch = field.velocity(t, 1.0) - field.velocity(t, 0.0);
            assert!((d.stretch_rate - stretch).abs() < 1e-9, "stretch at {t}");
        }
    }
}

#[test]
fn propagator_refuses_singular_times() {
    let err = DerivedRelations::at(&squeezed_params(), 2.0 * PI).unwrap_err();
    assert!(matches!(err, SimError::SingularTime { .. }));
}

// ==================================================================================
// Scenarios
// ==================================================================================

const PARAMETERS: &str = "
parameters:
  mass: 1.0
  omega: 1.0
  hbar: 1.0
  sigma: 1.0
  x0: 4.0
  p0: 0.0
";

#[test]
fn scenario_spreads_initial_positions_over_the_packet() {
    let yaml = format!(
        "{PARAMETERS}
trajectories:
  total_trajectories: 5
  total_time_steps: 50
  t_end: 5.0
  spread: 0.5
"
    );
    let scenario = scenario_from(&yaml).unwrap();
    assert_eq!(scenario.initial_positions, vec![4.0, 4.125, 4.25, 4.375, 4.5]);
    assert_eq!(scenario.times.len(), 50);
    assert_eq!(scenario.times.last(), 5.0);

    let set = scenario.integrate().unwrap();
    assert!(set.max_abs_deviation(&scenario.reference_set()).unwrap() < 1e-6);
}

#[test]
fn scenario_frame_times_step_by_dt() {
    let yaml = format!("{PARAMETERS}\nanimation: {{ dt: 0.5, frames: 4 }}\n");
    let scenario = scenario_from(&yaml).unwrap();
    assert_eq!(scenario.frame_times(), vec![0.0, 0.5, 1.0, 1.5]);

    let samples = scenario.packet_frames();
    assert_eq!(samples.values.shape(), (1000, 4));
}

#[test]
fn scenario_rejects_invalid_parameters() {
    let bad_mass = PARAMETERS.replace("mass: 1.0", "mass: -1.0");
    assert!(matches!(
        scenario_from(&bad_mass),
        Err(SimError::InvalidParameter { name: "mass", .. })
    ));

    let no_trajectories = format!("{PARAMETERS}\ntrajectories: {{ total_trajectories: 0 }}\n");
    assert!(matches!(
        scenario_from(&no_trajectories),
        Err(SimError::InvalidParameter { name: "total_trajectories", .. })
    ));

    let bad_time = format!("{PARAMETERS}\ntrajectories: {{ t_end: -1.0 }}\n");
    assert!(matches!(
        scenario_from(&bad_time),
        Err(SimError::InvalidTimeGrid { .. })
    ));

    let bad_grid = format!("{PARAMETERS}\ngrid: {{ grid_start: 1.0, grid_end: -1.0 }}\n");
    assert!(matches!(
        scenario_from(&bad_grid),
        Err(SimError::InvalidParameter { name: "grid_end", .. })
    ));

    let bad_solver = format!("{PARAMETERS}\nsolver: {{ atol: 0.0 }}\n");
    assert!(matches!(
        scenario_from(&bad_solver),
        Err(SimError::InvalidParameter { name: "atol", .. })
    ));
}
