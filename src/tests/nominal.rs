use rstest::*;

use crate::{
    cfg::Config,
    navigation::{Mode, Prior, State},
    prelude::{Engine, Vector3},
    tests::{init_logger, Satellite, Scenario},
};

#[test]
fn static_receiver_at_origin() {
    init_logger();

    let cfg = Config::default();
    let mut engine = Engine::new(cfg.clone()).unwrap();

    let scenario = Scenario::new(&cfg, 4).with_truth(State::default());

    let input = scenario.input(Prior::default());

    let mut commands = Vec::new();
    let output = engine.step(&input, &mut commands).unwrap();

    assert_eq!(output.mode, Mode::Warmup);
    assert_eq!(output.sample_counter, input.sample_counter);
    assert_eq!(output.t, input.t);
    assert_eq!(output.len(), 4);
    assert_eq!(commands.len(), 4);
    assert_eq!(engine.epochs(), 1);

    let position = output.pvt.fixed_rows::<3>(0);
    let velocity = output.pvt.fixed_rows::<3>(3);

    assert!(position.norm() < 1.0E-6, "position error {}", position.norm());
    assert!(velocity.norm() < 1.0E-6, "velocity error {}", velocity.norm());

    let (bias_s, drift_s_s) = output.clock_profile_s();
    assert!(bias_s.abs() < 1.0E-12);
    assert!(drift_s_s.abs() < 1.0E-12);

    for filtered in output.filtered.iter() {
        assert!(filtered.pseudo_range_residual_m.abs() < 1.0E-6);
        assert!(filtered.pseudo_range_rate_residual_m_s.abs() < 1.0E-6);
    }
}

#[rstest]
#[case(4)]
#[case(5)]
#[case(8)]
fn noiseless_convergence(#[case] n: usize) {
    init_logger();

    let cfg = Config::default()
        .with_measurement_variances(1.0E-8, 1.0E-8)
        .with_initial_covariance_scale(1.0E6);

    let c = cfg.speed_of_light_m_s;
    let dt_s = cfg.sampling_period.to_seconds();

    let mut engine = Engine::new(cfg.clone()).unwrap();

    let truth = State::new(
        Vector3::new(4_696_989.6, 723_994.2, 4_239_678.3),
        Vector3::new(10.0, -5.0, 2.0),
        1.0E-4,
        0.0,
    );

    // static satellites keep the rate linearization error negligible
    let mut scenario = Scenario::new(&cfg, n).with_truth(truth);

    let satellites = scenario
        .satellites
        .iter()
        .map(|sat| Satellite {
            velocity_ecef_m_s: Vector3::zeros(),
            ..*sat
        })
        .collect();

    scenario = scenario.with_satellites(satellites);

    // external solution is off by a few meters
    let prior = Prior::new(
        truth.position_ecef_m() + Vector3::new(3.0, -4.0, 5.0),
        truth.velocity_ecef_m_s() + Vector3::new(0.5, -0.5, 1.0),
        1.0E-4 + 1.0E-8,
    );

    scenario.advance();

    let input = scenario.input(prior);

    let mut commands = Vec::new();
    let output = engine.step(&input, &mut commands).unwrap();

    // prediction propagates the erroneous prior
    let expected = prior.position_ecef_m + prior.velocity_ecef_m_s * dt_s;
    assert!((output.prediction.state.position_ecef_m() - expected).norm() < 1.0E-6);

    let pos_err =
        (output.estimate.state.position_ecef_m() - scenario.truth.position_ecef_m()).norm();
    let vel_err =
        (output.estimate.state.velocity_ecef_m_s() - scenario.truth.velocity_ecef_m_s()).norm();

    let (bias_s, _) = output.clock_profile_s();
    let (truth_bias_s, _) = scenario.truth.clock_profile_s();
    let bias_err_m = (bias_s - truth_bias_s).abs() * c;

    assert!(pos_err < 1.0E-3, "position error {}", pos_err);
    assert!(vel_err < 1.0E-3, "velocity error {}", vel_err);
    assert!(bias_err_m < 1.0E-3, "clock error {}", bias_err_m);

    // uncertainty collapsed, and P remains positive semi definite
    for i in 0..6 {
        assert!(output.estimate.p[(i, i)] < 1.0E-3);
    }

    let min_eigenvalue = output.estimate.p.symmetric_eigenvalues().min();
    assert!(min_eigenvalue > -1.0E-6, "negative eigenvalue {:.3E}", min_eigenvalue);

    assert_eq!(commands.len(), n);
}

#[test]
fn commands_follow_input_order() {
    init_logger();

    let cfg = Config::default();
    let mut engine = Engine::new(cfg.clone()).unwrap();

    let mut scenario = Scenario::new(&cfg, 6);
    let mut commands = Vec::new();

    for epoch in 1..=3 {
        let prior = scenario.exact_prior();
        scenario.advance();

        let input = scenario.input(prior);
        let output = engine.step(&input, &mut commands).unwrap();

        // list keeps growing until drained by the caller
        assert_eq!(commands.len(), 6 * epoch);

        let emitted = &commands[6 * (epoch - 1)..];

        for ((cmd, sat), filtered) in emitted
            .iter()
            .zip(input.satellites.iter())
            .zip(output.filtered.iter())
        {
            assert_eq!(cmd.sv, sat.sv);
            assert_eq!(filtered.sv, sat.sv);
            assert_eq!(cmd.sample_counter, input.sample_counter);
            assert!(cmd.enable_carrier_nco_cmd);
            assert!(cmd.enable_code_nco_cmd);

            // consistent measurements: filtered Doppler matches measured Doppler
            assert!((cmd.carrier_freq_hz - sat.doppler_hz).abs() < 1.0E-3);
        }
    }

    commands.clear();

    let prior = scenario.exact_prior();
    scenario.advance();

    let input = scenario.input(prior);
    let _ = engine.step(&input, &mut commands).unwrap();
    assert_eq!(commands.len(), 6);
}
