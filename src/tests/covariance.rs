use std::str::FromStr;

use nalgebra::Vector3;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use rstest::*;

use crate::{
    cfg::Config,
    navigation::{EpochInput, Matrix8, State, Vector8},
    prelude::{Engine, SV},
    tests::{init_logger, Satellite, Scenario, RX_POSITION_ECEF_M},
};

/// GNSS orbit radius (m)
const ORBIT_RADIUS_M: f64 = 26_560_000.0;

/// Random satellite in view of the receiver (elevation > 10°)
fn random_satellite(rng: &mut SmallRng, rx_pos: &Vector3<f64>, prn: usize) -> Satellite {
    let up = rx_pos.normalize();

    loop {
        let direction: Vector3<f64> = Vector3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );

        let norm = direction.norm();
        if !(0.1..=1.0).contains(&norm) {
            continue;
        }

        let position = direction / norm * ORBIT_RADIUS_M;
        let line_of_sight = (position - rx_pos).normalize();

        if line_of_sight.dot(&up) > 10.0_f64.to_radians().sin() {
            return Satellite {
                sv: SV::from_str(&format!("G{:02}", prn)).unwrap(),
                position_ecef_m: position,
                velocity_ecef_m_s: Vector3::new(
                    rng.random_range(-3_000.0..3_000.0),
                    rng.random_range(-3_000.0..3_000.0),
                    rng.random_range(-3_000.0..3_000.0),
                ),
            };
        }
    }
}

fn assert_symmetric_psd(p: &Matrix8, epoch: usize) {
    let tolerance = 1.0E-9 * p.amax().max(1.0);

    assert!(
        p.iter().all(|p| p.is_finite()),
        "epoch {}: non finite P",
        epoch
    );

    assert!(
        (p - p.transpose()).amax() <= tolerance,
        "epoch {}: asymmetric P {}",
        epoch,
        p
    );

    let min_eigenvalue = p.symmetric_eigenvalues().min();

    assert!(
        min_eigenvalue >= -tolerance,
        "epoch {}: negative eigenvalue {:.3E}",
        epoch,
        min_eigenvalue
    );
}

#[rstest]
#[case(0)]
#[case(42)]
#[case(1234)]
#[case(0xdead_beef)]
fn covariance_remains_psd(#[case] seed: u64) {
    init_logger();

    let mut rng = SmallRng::seed_from_u64(seed);

    let cfg = Config::default()
        .with_warmup_epochs(5)
        .with_initial_covariance_scale(rng.random_range(1.0..100.0));

    let rx_pos = Vector3::new(
        RX_POSITION_ECEF_M.0,
        RX_POSITION_ECEF_M.1,
        RX_POSITION_ECEF_M.2,
    );

    let truth = State::new(
        rx_pos,
        Vector3::new(
            rng.random_range(-20.0..20.0),
            rng.random_range(-20.0..20.0),
            rng.random_range(-5.0..5.0),
        ),
        rng.random_range(-1.0E-3..1.0E-3),
        0.0,
    );

    let n = rng.random_range(5..=10);

    let satellites = (0..n)
        .map(|i| random_satellite(&mut rng, &rx_pos, i + 1))
        .collect::<Vec<_>>();

    let mut scenario = Scenario::new(&cfg, 0)
        .with_truth(truth)
        .with_satellites(satellites);

    let mut engine = Engine::new(cfg.clone()).unwrap();

    let mut commands = Vec::new();
    let mut persisted = None;

    for epoch in 0..30 {
        let prior = scenario.exact_prior();
        scenario.advance();

        let process_noise = Vector8::from_fn(|_, _| rng.random_range(0.0..1.0E-1));

        let mut input = EpochInput::new(scenario.t, scenario.sample_counter, prior)
            .with_satellites(&scenario.noisy_measurements(&mut rng, 3.0, 0.1))
            .with_process_noise(process_noise);

        input.estimate = persisted.take();

        let output = engine.step(&input, &mut commands).unwrap();

        assert_symmetric_psd(&output.prediction.p, epoch);
        assert_symmetric_psd(&output.estimate.p, epoch);

        // the measurement update never increases the uncertainty
        for i in 0..8 {
            assert!(
                output.estimate.p[(i, i)] <= output.prediction.p[(i, i)] * (1.0 + 1.0E-9),
                "epoch {}: P[{},{}] increased",
                epoch,
                i,
                i
            );
        }

        persisted = Some(output.estimate);
    }

    assert_eq!(commands.len(), 30 * n);
}
