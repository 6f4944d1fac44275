use cartpole_monitor::{
    ClockEvent, ForceEvent, MonitorError, StateEvent,
    config::Settings,
    engine::aggregator::Aggregator,
};

fn joint_state(cart_position: f64, pole_angle: f64) -> StateEvent {
    StateEvent {
        names: vec!["cart_to_base".into(), "pole_joint".into()],
        positions: vec![cart_position, pole_angle],
        velocities: vec![0.5, 0.0],
    }
}

fn fill(aggregator: &Aggregator, samples: usize, position: f64, force: f64) {
    for i in 0..samples {
        aggregator.on_clock(&ClockEvent::from_secs_f64(i as f64 * 0.005));
        aggregator
            .on_state(&joint_state(position, 0.01 * i as f64))
            .expect("valid state");
        aggregator.on_force(&ForceEvent { value: force });
    }
}

#[test]
fn too_few_samples_produce_no_report() {
    let aggregator = Aggregator::new(Settings::default());
    fill(&aggregator, 9, 0.2, 10.0);
    let err = aggregator.compute().expect_err("not enough data");
    assert!(matches!(
        err,
        MonitorError::InsufficientData { required: 10, .. }
    ));
    assert!(aggregator.report().is_none());
}

#[test]
fn one_short_series_blocks_the_report() {
    let aggregator = Aggregator::new(Settings::default());
    fill(&aggregator, 10, 0.2, 10.0);
    for _ in 0..20 {
        aggregator
            .on_state(&joint_state(0.2, 0.0))
            .expect("valid state");
    }
    assert!(aggregator.report().is_some());

    let forces_missing = Aggregator::new(Settings::default());
    for _ in 0..20 {
        forces_missing
            .on_state(&joint_state(0.2, 0.0))
            .expect("valid state");
    }
    assert!(forces_missing.report().is_none());
}

#[test]
fn rms_of_constant_position_is_its_magnitude() {
    let aggregator = Aggregator::new(Settings::default());
    fill(&aggregator, 12, -0.75, 20.0);
    let report = aggregator.compute().expect("report");
    assert!((report.rms_cart_position - 0.75).abs() < 1e-12);
}

#[test]
fn report_values_follow_history() {
    let aggregator = Aggregator::new(Settings::default());
    fill(&aggregator, 10, 0.1, -50.0);
    aggregator.on_force(&ForceEvent { value: 125.0 });
    let report = aggregator.compute().expect("report");

    assert!((report.max_pole_angle_deviation - 0.09).abs() < 1e-12);
    assert_eq!(report.peak_force, 125.0);
    assert!((report.efficiency_percent - 50.0).abs() < 1e-9);
    assert_eq!(report.avg_recovery_time, None);
}

#[test]
fn efficiency_is_clamped_at_zero_and_hundred() {
    let idle = Aggregator::new(Settings::default());
    fill(&idle, 10, 0.0, 0.0);
    assert_eq!(idle.compute().expect("report").efficiency_percent, 100.0);

    let saturated = Aggregator::new(Settings::default());
    fill(&saturated, 10, 0.0, 300.0);
    assert_eq!(saturated.compute().expect("report").efficiency_percent, 0.0);
}

#[test]
fn control_rate_is_scaled_and_classified() {
    let aggregator = Aggregator::new(Settings::default());
    fill(&aggregator, 20, 0.0, 1.0);
    let report = aggregator.compute().expect("report");
    let rate = report.control_rate_hz.expect("rate");
    assert!((rate - 50.0).abs() < 1e-6);
    assert_eq!(report.rate_healthy, Some(true));
}

#[test]
fn frozen_clock_yields_no_rate() {
    let aggregator = Aggregator::new(Settings::default());
    for _ in 0..10 {
        aggregator
            .on_state(&joint_state(0.0, 0.0))
            .expect("valid state");
        aggregator.on_force(&ForceEvent { value: 1.0 });
    }
    let report = aggregator.compute().expect("report");
    assert_eq!(report.control_rate_hz, None);
    assert_eq!(report.rate_healthy, None);
}

#[test]
fn clock_reset_reports_out_of_band_rate() {
    let aggregator = Aggregator::new(Settings::default());
    for i in 0..10 {
        aggregator.on_clock(&ClockEvent::from_secs_f64(10.0 + i as f64 * 0.005));
        aggregator
            .on_state(&joint_state(0.0, 0.0))
            .expect("valid state");
        aggregator.on_force(&ForceEvent { value: 1.0 });
    }
    aggregator.on_clock(&ClockEvent::from_secs_f64(0.0));
    aggregator.on_force(&ForceEvent { value: 1.0 });

    let report = aggregator.compute().expect("report");
    let rate = report.control_rate_hz.expect("negative rate is still reported");
    assert!((rate + 0.25).abs() < 1e-9);
    assert_eq!(report.rate_healthy, Some(false));
}

#[test]
fn repeated_reads_are_identical() {
    let aggregator = Aggregator::new(Settings::default());
    fill(&aggregator, 15, 0.3, 42.0);
    let first = aggregator.compute().expect("first");
    let second = aggregator.compute().expect("second");
    assert_eq!(first, second);
}

#[test]
fn report_survives_later_mutation() {
    let aggregator = Aggregator::new(Settings::default());
    fill(&aggregator, 10, 0.3, 42.0);
    let before = aggregator.compute().expect("report");
    aggregator.on_force(&ForceEvent { value: 240.0 });
    assert_eq!(before.peak_force, 42.0);
    assert_eq!(aggregator.compute().expect("report").peak_force, 240.0);
}
