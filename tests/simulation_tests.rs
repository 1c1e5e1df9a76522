#[cfg(test)]
mod tests {
    use dilation_engine::*;
    use dilation_engine::stats::STRUCTURE_EPSILON;

    // ========== Stub Transforms ==========

    struct Identity;

    impl PropagationTransform for Identity {
        fn propagate(&mut self, pattern: &[f64], _: f64, _: f64) -> Result<Vec<f64>, TransformError> {
            Ok(pattern.to_vec())
        }
    }

    /// Identity that logs every call's arguments.
    #[derive(Default)]
    struct Counting {
        calls: Vec<(f64, f64)>,
    }

    impl PropagationTransform for Counting {
        fn propagate(&mut self, pattern: &[f64], distance: f64, ratio: f64) -> Result<Vec<f64>, TransformError> {
            self.calls.push((distance, ratio));
            Ok(pattern.to_vec())
        }
    }

    struct Zeroing;

    impl PropagationTransform for Zeroing {
        fn propagate(&mut self, pattern: &[f64], _: f64, _: f64) -> Result<Vec<f64>, TransformError> {
            Ok(vec![0.0; pattern.len()])
        }
    }

    struct Doubling;

    impl PropagationTransform for Doubling {
        fn propagate(&mut self, pattern: &[f64], _: f64, _: f64) -> Result<Vec<f64>, TransformError> {
            Ok(pattern.iter().map(|x| x * 2.0).collect())
        }
    }

    /// Fails on call number `fail_at` (1-based).
    struct FailsAt {
        fail_at: usize,
        calls: usize,
    }

    impl PropagationTransform for FailsAt {
        fn propagate(&mut self, pattern: &[f64], _: f64, _: f64) -> Result<Vec<f64>, TransformError> {
            self.calls += 1;
            if self.calls == self.fail_at {
                return Err(TransformError::NonFinite { index: 0 });
            }
            Ok(pattern.to_vec())
        }
    }

    struct Truncating;

    impl PropagationTransform for Truncating {
        fn propagate(&mut self, pattern: &[f64], _: f64, _: f64) -> Result<Vec<f64>, TransformError> {
            Ok(pattern[1..].to_vec())
        }
    }

    fn params(size: usize, steps: usize, dilation: usize) -> SimulationParameters {
        SimulationParameters::default()
            .with_pattern_size(size)
            .with_external_steps(steps)
            .with_dilation_factor(dilation)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * a.abs().max(b.abs()).max(1.0)
    }

    // ========== Invocation Counts ==========

    #[test]
    fn test_invocation_counts_per_zone() {
        let mut counting = Counting::default();
        {
            let mut sim = DualRateSimulator::with_transform(params(6, 5, 4), &mut counting)
                .expect("construct");
            let result = sim.run(None).expect("run");
            assert_eq!(result.flat.invocations, 5);
            assert_eq!(result.dilated.zone.invocations, 20);
        }
        assert_eq!(counting.calls.len(), 25);

        // Flat calls come first, at full distance and the flat ratio
        for &(distance, ratio) in &counting.calls[..5] {
            assert_eq!(distance, 1.0);
            assert_eq!(ratio, 0.5);
        }
        for &(distance, ratio) in &counting.calls[5..] {
            assert_eq!(distance, 0.25);
            assert_eq!(ratio, 0.2);
        }
    }

    #[test]
    fn test_dilated_distance_sums_to_one_per_external_step() {
        let mut counting = Counting::default();
        DualRateSimulator::with_transform(params(3, 1, 7), &mut counting)
            .expect("construct")
            .run(None)
            .expect("run");
        let dilated_total: f64 = counting.calls[1..].iter().map(|(d, _)| d).sum();
        assert!(close(dilated_total, 1.0), "total dilated distance {}", dilated_total);
    }

    // ========== Identity Transform ==========

    #[test]
    fn test_identity_accumulates_fixed_term() {
        let mut sim = DualRateSimulator::with_transform(params(10, 4, 6), Identity).expect("construct");
        let initial = sim.generate_initial_pattern();
        let result = sim.run(Some(&initial)).expect("run");

        let term = result.initial_mean_abs + (result.initial_variance + STRUCTURE_EPSILON).sqrt();
        assert!(close(result.flat.accumulated_computation, 4.0 * term));
        assert!(close(result.dilated.zone.accumulated_computation, 24.0 * term));
        assert!(close(result.performance_ratio_vs_flat(), 6.0));

        // Identity leaves the pattern untouched in both zones
        assert_eq!(result.flat.final_mean_abs, result.initial_mean_abs);
        assert_eq!(result.dilated.zone.final_variance, result.initial_variance);
    }

    #[test]
    fn test_alternating_pattern_scenario() {
        let initial = [1.0, -1.0, 1.0, -1.0, 1.0];
        let mut sim = DualRateSimulator::with_transform(params(5, 2, 3), Identity).expect("construct");
        let result = sim.run(Some(&initial)).expect("run");

        assert_eq!(result.initial_mean_abs, 1.0);
        // mean is 0.2, so the population variance is 1 - 0.04
        assert!(close(result.initial_variance, 0.96));

        let term = 1.0 + (0.96_f64 + STRUCTURE_EPSILON).sqrt();
        assert!(close(result.flat.accumulated_computation, 2.0 * term));
        assert!(close(result.dilated.zone.accumulated_computation, 6.0 * term));
        assert!(close(result.performance_ratio_vs_flat(), 3.0));
    }

    #[test]
    fn test_unit_dilation_matches_flat() {
        let mut sim = DualRateSimulator::with_transform(params(8, 3, 1), Identity).expect("construct");
        let result = sim.run(None).expect("run");
        assert_eq!(result.flat, result.dilated.zone);
        assert_eq!(result.performance_ratio_vs_flat(), 1.0);
    }

    // ========== Degenerate Accumulators ==========

    #[test]
    fn test_zero_output_still_scores_epsilon() {
        let mut sim = DualRateSimulator::with_transform(params(4, 3, 2), Zeroing).expect("construct");
        let result = sim.run(None).expect("run");
        let floor = STRUCTURE_EPSILON.sqrt();
        assert!(close(result.flat.accumulated_computation, 3.0 * floor));
        assert!(close(result.dilated.zone.accumulated_computation, 6.0 * floor));
        assert!(result.performance_ratio_vs_flat().is_finite());
        assert_eq!(result.flat.final_mean_abs, 0.0);
    }

    #[test]
    fn test_zero_flat_accumulator_gives_infinite_ratio() {
        assert_eq!(performance_ratio(4.2, 0.0), f64::INFINITY);
        assert!(performance_ratio(4.2, 0.0).is_sign_positive());
    }

    // ========== Zone Independence ==========

    #[test]
    fn test_zones_start_from_same_pattern() {
        let initial = vec![0.1, 0.2, 0.3, 0.4];
        let mut sim = DualRateSimulator::with_transform(params(4, 2, 2), Doubling).expect("construct");
        let result = sim.run(Some(&initial)).expect("run");

        // flat: 2 doublings; dilated: 4 doublings, both from the initial pattern
        let base = 0.25;
        assert!(close(result.flat.final_mean_abs, base * 4.0));
        assert!(close(result.dilated.zone.final_mean_abs, base * 16.0));
        assert_eq!(initial, vec![0.1, 0.2, 0.3, 0.4]);
    }

    // ========== Errors ==========

    #[test]
    fn test_zero_parameters_fail_at_construction() {
        assert!(matches!(
            DualRateSimulator::with_transform(params(0, 1, 1), Identity),
            Err(ConfigError::ZeroPatternSize)
        ));
        assert!(matches!(
            DualRateSimulator::with_transform(params(1, 0, 1), Identity),
            Err(ConfigError::ZeroExternalSteps)
        ));
        assert!(matches!(
            DualRateSimulator::new(params(1, 1, 0)),
            Err(ConfigError::ZeroDilationFactor)
        ));
    }

    #[test]
    fn test_transform_failure_propagates_unchanged() {
        // Fails inside the dilated zone, after the flat zone completed
        let failing = FailsAt { fail_at: 4, calls: 0 };
        let mut sim = DualRateSimulator::with_transform(params(3, 2, 2), failing).expect("construct");
        let err = sim.run(None).expect_err("run should fail");
        assert!(matches!(
            err,
            SimulationError::Transform(TransformError::NonFinite { index: 0 })
        ));
        assert_eq!(err.to_string(), "pattern element 0 is not finite");
        assert_eq!(sim.transform().calls, 4);
    }

    #[test]
    fn test_length_changing_transform_is_rejected() {
        let mut sim = DualRateSimulator::with_transform(params(3, 1, 1), Truncating).expect("construct");
        let err = sim.run(None).expect_err("run should fail");
        assert!(matches!(
            err,
            SimulationError::TransformLength { zone: Zone::Flat, expected: 3, actual: 2 }
        ));
    }

    #[test]
    fn test_default_transform_rejects_non_finite_pattern() {
        let mut sim = DualRateSimulator::new(params(3, 1, 1)).expect("construct");
        let err = sim.run(Some(&[0.1, f64::INFINITY, 0.2])).expect_err("run should fail");
        assert!(matches!(
            err,
            SimulationError::Transform(TransformError::NonFinite { index: 1 })
        ));
    }

    // ========== Reproducibility ==========

    #[test]
    fn test_same_seed_bit_identical_with_identity() {
        let p = params(32, 5, 3).with_seed(Some(1234));
        let a = DualRateSimulator::with_transform(p.clone(), Identity).expect("a").run(None).expect("a");
        let b = DualRateSimulator::with_transform(p, Identity).expect("b").run(None).expect("b");
        assert_eq!(a, b);
    }

    #[test]
    fn test_same_seed_bit_identical_with_default_transform() {
        let p = params(64, 10, 5).with_seed(Some(42));
        let a = DualRateSimulator::new(p.clone()).expect("a").run(None).expect("a");
        let b = DualRateSimulator::new(p).expect("b").run(None).expect("b");
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let a = DualRateSimulator::new(params(64, 4, 4).with_seed(Some(1))).expect("a").run(None).expect("a");
        let b = DualRateSimulator::new(params(64, 4, 4).with_seed(Some(2))).expect("b").run(None).expect("b");
        assert_ne!(a.initial_mean_abs, b.initial_mean_abs);
    }

    #[test]
    fn test_entropy_seed_is_recorded_and_replayable() {
        let mut sim = DualRateSimulator::new(params(16, 3, 3).with_seed(None)).expect("construct");
        let first = sim.run(None).expect("run");
        let replay = DualRateSimulator::new(params(16, 3, 3).with_seed(Some(first.seed)))
            .expect("replay")
            .run(None)
            .expect("replay");
        assert_eq!(first, replay);
    }

    // ========== Default Transform Behaviour ==========

    #[test]
    fn test_baseline_run_is_well_formed() {
        let mut sim = DualRateSimulator::new(SimulationParameters::default()).expect("construct");
        let result = sim.run(None).expect("run");

        assert_eq!(result.seed, 42);
        assert_eq!(result.flat.invocations, 20);
        assert_eq!(result.dilated.zone.invocations, 200);
        assert!(result.initial_mean_abs > 0.3 && result.initial_mean_abs < 0.7);
        assert!(result.flat.accumulated_computation > 0.0);
        assert!(result.performance_ratio_vs_flat().is_finite());
        // clipped into [-1, 1]
        assert!(result.flat.final_mean_abs <= 1.0);
        assert!(result.dilated.zone.final_mean_abs <= 1.0);
    }

    #[test]
    fn test_accumulator_never_decreases() {
        let mut sim = DualRateSimulator::new(params(50, 6, 5)).expect("construct");
        let mut last = [0.0_f64; 2];
        let mut monotone = true;
        sim.run_observed(None, &mut |r: &StepRecord| {
            let slot = match r.zone { Zone::Flat => 0, Zone::Dilated => 1 };
            if r.accumulated < last[slot] {
                monotone = false;
            }
            last[slot] = r.accumulated;
        })
        .expect("run");
        assert!(monotone);
    }

    #[test]
    fn test_result_serializes_to_json() {
        let mut sim = DualRateSimulator::new(params(8, 2, 2)).expect("construct");
        let result = sim.run(None).expect("run");
        let json = serde_json::to_value(&result).expect("serialize");
        assert_eq!(json["flat"]["invocations"], 2);
        assert_eq!(json["dilated"]["invocations"], 4);
        assert!(json["dilated"]["performance_ratio_vs_flat"].is_number());
    }
}
