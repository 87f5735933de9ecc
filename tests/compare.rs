use brainpad_stats::compare::{
    CompareError, EffectMagnitude, EffectSizeKind, NormalityVerdict, PairOutcome, Sample,
    TestKind, compare, decide_test, pairwise,
};

fn a() -> Sample {
    Sample::new("control", [1.0, 2.0, 3.0, 4.0, 5.0])
}

fn b() -> Sample {
    Sample::new("SCI_P", [10.0, 11.0, 12.0, 13.0, 14.0])
}

#[test]
fn decide_test_maps_verdict_to_strategy() {
    let s = decide_test(NormalityVerdict::Normal);
    assert_eq!(s.test, TestKind::StudentT);
    assert_eq!(s.effect, EffectSizeKind::CohensD);
    let s = decide_test(NormalityVerdict::NotNormal);
    assert_eq!(s.test, TestKind::MannWhitneyU);
    assert_eq!(s.effect, EffectSizeKind::CliffsDelta);
}

#[test]
fn compare_normal_uses_t_test_and_cohens_d() {
    let r = compare(&a(), &b(), NormalityVerdict::Normal).unwrap();
    assert_eq!(r.group1, "control");
    assert_eq!(r.group2, "SCI_P");
    assert_eq!(r.test, TestKind::StudentT);
    assert!((r.statistic + 9.0).abs() < 1e-9);
    assert!((r.effect_size + 5.692099788303082).abs() < 1e-9);
    assert_eq!(r.test_used(), "t-test (t=-9.00)");
    assert_eq!(r.sample_sizes(), "n1=5, n2=5");
    assert_eq!(r.magnitude(), EffectMagnitude::Large);
}

#[test]
fn compare_not_normal_uses_mann_whitney_and_cliffs_delta() {
    let x = Sample::new("A", [1.1, 2.2, 3.3, 4.4]);
    let y = Sample::new("B", [2.5, 3.5, 4.5, 5.5, 6.5]);
    let r = compare(&x, &y, NormalityVerdict::NotNormal).unwrap();
    assert_eq!(r.test, TestKind::MannWhitneyU);
    assert_eq!(r.effect_kind, EffectSizeKind::CliffsDelta);
    assert_eq!(r.test_used(), "Mann-Whitney U (U=3.00)");
    assert!((r.p_value - 0.1111111111111111).abs() < 1e-12);
    assert!((r.effect_size + 0.7).abs() < 1e-12);
    assert_eq!(r.sample_sizes(), "n1=4, n2=5");
}

#[test]
fn insufficient_group_fails_before_any_test() {
    let single = Sample::new("B", [7.0]);
    for verdict in [NormalityVerdict::Normal, NormalityVerdict::NotNormal] {
        let err = compare(&a(), &single, verdict).unwrap_err();
        assert_eq!(
            err,
            CompareError::InsufficientSample {
                label: "B".to_string(),
                actual: 1,
                required: 2,
            }
        );
    }
    let empty = Sample::new("A", []);
    let err = compare(&empty, &a(), NormalityVerdict::Normal).unwrap_err();
    assert!(matches!(err, CompareError::InsufficientSample { actual: 0, .. }));
}

#[test]
fn non_finite_values_do_not_count_toward_group_size() {
    let s = Sample::new("x", [1.0, f64::NAN]);
    assert_eq!(s.len(), 1);
    let s = Sample::from_options("y", [Some(1.0), None, Some(f64::INFINITY), Some(2.0)]);
    assert_eq!(s.values(), &[1.0, 2.0]);
}

#[test]
fn magnitude_bands() {
    assert_eq!(
        EffectMagnitude::classify(EffectSizeKind::CohensD, 0.1),
        EffectMagnitude::Negligible
    );
    assert_eq!(
        EffectMagnitude::classify(EffectSizeKind::CohensD, -0.6),
        EffectMagnitude::Medium
    );
    assert_eq!(
        EffectMagnitude::classify(EffectSizeKind::CliffsDelta, 0.2),
        EffectMagnitude::Small
    );
    assert_eq!(
        EffectMagnitude::classify(EffectSizeKind::CliffsDelta, 0.5),
        EffectMagnitude::Large
    );
}

#[test]
fn pairwise_keeps_pair_order_and_isolates_failures() {
    let samples = vec![
        Sample::new("control", [1.0, 2.0, 3.0, 4.0]),
        Sample::new("SCI_nNP", [5.0]),
        Sample::new("SCI_P", [2.0, 4.0, 6.0, 8.0]),
    ];
    let outcomes = pairwise(&samples, NormalityVerdict::Normal, 1);
    assert_eq!(outcomes.len(), 3);

    match &outcomes[0] {
        PairOutcome::Failed(f) => {
            assert_eq!((f.group1.as_str(), f.group2.as_str()), ("control", "SCI_nNP"));
            assert_eq!((f.n1, f.n2), (4, 1));
            assert!(f.reason.contains("insufficient sample size"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    match &outcomes[1] {
        PairOutcome::Compared(r) => {
            assert_eq!((r.group1.as_str(), r.group2.as_str()), ("control", "SCI_P"));
        }
        other => panic!("expected result, got {other:?}"),
    }
    assert!(matches!(&outcomes[2], PairOutcome::Failed(_)));
}

#[test]
fn pairwise_threaded_matches_serial() {
    let samples: Vec<Sample> = (0..5)
        .map(|g| {
            Sample::new(
                format!("g{g}"),
                (0..8).map(|i| (i * (g + 1)) as f64 + 0.1 * g as f64),
            )
        })
        .collect();
    let serial = pairwise(&samples, NormalityVerdict::NotNormal, 1);
    let threaded = pairwise(&samples, NormalityVerdict::NotNormal, 4);
    assert_eq!(serial, threaded);
    assert_eq!(serial.len(), 10);
}

fn permuted(s: &Sample, stride: usize) -> Sample {
    let v = s.values();
    let shuffled: Vec<f64> = (0..v.len()).map(|i| v[(i * stride) % v.len()]).collect();
    Sample::new(s.label(), shuffled)
}

#[test]
fn compare_ignores_value_order() {
    // Quarter-step values over power-of-two lengths keep every sum exact,
    // so results match bit for bit.
    let x = Sample::new("control", [3.0, 1.5, 4.0, 1.0, 5.5, 9.0, 2.0, 5.0]);
    let y = Sample::new("SCI_P", [2.5, 7.0, 1.0, 8.25, 2.0, 8.0, 4.5, 2.5]);
    let small_x = Sample::new("control", [1.5, 4.0, 2.25, 7.0]);
    let small_y = Sample::new("SCI_nNP", [3.0, 6.5, 9.0, 0.5]);

    for verdict in [NormalityVerdict::Normal, NormalityVerdict::NotNormal] {
        for (p, q) in [(&x, &y), (&small_x, &small_y)] {
            let base = compare(p, q, verdict).unwrap();
            for stride in [3, 5, 7] {
                let r = compare(&permuted(p, stride), &permuted(q, stride), verdict).unwrap();
                assert_eq!(r, base, "verdict {verdict:?}, stride {stride}");
            }
        }
    }
}

#[test]
fn compare_order_invariance_with_decimal_values() {
    let x = Sample::new("A", [2.1, 3.4, 1.9, 5.6, 4.4, 3.8, 2.7]);
    let y = Sample::new("B", [4.1, 3.3, 6.9, 5.6, 3.6, 7.0, 5.1, 4.8]);
    let mut rx = x.values().to_vec();
    rx.reverse();
    let mut ry = y.values().to_vec();
    ry.reverse();
    let rx = Sample::new("A", rx);
    let ry = Sample::new("B", ry);

    for verdict in [NormalityVerdict::Normal, NormalityVerdict::NotNormal] {
        let a = compare(&x, &y, verdict).unwrap();
        let b = compare(&rx, &ry, verdict).unwrap();
        assert!((a.statistic - b.statistic).abs() < 1e-12);
        assert!((a.p_value - b.p_value).abs() < 1e-12);
        assert!((a.effect_size - b.effect_size).abs() < 1e-12);
    }
}
