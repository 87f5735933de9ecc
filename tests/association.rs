use brainpad_stats::compare::{CompareError, ContingencyTable, chi2_contingency, ols_fit};

fn table(counts: Vec<Vec<f64>>) -> ContingencyTable {
    let rows = (0..counts.len()).map(|i| format!("r{i}")).collect();
    let cols = (0..counts[0].len()).map(|j| format!("c{j}")).collect();
    ContingencyTable::new(rows, cols, counts).unwrap()
}

#[test]
fn chi2_two_by_two_applies_yates() {
    let r = chi2_contingency(&table(vec![vec![10.0, 5.0], vec![3.0, 12.0]])).unwrap();
    assert_eq!(r.dof, 1);
    assert!(r.yates_corrected);
    assert!((r.statistic - 4.886877828054299).abs() < 1e-9);
    assert!((r.p_value - 0.027061581911647137).abs() < 1e-6);
    assert!((r.cramers_v - 0.4708709557974187).abs() < 1e-9);
    assert!((r.expected[0][0] - 6.5).abs() < 1e-12);
    assert!((r.expected[1][1] - 8.5).abs() < 1e-12);
}

#[test]
fn chi2_larger_table_is_uncorrected() {
    let r = chi2_contingency(&table(vec![vec![4.0, 3.0, 2.0], vec![1.0, 3.0, 6.0]])).unwrap();
    assert_eq!(r.dof, 2);
    assert!(!r.yates_corrected);
    assert!((r.statistic - 3.757777777777778).abs() < 1e-9);
    assert!((r.p_value - 0.15275974454515484).abs() < 1e-6);
}

#[test]
fn chi2_degenerate_tables() {
    let err = chi2_contingency(&table(vec![vec![1.0, 2.0]])).unwrap_err();
    assert!(matches!(err, CompareError::DegenerateTable(_)));
    let err = chi2_contingency(&table(vec![vec![1.0, 0.0], vec![3.0, 0.0]])).unwrap_err();
    assert!(matches!(err, CompareError::DegenerateTable(_)));
}

#[test]
fn contingency_table_rejects_bad_shapes() {
    let err = ContingencyTable::new(
        vec!["a".into(), "b".into()],
        vec!["x".into()],
        vec![vec![1.0]],
    )
    .unwrap_err();
    assert!(matches!(err, CompareError::InvalidInput(_)));
    let err =
        ContingencyTable::new(vec!["a".into()], vec!["x".into()], vec![vec![-1.0]]).unwrap_err();
    assert!(matches!(err, CompareError::InvalidInput(_)));
}

#[test]
fn crosstab_from_pairs_sorts_labels() {
    let t = ContingencyTable::from_pairs([
        ("SCI_nNP", "C"),
        ("SCI_P", "A"),
        ("SCI_nNP", "A"),
        ("SCI_nNP", "A"),
    ]);
    assert_eq!(t.row_labels, vec!["SCI_P", "SCI_nNP"]);
    assert_eq!(t.col_labels, vec!["A", "C"]);
    assert_eq!(t.counts, vec![vec![1.0, 0.0], vec![2.0, 1.0]]);
    assert_eq!(t.total(), 4.0);
}

#[test]
fn ols_reference_fit() {
    let fit = ols_fit(&[1.0, 2.0, 3.0, 4.0, 6.0], &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
    assert_eq!(fit.n, 5);
    assert!((fit.slope - 0.8108108108108107).abs() < 1e-9);
    assert!((fit.intercept - 0.40540540540540526).abs() < 1e-9);
    assert!((fit.r_squared - 144.0 / 148.0).abs() < 1e-9);
    assert!((fit.slope_se - 0.07802030664724675).abs() < 1e-9);
    assert!((fit.slope_t - 10.392304845413259).abs() < 1e-6);
    assert!((fit.slope_p_value - 0.0019012746601963736).abs() < 1e-6);
}

#[test]
fn ols_guards() {
    let err = ols_fit(&[1.0, 2.0], &[1.0, 2.0]).unwrap_err();
    assert!(matches!(err, CompareError::InsufficientSample { .. }));
    let err = ols_fit(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]).unwrap_err();
    assert!(matches!(err, CompareError::ZeroVariance(_)));
    let err = ols_fit(&[1.0, 2.0, 3.0], &[1.0, 2.0]).unwrap_err();
    assert!(matches!(err, CompareError::InvalidInput(_)));
}

#[test]
fn ols_perfect_fit() {
    let fit = ols_fit(&[1.0, 2.0, 3.0, 4.0], &[3.0, 5.0, 7.0, 9.0]).unwrap();
    assert!((fit.slope - 2.0).abs() < 1e-12);
    assert!((fit.intercept - 1.0).abs() < 1e-12);
    assert_eq!(fit.slope_p_value, 0.0);
    assert!((fit.r_squared - 1.0).abs() < 1e-12);
}
