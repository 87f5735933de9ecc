use std::fs;

use brainpad_stats::compare::{ComparisonSet, NormalityVerdict, Sample, Stratum};
use brainpad_stats::io::tsv_writer::{format_float, write_comparisons};
use tempfile::TempDir;

#[test]
fn float_formatting() {
    assert_eq!(format_float(0.5), "0.500000");
    assert_eq!(format_float(-9.0), "-9.000000");
    assert_eq!(format_float(0.0), "0.000000");
    assert_eq!(format_float(1.8531184296430096e-05), "1.853118e-5");
    assert_eq!(format_float(f64::NAN), "Not Available");
}

#[test]
fn comparison_table_rows() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("cmp.tsv");
    let samples = vec![
        Sample::new("control", [1.0, 2.0, 3.0, 4.0, 5.0]),
        Sample::new("SCI_P", [10.0, 11.0, 12.0, 13.0, 14.0]),
        Sample::new("SCI_nNP", [7.0]),
    ];
    let set = ComparisonSet::evaluated(
        "brainpad_across_cohorts",
        "BrainPAD",
        None,
        NormalityVerdict::Normal,
        &samples,
        1,
    );
    write_comparisons(&path, &[&set]).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines[0],
        "Group1\tGroup2\tTest Used\tp-value\tEffect Size\tSample Size"
    );
    assert_eq!(
        lines[1],
        "control\tSCI_P\tt-test (t=-9.00)\t1.853118e-5\t-5.692100\tn1=5, n2=5"
    );
    assert_eq!(
        lines[2],
        "control\tSCI_nNP\tNot Available\tNot Available\tNot Available\tn1=5, n2=1"
    );
    assert_eq!(lines.len(), 4);
}

#[test]
fn stratified_table_with_unavailable_set() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("sex.tsv");
    let female = ComparisonSet::evaluated(
        "brainpad_across_sex",
        "BrainPAD",
        Some(Stratum::new("Sex", "Female")),
        NormalityVerdict::NotNormal,
        &[
            Sample::new("control", [1.1, 2.2, 3.3, 4.4]),
            Sample::new("SCI_P", [2.5, 3.5, 4.5, 5.5, 6.5]),
        ],
        1,
    );
    let male = ComparisonSet::unavailable(
        "brainpad_across_sex",
        "BrainPAD",
        Some(Stratum::new("Sex", "Male")),
        "no verdict",
    );
    write_comparisons(&path, &[&female, &male]).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert!(lines[0].starts_with("Sex\tGroup1\t"));
    assert_eq!(
        lines[1],
        "Female\tcontrol\tSCI_P\tMann-Whitney U (U=3.00)\t0.111111\t-0.700000\tn1=4, n2=5"
    );
    assert_eq!(
        lines[2],
        "Male\tNot Available\tNot Available\tNot Available\tNot Available\tNot Available\tNot Available"
    );
}
