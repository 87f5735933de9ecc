use std::collections::BTreeMap;

use brainpad_stats::cohort::parse_cohort_table;
use brainpad_stats::cohort::summary::{format_ais_distribution, summarize_cohort};
use brainpad_stats::cohort::summarize_cohorts;

const CSV: &str = "\
Cohort,Age,BrainAge,Sex,AIS,Time since SCI (years)
control,30,32,Male,,
control,40,39,Female,,
SCI_nNP,50,55,Male,A,1.0
SCI_nNP,60,63,Male,B,2.0
SCI_nNP,70,70,Female,A,6.0
SCI_P,45,50,Female,C,4.0
SCI_P,55,58,Male,C,
";

#[test]
fn summary_rows_in_cohort_order() {
    let t = parse_cohort_table(CSV, b',', "test").unwrap();
    let rows = summarize_cohorts(&t);
    let names: Vec<&str> = rows.iter().map(|r| r.cohort.as_str()).collect();
    assert_eq!(names, vec!["control", "SCI_nNP", "SCI_P"]);

    let control = &rows[0];
    assert_eq!(control.participants, 2);
    assert_eq!(control.mean_age, Some(35.0));
    assert_eq!(control.mean_brain_pad, Some(0.5));
    assert!((control.sd_brain_pad.unwrap() - 4.5f64.sqrt()).abs() < 1e-12);
    assert_eq!(control.num_male, Some(1));
    assert_eq!(control.num_female, Some(1));
    assert_eq!(control.ais_distribution, Some(BTreeMap::new()));
}

#[test]
fn time_since_injury_mean_needs_more_than_two_values() {
    let t = parse_cohort_table(CSV, b',', "test").unwrap();
    let nnp = summarize_cohort(&t, "SCI_nNP");
    assert_eq!(nnp.mean_time_since_injury, Some(3.0));
    let p = summarize_cohort(&t, "SCI_P");
    assert_eq!(p.mean_time_since_injury, None);
    assert_eq!(
        format_ais_distribution(nnp.ais_distribution.as_ref()),
        "A:2;B:1"
    );
}

#[test]
fn absent_columns_are_not_available() {
    let t = parse_cohort_table("Cohort,BrainPAD\ncontrol,1\ncontrol,3\n", b',', "t").unwrap();
    let s = summarize_cohort(&t, "control");
    assert_eq!(s.mean_brain_pad, Some(2.0));
    assert_eq!(s.mean_age, None);
    assert_eq!(s.num_male, None);
    assert_eq!(s.ais_distribution, None);
    assert_eq!(format_ais_distribution(s.ais_distribution.as_ref()), "Not Available");
}

#[test]
fn empty_cohort_has_no_statistics() {
    let t = parse_cohort_table(CSV, b',', "test").unwrap();
    let s = summarize_cohort(&t, "unknown");
    assert_eq!(s.participants, 0);
    assert_eq!(s.mean_brain_pad, None);
    assert_eq!(s.sd_age, None);
}
