use std::fs;
use std::path::Path;

use brainpad_stats::ctx::Ctx;
use brainpad_stats::io::summary::format_summary;
use brainpad_stats::pipeline::Pipeline;
use serde_json::Value;
use tempfile::TempDir;

const COHORTS: &str = "\
ID,Cohort,Age,BrainAge,BrainPAD,Sex,AIS,Time since SCI (years) 
c1,control,31,28.9,-2.1,Male,,
c2,control,45,45.5,0.5,Female,,
c3,control,38,39.3,1.3,Male,,
c4,control,52,51.3,-0.7,Female,,
c5,control,29,31.2,2.2,Male,,
c6,control,61,61.1,0.1,Female,,
n1,SCI_nNP,44,47.4,3.4,Female,A,2.5
n2,SCI_nNP,36,41.1,5.1,Male,B,10.1
n3,SCI_nNP,58,60.2,2.2,Female,C,4.0
n4,SCI_nNP,47,51.8,4.8,Male,D,7.3
n5,SCI_nNP,33,39.0,6.0,Female,A,15.2
n6,SCI_nNP,62,63.9,1.9,Male,C,1.1
p1,SCI_P,41,45.4,4.4,Male,D,3.3
p2,SCI_P,55,62.2,7.2,Female,A,12.0
p3,SCI_P,49,52.9,3.9,Male,B,6.5
p4,SCI_P,37,43.6,6.6,Female,C,9.9
p5,SCI_P,60,65.5,5.5,Male,A,0.8
p6,SCI_P,43,51.1,8.1,Female,D,5.4
";

fn run(input_csv: &str, json: bool, tsv: bool) -> (TempDir, Ctx) {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("cohorts.csv");
    fs::write(&input, input_csv).unwrap();
    let mut ctx = Ctx::new(input, tmp.path().join("out"), json, tsv, "0.0.0-test");
    Pipeline::analysis().run(&mut ctx).unwrap();
    (tmp, ctx)
}

fn data_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .skip(1)
        .map(|l| l.to_string())
        .collect()
}

#[test]
fn full_run_writes_all_tables() {
    let (tmp, ctx) = run(COHORTS, true, true);
    let out = tmp.path().join("out");

    let summary = data_lines(&out.join("summary_statistics.tsv"));
    assert_eq!(summary.len(), 3);
    assert!(summary[0].starts_with("control\t6\t"));

    assert_eq!(data_lines(&out.join("normality.tsv")).len(), 4);
    assert_eq!(data_lines(&out.join("brainpad_across_cohorts.tsv")).len(), 3);
    assert_eq!(data_lines(&out.join("brainpad_across_ais.tsv")).len(), 10);
    assert_eq!(data_lines(&out.join("time_since_injury_comparison.tsv")).len(), 1);
    assert_eq!(data_lines(&out.join("chronological_age_comparison.tsv")).len(), 3);
    assert_eq!(data_lines(&out.join("chi2_ais.tsv")).len(), 1);
    assert_eq!(
        data_lines(&out.join("brainpad_vs_time_since_injury.tsv")).len(),
        1
    );

    let sex = fs::read_to_string(out.join("brainpad_across_sex.tsv")).unwrap();
    let mut lines = sex.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Sex\tGroup1\tGroup2\tTest Used\tp-value\tEffect Size\tSample Size"
    );
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 6);
    assert!(rows[0].starts_with("Female\tcontrol\tSCI_nNP\t"));
    assert!(rows[5].starts_with("Male\tSCI_nNP\tSCI_P\t"));
    assert!(rows.iter().all(|r| r.ends_with("n1=3, n2=3")));

    let chi2 = data_lines(&out.join("chi2_ais.tsv"));
    assert!(chi2[0].starts_with("0.666667\t3\t"), "{}", chi2[0]);

    assert!(ctx.output.json_path.exists());
    assert!(ctx.comparison_sets.iter().all(|s| s.is_available()));
}

#[test]
fn one_verdict_per_comparison_set() {
    let (_tmp, ctx) = run(COHORTS, false, false);
    for set in &ctx.comparison_sets {
        let verdict = set.verdict.expect("verdict");
        let expected = if verdict.is_normal() {
            "t-test"
        } else {
            "Mann-Whitney U"
        };
        assert!(set.results().all(|r| r.test.display_name() == expected));
    }
    let brainpad = ctx.normality["brainpad"].as_ref().unwrap();
    let sex_sets: Vec<_> = ctx
        .comparison_sets
        .iter()
        .filter(|s| s.name == "brainpad_across_sex")
        .collect();
    assert_eq!(sex_sets.len(), 2);
    assert!(sex_sets.iter().all(|s| s.verdict == Some(brainpad.verdict)));
}

#[test]
fn json_report_shape() {
    let (_tmp, ctx) = run(COHORTS, true, false);
    let raw = fs::read_to_string(&ctx.output.json_path).unwrap();
    let v: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(v["tool"], "brainpad-stats");
    assert_eq!(v["schema_version"], "v1");
    assert_eq!(v["input_meta"]["rows"], 18);
    assert_eq!(v["input_meta"]["cohorts"]["SCI_P"], 6);
    assert_eq!(v["cohort_summary"].as_array().unwrap().len(), 3);
    assert_eq!(v["normality"].as_array().unwrap().len(), 4);
    assert_eq!(v["comparisons"].as_array().unwrap().len(), 6);
    assert_eq!(v["ais_chi_square"]["dof"], 3);
    assert_eq!(v["time_since_injury_regression"]["n"], 12);
}

#[test]
fn missing_optional_columns_yield_not_available() {
    let csv = "\
Cohort,BrainPAD
control,-2.1
control,0.5
control,1.3
SCI_nNP,3.4
SCI_nNP,5.1
SCI_nNP,2.2
SCI_P,4.4
SCI_P,7.2
SCI_P,3.9
";
    let (tmp, ctx) = run(csv, true, true);
    let out = tmp.path().join("out");

    assert_eq!(data_lines(&out.join("brainpad_across_cohorts.tsv")).len(), 3);

    let sex = data_lines(&out.join("brainpad_across_sex.tsv"));
    assert_eq!(sex.len(), 2);
    assert!(sex[0].starts_with("Female\tNot Available"));

    let ais = data_lines(&out.join("brainpad_across_ais.tsv"));
    assert_eq!(ais, vec!["Not Available\tNot Available\tNot Available\tNot Available\tNot Available\tNot Available"]);

    let chi2 = data_lines(&out.join("chi2_ais.tsv"));
    assert!(chi2[0].starts_with("Not Available"));

    let summary = data_lines(&out.join("summary_statistics.tsv"));
    assert!(summary[0].contains("Not Available"));

    assert!(ctx.warnings.iter().any(|w| w.contains("'AIS'")));
    assert!(ctx.normality["age"].is_err());
}

#[test]
fn small_groups_fail_per_pair() {
    let csv = "\
Cohort,BrainPAD
control,-2.1
control,0.5
control,1.3
SCI_nNP,3.4
SCI_P,4.4
SCI_P,7.2
";
    let (tmp, ctx) = run(csv, false, true);
    let rows = data_lines(&tmp.path().join("out").join("brainpad_across_cohorts.tsv"));
    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows[0],
        "control\tSCI_nNP\tNot Available\tNot Available\tNot Available\tn1=3, n2=1"
    );
    assert!(!rows[1].contains("Not Available"));
    assert!(rows[2].contains("Not Available"));
    assert!(ctx.warnings.iter().any(|w| w.contains("control vs SCI_nNP")));
}

#[test]
fn summary_mentions_each_set() {
    let (_tmp, ctx) = run(COHORTS, false, false);
    let text = format_summary(&ctx).unwrap();
    assert!(text.starts_with("brainpad-stats v"));
    assert!(text.contains("Input: 18 subjects (control=6, SCI_nNP=6, SCI_P=6)"));
    assert!(text.contains("brainpad_across_sex [Sex=Female]"));
    assert!(text.contains("AIS chi-square: "));
}

#[test]
fn missing_input_aborts_run() {
    let tmp = TempDir::new().unwrap();
    let mut ctx = Ctx::new(
        tmp.path().join("absent.csv"),
        tmp.path().join("out"),
        true,
        true,
        "0.0.0-test",
    );
    assert!(Pipeline::analysis().run(&mut ctx).is_err());
}

#[test]
fn large_input_keeps_brainpad_comparisons() {
    let cohorts = ["control", "SCI_nNP", "SCI_P"];
    let mut csv = String::from("Cohort,BrainPAD\n");
    for i in 0..5001usize {
        let pad = ((i * 37) % 101) as f64 / 10.0 - 5.0;
        csv.push_str(&format!("{},{}\n", cohorts[i % 3], pad));
    }
    let (_tmp, ctx) = run(&csv, false, false);

    let brainpad = ctx.normality["brainpad"].as_ref().unwrap();
    assert_eq!(brainpad.n, 5001);
    assert!(brainpad.warning.is_some());
    assert!(
        ctx.warnings
            .iter()
            .any(|w| w.starts_with("normality 'brainpad': Shapiro-Wilk p-value"))
    );

    let set = ctx
        .comparison_sets
        .iter()
        .find(|s| s.name == "brainpad_across_cohorts")
        .unwrap();
    assert!(set.is_available());
    assert_eq!(set.results().count(), 3);
}

#[test]
fn time_since_injury_pair_follows_cohort_order() {
    let (tmp, _ctx) = run(COHORTS, false, true);
    let rows = data_lines(&tmp.path().join("out").join("time_since_injury_comparison.tsv"));
    assert_eq!(rows.len(), 1);
    assert!(rows[0].starts_with("SCI_nNP\tSCI_P\t"), "{}", rows[0]);
}
