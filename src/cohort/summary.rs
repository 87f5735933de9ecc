use std::collections::BTreeMap;

use serde::Serialize;

use crate::cohort::{COHORT_ORDER, CohortTable, SEX_FEMALE, SEX_MALE, SubjectRecord};
use crate::math::stats::{mean, std_dev};

/// Mean time since injury needs more than this many valid values.
pub const MIN_TIME_SINCE_INJURY_VALUES: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortSummary {
    pub cohort: String,
    pub participants: usize,
    pub mean_age: Option<f64>,
    pub sd_age: Option<f64>,
    pub mean_brain_pad: Option<f64>,
    pub sd_brain_pad: Option<f64>,
    pub mean_brain_age: Option<f64>,
    pub sd_brain_age: Option<f64>,
    pub num_male: Option<usize>,
    pub num_female: Option<usize>,
    pub ais_distribution: Option<BTreeMap<String, usize>>,
    pub mean_time_since_injury: Option<f64>,
}

pub fn summarize_cohorts(table: &CohortTable) -> Vec<CohortSummary> {
    COHORT_ORDER
        .iter()
        .map(|c| summarize_cohort(table, c))
        .collect()
}

pub fn summarize_cohort(table: &CohortTable, cohort: &str) -> CohortSummary {
    let rows: Vec<&SubjectRecord> = table.cohort(cohort).collect();
    let cols = table.columns;

    let column = |present: bool, f: fn(&SubjectRecord) -> Option<f64>| -> Vec<f64> {
        if present {
            rows.iter().filter_map(|r| f(r)).collect()
        } else {
            Vec::new()
        }
    };
    let ages = column(cols.age, |r| r.age);
    let pads = column(true, |r| r.brain_pad);
    let brain_ages = column(cols.brain_age, |r| r.brain_age);
    let tsi = column(cols.time_since_injury, |r| r.time_since_injury);

    let count_sex = |sex: &str| {
        cols.sex
            .then(|| rows.iter().filter(|r| r.sex.as_deref() == Some(sex)).count())
    };

    let ais_distribution = cols.ais.then(|| {
        let mut dist = BTreeMap::new();
        for grade in rows.iter().filter_map(|r| r.ais.as_ref()) {
            *dist.entry(grade.clone()).or_insert(0usize) += 1;
        }
        dist
    });

    let mean_time_since_injury = if tsi.len() > MIN_TIME_SINCE_INJURY_VALUES {
        mean(&tsi)
    } else {
        None
    };

    CohortSummary {
        cohort: cohort.to_string(),
        participants: rows.len(),
        mean_age: mean(&ages),
        sd_age: std_dev(&ages),
        mean_brain_pad: mean(&pads),
        sd_brain_pad: std_dev(&pads),
        mean_brain_age: mean(&brain_ages),
        sd_brain_age: std_dev(&brain_ages),
        num_male: count_sex(SEX_MALE),
        num_female: count_sex(SEX_FEMALE),
        ais_distribution,
        mean_time_since_injury,
    }
}

/// `A:2;B:1` or `Not Available`.
pub fn format_ais_distribution(dist: Option<&BTreeMap<String, usize>>) -> String {
    match dist {
        Some(d) if !d.is_empty() => d
            .iter()
            .map(|(k, v)| format!("{}:{}", k, v))
            .collect::<Vec<_>>()
            .join(";"),
        Some(_) => "none".to_string(),
        None => "Not Available".to_string(),
    }
}
