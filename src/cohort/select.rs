//! Dataset slices feeding the comparison sets. Each slice drops only the
//! rows missing the columns it reads.

use crate::cohort::{AIS_ORDER, CONTROL, COHORT_ORDER, CohortTable, SCI_COHORTS, SubjectRecord};
use crate::compare::{ContingencyTable, Sample};

/// Outcome values grouped by label, plus the pooled sample the verdict is
/// computed on.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedSlice {
    pub pooled: Sample,
    pub groups: Vec<Sample>,
}

fn group_by_cohort<F>(table: &CohortTable, cohorts: &[&str], value: F, name: &str) -> GroupedSlice
where
    F: Fn(&SubjectRecord) -> Option<f64>,
{
    let groups: Vec<Sample> = cohorts
        .iter()
        .map(|c| Sample::from_options(*c, table.cohort(c).map(&value)))
        .collect();
    let pooled = Sample::new(
        name,
        groups.iter().flat_map(|g| g.values().iter().copied()),
    );
    GroupedSlice { pooled, groups }
}

/// BrainPAD over every row, regardless of cohort label.
pub fn brainpad_all(table: &CohortTable) -> Sample {
    Sample::from_options("all", table.records.iter().map(|r| r.brain_pad))
}

pub fn brainpad_by_cohort(table: &CohortTable) -> GroupedSlice {
    group_by_cohort(table, &COHORT_ORDER, |r| r.brain_pad, "brainpad")
}

pub fn brainpad_by_cohort_for_sex(table: &CohortTable, sex: &str) -> GroupedSlice {
    let groups: Vec<Sample> = COHORT_ORDER
        .iter()
        .map(|c| {
            Sample::from_options(
                *c,
                table
                    .cohort(c)
                    .filter(|r| r.sex.as_deref() == Some(sex))
                    .map(|r| r.brain_pad),
            )
        })
        .collect();
    let pooled = Sample::new(sex, groups.iter().flat_map(|g| g.values().iter().copied()));
    GroupedSlice { pooled, groups }
}

/// BrainPAD by AIS grade, controls as the first group.
pub fn brainpad_by_ais(table: &CohortTable) -> GroupedSlice {
    let groups: Vec<Sample> = AIS_ORDER
        .iter()
        .map(|grade| {
            if *grade == CONTROL {
                Sample::from_options(*grade, table.cohort(CONTROL).map(|r| r.brain_pad))
            } else {
                Sample::from_options(
                    *grade,
                    table
                        .records
                        .iter()
                        .filter(|r| r.is_sci() && r.ais.as_deref() == Some(*grade))
                        .map(|r| r.brain_pad),
                )
            }
        })
        .collect();
    let pooled = Sample::new(
        "brainpad_ais",
        groups.iter().flat_map(|g| g.values().iter().copied()),
    );
    GroupedSlice { pooled, groups }
}

pub fn time_since_injury_by_cohort(table: &CohortTable) -> GroupedSlice {
    group_by_cohort(
        table,
        &SCI_COHORTS,
        |r| r.time_since_injury,
        "time_since_injury",
    )
}

pub fn age_by_cohort(table: &CohortTable) -> GroupedSlice {
    group_by_cohort(table, &COHORT_ORDER, |r| r.age, "age")
}

/// Age over every row.
pub fn age_all(table: &CohortTable) -> Sample {
    Sample::from_options("all", table.records.iter().map(|r| r.age))
}

/// SCI cohort x AIS grade counts.
pub fn ais_crosstab(table: &CohortTable) -> ContingencyTable {
    ContingencyTable::from_pairs(
        table
            .records
            .iter()
            .filter(|r| r.is_sci())
            .filter_map(|r| r.ais.as_deref().map(|a| (r.cohort.as_str(), a))),
    )
}

/// (time since injury, BrainPAD) for SCI rows carrying both.
pub fn time_since_injury_vs_brainpad(table: &CohortTable) -> (Vec<f64>, Vec<f64>) {
    table
        .records
        .iter()
        .filter(|r| r.is_sci())
        .filter_map(|r| match (r.time_since_injury, r.brain_pad) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        })
        .unzip()
}
