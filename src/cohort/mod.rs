pub mod loader;
pub mod select;
pub mod summary;

pub use loader::{load_cohort_table, parse_cohort_table};
pub use summary::{CohortSummary, summarize_cohorts};

pub const CONTROL: &str = "control";
pub const SCI_NNP: &str = "SCI_nNP";
pub const SCI_P: &str = "SCI_P";

pub const COHORT_ORDER: [&str; 3] = [CONTROL, SCI_NNP, SCI_P];
pub const SCI_COHORTS: [&str; 2] = [SCI_NNP, SCI_P];
/// Controls first, then AIS grades from least to most severe.
pub const AIS_ORDER: [&str; 5] = [CONTROL, "D", "C", "B", "A"];

pub const SEX_FEMALE: &str = "Female";
pub const SEX_MALE: &str = "Male";

pub const COL_ID: &str = "ID";
pub const COL_COHORT: &str = "Cohort";
pub const COL_AGE: &str = "Age";
pub const COL_BRAIN_AGE: &str = "BrainAge";
pub const COL_BRAINPAD: &str = "BrainPAD";
pub const COL_SEX: &str = "Sex";
pub const COL_AIS: &str = "AIS";
pub const COL_TIME_SINCE_INJURY: &str = "Time since SCI (years)";

#[derive(Debug, Clone, PartialEq)]
pub struct SubjectRecord {
    pub id: Option<String>,
    pub cohort: String,
    pub age: Option<f64>,
    pub brain_age: Option<f64>,
    pub brain_pad: Option<f64>,
    pub sex: Option<String>,
    pub ais: Option<String>,
    pub time_since_injury: Option<f64>,
}

impl SubjectRecord {
    pub fn new(cohort: impl Into<String>) -> Self {
        Self {
            id: None,
            cohort: cohort.into(),
            age: None,
            brain_age: None,
            brain_pad: None,
            sex: None,
            ais: None,
            time_since_injury: None,
        }
    }

    pub fn is_sci(&self) -> bool {
        SCI_COHORTS.contains(&self.cohort.as_str())
    }
}

/// Which optional columns the input carried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnPresence {
    pub id: bool,
    pub age: bool,
    pub brain_age: bool,
    pub sex: bool,
    pub ais: bool,
    pub time_since_injury: bool,
    pub brain_pad_derived: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CohortTable {
    pub records: Vec<SubjectRecord>,
    pub columns: ColumnPresence,
    pub header: Vec<String>,
}

impl CohortTable {
    pub fn new(records: Vec<SubjectRecord>, columns: ColumnPresence) -> Self {
        Self {
            records,
            columns,
            header: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn cohort(&self, name: &str) -> impl Iterator<Item = &SubjectRecord> + '_ {
        let name = name.to_string();
        self.records.iter().filter(move |r| r.cohort == name)
    }

    pub fn cohort_count(&self, name: &str) -> usize {
        self.cohort(name).count()
    }
}
