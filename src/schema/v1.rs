use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Columns {
    pub id: bool,
    pub age: bool,
    pub brain_age: bool,
    pub sex: bool,
    pub ais: bool,
    pub time_since_injury: bool,
    pub brainpad_derived: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputMeta {
    pub path: String,
    pub rows: Option<u64>,
    pub cohorts: BTreeMap<String, u64>,
    pub columns: Option<Columns>,
    pub alpha: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortSummaryRow {
    pub cohort: String,
    pub participants: u64,
    pub mean_age: Option<f64>,
    pub sd_age: Option<f64>,
    #[serde(rename = "mean_BrainPAD")]
    pub mean_brainpad: Option<f64>,
    #[serde(rename = "sd_BrainPAD")]
    pub sd_brainpad: Option<f64>,
    #[serde(rename = "mean_BrainAge")]
    pub mean_brain_age: Option<f64>,
    #[serde(rename = "sd_BrainAge")]
    pub sd_brain_age: Option<f64>,
    pub num_male: Option<u64>,
    pub num_female: Option<u64>,
    pub ais_distribution: Option<BTreeMap<String, u64>>,
    pub mean_time_since_injury: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalityEntry {
    pub slice: String,
    pub n: Option<u64>,
    pub shapiro_w: Option<f64>,
    pub shapiro_p: Option<f64>,
    pub ks_d: Option<f64>,
    pub ks_p: Option<f64>,
    pub verdict: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonEntry {
    pub group1: String,
    pub group2: String,
    pub test: String,
    pub statistic: f64,
    pub p_value: f64,
    pub effect_size_kind: String,
    pub effect_size: f64,
    pub magnitude: String,
    pub n1: u64,
    pub n2: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonFailureEntry {
    pub group1: String,
    pub group2: String,
    pub n1: u64,
    pub n2: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonSetEntry {
    pub name: String,
    pub variable: String,
    pub stratum: Option<String>,
    pub verdict: Option<String>,
    pub skipped: Option<String>,
    pub results: Vec<ComparisonEntry>,
    pub failures: Vec<ComparisonFailureEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChiSquareEntry {
    pub statistic: f64,
    pub dof: u64,
    pub p_value: f64,
    pub yates_corrected: bool,
    pub cramers_v: f64,
    pub rows: Vec<String>,
    pub cols: Vec<String>,
    pub observed: Vec<Vec<f64>>,
    pub expected: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionEntry {
    pub n: u64,
    pub intercept: f64,
    pub slope: f64,
    pub slope_se: f64,
    pub slope_t: f64,
    pub slope_p_value: f64,
    pub r_squared: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrainPadReportV1 {
    pub tool: String,
    pub version: String,
    pub schema_version: String,
    pub input_meta: InputMeta,
    pub cohort_summary: Vec<CohortSummaryRow>,
    pub normality: Vec<NormalityEntry>,
    pub comparisons: Vec<ComparisonSetEntry>,
    pub ais_chi_square: Option<ChiSquareEntry>,
    pub time_since_injury_regression: Option<RegressionEntry>,
    pub warnings: Vec<String>,
}

impl BrainPadReportV1 {
    pub fn empty(tool_version: &str, alpha: f64) -> Self {
        Self {
            tool: "brainpad-stats".to_string(),
            version: tool_version.to_string(),
            schema_version: "v1".to_string(),
            input_meta: InputMeta {
                path: String::new(),
                rows: None,
                cohorts: BTreeMap::new(),
                columns: None,
                alpha,
            },
            cohort_summary: Vec::new(),
            normality: Vec::new(),
            comparisons: Vec::new(),
            ais_chi_square: None,
            time_since_injury_regression: None,
            warnings: Vec::new(),
        }
    }
}
