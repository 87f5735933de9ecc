use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::cohort::{CohortSummary, CohortTable};
use crate::compare::{
    CompareError, ComparisonSet, ContingencyResult, ContingencyTable, DEFAULT_ALPHA,
    NormalityReport, NormalityVerdict, OlsFit,
};
use crate::schema::v1::BrainPadReportV1;

/// Normality slice keys, one per outcome variable and dataset slice.
pub const SLICE_BRAINPAD: &str = "brainpad";
pub const SLICE_BRAINPAD_AIS: &str = "brainpad_ais";
pub const SLICE_TIME_SINCE_INJURY: &str = "time_since_injury";
pub const SLICE_AGE: &str = "age";

pub const NORMALITY_SLICES: [&str; 4] = [
    SLICE_BRAINPAD,
    SLICE_BRAINPAD_AIS,
    SLICE_TIME_SINCE_INJURY,
    SLICE_AGE,
];

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub out_dir: PathBuf,
    pub json_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AisAssociation {
    pub table: ContingencyTable,
    pub result: ContingencyResult,
}

#[derive(Debug)]
pub struct Ctx {
    pub input: PathBuf,
    pub alpha: f64,
    pub write_json: bool,
    pub write_tsv: bool,
    pub threads: usize,
    pub warnings: Vec<String>,
    pub table: Option<CohortTable>,
    pub cohort_summary: Vec<CohortSummary>,
    pub normality: BTreeMap<String, Result<NormalityReport, CompareError>>,
    pub comparison_sets: Vec<ComparisonSet>,
    pub ais_association: Option<Result<AisAssociation, CompareError>>,
    pub tsi_regression: Option<Result<OlsFit, CompareError>>,
    pub output: OutputPaths,
    pub report: BrainPadReportV1,
}

impl Ctx {
    pub fn new(
        input: PathBuf,
        out_dir: PathBuf,
        write_json: bool,
        write_tsv: bool,
        tool_version: &str,
    ) -> Self {
        let json_path = out_dir.join("brainpad_report.json");
        Self {
            input,
            alpha: DEFAULT_ALPHA,
            write_json,
            write_tsv,
            threads: 0,
            warnings: Vec::new(),
            table: None,
            cohort_summary: Vec::new(),
            normality: BTreeMap::new(),
            comparison_sets: Vec::new(),
            ais_association: None,
            tsi_regression: None,
            output: OutputPaths { out_dir, json_path },
            report: BrainPadReportV1::empty(tool_version, DEFAULT_ALPHA),
        }
    }

    pub fn table(&self) -> anyhow::Result<&CohortTable> {
        self.table
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("cohort table not loaded"))
    }

    /// Verdict of a normality slice, or the reason it is unavailable.
    pub fn verdict(&self, slice: &str) -> Result<NormalityVerdict, String> {
        match self.normality.get(slice) {
            Some(Ok(report)) => Ok(report.verdict),
            Some(Err(err)) => Err(format!("normality not determined for '{slice}': {err}")),
            None => Err(format!("normality not computed for '{slice}'")),
        }
    }

    pub fn comparison_set(&self, name: &str) -> impl Iterator<Item = &ComparisonSet> + '_ {
        let name = name.to_string();
        self.comparison_sets.iter().filter(move |s| s.name == name)
    }
}
