use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::cohort::{
    COL_AGE, COL_AIS, COL_BRAIN_AGE, COL_BRAINPAD, COL_COHORT, COL_ID, COL_SEX,
    COL_TIME_SINCE_INJURY, CohortTable, ColumnPresence, SubjectRecord,
};
use crate::io::{delimited_reader, open_maybe_gz};

pub fn load_cohort_table(path: &Path) -> Result<CohortTable> {
    let reader = open_maybe_gz(path)
        .with_context(|| format!("failed to open cohort table {}", path.display()))?;
    let table = read_cohort_table(reader, delimiter_for(path), &path.display().to_string())?;
    info!(
        path = %path.display(),
        subjects = table.len(),
        "cohort_table_loaded"
    );
    Ok(table)
}

/// Tab for `.tsv`/`.tab`/`.txt` (optionally gzipped), comma otherwise.
pub fn delimiter_for(path: &Path) -> u8 {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    if name.ends_with(".tsv") || name.ends_with(".tab") || name.ends_with(".txt") {
        b'\t'
    } else {
        b','
    }
}

pub fn parse_cohort_table(content: &str, delimiter: u8, source: &str) -> Result<CohortTable> {
    read_cohort_table(content.as_bytes(), delimiter, source)
}

pub fn read_cohort_table<R: Read>(reader: R, delimiter: u8, source: &str) -> Result<CohortTable> {
    let mut rdr = delimited_reader(reader, delimiter);
    let header: Vec<String> = rdr
        .headers()
        .with_context(|| format!("{}: failed to read header", source))?
        .iter()
        .map(header_cell)
        .collect();
    if header.iter().all(|h| h.is_empty()) {
        bail!("{}: empty table", source);
    }
    let index: HashMap<&str, usize> = header
        .iter()
        .enumerate()
        .map(|(i, h)| (h.as_str(), i))
        .collect();

    let col = |name: &str| index.get(name).copied();
    let cohort_col = col(COL_COHORT)
        .ok_or_else(|| anyhow::anyhow!("{}: missing required column '{}'", source, COL_COHORT))?;
    let pad_col = col(COL_BRAINPAD);
    let age_col = col(COL_AGE);
    let brain_age_col = col(COL_BRAIN_AGE);
    if pad_col.is_none() && (age_col.is_none() || brain_age_col.is_none()) {
        bail!(
            "{}: missing required column '{}' (or both '{}' and '{}' to derive it)",
            source,
            COL_BRAINPAD,
            COL_AGE,
            COL_BRAIN_AGE
        );
    }
    let id_col = col(COL_ID);
    let sex_col = col(COL_SEX);
    let ais_col = col(COL_AIS);
    let tsi_col = col(COL_TIME_SINCE_INJURY);

    let columns = ColumnPresence {
        id: id_col.is_some(),
        age: age_col.is_some(),
        brain_age: brain_age_col.is_some(),
        sex: sex_col.is_some(),
        ais: ais_col.is_some(),
        time_since_injury: tsi_col.is_some(),
        brain_pad_derived: pad_col.is_none(),
    };

    let mut records = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let record =
            record.with_context(|| format!("{}: failed to read data row {}", source, idx))?;
        let get = |c: Option<usize>| c.and_then(|c| record.get(c));

        let Some(cohort) = get(Some(cohort_col)).and_then(text_cell) else {
            let line = record.position().map(|p| p.line());
            debug!(source, row = idx, line, "row without cohort skipped");
            continue;
        };

        let age = get(age_col).and_then(numeric_cell);
        let brain_age = get(brain_age_col).and_then(numeric_cell);
        let brain_pad = match pad_col {
            Some(_) => get(pad_col).and_then(numeric_cell),
            None => match (brain_age, age) {
                (Some(b), Some(a)) => Some(b - a),
                _ => None,
            },
        };

        records.push(SubjectRecord {
            id: get(id_col).and_then(text_cell),
            cohort,
            age,
            brain_age,
            brain_pad,
            sex: get(sex_col).and_then(text_cell),
            ais: get(ais_col).and_then(text_cell),
            time_since_injury: get(tsi_col).and_then(numeric_cell),
        });
    }

    Ok(CohortTable {
        records,
        columns,
        header,
    })
}

/// Coerces a cell to a finite number; anything else is missing.
pub fn numeric_cell(raw: &str) -> Option<f64> {
    let v: f64 = unquote(raw).parse().ok()?;
    v.is_finite().then_some(v)
}

pub fn text_cell(raw: &str) -> Option<String> {
    let t = unquote(raw);
    if t.is_empty() || is_missing_token(&t) {
        return None;
    }
    Some(t.into_owned())
}

fn header_cell(raw: &str) -> String {
    unquote(raw.trim_start_matches('\u{feff}')).into_owned()
}

/// Trims a cell and strips quotes the reader left in place, which happens
/// when whitespace precedes the opening quote (`a, "b"`).
pub fn unquote(raw: &str) -> Cow<'_, str> {
    let t = raw.trim();
    match t.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Some(inner) => Cow::Owned(inner.trim().replace("\"\"", "\"")),
        None => Cow::Borrowed(t),
    }
}

fn is_missing_token(t: &str) -> bool {
    matches!(
        t.to_ascii_lowercase().as_str(),
        "nan" | "na" | "n/a" | "none" | "null"
    )
}
