use anyhow::Result;
use tracing::{info, warn};

use crate::cohort::select::{ais_crosstab, time_since_injury_vs_brainpad};
use crate::cohort::{COL_AIS, COL_TIME_SINCE_INJURY};
use crate::compare::{CompareError, chi2_contingency, ols_fit};
use crate::ctx::{AisAssociation, Ctx};
use crate::pipeline::Stage;

pub struct Stage5Association;

impl Stage5Association {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage5Association {
    fn name(&self) -> &'static str {
        "stage5_association"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let table = ctx.table()?;
        let cols = table.columns;

        let ais = if cols.ais {
            let crosstab = ais_crosstab(table);
            chi2_contingency(&crosstab).map(|result| AisAssociation {
                table: crosstab,
                result,
            })
        } else {
            Err(CompareError::MissingColumn(COL_AIS.to_string()))
        };

        let regression = if cols.time_since_injury {
            let (x, y) = time_since_injury_vs_brainpad(table);
            ols_fit(&x, &y)
        } else {
            Err(CompareError::MissingColumn(COL_TIME_SINCE_INJURY.to_string()))
        };

        match &ais {
            Ok(a) => info!(
                chi2 = a.result.statistic,
                dof = a.result.dof,
                p_value = a.result.p_value,
                "ais_chi_square_ready"
            ),
            Err(err) => {
                warn!(error = %err, "ais_chi_square_unavailable");
                ctx.warnings.push(format!("AIS chi-square: {}", err));
            }
        }
        match &regression {
            Ok(fit) => info!(
                n = fit.n,
                slope = fit.slope,
                p_value = fit.slope_p_value,
                r_squared = fit.r_squared,
                "time_since_injury_regression_ready"
            ),
            Err(err) => {
                warn!(error = %err, "time_since_injury_regression_unavailable");
                ctx.warnings
                    .push(format!("BrainPAD vs time since SCI regression: {}", err));
            }
        }

        ctx.ais_association = Some(ais);
        ctx.tsi_regression = Some(regression);
        Ok(())
    }
}
