//! Recount judge verdicts from a saved generation results file

use std::path::Path;

use tracing::{info, warn};

use super::read_columns;
use crate::domain::evaluation::{Verdict, VerdictTally};
use crate::domain::DomainError;

/// Tally the `evaluation` column of a results CSV
///
/// Verdicts other than the two expected tokens are logged and left out of
/// both the numerator and the denominator.
pub fn count_verdicts(path: &Path) -> Result<VerdictTally, DomainError> {
    let rows = read_columns(path, &["evaluation"])?;
    let mut tally = VerdictTally::default();

    for (idx, columns) in rows.iter().enumerate() {
        let raw = columns.first().map(String::as_str).unwrap_or("");
        let verdict = Verdict::parse(raw);

        if let Verdict::Unrecognized(ref normalized) = verdict {
            warn!(row = idx + 1, verdict = ?normalized, "Unrecognized verdict");
        }
        tally.record(&verdict);
    }

    info!(path = %path.display(), %tally, "Counted verdicts");
    Ok(tally)
}
