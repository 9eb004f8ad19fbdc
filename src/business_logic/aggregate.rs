use serde::Serialize;
use utoipa::ToSchema;

use crate::business_logic::double_top::PatternCandidate;

/// Confirmed vs unconfirmed candidate counts for one instrument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct InstrumentTally {
    pub symbol: String,
    pub confirmed: usize,
    pub unconfirmed: usize,
}

impl InstrumentTally {
    pub fn from_candidates(symbol: impl Into<String>, candidates: &[PatternCandidate]) -> Self {
        let confirmed = candidates.iter().filter(|c| c.confirmed).count();
        Self {
            symbol: symbol.into(),
            confirmed,
            unconfirmed: candidates.len() - confirmed,
        }
    }

    pub fn total(&self) -> usize {
        self.confirmed + self.unconfirmed
    }
}

/// Batch-wide tally across instruments.
///
/// Proportions are `None` when the batch produced no candidates at all.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BatchSummary {
    pub instruments: Vec<InstrumentTally>,
    pub total_confirmed: usize,
    pub total_unconfirmed: usize,
    pub total_candidates: usize,
    pub confirmed_proportion: Option<f64>,
    pub unconfirmed_proportion: Option<f64>,
}

impl BatchSummary {
    pub fn empty() -> Self {
        summarize(Vec::new())
    }
}

pub fn summarize(instruments: Vec<InstrumentTally>) -> BatchSummary {
    let total_confirmed: usize = instruments.iter().map(|t| t.confirmed).sum();
    let total_unconfirmed: usize = instruments.iter().map(|t| t.unconfirmed).sum();
    let total_candidates = total_confirmed + total_unconfirmed;

    BatchSummary {
        instruments,
        total_confirmed,
        total_unconfirmed,
        total_candidates,
        confirmed_proportion: proportion(total_confirmed, total_candidates),
        unconfirmed_proportion: proportion(total_unconfirmed, total_candidates),
    }
}

fn proportion(part: usize, total: usize) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(part as f64 / total as f64)
}
