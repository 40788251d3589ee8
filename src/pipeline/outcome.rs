//! Per-Record Outcomes
//!
//! Every processed record resolves to exactly one `Outcome`; failures are
//! data, not exceptions, so one record can never abort the batch.

/// Why a record was skipped
#[derive(Debug, Clone)]
pub enum SkipReason {
    /// Backend unreachable or exhausted its retry budget
    Transport(String),
    /// A required section was missing from the model output
    Parse(String),
    /// Extracted fields failed the validation gate
    Validation(String),
    /// The store rejected the write
    Store(String),
}

impl SkipReason {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Parse(_) => "parse",
            Self::Validation(_) => "validation",
            Self::Store(_) => "store",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Transport(msg) | Self::Parse(msg) | Self::Validation(msg) | Self::Store(msg) => {
                msg
            }
        }
    }
}

/// Terminal state of one record
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Clone written to the store (`clone_id` is None on a dry run)
    Committed { clone_id: Option<String> },
    Skipped(SkipReason),
}

/// Accumulated counts for one pipeline pass
#[derive(Debug, Default, Clone)]
pub struct PassSummary {
    pub processed: usize,
    pub committed: usize,
    pub skipped_transport: usize,
    pub skipped_parse: usize,
    pub skipped_validation: usize,
    pub skipped_store: usize,
}

impl PassSummary {
    pub fn record(&mut self, outcome: &Outcome) {
        self.processed += 1;
        match outcome {
            Outcome::Committed { .. } => self.committed += 1,
            Outcome::Skipped(SkipReason::Transport(_)) => self.skipped_transport += 1,
            Outcome::Skipped(SkipReason::Parse(_)) => self.skipped_parse += 1,
            Outcome::Skipped(SkipReason::Validation(_)) => self.skipped_validation += 1,
            Outcome::Skipped(SkipReason::Store(_)) => self.skipped_store += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped_transport + self.skipped_parse + self.skipped_validation + self.skipped_store
    }
}
