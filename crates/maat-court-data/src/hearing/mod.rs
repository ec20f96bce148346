//! Hearing result events: result code healing followed by the crown court outcome.
//! The two steps commit separately.

mod crown_court;


use std::sync::Arc;

use chrono::Local;
use tracing::{info, info_span};

use crate::config::ProcessingConfig;
use crate::domain::messages::HearingResultEvent;
use crate::domain::CourtDataError;
use crate::reference::{heal_result_code, ResultCodeHealing};
use crate::store::CourtDataStore;

pub use crown_court::{
    process_crown_court_outcome, CrownCourtOutcome, SentenceDateWrite, APPEAL_CASE_TYPE,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HearingOutcome {
    pub result_codes_created: usize,
    /// `None` when the event carried no crown court outcome data.
    pub crown_court: Option<CrownCourtOutcome>,
}

pub struct HearingResultService<S> {
    store: Arc<S>,
    config: ProcessingConfig,
}

impl<S> HearingResultService<S>
where
    S: CourtDataStore,
{
    pub fn new(store: Arc<S>, config: ProcessingConfig) -> Self {
        Self { store, config }
    }

    /// Heals every result code the event references, then applies its crown court outcome.
    /// Healing commits in its own transaction first, so the reference codes survive a crown
    /// court step that fails.
    pub fn process(&self, event: &HearingResultEvent) -> Result<HearingOutcome, CourtDataError> {
        let span = info_span!(
            "hearing_resulted",
            maat_id = event.maat_id,
            laa_transaction_id = ?event.laa_transaction_id
        );
        let _entered = span.enter();
        let today = Local::now().date_naive();

        let result_codes_created = self.store.transaction(|repo| {
            let mut created = 0;
            for code in event.result_codes() {
                if heal_result_code(repo, code, today)? == ResultCodeHealing::Created {
                    created += 1;
                }
            }
            Ok::<_, CourtDataError>(created)
        })?;
        if result_codes_created > 0 {
            info!(result_codes_created, "result codes healed");
        }

        let crown_court = match event.cc_outcome_data {
            Some(_) => Some(self.store.transaction(|repo| {
                process_crown_court_outcome(repo, event, &self.config, today)
            })?),
            None => None,
        };

        Ok(HearingOutcome {
            result_codes_created,
            crown_court,
        })
    }
}
