//! LAA status updates for linked cases.
//!
//! One update allocates a single transaction id in its own committed step, then runs the
//! status pre-checks and applies the stages in [`StatusStage::ORDER`] inside one store
//! transaction. A failed pre-check or stage leaves none of the earlier stages visible.
//! The transaction id of a failed update is never reissued.

pub mod router;
mod stages;


use std::sync::Arc;

use chrono::Local;
use serde::Serialize;
use tracing::{info, info_span};

use crate::config::ProcessingConfig;
use crate::domain::messages::{non_blank, StatusUpdateRequest};
use crate::domain::{
    CaseId, ConflictError, CourtDataError, MaatId, TransactionId, ValidationError,
    ValidationMessages,
};
use crate::store::{CourtDataRepository, CourtDataStore};

pub use router::status_router;
pub use stages::StatusStage;
use stages::StatusBatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateOutcome {
    pub maat_id: MaatId,
    pub case_id: CaseId,
    pub tx_id: TransactionId,
    pub result_codes_created: usize,
}

pub struct StatusUpdateService<S> {
    store: Arc<S>,
    config: ProcessingConfig,
}

impl<S> StatusUpdateService<S>
where
    S: CourtDataStore,
{
    pub fn new(store: Arc<S>, config: ProcessingConfig) -> Self {
        Self { store, config }
    }

    pub fn execute(
        &self,
        request: &StatusUpdateRequest,
    ) -> Result<StatusUpdateOutcome, CourtDataError> {
        let maat_id = match request.maat_id {
            Some(id) if id > 0 => MaatId(id),
            raw => return Err(ValidationError::InvalidMaatId(raw).into()),
        };
        let span = info_span!(
            "laa_status_update",
            %maat_id,
            laa_transaction_id = ?request.laa_transaction_id
        );
        let _entered = span.enter();
        let now = Local::now();
        let tx_id = self.store.next_transaction_id()?;
        info!(%tx_id, "status update transaction allocated");

        self.store.transaction(|repo| {
            if let Some(first) = status_failures(repo, request)?.into_iter().next() {
                return Err(first);
            }

            let mut batch = StatusBatch {
                repo,
                request,
                config: &self.config,
                maat_id,
                tx_id,
                now,
                link: None,
                result_codes_created: 0,
            };
            for stage in StatusStage::ORDER {
                stage.apply(&mut batch)?;
                info!(stage = stage.label(), %tx_id, "status update stage complete");
            }

            let case_id = match &batch.link {
                Some(link) => link.case_id,
                None => return Err(ConflictError::NotLinked(maat_id).into()),
            };
            Ok(StatusUpdateOutcome {
                maat_id,
                case_id,
                tx_id,
                result_codes_created: batch.result_codes_created,
            })
        })
    }

    /// Evaluates every pre-check and reports all failures together. Writes nothing.
    pub fn validate(
        &self,
        request: &StatusUpdateRequest,
    ) -> Result<ValidationMessages, CourtDataError> {
        self.store
            .dry_run(|repo| validate_status_update(repo, request))
    }
}

/// Aggregated pre-check for a status update: maat id, active link, and case URN.
pub fn validate_status_update(
    repo: &dyn CourtDataRepository,
    request: &StatusUpdateRequest,
) -> Result<ValidationMessages, CourtDataError> {
    let mut messages = ValidationMessages::default();
    for failure in status_failures(repo, request)? {
        messages.push(failure);
    }
    Ok(messages)
}

/// Pre-check failures in reporting order.
fn status_failures(
    repo: &dyn CourtDataRepository,
    request: &StatusUpdateRequest,
) -> Result<Vec<CourtDataError>, CourtDataError> {
    let mut failures: Vec<CourtDataError> = Vec::new();

    let maat_id = match request.maat_id {
        Some(id) if id > 0 && repo.find_rep_order(MaatId(id))?.is_some() => Some(MaatId(id)),
        raw => {
            failures.push(ValidationError::InvalidMaatId(raw).into());
            None
        }
    };

    let link = match maat_id {
        Some(maat_id) => {
            let link = repo.find_active_link(maat_id)?;
            if link.is_none() {
                failures.push(ConflictError::NotLinked(maat_id).into());
            }
            link
        }
        None => None,
    };

    match non_blank(request.case_urn.as_deref()) {
        None => failures.push(ValidationError::MissingCaseUrn.into()),
        Some(case_urn) => {
            if let Some(link) = &link {
                if !link.case_urn.trim().eq_ignore_ascii_case(case_urn.trim()) {
                    failures.push(ValidationError::CaseUrnMismatch.into());
                }
            }
        }
    }

    Ok(failures)
}
