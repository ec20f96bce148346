//! Self-healing of the CJS result code reference table.
//!
//! Court events may reference result codes this system has never seen. Instead of rejecting the
//! event, a placeholder row is created and routed to the user interventions queue so a caseworker
//! can classify it.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::domain::{ContractViolation, CourtDataError, ResultCodeLookup, WqType};
use crate::store::{CourtDataRepository, CourtDataStore, StoreError};

/// Author stamped on rows created without human involvement.
pub const AUTO_USER: &str = "AUTO";
pub const ENGLAND_AND_WALES: &str = "Y";

pub fn new_result_code_description(code: i64) -> String {
    format!(
        "New Result code {code} has been received and automatically added to the Intervention \
         queue. Please contact support."
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCodeHealing {
    AlreadyKnown,
    Created,
}

/// Ensures `code` exists in the reference table, inserting a placeholder row when it is missing.
///
/// Runs inside the caller's transaction. A concurrent insert of the same code surfaces as a
/// uniqueness conflict and is reported as [`ResultCodeHealing::AlreadyKnown`].
pub fn heal_result_code(
    repo: &dyn CourtDataRepository,
    code: Option<i64>,
    today: NaiveDate,
) -> Result<ResultCodeHealing, CourtDataError> {
    let code = code.ok_or(ContractViolation::NullResultCode)?;

    if repo.find_result_code(code)?.is_some() {
        debug!(result_code = code, "result code already present");
        return Ok(ResultCodeHealing::AlreadyKnown);
    }

    let lookup = ResultCodeLookup {
        cjs_result_code: code,
        result_description: new_result_code_description(code),
        england_and_wales: ENGLAND_AND_WALES.to_string(),
        wq_type: WqType::UserInterventionsQueue,
        created_user: AUTO_USER.to_string(),
        created_date: today,
    };

    match repo.insert_result_code(&lookup) {
        Ok(()) => {
            info!(
                result_code = code,
                "unknown result code added to the user interventions queue"
            );
            Ok(ResultCodeHealing::Created)
        }
        Err(StoreError::Conflict(detail)) => {
            debug!(result_code = code, %detail, "result code created concurrently");
            Ok(ResultCodeHealing::AlreadyKnown)
        }
        Err(other) => Err(other.into()),
    }
}

/// Entry point for standalone result code events.
pub struct ResultCodeProcessor<S> {
    store: Arc<S>,
}

impl<S> ResultCodeProcessor<S>
where
    S: CourtDataStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn process_result_code(
        &self,
        code: Option<i64>,
    ) -> Result<ResultCodeHealing, CourtDataError> {
        let code = code.ok_or(ContractViolation::NullResultCode)?;
        let today = Local::now().date_naive();
        self.store
            .transaction(|repo| heal_result_code(repo, Some(code), today))
    }
}
