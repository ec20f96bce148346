use serde::Serialize;

use super::MaatId;
use crate::store::StoreError;

/// Malformed or rule-violating request; correctable by the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{}", invalid_maat_id_message(.0))]
    InvalidMaatId(Option<i64>),
    #[error("CaseURN can't be null or empty on request.")]
    MissingCaseUrn,
    #[error("MAATId: {0} has not caseURN entered on MAAT application")]
    CaseUrnNotEntered(MaatId),
    #[error("CaseURN on request doesn't match with that on MAAT application.")]
    CaseUrnMismatch,
}

fn invalid_maat_id_message(maat_id: &Option<i64>) -> String {
    match maat_id {
        Some(id) => format!("{id} is Not a Valid MAAT ID"),
        None => "MAAT id is missing.".to_string(),
    }
}

/// A referenced entity is absent; points at data-integrity or event-ordering trouble.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotFoundError {
    #[error("MaatId {0} has no common platform data created against Maat application.")]
    MissingCommonPlatformData(MaatId),
    #[error("MaatId {0} has no defendant details on the MAAT application.")]
    MissingDefendantRecord(MaatId),
}

/// Link lifecycle conflicts; kept apart from validation so redelivery can be reasoned about.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConflictError {
    #[error("{0}: MaatId already linked to the application.")]
    AlreadyLinked(MaatId),
    #[error("{0}: MaatId is not linked to a court case.")]
    NotLinked(MaatId),
}

/// Required reference data is missing; the current event cannot be processed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FatalLookupError {
    #[error("Crown Court Code Look Up is Failed for court location '{0}'")]
    UnknownCourtCode(String),
}

/// The caller handed over an intrinsically invalid value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractViolation {
    #[error("A Null Result Code is passed in")]
    NullResultCode,
}

/// Error surfaced by every court data pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CourtDataError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    #[error(transparent)]
    FatalLookup(#[from] FatalLookupError),
    #[error(transparent)]
    Contract(#[from] ContractViolation),
    #[error("{operation} failed due to a system error")]
    System { operation: &'static str },
}

impl CourtDataError {
    /// Stable machine-readable code for API payloads and logs.
    pub fn code(&self) -> &'static str {
        match self {
            CourtDataError::Validation(ValidationError::InvalidMaatId(_)) => "INVALID_MAAT_ID",
            CourtDataError::Validation(ValidationError::MissingCaseUrn) => "MISSING_CASE_URN",
            CourtDataError::Validation(ValidationError::CaseUrnNotEntered(_)) => {
                "CASE_URN_NOT_ENTERED"
            }
            CourtDataError::Validation(ValidationError::CaseUrnMismatch) => "CASE_URN_MISMATCH",
            CourtDataError::NotFound(NotFoundError::MissingCommonPlatformData(_)) => {
                "MISSING_COMMON_PLATFORM_DATA"
            }
            CourtDataError::NotFound(NotFoundError::MissingDefendantRecord(_)) => {
                "MISSING_DEFENDANT_RECORD"
            }
            CourtDataError::Conflict(ConflictError::AlreadyLinked(_)) => "ALREADY_LINKED",
            CourtDataError::Conflict(ConflictError::NotLinked(_)) => "NOT_LINKED",
            CourtDataError::FatalLookup(FatalLookupError::UnknownCourtCode(_)) => {
                "UNKNOWN_COURT_CODE"
            }
            CourtDataError::Contract(ContractViolation::NullResultCode) => "NULL_RESULT_CODE",
            CourtDataError::System { .. } => "SYSTEM_ERROR",
        }
    }
}

/// Persistence failures never cross a pipeline boundary: the cause is logged and replaced with
/// an opaque system error.
impl From<StoreError> for CourtDataError {
    fn from(source: StoreError) -> Self {
        tracing::error!(error = %source, "persistence failure, rolling back");
        CourtDataError::System {
            operation: "court data persistence",
        }
    }
}

/// Every failing rule of a pre-check, reported together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationMessages {
    pub messages: Vec<String>,
}

impl ValidationMessages {
    pub fn push(&mut self, error: impl Into<CourtDataError>) {
        self.messages.push(error.into().to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_maat_id_messages_name_the_id() {
        assert_eq!(
            ValidationError::InvalidMaatId(None).to_string(),
            "MAAT id is missing."
        );
        assert_eq!(
            ValidationError::InvalidMaatId(Some(1000)).to_string(),
            "1000 is Not a Valid MAAT ID"
        );
    }

    #[test]
    fn store_failures_become_opaque() {
        let error = CourtDataError::from(StoreError::Unavailable("disk I/O error".to_string()));
        assert_eq!(error.code(), "SYSTEM_ERROR");
        assert!(!error.to_string().contains("disk"));
    }

    #[test]
    fn messages_collect_every_failure() {
        let mut messages = ValidationMessages::default();
        messages.push(ValidationError::MissingCaseUrn);
        messages.push(ConflictError::NotLinked(MaatId(12)));
        assert_eq!(
            messages.messages,
            vec![
                "CaseURN can't be null or empty on request.".to_string(),
                "12: MaatId is not linked to a court case.".to_string(),
            ]
        );
    }
}
