//! Records read and written by the court data pipelines.
//!
//! MAAT-side records (rep orders, common platform data, solicitor and defendant views) are owned
//! by the legal-aid subsystem and only read here. Work-queue records are written once per
//! business operation and always carry the operation's transaction id.

pub mod errors;
pub mod messages;

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub use errors::{
    ConflictError, ContractViolation, CourtDataError, FatalLookupError, NotFoundError,
    ValidationError, ValidationMessages,
};

/// Identifier of a legal-aid application (and of its rep order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaatId(pub i64);

impl fmt::Display for MaatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Correlates and audits every write made by one business operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub i64);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Internal identifier of a linked court case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(pub i64);

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Legal-aid representation order keyed by MAAT id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepOrder {
    pub id: MaatId,
    pub apty_code: Option<String>,
    pub caty_case_type: Option<String>,
    pub date_modified: Option<NaiveDateTime>,
    pub user_modified: Option<String>,
    pub sentence_order_date: Option<NaiveDate>,
    pub appeal_sentence_order_date: Option<NaiveDate>,
    pub appeal_sentence_date_changed: Option<NaiveDate>,
}

impl RepOrder {
    pub fn new(id: MaatId) -> Self {
        Self {
            id,
            apty_code: None,
            caty_case_type: None,
            date_modified: None,
            user_modified: None,
            sentence_order_date: None,
            appeal_sentence_order_date: None,
            appeal_sentence_date_changed: None,
        }
    }
}

/// Case reference supplied by the common platform against a rep order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonPlatformData {
    pub rep_order_id: MaatId,
    pub case_urn: Option<String>,
    pub defendant_id: Option<String>,
}

/// Solicitor details held on the MAAT application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolicitorMaatData {
    pub maat_id: MaatId,
    pub account_code: Option<String>,
    pub account_name: Option<String>,
}

/// Defendant details held on the MAAT application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefendantMaatData {
    pub maat_id: MaatId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub ni_number: Option<String>,
}

/// Maps a court-location (OU) code onto the internal crown court code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrownCourtCode {
    pub ou_code: String,
    pub code: String,
}

/// Reference row translating a CJS result code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCodeLookup {
    pub cjs_result_code: i64,
    pub result_description: String,
    pub england_and_wales: String,
    pub wq_type: WqType,
    pub created_user: String,
    pub created_date: NaiveDate,
}

/// Work-queue classification stamped on work-queue and reference rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WqType {
    CaseLink,
    CaseUnlink,
    StatusUpdate,
    UserInterventionsQueue,
}

impl WqType {
    pub const fn code(self) -> i64 {
        match self {
            WqType::CaseLink => 1,
            WqType::CaseUnlink => 2,
            WqType::StatusUpdate => 4,
            WqType::UserInterventionsQueue => 8,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(WqType::CaseLink),
            2 => Some(WqType::CaseUnlink),
            4 => Some(WqType::StatusUpdate),
            8 => Some(WqType::UserInterventionsQueue),
            _ => None,
        }
    }
}

/// Append-only association between a MAAT application and a court case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub maat_id: MaatId,
    pub case_id: CaseId,
    pub case_urn: String,
    pub created_tx_id: TransactionId,
    pub cjs_area_code: Option<String>,
    pub maat_cat: i64,
    pub mlr_cat: i64,
    pub created_date: NaiveDate,
    pub removed_tx_id: Option<TransactionId>,
    pub removed_date: Option<NaiveDateTime>,
    pub status_tx_id: Option<TransactionId>,
}

impl LinkRecord {
    pub fn is_active(&self) -> bool {
        self.removed_tx_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub tx_id: TransactionId,
    pub case_id: CaseId,
    pub asn: Option<String>,
    pub cjs_area_code: Option<String>,
    pub case_urn: Option<String>,
    pub doc_language: Option<String>,
    pub inactive: bool,
    pub creation_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WqCoreRecord {
    pub tx_id: TransactionId,
    pub case_id: CaseId,
    pub maat_id: MaatId,
    pub wq_type: WqType,
    pub created_user: String,
    pub created_time: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolicitorRecord {
    pub tx_id: TransactionId,
    pub case_id: CaseId,
    pub law_firm_name: Option<String>,
    pub account_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefendantRecord {
    pub tx_id: TransactionId,
    pub case_id: CaseId,
    pub forename: Option<String>,
    pub surname: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub ni_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub tx_id: TransactionId,
    pub case_id: CaseId,
    pub court_location: Option<String>,
    pub date_of_hearing: Option<NaiveDate>,
    pub post_hearing_custody: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffenceRecord {
    pub tx_id: TransactionId,
    pub case_id: CaseId,
    pub asn_seq: Option<String>,
    pub offence_code: Option<String>,
    pub offence_short_title: Option<String>,
    pub legal_aid_status: Option<String>,
    pub legal_aid_status_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub tx_id: TransactionId,
    pub case_id: CaseId,
    pub asn_seq: Option<String>,
    pub result_code: i64,
}

/// Positional parameters of the crown court outcome stored write:
/// `(maat_id, outcome, bench_warrant_issued, appeal_type, imprisoned, case_urn, crown_court_code)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrownCourtOutcomeWrite {
    pub maat_id: MaatId,
    pub outcome: Option<String>,
    pub bench_warrant_issued: Option<String>,
    pub appeal_type: Option<String>,
    pub imprisoned: Option<String>,
    pub case_urn: Option<String>,
    pub crown_court_code: String,
}
