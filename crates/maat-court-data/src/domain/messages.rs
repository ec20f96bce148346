//! Inbound request and event payloads, as delivered by the HTTP surface and the queues.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{
    CaseId, DefendantMaatData, DefendantRecord, OffenceRecord, SessionRecord, SolicitorMaatData,
    SolicitorRecord, TransactionId,
};

/// Request to link a MAAT application with a common platform case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkRequest {
    pub maat_id: Option<i64>,
    pub case_urn: Option<String>,
    pub laa_transaction_id: Option<String>,
    pub asn: Option<String>,
    pub cjs_area_code: Option<String>,
    pub cjs_location: Option<String>,
    pub doc_language: Option<String>,
    pub case_creation_date: Option<String>,
    pub created_user: Option<String>,
    pub category: Option<i64>,
    pub sessions: Vec<SessionDetails>,
    pub offences: Vec<OffenceDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnlinkRequest {
    pub maat_id: Option<i64>,
    pub user_id: Option<String>,
    pub reason_id: Option<i64>,
    pub other_reason_text: Option<String>,
}

/// LAA status update applied to an already linked case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusUpdateRequest {
    pub maat_id: Option<i64>,
    pub case_urn: Option<String>,
    pub laa_transaction_id: Option<String>,
    pub asn: Option<String>,
    pub cjs_area_code: Option<String>,
    pub doc_language: Option<String>,
    pub category: Option<i64>,
    pub created_user: Option<String>,
    pub solicitor: Option<SolicitorDetails>,
    pub defendant: Option<DefendantDetails>,
    pub sessions: Vec<SessionDetails>,
    pub offences: Vec<OffenceDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HearingResultEvent {
    pub maat_id: i64,
    #[serde(default)]
    pub case_urn: Option<String>,
    #[serde(default)]
    pub laa_transaction_id: Option<String>,
    #[serde(default)]
    pub cc_outcome_data: Option<CcOutcomeData>,
    #[serde(default)]
    pub session: SessionDetails,
    #[serde(default)]
    pub offences: Vec<OffenceDetails>,
}

impl HearingResultEvent {
    /// Every result code referenced by the event's offences, in delivery order.
    pub fn result_codes(&self) -> impl Iterator<Item = Option<i64>> + '_ {
        self.offences
            .iter()
            .flat_map(|offence| offence.results.iter().map(|result| result.result_code))
    }
}

/// Crown court outcome captured after a hearing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CcOutcomeData {
    pub ccoo_outcome: Option<String>,
    pub bench_warrant_issued_yn: Option<String>,
    pub appeal_type: Option<String>,
    pub cc_imprisioned: Option<String>,
    pub case_end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResultCodeEvent {
    pub result_code: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionDetails {
    pub court_location: Option<String>,
    pub date_of_hearing: Option<String>,
    pub post_hearing_custody: Option<String>,
}

impl SessionDetails {
    pub fn to_record(&self, tx_id: TransactionId, case_id: CaseId) -> SessionRecord {
        SessionRecord {
            tx_id,
            case_id,
            court_location: self.court_location.clone(),
            date_of_hearing: self.date_of_hearing.as_deref().and_then(parse_event_date),
            post_hearing_custody: self.post_hearing_custody.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OffenceDetails {
    pub asn_seq: Option<String>,
    pub offence_code: Option<String>,
    pub offence_short_title: Option<String>,
    pub legal_aid_status: Option<String>,
    pub legal_aid_status_date: Option<String>,
    pub results: Vec<ResultDetails>,
}

impl OffenceDetails {
    pub fn to_record(&self, tx_id: TransactionId, case_id: CaseId) -> OffenceRecord {
        OffenceRecord {
            tx_id,
            case_id,
            asn_seq: self.asn_seq.clone(),
            offence_code: self.offence_code.clone(),
            offence_short_title: self.offence_short_title.clone(),
            legal_aid_status: self.legal_aid_status.clone(),
            legal_aid_status_date: self
                .legal_aid_status_date
                .as_deref()
                .and_then(parse_event_date),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResultDetails {
    pub result_code: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SolicitorDetails {
    pub law_firm_name: Option<String>,
    pub account_code: Option<String>,
}

impl SolicitorDetails {
    pub fn to_record(&self, tx_id: TransactionId, case_id: CaseId) -> SolicitorRecord {
        SolicitorRecord {
            tx_id,
            case_id,
            law_firm_name: self.law_firm_name.clone(),
            account_code: self.account_code.clone(),
        }
    }
}

impl From<&SolicitorMaatData> for SolicitorDetails {
    fn from(value: &SolicitorMaatData) -> Self {
        Self {
            law_firm_name: value.account_name.clone(),
            account_code: value.account_code.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DefendantDetails {
    pub forename: Option<String>,
    pub surname: Option<String>,
    pub date_of_birth: Option<String>,
    pub ni_number: Option<String>,
}

impl DefendantDetails {
    pub fn to_record(&self, tx_id: TransactionId, case_id: CaseId) -> DefendantRecord {
        DefendantRecord {
            tx_id,
            case_id,
            forename: self.forename.clone(),
            surname: self.surname.clone(),
            date_of_birth: self.date_of_birth.as_deref().and_then(parse_event_date),
            ni_number: self.ni_number.clone(),
        }
    }
}

impl DefendantMaatData {
    pub fn to_record(&self, tx_id: TransactionId, case_id: CaseId) -> DefendantRecord {
        DefendantRecord {
            tx_id,
            case_id,
            forename: self.first_name.clone(),
            surname: self.last_name.clone(),
            date_of_birth: self.date_of_birth,
            ni_number: self.ni_number.clone(),
        }
    }
}

/// Parses the date formats seen on inbound events: `YYYY-MM-DD`, or an RFC 3339 timestamp whose
/// calendar date is kept. Anything else yields `None`.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|timestamp| timestamp.date_naive())
        })
}

/// Trims a free-text field, treating blank values as absent.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
