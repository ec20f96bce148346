#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use maat_court_data::config::ProcessingConfig;
use maat_court_data::domain::messages::{LinkRequest, OffenceDetails, ResultDetails, SessionDetails};
use maat_court_data::domain::{
    CommonPlatformData, CrownCourtCode, DefendantMaatData, MaatId, RepOrder, SolicitorMaatData,
};
use maat_court_data::store::SqliteStore;

pub const CASE_URN: &str = "TFIT4421";
pub const COURT_LOCATION: &str = "C22SR";
pub const CROWN_COURT_CODE: &str = "459";

pub fn config() -> ProcessingConfig {
    ProcessingConfig::new("mla")
}

pub fn store() -> Arc<SqliteStore> {
    let store = SqliteStore::in_memory().expect("in-memory store opens");
    store
        .save_crown_court_code(&CrownCourtCode {
            ou_code: COURT_LOCATION.to_string(),
            code: CROWN_COURT_CODE.to_string(),
        })
        .expect("court code seeds");
    Arc::new(store)
}

/// Seeds the MAAT side of an application so it can be linked.
pub fn seed_application(store: &SqliteStore, maat_id: i64, rep_order: impl FnOnce(&mut RepOrder)) {
    let maat_id = MaatId(maat_id);
    let mut order = RepOrder::new(maat_id);
    rep_order(&mut order);
    store.save_rep_order(&order).expect("rep order seeds");
    store
        .save_common_platform_data(&CommonPlatformData {
            rep_order_id: maat_id,
            case_urn: Some(CASE_URN.to_string()),
            defendant_id: Some("1188".to_string()),
        })
        .expect("cp data seeds");
    store
        .save_solicitor_maat_data(&SolicitorMaatData {
            maat_id,
            account_code: Some("2B345C".to_string()),
            account_name: Some("Hart Legal".to_string()),
        })
        .expect("solicitor seeds");
    store
        .save_defendant_maat_data(&DefendantMaatData {
            maat_id,
            first_name: Some("Sam".to_string()),
            last_name: Some("Carter".to_string()),
            date_of_birth: NaiveDate::from_ymd_opt(1979, 11, 30),
            ni_number: None,
        })
        .expect("defendant seeds");
}

pub fn link_request(maat_id: i64) -> LinkRequest {
    LinkRequest {
        maat_id: Some(maat_id),
        case_urn: Some(CASE_URN.to_string()),
        asn: Some("2101ZD0100000448754K".to_string()),
        cjs_area_code: Some("05".to_string()),
        cjs_location: Some(COURT_LOCATION.to_string()),
        doc_language: Some("EN".to_string()),
        sessions: vec![SessionDetails {
            court_location: Some(COURT_LOCATION.to_string()),
            date_of_hearing: Some("2024-04-02".to_string()),
            post_hearing_custody: None,
        }],
        offences: vec![OffenceDetails {
            asn_seq: Some("001".to_string()),
            offence_code: Some("TH68001".to_string()),
            results: vec![ResultDetails {
                result_code: Some(3026),
            }],
            ..OffenceDetails::default()
        }],
        ..LinkRequest::default()
    }
}
