use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::config::ProcessingConfig;
use crate::domain::messages::{LinkRequest, OffenceDetails, ResultDetails, SessionDetails};
use crate::domain::{
    CommonPlatformData, CrownCourtCode, DefendantMaatData, MaatId, RepOrder, SolicitorMaatData,
};
use crate::link::LinkService;
use crate::store::testing::InstrumentedStore;
use crate::store::SqliteStore;

pub(super) const MAAT_ID: i64 = 5635566;
pub(super) const CASE_URN: &str = "EITHERWAY";
pub(super) const COURT_LOCATION: &str = "B16BG";

/// Seeds everything a link for `maat_id` needs on the MAAT side.
pub(super) fn seed_application(store: &SqliteStore, maat_id: i64) {
    let maat_id = MaatId(maat_id);
    store
        .save_rep_order(&RepOrder::new(maat_id))
        .expect("rep order seeds");
    store
        .save_common_platform_data(&CommonPlatformData {
            rep_order_id: maat_id,
            case_urn: Some(CASE_URN.to_string()),
            defendant_id: Some("556677".to_string()),
        })
        .expect("cp data seeds");
    store
        .save_solicitor_maat_data(&SolicitorMaatData {
            maat_id,
            account_code: Some("0D088G".to_string()),
            account_name: Some("Marsh Bourne & Co".to_string()),
        })
        .expect("solicitor seeds");
    store
        .save_defendant_maat_data(&DefendantMaatData {
            maat_id,
            first_name: Some("Jane".to_string()),
            last_name: Some("Doe".to_string()),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 12),
            ni_number: Some("AB123456C".to_string()),
        })
        .expect("defendant seeds");
    store
        .save_crown_court_code(&CrownCourtCode {
            ou_code: COURT_LOCATION.to_string(),
            code: "433".to_string(),
        })
        .expect("court code seeds");
}

pub(super) fn seeded_store() -> Arc<InstrumentedStore> {
    let store = Arc::new(InstrumentedStore::new());
    seed_application(store.inner(), MAAT_ID);
    store
}

pub(super) fn service(store: &Arc<InstrumentedStore>) -> LinkService<InstrumentedStore> {
    LinkService::new(Arc::clone(store), ProcessingConfig::new("mla"))
}

pub(super) fn link_request() -> LinkRequest {
    LinkRequest {
        maat_id: Some(MAAT_ID),
        case_urn: Some(CASE_URN.to_string()),
        laa_transaction_id: Some("b27b97e4-0514-42c4-8e09-fcc2c693e11f".to_string()),
        asn: Some("1101ZD0100000377623T".to_string()),
        cjs_area_code: Some("16".to_string()),
        cjs_location: Some(COURT_LOCATION.to_string()),
        doc_language: Some("EN".to_string()),
        case_creation_date: Some("2024-01-15".to_string()),
        created_user: Some("caseworker".to_string()),
        category: Some(12),
        sessions: vec![
            SessionDetails {
                court_location: Some(COURT_LOCATION.to_string()),
                date_of_hearing: Some("2024-02-01".to_string()),
                post_hearing_custody: Some("R".to_string()),
            },
            SessionDetails {
                court_location: Some(COURT_LOCATION.to_string()),
                date_of_hearing: Some("2024-03-01".to_string()),
                post_hearing_custody: None,
            },
        ],
        offences: vec![OffenceDetails {
            asn_seq: Some("001".to_string()),
            offence_code: Some("CJ03523".to_string()),
            offence_short_title: Some("Common assault".to_string()),
            legal_aid_status: Some("AP".to_string()),
            legal_aid_status_date: Some("2024-01-20".to_string()),
            results: vec![ResultDetails {
                result_code: Some(3026),
            }],
        }],
    }
}

pub(super) fn json_request(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header("Laa-Transaction-Id", "b27b97e4")
        .body(Body::from(serde_json::to_vec(body).expect("body serializes")))
        .expect("request builds")
}

pub(super) async fn read_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    serde_json::from_slice(&bytes).expect("body is json")
}
