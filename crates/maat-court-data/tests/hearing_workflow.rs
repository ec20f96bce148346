mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use maat_court_data::domain::messages::{CcOutcomeData, HearingResultEvent, SessionDetails};
use maat_court_data::domain::{CourtDataError, MaatId, RepOrder};
use maat_court_data::hearing::{CrownCourtOutcome, HearingResultService, SentenceDateWrite};
use maat_court_data::store::{CourtDataStore, SqliteStore, Table};

const APPEAL_MAAT_ID: i64 = 4500701;
const TRIAL_MAAT_ID: i64 = 4500702;

fn hearing_event(maat_id: i64, payload: serde_json::Value) -> HearingResultEvent {
    let mut event: HearingResultEvent = serde_json::from_value(payload).expect("event decodes");
    event.maat_id = maat_id;
    event
}

fn rep_order(store: &SqliteStore, maat_id: i64) -> RepOrder {
    store
        .transaction(|repo| repo.find_rep_order(MaatId(maat_id)))
        .expect("lookup")
        .expect("rep order present")
}

#[test]
fn hearing_results_drive_the_crown_court_writes() {
    let store = common::store();
    common::seed_application(&store, APPEAL_MAAT_ID, |order| {
        order.caty_case_type = Some("APPEAL".to_string());
        order.apty_code = Some("ACS".to_string());
    });
    common::seed_application(&store, TRIAL_MAAT_ID, |order| {
        order.caty_case_type = Some("INDICTABLE".to_string());
    });
    let service = HearingResultService::new(Arc::clone(&store), common::config());
    let payload = serde_json::json!({
        "maatId": 0,
        "caseUrn": common::CASE_URN,
        "ccOutcomeData": {
            "ccooOutcome": "PART CONVICTED",
            "benchWarrantIssuedYn": "N",
            "ccImprisioned": "N",
            "caseEndDate": "2024-06-14"
        },
        "session": { "courtLocation": common::COURT_LOCATION },
        "offences": [{ "results": [{ "resultCode": 4004 }, { "resultCode": 4004 }] }]
    });

    let appeal = service
        .process(&hearing_event(APPEAL_MAAT_ID, payload.clone()))
        .expect("appeal processed");
    let trial = service
        .process(&hearing_event(TRIAL_MAAT_ID, payload))
        .expect("trial processed");

    let sentenced = NaiveDate::from_ymd_opt(2024, 6, 14).expect("valid date");
    assert_eq!(appeal.result_codes_created, 1);
    assert_eq!(trial.result_codes_created, 0);
    assert!(matches!(
        appeal.crown_court,
        Some(CrownCourtOutcome::Recorded {
            sentence: SentenceDateWrite::Appeal { sentence_order_date, .. },
            ..
        }) if sentence_order_date == sentenced
    ));
    assert_eq!(
        trial.crown_court,
        Some(CrownCourtOutcome::Recorded {
            crown_court_code: common::CROWN_COURT_CODE.to_string(),
            sentence: SentenceDateWrite::Standard {
                sentence_order_date: sentenced
            },
        })
    );

    let appeal_order = rep_order(&store, APPEAL_MAAT_ID);
    assert_eq!(appeal_order.appeal_sentence_order_date, Some(sentenced));
    assert!(appeal_order.appeal_sentence_date_changed.is_some());
    assert_eq!(appeal_order.sentence_order_date, None);
    let trial_order = rep_order(&store, TRIAL_MAAT_ID);
    assert_eq!(trial_order.sentence_order_date, Some(sentenced));
    assert_eq!(trial_order.appeal_sentence_order_date, None);

    let appeal_outcomes = store
        .crown_court_outcomes(MaatId(APPEAL_MAAT_ID))
        .expect("outcomes");
    assert_eq!(appeal_outcomes[0].appeal_type.as_deref(), Some("ACS"));
    assert_eq!(appeal_outcomes[0].outcome.as_deref(), Some("PART CONVICTED"));
    assert_eq!(store.row_count(Table::CrownCourtOutcomes).expect("count"), 2);
    assert_eq!(store.row_count(Table::ResultCodes).expect("count"), 1);
}

#[test]
fn unknown_court_location_rejects_the_outcome_but_keeps_healed_codes() {
    let store = common::store();
    common::seed_application(&store, TRIAL_MAAT_ID, |_| {});
    let service = HearingResultService::new(Arc::clone(&store), common::config());
    let mut event = hearing_event(
        TRIAL_MAAT_ID,
        serde_json::json!({
            "maatId": 0,
            "ccOutcomeData": { "ccooOutcome": "CONVICTED" },
            "offences": [{ "results": [{ "resultCode": 4004 }] }]
        }),
    );
    event.session = SessionDetails {
        court_location: Some("X99XX".to_string()),
        ..SessionDetails::default()
    };
    assert_eq!(
        event.cc_outcome_data,
        Some(CcOutcomeData {
            ccoo_outcome: Some("CONVICTED".to_string()),
            ..CcOutcomeData::default()
        })
    );

    let error = service.process(&event).expect_err("court code unknown");

    assert_eq!(error.code(), "UNKNOWN_COURT_CODE");
    assert!(matches!(error, CourtDataError::FatalLookup(_)));
    assert_eq!(store.row_count(Table::CrownCourtOutcomes).expect("count"), 0);
    assert_eq!(store.row_count(Table::ResultCodes).expect("count"), 1);
}
