use chrono::NaiveDate;
use tracing::{debug, info};

use crate::config::ProcessingConfig;
use crate::domain::messages::{non_blank, parse_event_date, HearingResultEvent};
use crate::domain::{CourtDataError, CrownCourtOutcomeWrite, FatalLookupError, MaatId};
use crate::store::CourtDataRepository;

/// Case type whose sentence order date goes to the appeal columns.
pub const APPEAL_CASE_TYPE: &str = "APPEAL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrownCourtOutcome {
    /// No rep order exists for the event's MAAT id; nothing was written.
    UnknownApplication,
    Recorded {
        crown_court_code: String,
        sentence: SentenceDateWrite,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentenceDateWrite {
    Skipped,
    Standard {
        sentence_order_date: NaiveDate,
    },
    Appeal {
        sentence_order_date: NaiveDate,
        date_changed: NaiveDate,
    },
}

/// Translates the crown court outcome carried by a hearing result into the stored writes.
pub fn process_crown_court_outcome(
    repo: &dyn CourtDataRepository,
    event: &HearingResultEvent,
    config: &ProcessingConfig,
    today: NaiveDate,
) -> Result<CrownCourtOutcome, CourtDataError> {
    let maat_id = MaatId(event.maat_id);
    let Some(rep_order) = repo.find_rep_order(maat_id)? else {
        info!(%maat_id, "no rep order for hearing result, crown court outcome ignored");
        return Ok(CrownCourtOutcome::UnknownApplication);
    };

    let location = non_blank(event.session.court_location.as_deref());
    let court_code = match location {
        Some(location) => repo.find_crown_court_code(location)?,
        None => None,
    }
    .ok_or_else(|| FatalLookupError::UnknownCourtCode(location.unwrap_or_default().to_string()))?;

    let outcome = event.cc_outcome_data.clone().unwrap_or_default();
    let appeal_type = non_blank(outcome.appeal_type.as_deref())
        .map(str::to_string)
        .or_else(|| rep_order.apty_code.clone());

    repo.invoke_crown_court_outcome(&CrownCourtOutcomeWrite {
        maat_id,
        outcome: outcome.ccoo_outcome.clone(),
        bench_warrant_issued: outcome.bench_warrant_issued_yn.clone(),
        appeal_type,
        imprisoned: outcome.cc_imprisioned.clone(),
        case_urn: event.case_urn.clone(),
        crown_court_code: court_code.code.clone(),
    })?;

    let sentence = match outcome.case_end_date.as_deref().and_then(parse_event_date) {
        None => {
            debug!(%maat_id, "no usable case end date, sentence order date left unchanged");
            SentenceDateWrite::Skipped
        }
        Some(date) if is_appeal(rep_order.caty_case_type.as_deref()) => {
            repo.update_appeal_sentence_order_date(maat_id, &config.audit_user(), date, today)?;
            SentenceDateWrite::Appeal {
                sentence_order_date: date,
                date_changed: today,
            }
        }
        Some(date) => {
            repo.update_sentence_order_date(maat_id, &config.audit_user(), date)?;
            SentenceDateWrite::Standard {
                sentence_order_date: date,
            }
        }
    };

    info!(
        %maat_id,
        crown_court_code = %court_code.code,
        ?sentence,
        "crown court outcome recorded"
    );
    Ok(CrownCourtOutcome::Recorded {
        crown_court_code: court_code.code,
        sentence,
    })
}

fn is_appeal(case_type: Option<&str>) -> bool {
    case_type.is_some_and(|case_type| case_type.trim().eq_ignore_ascii_case(APPEAL_CASE_TYPE))
}
