use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{info, info_span, warn};

use super::validation::{validate_link, ValidatedLink};
use crate::config::ProcessingConfig;
use crate::domain::messages::{non_blank, parse_event_date, LinkRequest, SolicitorDetails, UnlinkRequest};
use crate::domain::{
    CaseId, CaseRecord, ConflictError, CourtDataError, LinkRecord, MaatId, TransactionId,
    ValidationError, WqCoreRecord, WqType,
};
use crate::store::{CourtDataRepository, CourtDataStore, StoreError};

/// Category recorded on a link when the request carries none.
pub const DEFAULT_CATEGORY: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkOutcome {
    pub maat_id: MaatId,
    pub case_id: CaseId,
    pub tx_id: TransactionId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlinkOutcome {
    pub maat_id: MaatId,
    pub case_id: CaseId,
    pub removed_tx_id: TransactionId,
}

/// Validates, creates, and removes links. Each call is one store transaction.
pub struct LinkService<S> {
    store: Arc<S>,
    config: ProcessingConfig,
}

impl<S> LinkService<S>
where
    S: CourtDataStore,
{
    pub fn new(store: Arc<S>, config: ProcessingConfig) -> Self {
        Self { store, config }
    }

    /// Runs the link rules without writing anything.
    pub fn validate(&self, request: &LinkRequest) -> Result<MaatId, CourtDataError> {
        self.store
            .dry_run(|repo| validate_link(repo, request).map(|validated| validated.maat_id))
    }

    pub fn save_and_link(&self, request: &LinkRequest) -> Result<LinkOutcome, CourtDataError> {
        let span = info_span!(
            "save_and_link",
            maat_id = ?request.maat_id,
            laa_transaction_id = ?request.laa_transaction_id
        );
        let _entered = span.enter();
        let now = Local::now();
        let ids = LinkIds {
            tx_id: self.store.next_transaction_id()?,
            case_id: self.store.next_case_id()?,
        };

        self.store.transaction(|repo| {
            let validated = validate_link(repo, request)?;
            write_link(repo, &validated, &self.config, ids, now)
        })
    }

    pub fn unlink(&self, request: &UnlinkRequest) -> Result<UnlinkOutcome, CourtDataError> {
        let maat_id = match request.maat_id {
            Some(id) if id > 0 => MaatId(id),
            raw => return Err(ValidationError::InvalidMaatId(raw).into()),
        };
        let span = info_span!("unlink", %maat_id);
        let _entered = span.enter();
        let now = Local::now();
        let removed_tx_id = self.store.next_transaction_id()?;

        self.store.transaction(|repo| {
            let link = repo
                .find_active_link(maat_id)?
                .ok_or(ConflictError::NotLinked(maat_id))?;

            let removed = repo.mark_link_removed(
                maat_id,
                link.created_tx_id,
                removed_tx_id,
                now.naive_local(),
            );
            match removed {
                Ok(()) => {}
                Err(StoreError::Conflict(detail)) => {
                    warn!(%detail, "link removed concurrently");
                    return Err(ConflictError::NotLinked(maat_id).into());
                }
                Err(other) => return Err(other.into()),
            }

            let created_user = non_blank(request.user_id.as_deref())
                .map(str::to_string)
                .unwrap_or_else(|| self.config.audit_user());
            repo.save_wq_core(&WqCoreRecord {
                tx_id: removed_tx_id,
                case_id: link.case_id,
                maat_id,
                wq_type: WqType::CaseUnlink,
                created_user,
                created_time: now.naive_local(),
            })?;

            info!(
                case_id = %link.case_id,
                %removed_tx_id,
                reason_id = ?request.reason_id,
                other_reason = ?request.other_reason_text,
                "link removed"
            );
            Ok(UnlinkOutcome {
                maat_id,
                case_id: link.case_id,
                removed_tx_id,
            })
        })
    }
}

/// Identifiers allocated for one link before its transaction opens.
#[derive(Debug, Clone, Copy)]
struct LinkIds {
    tx_id: TransactionId,
    case_id: CaseId,
}

fn write_link(
    repo: &dyn CourtDataRepository,
    validated: &ValidatedLink<'_>,
    config: &ProcessingConfig,
    ids: LinkIds,
    now: DateTime<Local>,
) -> Result<LinkOutcome, CourtDataError> {
    let request = validated.request;
    let maat_id = validated.maat_id;
    let LinkIds { tx_id, case_id } = ids;
    let today = now.date_naive();
    let category = request.category.unwrap_or(DEFAULT_CATEGORY);

    repo.save_case(&CaseRecord {
        tx_id,
        case_id,
        asn: request.asn.clone(),
        cjs_area_code: request.cjs_area_code.clone(),
        case_urn: Some(validated.case_urn.clone()),
        doc_language: request.doc_language.clone(),
        inactive: false,
        creation_date: request
            .case_creation_date
            .as_deref()
            .and_then(parse_event_date)
            .unwrap_or(today),
    })?;

    repo.save_wq_core(&WqCoreRecord {
        tx_id,
        case_id,
        maat_id,
        wq_type: WqType::CaseLink,
        created_user: non_blank(request.created_user.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| config.audit_user()),
        created_time: now.naive_local(),
    })?;

    let link = LinkRecord {
        maat_id,
        case_id,
        case_urn: validated.case_urn.clone(),
        created_tx_id: tx_id,
        cjs_area_code: request.cjs_area_code.clone(),
        maat_cat: category,
        mlr_cat: category,
        created_date: today,
        removed_tx_id: None,
        removed_date: None,
        status_tx_id: None,
    };
    match repo.insert_link(&link) {
        Ok(()) => {}
        Err(StoreError::Conflict(detail)) => {
            warn!(%detail, "concurrent link for the same application");
            return Err(ConflictError::AlreadyLinked(maat_id).into());
        }
        Err(other) => return Err(other.into()),
    }

    if let Some(solicitor) = &validated.solicitor {
        repo.save_solicitor(&SolicitorDetails::from(solicitor).to_record(tx_id, case_id))?;
    }
    repo.save_defendant(&validated.defendant.to_record(tx_id, case_id))?;
    for session in &request.sessions {
        repo.save_session(&session.to_record(tx_id, case_id))?;
    }
    for offence in &request.offences {
        repo.save_offence(&offence.to_record(tx_id, case_id))?;
    }

    info!(
        %tx_id,
        %case_id,
        court_code = validated.court_code.as_ref().map(|code| code.code.as_str()),
        sessions = request.sessions.len(),
        offences = request.offences.len(),
        "application linked"
    );
    Ok(LinkOutcome {
        maat_id,
        case_id,
        tx_id,
    })
}
