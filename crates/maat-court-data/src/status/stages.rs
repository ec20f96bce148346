use chrono::{DateTime, Local};
use tracing::debug;

use crate::config::ProcessingConfig;
use crate::domain::messages::{non_blank, SolicitorDetails, StatusUpdateRequest};
use crate::domain::{
    CaseRecord, ConflictError, ContractViolation, CourtDataError, LinkRecord, MaatId,
    NotFoundError, ResultRecord, TransactionId, WqCoreRecord, WqType,
};
use crate::reference::{heal_result_code, ResultCodeHealing};
use crate::store::{CourtDataRepository, StoreError};

/// Write stages of a status update, in the order they are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusStage {
    CaseInfo,
    WqCoreInfo,
    WqLinkRegisterInfo,
    SolicitorInfo,
    DefendantInfo,
    SessionInfo,
    OffenceInfo,
}

impl StatusStage {
    pub const ORDER: [StatusStage; 7] = [
        StatusStage::CaseInfo,
        StatusStage::WqCoreInfo,
        StatusStage::WqLinkRegisterInfo,
        StatusStage::SolicitorInfo,
        StatusStage::DefendantInfo,
        StatusStage::SessionInfo,
        StatusStage::OffenceInfo,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            StatusStage::CaseInfo => "case info",
            StatusStage::WqCoreInfo => "wq core info",
            StatusStage::WqLinkRegisterInfo => "wq link register info",
            StatusStage::SolicitorInfo => "solicitor info",
            StatusStage::DefendantInfo => "defendant info",
            StatusStage::SessionInfo => "session info",
            StatusStage::OffenceInfo => "offence info",
        }
    }

    pub(super) fn apply(self, batch: &mut StatusBatch<'_>) -> Result<(), CourtDataError> {
        match self {
            StatusStage::CaseInfo => update_case_info(batch),
            StatusStage::WqCoreInfo => update_wq_core_info(batch),
            StatusStage::WqLinkRegisterInfo => update_link_register_info(batch),
            StatusStage::SolicitorInfo => update_solicitor_info(batch),
            StatusStage::DefendantInfo => update_defendant_info(batch),
            StatusStage::SessionInfo => update_session_info(batch),
            StatusStage::OffenceInfo => update_offence_info(batch),
        }
    }
}

/// Shared state of one status update; every row it writes carries `tx_id`.
pub(super) struct StatusBatch<'a> {
    pub(super) repo: &'a dyn CourtDataRepository,
    pub(super) request: &'a StatusUpdateRequest,
    pub(super) config: &'a ProcessingConfig,
    pub(super) maat_id: MaatId,
    pub(super) tx_id: TransactionId,
    pub(super) now: DateTime<Local>,
    pub(super) link: Option<LinkRecord>,
    pub(super) result_codes_created: usize,
}

impl StatusBatch<'_> {
    fn link(&self) -> Result<&LinkRecord, CourtDataError> {
        self.link.as_ref().ok_or_else(|| {
            tracing::error!("status stage ran before the linked case was resolved");
            CourtDataError::System {
                operation: "status update",
            }
        })
    }
}

fn update_case_info(batch: &mut StatusBatch<'_>) -> Result<(), CourtDataError> {
    let link = batch
        .repo
        .find_active_link(batch.maat_id)?
        .ok_or(ConflictError::NotLinked(batch.maat_id))?;
    let request = batch.request;

    batch.repo.save_case(&CaseRecord {
        tx_id: batch.tx_id,
        case_id: link.case_id,
        asn: request.asn.clone(),
        cjs_area_code: request
            .cjs_area_code
            .clone()
            .or_else(|| link.cjs_area_code.clone()),
        case_urn: Some(
            non_blank(request.case_urn.as_deref())
                .map(str::to_string)
                .unwrap_or_else(|| link.case_urn.clone()),
        ),
        doc_language: request.doc_language.clone(),
        inactive: false,
        creation_date: batch.now.date_naive(),
    })?;

    batch.link = Some(link);
    Ok(())
}

fn update_wq_core_info(batch: &mut StatusBatch<'_>) -> Result<(), CourtDataError> {
    let case_id = batch.link()?.case_id;
    batch.repo.save_wq_core(&WqCoreRecord {
        tx_id: batch.tx_id,
        case_id,
        maat_id: batch.maat_id,
        wq_type: WqType::StatusUpdate,
        created_user: non_blank(batch.request.created_user.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| batch.config.audit_user()),
        created_time: batch.now.naive_local(),
    })?;
    Ok(())
}

fn update_link_register_info(batch: &mut StatusBatch<'_>) -> Result<(), CourtDataError> {
    let link = batch.link()?;
    let mlr_cat = batch.request.category.unwrap_or(link.mlr_cat);
    match batch
        .repo
        .stamp_link_status(batch.maat_id, link.created_tx_id, batch.tx_id, mlr_cat)
    {
        Ok(()) => Ok(()),
        Err(StoreError::Conflict(detail)) => {
            debug!(%detail, "link removed while the status update ran");
            Err(ConflictError::NotLinked(batch.maat_id).into())
        }
        Err(other) => Err(other.into()),
    }
}

fn update_solicitor_info(batch: &mut StatusBatch<'_>) -> Result<(), CourtDataError> {
    let case_id = batch.link()?.case_id;
    let solicitor = match &batch.request.solicitor {
        Some(details) => Some(details.clone()),
        None => batch
            .repo
            .find_solicitor_maat_data(batch.maat_id)?
            .as_ref()
            .map(SolicitorDetails::from),
    };

    match solicitor {
        Some(details) => batch
            .repo
            .save_solicitor(&details.to_record(batch.tx_id, case_id))?,
        None => debug!(maat_id = %batch.maat_id, "no solicitor details to record"),
    }
    Ok(())
}

fn update_defendant_info(batch: &mut StatusBatch<'_>) -> Result<(), CourtDataError> {
    let case_id = batch.link()?.case_id;
    let record = match &batch.request.defendant {
        Some(details) => details.to_record(batch.tx_id, case_id),
        None => batch
            .repo
            .find_defendant_maat_data(batch.maat_id)?
            .ok_or(NotFoundError::MissingDefendantRecord(batch.maat_id))?
            .to_record(batch.tx_id, case_id),
    };
    batch.repo.save_defendant(&record)?;
    Ok(())
}

fn update_session_info(batch: &mut StatusBatch<'_>) -> Result<(), CourtDataError> {
    let case_id = batch.link()?.case_id;
    for session in &batch.request.sessions {
        batch
            .repo
            .save_session(&session.to_record(batch.tx_id, case_id))?;
    }
    Ok(())
}

fn update_offence_info(batch: &mut StatusBatch<'_>) -> Result<(), CourtDataError> {
    let case_id = batch.link()?.case_id;
    let today = batch.now.date_naive();
    let mut created = 0;

    for offence in &batch.request.offences {
        batch
            .repo
            .save_offence(&offence.to_record(batch.tx_id, case_id))?;

        for result in &offence.results {
            let result_code = result
                .result_code
                .ok_or(ContractViolation::NullResultCode)?;
            if heal_result_code(batch.repo, Some(result_code), today)? == ResultCodeHealing::Created
            {
                created += 1;
            }
            batch.repo.save_result(&ResultRecord {
                tx_id: batch.tx_id,
                case_id,
                asn_seq: offence.asn_seq.clone(),
                result_code,
            })?;
        }
    }

    batch.result_codes_created += created;
    Ok(())
}
