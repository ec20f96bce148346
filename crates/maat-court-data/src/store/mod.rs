//! Persistence contracts consumed by the pipelines.
//!
//! Pipelines only see `&dyn CourtDataRepository` handed out by a [`CourtDataStore`] transaction,
//! so every multi-row write of one business operation commits or rolls back as a unit.

mod sqlite;
#[cfg(test)]
pub(crate) mod testing;

pub use sqlite::{SqliteStore, Table};

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::{
    CaseId, CaseRecord, CommonPlatformData, CrownCourtCode, CrownCourtOutcomeWrite,
    DefendantMaatData, DefendantRecord, LinkRecord, MaatId, OffenceRecord, RepOrder,
    ResultCodeLookup, ResultRecord, SessionRecord, SolicitorMaatData, SolicitorRecord,
    TransactionId, WqCoreRecord,
};

/// Point lookups and writes available inside a store transaction.
pub trait CourtDataRepository {
    fn find_rep_order(&self, maat_id: MaatId) -> Result<Option<RepOrder>, StoreError>;
    fn find_common_platform_data(
        &self,
        maat_id: MaatId,
    ) -> Result<Option<CommonPlatformData>, StoreError>;
    fn find_solicitor_maat_data(
        &self,
        maat_id: MaatId,
    ) -> Result<Option<SolicitorMaatData>, StoreError>;
    fn find_defendant_maat_data(
        &self,
        maat_id: MaatId,
    ) -> Result<Option<DefendantMaatData>, StoreError>;
    fn find_crown_court_code(&self, ou_code: &str) -> Result<Option<CrownCourtCode>, StoreError>;

    fn find_result_code(&self, code: i64) -> Result<Option<ResultCodeLookup>, StoreError>;
    /// Fails with [`StoreError::Conflict`] when the code already exists.
    fn insert_result_code(&self, lookup: &ResultCodeLookup) -> Result<(), StoreError>;

    fn find_active_link(&self, maat_id: MaatId) -> Result<Option<LinkRecord>, StoreError>;
    /// Fails with [`StoreError::Conflict`] when another active link exists for the MAAT id.
    fn insert_link(&self, link: &LinkRecord) -> Result<(), StoreError>;
    /// Fails with [`StoreError::Conflict`] when the link is no longer active.
    fn mark_link_removed(
        &self,
        maat_id: MaatId,
        created_tx_id: TransactionId,
        removed_tx_id: TransactionId,
        removed_date: NaiveDateTime,
    ) -> Result<(), StoreError>;
    fn stamp_link_status(
        &self,
        maat_id: MaatId,
        created_tx_id: TransactionId,
        status_tx_id: TransactionId,
        mlr_cat: i64,
    ) -> Result<(), StoreError>;

    fn save_case(&self, record: &CaseRecord) -> Result<(), StoreError>;
    fn save_wq_core(&self, record: &WqCoreRecord) -> Result<(), StoreError>;
    fn save_solicitor(&self, record: &SolicitorRecord) -> Result<(), StoreError>;
    fn save_defendant(&self, record: &DefendantRecord) -> Result<(), StoreError>;
    fn save_session(&self, record: &SessionRecord) -> Result<(), StoreError>;
    fn save_offence(&self, record: &OffenceRecord) -> Result<(), StoreError>;
    fn save_result(&self, record: &ResultRecord) -> Result<(), StoreError>;

    fn invoke_crown_court_outcome(&self, write: &CrownCourtOutcomeWrite)
        -> Result<(), StoreError>;
    fn update_sentence_order_date(
        &self,
        maat_id: MaatId,
        user: &str,
        sentence_order_date: NaiveDate,
    ) -> Result<(), StoreError>;
    fn update_appeal_sentence_order_date(
        &self,
        maat_id: MaatId,
        user: &str,
        sentence_order_date: NaiveDate,
        date_changed: NaiveDate,
    ) -> Result<(), StoreError>;
}

/// Transaction boundary over a [`CourtDataRepository`], plus identifier allocation.
pub trait CourtDataStore: Send + Sync {
    /// Allocates a transaction id in its own committed step. An id is never issued twice, even
    /// when the work it was allocated for rolls back. Must not be called from inside `work`.
    fn next_transaction_id(&self) -> Result<TransactionId, StoreError>;
    /// Allocates a case id, with the same guarantees as [`Self::next_transaction_id`].
    fn next_case_id(&self) -> Result<CaseId, StoreError>;

    /// Runs `work` in one transaction, committing on `Ok` and rolling back on `Err`.
    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn CourtDataRepository) -> Result<T, E>,
        E: From<StoreError>;

    /// Runs `work` in a transaction that is always rolled back.
    fn dry_run<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn CourtDataRepository) -> Result<T, E>,
        E: From<StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("uniqueness constraint violated: {0}")]
    Conflict(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
