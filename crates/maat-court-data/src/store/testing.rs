use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime};

use super::{CourtDataRepository, CourtDataStore, SqliteStore, StoreError};
use crate::domain::{
    CaseId, CaseRecord, CommonPlatformData, CrownCourtCode, CrownCourtOutcomeWrite,
    DefendantMaatData, DefendantRecord, LinkRecord, MaatId, OffenceRecord, RepOrder,
    ResultCodeLookup, ResultRecord, SessionRecord, SolicitorMaatData, SolicitorRecord,
    TransactionId, WqCoreRecord,
};

/// In-memory SQLite store that records every repository call and can fail a named one.
pub(crate) struct InstrumentedStore {
    inner: SqliteStore,
    calls: Mutex<Vec<&'static str>>,
    fail_on: Mutex<Option<&'static str>>,
}

impl InstrumentedStore {
    pub(crate) fn new() -> Self {
        Self {
            inner: SqliteStore::in_memory().expect("in-memory store opens"),
            calls: Mutex::new(Vec::new()),
            fail_on: Mutex::new(None),
        }
    }

    pub(crate) fn inner(&self) -> &SqliteStore {
        &self.inner
    }

    pub(crate) fn fail_on(&self, operation: &'static str) {
        *self.fail_on.lock().expect("fail_on mutex poisoned") = Some(operation);
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    pub(crate) fn reset_calls(&self) {
        self.calls.lock().expect("calls mutex poisoned").clear();
    }

    /// Write calls only, in order, with repeats collapsed.
    pub(crate) fn write_sequence(&self) -> Vec<&'static str> {
        let mut sequence: Vec<&'static str> = Vec::new();
        for call in self.calls() {
            let is_write = call.starts_with("save_")
                || call.starts_with("insert_")
                || call.starts_with("mark_")
                || call.starts_with("stamp_")
                || call.starts_with("invoke_")
                || call.starts_with("update_");
            if is_write && sequence.last() != Some(&call) {
                sequence.push(call);
            }
        }
        sequence
    }

    fn observe(&self, operation: &'static str) -> Result<(), StoreError> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(operation);
        match *self.fail_on.lock().expect("fail_on mutex poisoned") {
            Some(failing) if failing == operation => Err(StoreError::Unavailable(format!(
                "injected failure in {operation}"
            ))),
            _ => Ok(()),
        }
    }
}

impl CourtDataStore for InstrumentedStore {
    fn next_transaction_id(&self) -> Result<TransactionId, StoreError> {
        self.observe("next_transaction_id")?;
        self.inner.next_transaction_id()
    }

    fn next_case_id(&self) -> Result<CaseId, StoreError> {
        self.observe("next_case_id")?;
        self.inner.next_case_id()
    }

    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn CourtDataRepository) -> Result<T, E>,
        E: From<StoreError>,
    {
        self.inner.transaction(|repo| {
            work(&InstrumentedRepository {
                inner: repo,
                recorder: self,
            })
        })
    }

    fn dry_run<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn CourtDataRepository) -> Result<T, E>,
        E: From<StoreError>,
    {
        self.inner.dry_run(|repo| {
            work(&InstrumentedRepository {
                inner: repo,
                recorder: self,
            })
        })
    }
}

struct InstrumentedRepository<'a> {
    inner: &'a dyn CourtDataRepository,
    recorder: &'a InstrumentedStore,
}

impl CourtDataRepository for InstrumentedRepository<'_> {
    fn find_rep_order(&self, maat_id: MaatId) -> Result<Option<RepOrder>, StoreError> {
        self.recorder.observe("find_rep_order")?;
        self.inner.find_rep_order(maat_id)
    }

    fn find_common_platform_data(
        &self,
        maat_id: MaatId,
    ) -> Result<Option<CommonPlatformData>, StoreError> {
        self.recorder.observe("find_common_platform_data")?;
        self.inner.find_common_platform_data(maat_id)
    }

    fn find_solicitor_maat_data(
        &self,
        maat_id: MaatId,
    ) -> Result<Option<SolicitorMaatData>, StoreError> {
        self.recorder.observe("find_solicitor_maat_data")?;
        self.inner.find_solicitor_maat_data(maat_id)
    }

    fn find_defendant_maat_data(
        &self,
        maat_id: MaatId,
    ) -> Result<Option<DefendantMaatData>, StoreError> {
        self.recorder.observe("find_defendant_maat_data")?;
        self.inner.find_defendant_maat_data(maat_id)
    }

    fn find_crown_court_code(&self, ou_code: &str) -> Result<Option<CrownCourtCode>, StoreError> {
        self.recorder.observe("find_crown_court_code")?;
        self.inner.find_crown_court_code(ou_code)
    }

    fn find_result_code(&self, code: i64) -> Result<Option<ResultCodeLookup>, StoreError> {
        self.recorder.observe("find_result_code")?;
        self.inner.find_result_code(code)
    }

    fn insert_result_code(&self, lookup: &ResultCodeLookup) -> Result<(), StoreError> {
        self.recorder.observe("insert_result_code")?;
        self.inner.insert_result_code(lookup)
    }

    fn find_active_link(&self, maat_id: MaatId) -> Result<Option<LinkRecord>, StoreError> {
        self.recorder.observe("find_active_link")?;
        self.inner.find_active_link(maat_id)
    }

    fn insert_link(&self, link: &LinkRecord) -> Result<(), StoreError> {
        self.recorder.observe("insert_link")?;
        self.inner.insert_link(link)
    }

    fn mark_link_removed(
        &self,
        maat_id: MaatId,
        created_tx_id: TransactionId,
        removed_tx_id: TransactionId,
        removed_date: NaiveDateTime,
    ) -> Result<(), StoreError> {
        self.recorder.observe("mark_link_removed")?;
        self.inner
            .mark_link_removed(maat_id, created_tx_id, removed_tx_id, removed_date)
    }

    fn stamp_link_status(
        &self,
        maat_id: MaatId,
        created_tx_id: TransactionId,
        status_tx_id: TransactionId,
        mlr_cat: i64,
    ) -> Result<(), StoreError> {
        self.recorder.observe("stamp_link_status")?;
        self.inner
            .stamp_link_status(maat_id, created_tx_id, status_tx_id, mlr_cat)
    }

    fn save_case(&self, record: &CaseRecord) -> Result<(), StoreError> {
        self.recorder.observe("save_case")?;
        self.inner.save_case(record)
    }

    fn save_wq_core(&self, record: &WqCoreRecord) -> Result<(), StoreError> {
        self.recorder.observe("save_wq_core")?;
        self.inner.save_wq_core(record)
    }

    fn save_solicitor(&self, record: &SolicitorRecord) -> Result<(), StoreError> {
        self.recorder.observe("save_solicitor")?;
        self.inner.save_solicitor(record)
    }

    fn save_defendant(&self, record: &DefendantRecord) -> Result<(), StoreError> {
        self.recorder.observe("save_defendant")?;
        self.inner.save_defendant(record)
    }

    fn save_session(&self, record: &SessionRecord) -> Result<(), StoreError> {
        self.recorder.observe("save_session")?;
        self.inner.save_session(record)
    }

    fn save_offence(&self, record: &OffenceRecord) -> Result<(), StoreError> {
        self.recorder.observe("save_offence")?;
        self.inner.save_offence(record)
    }

    fn save_result(&self, record: &ResultRecord) -> Result<(), StoreError> {
        self.recorder.observe("save_result")?;
        self.inner.save_result(record)
    }

    fn invoke_crown_court_outcome(
        &self,
        write: &CrownCourtOutcomeWrite,
    ) -> Result<(), StoreError> {
        self.recorder.observe("invoke_crown_court_outcome")?;
        self.inner.invoke_crown_court_outcome(write)
    }

    fn update_sentence_order_date(
        &self,
        maat_id: MaatId,
        user: &str,
        sentence_order_date: NaiveDate,
    ) -> Result<(), StoreError> {
        self.recorder.observe("update_sentence_order_date")?;
        self.inner
            .update_sentence_order_date(maat_id, user, sentence_order_date)
    }

    fn update_appeal_sentence_order_date(
        &self,
        maat_id: MaatId,
        user: &str,
        sentence_order_date: NaiveDate,
        date_changed: NaiveDate,
    ) -> Result<(), StoreError> {
        self.recorder.observe("update_appeal_sentence_order_date")?;
        self.inner.update_appeal_sentence_order_date(
            maat_id,
            user,
            sentence_order_date,
            date_changed,
        )
    }
}
