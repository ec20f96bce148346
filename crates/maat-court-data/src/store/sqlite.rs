use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{Local, NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row, TransactionBehavior};

use super::{CourtDataRepository, CourtDataStore, StoreError};
use crate::domain::{
    CaseId, CaseRecord, CommonPlatformData, CrownCourtCode, CrownCourtOutcomeWrite,
    DefendantMaatData, DefendantRecord, LinkRecord, MaatId, OffenceRecord, RepOrder,
    ResultCodeLookup, ResultRecord, SessionRecord, SolicitorMaatData, SolicitorRecord,
    TransactionId, WqCoreRecord, WqType,
};

// `link_register_one_active` closes the read-then-insert race on linking, and the primary key
// on `xlat_results` closes the same race on result code healing.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS identifier_sequences (
    name TEXT PRIMARY KEY,
    value INTEGER NOT NULL
);
INSERT OR IGNORE INTO identifier_sequences (name, value) VALUES ('transaction', 0), ('case', 0);

CREATE TABLE IF NOT EXISTS rep_orders (
    id INTEGER PRIMARY KEY,
    apty_code TEXT,
    caty_case_type TEXT,
    date_modified TEXT,
    user_modified TEXT,
    sentence_order_date TEXT,
    appeal_sentence_order_date TEXT,
    appeal_sentence_date_changed TEXT
);
CREATE TABLE IF NOT EXISTS rep_order_cp_data (
    rep_order_id INTEGER PRIMARY KEY,
    case_urn TEXT,
    defendant_id TEXT
);
CREATE TABLE IF NOT EXISTS solicitor_maat_data (
    maat_id INTEGER PRIMARY KEY,
    account_code TEXT,
    account_name TEXT
);
CREATE TABLE IF NOT EXISTS defendant_maat_data (
    maat_id INTEGER PRIMARY KEY,
    first_name TEXT,
    last_name TEXT,
    date_of_birth TEXT,
    ni_number TEXT
);
CREATE TABLE IF NOT EXISTS crown_court_codes (
    ou_code TEXT PRIMARY KEY,
    code TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS xlat_results (
    cjs_result_code INTEGER PRIMARY KEY,
    result_description TEXT NOT NULL,
    england_and_wales TEXT NOT NULL,
    wq_type INTEGER NOT NULL,
    created_user TEXT NOT NULL,
    created_date TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS link_register (
    maat_id INTEGER NOT NULL,
    created_tx_id INTEGER NOT NULL,
    case_id INTEGER NOT NULL,
    case_urn TEXT NOT NULL,
    cjs_area_code TEXT,
    maat_cat INTEGER NOT NULL,
    mlr_cat INTEGER NOT NULL,
    created_date TEXT NOT NULL,
    removed_tx_id INTEGER,
    removed_date TEXT,
    status_tx_id INTEGER,
    PRIMARY KEY (maat_id, created_tx_id)
);
CREATE UNIQUE INDEX IF NOT EXISTS link_register_one_active
    ON link_register (maat_id) WHERE removed_tx_id IS NULL;

CREATE TABLE IF NOT EXISTS wq_case (
    tx_id INTEGER NOT NULL,
    case_id INTEGER NOT NULL,
    asn TEXT,
    cjs_area_code TEXT,
    case_urn TEXT,
    doc_language TEXT,
    inactive TEXT NOT NULL,
    creation_date TEXT NOT NULL,
    PRIMARY KEY (tx_id, case_id)
);
CREATE TABLE IF NOT EXISTS wq_core (
    tx_id INTEGER PRIMARY KEY,
    case_id INTEGER NOT NULL,
    maat_id INTEGER NOT NULL,
    wq_type INTEGER NOT NULL,
    created_user TEXT NOT NULL,
    created_time TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS solicitor (
    tx_id INTEGER NOT NULL,
    case_id INTEGER NOT NULL,
    law_firm_name TEXT,
    account_code TEXT
);
CREATE TABLE IF NOT EXISTS defendant (
    tx_id INTEGER NOT NULL,
    case_id INTEGER NOT NULL,
    forename TEXT,
    surname TEXT,
    date_of_birth TEXT,
    ni_number TEXT
);
CREATE TABLE IF NOT EXISTS session (
    tx_id INTEGER NOT NULL,
    case_id INTEGER NOT NULL,
    court_location TEXT,
    date_of_hearing TEXT,
    post_hearing_custody TEXT
);
CREATE TABLE IF NOT EXISTS offence (
    tx_id INTEGER NOT NULL,
    case_id INTEGER NOT NULL,
    asn_seq TEXT,
    offence_code TEXT,
    offence_short_title TEXT,
    legal_aid_status TEXT,
    legal_aid_status_date TEXT
);
CREATE TABLE IF NOT EXISTS result (
    tx_id INTEGER NOT NULL,
    case_id INTEGER NOT NULL,
    asn_seq TEXT,
    result_code INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS crown_court_outcomes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    maat_id INTEGER NOT NULL,
    outcome TEXT,
    bench_warrant_issued TEXT,
    appeal_type TEXT,
    imprisoned TEXT,
    case_urn TEXT,
    crown_court_code TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);
";

const LINK_COLUMNS: &str = "maat_id, case_id, case_urn, created_tx_id, cjs_area_code, maat_cat, \
     mlr_cat, created_date, removed_tx_id, removed_date, status_tx_id";

/// Tables owned by the store, for inspection and housekeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    RepOrders,
    CommonPlatformData,
    SolicitorMaatData,
    DefendantMaatData,
    CrownCourtCodes,
    ResultCodes,
    LinkRegister,
    WqCase,
    WqCore,
    Solicitor,
    Defendant,
    Session,
    Offence,
    Result,
    CrownCourtOutcomes,
}

impl Table {
    pub const ALL: [Table; 15] = [
        Table::RepOrders,
        Table::CommonPlatformData,
        Table::SolicitorMaatData,
        Table::DefendantMaatData,
        Table::CrownCourtCodes,
        Table::ResultCodes,
        Table::LinkRegister,
        Table::WqCase,
        Table::WqCore,
        Table::Solicitor,
        Table::Defendant,
        Table::Session,
        Table::Offence,
        Table::Result,
        Table::CrownCourtOutcomes,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Table::RepOrders => "rep_orders",
            Table::CommonPlatformData => "rep_order_cp_data",
            Table::SolicitorMaatData => "solicitor_maat_data",
            Table::DefendantMaatData => "defendant_maat_data",
            Table::CrownCourtCodes => "crown_court_codes",
            Table::ResultCodes => "xlat_results",
            Table::LinkRegister => "link_register",
            Table::WqCase => "wq_case",
            Table::WqCore => "wq_core",
            Table::Solicitor => "solicitor",
            Table::Defendant => "defendant",
            Table::Session => "session",
            Table::Offence => "offence",
            Table::Result => "result",
            Table::CrownCourtOutcomes => "crown_court_outcomes",
        }
    }

    /// SQL predicate selecting rows written by a given transaction id (bound as `?1`).
    const fn stamp_predicate(self) -> Option<&'static str> {
        match self {
            Table::WqCase
            | Table::WqCore
            | Table::Solicitor
            | Table::Defendant
            | Table::Session
            | Table::Offence
            | Table::Result => Some("tx_id = ?1"),
            Table::LinkRegister => {
                Some("(created_tx_id = ?1 OR removed_tx_id = ?1 OR status_tx_id = ?1)")
            }
            _ => None,
        }
    }
}

/// SQLite-backed store. One connection, serialised behind a mutex; write transactions take the
/// database lock up front (`BEGIN IMMEDIATE`).
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(map_sqlite)?;
        Self::bootstrap(conn)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(map_sqlite)?;
        Self::bootstrap(conn)
    }

    fn bootstrap(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA).map_err(map_sqlite)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection mutex poisoned".to_string()))
    }

    pub fn save_rep_order(&self, rep_order: &RepOrder) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO rep_orders (id, apty_code, caty_case_type, date_modified,
                user_modified, sentence_order_date, appeal_sentence_order_date,
                appeal_sentence_date_changed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                rep_order.id.0,
                rep_order.apty_code,
                rep_order.caty_case_type,
                rep_order.date_modified,
                rep_order.user_modified,
                rep_order.sentence_order_date,
                rep_order.appeal_sentence_order_date,
                rep_order.appeal_sentence_date_changed,
            ],
        )
        .map_err(map_sqlite)?;
        Ok(())
    }

    pub fn save_common_platform_data(&self, data: &CommonPlatformData) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO rep_order_cp_data (rep_order_id, case_urn, defendant_id)
             VALUES (?1, ?2, ?3)",
            params![data.rep_order_id.0, data.case_urn, data.defendant_id],
        )
        .map_err(map_sqlite)?;
        Ok(())
    }

    pub fn save_solicitor_maat_data(&self, data: &SolicitorMaatData) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO solicitor_maat_data (maat_id, account_code, account_name)
             VALUES (?1, ?2, ?3)",
            params![data.maat_id.0, data.account_code, data.account_name],
        )
        .map_err(map_sqlite)?;
        Ok(())
    }

    pub fn save_defendant_maat_data(&self, data: &DefendantMaatData) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO defendant_maat_data (maat_id, first_name, last_name,
                date_of_birth, ni_number)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                data.maat_id.0,
                data.first_name,
                data.last_name,
                data.date_of_birth,
                data.ni_number,
            ],
        )
        .map_err(map_sqlite)?;
        Ok(())
    }

    pub fn save_crown_court_code(&self, code: &CrownCourtCode) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO crown_court_codes (ou_code, code) VALUES (?1, ?2)",
            params![code.ou_code, code.code],
        )
        .map_err(map_sqlite)?;
        Ok(())
    }

    /// Empties every table and resets the identifier sequences. Test fixtures only.
    pub fn delete_all(&self) -> Result<(), StoreError> {
        let conn = self.lock()?;
        for table in Table::ALL {
            conn.execute(&format!("DELETE FROM {}", table.name()), [])
                .map_err(map_sqlite)?;
        }
        conn.execute("UPDATE identifier_sequences SET value = 0", [])
            .map_err(map_sqlite)?;
        Ok(())
    }

    /// Every link row ever written for the MAAT id, oldest first.
    pub fn link_history(&self, maat_id: MaatId) -> Result<Vec<LinkRecord>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {LINK_COLUMNS} FROM link_register WHERE maat_id = ?1
                 ORDER BY created_tx_id ASC"
            ))
            .map_err(map_sqlite)?;
        let rows = stmt
            .query_map(params![maat_id.0], link_from_row)
            .map_err(map_sqlite)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(map_sqlite)
    }

    pub fn crown_court_outcomes(
        &self,
        maat_id: MaatId,
    ) -> Result<Vec<CrownCourtOutcomeWrite>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT maat_id, outcome, bench_warrant_issued, appeal_type, imprisoned, case_urn,
                    crown_court_code
                 FROM crown_court_outcomes WHERE maat_id = ?1 ORDER BY id ASC",
            )
            .map_err(map_sqlite)?;
        let rows = stmt
            .query_map(params![maat_id.0], |row| {
                Ok(CrownCourtOutcomeWrite {
                    maat_id: MaatId(row.get(0)?),
                    outcome: row.get(1)?,
                    bench_warrant_issued: row.get(2)?,
                    appeal_type: row.get(3)?,
                    imprisoned: row.get(4)?,
                    case_urn: row.get(5)?,
                    crown_court_code: row.get(6)?,
                })
            })
            .map_err(map_sqlite)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(map_sqlite)
    }

    pub fn row_count(&self, table: Table) -> Result<i64, StoreError> {
        let conn = self.lock()?;
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table.name()), [], |row| {
            row.get(0)
        })
        .map_err(map_sqlite)
    }

    /// Number of rows in `table` written by the given transaction id.
    pub fn rows_stamped(&self, table: Table, tx_id: TransactionId) -> Result<i64, StoreError> {
        let predicate = table.stamp_predicate().ok_or_else(|| {
            StoreError::Unavailable(format!("{} carries no transaction id", table.name()))
        })?;
        let conn = self.lock()?;
        conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE {predicate}", table.name()),
            params![tx_id.0],
            |row| row.get(0),
        )
        .map_err(map_sqlite)
    }
}

impl SqliteStore {
    /// Bumps a named sequence and commits straight away, outside any work transaction.
    fn next_sequence(&self, name: &str) -> Result<i64, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(map_sqlite)?;
        let value = tx
            .query_row(
                "UPDATE identifier_sequences SET value = value + 1 WHERE name = ?1 RETURNING value",
                params![name],
                |row| row.get(0),
            )
            .map_err(map_sqlite)?;
        tx.commit().map_err(map_sqlite)?;
        Ok(value)
    }
}

impl CourtDataStore for SqliteStore {
    fn next_transaction_id(&self) -> Result<TransactionId, StoreError> {
        self.next_sequence("transaction").map(TransactionId)
    }

    fn next_case_id(&self) -> Result<CaseId, StoreError> {
        self.next_sequence("case").map(CaseId)
    }

    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn CourtDataRepository) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(map_sqlite)?;
        let value = work(&SqliteRepository { conn: &tx })?;
        tx.commit().map_err(map_sqlite)?;
        Ok(value)
    }

    fn dry_run<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn CourtDataRepository) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Deferred)
            .map_err(map_sqlite)?;
        let outcome = work(&SqliteRepository { conn: &tx });
        tx.rollback().map_err(map_sqlite)?;
        outcome
    }
}

struct SqliteRepository<'conn> {
    conn: &'conn Connection,
}

impl SqliteRepository<'_> {
    fn expect_updated(&self, updated: usize, what: impl FnOnce() -> String) -> Result<(), StoreError> {
        if updated == 0 {
            Err(StoreError::Conflict(what()))
        } else {
            Ok(())
        }
    }
}

impl CourtDataRepository for SqliteRepository<'_> {
    fn find_rep_order(&self, maat_id: MaatId) -> Result<Option<RepOrder>, StoreError> {
        self.conn
            .query_row(
                "SELECT id, apty_code, caty_case_type, date_modified, user_modified,
                    sentence_order_date, appeal_sentence_order_date, appeal_sentence_date_changed
                 FROM rep_orders WHERE id = ?1",
                params![maat_id.0],
                |row| {
                    Ok(RepOrder {
                        id: MaatId(row.get(0)?),
                        apty_code: row.get(1)?,
                        caty_case_type: row.get(2)?,
                        date_modified: row.get(3)?,
                        user_modified: row.get(4)?,
                        sentence_order_date: row.get(5)?,
                        appeal_sentence_order_date: row.get(6)?,
                        appeal_sentence_date_changed: row.get(7)?,
                    })
                },
            )
            .optional()
            .map_err(map_sqlite)
    }

    fn find_common_platform_data(
        &self,
        maat_id: MaatId,
    ) -> Result<Option<CommonPlatformData>, StoreError> {
        self.conn
            .query_row(
                "SELECT rep_order_id, case_urn, defendant_id FROM rep_order_cp_data
                 WHERE rep_order_id = ?1",
                params![maat_id.0],
                |row| {
                    Ok(CommonPlatformData {
                        rep_order_id: MaatId(row.get(0)?),
                        case_urn: row.get(1)?,
                        defendant_id: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(map_sqlite)
    }

    fn find_solicitor_maat_data(
        &self,
        maat_id: MaatId,
    ) -> Result<Option<SolicitorMaatData>, StoreError> {
        self.conn
            .query_row(
                "SELECT maat_id, account_code, account_name FROM solicitor_maat_data
                 WHERE maat_id = ?1",
                params![maat_id.0],
                |row| {
                    Ok(SolicitorMaatData {
                        maat_id: MaatId(row.get(0)?),
                        account_code: row.get(1)?,
                        account_name: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(map_sqlite)
    }

    fn find_defendant_maat_data(
        &self,
        maat_id: MaatId,
    ) -> Result<Option<DefendantMaatData>, StoreError> {
        self.conn
            .query_row(
                "SELECT maat_id, first_name, last_name, date_of_birth, ni_number
                 FROM defendant_maat_data WHERE maat_id = ?1",
                params![maat_id.0],
                |row| {
                    Ok(DefendantMaatData {
                        maat_id: MaatId(row.get(0)?),
                        first_name: row.get(1)?,
                        last_name: row.get(2)?,
                        date_of_birth: row.get(3)?,
                        ni_number: row.get(4)?,
                    })
                },
            )
            .optional()
            .map_err(map_sqlite)
    }

    fn find_crown_court_code(&self, ou_code: &str) -> Result<Option<CrownCourtCode>, StoreError> {
        self.conn
            .query_row(
                "SELECT ou_code, code FROM crown_court_codes WHERE ou_code = ?1",
                params![ou_code],
                |row| {
                    Ok(CrownCourtCode {
                        ou_code: row.get(0)?,
                        code: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(map_sqlite)
    }

    fn find_result_code(&self, code: i64) -> Result<Option<ResultCodeLookup>, StoreError> {
        self.conn
            .query_row(
                "SELECT cjs_result_code, result_description, england_and_wales, wq_type,
                    created_user, created_date
                 FROM xlat_results WHERE cjs_result_code = ?1",
                params![code],
                |row| {
                    let wq_code: i64 = row.get(3)?;
                    let wq_type = WqType::from_code(wq_code)
                        .ok_or(rusqlite::Error::IntegralValueOutOfRange(3, wq_code))?;
                    Ok(ResultCodeLookup {
                        cjs_result_code: row.get(0)?,
                        result_description: row.get(1)?,
                        england_and_wales: row.get(2)?,
                        wq_type,
                        created_user: row.get(4)?,
                        created_date: row.get(5)?,
                    })
                },
            )
            .optional()
            .map_err(map_sqlite)
    }

    fn insert_result_code(&self, lookup: &ResultCodeLookup) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO xlat_results (cjs_result_code, result_description, england_and_wales,
                    wq_type, created_user, created_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    lookup.cjs_result_code,
                    lookup.result_description,
                    lookup.england_and_wales,
                    lookup.wq_type.code(),
                    lookup.created_user,
                    lookup.created_date,
                ],
            )
            .map_err(map_sqlite)?;
        Ok(())
    }

    fn find_active_link(&self, maat_id: MaatId) -> Result<Option<LinkRecord>, StoreError> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {LINK_COLUMNS} FROM link_register
                     WHERE maat_id = ?1 AND removed_tx_id IS NULL
                     ORDER BY created_tx_id DESC LIMIT 1"
                ),
                params![maat_id.0],
                link_from_row,
            )
            .optional()
            .map_err(map_sqlite)
    }

    fn insert_link(&self, link: &LinkRecord) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO link_register (maat_id, case_id, case_urn, created_tx_id,
                    cjs_area_code, maat_cat, mlr_cat, created_date, removed_tx_id, removed_date,
                    status_tx_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    link.maat_id.0,
                    link.case_id.0,
                    link.case_urn,
                    link.created_tx_id.0,
                    link.cjs_area_code,
                    link.maat_cat,
                    link.mlr_cat,
                    link.created_date,
                    link.removed_tx_id.map(|id| id.0),
                    link.removed_date,
                    link.status_tx_id.map(|id| id.0),
                ],
            )
            .map_err(map_sqlite)?;
        Ok(())
    }

    fn mark_link_removed(
        &self,
        maat_id: MaatId,
        created_tx_id: TransactionId,
        removed_tx_id: TransactionId,
        removed_date: NaiveDateTime,
    ) -> Result<(), StoreError> {
        let updated = self
            .conn
            .execute(
                "UPDATE link_register SET removed_tx_id = ?3, removed_date = ?4
                 WHERE maat_id = ?1 AND created_tx_id = ?2 AND removed_tx_id IS NULL",
                params![maat_id.0, created_tx_id.0, removed_tx_id.0, removed_date],
            )
            .map_err(map_sqlite)?;
        self.expect_updated(updated, || {
            format!("link {maat_id}/{created_tx_id} is no longer active")
        })
    }

    fn stamp_link_status(
        &self,
        maat_id: MaatId,
        created_tx_id: TransactionId,
        status_tx_id: TransactionId,
        mlr_cat: i64,
    ) -> Result<(), StoreError> {
        let updated = self
            .conn
            .execute(
                "UPDATE link_register SET status_tx_id = ?3, mlr_cat = ?4
                 WHERE maat_id = ?1 AND created_tx_id = ?2 AND removed_tx_id IS NULL",
                params![maat_id.0, created_tx_id.0, status_tx_id.0, mlr_cat],
            )
            .map_err(map_sqlite)?;
        self.expect_updated(updated, || {
            format!("link {maat_id}/{created_tx_id} is no longer active")
        })
    }

    fn save_case(&self, record: &CaseRecord) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO wq_case (tx_id, case_id, asn, cjs_area_code, case_urn, doc_language,
                    inactive, creation_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.tx_id.0,
                    record.case_id.0,
                    record.asn,
                    record.cjs_area_code,
                    record.case_urn,
                    record.doc_language,
                    if record.inactive { "Y" } else { "N" },
                    record.creation_date,
                ],
            )
            .map_err(map_sqlite)?;
        Ok(())
    }

    fn save_wq_core(&self, record: &WqCoreRecord) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO wq_core (tx_id, case_id, maat_id, wq_type, created_user, created_time)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.tx_id.0,
                    record.case_id.0,
                    record.maat_id.0,
                    record.wq_type.code(),
                    record.created_user,
                    record.created_time,
                ],
            )
            .map_err(map_sqlite)?;
        Ok(())
    }

    fn save_solicitor(&self, record: &SolicitorRecord) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO solicitor (tx_id, case_id, law_firm_name, account_code)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.tx_id.0,
                    record.case_id.0,
                    record.law_firm_name,
                    record.account_code,
                ],
            )
            .map_err(map_sqlite)?;
        Ok(())
    }

    fn save_defendant(&self, record: &DefendantRecord) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO defendant (tx_id, case_id, forename, surname, date_of_birth, ni_number)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.tx_id.0,
                    record.case_id.0,
                    record.forename,
                    record.surname,
                    record.date_of_birth,
                    record.ni_number,
                ],
            )
            .map_err(map_sqlite)?;
        Ok(())
    }

    fn save_session(&self, record: &SessionRecord) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO session (tx_id, case_id, court_location, date_of_hearing,
                    post_hearing_custody)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.tx_id.0,
                    record.case_id.0,
                    record.court_location,
                    record.date_of_hearing,
                    record.post_hearing_custody,
                ],
            )
            .map_err(map_sqlite)?;
        Ok(())
    }

    fn save_offence(&self, record: &OffenceRecord) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO offence (tx_id, case_id, asn_seq, offence_code, offence_short_title,
                    legal_aid_status, legal_aid_status_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.tx_id.0,
                    record.case_id.0,
                    record.asn_seq,
                    record.offence_code,
                    record.offence_short_title,
                    record.legal_aid_status,
                    record.legal_aid_status_date,
                ],
            )
            .map_err(map_sqlite)?;
        Ok(())
    }

    fn save_result(&self, record: &ResultRecord) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO result (tx_id, case_id, asn_seq, result_code) VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.tx_id.0,
                    record.case_id.0,
                    record.asn_seq,
                    record.result_code,
                ],
            )
            .map_err(map_sqlite)?;
        Ok(())
    }

    fn invoke_crown_court_outcome(
        &self,
        write: &CrownCourtOutcomeWrite,
    ) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO crown_court_outcomes (maat_id, outcome, bench_warrant_issued,
                    appeal_type, imprisoned, case_urn, crown_court_code, recorded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    write.maat_id.0,
                    write.outcome,
                    write.bench_warrant_issued,
                    write.appeal_type,
                    write.imprisoned,
                    write.case_urn,
                    write.crown_court_code,
                    Local::now().naive_local(),
                ],
            )
            .map_err(map_sqlite)?;
        Ok(())
    }

    fn update_sentence_order_date(
        &self,
        maat_id: MaatId,
        user: &str,
        sentence_order_date: NaiveDate,
    ) -> Result<(), StoreError> {
        let updated = self
            .conn
            .execute(
                "UPDATE rep_orders SET sentence_order_date = ?2, user_modified = ?3,
                    date_modified = ?4
                 WHERE id = ?1",
                params![
                    maat_id.0,
                    sentence_order_date,
                    user,
                    Local::now().naive_local()
                ],
            )
            .map_err(map_sqlite)?;
        missing_rep_order(updated, maat_id)
    }

    fn update_appeal_sentence_order_date(
        &self,
        maat_id: MaatId,
        user: &str,
        sentence_order_date: NaiveDate,
        date_changed: NaiveDate,
    ) -> Result<(), StoreError> {
        let updated = self
            .conn
            .execute(
                "UPDATE rep_orders SET appeal_sentence_order_date = ?2,
                    appeal_sentence_date_changed = ?3, user_modified = ?4, date_modified = ?5
                 WHERE id = ?1",
                params![
                    maat_id.0,
                    sentence_order_date,
                    date_changed,
                    user,
                    Local::now().naive_local()
                ],
            )
            .map_err(map_sqlite)?;
        missing_rep_order(updated, maat_id)
    }
}

fn missing_rep_order(updated: usize, maat_id: MaatId) -> Result<(), StoreError> {
    if updated == 0 {
        Err(StoreError::Unavailable(format!(
            "rep order {maat_id} disappeared before its sentence order date was written"
        )))
    } else {
        Ok(())
    }
}

fn link_from_row(row: &Row<'_>) -> rusqlite::Result<LinkRecord> {
    Ok(LinkRecord {
        maat_id: MaatId(row.get(0)?),
        case_id: CaseId(row.get(1)?),
        case_urn: row.get(2)?,
        created_tx_id: TransactionId(row.get(3)?),
        cjs_area_code: row.get(4)?,
        maat_cat: row.get(5)?,
        mlr_cat: row.get(6)?,
        created_date: row.get(7)?,
        removed_tx_id: row.get::<_, Option<i64>>(8)?.map(TransactionId),
        removed_date: row.get(9)?,
        status_tx_id: row.get::<_, Option<i64>>(10)?.map(TransactionId),
    })
}

fn map_sqlite(err: rusqlite::Error) -> StoreError {
    match err {
        rusqlite::Error::SqliteFailure(failure, detail)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            StoreError::Conflict(detail.unwrap_or_else(|| failure.to_string()))
        }
        other => StoreError::Unavailable(other.to_string()),
    }
}
