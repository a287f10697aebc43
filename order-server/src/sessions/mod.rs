//! Table sessions (并桌)
//!
//! 一张主桌开启会话并生成短码, 相邻桌子凭码挂到同一张账单上。
//! 会话只影响结账归属, 不改变桌台占用状态。

use rand::Rng;
use shared::models::{SessionResolution, TableSessionCreate, TableSessionDetail};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use crate::db::repository::{dining_table, table_session, RepoError};
use crate::utils::AppError;

/// 短码字符集, 去掉易混淆的 I/L/O/0/1
const CODE_CHARSET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const CODE_LEN: usize = 6;
/// 碰撞重试上限
const MAX_CODE_ATTEMPTS: usize = 10;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to generate a unique session code")]
    CodeGeneration,

    #[error("Table {0} already belongs to an active session")]
    HostBusy(i64),

    #[error("Table number {0} is already part of an active session")]
    AlreadyLinked(i64),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Table not found: {0}")]
    TableNotFound(i64),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Repo(#[from] RepoError),
}

impl From<sqlx::Error> for SessionError {
    fn from(err: sqlx::Error) -> Self {
        SessionError::Repo(RepoError::from(err))
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::CodeGeneration => {
                AppError::internal("Failed to generate a unique session code")
            }
            SessionError::HostBusy(id) => {
                AppError::conflict(format!("Table {id} already belongs to an active session"))
            }
            SessionError::AlreadyLinked(number) => AppError::conflict(format!(
                "Table number {number} is already part of an active session"
            )),
            SessionError::NotFound(what) => AppError::not_found(what),
            SessionError::TableNotFound(id) => AppError::not_found(format!("Table {id}")),
            SessionError::Validation(msg) => AppError::Validation(msg),
            SessionError::Repo(e) => e.into(),
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Clone)]
pub struct SessionService {
    pool: SqlitePool,
}

impl SessionService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a session hosted by one table, optionally linking other
    /// tables by number.
    ///
    /// A table can participate in at most one active session at a time,
    /// as host or as member. Linked numbers are de-duplicated and the
    /// host's own number is ignored.
    pub async fn create(&self, payload: TableSessionCreate) -> SessionResult<TableSessionDetail> {
        let host = dining_table::find_by_id(&self.pool, payload.host_table_id)
            .await?
            .ok_or(SessionError::TableNotFound(payload.host_table_id))?;
        if host.is_takeaway_virtual() {
            return Err(SessionError::Validation(
                "The takeaway table cannot host a session".into(),
            ));
        }

        let mut linked: Vec<i64> = Vec::new();
        for number in payload.linked_table_numbers {
            if number != host.number && !linked.contains(&number) {
                linked.push(number);
            }
        }

        if table_session::find_active_by_host(&self.pool, host.id)
            .await?
            .is_some()
            || table_session::find_active_by_member_number(&self.pool, host.number)
                .await?
                .is_some()
        {
            return Err(SessionError::HostBusy(host.id));
        }
        for number in &linked {
            let table = dining_table::find_by_number(&self.pool, *number)
                .await?
                .ok_or_else(|| {
                    SessionError::Validation(format!("Unknown table number {number}"))
                })?;
            if table_session::find_active_by_host(&self.pool, table.id)
                .await?
                .is_some()
                || table_session::find_active_by_member_number(&self.pool, *number)
                    .await?
                    .is_some()
            {
                return Err(SessionError::AlreadyLinked(*number));
            }
        }

        let code = self.unique_code().await?;
        let session_id = snowflake_id();
        let now = now_millis();

        let mut tx = self.pool.begin().await?;
        let inserted = sqlx::query(
            "INSERT INTO table_session (id, code, host_table_id, is_active, created_at) \
             VALUES (?, ?, ?, 1, ?)",
        )
        .bind(session_id)
        .bind(&code)
        .bind(host.id)
        .bind(now)
        .execute(&mut *tx)
        .await;
        if let Err(e) = inserted {
            // The partial unique index backstops the pre-checks when two
            // creates race on the same host
            if is_host_conflict(&e) {
                return Err(SessionError::HostBusy(host.id));
            }
            return Err(e.into());
        }
        for (position, number) in linked.iter().enumerate() {
            sqlx::query(
                "INSERT INTO table_session_member (session_id, table_number, position) \
                 VALUES (?, ?, ?)",
            )
            .bind(session_id)
            .bind(number)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        info!(
            "Opened session {code} hosted by table {} with {} linked tables",
            host.number,
            linked.len()
        );
        let session = table_session::find_by_id(&self.pool, session_id)
            .await?
            .ok_or_else(|| SessionError::NotFound(format!("Session {session_id}")))?;
        Ok(table_session::detail(&self.pool, session).await?)
    }

    /// Find the active session a table participates in, as host or as
    /// linked member.
    pub async fn resolve_by_table_number(&self, number: i64) -> SessionResult<SessionResolution> {
        if let Some(session) =
            table_session::find_active_by_host_number(&self.pool, number).await?
        {
            let detail = table_session::detail(&self.pool, session).await?;
            return Ok(SessionResolution {
                is_host: true,
                detail,
            });
        }
        if let Some(session) =
            table_session::find_active_by_member_number(&self.pool, number).await?
        {
            let detail = table_session::detail(&self.pool, session).await?;
            return Ok(SessionResolution {
                is_host: false,
                detail,
            });
        }
        Err(SessionError::NotFound(format!(
            "No active session for table {number}"
        )))
    }

    /// Close a session by its code.
    ///
    /// The row is kept with a `closed_at` stamp; orders billed under
    /// the session keep their reference for history.
    pub async fn close(&self, code: &str) -> SessionResult<TableSessionDetail> {
        let session = table_session::find_active_by_code(&self.pool, code)
            .await?
            .ok_or_else(|| SessionError::NotFound(format!("No active session with code {code}")))?;

        let result = sqlx::query(
            "UPDATE table_session SET is_active = 0, closed_at = ? WHERE id = ? AND is_active = 1",
        )
        .bind(now_millis())
        .bind(session.id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(SessionError::NotFound(format!(
                "No active session with code {code}"
            )));
        }

        info!("Closed session {code}");
        let closed = table_session::find_by_id(&self.pool, session.id)
            .await?
            .ok_or_else(|| SessionError::NotFound(format!("Session {}", session.id)))?;
        Ok(table_session::detail(&self.pool, closed).await?)
    }

    async fn unique_code(&self) -> SessionResult<String> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_code();
            if table_session::find_active_by_code(&self.pool, &code)
                .await?
                .is_none()
            {
                return Ok(code);
            }
        }
        Err(SessionError::CodeGeneration)
    }
}

/// Random join code, 6 chars from the unambiguous charset
fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..CODE_CHARSET.len());
            CODE_CHARSET[idx] as char
        })
        .collect()
}

fn is_host_conflict(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.message().contains("host_table_id")
            || db.message().contains("idx_table_session_host_active")
    )
}

// ========== 单元测试 ==========
