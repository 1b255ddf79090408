//! Postgres store over a single SQLx connection.
//!
//! All functions run on the one `PgConnection` opened by [`PgStore::connect`].
//! Soft-delete guards (`AND isDeleted = false`) are enforced in SQL so that
//! repeated sweeps report zero affected rows.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use iamsync_core::{EntityKind, GroupRecord, IamGroup, IamUser, UserRecord};
use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::schema;
use crate::store::SyncStore;

/// A [`SyncStore`] backed by one Postgres connection.
#[derive(Debug)]
pub struct PgStore {
    conn: Option<PgConnection>,
}

impl PgStore {
    /// Open the run's connection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connect`] if the server is unreachable, rejects
    /// the credentials, or fails the TLS handshake.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        Self::connect_with(&config.connect_options()).await
    }

    /// Open the run's connection from prepared SQLx options.
    pub async fn connect_with(options: &PgConnectOptions) -> Result<Self, StoreError> {
        let host = options.get_host().to_string();
        let port = options.get_port();
        let database = options.get_database().unwrap_or_default().to_string();

        let conn = PgConnection::connect_with(options)
            .await
            .map_err(|source| StoreError::Connect {
                host: host.clone(),
                port,
                database: database.clone(),
                source,
            })?;

        info!(%host, port, %database, "Connected to PostgreSQL");
        Ok(Self { conn: Some(conn) })
    }

    fn conn(&mut self) -> Result<&mut PgConnection, StoreError> {
        self.conn.as_mut().ok_or(StoreError::Closed)
    }
}

fn query_error(statement: &'static str, kind: EntityKind) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |source| StoreError::Query {
        statement,
        table: kind.table(),
        source,
    }
}

#[async_trait]
impl SyncStore for PgStore {
    async fn ensure_table(&mut self, kind: EntityKind) -> Result<(), StoreError> {
        sqlx::query(schema::create_table(kind))
            .execute(self.conn()?)
            .await
            .map_err(query_error("CREATE TABLE", kind))?;
        debug!(table = kind.table(), "table ensured");
        Ok(())
    }

    async fn mark_deleted_by_name(
        &mut self,
        kind: EntityKind,
        name: &str,
    ) -> Result<u64, StoreError> {
        let sql = schema::mark_deleted_by_name(kind);
        let result = sqlx::query(&sql)
            .bind(name)
            .execute(self.conn()?)
            .await
            .map_err(query_error("UPDATE", kind))?;
        Ok(result.rows_affected())
    }

    async fn mark_deleted_by_id(&mut self, kind: EntityKind, id: &str) -> Result<u64, StoreError> {
        let sql = schema::mark_deleted_by_id(kind);
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(self.conn()?)
            .await
            .map_err(query_error("UPDATE", kind))?;
        Ok(result.rows_affected())
    }

    async fn active_ids(&mut self, kind: EntityKind) -> Result<Vec<String>, StoreError> {
        let sql = schema::active_ids(kind);
        sqlx::query_scalar::<_, String>(&sql)
            .fetch_all(self.conn()?)
            .await
            .map_err(query_error("SELECT", kind))
    }

    async fn upsert_user(
        &mut self,
        user: &IamUser,
        synced_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(schema::UPSERT_USER)
            .bind(&user.user_id)
            .bind(&user.user_name)
            .bind(&user.arn)
            .bind(user.create_date.naive_utc())
            .bind(user.password_last_used.map(|t| t.naive_utc()))
            .bind(synced_at.naive_utc())
            .execute(self.conn()?)
            .await
            .map_err(query_error("INSERT", EntityKind::User))?;
        Ok(())
    }

    async fn upsert_group(
        &mut self,
        group: &IamGroup,
        synced_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(schema::UPSERT_GROUP)
            .bind(&group.group_id)
            .bind(&group.group_name)
            .bind(&group.arn)
            .bind(group.create_date.naive_utc())
            .bind(synced_at.naive_utc())
            .execute(self.conn()?)
            .await
            .map_err(query_error("INSERT", EntityKind::Group))?;
        Ok(())
    }

    async fn get_user(&mut self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(schema::SELECT_USER)
            .bind(user_id)
            .fetch_optional(self.conn()?)
            .await
            .map_err(query_error("SELECT", EntityKind::User))?;
        row.map(UserRow::into_record).transpose()
    }

    async fn get_group(&mut self, group_id: &str) -> Result<Option<GroupRecord>, StoreError> {
        let row = sqlx::query_as::<_, GroupRow>(schema::SELECT_GROUP)
            .bind(group_id)
            .fetch_optional(self.conn()?)
            .await
            .map_err(query_error("SELECT", EntityKind::Group))?;
        row.map(GroupRow::into_record).transpose()
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        match self.conn.take() {
            Some(conn) => {
                conn.close().await.map_err(StoreError::Close)?;
                info!("PostgreSQL connection closed");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

/// Internal row type for SQLx mapping. Every column is nullable in the DDL.
#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: String,
    user_name: Option<String>,
    arn: Option<String>,
    create_date: Option<NaiveDateTime>,
    password_last_used: Option<NaiveDateTime>,
    last_synced: Option<NaiveDateTime>,
    is_deleted: Option<bool>,
}

impl UserRow {
    fn into_record(self) -> Result<UserRecord, StoreError> {
        let table = EntityKind::User.table();
        let null = |column: &'static str, id: &str| StoreError::NullColumn {
            table,
            column,
            id: id.to_string(),
        };
        Ok(UserRecord {
            user_name: self.user_name.ok_or_else(|| null("UserName", &self.user_id))?,
            arn: self.arn.ok_or_else(|| null("Arn", &self.user_id))?,
            create_date: self
                .create_date
                .ok_or_else(|| null("CreateDate", &self.user_id))?
                .and_utc(),
            password_last_used: self.password_last_used.map(|t| t.and_utc()),
            last_synced: self
                .last_synced
                .ok_or_else(|| null("LastSynced", &self.user_id))?
                .and_utc(),
            is_deleted: self.is_deleted.unwrap_or(false),
            user_id: self.user_id,
        })
    }
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct GroupRow {
    group_id: String,
    group_name: Option<String>,
    arn: Option<String>,
    create_date: Option<NaiveDateTime>,
    last_synced: Option<NaiveDateTime>,
    is_deleted: Option<bool>,
}

impl GroupRow {
    fn into_record(self) -> Result<GroupRecord, StoreError> {
        let table = EntityKind::Group.table();
        let null = |column: &'static str, id: &str| StoreError::NullColumn {
            table,
            column,
            id: id.to_string(),
        };
        Ok(GroupRecord {
            group_name: self.group_name.ok_or_else(|| null("GroupName", &self.group_id))?,
            arn: self.arn.ok_or_else(|| null("Arn", &self.group_id))?,
            create_date: self
                .create_date
                .ok_or_else(|| null("CreateDate", &self.group_id))?
                .and_utc(),
            last_synced: self
                .last_synced
                .ok_or_else(|| null("LastSynced", &self.group_id))?
                .and_utc(),
            is_deleted: self.is_deleted.unwrap_or(false),
            group_id: self.group_id,
        })
    }
}
