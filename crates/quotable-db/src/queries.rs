use crate::Database;
use crate::models::{QuoteRow, TopicRow, UserRow};
use crate::visibility::{QuoteFilter, Visibility};
use anyhow::{Result, anyhow};
use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};
use thiserror::Error;

/// Hard ceiling on page size. A resource guard, not a user-facing error:
/// larger requests are clamped, not rejected.
pub const MAX_PAGE_SIZE: i64 = 100;

pub const DEFAULT_PAGE_SIZE: i64 = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidPage {
    #[error("limit must be positive")]
    NonPositiveLimit,
    #[error("offset must not be negative")]
    NegativeOffset,
}

/// Validated limit/offset pair for one page of a filtered scan.
/// Pagination is client-driven: the first page starts at offset 0, and
/// each "load more" passes the count of rows already retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    limit: i64,
    offset: i64,
}

impl Page {
    pub fn new(limit: i64, offset: i64) -> Result<Self, InvalidPage> {
        if limit <= 0 {
            return Err(InvalidPage::NonPositiveLimit);
        }
        if offset < 0 {
            return Err(InvalidPage::NegativeOffset);
        }
        Ok(Self {
            limit: limit.min(MAX_PAGE_SIZE),
            offset,
        })
    }

    pub fn first(limit: i64) -> Result<Self, InvalidPage> {
        Self::new(limit, 0)
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Advance past a fetched batch. Returns None once the store handed
    /// back fewer rows than requested — that batch was the final page.
    pub fn next(&self, fetched: usize) -> Option<Page> {
        if (fetched as i64) < self.limit {
            return None;
        }
        Some(Page {
            limit: self.limit,
            offset: self.offset + fetched as i64,
        })
    }
}

const QUOTE_COLUMNS: &str = "q.id, q.text, q.author, q.is_public, q.is_favorite, \
     q.user_id, q.topic_id, q.created_at, q.updated_at, u.username";

impl Database {
    // -- Quotes --

    /// Filtered scan over the quote set. The visibility branch and filter
    /// knobs each contribute predicates; everything user-supplied is a
    /// bound parameter.
    pub fn list_quotes(
        &self,
        visibility: Visibility,
        filter: &QuoteFilter,
        page: Page,
    ) -> Result<Vec<QuoteRow>> {
        self.with_conn(|conn| {
            let mut clauses: Vec<String> = Vec::new();
            let mut params: Vec<Value> = Vec::new();

            filter.push_predicates(&mut clauses, &mut params);
            visibility.push_predicate(&mut clauses, &mut params);

            params.push(Value::Integer(page.limit()));
            let limit_slot = params.len();
            params.push(Value::Integer(page.offset()));

            let where_sql = if clauses.is_empty() {
                String::new()
            } else {
                format!("WHERE {}", clauses.join(" AND "))
            };

            // LEFT JOIN so ownerless rows still appear, with a null username
            let sql = format!(
                "SELECT {QUOTE_COLUMNS}
                 FROM quotes q
                 LEFT JOIN users u ON q.user_id = u.id
                 {where_sql}
                 ORDER BY q.created_at DESC
                 LIMIT ?{limit_slot} OFFSET ?{}",
                limit_slot + 1
            );

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(params_from_iter(params), map_quote_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn get_quote(&self, id: i64) -> Result<Option<QuoteRow>> {
        self.with_conn(|conn| query_quote_by_id(conn, id))
    }

    pub fn insert_quote(
        &self,
        text: &str,
        author: Option<&str>,
        is_public: bool,
        user_id: Option<i64>,
        topic_id: Option<i64>,
    ) -> Result<QuoteRow> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO quotes (text, author, is_public, user_id, topic_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![text, author, is_public, user_id, topic_id],
            )?;
            let id = conn.last_insert_rowid();
            query_quote_by_id(conn, id)?.ok_or_else(|| anyhow!("inserted quote {} vanished", id))
        })
    }

    /// Full-row write of the already-merged field values. Returns None when
    /// the row no longer exists — a delete that won the race between the
    /// caller's existence check and this write surfaces here.
    pub fn update_quote(
        &self,
        id: i64,
        text: &str,
        author: Option<&str>,
        is_favorite: bool,
        is_public: bool,
        topic_id: Option<i64>,
    ) -> Result<Option<QuoteRow>> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE quotes
                 SET text = ?1, author = ?2, is_favorite = ?3, is_public = ?4,
                     topic_id = ?5, updated_at = datetime('now')
                 WHERE id = ?6",
                rusqlite::params![text, author, is_favorite, is_public, topic_id, id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_quote_by_id(conn, id)
        })
    }

    /// Returns false when the row was already gone.
    pub fn delete_quote(&self, id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute("DELETE FROM quotes WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    // -- Users --

    pub fn create_user(&self, email: &str, username: &str, password_hash: &str) -> Result<UserRow> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (email, username, password_hash) VALUES (?1, ?2, ?3)",
                (email, username, password_hash),
            )?;
            let id = conn.last_insert_rowid();
            query_user_by_id(conn, id)?.ok_or_else(|| anyhow!("inserted user {} vanished", id))
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    /// Login lookup: the identifier matches either the email or the username.
    pub fn get_user_by_identity(&self, identity: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, email, username, password_hash, role, created_at
                 FROM users WHERE username = ?1 OR email = ?1",
            )?;
            stmt.query_row([identity], map_user_row).optional()
        })
    }

    pub fn identity_taken(&self, email: &str, username: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let taken = conn
                .query_row(
                    "SELECT id FROM users WHERE email = ?1 OR username = ?2",
                    (email, username),
                    |row| row.get::<_, i64>(0),
                )
                .optional()?;
            Ok(taken.is_some())
        })
    }

    // -- Topics --

    pub fn list_topics(&self) -> Result<Vec<TopicRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, name FROM topics ORDER BY name")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(TopicRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn map_quote_row(row: &rusqlite::Row) -> rusqlite::Result<QuoteRow> {
    Ok(QuoteRow {
        id: row.get(0)?,
        text: row.get(1)?,
        author: row.get(2)?,
        is_public: row.get(3)?,
        is_favorite: row.get(4)?,
        user_id: row.get(5)?,
        topic_id: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
        username: row.get(9)?,
    })
}

fn map_user_row(row: &rusqlite::Row) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        email: row.get(1)?,
        username: row.get(2)?,
        password_hash: row.get(3)?,
        role: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn query_quote_by_id(conn: &Connection, id: i64) -> Result<Option<QuoteRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {QUOTE_COLUMNS}
         FROM quotes q
         LEFT JOIN users u ON q.user_id = u.id
         WHERE q.id = ?1"
    ))?;
    stmt.query_row([id], map_quote_row).optional()
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, email, username, password_hash, role, created_at FROM users WHERE id = ?1",
    )?;
    stmt.query_row([id], map_user_row).optional()
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
