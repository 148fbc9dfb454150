//! SQLite journal store adapter.

use crate::domain::entry::{CapitalUnit, EntryPatch, NewEntry, Outcome, Side, TradeEntry};
use crate::domain::error::JournalError;
use crate::domain::filter::{EntryFilter, PageRequest, PageResult};
use crate::ports::auth_port::{AuthPort, Owner};
use crate::ports::config_port::ConfigPort;
use crate::ports::journal_port::JournalPort;
use argon2::password_hash::{PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};
use rand::rngs::OsRng;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, JournalError> {
        let db_path =
            config
                .get_string("database", "path")
                .ok_or_else(|| JournalError::ConfigMissing {
                    section: "database".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("database", "pool_size", 4) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool =
            Pool::builder()
                .max_size(pool_size)
                .build(manager)
                .map_err(|e: r2d2::Error| JournalError::Database {
                    reason: e.to_string(),
                })?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, JournalError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| JournalError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, JournalError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| JournalError::Database {
                reason: e.to_string(),
            })
    }

    pub fn initialize_schema(&self) -> Result<(), JournalError> {
        let conn = self.conn()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                token_hash TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS journal (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id INTEGER NOT NULL REFERENCES users(id),
                date TEXT NOT NULL,
                capital REAL,
                capital_unit TEXT NOT NULL DEFAULT 'Base',
                instrument TEXT,
                side TEXT,
                lot_size REAL,
                entry_price REAL,
                take_profit REAL,
                stop_loss REAL,
                outcome TEXT,
                profit REAL,
                before_image TEXT,
                after_image TEXT,
                entry_reason TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_journal_owner ON journal(owner_id);
            CREATE INDEX IF NOT EXISTS idx_journal_owner_date ON journal(owner_id, date);",
        )
        .map_err(|e: rusqlite::Error| JournalError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        Ok(())
    }

    /// Store a new account with the argon2 hash of its bearer token.
    pub fn create_user(&self, username: &str, token: &str) -> Result<Owner, JournalError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(token.as_bytes(), &salt)
            .map_err(|e| JournalError::Database {
                reason: format!("token hashing failed: {e}"),
            })?
            .to_string();

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (username, token_hash) VALUES (?1, ?2)",
            params![username, hash],
        )
        .map_err(|e: rusqlite::Error| JournalError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        Ok(Owner {
            id: conn.last_insert_rowid(),
            username: username.to_string(),
        })
    }

    pub fn find_user(&self, username: &str) -> Result<Option<Owner>, JournalError> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, username FROM users WHERE username = ?1",
            params![username],
            |row| {
                Ok(Owner {
                    id: row.get(0)?,
                    username: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(|e: rusqlite::Error| JournalError::DatabaseQuery {
            reason: e.to_string(),
        })
    }

    fn map_entry_row(row: &Row<'_>) -> rusqlite::Result<TradeEntry> {
        let date_str: String = row.get(2)?;
        let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                date_str.len(),
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?;
        let unit: String = row.get(4)?;
        let side: Option<String> = row.get(6)?;
        let outcome: Option<String> = row.get(11)?;

        Ok(TradeEntry {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            date,
            capital: row.get(3)?,
            capital_unit: CapitalUnit::from_raw(&unit),
            instrument: row.get(5)?,
            side: side.as_deref().and_then(Side::parse),
            lot_size: row.get(7)?,
            entry_price: row.get(8)?,
            take_profit: row.get(9)?,
            stop_loss: row.get(10)?,
            outcome: outcome.as_deref().and_then(Outcome::parse),
            profit: row.get(12)?,
            before_image: row.get(13)?,
            after_image: row.get(14)?,
            entry_reason: row.get(15)?,
        })
    }

    /// `WHERE` fragments plus their bound values for a listing filter.
    /// Only whitelisted columns and bound parameters ever reach SQL.
    fn filter_clauses(owner_id: i64, filter: &EntryFilter) -> (Vec<&'static str>, Vec<Value>) {
        let mut clauses = vec!["owner_id = ?"];
        let mut values = vec![Value::Integer(owner_id)];

        if let Some(instrument) = &filter.instrument {
            clauses.push("instrument LIKE ?");
            values.push(Value::Text(format!("%{instrument}%")));
        }
        if filter.date_from.is_some() || filter.date_to.is_some() {
            if let Some(from) = filter.date_from {
                clauses.push("date >= ?");
                values.push(Value::Text(from.format("%Y-%m-%d").to_string()));
            }
            if let Some(to) = filter.date_to {
                clauses.push("date <= ?");
                values.push(Value::Text(to.format("%Y-%m-%d").to_string()));
            }
        } else if let Some(date) = filter.date {
            clauses.push("date = ?");
            values.push(Value::Text(date.format("%Y-%m-%d").to_string()));
        }
        if let Some(outcome) = filter.outcome {
            clauses.push("outcome = ? COLLATE NOCASE");
            values.push(Value::Text(outcome.as_str().to_string()));
        }
        if let Some(side) = filter.side {
            clauses.push("side = ? COLLATE NOCASE");
            values.push(Value::Text(side.as_str().to_string()));
        }

        (clauses, values)
    }
}

const ENTRY_COLUMNS: &str = "id, owner_id, date, capital, capital_unit, instrument, side, \
     lot_size, entry_price, take_profit, stop_loss, outcome, profit, \
     before_image, after_image, entry_reason";

impl JournalPort for SqliteAdapter {
    fn insert(&self, owner_id: i64, entry: NewEntry) -> Result<TradeEntry, JournalError> {
        let date = entry.date.ok_or_else(|| JournalError::EntryInvalid {
            reason: "date is required".into(),
        })?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO journal (owner_id, date, capital, capital_unit, instrument, side,
                lot_size, entry_price, take_profit, stop_loss, outcome, profit,
                before_image, after_image, entry_reason)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                owner_id,
                date.format("%Y-%m-%d").to_string(),
                entry.capital,
                entry.capital_unit.as_str(),
                entry.instrument,
                entry.side.map(|s| s.as_str()),
                entry.lot_size,
                entry.entry_price,
                entry.take_profit,
                entry.stop_loss,
                entry.outcome.map(|o| o.as_str()),
                entry.profit,
                entry.before_image,
                entry.after_image,
                entry.entry_reason,
            ],
        )
        .map_err(|e: rusqlite::Error| JournalError::DatabaseQuery {
            reason: e.to_string(),
        })?;

        let id = conn.last_insert_rowid();

        Ok(TradeEntry {
            id,
            owner_id,
            date,
            capital: entry.capital,
            capital_unit: entry.capital_unit,
            instrument: entry.instrument,
            side: entry.side,
            lot_size: entry.lot_size,
            entry_price: entry.entry_price,
            take_profit: entry.take_profit,
            stop_loss: entry.stop_loss,
            outcome: entry.outcome,
            profit: entry.profit,
            before_image: entry.before_image,
            after_image: entry.after_image,
            entry_reason: entry.entry_reason,
        })
    }

    fn get(&self, owner_id: i64, id: i64) -> Result<Option<TradeEntry>, JournalError> {
        let conn = self.conn()?;
        let query =
            format!("SELECT {ENTRY_COLUMNS} FROM journal WHERE id = ?1 AND owner_id = ?2");

        conn.query_row(&query, params![id, owner_id], Self::map_entry_row)
            .optional()
            .map_err(|e: rusqlite::Error| JournalError::DatabaseQuery {
                reason: e.to_string(),
            })
    }

    fn update(&self, owner_id: i64, id: i64, patch: EntryPatch) -> Result<bool, JournalError> {
        if patch.is_empty() {
            return Ok(self.get(owner_id, id)?.is_some());
        }

        let mut sets: Vec<&'static str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(date) = patch.date {
            sets.push("date = ?");
            values.push(Value::Text(date.format("%Y-%m-%d").to_string()));
        }
        if let Some(capital) = patch.capital {
            sets.push("capital = ?");
            values.push(Value::Real(capital));
        }
        if let Some(unit) = patch.capital_unit {
            sets.push("capital_unit = ?");
            values.push(Value::Text(unit.as_str().to_string()));
        }
        if let Some(instrument) = patch.instrument {
            sets.push("instrument = ?");
            values.push(Value::Text(instrument));
        }
        if let Some(side) = patch.side {
            sets.push("side = ?");
            values.push(Value::Text(side.as_str().to_string()));
        }
        if let Some(lot_size) = patch.lot_size {
            sets.push("lot_size = ?");
            values.push(Value::Real(lot_size));
        }
        if let Some(entry_price) = patch.entry_price {
            sets.push("entry_price = ?");
            values.push(Value::Real(entry_price));
        }
        if let Some(take_profit) = patch.take_profit {
            sets.push("take_profit = ?");
            values.push(Value::Real(take_profit));
        }
        if let Some(stop_loss) = patch.stop_loss {
            sets.push("stop_loss = ?");
            values.push(Value::Real(stop_loss));
        }
        if let Some(outcome) = patch.outcome {
            sets.push("outcome = ?");
            values.push(Value::Text(outcome.as_str().to_string()));
        }
        if let Some(profit) = patch.profit {
            sets.push("profit = ?");
            values.push(Value::Real(profit));
        }
        if let Some(before_image) = patch.before_image {
            sets.push("before_image = ?");
            values.push(Value::Text(before_image));
        }
        if let Some(after_image) = patch.after_image {
            sets.push("after_image = ?");
            values.push(Value::Text(after_image));
        }
        if let Some(entry_reason) = patch.entry_reason {
            sets.push("entry_reason = ?");
            values.push(Value::Text(entry_reason));
        }

        values.push(Value::Integer(id));
        values.push(Value::Integer(owner_id));

        let query = format!(
            "UPDATE journal SET {} WHERE id = ? AND owner_id = ?",
            sets.join(", ")
        );

        let conn = self.conn()?;
        let changed = conn
            .execute(&query, params_from_iter(values.iter()))
            .map_err(|e: rusqlite::Error| JournalError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        Ok(changed > 0)
    }

    fn delete(&self, owner_id: i64, id: i64) -> Result<bool, JournalError> {
        let conn = self.conn()?;
        let deleted = conn
            .execute(
                "DELETE FROM journal WHERE id = ?1 AND owner_id = ?2",
                params![id, owner_id],
            )
            .map_err(|e: rusqlite::Error| JournalError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        Ok(deleted > 0)
    }

    fn list(
        &self,
        owner_id: i64,
        filter: &EntryFilter,
        page: PageRequest,
    ) -> Result<PageResult<TradeEntry>, JournalError> {
        let (clauses, mut values) = Self::filter_clauses(owner_id, filter);
        let where_clause = clauses.join(" AND ");

        let conn = self.conn()?;

        let count_query = format!("SELECT COUNT(*) FROM journal WHERE {where_clause}");
        let total: i64 = conn
            .query_row(&count_query, params_from_iter(values.iter()), |row| {
                row.get(0)
            })
            .map_err(|e: rusqlite::Error| JournalError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let query = format!(
            "SELECT {ENTRY_COLUMNS} FROM journal WHERE {where_clause}
             ORDER BY {} {}, id {}
             LIMIT ? OFFSET ?",
            filter.sort_by.column(),
            filter.sort_order.keyword(),
            filter.sort_order.keyword(),
        );
        values.push(Value::Integer(page.limit as i64));
        values.push(Value::Integer(page.offset() as i64));

        let mut stmt =
            conn.prepare(&query)
                .map_err(|e: rusqlite::Error| JournalError::DatabaseQuery {
                    reason: e.to_string(),
                })?;

        let mapped = stmt
            .query_map(params_from_iter(values.iter()), Self::map_entry_row)
            .map_err(|e: rusqlite::Error| JournalError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let mut rows = Vec::new();
        for row in mapped {
            rows.push(
                row.map_err(|e: rusqlite::Error| JournalError::DatabaseQuery {
                    reason: e.to_string(),
                })?,
            );
        }

        Ok(PageResult {
            rows,
            total: total as u64,
        })
    }

    fn fetch_all_for_owner(&self, owner_id: i64) -> Result<Vec<TradeEntry>, JournalError> {
        let conn = self.conn()?;
        let query = format!(
            "SELECT {ENTRY_COLUMNS} FROM journal WHERE owner_id = ?1 ORDER BY date ASC, id ASC"
        );

        let mut stmt =
            conn.prepare(&query)
                .map_err(|e: rusqlite::Error| JournalError::DatabaseQuery {
                    reason: e.to_string(),
                })?;

        let mapped = stmt
            .query_map(params![owner_id], Self::map_entry_row)
            .map_err(|e: rusqlite::Error| JournalError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let mut rows = Vec::new();
        for row in mapped {
            rows.push(
                row.map_err(|e: rusqlite::Error| JournalError::DatabaseQuery {
                    reason: e.to_string(),
                })?,
            );
        }

        Ok(rows)
    }
}

impl AuthPort for SqliteAdapter {
    fn resolve_token(&self, token: &str) -> Result<Option<Owner>, JournalError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT id, username, token_hash FROM users")
            .map_err(|e: rusqlite::Error| JournalError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let mapped = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(|e: rusqlite::Error| JournalError::DatabaseQuery {
                reason: e.to_string(),
            })?;

        let verifier = Argon2::default();
        for row in mapped {
            let (id, username, hash) =
                row.map_err(|e: rusqlite::Error| JournalError::DatabaseQuery {
                    reason: e.to_string(),
                })?;
            let Ok(parsed) = PasswordHash::new(&hash) else {
                continue;
            };
            if verifier
                .verify_password(token.as_bytes(), &parsed)
                .is_ok()
            {
                return Ok(Some(Owner { id, username }));
            }
        }

        Ok(None)
    }
}
