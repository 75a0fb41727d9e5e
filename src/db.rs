use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::{BugetError, Result};
use crate::models::{CategoryBucket, ImportResult, Transaction, TransactionKind, UserId};

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    category_type TEXT NOT NULL,
    color TEXT DEFAULT '#3498db',
    UNIQUE (user_id, name, category_type),
    FOREIGN KEY (user_id) REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL,
    category_id INTEGER NOT NULL,
    description TEXT,
    amount TEXT NOT NULL,
    category_type TEXT NOT NULL,
    date TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (user_id) REFERENCES users(id),
    FOREIGN KEY (category_id) REFERENCES categories(id)
);
";

const BUCKET_COLOR: &str = "#888888";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Look up a user by name (case-insensitive), creating it if missing.
pub fn ensure_user(conn: &Connection, username: &str) -> Result<UserId> {
    let username = username.trim().to_lowercase();
    if username.is_empty() {
        return Err(BugetError::UnknownUser("(empty)".to_string()));
    }
    conn.execute(
        "INSERT INTO users (username) VALUES (?1) ON CONFLICT(username) DO NOTHING",
        [&username],
    )?;
    let id = conn.query_row("SELECT id FROM users WHERE username = ?1", [&username], |r| r.get(0))?;
    Ok(id)
}

pub fn find_user(conn: &Connection, username: &str) -> Result<UserId> {
    let username = username.trim().to_lowercase();
    conn.query_row("SELECT id FROM users WHERE username = ?1", [&username], |r| r.get(0))
        .optional()?
        .ok_or(BugetError::UnknownUser(username))
}

/// Category id for a fallback bucket. Creation is an upsert on
/// (user, name, kind), so racing imports share one row.
pub fn resolve_bucket(conn: &Connection, bucket: &CategoryBucket) -> Result<i64> {
    conn.execute(
        "INSERT INTO categories (user_id, name, category_type, color) VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT(user_id, name, category_type) DO NOTHING",
        rusqlite::params![bucket.user_id, bucket.name, bucket.kind.as_str(), BUCKET_COLOR],
    )?;
    let id = conn.query_row(
        "SELECT id FROM categories WHERE user_id = ?1 AND name = ?2 AND category_type = ?3",
        rusqlite::params![bucket.user_id, bucket.name, bucket.kind.as_str()],
        |r| r.get(0),
    )?;
    Ok(id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistOutcome {
    pub inserted: usize,
    pub buckets: usize,
}

/// Store every draft of an import in one SQL transaction. Either the whole
/// batch lands or nothing does.
pub fn persist_import(conn: &mut Connection, result: &ImportResult) -> Result<PersistOutcome> {
    let tx = conn.transaction()?;
    let mut bucket_ids = Vec::with_capacity(result.buckets.len());
    for bucket in &result.buckets {
        let id = resolve_bucket(&tx, bucket)?;
        debug!(category_id = id, kind = %bucket.kind, "resolved import bucket");
        bucket_ids.push((bucket.user_id, bucket.kind, id));
    }

    let mut inserted = 0usize;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO transactions (user_id, category_id, description, amount, category_type, date) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for draft in &result.drafts {
            let category_id = bucket_ids
                .iter()
                .find(|(user, kind, _)| *user == draft.user_id && *kind == draft.kind)
                .map(|(_, _, id)| *id);
            let category_id = match category_id {
                Some(id) => id,
                None => resolve_bucket(&tx, &CategoryBucket::fallback(draft.user_id, draft.kind))?,
            };
            stmt.execute(rusqlite::params![
                draft.user_id,
                category_id,
                draft.description,
                draft.amount.to_string(),
                draft.kind.as_str(),
                draft.date.format("%Y-%m-%d").to_string(),
            ])?;
            inserted += 1;
        }
    }
    tx.commit()?;
    info!(inserted, buckets = bucket_ids.len(), "import committed");
    Ok(PersistOutcome {
        inserted,
        buckets: bucket_ids.len(),
    })
}

/// Newest transactions for a user.
pub fn list_transactions(conn: &Connection, user_id: UserId, limit: usize) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.date, t.description, t.amount, t.category_type, c.name \
         FROM transactions t JOIN categories c ON t.category_id = c.id \
         WHERE t.user_id = ?1 ORDER BY t.date DESC, t.id DESC LIMIT ?2",
    )?;
    let raw: Vec<(i64, String, Option<String>, String, String, String)> = stmt
        .query_map(rusqlite::params![user_id, limit as i64], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    raw.into_iter()
        .map(|(id, date, description, amount, kind, category_name)| -> Result<Transaction> {
            let corrupt = |what: &str| BugetError::Corrupt(format!("transaction {id} has a bad {what}"));
            Ok(Transaction {
                id,
                date: NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|_| corrupt("date"))?,
                description: description.unwrap_or_default(),
                amount: Decimal::from_str(&amount).map_err(|_| corrupt("amount"))?,
                kind: TransactionKind::from_db(&kind).ok_or_else(|| corrupt("type"))?,
                category_name,
            })
        })
        .collect()
}

pub fn count(conn: &Connection, table: &str) -> Result<i64> {
    let n = conn.query_row(&format!("SELECT count(*) FROM {table}"), [], |r| r.get(0))?;
    Ok(n)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::importer::parse_statement;
    use crate::models::{TransactionDraft, IMPORT_BUCKET_NAME};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    const STATEMENT: &str = "\
Titular,Ion Popescu
,Data,,,Detalii tranzactie,,,Debit,Credit
01 ianuarie 2024,,,Plata facturi,,,\"100,00\",,
02 ianuarie 2024,,,Incasare,,,,,\"2.000,00\"
,,,Beneficiar: Firma X,,,,,
";

    fn draft(user_id: UserId, kind: TransactionKind) -> TransactionDraft {
        TransactionDraft {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            amount: Decimal::new(1050, 2),
            kind,
            description: "x".to_string(),
            user_id,
        }
    }

    #[test]
    fn test_init_db_creates_tables() {
        let (_dir, conn) = test_db();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        for expected in &["users", "categories", "transactions"] {
            assert!(tables.contains(&expected.to_string()), "missing table: {expected}");
        }
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, conn) = test_db();
        init_db(&conn).unwrap();
    }

    #[test]
    fn test_ensure_user_normalizes_case() {
        let (_dir, conn) = test_db();
        let a = ensure_user(&conn, "Ana").unwrap();
        let b = ensure_user(&conn, " ANA ").unwrap();
        assert_eq!(a, b);
        assert_eq!(find_user(&conn, "ana").unwrap(), a);
        assert!(matches!(find_user(&conn, "bob"), Err(BugetError::UnknownUser(_))));
        assert!(ensure_user(&conn, "  ").is_err());
    }

    #[test]
    fn test_resolve_bucket_is_idempotent() {
        let (_dir, conn) = test_db();
        let user = ensure_user(&conn, "ana").unwrap();
        let bucket = CategoryBucket::fallback(user, TransactionKind::Expense);
        let first = resolve_bucket(&conn, &bucket).unwrap();
        let second = resolve_bucket(&conn, &bucket).unwrap();
        assert_eq!(first, second);
        let other = resolve_bucket(&conn, &CategoryBucket::fallback(user, TransactionKind::Income)).unwrap();
        assert_ne!(first, other);
        assert_eq!(count(&conn, "categories").unwrap(), 2);
        let color: String = conn
            .query_row("SELECT color FROM categories WHERE id = ?1", [first], |r| r.get(0))
            .unwrap();
        assert_eq!(color, "#888888");
    }

    #[test]
    fn test_persist_import_files_under_buckets() {
        let (_dir, mut conn) = test_db();
        let user = ensure_user(&conn, "ana").unwrap();
        let result = parse_statement(STATEMENT.as_bytes(), user).unwrap();
        let outcome = persist_import(&mut conn, &result).unwrap();
        assert_eq!(outcome, PersistOutcome { inserted: 2, buckets: 2 });

        let txns = list_transactions(&conn, user, 10).unwrap();
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].kind, TransactionKind::Income);
        assert_eq!(txns[0].amount, Decimal::new(200000, 2));
        assert_eq!(txns[0].description, "Beneficiar: Firma X");
        assert_eq!(txns[0].category_name, IMPORT_BUCKET_NAME);
        assert_eq!(txns[1].amount.to_string(), "100.00");
    }

    #[test]
    fn test_reimport_duplicates_transactions_not_buckets() {
        let (_dir, mut conn) = test_db();
        let user = ensure_user(&conn, "ana").unwrap();
        let result = parse_statement(STATEMENT.as_bytes(), user).unwrap();
        persist_import(&mut conn, &result).unwrap();
        persist_import(&mut conn, &result).unwrap();
        assert_eq!(count(&conn, "transactions").unwrap(), 4);
        assert_eq!(count(&conn, "categories").unwrap(), 2);
    }

    #[test]
    fn test_persist_import_is_atomic() {
        let (_dir, mut conn) = test_db();
        let user = ensure_user(&conn, "ana").unwrap();
        // The second draft references a user that does not exist, which the
        // foreign key rejects part-way through the batch.
        let result = ImportResult {
            drafts: vec![draft(user, TransactionKind::Expense), draft(user + 100, TransactionKind::Expense)],
            skipped_count: 0,
            warnings: vec![],
            header_row: Some(0),
            buckets: vec![CategoryBucket::fallback(user, TransactionKind::Expense)],
        };
        assert!(persist_import(&mut conn, &result).is_err());
        assert_eq!(count(&conn, "transactions").unwrap(), 0);
        assert_eq!(count(&conn, "categories").unwrap(), 0);
    }

    #[test]
    fn test_list_transactions_scoped_to_user() {
        let (_dir, mut conn) = test_db();
        let ana = ensure_user(&conn, "ana").unwrap();
        let bob = ensure_user(&conn, "bob").unwrap();
        let result = parse_statement(STATEMENT.as_bytes(), ana).unwrap();
        persist_import(&mut conn, &result).unwrap();
        assert!(list_transactions(&conn, bob, 10).unwrap().is_empty());
        assert_eq!(list_transactions(&conn, ana, 1).unwrap().len(), 1);
    }
}
