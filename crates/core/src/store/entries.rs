//! Entry CRUD operations.
//!
//! Entries live under a generation label; one generation corresponds to
//! one deployed build. Reads and writes address a single (generation, key)
//! pair; deletion operates on whole generations.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A stored response snapshot.
///
/// Captures everything needed to replay a response later: status, headers
/// and body bytes, plus the URL it came from and when it was fetched.
/// Non-2xx statuses are valid snapshots; a resolved 404 is still a
/// response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSnapshot {
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub fetched_at: String,
}

impl ResponseSnapshot {
    /// Look up the first header with the given name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl CacheDb {
    /// Insert or update an entry under the given generation.
    ///
    /// Uses UPSERT semantics: a single statement, so any concurrent reader
    /// sees either the old snapshot or the new one, never a partial write.
    /// Last writer wins for overlapping writes to the same key.
    pub async fn put_entry(&self, generation: &str, key: &str, snapshot: &ResponseSnapshot) -> Result<(), Error> {
        let generation = generation.to_string();
        let key = key.to_string();
        let snapshot = snapshot.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let headers_json = serde_json::to_string(&snapshot.headers)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
                conn.execute(
                    "INSERT INTO entries (generation, key, url, status, headers_json, body, fetched_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT(generation, key) DO UPDATE SET
                        url = excluded.url,
                        status = excluded.status,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        fetched_at = excluded.fetched_at",
                    params![
                        &generation,
                        &key,
                        &snapshot.url,
                        snapshot.status as i64,
                        &headers_json,
                        &snapshot.body,
                        &snapshot.fetched_at,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get an entry by generation and key.
    ///
    /// Returns None if no entry exists under that generation.
    pub async fn get_entry(&self, generation: &str, key: &str) -> Result<Option<ResponseSnapshot>, Error> {
        let generation = generation.to_string();
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<ResponseSnapshot>, Error> {
                let result = conn.query_row(
                    "SELECT url, status, headers_json, body, fetched_at
                     FROM entries WHERE generation = ?1 AND key = ?2",
                    params![generation, key],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, i64>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, Vec<u8>>(3)?,
                            row.get::<_, String>(4)?,
                        ))
                    },
                );

                match result {
                    Ok((url, status, headers_json, body, fetched_at)) => {
                        let headers: Vec<(String, String)> = serde_json::from_str(&headers_json).unwrap_or_default();
                        Ok(Some(ResponseSnapshot { url, status: status as u16, headers, body, fetched_at }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// List all generation labels present in the store.
    pub async fn list_generations(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT DISTINCT generation FROM entries ORDER BY generation")?;
                let labels = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(labels)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete every entry under the given generation.
    ///
    /// Returns the number of deleted entries.
    pub async fn delete_generation(&self, generation: &str) -> Result<u64, Error> {
        let generation = generation.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM entries WHERE generation = ?1", params![generation])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Count entries under the given generation.
    pub async fn count_entries(&self, generation: &str) -> Result<u64, Error> {
        let generation = generation.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM entries WHERE generation = ?1",
                    params![generation],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
