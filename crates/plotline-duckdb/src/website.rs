use anyhow::Result;

use crate::DuckDbBackend;

impl DuckDbBackend {
    /// Insert a website row if it does not already exist.
    ///
    /// Uses `ON CONFLICT DO NOTHING` so it is safe to run on every startup
    /// (the default-site seed in `main.rs`).
    pub async fn seed_website(&self, website_id: &str, domain: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO websites (id, name, domain) VALUES (?1, ?2, ?3)
             ON CONFLICT DO NOTHING",
            duckdb::params![website_id, domain, domain],
        )?;
        Ok(())
    }

    /// Return `true` if a website with the given id exists.
    ///
    /// Used by handlers to reject requests for unknown sites before any
    /// query work happens.
    pub async fn website_exists(&self, website_id: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT COUNT(*) FROM websites WHERE id = ?1")?;
        let count: i64 = stmt.query_row(duckdb::params![website_id], |row| row.get(0))?;
        Ok(count > 0)
    }

    /// The website's configured IANA timezone, if the site exists.
    pub async fn website_timezone(&self, website_id: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT timezone FROM websites WHERE id = ?1")?;
        let mut rows = stmt.query_map(duckdb::params![website_id], |row| row.get::<_, String>(0))?;
        match rows.next() {
            Some(tz) => Ok(Some(tz?)),
            None => Ok(None),
        }
    }
}
