/// DuckDB initialization SQL.
///
/// Executed once at database open time via `Connection::execute_batch`.
/// All statements use `IF NOT EXISTS` so they are safe to re-run on every
/// startup.
///
/// `memory_limit` is a DuckDB size string (`"512MB"`, `"1GB"`, ...) read from
/// `Config.duckdb_memory_limit` at the call site. Always set explicitly — the
/// DuckDB default of 80% of system RAM is not acceptable for a server
/// process. `threads = 2` keeps the background pool small for single-writer
/// embedded use.
///
/// `events.created_at` is TIMESTAMPTZ and always written as RFC 3339 UTC;
/// timezone conversion happens at query time (see `queries::timeseries`), so
/// one stored event can be bucketed under any dashboard timezone.
pub fn init_sql(memory_limit: &str) -> String {
    format!(
        r#"SET memory_limit = '{memory_limit}';
SET threads = 2;

CREATE TABLE IF NOT EXISTS websites (
    id              VARCHAR PRIMARY KEY,
    name            VARCHAR NOT NULL,
    domain          VARCHAR NOT NULL,
    timezone        VARCHAR(64) NOT NULL DEFAULT 'UTC',
    created_at      TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS events (
    id              VARCHAR PRIMARY KEY,
    website_id      VARCHAR NOT NULL,
    visitor_id      VARCHAR NOT NULL,
    url             VARCHAR NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_events_site_time ON events (website_id, created_at);
"#
    )
}
