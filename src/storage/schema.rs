//! Schema creation and the migration ladder: a `schema_version` table
//! plus an ordered list of numbered migrations run sequentially.

use rusqlite::Connection;

pub const LATEST_SCHEMA_VERSION: i32 = 1;

pub fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;
    let current: i32 = conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;
    for version in (current + 1)..=LATEST_SCHEMA_VERSION {
        apply_migration(conn, version)?;
        conn.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (?1, strftime('%s','now'))",
            [version],
        )?;
    }
    Ok(())
}

fn apply_migration(conn: &Connection, version: i32) -> rusqlite::Result<()> {
    match version {
        1 => migration_001_initial_schema(conn),
        _ => Ok(()),
    }
}

fn migration_001_initial_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS projects (
            project_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            root_path TEXT NOT NULL,
            language_stats TEXT NOT NULL,
            last_indexed_at INTEGER,
            indexing_status TEXT NOT NULL,
            embedding_dimension INTEGER,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS files (
            project_id TEXT NOT NULL,
            file_path TEXT NOT NULL,
            language TEXT NOT NULL,
            file_hash TEXT NOT NULL,
            symbols_count INTEGER NOT NULL DEFAULT 0,
            indexed_at INTEGER NOT NULL,
            PRIMARY KEY (project_id, file_path)
        )",
        [],
    )?;
    conn.execute("CREATE INDEX IF NOT EXISTS idx_files_project ON files(project_id)", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS symbols (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL,
            file_path TEXT NOT NULL,
            language TEXT NOT NULL,
            symbol_type TEXT NOT NULL,
            name TEXT NOT NULL,
            name_path TEXT NOT NULL,
            start_line INTEGER NOT NULL,
            end_line INTEGER NOT NULL,
            start_byte INTEGER NOT NULL,
            end_byte INTEGER NOT NULL,
            signature TEXT,
            doc_string TEXT,
            source_code TEXT,
            embedding BLOB,
            parent_id TEXT,
            metadata TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        [],
    )?;
    conn.execute("CREATE INDEX IF NOT EXISTS idx_symbols_project_file ON symbols(project_id, file_path, start_byte)", [])?;
    conn.execute("CREATE INDEX IF NOT EXISTS idx_symbols_parent ON symbols(project_id, parent_id)", [])?;
    conn.execute("CREATE INDEX IF NOT EXISTS idx_symbols_name_path ON symbols(project_id, name_path)", [])?;
    conn.execute("CREATE INDEX IF NOT EXISTS idx_symbols_name ON symbols(project_id, name)", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS chunks (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL,
            file_path TEXT NOT NULL,
            chunk_index INTEGER NOT NULL,
            language TEXT NOT NULL,
            symbol_type TEXT,
            text TEXT NOT NULL,
            embedding BLOB
        )",
        [],
    )?;
    conn.execute("CREATE INDEX IF NOT EXISTS idx_chunks_project_file ON chunks(project_id, file_path)", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS jobs (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL,
            project_path TEXT NOT NULL,
            status TEXT NOT NULL,
            progress REAL NOT NULL,
            files_total INTEGER NOT NULL,
            files_indexed INTEGER NOT NULL,
            symbols_found INTEGER NOT NULL,
            started_at INTEGER NOT NULL,
            completed_at INTEGER,
            error TEXT,
            file_errors TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute("CREATE INDEX IF NOT EXISTS idx_jobs_project ON jobs(project_id, status)", [])?;

    Ok(())
}
</content>
