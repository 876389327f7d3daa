use rusqlite::{params, Connection};
use tracing::debug;

use crate::db::Database;
use crate::error::Result;

/// Skills every store starts with.
pub const DEFAULT_SKILLS: [&str; 8] = [
    "Construction",
    "Painting",
    "Plumbing",
    "Electrical",
    "Carpentry",
    "Masonry",
    "Welding",
    "Tiling",
];

pub const TABLES: [&str; 6] = [
    "labour_profiles",
    "skills",
    "labour_skills",
    "jobs",
    "labour_jobs",
    "contractor_profiles",
];

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS labour_profiles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name TEXT NOT NULL,
    age INTEGER NOT NULL CHECK (age >= 0),
    phone TEXT NOT NULL,
    location TEXT NOT NULL,
    languages TEXT NOT NULL,
    photo TEXT,
    id_proof TEXT,
    experience INTEGER NOT NULL CHECK (experience >= 0),
    hourly_rate INTEGER NOT NULL CHECK (hourly_rate > 0),
    availability TEXT NOT NULL CHECK (
        availability IN ('Immediate', 'Within 2 days', 'Within a week', 'After a week')
    ),
    verified INTEGER NOT NULL DEFAULT 0,
    completed_jobs INTEGER NOT NULL DEFAULT 0 CHECK (completed_jobs >= 0),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS skills (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS labour_skills (
    labour_id INTEGER NOT NULL REFERENCES labour_profiles(id) ON DELETE CASCADE,
    skill_id INTEGER NOT NULL REFERENCES skills(id) ON DELETE CASCADE,
    PRIMARY KEY (labour_id, skill_id)
);

CREATE TABLE IF NOT EXISTS jobs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    location TEXT NOT NULL,
    start_date TEXT NOT NULL,
    end_date TEXT,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS labour_jobs (
    labour_id INTEGER NOT NULL REFERENCES labour_profiles(id) ON DELETE CASCADE,
    job_id INTEGER NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
    status TEXT NOT NULL,
    rating INTEGER,
    feedback TEXT,
    PRIMARY KEY (labour_id, job_id)
);

CREATE TABLE IF NOT EXISTS contractor_profiles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name TEXT NOT NULL,
    phone TEXT NOT NULL,
    email TEXT NOT NULL,
    address TEXT NOT NULL,
    city TEXT NOT NULL,
    pincode TEXT NOT NULL,
    photo TEXT,
    id_proof TEXT,
    account_holder TEXT NOT NULL,
    account_number TEXT NOT NULL,
    ifsc_code TEXT NOT NULL,
    bank_name TEXT NOT NULL,
    receive_notifications INTEGER NOT NULL DEFAULT 1,
    share_location_data INTEGER NOT NULL DEFAULT 1,
    agree_to_terms INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_labour_skills_skill ON labour_skills(skill_id);
CREATE INDEX IF NOT EXISTS idx_labour_jobs_job ON labour_jobs(job_id);
CREATE INDEX IF NOT EXISTS idx_labour_profiles_name ON labour_profiles(full_name);
"#;

impl Database {
    /// Create any missing tables and seed the default skills.
    ///
    /// Idempotent: existing tables are left alone and seed names that are
    /// already present are ignored, so this is safe on every start.
    pub fn ensure_schema(&self) -> Result<()> {
        self.write("ensure_schema", |tx| provision(tx))?;
        debug!(path = %self.path().display(), "schema ready");
        Ok(())
    }
}

pub(crate) fn provision(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    let mut stmt = conn.prepare("INSERT OR IGNORE INTO skills (name) VALUES (?1)")?;
    let mut seeded = 0;
    for skill in DEFAULT_SKILLS {
        seeded += stmt.execute(params![skill])?;
    }
    debug!(seeded, "default skills seeded");
    Ok(())
}
