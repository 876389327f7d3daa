use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use crate::db::Database;
use crate::error::Result;
use crate::models::Skill;

const SUGGESTION_THRESHOLD: f64 = 0.8;

impl Database {
    /// Every skill in the registry, ordered by name.
    pub fn list_skills(&self) -> Result<Vec<Skill>> {
        let conn = self.connect()?;
        all_skills(&conn)
    }
}

pub(crate) fn all_skills(conn: &Connection) -> Result<Vec<Skill>> {
    let mut stmt = conn.prepare("SELECT id, name FROM skills ORDER BY name")?;
    let rows = stmt.query_map([], |row| {
        Ok(Skill {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Exact-name lookup in the registry.
pub(crate) fn resolve_skill_id(conn: &Connection, name: &str) -> Result<Option<i64>> {
    let id = conn
        .prepare_cached("SELECT id FROM skills WHERE name = ?1")?
        .query_row([name], |row| row.get(0))
        .optional()?;
    Ok(id)
}

/// Link `labour_id` to every resolvable name in `names`.
///
/// Names missing from the registry are skipped, not rejected. Returns the
/// number of associations written.
pub(crate) fn attach_skills<S: AsRef<str>>(
    conn: &Connection,
    labour_id: i64,
    names: &[S],
) -> Result<usize> {
    let mut attached = 0;
    for name in names {
        let name = name.as_ref();
        match resolve_skill_id(conn, name)? {
            Some(skill_id) => {
                attached += conn
                    .prepare_cached(
                        "INSERT OR IGNORE INTO labour_skills (labour_id, skill_id) VALUES (?1, ?2)",
                    )?
                    .execute(params![labour_id, skill_id])?;
            }
            None => {
                let suggestion = closest_skill(conn, name)?;
                warn!(
                    labour_id,
                    skill = name,
                    suggestion = suggestion.as_deref().unwrap_or(""),
                    "unknown skill skipped"
                );
            }
        }
    }
    Ok(attached)
}

pub(crate) fn detach_all_skills(conn: &Connection, labour_id: i64) -> Result<usize> {
    Ok(conn.execute("DELETE FROM labour_skills WHERE labour_id = ?1", [labour_id])?)
}

/// Skill names held by one profile, ordered by name.
pub(crate) fn skills_for_labour(conn: &Connection, labour_id: i64) -> Result<Vec<String>> {
    let mut stmt = conn.prepare_cached(
        "SELECT s.name
         FROM skills s
         JOIN labour_skills ls ON s.id = ls.skill_id
         WHERE ls.labour_id = ?1
         ORDER BY s.name",
    )?;
    let rows = stmt.query_map([labour_id], |row| row.get(0))?;
    Ok(rows.collect::<rusqlite::Result<Vec<String>>>()?)
}

fn closest_skill(conn: &Connection, name: &str) -> Result<Option<String>> {
    let wanted = name.to_lowercase();
    let best = all_skills(conn)?
        .into_iter()
        .map(|skill| {
            let score = strsim::jaro_winkler(&wanted, &skill.name.to_lowercase());
            (skill.name, score)
        })
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    Ok(best.map(|(name, _)| name))
}
