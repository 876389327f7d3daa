use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Params, Row};
use tracing::{debug, info};

use crate::db::{now_timestamp, update_columns, Database};
use crate::error::Result;
use crate::models::{
    join_languages, split_languages, LabourProfile, LabourProfileUpdate, NewLabourProfile,
};
use crate::skills::{attach_skills, detach_all_skills, skills_for_labour};

const LABOUR_COLUMNS: &str = "lp.id, lp.full_name, lp.age, lp.phone, lp.location, lp.languages,
    lp.photo, lp.id_proof, lp.experience, lp.hourly_rate, lp.availability, lp.verified,
    lp.completed_jobs, lp.created_at, lp.updated_at";

/// Writable columns of `labour_profiles`, one per updatable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LabourField {
    FullName,
    Age,
    Phone,
    Location,
    Languages,
    Photo,
    IdProof,
    Experience,
    HourlyRate,
    Availability,
    Verified,
    CompletedJobs,
    UpdatedAt,
}

impl LabourField {
    #[cfg(test)]
    pub(crate) const ALL: [LabourField; 13] = [
        LabourField::FullName,
        LabourField::Age,
        LabourField::Phone,
        LabourField::Location,
        LabourField::Languages,
        LabourField::Photo,
        LabourField::IdProof,
        LabourField::Experience,
        LabourField::HourlyRate,
        LabourField::Availability,
        LabourField::Verified,
        LabourField::CompletedJobs,
        LabourField::UpdatedAt,
    ];

    pub(crate) fn column(self) -> &'static str {
        match self {
            LabourField::FullName => "full_name",
            LabourField::Age => "age",
            LabourField::Phone => "phone",
            LabourField::Location => "location",
            LabourField::Languages => "languages",
            LabourField::Photo => "photo",
            LabourField::IdProof => "id_proof",
            LabourField::Experience => "experience",
            LabourField::HourlyRate => "hourly_rate",
            LabourField::Availability => "availability",
            LabourField::Verified => "verified",
            LabourField::CompletedJobs => "completed_jobs",
            LabourField::UpdatedAt => "updated_at",
        }
    }
}

impl LabourProfileUpdate {
    fn assignments(&self) -> Vec<(LabourField, Value)> {
        let mut out = Vec::new();
        if let Some(v) = &self.full_name {
            out.push((LabourField::FullName, Value::Text(v.clone())));
        }
        if let Some(v) = self.age {
            out.push((LabourField::Age, Value::Integer(i64::from(v))));
        }
        if let Some(v) = &self.phone {
            out.push((LabourField::Phone, Value::Text(v.clone())));
        }
        if let Some(v) = &self.location {
            out.push((LabourField::Location, Value::Text(v.clone())));
        }
        if let Some(v) = &self.languages {
            out.push((LabourField::Languages, Value::Text(join_languages(v))));
        }
        if let Some(v) = &self.photo {
            out.push((LabourField::Photo, nullable_text(v)));
        }
        if let Some(v) = &self.id_proof {
            out.push((LabourField::IdProof, nullable_text(v)));
        }
        if let Some(v) = self.experience {
            out.push((LabourField::Experience, Value::Integer(i64::from(v))));
        }
        if let Some(v) = self.hourly_rate {
            out.push((LabourField::HourlyRate, Value::Integer(i64::from(v))));
        }
        if let Some(v) = self.availability {
            out.push((LabourField::Availability, Value::Text(v.as_str().to_string())));
        }
        if let Some(v) = self.verified {
            out.push((LabourField::Verified, Value::Integer(i64::from(v))));
        }
        if let Some(v) = self.completed_jobs {
            out.push((LabourField::CompletedJobs, Value::Integer(i64::from(v))));
        }
        out
    }
}

pub(crate) fn nullable_text(value: &Option<String>) -> Value {
    match value {
        Some(text) => Value::Text(text.clone()),
        None => Value::Null,
    }
}

impl Database {
    /// Insert a profile and its skill links in one transaction.
    ///
    /// Skill names missing from the registry are skipped. Any failure rolls
    /// the whole insert back and is returned as-is.
    pub fn add_labour_profile(&self, profile: &NewLabourProfile) -> Result<i64> {
        let id = self.write("add_labour_profile", |tx| {
            let now = now_timestamp();
            tx.execute(
                "INSERT INTO labour_profiles (
                    full_name, age, phone, location, languages,
                    photo, id_proof, experience, hourly_rate,
                    availability, verified, completed_jobs, created_at, updated_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    profile.full_name,
                    profile.age,
                    profile.phone,
                    profile.location,
                    join_languages(&profile.languages),
                    profile.photo,
                    profile.id_proof,
                    profile.experience,
                    profile.hourly_rate,
                    profile.availability,
                    profile.verified,
                    profile.completed_jobs,
                    now,
                    now,
                ],
            )?;
            let id = tx.last_insert_rowid();
            let attached = attach_skills(tx, id, &profile.skills)?;
            debug!(id, attached, requested = profile.skills.len(), "linked skills");
            Ok(id)
        })?;
        info!(id, "added labour profile");
        Ok(id)
    }

    /// Apply a partial update. Returns `false` when no profile has `id`.
    ///
    /// A present `skills` list replaces the stored set inside the same
    /// transaction, so readers never see the profile without skills.
    pub fn update_labour_profile(&self, id: i64, updates: &LabourProfileUpdate) -> Result<bool> {
        let updated = self.write("update_labour_profile", |tx| {
            let mut assignments = updates.assignments();
            assignments.push((LabourField::UpdatedAt, Value::Text(now_timestamp())));
            let assignments: Vec<(&'static str, Value)> = assignments
                .into_iter()
                .map(|(field, value)| (field.column(), value))
                .collect();

            if update_columns(tx, "labour_profiles", &assignments, id)? == 0 {
                return Ok(false);
            }

            if let Some(skills) = &updates.skills {
                let removed = detach_all_skills(tx, id)?;
                let attached = attach_skills(tx, id, skills)?;
                debug!(id, removed, attached, "replaced skills");
            }
            Ok(true)
        })?;
        if updated {
            info!(id, "updated labour profile");
        } else {
            debug!(id, "no labour profile to update");
        }
        Ok(updated)
    }

    /// Remove a profile; its skill links go with it.
    pub fn delete_labour_profile(&self, id: i64) -> Result<bool> {
        let conn = self.connect()?;
        let removed = conn.execute("DELETE FROM labour_profiles WHERE id = ?1", [id])? > 0;
        if removed {
            info!(id, "deleted labour profile");
        }
        Ok(removed)
    }

    pub fn get_labour_profile(&self, id: i64) -> Result<Option<LabourProfile>> {
        let conn = self.connect()?;
        let profile = conn
            .query_row(
                &format!("SELECT {LABOUR_COLUMNS} FROM labour_profiles lp WHERE lp.id = ?1"),
                [id],
                row_to_labour,
            )
            .optional()?;
        match profile {
            Some(mut profile) => {
                profile.skills = skills_for_labour(&conn, profile.id)?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    /// Every profile, ordered by name, each with its skills.
    pub fn get_all_labour_profiles(&self) -> Result<Vec<LabourProfile>> {
        let conn = self.connect()?;
        let sql =
            format!("SELECT {LABOUR_COLUMNS} FROM labour_profiles lp ORDER BY lp.full_name ASC");
        load_profiles(&conn, &sql, [])
    }

    /// Profiles holding any of `skill_names`, verified first, then by
    /// completed jobs.
    ///
    /// Matching is OR across names. Every result carries its full skill set.
    /// An empty list matches nothing; callers wanting everyone should use
    /// [`Database::get_all_labour_profiles`].
    pub fn get_labour_profiles_by_skills<S: AsRef<str>>(
        &self,
        skill_names: &[S],
    ) -> Result<Vec<LabourProfile>> {
        if skill_names.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.connect()?;
        let placeholders = (1..=skill_names.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {LABOUR_COLUMNS}
             FROM labour_profiles lp
             WHERE lp.id IN (
                SELECT ls.labour_id
                FROM labour_skills ls
                JOIN skills s ON ls.skill_id = s.id
                WHERE s.name IN ({placeholders})
             )
             ORDER BY lp.verified DESC, lp.completed_jobs DESC, lp.id ASC"
        );
        let names: Vec<&str> = skill_names.iter().map(AsRef::as_ref).collect();
        let profiles = load_profiles(&conn, &sql, params_from_iter(names.iter()))?;
        debug!(skills = ?names, matched = profiles.len(), "skill search");
        Ok(profiles)
    }
}

fn load_profiles<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<LabourProfile>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, row_to_labour)?;
    let mut profiles = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    for profile in &mut profiles {
        profile.skills = skills_for_labour(conn, profile.id)?;
    }
    Ok(profiles)
}

fn row_to_labour(row: &Row) -> rusqlite::Result<LabourProfile> {
    let languages: String = row.get(5)?;
    let verified: i64 = row.get(11)?;
    Ok(LabourProfile {
        id: row.get(0)?,
        full_name: row.get(1)?,
        age: row.get(2)?,
        phone: row.get(3)?,
        location: row.get(4)?,
        languages: split_languages(&languages),
        photo: row.get(6)?,
        id_proof: row.get(7)?,
        experience: row.get(8)?,
        hourly_rate: row.get(9)?,
        availability: row.get(10)?,
        verified: verified != 0,
        completed_jobs: row.get(12)?,
        skills: Vec::new(),
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}
