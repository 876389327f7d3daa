use rusqlite::Connection;
use tempfile::{tempdir, TempDir};

use sramika::schema::DEFAULT_SKILLS;
use sramika::{rating, Availability, Database, LabourProfileUpdate, NewLabourProfile};

fn store() -> (TempDir, Database) {
    let dir = tempdir().unwrap();
    let db = Database::open(dir.path().join("labour.db")).unwrap();
    db.ensure_schema().unwrap();
    (dir, db)
}

fn raw(db: &Database) -> Connection {
    Connection::open(db.path()).unwrap()
}

fn count(db: &Database, sql: &str) -> i64 {
    raw(db).query_row(sql, [], |row| row.get(0)).unwrap()
}

fn labourer(name: &str, skills: &[&str]) -> NewLabourProfile {
    NewLabourProfile {
        full_name: name.to_string(),
        age: 28,
        phone: "9437000000".to_string(),
        location: "Sambalpur".to_string(),
        languages: vec!["Odia".to_string(), "Hindi".to_string()],
        photo: None,
        id_proof: None,
        experience: 4,
        hourly_rate: 300,
        availability: Availability::WithinTwoDays,
        verified: false,
        completed_jobs: 0,
        skills: skills.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn schema_setup_twice_keeps_one_row_per_default_skill() {
    let (_dir, db) = store();
    db.ensure_schema().unwrap();

    for skill in DEFAULT_SKILLS {
        let n: i64 = raw(&db)
            .query_row("SELECT COUNT(*) FROM skills WHERE name = ?1", [skill], |row| row.get(0))
            .unwrap();
        assert_eq!(n, 1);
    }
    assert_eq!(count(&db, "SELECT COUNT(*) FROM skills"), 8);
}

#[test]
fn failure_after_profile_insert_leaves_no_rows() {
    let (_dir, db) = store();
    raw(&db)
        .execute_batch(
            "CREATE TRIGGER fail_skill_link BEFORE INSERT ON labour_skills
             BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
        )
        .unwrap();

    let err = db
        .add_labour_profile(&labourer("Bikash", &["Plumbing"]))
        .unwrap_err();
    assert!(err.to_string().contains("injected failure"));

    assert_eq!(count(&db, "SELECT COUNT(*) FROM labour_profiles"), 0);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM labour_skills"), 0);
}

#[test]
fn delete_cascades_and_drops_from_skill_search() {
    let (_dir, db) = store();
    let id = db
        .add_labour_profile(&labourer("Bikash", &["Plumbing", "Electrical"]))
        .unwrap();
    assert_eq!(db.get_labour_profiles_by_skills(&["Plumbing"]).unwrap().len(), 1);

    assert!(db.delete_labour_profile(id).unwrap());
    assert_eq!(count(&db, "SELECT COUNT(*) FROM labour_skills"), 0);
    assert!(db
        .get_labour_profiles_by_skills(&["Plumbing", "Electrical"])
        .unwrap()
        .is_empty());
    assert!(!db.delete_labour_profile(id).unwrap());
}

#[test]
fn skill_update_leaves_no_residue() {
    let (_dir, db) = store();
    let id = db
        .add_labour_profile(&labourer("Bikash", &["Plumbing", "Painting"]))
        .unwrap();

    let updates = LabourProfileUpdate {
        skills: Some(vec!["Welding".to_string()]),
        ..Default::default()
    };
    assert!(db.update_labour_profile(id, &updates).unwrap());

    assert_eq!(count(&db, "SELECT COUNT(*) FROM labour_skills"), 1);
    let profile = db.get_labour_profile(id).unwrap().unwrap();
    assert_eq!(profile.skills, vec!["Welding"]);
    assert!(db.get_labour_profiles_by_skills(&["Plumbing"]).unwrap().is_empty());
}

#[test]
fn skill_search_matches_any_requested_skill() {
    let (_dir, db) = store();
    let mut p1 = labourer("P1", &["Plumbing"]);
    p1.completed_jobs = 12;
    let mut p2 = labourer("P2", &["Electrical"]);
    p2.completed_jobs = 2;
    p2.verified = true;
    let mut p3 = labourer("P3", &["Plumbing", "Electrical"]);
    p3.completed_jobs = 30;

    let id1 = db.add_labour_profile(&p1).unwrap();
    let id2 = db.add_labour_profile(&p2).unwrap();
    let id3 = db.add_labour_profile(&p3).unwrap();

    let found = db
        .get_labour_profiles_by_skills(&["Plumbing", "Electrical"])
        .unwrap();
    let ids: Vec<i64> = found.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![id2, id3, id1]);
    assert!(found[0].verified);
    assert_eq!(found[1].skills, vec!["Electrical", "Plumbing"]);
}

#[test]
fn rating_for_seven_years_and_forty_three_jobs() {
    assert_eq!(rating(7, 43).to_string(), "4.7");
}

#[test]
fn unknown_skill_still_creates_profile() {
    let (_dir, db) = store();
    let id = db
        .add_labour_profile(&labourer("Bikash", &["Nonexistent"]))
        .unwrap();
    assert!(id > 0);

    let all = db.get_all_labour_profiles().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, id);
    assert!(all[0].skills.is_empty());
    assert_eq!(all[0].languages, vec!["Odia", "Hindi"]);
}

#[test]
fn profiles_survive_reopening_the_store() {
    let (dir, db) = store();
    let id = db.add_labour_profile(&labourer("Bikash", &["Tiling"])).unwrap();
    drop(db);

    let reopened = Database::open(dir.path().join("labour.db")).unwrap();
    reopened.ensure_schema().unwrap();
    let profile = reopened.get_labour_profile(id).unwrap().unwrap();
    assert_eq!(profile.skills, vec!["Tiling"]);
}
