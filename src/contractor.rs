use rusqlite::types::Value;
use rusqlite::{params, Row};
use tracing::{debug, info};

use crate::db::{now_timestamp, update_columns, Database};
use crate::error::Result;
use crate::labour::nullable_text;
use crate::models::{ContractorProfile, ContractorProfileUpdate, NewContractorProfile};

/// Writable columns of `contractor_profiles`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ContractorField {
    FullName,
    Phone,
    Email,
    Address,
    City,
    Pincode,
    Photo,
    IdProof,
    AccountHolder,
    AccountNumber,
    IfscCode,
    BankName,
    ReceiveNotifications,
    ShareLocationData,
    AgreeToTerms,
    UpdatedAt,
}

impl ContractorField {
    #[cfg(test)]
    pub(crate) const ALL: [ContractorField; 16] = [
        ContractorField::FullName,
        ContractorField::Phone,
        ContractorField::Email,
        ContractorField::Address,
        ContractorField::City,
        ContractorField::Pincode,
        ContractorField::Photo,
        ContractorField::IdProof,
        ContractorField::AccountHolder,
        ContractorField::AccountNumber,
        ContractorField::IfscCode,
        ContractorField::BankName,
        ContractorField::ReceiveNotifications,
        ContractorField::ShareLocationData,
        ContractorField::AgreeToTerms,
        ContractorField::UpdatedAt,
    ];

    pub(crate) fn column(self) -> &'static str {
        match self {
            ContractorField::FullName => "full_name",
            ContractorField::Phone => "phone",
            ContractorField::Email => "email",
            ContractorField::Address => "address",
            ContractorField::City => "city",
            ContractorField::Pincode => "pincode",
            ContractorField::Photo => "photo",
            ContractorField::IdProof => "id_proof",
            ContractorField::AccountHolder => "account_holder",
            ContractorField::AccountNumber => "account_number",
            ContractorField::IfscCode => "ifsc_code",
            ContractorField::BankName => "bank_name",
            ContractorField::ReceiveNotifications => "receive_notifications",
            ContractorField::ShareLocationData => "share_location_data",
            ContractorField::AgreeToTerms => "agree_to_terms",
            ContractorField::UpdatedAt => "updated_at",
        }
    }
}

impl ContractorProfileUpdate {
    fn assignments(&self) -> Vec<(ContractorField, Value)> {
        let texts = [
            (ContractorField::FullName, &self.full_name),
            (ContractorField::Phone, &self.phone),
            (ContractorField::Email, &self.email),
            (ContractorField::Address, &self.address),
            (ContractorField::City, &self.city),
            (ContractorField::Pincode, &self.pincode),
            (ContractorField::AccountHolder, &self.account_holder),
            (ContractorField::AccountNumber, &self.account_number),
            (ContractorField::IfscCode, &self.ifsc_code),
            (ContractorField::BankName, &self.bank_name),
        ];
        let nullables = [
            (ContractorField::Photo, &self.photo),
            (ContractorField::IdProof, &self.id_proof),
        ];
        let flags = [
            (ContractorField::ReceiveNotifications, self.receive_notifications),
            (ContractorField::ShareLocationData, self.share_location_data),
            (ContractorField::AgreeToTerms, self.agree_to_terms),
        ];

        let mut out = Vec::new();
        for (field, value) in texts {
            if let Some(text) = value {
                out.push((field, Value::Text(text.clone())));
            }
        }
        for (field, value) in nullables {
            if let Some(text) = value {
                out.push((field, nullable_text(text)));
            }
        }
        for (field, value) in flags {
            if let Some(flag) = value {
                out.push((field, Value::Integer(i64::from(flag))));
            }
        }
        out
    }
}

impl Database {
    pub fn add_contractor_profile(&self, profile: &NewContractorProfile) -> Result<i64> {
        let id = self.write("add_contractor_profile", |tx| {
            let now = now_timestamp();
            tx.execute(
                "INSERT INTO contractor_profiles (
                    full_name, phone, email, address, city, pincode, photo, id_proof,
                    account_holder, account_number, ifsc_code, bank_name,
                    receive_notifications, share_location_data, agree_to_terms,
                    created_at, updated_at
                 ) VALUES (
                    ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9,
                    ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17
                 )",
                params![
                    profile.full_name,
                    profile.phone,
                    profile.email,
                    profile.address,
                    profile.city,
                    profile.pincode,
                    profile.photo,
                    profile.id_proof,
                    profile.account_holder,
                    profile.account_number,
                    profile.ifsc_code,
                    profile.bank_name,
                    profile.receive_notifications,
                    profile.share_location_data,
                    profile.agree_to_terms,
                    now,
                    now,
                ],
            )?;
            Ok(tx.last_insert_rowid())
        })?;
        info!(id, "added contractor profile");
        Ok(id)
    }

    /// Apply a partial update. Returns `false` when no contractor has `id`.
    pub fn update_contractor_profile(
        &self,
        id: i64,
        updates: &ContractorProfileUpdate,
    ) -> Result<bool> {
        let updated = self.write("update_contractor_profile", |tx| {
            let mut assignments = updates.assignments();
            assignments.push((ContractorField::UpdatedAt, Value::Text(now_timestamp())));
            let assignments: Vec<(&'static str, Value)> = assignments
                .into_iter()
                .map(|(field, value)| (field.column(), value))
                .collect();
            Ok(update_columns(tx, "contractor_profiles", &assignments, id)? > 0)
        })?;
        if updated {
            info!(id, "updated contractor profile");
        } else {
            debug!(id, "no contractor profile to update");
        }
        Ok(updated)
    }

    pub fn get_all_contractor_profiles(&self) -> Result<Vec<ContractorProfile>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, full_name, phone, email, address, city, pincode, photo, id_proof,
                    account_holder, account_number, ifsc_code, bank_name,
                    receive_notifications, share_location_data, agree_to_terms,
                    created_at, updated_at
             FROM contractor_profiles
             ORDER BY full_name ASC",
        )?;
        let rows = stmt.query_map([], row_to_contractor)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

fn row_to_contractor(row: &Row) -> rusqlite::Result<ContractorProfile> {
    let flag = |idx: usize| -> rusqlite::Result<bool> { Ok(row.get::<_, i64>(idx)? != 0) };
    Ok(ContractorProfile {
        id: row.get(0)?,
        full_name: row.get(1)?,
        phone: row.get(2)?,
        email: row.get(3)?,
        address: row.get(4)?,
        city: row.get(5)?,
        pincode: row.get(6)?,
        photo: row.get(7)?,
        id_proof: row.get(8)?,
        account_holder: row.get(9)?,
        account_number: row.get(10)?,
        ifsc_code: row.get(11)?,
        bank_name: row.get(12)?,
        receive_notifications: flag(13)?,
        share_location_data: flag(14)?,
        agree_to_terms: flag(15)?,
        created_at: row.get(16)?,
        updated_at: row.get(17)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn seeded() -> (TempDir, Database) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("store.db")).unwrap();
        db.ensure_schema().unwrap();
        (dir, db)
    }

    fn contractor(name: &str) -> NewContractorProfile {
        NewContractorProfile {
            full_name: name.to_string(),
            phone: "9876543210".to_string(),
            email: "site@example.com".to_string(),
            address: "Plot 7, Industrial Area".to_string(),
            city: "Cuttack".to_string(),
            pincode: "753001".to_string(),
            photo: None,
            id_proof: None,
            account_holder: name.to_string(),
            account_number: "001122334455".to_string(),
            ifsc_code: "SBIN0001234".to_string(),
            bank_name: "State Bank of India".to_string(),
            receive_notifications: true,
            share_location_data: false,
            agree_to_terms: true,
        }
    }

    #[test]
    fn add_and_list_ordered_by_name() {
        let (_dir, db) = seeded();
        db.add_contractor_profile(&contractor("Zoya Builders")).unwrap();
        let id = db.add_contractor_profile(&contractor("Arjun Infra")).unwrap();

        let all = db.get_all_contractor_profiles().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, id);
        assert_eq!(all[0].full_name, "Arjun Infra");
        assert!(all[0].receive_notifications);
        assert!(!all[0].share_location_data);
        assert!(all[0].agree_to_terms);
    }

    #[test]
    fn update_touches_only_given_columns() {
        let (_dir, db) = seeded();
        let id = db.add_contractor_profile(&contractor("Arjun Infra")).unwrap();

        let updates = ContractorProfileUpdate {
            city: Some("Puri".to_string()),
            share_location_data: Some(true),
            photo: Some(Some("file:///photos/arjun.png".to_string())),
            ..Default::default()
        };
        assert!(db.update_contractor_profile(id, &updates).unwrap());

        let stored = &db.get_all_contractor_profiles().unwrap()[0];
        assert_eq!(stored.city, "Puri");
        assert!(stored.share_location_data);
        assert_eq!(stored.photo.as_deref(), Some("file:///photos/arjun.png"));
        assert_eq!(stored.bank_name, "State Bank of India");
    }

    #[test]
    fn update_of_unknown_id_returns_false() {
        let (_dir, db) = seeded();
        let updates = ContractorProfileUpdate {
            city: Some("Puri".to_string()),
            ..Default::default()
        };
        assert!(!db.update_contractor_profile(42, &updates).unwrap());
    }

    #[test]
    fn field_table_matches_schema() {
        let (_dir, db) = seeded();
        let conn = db.connect().unwrap();
        let mut stmt = conn
            .prepare("SELECT name FROM pragma_table_info('contractor_profiles')")
            .unwrap();
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        for field in ContractorField::ALL {
            assert!(columns.iter().any(|c| c == field.column()), "{:?}", field);
        }
    }

    #[test]
    fn update_can_clear_nullable_columns() {
        let (_dir, db) = seeded();
        let mut profile = contractor("Arjun Infra");
        profile.photo = Some("file:///photos/arjun.png".to_string());
        profile.id_proof = Some("file:///proofs/arjun.pdf".to_string());
        let id = db.add_contractor_profile(&profile).unwrap();

        let updates = ContractorProfileUpdate {
            photo: Some(None),
            id_proof: Some(None),
            bank_name: Some("Canara Bank".to_string()),
            ..Default::default()
        };
        assert!(db.update_contractor_profile(id, &updates).unwrap());

        let stored = &db.get_all_contractor_profiles().unwrap()[0];
        assert_eq!(stored.photo, None);
        assert_eq!(stored.id_proof, None);
        assert_eq!(stored.bank_name, "Canara Bank");
    }
}
