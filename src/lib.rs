//! Local data layer for the Sramika labour marketplace.
//!
//! Labour and contractor profiles live in a single SQLite file. Every write
//! runs in its own transaction on its own connection; reads join skills in
//! and coerce stored integers back into booleans before returning.

pub mod config;
pub mod contractor;
pub mod db;
pub mod error;
pub mod labour;
pub mod models;
pub mod rating;
pub mod schema;
pub mod search;
pub mod skills;

pub use config::Config;
pub use db::Database;
pub use error::{Result, StoreError};
pub use models::{
    Availability, ContractorProfile, ContractorProfileUpdate, LabourProfile, LabourProfileUpdate,
    NewContractorProfile, NewLabourProfile, Skill,
};
pub use rating::{rating, Rating};
pub use search::{RatedWorker, SortKey, WorkerQuery};
