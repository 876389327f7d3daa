use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sramika::{
    Availability, Config, ContractorProfileUpdate, Database, LabourProfile, LabourProfileUpdate,
    NewContractorProfile, NewLabourProfile, SortKey, WorkerQuery,
};

#[derive(Parser)]
#[command(name = "sramika")]
#[command(about = "Labour marketplace store - register workers and contractors, search by skill")]
struct Cli {
    /// Database file (defaults to $SRAMIKA_DB, then the platform data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// More log output (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create tables and seed default skills
    Init,

    /// List known skills
    Skills,

    /// Manage labour profiles
    Labour {
        #[command(subcommand)]
        command: LabourCommands,
    },

    /// Manage contractor profiles
    Contractor {
        #[command(subcommand)]
        command: ContractorCommands,
    },
}

#[derive(Subcommand)]
enum LabourCommands {
    /// Register a labourer
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        age: u32,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        location: String,

        /// Comma separated (e.g. "Hindi, English")
        #[arg(long, value_delimiter = ',')]
        languages: Vec<String>,

        /// Years of experience
        #[arg(long)]
        experience: u32,

        /// Hourly rate in rupees
        #[arg(long)]
        rate: u32,

        /// Immediate, "Within 2 days", "Within a week" or "After a week"
        #[arg(long, default_value = "Immediate")]
        availability: Availability,

        /// Skill name; repeat for several
        #[arg(short, long)]
        skill: Vec<String>,

        #[arg(long)]
        photo: Option<String>,

        #[arg(long)]
        id_proof: Option<String>,

        #[arg(long)]
        verified: bool,

        #[arg(long, default_value = "0")]
        completed_jobs: u32,
    },

    /// List all labourers
    List,

    /// Show one labourer
    Show {
        id: i64,
    },

    /// Find labourers with any of the given skills
    Search {
        /// Skill name; repeat for several. None means everyone.
        #[arg(short, long)]
        skill: Vec<String>,

        /// Sort keys (default: highest-rated)
        #[arg(long, value_enum)]
        sort: Vec<SortKey>,

        /// Only labourers available immediately
        #[arg(long)]
        immediate: bool,
    },

    /// Update fields of a labourer
    Update {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        age: Option<u32>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long, value_delimiter = ',')]
        languages: Option<Vec<String>>,

        #[arg(long)]
        experience: Option<u32>,

        #[arg(long)]
        rate: Option<u32>,

        #[arg(long)]
        availability: Option<Availability>,

        #[arg(long)]
        verified: Option<bool>,

        #[arg(long)]
        completed_jobs: Option<u32>,

        #[arg(long)]
        photo: Option<String>,

        /// Remove the stored photo
        #[arg(long, conflicts_with = "photo")]
        clear_photo: bool,

        #[arg(long)]
        id_proof: Option<String>,

        /// Remove the stored ID proof
        #[arg(long, conflicts_with = "id_proof")]
        clear_id_proof: bool,

        /// Replace skills with these; repeat for several
        #[arg(short, long)]
        skill: Vec<String>,

        /// Remove all skills
        #[arg(long, conflicts_with = "skill")]
        clear_skills: bool,
    },

    /// Delete a labourer
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
enum ContractorCommands {
    /// Register a contractor
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        address: String,

        #[arg(long)]
        city: String,

        #[arg(long)]
        pincode: String,

        #[arg(long)]
        account_holder: String,

        #[arg(long)]
        account_number: String,

        #[arg(long)]
        ifsc: String,

        #[arg(long)]
        bank: String,

        #[arg(long)]
        photo: Option<String>,

        #[arg(long)]
        id_proof: Option<String>,

        #[arg(long)]
        no_notifications: bool,

        #[arg(long)]
        no_location_sharing: bool,

        #[arg(long)]
        agree_to_terms: bool,
    },

    /// List all contractors
    List,

    /// Update fields of a contractor
    Update {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        city: Option<String>,

        #[arg(long)]
        pincode: Option<String>,

        #[arg(long)]
        notifications: Option<bool>,

        #[arg(long)]
        location_sharing: Option<bool>,

        #[arg(long)]
        agree_to_terms: Option<bool>,

        #[arg(long)]
        account_holder: Option<String>,

        #[arg(long)]
        account_number: Option<String>,

        #[arg(long)]
        ifsc: Option<String>,

        #[arg(long)]
        bank: Option<String>,

        #[arg(long)]
        photo: Option<String>,

        /// Remove the stored photo
        #[arg(long, conflicts_with = "photo")]
        clear_photo: bool,

        #[arg(long)]
        id_proof: Option<String>,

        /// Remove the stored ID proof
        #[arg(long, conflicts_with = "id_proof")]
        clear_id_proof: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::resolve(cli.db.clone());
    let db = Database::open(&config.db_path)
        .with_context(|| format!("Failed to open store at {}", config.db_path.display()))?;
    db.ensure_schema().context("Failed to prepare schema")?;

    match cli.command {
        Commands::Init => {
            println!("Database ready at {}", db.path().display());
        }

        Commands::Skills => {
            let skills = db.list_skills()?;
            if cli.json {
                print_json(&skills)?;
            } else {
                for skill in skills {
                    println!("{:<4} {}", skill.id, skill.name);
                }
            }
        }

        Commands::Labour { command } => run_labour(&db, command, cli.json)?,

        Commands::Contractor { command } => run_contractor(&db, command, cli.json)?,
    }

    Ok(())
}

fn run_labour(db: &Database, command: LabourCommands, json: bool) -> Result<()> {
    match command {
        LabourCommands::Add {
            name,
            age,
            phone,
            location,
            languages,
            experience,
            rate,
            availability,
            skill,
            photo,
            id_proof,
            verified,
            completed_jobs,
        } => {
            let profile = NewLabourProfile {
                full_name: name,
                age,
                phone,
                location,
                languages,
                photo,
                id_proof,
                experience,
                hourly_rate: rate,
                availability,
                verified,
                completed_jobs,
                skills: skill,
            };
            let id = db.add_labour_profile(&profile).context("Failed to add labourer")?;
            println!("Added labourer #{}", id);
        }

        LabourCommands::List => {
            let profiles = db.get_all_labour_profiles()?;
            if json {
                print_json(&profiles)?;
            } else {
                print_labour_table(&profiles);
            }
        }

        LabourCommands::Show { id } => match db.get_labour_profile(id)? {
            Some(profile) if json => print_json(&profile)?,
            Some(profile) => {
                let badge = if profile.verified { " (verified)" } else { "" };
                println!("Labourer #{}{}", profile.id, badge);
                println!("Name: {}", profile.full_name);
                println!("Age: {}", profile.age);
                println!("Phone: {}", profile.phone);
                println!("Location: {}", profile.location);
                println!("Languages: {}", profile.languages.join(", "));
                println!("Skills: {}", profile.skills.join(", "));
                println!("Experience: {} years", profile.experience);
                println!("Rate: ₹{}/hr", profile.hourly_rate);
                println!("Availability: {}", profile.availability);
                println!("Completed jobs: {}", profile.completed_jobs);
                println!("Rating: {}", profile.rating());
                if let Some(photo) = &profile.photo {
                    println!("Photo: {}", photo);
                }
                if let Some(proof) = &profile.id_proof {
                    println!("ID proof: {}", proof);
                }
                println!("Created: {}", profile.created_at);
                println!("Updated: {}", profile.updated_at);
            }
            None => println!("Labourer #{} not found.", id),
        },

        LabourCommands::Search {
            skill,
            sort,
            immediate,
        } => {
            let mut query = WorkerQuery {
                skills: skill,
                immediate_only: immediate,
                ..Default::default()
            };
            if !sort.is_empty() {
                query.sort = sort;
            }
            let workers = db.find_workers(&query)?;
            if json {
                print_json(&workers)?;
            } else if workers.is_empty() {
                println!("No labourers found.");
            } else {
                println!(
                    "{:<6} {:<22} {:<4} {:<6} {:>5} {:>7} {:<14} {:<24}",
                    "ID", "NAME", "VER", "RATING", "EXP", "RATE", "AVAILABILITY", "SKILLS"
                );
                println!("{}", "-".repeat(94));
                for worker in workers {
                    let p = &worker.profile;
                    println!(
                        "{:<6} {:<22} {:<4} {:<6} {:>5} {:>7} {:<14} {:<24}",
                        p.id,
                        truncate(&p.full_name, 20),
                        if p.verified { "yes" } else { "" },
                        worker.rating,
                        p.experience,
                        p.hourly_rate,
                        p.availability,
                        truncate(&p.skills.join(", "), 24)
                    );
                }
            }
        }

        LabourCommands::Update {
            id,
            name,
            age,
            phone,
            location,
            languages,
            experience,
            rate,
            availability,
            verified,
            completed_jobs,
            photo,
            clear_photo,
            id_proof,
            clear_id_proof,
            skill,
            clear_skills,
        } => {
            let skills = if clear_skills {
                Some(Vec::new())
            } else if skill.is_empty() {
                None
            } else {
                Some(skill)
            };
            let updates = LabourProfileUpdate {
                full_name: name,
                age,
                phone,
                location,
                languages,
                photo: nullable_arg(photo, clear_photo),
                id_proof: nullable_arg(id_proof, clear_id_proof),
                experience,
                hourly_rate: rate,
                availability,
                verified,
                completed_jobs,
                skills,
            };
            if db.update_labour_profile(id, &updates).context("Failed to update labourer")? {
                println!("Updated labourer #{}", id);
            } else {
                println!("Labourer #{} not found.", id);
            }
        }

        LabourCommands::Delete { id } => {
            if db.delete_labour_profile(id)? {
                println!("Deleted labourer #{}", id);
            } else {
                println!("Labourer #{} not found.", id);
            }
        }
    }
    Ok(())
}

fn run_contractor(db: &Database, command: ContractorCommands, json: bool) -> Result<()> {
    match command {
        ContractorCommands::Add {
            name,
            phone,
            email,
            address,
            city,
            pincode,
            account_holder,
            account_number,
            ifsc,
            bank,
            photo,
            id_proof,
            no_notifications,
            no_location_sharing,
            agree_to_terms,
        } => {
            let profile = NewContractorProfile {
                full_name: name,
                phone,
                email,
                address,
                city,
                pincode,
                photo,
                id_proof,
                account_holder,
                account_number,
                ifsc_code: ifsc,
                bank_name: bank,
                receive_notifications: !no_notifications,
                share_location_data: !no_location_sharing,
                agree_to_terms,
            };
            let id = db
                .add_contractor_profile(&profile)
                .context("Failed to add contractor")?;
            println!("Added contractor #{}", id);
        }

        ContractorCommands::List => {
            let contractors = db.get_all_contractor_profiles()?;
            if json {
                print_json(&contractors)?;
            } else if contractors.is_empty() {
                println!("No contractors found.");
            } else {
                println!(
                    "{:<6} {:<24} {:<14} {:<16} {:<28}",
                    "ID", "NAME", "PHONE", "CITY", "EMAIL"
                );
                println!("{}", "-".repeat(92));
                for c in contractors {
                    println!(
                        "{:<6} {:<24} {:<14} {:<16} {:<28}",
                        c.id,
                        truncate(&c.full_name, 22),
                        c.phone,
                        truncate(&c.city, 14),
                        truncate(&c.email, 26)
                    );
                }
            }
        }

        ContractorCommands::Update {
            id,
            name,
            phone,
            email,
            address,
            city,
            pincode,
            notifications,
            location_sharing,
            agree_to_terms,
            account_holder,
            account_number,
            ifsc,
            bank,
            photo,
            clear_photo,
            id_proof,
            clear_id_proof,
        } => {
            let updates = ContractorProfileUpdate {
                full_name: name,
                phone,
                email,
                address,
                city,
                pincode,
                photo: nullable_arg(photo, clear_photo),
                id_proof: nullable_arg(id_proof, clear_id_proof),
                account_holder,
                account_number,
                ifsc_code: ifsc,
                bank_name: bank,
                receive_notifications: notifications,
                share_location_data: location_sharing,
                agree_to_terms,
            };
            if db
                .update_contractor_profile(id, &updates)
                .context("Failed to update contractor")?
            {
                println!("Updated contractor #{}", id);
            } else {
                println!("Contractor #{} not found.", id);
            }
        }
    }
    Ok(())
}

/// A `--clear-*` flag maps to `Some(None)`, a value to `Some(Some(_))`.
fn nullable_arg(value: Option<String>, clear: bool) -> Option<Option<String>> {
    if clear {
        Some(None)
    } else {
        value.map(Some)
    }
}

fn print_labour_table(profiles: &[LabourProfile]) {
    if profiles.is_empty() {
        println!("No labourers found.");
        return;
    }
    println!(
        "{:<6} {:<22} {:<18} {:>5} {:>7} {:<24}",
        "ID", "NAME", "LOCATION", "EXP", "RATE", "SKILLS"
    );
    println!("{}", "-".repeat(86));
    for p in profiles {
        println!(
            "{:<6} {:<22} {:<18} {:>5} {:>7} {:<24}",
            p.id,
            truncate(&p.full_name, 20),
            truncate(&p.location, 16),
            p.experience,
            p.hourly_rate,
            truncate(&p.skills.join(", "), 24)
        );
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn,sramika=info",
        1 => "info,sramika=debug",
        _ => "debug,sramika=trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullable_arg_distinguishes_clear_from_absent() {
        assert_eq!(nullable_arg(None, false), None);
        assert_eq!(nullable_arg(None, true), Some(None));
        assert_eq!(
            nullable_arg(Some("file:///p.png".to_string()), false),
            Some(Some("file:///p.png".to_string()))
        );
    }

    #[test]
    fn labour_update_accepts_id_proof_and_clear_photo() {
        let cli = Cli::try_parse_from([
            "sramika", "labour", "update", "3", "--id-proof", "file:///id.pdf", "--clear-photo",
        ])
        .unwrap();
        match cli.command {
            Commands::Labour {
                command:
                    LabourCommands::Update {
                        id,
                        id_proof,
                        clear_photo,
                        clear_id_proof,
                        ..
                    },
            } => {
                assert_eq!(id, 3);
                assert_eq!(id_proof.as_deref(), Some("file:///id.pdf"));
                assert!(clear_photo);
                assert!(!clear_id_proof);
            }
            _ => panic!("expected labour update"),
        }
    }

    #[test]
    fn clear_flag_conflicts_with_value() {
        let parsed = Cli::try_parse_from([
            "sramika", "labour", "update", "3", "--photo", "file:///p.png", "--clear-photo",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn contractor_update_covers_bank_and_documents() {
        let cli = Cli::try_parse_from([
            "sramika",
            "contractor",
            "update",
            "7",
            "--bank",
            "Canara Bank",
            "--ifsc",
            "CNRB0000123",
            "--clear-id-proof",
            "--agree-to-terms",
            "true",
        ])
        .unwrap();
        match cli.command {
            Commands::Contractor {
                command:
                    ContractorCommands::Update {
                        bank,
                        ifsc,
                        clear_id_proof,
                        agree_to_terms,
                        photo,
                        ..
                    },
            } => {
                assert_eq!(bank.as_deref(), Some("Canara Bank"));
                assert_eq!(ifsc.as_deref(), Some("CNRB0000123"));
                assert!(clear_id_proof);
                assert_eq!(agree_to_terms, Some(true));
                assert_eq!(photo, None);
            }
            _ => panic!("expected contractor update"),
        }
    }
}
