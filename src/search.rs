//! Worker search as the results screen composes it: fall back to everyone
//! when no skill is selected, derive ratings, then filter and sort.

use clap::ValueEnum;
use serde::Serialize;
use tracing::debug;

use crate::db::Database;
use crate::error::Result;
use crate::models::{Availability, LabourProfile};
use crate::rating::Rating;

/// Sort options offered on the results screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum SortKey {
    HighestRated,
    MostExperienced,
    LowestPrice,
}

impl SortKey {
    /// Keys are always applied in this order, whatever order they were picked in.
    const APPLY_ORDER: [SortKey; 3] = [
        SortKey::HighestRated,
        SortKey::MostExperienced,
        SortKey::LowestPrice,
    ];
}

#[derive(Debug, Clone)]
pub struct WorkerQuery {
    pub skills: Vec<String>,
    pub sort: Vec<SortKey>,
    pub immediate_only: bool,
}

impl Default for WorkerQuery {
    fn default() -> Self {
        Self {
            skills: Vec::new(),
            sort: vec![SortKey::HighestRated],
            immediate_only: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RatedWorker {
    #[serde(flatten)]
    pub profile: LabourProfile,
    pub rating: Rating,
}

impl Database {
    pub fn find_workers(&self, query: &WorkerQuery) -> Result<Vec<RatedWorker>> {
        let profiles = if query.skills.is_empty() {
            self.get_all_labour_profiles()?
        } else {
            self.get_labour_profiles_by_skills(&query.skills)?
        };

        let mut workers: Vec<RatedWorker> = profiles
            .into_iter()
            .filter(|p| !query.immediate_only || p.availability == Availability::Immediate)
            .map(|profile| RatedWorker {
                rating: profile.rating(),
                profile,
            })
            .collect();

        apply_sort(&mut workers, &query.sort);
        debug!(found = workers.len(), "worker search");
        Ok(workers)
    }
}

/// Stable sorts in [`SortKey::APPLY_ORDER`]; the last selected key decides
/// and earlier ones break its ties.
pub fn apply_sort(workers: &mut [RatedWorker], selected: &[SortKey]) {
    for key in SortKey::APPLY_ORDER {
        if !selected.contains(&key) {
            continue;
        }
        match key {
            SortKey::HighestRated => workers.sort_by(|a, b| {
                b.rating
                    .partial_cmp(&a.rating)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            SortKey::MostExperienced => {
                workers.sort_by(|a, b| b.profile.experience.cmp(&a.profile.experience))
            }
            SortKey::LowestPrice => {
                workers.sort_by(|a, b| a.profile.hourly_rate.cmp(&b.profile.hourly_rate))
            }
        }
    }
}
