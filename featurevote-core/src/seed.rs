//! Sample data for local development.
//!
//! Each sample feature's vote total is materialised as real ledger rows cast
//! by demo voter accounts, so the ranking works on it like any other data.
//! Loading is idempotent: features are matched by title and skipped when
//! present.

use crate::db::Database;
use crate::error::Result;
use crate::models::CreateFeatureInput;

pub const SAMPLE_AUTHOR: &str = "sample-author";

pub struct SampleFeature {
    pub title: &'static str,
    pub description: &'static str,
    pub votes: usize,
}

pub const SAMPLE_FEATURES: &[SampleFeature] = &[
    SampleFeature {
        title: "Dark Mode Support",
        description: "Add dark mode theme option for better user experience during night time usage.",
        votes: 15,
    },
    SampleFeature {
        title: "Mobile App",
        description: "Develop native mobile applications for iOS and Android platforms.",
        votes: 23,
    },
    SampleFeature {
        title: "Real-time Notifications",
        description: "Push notifications for new features and voting updates.",
        votes: 8,
    },
    SampleFeature {
        title: "Advanced Search",
        description: "Enhanced search functionality with filters and sorting options.",
        votes: 12,
    },
    SampleFeature {
        title: "User Profiles",
        description: "Allow users to create profiles and track their feature requests.",
        votes: 6,
    },
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub users_created: usize,
    pub features_created: usize,
    pub votes_cast: usize,
}

pub fn voter_name(n: usize) -> String {
    format!("voter{:02}", n)
}

pub fn load_sample_data(db: &Database) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    let (author, created) = db.get_or_create_user(SAMPLE_AUTHOR)?;
    report.users_created += usize::from(created);

    let voters_needed = SAMPLE_FEATURES.iter().map(|f| f.votes).max().unwrap_or(0);
    let mut voters = Vec::with_capacity(voters_needed);
    for n in 1..=voters_needed {
        let (voter, created) = db.get_or_create_user(&voter_name(n))?;
        report.users_created += usize::from(created);
        voters.push(voter.id);
    }

    for sample in SAMPLE_FEATURES {
        if db.find_feature_by_title(sample.title)?.is_some() {
            tracing::debug!("Sample feature {:?} already present", sample.title);
            continue;
        }

        let feature = db.create_feature(
            author.id,
            CreateFeatureInput {
                title: sample.title.to_string(),
                description: Some(sample.description.to_string()),
            },
        )?;
        report.features_created += 1;

        for voter in voters.iter().take(sample.votes) {
            if db.cast_vote(feature.id, *voter)? {
                report.votes_cast += 1;
            }
        }
        tracing::info!("Created sample feature: {}", sample.title);
    }

    tracing::info!(
        "Sample data loaded: {} users, {} features, {} votes",
        report.users_created,
        report.features_created,
        report.votes_cast
    );
    Ok(report)
}
