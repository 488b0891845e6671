use anyhow::Result;

use crate::db::{Contact, Database};

pub const DEFAULT_CONTACT_COUNT: usize = 50;

const STATUS_NAMES: &[&str] = &[
    "Imported lead",
    "Not contacted",
    "Contacted",
    "Customer",
    "Closed (lost)",
];

const COMPANY_NAMES: &[&str] = &[
    "Acme Corp",
    "Globex",
    "Initech",
    "Umbrella Ltd",
    "Stark Industries",
    "Wayne Enterprises",
    "Hooli",
    "Bluesky Trading",
];

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Grace", "Edsger", "Barbara", "Donald", "Leslie", "Tony", "Margaret", "John",
    "Frances", "Ken", "Dennis", "Radia", "Vint", "Tim", "Linus", "Bjarne", "Anita", "Niklaus",
];

const LAST_NAMES: &[&str] = &[
    "Lovelace", "Turing", "Hopper", "Dijkstra", "Liskov", "Knuth", "Lamport", "Hoare", "Hamilton",
    "Backus", "Allen", "Thompson", "Ritchie", "Perlman", "Cerf", "Lee", "Torvalds", "Stroustrup",
    "Borg", "Wirth",
];

/// Outcome of a seed run; printed by the CLI.
#[derive(Debug, Clone, Default)]
pub struct SeedReport {
    pub companies: usize,
    pub statuses: usize,
    pub contacts: usize,
    pub skipped: bool,
}

/// Populate an empty database with demo companies, statuses, and contacts.
/// A database that already holds contacts is left untouched.
/// Generation is deterministic so repeated runs on fresh databases agree.
pub fn seed(db: &mut Database, count: usize) -> Result<SeedReport> {
    if db.count_contacts()? > 0 {
        return Ok(SeedReport {
            skipped: true,
            ..SeedReport::default()
        });
    }

    let mut report = SeedReport::default();

    if db.list_companies()?.is_empty() {
        for name in COMPANY_NAMES {
            db.insert_company(name)?;
            report.companies += 1;
        }
    }
    if db.list_statuses()?.is_empty() {
        for name in STATUS_NAMES {
            db.insert_status(name)?;
            report.statuses += 1;
        }
    }

    let companies = db.list_companies()?;
    let statuses = db.list_statuses()?;

    for i in 0..count {
        let first = FIRST_NAMES[i % FIRST_NAMES.len()];
        let last = LAST_NAMES[(i + i / FIRST_NAMES.len()) % LAST_NAMES.len()];
        let company = &companies[i % companies.len()];
        let status = &statuses[(i * 7 + 3) % statuses.len()];

        let contact = Contact {
            id: None,
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: demo_email(first, last, &company.name),
            company_id: Some(company.id),
            status_id: Some(status.id),
        };
        db.save_contact(&contact)?;
        report.contacts += 1;
    }

    Ok(report)
}

fn demo_email(first: &str, last: &str, company: &str) -> String {
    let domain: String = company
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    format!(
        "{}.{}@{}.com",
        first.to_lowercase(),
        last.to_lowercase(),
        domain
    )
}
