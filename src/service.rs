use std::path::Path;

use anyhow::Result;

use crate::db::{Company, CompanyCount, Contact, ContactListEntry, Database, Status};
use crate::search;

/// The persistence/query boundary the views depend on. Everything the UI
/// knows about storage goes through here; calls are synchronous and errors
/// surface to the caller unchanged.
pub struct CrmService {
    db: Database,
}

impl CrmService {
    pub fn open(db_path: &Path) -> Result<Self> {
        Ok(Self {
            db: Database::open(db_path)?,
        })
    }

    #[cfg(test)]
    pub fn from_database(db: Database) -> Self {
        Self { db }
    }

    /// All contacts whose first or last name matches the filter fragment.
    /// A blank filter returns everything. Row order is the display order.
    pub fn find_all_contacts(&self, filter: &str) -> Result<Vec<ContactListEntry>> {
        match search::normalize_filter(filter) {
            Some(normalized) => self.db.list_contacts(Some(&normalized)),
            None => self.db.list_contacts(None),
        }
    }

    pub fn find_all_companies(&self) -> Result<Vec<Company>> {
        self.db.list_companies()
    }

    pub fn find_all_statuses(&self) -> Result<Vec<Status>> {
        self.db.list_statuses()
    }

    pub fn get_contact(&self, id: i64) -> Result<Option<Contact>> {
        self.db.get_contact(id)
    }

    pub fn save_contact(&mut self, contact: &Contact) -> Result<i64> {
        self.db.save_contact(contact)
    }

    pub fn delete_contact(&mut self, id: i64) -> Result<()> {
        self.db.delete_contact(id)
    }

    pub fn count_contacts(&self) -> Result<i64> {
        self.db.count_contacts()
    }

    pub fn contacts_per_company(&self) -> Result<Vec<CompanyCount>> {
        self.db.contacts_per_company()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_with_sample() -> CrmService {
        let mut db = Database::open_in_memory().unwrap();
        let acme = db.insert_company("Acme Corp").unwrap();
        let lead = db.insert_status("Imported lead").unwrap();
        db.save_contact(&Contact {
            id: None,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@acme.com".into(),
            company_id: Some(acme),
            status_id: Some(lead),
        })
        .unwrap();
        CrmService::from_database(db)
    }

    #[test]
    fn test_find_all_contacts_normalizes_the_filter() {
        let service = service_with_sample();
        assert_eq!(service.find_all_contacts("").unwrap().len(), 1);
        assert_eq!(service.find_all_contacts("   ").unwrap().len(), 1);
        assert_eq!(service.find_all_contacts("  LOVELACE ").unwrap().len(), 1);
        assert!(service.find_all_contacts("nobody").unwrap().is_empty());
    }

    #[test]
    fn test_lookup_lists_round_trip() {
        let service = service_with_sample();
        let companies = service.find_all_companies().unwrap();
        let statuses = service.find_all_statuses().unwrap();
        assert_eq!(companies.len(), 1);
        assert_eq!(companies[0].name, "Acme Corp");
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].name, "Imported lead");
    }
}
