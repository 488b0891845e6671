use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, Row, TransactionBehavior};

use crate::search;

/// A person record. `id` is `None` for a contact that has not been saved yet
/// (the "Add contact" action constructs one of these).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contact {
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company_id: Option<i64>,
    pub status_id: Option<i64>,
}

/// Lookup entity; read-only from the UI's perspective.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub id: i64,
    pub name: String,
}

/// One row of the contact table, with the referenced names already joined in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactListEntry {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub status_name: Option<String>,
    pub company_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyCount {
    pub company_name: Option<String>,
    pub contacts: i64,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create data dir: {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;
        let mut db = Self { conn };
        db.setup()?;
        Ok(db)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.setup()?;
        Ok(db)
    }

    fn setup(&mut self) -> Result<()> {
        self.conn.pragma_update(None, "journal_mode", "WAL")?;
        self.conn.pragma_update(None, "synchronous", "FULL")?;
        self.conn.pragma_update(None, "foreign_keys", "ON")?;

        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS companies (
              id   INTEGER PRIMARY KEY,
              name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS statuses (
              id   INTEGER PRIMARY KEY,
              name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS contacts (
              id         INTEGER PRIMARY KEY,
              first_name TEXT NOT NULL,
              last_name  TEXT NOT NULL,
              email      TEXT NOT NULL,
              first_norm TEXT NOT NULL,
              last_norm  TEXT NOT NULL,
              company_id INTEGER REFERENCES companies(id),
              status_id  INTEGER REFERENCES statuses(id)
            );

            CREATE INDEX IF NOT EXISTS idx_contacts_first_norm ON contacts(first_norm);
            CREATE INDEX IF NOT EXISTS idx_contacts_last_norm ON contacts(last_norm);
            CREATE INDEX IF NOT EXISTS idx_contacts_company ON contacts(company_id);
            CREATE INDEX IF NOT EXISTS idx_contacts_status ON contacts(status_id);
        "#,
        )?;
        Ok(())
    }

    pub fn list_companies(&self) -> Result<Vec<Company>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM companies ORDER BY name COLLATE NOCASE")?;
        let rows = stmt.query_map([], |row| {
            Ok(Company {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Statuses keep their insertion order; it mirrors the sales pipeline.
    pub fn list_statuses(&self) -> Result<Vec<Status>> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM statuses ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Status {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn insert_company(&mut self, name: &str) -> Result<i64> {
        self.conn
            .execute("INSERT INTO companies (name) VALUES (?1)", params![name])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_status(&mut self, name: &str) -> Result<i64> {
        self.conn
            .execute("INSERT INTO statuses (name) VALUES (?1)", params![name])?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List contacts for the table, optionally filtered by a normalized name
    /// fragment. Rows come back in a stable last-name/first-name order; the
    /// view renders them exactly as returned.
    pub fn list_contacts(&self, filter: Option<&str>) -> Result<Vec<ContactListEntry>> {
        let mut sql = String::from(
            r#"SELECT c.id, c.first_name, c.last_name, c.email, s.name, co.name
               FROM contacts c
               LEFT JOIN statuses s ON s.id = c.status_id
               LEFT JOIN companies co ON co.id = c.company_id"#,
        );

        let mut args: Vec<String> = Vec::new();
        if let Some(filter) = filter {
            let pattern = search::like_pattern(filter);
            sql.push_str(
                r#" WHERE c.first_norm LIKE ?1 ESCAPE '\'
                     OR c.last_norm LIKE ?1 ESCAPE '\'"#,
            );
            args.push(pattern);
        }

        sql.push_str(" ORDER BY c.last_norm, c.first_norm, c.id");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = if args.is_empty() {
            stmt.query_map([], row_to_list_entry)?
        } else {
            stmt.query_map([args[0].as_str()], row_to_list_entry)?
        };

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn get_contact(&self, id: i64) -> Result<Option<Contact>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, first_name, last_name, email, company_id, status_id
             FROM contacts WHERE id = ?1",
        )?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(Contact {
                id: Some(row.get(0)?),
                first_name: row.get(1)?,
                last_name: row.get(2)?,
                email: row.get(3)?,
                company_id: row.get(4)?,
                status_id: row.get(5)?,
            }));
        }
        Ok(None)
    }

    /// Insert the contact when it has no id, update it otherwise.
    /// Returns the row id either way.
    pub fn save_contact(&mut self, contact: &Contact) -> Result<i64> {
        let first_norm = search::normalize(&contact.first_name);
        let last_norm = search::normalize(&contact.last_name);

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let id = match contact.id {
            Some(id) => {
                let changed = tx.execute(
                    r#"UPDATE contacts SET
                         first_name = ?1, last_name = ?2, email = ?3,
                         first_norm = ?4, last_norm = ?5,
                         company_id = ?6, status_id = ?7
                       WHERE id = ?8"#,
                    params![
                        contact.first_name,
                        contact.last_name,
                        contact.email,
                        first_norm,
                        last_norm,
                        contact.company_id,
                        contact.status_id,
                        id,
                    ],
                )?;
                if changed == 0 {
                    bail!("no contact with id {}", id);
                }
                id
            }
            None => {
                tx.execute(
                    r#"INSERT INTO contacts
                         (first_name, last_name, email, first_norm, last_norm, company_id, status_id)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
                    params![
                        contact.first_name,
                        contact.last_name,
                        contact.email,
                        first_norm,
                        last_norm,
                        contact.company_id,
                        contact.status_id,
                    ],
                )?;
                tx.last_insert_rowid()
            }
        };

        tx.commit()?;
        Ok(id)
    }

    pub fn delete_contact(&mut self, id: i64) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM contacts WHERE id = ?1", params![id])?;
        if changed == 0 {
            bail!("no contact with id {}", id);
        }
        Ok(())
    }

    pub fn count_contacts(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Contact counts per company for the dashboard, largest first.
    /// Contacts without a company land in a `None` bucket.
    pub fn contacts_per_company(&self) -> Result<Vec<CompanyCount>> {
        let mut stmt = self.conn.prepare(
            r#"SELECT co.name, COUNT(c.id)
               FROM contacts c
               LEFT JOIN companies co ON co.id = c.company_id
               GROUP BY co.name
               ORDER BY COUNT(c.id) DESC, co.name COLLATE NOCASE"#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CompanyCount {
                company_name: row.get(0)?,
                contacts: row.get(1)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

fn row_to_list_entry(row: &Row) -> rusqlite::Result<ContactListEntry> {
    Ok(ContactListEntry {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        status_name: row.get(4)?,
        company_name: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        db: Database,
        acme: i64,
        globex: i64,
        lead: i64,
        customer: i64,
    }

    fn fixture() -> Fixture {
        let mut db = Database::open_in_memory().unwrap();
        let acme = db.insert_company("Acme Corp").unwrap();
        let globex = db.insert_company("Globex").unwrap();
        let lead = db.insert_status("Imported lead").unwrap();
        let customer = db.insert_status("Customer").unwrap();
        Fixture {
            db,
            acme,
            globex,
            lead,
            customer,
        }
    }

    fn contact(first: &str, last: &str, email: &str, company: i64, status: i64) -> Contact {
        Contact {
            id: None,
            first_name: first.into(),
            last_name: last.into(),
            email: email.into(),
            company_id: Some(company),
            status_id: Some(status),
        }
    }

    #[test]
    fn test_save_inserts_and_lists_with_joined_names() {
        let mut fx = fixture();
        let id = fx
            .db
            .save_contact(&contact("Ada", "Lovelace", "ada@acme.com", fx.acme, fx.lead))
            .unwrap();

        let rows = fx.db.list_contacts(None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, id);
        assert_eq!(rows[0].first_name, "Ada");
        assert_eq!(rows[0].company_name.as_deref(), Some("Acme Corp"));
        assert_eq!(rows[0].status_name.as_deref(), Some("Imported lead"));
    }

    #[test]
    fn test_save_updates_existing_row() {
        let mut fx = fixture();
        let id = fx
            .db
            .save_contact(&contact("Ada", "Lovelace", "ada@acme.com", fx.acme, fx.lead))
            .unwrap();

        let mut edited = fx.db.get_contact(id).unwrap().unwrap();
        edited.email = "ada@globex.com".into();
        edited.company_id = Some(fx.globex);
        edited.status_id = Some(fx.customer);
        let saved_id = fx.db.save_contact(&edited).unwrap();
        assert_eq!(saved_id, id);

        let rows = fx.db.list_contacts(None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].email, "ada@globex.com");
        assert_eq!(rows[0].company_name.as_deref(), Some("Globex"));
        assert_eq!(rows[0].status_name.as_deref(), Some("Customer"));
    }

    #[test]
    fn test_update_missing_contact_fails() {
        let mut fx = fixture();
        let mut ghost = contact("No", "One", "no@one.com", fx.acme, fx.lead);
        ghost.id = Some(999);
        assert!(fx.db.save_contact(&ghost).is_err());
    }

    #[test]
    fn test_filter_matches_names_not_email() {
        let mut fx = fixture();
        fx.db
            .save_contact(&contact("Ada", "Lovelace", "ada@acme.com", fx.acme, fx.lead))
            .unwrap();
        fx.db
            .save_contact(&contact("Grace", "Hopper", "ada-fan@navy.mil", fx.globex, fx.customer))
            .unwrap();

        let rows = fx.db.list_contacts(Some("lovelace")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].last_name, "Lovelace");

        // "ada" appears in Hopper's email but the filter only covers names.
        let rows = fx.db.list_contacts(Some("ada")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].first_name, "Ada");
    }

    #[test]
    fn test_filter_is_accent_and_case_insensitive() {
        let mut fx = fixture();
        fx.db
            .save_contact(&contact("José", "Müller", "jm@acme.com", fx.acme, fx.lead))
            .unwrap();

        let pattern = search::normalize_filter("MULLER").unwrap();
        let rows = fx.db.list_contacts(Some(&pattern)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].first_name, "José");
    }

    #[test]
    fn test_filter_escapes_like_wildcards() {
        let mut fx = fixture();
        fx.db
            .save_contact(&contact("Percy", "Smith", "p@acme.com", fx.acme, fx.lead))
            .unwrap();

        let pattern = search::like_pattern("100%");
        let rows = fx.db.list_contacts(Some("100%")).unwrap();
        assert!(rows.is_empty(), "literal %% must not match, got {:?}", pattern);
    }

    #[test]
    fn test_list_order_is_last_name_then_first_name() {
        let mut fx = fixture();
        fx.db
            .save_contact(&contact("Zoe", "Adams", "z@acme.com", fx.acme, fx.lead))
            .unwrap();
        fx.db
            .save_contact(&contact("Ann", "Baker", "a@acme.com", fx.acme, fx.lead))
            .unwrap();
        fx.db
            .save_contact(&contact("Amy", "Adams", "amy@acme.com", fx.acme, fx.lead))
            .unwrap();

        let names: Vec<String> = fx
            .db
            .list_contacts(None)
            .unwrap()
            .into_iter()
            .map(|e| format!("{} {}", e.first_name, e.last_name))
            .collect();
        assert_eq!(names, vec!["Amy Adams", "Zoe Adams", "Ann Baker"]);
    }

    #[test]
    fn test_missing_references_come_back_as_none() {
        let mut fx = fixture();
        let orphan = Contact {
            id: None,
            first_name: "Free".into(),
            last_name: "Agent".into(),
            email: "free@agent.com".into(),
            company_id: None,
            status_id: None,
        };
        fx.db.save_contact(&orphan).unwrap();

        let rows = fx.db.list_contacts(None).unwrap();
        assert_eq!(rows[0].company_name, None);
        assert_eq!(rows[0].status_name, None);
    }

    #[test]
    fn test_delete_contact() {
        let mut fx = fixture();
        let id = fx
            .db
            .save_contact(&contact("Ada", "Lovelace", "ada@acme.com", fx.acme, fx.lead))
            .unwrap();

        fx.db.delete_contact(id).unwrap();
        assert!(fx.db.list_contacts(None).unwrap().is_empty());
        assert!(fx.db.delete_contact(id).is_err());
    }

    #[test]
    fn test_get_contact_round_trip() {
        let mut fx = fixture();
        let id = fx
            .db
            .save_contact(&contact("Ada", "Lovelace", "ada@acme.com", fx.acme, fx.lead))
            .unwrap();

        let loaded = fx.db.get_contact(id).unwrap().unwrap();
        assert_eq!(loaded.id, Some(id));
        assert_eq!(loaded.first_name, "Ada");
        assert_eq!(loaded.company_id, Some(fx.acme));
        assert_eq!(fx.db.get_contact(id + 1).unwrap(), None);
    }

    #[test]
    fn test_dashboard_counts() {
        let mut fx = fixture();
        fx.db
            .save_contact(&contact("Ada", "Lovelace", "a@acme.com", fx.acme, fx.lead))
            .unwrap();
        fx.db
            .save_contact(&contact("Alan", "Turing", "t@acme.com", fx.acme, fx.customer))
            .unwrap();
        fx.db
            .save_contact(&contact("Grace", "Hopper", "g@globex.com", fx.globex, fx.lead))
            .unwrap();

        assert_eq!(fx.db.count_contacts().unwrap(), 3);

        let counts = fx.db.contacts_per_company().unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].company_name.as_deref(), Some("Acme Corp"));
        assert_eq!(counts[0].contacts, 2);
        assert_eq!(counts[1].company_name.as_deref(), Some("Globex"));
        assert_eq!(counts[1].contacts, 1);
    }

    #[test]
    fn test_company_and_status_listing() {
        let fx = fixture();
        let companies = fx.db.list_companies().unwrap();
        assert_eq!(
            companies.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec!["Acme Corp", "Globex"]
        );
        let statuses = fx.db.list_statuses().unwrap();
        assert_eq!(
            statuses.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            vec!["Imported lead", "Customer"]
        );
    }
}
