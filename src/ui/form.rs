use crossterm::event::{Event, KeyEvent};
use once_cell::sync::Lazy;
use regex::Regex;
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

use crate::config::FormKeys;
use crate::db::{Company, Contact, Status};

use super::keys::key_matches_any;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern"));

/// Editable controls of the form, in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    FirstName,
    LastName,
    Email,
    Company,
    Status,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::FirstName,
        FormField::LastName,
        FormField::Email,
        FormField::Company,
        FormField::Status,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::FirstName => "First name",
            FormField::LastName => "Last name",
            FormField::Email => "Email",
            FormField::Company => "Company",
            FormField::Status => "Status",
        }
    }

    /// Text controls take keystrokes; selectors cycle options instead.
    pub fn is_text(self) -> bool {
        matches!(
            self,
            FormField::FirstName | FormField::LastName | FormField::Email
        )
    }

    fn next(self) -> Self {
        let index = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        let index = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Side-effecting intents the form's owner must handle; the form itself
/// never touches the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    Save(Contact),
    Delete(Contact),
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: FormField,
    pub message: String,
}

/// Edit form for a single contact. Constructed once with the full company
/// and status option lists; the edit target changes via `set_contact`.
pub struct ContactForm {
    companies: Vec<Company>,
    statuses: Vec<Status>,
    validate: bool,
    contact: Option<Contact>,
    first_name: Input,
    last_name: Input,
    email: Input,
    company_index: Option<usize>,
    status_index: Option<usize>,
    focus: FormField,
    errors: Vec<FieldError>,
}

impl ContactForm {
    pub fn new(companies: Vec<Company>, statuses: Vec<Status>, validate: bool) -> Self {
        Self {
            companies,
            statuses,
            validate,
            contact: None,
            first_name: Input::default(),
            last_name: Input::default(),
            email: Input::default(),
            company_index: None,
            status_index: None,
            focus: FormField::FirstName,
            errors: Vec::new(),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.contact.is_some()
    }

    /// Load a contact's fields into the controls, or clear everything when
    /// there is nothing to edit.
    pub fn set_contact(&mut self, contact: Option<Contact>) {
        self.errors.clear();
        self.focus = FormField::FirstName;
        match contact {
            Some(c) => {
                self.first_name = Input::new(c.first_name.clone());
                self.last_name = Input::new(c.last_name.clone());
                self.email = Input::new(c.email.clone());
                self.company_index = c
                    .company_id
                    .and_then(|id| self.companies.iter().position(|co| co.id == id));
                self.status_index = c
                    .status_id
                    .and_then(|id| self.statuses.iter().position(|s| s.id == id));
                self.contact = Some(c);
            }
            None => {
                self.first_name.reset();
                self.last_name.reset();
                self.email.reset();
                self.company_index = None;
                self.status_index = None;
                self.contact = None;
            }
        }
    }

    /// The edit target with the controls' current values applied.
    pub fn current_contact(&self) -> Option<Contact> {
        let base = self.contact.as_ref()?;
        Some(Contact {
            id: base.id,
            first_name: self.first_name.value().trim().to_string(),
            last_name: self.last_name.value().trim().to_string(),
            email: self.email.value().trim().to_string(),
            company_id: self.company_index.map(|i| self.companies[i].id),
            status_id: self.status_index.map(|i| self.statuses[i].id),
        })
    }

    pub fn focus(&self) -> FormField {
        self.focus
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn error_for(&self, field: FormField) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn text_input(&self, field: FormField) -> Option<&Input> {
        match field {
            FormField::FirstName => Some(&self.first_name),
            FormField::LastName => Some(&self.last_name),
            FormField::Email => Some(&self.email),
            FormField::Company | FormField::Status => None,
        }
    }

    /// Display label of the selected option; selectors show names, never ids.
    pub fn selector_label(&self, field: FormField) -> &str {
        match field {
            FormField::Company => self
                .company_index
                .map(|i| self.companies[i].name.as_str())
                .unwrap_or("(none)"),
            FormField::Status => self
                .status_index
                .map(|i| self.statuses[i].name.as_str())
                .unwrap_or("(none)"),
            _ => "",
        }
    }

    /// Run the explicit validation step. With validation enabled the
    /// required-field and email-format constraints apply; otherwise only the
    /// email widget's shape check (and only for a non-empty value).
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        let email = self.email.value().trim();

        if self.validate {
            if self.first_name.value().trim().is_empty() {
                errors.push(FieldError {
                    field: FormField::FirstName,
                    message: "First name is required".into(),
                });
            }
            if self.last_name.value().trim().is_empty() {
                errors.push(FieldError {
                    field: FormField::LastName,
                    message: "Last name is required".into(),
                });
            }
            if email.is_empty() {
                errors.push(FieldError {
                    field: FormField::Email,
                    message: "Email is required".into(),
                });
            } else if !EMAIL_RE.is_match(email) {
                errors.push(FieldError {
                    field: FormField::Email,
                    message: "Enter a valid email address".into(),
                });
            }
            if self.company_index.is_none() {
                errors.push(FieldError {
                    field: FormField::Company,
                    message: "Company is required".into(),
                });
            }
            if self.status_index.is_none() {
                errors.push(FieldError {
                    field: FormField::Status,
                    message: "Status is required".into(),
                });
            }
        } else if !email.is_empty() && !EMAIL_RE.is_match(email) {
            errors.push(FieldError {
                field: FormField::Email,
                message: "Enter a valid email address".into(),
            });
        }

        errors
    }

    /// Route a key to the form. Returns the intent the owner must act on,
    /// if the key produced one.
    pub fn handle_key(&mut self, key: KeyEvent, keys: &FormKeys) -> Option<FormEvent> {
        if !self.is_editing() {
            return None;
        }

        if key_matches_any(&key, &keys.save) {
            let errors = self.validate();
            if errors.is_empty() {
                self.errors.clear();
                return self.current_contact().map(FormEvent::Save);
            }
            self.errors = errors;
            return None;
        }

        if key_matches_any(&key, &keys.cancel) {
            return Some(FormEvent::Cancel);
        }

        if key_matches_any(&key, &keys.delete) {
            return self.current_contact().map(FormEvent::Delete);
        }

        if key_matches_any(&key, &keys.next_field) {
            self.focus = self.focus.next();
            return None;
        }
        if key_matches_any(&key, &keys.prev_field) {
            self.focus = self.focus.prev();
            return None;
        }

        if self.focus.is_text() {
            let input = match self.focus {
                FormField::FirstName => &mut self.first_name,
                FormField::LastName => &mut self.last_name,
                FormField::Email => &mut self.email,
                _ => return None,
            };
            input.handle_event(&Event::Key(key));
            return None;
        }

        // Selector fields: cycle through the fixed option list, with an
        // empty slot for the unset state.
        let forward = key_matches_any(&key, &keys.option_next);
        let backward = key_matches_any(&key, &keys.option_prev);
        if forward || backward {
            match self.focus {
                FormField::Company => {
                    self.company_index = cycle(self.company_index, self.companies.len(), forward);
                }
                FormField::Status => {
                    self.status_index = cycle(self.status_index, self.statuses.len(), forward);
                }
                _ => {}
            }
        }
        None
    }
}

fn cycle(current: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if forward {
        match current {
            None => Some(0),
            Some(i) if i + 1 < len => Some(i + 1),
            Some(_) => None,
        }
    } else {
        match current {
            None => Some(len - 1),
            Some(0) => None,
            Some(i) => Some(i - 1),
        }
    }
}
