use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tui_widgets::popup::PopupState;

use crate::config::{Config, UiColors};
use crate::db::{CompanyCount, Contact, ContactListEntry};
use crate::service::CrmService;

use super::draw;
use super::filter::FilterBox;
use super::form::{ContactForm, FormEvent};
use super::keys::key_matches_any;
use super::views::View;

/// Which part of the screen receives plain keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Filter,
    Form,
}

#[derive(Debug, Clone)]
pub struct ConfirmModal {
    pub title: String,
    pub message: String,
    pub action: ConfirmAction,
}

/// Action to perform when the confirm modal is accepted
#[derive(Debug, Clone)]
pub enum ConfirmAction {
    /// Delete the contact currently loaded in the form
    DeleteContact(Contact),
}

pub struct App<'a> {
    service: &'a mut CrmService,
    config: &'a Config,
    pub view: View,
    pub focus: Focus,
    pub drawer_open: bool,
    pub drawer_index: usize,
    pub contacts: Vec<ContactListEntry>,
    pub selected: usize,
    pub filter: FilterBox,
    pub form: ContactForm,
    pub status: Option<String>,
    pub confirm_modal: Option<ConfirmModal>,
    // Popup state for the confirm dialog (tui-widgets popup)
    pub modal_popup: PopupState,
    // Dashboard data, refreshed when the view is entered
    pub contact_count: i64,
    pub company_counts: Vec<CompanyCount>,
}

impl<'a> App<'a> {
    pub fn new(service: &'a mut CrmService, config: &'a Config) -> Result<Self> {
        let companies = service.find_all_companies()?;
        let statuses = service.find_all_statuses()?;
        let form = ContactForm::new(companies, statuses, config.form.validate);

        let mut app = Self {
            service,
            config,
            view: View::List,
            focus: Focus::List,
            drawer_open: false,
            drawer_index: 0,
            contacts: Vec::new(),
            selected: 0,
            filter: FilterBox::default(),
            form,
            status: None,
            confirm_modal: None,
            modal_popup: PopupState::default(),
            contact_count: 0,
            company_counts: Vec::new(),
        };
        app.refresh()?;
        Ok(app)
    }

    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop<B>(&mut self, terminal: &mut Terminal<B>) -> Result<()>
    where
        B: ratatui::backend::Backend,
    {
        loop {
            draw::render(terminal, self)?;

            if event::poll(Duration::from_millis(100))? {
                match event::read()? {
                    Event::Key(key) => {
                        if self.handle_key(key)? {
                            break;
                        }
                    }
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }

            self.tick()?;
        }
        Ok(())
    }

    /// Periodic work between input events: refresh once the filter settles.
    pub fn tick(&mut self) -> Result<()> {
        let delay = Duration::from_millis(self.config.filter_settle_ms);
        if self.filter.take_settled(delay) {
            self.refresh()?;
        }
        Ok(())
    }

    /// Returns true when the application should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        // Ctrl+C always quits (hardcoded for safety)
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            return Ok(true);
        }

        if self.confirm_modal.is_some() {
            self.handle_confirm_modal_key(key)?;
            return Ok(false);
        }

        // The drawer toggle works in every context; its binding is a
        // function key so it cannot collide with text entry.
        if key_matches_any(&key, &self.config.keys.global.drawer) {
            self.toggle_drawer();
            return Ok(false);
        }

        if self.drawer_open {
            self.handle_drawer_key(key)?;
            return Ok(false);
        }

        match (self.view, self.focus) {
            (View::List, Focus::Form) => {
                self.handle_form_key(key)?;
                Ok(false)
            }
            (View::List, Focus::Filter) => {
                self.handle_filter_key(key)?;
                Ok(false)
            }
            (View::List, Focus::List) => self.handle_list_key(key),
            (View::Dashboard, _) => self.handle_dashboard_key(key),
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Result<bool> {
        let global = &self.config.keys.global;
        let list = &self.config.keys.list;

        if key_matches_any(&key, &global.quit) {
            return Ok(true);
        }
        if key_matches_any(&key, &global.filter) {
            self.focus = Focus::Filter;
            return Ok(false);
        }
        if key_matches_any(&key, &list.next) {
            self.move_selection(1);
            return Ok(false);
        }
        if key_matches_any(&key, &list.prev) {
            self.move_selection(-1);
            return Ok(false);
        }
        if key_matches_any(&key, &list.edit) {
            self.edit_selected()?;
            return Ok(false);
        }
        if key_matches_any(&key, &list.add) {
            self.add_contact();
            return Ok(false);
        }
        Ok(false)
    }

    fn handle_filter_key(&mut self, key: KeyEvent) -> Result<()> {
        let filter_keys = &self.config.keys.filter;

        if key_matches_any(&key, &filter_keys.cancel) {
            self.focus = Focus::List;
            return Ok(());
        }
        if key_matches_any(&key, &filter_keys.confirm) {
            // Enter skips the settle wait
            if self.filter.flush() {
                self.refresh()?;
            }
            self.focus = Focus::List;
            return Ok(());
        }
        if key_matches_any(&key, &filter_keys.next) {
            self.move_selection(1);
            return Ok(());
        }
        if key_matches_any(&key, &filter_keys.prev) {
            self.move_selection(-1);
            return Ok(());
        }

        self.filter.handle_key_event(key);
        Ok(())
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<()> {
        let event = self.form.handle_key(key, &self.config.keys.form);
        match event {
            Some(FormEvent::Save(contact)) => self.save_contact(contact)?,
            Some(FormEvent::Delete(contact)) => self.request_delete(contact),
            Some(FormEvent::Cancel) => self.close_editor(),
            None => {}
        }
        Ok(())
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) -> Result<bool> {
        if key_matches_any(&key, &self.config.keys.global.quit) {
            return Ok(true);
        }
        Ok(false)
    }

    fn handle_drawer_key(&mut self, key: KeyEvent) -> Result<()> {
        let drawer = &self.config.keys.drawer;

        if key_matches_any(&key, &drawer.cancel) {
            self.drawer_open = false;
            return Ok(());
        }
        if key_matches_any(&key, &drawer.next) {
            self.drawer_index = (self.drawer_index + 1) % View::ALL.len();
            return Ok(());
        }
        if key_matches_any(&key, &drawer.prev) {
            self.drawer_index = (self.drawer_index + View::ALL.len() - 1) % View::ALL.len();
            return Ok(());
        }
        if key_matches_any(&key, &drawer.confirm) {
            let destination = View::ALL[self.drawer_index];
            self.drawer_open = false;
            self.enter_view(destination)?;
        }
        Ok(())
    }

    fn handle_confirm_modal_key(&mut self, key: KeyEvent) -> Result<()> {
        let modal_keys = &self.config.keys.modal;

        if key_matches_any(&key, &modal_keys.cancel) {
            self.confirm_modal = None;
            return Ok(());
        }
        if key_matches_any(&key, &modal_keys.confirm) {
            if let Some(modal) = self.confirm_modal.take() {
                match modal.action {
                    ConfirmAction::DeleteContact(contact) => self.delete_contact(contact)?,
                }
            }
        }
        Ok(())
    }

    fn toggle_drawer(&mut self) {
        if self.drawer_open {
            self.drawer_open = false;
        } else {
            self.drawer_open = true;
            self.drawer_index = self.view.index();
        }
    }

    fn enter_view(&mut self, view: View) -> Result<()> {
        self.view = view;
        match view {
            View::List => self.refresh()?,
            View::Dashboard => self.refresh_dashboard()?,
        }
        Ok(())
    }

    fn move_selection(&mut self, delta: isize) {
        if self.contacts.is_empty() {
            return;
        }
        let len = self.contacts.len() as isize;
        let mut index = self.selected as isize + delta;
        if index < 0 {
            index = 0;
        } else if index >= len {
            index = len - 1;
        }
        self.selected = index as usize;
    }

    fn edit_selected(&mut self) -> Result<()> {
        let Some(entry) = self.contacts.get(self.selected) else {
            return Ok(());
        };
        match self.service.get_contact(entry.id)? {
            Some(contact) => {
                self.form.set_contact(Some(contact));
                self.focus = Focus::Form;
            }
            None => {
                self.set_status("Contact no longer exists");
                self.refresh()?;
            }
        }
        Ok(())
    }

    /// "Add contact": a fresh unsaved record routed straight to the form.
    /// Nothing is persisted until the form emits a save.
    fn add_contact(&mut self) {
        self.form.set_contact(Some(Contact::default()));
        self.focus = Focus::Form;
    }

    fn close_editor(&mut self) {
        self.form.set_contact(None);
        self.focus = Focus::List;
    }

    fn save_contact(&mut self, contact: Contact) -> Result<()> {
        match self.service.save_contact(&contact) {
            Ok(id) => {
                self.close_editor();
                self.refresh()?;
                self.select_contact(id);
                self.set_status("Contact saved");
            }
            Err(err) => {
                // Keep the edit state so the user can retry or cancel
                self.set_status(format!("Save failed: {}", err));
            }
        }
        Ok(())
    }

    fn request_delete(&mut self, contact: Contact) {
        if contact.id.is_none() {
            // Nothing persisted yet; dropping the edit is enough
            self.close_editor();
            return;
        }
        self.modal_popup = PopupState::default();
        self.confirm_modal = Some(ConfirmModal {
            title: "DELETE CONTACT".to_string(),
            message: format!(
                "Delete {} {}?",
                contact.first_name.trim(),
                contact.last_name.trim()
            ),
            action: ConfirmAction::DeleteContact(contact),
        });
    }

    fn delete_contact(&mut self, contact: Contact) -> Result<()> {
        let Some(id) = contact.id else {
            return Ok(());
        };
        match self.service.delete_contact(id) {
            Ok(()) => {
                self.close_editor();
                self.refresh()?;
                self.set_status("Contact deleted");
            }
            Err(err) => {
                self.set_status(format!("Delete failed: {}", err));
            }
        }
        Ok(())
    }

    /// Re-query the service with the current filter and replace the table
    /// rows wholesale, keeping the selection on the same contact when it
    /// survives the refresh.
    pub fn refresh(&mut self) -> Result<()> {
        let previous_id = self.contacts.get(self.selected).map(|entry| entry.id);

        self.contacts = self.service.find_all_contacts(self.filter.value())?;

        if let Some(id) = previous_id {
            if let Some(index) = self.contacts.iter().position(|entry| entry.id == id) {
                self.selected = index;
            }
        }
        if self.contacts.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.contacts.len() {
            self.selected = self.contacts.len() - 1;
        }
        Ok(())
    }

    fn refresh_dashboard(&mut self) -> Result<()> {
        self.contact_count = self.service.count_contacts()?;
        self.company_counts = self.service.contacts_per_company()?;
        Ok(())
    }

    fn select_contact(&mut self, id: i64) {
        if let Some(index) = self.contacts.iter().position(|entry| entry.id == id) {
            self.selected = index;
        }
    }

    fn set_status<S: Into<String>>(&mut self, message: S) {
        self.status = Some(message.into());
    }

    pub fn ui_colors(&self) -> &UiColors {
        &self.config.ui.colors
    }
}
