use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use hidrotrack_core::export::{csv_report, report_file_name};
use hidrotrack_core::{
    draft_from_fields, normalize_fields, parse_entry_args, Capabilities, DashboardData,
    FileIdentityProvider, FileLotRepository, IdentityProvider, LedgerService, LotKey,
    ReadingRecord, Session,
};
use ratatui::widgets::TableState;
use uuid::Uuid;

pub enum Screen {
    Login,
    LotSelect,
    Records,
    Dashboard,
}

pub enum InputMode {
    Normal,
    Editing,
}

#[derive(PartialEq)]
pub enum LoginField {
    Username,
    Secret,
}

pub struct App {
    pub service: LedgerService<FileLotRepository>,
    pub identity: FileIdentityProvider,
    pub session: Option<Session>,
    pub screen: Screen,

    // Login form
    pub login_username: String,
    pub login_secret: String,
    pub login_focus: LoginField,

    // Lot selection
    pub lot_input: String,
    pub selected_lot: Option<LotKey>,
    pub records: Vec<ReadingRecord>,
    pub table_state: TableState,

    // Entry line (add / edit)
    pub input: String,
    pub input_mode: InputMode,
    pub cursor_position: usize,
    pub editing: Option<Uuid>,
    pub pending_delete: Option<Uuid>,

    // Dashboard
    pub dashboard: Option<DashboardData>,
    pub ranking_state: TableState,

    pub status: Option<String>,
}

impl App {
    pub fn new(data_dir: Option<PathBuf>) -> Result<App> {
        let repo = FileLotRepository::new(data_dir.clone())?;
        let identity = FileIdentityProvider::new(data_dir)?;

        Ok(App {
            service: LedgerService::new(repo),
            identity,
            session: None,
            screen: Screen::Login,
            login_username: String::new(),
            login_secret: String::new(),
            login_focus: LoginField::Username,
            lot_input: String::new(),
            selected_lot: None,
            records: Vec::new(),
            table_state: TableState::default(),
            input: String::new(),
            input_mode: InputMode::Normal,
            cursor_position: 0,
            editing: None,
            pending_delete: None,
            dashboard: None,
            ranking_state: TableState::default(),
            status: None,
        })
    }

    pub fn capabilities(&self) -> Capabilities {
        self.session
            .as_ref()
            .map(|s| s.capabilities)
            .unwrap_or(Capabilities {
                can_edit: false,
                can_view_dashboard: false,
            })
    }

    // --- Login ---

    pub fn toggle_login_focus(&mut self) {
        self.login_focus = match self.login_focus {
            LoginField::Username => LoginField::Secret,
            LoginField::Secret => LoginField::Username,
        };
    }

    pub fn login_char(&mut self, c: char) {
        match self.login_focus {
            LoginField::Username => self.login_username.push(c),
            LoginField::Secret => self.login_secret.push(c),
        }
    }

    pub fn login_backspace(&mut self) {
        match self.login_focus {
            LoginField::Username => self.login_username.pop(),
            LoginField::Secret => self.login_secret.pop(),
        };
    }

    pub fn attempt_login(&mut self) {
        match self
            .identity
            .authenticate(&self.login_username, &self.login_secret)
        {
            Ok(session) => {
                // Admins land on the dashboard, plantonistas go straight to
                // data entry.
                self.screen = if session.capabilities.can_view_dashboard {
                    Screen::Dashboard
                } else {
                    Screen::LotSelect
                };
                self.session = Some(session);
                self.login_secret.clear();
                self.status = None;
                if matches!(self.screen, Screen::Dashboard) {
                    self.refresh_dashboard();
                }
            }
            Err(e) => {
                self.login_secret.clear();
                self.status = Some(e.to_string());
            }
        }
    }

    pub fn sign_out(&mut self) {
        self.session = None;
        self.dashboard = None;
        self.selected_lot = None;
        self.records.clear();
        self.lot_input.clear();
        self.login_username.clear();
        self.login_secret.clear();
        self.login_focus = LoginField::Username;
        self.status = None;
        self.screen = Screen::Login;
    }

    // --- Lot selection ---

    pub fn lot_char(&mut self, c: char) {
        if c.is_ascii_digit() {
            self.lot_input.push(c);
        }
    }

    pub fn lot_backspace(&mut self) {
        self.lot_input.pop();
    }

    pub fn submit_lot(&mut self) {
        match LotKey::parse(&self.lot_input) {
            Ok(lot) => {
                self.selected_lot = Some(lot);
                self.reload_records();
                self.table_state = TableState::default();
                if !self.records.is_empty() {
                    self.table_state.select(Some(0));
                }
                self.screen = Screen::Records;
                self.status = None;
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    pub fn back_to_lot_select(&mut self) {
        self.selected_lot = None;
        self.lot_input.clear();
        self.records.clear();
        self.pending_delete = None;
        self.status = None;
        self.screen = Screen::LotSelect;
    }

    fn reload_records(&mut self) {
        if let Some(lot) = &self.selected_lot {
            match self.service.records(lot) {
                Ok(records) => self.records = records,
                Err(e) => self.status = Some(e.to_string()),
            }
        }
    }

    // --- Record table navigation ---

    pub fn next(&mut self) {
        if self.records.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i >= self.records.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.records.is_empty() {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.records.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    fn selected_record(&self) -> Option<&ReadingRecord> {
        self.table_state
            .selected()
            .and_then(|i| self.records.get(i))
    }

    // --- Entry line ---

    /// Open the entry line pre-filled from the lot's last record; only the
    /// current reading is left for the user to complete.
    pub fn enter_add_mode(&mut self) {
        let Some(lot) = &self.selected_lot else { return };
        let suggestion = match self.service.suggestion(lot) {
            Ok(s) => s,
            Err(e) => {
                self.status = Some(e.to_string());
                return;
            }
        };

        let mut prefill = format!("period:{}", suggestion.period);
        if let Some(previous) = suggestion.previous_reading {
            prefill.push_str(&format!(" previous:{}", previous));
        }
        if let Some(tariff) = suggestion.tariff {
            prefill.push_str(&format!(" tariff:{}", tariff));
        }
        prefill.push_str(" current:");

        self.input = prefill;
        self.cursor_position = self.input.chars().count();
        self.editing = None;
        self.input_mode = InputMode::Editing;
        self.status = None;
    }

    pub fn enter_edit_mode(&mut self) {
        if !self.capabilities().can_edit {
            return;
        }
        let Some(record) = self.selected_record() else { return };
        let id = record.id;
        let line = format!(
            "period:{} previous:{} current:{} tariff:{}",
            record.period, record.previous_reading, record.current_reading, record.tariff
        );
        self.input = line;
        self.editing = Some(id);
        self.cursor_position = self.input.chars().count();
        self.input_mode = InputMode::Editing;
        self.status = None;
    }

    pub fn exit_input_mode(&mut self) {
        self.input.clear();
        self.cursor_position = 0;
        self.editing = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn input_char(&mut self, c: char) {
        let byte_index = self
            .input
            .chars()
            .take(self.cursor_position)
            .map(|c| c.len_utf8())
            .sum();
        self.input.insert(byte_index, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let byte_index: usize = self
                .input
                .chars()
                .take(self.cursor_position - 1)
                .map(|c| c.len_utf8())
                .sum();
            self.input.remove(byte_index);
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }

    pub fn submit_entry(&mut self) {
        let Some(lot) = self.selected_lot.clone() else { return };
        let args: Vec<String> = self
            .input
            .split_whitespace()
            .map(|s| s.to_string())
            .collect();
        let fields = match normalize_fields(parse_entry_args(&args).fields) {
            Ok(fields) => fields,
            Err(e) => {
                self.status = Some(e.to_string());
                return;
            }
        };
        let draft = match draft_from_fields(&fields) {
            Ok(draft) => draft,
            Err(e) => {
                self.status = Some(e.to_string());
                return;
            }
        };

        let result = match self.editing {
            Some(id) => self.service.edit_record(&lot, id, &draft),
            None => self.service.add_record(&lot, &draft),
        };
        match result {
            Ok(record) => {
                self.status = Some(format!(
                    "Saved {}: {:.2} m³, R$ {:.2}",
                    record.period.display_reversed(),
                    record.consumption,
                    record.cost
                ));
                self.exit_input_mode();
                self.reload_records();
                if !self.records.is_empty() {
                    self.table_state.select(Some(self.records.len() - 1));
                }
            }
            // Keep the line so the user can fix it in place.
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    // --- Delete (two-step, standing in for the confirm dialog) ---

    pub fn request_delete(&mut self) {
        if !self.capabilities().can_edit {
            return;
        }
        if let Some(record) = self.selected_record() {
            let (id, period) = (record.id, record.period);
            self.pending_delete = Some(id);
            self.status = Some(format!(
                "Remove {}? Press y to confirm.",
                period.display_reversed()
            ));
        }
    }

    pub fn confirm_delete(&mut self) {
        let Some(id) = self.pending_delete.take() else { return };
        let Some(lot) = self.selected_lot.clone() else { return };
        let selected = self.table_state.selected();

        match self.service.delete_record(&lot, id) {
            Ok(()) => {
                self.status = Some("Record removed.".to_string());
                self.reload_records();
                if self.records.is_empty() {
                    self.table_state.select(None);
                } else if let Some(i) = selected {
                    self.table_state.select(Some(i.min(self.records.len() - 1)));
                }
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    pub fn cancel_delete(&mut self) {
        if self.pending_delete.take().is_some() {
            self.status = Some("Removal cancelled.".to_string());
        }
    }

    // --- Export ---

    pub fn export_selected_lot(&mut self) {
        if !self.capabilities().can_view_dashboard {
            return;
        }
        let Some(lot) = &self.selected_lot else { return };
        if self.records.is_empty() {
            self.status = Some("No records to export.".to_string());
            return;
        }
        let path = report_file_name(lot);
        let result = csv_report(lot, &self.records).and_then(|csv| Ok(fs::write(&path, csv)?));
        match result {
            Ok(()) => self.status = Some(format!("Report written to {}", path)),
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    // --- Dashboard ---

    pub fn open_dashboard(&mut self) {
        if !self.capabilities().can_view_dashboard {
            return;
        }
        self.screen = Screen::Dashboard;
        self.refresh_dashboard();
    }

    pub fn refresh_dashboard(&mut self) {
        match self.service.ledger() {
            Ok(ledger) => {
                let data = hidrotrack_core::compute_dashboard(&ledger);
                self.ranking_state = TableState::default();
                if !data.ranking.is_empty() {
                    self.ranking_state.select(Some(0));
                }
                self.dashboard = Some(data);
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    pub fn ranking_next(&mut self) {
        let len = self
            .dashboard
            .as_ref()
            .map(|d| d.ranking.len())
            .unwrap_or(0);
        if len == 0 {
            return;
        }
        let i = match self.ranking_state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.ranking_state.select(Some(i));
    }

    pub fn ranking_previous(&mut self) {
        let len = self
            .dashboard
            .as_ref()
            .map(|d| d.ranking.len())
            .unwrap_or(0);
        if len == 0 {
            return;
        }
        let i = match self.ranking_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.ranking_state.select(Some(i));
    }

    /// Jump from a ranking row to that lot's records.
    pub fn open_ranked_lot(&mut self) {
        let lot = self
            .ranking_state
            .selected()
            .and_then(|i| self.dashboard.as_ref().and_then(|d| d.ranking.get(i)))
            .map(|entry| entry.lot.clone());
        if let Some(lot) = lot {
            self.lot_input = lot.to_string();
            self.submit_lot();
        }
    }
}
