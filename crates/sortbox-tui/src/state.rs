use crate::Config;
use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{layout::Rect, widgets::TableState};
use sortbox_core::{Record, Sandbox, SortKey, SwapOutcome};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub struct App {
    pub sandbox: Sandbox,
    pub snapshot_path: PathBuf,
    pub table_state: TableState,
    pub show_help: bool,
    pub last_error: Option<String>,
    pub last_notice: Option<String>,
    pub list_area: Option<Rect>,
    pub weight_areas: Vec<(SortKey, Rect)>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let sandbox = Sandbox::new(config.sandbox.clone());
        let mut table_state = TableState::default();
        if !sandbox.is_empty() {
            table_state.select(Some(0));
        }
        Self {
            sandbox,
            snapshot_path: config.snapshot_path.clone(),
            table_state,
            show_help: false,
            last_error: None,
            last_notice: None,
            list_area: None,
            weight_areas: Vec::new(),
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn records(&self) -> &[Record] {
        self.sandbox.sorted_records()
    }

    pub fn selected_record(&self) -> Option<&Record> {
        let idx = self.table_state.selected()?;
        self.records().get(idx)
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Esc => {
                if self.show_help {
                    self.show_help = false;
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Char('?') => {
                self.show_help = !self.show_help;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection(1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection(-1);
            }
            KeyCode::Char('a') => {
                self.add_record();
            }
            KeyCode::Char('x') | KeyCode::Enter => {
                self.acknowledge_selected();
            }
            KeyCode::Char(ch @ '1'..='3') => {
                let slot = ch as usize - '1' as usize;
                self.select_weight_slot(slot);
            }
            KeyCode::Char('R') => {
                self.reset();
            }
            KeyCode::Char('y') => {
                self.export_snapshot();
            }
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, event: MouseEvent) {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.handle_left_click(event.column, event.row);
            }
            MouseEventKind::ScrollUp => {
                self.move_selection(-1);
            }
            MouseEventKind::ScrollDown => {
                self.move_selection(1);
            }
            _ => {}
        }
    }

    pub fn update_layout(&mut self, list_area: Option<Rect>, weight_areas: Vec<(SortKey, Rect)>) {
        self.list_area = list_area;
        self.weight_areas = weight_areas;
    }

    pub fn add_record(&mut self) {
        let id = self.sandbox.add_record();
        self.restore_selection(Some(id));
        self.set_notice(format!("added record {id}"));
    }

    /// Acknowledges the selected record when it is still new. Other
    /// statuses have no action.
    pub fn acknowledge_selected(&mut self) {
        let Some(record) = self.selected_record() else {
            return;
        };
        if !record.status.is_actionable() {
            return;
        }
        let id = record.id;
        self.sandbox.acknowledge_record(id);
        self.restore_selection(Some(id));
        self.set_notice(format!("record {id} acknowledged"));
    }

    /// Runs the swap protocol on the key currently shown in `slot`.
    pub fn select_weight_slot(&mut self, slot: usize) {
        let Some(key) = self.sandbox.weight_order().keys().get(slot).copied() else {
            return;
        };
        self.select_weight(key);
    }

    pub fn select_weight(&mut self, key: SortKey) {
        let selected = self.selected_record().map(|record| record.id);
        let outcome = self.sandbox.arm_or_swap_weight(key);
        self.restore_selection(selected);
        self.set_notice(match outcome {
            SwapOutcome::Armed(key) => format!("{key} selected, pick a key to swap with"),
            SwapOutcome::Swapped { first, second } => format!("swapped {first} and {second}"),
            SwapOutcome::Unchanged(key) => format!("{key} deselected"),
        });
    }

    pub fn reset(&mut self) {
        self.sandbox.reset_all();
        self.table_state = TableState::default();
        self.restore_selection(None);
        self.set_notice("records reset".to_string());
    }

    pub fn export_snapshot(&mut self) {
        let result = self
            .sandbox
            .snapshot()
            .to_json_pretty()
            .context("Failed to serialize snapshot")
            .and_then(|json| write_atomic(&self.snapshot_path, &json));
        match result {
            Ok(()) => {
                info!(event = "snapshot_written", path = %self.snapshot_path.display());
                self.set_notice(format!(
                    "snapshot written to {}",
                    self.snapshot_path.display()
                ));
            }
            Err(err) => {
                warn!(event = "snapshot_error", error = %err);
                self.last_error = Some(format!("{err:#}"));
            }
        }
    }

    /// A successful intent supersedes any earlier error.
    fn set_notice(&mut self, notice: String) {
        self.last_error = None;
        self.last_notice = Some(notice);
    }

    /// Keeps the cursor on the record with `id` after a re-sort, falling
    /// back to clamping the previous index.
    fn restore_selection(&mut self, id: Option<u32>) {
        let len = self.records().len();
        if len == 0 {
            self.table_state.select(None);
            return;
        }

        if let Some(id) = id {
            if let Some(idx) = self.records().iter().position(|record| record.id == id) {
                self.table_state.select(Some(idx));
                return;
            }
        }

        match self.table_state.selected() {
            Some(index) if index < len => {}
            Some(_) => self.table_state.select(Some(len - 1)),
            None => self.table_state.select(Some(0)),
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.records().len() as isize;
        if len == 0 {
            return;
        }

        let current = self.table_state.selected().unwrap_or(0) as isize;
        let mut next = current + delta;
        if next < 0 {
            next = len - 1;
        }
        if next >= len {
            next = 0;
        }
        self.table_state.select(Some(next as usize));
    }

    fn handle_left_click(&mut self, column: u16, row: u16) {
        let clicked_weight = self
            .weight_areas
            .iter()
            .find(|(_, area)| contains(*area, column, row))
            .map(|(key, _)| *key);
        if let Some(key) = clicked_weight {
            self.select_weight(key);
            return;
        }

        let Some(area) = self.list_area else {
            return;
        };
        let Some(idx) = self.row_from_coords(area, column, row) else {
            return;
        };
        if idx >= self.records().len() {
            return;
        }
        if self.table_state.selected() == Some(idx) {
            self.acknowledge_selected();
        } else {
            self.table_state.select(Some(idx));
        }
    }

    fn row_from_coords(&self, area: Rect, column: u16, row: u16) -> Option<usize> {
        if !contains(area, column, row) {
            return None;
        }

        // top border plus header row
        let header_height = 2u16;
        if area.height <= header_height + 1 {
            return None;
        }

        let data_start = area.y.saturating_add(header_height);
        let data_end = area.y.saturating_add(area.height.saturating_sub(1));
        if row < data_start || row >= data_end {
            return None;
        }

        let row_index = (row - data_start) as usize;
        Some(self.table_state.offset() + row_index)
    }

    pub fn status_line(&self) -> String {
        let armed = self
            .sandbox
            .armed_key()
            .map(|key| key.as_str())
            .unwrap_or("-");
        let mut line = format!(
            "records: {} | order: {} | armed: {}",
            self.sandbox.len(),
            self.sandbox.weight_order().label(),
            armed
        );
        if let Some(error) = &self.last_error {
            line.push_str(&format!(" | error: {error}"));
        } else if let Some(notice) = &self.last_notice {
            line.push_str(&format!(" | {notice}"));
        }
        line
    }
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

fn write_atomic(path: &Path, payload: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create parent directory {}", parent.display())
            })?;
        }
    }

    let temp_path = match path.file_name() {
        Some(name) => path.with_file_name(format!("{}.tmp", name.to_string_lossy())),
        None => path.with_extension("tmp"),
    };

    std::fs::write(&temp_path, payload)
        .with_context(|| format!("Failed to write temp file {}", temp_path.display()))?;
    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use sortbox_core::{SandboxConfig, Snapshot, Status, WeightOrder};

    fn unique_temp_path(prefix: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "sortbox-{prefix}-{}-{}.json",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0)
        ));
        path
    }

    fn test_config() -> Config {
        Config {
            sandbox: SandboxConfig {
                rng_seed: Some(31),
                ..SandboxConfig::default()
            },
            snapshot_path: unique_temp_path("snapshot"),
            log_file: None,
            debug: false,
        }
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn click(app: &mut App, column: u16, row: u16) {
        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        });
    }

    #[test]
    fn add_key_appends_and_selects_new_record() {
        let mut app = App::new(&test_config());
        press(&mut app, KeyCode::Char('a'));

        assert_eq!(app.records().len(), 4);
        let selected = app.selected_record().expect("selection");
        assert_eq!(selected.id, 3);
        assert_eq!(selected.status, Status::NEW);
    }

    #[test]
    fn acknowledge_key_only_acts_on_new_records() {
        let mut app = App::new(&test_config());
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Char('x'));

        let record = app.sandbox.get(3).expect("record");
        assert_eq!(record.status, Status::ACKNOWLEDGED);
        assert_eq!(app.selected_record().map(|r| r.id), Some(3));

        let before = app.sandbox.snapshot();
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.sandbox.snapshot(), before);
    }

    #[test]
    fn digit_keys_swap_weight_slots() {
        let mut app = App::new(&test_config());
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.sandbox.armed_key(), Some(SortKey::Status));

        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.sandbox.armed_key(), None);
        assert_eq!(
            app.sandbox.weight_order().keys(),
            [SortKey::Time, SortKey::Priority, SortKey::Status]
        );
        assert!(app.status_line().contains("order: time > priority > status"));
    }

    #[test]
    fn clicking_weight_boxes_runs_swap_protocol() {
        let mut app = App::new(&test_config());
        app.update_layout(
            None,
            vec![
                (SortKey::Status, Rect::new(0, 0, 10, 3)),
                (SortKey::Priority, Rect::new(0, 3, 10, 3)),
                (SortKey::Time, Rect::new(0, 6, 10, 3)),
            ],
        );

        click(&mut app, 2, 4);
        assert_eq!(app.sandbox.armed_key(), Some(SortKey::Priority));
        click(&mut app, 2, 7);
        assert_eq!(
            app.sandbox.weight_order().keys(),
            [SortKey::Status, SortKey::Time, SortKey::Priority]
        );
    }

    #[test]
    fn clicking_selected_row_acknowledges_it() {
        let mut app = App::new(&test_config());
        press(&mut app, KeyCode::Char('a'));
        app.update_layout(Some(Rect::new(30, 0, 40, 12)), Vec::new());

        let idx = app.table_state.selected().expect("selection") as u16;
        click(&mut app, 35, 2 + idx);
        assert_eq!(
            app.sandbox.get(3).map(|r| r.status),
            Some(Status::ACKNOWLEDGED)
        );
    }

    #[test]
    fn reset_keeps_weight_order() {
        let mut app = App::new(&test_config());
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Char('a'));
        let order = app.sandbox.weight_order();

        press(&mut app, KeyCode::Char('R'));
        assert_eq!(app.records().len(), 3);
        assert_eq!(app.sandbox.weight_order(), order);
        assert_eq!(app.table_state.selected(), Some(0));
    }

    #[test]
    fn escape_closes_help_before_quitting() {
        let mut app = App::new(&test_config());
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);

        press(&mut app, KeyCode::Esc);
        assert!(!app.show_help);
        assert!(!app.should_quit());

        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit());
    }

    #[test]
    fn export_writes_snapshot_json() {
        let config = test_config();
        let mut app = App::new(&config);
        press(&mut app, KeyCode::Char('y'));

        let content = std::fs::read_to_string(&config.snapshot_path).expect("snapshot file");
        let snapshot: Snapshot = serde_json::from_str(&content).expect("decode snapshot");
        assert_eq!(snapshot.weight_order, WeightOrder::default());
        assert_eq!(snapshot.records, app.records());
        assert!(app.last_error.is_none());

        let _ = std::fs::remove_file(&config.snapshot_path);
    }

    #[test]
    fn export_failure_is_reported_in_status_line() {
        let mut config = test_config();
        let blocker = unique_temp_path("blocker");
        std::fs::write(&blocker, "not a directory").expect("write blocker");
        config.snapshot_path = blocker.join("snapshot.json");

        let mut app = App::new(&config);
        press(&mut app, KeyCode::Char('y'));
        assert!(app.last_error.is_some());
        assert!(app.status_line().contains("error:"));

        let _ = std::fs::remove_file(&blocker);
    }

    #[test]
    fn later_intent_clears_export_error() {
        let mut config = test_config();
        let blocker = unique_temp_path("stale-error");
        std::fs::write(&blocker, "not a directory").expect("write blocker");
        config.snapshot_path = blocker.join("snapshot.json");

        let mut app = App::new(&config);
        press(&mut app, KeyCode::Char('y'));
        assert!(app.last_error.is_some());

        press(&mut app, KeyCode::Char('a'));
        assert!(app.last_error.is_none());
        assert!(app.status_line().contains("added record 3"));
        assert!(!app.status_line().contains("error:"));

        let _ = std::fs::remove_file(&blocker);
    }
}
