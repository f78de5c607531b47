use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use docsmith_config::Config;
use docsmith_engine::editing::GenerationTicket;
use docsmith_engine::export::{export_file_name, to_markup};
use docsmith_engine::generation::{CommandGenerator, GenerationError, TextGenerator, Unconfigured};
use docsmith_engine::models::attachments::data_uri_from_path;
use docsmith_engine::{
    Editor, FileStore, InsertionPoint, NoMath, Template, builtin_templates, render_document,
};
use ratatui::widgets::ListState;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;

const PREVIEW_FILE_NAME: &str = "preview.html";

type GenerationResult = (GenerationTicket, Result<String, GenerationError>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Picker,
    Editing,
    Versions,
    ConfirmRestore(String),
    ImagePath(String),
}

pub struct App {
    pub storage_path: PathBuf,
    pub templates: Vec<Template>,
    pub picker_state: ListState,
    pub version_state: ListState,
    pub editor: Editor<FileStore>,
    pub mode: Mode,
    pub message: Option<String>,
    pub should_quit: bool,
    generator: Option<CommandGenerator>,
    generation_tx: Sender<GenerationResult>,
    generation_rx: Receiver<GenerationResult>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let templates = builtin_templates();
        let mut picker_state = ListState::default();
        if !templates.is_empty() {
            picker_state.select(Some(0));
        }
        let (generation_tx, generation_rx) = channel();

        Self {
            storage_path: config.storage_path.clone(),
            templates,
            picker_state,
            version_state: ListState::default(),
            editor: Editor::with_system_clock(FileStore::new(&config.storage_path))
                .with_debounce_ms(config.debounce_ms),
            mode: Mode::Picker,
            message: None,
            should_quit: false,
            generator: config
                .generation
                .as_ref()
                .map(|g| CommandGenerator::new(g.command.clone(), g.args.clone())),
            generation_tx,
            generation_rx,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('q') {
            self.quit();
            return Ok(());
        }

        match self.mode.clone() {
            Mode::Picker => self.handle_picker_key(key),
            Mode::Editing => self.handle_editing_key(key, ctrl),
            Mode::Versions => self.handle_versions_key(key),
            Mode::ConfirmRestore(version_id) => self.handle_confirm_key(key, &version_id),
            Mode::ImagePath(path) => self.handle_image_path_key(key, path),
        }
    }

    /// Let a pending save fire and apply finished generations.
    pub fn tick(&mut self) {
        while let Ok((ticket, result)) = self.generation_rx.try_recv() {
            let section = ticket.section_id.clone();
            match self.editor.complete_generation(ticket, result) {
                Ok(true) => self.message = Some(format!("Generated text for {section}")),
                Ok(false) => {}
                Err(e) => self.report(e),
            }
        }

        if let Err(e) = self.editor.tick() {
            self.report(e);
        }
    }

    fn quit(&mut self) {
        if let Err(e) = self.editor.close() {
            log::error!("Failed to save on quit: {e}");
        }
        self.should_quit = true;
    }

    fn report(&mut self, error: impl std::fmt::Display) {
        log::error!("{error}");
        self.message = Some(format!("Error: {error}"));
    }

    // ---- picker ----------------------------------------------------------

    fn handle_picker_key(&mut self, key: KeyEvent) -> Result<()> {
        let count = self.templates.len();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') if count > 0 => {
                let i = self.picker_state.selected().map_or(0, |i| (i + 1) % count);
                self.picker_state.select(Some(i));
            }
            KeyCode::Up | KeyCode::Char('k') if count > 0 => {
                let i = self
                    .picker_state
                    .selected()
                    .map_or(0, |i| if i == 0 { count - 1 } else { i - 1 });
                self.picker_state.select(Some(i));
            }
            KeyCode::Enter => {
                if let Some(template) = self
                    .picker_state
                    .selected()
                    .and_then(|i| self.templates.get(i))
                    .cloned()
                {
                    self.editor.select_template(template)?;
                    self.mode = Mode::Editing;
                    self.message = None;
                }
            }
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            _ => {}
        }
        Ok(())
    }

    // ---- editing ---------------------------------------------------------

    fn handle_editing_key(&mut self, key: KeyEvent, ctrl: bool) -> Result<()> {
        if ctrl {
            match key.code {
                KeyCode::Char('s') => self.save_version(),
                KeyCode::Char('v') => {
                    self.version_state
                        .select(self.editor.versions().next().map(|_| 0));
                    self.mode = Mode::Versions;
                }
                KeyCode::Char('o') => self.mode = Mode::ImagePath(String::new()),
                KeyCode::Char('g') => self.start_generation(),
                KeyCode::Char('e') => self.export(),
                KeyCode::Char('p') => self.write_preview(),
                _ => {}
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Tab => self.cycle_section(1),
            KeyCode::BackTab => self.cycle_section(-1),
            KeyCode::Esc => {
                self.editor.close()?;
                self.mode = Mode::Picker;
                self.message = None;
            }
            KeyCode::Enter => {
                if self.editor.active_section().is_some_and(|s| s.is_multi_line()) {
                    self.edit_active(|text| text.push('\n'))?;
                }
            }
            KeyCode::Backspace => self.edit_active(|text| {
                text.pop();
            })?,
            KeyCode::Char(c) => self.edit_active(|text| text.push(c))?,
            _ => {}
        }
        Ok(())
    }

    fn edit_active(&mut self, edit: impl FnOnce(&mut String)) -> Result<()> {
        let (Some(section), Some(document)) = (self.editor.active_section(), self.editor.document())
        else {
            return Ok(());
        };
        let id = section.id.clone();
        let mut text = document.value(&id).to_string();
        edit(&mut text);
        self.editor.set_section_value(&id, text)?;
        Ok(())
    }

    fn cycle_section(&mut self, step: isize) {
        let Some(template) = self.editor.template() else {
            return;
        };
        let count = template.sections.len() as isize;
        if count == 0 {
            return;
        }
        let current = self
            .editor
            .active_section()
            .and_then(|s| template.section_index(&s.id))
            .unwrap_or(0) as isize;
        let next = (current + step).rem_euclid(count) as usize;
        let id = template.sections[next].id.clone();
        if let Err(e) = self.editor.set_active_section(&id) {
            self.report(e);
        }
    }

    fn save_version(&mut self) {
        match self.editor.save_version(None) {
            Ok(_) => self.message = Some("Saved version".to_string()),
            Err(e) => self.report(e),
        }
    }

    fn start_generation(&mut self) {
        let Some(section_id) = self.editor.active_section().map(|s| s.id.clone()) else {
            return;
        };

        let Some(generator) = self.generator.clone() else {
            if let Err(e) = self.editor.generate(&Unconfigured, &section_id) {
                self.report(e);
            }
            return;
        };

        match self.editor.begin_generation(&section_id) {
            Ok(ticket) => {
                let tx = self.generation_tx.clone();
                thread::spawn(move || {
                    let result = generator.generate(&ticket.request);
                    // Receiver gone means the app is shutting down.
                    let _ = tx.send((ticket, result));
                });
                self.message = Some(format!("Generating {section_id}..."));
            }
            Err(e) => self.report(e),
        }
    }

    fn export(&mut self) {
        let (Some(template), Some(document)) = (self.editor.template(), self.editor.document())
        else {
            return;
        };
        let path = self.storage_path.join(export_file_name(template));
        let markup = to_markup(template, document.values());
        self.write_output(&path, &markup, "Exported");
    }

    fn write_preview(&mut self) {
        let (Some(template), Some(document)) = (self.editor.template(), self.editor.document())
        else {
            return;
        };
        let path = self.storage_path.join(PREVIEW_FILE_NAME);
        let page = render_document(template, document, &NoMath).into_string();
        self.write_output(&path, &page, "Preview written");
    }

    fn write_output(&mut self, path: &Path, content: &str, done: &str) {
        let written = std::fs::create_dir_all(&self.storage_path)
            .and_then(|_| std::fs::write(path, content));
        match written {
            Ok(()) => {
                log::info!("{done}: {}", path.display());
                self.message = Some(format!("{done} to {}", path.display()));
            }
            Err(e) => self.report(format!("Failed to write {}: {e}", path.display())),
        }
    }

    // ---- versions --------------------------------------------------------

    fn handle_versions_key(&mut self, key: KeyEvent) -> Result<()> {
        let ids: Vec<String> = self.editor.versions().map(|v| v.id.clone()).collect();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') if !ids.is_empty() => {
                let i = self.version_state.selected().map_or(0, |i| (i + 1) % ids.len());
                self.version_state.select(Some(i));
            }
            KeyCode::Up | KeyCode::Char('k') if !ids.is_empty() => {
                let i = self
                    .version_state
                    .selected()
                    .map_or(0, |i| if i == 0 { ids.len() - 1 } else { i - 1 });
                self.version_state.select(Some(i));
            }
            KeyCode::Enter => {
                if let Some(id) = self.version_state.selected().and_then(|i| ids.get(i)) {
                    self.mode = Mode::ConfirmRestore(id.clone());
                }
            }
            KeyCode::Esc => self.mode = Mode::Editing,
            KeyCode::Char('v') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.mode = Mode::Editing
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_confirm_key(&mut self, key: KeyEvent, version_id: &str) -> Result<()> {
        let answer = match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => true,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => false,
            _ => return Ok(()),
        };

        if self.editor.restore_version(version_id, |_| answer)? {
            self.message = Some("Version restored".to_string());
            self.mode = Mode::Editing;
        } else {
            self.mode = Mode::Versions;
        }
        Ok(())
    }

    // ---- image insertion -------------------------------------------------

    fn handle_image_path_key(&mut self, key: KeyEvent, mut path: String) -> Result<()> {
        match key.code {
            KeyCode::Esc => self.mode = Mode::Editing,
            KeyCode::Backspace => {
                path.pop();
                self.mode = Mode::ImagePath(path);
            }
            KeyCode::Char(c) => {
                path.push(c);
                self.mode = Mode::ImagePath(path);
            }
            KeyCode::Enter => {
                self.mode = Mode::Editing;
                self.insert_image(Path::new(path.trim()));
            }
            _ => {}
        }
        Ok(())
    }

    fn insert_image(&mut self, path: &Path) {
        let payload = match data_uri_from_path(path) {
            Ok(payload) => payload,
            Err(e) => {
                self.report(format!("Failed to read {}: {e}", path.display()));
                return;
            }
        };
        let alt = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        match self.editor.insert_attachment(payload, &alt, InsertionPoint::End) {
            Ok(id) => self.message = Some(format!("Inserted {id}")),
            Err(e) => self.report(e),
        }
    }
}
