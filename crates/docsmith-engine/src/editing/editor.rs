use std::collections::BTreeSet;

use super::{DEFAULT_DEBOUNCE_MS, Debouncer, InsertionPoint, SaveStatus, splice};
use crate::clock::{Clock, SystemClock};
use crate::diagram::{self, DiagramAction, DiagramSession, ProtocolError};
use crate::generation::{GenerationError, GenerationRequest, TextGenerator, append_generated};
use crate::io::{KeyValueStore, Persistence, StoreError};
use crate::models::{AttachmentId, Document, SectionDef, Template, Version, reference_tag};

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("No document is open")]
    NoDocument,
    #[error("No section is active")]
    NoActiveSection,
    #[error("Unknown section: {0}")]
    UnknownSection(String),
    #[error("Unknown version: {0}")]
    UnknownVersion(String),
    #[error("Generation already running for section {0}")]
    GenerationInFlight(String),
    #[error("Diagram editor is not open")]
    NoDiagramSession,
    #[error("Failed to persist document: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Handle for an in-flight generation, bound to the session that started it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTicket {
    epoch: u64,
    pub section_id: String,
    pub request: GenerationRequest,
}

/// A failed generation, shown next to its section until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationFailure {
    pub section_id: String,
    pub error: GenerationError,
}

/// The open document and everything scoped to its lifetime.
#[derive(Debug)]
struct Session {
    epoch: u64,
    template: Template,
    document: Document,
    status: SaveStatus,
    debouncer: Debouncer,
    active_section: Option<String>,
    generating: BTreeSet<String>,
    generation_failure: Option<GenerationFailure>,
    diagram: Option<DiagramSession>,
}

impl Session {
    fn require_section(&self, section_id: &str) -> Result<&SectionDef, EditorError> {
        self.template
            .section(section_id)
            .ok_or_else(|| EditorError::UnknownSection(section_id.to_string()))
    }

    fn mark_dirty(&mut self, now_ms: u64) {
        self.status = self.status.on_mutation();
        self.debouncer.arm(now_ms);
        self.status = self.status.on_timer_armed();
    }
}

/// Section editor controller.
///
/// Owns the open document session, routes edits into the document model and
/// drives debounced persistence. Time comes from the injected clock; callers
/// invoke [`Editor::tick`] from their event loop to let pending saves fire.
pub struct Editor<S, C = SystemClock> {
    persistence: Persistence<S>,
    clock: C,
    debounce_ms: u64,
    epoch: u64,
    session: Option<Session>,
}

impl<S: KeyValueStore> Editor<S, SystemClock> {
    pub fn with_system_clock(store: S) -> Self {
        Self::new(store, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> Editor<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self {
            persistence: Persistence::new(store),
            clock,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            epoch: 0,
            session: None,
        }
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    fn session(&self) -> Result<&Session, EditorError> {
        self.session.as_ref().ok_or(EditorError::NoDocument)
    }

    fn session_mut(&mut self) -> Result<&mut Session, EditorError> {
        self.session.as_mut().ok_or(EditorError::NoDocument)
    }

    // ---- lifecycle -------------------------------------------------------

    /// Open a document for `template`.
    ///
    /// The persisted document is rehydrated only when it was written for
    /// the same template; otherwise the document starts empty. Any open
    /// session is closed first.
    pub fn select_template(&mut self, template: Template) -> Result<&Document, EditorError> {
        if self.session.is_some() {
            self.close()?;
        }

        let now = self.clock.now_ms();
        let document = match self.persistence.load() {
            Some(mut stored) if stored.template_id() == template.id => {
                log::info!("Rehydrated document for template {}", template.id);
                stored.touch(now);
                stored
            }
            _ => {
                log::info!("Starting new document for template {}", template.id);
                Document::new(&template.id, now)
            }
        };

        self.epoch += 1;
        let active_section = template.sections.first().map(|s| s.id.clone());
        let session = self.session.insert(Session {
            epoch: self.epoch,
            template,
            document,
            status: SaveStatus::Clean,
            debouncer: Debouncer::new(self.debounce_ms),
            active_section,
            generating: BTreeSet::new(),
            generation_failure: None,
            diagram: None,
        });
        Ok(&session.document)
    }

    /// End the session, writing any pending changes first.
    ///
    /// The session is dropped even if that final write fails; the error is
    /// returned so the caller can report it.
    pub fn close(&mut self) -> Result<(), EditorError> {
        let flushed = self.flush().map(|_| ());
        if let Some(session) = self.session.take() {
            log::info!("Closed document for template {}", session.template.id);
        }
        flushed
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn document(&self) -> Option<&Document> {
        self.session.as_ref().map(|s| &s.document)
    }

    pub fn template(&self) -> Option<&Template> {
        self.session.as_ref().map(|s| &s.template)
    }

    pub fn status(&self) -> Option<SaveStatus> {
        self.session.as_ref().map(|s| s.status)
    }

    // ---- sections --------------------------------------------------------

    pub fn active_section(&self) -> Option<&SectionDef> {
        let session = self.session.as_ref()?;
        let id = session.active_section.as_deref()?;
        session.template.section(id)
    }

    pub fn set_active_section(&mut self, section_id: &str) -> Result<(), EditorError> {
        let session = self.session_mut()?;
        session.require_section(section_id)?;
        session.active_section = Some(section_id.to_string());
        Ok(())
    }

    /// Replace a section's text. Any string is accepted.
    pub fn set_section_value(
        &mut self,
        section_id: &str,
        text: impl Into<String>,
    ) -> Result<(), EditorError> {
        let now = self.clock.now_ms();
        let session = self.session_mut()?;
        session.require_section(section_id)?;
        session.document.set_section_value(section_id, text, now);
        session.mark_dirty(now);
        Ok(())
    }

    /// Store a payload and splice its reference tag into the active section.
    pub fn insert_attachment(
        &mut self,
        payload: impl Into<String>,
        alt: &str,
        at: InsertionPoint,
    ) -> Result<AttachmentId, EditorError> {
        let section_id = self
            .session()?
            .active_section
            .clone()
            .ok_or(EditorError::NoActiveSection)?;
        self.insert_attachment_into(&section_id, payload, alt, at)
    }

    fn insert_attachment_into(
        &mut self,
        section_id: &str,
        payload: impl Into<String>,
        alt: &str,
        at: InsertionPoint,
    ) -> Result<AttachmentId, EditorError> {
        let now = self.clock.now_ms();
        let session = self.session_mut()?;
        session.require_section(section_id)?;

        let id = session.document.insert_attachment(payload, now);
        session.mark_dirty(now);

        let text = splice(session.document.value(section_id), &reference_tag(alt, &id), at);
        self.set_section_value(section_id, text)?;
        Ok(id)
    }

    // ---- versions --------------------------------------------------------

    /// Snapshot the document into its version history and persist at once,
    /// bypassing the debounce. Returns the new version's id.
    pub fn save_version(&mut self, name: Option<String>) -> Result<String, EditorError> {
        let now = self.clock.now_ms();
        let session = self.session.as_mut().ok_or(EditorError::NoDocument)?;
        let id = session.document.save_version(name, now).id.clone();

        match self.persistence.save(&session.document) {
            Ok(()) => {
                session.debouncer.cancel();
                session.status = session.status.on_written();
                log::info!("Saved version {id}");
                Ok(id)
            }
            Err(e) => {
                session.mark_dirty(now);
                Err(e.into())
            }
        }
    }

    pub fn versions(&self) -> impl Iterator<Item = &Version> {
        self.session
            .iter()
            .flat_map(|s| s.document.history().iter())
    }

    /// Restore a version after `confirm` approves it.
    ///
    /// Returns `Ok(false)` without touching anything when confirmation is
    /// declined. The version list itself is never modified.
    pub fn restore_version(
        &mut self,
        version_id: &str,
        confirm: impl FnOnce(&Version) -> bool,
    ) -> Result<bool, EditorError> {
        let now = self.clock.now_ms();
        let session = self.session_mut()?;
        let version = session
            .document
            .history()
            .get(version_id)
            .ok_or_else(|| EditorError::UnknownVersion(version_id.to_string()))?;

        if !confirm(version) {
            return Ok(false);
        }

        session.document.restore_version(version_id, now);
        session.mark_dirty(now);
        log::info!("Restored version {version_id}");
        Ok(true)
    }

    // ---- persistence -----------------------------------------------------

    /// Write the document if the debounce period has elapsed. Returns
    /// whether a write happened.
    pub fn tick(&mut self) -> Result<bool, EditorError> {
        let now = self.clock.now_ms();
        let Some(session) = self.session.as_mut() else {
            return Ok(false);
        };
        if !session.debouncer.fire(now) {
            return Ok(false);
        }
        Self::write(&mut self.persistence, session)?;
        Ok(true)
    }

    /// Write immediately if there are unsaved changes.
    pub fn flush(&mut self) -> Result<bool, EditorError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(false);
        };
        if !session.status.has_unsaved_changes() {
            return Ok(false);
        }
        session.debouncer.cancel();
        Self::write(&mut self.persistence, session)?;
        Ok(true)
    }

    fn write(persistence: &mut Persistence<S>, session: &mut Session) -> Result<(), EditorError> {
        match persistence.save(&session.document) {
            Ok(()) => {
                session.status = session.status.on_written();
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to save document: {e}");
                session.status = session.status.on_write_failed();
                Err(e.into())
            }
        }
    }

    /// Milliseconds until a pending save fires.
    pub fn next_save_in(&self) -> Option<u64> {
        let session = self.session.as_ref()?;
        session.debouncer.remaining(self.clock.now_ms())
    }

    // ---- generation ------------------------------------------------------

    /// Mark a section as generating and describe what to ask for.
    pub fn begin_generation(&mut self, section_id: &str) -> Result<GenerationTicket, EditorError> {
        let session = self.session_mut()?;
        let section = session.require_section(section_id)?;
        let request = GenerationRequest {
            context_label: session.template.name.clone(),
            section_label: section.label.clone(),
            prompt: section
                .ai_prompt
                .clone()
                .unwrap_or_else(|| format!("Write the {} section.", section.label)),
        };

        if !session.generating.insert(section_id.to_string()) {
            return Err(EditorError::GenerationInFlight(section_id.to_string()));
        }
        if session
            .generation_failure
            .as_ref()
            .is_some_and(|f| f.section_id == section_id)
        {
            session.generation_failure = None;
        }

        Ok(GenerationTicket {
            epoch: session.epoch,
            section_id: section_id.to_string(),
            request,
        })
    }

    /// Apply a generation result. Returns whether text was written.
    ///
    /// Results for a session that has since been closed are discarded.
    pub fn complete_generation(
        &mut self,
        ticket: GenerationTicket,
        result: Result<String, GenerationError>,
    ) -> Result<bool, EditorError> {
        let Some(session) = self.session.as_mut().filter(|s| s.epoch == ticket.epoch) else {
            log::warn!(
                "Discarding generation result for section {}: document closed",
                ticket.section_id
            );
            return Ok(false);
        };
        session.generating.remove(&ticket.section_id);

        match result {
            Ok(text) => {
                let combined = append_generated(session.document.value(&ticket.section_id), &text);
                self.set_section_value(&ticket.section_id, combined)?;
                Ok(true)
            }
            Err(error) => {
                log::warn!("Generation failed for section {}: {error}", ticket.section_id);
                session.generation_failure = Some(GenerationFailure {
                    section_id: ticket.section_id,
                    error,
                });
                Ok(false)
            }
        }
    }

    /// Run a generator synchronously for one section.
    pub fn generate(
        &mut self,
        generator: &dyn TextGenerator,
        section_id: &str,
    ) -> Result<bool, EditorError> {
        let ticket = self.begin_generation(section_id)?;
        let result = generator.generate(&ticket.request);
        self.complete_generation(ticket, result)
    }

    pub fn is_generating(&self, section_id: &str) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.generating.contains(section_id))
    }

    pub fn generation_failure(&self) -> Option<&GenerationFailure> {
        self.session.as_ref()?.generation_failure.as_ref()
    }

    pub fn dismiss_generation_failure(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.generation_failure = None;
        }
    }

    // ---- diagram editor --------------------------------------------------

    /// Open the diagram editor; its export lands in the active section.
    pub fn open_diagram(&mut self, alt: &str, at: InsertionPoint) -> Result<(), EditorError> {
        let session = self.session_mut()?;
        let section_id = session
            .active_section
            .clone()
            .ok_or(EditorError::NoActiveSection)?;
        session.diagram = Some(DiagramSession::new(&section_id, alt, at));
        Ok(())
    }

    pub fn is_diagram_open(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.diagram.is_some())
    }

    /// Handle one JSON message from the diagram editor and return the JSON
    /// commands to send back.
    pub fn handle_diagram_message(&mut self, raw: &str) -> Result<Vec<String>, EditorError> {
        let event = diagram::parse_event(raw)?;
        let diagram = self
            .session()?
            .diagram
            .clone()
            .ok_or(EditorError::NoDiagramSession)?;

        let mut replies = Vec::new();
        for action in diagram.handle(event) {
            match action {
                DiagramAction::Send(command) => replies.push(command.to_json()?),
                DiagramAction::StoreAttachment(payload) => {
                    self.insert_attachment_into(
                        &diagram.section_id,
                        payload,
                        &diagram.alt,
                        diagram.at,
                    )?;
                }
                DiagramAction::Close => {
                    self.session_mut()?.diagram = None;
                }
            }
        }
        Ok(replies)
    }
}
