//! Message protocol of the embedded diagram editor.
//!
//! The editor runs out of process and talks JSON. Inbound messages carry an
//! `event` tag, outbound commands an `action` tag. [`DiagramSession::handle`]
//! is the dispatch table from inbound event to the actions the host takes.

use serde::{Deserialize, Serialize};

use crate::editing::InsertionPoint;
use crate::models::is_data_uri;

/// Format requested when asking the diagram editor for its payload.
pub const EXPORT_FORMAT: &str = "xmlpng";

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Malformed diagram message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Messages sent by the diagram editor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum InboundEvent {
    /// The editor asks for its configuration.
    Configure,
    /// The editor finished loading.
    Init,
    /// Final diagram payload as a data URI.
    Export {
        data: String,
        #[serde(default)]
        format: Option<String>,
    },
    /// The user pressed save inside the editor.
    Save {
        #[serde(default)]
        xml: Option<String>,
    },
    /// The user closed the editor.
    Exit {
        #[serde(default)]
        modified: bool,
    },
}

/// Options sent in reply to [`InboundEvent::Configure`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramOptions {
    pub compress_xml: bool,
    pub default_format: String,
}

impl Default for DiagramOptions {
    fn default() -> Self {
        Self {
            compress_xml: false,
            default_format: EXPORT_FORMAT.to_string(),
        }
    }
}

/// Commands sent to the diagram editor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum OutboundCommand {
    Configure { config: DiagramOptions },
    Export { format: String },
}

impl OutboundCommand {
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// What the host should do in response to an inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramAction {
    Send(OutboundCommand),
    StoreAttachment(String),
    Close,
}

pub fn parse_event(raw: &str) -> Result<InboundEvent, ProtocolError> {
    Ok(serde_json::from_str(raw)?)
}

/// An open diagram editor, bound to the section and position its result is
/// inserted at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramSession {
    pub section_id: String,
    pub alt: String,
    pub at: InsertionPoint,
    pub options: DiagramOptions,
}

impl DiagramSession {
    pub fn new(section_id: &str, alt: &str, at: InsertionPoint) -> Self {
        Self {
            section_id: section_id.to_string(),
            alt: alt.to_string(),
            at,
            options: DiagramOptions::default(),
        }
    }

    pub fn handle(&self, event: InboundEvent) -> Vec<DiagramAction> {
        match event {
            InboundEvent::Configure => vec![DiagramAction::Send(OutboundCommand::Configure {
                config: self.options.clone(),
            })],
            InboundEvent::Init => vec![],
            InboundEvent::Save { .. } => vec![DiagramAction::Send(OutboundCommand::Export {
                format: self.options.default_format.clone(),
            })],
            InboundEvent::Export { data, .. } if is_data_uri(&data) => {
                vec![DiagramAction::StoreAttachment(data), DiagramAction::Close]
            }
            InboundEvent::Export { .. } => {
                log::warn!("Discarding diagram export that is not a data URI");
                vec![DiagramAction::Close]
            }
            InboundEvent::Exit { .. } => vec![DiagramAction::Close],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn session() -> DiagramSession {
        DiagramSession::new("design", "Architecture", InsertionPoint::End)
    }

    #[test]
    fn parses_every_inbound_event() {
        assert_eq!(parse_event(r#"{"event":"configure"}"#).unwrap(), InboundEvent::Configure);
        assert_eq!(parse_event(r#"{"event":"init"}"#).unwrap(), InboundEvent::Init);
        assert_eq!(
            parse_event(r#"{"event":"export","data":"data:image/png;base64,AA==","format":"xmlpng"}"#)
                .unwrap(),
            InboundEvent::Export {
                data: "data:image/png;base64,AA==".into(),
                format: Some("xmlpng".into()),
            }
        );
        assert_eq!(
            parse_event(r#"{"event":"save","xml":"<mxfile/>"}"#).unwrap(),
            InboundEvent::Save {
                xml: Some("<mxfile/>".into())
            }
        );
        assert_eq!(
            parse_event(r#"{"event":"exit","modified":true}"#).unwrap(),
            InboundEvent::Exit { modified: true }
        );
    }

    #[test]
    fn unknown_fields_are_ignored() {
        assert_eq!(
            parse_event(r#"{"event":"exit","parentEvent":"x"}"#).unwrap(),
            InboundEvent::Exit { modified: false }
        );
    }

    #[test]
    fn malformed_messages_are_errors() {
        assert!(parse_event("not json").is_err());
        assert!(parse_event(r#"{"event":"dance"}"#).is_err());
        assert!(parse_event(r#"{"event":"export"}"#).is_err());
    }

    #[test]
    fn configure_is_answered_with_options() {
        let actions = session().handle(InboundEvent::Configure);
        let [DiagramAction::Send(command)] = actions.as_slice() else {
            panic!("unexpected actions {actions:?}");
        };
        assert_eq!(
            command.to_json().unwrap(),
            r#"{"action":"configure","config":{"compressXml":false,"defaultFormat":"xmlpng"}}"#
        );
    }

    #[test]
    fn save_requests_an_export() {
        assert_eq!(
            session().handle(InboundEvent::Save { xml: None }),
            vec![DiagramAction::Send(OutboundCommand::Export {
                format: EXPORT_FORMAT.into()
            })]
        );
    }

    #[test]
    fn export_stores_then_closes() {
        assert_eq!(
            session().handle(InboundEvent::Export {
                data: "data:x".into(),
                format: None
            }),
            vec![
                DiagramAction::StoreAttachment("data:x".into()),
                DiagramAction::Close
            ]
        );
    }

    #[test]
    fn export_of_other_schemes_only_closes() {
        for data in ["javascript:alert(1)", "https://example.com/a.png", ""] {
            assert_eq!(
                session().handle(InboundEvent::Export {
                    data: data.into(),
                    format: None
                }),
                vec![DiagramAction::Close]
            );
        }
    }

    #[test]
    fn init_needs_no_reply_and_exit_closes() {
        assert!(session().handle(InboundEvent::Init).is_empty());
        assert_eq!(
            session().handle(InboundEvent::Exit { modified: false }),
            vec![DiagramAction::Close]
        );
    }
}
