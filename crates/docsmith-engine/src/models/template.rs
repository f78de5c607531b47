use serde::{Deserialize, Serialize};

/// Whether a section is edited as a single line or a free-form text area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    SingleLine,
    MultiLine,
}

/// A named unit of document content defined by a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDef {
    pub id: String,
    pub label: String,
    pub kind: SectionKind,
    #[serde(default)]
    pub required: bool,
    /// Prompt used when asking the text generator to draft this section.
    #[serde(default)]
    pub ai_prompt: Option<String>,
}

impl SectionDef {
    pub fn new(id: &str, label: &str, kind: SectionKind) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind,
            required: false,
            ai_prompt: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_prompt(mut self, prompt: &str) -> Self {
        self.ai_prompt = Some(prompt.to_string());
        self
    }

    pub fn is_multi_line(&self) -> bool {
        self.kind == SectionKind::MultiLine
    }
}

/// A static list of sections a document is authored against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub description: String,
    pub sections: Vec<SectionDef>,
}

impl Template {
    pub fn section(&self, id: &str) -> Option<&SectionDef> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn section_index(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }
}

/// Templates shipped with the application.
pub fn builtin_templates() -> Vec<Template> {
    use SectionKind::*;

    vec![
        Template {
            id: "technical-design".to_string(),
            name: "Technical Design".to_string(),
            description: "Design document for a new system or a significant change".to_string(),
            sections: vec![
                SectionDef::new("title", "Title", SingleLine).required(),
                SectionDef::new("summary", "Summary", MultiLine)
                    .required()
                    .with_prompt("Write a one-paragraph summary of the proposed design."),
                SectionDef::new("background", "Background", MultiLine)
                    .with_prompt("Describe the current situation and why change is needed."),
                SectionDef::new("design", "Detailed Design", MultiLine)
                    .required()
                    .with_prompt("Describe the architecture, components and data flow."),
                SectionDef::new("alternatives", "Alternatives Considered", MultiLine)
                    .with_prompt("List alternative approaches and why they were rejected."),
                SectionDef::new("risks", "Risks", MultiLine),
            ],
        },
        Template {
            id: "lab-report".to_string(),
            name: "Lab Report".to_string(),
            description: "Experiment write-up with method, results and analysis".to_string(),
            sections: vec![
                SectionDef::new("title", "Title", SingleLine).required(),
                SectionDef::new("author", "Author", SingleLine),
                SectionDef::new("objective", "Objective", MultiLine)
                    .required()
                    .with_prompt("State the objective of the experiment."),
                SectionDef::new("method", "Method", MultiLine).required(),
                SectionDef::new("results", "Results", MultiLine).required(),
                SectionDef::new("analysis", "Analysis", MultiLine)
                    .with_prompt("Analyse the results and relate them to the objective."),
            ],
        },
        Template {
            id: "meeting-notes".to_string(),
            name: "Meeting Notes".to_string(),
            description: "Agenda, discussion and action items".to_string(),
            sections: vec![
                SectionDef::new("title", "Meeting", SingleLine).required(),
                SectionDef::new("attendees", "Attendees", SingleLine),
                SectionDef::new("notes", "Discussion", MultiLine),
                SectionDef::new("actions", "Action Items", MultiLine)
                    .with_prompt("Turn the discussion into a list of action items."),
            ],
        },
    ]
}

/// Look up a built-in template by id.
pub fn find_template(id: &str) -> Option<Template> {
    builtin_templates().into_iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn builtin_template_ids_are_unique() {
        let templates = builtin_templates();
        let ids: HashSet<_> = templates.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), templates.len());
    }

    #[test]
    fn section_ids_are_unique_within_each_template() {
        for template in builtin_templates() {
            let ids: HashSet<_> = template.sections.iter().map(|s| s.id.as_str()).collect();
            assert_eq!(ids.len(), template.sections.len(), "{}", template.id);
        }
    }

    #[test]
    fn find_template_by_id() {
        let template = find_template("lab-report").unwrap();
        assert_eq!(template.name, "Lab Report");
        assert_eq!(template.section_index("method"), Some(3));
        assert!(template.section("method").unwrap().required);
        assert!(find_template("nope").is_none());
    }

    #[test]
    fn single_line_sections_are_not_multi_line() {
        let template = find_template("technical-design").unwrap();
        assert!(!template.section("title").unwrap().is_multi_line());
        assert!(template.section("summary").unwrap().is_multi_line());
    }
}
