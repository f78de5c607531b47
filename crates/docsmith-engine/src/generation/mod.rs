//! Interface to the external text generator that drafts section content.

use std::io::Write;
use std::process::{Command, Stdio};

/// What the generator is asked to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Usually the template name.
    pub context_label: String,
    pub section_label: String,
    pub prompt: String,
}

impl GenerationRequest {
    /// Plain-text prompt handed to command-line generators.
    pub fn to_prompt(&self) -> String {
        format!(
            "Document: {}\nSection: {}\n\n{}\n",
            self.context_label, self.section_label, self.prompt
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("Text generation is not configured")]
    NotConfigured,
    #[error("Text generator is unreachable: {0}")]
    Unreachable(String),
    #[error("Text generation failed: {0}")]
    Failed(String),
    #[error("Text generator returned no text")]
    Empty,
}

pub trait TextGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

/// Append generated text to a section, separated by a blank line when the
/// section already has content.
pub fn append_generated(existing: &str, generated: &str) -> String {
    if existing.trim().is_empty() {
        generated.to_string()
    } else {
        format!("{}\n\n{generated}", existing.trim_end_matches('\n'))
    }
}

/// Runs an external program, writing the prompt to its stdin and reading the
/// generated text from stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandGenerator {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandGenerator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl TextGenerator for CommandGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        if self.program.trim().is_empty() {
            return Err(GenerationError::NotConfigured);
        }

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| GenerationError::Unreachable(format!("{}: {e}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(request.to_prompt().as_bytes())
                .map_err(|e| GenerationError::Failed(e.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| GenerationError::Failed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GenerationError::Failed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(GenerationError::Empty);
        }
        Ok(text)
    }
}

/// Used when no generator is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unconfigured;

impl TextGenerator for Unconfigured {
    fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
        Err(GenerationError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn request() -> GenerationRequest {
        GenerationRequest {
            context_label: "Lab Report".into(),
            section_label: "Objective".into(),
            prompt: "State the objective.".into(),
        }
    }

    #[rstest]
    #[case::empty("", "new", "new")]
    #[case::whitespace_only("  \n", "new", "new")]
    #[case::existing("old", "new", "old\n\nnew")]
    #[case::existing_trailing_newline("old\n", "new", "old\n\nnew")]
    fn append_cases(#[case] existing: &str, #[case] generated: &str, #[case] expected: &str) {
        assert_eq!(append_generated(existing, generated), expected);
    }

    #[test]
    fn prompt_includes_labels() {
        let prompt = request().to_prompt();
        assert!(prompt.contains("Document: Lab Report"));
        assert!(prompt.contains("Section: Objective"));
        assert!(prompt.ends_with("State the objective.\n"));
    }

    #[test]
    fn unconfigured_generator_fails() {
        assert_eq!(
            Unconfigured.generate(&request()),
            Err(GenerationError::NotConfigured)
        );
        assert_eq!(
            CommandGenerator::new("  ", vec![]).generate(&request()),
            Err(GenerationError::NotConfigured)
        );
    }

    #[test]
    fn missing_program_is_unreachable() {
        let generator = CommandGenerator::new("docsmith-no-such-generator", vec![]);
        assert!(matches!(
            generator.generate(&request()),
            Err(GenerationError::Unreachable(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn command_output_is_returned_trimmed() {
        let generator = CommandGenerator::new("cat", vec![]);
        let text = generator.generate(&request()).unwrap();
        assert!(text.starts_with("Document: Lab Report"));
        assert!(text.ends_with("State the objective."));
    }

    #[cfg(unix)]
    #[test]
    fn failing_command_reports_failure() {
        let generator = CommandGenerator::new("false", vec![]);
        assert!(matches!(
            generator.generate(&request()),
            Err(GenerationError::Failed(_))
        ));
    }
}
