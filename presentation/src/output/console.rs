//! Console output formatter for envelopes and the action catalog

use crate::output::formatter::{JsonFormatter, OutputFormatter};
use colored::Colorize;
use serde_json::Value;
use switchboard_domain::{ActionDefinition, ResultEnvelope};

/// Formats results for human reading
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Partial-result note for aggregating actions, if any source failed
    fn partial_note(data: &Value) -> Option<String> {
        if data.get("partial").and_then(Value::as_bool) != Some(true) {
            return None;
        }
        let failed: Vec<&str> = data
            .get("failedSources")
            .and_then(Value::as_array)
            .map(|sources| sources.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        Some(format!(
            "{} some sources failed and were left out: {}",
            "Partial:".yellow().bold(),
            failed.join(", ")
        ))
    }

    fn credentials(definition: &ActionDefinition) -> String {
        let fields = definition.credentials.fields();
        if fields.is_empty() {
            return "none".to_string();
        }
        fields
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn pretty_json(value: &Value) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_envelope(&self, envelope: &ResultEnvelope<Value>) -> String {
        let mut output = String::new();

        match envelope.error() {
            None => {
                output.push_str(&format!("{}\n", "✔ success".green().bold()));
                if let Some(data) = envelope.data() {
                    if let Some(note) = Self::partial_note(data) {
                        output.push_str(&format!("{}\n", note));
                    }
                    output.push('\n');
                    output.push_str(&Self::pretty_json(data));
                    output.push('\n');
                }
            }
            Some(error) => {
                output.push_str(&format!("{} {}\n", "✘ failed:".red().bold(), error));
            }
        }

        output
    }

    fn format_actions(&self, definitions: &[&ActionDefinition]) -> String {
        let mut output = Self::header("Registered Actions");
        output.push('\n');

        let mut current = None;
        for definition in definitions {
            if current != Some(definition.id.provider) {
                current = Some(definition.id.provider);
                output.push_str(&Self::section_header(definition.id.provider.as_str()));
            }
            output.push_str(&format!(
                "  {}\n    {}\n    {} {}\n",
                definition.id.to_string().yellow().bold(),
                definition.description,
                "credentials:".dimmed(),
                Self::credentials(definition)
            ));
        }

        if definitions.is_empty() {
            output.push_str(&format!("\n  {}\n", "(no actions)".dimmed()));
        }
        output
    }

    fn format_contracts(&self, definition: &ActionDefinition) -> String {
        let contracts = JsonFormatter::contracts_value(definition);
        let mut output = Self::header(&definition.id.to_string());
        output.push_str(&format!("\n{}\n", definition.description));
        output.push_str(&format!(
            "{} {}\n",
            "Credentials:".cyan().bold(),
            Self::credentials(definition)
        ));

        for section in ["input", "output"] {
            output.push_str(&Self::section_header(&format!("{} contract", section)));
            output.push_str(&Self::indent(&Self::pretty_json(&contracts[section]), "  "));
            output.push('\n');
        }
        output
    }
}
