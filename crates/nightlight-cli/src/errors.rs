use console::style;
use nightlight_core::NightlightError;
use nightlight_store::fs::EnvSecretsProvider;
use std::fmt;

/// Enhanced error type with suggestions
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Tile host credentials could not be loaded
pub fn tile_host_unavailable(secrets_key: &str, error: &NightlightError) -> CliError {
    let variable = EnvSecretsProvider::variable_name(secrets_key);
    CliError::new("Tile host is not configured")
        .with_context(format!(
            "Publishing and deleting need tile host credentials.\n\nError: {}",
            error
        ))
        .with_suggestion(format!(
            "Export the credentials: export {}='{{\"username\":\"...\",\"token\":\"...\"}}'",
            variable
        ))
        .with_suggestion("Or point CONFLICT_NIGHTLIGHT_SECRETS_KEY at another secret")
        .with_help("Run: nightlight config")
}

/// A map argument was not valid JSON
pub fn invalid_map_json(argument: &str, error: &serde_json::Error) -> CliError {
    CliError::new("Invalid map JSON")
        .with_context(format!("Could not parse the map argument.\n\nInput: {}\nError: {}", argument, error))
        .with_suggestion(
            "Pass a map such as '{\"bounds\":\"BoundsUkraineAndAround\",\"mapType\":\"MapTypeMonthly\",\"date\":{\"year\":2021,\"month\":1,\"day\":1},\"source\":{\"provider\":\"MapProviderEogdata\"}}'",
        )
        .with_suggestion("Or read it from a file: @map.json")
        .with_help("Run: nightlight publish --help")
}

fn from_nightlight(error: &NightlightError) -> CliError {
    match error {
        NightlightError::InvalidDateFilter { reason } => CliError::new("Invalid date selection")
            .with_context(format!("Reason: {}", reason))
            .with_suggestion("Select months with --months 1,2,3 (1-12)")
            .with_suggestion("Select years after 2010 with --years 2021,2022")
            .with_help("Run: nightlight sync --help"),
        NightlightError::InvalidIdentity { reason } => CliError::new("Incomplete map")
            .with_context(format!("Reason: {}", reason))
            .with_suggestion("Name the provider, bounds and map type explicitly"),
        NightlightError::StoreUnavailable { store, reason } => {
            CliError::new(format!("Cannot reach the {}", store))
                .with_context(format!("Error: {}", reason))
                .with_suggestion("Check --data-root points at the nightlight data directory")
                .with_help("Run: nightlight config")
        }
        NightlightError::NilAsset { key } => CliError::new("Map is not processed yet")
            .with_context(format!("No processed map exists for {}.", key))
            .with_suggestion("Check the processed maps: nightlight list-processed"),
        NightlightError::ConfigInvalid { key, reason } => {
            CliError::new(format!("Invalid configuration: {}", key))
                .with_context(format!("Reason: {}", reason))
                .with_help("Run: nightlight config")
        }
        other => CliError::new(other.to_string()),
    }
}

/// Convert anyhow::Error to CliError with context
pub fn from_anyhow(error: anyhow::Error) -> CliError {
    let error = match error.downcast::<CliError>() {
        Ok(cli_error) => return cli_error,
        Err(error) => error,
    };

    if let Some(nightlight_error) = error.downcast_ref::<NightlightError>() {
        let converted = from_nightlight(nightlight_error);
        // Keep the outer context anyhow attached, if any
        return if converted.context.is_none() && error.chain().count() > 1 {
            converted.with_context(format!("{:#}", error))
        } else {
            converted
        };
    }

    let message = error.to_string();
    if message.contains("No such file or directory") {
        CliError::new("File not found")
            .with_context(format!("Error: {:#}", error))
            .with_suggestion("Check the file path and try again")
    } else {
        CliError::new(message).with_context(format!("{:#}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_cli_error_passes_through() {
        let error = anyhow::Error::new(CliError::new("boom").with_suggestion("fix it"));
        let converted = from_anyhow(error);
        assert_eq!(converted.message, "boom");
        assert_eq!(converted.suggestions, vec!["fix it"]);
    }

    #[test]
    fn test_date_filter_error_has_suggestions() {
        let error = anyhow::Error::new(NightlightError::InvalidDateFilter {
            reason: "no years were selected".to_string(),
        });
        let converted = from_anyhow(error);
        assert_eq!(converted.message, "Invalid date selection");
        assert_eq!(converted.suggestions.len(), 2);
    }

    #[test]
    fn test_context_is_kept() {
        let result: Result<(), NightlightError> = Err(NightlightError::ConfigMissing {
            key: "tile host".to_string(),
        });
        let converted = from_anyhow(result.context("Failed to publish").unwrap_err());
        assert!(converted.context.unwrap().contains("Failed to publish"));
    }
}
