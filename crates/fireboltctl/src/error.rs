//! Error types for fireboltctl
//!
//! Every failure that reaches `main` is a [`CliError`]. Its exit code comes
//! from the kind of the underlying [`FireboltError`]; anything that did not
//! originate in the client exits with [`EXIT_CODE_UNKNOWN_ERROR`].

use colored::Colorize;
use fireboltctl_core::{ConfigError, ErrorKind, FireboltError};
use thiserror::Error;

pub const EXIT_CODE_UNKNOWN_ERROR: i32 = 3;
pub const EXIT_CODE_ENGINE_WRONG_STATUS: i32 = 200;
pub const EXIT_CODE_AUTHENTICATION_ERROR: i32 = 201;
pub const EXIT_CODE_REQUEST_CLIENT_ERROR: i32 = 202;
pub const EXIT_CODE_REQUEST_SERVER_ERROR: i32 = 203;

/// Cargo-style diagnostic formatter for CLI errors.
///
/// Produces structured output like:
/// ```text
/// error: authentication error with etl@example.com and password: 401 Unauthorized
///
///   tip: check the credentials in use
///       fireboltctl --email <email> --password <password> ...
/// ```
pub struct CliDiagnostic {
    message: String,
    detail: Option<String>,
    tips: Vec<(String, Vec<String>)>,
}

impl CliDiagnostic {
    /// Start a new error diagnostic with the given message.
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            detail: None,
            tips: Vec::new(),
        }
    }

    /// Add a detail line below the error message.
    pub fn detail(mut self, text: &str) -> Self {
        self.detail = Some(text.to_string());
        self
    }

    /// Add a tip with optional example commands.
    pub fn tip(mut self, description: &str, commands: &[&str]) -> Self {
        self.tips.push((
            description.to_string(),
            commands.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Print the diagnostic to stderr with colored formatting.
    pub fn print(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message);

        if let Some(detail) = &self.detail {
            eprintln!("  {}", detail);
        }

        for (description, commands) in &self.tips {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", description);
            for cmd in commands {
                eprintln!("      {}", cmd);
            }
        }
    }
}

/// Main error type for the fireboltctl application
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Firebolt(#[from] FireboltError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No {what} given. Pass {flag} or set it in the profile.")]
    MissingArgument {
        what: &'static str,
        flag: &'static str,
    },

    #[error("Engine '{name}' did not report an endpoint")]
    NoEndpoint { name: String },

    #[error("File error for '{path}': {message}")]
    FileError { path: String, message: String },

    #[error("Output formatting error: {message}")]
    OutputError { message: String },
}

/// Result type for fireboltctl operations
pub type Result<T> = std::result::Result<T, CliError>;

impl CliError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        let CliError::Firebolt(err) = self else {
            return EXIT_CODE_UNKNOWN_ERROR;
        };

        match err.kind() {
            ErrorKind::Authentication => EXIT_CODE_AUTHENTICATION_ERROR,
            ErrorKind::EngineWrongStatus => EXIT_CODE_ENGINE_WRONG_STATUS,
            ErrorKind::Request if err.is_client_error() => EXIT_CODE_REQUEST_CLIENT_ERROR,
            ErrorKind::Request => EXIT_CODE_REQUEST_SERVER_ERROR,
            ErrorKind::Unknown => EXIT_CODE_UNKNOWN_ERROR,
        }
    }

    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            CliError::Firebolt(err) => match err.kind() {
                ErrorKind::Authentication => vec![
                    "Pass --email and --password, or set FIREBOLT_EMAIL and FIREBOLT_PASSWORD"
                        .to_string(),
                    "Check the API origin: --api-url or FIREBOLT_API_URL".to_string(),
                ],
                ErrorKind::EngineWrongStatus => vec![
                    "Inspect the engine: fireboltctl engine describe --engine-name <name>"
                        .to_string(),
                    "Keep waiting: fireboltctl engine wait --engine-name <name> --status running"
                        .to_string(),
                ],
                ErrorKind::Request if err.is_not_found() => vec![
                    "Verify the engine name and database are spelled correctly".to_string(),
                    "Check that you're using the correct profile".to_string(),
                ],
                ErrorKind::Request if err.is_server_error() => {
                    vec!["The service reported an internal error; retry the command".to_string()]
                }
                _ => vec![],
            },
            CliError::Config(ConfigError::ProfileNotFound { name }) => vec![
                format!("Add a [profiles.{}] table to the config file", name),
                "Select another profile with --profile or FIREBOLT_PROFILE".to_string(),
            ],
            CliError::MissingArgument { flag, .. } => vec![
                format!("Pass {} on the command line", flag),
                "Set a default_profile in the config file".to_string(),
            ],
            CliError::FileError { path, .. } => vec![
                format!("Check that the destination is writable: {}", path),
                "Verify the folder exists or can be created".to_string(),
            ],
            _ => vec![],
        }
    }

    /// Print a cargo-style diagnostic to stderr using colored formatting.
    pub fn print_diagnostic(&self) {
        let mut diag = CliDiagnostic::error(&self.to_string());

        if let CliError::Firebolt(err) = self
            && let Some(status) = err.status_code()
        {
            diag = diag.detail(&format!("HTTP status {}", status));
        }

        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion, &[]);
        }

        diag.print();
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::OutputError {
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for CliError {
    fn from(err: csv::Error) -> Self {
        CliError::OutputError {
            message: format!("CSV error: {}", err),
        }
    }
}
