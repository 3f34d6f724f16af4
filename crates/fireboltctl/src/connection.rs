//! Connection management: turns CLI flags, environment and config into a
//! connected [`Client`]

use std::path::PathBuf;

use fireboltctl_core::{Client, ClientSettings, Config, Credentials, DEFAULT_API_URL, Profile};
use tracing::{debug, info};

use crate::cli::{Cli, QueryArgs};
use crate::error::{CliError, Result as CliResult};

/// Database and engine a query runs against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTarget {
    pub database: String,
    pub engine_name: String,
}

/// Connection manager for creating authenticated clients
#[derive(Debug, Clone)]
pub struct ConnectionManager {
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

impl ConnectionManager {
    /// Create a new connection manager with a custom config path
    pub fn with_config_path(config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// The profile selected by `--profile`/`FIREBOLT_PROFILE` or the config default
    pub fn profile(&self, cli: &Cli) -> CliResult<Option<&Profile>> {
        let profile = self.config.resolve_profile(cli.profile.as_deref())?;
        if profile.is_some() {
            debug!(
                "Using profile {:?}",
                cli.profile.as_deref().or(self.config.default_profile.as_deref())
            );
        }
        Ok(profile)
    }

    /// Resolve everything `Client::connect` needs.
    ///
    /// Credentials: flag, then environment, then profile. API origin: flag or
    /// `FIREBOLT_API_URL`, then profile, then the public default.
    pub fn client_settings(&self, cli: &Cli) -> CliResult<ClientSettings> {
        let profile = self.profile(cli)?;
        let credentials = Credentials::resolve(cli.email.clone(), cli.password.clone(), profile);

        let api_url = cli
            .api_url
            .clone()
            .or_else(|| profile.and_then(|p| p.api_url.clone()))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(ClientSettings::new(credentials).with_api_url(api_url))
    }

    /// Authenticate and return a ready client
    pub async fn create_client(&self, cli: &Cli) -> CliResult<Client> {
        let settings = self.client_settings(cli)?;
        info!("Connecting to Firebolt API: {}", settings.api_url);
        Ok(Client::connect(settings).await?)
    }

    /// Database and engine for a query, falling back to the profile
    pub fn query_target(&self, cli: &Cli, args: &QueryArgs) -> CliResult<QueryTarget> {
        let profile = self.profile(cli)?;

        let database = args
            .database
            .clone()
            .or_else(|| profile.and_then(|p| p.database.clone()))
            .ok_or(CliError::MissingArgument {
                what: "database",
                flag: "--database",
            })?;
        let engine_name = self.engine_name(cli, args.engine_name.as_deref())?;

        Ok(QueryTarget {
            database,
            engine_name,
        })
    }

    /// Engine name from the flag, falling back to the profile
    pub fn engine_name(&self, cli: &Cli, explicit: Option<&str>) -> CliResult<String> {
        if let Some(name) = explicit {
            return Ok(name.to_string());
        }

        self.profile(cli)?
            .and_then(|p| p.engine_name.clone())
            .ok_or(CliError::MissingArgument {
                what: "engine name",
                flag: "--engine-name",
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use fireboltctl_core::auth::{ENV_FIREBOLT_EMAIL, ENV_FIREBOLT_PASSWORD};
    use fireboltctl_core::FIREBOLTCTL_USER_AGENT;
    use serial_test::serial;

    fn config_with_profile() -> Config {
        let mut config = Config {
            default_profile: Some("prod".to_string()),
            ..Default::default()
        };
        config.profiles.insert(
            "prod".to_string(),
            Profile {
                email: Some("profile@example.com".to_string()),
                password: Some("profile-pw".to_string()),
                api_url: Some("https://api.staging.firebolt.io".to_string()),
                database: Some("warehouse".to_string()),
                engine_name: Some("warehouse_general_purpose".to_string()),
            },
        );
        config
    }

    fn manager(config: Config) -> ConnectionManager {
        ConnectionManager::with_config_path(config, None)
    }

    fn clear_env() {
        unsafe {
            std::env::remove_var(ENV_FIREBOLT_EMAIL);
            std::env::remove_var(ENV_FIREBOLT_PASSWORD);
        }
    }

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["fireboltctl"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    fn query_args(cli: &Cli) -> QueryArgs {
        match &cli.command {
            crate::cli::Commands::Execute(args) => args.clone(),
            other => panic!("expected execute, got {other:?}"),
        }
    }

    #[test]
    #[serial]
    fn test_profile_supplies_everything() {
        clear_env();
        let manager = manager(config_with_profile());
        let cli = parse(&["execute", "--query", "SELECT 1"]);

        let settings = manager.client_settings(&cli).unwrap();
        assert_eq!(settings.credentials.email(), "profile@example.com");
        assert_eq!(settings.api_url, "https://api.staging.firebolt.io");
        assert_eq!(settings.user_agent, FIREBOLTCTL_USER_AGENT);

        let target = manager.query_target(&cli, &query_args(&cli)).unwrap();
        assert_eq!(target.database, "warehouse");
        assert_eq!(target.engine_name, "warehouse_general_purpose");
    }

    #[test]
    #[serial]
    fn test_flags_beat_environment_beat_profile() {
        clear_env();
        unsafe {
            std::env::set_var(ENV_FIREBOLT_EMAIL, "env@example.com");
        }
        let manager = manager(config_with_profile());

        let cli = parse(&["execute", "--query", "SELECT 1"]);
        let settings = manager.client_settings(&cli).unwrap();
        assert_eq!(settings.credentials.email(), "env@example.com");

        let cli = parse(&[
            "--email",
            "flag@example.com",
            "--api-url",
            "http://127.0.0.1:9",
            "execute",
            "--query",
            "SELECT 1",
            "--database",
            "adhoc",
        ]);
        let settings = manager.client_settings(&cli).unwrap();
        assert_eq!(settings.credentials.email(), "flag@example.com");
        assert_eq!(settings.api_url, "http://127.0.0.1:9");

        let target = manager.query_target(&cli, &query_args(&cli)).unwrap();
        assert_eq!(target.database, "adhoc");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_defaults_without_profile() {
        clear_env();
        let manager = manager(Config::default());
        let cli = parse(&["execute", "--query", "SELECT 1"]);

        let settings = manager.client_settings(&cli).unwrap();
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.credentials.email(), "");

        let err = manager.query_target(&cli, &query_args(&cli)).unwrap_err();
        assert!(matches!(
            err,
            CliError::MissingArgument {
                what: "database",
                ..
            }
        ));
    }

    #[test]
    fn test_missing_engine_name() {
        let manager = manager(Config::default());
        let cli = parse(&["execute", "--query", "SELECT 1", "--database", "d"]);
        let err = manager.query_target(&cli, &query_args(&cli)).unwrap_err();
        assert!(err.to_string().contains("--engine-name"));
    }

    #[test]
    fn test_unknown_profile_is_a_config_error() {
        let manager = ConnectionManager::with_config_path(
            config_with_profile(),
            Some(PathBuf::from("/tmp/fireboltctl.toml")),
        );
        let cli = parse(&["--profile", "nope", "execute", "--query", "SELECT 1"]);
        assert!(matches!(
            manager.client_settings(&cli),
            Err(CliError::Config(_))
        ));
    }
}
