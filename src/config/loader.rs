//! Profile loading from disk and stack resolution.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::args::{Args, MonitoringArgs};
use crate::config::schema::{
    Datasource, Profiles, DEFAULT_METRICS_INDEX, DEFAULT_STACK, DEFAULT_TRACES_DATASOURCE,
};
use crate::config::validation::ValidationError;
use crate::identity::StaticRegistry;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read profile {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse profile {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unable to expand {0}: no home directory")]
    NoHomeDir(PathBuf),

    #[error("unable to find stack {stack:?} in profile, available stacks: [{}]", .available.join(", "))]
    UnknownStack {
        stack: String,
        available: Vec<String>,
    },

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// The resolved stack for one invocation.
#[derive(Debug, Clone)]
pub struct Profile {
    pub datasource: Datasource,
    pub registry: StaticRegistry,
}

/// Load the profile file named by `args` and resolve the selected stack.
pub fn load_profile(args: &Args) -> Result<Profile, ConfigError> {
    let path = expand_home(&args.profile_file)?;
    let profiles = load_profiles(&path)?;

    let registry = profiles
        .as_ref()
        .map(|p| StaticRegistry::new(p.identities.clone()))
        .unwrap_or_default();

    if registry.is_empty() {
        tracing::debug!("No identities configured, records will have an empty identity");
    }

    let mut datasource = resolve_datasource(profiles.as_ref(), &args.monitoring, &args.stack)?;
    datasource.monitoring_ca_path = expand_opt(datasource.monitoring_ca_path)?;
    datasource.monitoring_cert_path = expand_opt(datasource.monitoring_cert_path)?;
    datasource.monitoring_cert_key_path = expand_opt(datasource.monitoring_cert_key_path)?;

    tracing::debug!(
        stack = %datasource.name,
        monitoring_url = %datasource.monitoring_url,
        metrics_index = datasource.metrics_index,
        logs_index = datasource.logs_index,
        traces_index = datasource.traces_index,
        identities = registry.len(),
        "Profile resolved"
    );

    Ok(Profile {
        datasource,
        registry,
    })
}

/// Read a TOML profile file. A missing file is not an error.
pub fn load_profiles(path: &Path) -> Result<Option<Profiles>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No profile found");
            return Ok(None);
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    tracing::debug!(path = %path.display(), "Profile found");

    let profiles = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Some(profiles))
}

/// Pick the datasource named `stack`.
///
/// The `default` stack is synthesized from the command line when there is no
/// profile or when a monitoring url is given explicitly.
pub fn resolve_datasource(
    profiles: Option<&Profiles>,
    monitoring: &MonitoringArgs,
    stack: &str,
) -> Result<Datasource, ConfigError> {
    if stack == DEFAULT_STACK && (profiles.is_none() || monitoring.monitoring_url.is_some()) {
        return Ok(default_datasource(monitoring));
    }

    let available = profiles.map(Profiles::names).unwrap_or_default();
    profiles
        .and_then(|p| p.datasources.iter().find(|d| d.name == stack))
        .cloned()
        .map(Datasource::with_index_defaults)
        .ok_or_else(|| ConfigError::UnknownStack {
            stack: stack.to_string(),
            available,
        })
}

fn default_datasource(monitoring: &MonitoringArgs) -> Datasource {
    Datasource {
        name: DEFAULT_STACK.to_string(),
        monitoring_url: monitoring.monitoring_url.clone().unwrap_or_default(),
        metrics_index: DEFAULT_METRICS_INDEX,
        logs_index: DEFAULT_METRICS_INDEX + 1,
        traces_index: DEFAULT_METRICS_INDEX + 2,
        traces_datasource_name: DEFAULT_TRACES_DATASOURCE.to_string(),
        monitoring_ca_path: monitoring.monitoring_ca_path.clone(),
        monitoring_cert_path: monitoring.monitoring_cert_path.clone(),
        monitoring_cert_key_path: monitoring.monitoring_cert_key_path.clone(),
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> Result<PathBuf, ConfigError> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };

    dirs::home_dir()
        .map(|home| home.join(rest))
        .ok_or_else(|| ConfigError::NoHomeDir(path.to_path_buf()))
}

fn expand_opt(path: Option<PathBuf>) -> Result<Option<PathBuf>, ConfigError> {
    path.map(|p| expand_home(&p)).transpose()
}
