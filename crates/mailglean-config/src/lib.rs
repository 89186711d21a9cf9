use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use mailglean_core::DEFAULT_EXCLUDE;
use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "mailglean";
const CONFIG_FILENAME: &str = "config.toml";
const CREDENTIALS_FILENAME: &str = "credentials.json";

pub const DEFAULT_USER_ID: &str = "me";
pub const DEFAULT_PROCESSED_LABEL: &str = "MG_PROCESSED";
pub const DEFAULT_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/";
pub const DEFAULT_CRM_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mailbox: MailboxConfig,
    pub oauth: Option<OauthConfig>,
    pub exclude: Vec<String>,
    pub csv: Option<CsvSinkConfig>,
    pub crm: Option<CrmSinkConfig>,
}

#[derive(Debug, Clone)]
pub struct MailboxConfig {
    pub api_base: String,
    pub user_id: String,
    pub credentials_path: PathBuf,
    pub processed_label: String,
    pub mark_processed: bool,
}

#[derive(Debug, Clone)]
pub struct OauthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone)]
pub struct CsvSinkConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct CrmSinkConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("invalid {field} value: must not be empty")]
    EmptyField { field: &'static str },
    #[error("invalid crm timeout_secs value: {0}")]
    InvalidCrmTimeout(u64),
    #[error("oauth section requires client_id, client_secret, and redirect_uri")]
    IncompleteOauth,
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    mailbox: Option<MailboxFile>,
    oauth: Option<OauthFile>,
    extract: Option<ExtractFile>,
    sinks: Option<SinksFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MailboxFile {
    api_base: Option<String>,
    user_id: Option<String>,
    credentials_path: Option<PathBuf>,
    processed_label: Option<String>,
    mark_processed: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OauthFile {
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExtractFile {
    exclude: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SinksFile {
    csv: Option<CsvFile>,
    crm: Option<CrmFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CsvFile {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CrmFile {
    endpoint: String,
    api_key: String,
    timeout_secs: Option<u64>,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path.clone()) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return default_config(),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return default_config(),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => default_config(),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => Ok(config_dir()?.join(CONFIG_FILENAME)),
    }
}

pub fn default_credentials_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CREDENTIALS_FILENAME))
}

fn config_dir() -> Result<PathBuf> {
    let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
        let path = PathBuf::from(dir);
        if path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidConfigPath(path));
        }
        path
    } else {
        let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
        home.join(".config")
    };
    Ok(base.join(APP_DIR))
}

fn default_config() -> Result<AppConfig> {
    Ok(AppConfig {
        mailbox: MailboxConfig {
            api_base: DEFAULT_API_BASE.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            credentials_path: default_credentials_path()?,
            processed_label: DEFAULT_PROCESSED_LABEL.to_string(),
            mark_processed: true,
        },
        oauth: None,
        exclude: DEFAULT_EXCLUDE.iter().map(|entry| entry.to_string()).collect(),
        csv: None,
        crm: None,
    })
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = default_config()?;

    if let Some(mailbox) = parsed.mailbox {
        if let Some(api_base) = mailbox.api_base {
            require_nonempty("mailbox.api_base", &api_base)?;
            config.mailbox.api_base = api_base;
        }
        if let Some(user_id) = mailbox.user_id {
            require_nonempty("mailbox.user_id", &user_id)?;
            config.mailbox.user_id = user_id;
        }
        if let Some(credentials_path) = mailbox.credentials_path {
            if credentials_path.as_os_str().is_empty() {
                return Err(ConfigError::EmptyField {
                    field: "mailbox.credentials_path",
                });
            }
            config.mailbox.credentials_path = credentials_path;
        }
        if let Some(label) = mailbox.processed_label {
            require_nonempty("mailbox.processed_label", &label)?;
            config.mailbox.processed_label = label;
        }
        if let Some(mark) = mailbox.mark_processed {
            config.mailbox.mark_processed = mark;
        }
    }

    if let Some(oauth) = parsed.oauth {
        match (oauth.client_id, oauth.client_secret, oauth.redirect_uri) {
            (Some(client_id), Some(client_secret), Some(redirect_uri)) => {
                require_nonempty("oauth.client_id", &client_id)?;
                require_nonempty("oauth.client_secret", &client_secret)?;
                require_nonempty("oauth.redirect_uri", &redirect_uri)?;
                config.oauth = Some(OauthConfig {
                    client_id,
                    client_secret,
                    redirect_uri,
                });
            }
            _ => return Err(ConfigError::IncompleteOauth),
        }
    }

    if let Some(extract) = parsed.extract {
        if let Some(exclude) = extract.exclude {
            for entry in &exclude {
                require_nonempty("extract.exclude", entry)?;
            }
            config.exclude = exclude;
        }
    }

    if let Some(sinks) = parsed.sinks {
        if let Some(csv) = sinks.csv {
            if csv.path.as_os_str().is_empty() {
                return Err(ConfigError::EmptyField {
                    field: "sinks.csv.path",
                });
            }
            config.csv = Some(CsvSinkConfig { path: csv.path });
        }
        if let Some(crm) = sinks.crm {
            require_nonempty("sinks.crm.endpoint", &crm.endpoint)?;
            require_nonempty("sinks.crm.api_key", &crm.api_key)?;
            let timeout_secs = crm.timeout_secs.unwrap_or(DEFAULT_CRM_TIMEOUT_SECS);
            if timeout_secs == 0 {
                return Err(ConfigError::InvalidCrmTimeout(timeout_secs));
            }
            config.crm = Some(CrmSinkConfig {
                endpoint: crm.endpoint,
                api_key: crm.api_key,
                timeout_secs,
            });
        }
    }

    Ok(config)
}

fn require_nonempty(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyField { field });
    }
    Ok(())
}

// The file carries OAuth and CRM secrets.
#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load_at_path, ConfigError, DEFAULT_PROCESSED_LABEL};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn restrict_permissions(path: &Path) {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path).expect("metadata").permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms).expect("chmod");
        }
    }

    fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join("config.toml");
        fs::write(&path, contents).expect("write config");
        restrict_permissions(&path);
        path
    }

    #[test]
    fn load_at_path_requires_file_when_requested() {
        let temp = TempDir::new().expect("tempdir");
        let missing = temp.path().join("config.toml");
        let err = load_at_path(&missing, true).unwrap_err();
        assert!(matches!(err, ConfigError::MissingConfigFile(_)));
    }

    #[test]
    fn defaults_apply_when_sections_are_absent() {
        let temp = TempDir::new().expect("tempdir");
        let path = write_config(&temp, "");
        let config = load_at_path(&path, true).expect("load").expect("config");
        assert_eq!(config.mailbox.user_id, "me");
        assert_eq!(config.mailbox.processed_label, DEFAULT_PROCESSED_LABEL);
        assert!(config.mailbox.mark_processed);
        assert!(config.oauth.is_none());
        assert!(config.csv.is_none());
        assert!(config.crm.is_none());
        assert!(config.exclude.contains(&"Google".to_string()));
    }

    #[test]
    fn parses_full_config() {
        let temp = TempDir::new().expect("tempdir");
        let path = write_config(
            &temp,
            r#"
[mailbox]
processed_label = "DONE"
mark_processed = false

[oauth]
client_id = "id"
client_secret = "secret"
redirect_uri = "http://localhost:8080"

[extract]
exclude = ["Acme"]

[sinks.csv]
path = "out.csv"

[sinks.crm]
endpoint = "https://crm.example.com/upsert/"
api_key = "key"
timeout_secs = 5
"#,
        );
        let config = load_at_path(&path, true).expect("load").expect("config");
        assert_eq!(config.mailbox.processed_label, "DONE");
        assert!(!config.mailbox.mark_processed);
        assert_eq!(config.oauth.expect("oauth").client_id, "id");
        assert_eq!(config.exclude, vec!["Acme"]);
        assert_eq!(config.csv.expect("csv").path.to_str(), Some("out.csv"));
        assert_eq!(config.crm.expect("crm").timeout_secs, 5);
    }

    #[test]
    fn incomplete_oauth_is_rejected() {
        let temp = TempDir::new().expect("tempdir");
        let path = write_config(&temp, "[oauth]\nclient_id = \"id\"\n");
        let err = load_at_path(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::IncompleteOauth));
    }

    #[test]
    fn zero_crm_timeout_is_rejected() {
        let temp = TempDir::new().expect("tempdir");
        let path = write_config(
            &temp,
            "[sinks.crm]\nendpoint = \"https://crm\"\napi_key = \"k\"\ntimeout_secs = 0\n",
        );
        let err = load_at_path(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCrmTimeout(0)));
    }

    #[cfg(unix)]
    #[test]
    fn permissive_config_is_rejected() {
        use std::os::unix::fs::PermissionsExt;
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "").expect("write config");
        let mut perms = fs::metadata(&path).expect("metadata").permissions();
        perms.set_mode(0o644);
        fs::set_permissions(&path, perms).expect("chmod");
        let err = load_at_path(&path, true).unwrap_err();
        assert!(matches!(err, ConfigError::InsecurePermissions(_)));
    }
}
