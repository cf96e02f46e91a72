use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub tenant_id: String,
    pub client_id: String,
    pub folder_name: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    pub redirect_uri: Option<String>,
    pub output_path: Option<String>,
}

fn default_page_size() -> u32 {
    50
}

impl Config {
    pub fn redirect_uri(&self) -> &str {
        self.redirect_uri
            .as_deref()
            .unwrap_or("http://localhost:8400/callback")
    }
}

fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("no config dir available"))?
        .join("mailsweep"))
}

pub fn config_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("config.toml");
    Ok(p)
}

/// Where the workbook goes when the config doesn't say: the desktop folder,
/// or the current directory if the platform has no desktop dir.
pub fn default_output_path() -> PathBuf {
    dirs::desktop_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Results.xlsx")
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    if !path.exists() {
        // create a template config for users to edit
        let sample = Config {
            tenant_id: "YOUR_TENANT_ID".to_string(),
            client_id: "YOUR_APPLICATION_CLIENT_ID".to_string(),
            folder_name: "Inbox".to_string(),
            page_size: default_page_size(),
            redirect_uri: Some("http://localhost:8400/callback".to_string()),
            output_path: None,
        };
        let tom = toml::to_string_pretty(&sample)?;
        fs::write(&path, tom)?;
        return Err(anyhow::anyhow!(
            "Created template config at {} — edit it and run again",
            path.display()
        ));
    }
    let s = fs::read_to_string(path)?;
    let mut cfg: Config = toml::from_str(&s)?;

    // Environment overrides for the identity pair
    if let Ok(t) = std::env::var("MAILSWEEP_TENANT_ID") {
        cfg.tenant_id = t;
    }
    if let Ok(c) = std::env::var("MAILSWEEP_CLIENT_ID") {
        cfg.client_id = c;
    }

    if cfg.tenant_id.is_empty() || cfg.client_id.is_empty() {
        return Err(anyhow::anyhow!(
            "tenant_id and client_id must be set in the config (or via \
             MAILSWEEP_TENANT_ID / MAILSWEEP_CLIENT_ID)"
        ));
    }
    Ok(cfg)
}

pub fn resolve_output_path(cfg: &Config) -> PathBuf {
    match &cfg.output_path {
        Some(p) => PathBuf::from(p),
        None => default_output_path(),
    }
}
