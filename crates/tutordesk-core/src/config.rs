use std::path::{Path, PathBuf};

/// Server-to-server OAuth credentials for the Zoom meeting service.
#[derive(Clone, Debug, Default)]
pub struct ZoomConfig {
    pub account_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl ZoomConfig {
    pub fn from_env() -> Self {
        Self {
            account_id: std::env::var("ZOOM_ACCOUNT_ID").unwrap_or_default(),
            client_id: std::env::var("ZOOM_CLIENT_ID").unwrap_or_default(),
            client_secret: std::env::var("ZOOM_CLIENT_SECRET").unwrap_or_default(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.account_id.is_empty() && !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

/// Connection security for SMTP delivery.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SmtpSecurity {
    /// Implicit TLS on connect, the default (port 465).
    Ssl,
    /// Plain connect upgraded via STARTTLS (port 587).
    StartTls,
}

impl SmtpSecurity {
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "STARTTLS" => SmtpSecurity::StartTls,
            _ => SmtpSecurity::Ssl,
        }
    }
}

/// SMTP delivery settings for emailed reports.
#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub sender: String,
    pub security: SmtpSecurity,
    pub timeout_secs: u64,
}

impl SmtpConfig {
    pub fn from_env() -> Self {
        let username = std::env::var("SMTP_USERNAME").unwrap_or_default();
        let sender = std::env::var("SMTP_SENDER")
            .ok()
            .filter(|sender| !sender.is_empty())
            .unwrap_or_else(|| username.clone());
        Self {
            host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(465),
            username,
            password: std::env::var("SMTP_PASSWORD").unwrap_or_default(),
            sender,
            security: SmtpSecurity::parse(
                &std::env::var("SMTP_SECURITY").unwrap_or_else(|_| "SSL".to_string()),
            ),
            timeout_secs: std::env::var("EMAIL_TIMEOUT")
                .ok()
                .and_then(|timeout| timeout.parse().ok())
                .unwrap_or(10),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

/// Filesystem layout: data lives under `resources/` and calendar exports
/// land under `downloads/`, both relative to a chosen root.
#[derive(Clone, Debug)]
pub struct StoragePaths {
    pub resources_dir: PathBuf,
    pub export_dir: PathBuf,
}

impl StoragePaths {
    pub fn new(root: &Path) -> Self {
        Self {
            resources_dir: root.join("resources"),
            export_dir: root.join("downloads"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_config_requires_all_three_credentials() {
        let mut config = ZoomConfig {
            account_id: "acc".to_string(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
        };
        assert!(config.is_configured());

        config.client_secret.clear();
        assert!(!config.is_configured());
        assert!(!ZoomConfig::default().is_configured());
    }

    #[test]
    fn smtp_security_parses_case_insensitively() {
        assert_eq!(SmtpSecurity::parse("starttls"), SmtpSecurity::StartTls);
        assert_eq!(SmtpSecurity::parse("STARTTLS"), SmtpSecurity::StartTls);
        assert_eq!(SmtpSecurity::parse("SSL"), SmtpSecurity::Ssl);
        assert_eq!(SmtpSecurity::parse("unknown"), SmtpSecurity::Ssl);
    }

    #[test]
    fn storage_paths_hang_off_the_root() {
        let paths = StoragePaths::new(Path::new("/tmp/demo"));
        assert_eq!(paths.resources_dir, Path::new("/tmp/demo/resources"));
        assert_eq!(paths.export_dir, Path::new("/tmp/demo/downloads"));
    }
}
