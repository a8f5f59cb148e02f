//! Email delivery over SMTP.

use std::path::PathBuf;
use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::response::{Category, Code, Severity};
use lettre::{Message, SmtpTransport, Transport};

use crate::config::{SmtpConfig, SmtpSecurity};

/// Email delivery capability.
pub trait MailService: Send + Sync {
    /// Send an HTML mail with optional file attachments. Failures come back
    /// as human-readable messages, never as faults.
    fn send(
        &self,
        recipients: &[String],
        subject: &str,
        html_body: &str,
        attachments: &[PathBuf],
    ) -> Result<(), String>;
}

/// SMTP implementation, SSL or STARTTLS per configuration.
pub struct SmtpMailService {
    config: SmtpConfig,
}

impl SmtpMailService {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn build_message(
        &self,
        recipients: &[String],
        subject: &str,
        html_body: &str,
        attachments: &[PathBuf],
    ) -> Result<Message, String> {
        let sender: Mailbox = self.config.sender.parse().map_err(|error| {
            format!("Email Error: invalid sender {}: {error}", self.config.sender)
        })?;

        let mut builder = Message::builder().from(sender).subject(subject);
        for recipient in recipients {
            let mailbox: Mailbox = recipient
                .parse()
                .map_err(|error| format!("Email Error: invalid recipient {recipient}: {error}"))?;
            builder = builder.to(mailbox);
        }

        let mut body = MultiPart::mixed().singlepart(SinglePart::html(html_body.to_string()));
        for path in attachments {
            if !path.is_file() {
                return Err(format!("Attachment not found: {}", path.display()));
            }
            let bytes = std::fs::read(path)
                .map_err(|error| format!("Failed to attach {}: {error}", path.display()))?;
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "attachment".to_string());
            let content_type = ContentType::parse("application/octet-stream")
                .map_err(|error| format!("Failed to attach {}: {error}", path.display()))?;
            body = body.singlepart(Attachment::new(filename).body(bytes, content_type));
        }

        builder
            .multipart(body)
            .map_err(|error| format!("Email Error: {error}"))
    }
}

impl MailService for SmtpMailService {
    fn send(
        &self,
        recipients: &[String],
        subject: &str,
        html_body: &str,
        attachments: &[PathBuf],
    ) -> Result<(), String> {
        if recipients.is_empty() {
            return Err("No recipients provided".to_string());
        }
        if !self.config.is_configured() {
            return Err("Missing SMTP_USERNAME or SMTP_PASSWORD in environment.".to_string());
        }

        let message = self.build_message(recipients, subject, html_body, attachments)?;

        let builder = match self.config.security {
            SmtpSecurity::Ssl => SmtpTransport::relay(&self.config.host),
            SmtpSecurity::StartTls => SmtpTransport::starttls_relay(&self.config.host),
        }
        .map_err(|error| format!("Email Error: {error}"))?;

        let mailer = builder
            .port(self.config.port)
            .credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ))
            .timeout(Some(Duration::from_secs(self.config.timeout_secs)))
            .build();

        match mailer.send(&message) {
            Ok(_) => {
                tracing::info!("email sent to {} recipient(s)", recipients.len());
                Ok(())
            }
            Err(error) if error.status().as_ref().map_or(false, is_auth_rejection) => {
                tracing::warn!("smtp rejected authentication: {error}");
                Err("Authentication failed. Check username/app password.".to_string())
            }
            Err(error) => Err(format!("Email Error: {error}")),
        }
    }
}

/// The 53x reply class covers AUTH rejections (530 authentication
/// required, 534 mechanism too weak, 535 bad credentials). Every other
/// rejection keeps its own text.
fn is_auth_rejection(code: &Code) -> bool {
    code.severity == Severity::PermanentNegativeCompletion
        && code.category == Category::Unspecified3
}
