//! Campaign delivery.
//!
//! A template is personalized once per recipient, built into a MIME message
//! with `lettre` and handed to a [`Transport`]. Recipients are sent to
//! concurrently; each outcome is reported on its own and failures are not
//! retried.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use futures::future::join_all;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use log::{debug, info, warn};
use thiserror::Error;

use mailcraft::personalize::{Personalization, personalize};

use crate::config::SmtpConfig;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("invalid recipient address: {0:?}")]
    InvalidRecipient(String),

    #[error("invalid sender address: {0:?}")]
    InvalidSender(String),

    #[error("cannot build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot set up SMTP relay {host}: {source}")]
    Relay {
        host: String,
        #[source]
        source: lettre::transport::smtp::Error,
    },

    #[error("SMTP relay failed for {recipient}: {source}")]
    Smtp {
        recipient: String,
        #[source]
        source: lettre::transport::smtp::Error,
    },

    #[error("transport rejected {recipient}: {reason}")]
    Rejected { recipient: String, reason: String },
}

/// One personalized message, ready for a transport.
#[derive(Debug, Clone)]
pub struct Message {
    /// Recipient address as listed.
    pub to: String,
    pub subject: String,
    pub message_id: String,
    /// Personalized HTML body.
    pub html: String,
    email: lettre::Message,
}

impl Message {
    /// Build the MIME message. Header values are encoded by `lettre`, so a
    /// subject can never start a header of its own.
    pub fn new(
        from: &Mailbox,
        to: &str,
        subject: &str,
        message_id: &str,
        html: String,
    ) -> Result<Message, DeliveryError> {
        let recipient: Mailbox = to
            .parse()
            .map_err(|_| DeliveryError::InvalidRecipient(to.to_string()))?;
        let email = lettre::Message::builder()
            .from(from.clone())
            .to(recipient)
            .subject(subject)
            .message_id(Some(format!("<{}@{}>", message_id, from.email.domain())))
            .header(ContentType::TEXT_HTML)
            .body(html.clone())?;
        Ok(Message {
            to: to.to_string(),
            subject: subject.to_string(),
            message_id: message_id.to_string(),
            html,
            email,
        })
    }

    pub fn email(&self) -> &lettre::Message {
        &self.email
    }

    /// RFC 5322 bytes: encoded headers, a blank line, the encoded body.
    pub fn formatted(&self) -> Vec<u8> {
        self.email.formatted()
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    fn name(&self) -> &'static str;

    async fn deliver(&self, message: &Message) -> Result<(), DeliveryError>;
}

// ---------------------------------------------------------------------------
// Outbox
// ---------------------------------------------------------------------------

/// Writes each message as `<recipient>.eml` into a directory.
#[derive(Debug, Clone)]
pub struct OutboxTransport {
    dir: PathBuf,
}

impl OutboxTransport {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        OutboxTransport { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a message to `recipient` is written to.
    pub fn path_for(&self, recipient: &str) -> PathBuf {
        let stem: String = recipient
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '-' | '_' | '+') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.eml", stem))
    }
}

#[async_trait]
impl Transport for OutboxTransport {
    fn name(&self) -> &'static str {
        "outbox"
    }

    async fn deliver(&self, message: &Message) -> Result<(), DeliveryError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| DeliveryError::Io {
                path: self.dir.clone(),
                source,
            })?;
        let path = self.path_for(&message.to);
        let written = tokio::fs::write(&path, message.formatted()).await;
        written.map_err(|source| DeliveryError::Io { path, source })
    }
}

// ---------------------------------------------------------------------------
// SMTP
// ---------------------------------------------------------------------------

/// Hands messages to an SMTP relay.
pub struct SmtpTransport {
    host: String,
    relay: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    /// Must be called from within a Tokio runtime; the connection pool
    /// spawns onto it.
    pub fn new(config: &SmtpConfig) -> Result<Self, DeliveryError> {
        let mut builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host).map_err(
                |source| DeliveryError::Relay {
                    host: config.host.clone(),
                    source,
                },
            )?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };
        builder = builder.port(config.port);
        if let Some(username) = &config.username {
            let password = config.password.clone().unwrap_or_default();
            builder = builder.credentials(Credentials::new(username.clone(), password));
        }
        debug!("SMTP relay {}:{} (starttls: {})", config.host, config.port, config.starttls);
        Ok(SmtpTransport {
            host: config.host.clone(),
            relay: builder.build(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

#[async_trait]
impl Transport for SmtpTransport {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn deliver(&self, message: &Message) -> Result<(), DeliveryError> {
        let response = self
            .relay
            .send(message.email().clone())
            .await
            .map_err(|source| DeliveryError::Smtp {
                recipient: message.to.clone(),
                source,
            })?;
        debug!("relay answered {} for {}", response.code(), message.to);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

/// Keeps delivered messages in memory. Addresses registered with
/// [`MemoryTransport::reject`] fail.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    delivered: Vec<Message>,
    rejected: HashSet<String>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        MemoryTransport::default()
    }

    pub fn reject(self, recipient: impl Into<String>) -> Self {
        if let Ok(mut inner) = self.inner.lock() {
            inner.rejected.insert(recipient.into());
        }
        self
    }

    pub fn delivered(&self) -> Vec<Message> {
        self.inner
            .lock()
            .map(|inner| inner.delivered.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn deliver(&self, message: &Message) -> Result<(), DeliveryError> {
        let mut inner = self.inner.lock().map_err(|_| DeliveryError::Rejected {
            recipient: message.to.clone(),
            reason: "transport state poisoned".to_string(),
        })?;
        if inner.rejected.contains(&message.to) {
            return Err(DeliveryError::Rejected {
                recipient: message.to.clone(),
                reason: "address refused".to_string(),
            });
        }
        inner.delivered.push(message.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Batches
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Campaign {
    pub id: String,
    pub subject: String,
    /// `From` mailbox, e.g. `News <news@example.com>`.
    pub from: String,
}

#[derive(Debug)]
pub struct RecipientOutcome {
    pub email: String,
    /// The message id on success.
    pub result: Result<String, DeliveryError>,
}

#[derive(Debug, Default)]
pub struct DeliveryReport {
    pub sent: usize,
    pub failed: usize,
    /// One entry per recipient, in input order.
    pub results: Vec<RecipientOutcome>,
}

/// Recipient addresses from a list file: one per line, blank lines and
/// `#` comments ignored, duplicates dropped.
pub fn parse_recipients(source: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| seen.insert(line.to_ascii_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Personalize `template` for every recipient and deliver all copies
/// concurrently.
pub async fn send_batch(
    transport: &dyn Transport,
    template: &str,
    campaign: &Campaign,
    recipients: &[String],
) -> DeliveryReport {
    let sends = recipients.iter().map(|email| async move {
        let result = send_one(transport, template, campaign, email).await;
        match &result {
            Ok(id) => info!("sent to {} via {} ({})", email, transport.name(), id),
            Err(err) => warn!("failed to send to {}: {}", email, err),
        }
        RecipientOutcome {
            email: email.clone(),
            result,
        }
    });
    let results = join_all(sends).await;

    let sent = results.iter().filter(|r| r.result.is_ok()).count();
    let report = DeliveryReport {
        sent,
        failed: results.len() - sent,
        results,
    };
    info!(
        "campaign {}: {} sent, {} failed",
        campaign.id, report.sent, report.failed
    );
    report
}

async fn send_one(
    transport: &dyn Transport,
    template: &str,
    campaign: &Campaign,
    email: &str,
) -> Result<String, DeliveryError> {
    let from: Mailbox = campaign
        .from
        .parse()
        .map_err(|_| DeliveryError::InvalidSender(campaign.from.clone()))?;
    let values = Personalization::new(email, &campaign.subject, &campaign.id);
    let message = Message::new(
        &from,
        email,
        &campaign.subject,
        &values.message_id,
        personalize(template, &values),
    )?;
    transport.deliver(&message).await?;
    Ok(message.message_id)
}
