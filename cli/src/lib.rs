//! Support code for the `mailcraft` binary: configuration loading and
//! campaign delivery over an outbox directory or an SMTP relay.

pub mod config;
pub mod delivery;

pub use config::{Config, ConfigError, DeliveryConfig, SmtpConfig};
pub use delivery::{
    Campaign, DeliveryError, DeliveryReport, MemoryTransport, Message, OutboxTransport,
    RecipientOutcome, SmtpTransport, Transport, parse_recipients, send_batch,
};
