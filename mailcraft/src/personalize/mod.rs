//! The placeholder-token contract between the exporter and the sending stage.
//!
//! Exported templates carry `{{name}}` tokens (in the tracking pixel, the
//! unsubscribe link, or anywhere an author typed them). Before delivery each
//! copy is personalized by textual substitution.

use std::fmt;
use std::ops::Range;

use chrono::{DateTime, SecondsFormat, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use uuid::Uuid;

/// Characters left alone by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A recognized `{{token}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    Email,
    Subject,
    CampaignId,
    SentAt,
    /// Older spelling of `SentAt`; receives the same timestamp.
    SentTime,
    /// A per-message unique id.
    SomeId,
}

impl Placeholder {
    pub const ALL: [Placeholder; 6] = [
        Placeholder::Email,
        Placeholder::Subject,
        Placeholder::CampaignId,
        Placeholder::SentAt,
        Placeholder::SentTime,
        Placeholder::SomeId,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Placeholder::Email => "email",
            Placeholder::Subject => "subject",
            Placeholder::CampaignId => "campaignId",
            Placeholder::SentAt => "sentAt",
            Placeholder::SentTime => "sentTime",
            Placeholder::SomeId => "someId",
        }
    }

    /// The token as it appears in a template.
    pub fn token(&self) -> &'static str {
        match self {
            Placeholder::Email => "{{email}}",
            Placeholder::Subject => "{{subject}}",
            Placeholder::CampaignId => "{{campaignId}}",
            Placeholder::SentAt => "{{sentAt}}",
            Placeholder::SentTime => "{{sentTime}}",
            Placeholder::SomeId => "{{someId}}",
        }
    }

    pub fn from_name(name: &str) -> Option<Placeholder> {
        Placeholder::ALL.into_iter().find(|p| p.name() == name)
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// One `{{...}}` occurrence in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMatch {
    /// The name between the braces, trimmed.
    pub name: String,
    pub placeholder: Option<Placeholder>,
    /// Byte range of the token, braces included.
    pub span: Range<usize>,
}

/// Find every `{{name}}` token in `html`, recognized or not.
pub fn scan(html: &str) -> Vec<TokenMatch> {
    let mut found = Vec::new();
    let mut search = 0;
    while let Some(open) = html[search..].find("{{").map(|p| search + p) {
        let Some(close) = html[open + 2..].find("}}").map(|p| open + 2 + p) else {
            break;
        };
        let name = html[open + 2..close].trim();
        let is_ident = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');
        if is_ident {
            found.push(TokenMatch {
                name: name.to_string(),
                placeholder: Placeholder::from_name(name),
                span: open..close + 2,
            });
            search = close + 2;
        } else {
            search = open + 2;
        }
    }
    found
}

/// Per-recipient values for the placeholder tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct Personalization {
    pub email: String,
    pub subject: String,
    pub campaign_id: String,
    pub sent_at: DateTime<Utc>,
    pub message_id: String,
}

impl Personalization {
    /// Values for one recipient, stamped with the current time and a fresh
    /// message id.
    pub fn new(
        email: impl Into<String>,
        subject: impl Into<String>,
        campaign_id: impl Into<String>,
    ) -> Self {
        Personalization {
            email: email.into(),
            subject: subject.into(),
            campaign_id: campaign_id.into(),
            sent_at: Utc::now(),
            message_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn sent_at(mut self, at: DateTime<Utc>) -> Self {
        self.sent_at = at;
        self
    }

    pub fn message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = id.into();
        self
    }

    /// Substitution text for `placeholder`. The subject is percent-encoded
    /// because the exporter only places it inside URLs.
    pub fn value(&self, placeholder: Placeholder) -> String {
        match placeholder {
            Placeholder::Email => self.email.clone(),
            Placeholder::Subject => utf8_percent_encode(&self.subject, URI_COMPONENT).to_string(),
            Placeholder::CampaignId => self.campaign_id.clone(),
            Placeholder::SentAt | Placeholder::SentTime => {
                self.sent_at.to_rfc3339_opts(SecondsFormat::Millis, true)
            }
            Placeholder::SomeId => self.message_id.clone(),
        }
    }
}

/// Replace every recognized token in `html`. Unrecognized tokens are left
/// as written.
pub fn personalize(html: &str, values: &Personalization) -> String {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for token in scan(html) {
        let Some(placeholder) = token.placeholder else {
            continue;
        };
        out.push_str(&html[last..token.span.start]);
        out.push_str(&values.value(placeholder));
        last = token.span.end;
    }
    out.push_str(&html[last..]);
    out
}
