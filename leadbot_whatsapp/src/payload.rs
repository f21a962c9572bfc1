//! Webhook payload model for the WhatsApp Cloud API.
//!
//! Only the fields the intake flow needs are modeled; everything else in
//! the notification is ignored. Missing arrays deserialize as empty.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Change {
    /// Subscription field; only `messages` changes carry inbound messages.
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub value: Option<ChangeValue>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub phone_number_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub wa_id: String,
    #[serde(default)]
    pub profile: Option<Profile>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub from: String,
    /// Unix seconds, sent as a string.
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: Option<TextBody>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TextBody {
    #[serde(default)]
    pub body: String,
}

/// A text message ready to be handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundText {
    pub message_id: String,
    pub contact_id: String,
    /// Raw body; the engine normalizes it.
    pub text: String,
    pub display_name: String,
    pub timestamp: Option<i64>,
}

/// Collect the text messages of a notification in delivery order.
///
/// Non-text messages (media, reactions, status updates) are skipped, as are
/// changes for a subscription field other than `messages` and changes addressed to a phone number other than `expected_phone_number_id`
/// when both sides are known. The display name comes from the contact whose
/// `wa_id` matches the sender, falling back to the first contact listed.
#[must_use]
pub fn extract_inbound(payload: &WebhookPayload, expected_phone_number_id: &str) -> Vec<InboundText> {
    let mut inbound = Vec::new();

    for value in payload
        .entry
        .iter()
        .flat_map(|entry| &entry.changes)
        .filter(|change| change.field.as_deref().is_none_or(|field| field == "messages"))
        .filter_map(|change| change.value.as_ref())
    {
        let target = value
            .metadata
            .as_ref()
            .and_then(|m| m.phone_number_id.as_deref())
            .unwrap_or("");
        if !expected_phone_number_id.is_empty() && !target.is_empty() && target != expected_phone_number_id {
            continue;
        }

        for message in &value.messages {
            if message.kind != "text" {
                continue;
            }
            let Some(text) = message.text.as_ref() else {
                continue;
            };

            let display_name = value
                .contacts
                .iter()
                .find(|c| c.wa_id == message.from)
                .or_else(|| value.contacts.first())
                .and_then(|c| c.profile.as_ref())
                .map(|p| p.name.clone())
                .unwrap_or_default();

            inbound.push(InboundText {
                message_id: message.id.clone(),
                contact_id: message.from.clone(),
                text: text.body.clone(),
                display_name,
                timestamp: message
                    .timestamp
                    .as_deref()
                    .and_then(|t| t.trim().parse().ok()),
            });
        }
    }

    inbound
}
