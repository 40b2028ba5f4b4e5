//! Typed identity-provider event envelope.
//!
//! Events arrive as JSON `{type, data}`. Only `user.created` carries
//! domain meaning here; every other type is acknowledged and dropped.

use serde::Deserialize;

use crate::error::WebhookError;
use crate::store::NewUser;

/// Raw envelope shape shared by all event types.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// A verified identity event.
#[derive(Debug)]
pub enum IdentityEvent {
    /// A new account was created at the identity provider.
    UserCreated(UserCreatedData),
    /// Any event type this service does not act on.
    Unknown { event_type: String },
}

/// Payload of a `user.created` event, in the provider's wire names.
#[derive(Debug, Deserialize)]
pub struct UserCreatedData {
    pub id: String,
    #[serde(default)]
    pub email_addresses: Vec<EmailEntry>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmailEntry {
    pub email_address: String,
}

impl IdentityEvent {
    /// Parse a verified raw body into a typed event.
    ///
    /// Unrecognized event types parse successfully into
    /// [`IdentityEvent::Unknown`]; only a body that fails to decode as an
    /// envelope, or a `user.created` body with an unusable `data` object,
    /// is an error.
    pub fn from_bytes(body: &[u8]) -> Result<Self, WebhookError> {
        let envelope: Envelope =
            serde_json::from_slice(body).map_err(|_| WebhookError::MalformedPayload)?;

        match envelope.event_type.as_str() {
            "user.created" => {
                let data: UserCreatedData = serde_json::from_value(envelope.data)
                    .map_err(|_| WebhookError::MalformedPayload)?;
                Ok(IdentityEvent::UserCreated(data))
            }
            _ => Ok(IdentityEvent::Unknown {
                event_type: envelope.event_type,
            }),
        }
    }
}

impl UserCreatedData {
    /// Map the provider payload onto the domain user shape.
    ///
    /// The first email entry is authoritative: `username` is its local
    /// part, `fullname` the trimmed space-join of first and last name.
    /// An empty email list is an upstream defect and fails the mapping.
    pub fn into_new_user(self) -> Result<NewUser, WebhookError> {
        let email = self
            .email_addresses
            .into_iter()
            .next()
            .map(|e| e.email_address)
            .ok_or(WebhookError::EmptyEmailList)?;

        let username = match email.split_once('@') {
            Some((local, _)) => local.to_string(),
            None => email.clone(),
        };

        let fullname = format!(
            "{} {}",
            self.first_name.unwrap_or_default(),
            self.last_name.unwrap_or_default()
        )
        .trim()
        .to_string();

        Ok(NewUser {
            external_id: self.id,
            email,
            fullname,
            image: self.image_url.unwrap_or_default(),
            username,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_created_body(data: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "type": "user.created",
            "data": data,
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_user_created() {
        let body = user_created_body(serde_json::json!({
            "id": "user_2abc",
            "email_addresses": [
                { "email_address": "jane@example.com" },
                { "email_address": "jane@work.example" },
            ],
            "first_name": "Jane",
            "last_name": "Doe",
            "image_url": "https://img.example/jane.png",
        }));

        let event = IdentityEvent::from_bytes(&body).unwrap();
        let data = match event {
            IdentityEvent::UserCreated(data) => data,
            other => panic!("expected UserCreated, got {:?}", other),
        };

        let user = data.into_new_user().unwrap();
        assert_eq!(user.external_id, "user_2abc");
        assert_eq!(user.email, "jane@example.com");
        assert_eq!(user.username, "jane");
        assert_eq!(user.fullname, "Jane Doe");
        assert_eq!(user.image, "https://img.example/jane.png");
    }

    #[test]
    fn test_parse_unknown_event_type() {
        let body = br#"{"type":"session.created","data":{"id":"sess_1"}}"#;
        let event = IdentityEvent::from_bytes(body).unwrap();
        match event {
            IdentityEvent::Unknown { event_type } => {
                assert_eq!(event_type, "session.created");
            }
            other => panic!("expected Unknown, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_malformed_body() {
        assert!(matches!(
            IdentityEvent::from_bytes(b"not json"),
            Err(WebhookError::MalformedPayload)
        ));
        // Envelope without a type field
        assert!(matches!(
            IdentityEvent::from_bytes(br#"{"data":{}}"#),
            Err(WebhookError::MalformedPayload)
        ));
        // user.created with no data object
        assert!(matches!(
            IdentityEvent::from_bytes(br#"{"type":"user.created"}"#),
            Err(WebhookError::MalformedPayload)
        ));
    }

    #[test]
    fn test_missing_names_become_empty_string() {
        let body = user_created_body(serde_json::json!({
            "id": "user_2abc",
            "email_addresses": [{ "email_address": "jane@example.com" }],
        }));

        let event = IdentityEvent::from_bytes(&body).unwrap();
        let data = match event {
            IdentityEvent::UserCreated(data) => data,
            other => panic!("expected UserCreated, got {:?}", other),
        };

        let user = data.into_new_user().unwrap();
        assert_eq!(user.fullname, "");
        assert_eq!(user.image, "");
    }

    #[test]
    fn test_single_name_is_trimmed() {
        let data = UserCreatedData {
            id: "user_2abc".to_string(),
            email_addresses: vec![EmailEntry {
                email_address: "jane@example.com".to_string(),
            }],
            first_name: Some("Jane".to_string()),
            last_name: None,
            image_url: None,
        };

        let user = data.into_new_user().unwrap();
        assert_eq!(user.fullname, "Jane");
    }

    #[test]
    fn test_null_names_accepted() {
        let body = user_created_body(serde_json::json!({
            "id": "user_2abc",
            "email_addresses": [{ "email_address": "jane@example.com" }],
            "first_name": null,
            "last_name": null,
            "image_url": null,
        }));

        let event = IdentityEvent::from_bytes(&body).unwrap();
        let data = match event {
            IdentityEvent::UserCreated(data) => data,
            other => panic!("expected UserCreated, got {:?}", other),
        };

        assert_eq!(data.into_new_user().unwrap().fullname, "");
    }

    #[test]
    fn test_empty_email_list_is_an_error() {
        let data = UserCreatedData {
            id: "user_2abc".to_string(),
            email_addresses: vec![],
            first_name: Some("Jane".to_string()),
            last_name: Some("Doe".to_string()),
            image_url: None,
        };

        assert!(matches!(
            data.into_new_user(),
            Err(WebhookError::EmptyEmailList)
        ));
    }

    #[test]
    fn test_username_without_at_sign_uses_whole_address() {
        let data = UserCreatedData {
            id: "user_2abc".to_string(),
            email_addresses: vec![EmailEntry {
                email_address: "not-an-email".to_string(),
            }],
            first_name: None,
            last_name: None,
            image_url: None,
        };

        assert_eq!(data.into_new_user().unwrap().username, "not-an-email");
    }
}
