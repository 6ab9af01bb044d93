//! Twilio REST implementation of the [`Notifier`] capability.

use async_trait::async_trait;
use tracing::debug;

use crate::destination;
use crate::error::NotifyError;
use crate::notifier::Notifier;

const DEFAULT_API_BASE: &str = "https://api.twilio.com";

/// Provider credentials and sender identities.
#[derive(Debug, Clone)]
pub struct TwilioSettings {
    pub account_sid: String,
    pub auth_token: String,
    /// WhatsApp sender, `whatsapp:+...`.
    pub whatsapp_from: String,
    /// SMS sender number (E.164). Ignored when a messaging service is set.
    pub sms_from: Option<String>,
    /// Preferred over `sms_from` for SMS traffic.
    pub messaging_service_sid: Option<String>,
}

pub struct TwilioNotifier {
    http: reqwest::Client,
    settings: TwilioSettings,
    api_base: String,
}

impl TwilioNotifier {
    pub fn new(settings: TwilioSettings) -> Result<Self, NotifyError> {
        if settings.account_sid.is_empty() || settings.auth_token.is_empty() {
            return Err(NotifyError::MissingCredentials);
        }

        Ok(Self {
            http: reqwest::Client::new(),
            settings,
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    /// Points the client at a different API host. Test hook.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Builds the form body for one message, selecting the sender by
    /// destination type.
    fn message_params(
        &self,
        destination: &str,
        body: &str,
        media_url: Option<&str>,
    ) -> Result<Vec<(&'static str, String)>, NotifyError> {
        let mut params: Vec<(&'static str, String)> = Vec::with_capacity(4);

        if destination::is_whatsapp(destination) {
            params.push(("To", destination.to_string()));
            params.push((
                "From",
                destination::normalize_whatsapp(&self.settings.whatsapp_from),
            ));
        } else if let Some(service) = &self.settings.messaging_service_sid {
            params.push(("To", destination.to_string()));
            params.push(("MessagingServiceSid", service.clone()));
        } else if let Some(from) = &self.settings.sms_from {
            params.push(("To", destination.to_string()));
            params.push(("From", from.clone()));
        } else {
            return Err(NotifyError::MissingSender(destination.to_string()));
        }

        params.push(("Body", body.to_string()));
        if let Some(url) = media_url {
            params.push(("MediaUrl", url.to_string()));
        }
        Ok(params)
    }
}

#[async_trait]
impl Notifier for TwilioNotifier {
    async fn send(
        &self,
        destination: &str,
        body: &str,
        media_url: Option<&str>,
    ) -> Result<String, NotifyError> {
        let params = self.message_params(destination, body, media_url)?;
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, self.settings.account_sid
        );

        debug!(destination, "Sending message via Twilio");
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.settings.account_sid, Some(&self.settings.auth_token))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let payload: serde_json::Value = response.json().await?;
        let sid = payload
            .get("sid")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        Ok(sid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> TwilioSettings {
        TwilioSettings {
            account_sid: "AC0000".into(),
            auth_token: "secret".into(),
            whatsapp_from: "whatsapp:+14155238886".into(),
            sms_from: Some("+15005550006".into()),
            messaging_service_sid: None,
        }
    }

    #[test]
    fn rejects_empty_credentials() {
        let mut s = settings();
        s.auth_token.clear();
        assert!(matches!(
            TwilioNotifier::new(s),
            Err(NotifyError::MissingCredentials)
        ));
    }

    #[test]
    fn whatsapp_destination_uses_whatsapp_sender() {
        let notifier = TwilioNotifier::new(settings()).unwrap();
        let params = notifier
            .message_params("whatsapp:+628111", "hello", None)
            .unwrap();
        assert!(params.contains(&("From", "whatsapp:+14155238886".to_string())));
    }

    #[test]
    fn sms_prefers_messaging_service_over_from_number() {
        let mut s = settings();
        s.messaging_service_sid = Some("MG1234".into());
        let notifier = TwilioNotifier::new(s).unwrap();
        let params = notifier.message_params("+628111", "hello", None).unwrap();
        assert!(params.contains(&("MessagingServiceSid", "MG1234".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "From"));
    }

    #[test]
    fn sms_without_any_sender_is_a_config_error() {
        let mut s = settings();
        s.sms_from = None;
        s.messaging_service_sid = None;
        let notifier = TwilioNotifier::new(s).unwrap();
        assert!(matches!(
            notifier.message_params("+628111", "hello", None),
            Err(NotifyError::MissingSender(_))
        ));
    }

    #[test]
    fn media_url_rides_along_when_present() {
        let notifier = TwilioNotifier::new(settings()).unwrap();
        let params = notifier
            .message_params("+628111", "hello", Some("https://example.org/frame.jpg"))
            .unwrap();
        assert!(params.contains(&("MediaUrl", "https://example.org/frame.jpg".to_string())));
    }
}
