//! Notification channel and provider configuration.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// All outbound alerting configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct ChannelsConfig {
    /// Routine high-wave warnings over WhatsApp.
    #[validate(nested)]
    #[serde(default)]
    pub routine_whatsapp: RoutineChannelConfig,

    /// Routine high-wave warnings over SMS.
    #[validate(nested)]
    #[serde(default)]
    pub routine_sms: RoutineChannelConfig,

    /// Tsunami escalation warnings over WhatsApp. Gated by the escalation
    /// tracker, so it carries no cooldown of its own.
    #[validate(nested)]
    #[serde(default)]
    pub tsunami_whatsapp: EscalationChannelConfig,

    /// Messaging provider credentials and senders.
    #[validate(nested)]
    #[serde(default)]
    pub twilio: TwilioConfig,

    /// Per-call provider timeout in seconds; an expired call counts as a
    /// failed attempt and still consumes the channel cooldown.
    #[serde(default = "default_provider_timeout")]
    #[validate(range(min = 1, max = 120))]
    pub provider_timeout_secs: u64,
}

fn default_provider_timeout() -> u64 {
    10
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            routine_whatsapp: RoutineChannelConfig::default(),
            routine_sms: RoutineChannelConfig::default(),
            tsunami_whatsapp: EscalationChannelConfig::default(),
            twilio: TwilioConfig::default(),
            provider_timeout_secs: default_provider_timeout(),
        }
    }
}

/// One severity-gated routine channel.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct RoutineChannelConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Minimum seconds between two attempts on this channel.
    #[serde(default = "default_channel_cooldown")]
    #[validate(range(min = 30, max = 3600))]
    pub cooldown_secs: u64,

    /// Destination numbers, E.164 with optional `whatsapp:` prefix.
    #[validate(custom(function = validation::validate_recipients))]
    #[serde(default)]
    pub recipients: Vec<String>,
}

fn default_channel_cooldown() -> u64 {
    300
}

impl Default for RoutineChannelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cooldown_secs: default_channel_cooldown(),
            recipients: Vec::new(),
        }
    }
}

/// The escalation channel: enable flag and destinations only.
#[derive(Default, Debug, Serialize, Deserialize, Validate, Clone)]
pub struct EscalationChannelConfig {
    #[serde(default)]
    pub enabled: bool,

    #[validate(custom(function = validation::validate_recipients))]
    #[serde(default)]
    pub recipients: Vec<String>,
}

/// Twilio credentials and sender identities.
///
/// Fields left empty in the file are hydrated from the conventional
/// `TWILIO_*` environment variables at load time, so credentials can stay
/// out of the YAML entirely.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct TwilioConfig {
    #[serde(default)]
    pub account_sid: String,

    #[serde(default)]
    pub auth_token: String,

    /// WhatsApp sender, `whatsapp:+...`. Defaults to the Twilio sandbox
    /// number when unset.
    #[serde(default = "default_whatsapp_from")]
    pub whatsapp_from: String,

    /// SMS sender number (E.164). Ignored when a messaging service is set.
    #[serde(default)]
    pub sms_from: Option<String>,

    /// Preferred over `sms_from` for production SMS traffic.
    #[serde(default)]
    pub messaging_service_sid: Option<String>,
}

fn default_whatsapp_from() -> String {
    "whatsapp:+14155238886".into()
}

impl Default for TwilioConfig {
    fn default() -> Self {
        Self {
            account_sid: String::new(),
            auth_token: String::new(),
            whatsapp_from: default_whatsapp_from(),
            sms_from: None,
            messaging_service_sid: None,
        }
    }
}

impl TwilioConfig {
    /// Fills empty fields from `TWILIO_*` environment variables.
    pub fn hydrate_from_env(&mut self) {
        let fill = |slot: &mut String, var: &str| {
            if slot.is_empty() {
                if let Ok(value) = std::env::var(var) {
                    *slot = value;
                }
            }
        };
        fill(&mut self.account_sid, "TWILIO_ACCOUNT_SID");
        fill(&mut self.auth_token, "TWILIO_AUTH_TOKEN");
        fill(&mut self.whatsapp_from, "TWILIO_WHATSAPP_FROM");

        if self.sms_from.is_none() {
            self.sms_from = std::env::var("TWILIO_SMS_FROM").ok();
        }
        if self.messaging_service_sid.is_none() {
            self.messaging_service_sid = std::env::var("TWILIO_MESSAGING_SERVICE_SID").ok();
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.account_sid.is_empty() && !self.auth_token.is_empty()
    }
}

impl ChannelsConfig {
    /// True when the operator enabled at least one channel.
    pub fn any_enabled(&self) -> bool {
        self.routine_whatsapp.enabled || self.routine_sms.enabled || self.tsunami_whatsapp.enabled
    }
}
