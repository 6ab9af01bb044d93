//! # ombak-notify
//!
//! Messaging-provider boundary. The dispatcher only knows the [`Notifier`]
//! capability; the Twilio REST implementation lives behind it. Delivery is
//! best effort: a send either yields a provider message reference or an
//! error for the dispatch outcome, never a retry loop.

pub mod destination;
mod error;
mod notifier;
mod twilio;

pub use error::NotifyError;
pub use notifier::Notifier;
pub use twilio::{TwilioNotifier, TwilioSettings};
