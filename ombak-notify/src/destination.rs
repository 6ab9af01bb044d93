//! Destination address normalization.
//!
//! Operators supply phone numbers in whatever shape their address book has;
//! the provider wants `whatsapp:+E164` for WhatsApp and bare `+E164` for
//! SMS. Normalization happens once, before any send.

const WHATSAPP_PREFIX: &str = "whatsapp:";

/// Splits a comma-separated recipient list, trimming blanks.
pub fn split_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// True when the destination addresses a WhatsApp endpoint.
#[inline]
pub fn is_whatsapp(destination: &str) -> bool {
    destination.starts_with(WHATSAPP_PREFIX)
}

/// Ensures the `whatsapp:` prefix.
pub fn normalize_whatsapp(destination: &str) -> String {
    let destination = destination.trim();
    if is_whatsapp(destination) {
        destination.to_string()
    } else {
        format!("{WHATSAPP_PREFIX}{destination}")
    }
}

/// Strips a `whatsapp:` prefix, leaving the bare E.164 number.
pub fn normalize_sms(destination: &str) -> String {
    destination
        .trim()
        .strip_prefix(WHATSAPP_PREFIX)
        .unwrap_or(destination.trim())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_trims_recipient_lists() {
        assert_eq!(
            split_recipients(" +628111 , whatsapp:+628222 ,, "),
            vec!["+628111".to_string(), "whatsapp:+628222".to_string()]
        );
        assert!(split_recipients("").is_empty());
    }

    #[test]
    fn whatsapp_prefix_is_added_once() {
        assert_eq!(normalize_whatsapp("+628111"), "whatsapp:+628111");
        assert_eq!(normalize_whatsapp("whatsapp:+628111"), "whatsapp:+628111");
    }

    #[test]
    fn sms_destinations_lose_the_prefix() {
        assert_eq!(normalize_sms("whatsapp:+628111"), "+628111");
        assert_eq!(normalize_sms("+628111"), "+628111");
    }
}
