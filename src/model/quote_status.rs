use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Lifecycle of a quote, from the artisan's draft to the client's answer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuoteStatus {
    #[default]
    Draft,
    Sent,
    Viewed,
    Accepted,
    Rejected,
    Expired,
    ConvertedToInvoice,
}

impl QuoteStatus {
    pub fn can_transition_to(self, next: QuoteStatus) -> bool {
        use QuoteStatus::*;
        matches!(
            (self, next),
            (Draft, Sent | Accepted | Rejected | Expired)
                | (Sent, Viewed | Accepted | Rejected | Expired | ConvertedToInvoice)
                | (Viewed, Accepted | Rejected | Expired | ConvertedToInvoice)
                | (Accepted, ConvertedToInvoice)
        )
    }

    /// No follow-up may stay active once a quote reaches one of these.
    pub fn is_final(self) -> bool {
        matches!(
            self,
            QuoteStatus::Accepted
                | QuoteStatus::Rejected
                | QuoteStatus::Expired
                | QuoteStatus::ConvertedToInvoice
        )
    }

    /// Content and financial settings may still change
    pub fn is_editable(self) -> bool {
        matches!(self, QuoteStatus::Draft | QuoteStatus::Sent | QuoteStatus::Viewed)
    }

    /// Statuses the artisan may set directly. Viewed, accepted and rejected
    /// come from the client, expired from the expiration sweep.
    pub fn settable_by_issuer(self) -> bool {
        matches!(self, QuoteStatus::Sent | QuoteStatus::ConvertedToInvoice)
    }

    /// Waiting on the client, follow-ups apply
    pub fn awaits_client(self) -> bool {
        matches!(self, QuoteStatus::Sent | QuoteStatus::Viewed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_snake_case_round_trip() {
        assert_eq!(QuoteStatus::ConvertedToInvoice.to_string(), "converted_to_invoice");
        assert_eq!(QuoteStatus::from_str("viewed").unwrap(), QuoteStatus::Viewed);
        assert!(QuoteStatus::from_str("archived").is_err());
    }

    #[test]
    fn test_final_states_have_no_way_back() {
        for status in QuoteStatus::iter().filter(|s| s.is_final()) {
            for next in [QuoteStatus::Draft, QuoteStatus::Sent, QuoteStatus::Viewed] {
                assert!(!status.can_transition_to(next), "{} -> {}", status, next);
            }
        }
    }

    #[test]
    fn test_issuer_cannot_set_client_answers() {
        let settable: Vec<_> = QuoteStatus::iter().filter(|s| s.settable_by_issuer()).collect();
        assert_eq!(settable, vec![QuoteStatus::Sent, QuoteStatus::ConvertedToInvoice]);
    }

    #[test]
    fn test_viewed_only_after_sent() {
        assert!(QuoteStatus::Sent.can_transition_to(QuoteStatus::Viewed));
        assert!(!QuoteStatus::Draft.can_transition_to(QuoteStatus::Viewed));
        assert!(!QuoteStatus::Accepted.can_transition_to(QuoteStatus::Viewed));
    }

    #[test]
    fn test_invoice_conversion() {
        assert!(QuoteStatus::Accepted.can_transition_to(QuoteStatus::ConvertedToInvoice));
        assert!(!QuoteStatus::Draft.can_transition_to(QuoteStatus::ConvertedToInvoice));
        assert!(!QuoteStatus::Rejected.can_transition_to(QuoteStatus::ConvertedToInvoice));
    }
}
