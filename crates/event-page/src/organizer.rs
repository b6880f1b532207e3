//! Tools shown to event organizers

use keygate_core::{ChainId, LockAddress};
use serde::Serialize;

use crate::event::CheckoutConfig;

/// Shorten an address to its first and last five characters
pub fn minify_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 13 {
        return address.to_string();
    }
    let head: String = chars[..5].iter().collect();
    let tail: String = chars[chars.len() - 5..].iter().collect();
    format!("{}...{}", head, tail)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManageAttendeesLink {
    pub lock_address: LockAddress,
    pub network: Option<ChainId>,
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifierSection {
    pub lock_address: LockAddress,
    pub network: Option<ChainId>,
    pub label: String,
    pub disabled: bool,
}

/// Organizer-only section of the event page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerTools {
    /// URL to share when promoting the event
    pub promote_url: String,
    pub manage_attendees: Vec<ManageAttendeesLink>,
    pub verifiers: Vec<VerifierSection>,
}

impl OrganizerTools {
    pub fn build(event_url: &str, checkout_config: &CheckoutConfig, is_organizer: bool) -> Self {
        let paywall = &checkout_config.config;
        let several_locks = paywall.locks.len() > 1;

        let manage_attendees = paywall
            .locks
            .iter()
            .map(|(address, entry)| {
                let label = if several_locks {
                    format!("Manage attendees for {}", minify_address(address.as_str()))
                } else {
                    "Manage attendees".to_string()
                };
                let href = match entry.network {
                    Some(network) => format!("/locks/lock?address={}&network={}", address, network),
                    None => format!("/locks/lock?address={}", address),
                };
                ManageAttendeesLink {
                    lock_address: address.clone(),
                    network: entry.network,
                    label,
                    href,
                }
            })
            .collect();

        let verifiers = paywall
            .locks
            .keys()
            .map(|address| VerifierSection {
                lock_address: address.clone(),
                network: paywall.network_for(address),
                label: format!("Verifiers for {}", minify_address(address.as_str())),
                disabled: !is_organizer,
            })
            .collect();

        Self {
            promote_url: event_url.to_string(),
            manage_attendees,
            verifiers,
        }
    }
}
