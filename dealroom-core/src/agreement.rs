//! Agreement configuration and template rendering

use chrono::Duration;

use crate::gate::Phase;
use crate::role::Role;

/// Agreement text template. Placeholders are substituted per signer so the
/// stored document hash is bound to the exact text each signer saw.
const AGREEMENT_TEMPLATE: &str = "\
NON-DISCLOSURE AGREEMENT

Version {{version}} — Effective {{effective_date}}

This Non-Disclosure Agreement (the \"Agreement\") is entered into between
the seller of the healthcare business referred to as \"the Company\" and
{{name}} ({{email}}) (the \"Recipient\").

1. The Recipient will receive access to confidential materials concerning
   the Company, including financial statements, contracts, regulatory
   filings, patient-volume data and other due-diligence documents.

2. The Recipient agrees to use such materials solely for the purpose of
   evaluating a potential transaction involving the Company, and to
   disclose them to no third party without prior written consent.

3. The Recipient will return or destroy all confidential materials upon
   request or upon termination of discussions.

4. This Agreement is legally binding and remains in force for two years
   from the date of signature.

By signing below, the Recipient acknowledges having read and understood
this Agreement and agrees to be bound by its terms.
";

/// Generic placeholders used when no authenticated signer is present
const GENERIC_NAME: &str = "[Recipient Name]";
const GENERIC_EMAIL: &str = "[Recipient Email]";

/// Identity snapshot substituted into the agreement template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signer {
    pub name: String,
    pub email: String,
}

impl Signer {
    /// Build a signer from the optional identity fields the auth layer
    /// provides. The same derivation must be used at signing time and at
    /// every later re-hash, otherwise integrity checks would fail for
    /// records that were never tampered with.
    pub fn from_identity(name: Option<&str>, email: Option<&str>) -> Self {
        let email = email.unwrap_or_default().to_string();
        let name = match name {
            Some(n) if !n.trim().is_empty() => n.to_string(),
            _ if !email.is_empty() => email.clone(),
            _ => "Authorized Signatory".to_string(),
        };
        Signer { name, email }
    }
}

/// Agreement rules in force: version, validity window, which roles must
/// sign, which are exempt, and which document phases are gated.
#[derive(Debug, Clone)]
pub struct AgreementConfig {
    pub version: String,
    pub effective_date: String,
    /// How long a signature remains valid after signing
    pub validity: Duration,
    /// Roles that never need to sign
    pub exempt_roles: Vec<Role>,
    /// Roles whose signature state must be consulted
    pub required_roles: Vec<Role>,
    /// Document phases that require a valid signature
    pub gated_phases: Vec<Phase>,
}

impl Default for AgreementConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            effective_date: "2025-01-01".to_string(),
            validity: Duration::days(730),
            exempt_roles: vec![Role::Admin],
            required_roles: vec![Role::Buyer, Role::Lawyer, Role::Viewer],
            gated_phases: vec![Phase::P2, Phase::P3, Phase::P4, Phase::P5, Phase::Legal],
        }
    }
}

impl AgreementConfig {
    pub fn is_exempt(&self, role: Role) -> bool {
        self.exempt_roles.contains(&role)
    }

    pub fn requires_nda(&self, role: Role) -> bool {
        self.required_roles.contains(&role)
    }

    pub fn phase_is_gated(&self, phase: Phase) -> bool {
        self.gated_phases.contains(&phase)
    }
}

/// Render the agreement for a signer, or with generic placeholders when
/// no signer is known.
pub fn render_agreement(config: &AgreementConfig, signer: Option<&Signer>) -> String {
    let (name, email) = match signer {
        Some(s) => (s.name.as_str(), s.email.as_str()),
        None => (GENERIC_NAME, GENERIC_EMAIL),
    };
    AGREEMENT_TEMPLATE
        .replace("{{version}}", &config.version)
        .replace("{{effective_date}}", &config.effective_date)
        .replace("{{name}}", name)
        .replace("{{email}}", email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_signer() {
        let config = AgreementConfig::default();
        let signer = Signer {
            name: "Jordan Blake".to_string(),
            email: "jordan@buyer.example".to_string(),
        };
        let content = render_agreement(&config, Some(&signer));
        assert!(content.contains("Jordan Blake"));
        assert!(content.contains("jordan@buyer.example"));
        assert!(content.contains(&config.version));
        assert!(!content.contains("{{"));
    }

    #[test]
    fn test_render_uses_generic_defaults_when_unauthenticated() {
        let config = AgreementConfig::default();
        let content = render_agreement(&config, None);
        assert!(content.contains(GENERIC_NAME));
        assert!(content.contains(GENERIC_EMAIL));
    }

    #[test]
    fn test_render_is_deterministic() {
        let config = AgreementConfig::default();
        let signer = Signer::from_identity(Some("A"), Some("a@example.com"));
        assert_eq!(
            render_agreement(&config, Some(&signer)),
            render_agreement(&config, Some(&signer))
        );
    }

    #[test]
    fn test_signer_from_identity_fallbacks() {
        let s = Signer::from_identity(None, Some("a@example.com"));
        assert_eq!(s.name, "a@example.com");

        let s = Signer::from_identity(None, None);
        assert_eq!(s.name, "Authorized Signatory");
        assert_eq!(s.email, "");

        let s = Signer::from_identity(Some("A"), Some("a@example.com"));
        assert_eq!(s.name, "A");
    }

    #[test]
    fn test_default_role_sets() {
        let config = AgreementConfig::default();
        assert!(config.is_exempt(Role::Admin));
        assert!(!config.is_exempt(Role::Buyer));
        assert!(config.requires_nda(Role::Buyer));
        assert!(config.requires_nda(Role::Lawyer));
        assert!(config.requires_nda(Role::Viewer));
        assert!(!config.requires_nda(Role::Admin));
    }
}
