//! Phase-based access gating
//!
//! The gate is a pure decision function consulted on every request for a
//! protected resource. It never caches: a client-side "already signed"
//! hint may avoid a redirect flash, but the server re-decides each time.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agreement::AgreementConfig;
use crate::error::Error;
use crate::hash::DocumentHash;
use crate::role::Role;
use crate::signature::{validate_integrity, NdaSignature};

/// Due-diligence phase tag attached to documents and routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    P1,
    P2,
    P3,
    P4,
    P5,
    Legal,
    /// Ungated default for anything without a recognized phase tag
    General,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::P1 => "p1",
            Phase::P2 => "p2",
            Phase::P3 => "p3",
            Phase::P4 => "p4",
            Phase::P5 => "p5",
            Phase::Legal => "legal",
            Phase::General => "general",
        }
    }

    /// Lenient mapping for request paths: unrecognized tags fall back to
    /// the ungated default rather than erroring.
    pub fn from_tag(tag: &str) -> Phase {
        Phase::from_str(tag).unwrap_or(Phase::General)
    }
}

impl FromStr for Phase {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "p1" => Ok(Phase::P1),
            "p2" => Ok(Phase::P2),
            "p3" => Ok(Phase::P3),
            "p4" => Ok(Phase::P4),
            "p5" => Ok(Phase::P5),
            "legal" => Ok(Phase::Legal),
            "general" => Ok(Phase::General),
            other => Err(Error::UnknownPhase(other.to_string())),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DenyReason {
    NdaRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny(DenyReason),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow)
    }
}

/// Decide whether a role with the given signature state may access a
/// resource in the given phase. Rules run in order:
///
/// 1. Exempt roles are always allowed.
/// 2. Ungated phases are always allowed.
/// 3. A stored signature that passes integrity validation allows access.
/// 4. Everything else is denied with `NdaRequired`.
pub fn decide(
    role: Role,
    signature: Option<&NdaSignature>,
    current_hash: &DocumentHash,
    phase: Phase,
    config: &AgreementConfig,
    now: DateTime<Utc>,
) -> AccessDecision {
    if config.is_exempt(role) {
        return AccessDecision::Allow;
    }
    if !config.phase_is_gated(phase) {
        return AccessDecision::Allow;
    }
    if let Some(sig) = signature {
        if validate_integrity(sig, current_hash, config, now).is_ok() {
            return AccessDecision::Allow;
        }
    }
    AccessDecision::Deny(DenyReason::NdaRequired)
}
