//! Stored-profile schema migration.
//!
//! Two shapes have been written under the profile key:
//!
//! - **V1**: `{fullName, email, year, domain, position}` (single domain)
//! - **V2**: `{fullName, email, year, domains[], position, company?}`
//!
//! A well-formed V2 payload is returned exactly as stored. Anything else is
//! detected, migrated V1 → V2 explicitly, and has each missing or mistyped
//! field filled with its default. Loading never fails.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::model::UserProfile;

/// Top-level fields of a stored payload. Repeated keys keep the last value.
type Fields = Map<String, Value>;

/// Which historical shape a stored payload was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProfileShape {
    /// Single `domain` string, no `company`.
    V1,
    /// `domains` list with optional `company`.
    V2,
}

/// V1 payload after field-level defaulting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ProfileV1 {
    full_name: String,
    email: String,
    year: String,
    domain: String,
    position: String,
}

impl From<ProfileV1> for UserProfile {
    fn from(v1: ProfileV1) -> Self {
        let domains = if v1.domain.is_empty() {
            Vec::new()
        } else {
            vec![v1.domain]
        };
        UserProfile {
            full_name: v1.full_name,
            email: v1.email,
            year: v1.year,
            domains,
            position: v1.position,
            company: None,
        }
    }
}

fn detect_shape(fields: &Fields) -> ProfileShape {
    let present = |key: &str| fields.get(key).is_some_and(|v| !v.is_null());
    if !present("domains") && present("domain") {
        ProfileShape::V1
    } else {
        ProfileShape::V2
    }
}

/// Turn whatever is stored under the profile key into a current profile.
pub fn migrate_profile(raw: &str) -> UserProfile {
    let value = match serde_json::from_str::<Value>(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Stored profile is not JSON, using defaults");
            return UserProfile::default();
        }
    };
    let Some(fields) = value.as_object() else {
        warn!("Stored profile is not a JSON object, using defaults");
        return UserProfile::default();
    };

    match detect_shape(fields) {
        ProfileShape::V1 => {
            debug!("Migrating V1 profile (single domain)");
            v1_from(fields).into()
        }
        ProfileShape::V2 => match UserProfile::deserialize(&value) {
            Ok(profile) if !(profile.domains.is_empty() && has_legacy_domain(fields)) => profile,
            Ok(_) => {
                debug!("Profile has no domains, upgrading legacy domain");
                lenient_v2(fields)
            }
            Err(e) => {
                debug!(error = %e, "Profile is partial, filling defaults");
                lenient_v2(fields)
            }
        },
    }
}

fn has_legacy_domain(fields: &Fields) -> bool {
    !text(fields.get("domain")).is_empty()
}

fn v1_from(fields: &Fields) -> ProfileV1 {
    ProfileV1 {
        full_name: text(fields.get("fullName")),
        email: text(fields.get("email")),
        year: text(fields.get("year")),
        domain: text(fields.get("domain")),
        position: text(fields.get("position")),
    }
}

fn lenient_v2(fields: &Fields) -> UserProfile {
    let mut domains = tags(fields.get("domains"));
    if domains.is_empty() {
        domains = tags(fields.get("domain"));
    }
    UserProfile {
        full_name: text(fields.get("fullName")),
        email: text(fields.get("email")),
        year: text(fields.get("year")),
        domains,
        position: text(fields.get("position")),
        company: Some(text(fields.get("company"))).filter(|c| !c.is_empty()),
    }
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        _ => String::new(),
    }
}

/// A list of tags; a bare string counts as a single tag.
fn tags(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}
