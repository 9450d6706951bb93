//! User profile, signup form and the signup catalogs.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+$").expect("email pattern is valid")
});

/// Profile collected at signup and threaded through the rest of the flow.
///
/// Stored as JSON under [`super::store::PROFILE_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub full_name: String,
    pub email: String,
    /// Academic year tag, e.g. `"3rd"` or `"graduate"`.
    pub year: String,
    /// Interview topics, e.g. `["web", "dsa"]`.
    pub domains: Vec<String>,
    /// Target position tag, e.g. `"software-engineer"`.
    pub position: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl UserProfile {
    /// Domains joined for display, using catalog labels where known.
    pub fn domains_label(&self) -> String {
        self.domains
            .iter()
            .map(|d| label_for(DOMAINS, d))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn position_label(&self) -> &str {
        label_for(POSITIONS, &self.position)
    }

    pub fn year_label(&self) -> &str {
        label_for(ACADEMIC_YEARS, &self.year)
    }

    /// Uppercased first letter of the name, for the chat avatar.
    pub fn initial(&self) -> Option<char> {
        self.full_name
            .trim()
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
    }
}

/// Raw signup form as submitted by the page. Every field may be blank.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignupForm {
    pub full_name: String,
    pub email: String,
    pub year: String,
    pub domains: Vec<String>,
    pub position: String,
    pub company: Option<String>,
}

impl SignupForm {
    /// Trim, check required fields, and produce the profile to persist.
    ///
    /// Missing fields are reported together, in form order.
    pub fn validate(self) -> Result<UserProfile, ValidationError> {
        let full_name = self.full_name.trim().to_string();
        let email = self.email.trim().to_string();
        let year = self.year.trim().to_string();
        let position = self.position.trim().to_string();
        let domains: Vec<String> = self
            .domains
            .iter()
            .map(|d| d.trim())
            .filter(|d| !d.is_empty())
            .map(String::from)
            .collect();
        let company = self
            .company
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let mut missing = Vec::new();
        if full_name.is_empty() {
            missing.push("fullName");
        }
        if email.is_empty() {
            missing.push("email");
        }
        if year.is_empty() {
            missing.push("year");
        }
        if domains.is_empty() {
            missing.push("domains");
        }
        if position.is_empty() {
            missing.push("position");
        }
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields { fields: missing });
        }

        if !EMAIL_RE.is_match(&email) {
            return Err(ValidationError::InvalidEmail { email });
        }

        Ok(UserProfile {
            full_name,
            email,
            year,
            domains,
            position,
            company,
        })
    }
}

/// One selectable option on the signup form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogOption {
    pub value: &'static str,
    pub label: &'static str,
}

const fn opt(value: &'static str, label: &'static str) -> CatalogOption {
    CatalogOption { value, label }
}

pub const ACADEMIC_YEARS: &[CatalogOption] = &[
    opt("1st", "1st Year"),
    opt("2nd", "2nd Year"),
    opt("3rd", "3rd Year"),
    opt("4th", "4th Year"),
    opt("graduate", "Graduate"),
];

pub const DOMAINS: &[CatalogOption] = &[
    opt("java", "Java"),
    opt("python", "Python"),
    opt("dsa", "Data Structures & Algorithms"),
    opt("os", "Operating Systems"),
    opt("dbms", "Database Management"),
    opt("aiml", "AI/ML"),
    opt("web", "Web Development"),
    opt("mobile", "Mobile Development"),
    opt("devops", "DevOps"),
];

pub const POSITIONS: &[CatalogOption] = &[
    opt("software-engineer", "Software Engineer"),
    opt("backend-intern", "Backend Intern"),
    opt("frontend-intern", "Frontend Intern"),
    opt("fullstack-intern", "Full-Stack Intern"),
    opt("data-analyst", "Data Analyst"),
    opt("ml-engineer", "ML Engineer"),
    opt("devops-engineer", "DevOps Engineer"),
    opt("product-manager", "Product Manager"),
];

/// Label for a catalog value; unknown values render verbatim.
pub fn label_for<'a>(catalog: &'static [CatalogOption], value: &'a str) -> &'a str {
    catalog
        .iter()
        .find(|o| o.value == value)
        .map(|o| o.label)
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice_form() -> SignupForm {
        SignupForm {
            full_name: "Alice".into(),
            email: "a@x.com".into(),
            year: "3rd".into(),
            domains: vec!["web".into()],
            position: "software-engineer".into(),
            company: None,
        }
    }

    #[test]
    fn valid_form_becomes_profile() {
        let p = alice_form().validate().unwrap();
        assert_eq!(p.full_name, "Alice");
        assert_eq!(p.domains, vec!["web"]);
        assert!(p.company.is_none());
    }

    #[test]
    fn fields_are_trimmed() {
        let form = SignupForm {
            full_name: "  Alice  ".into(),
            domains: vec![" web ".into(), "   ".into()],
            company: Some("  ".into()),
            ..alice_form()
        };
        let p = form.validate().unwrap();
        assert_eq!(p.full_name, "Alice");
        assert_eq!(p.domains, vec!["web"]);
        assert!(p.company.is_none(), "blank company should be dropped");
    }

    #[test]
    fn missing_fields_reported_in_form_order() {
        let form = SignupForm {
            full_name: " ".into(),
            domains: vec![],
            ..alice_form()
        };
        let err = form.validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields {
                fields: vec!["fullName", "domains"]
            }
        );
    }

    #[test]
    fn blank_form_reports_everything() {
        let err = SignupForm::default().validate().unwrap_err();
        match err {
            ValidationError::MissingFields { fields } => assert_eq!(fields.len(), 5),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn malformed_email_rejected() {
        for bad in ["alice", "alice@", "@x.com", "a b@x.com", "a@@x.com"] {
            let form = SignupForm {
                email: bad.into(),
                ..alice_form()
            };
            assert!(
                matches!(form.validate(), Err(ValidationError::InvalidEmail { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn dotless_domain_accepted() {
        for good in ["a@localhost", "alice@intranet", "a.b+tag@x.co"] {
            let form = SignupForm {
                email: good.into(),
                ..alice_form()
            };
            assert!(form.validate().is_ok(), "{good} should be accepted");
        }
    }

    #[test]
    fn profile_wire_names_are_camel_case() {
        let p = alice_form().validate().unwrap();
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["fullName"], "Alice");
        assert_eq!(json["domains"][0], "web");
        assert!(json.get("company").is_none());
    }

    #[test]
    fn labels_fall_back_to_value() {
        let p = UserProfile {
            domains: vec!["web".into(), "rust".into()],
            position: "software-engineer".into(),
            year: "postdoc".into(),
            ..Default::default()
        };
        assert_eq!(p.domains_label(), "Web Development, rust");
        assert_eq!(p.position_label(), "Software Engineer");
        assert_eq!(p.year_label(), "postdoc");
    }

    #[test]
    fn initial_is_uppercased() {
        let p = UserProfile {
            full_name: " alice".into(),
            ..Default::default()
        };
        assert_eq!(p.initial(), Some('A'));
        assert_eq!(UserProfile::default().initial(), None);
    }
}
