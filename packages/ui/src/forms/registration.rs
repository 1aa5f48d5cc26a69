//! Profile completion form shown after the first login.

use std::sync::LazyLock;

use api::models::User;
use regex::Regex;

use super::FieldErrors;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Safaricom and Airtel numbers, with or without the country code.
static KENYAN_PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\+254|254|0)?[17]\d{8}$").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegistrationField {
    Name,
    Email,
    Phone,
    AcceptTerms,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub accept_terms: bool,
}

/// Cleaned values ready for `register_user`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: String,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_kenyan_phone(phone: &str) -> bool {
    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    KENYAN_PHONE_RE.is_match(&compact)
}

/// Rewrite a Kenyan number as `+254XXXXXXXXX`. Input that does not look like one is
/// returned unchanged.
pub fn normalize_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.starts_with("254") {
        format!("+{digits}")
    } else if let Some(rest) = digits.strip_prefix('0') {
        format!("+254{rest}")
    } else if digits.len() == 9 {
        format!("+254{digits}")
    } else {
        phone.to_string()
    }
}

impl RegistrationForm {
    /// Pre-filled form for editing an existing profile. Terms were accepted at registration.
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            accept_terms: true,
        }
    }

    pub fn validate(&self) -> FieldErrors<RegistrationField> {
        let mut errors = FieldErrors::default();

        let name = self.name.trim();
        if name.is_empty() {
            errors.set(RegistrationField::Name, "Full name is required");
        } else if name.chars().count() < 2 {
            errors.set(RegistrationField::Name, "Name must be at least 2 characters");
        }

        if self.email.trim().is_empty() {
            errors.set(RegistrationField::Email, "Email is required");
        } else if !is_valid_email(&self.email) {
            errors.set(RegistrationField::Email, "Please enter a valid email address");
        }

        if self.phone.trim().is_empty() {
            errors.set(RegistrationField::Phone, "Phone number is required");
        } else if !is_valid_kenyan_phone(&self.phone) {
            errors.set(RegistrationField::Phone, "Please enter a valid Kenyan phone number");
        }

        if !self.accept_terms {
            errors.set(
                RegistrationField::AcceptTerms,
                "You must accept the terms and conditions",
            );
        }

        errors
    }

    /// Validated and normalized values, or the per-field messages.
    pub fn submission(&self) -> Result<Registration, FieldErrors<RegistrationField>> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Registration {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            phone: normalize_phone(&self.phone),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> RegistrationForm {
        RegistrationForm {
            name: "  Wanjiku Kamau ".into(),
            email: "Wanjiku@Example.com".into(),
            phone: "0712 345 678".into(),
            accept_terms: true,
        }
    }

    #[test]
    fn test_valid_form_is_normalized() {
        let reg = valid().submission().unwrap();
        assert_eq!(reg.name, "Wanjiku Kamau");
        assert_eq!(reg.email, "wanjiku@example.com");
        assert_eq!(reg.phone, "+254712345678");
    }

    #[test]
    fn test_name_rules() {
        let form = RegistrationForm {
            name: "   ".into(),
            ..valid()
        };
        assert_eq!(
            form.validate().get(RegistrationField::Name),
            Some("Full name is required")
        );

        let form = RegistrationForm {
            name: "W".into(),
            ..valid()
        };
        assert_eq!(
            form.validate().get(RegistrationField::Name),
            Some("Name must be at least 2 characters")
        );
    }

    #[test]
    fn test_email_rules() {
        for bad in ["wanjiku", "wanjiku@example", "wan jiku@example.com", "@example.com"] {
            let form = RegistrationForm {
                email: bad.into(),
                ..valid()
            };
            assert_eq!(
                form.validate().get(RegistrationField::Email),
                Some("Please enter a valid email address"),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_phone_rules() {
        for good in ["0712345678", "+254712345678", "254112345678", "712345678", "07 1234 5678"] {
            assert!(is_valid_kenyan_phone(good), "{good}");
        }
        for bad in ["0812345678", "+255712345678", "071234567", "07123456789", "phone"] {
            assert!(!is_valid_kenyan_phone(bad), "{bad}");
        }
        let form = RegistrationForm {
            phone: "+1 555 123 4567".into(),
            ..valid()
        };
        assert_eq!(
            form.validate().get(RegistrationField::Phone),
            Some("Please enter a valid Kenyan phone number")
        );
    }

    #[test]
    fn test_terms_required() {
        let form = RegistrationForm {
            accept_terms: false,
            ..valid()
        };
        let errors = form.submission().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get(RegistrationField::AcceptTerms),
            Some("You must accept the terms and conditions")
        );
    }

    #[test]
    fn test_profile_edit_starts_valid() {
        let user = crate::fixtures::user("wanjiku-demo-cai", "Wanjiku Kamau");
        let mut form = RegistrationForm::from_user(&user);
        assert!(form.validate().is_empty());

        form.email = "not-an-email".into();
        let errors = form.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get(RegistrationField::Email),
            Some("Please enter a valid email address")
        );
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("0712345678"), "+254712345678");
        assert_eq!(normalize_phone("254712345678"), "+254712345678");
        assert_eq!(normalize_phone("+254 712 345 678"), "+254712345678");
        assert_eq!(normalize_phone("712345678"), "+254712345678");
        assert_eq!(normalize_phone("12345"), "12345");
    }
}
