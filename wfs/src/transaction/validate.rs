//! Validation locale d'une inscription (avant tout appel réseau)

use std::sync::OnceLock;

use geo::Point;
use regex::Regex;

use crate::types::RegistrationForm;
use crate::RegistrationError;

/// Inscription validée, prête à être sérialisée
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRegistration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub station_id: String,
    pub station_name: String,
    /// x = longitude, y = latitude (EPSG:4326)
    pub location: Point<f64>,
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"))
}

/// `true` si l'email a la forme `local@domaine.tld`
pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

fn required(value: Option<&String>, field: &'static str) -> Result<String, RegistrationError> {
    let trimmed = value.map(|s| s.trim()).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(RegistrationError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

/// Valide un formulaire, dans l'ordre: sections présentes, champs non vides,
/// format d'email, coordonnées numériques. Le premier échec est retourné.
pub fn validate(form: &RegistrationForm) -> Result<ValidatedRegistration, RegistrationError> {
    let user = form
        .user
        .as_ref()
        .ok_or(RegistrationError::MissingSection("user"))?;
    let station = form
        .station
        .as_ref()
        .ok_or(RegistrationError::MissingSection("station"))?;

    let first_name = required(user.first_name.as_ref(), "first name")?;
    let last_name = required(user.last_name.as_ref(), "last name")?;
    let email = required(user.email.as_ref(), "email")?;

    if !is_valid_email(&email) {
        return Err(RegistrationError::InvalidEmail(email));
    }

    let location = station.location()?;

    Ok(ValidatedRegistration {
        first_name,
        last_name,
        email,
        station_id: station.id.clone().unwrap_or_default(),
        station_name: station.name.clone().unwrap_or_default(),
        location,
    })
}
