//! Interprétation de la réponse d'une transaction WFS-T
//!
//! GeoServer ne fournit pas de schéma de réponse exploitable ici: la réponse
//! est classée par recherche de marqueurs. Les marqueurs d'erreur sont
//! toujours testés avant les marqueurs de succès.

use std::sync::OnceLock;

use memchr::memmem;
use regex::Regex;

/// Marqueurs signalant un rapport d'exception
const ERROR_MARKERS: [&str; 4] = [
    "ServiceExceptionReport",
    "ServiceException",
    "ExceptionReport",
    "ExceptionText",
];

/// Formes connues de "1 entité insérée" (attribut WFS 1.1.0, élément)
const INSERTED_MARKERS: [&str; 2] = [
    r#"totalInserted="1""#,
    "<wfs:totalInserted>1</wfs:totalInserted>",
];

pub const SUCCESS_MESSAGE: &str = "Registration completed";
pub const UNCONFIRMED_MESSAGE: &str = "Insertion was not confirmed";
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown GeoServer error";

/// Classement d'une réponse de transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyStatus {
    /// Une entité a été insérée
    Inserted,
    /// Rapport d'exception, avec le message extrait
    ServerError(String),
    /// Ni erreur ni confirmation
    Unconfirmed,
}

impl ReplyStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ReplyStatus::Inserted)
    }

    /// Message destiné à l'utilisateur
    pub fn message(&self) -> &str {
        match self {
            ReplyStatus::Inserted => SUCCESS_MESSAGE,
            ReplyStatus::ServerError(message) => message,
            ReplyStatus::Unconfirmed => UNCONFIRMED_MESSAGE,
        }
    }
}

/// Motifs d'extraction du message, par ordre de priorité
fn message_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"(?s)<ExceptionText>(.*?)</ExceptionText>").expect("valid pattern"),
            Regex::new(r"(?s)<ServiceException>(.*?)</ServiceException>").expect("valid pattern"),
            Regex::new(r"(?s)<ows:ExceptionText>(.*?)</ows:ExceptionText>")
                .expect("valid pattern"),
        ]
    })
}

fn contains_any(haystack: &[u8], needles: &[&str]) -> bool {
    needles
        .iter()
        .any(|needle| memmem::find(haystack, needle.as_bytes()).is_some())
}

/// Extrait le premier message d'exception reconnu
fn extract_error_message(reply: &str) -> Option<String> {
    message_patterns()
        .iter()
        .find_map(|pattern| pattern.captures(reply))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Classe une réponse de transaction
pub fn classify(reply: &str) -> ReplyStatus {
    let bytes = reply.as_bytes();

    if contains_any(bytes, &ERROR_MARKERS) {
        let message =
            extract_error_message(reply).unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string());
        return ReplyStatus::ServerError(message);
    }

    if contains_any(bytes, &INSERTED_MARKERS) {
        ReplyStatus::Inserted
    } else {
        ReplyStatus::Unconfirmed
    }
}
