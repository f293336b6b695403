//! Inscription d'un utilisateur sur une station via WFS-T

pub mod reply;
pub mod validate;
pub mod xml;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::endpoint::Endpoint;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::types::{RegistrationForm, RegistrationOutcome};
use crate::WfsError;

pub use reply::{classify, ReplyStatus};
pub use validate::{is_valid_email, validate, ValidatedRegistration};
pub use xml::{build_insert, escape_xml};

/// Client d'écriture transactionnelle
#[derive(Debug, Clone)]
pub struct TransactionClient<T = ReqwestTransport> {
    endpoint: Endpoint,
    transport: T,
}

impl TransactionClient<ReqwestTransport> {
    pub fn new(endpoint: Endpoint) -> Self {
        Self::with_transport(endpoint, ReqwestTransport::new())
    }
}

impl<T: HttpTransport> TransactionClient<T> {
    pub fn with_transport(endpoint: Endpoint, transport: T) -> Self {
        Self {
            endpoint,
            transport,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Inscrit un utilisateur sur une station
    ///
    /// # Errors
    ///
    /// - [`WfsError::Registration`] si la saisie est invalide (aucun appel réseau)
    /// - [`WfsError::Transport`] si la requête n'aboutit pas
    /// - [`WfsError::TransactionStatus`] si GeoServer répond avec un statut d'échec
    ///
    /// Une réponse HTTP réussie mais portant une exception donne un
    /// [`RegistrationOutcome`] avec `success = false`.
    pub async fn register_at_station(
        &self,
        form: &RegistrationForm,
    ) -> Result<RegistrationOutcome, WfsError> {
        self.register_at(form, Utc::now()).await
    }

    /// Variante avec horodatage explicite
    pub async fn register_at(
        &self,
        form: &RegistrationForm,
        submitted_at: DateTime<Utc>,
    ) -> Result<RegistrationOutcome, WfsError> {
        let registration = validate(form)?;
        let url = self.endpoint.transaction_url()?;
        let body = build_insert(&self.endpoint, &registration, submitted_at);

        info!(
            station = %registration.station_id,
            layer = %self.endpoint.layer_name,
            "Sending registration transaction"
        );

        let response = self
            .transport
            .post_xml(
                &url,
                body,
                &self.endpoint.credentials,
                self.endpoint.write_timeout,
            )
            .await?;

        if !response.is_success() {
            warn!(status = response.status, "Transaction rejected by GeoServer");
            return Err(WfsError::TransactionStatus {
                status: response.status,
            });
        }

        let reply = response.text();
        let status = classify(&reply);
        if status.is_success() {
            info!(station = %registration.station_id, "Registration confirmed");
        } else {
            warn!(
                station = %registration.station_id,
                message = status.message(),
                "Registration not confirmed"
            );
        }

        Ok(RegistrationOutcome {
            success: status.is_success(),
            message: status.message().to_string(),
            reply,
        })
    }
}
