//! Construction des URLs WFS (lecture GetFeature, écriture Transaction)

use std::time::Duration;

use url::Url;

use crate::types::Credentials;
use crate::WfsError;

/// Délai d'attente par défaut pour la lecture d'une couche
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(15);

/// Délai d'attente par défaut pour une transaction
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(15);

/// Description d'un service GeoServer
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// URL de base (ex: `http://host:8080/geoserver`)
    pub base_url: String,
    /// Workspace GeoServer, aussi utilisé comme préfixe d'espace de noms
    pub workspace: String,
    /// Couche cible des insertions
    pub layer_name: String,
    /// URI de l'espace de noms du workspace
    pub namespace_uri: String,
    /// Identifiants pour les transactions
    pub credentials: Credentials,
    /// Endpoint de lecture explicite (défaut: `{base_url}/{workspace}/ows`)
    pub read_url: Option<String>,
    /// Délai d'attente des lectures
    pub read_timeout: Duration,
    /// Délai d'attente des transactions
    pub write_timeout: Duration,
}

impl Endpoint {
    pub fn new(base_url: impl Into<String>, workspace: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            workspace: workspace.into(),
            layer_name: String::new(),
            namespace_uri: String::new(),
            credentials: Credentials::default(),
            read_url: None,
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    /// URL OWS du workspace
    fn ows_url(&self) -> String {
        format!(
            "{}/{}/ows",
            self.base_url.trim_end_matches('/'),
            self.workspace
        )
    }

    /// Nom de type qualifié (`workspace:type`)
    pub fn qualified_type_name(&self, type_name: &str) -> String {
        format!("{}:{}", self.workspace, type_name)
    }

    /// URL GetFeature (WFS 1.0.0, sortie GeoJSON) pour un type de la couche
    pub fn get_feature_url(&self, type_name: &str) -> Result<Url, WfsError> {
        let base = self.read_url.clone().unwrap_or_else(|| self.ows_url());
        let mut url = Url::parse(&base)?;
        url.query_pairs_mut()
            .append_pair("service", "WFS")
            .append_pair("version", "1.0.0")
            .append_pair("request", "GetFeature")
            .append_pair("typeName", &self.qualified_type_name(type_name))
            .append_pair("outputFormat", "application/json");
        Ok(url)
    }

    /// URL Transaction (WFS 1.1.0)
    pub fn transaction_url(&self) -> Result<Url, WfsError> {
        let mut url = Url::parse(&self.ows_url())?;
        url.query_pairs_mut()
            .append_pair("service", "WFS")
            .append_pair("version", "1.1.0")
            .append_pair("request", "Transaction");
        Ok(url)
    }
}
