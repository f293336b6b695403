//! Configuration du système

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use wfs::{Credentials, Endpoint, LayerId};

/// Connexion au serveur GeoServer
#[derive(Debug, Clone)]
pub struct GeoServerConfig {
    pub base_url: String,
    pub workspace: String,
    pub layer_name: String,
    pub namespace_uri: String,
    pub user: String,
    pub password: Option<String>,
    /// Endpoint de lecture explicite (sinon dérivé de base_url/workspace)
    pub wfs_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for GeoServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/geoserver".into(),
            workspace: "proyecto_lineab".into(),
            layer_name: String::new(),
            namespace_uri: String::new(),
            user: "admin".into(),
            password: None,
            wfs_url: None,
            timeout_secs: 15,
        }
    }
}

impl GeoServerConfig {
    /// Charge la configuration depuis les variables d'environnement
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("GEOSERVER_BASE_URL").unwrap_or(defaults.base_url),
            workspace: std::env::var("GEOSERVER_WORKSPACE").unwrap_or(defaults.workspace),
            layer_name: std::env::var("GEOSERVER_LAYER_NAME").unwrap_or(defaults.layer_name),
            namespace_uri: std::env::var("GEOSERVER_NAMESPACE_URI")
                .unwrap_or(defaults.namespace_uri),
            user: std::env::var("GEOSERVER_USER").unwrap_or(defaults.user),
            password: std::env::var("GEOSERVER_PASS").ok(),
            wfs_url: std::env::var("GEOSERVER_WFS_URL").ok(),
            timeout_secs: std::env::var("GEOSERVER_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }

    /// Vérifie les paramètres nécessaires aux transactions
    pub fn require_transaction(&self) -> Result<()> {
        if self.layer_name.trim().is_empty() {
            anyhow::bail!("GEOSERVER_LAYER_NAME is required for registrations");
        }
        if self.namespace_uri.trim().is_empty() {
            anyhow::bail!("GEOSERVER_NAMESPACE_URI is required for registrations");
        }
        Ok(())
    }

    /// Construit l'endpoint utilisé par les clients WFS
    pub fn endpoint(&self) -> Endpoint {
        Endpoint {
            base_url: self.base_url.clone(),
            workspace: self.workspace.clone(),
            layer_name: self.layer_name.clone(),
            namespace_uri: self.namespace_uri.clone(),
            credentials: Credentials::new(self.user.clone(), self.password.clone()),
            read_url: self.wfs_url.clone(),
            read_timeout: Duration::from_secs(self.timeout_secs),
            write_timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// État initial du visualiseur (couches actives et opacités)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ViewerConfig {
    /// Clés actives au démarrage (fonds de carte compris)
    pub active: Vec<String>,

    /// Opacité par couche
    #[serde(default)]
    pub opacity: BTreeMap<LayerId, f64>,
}

impl Default for ViewerConfig {
    /// Même contenu que le preset `default`
    fn default() -> Self {
        let mut opacity: BTreeMap<LayerId, f64> =
            LayerId::THEMATIC.into_iter().map(|l| (l, 0.6)).collect();
        opacity.insert(LayerId::Stations, 1.0);

        Self {
            active: vec!["osm".into(), "departamentos".into(), "estaciones".into()],
            opacity,
        }
    }
}

impl ViewerConfig {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "default" => Self::load_embedded(include_str!("presets/default.json")),
            "all" => Self::load_embedded(include_str!("presets/all.json")),
            "stations" => Self::load_embedded(include_str!("presets/stations.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: default, all, stations", preset),
        }
    }

    /// Preset embarqué ou chemin vers un fichier JSON
    pub fn resolve(name_or_path: &str) -> Result<Self> {
        match name_or_path {
            "default" | "all" | "stations" => Self::from_preset(name_or_path),
            _ => Self::load(Path::new(name_or_path)),
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }
}
