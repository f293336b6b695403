//! Types de données pour le crate wfs

use std::fmt;
use std::str::FromStr;

use geo::Point;
use geojson::Feature;
use serde::{Deserialize, Deserializer, Serialize};

use crate::RegistrationError;

/// Identifiant logique d'une couche du visualiseur
///
/// La correspondance vers les noms de types GeoServer est une table statique 1:1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LayerId {
    #[serde(rename = "departamentos")]
    Departments,
    #[serde(rename = "municipios")]
    Municipalities,
    #[serde(rename = "veredas")]
    Villages,
    #[serde(rename = "centrosPoblados")]
    PopulationCenters,
    #[serde(rename = "estaciones")]
    Stations,
}

impl LayerId {
    /// Ordre de rendu (du fond vers l'avant)
    pub const ALL: [LayerId; 5] = [
        LayerId::Departments,
        LayerId::Municipalities,
        LayerId::Villages,
        LayerId::PopulationCenters,
        LayerId::Stations,
    ];

    /// Couches polygonales utilisables comme filtre
    pub const THEMATIC: [LayerId; 4] = [
        LayerId::Departments,
        LayerId::Municipalities,
        LayerId::PopulationCenters,
        LayerId::Villages,
    ];

    /// Clé utilisée par le visualiseur
    pub fn key(self) -> &'static str {
        match self {
            LayerId::Departments => "departamentos",
            LayerId::Municipalities => "municipios",
            LayerId::Villages => "veredas",
            LayerId::PopulationCenters => "centrosPoblados",
            LayerId::Stations => "estaciones",
        }
    }

    /// Nom du type côté serveur (sans préfixe de workspace)
    pub fn type_name(self) -> &'static str {
        match self {
            LayerId::Departments => "departamento",
            LayerId::Municipalities => "municipio",
            LayerId::Villages => "vereda",
            LayerId::PopulationCenters => "centro_poblado",
            LayerId::Stations => "estacion",
        }
    }

    /// Résout une clé du visualiseur (insensible à la casse)
    ///
    /// Retourne `None` pour toute clé absente de la table, notamment les
    /// fonds de carte (`osm`, `googleSatellite`).
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|layer| layer.key().eq_ignore_ascii_case(key.trim()))
    }

    /// `true` pour les couches polygonales
    pub fn is_thematic(self) -> bool {
        self != LayerId::Stations
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for LayerId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| {
            format!(
                "Unknown layer: {}. Use: departamentos, municipios, veredas, centrosPoblados, estaciones",
                s
            )
        })
    }
}

/// Identifiants de connexion HTTP Basic
#[derive(Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Coordonnée brute, telle que reçue d'un formulaire ou d'une feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCoordinate {
    Number(f64),
    Text(String),
}

impl RawCoordinate {
    /// Convertit en nombre fini
    ///
    /// Les chaînes sont lues de façon permissive: seul le préfixe numérique
    /// compte (`"4.6°N"` donne 4.6). Retourne `None` si aucun nombre fini
    /// n'est lisible.
    pub fn parse(&self) -> Option<f64> {
        let value = match self {
            RawCoordinate::Number(v) => *v,
            RawCoordinate::Text(s) => {
                let (v, _) = fast_float::parse_partial::<f64, _>(s.trim_start()).ok()?;
                v
            }
        };
        value.is_finite().then_some(value)
    }
}

impl fmt::Display for RawCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawCoordinate::Number(v) => write!(f, "{}", v),
            RawCoordinate::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for RawCoordinate {
    fn from(value: f64) -> Self {
        RawCoordinate::Number(value)
    }
}

impl From<&str> for RawCoordinate {
    fn from(value: &str) -> Self {
        RawCoordinate::Text(value.to_string())
    }
}

/// Données saisies par l'utilisateur dans le formulaire d'inscription
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registrant {
    #[serde(default, alias = "nombre")]
    pub first_name: Option<String>,
    #[serde(default, alias = "apellido")]
    pub last_name: Option<String>,
    #[serde(default, alias = "correo")]
    pub email: Option<String>,
}

impl Registrant {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            email: Some(email.into()),
        }
    }
}

/// Station ciblée par une inscription
///
/// Désérialisable directement depuis les propriétés d'une feature de la
/// couche `estacion` (`cod_emt`, `nom_emt`, `latitud`, `longitud`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationTarget {
    #[serde(default, alias = "cod_emt", deserialize_with = "text_or_number")]
    pub id: Option<String>,
    #[serde(default, alias = "nom_emt", deserialize_with = "text_or_number")]
    pub name: Option<String>,
    #[serde(default, alias = "latitud")]
    pub latitude: Option<RawCoordinate>,
    #[serde(default, alias = "longitud")]
    pub longitude: Option<RawCoordinate>,
}

impl StationTarget {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        latitude: impl Into<RawCoordinate>,
        longitude: impl Into<RawCoordinate>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            latitude: Some(latitude.into()),
            longitude: Some(longitude.into()),
        }
    }

    /// Extrait la station depuis les propriétés d'une feature
    pub fn from_feature(feature: &Feature) -> Option<Self> {
        let properties = feature.properties.clone()?;
        serde_json::from_value(serde_json::Value::Object(properties)).ok()
    }

    /// Position de la station (x = longitude, y = latitude)
    pub fn location(&self) -> Result<Point<f64>, RegistrationError> {
        let latitude = parse_coordinate("latitude", self.latitude.as_ref())?;
        let longitude = parse_coordinate("longitude", self.longitude.as_ref())?;
        Ok(Point::new(longitude, latitude))
    }
}

fn parse_coordinate(
    field: &'static str,
    raw: Option<&RawCoordinate>,
) -> Result<f64, RegistrationError> {
    raw.and_then(RawCoordinate::parse)
        .ok_or_else(|| RegistrationError::InvalidCoordinate {
            field,
            value: raw.map(ToString::to_string).unwrap_or_default(),
        })
}

/// Accepte une chaîne ou un nombre JSON (les codes de station arrivent sous les deux formes)
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Formulaire d'inscription complet
///
/// Les deux sections sont optionnelles pour refléter une saisie incomplète;
/// la validation rejette leur absence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub user: Option<Registrant>,
    #[serde(default)]
    pub station: Option<StationTarget>,
}

impl RegistrationForm {
    pub fn new(user: Registrant, station: StationTarget) -> Self {
        Self {
            user: Some(user),
            station: Some(station),
        }
    }
}

/// Résultat d'une inscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationOutcome {
    /// `true` si GeoServer a confirmé l'insertion
    pub success: bool,
    /// Message à afficher à l'utilisateur
    pub message: String,
    /// Réponse brute du serveur
    pub reply: String,
}
