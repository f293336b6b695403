//! # geovisor
//!
//! Visualiseur cartographique adossé à GeoServer.
//!
//! ## Features
//!
//! - Chargement des couches (départements, municipalités, veredas, centres
//!   peuplés, stations) avec cache et rapport
//! - État du visualiseur: fond de carte exclusif, couches actives, opacités
//! - Recherche de station par nom
//! - Inscription d'un utilisateur sur une station (WFS-T)
//! - Export GeoJSON des couches reçues
//!
//! ## Usage CLI
//!
//! ```bash
//! # Charger toutes les couches et les exporter
//! geovisor layers --preset all --output ./geojson/ --report report.json
//!
//! # Rechercher une station
//! geovisor search "la plata huila"
//!
//! # S'inscrire sur une station
//! geovisor register --first-name Ana --last-name Ruiz --email ana@x.co --station "olaya herrera"
//! ```

pub mod config;
pub mod export;
pub mod report;
pub mod viewer;

pub use config::{GeoServerConfig, ViewerConfig};
pub use report::{LoadReport, LoadStatus};
pub use viewer::{LoadOutcome, Viewer, ViewerState};
