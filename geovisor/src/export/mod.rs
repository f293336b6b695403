//! Export des couches chargées

pub mod geojson;

pub use self::geojson::{export_layer, export_layers};
