//! Définition et implémentation des commandes CLI
//!
//! - `layers`: chargement des couches, export GeoJSON, rapport
//! - `search`: recherche d'une station par nom
//! - `register`: inscription d'un utilisateur sur une station

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use geojson::{Feature, FeatureCollection};
use tracing::{info, warn};

use geovisor::config::{GeoServerConfig, ViewerConfig};
use geovisor::export::export_layers;
use geovisor::report::{LoadReport, LoadStatus};
use geovisor::viewer::{sync_layers, ViewerState};
use wfs::{
    filter_stations, find_station, BatchFetch, LayerCache, LayerClient, LayerId, RawCoordinate,
    Registrant, RegistrationForm, StationTarget, TransactionClient,
};

/// Surcharges de la connexion GeoServer (défaut: variables d'environnement)
#[derive(Args, Debug, Clone, Default)]
pub struct ServerArgs {
    /// URL de base GeoServer (défaut : env GEOSERVER_BASE_URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Workspace (défaut : env GEOSERVER_WORKSPACE)
    #[arg(long)]
    pub workspace: Option<String>,

    /// Utilisateur pour les transactions (défaut : env GEOSERVER_USER / admin)
    #[arg(long)]
    pub user: Option<String>,

    /// Mot de passe (défaut : env GEOSERVER_PASS)
    #[arg(long)]
    pub password: Option<String>,

    /// Timeout de lecture en secondes (défaut : env GEOSERVER_TIMEOUT_SECS / 15)
    #[arg(long)]
    pub timeout: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load viewer layers from GeoServer
    Layers {
        /// Layer key (departamentos, municipios, veredas, centrosPoblados, estaciones); repeatable
        #[arg(short, long)]
        layer: Vec<String>,

        /// Viewer preset (default/all/stations) or path to a JSON config, used without --layer
        #[arg(long, default_value = "default")]
        preset: String,

        /// Load layers one by one and stop at the first failure
        #[arg(long)]
        sequential: bool,

        /// Output directory for GeoJSON files
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Save the load report as JSON
        #[arg(long)]
        report: Option<PathBuf>,

        #[command(flatten)]
        server: ServerArgs,
    },

    /// Search a station by name
    Search {
        /// Name or part of the name (case and hyphens ignored)
        term: String,

        /// List every matching station instead of the first one
        #[arg(long)]
        all: bool,

        #[command(flatten)]
        server: ServerArgs,
    },

    /// Register a user at a station
    Register(RegisterArgs),
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long)]
    pub email: String,

    /// Station name to search in the stations layer
    #[arg(long, required_unless_present = "station_id", conflicts_with = "station_id")]
    pub station: Option<String>,

    /// Station code, given with --station-name, --lat and --lon
    #[arg(long, requires_all = ["station_name", "lat", "lon"])]
    pub station_id: Option<String>,

    #[arg(long)]
    pub station_name: Option<String>,

    /// Latitude (decimal degrees)
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<String>,

    /// Longitude (decimal degrees)
    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<String>,

    #[command(flatten)]
    pub server: ServerArgs,
}

/// Exécute la commande layers
pub async fn cmd_layers(
    keys: &[String],
    preset: &str,
    sequential: bool,
    output: Option<&Path>,
    report_path: Option<&Path>,
    server: ServerArgs,
) -> Result<()> {
    let config = load_server_config(server);
    let layers = select_layers(keys, preset)?;
    if layers.is_empty() {
        anyhow::bail!("No server layer selected (base layers are not fetched)");
    }

    println!("=== Layers {} ===", config.workspace);
    println!("Server: {}", config.base_url);
    println!(
        "Layers: {}",
        layers.iter().map(|l| l.key()).collect::<Vec<_>>().join(", ")
    );
    println!("Mode: {}", if sequential { "sequential" } else { "batch" });

    let client = LayerClient::new(config.endpoint());
    let start = Instant::now();
    let mut report = LoadReport::new(&config.workspace);

    let fetched = if sequential {
        load_sequential(&client, &layers, &mut report).await
    } else {
        load_batch(&client, &layers, &mut report).await
    };

    if let Some(dir) = output {
        let written = export_layers(&fetched, dir)?;
        for path in &written {
            if let Some(layer) = path.file_stem().and_then(|s| s.to_str()) {
                report.record_export(layer, path);
            }
        }
        info!(files = written.len(), output = %dir.display(), "GeoJSON export done");
    }

    report.set_duration(start.elapsed());
    report.finalize();
    report.display();
    println!("{}", report.summary());

    if let Some(path) = report_path {
        report.save_to_file(path)?;
        println!("Report saved to {}", path.display());
    }

    if report.status == LoadStatus::Failed {
        anyhow::bail!("No layer could be loaded");
    }
    Ok(())
}

/// Chargement parallèle: les échecs sont isolés
async fn load_batch(
    client: &LayerClient,
    layers: &[LayerId],
    report: &mut LoadReport,
) -> HashMap<String, FeatureCollection> {
    let names: Vec<&str> = layers.iter().map(|l| l.type_name()).collect();
    let batch = client.fetch_layers_detailed(&names).await;

    record_batch(report, &names, &batch);
    batch.layers
}

/// Reporte chaque couche demandée, avec la raison réelle des échecs
fn record_batch(report: &mut LoadReport, names: &[&str], batch: &BatchFetch) {
    for &name in names {
        match (batch.layers.get(name), batch.failure(name)) {
            (Some(collection), _) => report.record_loaded(name, collection),
            (None, Some(error)) => report.record_failure(name, &error.to_string()),
            (None, None) => report.record_failure(name, "layer could not be loaded"),
        }
    }
}

/// Chargement séquentiel: arrêt au premier échec
async fn load_sequential(
    client: &LayerClient,
    layers: &[LayerId],
    report: &mut LoadReport,
) -> HashMap<String, FeatureCollection> {
    let mut cache = LayerCache::new();
    let outcome = sync_layers(client, &mut cache, layers).await;

    if let Some(error) = &outcome.error {
        let layer = error.layer().unwrap_or("unknown");
        report.record_failure(layer, &error.to_string());
    }
    for layer in &outcome.skipped {
        report.record_failure(layer.type_name(), "skipped after an earlier failure");
    }
    if let Some(message) = outcome.user_message() {
        warn!("{}", message);
    }
    if !outcome.filterable.is_empty() {
        info!(
            layers = ?outcome.filterable.iter().map(|l| l.key()).collect::<Vec<_>>(),
            "Layers available for filtering"
        );
    }

    let mut fetched = HashMap::new();
    for (layer, collection) in cache.layers() {
        report.record_loaded(layer.type_name(), collection);
        fetched.insert(layer.type_name().to_string(), collection.clone());
    }
    fetched
}

/// Exécute la commande search
pub async fn cmd_search(term: &str, all: bool, server: ServerArgs) -> Result<()> {
    let config = load_server_config(server);
    let stations = load_stations(&config).await?;

    if all {
        let matches = filter_stations(&stations, term);
        println!("{} station(s) matching \"{}\"", matches.len(), term);
        for feature in matches {
            println!("  {}", describe_station(feature));
        }
        return Ok(());
    }

    match find_station(&stations, term) {
        Some(feature) => println!("{}", describe_station(feature)),
        None => println!("No station matches \"{}\"", term),
    }
    Ok(())
}

/// Exécute la commande register
pub async fn cmd_register(args: RegisterArgs) -> Result<()> {
    let config = load_server_config(args.server.clone());
    config.require_transaction()?;

    let station = match &args.station {
        Some(term) => {
            let stations = load_stations(&config).await?;
            let feature = find_station(&stations, term)
                .with_context(|| format!("No station matches \"{}\"", term))?;
            println!("Station: {}", describe_station(feature));
            station_from_feature(feature)?
        }
        None => station_from_args(&args)?,
    };

    let form = RegistrationForm::new(
        Registrant::new(&args.first_name, &args.last_name, &args.email),
        station,
    );

    let client = TransactionClient::new(config.endpoint());
    let outcome = client
        .register_at_station(&form)
        .await
        .context("Registration failed")?;

    if !outcome.success {
        anyhow::bail!("Registration rejected: {}", outcome.message);
    }
    println!("{}", outcome.message);
    Ok(())
}

fn load_server_config(server: ServerArgs) -> GeoServerConfig {
    let mut config = GeoServerConfig::from_env();
    apply_server_overrides(&mut config, server);
    config
}

fn apply_server_overrides(config: &mut GeoServerConfig, server: ServerArgs) {
    if let Some(base_url) = server.base_url {
        config.base_url = base_url;
    }
    if let Some(workspace) = server.workspace {
        config.workspace = workspace;
    }
    if let Some(user) = server.user {
        config.user = user;
    }
    if let Some(password) = server.password {
        config.password = Some(password);
    }
    if let Some(timeout) = server.timeout {
        config.timeout_secs = timeout;
    }
}

/// Couches demandées: clés explicites, sinon couches actives du preset
fn select_layers(keys: &[String], preset: &str) -> Result<Vec<LayerId>> {
    if !keys.is_empty() {
        return Ok(wfs::resolve_layers(keys.iter().map(String::as_str)));
    }
    let viewer = ViewerConfig::resolve(preset)?;
    Ok(ViewerState::from_config(&viewer).active_layers())
}

async fn load_stations(config: &GeoServerConfig) -> Result<FeatureCollection> {
    LayerClient::new(config.endpoint())
        .fetch_layer(LayerId::Stations.type_name())
        .await
        .context("Failed to load stations")
}

/// Station issue d'une feature; la géométrie complète les coordonnées absentes
fn station_from_feature(feature: &Feature) -> Result<StationTarget> {
    let mut station =
        StationTarget::from_feature(feature).context("Station feature has no properties")?;

    if let Some(geojson::Value::Point(position)) = feature.geometry.as_ref().map(|g| &g.value) {
        if let [lon, lat, ..] = position.as_slice() {
            if station.latitude.is_none() {
                station.latitude = Some(RawCoordinate::Number(*lat));
            }
            if station.longitude.is_none() {
                station.longitude = Some(RawCoordinate::Number(*lon));
            }
        }
    }
    Ok(station)
}

fn station_from_args(args: &RegisterArgs) -> Result<StationTarget> {
    match (&args.station_id, &args.station_name, &args.lat, &args.lon) {
        (Some(id), Some(name), Some(lat), Some(lon)) => Ok(StationTarget::new(
            id.as_str(),
            name.as_str(),
            lat.as_str(),
            lon.as_str(),
        )),
        _ => anyhow::bail!("--station-id requires --station-name, --lat and --lon"),
    }
}

fn describe_station(feature: &Feature) -> String {
    let text = |key: &str| {
        feature
            .property(key)
            .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
            .unwrap_or_else(|| "?".to_string())
    };
    let location = station_from_feature(feature)
        .ok()
        .and_then(|s| s.location().ok())
        .map(|p| format!(" ({:.5}, {:.5})", p.y(), p.x()))
        .unwrap_or_default();

    format!("[{}] {}{}", text("cod_emt"), text("nom_emt"), location)
}
