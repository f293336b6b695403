//! Tests d'intégration HTTP contre un GeoServer simulé (axum, port local)

use std::collections::HashMap;
use std::time::Duration;

use axum::extract::Query;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use geojson::FeatureCollection;

use wfs::{
    Credentials, Endpoint, LayerClient, LayerId, Registrant, RegistrationForm, StationTarget,
    TransactionClient, TransportError, WfsError,
};

const OWS_PATH: &str = "/geoserver/proyecto_lineab/ows";

const DEPARTMENTS: &str = r#"{"type":"FeatureCollection","totalFeatures":1,"features":[
    {"type":"Feature","id":"departamento.1",
     "geometry":{"type":"MultiPolygon","coordinates":[[[[-74.5,4.2],[-73.9,4.2],[-73.9,4.9],[-74.5,4.2]]]]},
     "properties":{"cod_depart":"25","nom_depart":"CUNDINAMARCA","area_depar":24210.5,"cap_depart":"BOGOTÁ"}}]}"#;

const STATIONS: &str = r#"{"type":"FeatureCollection","features":[
    {"type":"Feature","id":"estacion.1",
     "geometry":{"type":"Point","coordinates":[-74.1,4.6]},
     "properties":{"cod_emt":"E1","nom_emt":"Station 1","latitud":"4.6","longitud":"-74.1"}}]}"#;

const EXPECTED_AUTH: &str = "Basic YWRtaW46Z2Vvc2VydmVy";

async fn get_feature(Query(params): Query<HashMap<String, String>>) -> (StatusCode, String) {
    assert_eq!(params.get("service").map(String::as_str), Some("WFS"));
    assert_eq!(params.get("request").map(String::as_str), Some("GetFeature"));
    assert_eq!(
        params.get("outputFormat").map(String::as_str),
        Some("application/json")
    );

    match params.get("typeName").map(String::as_str) {
        Some("proyecto_lineab:departamento") => (StatusCode::OK, DEPARTMENTS.to_string()),
        Some("proyecto_lineab:estacion") => (StatusCode::OK, STATIONS.to_string()),
        Some("proyecto_lineab:vereda") => (StatusCode::OK, "not json".to_string()),
        _ => (StatusCode::NOT_FOUND, "unknown type".to_string()),
    }
}

async fn transaction(headers: HeaderMap, body: String) -> (StatusCode, String) {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if auth != EXPECTED_AUTH {
        return (StatusCode::UNAUTHORIZED, "unauthorized".to_string());
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(content_type, "text/xml");

    if body.contains("<proyecto_lineab:correo>dup@x.co</proyecto_lineab:correo>") {
        return (
            StatusCode::OK,
            r#"<ows:ExceptionReport version="1.0.0"><ows:Exception exceptionCode="NoApplicableCode"><ows:ExceptionText>duplicate key</ows:ExceptionText></ows:Exception></ows:ExceptionReport>"#
                .to_string(),
        );
    }

    assert!(body.contains("<gml:pos>-74.1 4.6</gml:pos>"));
    (
        StatusCode::OK,
        r#"<wfs:TransactionResponse version="1.1.0"><wfs:TransactionSummary totalInserted="1" totalUpdated="0" totalDeleted="0"/></wfs:TransactionResponse>"#
            .to_string(),
    )
}

async fn slow_get_feature() -> (StatusCode, String) {
    tokio::time::sleep(Duration::from_secs(2)).await;
    (StatusCode::OK, DEPARTMENTS.to_string())
}

async fn stalled_transaction() -> (StatusCode, String) {
    tokio::time::sleep(Duration::from_secs(30)).await;
    (StatusCode::OK, String::new())
}

/// Démarre un serveur sur un port libre et retourne l'URL de base GeoServer
async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/geoserver", addr)
}

async fn geoserver() -> Endpoint {
    let app = Router::new().route(OWS_PATH, get(get_feature).post(transaction));
    let mut endpoint = Endpoint::new(spawn_server(app).await, "proyecto_lineab");
    endpoint.layer_name = "registro_estacion".to_string();
    endpoint.namespace_uri = "http://proyecto_lineab.org".to_string();
    endpoint.credentials = Credentials::new("admin", Some("geoserver".to_string()));
    endpoint
}

fn registration(email: &str) -> RegistrationForm {
    RegistrationForm::new(
        Registrant::new("Ana", "Ruiz", email),
        StationTarget::new("E1", "Station 1", 4.6, -74.1),
    )
}

#[tokio::test]
async fn test_fetch_layer_over_http() {
    let client = LayerClient::new(geoserver().await);

    let collection = client
        .fetch_layer(LayerId::Departments.type_name())
        .await
        .unwrap();
    let expected: FeatureCollection = serde_json::from_str(DEPARTMENTS).unwrap();
    assert_eq!(collection, expected);
}

#[tokio::test]
async fn test_fetch_layer_timeout_names_layer() {
    let app = Router::new().route(OWS_PATH, get(slow_get_feature));
    let mut endpoint = Endpoint::new(spawn_server(app).await, "proyecto_lineab");
    endpoint.read_timeout = Duration::from_millis(200);
    let client = LayerClient::new(endpoint);

    let err = client.fetch_layer("departamento").await.unwrap_err();
    assert_eq!(err.layer(), Some("departamento"));
    assert!(err.to_string().contains("timed out"), "{}", err);
}

#[tokio::test]
async fn test_register_stalled_server_times_out() {
    let app = Router::new().route(OWS_PATH, post(stalled_transaction));
    let mut endpoint = Endpoint::new(spawn_server(app).await, "proyecto_lineab");
    endpoint.layer_name = "registro_estacion".to_string();
    endpoint.namespace_uri = "http://proyecto_lineab.org".to_string();
    endpoint.write_timeout = Duration::from_millis(200);
    let client = TransactionClient::new(endpoint);

    let result = tokio::time::timeout(
        Duration::from_secs(3),
        client.register_at_station(&registration("ana@x.co")),
    )
    .await
    .expect("registration should be bounded by write_timeout");

    assert!(matches!(
        result,
        Err(WfsError::Transport(TransportError::Timeout))
    ));
}

#[tokio::test]
async fn test_fetch_layer_connection_refused() {
    // Port 9 (discard) n'écoute pas en local
    let client = LayerClient::new(Endpoint::new("http://127.0.0.1:9/geoserver", "ws"));
    let err = client.fetch_layer("departamento").await.unwrap_err();
    assert!(matches!(err, WfsError::LayerUnavailable { .. }));
}

#[tokio::test]
async fn test_fetch_layers_best_effort() {
    let client = LayerClient::new(geoserver().await);

    let layers = client
        .fetch_layers(&["departamento", "estacion", "vereda", "municipio"])
        .await;

    let mut keys: Vec<_> = layers.keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, vec!["departamento", "estacion"]);
}

#[tokio::test]
async fn test_register_over_http() {
    let client = TransactionClient::new(geoserver().await);

    let outcome = client
        .register_at_station(&registration("ana@x.co"))
        .await
        .unwrap();
    assert!(outcome.success, "{}", outcome.reply);
}

#[tokio::test]
async fn test_register_duplicate_over_http() {
    let client = TransactionClient::new(geoserver().await);

    let outcome = client
        .register_at_station(&registration("dup@x.co"))
        .await
        .unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.message, "duplicate key");
}

#[tokio::test]
async fn test_register_bad_credentials() {
    let mut endpoint = geoserver().await;
    endpoint.credentials = Credentials::new("admin", Some("wrong".to_string()));
    let client = TransactionClient::new(endpoint);

    let err = client
        .register_at_station(&registration("ana@x.co"))
        .await
        .unwrap_err();
    assert!(matches!(err, WfsError::TransactionStatus { status: 401 }));
}

#[tokio::test]
async fn test_register_station_from_fetched_layer() {
    let endpoint = geoserver().await;
    let layers = LayerClient::new(endpoint.clone());
    let stations = layers.fetch_layer("estacion").await.unwrap();

    let feature = wfs::find_station(&stations, "station 1").unwrap();
    let station = StationTarget::from_feature(feature).unwrap();

    let outcome = TransactionClient::new(endpoint)
        .register_at_station(&RegistrationForm::new(
            Registrant::new("Ana", "Ruiz", "ana@x.co"),
            station,
        ))
        .await
        .unwrap();
    assert!(outcome.success);
}
