// tests/web_api.rs
use std::fs;
use std::path::Path;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt; // for .oneshot()

use flightdash::app_state::AppState;
use flightdash::config_loader::{AppConfig, PriceConfig, SatisfactionConfig};
use flightdash::satisfaction::SatisfactionEncoding;
use flightdash::web::build_router;

const FLIGHTS_CSV: &str = "\
Airline,Source,Destination,Total_Stops,Journey_Month,Journey_Day,Dep_Hour,Duration_mins,Price
IndiGo,Delhi,Cochin,1,6,1,10,170,4000
IndiGo,Delhi,Cochin,0,6,2,11,150,6000
Air India,Kolkata,Banglore,2,12,1,9,400,9000
Jet Airways,Delhi,Cochin,1,3,24,22,1140,13882
";

const PASSENGERS_CSV: &str = "\
Gender,Customer Type,Age,Flight Distance,satisfaction
Male,Loyal Customer,20,100,satisfied
Female,disloyal Customer,30,200,neutral or dissatisfied
Female,Loyal Customer,40,300,satisfied
Male,Loyal Customer,62,2500,neutral or dissatisfied
";

fn price_manifest() -> Value {
    json!({
        "model_id": "price-linear",
        "task": { "type": "regression" },
        "feature_names": ["Total_Stops", "IndiGo", "Source_Delhi", "Duration_mins", "Route1"],
        "backend": {
            "kind": "linear",
            "intercept": 2000.0,
            "coefficients": [1000.0, 250.0, 100.0, 10.0, 0.0]
        }
    })
}

fn satisfaction_manifest() -> Value {
    json!({
        "model_id": "satisfaction-trees",
        "task": { "type": "classification", "threshold": 0.5 },
        "feature_names": ["Service Score", "Is Delayed", "Customer Type_Loyal Customer"],
        "backend": {
            "kind": "tree_ensemble",
            "base_score": 0.0,
            "learning_rate": 1.0,
            "trees": [{
                "children_left": [1, -1, -1],
                "children_right": [2, -1, -1],
                "feature": [0, 0, 0],
                "threshold": [3.5, 0.0, 0.0],
                "value": [0.0, -2.0, 2.0]
            }]
        }
    })
}

/// Writes models and datasets into a temp dir and returns a config pointing at them.
fn fixture(dir: &Path, satisfaction_model: Option<Value>) -> AppConfig {
    fs::write(dir.join("price.json"), price_manifest().to_string()).unwrap();
    fs::write(dir.join("flights.csv"), FLIGHTS_CSV).unwrap();
    fs::write(dir.join("passengers.csv"), PASSENGERS_CSV).unwrap();
    if let Some(model) = satisfaction_model {
        fs::write(dir.join("satisfaction.json"), model.to_string()).unwrap();
    }

    AppConfig {
        price: PriceConfig {
            model: dir.join("price.json"),
            dataset: dir.join("flights.csv"),
            band: 0.1,
        },
        satisfaction: SatisfactionConfig {
            encoding: SatisfactionEncoding::TravelCombo,
            model: dir.join("satisfaction.json"),
            dataset: dir.join("passengers.csv"),
            histogram_bins: 4,
        },
        ..AppConfig::default()
    }
}

fn app(satisfaction_model: Option<Value>) -> (Router, TempDir) {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let config = fixture(dir.path(), satisfaction_model);
    let state = Arc::new(AppState::load(&config));
    (build_router(state), dir)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri).method(method);
    let body = match body {
        Some(v) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn health_and_readiness() {
    let (app, _dir) = app(Some(satisfaction_manifest()));

    let (status, body) = send(&app, "GET", "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, "GET", "/readyz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);
    assert!(body["started_at"].is_string());
    assert_eq!(body["price"]["model_id"], "price-linear");
    assert_eq!(body["satisfaction"]["model_id"], "satisfaction-trees");
}

#[tokio::test]
async fn price_prediction_returns_value_band_and_aligned_features() {
    let (app, _dir) = app(Some(satisfaction_manifest()));

    let (status, body) = send(
        &app,
        "POST",
        "/api/price/predict",
        Some(json!({
            "airline": "IndiGo",
            "source": "Delhi",
            "destination": "Cochin",
            "total_stops": "1",
            "duration_mins": 100
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    // 2000 + 1000 + 250 + 100 + 10 * 100
    assert_eq!(body["model_id"], "price-linear");
    assert_eq!(body["result"]["kind"], "price");
    assert_eq!(body["result"]["value"], 4350.0);
    assert_eq!(body["result"]["rendered"], "Predicted Price: $4350.00");
    assert_eq!(
        body["result"]["range_rendered"],
        "Estimated Price Range: $3915.00 - $4785.00"
    );

    let features = body["features"].as_object().unwrap();
    let mut keys: Vec<&str> = features.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["Duration_mins", "IndiGo", "Route1", "Source_Delhi", "Total_Stops"]);
    assert_eq!(features["IndiGo"], 1.0);
    assert_eq!(features["Route1"], 0.0);
    assert!(body["request_id"].is_string());
}

#[tokio::test]
async fn price_prediction_rejects_bad_input() {
    let (app, _dir) = app(Some(satisfaction_manifest()));

    let (status, body) = send(
        &app,
        "POST",
        "/api/price/predict",
        Some(json!({ "source": "Delhi", "destination": "Delhi" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("destination"));

    let (status, body) = send(
        &app,
        "POST",
        "/api/price/predict",
        Some(json!({ "airline": "Concorde" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn price_trends_and_flight_filter() {
    let (app, _dir) = app(Some(satisfaction_manifest()));

    let (status, body) = send(&app, "GET", "/api/price/trends", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"], 4);
    let months: Vec<&str> = body["monthly"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["key"].as_str().unwrap())
        .collect();
    assert_eq!(months, ["3", "6", "12"]);
    assert_eq!(body["by_stops"][0]["key"], "0");

    let (status, body) = send(
        &app,
        "GET",
        "/api/price/flights?airline=IndiGo&source=Delhi&destination=Cochin&month=6&day=2",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"].as_array().unwrap().len(), 1);
    assert_eq!(body["columns"][8], "Price");
    assert_eq!(body["rows"][0][8], "6000");

    let (status, _) = send(&app, "GET", "/api/price/flights?month=june", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn satisfaction_prediction_and_trends() {
    let (app, _dir) = app(Some(satisfaction_manifest()));

    let (status, body) = send(
        &app,
        "POST",
        "/api/satisfaction/predict",
        Some(json!({
            "gender": "Male",
            "customer_type": "Loyal Customer",
            "travel_purpose": "Business travel",
            "travel_class": "Eco",
            "age": 30,
            "flight_distance": 500,
            "total_delay": 0,
            "service_score": 4
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["result"]["kind"], "satisfaction");
    assert_eq!(body["result"]["satisfied"], true);
    assert_eq!(body["result"]["rendered"], "Satisfied");
    assert_eq!(body["features"]["Is Delayed"], 0.0);

    let (status, body) = send(
        &app,
        "POST",
        "/api/satisfaction/predict",
        Some(json!({ "service_score": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["rendered"], "Neutral/Unhappy");

    let (status, body) = send(&app, "GET", "/api/satisfaction/trends", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["satisfaction_counts"][1]["key"], "satisfied");
    assert_eq!(body["satisfaction_counts"][1]["count"], 2);
    assert_eq!(body["flight_distance"]["edges"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn pages_and_schema_introspection() {
    let (app, _dir) = app(Some(satisfaction_manifest()));

    let (status, body) = send(&app, "GET", "/api/pages", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
    assert_eq!(body[1]["slug"], "flight-price");

    let (status, body) = send(&app, "GET", "/api/pages/flight-price", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["kind"], "flight_price");
    assert_eq!(body["content"]["form"]["controls"].as_array().unwrap().len(), 12);

    let (status, body) = send(&app, "GET", "/api/pages/customer-satisfaction", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["encoding"], "travel_combo");

    let (status, _) = send(&app, "GET", "/api/pages/settings", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "GET", "/api/models/satisfaction/schema", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["columns"],
        json!(["Service Score", "Is Delayed", "Customer Type_Loyal Customer"])
    );

    let (status, _) = send(&app, "GET", "/api/models/weather/schema", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn broken_dashboard_is_unavailable_while_the_other_serves() {
    let mut manifest = satisfaction_manifest();
    manifest.as_object_mut().unwrap().remove("feature_names");
    let (app, _dir) = app(Some(manifest));

    let (status, body) = send(&app, "GET", "/readyz", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["price"]["ready"], true);
    assert_eq!(body["satisfaction"]["ready"], false);

    let (status, body) = send(&app, "POST", "/api/satisfaction/predict", Some(json!({}))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("satisfaction-trees"));

    let (status, _) = send(&app, "GET", "/api/pages/customer-satisfaction", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = send(&app, "POST", "/api/price/predict", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn missing_model_file_is_unavailable() {
    let (app, _dir) = app(None);
    let (status, body) = send(&app, "GET", "/api/satisfaction/trends", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("satisfaction.json"));
}
