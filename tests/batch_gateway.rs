//! End-to-end batch tests against mock engines.

use std::collections::HashSet;

use serde_json::{json, Value};

mod common;

use common::{FAILING_PROFILE, Recorder};

async fn setup() -> (std::net::SocketAddr, Recorder, Recorder, routing_gateway::Shutdown) {
    let ors = Recorder::default();
    let vroom = Recorder::default();
    let ors_addr = common::start_routing_engine(ors.clone(), json!({})).await;
    let vroom_addr = common::start_vrp_engine(vroom.clone()).await;
    let (gateway, shutdown) = common::start_gateway(common::gateway_config(ors_addr, vroom_addr)).await;
    (gateway, ors, vroom, shutdown)
}

fn ids(response: &Value) -> Vec<i64> {
    response["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row[0].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_ok() {
    let (gateway, _, _, shutdown) = setup().await;

    let res = common::client()
        .get(format!("http://{}/health", gateway))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), "OK");

    shutdown.trigger();
}

#[tokio::test]
async fn test_two_point_directions_body() {
    let (gateway, ors, _, shutdown) = setup().await;

    let (status, body) = common::post_json(
        gateway,
        "/directions",
        json!({ "data": [[1, "driving-car", [-122.4, 37.7], [-122.5, 37.8]]] }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(ids(&body), vec![1]);
    assert_eq!(body["data"][0][1]["profile"], json!("driving-car"));

    let calls = ors.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "/ors/v2/directions/driving-car/geojson");
    assert_eq!(
        calls[0].1,
        json!({ "coordinates": [[-122.4, 37.7], [-122.5, 37.8]] })
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_directions_object_form_passthrough() {
    let (gateway, ors, _, shutdown) = setup().await;

    let options = json!({
        "coordinates": [[8.681495, 49.41461], [8.686507, 49.41943], [8.687872, 49.420318]],
        "instructions": false,
    });
    let (status, _) = common::post_json(
        gateway,
        "/directions",
        json!({ "data": [[0, "cycling-regular", options.clone()]] }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(ors.calls()[0].1, options);

    shutdown.trigger();
}

#[tokio::test]
async fn test_format_suffix_overrides_default() {
    let (gateway, ors, _, shutdown) = setup().await;

    let (status, body) = common::post_json(
        gateway,
        "/matrix_tabular/json",
        json!({ "data": [[4, "driving-car", [[9.70, 48.47], [9.20, 49.13]]]] }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["data"][0][1]["format"], json!("json"));
    let calls = ors.calls();
    assert_eq!(calls[0].0, "/ors/v2/matrix/driving-car/json");
    assert_eq!(calls[0].1["metrics"], json!(["distance", "duration"]));
    assert_eq!(calls[0].1["resolve_locations"], json!(true));

    shutdown.trigger();
}

#[tokio::test]
async fn test_isochrones_tabular_body() {
    let (gateway, ors, _, shutdown) = setup().await;

    let (status, _) = common::post_json(
        gateway,
        "/isochrones_tabular",
        json!({ "data": [[0, "foot-walking", 4.35, 50.85, 10]] }),
    )
    .await;

    assert_eq!(status, 200);
    let calls = ors.calls();
    assert_eq!(calls[0].0, "/ors/v2/isochrones/foot-walking/geojson");
    assert_eq!(calls[0].1["range"], json!([600]));
    assert_eq!(calls[0].1["locations"], json!([[4.35, 50.85]]));

    shutdown.trigger();
}

#[tokio::test]
async fn test_partial_failure_is_isolated() {
    let (gateway, ors, _, shutdown) = setup().await;

    let (status, body) = common::post_json(
        gateway,
        "/directions",
        json!({ "data": [
            [1, "driving-car", [-122.4, 37.7], [-122.5, 37.8]],
            [2, FAILING_PROFILE, [-122.4, 37.7], [-122.5, 37.8]],
            [3, "driving-car", [-122.3, 37.6], [-122.5, 37.8]],
        ] }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(ids(&body), vec![1, 2, 3]);
    assert_eq!(ors.count(), 3);

    let rows = body["data"].as_array().unwrap();
    assert!(rows[0][1].get("error").is_none());
    assert_eq!(rows[0][1]["profile"], json!("driving-car"));
    assert!(rows[2][1].get("error").is_none());

    let error = &rows[1][1]["error"];
    assert_eq!(error["rowId"], json!(2));
    assert_eq!(error["kind"], json!("downstream"));
    assert_eq!(error["status"], json!(500));
    assert_eq!(error["body"]["error"]["code"], json!(2099));

    shutdown.trigger();
}

#[tokio::test]
async fn test_shape_error_stays_in_its_row() {
    let (gateway, ors, _, shutdown) = setup().await;

    let (status, body) = common::post_json(
        gateway,
        "/directions_tabular",
        json!({ "data": [
            [10, "driving-car", [[8.68, 49.41], [8.69, 49.42]]],
            [11, "driving-car"],
            [12, "driving-car", "not coordinates"],
        ] }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(ids(&body), vec![10, 11, 12]);
    assert_eq!(ors.count(), 1);
    assert_eq!(body["data"][1][1]["error"]["kind"], json!("shape"));
    assert_eq!(body["data"][2][1]["error"]["kind"], json!("shape"));
    assert_eq!(body["data"][2][1]["error"]["rowId"], json!(12));

    shutdown.trigger();
}

#[tokio::test]
async fn test_empty_batches_contact_nothing() {
    let (gateway, ors, vroom, shutdown) = setup().await;

    for body in [json!({ "data": [] }), json!({}), json!({ "data": null })] {
        let (status, response) = common::post_json(gateway, "/directions", body).await;
        assert_eq!(status, 200);
        assert_eq!(response, json!({ "data": [] }));
    }

    let res = common::client()
        .post(format!("http://{}/optimization", gateway))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({ "data": [] }));

    assert_eq!(ors.count(), 0);
    assert_eq!(vroom.count(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_malformed_envelope_rejected() {
    let (gateway, ors, _, shutdown) = setup().await;

    let (status, body) = common::post_json(gateway, "/matrix", json!({ "data": 5 })).await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("data"));

    let (status, _) =
        common::post_json(gateway, "/matrix", json!({ "data": [["x", "driving-car", {}]] })).await;
    assert_eq!(status, 400);

    let (status, _) = common::post_json(
        gateway,
        "/matrix/geo.json",
        json!({ "data": [[0, "driving-car", { "locations": [] }]] }),
    )
    .await;
    assert_eq!(status, 400);

    assert_eq!(ors.count(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_optimization_geometry_decoded_to_lon_lat() {
    let (gateway, _, vroom, shutdown) = setup().await;

    let problem = json!({
        "jobs": [{ "id": 1, "location": [-120.95, 40.7] }],
        "vehicles": [{ "id": 1, "start": [-120.2, 38.5] }],
        "options": { "g": true },
    });
    let (status, body) =
        common::post_json(gateway, "/optimization", json!({ "data": [[7, problem.clone()]] })).await;

    assert_eq!(status, 200);
    assert_eq!(vroom.calls()[0].1, problem);

    let geometry = &body["data"][0][1]["routes"][0]["geometry"];
    assert_eq!(geometry.as_array().unwrap().len(), 3);
    assert_eq!(geometry[0], json!([-120.2, 38.5]));

    shutdown.trigger();
}

#[tokio::test]
async fn test_optimization_tabular() {
    let (gateway, ors, vroom, shutdown) = setup().await;

    let jobs = json!([{ "id": 1, "location": [2.35, 48.85] }, { "id": 2, "location": [2.29, 48.86] }]);
    let vehicles = json!([{ "id": 1, "profile": "car", "start": [2.30, 48.80] }]);
    let (status, body) = common::post_json(
        gateway,
        "/optimization_tabular",
        json!({ "data": [[0, jobs.clone(), vehicles.clone()], [1, "jobs", vehicles.clone()]] }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(ids(&body), vec![0, 1]);
    assert_eq!(vroom.calls()[0].1, json!({ "jobs": jobs, "vehicles": vehicles }));
    assert_eq!(vroom.count(), 1);
    assert_eq!(ors.count(), 0);
    assert_eq!(body["data"][1][1]["error"]["kind"], json!("shape"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_concurrent_rows_keep_identity_and_order() {
    let ors = Recorder::default();
    let ors_addr = common::start_routing_engine(ors.clone(), json!({})).await;
    let vroom_addr = common::start_vrp_engine(Recorder::default()).await;
    let mut config = common::gateway_config(ors_addr, vroom_addr);
    config.batch.max_concurrency = 4;
    let (gateway, shutdown) = common::start_gateway(config).await;

    // Earlier rows are slower, so completion order is reversed.
    let rows: Vec<Value> = (0..8)
        .map(|i| {
            json!([
                100 + i,
                "driving-car",
                { "coordinates": [[8.68, 49.41], [8.69, 49.42]], "delay_ms": (8 - i) * 25 },
            ])
        })
        .collect();
    let (status, body) = common::post_json(gateway, "/directions", json!({ "data": rows })).await;

    assert_eq!(status, 200);
    let got = ids(&body);
    assert_eq!(got, (100..108).collect::<Vec<i64>>());
    assert_eq!(got.iter().collect::<HashSet<_>>().len(), 8);
    assert_eq!(ors.count(), 8);

    shutdown.trigger();
}

#[tokio::test]
async fn test_row_timeout_reported_distinctly() {
    let ors = Recorder::default();
    let ors_addr = common::start_routing_engine(ors.clone(), json!({})).await;
    let vroom_addr = common::start_vrp_engine(Recorder::default()).await;
    let mut config = common::gateway_config(ors_addr, vroom_addr);
    config.routing_engine.timeout_secs = 1;
    let (gateway, shutdown) = common::start_gateway(config).await;

    let (status, body) = common::post_json(
        gateway,
        "/directions",
        json!({ "data": [
            [1, "driving-car", { "coordinates": [[8.68, 49.41], [8.69, 49.42]], "delay_ms": 2500 }],
            [2, "driving-car", [8.68, 49.41], [8.69, 49.42]],
        ] }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["data"][0][1]["error"]["kind"], json!("timeout"));
    assert!(body["data"][1][1].get("error").is_none());

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_engine_is_row_error() {
    let closed = common::closed_port().await;
    let vroom_addr = common::start_vrp_engine(Recorder::default()).await;
    let (gateway, shutdown) = common::start_gateway(common::gateway_config(closed, vroom_addr)).await;

    let (status, body) = common::post_json(
        gateway,
        "/matrix",
        json!({ "data": [[5, "driving-car", { "locations": [[8.68, 49.41], [8.69, 49.42]] }]] }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(ids(&body), vec![5]);
    assert_eq!(body["data"][0][1]["error"]["kind"], json!("downstream"));
    assert!(body["data"][0][1]["error"].get("status").is_none());

    shutdown.trigger();
}

#[tokio::test]
async fn test_matrix_object_form_with_format() {
    let (gateway, ors, _, shutdown) = setup().await;

    let options = json!({
        "locations": [[9.70, 48.47], [9.20, 49.13], [9.55, 48.83]],
        "sources": [0],
        "destinations": [1, 2],
        "metrics": ["duration"],
    });
    let (status, body) = common::post_json(
        gateway,
        "/matrix/json",
        json!({ "data": [[21, "driving-hgv", options.clone()]] }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(ids(&body), vec![21]);
    let calls = ors.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "/ors/v2/matrix/driving-hgv/json");
    assert_eq!(calls[0].1, options);

    shutdown.trigger();
}

#[tokio::test]
async fn test_matrix_tabular_default_format() {
    let (gateway, ors, _, shutdown) = setup().await;

    let (status, _) = common::post_json(
        gateway,
        "/matrix_tabular",
        json!({ "data": [[0, "foot-walking", [[4.35, 50.85], [4.40, 50.84]]]] }),
    )
    .await;

    assert_eq!(status, 200);
    let calls = ors.calls();
    assert_eq!(calls[0].0, "/ors/v2/matrix/foot-walking/geojson");
    assert_eq!(
        calls[0].1,
        json!({
            "locations": [[4.35, 50.85], [4.40, 50.84]],
            "metrics": ["distance", "duration"],
            "resolve_locations": true,
        })
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_isochrones_options_string_parsed() {
    let (gateway, ors, _, shutdown) = setup().await;

    let options = r#"{"locations": [[8.68, 49.41]], "range": [300, 600], "range_type": "time"}"#;
    let (status, body) = common::post_json(
        gateway,
        "/isochrones",
        json!({ "data": [[8, "cycling-regular", options]] }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(ids(&body), vec![8]);
    let calls = ors.calls();
    assert_eq!(calls[0].0, "/ors/v2/isochrones/cycling-regular/geojson");
    assert_eq!(
        calls[0].1,
        json!({ "locations": [[8.68, 49.41]], "range": [300, 600], "range_type": "time" })
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_batch_deadline_keeps_every_slot() {
    let ors = Recorder::default();
    let ors_addr = common::start_routing_engine(ors.clone(), json!({})).await;
    let vroom_addr = common::start_vrp_engine(Recorder::default()).await;
    let mut config = common::gateway_config(ors_addr, vroom_addr);
    config.listener.request_timeout_secs = 1;
    let (gateway, shutdown) = common::start_gateway(config).await;

    let row = |id: i64, delay_ms: u64| {
        json!([
            id,
            "driving-car",
            { "coordinates": [[8.68, 49.41], [8.69, 49.42]], "delay_ms": delay_ms },
        ])
    };
    let started = std::time::Instant::now();
    let (status, body) = common::post_json(
        gateway,
        "/directions",
        json!({ "data": [row(1, 10), row(2, 700), row(3, 700)] }),
    )
    .await;

    assert_eq!(status, 200);
    assert!(started.elapsed() < std::time::Duration::from_secs(3));
    assert_eq!(ids(&body), vec![1, 2, 3]);

    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows[0][1]["profile"], json!("driving-car"));
    assert_eq!(rows[1][1]["profile"], json!("driving-car"));

    let error = &rows[2][1]["error"];
    assert_eq!(error["rowId"], json!(3));
    assert_eq!(error["kind"], json!("timeout"));
    assert!(error["message"].as_str().unwrap().contains("batch deadline"));

    shutdown.trigger();
}
