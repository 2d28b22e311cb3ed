#![allow(clippy::unwrap_used)]
// Integration tests for the REST surface of `MistClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mistly_api::{
    ClientConfig, DeviceStatus, DeviceType, Dot11Proto, Error, MistClient, Radio, RadioConfig,
    TicketStatus,
};

// ── Helpers ─────────────────────────────────────────────────────────

const API_KEY: &str = "testAPIKey";
const SITE_ID: &str = "978c48e6-6ef6-11e6-8bbf-02e208b2d34f";
const ORG_ID: &str = "6748cfa6-4e12-11e6-9188-0242ac110007";

async fn setup() -> (MockServer, MistClient) {
    let server = MockServer::start().await;
    let config = ClientConfig::new(server.uri(), API_KEY.to_string().into());
    let client = MistClient::new(config).unwrap();
    (server, client)
}

fn authorized(verb: &str, route: String) -> wiremock::MockBuilder {
    Mock::given(method(verb))
        .and(path(route))
        .and(header("Authorization", format!("Token {API_KEY}").as_str()))
        .and(header("Content-Type", "application/json"))
}

// ── Account ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_self() {
    let (server, client) = setup().await;

    authorized("GET", "/api/v1/self".into())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "email": "test@mistsys.com",
            "first_name": "John",
            "last_name": "Smith",
            "via_sso": false,
            "password_modified_time": 1_600_000_000,
            "privileges": [{
                "scope": "org",
                "org_id": ORG_ID,
                "name": "Acme",
                "role": "admin"
            }],
            "tags": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let me = client.get_self().await.unwrap();
    assert_eq!(me.email, "test@mistsys.com");
    assert!(!me.sso);
    assert_eq!(me.password_modified_time.unwrap().timestamp(), 1_600_000_000);
    assert_eq!(me.privileges.len(), 1);
    assert_eq!(me.privileges[0].org_id, ORG_ID);
    assert_eq!(me.privileges[0].role, "admin");
}

// ── Organization ────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_org_sites() {
    let (server, client) = setup().await;

    authorized("GET", format!("/api/v1/orgs/{ORG_ID}/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": SITE_ID,
            "name": "Mist Office",
            "timezone": "America/Los_Angeles",
            "country_code": "US",
            "latlng": { "lat": 37.295833, "lng": -122.032946 },
            "sitegroup_ids": [],
            "address": "1601 S. Deanza Blvd., Cupertino, CA, 95014"
        }])))
        .mount(&server)
        .await;

    let sites = client.get_org_sites(ORG_ID).await.unwrap();
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0].id, SITE_ID);
    assert_eq!(sites[0].name, "Mist Office");
    assert!((sites[0].lat_lng["lng"] + 122.032_946).abs() < 1e-9);
}

#[tokio::test]
async fn test_count_org_tickets() {
    let (server, client) = setup().await;

    authorized("GET", format!("/api/v1/orgs/{ORG_ID}/tickets/count"))
        .and(query_param("distinct", "status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "status": "open", "count": 12 },
                { "status": "pending", "count": 3 },
                { "status": "solved", "count": 40 },
                { "status": "closed", "count": 7 },
                { "status": "hold", "count": 1 }
            ]
        })))
        .mount(&server)
        .await;

    let counts = client.count_org_tickets(ORG_ID).await.unwrap();
    assert_eq!(counts.len(), 5);
    assert_eq!(counts[&TicketStatus::Open], 12);
    assert_eq!(counts[&TicketStatus::Hold], 1);
}

#[tokio::test]
async fn test_count_org_alarms() {
    let (server, client) = setup().await;

    authorized("GET", format!("/api/v1/orgs/{ORG_ID}/alarms/count"))
        .and(query_param("distinct", "type"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "type": "device_down", "count": 1 },
                { "type": "switch_down", "count": 4 }
            ]
        })))
        .mount(&server)
        .await;

    let counts = client.count_org_alarms(ORG_ID).await.unwrap();
    assert_eq!(counts["device_down"], 1);
    assert_eq!(counts["switch_down"], 4);
}

// ── Sites ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_site_devices() {
    let (server, client) = setup().await;

    authorized("GET", format!("/api/v1/sites/{SITE_ID}/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "00000000-0000-0000-1000-5c5b35000010",
            "name": "Lobby AP",
            "type": "ap",
            "model": "AP43",
            "serial": "A0123456789",
            "mac": "5c5b35000010",
            "site_id": SITE_ID,
            "created_time": 1_562_181_420,
            "modified_time": 0
        }])))
        .mount(&server)
        .await;

    let devices = client.get_site_devices(SITE_ID).await.unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].device_type, DeviceType::Ap);
    assert_eq!(devices[0].model, "AP43");
    assert!(devices[0].created_time.is_some());
    assert!(devices[0].modified_time.is_none());
}

#[tokio::test]
async fn test_get_site_device_stats() {
    let (server, client) = setup().await;

    authorized("GET", format!("/api/v1/sites/{SITE_ID}/stats/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "00000000-0000-0000-1000-5c5b35000010",
            "mac": "5c5b35000010",
            "name": "Lobby AP",
            "type": "ap",
            "status": "connected",
            "ip": "10.2.1.120",
            "num_clients": 4,
            "uptime": 13_500.7,
            "last_seen": 1_470_417_522.5,
            "radio_stat": {
                "band_5": {
                    "mac": "5c5b35000011",
                    "num_clients": 4,
                    "channel": 36,
                    "bandwidth": 40,
                    "power": 17,
                    "tx_bytes": 50_877_568,
                    "rx_bytes": 1_003_342
                },
                "band_24": { "channel": 6, "num_clients": 0 }
            }
        }])))
        .mount(&server)
        .await;

    let stats = client.get_site_device_stats(SITE_ID).await.unwrap();
    assert_eq!(stats.len(), 1);
    let stat = &stats[0];
    assert_eq!(stat.device.name, "Lobby AP");
    assert_eq!(stat.status, DeviceStatus::Connected);
    assert_eq!(stat.num_clients, 4);
    assert_eq!(stat.uptime.unwrap().as_secs(), 13_500);
    assert_eq!(stat.ip.unwrap().to_string(), "10.2.1.120");
    assert_eq!(stat.radio_stats[&RadioConfig::Band5].tx_bytes, 50_877_568);
    assert_eq!(stat.radio_stats[&RadioConfig::Band24].channel, 6);
}

#[tokio::test]
async fn test_get_site_client_stats() {
    let (server, client) = setup().await;

    authorized("GET", format!("/api/v1/sites/{SITE_ID}/stats/clients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "mac": "5684dae9ac8b",
            "hostname": "laptop-1",
            "ssid": "corp",
            "band": "5",
            "proto": "ac",
            "rssi": -65,
            "idle_time": 3,
            "_ttl": 30,
            "guest": { "authorized": false }
        }, {
            "mac": "aabbccddeeff",
            "band": "2.4",
            "proto": "wifi-8"
        }])))
        .mount(&server)
        .await;

    let clients = client.get_site_client_stats(SITE_ID).await.unwrap();
    assert_eq!(clients.len(), 2);
    assert_eq!(clients[0].hostname, "laptop-1");
    assert_eq!(clients[0].band, Radio::Band5);
    assert_eq!(clients[0].proto, Dot11Proto::Ac);
    assert_eq!(clients[0].rssi, -65);
    assert_eq!(clients[0].idletime.unwrap().as_secs(), 3);
    assert_eq!(clients[0].ttl, 30);
    assert_eq!(clients[1].band, Radio::Band24);
    assert_eq!(clients[1].proto, Dot11Proto::Unknown);
}

// ── Error handling ──────────────────────────────────────────────────

#[tokio::test]
async fn test_api_error_keeps_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(format!("/api/v1/sites/{SITE_ID}/devices")))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"detail":"site not found"}"#))
        .mount(&server)
        .await;

    let result = client.get_site_devices(SITE_ID).await;
    match &result {
        Err(Error::Api { status, body }) => {
            assert_eq!(*status, 404);
            assert!(body.contains("site not found"), "{body}");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
    assert!(result.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/self"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let result = client.get_self().await;
    assert!(
        matches!(result, Err(Error::Deserialization { ref body, .. }) if body.contains("gateway")),
        "expected Deserialization error, got: {result:?}"
    );
}

// ── Generic verbs ───────────────────────────────────────────────────

#[tokio::test]
async fn test_post_put_delete() {
    let (server, client) = setup().await;
    let route = format!("/api/v1/sites/{SITE_ID}/wlans");

    authorized("POST", route.clone())
        .and(body_json(json!({ "ssid": "guest" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "w1", "ssid": "guest" })))
        .expect(1)
        .mount(&server)
        .await;
    authorized("PUT", format!("{route}/w1"))
        .and(body_json(json!({ "enabled": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "w1", "enabled": false })))
        .expect(1)
        .mount(&server)
        .await;
    authorized("DELETE", format!("{route}/w1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let created: serde_json::Value = client
        .post(&route, &json!({ "ssid": "guest" }))
        .await
        .unwrap();
    assert_eq!(created["id"], "w1");

    let updated: serde_json::Value = client
        .put(&format!("{route}/w1"), &json!({ "enabled": false }))
        .await
        .unwrap();
    assert_eq!(updated["enabled"], false);

    client.delete(&format!("{route}/w1")).await.unwrap();
}

#[tokio::test]
async fn test_base_url_path_prefix_is_kept() {
    let server = MockServer::start().await;
    let config = ClientConfig::new(format!("{}/proxy/mist", server.uri()), API_KEY.to_string().into());
    let client = MistClient::new(config).unwrap();

    Mock::given(method("GET"))
        .and(path("/proxy/mist/api/v1/self"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "email": "a@b.c" })))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(client.get_self().await.unwrap().email, "a@b.c");
}
