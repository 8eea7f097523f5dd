//! Integration test: start the gateway on a free port, GET /, assert health JSON.
//! Uses a placeholder API key; the upstream is never called.
//! The server task is left running when the test ends.

use lib::config::{self, Config};
use lib::gateway;
use std::time::Duration;

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

#[tokio::test]
async fn gateway_health_http_responds_with_running() {
    let port = free_port();

    let mut config = Config::default();
    config.gateway.port = port;
    config.gateway.bind = "127.0.0.1".to_string();
    config.upstream.api_key = Some("placeholder-key".to_string());

    let gateway_handle = tokio::spawn(async move {
        let _ = gateway::run_gateway(config).await;
    });

    let url = format!("http://127.0.0.1:{}/", port);
    let client = reqwest::Client::new();
    let mut last_err = None;
    for _ in 0..100 {
        match client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => {
                let json: serde_json::Value = resp.json().await.expect("parse JSON");
                assert_eq!(json.get("runtime").and_then(|v| v.as_str()), Some("running"));
                assert_eq!(json.get("port").and_then(|v| v.as_u64()), Some(port as u64));
                return;
            }
            Ok(_) => {}
            Err(e) => last_err = Some(e),
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    gateway_handle.abort();
    panic!(
        "GET {} did not return 200 with health JSON within 5s; last error: {:?}",
        url, last_err
    );
}

#[test]
fn gateway_refuses_to_start_without_api_key() {
    let config = Config::default();

    let err = match gateway::build_client(&config, None) {
        Ok(_) => panic!("startup must fail without a key"),
        Err(e) => e,
    };
    assert!(err.to_string().contains(config::API_KEY_ENV), "{}", err);
}

#[test]
fn gateway_builds_client_from_resolved_key() {
    let mut config = Config::default();
    config.upstream.base_url = "http://127.0.0.1:9/v1beta/models/".to_string();

    let client = gateway::build_client(&config, Some("placeholder-key".to_string()))
        .expect("client builds with a key");
    assert_eq!(
        client.generate_url(),
        "http://127.0.0.1:9/v1beta/models/gemini-2.0-flash:generateContent"
    );
}
