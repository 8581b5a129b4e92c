use coinconv::core::store::AssetCatalogStore;
use coinconv::store::disk::DiskStore;
use coinconv::{AppCommand, ConvertArgs};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use tracing::info;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod test_utils {
    use super::*;

    /// Mock CoinGecko serving a small catalog and an ETH/EUR price.
    pub async fn create_mock_server() -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/coins/list"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[
                    {"id": "bitcoin", "symbol": "btc", "name": "Bitcoin"},
                    {"id": "ethereum", "symbol": "eth", "name": "Ethereum"}
                ]"#,
            ))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/simple/supported_vs_currencies"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"["usd", "eur"]"#))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .and(query_param("ids", "ethereum"))
            .and(query_param("vs_currencies", "eur"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"ethereum": {"eur": 2012.35}}"#),
            )
            .mount(&mock_server)
            .await;

        mock_server
    }

    /// Writes a config pointing at `base_url` with its own data directory.
    pub fn write_config(dir: &TempDir, base_url: &str) -> String {
        let config_path = dir.path().join("config.yaml");
        let config_content = format!(
            r#"
providers:
  coingecko:
    base_url: "{}"
request_timeout_secs: 2
data_path: "{}"
"#,
            base_url,
            dir.path().join("data").display()
        );
        fs::write(&config_path, config_content).expect("Failed to write config file");
        config_path.to_string_lossy().into_owned()
    }

    pub async fn price_requests(server: &MockServer, id: &str) -> usize {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == "/simple/price")
            .filter(|request| request.url.query().is_some_and(|q| q.contains(id)))
            .count()
    }
}

#[test_log::test(tokio::test)]
async fn test_convert_remembers_pair() {
    let mock_server = test_utils::create_mock_server().await;
    let temp_dir = TempDir::new().unwrap();
    let config_path = test_utils::write_config(&temp_dir, &mock_server.uri());

    let args = ConvertArgs {
        amount: "2".to_string(),
        from: Some("ETH".to_string()),
        to: Some("eur".to_string()),
        ..ConvertArgs::default()
    };
    let conversion = coinconv::convert(&args, Some(&config_path))
        .await
        .expect("convert");
    assert_eq!(conversion.result, "4024.70");
    assert_eq!(conversion.rate_label.as_deref(), Some("2012.35 EUR/ETH"));
    assert_eq!(test_utils::price_requests(&mock_server, "ethereum").await, 1);

    // No pair given: the saved ETH/EUR preference is used
    let args = ConvertArgs {
        amount: "1".to_string(),
        ..ConvertArgs::default()
    };
    let conversion = coinconv::convert(&args, Some(&config_path))
        .await
        .expect("convert");
    assert_eq!(conversion.pair.display_source(), "ETH");
    assert_eq!(conversion.pair.display_target(), "EUR");
    assert_eq!(conversion.result, "2012.35");
    assert_eq!(test_utils::price_requests(&mock_server, "ethereum").await, 2);
    assert_eq!(test_utils::price_requests(&mock_server, "bitcoin").await, 0);
}

#[test_log::test(tokio::test)]
async fn test_convert_command_prints() {
    let mock_server = test_utils::create_mock_server().await;
    let temp_dir = TempDir::new().unwrap();
    let config_path = test_utils::write_config(&temp_dir, &mock_server.uri());

    let args = ConvertArgs {
        amount: "2".to_string(),
        from: Some("eth".to_string()),
        to: Some("eur".to_string()),
        ..ConvertArgs::default()
    };
    let result = coinconv::run_command(AppCommand::Convert(args), Some(&config_path)).await;
    assert!(result.is_ok(), "Convert failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_manual_convert_stays_offline() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let config_path = test_utils::write_config(&temp_dir, &mock_server.uri());

    let args = ConvertArgs {
        amount: "10".to_string(),
        from: Some("btc".to_string()),
        to: Some("usd".to_string()),
        rate: Some("0.50".to_string()),
        invert: true,
    };
    let conversion = coinconv::convert(&args, Some(&config_path))
        .await
        .expect("convert");
    assert_eq!(conversion.result, "20.00");
    assert_eq!(conversion.rate_label.as_deref(), Some("2.00 BTC/USD"));

    let requests = mock_server.received_requests().await.unwrap_or_default();
    info!(count = requests.len(), "Requests seen by mock server");
    assert!(requests.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_refresh_persists_catalog() {
    let mock_server = test_utils::create_mock_server().await;
    let temp_dir = TempDir::new().unwrap();
    let config_path = test_utils::write_config(&temp_dir, &mock_server.uri());

    let result = coinconv::run_command(AppCommand::Refresh, Some(&config_path)).await;
    assert!(result.is_ok(), "Refresh failed with: {:?}", result.err());

    let store = DiskStore::open(&temp_dir.path().join("data").join("store")).unwrap();
    let catalog = AssetCatalogStore::new(Arc::new(store))
        .load()
        .expect("stored catalog");
    assert_eq!(catalog.remote_id("ETH"), Some("ethereum"));
    assert!(catalog.supports_currency("eur"));
}

#[test_log::test(tokio::test)]
async fn test_refresh_fails_when_service_is_down() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    let temp_dir = TempDir::new().unwrap();
    let config_path = test_utils::write_config(&temp_dir, &mock_server.uri());

    let result = coinconv::run_command(AppCommand::Refresh, Some(&config_path)).await;
    assert!(result.is_err());
}

#[test_log::test(tokio::test)]
async fn test_assets_listing() {
    let mock_server = test_utils::create_mock_server().await;
    let temp_dir = TempDir::new().unwrap();
    let config_path = test_utils::write_config(&temp_dir, &mock_server.uri());

    let result = coinconv::run_command(
        AppCommand::Assets {
            filter: Some("eth".to_string()),
        },
        Some(&config_path),
    )
    .await;
    assert!(result.is_ok(), "Assets failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_invalid_config_path() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.yaml");

    let result =
        coinconv::run_command(AppCommand::Refresh, Some(missing.to_str().unwrap())).await;
    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("Failed to read config file")
    );
}
