//! Yandex Market Partner API client against a mock server.

use contracts::usecases::u508_sync_stocks::{
    Currency, FeedRecord, PricePayloadEntry, StockPayloadEntry, SyncOutcome,
};
use stock_sync::shared::config::{YandexCampaignConfig, YandexConfig};
use stock_sync::shared::error::SyncError;
use stock_sync::shared::marketplaces::MarketplaceApi;
use stock_sync::usecases::u508_sync_stocks::catalog_pager::list_offer_identifiers;
use stock_sync::usecases::u508_sync_stocks::{SyncExecutor, YandexApiClient};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn yandex_config() -> YandexConfig {
    YandexConfig {
        token: "ym-token".to_string(),
        ..YandexConfig::default()
    }
}

fn campaign(label: &str, campaign_id: &str, warehouse_id: &str) -> YandexCampaignConfig {
    YandexCampaignConfig {
        label: label.to_string(),
        campaign_id: campaign_id.to_string(),
        warehouse_id: warehouse_id.to_string(),
    }
}

fn mapping_page(skus: &[&str], next_page_token: Option<&str>) -> serde_json::Value {
    let entries: Vec<_> = skus
        .iter()
        .map(|sku| serde_json::json!({ "offer": { "shopSku": sku, "name": "Часы" } }))
        .collect();
    let paging = match next_page_token {
        Some(token) => serde_json::json!({ "nextPageToken": token }),
        None => serde_json::json!({}),
    };
    serde_json::json!({
        "status": "OK",
        "result": { "offerMappingEntries": entries, "paging": paging }
    })
}

#[tokio::test]
async fn test_catalog_paging_by_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/campaigns/100/offer-mapping-entries"))
        .and(query_param("page_token", "tok-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mapping_page(&["C"], None)))
        .with_priority(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/campaigns/100/offer-mapping-entries"))
        .and(query_param("limit", "200"))
        .and(header("Authorization", "Bearer ym-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(mapping_page(&["A", "B"], Some("tok-2"))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = YandexApiClient::with_base_url(
        &yandex_config(),
        &campaign("FBS", "100", "555"),
        &mock_server.uri(),
    )
    .unwrap();

    let offer_ids = list_offer_identifiers(&client).await.unwrap();
    assert_eq!(offer_ids, vec!["A", "B", "C"]);
}

#[tokio::test]
async fn test_update_stocks_put_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/campaigns/100/offers/stocks"))
        .and(header("Authorization", "Bearer ym-token"))
        .and(body_json(serde_json::json!({
            "skus": [{
                "sku": "A",
                "warehouseId": 555,
                "items": [{ "count": 100, "type": "FIT", "updatedAt": "2024-03-01T10:00:00Z" }]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "status": "OK" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = YandexApiClient::with_base_url(
        &yandex_config(),
        &campaign("FBS", "100", "555"),
        &mock_server.uri(),
    )
    .unwrap();

    let stocks = vec![StockPayloadEntry {
        offer_code: "A".into(),
        quantity: 100,
        warehouse_id: Some("555".into()),
        timestamp: Some("2024-03-01T10:00:00Z".into()),
    }];
    client.update_stocks(&stocks).await.unwrap();
}

#[tokio::test]
async fn test_update_prices_uses_rur() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/campaigns/200/offer-prices/updates"))
        .and(body_json(serde_json::json!({
            "offers": [{ "id": "A", "price": { "value": 24570, "currencyId": "RUR" } }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "status": "OK" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = YandexApiClient::with_base_url(
        &yandex_config(),
        &campaign("DBS", "200", "777"),
        &mock_server.uri(),
    )
    .unwrap();

    let prices = vec![PricePayloadEntry {
        offer_code: "A".into(),
        unit_price: 24570,
        currency: Currency::Rub,
    }];
    client.update_prices(&prices).await.unwrap();
}

#[tokio::test]
async fn test_server_error_is_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/campaigns/100/offer-mapping-entries"))
        .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
        .mount(&mock_server)
        .await;

    let client = YandexApiClient::with_base_url(
        &yandex_config(),
        &campaign("FBS", "100", "555"),
        &mock_server.uri(),
    )
    .unwrap();

    let err = list_offer_identifiers(&client).await.unwrap_err();
    assert!(matches!(
        err,
        SyncError::Transport {
            status: Some(503),
            ..
        }
    ));
}

#[tokio::test]
async fn test_failed_campaign_does_not_stop_the_next() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/campaigns/100/offer-mapping-entries"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/campaigns/200/offer-mapping-entries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mapping_page(&["A", "Z"], None)))
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/campaigns/200/offers/stocks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "status": "OK" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/campaigns/200/offer-prices/updates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "status": "OK" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = yandex_config();
    let targets: Vec<Box<dyn MarketplaceApi>> = vec![
        Box::new(
            YandexApiClient::with_base_url(&config, &campaign("FBS", "100", "555"), &mock_server.uri())
                .unwrap(),
        ),
        Box::new(
            YandexApiClient::with_base_url(&config, &campaign("DBS", "200", "777"), &mock_server.uri())
                .unwrap(),
        ),
    ];
    let executor = SyncExecutor::new(vec![FeedRecord::new("A", "5", "990.00")]);

    let outcomes = executor.run_targets(&targets).await;

    assert!(matches!(&outcomes[0], SyncOutcome::Failed { target, .. } if target == "Яндекс Маркет FBS"));
    match &outcomes[1] {
        SyncOutcome::Completed(report) => {
            assert_eq!(report.target, "Яндекс Маркет DBS");
            assert_eq!(report.stocks.len(), 2);
            assert_eq!(report.in_stock.len(), 1);
            assert_eq!(report.in_stock[0].warehouse_id.as_deref(), Some("777"));
            assert_eq!(report.prices_sent, 1);
        }
        other => panic!("expected completed DBS sync, got {:?}", other),
    }
}

#[test]
fn test_missing_campaign_id_rejected() {
    let result = YandexApiClient::new(&yandex_config(), &campaign("FBS", "", "555"));
    assert!(matches!(result, Err(SyncError::Config(_))));
}
