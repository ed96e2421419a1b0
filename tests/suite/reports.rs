//! Report endpoints: query order and raw CSV passthrough

use rabbit_client::{PeriodQuery, ReportOutput};
use rabbit_config::MemoryStore;
use rabbit_types::{GroupBy, ReportFormat, UserId};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{client, start_backend};

#[tokio::test]
async fn csv_budget_report_is_returned_verbatim() {
    let server = start_backend().await;
    let csv = "date,model,cost_cents\n2025-09-01,gpt-4o-mini,12\n";
    Mock::given(method("GET"))
        .and(path("/v1/reports/budget"))
        .and(query_param("user_id", "1"))
        .and(query_param("format", "csv"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/csv")
                .set_body_string(csv),
        )
        .expect(1)
        .mount(&server)
        .await;

    let report = client(&server, false, MemoryStore::new())
        .budget_report(UserId::new(1).unwrap(), ReportFormat::Csv)
        .await
        .unwrap();
    assert_eq!(report, ReportOutput::Csv(csv.to_string()));
}

#[tokio::test]
async fn json_budget_report_is_parsed() {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path("/v1/reports/budget"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"spent_cents": 40})))
        .mount(&server)
        .await;

    let report = client(&server, false, MemoryStore::new())
        .budget_report(UserId::new(1).unwrap(), ReportFormat::Json)
        .await
        .unwrap();
    assert_eq!(report, ReportOutput::Json(json!({"spent_cents": 40})));
}

#[tokio::test]
async fn period_report_query_keeps_declared_order() {
    let server = start_backend().await;
    Mock::given(method("GET"))
        .and(path("/v1/reports/period"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rows": []})))
        .mount(&server)
        .await;

    let query = PeriodQuery {
        user_id: UserId::new(3).unwrap(),
        date_from: "2025-09-01".parse().unwrap(),
        date_to: "2025-09-03".parse().unwrap(),
        model: Some("gpt-4o".to_string()),
        success: None,
        group_by: GroupBy::ModelDay,
        format: ReportFormat::Json,
    };
    client(&server, false, MemoryStore::new())
        .period_report(&query)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        requests[0].url.query(),
        Some(
            "user_id=3&date_from=2025-09-01&date_to=2025-09-03&model=gpt-4o&group_by=model_day&format=json"
        )
    );
}
