//! Health endpoint integration tests.

#[cfg(test)]
mod tests {
    use crate::endpoint_url;

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_running_without_credentials() {
        let resp = reqwest::get(format!("{}/health", endpoint_url()))
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["status"], "running");
        assert!(json["replayEntries"].is_u64());
    }
}
