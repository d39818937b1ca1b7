//! Signed-request integration tests.

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};
    use reqwest::{Method, StatusCode};

    use crate::{endpoint_url, signed_request, signer};

    fn nonce() -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_return_principal_for_signed_request() {
        let client = reqwest::Client::new();
        let signer = signer();
        let headers = signer.sign("GET", "/api/whoami", "", b"");

        let resp = signed_request(&client, Method::GET, "/api/whoami", &headers)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["clientId"], headers.client_id.as_str());
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_sign_query_and_body() {
        let client = reqwest::Client::new();
        let body = br#"{"name":"widget"}"#;
        let headers = signer().sign("POST", "/api/products", "category=tools", body);

        let resp = signed_request(&client, Method::POST, "/api/products?category=tools", &headers)
            .body(body.to_vec())
            .send()
            .await
            .unwrap();
        // Authenticated but unrouted.
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_replayed_request() {
        let client = reqwest::Client::new();
        let headers = signer().sign("GET", "/api/whoami", "", b"");

        let first = signed_request(&client, Method::GET, "/api/whoami", &headers)
            .send()
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = signed_request(&client, Method::GET, "/api/whoami", &headers)
            .send()
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::UNAUTHORIZED);
        let json: serde_json::Value = second.json().await.unwrap();
        assert_eq!(json["message"], "authentication failed");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_stale_timestamp() {
        let client = reqwest::Client::new();
        let stale = Utc::now() - TimeDelta::minutes(10);
        let headers = signer().sign_at("GET", "/api/whoami", "", b"", stale, &nonce());

        let resp = signed_request(&client, Method::GET, "/api/whoami", &headers)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_tampered_body() {
        let client = reqwest::Client::new();
        let headers = signer().sign("POST", "/api/whoami", "", b"original");

        let resp = signed_request(&client, Method::POST, "/api/whoami", &headers)
            .body("tampered")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_unsigned_request() {
        let resp = reqwest::get(format!("{}/api/whoami", endpoint_url()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            resp.headers()
                .get("www-authenticate")
                .and_then(|v| v.to_str().ok()),
            Some("Hmac"),
        );
    }
}
