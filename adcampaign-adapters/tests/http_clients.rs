use adcampaign_adapters::*;
use adcampaign_core::AdapterError;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_gemini_generate_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .and(query_param("key", "test-key"))
        .and(body_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "Describe EcoBottle"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "{\"name\": \"EcoBottle\"}"}]}}]
        })))
        .mount(&server)
        .await;

    let model = GeminiTextModel::new("test-key", "gemini-2.0-flash")
        .unwrap()
        .with_base_url(server.uri());
    let text = model.generate("Describe EcoBottle").await.unwrap();
    assert_eq!(text, "{\"name\": \"EcoBottle\"}");
}

#[tokio::test]
async fn test_gemini_client_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("API key not valid"))
        .expect(1)
        .mount(&server)
        .await;

    let model =
        GeminiTextModel::new("bad", "gemini-2.0-flash").unwrap().with_base_url(server.uri());
    let err = model.generate("hi").await.unwrap_err();
    assert!(matches!(err, AdapterError::Status { code: 400, ref body } if body.contains("API key")));
}

#[tokio::test]
async fn test_twitter_search_passes_page_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .and(header("authorization", "Bearer token-123"))
        .and(query_param("query", "insulated OR EcoBottle"))
        .and(query_param("next_token", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "1", "text": "Loving my #EcoBottle @green_guru", "author_id": "42"}],
            "meta": {"result_count": 1, "next_token": "def"}
        })))
        .mount(&server)
        .await;

    let client = TwitterClient::new("token-123").with_base_url(server.uri());
    let page = client.search("insulated OR EcoBottle", 25, Some("abc")).await.unwrap();
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.results[0].author_id.as_deref(), Some("42"));
    assert_eq!(page.next_page_token.as_deref(), Some("def"));
}

#[tokio::test]
async fn test_twitter_rate_limit_maps_to_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = TwitterClient::new("t").with_base_url(server.uri());
    assert!(matches!(client.search("q", 25, None).await, Err(AdapterError::RateLimited)));
}

#[tokio::test]
async fn test_twitter_lookup_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/users/by/username/green_guru"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "id": "42",
                "username": "green_guru",
                "name": "Green Guru",
                "description": "Zero waste living",
                "public_metrics": {"followers_count": 25000, "following_count": 10}
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2/users/by/username/ghost"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{"detail": "Could not find user with username: [ghost]."}]
        })))
        .mount(&server)
        .await;

    let client = TwitterClient::new("t").with_base_url(server.uri());
    let profile = client.lookup_profile("green_guru").await.unwrap().unwrap();
    assert_eq!(profile.followers_count, 25_000);
    assert_eq!(profile.description, "Zero waste living");
    assert!(client.lookup_profile("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn test_veo_submit_and_poll() {
    let server = MockServer::start().await;
    let config = VertexConfig::new("proj", "us-central1", "tok").with_base_url(server.uri());
    let base = "/v1/projects/proj/locations/us-central1/publishers/google/models/veo-2.0-generate-001";

    Mock::given(method("POST"))
        .and(path(format!("{base}:predictLongRunning")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "operations/op-1"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{base}:fetchPredictOperation")))
        .and(body_json(json!({"operationName": "operations/op-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "operations/op-1",
            "done": true,
            "response": {"videos": [{"gcsUri": "gs://ads/op-1.mp4"}]}
        })))
        .mount(&server)
        .await;

    let client = VeoClient::new(config);
    let handle = client.submit(&VideoRequest::new("A bottle on a trail")).await.unwrap();
    assert_eq!(handle.name(), "operations/op-1");
    assert_eq!(
        client.poll(&handle).await.unwrap(),
        OperationStatus::Done { video: GeneratedVideo::uri("gs://ads/op-1.mp4") }
    );
}

#[tokio::test]
async fn test_veo_inline_video_is_saved_locally() {
    let server = MockServer::start().await;
    let config = VertexConfig::new("proj", "us-central1", "tok").with_base_url(server.uri());
    let base = "/v1/projects/proj/locations/us-central1/publishers/google/models/veo-2.0-generate-001";

    Mock::given(method("POST"))
        .and(path(format!("{base}:predictLongRunning")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "operations/op-2"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{base}:fetchPredictOperation")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "operations/op-2",
            "done": true,
            "response": {"videos": [{"bytesBase64Encoded": "AAAAGGZ0eXBtcDQy", "mimeType": "video/mp4"}]}
        })))
        .mount(&server)
        .await;

    let client = VeoClient::new(config);
    let policy = PollPolicy::default().with_interval(std::time::Duration::from_millis(5));
    let video = generate_video_with_polling(&client, &VideoRequest::new("A bottle on a trail"), &policy)
        .await
        .unwrap();
    assert!(matches!(video, GeneratedVideo::Inline { .. }));

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("ad_video.mp4");
    let reference = save_video(&video, &dest).await.unwrap();
    assert_eq!(reference, dest.to_string_lossy());
    let bytes = tokio::fs::read(&dest).await.unwrap();
    assert_eq!(&bytes[4..8], b"ftyp");
}

#[tokio::test]
async fn test_gcs_upload_returns_public_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload/storage/v1/b/ad-images/o"))
        .and(query_param("name", "ads/green_guru.png"))
        .and(header("content-type", "image/png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "ads/green_guru.png"})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("green_guru.png");
    tokio::fs::write(&source, b"png").await.unwrap();

    let storage = GcsStorage::new("ad-images", "tok")
        .with_endpoints(format!("{}/upload/storage/v1", server.uri()), "https://cdn.example");
    let url = storage.upload(&source, "ads/green_guru.png").await.unwrap();
    assert_eq!(url, "https://cdn.example/ad-images/ads/green_guru.png");
}

#[tokio::test]
async fn test_imagen_retries_transient_failure() {
    let server = MockServer::start().await;
    let config = VertexConfig::new("proj", "us-central1", "tok").with_base_url(server.uri());
    let predict = "/v1/projects/proj/locations/us-central1/publishers/google/models/imagegeneration@006:predict";

    Mock::given(method("POST"))
        .and(path(predict))
        .respond_with(ResponseTemplate::new(503).set_body_string("model overloaded"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(predict))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "predictions": [{"bytesBase64Encoded": "iVBORw==", "mimeType": "image/png"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let retry = RetryPolicy::default()
        .with_delays(std::time::Duration::from_millis(1), std::time::Duration::from_millis(5));
    let client = ImagenClient::new(config).with_retry(retry);
    let images = client.generate("EcoBottle on a trail", 1).await.unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].extension(), "png");
}
