//! End-to-end test against a live snippet server.
//!
//! # Design
//! Starts the server on a random port, posts captured requests over real HTTP
//! with ureq, and checks the served model against a direct core render.

use restdocs_core::{CapturedRequest, FilePart, HttpMethod, RenderingModel, RequestRenderer};

/// POST `body` as JSON to `url` and return the status and response body.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`.
fn post_json(url: &str, body: &str) -> (u16, String) {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = agent
        .post(url)
        .content_type("application/json")
        .send(body.as_bytes())
        .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();
    (status, body)
}

#[test]
fn served_models_match_direct_render() {
    // Step 1: start the server on a random port.
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            snippet_server::run(listener).await
        })
        .unwrap();
    });

    let url = format!("http://{addr}/snippets/http-request");
    let renderer = RequestRenderer::new();

    // Step 2: render a handful of requests both ways.
    let requests = [
        CapturedRequest::new(HttpMethod::Get, "/things", "example.com").query_string("page=2"),
        CapturedRequest::new(HttpMethod::Post, "/things", "localhost")
            .header("Content-Type", "application/json")
            .body(r#"{"name":"widget"}"#),
        CapturedRequest::new(HttpMethod::Put, "/form", "localhost")
            .port(8080)
            .param("a", "x y"),
        CapturedRequest::new(HttpMethod::Post, "/upload", "localhost")
            .header("Content-Type", "multipart/form-data")
            .param("name", "value")
            .part(FilePart::from_bytes("file", Some("text/plain"), "hi")),
    ];

    for request in &requests {
        let (status, body) = post_json(&url, &serde_json::to_string(request).unwrap());
        assert_eq!(status, 200, "{} {}", request.method, request.uri);
        let served: RenderingModel = serde_json::from_str(&body).unwrap();
        assert_eq!(served, renderer.render(request).unwrap());
    }

    // Step 3: a bad request comes back as data, not a transport error.
    let (status, _) = post_json(&url, r#"{"method":"GET"}"#);
    assert_eq!(status, 422);
}
