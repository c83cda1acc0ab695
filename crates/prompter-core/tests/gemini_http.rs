//! End-to-end checks of the Gemini provider against a loopback HTTP server.

use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::{ImageBuffer, ImageFormat, Rgb};
use prompter_core::config::LimitsConfig;
use prompter_core::llm::GeminiProvider;
use prompter_core::{
    display_text, Config, Credential, ImageInput, ImageLoader, PromptPipeline, ERROR_MARKER,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// What the fake service saw for one request.
#[derive(Debug, Clone, Default)]
struct Captured {
    head: String,
    body: String,
}

/// Serve `status` + `body` to every connection, recording each request.
async fn serve(
    status: &'static str,
    body: &'static str,
) -> (String, Arc<AtomicUsize>, Arc<Mutex<Vec<Captured>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let captured = Arc::new(Mutex::new(Vec::new()));

    let hits_task = hits.clone();
    let captured_task = captured.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            hits_task.fetch_add(1, Ordering::SeqCst);

            let request = read_request(&mut socket).await;
            captured_task.lock().unwrap().push(request);

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{addr}/v1beta"), hits, captured)
}

/// Read one HTTP/1.1 request with a Content-Length body.
async fn read_request(socket: &mut tokio::net::TcpStream) -> Captured {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];

    let head_end = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            return Captured::default();
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buf.len() < head_end + content_length {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Captured {
        head,
        body: String::from_utf8_lossy(&buf[head_end..]).to_string(),
    }
}

async fn apple_jpeg() -> ImageInput {
    let img = ImageBuffer::from_pixel(500, 500, Rgb([190u8, 20, 30]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Jpeg).unwrap();
    ImageLoader::new(LimitsConfig::default())
        .load_bytes(buf.into_inner(), Path::new("apple.jpg"))
        .await
        .unwrap()
}

fn pipeline(endpoint: &str) -> PromptPipeline {
    let provider = GeminiProvider::new(endpoint, "gemini-2.5-flash");
    PromptPipeline::with_provider(Box::new(provider), &Config::default())
}

#[tokio::test]
async fn returns_service_text_verbatim() {
    let (endpoint, hits, captured) = serve(
        "200 OK",
        r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"A red apple on a wooden table, photorealistic, soft lighting, 8k"}]},"finishReason":"STOP"}],"usageMetadata":{"totalTokenCount":812},"modelVersion":"gemini-2.5-flash"}"#,
    )
    .await;

    let outcome = pipeline(&endpoint)
        .generate_prompt(&apple_jpeg().await, &Credential::new("valid-key-123"))
        .await;

    let prompt = outcome.as_ref().unwrap();
    assert_eq!(
        prompt.text,
        "A red apple on a wooden table, photorealistic, soft lighting, 8k"
    );
    assert_eq!(prompt.tokens_used, Some(812));
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let captured = captured.lock().unwrap();
    let request = &captured[0];
    assert!(request
        .head
        .starts_with("POST /v1beta/models/gemini-2.5-flash:generateContent "));
    assert!(request
        .head
        .to_ascii_lowercase()
        .contains("x-goog-api-key: valid-key-123"));

    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    let parts = &body["contents"][0]["parts"];
    assert_eq!(parts[0]["text"], prompter_core::DEFAULT_TEMPLATE);
    assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
}

#[tokio::test]
async fn auth_failure_is_wrapped_and_not_retried() {
    let (endpoint, hits, _) = serve(
        "400 Bad Request",
        r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#,
    )
    .await;

    let outcome = pipeline(&endpoint)
        .generate_prompt(&apple_jpeg().await, &Credential::new("bad-key"))
        .await;

    assert_eq!(outcome.as_ref().unwrap_err().status_code, Some(400));
    let text = display_text(&outcome);
    assert!(text.starts_with(ERROR_MARKER), "got: {text}");
    assert!(text.contains("API key not valid"), "got: {text}");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn malformed_response_is_a_failure() {
    let (endpoint, hits, _) = serve("200 OK", "this is not json").await;

    let outcome = pipeline(&endpoint)
        .generate_prompt(&apple_jpeg().await, &Credential::new("valid-key-123"))
        .await;

    let text = display_text(&outcome);
    assert!(text.starts_with("Error: Failed to parse Gemini response"), "got: {text}");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unreachable_service_is_a_failure() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let provider = GeminiProvider::new(&format!("http://{addr}/v1beta"), "gemini-2.5-flash");
    let mut config = Config::default();
    config.limits.request_timeout_ms = 5_000;
    let pipeline = PromptPipeline::with_provider(Box::new(provider), &config);

    let outcome = tokio::time::timeout(
        Duration::from_secs(10),
        pipeline.generate_prompt(&apple_jpeg().await, &Credential::new("k")),
    )
    .await
    .unwrap();

    let text = display_text(&outcome);
    assert!(text.starts_with("Error: Gemini request failed"), "got: {text}");
}
