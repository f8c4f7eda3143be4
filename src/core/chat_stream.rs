use futures_util::StreamExt;
use memchr::memchr;
use tokio::sync::mpsc;

use crate::api::{ChatMessage, ChatRequest, ChatResponse};
use crate::error::ChatError;
use crate::utils::url::construct_api_url;

/// Attribution headers OpenRouter uses to identify calling apps.
const ATTRIBUTION_REFERER: &str = "https://localhost";
const ATTRIBUTION_TITLE: &str = "rpachat";

#[derive(Clone, Debug)]
pub enum StreamMessage {
    Chunk(String),
    Error(ChatError),
    End,
}

fn extract_data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim_start)
}

/// Handle one SSE `data:` payload. Returns true when the stream is finished.
fn handle_data_payload(
    payload: &str,
    tx: &mpsc::UnboundedSender<(StreamMessage, u64)>,
    stream_id: u64,
) -> bool {
    if payload == "[DONE]" {
        let _ = tx.send((StreamMessage::End, stream_id));
        return true;
    }

    match serde_json::from_str::<ChatResponse>(payload) {
        Ok(response) => {
            if let Some(choice) = response.choices.first() {
                if let Some(content) = &choice.delta.content {
                    let _ = tx.send((StreamMessage::Chunk(content.clone()), stream_id));
                }
            }
            false
        }
        Err(_) => {
            if payload.trim().is_empty() {
                return false;
            }

            // Mid-stream payloads that are not deltas are error objects.
            let error = ChatError::unexpected_response(payload_summary(payload));
            let _ = tx.send((StreamMessage::Error(error), stream_id));
            let _ = tx.send((StreamMessage::End, stream_id));
            true
        }
    }
}

fn process_sse_line(
    line: &str,
    tx: &mpsc::UnboundedSender<(StreamMessage, u64)>,
    stream_id: u64,
) -> bool {
    extract_data_payload(line)
        .map(|payload| handle_data_payload(payload, tx, stream_id))
        .unwrap_or(false)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Pull the human-readable message out of an API error body, covering the
/// shapes OpenRouter and compatible endpoints produce:
/// {"error":{"message":..}}, {"error":".."}, and {"message":".."}.
fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value.get("error").and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.to_string()),
                _ => None,
            })
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary
        .map(|text| collapse_whitespace(&text))
        .filter(|text| !text.is_empty())
}

fn payload_summary(payload: &str) -> String {
    let trimmed = payload.trim();
    serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|value| extract_error_summary(&value))
        .unwrap_or_else(|| collapse_whitespace(trimmed))
}

/// Map a non-success HTTP response onto the error taxonomy, carrying the
/// summary extracted from the response body when one is present.
fn classify_http_error(status: u16, body: &str) -> ChatError {
    let mut message = payload_summary(body);
    if message.is_empty() {
        message = "no details provided".to_string();
    }

    match status {
        401 | 403 => ChatError::authentication(message),
        429 => ChatError::rate_limit(message),
        _ => ChatError::api(status, message),
    }
}

pub struct StreamParams {
    pub client: reqwest::Client,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub api_messages: Vec<ChatMessage>,
    pub cancel_token: tokio_util::sync::CancellationToken,
    pub stream_id: u64,
}

/// Spawns one stream task per turn and relays decoded fragments over an
/// unbounded channel. The UI loop is the single consumer; stale events from
/// superseded streams are filtered out by id on the consumer side.
#[derive(Clone)]
pub struct ChatStreamService {
    tx: mpsc::UnboundedSender<(StreamMessage, u64)>,
}

impl ChatStreamService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(StreamMessage, u64)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn spawn_stream(&self, params: StreamParams) {
        let tx_clone = self.tx.clone();
        tokio::spawn(async move {
            let StreamParams {
                client,
                base_url,
                api_key,
                model,
                max_tokens,
                temperature,
                api_messages,
                cancel_token,
                stream_id,
            } = params;

            let request = ChatRequest {
                model,
                messages: api_messages,
                max_tokens,
                temperature,
                stream: true,
            };

            tokio::select! {
                _ = async {
                    let chat_url = construct_api_url(&base_url, "chat/completions");
                    let send_result = client
                        .post(chat_url)
                        .header("Authorization", format!("Bearer {api_key}"))
                        .header("Content-Type", "application/json")
                        .header("HTTP-Referer", ATTRIBUTION_REFERER)
                        .header("X-Title", ATTRIBUTION_TITLE)
                        .json(&request)
                        .send()
                        .await;

                    match send_result {
                        Ok(response) => {
                            let status = response.status();
                            if !status.is_success() {
                                let body = response
                                    .text()
                                    .await
                                    .unwrap_or_default();
                                let error = classify_http_error(status.as_u16(), &body);
                                let _ = tx_clone.send((StreamMessage::Error(error), stream_id));
                                let _ = tx_clone.send((StreamMessage::End, stream_id));
                                return;
                            }

                            let mut stream = response.bytes_stream();
                            let mut buffer: Vec<u8> = Vec::new();

                            while let Some(chunk) = stream.next().await {
                                if cancel_token.is_cancelled() {
                                    return;
                                }

                                let chunk_bytes = match chunk {
                                    Ok(bytes) => bytes,
                                    Err(e) => {
                                        // The body dropped mid-stream.
                                        let _ = tx_clone.send((
                                            StreamMessage::Error(ChatError::from(e)),
                                            stream_id,
                                        ));
                                        let _ = tx_clone.send((StreamMessage::End, stream_id));
                                        return;
                                    }
                                };

                                buffer.extend_from_slice(&chunk_bytes);

                                while let Some(newline_pos) = memchr(b'\n', &buffer) {
                                    let line_str = match std::str::from_utf8(&buffer[..newline_pos]) {
                                        Ok(s) => s.trim(),
                                        Err(e) => {
                                            eprintln!("Invalid UTF-8 in stream: {e}");
                                            buffer.drain(..=newline_pos);
                                            continue;
                                        }
                                    };

                                    let should_end =
                                        process_sse_line(line_str, &tx_clone, stream_id);
                                    buffer.drain(..=newline_pos);
                                    if should_end {
                                        return;
                                    }
                                }
                            }

                            // Connection closed without [DONE]; end the turn.
                            let _ = tx_clone.send((StreamMessage::End, stream_id));
                        }
                        Err(e) => {
                            let _ = tx_clone
                                .send((StreamMessage::Error(ChatError::from(e)), stream_id));
                            let _ = tx_clone.send((StreamMessage::End, stream_id));
                        }
                    }
                } => {}
                _ = cancel_token.cancelled() => {}
            }
        });
    }

    #[cfg(test)]
    pub fn send_for_test(&self, message: StreamMessage, stream_id: u64) {
        let _ = self.tx.send((message, stream_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_sse_line_handles_spacing_variants() {
        let (service, mut rx) = ChatStreamService::new();
        let variants = [
            (
                r#"data: {"choices":[{"delta":{"content":"Hello"}}]}"#,
                "Hello",
                "data: [DONE]",
            ),
            (
                r#"data:{"choices":[{"delta":{"content":"World"}}]}"#,
                "World",
                "data:[DONE]",
            ),
        ];

        for (index, (chunk_line, expected_chunk, done_line)) in variants.iter().enumerate() {
            let stream_id = (index + 1) as u64;

            assert!(!process_sse_line(chunk_line, &service.tx, stream_id));
            let (message, received_id) = rx.try_recv().expect("expected chunk message");
            assert_eq!(received_id, stream_id);
            match message {
                StreamMessage::Chunk(content) => assert_eq!(content, *expected_chunk),
                other => panic!("expected chunk message, got {:?}", other),
            }

            assert!(process_sse_line(done_line, &service.tx, stream_id));
            let (message, received_id) = rx.try_recv().expect("expected end message");
            assert_eq!(received_id, stream_id);
            assert!(matches!(message, StreamMessage::End));
        }

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn non_data_lines_and_keepalives_are_skipped() {
        let (service, mut rx) = ChatStreamService::new();

        assert!(!process_sse_line("", &service.tx, 1));
        assert!(!process_sse_line(": keep-alive", &service.tx, 1));
        assert!(!process_sse_line("data:", &service.tx, 1));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn mid_stream_error_objects_end_the_stream() {
        let (service, mut rx) = ChatStreamService::new();
        let error_line = r#"data: {"error":{"message":"internal server error"}}"#;

        assert!(process_sse_line(error_line, &service.tx, 7));

        let (message, received_id) = rx.try_recv().expect("expected error message");
        assert_eq!(received_id, 7);
        match message {
            StreamMessage::Error(ChatError::UnexpectedResponse { message }) => {
                assert_eq!(message, "internal server error");
            }
            other => panic!("expected unexpected-response error, got {:?}", other),
        }

        let (message, _) = rx.try_recv().expect("expected end message");
        assert!(matches!(message, StreamMessage::End));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn http_status_classification() {
        let body = r#"{"error":{"message":"invalid key"}}"#;
        assert!(matches!(
            classify_http_error(401, body),
            ChatError::Authentication { .. }
        ));
        assert!(matches!(
            classify_http_error(403, body),
            ChatError::Authentication { .. }
        ));
        assert!(classify_http_error(429, "{\"error\":\"slow down\"}").is_rate_limit());

        match classify_http_error(500, body) {
            ChatError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "invalid key");
            }
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[test]
    fn classification_survives_non_json_bodies() {
        match classify_http_error(502, "<html>Bad Gateway</html>") {
            ChatError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "<html>Bad Gateway</html>");
            }
            other => panic!("expected api error, got {:?}", other),
        }

        match classify_http_error(503, "") {
            ChatError::Api { message, .. } => assert_eq!(message, "no details provided"),
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[test]
    fn error_summary_shapes() {
        let nested: serde_json::Value =
            serde_json::from_str(r#"{"error":{"message":"  model   overloaded "}}"#).unwrap();
        assert_eq!(
            extract_error_summary(&nested).unwrap(),
            "model overloaded"
        );

        let flat: serde_json::Value = serde_json::from_str(r#"{"error":"quota hit"}"#).unwrap();
        assert_eq!(extract_error_summary(&flat).unwrap(), "quota hit");

        let message_only: serde_json::Value =
            serde_json::from_str(r#"{"message":"not found"}"#).unwrap();
        assert_eq!(extract_error_summary(&message_only).unwrap(), "not found");

        let unrelated: serde_json::Value = serde_json::from_str(r#"{"status":"bad"}"#).unwrap();
        assert!(extract_error_summary(&unrelated).is_none());
    }
}
