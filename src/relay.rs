use async_stream::stream;
use futures_util::{Stream, StreamExt};
use tracing::debug;

use crate::models::{CompletionChunk, CompletionRequest};

// Text sent to the caller when the upstream stream breaks after output has
// already started flowing
pub const FALLBACK_MESSAGE: &str =
    "Sorry, there was an error processing your request. Please try again.";

// Open a streaming chat completion against the upstream provider. Failures
// while establishing the call (connect error, non-success status) come back
// as Err before a single byte reaches the caller; once the stream is open,
// each item is either one non-empty text fragment in upstream emission
// order, or the error that ended the stream. Dropping the returned stream
// drops the upstream response and releases its connection.
pub async fn open_chat_stream(
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    request: CompletionRequest,
) -> Result<impl Stream<Item = Result<String, String>>, String> {
    let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));

    let response = client
        .post(url)
        .bearer_auth(api_key)
        .json(&request)
        .send()
        .await
        .map_err(|e| format!("upstream request failed: {e}"))?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        return Err(format!("upstream returned {status}: {detail}"));
    }

    let mut body = response.bytes_stream();

    Ok(stream! {
        let mut buf = Vec::new();
        'read: while let Some(chunk) = body.next().await {
            match chunk {
                Ok(bytes) => {
                    buf.extend_from_slice(&bytes);
                    for event in drain_events(&mut buf) {
                        match event {
                            SseEvent::Fragment(text) => yield Ok(text),
                            SseEvent::Done => break 'read,
                        }
                    }
                }
                Err(e) => {
                    yield Err(format!("upstream stream failed: {e}"));
                    break;
                }
            }
        }
    })
}

enum SseEvent {
    Fragment(String),
    Done,
}

// Drain complete SSE lines out of `buf`, leaving any partial trailing line
// in place for the next read. The buffer holds raw bytes because network
// chunk boundaries can fall inside a multibyte UTF-8 character; only whole
// lines are decoded. Lines that are not data lines (comments, blank
// keep-alives) are skipped; unparseable data lines are logged and skipped
// rather than ending the stream.
fn drain_events(buf: &mut Vec<u8>) -> Vec<SseEvent> {
    let mut events = Vec::new();

    while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
        let line: Vec<u8> = buf.drain(..=pos).collect();
        let line = String::from_utf8_lossy(&line);
        let line = line.trim();

        let Some(data) = line.strip_prefix("data:") else {
            continue;
        };
        let data = data.trim();

        if data == "[DONE]" {
            events.push(SseEvent::Done);
            continue;
        }

        match serde_json::from_str::<CompletionChunk>(data) {
            Ok(chunk) => {
                let content = chunk
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.delta.content);
                if let Some(text) = content {
                    if !text.is_empty() {
                        events.push(SseEvent::Fragment(text));
                    }
                }
            }
            Err(e) => debug!("skipping unparseable stream chunk: {e}"),
        }
    }

    events
}
