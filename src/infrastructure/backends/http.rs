#[cfg(test)]
#[path = "http_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;
use tokio_util::io::StreamReader;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::BackendPrompt;
use crate::domain::models::BackendResponse;
use crate::domain::models::Event;
use crate::domain::services::html_to_markdown;

fn convert_err(err: reqwest::Error) -> std::io::Error {
    let err_msg = err.to_string();
    return std::io::Error::new(std::io::ErrorKind::Interrupted, err_msg);
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ContextPayload {
    filename: String,
    content: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct MessageRequest {
    user_id: String,
    text: String,
    query_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<ContextPayload>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct MessageResponse {
    response: String,
    #[serde(default)]
    query_type: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StreamChunk {
    response: String,
    #[serde(default)]
    done: bool,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StatusResponse {
    status: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ErrorResponse {
    detail: String,
}

/// The chat service REST API. Replies come back either as one JSON document,
/// where the text may be rendered HTML, or as newline delimited JSON chunks.
pub struct Http {
    url: String,
    user_id: String,
    timeout: u64,
}

impl Default for Http {
    fn default() -> Http {
        return Http {
            url: Config::get(ConfigKey::BackendURL),
            user_id: Config::get(ConfigKey::UserID),
            timeout: Config::get_millis(ConfigKey::BackendHealthCheckTimeout),
        };
    }
}

/// Streamed chunks go out as they arrive. Once the stream completes, a reply
/// that turned out to be HTML is sent again as markdown, replacing what was
/// streamed.
fn finish_stream(
    id: u64,
    streamed: &str,
    last_chunk: &str,
    tx: &mpsc::UnboundedSender<Event>,
) -> Result<()> {
    let converted = html_to_markdown(streamed);
    if converted != streamed {
        tracing::debug!(id, "Streamed reply was HTML, converting to markdown");
        tx.send(Event::BackendPromptResponse(BackendResponse::replacement(
            id, &converted,
        )))?;
        return Ok(());
    }

    tx.send(Event::BackendPromptResponse(BackendResponse::last(
        id, last_chunk,
    )))?;
    return Ok(());
}

impl Http {
    async fn stream_lines(
        &self,
        id: u64,
        res: reqwest::Response,
        tx: &mpsc::UnboundedSender<Event>,
    ) -> Result<()> {
        let stream = res.bytes_stream().map_err(convert_err);
        let mut lines_reader = StreamReader::new(stream).lines();
        let mut streamed = String::new();

        while let Some(line) = lines_reader.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let chunk: StreamChunk = serde_json::from_str(&line)?;
            tracing::debug!(body = ?chunk, "Completion chunk");
            streamed += &chunk.response;

            if chunk.done {
                return finish_stream(id, &streamed, &chunk.response, tx);
            }

            tx.send(Event::BackendPromptResponse(BackendResponse::chunk(
                id,
                &chunk.response,
            )))?;
        }

        // Streams that end without a done marker still complete the reply.
        return finish_stream(id, &streamed, "", tx);
    }
}

#[async_trait]
impl Backend for Http {
    fn name(&self) -> BackendName {
        return BackendName::Http;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        let res = reqwest::Client::new()
            .get(format!("{url}/api/status", url = self.url))
            .timeout(Duration::from_millis(self.timeout))
            .send()
            .await;

        let res = match res {
            Ok(res) => res,
            Err(err) => {
                tracing::error!(error = ?err, "Chat service is not running");
                bail!("Chat service is not running");
            }
        };

        if res.status() != 200 {
            tracing::error!(status = res.status().as_u16(), "Chat service health check failed");
            bail!("Chat service health check failed");
        }

        let status = res.json::<StatusResponse>().await?;
        if status.status != "running" {
            tracing::error!(status = %status.status, "Chat service is not ready");
            bail!(format!("Chat service reported status {}", status.status));
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn get_completion<'a>(
        &self,
        prompt: BackendPrompt,
        tx: &'a mpsc::UnboundedSender<Event>,
    ) -> Result<()> {
        let id = prompt.id;
        let req = MessageRequest {
            user_id: self.user_id.to_string(),
            text: prompt.text,
            query_type: prompt.query_type.to_string(),
            context: prompt.context.map(|e| {
                return ContextPayload {
                    filename: e.name,
                    content: e.content,
                };
            }),
        };

        let res = reqwest::Client::new()
            .post(format!("{url}/api/chat/message", url = self.url))
            .json(&req)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            tracing::error!(status, body = %body, "Failed to make completion request to chat service");

            if let Ok(err) = serde_json::from_str::<ErrorResponse>(&body) {
                bail!(err.detail);
            }
            bail!(format!("Chat service responded with status {status}"));
        }

        let is_stream = res
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|e| return e.to_str().ok())
            .map(|e| return e.contains("ndjson"))
            .unwrap_or(false);

        if is_stream {
            return self.stream_lines(id, res, tx).await;
        }

        let body = res.json::<MessageResponse>().await?;
        tracing::debug!(body = ?body, "Completion response");
        tx.send(Event::BackendPromptResponse(BackendResponse::last(
            id,
            &html_to_markdown(&body.response),
        )))?;

        return Ok(());
    }
}
