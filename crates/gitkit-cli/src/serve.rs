//! Line-oriented JSON request loop
//!
//! Each stdin line is one request; each request gets exactly one response
//! line on stdout. Logs go to stderr so they never interleave with responses.
//! Lines longer than [`MAX_REQUEST_BYTES`] are skipped and answered with an
//! `invalid_request` error.
//!
//! ```text
//! {"id":1,"type":"set_working_directory","tenant_id":"acme","session_id":"s1","path":"/repo"}
//! {"id":2,"type":"execute","tenant_id":"acme","session_id":"s1","operation":"status"}
//! ```

use std::time::Duration;

use gitkit_engine::{
    CliGitProvider, ErrorCategory, ErrorRecord, ExecutionContext, GitProvider, RequestContext,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::Result;

/// Largest request line accepted, excluding the newline.
pub const MAX_REQUEST_BYTES: usize = 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct Request {
    /// Echoed back unchanged
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub trace_id: Option<String>,
    #[serde(flatten)]
    pub command: RequestCommand,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestCommand {
    Execute {
        operation: String,
        #[serde(default)]
        options: Value,
        /// Overrides the session's stored directory for this call
        #[serde(default)]
        working_directory: Option<String>,
    },
    SetWorkingDirectory {
        path: String,
        #[serde(default)]
        ttl_secs: Option<u64>,
    },
    GetWorkingDirectory,
    DeleteWorkingDirectory,
    ListSessions {
        #[serde(default)]
        prefix: String,
    },
    Capabilities,
}

#[derive(Debug, Serialize)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorRecord>,
}

impl Response {
    fn from_outcome(id: Option<Value>, outcome: std::result::Result<Value, ErrorRecord>) -> Self {
        match outcome {
            Ok(result) => Self {
                id,
                ok: true,
                result: Some(result),
                error: None,
            },
            Err(error) => Self {
                id,
                ok: false,
                result: None,
                error: Some(error),
            },
        }
    }
}

fn invalid_request(message: String) -> ErrorRecord {
    ErrorRecord {
        category: ErrorCategory::Validation,
        code: "invalid_request".to_string(),
        message,
        cause: None,
    }
}

fn to_value<T: Serialize>(value: &T) -> std::result::Result<Value, ErrorRecord> {
    serde_json::to_value(value).map_err(|e| ErrorRecord {
        category: ErrorCategory::Internal,
        code: "serialization".to_string(),
        message: e.to_string(),
        cause: None,
    })
}

/// Answer a single request line.
pub async fn handle_line(provider: &CliGitProvider, line: &str) -> Response {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => handle(provider, request).await,
        Err(e) => Response::from_outcome(None, Err(invalid_request(e.to_string()))),
    }
}

pub async fn handle(provider: &CliGitProvider, request: Request) -> Response {
    let ctx = RequestContext::from_parts(
        request.tenant_id.as_deref(),
        request.session_id.as_deref(),
        request.trace_id.as_deref(),
    );
    let tenant = ctx.tenant_id.clone();
    let session = ctx.session_id.clone().unwrap_or_default();
    let store = provider.store();

    let outcome = match request.command {
        RequestCommand::Execute {
            operation,
            options,
            working_directory,
        } => {
            let mut exec = ExecutionContext::new(ctx);
            if let Some(path) = working_directory {
                exec = exec.with_working_directory(path);
            }
            match provider.execute_named(&operation, options, &exec).await {
                Ok(output) => to_value(&output),
                Err(e) => Err(e.to_record()),
            }
        }
        RequestCommand::SetWorkingDirectory { path, ttl_secs } => store
            .set(&tenant, &session, &path, ttl_secs.map(Duration::from_secs), &ctx)
            .map(|()| json!({ "path": path }))
            .map_err(|e| gitkit_engine::Error::from(e).to_record()),
        RequestCommand::GetWorkingDirectory => {
            Ok(json!({ "path": store.get(&tenant, &session, &ctx) }))
        }
        RequestCommand::DeleteWorkingDirectory => {
            Ok(json!({ "deleted": store.delete(&tenant, &session, &ctx) }))
        }
        RequestCommand::ListSessions { prefix } => {
            Ok(json!({ "sessions": store.list(&tenant, &prefix, &ctx) }))
        }
        RequestCommand::Capabilities => to_value(&provider.capabilities()),
    };

    Response::from_outcome(request.id, outcome)
}

/// Serve requests until `reader` reaches end of input.
pub async fn serve<R, W>(provider: &CliGitProvider, reader: R, writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    serve_with_limit(provider, reader, writer, MAX_REQUEST_BYTES).await
}

pub async fn serve_with_limit<R, W>(
    provider: &CliGitProvider,
    mut reader: R,
    mut writer: W,
    max_line_bytes: usize,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    let mut served = 0usize;

    loop {
        buf.clear();
        let read = (&mut reader)
            .take(max_line_bytes as u64 + 1)
            .read_until(b'\n', &mut buf)
            .await?;
        if read == 0 {
            break;
        }

        let response = if buf.last() != Some(&b'\n') && buf.len() > max_line_bytes {
            skip_line(&mut reader).await?;
            tracing::warn!(limit_bytes = max_line_bytes, "Skipped oversized request line");
            Response::from_outcome(
                None,
                Err(invalid_request(format!(
                    "request line exceeds {max_line_bytes} bytes"
                ))),
            )
        } else {
            match std::str::from_utf8(&buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => handle_line(provider, line.trim_end()).await,
                Err(e) => Response::from_outcome(None, Err(invalid_request(e.to_string()))),
            }
        };

        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        writer.write_all(&encoded).await?;
        writer.flush().await?;
        served += 1;
    }

    tracing::debug!(requests = served, "Input closed, stopping");
    Ok(())
}

/// Consume input up to and including the next newline.
async fn skip_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<()> {
    let mut scratch = Vec::new();
    loop {
        scratch.clear();
        let read = (&mut *reader).take(8192).read_until(b'\n', &mut scratch).await?;
        if read == 0 || scratch.last() == Some(&b'\n') {
            return Ok(());
        }
    }
}
