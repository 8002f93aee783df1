//! Console log access
//!
//! The server serves a build's console log only as a whole file at
//! `<build>/consoleText` — no byte ranges. One-shot fetches apply the tail
//! selection client-side; following probes the resource's length with HEAD
//! requests and refetches the entire body only when it grew, then diffs by
//! line content against the session's cursor.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use hoist_core::domain::console::{LogCursor, TailSpec};
use hoist_core::domain::reference::BuildReference;
use hoist_core::locator::normalize_url;

use crate::error::{Error, Result};
use crate::{ServerClient, ok_status};

/// Fixed wait between length probes while following
const FOLLOW_POLL_INTERVAL: Duration = Duration::from_secs(1);

fn console_url(build_url: &str) -> String {
    format!("{}/consoleText", normalize_url(build_url))
}

impl ServerClient {
    // =============================================================================
    // One-shot Fetch
    // =============================================================================

    /// Fetch a build's console text in one request
    ///
    /// `tail` keeps only a suffix: the last N lines, or the last fraction
    /// of all lines, clamped to what exists. `Ok(None)` when the build (or
    /// its console) does not exist.
    pub async fn fetch_console(
        &self,
        reference: &BuildReference,
        tail: Option<TailSpec>,
    ) -> Result<Option<String>> {
        let Some(build_url) = self.resolved_build_url(reference).await? else {
            return Ok(None);
        };
        let Some(text) = self.get_text_opt(&console_url(&build_url)).await? else {
            return Ok(None);
        };

        Ok(Some(match tail {
            Some(spec) => spec.apply(&text),
            None => text,
        }))
    }

    /// Stream a build's console to a file in `dir`
    ///
    /// The body is written chunk by chunk as it arrives rather than being
    /// buffered; the destination file is created (or overwritten) only once
    /// the first chunk is in hand. Returns the written path, or `Ok(None)`
    /// when the build is missing or its console is empty.
    pub async fn download_console(
        &self,
        reference: &BuildReference,
        dir: &Path,
    ) -> Result<Option<PathBuf>> {
        let Some(build_url) = self.resolved_build_url(reference).await? else {
            return Ok(None);
        };

        let response = self
            .authed(self.http.get(console_url(&build_url)))
            .send()
            .await?;
        if !ok_status(response.status()) {
            debug!(status = %response.status(), "console fetch returned non-success");
            return Ok(None);
        }

        let filename = format!("build-logs_{}.log", Utc::now().format("%m-%d-%Y_%I-%M-%S"));
        let path = dir.join(filename);

        let mut stream = response.bytes_stream();
        let mut file: Option<File> = None;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if chunk.is_empty() {
                continue;
            }
            if file.is_none() {
                file = Some(File::create(&path).await?);
            }
            if let Some(open) = file.as_mut() {
                open.write_all(&chunk).await?;
            }
        }

        match file {
            Some(mut open) => {
                open.flush().await?;
                debug!(path = %path.display(), "console written to file");
                Ok(Some(path))
            }
            None => {
                debug!("console body was empty, no file written");
                Ok(None)
            }
        }
    }

    // =============================================================================
    // Incremental Follow
    // =============================================================================

    /// Follow a build's console, emitting batches of new lines
    ///
    /// Each round: HEAD-probe the console's byte length; if it grew since
    /// the cursor's last value, fetch the whole body and send the lines not
    /// yet seen this session (in body order) as one batch on `batches`.
    /// Between rounds the loop sleeps [`FOLLOW_POLL_INTERVAL`], observing
    /// `cancel` before the next probe. Unchanged length never triggers a
    /// body fetch.
    ///
    /// The loop runs until cancelled, the batch receiver is dropped, or the
    /// server stops reporting a content length (a tail error). Build
    /// conclusion does NOT stop it — compose with a concurrent
    /// [`resolve`](Self::resolve) poll to stop at conclusion.
    ///
    /// Dedup is by line content, not position: a build printing the same
    /// line twice surfaces it once per session. Inherited from the diffing
    /// strategy and kept for compatibility.
    pub async fn follow_console(
        &self,
        reference: &BuildReference,
        batches: mpsc::Sender<Vec<String>>,
        cancel: CancellationToken,
    ) -> Result<()> {
        let Some(build_url) = self.resolved_build_url(reference).await? else {
            return Err(Error::Tail(
                "build not found; nothing to follow".to_string(),
            ));
        };
        let url = console_url(&build_url);

        let mut cursor = LogCursor::new();
        let mut fetches = 0u32;

        loop {
            if cancel.is_cancelled() {
                debug!("follow cancelled");
                return Ok(());
            }

            let length = self.head_content_length(&url).await?.ok_or_else(|| {
                Error::Tail("server did not report a console content length".to_string())
            })?;

            if cursor.advance(length) {
                let Some(body) = self.get_text_opt(&url).await? else {
                    return Err(Error::Tail("console vanished mid-follow".to_string()));
                };
                let fresh = cursor.take_new_lines(&body);
                fetches += 1;
                debug!(fetches, length, new_lines = fresh.len(), "console grew");

                if !fresh.is_empty() && batches.send(fresh).await.is_err() {
                    debug!("batch receiver dropped, stopping follow");
                    return Ok(());
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("follow cancelled");
                    return Ok(());
                }
                _ = tokio::time::sleep(FOLLOW_POLL_INTERVAL) => {}
            }
        }
    }
}
