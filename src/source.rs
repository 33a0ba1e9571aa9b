//! Line source: the producer half of the pipeline.
//!
//! A source owns its input handle for as long as it runs and pushes lines, in
//! order, into the queue. Dropping the `Sender` when the source returns is what
//! closes the queue, so every exit path (EOF, open failure, read failure, the
//! consumer going away) ends the stream exactly once.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::Sender;
use tracing::{debug, error, trace};

/// Generic trait for line producers.
///
/// Implementors send every line to `tx` and return once the input is exhausted
/// or the receiver is gone.
#[async_trait::async_trait]
pub trait LogSource {
    async fn stream(self, tx: Sender<String>) -> Result<u64>;
}

/// Reads a file once from start to end.
pub struct FileSource {
    pub path: PathBuf,
}

#[async_trait::async_trait]
impl LogSource for FileSource {
    async fn stream(self, tx: Sender<String>) -> Result<u64> {
        let file = File::open(&self.path)
            .await
            .with_context(|| format!("open {}", self.path.display()))?;
        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();
        let mut sent = 0u64;
        loop {
            buf.clear();
            let n = reader
                .read_until(b'\n', &mut buf)
                .await
                .with_context(|| format!("read {}", self.path.display()))?;
            if n == 0 {
                break; // EOF
            }
            if buf.ends_with(b"\n") {
                buf.pop();
            }
            if buf.ends_with(b"\r") {
                buf.pop();
            }
            let line = String::from_utf8_lossy(&buf).into_owned();
            trace!(line = sent + 1, "read");
            if tx.send(line).await.is_err() {
                debug!("receiver gone, stopping read");
                break;
            }
            sent += 1;
        }
        Ok(sent)
    }
}

/// Runs a file source to completion, reporting any failure locally.
///
/// Consumes `tx`; the queue is closed when this returns.
pub async fn run(path: PathBuf, tx: Sender<String>) {
    let shown = path.display().to_string();
    match (FileSource { path }).stream(tx).await {
        Ok(sent) => debug!(input = %shown, lines = sent, "input exhausted"),
        Err(e) => error!(input = %shown, error = %format!("{e:#}"), "reading log file failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::sync::mpsc;

    async fn collect(path: PathBuf) -> Vec<String> {
        let (tx, mut rx) = mpsc::channel(1);
        let producer = tokio::spawn(run(path, tx));
        let mut lines = Vec::new();
        while let Some(line) = rx.recv().await {
            lines.push(line);
        }
        producer.await.unwrap();
        lines
    }

    fn write_log(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn reads_lines_in_order() {
        let file = write_log(
            b"08 Oct 2021 10:40:36.508 # Server initialized\n08 Oct 2021 10:40:36.513 # Ready to accept connections\n",
        );
        let lines = collect(file.path().to_path_buf()).await;
        assert_eq!(
            lines,
            vec![
                "08 Oct 2021 10:40:36.508 # Server initialized",
                "08 Oct 2021 10:40:36.513 # Ready to accept connections",
            ]
        );
    }

    #[tokio::test]
    async fn keeps_last_line_without_terminator() {
        let file = write_log(b"first\n\nthird");
        let lines = collect(file.path().to_path_buf()).await;
        assert_eq!(lines, vec!["first", "", "third"]);
    }

    #[tokio::test]
    async fn strips_crlf() {
        let file = write_log(b"a\r\nb\r\n");
        let lines = collect(file.path().to_path_buf()).await;
        assert_eq!(lines, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn empty_file_closes_queue_immediately() {
        let file = write_log(b"");
        assert!(collect(file.path().to_path_buf()).await.is_empty());
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced_not_fatal() {
        let file = write_log(b"ok\nbad \xff byte\nafter\n");
        let lines = collect(file.path().to_path_buf()).await;
        assert_eq!(lines, vec!["ok", "bad \u{fffd} byte", "after"]);
    }

    #[tokio::test]
    async fn open_failure_still_closes_queue() {
        let dir = tempfile::tempdir().unwrap();
        let lines = collect(dir.path().join("gone.log")).await;
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn open_failure_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, _rx) = mpsc::channel(1);
        let source = FileSource {
            path: dir.path().join("gone.log"),
        };
        let err = source.stream(tx).await.unwrap_err();
        assert!(format!("{err:#}").contains("gone.log"));
    }

    #[tokio::test]
    async fn stops_when_receiver_dropped() {
        let file = write_log(b"1\n2\n3\n4\n");
        let (tx, mut rx) = mpsc::channel(1);
        let source = FileSource {
            path: file.path().to_path_buf(),
        };
        let handle = tokio::spawn(source.stream(tx));
        assert_eq!(rx.recv().await.as_deref(), Some("1"));
        drop(rx);
        let sent = handle.await.unwrap().unwrap();
        assert!(sent < 4);
    }
}
