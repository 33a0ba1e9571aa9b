//! Formatting sink: the consumer half of the pipeline.
//!
//! Format and destination are independent: a `FormattingSink` pairs any
//! `AsyncWrite` with an `OutputFormat`, and `Destination` decides which writer
//! that is for a run.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs::File;
use tokio::io::{self, AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::mpsc::Receiver;
use tokio::sync::oneshot;
use tracing::{debug, error};

use crate::format::{Encoder, OutputFormat};

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Where formatted output goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Console,
    File(PathBuf),
}

impl Destination {
    /// Console unless an output path was configured.
    pub fn select(output: Option<&Path>) -> Self {
        match output {
            Some(path) => Destination::File(path.to_path_buf()),
            None => Destination::Console,
        }
    }

    async fn open(&self) -> Result<BoxedWriter> {
        match self {
            Destination::Console => Ok(Box::new(BufWriter::new(io::stdout()))),
            Destination::File(path) => {
                let file = File::create(path)
                    .await
                    .with_context(|| format!("create {}", path.display()))?;
                Ok(Box::new(BufWriter::new(file)))
            }
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Console => f.write_str("stdout"),
            Destination::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Value carried by the completion signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    /// Lines fully handed to the writer
    pub lines: u64,
    pub ok: bool,
}

/// Serializes queued lines onto a writer.
pub struct FormattingSink<W> {
    writer: W,
    encoder: Encoder,
    chunk: String,
}

impl<W: AsyncWrite + Unpin> FormattingSink<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            writer,
            encoder: format.encoder(),
            chunk: String::new(),
        }
    }

    /// Drains `rx` until it is closed, then finishes the format and shuts the
    /// writer down. On error `rx` is dropped, which stops the producer.
    pub async fn drain(&mut self, mut rx: Receiver<String>) -> Result<()> {
        self.encoder.open(&mut self.chunk);
        self.flush_chunk().await?;
        while let Some(line) = rx.recv().await {
            self.encoder.push(&line, &mut self.chunk)?;
            self.flush_chunk().await?;
        }
        self.encoder.close(&mut self.chunk);
        self.flush_chunk().await?;
        self.writer.flush().await.context("flush output")?;
        self.writer.shutdown().await.context("close output")?;
        Ok(())
    }

    pub fn lines(&self) -> u64 {
        self.encoder.count()
    }

    async fn flush_chunk(&mut self) -> Result<()> {
        if !self.chunk.is_empty() {
            self.writer
                .write_all(self.chunk.as_bytes())
                .await
                .context("write output")?;
            self.chunk.clear();
        }
        Ok(())
    }
}

/// Runs the sink for one destination and fires `done` exactly once, after the
/// destination handle has been released.
pub async fn run(
    destination: Destination,
    format: OutputFormat,
    rx: Receiver<String>,
    done: oneshot::Sender<Completion>,
) {
    let completion = match destination.open().await {
        Ok(writer) => {
            let mut sink = FormattingSink::new(writer, format);
            let result = sink.drain(rx).await;
            let lines = sink.lines();
            drop(sink);
            match result {
                Ok(()) => {
                    debug!(destination = %destination, format = %format, lines, "output complete");
                    Completion { lines, ok: true }
                }
                Err(e) => {
                    error!(destination = %destination, lines, error = %format!("{e:#}"), "writing output failed");
                    Completion { lines, ok: false }
                }
            }
        }
        Err(e) => {
            drop(rx);
            error!(destination = %destination, error = %format!("{e:#}"), "opening output failed");
            Completion { lines: 0, ok: false }
        }
    };
    if done.send(completion).is_err() {
        debug!("coordinator stopped waiting for completion");
    }
}
