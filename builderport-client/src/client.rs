use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::proto::{self, Reply, ZoneEntry};
use futures::future::BoxFuture;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

/// Where the session stands. One client is one TCP session, one
/// outstanding command at a time; responses correlate positionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, greeting not yet consumed by `hello`
    Connected,
    /// Authenticated, no open transaction
    Idle,
    /// Inside a `tx_begin` scope
    InTx,
    /// Terminal; every further command fails
    Closed,
}

pub struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    state: SessionState,
    read_timeout: Duration,
    /// Survives a cancelled read so a mid-line timeout is detectable.
    line_buf: Vec<u8>,
}

impl Client {
    pub async fn connect(cfg: &ClientConfig) -> ClientResult<Self> {
        let stream = TcpStream::connect(cfg.addr.as_str()).await?;
        tracing::debug!(addr = %cfg.addr, "connected to builderport");
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            state: SessionState::Connected,
            read_timeout: cfg.read_timeout(),
            line_buf: Vec::new(),
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Authenticate. Must be the first command on the session. The
    /// server's greeting (blank line plus banner) is consumed here:
    /// everything up to the first well-formed `OK`/`ERROR` is noise.
    pub async fn hello(&mut self, token: &str) -> ClientResult<()> {
        if self.state != SessionState::Connected {
            return Err(ClientError::protocol("hello on an authenticated session"));
        }
        self.send_line(&format!("hello {token} 1")).await?;
        loop {
            let line = self.read_line().await?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with("OK") {
                self.state = SessionState::Idle;
                tracing::debug!("authenticated");
                return Ok(());
            }
            if trimmed.starts_with("ERROR") {
                match proto::parse_reply(trimmed)? {
                    Reply::Err(failure) => return Err(ClientError::Server(failure)),
                    _ => unreachable!(),
                }
            }
            tracing::trace!(line = trimmed, "greeting");
        }
    }

    /// Issue a single-line command expecting `OK [payload]` or `ERROR`.
    pub async fn command(&mut self, line: &str) -> ClientResult<Option<String>> {
        self.ensure_authenticated()?;
        self.send_line(line).await?;
        match self.read_reply().await? {
            Reply::Ok(payload) => Ok(payload),
            Reply::Err(failure) => Err(ClientError::Server(failure)),
            other => {
                self.state = SessionState::Closed;
                Err(ClientError::protocol(format!(
                    "expected OK or ERROR, got {other:?}"
                )))
            }
        }
    }

    /// Issue a command expecting zero or more `DATA` rows then `END`.
    /// A streamed result may also fail late with `ERROR`.
    pub async fn stream(&mut self, line: &str) -> ClientResult<Vec<String>> {
        self.ensure_authenticated()?;
        self.send_line(line).await?;
        let mut rows = Vec::new();
        loop {
            match self.read_reply().await? {
                Reply::Data(payload) => rows.push(payload),
                Reply::End => return Ok(rows),
                Reply::Err(failure) => return Err(ClientError::Server(failure)),
                other => {
                    self.state = SessionState::Closed;
                    return Err(ClientError::protocol(format!(
                        "expected DATA or END, got {other:?}"
                    )));
                }
            }
        }
    }

    pub async fn list_zones(&mut self) -> ClientResult<Vec<ZoneEntry>> {
        let rows = self.stream("wld_list").await?;
        rows.iter().map(|p| proto::parse_zone_entry(p)).collect()
    }

    pub async fn dump_room(&mut self, vnum: u32) -> ClientResult<Vec<String>> {
        self.stream(&format!("wld_dump {vnum}")).await
    }

    /// Open a transaction over a scope (only `ZONES` is known).
    /// Nesting is refused locally; the server would reject it anyway.
    pub async fn tx_begin(&mut self, scope: &str, id: u32) -> ClientResult<()> {
        if self.state == SessionState::InTx {
            return Err(ClientError::protocol("transaction already open"));
        }
        self.command(&format!("tx_begin {scope} {id}")).await?;
        self.state = SessionState::InTx;
        Ok(())
    }

    pub async fn tx_commit(&mut self) -> ClientResult<()> {
        if self.state != SessionState::InTx {
            return Err(ClientError::protocol("tx_commit with no open transaction"));
        }
        // On a server-side ERROR the transaction is still open; the
        // caller decides whether to retry or abort.
        self.command("tx_commit").await?;
        self.state = SessionState::Idle;
        Ok(())
    }

    /// Abort the open transaction. Idempotent: allowed (and a no-op
    /// server-side) when nothing is open.
    pub async fn tx_abort(&mut self) -> ClientResult<()> {
        self.command("tx_abort").await?;
        if self.state == SessionState::InTx {
            self.state = SessionState::Idle;
        }
        Ok(())
    }

    /// Run `f` inside a transaction scope. The transaction is closed
    /// by exactly one of `tx_commit` or `tx_abort`: commit on success,
    /// best-effort abort on any other exit path (including a commit
    /// the server refuses), returning the original error.
    pub async fn with_tx<T>(
        &mut self,
        scope: &str,
        id: u32,
        f: impl for<'c> FnOnce(&'c mut Client) -> BoxFuture<'c, ClientResult<T>>,
    ) -> ClientResult<T> {
        self.tx_begin(scope, id).await?;
        let result = match f(self).await {
            Ok(value) => match self.tx_commit().await {
                Ok(()) => return Ok(value),
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };
        if self.state == SessionState::InTx {
            if let Err(abort_err) = self.tx_abort().await {
                tracing::warn!(error = %abort_err, "tx_abort after failed scope");
            }
        }
        result
    }

    /// Say goodbye and drop the connection. Best effort; the server
    /// closes its side on `quit`.
    pub async fn quit(mut self) -> ClientResult<()> {
        if self.state != SessionState::Closed {
            let _ = self.send_line("quit").await;
        }
        Ok(())
    }

    fn ensure_authenticated(&self) -> ClientResult<()> {
        match self.state {
            SessionState::Idle | SessionState::InTx => Ok(()),
            SessionState::Connected => Err(ClientError::protocol("command before hello")),
            SessionState::Closed => Err(ClientError::Closed),
        }
    }

    async fn send_line(&mut self, line: &str) -> ClientResult<()> {
        if self.state == SessionState::Closed {
            return Err(ClientError::Closed);
        }
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Read one line, bounded by the configured timeout. A timeout
    /// with an empty buffer is retryable; a mid-line timeout poisons
    /// the session, since a partial line means the framing is gone.
    async fn read_line(&mut self) -> ClientResult<String> {
        let read = tokio::time::timeout(
            self.read_timeout,
            self.reader.read_until(b'\n', &mut self.line_buf),
        )
        .await;
        match read {
            Ok(Ok(0)) if self.line_buf.is_empty() => {
                self.state = SessionState::Closed;
                Err(ClientError::Closed)
            }
            Ok(Ok(_)) => {
                let line = String::from_utf8_lossy(&self.line_buf).into_owned();
                self.line_buf.clear();
                Ok(line)
            }
            Ok(Err(e)) => {
                self.state = SessionState::Closed;
                Err(e.into())
            }
            Err(_elapsed) => {
                if self.line_buf.is_empty() {
                    Err(ClientError::Timeout)
                } else {
                    self.state = SessionState::Closed;
                    Err(ClientError::protocol("read timed out mid-line"))
                }
            }
        }
    }

    /// Read the next meaningful reply, skipping blank keep-alives.
    async fn read_reply(&mut self) -> ClientResult<Reply> {
        loop {
            let line = self.read_line().await?;
            match proto::parse_reply(&line) {
                Ok(Reply::Blank) => continue,
                Ok(reply) => return Ok(reply),
                Err(e) => {
                    self.state = SessionState::Closed;
                    return Err(e);
                }
            }
        }
    }
}
