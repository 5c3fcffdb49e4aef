//! Scripted mock IRC server.
//!
//! Tests bind a listener, script the server side of the conversation
//! line by line, and assert on what the client sends.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, ensure, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

const IO_TIMEOUT: Duration = Duration::from_secs(5);

/// A listening mock server.
pub struct TestServer {
    listener: TcpListener,
    /// The bound address, for building the client config.
    pub addr: SocketAddr,
}

impl TestServer {
    /// Bind on an ephemeral local port.
    pub async fn bind() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        Ok(Self { listener, addr })
    }

    /// Accept the client's connection.
    pub async fn accept(&self) -> Result<ServerConn> {
        let (stream, _) = timeout(IO_TIMEOUT, self.listener.accept()).await??;
        Ok(ServerConn::new(stream))
    }
}

/// One accepted connection, line-oriented in both directions.
pub struct ServerConn {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl ServerConn {
    fn new(stream: TcpStream) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        }
    }

    /// Receive one line from the client, terminator stripped.
    pub async fn recv(&mut self) -> Result<String> {
        let mut line = String::new();
        let n = timeout(IO_TIMEOUT, self.reader.read_line(&mut line)).await??;
        if n == 0 {
            bail!("client closed the connection");
        }
        Ok(line.trim_end().to_string())
    }

    /// Receive one line and assert on how it starts.
    pub async fn expect(&mut self, prefix: &str) -> Result<String> {
        let line = self.recv().await?;
        ensure!(
            line.starts_with(prefix),
            "expected line starting with {prefix:?}, got {line:?}"
        );
        Ok(line)
    }

    /// Send a raw line to the client.
    pub async fn send_raw(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        if !line.ends_with("\r\n") {
            self.writer.write_all(b"\r\n").await?;
        }
        self.writer.flush().await?;
        Ok(())
    }

    /// Consume the registration handshake (NICK then USER).
    pub async fn expect_registration(&mut self, nick: &str) -> Result<()> {
        self.expect(&format!("NICK {}", nick)).await?;
        self.expect("USER ").await?;
        Ok(())
    }
}
