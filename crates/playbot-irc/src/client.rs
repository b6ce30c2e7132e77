//! Async IRC client.
//!
//! [`Client::connect`] performs the blocking part of the protocol --
//! TCP/TLS connect and registration (CAP/SASL negotiation, NICK/USER,
//! nick-collision fallback) -- and then hands back a clonable [`Client`]
//! handle plus an event stream. After that the connection runs itself:
//! a reader task answers PING and CTCP VERSION and forwards PRIVMSGs,
//! a writer task drains the outbound queue.
//!
//! Mid-run disconnects surface as [`Event::Disconnected`]; reconnecting is
//! the run loop's decision, not the client's.

use std::sync::{Arc, RwLock};

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;
use tracing::{debug, info, warn};

use playbot_types::BotConfig;

use crate::wire::{self, Message};

/// CTCP VERSION reply body.
const VERSION: &str = concat!("playbot ", env!("CARGO_PKG_VERSION"));

const OUTBOUND_QUEUE: usize = 64;
const EVENT_QUEUE: usize = 64;

/// Errors from connecting and registering.
#[derive(Debug, thiserror::Error)]
pub enum IrcError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid server address: {0}")]
    Address(String),

    #[error("SASL authentication failed: {0}")]
    Sasl(String),

    #[error("registration failed: {0}")]
    Registration(String),

    #[error("connection closed")]
    Closed,
}

/// Transport events delivered to the run loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Registration completed; channels can be joined.
    Ready,
    /// An inbound chat line.
    Privmsg {
        /// Nominal target: a channel, or the bot's own nick for a private
        /// message.
        target: String,
        /// Bare nickname of the sender.
        sender: String,
        text: String,
    },
    /// The server went away. The handle is dead; reconnect to continue.
    Disconnected,
}

/// Clonable handle to a live connection.
#[derive(Clone)]
pub struct Client {
    outbound: mpsc::Sender<String>,
    nick: Arc<RwLock<String>>,
}

impl Client {
    /// Connect, register, and start the connection tasks.
    pub async fn connect(config: &BotConfig) -> Result<(Client, mpsc::Receiver<Event>), IrcError> {
        let tcp = TcpStream::connect(&config.server).await?;
        let stream: Box<dyn Conn> = if config.use_tls {
            let host = config
                .server
                .rsplit_once(':')
                .map(|(host, _)| host)
                .unwrap_or(&config.server);
            let server_name = ServerName::try_from(host.to_string())
                .map_err(|_| IrcError::Address(config.server.clone()))?;
            let mut roots = RootCertStore::empty();
            roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
            let tls_config = ClientConfig::builder()
                .with_root_certificates(roots)
                .with_no_client_auth();
            let connector = TlsConnector::from(Arc::new(tls_config));
            Box::new(connector.connect(server_name, tcp).await?)
        } else {
            Box::new(tcp)
        };
        debug!(server = %config.server, tls = config.use_tls, "connected");

        let (read_half, mut write_half) = tokio::io::split(stream);
        let mut lines = BufReader::new(read_half).lines();

        let nick = register(&mut lines, &mut write_half, config).await?;
        info!(%nick, "registered with server");

        let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(OUTBOUND_QUEUE);
        let (event_tx, event_rx) = mpsc::channel::<Event>(EVENT_QUEUE);
        let client = Client {
            outbound: outbound_tx.clone(),
            nick: Arc::new(RwLock::new(nick)),
        };

        let _ = event_tx.send(Event::Ready).await;

        tokio::spawn(async move {
            while let Some(line) = outbound_rx.recv().await {
                if send_line(&mut write_half, &line).await.is_err() {
                    warn!("outbound write failed; stopping writer");
                    break;
                }
            }
        });

        let reader_client = client.clone();
        tokio::spawn(async move {
            reader_loop(lines, reader_client, event_tx).await;
        });

        Ok((client, event_rx))
    }

    /// Send one line of text to a channel or nick. The codec truncates to
    /// the wire budget.
    pub async fn privmsg(&self, target: &str, text: &str) -> Result<(), IrcError> {
        self.send_raw(wire::privmsg(target, text)).await
    }

    pub async fn join(&self, channel: &str) -> Result<(), IrcError> {
        self.send_raw(wire::join(channel)).await
    }

    /// The bot's current display nick. Tracks server-side renames.
    pub fn current_nick(&self) -> String {
        self.nick
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    async fn send_raw(&self, line: String) -> Result<(), IrcError> {
        self.outbound.send(line).await.map_err(|_| IrcError::Closed)
    }
}

trait Conn: AsyncRead + AsyncWrite + Send + Unpin {}
impl<T: AsyncRead + AsyncWrite + Send + Unpin> Conn for T {}

async fn send_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\r\n").await?;
    writer.flush().await
}

/// Drive registration to the 001 welcome.
///
/// SASL PLAIN is negotiated first when the config carries credentials;
/// 904/905 is fatal. A 433 nick collision retries with an underscore
/// appended. Returns the nick the server finally accepted.
async fn register<R, W>(
    lines: &mut Lines<R>,
    writer: &mut W,
    config: &BotConfig,
) -> Result<String, IrcError>
where
    R: tokio::io::AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if config.use_sasl() {
        send_line(writer, &wire::cap_req("sasl")).await?;
    }
    let mut nick = config.nick.clone();
    send_line(writer, &wire::nick(&nick)).await?;
    send_line(writer, &wire::user(&config.user, config.effective_real_name())).await?;

    while let Some(line) = lines.next_line().await? {
        let Some(msg) = Message::parse(&line) else {
            continue;
        };
        match msg.command.as_str() {
            "PING" => {
                let payload = msg.trailing.as_deref().unwrap_or_default();
                send_line(writer, &wire::pong(payload)).await?;
            }
            "CAP" => {
                if msg.params.iter().any(|p| p == "ACK") {
                    send_line(writer, &wire::authenticate("PLAIN")).await?;
                } else if msg.params.iter().any(|p| p == "NAK") {
                    return Err(IrcError::Sasl("server refused the sasl capability".into()));
                }
            }
            "AUTHENTICATE" => {
                let payload = wire::sasl_plain(&config.sasl_user, &config.sasl_password);
                send_line(writer, &wire::authenticate(&payload)).await?;
            }
            // 903: SASL success.
            "903" => send_line(writer, &wire::cap_end()).await?,
            "904" | "905" => {
                return Err(IrcError::Sasl(
                    msg.trailing.unwrap_or_else(|| "authentication failed".into()),
                ));
            }
            // 433: nick in use. Retry with a suffixed nick.
            "433" => {
                nick.push('_');
                debug!(%nick, "nick in use, retrying");
                send_line(writer, &wire::nick(&nick)).await?;
            }
            // 001: welcome, registration complete.
            "001" => return Ok(nick),
            "ERROR" => {
                return Err(IrcError::Registration(
                    msg.trailing.unwrap_or_else(|| "server sent ERROR".into()),
                ));
            }
            _ => {}
        }
    }
    Err(IrcError::Closed)
}

/// Read inbound lines until the connection drops.
///
/// Transport-level autonomy lives here: PING and CTCP VERSION are answered
/// without the bot's involvement, and self nick changes update the handle.
async fn reader_loop<R>(mut lines: Lines<R>, client: Client, events: mpsc::Sender<Event>)
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "read failed");
                break;
            }
        };
        let Some(msg) = Message::parse(&line) else {
            continue;
        };
        match msg.command.as_str() {
            "PING" => {
                let payload = msg.trailing.as_deref().unwrap_or_default();
                let _ = client.send_raw(wire::pong(payload)).await;
            }
            "PRIVMSG" => {
                let sender = msg
                    .prefix
                    .as_deref()
                    .map(wire::nick_of)
                    .unwrap_or_default()
                    .to_string();
                let target = msg.params.first().cloned().unwrap_or_default();
                let text = msg.trailing.unwrap_or_default();
                if wire::is_ctcp_version(&text) {
                    debug!(%sender, "answering CTCP VERSION");
                    let _ = client.send_raw(wire::ctcp_version_reply(&sender, VERSION)).await;
                    continue;
                }
                if events
                    .send(Event::Privmsg { target, sender, text })
                    .await
                    .is_err()
                {
                    break;
                }
            }
            "NICK" => {
                let was = msg.prefix.as_deref().map(wire::nick_of).unwrap_or_default();
                if was == client.current_nick() {
                    let new = msg
                        .trailing
                        .or_else(|| msg.params.first().cloned())
                        .unwrap_or_default();
                    if !new.is_empty() {
                        if let Ok(mut guard) = client.nick.write() {
                            info!(from = %was, to = %new, "server renamed us");
                            *guard = new;
                        }
                    }
                }
            }
            _ => {}
        }
    }
    let _ = events.send(Event::Disconnected).await;
}
