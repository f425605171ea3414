use crate::settings::{Settings, SettingsError};
use radius_wire::dictionary::{default_dictionary, Dictionary};
use radius_wire::packet::{Code, Packet, PacketError};
use radius_wire::request::{
    AccessRequest, AccountingRequest, DynAuthRequest, RequestError,
};
use radius_wire::message_auth;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ClientError {
    /// Every send attempt timed out. The only error the transport retries
    /// its way into.
    #[error("no reply from {server} after {attempts} attempts")]
    Timeout { server: String, attempts: u32 },

    #[error("socket error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Packet(#[from] PacketError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("unexpected response code {0:?}")]
    UnexpectedResponse(Code),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Error-Cause (101), RFC 5176 Section 3.5: attached to CoA/Disconnect
/// NAKs to say why the server refused.
const ERROR_CAUSE_TYPE: u8 = 101;

/// The two verified outcomes of an authentication exchange. Anything other
/// than Accept or Reject surfaces as an error.
#[derive(Debug)]
pub enum AccessOutcome {
    Accept(Packet),
    Reject(Packet),
}

impl AccessOutcome {
    pub fn is_accept(&self) -> bool {
        matches!(self, AccessOutcome::Accept(_))
    }

    pub fn packet(&self) -> &Packet {
        match self {
            AccessOutcome::Accept(p) | AccessOutcome::Reject(p) => p,
        }
    }

    /// First Reply-Message the server attached, if any.
    pub fn reply_message(&self) -> Option<&str> {
        self.packet()
            .find_attribute(radius_wire::StandardAttribute::ReplyMessage as u8)
            .and_then(radius_wire::Attribute::as_string)
    }
}

/// The verified outcomes of a CoA- or Disconnect-Request: the server
/// either acknowledges or refuses.
#[derive(Debug)]
pub enum DynAuthOutcome {
    Ack(Packet),
    Nak(Packet),
}

impl DynAuthOutcome {
    pub fn is_ack(&self) -> bool {
        matches!(self, DynAuthOutcome::Ack(_))
    }

    pub fn packet(&self) -> &Packet {
        match self {
            DynAuthOutcome::Ack(p) | DynAuthOutcome::Nak(p) => p,
        }
    }

    /// Error-Cause the server attached, usually on a NAK.
    pub fn error_cause(&self) -> Option<u32> {
        self.packet()
            .find_attribute(ERROR_CAUSE_TYPE)
            .and_then(radius_wire::Attribute::as_integer)
    }
}

/// Blocking RADIUS client.
///
/// One exchange acquires an ephemeral socket, sends the encoded request,
/// and waits for a verified reply, re-sending the identical bytes on
/// timeout. Framing and authenticator failures abort the exchange; a
/// forged reply does not become valid by retrying.
#[derive(Debug, Clone)]
pub struct Client {
    settings: Settings,
    dict: Arc<Dictionary>,
}

impl Client {
    /// A client with default ports, timeout and retry count, using the
    /// bundled dictionary.
    pub fn new(host: impl Into<String>, secret: impl Into<String>) -> Self {
        Client {
            settings: Settings::new(host, secret),
            dict: Arc::new(default_dictionary().clone()),
        }
    }

    pub fn from_settings(settings: Settings) -> Result<Self, ClientError> {
        settings.validate()?;
        Ok(Client {
            settings,
            dict: Arc::new(default_dictionary().clone()),
        })
    }

    /// Replace the dictionary, e.g. one loaded from vendor dictionary
    /// files.
    pub fn with_dictionary(mut self, dict: Arc<Dictionary>) -> Self {
        self.dict = dict;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    fn secret(&self) -> &[u8] {
        self.settings.secret.as_bytes()
    }

    /// PAP authentication: build the Access-Request, send it to the auth
    /// port and classify the verified reply.
    pub fn authenticate(
        &self,
        user_name: &str,
        password: &str,
    ) -> Result<AccessOutcome, ClientError> {
        let mut request = AccessRequest::new(user_name);
        request.set_password(password);
        self.send_access(&mut request)
    }

    /// Send a caller-built Access-Request (any auth protocol, extra
    /// attributes already attached).
    pub fn send_access(&self, request: &mut AccessRequest) -> Result<AccessOutcome, ClientError> {
        let bytes = request.encode(self.secret())?;
        let reply = self.exchange(self.settings.auth_port, request.packet(), &bytes)?;
        match reply.code {
            Code::AccessAccept => Ok(AccessOutcome::Accept(reply)),
            Code::AccessReject => Ok(AccessOutcome::Reject(reply)),
            code => Err(ClientError::UnexpectedResponse(code)),
        }
    }

    /// Send an Accounting-Request to the accounting port; only a verified
    /// Accounting-Response is a success.
    pub fn send_accounting(
        &self,
        request: &mut AccountingRequest,
    ) -> Result<Packet, ClientError> {
        let bytes = request.encode(self.secret())?;
        let reply = self.exchange(self.settings.acct_port, request.packet(), &bytes)?;
        match reply.code {
            Code::AccountingResponse => Ok(reply),
            code => Err(ClientError::UnexpectedResponse(code)),
        }
    }

    /// Send a CoA- or Disconnect-Request to `port` (conventionally 3799).
    /// Both ACK and NAK are verified outcomes; a refusal carries its
    /// [`DynAuthOutcome::error_cause`].
    pub fn send_dynauth(
        &self,
        request: &mut DynAuthRequest,
        port: u16,
    ) -> Result<DynAuthOutcome, ClientError> {
        let bytes = request.encode(self.secret())?;
        let reply = self.exchange(port, request.packet(), &bytes)?;
        match reply.code {
            Code::DisconnectAck | Code::CoaAck => Ok(DynAuthOutcome::Ack(reply)),
            Code::DisconnectNak | Code::CoaNak => Ok(DynAuthOutcome::Nak(reply)),
            code => Err(ClientError::UnexpectedResponse(code)),
        }
    }

    fn resolve(&self, port: u16) -> Result<SocketAddr, ClientError> {
        if port == 0 {
            return Err(SettingsError::Invalid("ports must be 1..=65535".into()).into());
        }
        (self.settings.host.as_str(), port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                ClientError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} does not resolve", self.settings.host),
                ))
            })
    }

    /// One request/response exchange. The socket lives exactly as long as
    /// the exchange, released on every exit path.
    fn exchange(
        &self,
        port: u16,
        request: &Packet,
        request_bytes: &[u8],
    ) -> Result<Packet, ClientError> {
        self.settings.validate()?;
        let server = self.resolve(port)?;

        let bind_addr: SocketAddr = if server.is_ipv4() {
            "0.0.0.0:0".parse().expect("literal address")
        } else {
            "[::]:0".parse().expect("literal address")
        };
        let socket = UdpSocket::bind(bind_addr)?;
        socket.connect(server)?;
        socket.set_read_timeout(Some(self.settings.timeout()))?;

        let mut buf = vec![0u8; Packet::MAX_LEN];
        for attempt in 1..=self.settings.retry_count {
            socket.send(request_bytes)?;
            debug!(
                %server,
                identifier = request.identifier,
                attempt,
                len = request_bytes.len(),
                "sent request"
            );

            match socket.recv(&mut buf) {
                Ok(len) => {
                    debug!(%server, len, "received reply");
                    let reply =
                        Packet::decode_response(&buf[..len], &self.dict, request, self.secret())?;
                    if let Some(false) = message_auth::verify_reply(
                        &buf[..len],
                        &request.authenticator.unwrap_or_default(),
                        self.secret(),
                    ) {
                        return Err(PacketError::BadMessageAuthenticator.into());
                    }
                    return Ok(reply);
                }
                Err(e)
                    if e.kind() == io::ErrorKind::WouldBlock
                        || e.kind() == io::ErrorKind::TimedOut =>
                {
                    warn!(%server, attempt, "receive timed out");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ClientError::Timeout {
            server: server.to_string(),
            attempts: self.settings.retry_count,
        })
    }
}
