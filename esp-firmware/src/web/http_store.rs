// HTTP Color Store - Farbindex-Dienst über embassy-net TCP
//
// Jede Anfrage baut eine eigene TCP-Verbindung auf (HTTP/1.0,
// Connection: close) und liest bis der Server schließt. Socket-Buffer
// liegen auf dem Stack der aufrufenden Task, daher braucht der Store
// keinen gemeinsamen Zustand und kann von Poll-Worker und Taster-Pfad
// gleichzeitig benutzt werden.

use defmt::{Debug2Format, debug};
use embassy_net::{IpAddress, Ipv4Address, Stack, dns::DnsQueryType, tcp::TcpSocket};
use embassy_time::{Duration, Timer, with_timeout};
use esp_core::{ColorStore, DeadlineStore, RemoteError, protocol};

use crate::config::*;

/// HTTP-Farbspeicher mit Gesamt-Timeout pro Anfrage
///
/// `socket.set_timeout` greift nur bei Inaktivität auf TCP-Ebene. Ein
/// Server, der den Request bestätigt aber nie antwortet, wird erst durch
/// diese Deadline abgebrochen.
pub type BoundedHttpStore = DeadlineStore<HttpColorStore, fn() -> Timer>;

/// Deadline für eine komplette HTTP-Anfrage (DNS, Connect, Senden, Empfangen)
pub fn http_deadline() -> Timer {
    Timer::after(Duration::from_secs(HTTP_TIMEOUT_SECS))
}

/// Remote-Farbspeicher über HTTP
pub struct HttpColorStore {
    stack: &'static Stack<'static>,
    host: &'static str,
    port: u16,
}

impl HttpColorStore {
    pub const fn new(stack: &'static Stack<'static>, host: &'static str, port: u16) -> Self {
        Self { stack, host, port }
    }

    /// Verpackt den Store mit [`http_deadline`]
    pub fn bounded(self) -> BoundedHttpStore {
        DeadlineStore::new(self, http_deadline as fn() -> Timer)
    }

    /// Schickt einen Request und liest die komplette Antwort nach `response`
    ///
    /// Gibt die Anzahl gelesener Bytes zurück.
    async fn exchange(&self, request: &[u8], response: &mut [u8]) -> Result<usize, RemoteError> {
        // Ohne Link oder IP gar nicht erst DNS/Connect versuchen
        if !self.stack.is_link_up() || self.stack.config_v4().is_none() {
            return Err(RemoteError::NetworkDown);
        }

        let address = resolve_hostname(self.stack, self.host).await?;

        let mut rx_buffer = [0u8; TCP_RX_BUFFER_SIZE];
        let mut tx_buffer = [0u8; TCP_TX_BUFFER_SIZE];
        let mut socket = TcpSocket::new(*self.stack, &mut rx_buffer, &mut tx_buffer);
        // Inaktivitäts-Timeout (Connect, ACKs); Gesamtdauer: BoundedHttpStore
        socket.set_timeout(Some(Duration::from_secs(HTTP_TIMEOUT_SECS)));

        socket
            .connect((address, self.port))
            .await
            .map_err(|_| RemoteError::ConnectionFailed)?;
        debug!("HTTP: Connected to {}:{}", self.host, self.port);

        let mut written = 0;
        while written < request.len() {
            match socket.write(&request[written..]).await {
                Ok(0) | Err(_) => return Err(RemoteError::Io),
                Ok(n) => written += n,
            }
        }
        socket.flush().await.map_err(|_| RemoteError::Io)?;

        // Lesen bis der Server die Verbindung schließt (read → 0)
        let mut received = 0;
        loop {
            if received == response.len() {
                socket.abort();
                return Err(RemoteError::ResponseTooLarge);
            }
            match socket.read(&mut response[received..]).await {
                Ok(0) => break,
                Ok(n) => received += n,
                Err(_) => return Err(RemoteError::Io),
            }
        }

        socket.close();
        debug!("HTTP: Received {} bytes", received);
        Ok(received)
    }
}

impl ColorStore for HttpColorStore {
    async fn fetch_color_index(&self) -> Result<i32, RemoteError> {
        let request = protocol::get_color_index_request(self.host)?;
        let mut buffer = [0u8; HTTP_RESPONSE_BUFFER_SIZE];

        let len = self.exchange(request.as_bytes(), &mut buffer).await?;
        let response = protocol::parse_response(&buffer[..len])?;
        response.ensure_success()?;
        protocol::parse_color_index(response.body)
    }

    async fn publish_color_index(&self, index: usize) -> Result<(), RemoteError> {
        let request = protocol::set_color_index_request(self.host, index)?;
        let mut buffer = [0u8; HTTP_RESPONSE_BUFFER_SIZE];

        let len = self.exchange(request.as_bytes(), &mut buffer).await?;
        protocol::parse_response(&buffer[..len])?.ensure_success()
    }
}

/// Löst Hostname zu IPv4-Adresse auf
///
/// IPv4-Literale werden direkt übernommen, sonst DNS-Abfrage mit Timeout.
async fn resolve_hostname(
    stack: &'static Stack<'static>,
    hostname: &str,
) -> Result<Ipv4Address, RemoteError> {
    if let Ok(address) = hostname.parse::<Ipv4Address>() {
        return Ok(address);
    }

    let result = with_timeout(
        Duration::from_secs(DNS_TIMEOUT_SECS),
        stack.dns_query(hostname, DnsQueryType::A),
    )
    .await;

    match result {
        Ok(Ok(addrs)) => {
            let address = addrs.iter().find_map(|addr| match addr {
                IpAddress::Ipv4(ipv4) => Some(*ipv4),
                #[allow(unreachable_patterns)]
                _ => None,
            });
            debug!("HTTP: Resolved '{}' to {}", hostname, Debug2Format(&address));
            address.ok_or(RemoteError::DnsResolutionFailed)
        }
        Ok(Err(_)) => Err(RemoteError::DnsResolutionFailed),
        Err(_) => Err(RemoteError::DnsTimeout),
    }
}
