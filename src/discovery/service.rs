use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::net::UdpSocket;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Envelope marker; datagrams with any other `type` are silently discarded.
pub const DISCOVERY_MESSAGE: &str = "CLIP_PEER_DISCOVERY";

/// Discovery datagrams fit in a single small UDP packet.
pub const MAX_DATAGRAM_BYTES: usize = 1024;

/// The announcement each node broadcasts on the LAN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    #[serde(rename = "type")]
    pub message_type: String,
    pub id: String,
    pub address: String,
    pub port: u16,
}

/// Invoked with `(id, address)` for every announcement from another node.
pub type OnAnnouncement = Arc<dyn Fn(String, String) + Send + Sync>;

/// Sends and receives link-local UDP announcements.
pub struct DiscoveryService {
    node_id: String,
    node_address: String,
    node_port: u16,
    broadcast_port: u16,
    broadcast_interval: Duration,
    shutdown_tx: broadcast::Sender<()>,
    on_announcement: OnAnnouncement,
}

impl DiscoveryService {
    pub fn new(
        node_id: String,
        node_address: String,
        node_port: u16,
        broadcast_port: u16,
        broadcast_interval: Duration,
        shutdown_tx: broadcast::Sender<()>,
        on_announcement: OnAnnouncement,
    ) -> Self {
        Self {
            node_id,
            node_address,
            node_port,
            broadcast_port,
            broadcast_interval,
            shutdown_tx,
            on_announcement,
        }
    }

    /// Binds the discovery port and spawns the read loop.
    ///
    /// A bind failure disables broadcast discovery for the whole process;
    /// membership via seed nodes keeps working.
    pub async fn start_listener(self: Arc<Self>) {
        let socket = match UdpSocket::bind(("0.0.0.0", self.broadcast_port)).await {
            Ok(socket) => socket,
            Err(e) => {
                warn!("Could not start broadcast listener: {}", e);
                warn!("Automatic peer discovery will not work. Use --seeds instead.");
                return;
            }
        };

        info!(
            "Broadcast discovery listener started on port {}",
            self.broadcast_port
        );

        let service = self.clone();
        tokio::spawn(async move {
            let mut shutdown_rx = service.shutdown_tx.subscribe();
            let mut buf = vec![0u8; MAX_DATAGRAM_BYTES];

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    received = socket.recv_from(&mut buf) => match received {
                        Ok((len, _)) => service.handle_datagram(&buf[..len]),
                        Err(e) => {
                            warn!("Error reading broadcast: {}", e);
                            tokio::time::sleep(Duration::from_millis(100)).await;
                        }
                    }
                }
            }
        });
    }

    /// Resolves the broadcast address and spawns the announce loop.
    pub fn start_announcer(self: Arc<Self>) {
        let broadcast_addr = match crate::network::find_broadcast_address() {
            Ok(addr) => addr,
            Err(e) => {
                warn!("Could not determine broadcast address: {}", e);
                warn!("Presence announcements will not work. Use --seeds instead.");
                return;
            }
        };

        info!(
            "Broadcasting presence to {} every {:?}",
            broadcast_addr, self.broadcast_interval
        );

        let service = self.clone();
        tokio::spawn(async move {
            let mut shutdown_rx = service.shutdown_tx.subscribe();
            let mut interval = tokio::time::interval(service.broadcast_interval);

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    _ = interval.tick() => service.send_announcement(broadcast_addr).await,
                }
            }
        });
    }

    /// Decodes one datagram and reports foreign announcements.
    pub(crate) fn handle_datagram(&self, data: &[u8]) {
        let message: Announcement = match serde_json::from_slice(data) {
            Ok(message) => message,
            Err(_) => return,
        };

        if message.id == self.node_id {
            return;
        }
        if message.message_type != DISCOVERY_MESSAGE {
            return;
        }

        debug!(
            "Received announcement from {} at {}",
            message.id, message.address
        );
        (self.on_announcement)(message.id, message.address);
    }

    async fn send_announcement(&self, broadcast_addr: Ipv4Addr) {
        let message = Announcement {
            message_type: DISCOVERY_MESSAGE.to_string(),
            id: self.node_id.clone(),
            address: self.node_address.clone(),
            port: self.node_port,
        };

        let data = match serde_json::to_vec(&message) {
            Ok(data) => data,
            Err(_) => return,
        };

        let socket = match UdpSocket::bind("0.0.0.0:0").await {
            Ok(socket) => socket,
            Err(e) => {
                warn!("Error creating UDP socket for announcement: {}", e);
                return;
            }
        };
        if let Err(e) = socket.set_broadcast(true) {
            warn!("Error enabling broadcast on UDP socket: {}", e);
            return;
        }

        let target = SocketAddrV4::new(broadcast_addr, self.broadcast_port);
        if let Err(e) = socket.send_to(&data, target).await {
            warn!("Error sending announcement: {}", e);
        }
    }
}
