use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::protocol::{
    HeartbeatRequest, JoinRequest, ENDPOINT_GOSSIP, ENDPOINT_HEARTBEAT, ENDPOINT_JOIN,
};
use crate::config::Config;
use crate::discovery::service::DiscoveryService;
use crate::network;
use crate::peer::registry::PeerRegistry;
use crate::peer::types::Peer;

/// Per-request timeout for outbound peer calls; one slow peer must never
/// hold a dispatch task past this bound.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Synchronous notification hook. Runs on the handler task that recorded the
/// peer and must not block.
pub type PeerCallback = Arc<dyn Fn(&Peer) + Send + Sync>;

/// The membership engine.
///
/// Owns the peer registry and the periodic loops (heartbeat, health check,
/// gossip) plus the broadcast discovery pair, and issues every outbound
/// peer-to-peer request. Inbound traffic reaches it through the HTTP
/// handlers and the discovery listener.
pub struct MembershipService {
    config: Config,
    registry: PeerRegistry,
    advertise_addr: String,
    full_address: String,
    http_client: reqwest::Client,
    shutdown_tx: broadcast::Sender<()>,
    on_peer_join: Option<PeerCallback>,
    on_peer_found: Option<PeerCallback>,
}

impl MembershipService {
    /// Creates the engine, resolving the advertise address once. The
    /// composed advertised URL is immutable for the lifetime of the instance.
    pub fn new(config: Config) -> Self {
        let advertise_addr = resolve_advertise_address(&config);
        let full_address = format!("http://{}:{}", advertise_addr, config.port);

        if config.peer_timeout <= config.heartbeat_interval {
            warn!(
                "peer timeout ({:?}) should exceed the heartbeat interval ({:?}); \
                 peers will flap between alive and dead",
                config.peer_timeout, config.heartbeat_interval
            );
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            registry: PeerRegistry::new(),
            advertise_addr,
            full_address,
            http_client: reqwest::Client::new(),
            shutdown_tx,
            on_peer_join: None,
            on_peer_found: None,
        }
    }

    /// Registers a hook invoked after a peer is recorded via `/join`.
    pub fn with_on_peer_join(mut self, callback: PeerCallback) -> Self {
        self.on_peer_join = Some(callback);
        self
    }

    /// Registers a hook invoked after a peer is recorded via broadcast
    /// discovery.
    pub fn with_on_peer_found(mut self, callback: PeerCallback) -> Self {
        self.on_peer_found = Some(callback);
        self
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &PeerRegistry {
        &self.registry
    }

    pub fn advertise_addr(&self) -> &str {
        &self.advertise_addr
    }

    /// The URL other nodes use to reach this node.
    pub fn full_address(&self) -> &str {
        &self.full_address
    }

    /// This node's own record, as handed to joining peers.
    pub fn self_peer(&self) -> Peer {
        Peer::new(self.config.id.clone(), self.full_address.clone())
    }

    /// Starts discovery, registers with seed nodes, and spawns the loops.
    pub async fn start(self: Arc<Self>) {
        let service = self.clone();
        let discovery = Arc::new(DiscoveryService::new(
            self.config.id.clone(),
            self.full_address.clone(),
            self.config.port,
            self.config.broadcast_port,
            self.config.broadcast_interval,
            self.shutdown_tx.clone(),
            Arc::new(move |id, address| service.clone().handle_discovered_peer(id, address)),
        ));
        discovery.clone().start_listener().await;
        discovery.start_announcer();

        if self.config.seed_nodes.is_empty() {
            info!("No seed nodes specified - relying on broadcast discovery");
        } else {
            self.register_with_seeds().await;
        }

        let service = self.clone();
        tokio::spawn(async move { service.heartbeat_loop().await });
        let service = self.clone();
        tokio::spawn(async move { service.health_check_loop().await });
        let service = self.clone();
        tokio::spawn(async move { service.gossip_loop().await });

        info!(
            "Service {} started (binding: {}:{}, advertising: {})",
            self.config.id, self.config.bind_address, self.config.port, self.full_address
        );
    }

    /// Signals every loop to exit. Safe to call more than once.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(());
    }

    // ------------------------------------------------------------------
    // Inbound paths
    // ------------------------------------------------------------------

    /// Records a `/join` from another node and returns the current view,
    /// with this node's own record appended so the joiner learns about us.
    pub fn accept_join(&self, request: JoinRequest) -> Vec<Peer> {
        if request.id != self.config.id {
            info!("New peer joining: {} at {}", request.id, request.address);
            let peer = Peer::new(request.id, request.address);
            self.registry.add(peer.clone());
            if let Some(callback) = &self.on_peer_join {
                callback(&peer);
            }
        }

        let mut peers = self.registry.all();
        peers.push(self.self_peer());
        peers
    }

    /// Records a `/heartbeat`: refreshes a known sender, adds an unknown one.
    pub fn accept_heartbeat(&self, heartbeat: HeartbeatRequest) {
        if heartbeat.id == self.config.id {
            return;
        }

        if self.registry.exists(&heartbeat.id) {
            self.registry.touch(&heartbeat.id);
        } else {
            info!(
                "Discovered new peer through heartbeat: {} at {}",
                heartbeat.id, heartbeat.address
            );
            self.registry.add(Peer::new(heartbeat.id, heartbeat.address));
        }
    }

    /// Merges a `/gossip` payload into the registry.
    ///
    /// Records about this node itself are skipped; everything else follows
    /// the newest-evidence-wins rule, keeping sender timestamps intact.
    pub fn accept_gossip(&self, peers: Vec<Peer>) {
        for peer in peers {
            if peer.id == self.config.id {
                continue;
            }

            let known = self.registry.exists(&peer.id);
            if self.registry.merge(peer.clone()) && !known {
                info!(
                    "Discovered new peer through gossip: {} at {}",
                    peer.id, peer.address
                );
            }
        }
    }

    /// Reacts to a broadcast announcement from an unknown node: record it,
    /// then join it so both sides converge in one round trip.
    fn handle_discovered_peer(self: Arc<Self>, id: String, address: String) {
        if self.registry.exists(&id) {
            return;
        }

        info!("Discovered new peer via broadcast: {} at {}", id, address);
        let peer = Peer::new(id.clone(), address.clone());
        self.registry.add(peer.clone());
        if let Some(callback) = &self.on_peer_found {
            callback(&peer);
        }

        let service = self.clone();
        tokio::spawn(async move {
            match service.send_join_request(&address).await {
                Ok(()) => info!("Successfully joined discovered peer: {}", id),
                Err(e) => warn!("Failed to join discovered peer {}: {}", id, e),
            }
        });
    }

    // ------------------------------------------------------------------
    // Outbound paths
    // ------------------------------------------------------------------

    /// Joins every configured seed node. Failures are logged per seed and
    /// never abort the remaining attempts.
    pub(crate) async fn register_with_seeds(&self) {
        for seed in &self.config.seed_nodes {
            if seed == &self.full_address {
                continue;
            }

            match self.send_join_request(seed).await {
                Ok(()) => info!("Successfully registered with seed node: {}", seed),
                Err(e) => warn!("Failed to register with seed {}: {}", seed, e),
            }
        }
    }

    /// Posts this node to `<peer_addr>/join` and absorbs the returned view.
    pub(crate) async fn send_join_request(&self, peer_addr: &str) -> Result<()> {
        let request = JoinRequest {
            id: self.config.id.clone(),
            address: self.full_address.clone(),
        };

        let response = self
            .http_client
            .post(format!("{}{}", peer_addr, ENDPOINT_JOIN))
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("join request failed with status: {}", response.status());
        }

        let peers: Vec<Peer> = response.json().await?;
        for peer in peers {
            if peer.id != self.config.id {
                self.registry.add(peer);
            }
        }

        Ok(())
    }

    async fn send_heartbeat(&self, peer: &Peer) -> Result<()> {
        let heartbeat = HeartbeatRequest {
            id: self.config.id.clone(),
            address: self.full_address.clone(),
        };

        self.http_client
            .post(format!("{}{}", peer.address, ENDPOINT_HEARTBEAT))
            .json(&heartbeat)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        Ok(())
    }

    async fn send_gossip(&self, peer: &Peer) -> Result<()> {
        let snapshot = self.registry.all();

        self.http_client
            .post(format!("{}{}", peer.address, ENDPOINT_GOSSIP))
            .json(&snapshot)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        Ok(())
    }

    // ------------------------------------------------------------------
    // Periodic loops
    // ------------------------------------------------------------------

    async fn heartbeat_loop(self: Arc<Self>) {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut interval = tokio::time::interval(self.config.heartbeat_interval);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                _ = interval.tick() => self.clone().send_heartbeats(),
            }
        }
    }

    /// Sends one heartbeat per alive peer, each on its own task so the loop
    /// never waits on a slow peer.
    pub(crate) fn send_heartbeats(self: Arc<Self>) {
        for peer in self.registry.alive() {
            let service = self.clone();
            tokio::spawn(async move {
                if let Err(e) = service.send_heartbeat(&peer).await {
                    warn!("Failed to send heartbeat to {}: {}", peer.id, e);
                }
            });
        }
    }

    async fn health_check_loop(self: Arc<Self>) {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut interval = tokio::time::interval(self.config.heartbeat_interval);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                _ = interval.tick() => self.check_peer_health(),
            }
        }
    }

    /// Marks peers dead once their liveness evidence ages past the timeout.
    /// The record stays in the registry as a tombstone so newer gossip can
    /// revive it.
    pub(crate) fn check_peer_health(&self) {
        let now = Utc::now();

        for peer in self.registry.all() {
            let age = now
                .signed_duration_since(peer.last_seen)
                .to_std()
                .unwrap_or_default();

            if age > self.config.peer_timeout && peer.is_alive {
                warn!("Peer {} marked as dead (last seen {:?} ago)", peer.id, age);
                self.registry.mark_dead(&peer.id);
            }
        }
    }

    async fn gossip_loop(self: Arc<Self>) {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut interval = tokio::time::interval(self.config.gossip_interval);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                _ = interval.tick() => self.clone().gossip_with_peer(),
            }
        }
    }

    /// Sends the full registry snapshot to one randomly chosen alive peer.
    /// One peer per tick bounds the per-round network cost while epidemic
    /// spread still converges in logarithmic hops.
    pub(crate) fn gossip_with_peer(self: Arc<Self>) {
        let alive = self.registry.alive();
        if alive.is_empty() {
            return;
        }

        use rand::Rng;
        let target = alive[rand::thread_rng().gen_range(0..alive.len())].clone();

        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.send_gossip(&target).await {
                debug!("Failed to gossip with {}: {}", target.id, e);
            }
        });
    }
}

/// Picks the host other nodes should use to reach this node.
fn resolve_advertise_address(config: &Config) -> String {
    if !config.advertise_address.is_empty() {
        if config.advertise_address == "localhost" || config.advertise_address == "127.0.0.1" {
            warn!(
                "Advertising {} - only peers on this machine will be able to connect; \
                 use --advertise with a network IP for cross-machine clusters",
                config.advertise_address
            );
        }
        return config.advertise_address.clone();
    }

    match network::outbound_ip() {
        Some(ip) => {
            info!("Auto-detected network IP: {}", ip);
            ip.to_string()
        }
        None => {
            warn!("Could not auto-detect network IP. Using localhost.");
            warn!("Other computers will not reach this node; specify --advertise manually.");
            "localhost".to_string()
        }
    }
}
