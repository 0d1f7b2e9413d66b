//! Struct and implementation of the Node entry in a k-bucket
use std::{
    hash::{Hash, Hasher},
    net::{IpAddr, SocketAddr},
};

use serde::{Deserialize, Serialize};

use crate::common::{Distance, Id};
use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A peer known to this node.
///
/// Identity is the [Id] alone; the transport address is metadata that may be
/// refreshed without changing which peer this is.
pub struct Node {
    id: Id,
    ip: Option<IpAddr>,
    port: Option<u16>,
}

impl Node {
    /// Creates a new Node with the given id and no address.
    pub fn new(id: Id) -> Node {
        Node {
            id,
            ip: None,
            port: None,
        }
    }

    /// Creates a node with a freshly generated [Id].
    pub fn random() -> Node {
        Node::new(Id::random())
    }

    /// Creates a node from raw id bytes, failing if they are not a valid [Id].
    pub fn from_id_bytes<T: AsRef<[u8]>>(bytes: T) -> Result<Node> {
        Ok(Node::new(Id::from_bytes(bytes)?))
    }

    /// Creates a node with a specific Id for testing purposes.
    #[cfg(test)]
    pub fn unique(i: usize) -> Node {
        let mut bytes = [0u8; crate::ID_SIZE];
        bytes[crate::ID_SIZE - 8..].copy_from_slice(&(i as u64).to_be_bytes());

        Node::new(Id(bytes)).with_address(SocketAddr::from(([127, 0, 0, 1], i as u16)))
    }

    // === Options ===

    pub fn with_ip(mut self, ip: impl Into<IpAddr>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_address(self, address: SocketAddr) -> Self {
        self.with_ip(address.ip()).with_port(address.port())
    }

    // === Getters ===

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn ip(&self) -> Option<IpAddr> {
        self.ip
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns the socket address if both ip and port are known.
    pub fn address(&self) -> Option<SocketAddr> {
        Some(SocketAddr::new(self.ip?, self.port?))
    }

    // === Public Methods ===

    /// Refresh the transport address of this node in place.
    pub fn set_address(&mut self, ip: Option<IpAddr>, port: Option<u16>) {
        self.ip = ip;
        self.port = port;
    }

    /// XOR distance between this node's id and the other's.
    pub fn distance(&self, other: &Node) -> Distance {
        self.id.distance(&other.id)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
