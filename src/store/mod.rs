// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Node & version store and connection registry.
//!
//! Both registries keep insertion order so that listings and cascade
//! scheduling are deterministic.

mod checksum;
mod connection;
mod node;
mod version;

pub use checksum::checksum;
pub use connection::{Connection, ConnectionStatus, TransferPolicy};
pub use node::{Node, NodeMetadata, NodeStatus};
pub use version::{Version, AUTHOR_SYSTEM, AUTHOR_USER};

use std::collections::HashMap;

use crate::errors::EngineError;

/// Nodes by id, iterated in creation order.
#[derive(Debug, Default)]
pub struct NodeStore {
    nodes: HashMap<String, Node>,
    order: Vec<String>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: Node) -> Result<&Node, EngineError> {
        if self.nodes.contains_key(&node.id) {
            return Err(EngineError::DuplicateNode(node.id));
        }
        let id = node.id.clone();
        self.order.push(id.clone());
        Ok(self.nodes.entry(id).or_insert(node))
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn require(&self, id: &str) -> Result<&Node, EngineError> {
        self.get(id).ok_or_else(|| EngineError::node_not_found(id))
    }

    pub fn require_mut(&mut self, id: &str) -> Result<&mut Node, EngineError> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| EngineError::node_not_found(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Node> {
        let node = self.nodes.remove(id)?;
        self.order.retain(|o| o != id);
        Some(node)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.order.clear();
    }
}

/// Connections by id, iterated in creation order.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<String, Connection>,
    order: Vec<String>,
    next_sequence: u64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_sequence(&mut self) -> u64 {
        let seq = self.next_sequence;
        self.next_sequence += 1;
        seq
    }

    pub fn insert(&mut self, connection: Connection) -> Result<&Connection, EngineError> {
        if self.connections.contains_key(&connection.id) {
            return Err(EngineError::DuplicateConnection(connection.id));
        }
        let id = connection.id.clone();
        self.order.push(id.clone());
        Ok(self.connections.entry(id).or_insert(connection))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.connections.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Connection> {
        self.connections.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Connection> {
        self.connections.get_mut(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Connection> {
        let connection = self.connections.remove(id)?;
        self.order.retain(|o| o != id);
        Some(connection)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.order.iter().filter_map(|id| self.connections.get(id))
    }

    /// Connections leaving `source_id`, in creation order.
    pub fn outgoing(&self, source_id: &str) -> Vec<&Connection> {
        let mut out: Vec<&Connection> = self
            .connections
            .values()
            .filter(|c| c.source_id == source_id)
            .collect();
        out.sort_by_key(|c| c.sequence);
        out
    }

    /// Ids of connections with `node_id` at either end.
    pub fn touching(&self, node_id: &str) -> Vec<String> {
        self.iter()
            .filter(|c| c.source_id == node_id || c.target_id == node_id)
            .map(|c| c.id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn clear(&mut self) {
        self.connections.clear();
        self.order.clear();
    }
}
