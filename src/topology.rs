//! In-memory slice topology: VM nodes and the links between them.
//!
//! Both collections keep insertion order. Nothing here validates input; the
//! controller owns every invariant.

use crate::image::Image;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmNode {
    /// User-supplied name, also the node key
    pub id: String,
    pub cpu: u32,
    pub ram_mb: u32,
    pub disk_gb: u32,
    pub image_id: u64,
    pub label: String,
}

impl VmNode {
    pub fn new(id: impl Into<String>, cpu: u32, ram_mb: u32, disk_gb: u32, image: &Image) -> Self {
        let id = id.into();
        let label = format!(
            "{}\n{}vCPU / {}MB / {}GB\n{}",
            id, cpu, ram_mb, disk_gb, image.name
        );
        Self {
            id,
            cpu,
            ram_mb,
            disk_gb,
            image_id: image.id,
            label,
        }
    }

    pub fn summary(&self) -> String {
        self.label.replace('\n', " | ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: u64,
    pub from: String,
    pub to: String,
}

impl Link {
    pub fn touches(&self, node: &str) -> bool {
        self.from == node || self.to == node
    }
}

#[derive(Debug, Clone, Default)]
pub struct Topology {
    nodes: Vec<VmNode>,
    links: Vec<Link>,
    next_link_id: u64,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by id. A replaced node keeps its position; the
    /// previous value is returned.
    pub fn insert_node(&mut self, node: VmNode) -> Option<VmNode> {
        match self.nodes.iter_mut().find(|n| n.id == node.id) {
            Some(slot) => Some(std::mem::replace(slot, node)),
            None => {
                self.nodes.push(node);
                None
            }
        }
    }

    /// Remove a node together with every link touching it.
    pub fn remove_node(&mut self, id: &str) -> Option<VmNode> {
        let pos = self.nodes.iter().position(|n| n.id == id)?;
        self.links.retain(|link| !link.touches(id));
        Some(self.nodes.remove(pos))
    }

    pub fn add_link(&mut self, from: impl Into<String>, to: impl Into<String>) -> u64 {
        self.next_link_id += 1;
        let id = self.next_link_id;
        self.links.push(Link {
            id,
            from: from.into(),
            to: to.into(),
        });
        id
    }

    pub fn remove_link(&mut self, id: u64) -> Option<Link> {
        let pos = self.links.iter().position(|l| l.id == id)?;
        Some(self.links.remove(pos))
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.links.clear();
    }

    pub fn node(&self, id: &str) -> Option<&VmNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn nodes(&self) -> &[VmNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }
}
