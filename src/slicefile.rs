//! TOML slice files: a topology written down so it can be applied without
//! the interactive shell.
//!
//! ```toml
//! name = "SliceWeb"
//!
//! [[vm]]
//! name = "VM1"
//! cpu = 2
//! ram = 1024
//! disk = 10
//! image = "ubuntu"
//!
//! [[link]]
//! from = "VM1"
//! to = "VM2"
//! ```

use crate::{
    Result, SlicerError,
    config::VmDefaults,
    image::{Image, ImageCatalog},
    topology::{Topology, VmNode},
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub vm: Vec<VmEntry>,
    #[serde(default)]
    pub link: Vec<LinkEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmEntry {
    pub name: String,
    #[serde(default)]
    pub cpu: Option<u32>,
    #[serde(default)]
    pub ram: Option<u32>,
    #[serde(default)]
    pub disk: Option<u32>,
    /// Image name or numeric id
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    pub from: String,
    pub to: String,
}

impl SliceFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_str(&contents)
    }

    pub fn from_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut contents = String::from("# Generated with `slicer export`\n");
        contents.push_str(&toml::to_string_pretty(self)?);
        fs::write(path, contents)?;
        Ok(())
    }

    /// Capture a topology. Images are written by id so the file does not
    /// depend on display names.
    pub fn from_topology(name: Option<&str>, topology: &Topology) -> Self {
        Self {
            name: name.map(str::to_string),
            vm: topology
                .nodes()
                .iter()
                .map(|node| VmEntry {
                    name: node.id.clone(),
                    cpu: Some(node.cpu),
                    ram: Some(node.ram_mb),
                    disk: Some(node.disk_gb),
                    image: node.image_id.to_string(),
                })
                .collect(),
            link: topology
                .links()
                .iter()
                .map(|link| LinkEntry {
                    from: link.from.clone(),
                    to: link.to.clone(),
                })
                .collect(),
        }
    }

    /// Build a topology against the loaded catalog. Missing resources take
    /// `defaults`; zero counts are rejected like any other bad input.
    pub fn to_topology(&self, catalog: &ImageCatalog, defaults: &VmDefaults) -> Result<Topology> {
        let mut topology = Topology::new();

        for entry in &self.vm {
            let image: &Image = catalog
                .resolve(&entry.image)
                .ok_or_else(|| SlicerError::UnknownImage(entry.image.clone()))?;
            let cpu = positive(entry.cpu, defaults.cpu, &entry.name, "cpu")?;
            let ram = positive(entry.ram, defaults.ram_mb, &entry.name, "ram")?;
            let disk = positive(entry.disk, defaults.disk_gb, &entry.name, "disk")?;
            topology.insert_node(VmNode::new(entry.name.clone(), cpu, ram, disk, image));
        }

        for link in &self.link {
            for end in [&link.from, &link.to] {
                if !topology.contains(end) {
                    return Err(SlicerError::UnknownVm(end.clone()));
                }
            }
            topology.add_link(link.from.clone(), link.to.clone());
        }

        Ok(topology)
    }
}

fn positive(value: Option<u32>, default: u32, vm: &str, field: &str) -> Result<u32> {
    match value {
        None => Ok(default),
        Some(0) => Err(SlicerError::Config(format!(
            "VM '{}': {} must be a positive integer",
            vm, field
        ))),
        Some(v) => Ok(v),
    }
}
