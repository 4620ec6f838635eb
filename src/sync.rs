use crate::{
    Result, SlicerError,
    backend::{DeployResponse, LinkPayload, NodePayload, SliceBackend, SlicePayload},
    log_error, log_info,
    topology::Topology,
};

impl SlicePayload {
    /// Snapshot the topology into the create-request body.
    pub fn from_topology(name: &str, topology: &Topology) -> Self {
        Self {
            name: name.to_string(),
            nodes: topology
                .nodes()
                .iter()
                .map(|node| NodePayload {
                    label: node.id.clone(),
                    cpu: node.cpu,
                    ram: node.ram_mb,
                    disk: node.disk_gb,
                    image_id: node.image_id,
                })
                .collect(),
            links: topology
                .links()
                .iter()
                .map(|link| LinkPayload {
                    from_vm: link.from.clone(),
                    to_vm: link.to.clone(),
                })
                .collect(),
        }
    }
}

/// Pushes the topology to the backend and remembers the slice id it was saved under.
///
/// The id is set only by a successful [`SliceSync::save`] and cleared only by
/// [`SliceSync::reset`]. Nothing is re-fetched after a save, so the backend copy
/// and the local topology may drift apart.
#[derive(Debug, Clone)]
pub struct SliceSync {
    slice_name: String,
    slice_id: Option<u64>,
}

impl SliceSync {
    pub fn new(slice_name: impl Into<String>) -> Self {
        Self {
            slice_name: slice_name.into(),
            slice_id: None,
        }
    }

    pub fn slice_name(&self) -> &str {
        &self.slice_name
    }

    pub fn slice_id(&self) -> Option<u64> {
        self.slice_id
    }

    pub fn reset(&mut self) {
        self.slice_id = None;
    }

    pub async fn save<B: SliceBackend + ?Sized>(
        &mut self,
        backend: &B,
        topology: &Topology,
    ) -> Result<u64> {
        if topology.node_count() == 0 {
            return Err(SlicerError::EmptyTopology);
        }

        let payload = SlicePayload::from_topology(&self.slice_name, topology);
        log_info!(
            "Saving slice '{}' ({} VMs, {} links)",
            payload.name,
            payload.nodes.len(),
            payload.links.len()
        );

        let response = backend.create_slice(&payload).await.inspect_err(|err| {
            log_error!("Failed to save slice '{}': {}", payload.name, err);
        })?;

        self.slice_id = Some(response.slice_id);
        log_info!("Slice created: {:?}", response);
        Ok(response.slice_id)
    }

    pub async fn deploy<B: SliceBackend + ?Sized>(&self, backend: &B) -> Result<DeployResponse> {
        let slice_id = self.slice_id.ok_or(SlicerError::NotSaved)?;

        log_info!("Deploying slice {}", slice_id);
        let response = backend.deploy_slice(slice_id).await.inspect_err(|err| {
            log_error!("Failed to deploy slice {}: {}", slice_id, err);
        })?;

        log_info!("Deployment result: {:?}", response);
        Ok(response)
    }
}
