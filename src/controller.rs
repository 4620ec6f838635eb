//! User-triggered actions over a [`Session`].
//!
//! Every action either succeeds or returns a [`SlicerError`] with the session
//! left as it was before the call. Input validation happens before any backend
//! call is attempted.

use crate::{
    Result, SlicerError,
    backend::{DeployResponse, LoginResponse, SliceBackend, SliceListing},
    config::{SlicerConfig, VmDefaults},
    log_debug, log_info, log_warn,
    prompt::Prompter,
    session::Session,
    slicefile::SliceFile,
    topology::VmNode,
};

pub struct Controller<B> {
    session: Session,
    backend: B,
    defaults: VmDefaults,
}

impl<B: SliceBackend> Controller<B> {
    pub fn new(backend: B, config: &SlicerConfig) -> Self {
        Self {
            session: Session::new(config.slice.name.clone()),
            backend,
            defaults: config.defaults,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn load_images(&mut self) -> Result<usize> {
        self.session.catalog.load(&self.backend).await
    }

    /// Prompt for a new VM and insert it. `Ok(None)` when the user cancels
    /// at the name prompt.
    pub fn add_vm(&mut self, prompter: &mut dyn Prompter) -> Result<Option<String>> {
        if self.session.catalog.is_empty() {
            return Err(SlicerError::EmptyCatalog);
        }

        let suggested = self.session.suggested_name();
        let name = match prompter.ask("VM name", &suggested)? {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => {
                log_debug!("VM creation cancelled at the name prompt");
                return Ok(None);
            }
        };

        let cpu = ask_positive(prompter, "Number of vCPUs", self.defaults.cpu)?;
        let ram = ask_positive(prompter, "RAM (MB)", self.defaults.ram_mb)?;
        let disk = ask_positive(prompter, "Disk (GB)", self.defaults.disk_gb)?;

        let menu = self.session.catalog.menu();
        let answer = prompter.ask(&menu, "1")?.unwrap_or_default();
        let image = leading_int(&answer)
            .and_then(|choice| usize::try_from(choice).ok())
            .and_then(|choice| self.session.catalog.by_choice(choice))
            .ok_or_else(|| SlicerError::InvalidImageChoice(answer.clone()))?
            .clone();

        let node = VmNode::new(name.clone(), cpu, ram, disk, &image);
        if self.session.topology.insert_node(node).is_some() {
            log_warn!("VM '{}' already existed and was replaced", name);
        }
        self.session.bump_counter();

        log_info!("VM added: {} ({})", name, image.name);
        Ok(Some(name))
    }

    /// Set the current selection. Unknown ids are skipped and returned.
    pub fn select(&mut self, ids: &[String]) -> Vec<String> {
        let (known, unknown): (Vec<String>, Vec<String>) = ids
            .iter()
            .cloned()
            .partition(|id| self.session.topology.contains(id));
        self.session.set_selection(known);
        unknown
    }

    /// Link the two selected VMs.
    pub fn connect_vms(&mut self) -> Result<u64> {
        let selected = self.session.selection();
        let [from, to] = selected else {
            return Err(SlicerError::SelectionSize(selected.len()));
        };
        let (from, to) = (from.clone(), to.clone());

        let id = self.session.topology.add_link(from.clone(), to.clone());
        log_info!("Linked {} <-> {}", from, to);
        Ok(id)
    }

    /// Remove every link between the two selected VMs, whichever way round
    /// they were drawn. Returns how many went.
    pub fn disconnect_vms(&mut self) -> Result<usize> {
        let selected = self.session.selection();
        let [a, b] = selected else {
            return Err(SlicerError::SelectionSize(selected.len()));
        };
        let (a, b) = (a.clone(), b.clone());

        let topology = &mut self.session.topology;
        let doomed: Vec<u64> = topology
            .links()
            .iter()
            .filter(|link| link.touches(&a) && link.touches(&b))
            .map(|link| link.id)
            .collect();
        let removed = doomed
            .into_iter()
            .filter_map(|id| topology.remove_link(id))
            .count();

        log_info!("Removed {} link(s) between {} and {}", removed, a, b);
        Ok(removed)
    }

    /// Remove every selected VM with its links. Returns the removed ids.
    pub fn delete_vm(&mut self) -> Vec<String> {
        let selected = self.session.selection().to_vec();
        let removed: Vec<String> = selected
            .into_iter()
            .filter(|id| self.session.topology.remove_node(id).is_some())
            .collect();
        self.session.clear_selection();

        if !removed.is_empty() {
            log_info!("Removed VMs: {}", removed.join(", "));
        }
        removed
    }

    /// Wipe the session after confirmation. Returns whether it happened.
    pub fn clear_all(&mut self, prompter: &mut dyn Prompter) -> Result<bool> {
        if !prompter.confirm("Delete the whole topology?")? {
            return Ok(false);
        }
        self.session.reset();
        log_info!("Topology cleared");
        Ok(true)
    }

    /// Replace the topology with the one described by `file`. On error the
    /// current topology is kept. The saved slice id is not touched.
    pub fn import(&mut self, file: &SliceFile) -> Result<usize> {
        let topology = file.to_topology(&self.session.catalog, &self.defaults)?;
        let count = topology.node_count();
        self.session.topology = topology;
        self.session.clear_selection();
        log_info!("Imported {} VM(s)", count);
        Ok(count)
    }

    pub fn export(&self) -> SliceFile {
        SliceFile::from_topology(
            Some(self.session.sync.slice_name()),
            &self.session.topology,
        )
    }

    pub async fn save_slice(&mut self) -> Result<u64> {
        let Session { sync, topology, .. } = &mut self.session;
        sync.save(&self.backend, topology).await
    }

    pub async fn deploy_slice(&self) -> Result<DeployResponse> {
        self.session.sync.deploy(&self.backend).await
    }

    pub async fn list_slices(&self) -> Result<SliceListing> {
        self.backend.list_slices().await
    }

    /// Ask for the password and exchange the credentials for an access
    /// token. `Ok(None)` when the password prompt is cancelled.
    pub async fn login(
        &self,
        username: &str,
        prompter: &mut dyn Prompter,
    ) -> Result<Option<LoginResponse>> {
        let Some(password) = prompter.ask_secret(&format!("Password for {}", username))? else {
            log_debug!("Login cancelled at the password prompt");
            return Ok(None);
        };

        let response = self.backend.login(username, &password).await?;
        log_info!(
            "Logged in as {} (role: {})",
            username,
            response.role.as_deref().unwrap_or("unknown")
        );
        Ok(Some(response))
    }
}

fn ask_positive(prompter: &mut dyn Prompter, question: &str, default: u32) -> Result<u32> {
    let answer = prompter.ask(question, &default.to_string())?;
    Ok(answer
        .as_deref()
        .and_then(leading_int)
        .and_then(|value| u32::try_from(value).ok())
        .filter(|value| *value > 0)
        .unwrap_or(default))
}

/// Integer made of the leading digits of `input` ("12GB" -> 12).
fn leading_int(input: &str) -> Option<u64> {
    let digits: String = input
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
