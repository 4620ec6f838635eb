//! Interactive composing shell.
//!
//! Reads one command per line and drives the [`Controller`]. Action failures
//! are printed and the shell returns to the prompt; only broken terminal I/O
//! ends the loop with an error.

use crate::{
    Result, SlicerError,
    backend::SliceBackend,
    controller::Controller,
    log_debug, log_error,
    prompt::LinePrompter,
    session::Session,
    slicefile::SliceFile,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;

const HELP: &str = "\
Commands:
  add                  add a VM (prompts for name, resources and image)
  select <vm>...       set the current selection
  connect [<a> <b>]    link the two selected VMs
  disconnect [<a> <b>] remove every link between the two selected VMs
  delete [<vm>...]     delete the selected VMs and their links
  clear                delete everything (asks first)
  show                 print the topology
  images               list the image catalog
  reload               fetch the image catalog again
  slices               list slices stored on the backend
  save                 save the topology as a slice
  deploy               deploy the saved slice
  export <file>        write the topology to a slice file
  import <file>        replace the topology with a slice file
  help                 this text
  quit                 leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Add,
    Select(Vec<String>),
    Connect(Vec<String>),
    Disconnect(Vec<String>),
    Delete(Vec<String>),
    Clear,
    Show,
    Images,
    Reload,
    Slices,
    Save,
    Deploy,
    Export(PathBuf),
    Import(PathBuf),
    Help,
    Quit,
}

impl ShellCommand {
    pub fn parse(line: &str) -> std::result::Result<Self, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err("empty command".to_string());
        };
        let args: Vec<String> = words.map(str::to_string).collect();

        let command = match verb.to_ascii_lowercase().as_str() {
            "add" => ShellCommand::Add,
            "select" | "sel" => ShellCommand::Select(args),
            "connect" | "link" => match args.len() {
                0 | 2 => ShellCommand::Connect(args),
                _ => return Err("usage: connect [<a> <b>]".to_string()),
            },
            "disconnect" | "unlink" => match args.len() {
                0 | 2 => ShellCommand::Disconnect(args),
                _ => return Err("usage: disconnect [<a> <b>]".to_string()),
            },
            "delete" | "rm" => ShellCommand::Delete(args),
            "clear" => ShellCommand::Clear,
            "show" | "ls" => ShellCommand::Show,
            "images" => ShellCommand::Images,
            "reload" => ShellCommand::Reload,
            "slices" => ShellCommand::Slices,
            "save" => ShellCommand::Save,
            "deploy" => ShellCommand::Deploy,
            "export" => ShellCommand::Export(single_path(&args, "export")?),
            "import" => ShellCommand::Import(single_path(&args, "import")?),
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" | "q" => ShellCommand::Quit,
            other => return Err(format!("unknown command '{}', try 'help'", other)),
        };
        Ok(command)
    }
}

fn single_path(args: &[String], verb: &str) -> std::result::Result<PathBuf, String> {
    match args {
        [path] => Ok(PathBuf::from(path)),
        _ => Err(format!("usage: {} <file>", verb)),
    }
}

/// Text view of the topology; selected VMs are starred.
pub fn render_topology(session: &Session) -> String {
    let topology = &session.topology;
    let mut out = format!("VMs ({}):\n", topology.node_count());
    for node in topology.nodes() {
        let marker = if session.selection().contains(&node.id) {
            '*'
        } else {
            ' '
        };
        out.push_str(&format!(" {} {}\n", marker, node.summary()));
    }

    out.push_str(&format!("Links ({}):\n", topology.link_count()));
    for link in topology.links() {
        out.push_str(&format!("   {} <-> {}\n", link.from, link.to));
    }

    match session.slice_id() {
        Some(id) => out.push_str(&format!("Slice: {} (ID {})\n", session.sync.slice_name(), id)),
        None => out.push_str(&format!("Slice: {} (not saved)\n", session.sync.slice_name())),
    }
    out
}

pub struct Shell<'a, B, R, W> {
    controller: &'a mut Controller<B>,
    prompter: LinePrompter<R, W>,
}

impl<'a, B, R, W> Shell<'a, B, R, W>
where
    B: SliceBackend,
    R: BufRead,
    W: Write,
{
    pub fn new(controller: &'a mut Controller<B>, prompter: LinePrompter<R, W>) -> Self {
        Self {
            controller,
            prompter,
        }
    }

    pub fn into_prompter(self) -> LinePrompter<R, W> {
        self.prompter
    }

    fn say(&mut self, message: impl AsRef<str>) -> Result<()> {
        writeln!(self.prompter.output(), "{}", message.as_ref())?;
        Ok(())
    }

    fn warn_unknown(&mut self, unknown: &[String]) -> Result<()> {
        if unknown.is_empty() {
            return Ok(());
        }
        self.say(format!("⚠️  Unknown VMs skipped: {}", unknown.join(", ")))
    }

    fn alert(&mut self, context: &str, err: &SlicerError) -> Result<()> {
        if err.is_transport() {
            log_error!("{}: {}", context, err);
        } else if err.is_validation() {
            log_debug!("{}: {}", context, err);
        }
        self.say(format!("❌ {}: {}", context, err))
    }

    pub async fn run(&mut self) -> Result<()> {
        self.say("Type 'help' for the list of commands.")?;
        loop {
            write!(self.prompter.output(), "slicer> ")?;
            self.prompter.output().flush()?;

            let Some(line) = self.prompter.read_line()? else {
                break;
            };
            if line.is_empty() {
                continue;
            }

            match ShellCommand::parse(&line) {
                Ok(ShellCommand::Quit) => break,
                Ok(command) => self.dispatch(command).await?,
                Err(message) => self.say(format!("⚠️  {}", message))?,
            }
        }
        Ok(())
    }

    pub async fn dispatch(&mut self, command: ShellCommand) -> Result<()> {
        match command {
            ShellCommand::Add => match self.controller.add_vm(&mut self.prompter) {
                Ok(Some(name)) => self.say(format!("✅ VM '{}' added", name))?,
                Ok(None) => self.say("VM creation cancelled")?,
                Err(SlicerError::InvalidImageChoice(_)) => {
                    self.say("❌ Invalid image selection. VM creation cancelled.")?
                }
                Err(err) => self.alert("Cannot add VM", &err)?,
            },
            ShellCommand::Select(ids) => {
                let unknown = self.controller.select(&ids);
                self.warn_unknown(&unknown)?;
                let selected = self.controller.session().selection().join(", ");
                self.say(format!("Selected: [{}]", selected))?;
            }
            ShellCommand::Connect(ids) => {
                if !ids.is_empty() {
                    let unknown = self.controller.select(&ids);
                    self.warn_unknown(&unknown)?;
                }
                match self.controller.connect_vms() {
                    Ok(_) => {
                        let pair = self.controller.session().selection().join(" <-> ");
                        self.say(format!("✅ Linked {}", pair))?
                    }
                    Err(err) => self.alert("Cannot connect", &err)?,
                }
            }
            ShellCommand::Disconnect(ids) => {
                if !ids.is_empty() {
                    let unknown = self.controller.select(&ids);
                    self.warn_unknown(&unknown)?;
                }
                match self.controller.disconnect_vms() {
                    Ok(0) => self.say("No link between the selected VMs")?,
                    Ok(count) => self.say(format!("✂️  Removed {} link(s)", count))?,
                    Err(err) => self.alert("Cannot disconnect", &err)?,
                }
            }
            ShellCommand::Delete(ids) => {
                if !ids.is_empty() {
                    let unknown: Vec<&String> = ids
                        .iter()
                        .filter(|id| !self.controller.session().topology.contains(id))
                        .collect();
                    if !unknown.is_empty() {
                        let names: Vec<&str> = unknown.iter().map(|id| id.as_str()).collect();
                        self.say(format!(
                            "❌ Unknown VMs: {}. Nothing deleted.",
                            names.join(", ")
                        ))?;
                        return Ok(());
                    }
                    self.controller.select(&ids);
                }
                let removed = self.controller.delete_vm();
                if removed.is_empty() {
                    self.say("Nothing selected")?;
                } else {
                    self.say(format!("🗑️  Deleted {}", removed.join(", ")))?;
                }
            }
            ShellCommand::Clear => {
                if self.controller.clear_all(&mut self.prompter)? {
                    self.say("Topology cleared")?;
                }
            }
            ShellCommand::Show => {
                let view = render_topology(self.controller.session());
                write!(self.prompter.output(), "{}", view)?;
            }
            ShellCommand::Images => {
                let catalog = &self.controller.session().catalog;
                let listing = if catalog.is_empty() {
                    "No images loaded".to_string()
                } else {
                    catalog
                        .images()
                        .iter()
                        .map(|img| format!("  {:<6} {}", img.id, img.name))
                        .collect::<Vec<_>>()
                        .join("\n")
                };
                self.say(listing)?;
            }
            ShellCommand::Reload => match self.controller.load_images().await {
                Ok(count) => self.say(format!("Loaded {} image(s)", count))?,
                Err(err) => self.alert("Could not load images", &err)?,
            },
            ShellCommand::Slices => match self.controller.list_slices().await {
                Ok(listing) => {
                    if listing.slices.is_empty() {
                        self.say("No slices stored")?;
                    }
                    for slice in listing.slices {
                        self.say(format!(
                            "  {:<6} {:<20} {:<12} {}",
                            slice.slice_id,
                            slice.slice_name.unwrap_or_default(),
                            slice.status.unwrap_or_default(),
                            slice.created_at.unwrap_or_default()
                        ))?;
                    }
                }
                Err(err) => self.alert("Error listing slices", &err)?,
            },
            ShellCommand::Save => match self.controller.save_slice().await {
                Ok(id) => self.say(format!("✅ Slice created (ID: {})", id))?,
                Err(err) => self.alert("Error saving the slice", &err)?,
            },
            ShellCommand::Deploy => match self.controller.deploy_slice().await {
                Ok(_) => self.say("🚀 Deployment started")?,
                Err(err) => self.alert("Error deploying the slice", &err)?,
            },
            ShellCommand::Export(path) => {
                match self.controller.export().save_to_file(&path) {
                    Ok(()) => self.say(format!("✅ Wrote {}", path.display()))?,
                    Err(err) => self.alert("Export failed", &err)?,
                }
            }
            ShellCommand::Import(path) => {
                let imported =
                    SliceFile::from_file(&path).and_then(|file| self.controller.import(&file));
                match imported {
                    Ok(count) => {
                        self.say(format!("✅ Imported {} VM(s) from {}", count, path.display()))?
                    }
                    Err(err) => self.alert("Import failed", &err)?,
                }
            }
            ShellCommand::Help => self.say(HELP)?,
            ShellCommand::Quit => {}
        }
        Ok(())
    }
}
