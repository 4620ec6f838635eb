use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use slicer::{
    Controller, HttpBackend, SlicePayload,
    config::SlicerConfig,
    logger,
    prompt::StdinPrompter,
    shell::Shell,
    slicefile::SliceFile,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "slicer")]
#[command(about = "Compose virtual machine slices and hand them to the slice backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides the config file)
    #[arg(long, env = "SLICER_URL")]
    url: Option<String>,

    /// Bearer token for the backend (overrides the config file)
    #[arg(long, env = "SLICER_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose a slice interactively
    Compose,
    /// Save (and optionally deploy) the slice described by a slice file
    Apply {
        /// Slice file (TOML)
        file: PathBuf,
        /// Deploy right after a successful save
        #[arg(long)]
        deploy: bool,
        /// Print the create request instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
    /// List the images offered by the backend
    Images,
    /// List slices stored on the backend
    Slices,
    /// Log in and store the access token in the config file
    Login {
        #[arg(short, long)]
        username: String,
    },
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        unsafe {
            std::env::set_var("RUST_LOG", "slicer=debug");
        }
    }
    logger::init_logger();

    let config_path = cli.config.clone().unwrap_or_else(SlicerConfig::default_path);

    if let Commands::Init { force } = cli.command {
        if config_path.exists() && !force {
            bail!(
                "{} already exists, pass --force to overwrite it",
                config_path.display()
            );
        }
        SlicerConfig::default().save_to_file(&config_path)?;
        println!("✅ Wrote {}", config_path.display());
        return Ok(());
    }

    let mut config = if config_path.exists() {
        SlicerConfig::from_file(&config_path)
            .with_context(|| format!("loading {}", config_path.display()))?
    } else {
        logger::warn!(
            "Config not found at {}, using defaults",
            config_path.display()
        );
        SlicerConfig::default()
    };
    config = config.with_overrides(cli.url, cli.token);

    let backend = HttpBackend::new(&config.backend)?;
    logger::debug!("Backend at {}", backend.base_url());

    match cli.command {
        Commands::Compose => {
            let mut controller = Controller::new(backend, &config);
            if controller.load_images().await.is_err() {
                println!("⚠️  Could not load images from the backend.");
            }

            let mut shell = Shell::new(&mut controller, StdinPrompter::stdio());
            shell.run().await?;
        }
        Commands::Apply {
            file,
            deploy,
            dry_run,
        } => {
            let slice_file = SliceFile::from_file(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            if let Some(name) = &slice_file.name {
                config.slice.name = name.clone();
            }

            let mut controller = Controller::new(backend, &config);
            controller
                .load_images()
                .await
                .context("could not load images from the backend")?;
            let count = controller.import(&slice_file)?;
            println!("Loaded {} VM(s) from {}", count, file.display());

            if dry_run {
                let session = controller.session();
                let payload =
                    SlicePayload::from_topology(session.sync.slice_name(), &session.topology);
                println!("{}", serde_json::to_string_pretty(&payload)?);
                return Ok(());
            }

            let slice_id = controller.save_slice().await?;
            println!("✅ Slice created (ID: {})", slice_id);

            if deploy {
                let result = controller.deploy_slice().await?;
                println!("🚀 Deployment started");
                logger::debug!("Deployment result: {}", result.result);
            }
        }
        Commands::Images => {
            let mut controller = Controller::new(backend, &config);
            controller.load_images().await?;
            println!("{:<6} {}", "ID", "NAME");
            for image in controller.session().catalog.images() {
                println!("{:<6} {}", image.id, image.name);
            }
        }
        Commands::Slices => {
            let controller = Controller::new(backend, &config);
            let listing = controller.list_slices().await?;
            if let Some(user) = &listing.user {
                println!("Slices owned by {}:\n", user);
            }
            println!(
                "{:<6} {:<20} {:<12} {:<20} {}",
                "ID", "NAME", "STATUS", "CREATED", "VMS"
            );
            for slice in listing.slices {
                println!(
                    "{:<6} {:<20} {:<12} {:<20} {}",
                    slice.slice_id,
                    slice.slice_name.unwrap_or_default(),
                    slice.status.unwrap_or_default(),
                    slice.created_at.unwrap_or_default(),
                    slice.vms.unwrap_or_default()
                );
            }
        }
        Commands::Login { username } => {
            let controller = Controller::new(backend, &config);
            let mut prompter = StdinPrompter::stdio();
            match controller.login(&username, &mut prompter).await? {
                Some(response) => {
                    SlicerConfig::store_token(&config_path, &response.access_token)
                        .with_context(|| format!("saving {}", config_path.display()))?;
                    println!(
                        "✅ Logged in as {}, token saved to {}",
                        username,
                        config_path.display()
                    );
                }
                None => println!("Login cancelled"),
            }
        }
        Commands::Init { .. } => {}
    }

    Ok(())
}
