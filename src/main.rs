//! compose-dup - run multiple instances of a set of containers via docker-compose
//!
//! This is the main CLI entry point.

use clap::{Parser, Subcommand};
use compose_dup::compose::config::{
    config_path, OverrideConfig, Settings, DEFAULT_COMPOSE_FILE, DEFAULT_SETTINGS_FILE,
};
use compose_dup::compose::log::{expand_to_file, read_log};
use compose_dup::compose::DocumentAssembler;
use compose_dup::error::Result;
use compose_dup::runtime::docker::{create_image_template, DEFAULT_EXEC_SHELL};
use compose_dup::runtime::{ContainerRuntime, DockerCli, Replayer, SystemShell};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// compose-dup - run multiple instances of a set of containers on different networks
#[derive(Parser)]
#[command(name = "compose-dup")]
#[command(version)]
#[command(
    about = "Run multiple instances of a set of Docker containers on different networks via docker-compose",
    long_about = None
)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'D', long, global = true)]
    debug: bool,

    /// Settings file, created with defaults if missing
    #[arg(long, global = true, default_value = DEFAULT_SETTINGS_FILE)]
    settings: PathBuf,

    /// Compose file written by `run` and read by `ex`
    #[arg(long, global = true, default_value = DEFAULT_COMPOSE_FILE)]
    compose_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand a config file and run it via docker-compose up
    Run {
        /// Config file, with or without the .yml extension
        config_file: String,
        /// Number of instances to create (1-99)
        #[arg(allow_negative_numbers = true)]
        num: i64,
        /// Build images before running
        #[arg(short, long)]
        build: bool,
        /// Run in background
        #[arg(short, long)]
        detach: bool,
        /// Do not stop and remove all containers and networks before running
        #[arg(short, long)]
        restart: bool,
    },

    /// Print the expanded document without writing or running it
    Expand {
        /// Config file, with or without the .yml extension
        config_file: String,
        /// Number of instances to create (1-99)
        #[arg(allow_negative_numbers = true)]
        num: i64,
        /// Print JSON instead of YAML
        #[arg(long)]
        json: bool,
    },

    /// Execute scripts for the currently running containers
    Ex {
        /// Print the commands instead of running them
        #[arg(long)]
        dry_run: bool,
    },

    /// Run an image as a single container
    Runi {
        /// Path of the image's Dockerfile directory
        image_name: String,
        /// Extra arguments passed to docker run
        #[arg(short, long, default_value = "", allow_hyphen_values = true)]
        options: String,
        /// Build the image before running
        #[arg(short, long)]
        build: bool,
        /// Do not stop and remove all containers and networks before running
        #[arg(short, long)]
        restart: bool,
    },

    /// Stop and remove all containers and networks
    Stop,

    /// Remove all images with --force
    Clear,

    /// Create a config file template
    Mkc {
        /// Config file, with or without the .yml extension
        config_file: String,
    },

    /// Create an image template in the image directory
    Mki {
        /// Name of the folder to create the image in
        image_name: String,
    },

    /// Get a shell in a running container
    Shell {
        /// Container name, append -<n> for duplicated services
        container_name: String,
        /// Shell to start
        #[arg(long, default_value = DEFAULT_EXEC_SHELL)]
        shell: String,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = execute(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn execute(cli: Cli) -> Result<()> {
    let settings = Settings::ensure_default(&cli.settings)?;
    let docker = DockerCli::new(SystemShell);

    match cli.command {
        Commands::Run {
            config_file,
            num,
            build,
            detach,
            restart,
        } => {
            expand_to_file(&settings, &config_path(&config_file), num, &cli.compose_file)?;

            if !restart {
                docker.stop()?;
            }
            docker.start(&cli.compose_file, build, detach)?;
        }

        Commands::Expand {
            config_file,
            num,
            json,
        } => {
            let overrides = OverrideConfig::load(&config_path(&config_file))?;
            let assembly = DocumentAssembler::new(&settings).assemble(&overrides, num)?;

            if json {
                println!("{}", assembly.document.to_json()?);
            } else {
                print!("{}", assembly.document.to_yaml()?);
            }
        }

        Commands::Ex { dry_run } => {
            let log = read_log(&cli.compose_file)?;
            let variables = settings.variable_pairs();
            let commands = log.commands(&variables);

            if dry_run {
                for command in commands {
                    println!("{}", command);
                }
            } else {
                let report = Replayer::new(docker.shell(), settings.expansion.replay).run(commands)?;
                tracing::info!(
                    "Replayed {} commands, {} failed",
                    report.executed.len(),
                    report.failed.len()
                );
            }
        }

        Commands::Runi {
            image_name,
            options,
            build,
            restart,
        } => {
            if !restart {
                docker.stop()?;
            }
            if build {
                docker.build_image(&image_name)?;
            }
            docker.run_image(&image_name, &options)?;
        }

        Commands::Stop => {
            docker.stop()?;
        }

        Commands::Clear => {
            docker.clear_images()?;
        }

        Commands::Mkc { config_file } => {
            let path = config_path(&config_file);
            OverrideConfig::write_template(&path)?;
            println!("Created {}", path.display());
        }

        Commands::Mki { image_name } => {
            let dockerfile = create_image_template(&settings.image_dir, &image_name)?;
            println!("Created {}", dockerfile.display());
        }

        Commands::Shell {
            container_name,
            shell,
        } => {
            docker.exec_interactive(&container_name, &shell)?;
        }
    }

    Ok(())
}
