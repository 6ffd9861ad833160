//! Registry Bind CLI
//!
//! Resolves the configured profiles of an API registry and writes one JSON
//! model per profile for binding emitters.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use registry_bind::config::OutputFormat;
use registry_bind::{BindCache, BindConfig, Pipeline, ResolvedProfile, TypeMap, UnmappedPolicy};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "registry-bind")]
#[command(about = "Resolve API registry profiles for binding generators")]
struct Cli {
    /// Configuration file layered over bind.toml and BIND__* variables
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve profiles and write their models
    Resolve {
        /// Only resolve these profiles (default: all configured)
        #[arg(short, long = "profile")]
        profiles: Vec<String>,

        /// Output directory (overrides [output] dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fail profiles that use types no typemap covers
        #[arg(long)]
        strict: bool,
    },

    /// Inspect type tables
    Typemap {
        #[command(subcommand)]
        command: TypemapCommands,
    },

    /// Inspect or create configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum TypemapCommands {
    /// Parse type tables and report their entries
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Write a default configuration file
    Init {
        #[arg(default_value = "bind.toml")]
        path: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Resolve {
            profiles,
            output,
            strict,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(dir) = output {
                config.output.dir = dir;
            }
            if strict {
                config.mapping.unmapped = UnmappedPolicy::Strict;
            }
            resolve(&config, &profiles)
        }

        Commands::Typemap {
            command: TypemapCommands::Check { files },
        } => {
            let mut failed = 0;
            for file in &files {
                match TypeMap::read_path(file) {
                    Ok(map) => println!("✅ {} - {} entries", file.display(), map.len()),
                    Err(e) => {
                        println!("❌ {}", e);
                        failed += 1;
                    }
                }
            }

            if failed > 0 {
                bail!("{} of {} typemaps failed to parse", failed, files.len());
            }
            Ok(())
        }

        Commands::Config {
            command: ConfigCommands::Show,
        } => {
            let config = load_config(cli.config.as_deref())?;
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }

        Commands::Config {
            command: ConfigCommands::Init { path },
        } => {
            if path.exists() {
                bail!("{} already exists", path.display());
            }
            BindConfig::default()
                .save(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<BindConfig> {
    BindConfig::load_from(path).context("Failed to load configuration")
}

fn resolve(config: &BindConfig, only: &[String]) -> anyhow::Result<()> {
    for name in only {
        if config.profile(name).is_none() {
            bail!("No profile named '{}' is configured", name);
        }
    }

    let settings: Vec<_> = config
        .profile_settings()
        .into_iter()
        .filter(|settings| only.is_empty() || only.contains(&settings.name))
        .collect();

    let cache = BindCache::new();
    let results = Pipeline::new(&cache).run_all(&settings);

    let out_dir = config.output_dir();
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let mut failed = 0;
    for (name, result) in results {
        match result {
            Ok(profile) => {
                let path = write_profile(&profile, out_dir, config.output.format)?;
                let version = profile
                    .max_version
                    .as_ref()
                    .or_else(|| profile.registry.latest_version())
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "✅ {} (up to {}) - {} enums, {} groups, {} functions -> {}",
                    name,
                    version,
                    profile.registry.enums().len(),
                    profile.registry.groups().len(),
                    profile.functions.len(),
                    path.display()
                );
                for item in profile.diagnostics.warnings() {
                    println!("   {}", item);
                }
            }
            Err(e) => {
                println!("❌ {} - {}", name, e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} profiles failed", failed, settings.len());
    }
    Ok(())
}

fn write_profile(profile: &ResolvedProfile, dir: &Path, format: OutputFormat) -> anyhow::Result<PathBuf> {
    let json = match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(profile)?,
        OutputFormat::Compact => serde_json::to_string(profile)?,
    };

    let path = dir.join(format!("{}.json", profile.name));
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
