//! Peerbook CLI - Offline inspection and editing of the paired-device registry

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use peerbook_core::{DeviceProfile, DeviceRegistry, FileSettings};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "peerbook")]
#[command(about = "Inspect and edit the Peerbook paired-device registry")]
#[command(version)]
struct Args {
    /// Path to the settings file
    #[arg(short, long, default_value = "peerbook.toml")]
    settings: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Print machine-readable JSON instead of text
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all paired-device profiles
    List,
    /// Add a profile, or update the one matching the same identity
    Add {
        #[arg(long, default_value = "")]
        device_id: String,
        #[arg(long, default_value = "")]
        mac: String,
        #[arg(long, default_value = "")]
        label: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        transport_hint: String,
        /// Disallow audio for this device
        #[arg(long)]
        no_audio: bool,
        /// Disallow notifications for this device
        #[arg(long)]
        no_notifications: bool,
        /// Mark this device as the primary one
        #[arg(long)]
        primary: bool,
    },
    /// Remove profiles by MAC or device id
    Remove {
        #[arg(long)]
        mac: Option<String>,
        #[arg(long)]
        id: Option<String>,
    },
    /// Show a single profile by MAC or device id
    Show {
        #[arg(long)]
        mac: Option<String>,
        #[arg(long)]
        id: Option<String>,
    },
    /// Print the durable preferred session id, if any
    Preferred,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let store = FileSettings::new(&args.settings);
    let registry = DeviceRegistry::new(Box::new(store.clone()));

    match args.command {
        Command::List => {
            let profiles = registry.profiles();
            if args.json {
                println!("{}", serde_json::to_string_pretty(&profiles)?);
            } else if profiles.is_empty() {
                println!("no paired devices");
            } else {
                for profile in &profiles {
                    print_profile(profile);
                }
            }
        }
        Command::Add {
            device_id,
            mac,
            label,
            description,
            transport_hint,
            no_audio,
            no_notifications,
            primary,
        } => {
            registry.add_or_update_profile(DeviceProfile {
                device_id,
                mac_address: mac,
                label,
                description,
                transport_hint,
                allow_audio: !no_audio,
                allow_notifications: !no_notifications,
                is_primary: primary,
            });
            println!("ok");
        }
        Command::Remove { mac, id } => {
            let removed = match (mac, id) {
                (Some(mac), _) => registry.remove_profile_by_mac(&mac),
                (None, Some(id)) => registry.remove_profile_by_id(&id),
                (None, None) => bail!("pass --mac or --id"),
            };
            if !removed {
                bail!("no matching profile");
            }
            println!("removed");
        }
        Command::Show { mac, id } => {
            let profile = match (mac, id) {
                (Some(mac), _) => registry.profile_by_mac(&mac),
                (None, Some(id)) => registry.profile_by_id(&id),
                (None, None) => bail!("pass --mac or --id"),
            };
            let Some(profile) = profile else {
                bail!("no matching profile");
            };
            if args.json {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            } else {
                print_profile(&profile);
            }
        }
        Command::Preferred => {
            use peerbook_core::{SettingsStore, PREFERRED_SESSION_KEY, SETTINGS_NAMESPACE};
            match store.get_string(SETTINGS_NAMESPACE, PREFERRED_SESSION_KEY) {
                Some(session_id) => println!("{session_id}"),
                None => println!("none"),
            }
        }
    }

    Ok(())
}

fn print_profile(profile: &DeviceProfile) {
    let mut flags = Vec::new();
    if profile.is_primary {
        flags.push("primary");
    }
    if !profile.allow_audio {
        flags.push("no-audio");
    }
    if !profile.allow_notifications {
        flags.push("no-notifications");
    }
    println!(
        "{:<20} {:<14} {:<20} {}",
        or_dash(&profile.device_id),
        or_dash(&profile.mac_address),
        or_dash(&profile.label),
        flags.join(",")
    );
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
