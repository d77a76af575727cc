//! One-shot inspection commands

use super::CommandResult;
use anyhow::{bail, Context as _};
use futures::future::join_all;
use std::path::Path;
use virjoy::config::AppConfig;
use virjoy::context::{build_bridge, load_profiles};
use virjoy::headtrack;

/// List profiles, or print one as JSON
pub fn profiles(config: &AppConfig, id: Option<&str>) -> CommandResult {
    let profiles = load_profiles(config)?;
    match id {
        Some(id) => {
            let profile = profiles
                .find(id)
                .with_context(|| format!("Unknown profile '{id}'"))?;
            println!("{}", serde_json::to_string_pretty(&*profile)?);
        }
        None => {
            for profile in profiles.all_profiles() {
                let marker = if profile.id == profiles.default_id() { "*" } else { " " };
                println!(
                    "{} {:<12} {:<24} {:?}",
                    marker, profile.id, profile.name, profile.family
                );
            }
        }
    }
    Ok(())
}

/// Read every mapped variable once
pub async fn vars(config: &AppConfig, profile: Option<&str>) -> CommandResult {
    let profiles = load_profiles(config)?;
    let bridge = build_bridge(config)?;
    let ids: Vec<String> = match profile {
        Some(id) => vec![profiles.resolve(Some(id)).id.clone()],
        None => {
            let mut ids: Vec<String> = bridge.map().profile_ids().map(str::to_string).collect();
            let default = profiles.default_id().to_string();
            if !ids.contains(&default) {
                ids.push(default);
            }
            ids
        }
    };

    let results = join_all(ids.iter().map(|id| bridge.read_all(id))).await;
    for (id, result) in ids.iter().zip(results) {
        println!("[{id}]");
        match result {
            Ok(values) => {
                for (key, value) in values {
                    println!("  {key:<24} {value}");
                }
            }
            Err(e) => println!("  error: {} ({})", e.code(), e),
        }
    }
    Ok(())
}

/// Decode a head-track packet from hex
pub fn decode(hex: &str) -> CommandResult {
    let bytes = parse_hex(hex)?;
    let (layout, pose) = headtrack::decode(&bytes)?;
    println!("Layout: {:?} ({} bytes)", layout, bytes.len());
    println!(
        "  pitch {:>10.2}  yaw {:>10.2}  roll {:>10.2}",
        pose.pitch, pose.yaw, pose.roll
    );
    println!(
        "  x     {:>10.2}  y   {:>10.2}  z    {:>10.2}",
        pose.x, pose.y, pose.z
    );
    Ok(())
}

/// Print the effective config, optionally writing it back
pub fn config(config: &AppConfig, path: &Path, write: bool) -> CommandResult {
    print!("{}", toml::to_string_pretty(config)?);
    if write {
        config.save(path)?;
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}

/// Hex digits with optional `0x` prefixes and separators
fn parse_hex(input: &str) -> anyhow::Result<Vec<u8>> {
    let digits: String = input
        .split(|c: char| c.is_whitespace() || c == ':' || c == ',')
        .map(|chunk| chunk.trim_start_matches("0x"))
        .collect();
    if !digits.is_ascii() {
        bail!("invalid hex input");
    }
    if digits.len() % 2 != 0 {
        bail!("odd number of hex digits");
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .with_context(|| format!("invalid hex byte {:?}", &digits[i..i + 2]))
        })
        .collect()
}
