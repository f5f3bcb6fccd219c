use std::collections::BTreeMap;

use serde::Serialize;

use crate::cmd::EnvinfoArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct PlatformInfo {
    os: String,
    arch: String,
}

#[derive(Serialize)]
struct EnvInfoOutput {
    schema_id: &'static str,
    version: String,
    target: String,
    platform: PlatformInfo,
    features: Vec<String>,
    environment: BTreeMap<String, Option<String>>,
}

/// Environment variables the CLI reads as flag fallbacks.
const ENV_VARS: [&str; 5] = [
    "SERFRAME_CATALOG",
    "SERFRAME_IDLE_TIMEOUT",
    "SERFRAME_POLL_INTERVAL",
    "SERFRAME_LOG_LEVEL",
    "RUST_LOG",
];

pub fn run(_args: EnvinfoArgs, format: OutputFormat) -> CliResult<i32> {
    let environment = ENV_VARS
        .iter()
        .map(|name| (name.to_string(), std::env::var(name).ok()))
        .collect();

    let output = EnvInfoOutput {
        schema_id: "https://schemas.3leaps.dev/serframe/cli/v1/envinfo.schema.json",
        version: env!("CARGO_PKG_VERSION").to_string(),
        target: target_triple(),
        platform: PlatformInfo {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        },
        features: active_features(),
        environment,
    };

    print_envinfo(&output, format);
    Ok(SUCCESS)
}

fn target_triple() -> String {
    if let Some(target) = option_env!("SERFRAME_BUILD_TARGET") {
        return target.to_string();
    }
    fallback_triple(std::env::consts::ARCH, std::env::consts::OS, target_env())
}

fn target_env() -> &'static str {
    if cfg!(target_env = "musl") {
        "musl"
    } else if cfg!(target_env = "gnu") {
        "gnu"
    } else if cfg!(target_env = "msvc") {
        "msvc"
    } else {
        ""
    }
}

/// Known host triples only; anything else is reported as `<arch>-unknown-<os>`.
fn fallback_triple(arch: &str, os: &str, env: &str) -> String {
    match (arch, os, env) {
        ("aarch64" | "x86_64", "macos", _) => format!("{arch}-apple-darwin"),
        ("aarch64" | "x86_64", "linux", "gnu" | "musl") => format!("{arch}-unknown-linux-{env}"),
        ("aarch64" | "x86_64", "windows", "msvc" | "gnu") => format!("{arch}-pc-windows-{env}"),
        (arch, os, _) => format!("{arch}-unknown-{os}"),
    }
}

fn print_envinfo(output: &EnvInfoOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
        ),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("serframe environment\n");
            println!("  Version:    {}", output.version);
            println!("  Target:     {}", output.target);
            println!(
                "  Platform:   {} ({})",
                output.platform.os, output.platform.arch
            );
            println!("  Features:   {}", output.features.join(", "));
            println!("\n  Environment:");
            for (k, v) in &output.environment {
                println!("    {:<24} {}", k, v.as_deref().unwrap_or("(not set)"));
            }
        }
        OutputFormat::Raw => println!("{}", output.version),
    }
}

fn active_features() -> Vec<String> {
    let mut features = vec!["cli".to_string()];
    if cfg!(feature = "serial") {
        features.push("serial".to_string());
    }
    features
}
