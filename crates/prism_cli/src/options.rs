use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};

/// Command-line overrides. Anything left `None` falls back to the settings
/// file, then to the built-in defaults.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CliOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fov: Option<f32>,
    pub output: Option<PathBuf>,
    pub mesh: Option<PathBuf>,
    pub threads: Option<usize>,
    pub config: Option<PathBuf>,
    pub help: bool,
}

impl CliOptions {
    pub fn message() -> &'static str {
        r#"prism [options]
        --width <pixels>
        --height <pixels>
        --fov <degrees>
        --output <file.ppm>
        --mesh <file.obj>
        --threads <count>
        --config <settings.json>
        --help
        "#
    }
}

/// Parse `args`, including the program name in `args[0]`.
pub fn parse_args(args: Vec<String>) -> Result<CliOptions> {
    let mut pairs: HashMap<String, Option<String>> = HashMap::new();
    let mut args = args.into_iter().rev().collect::<Vec<_>>();
    args.pop(); // Removes args[0]

    while let Some(key) = args.pop() {
        if !key.starts_with("--") {
            bail!("Unrecognized argument {}", key);
        }
        let value = match args.last() {
            Some(value) if !value.starts_with("--") => args.pop(),
            _ => None,
        };
        pairs.insert(key, value);
    }

    let mut options = CliOptions::default();
    for (key, value) in pairs {
        match key.as_str() {
            "--width" => options.width = Some(parse_value(&key, value)?),
            "--height" => options.height = Some(parse_value(&key, value)?),
            "--fov" => options.fov = Some(parse_value(&key, value)?),
            "--threads" => options.threads = Some(parse_value(&key, value)?),
            "--output" => options.output = Some(parse_value(&key, value)?),
            "--mesh" => options.mesh = Some(parse_value(&key, value)?),
            "--config" => options.config = Some(parse_value(&key, value)?),
            "--help" => options.help = true,
            _ => bail!("Unrecognized option {}", key),
        }
    }
    Ok(options)
}

fn parse_value<T>(key: &str, value: Option<String>) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = value.ok_or_else(|| anyhow!("{} expects a value", key))?;
    value
        .parse()
        .with_context(|| format!("Invalid value '{}' for {}", value, key))
}
