use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::{Config, DefaultsConfig, MotionConfig, PresenterConfig};

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load_or_default();
    println!("{} {}", "Config file:".bold(), path.display());
    if !path.exists() {
        println!("{}", "(not created yet, showing defaults)".dimmed());
    }
    println!();
    print!("{}", serde_yaml::to_string(&effective(&config))?);
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    println!("{} {key} = {value}", "Set".green().bold());
    println!("{}", format!("Saved to {}", path.display()).dimmed());
    Ok(())
}

/// The configuration with every default filled in.
fn effective(config: &Config) -> Config {
    let spec = config.window_spec();
    Config {
        defaults: Some(DefaultsConfig {
            theme: Some(config.theme().unwrap_or("light").to_string()),
            start_slide: Some(config.start_slide().unwrap_or(1)),
        }),
        presenter: Some(PresenterConfig {
            width: Some(spec.width),
            height: Some(spec.height),
            initial_push_delay_ms: Some(config.push_delay().as_millis() as u64),
        }),
        motion: Some(MotionConfig {
            reduced: Some(config.reduced_motion()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_config_fills_defaults() {
        let yaml = serde_yaml::to_string(&effective(&Config::default())).unwrap();
        assert!(yaml.contains("theme: light"));
        assert!(yaml.contains("initial_push_delay_ms: 300"));
        assert!(yaml.contains("reduced: false"));
        assert!(yaml.contains("width: 900"));
    }

    #[test]
    fn effective_config_reflects_settings() {
        let mut config = Config::default();
        config.set("defaults.theme", "dark").unwrap();
        config.set("motion.reduced", "true").unwrap();
        let yaml = serde_yaml::to_string(&effective(&config)).unwrap();
        assert!(yaml.contains("theme: dark"));
        assert!(yaml.contains("reduced: true"));
    }
}
