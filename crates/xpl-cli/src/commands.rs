use anyhow::Context;
use colored::Colorize;
use serde_json::json;
use xpl_gcloud::{initialize, Gcloud, GcloudConfig, SystemRunner};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let format = cli.format;
    match cli.command {
        Command::Check => cmd_check(&config),
        Command::Indexes(args) => cmd_indexes(&config, format, args),
        Command::Versions(args) => cmd_versions(&config, format, args),
        Command::Switch(args) => cmd_switch(&config, args),
        Command::Deploy(args) => cmd_deploy(&config, args),
        Command::Config => cmd_config(&config, format),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<GcloudConfig> {
    let config = match &cli.config {
        Some(path) => GcloudConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => GcloudConfig::default(),
    };
    Ok(config.with_project(cli.project.clone()))
}

fn connect(config: &GcloudConfig) -> anyhow::Result<Gcloud<SystemRunner>> {
    Ok(initialize(config.clone())?)
}

fn project(config: &GcloudConfig) -> anyhow::Result<&str> {
    config
        .project
        .as_deref()
        .context("no project given; pass --project or set `project` in the config file")
}

fn cmd_check(config: &GcloudConfig) -> anyhow::Result<()> {
    connect(config)?.require_gcloud_to_be_available()?;
    println!("{} gcloud is available", "✓".green().bold());
    Ok(())
}

fn cmd_indexes(config: &GcloudConfig, format: OutputFormat, args: IndexesArgs) -> anyhow::Result<()> {
    let app = project(config)?;
    let gcloud = connect(config)?;
    match args.action {
        IndexesAction::Update { path } => {
            gcloud.update_indexes(&path, app)?;
            println!("{} Uploaded indexes from {}", "✓".green().bold(), path.display());
        }
        IndexesAction::List => {
            let indexes = gcloud.get_all_index_descriptions(app)?;
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&indexes)?),
                OutputFormat::Text => {
                    if indexes.is_empty() {
                        println!("No indexes.");
                    }
                    for index in &indexes {
                        let state: String = index.state.clone().into();
                        let state = if index.state.is_ready() {
                            state.green()
                        } else {
                            state.yellow()
                        };
                        let properties: Vec<&str> =
                            index.properties.iter().map(|p| p.name.as_str()).collect();
                        println!(
                            "{}  {}  {}  ({})",
                            index.index_id.as_deref().unwrap_or("-").dimmed(),
                            index.kind.as_deref().unwrap_or("-").bold(),
                            state,
                            properties.join(", ")
                        );
                    }
                }
            }
        }
        IndexesAction::Status => {
            let serving = gcloud.check_all_indexes_are_serving(app)?;
            match format {
                OutputFormat::Json => println!("{}", json!({ "serving": serving })),
                OutputFormat::Text if serving => {
                    println!("{} All indexes are serving", "✓".green().bold())
                }
                OutputFormat::Text => {
                    println!("{} Some indexes are not serving yet", "✗".red().bold())
                }
            }
        }
    }
    Ok(())
}

fn cmd_versions(config: &GcloudConfig, format: OutputFormat, args: VersionsArgs) -> anyhow::Result<()> {
    let app = project(config)?;
    let gcloud = connect(config)?;
    let (service, version) = match args.action {
        VersionsAction::Serving => (
            config.default_service.clone(),
            gcloud.get_currently_served_version(app)?,
        ),
        VersionsAction::Latest { service } => {
            let service = service.unwrap_or_else(|| config.default_service.clone());
            let version = gcloud.get_latest_deployed_version(app, &service)?;
            (service, version)
        }
    };
    match format {
        OutputFormat::Json => {
            println!("{}", json!({ "service": service, "version": version }))
        }
        OutputFormat::Text => println!("{}: {}", service.bold(), version.yellow()),
    }
    Ok(())
}

fn cmd_switch(config: &GcloudConfig, args: SwitchArgs) -> anyhow::Result<()> {
    let app = project(config)?;
    connect(config)?.switch_version(app, &args.version)?;
    println!(
        "{} Switched {} to {}",
        "✓".green().bold(),
        config.default_service.bold(),
        args.version.yellow()
    );
    Ok(())
}

fn cmd_deploy(config: &GcloudConfig, args: DeployArgs) -> anyhow::Result<()> {
    let app = project(config)?;
    connect(config)?.deploy_application(&args.app_yaml, app, args.version.as_deref())?;
    println!(
        "{} Deployed {} to {}",
        "✓".green().bold(),
        args.app_yaml.display(),
        app.bold()
    );
    Ok(())
}

fn cmd_config(config: &GcloudConfig, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Text => print!("{}", config.to_toml_string()?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn project_flag_overrides_default_config() {
        let cli = Cli::try_parse_from(["xpl", "--project", "test-app", "config"]).unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(project(&config).unwrap(), "test-app");
    }

    #[test]
    fn missing_project_is_reported() {
        let cli = Cli::try_parse_from(["xpl", "versions", "serving"]).unwrap();
        let config = load_config(&cli).unwrap();
        let err = project(&config).unwrap_err();
        assert!(err.to_string().contains("--project"));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let cli =
            Cli::try_parse_from(["xpl", "--config", "/nonexistent/xpl.toml", "config"]).unwrap();
        assert!(load_config(&cli).is_err());
    }
}
