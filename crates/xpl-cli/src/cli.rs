use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "xpl",
    about = "Exploration Ledger release tooling for Google Cloud",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML file with gcloud settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Google Cloud project, overriding the config file
    #[arg(long, global = true)]
    pub project: Option<String>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check that gcloud is installed
    Check,
    /// Upload or inspect datastore indexes
    Indexes(IndexesArgs),
    /// Look up deployed App Engine versions
    Versions(VersionsArgs),
    /// Move traffic to a deployed version
    Switch(SwitchArgs),
    /// Deploy a service without promoting it
    Deploy(DeployArgs),
    /// Print the effective configuration
    Config,
}

#[derive(Args)]
pub struct IndexesArgs {
    #[command(subcommand)]
    pub action: IndexesAction,
}

#[derive(Subcommand)]
pub enum IndexesAction {
    /// Upload the indexes in an index.yaml file
    Update { path: PathBuf },
    /// List uploaded indexes
    List,
    /// Report whether every index is serving
    Status,
}

#[derive(Args)]
pub struct VersionsArgs {
    #[command(subcommand)]
    pub action: VersionsAction,
}

#[derive(Subcommand)]
pub enum VersionsAction {
    /// Version receiving traffic on the default service
    Serving,
    /// Most recently deployed version of a service
    Latest {
        #[arg(long)]
        service: Option<String>,
    },
}

#[derive(Args)]
pub struct SwitchArgs {
    pub version: String,
}

#[derive(Args)]
pub struct DeployArgs {
    pub app_yaml: PathBuf,
    #[arg(long)]
    pub version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_check() {
        let cli = Cli::try_parse_from(["xpl", "check"]).unwrap();
        assert!(matches!(cli.command, Command::Check));
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.config.is_none());
    }

    #[test]
    fn parse_indexes_update() {
        let cli = Cli::try_parse_from(["xpl", "indexes", "update", "index.yaml"]).unwrap();
        match cli.command {
            Command::Indexes(IndexesArgs {
                action: IndexesAction::Update { path },
            }) => assert_eq!(path, PathBuf::from("index.yaml")),
            _ => panic!("expected indexes update"),
        }
    }

    #[test]
    fn parse_indexes_status_with_project() {
        let cli =
            Cli::try_parse_from(["xpl", "indexes", "status", "--project", "test-app"]).unwrap();
        assert_eq!(cli.project.as_deref(), Some("test-app"));
        assert!(matches!(
            cli.command,
            Command::Indexes(IndexesArgs {
                action: IndexesAction::Status
            })
        ));
    }

    #[test]
    fn parse_versions_latest_service() {
        let cli = Cli::try_parse_from(["xpl", "versions", "latest", "--service", "admin"]).unwrap();
        match cli.command {
            Command::Versions(VersionsArgs {
                action: VersionsAction::Latest { service },
            }) => assert_eq!(service.as_deref(), Some("admin")),
            _ => panic!("expected versions latest"),
        }
    }

    #[test]
    fn parse_switch() {
        let cli = Cli::try_parse_from(["xpl", "switch", "2-9-3"]).unwrap();
        match cli.command {
            Command::Switch(args) => assert_eq!(args.version, "2-9-3"),
            _ => panic!("expected switch"),
        }
    }

    #[test]
    fn parse_deploy_with_version() {
        let cli =
            Cli::try_parse_from(["xpl", "deploy", "app.yaml", "--version", "2-9-3"]).unwrap();
        match cli.command {
            Command::Deploy(args) => {
                assert_eq!(args.app_yaml, PathBuf::from("app.yaml"));
                assert_eq!(args.version.as_deref(), Some("2-9-3"));
            }
            _ => panic!("expected deploy"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from([
            "xpl", "--verbose", "--format", "json", "--config", "xpl.toml", "config",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.config, Some(PathBuf::from("xpl.toml")));
    }

    #[test]
    fn switch_requires_version() {
        assert!(Cli::try_parse_from(["xpl", "switch"]).is_err());
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["xpl", "--format", "yaml", "check"]).is_err());
    }
}
