use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::GcloudConfig;
use crate::error::{GcloudError, GcloudResult};
use crate::index::{IndexDescription, VersionDescription};
use crate::runner::{CommandOutput, CommandRunner, SystemRunner};

/// Build a process-backed adapter after checking that the SDK is installed
/// where `config` says it is.
///
/// Only the parent directory of `sdk_home` has to exist.
pub fn initialize(config: GcloudConfig) -> GcloudResult<Gcloud<SystemRunner>> {
    let parent = match config.sdk_home.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !parent.exists() {
        return Err(GcloudError::SdkHomeMissing(parent));
    }
    Ok(Gcloud::new(config))
}

/// The release operations, expressed as `gcloud` invocations.
#[derive(Debug)]
pub struct Gcloud<R = SystemRunner> {
    config: GcloudConfig,
    runner: R,
}

impl Gcloud<SystemRunner> {
    pub fn new(config: GcloudConfig) -> Self {
        Self::with_runner(config, SystemRunner)
    }
}

impl<R: CommandRunner> Gcloud<R> {
    pub fn with_runner(config: GcloudConfig, runner: R) -> Self {
        Self { config, runner }
    }

    pub fn config(&self) -> &GcloudConfig {
        &self.config
    }

    /// Fails with [`GcloudError::Unavailable`] unless `gcloud --version`
    /// runs and exits cleanly.
    pub fn require_gcloud_to_be_available(&self) -> GcloudResult<()> {
        match self.exec(vec!["--version".into()]) {
            Ok(_) => Ok(()),
            Err(e) => {
                debug!(error = %e, "gcloud version check failed");
                Err(GcloudError::Unavailable)
            }
        }
    }

    /// Upload the indexes described by `index_yaml_path`.
    pub fn update_indexes(&self, index_yaml_path: &Path, app_name: &str) -> GcloudResult<()> {
        if !index_yaml_path.is_file() {
            return Err(GcloudError::MissingIndexFile(index_yaml_path.to_path_buf()));
        }
        self.exec(vec![
            "--quiet".into(),
            "datastore".into(),
            "indexes".into(),
            "create".into(),
            index_yaml_path.to_string_lossy().into_owned(),
            project_flag(app_name),
        ])?;
        info!(app = app_name, path = %index_yaml_path.display(), "uploaded indexes");
        Ok(())
    }

    pub fn get_all_index_descriptions(&self, app_name: &str) -> GcloudResult<Vec<IndexDescription>> {
        let output = self.exec(vec![
            "datastore".into(),
            "indexes".into(),
            "list".into(),
            project_flag(app_name),
            "--format=json".into(),
        ])?;
        Ok(serde_json::from_str(&output.stdout)?)
    }

    /// True when every listed index is `READY`. An empty listing counts as
    /// serving.
    pub fn check_all_indexes_are_serving(&self, app_name: &str) -> GcloudResult<bool> {
        Ok(self
            .get_all_index_descriptions(app_name)?
            .iter()
            .all(|index| index.state.is_ready()))
    }

    /// The version that currently receives traffic on the default service.
    pub fn get_currently_served_version(&self, app_name: &str) -> GcloudResult<String> {
        let service = &self.config.default_service;
        let output = self.exec(vec![
            "app".into(),
            "versions".into(),
            "list".into(),
            "--hide-no-traffic".into(),
            format!("--service={service}"),
            project_flag(app_name),
        ])?;
        parse_served_version(&output.stdout, service)
            .map(str::to_string)
            .ok_or_else(|| {
                GcloudError::UnexpectedOutput(format!(
                    "no serving version for service {service} in version listing"
                ))
            })
    }

    /// The greatest version id deployed for `service_name`.
    ///
    /// Ids are compared as strings, which matches deploy order for the
    /// timestamp-based ids gcloud generates.
    pub fn get_latest_deployed_version(
        &self,
        app_name: &str,
        service_name: &str,
    ) -> GcloudResult<String> {
        let output = self.exec(vec![
            "app".into(),
            "versions".into(),
            "list".into(),
            "--format=json".into(),
            format!("--service={service_name}"),
            project_flag(app_name),
        ])?;
        let versions: Vec<VersionDescription> = serde_json::from_str(&output.stdout)?;
        versions
            .into_iter()
            .map(|version| version.id)
            .max()
            .ok_or_else(|| GcloudError::NoVersions(service_name.to_string()))
    }

    /// Move all default-service traffic to `version`, then move all admin
    /// service traffic to that service's newest version.
    pub fn switch_version(&self, app_name: &str, version: &str) -> GcloudResult<()> {
        self.exec(vec![
            "app".into(),
            "services".into(),
            "set-traffic".into(),
            self.config.default_service.clone(),
            "--splits".into(),
            format!("{version}=1"),
            project_flag(app_name),
        ])?;
        info!(app = app_name, service = %self.config.default_service, version, "switched traffic");

        let admin = &self.config.admin_service;
        let latest_admin = self.get_latest_deployed_version(app_name, admin)?;
        self.exec(vec![
            "--quiet".into(),
            "app".into(),
            "services".into(),
            "set-traffic".into(),
            admin.clone(),
            "--splits".into(),
            format!("{latest_admin}=1"),
            project_flag(app_name),
        ])?;
        info!(app = app_name, service = %admin, version = %latest_admin, "switched traffic");
        Ok(())
    }

    /// Deploy without promoting and without stopping the previous version.
    pub fn deploy_application(
        &self,
        app_yaml_path: &Path,
        app_name: &str,
        version: Option<&str>,
    ) -> GcloudResult<()> {
        let mut args = vec![
            "--quiet".into(),
            "app".into(),
            "deploy".into(),
            app_yaml_path.to_string_lossy().into_owned(),
            "--no-promote".into(),
            "--no-stop-previous-version".into(),
            project_flag(app_name),
        ];
        if let Some(version) = version {
            args.push(format!("--version={version}"));
        }
        self.exec(args)?;
        info!(app = app_name, path = %app_yaml_path.display(), ?version, "deployed application");
        Ok(())
    }

    fn exec(&self, args: Vec<String>) -> GcloudResult<CommandOutput> {
        let program = self.config.gcloud_path.to_string_lossy();
        debug!(program = %program, ?args, "running gcloud");
        let output = self.runner.run(&program, &args)?;
        if !output.is_success() {
            return Err(GcloudError::CommandFailed {
                command: format!("{program} {}", args.join(" ")),
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }
}

fn project_flag(app_name: &str) -> String {
    format!("--project={app_name}")
}

/// Pull the version id out of a plain-text `gcloud app versions list`
/// table: the token that follows `<service>` and two spaces.
fn parse_served_version<'a>(listing: &'a str, service: &str) -> Option<&'a str> {
    let marker = format!("{service}  ");
    let start = listing.find(&marker)? + marker.len();
    let rest = listing[start..].trim_start();
    let end = rest.find(char::is_whitespace)?;
    Some(&rest[..end])
}
