//! CLI route: single route table and run context. Dispatches to the engine and presentation.

use crate::bootstrap::{ensure_layout, initialize, ProjectLayout};
use crate::cli::help::{command_name, is_mutating};
use crate::cli::output::{EXIT_DOWNLOAD_FAILED, EXIT_SUCCESS};
use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_init_result, format_list_json, format_list_text, format_manifest_install,
    format_status_json, format_status_text, format_uninstall, format_url_install, Style,
};
use crate::config::{ConfigLoader, DimConfig};
use crate::error::DimError;
use crate::fetch::HttpFetcher;
use crate::preprocess::{Directive, EncodingPreprocessor};
use crate::reconcile::engine::log_consistency;
use crate::reconcile::{InstallMode, ReconcileEngine};
use crate::store::{JsonLockStore, JsonManifestStore};
use std::future::Future;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Text for stdout plus the process exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    pub exit_code: i32,
}

impl CommandOutput {
    fn success(text: String) -> Self {
        Self {
            text,
            exit_code: EXIT_SUCCESS,
        }
    }
}

/// Runtime context for CLI execution: project root, loaded config and resolved layout.
/// Built from the root path and optional config path using ConfigLoader only.
pub struct RunContext {
    config: DimConfig,
    layout: ProjectLayout,
    style: Style,
}

impl RunContext {
    /// Create run context from project root and optional config path.
    pub fn new(project_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, DimError> {
        let project_root = dunce::canonicalize(&project_root).map_err(|e| {
            DimError::ConfigError(format!(
                "Project root {} is not accessible: {}",
                project_root.display(),
                e
            ))
        })?;

        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&project_root)?,
        };
        let layout = ProjectLayout::from_config(&project_root, &config.paths);
        let color = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();

        Ok(Self {
            config,
            layout,
            style: Style::new(color),
        })
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.layout.root
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<CommandOutput, DimError> {
        let started = Instant::now();
        let name = command_name(command);
        debug!(command = name, root = %self.layout.root.display(), "Command started");

        let result = self.execute_inner(command);
        let duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(output) => info!(
                command = name,
                exit_code = output.exit_code,
                duration_ms,
                "Command finished"
            ),
            Err(e) => warn!(command = name, error = %e, duration_ms, "Command failed"),
        }
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<CommandOutput, DimError> {
        if matches!(command, Commands::Install { .. } | Commands::Update { .. }) {
            ensure_layout(&self.layout)?;
        }

        self.with_engine(|engine| {
            if is_mutating(command) {
                log_consistency(&engine.check_consistency()?);
            }

            match command {
                Commands::Install { url, preprocess } => {
                    self.run_install(engine, url.as_deref(), preprocess, InstallMode::Install)
                }
                Commands::Update { url, preprocess } => {
                    self.run_install(engine, url.as_deref(), preprocess, InstallMode::Update)
                }
                Commands::Uninstall { url } => {
                    let outcome = engine.uninstall(url)?;
                    Ok(CommandOutput::success(format_uninstall(&outcome, self.style)))
                }
                Commands::List { format } => {
                    let listed = engine.list()?;
                    let text = if format == "json" {
                        format_list_json(&listed)
                    } else {
                        format_list_text(&listed, self.style)
                    };
                    Ok(CommandOutput::success(text))
                }
                Commands::Status { format } => {
                    let report = engine.check_consistency()?;
                    let text = if format == "json" {
                        format_status_json(&report)
                    } else {
                        format_status_text(&report, self.style)
                    };
                    Ok(CommandOutput::success(text))
                }
                Commands::Init { force } => {
                    let result = initialize(&self.layout, *force)?;
                    Ok(CommandOutput::success(format_init_result(
                        &result, *force, self.style,
                    )))
                }
            }
        })
    }

    fn run_install(
        &self,
        engine: &ReconcileEngine<'_>,
        url: Option<&str>,
        preprocess: &[String],
        mode: InstallMode,
    ) -> Result<CommandOutput, DimError> {
        match url {
            Some(url) => {
                let directives = Directive::parse_all(preprocess);
                let outcome = block_on(engine.install_url(url, directives, mode))??;
                Ok(CommandOutput::success(format_url_install(&outcome, self.style)))
            }
            None => {
                if !preprocess.is_empty() {
                    warn!("Preprocess directives are ignored without a URL; manifest entries keep their own");
                }
                let outcome = block_on(engine.install_manifest(mode))??;
                let exit_code = if outcome.failures().is_empty() {
                    EXIT_SUCCESS
                } else {
                    EXIT_DOWNLOAD_FAILED
                };
                Ok(CommandOutput {
                    text: format_manifest_install(&outcome, mode.is_update(), self.style),
                    exit_code,
                })
            }
        }
    }

    /// Store handles and capabilities live for one command.
    fn with_engine<R>(
        &self,
        f: impl FnOnce(&ReconcileEngine<'_>) -> Result<R, DimError>,
    ) -> Result<R, DimError> {
        let manifest = JsonManifestStore::new(&self.layout.manifest_path);
        let lock = JsonLockStore::new(&self.layout.lock_path);
        let fetcher = HttpFetcher::new(self.layout.data_dir.clone(), &self.config.download)?;
        let preprocessor = EncodingPreprocessor::new();
        let engine = ReconcileEngine::new(
            self.layout.root.clone(),
            &manifest,
            &lock,
            &fetcher,
            &preprocessor,
        );
        f(&engine)
    }
}

/// Run a future to completion on a fresh multi-threaded runtime.
fn block_on<F: Future>(future: F) -> Result<F::Output, DimError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| DimError::ConfigError(format!("Failed to start async runtime: {}", e)))?;
    Ok(runtime.block_on(future))
}
