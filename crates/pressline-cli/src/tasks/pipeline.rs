//! The concrete tasks behind every sequence and watch registration.

use async_trait::async_trait;
use std::sync::Arc;

use super::{DevSession, TaskContext, TaskError, TaskName, TaskResult, TaskRunner};
use crate::bundler::{BundleOutcome, Bundler};
use crate::copy::copy_into_site;
use crate::dev::{DevEvent, DevServer, ServerConfig};
use crate::error::CliError;
use crate::generator;
use crate::rewrite;
use crate::watch::{FileWatcher, WatchRouter};

/// Runs tasks against a shared [`TaskContext`].
#[derive(Clone)]
pub struct PipelineTasks {
    context: Arc<TaskContext>,
}

impl PipelineTasks {
    pub fn new(context: Arc<TaskContext>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &Arc<TaskContext> {
        &self.context
    }

    async fn bundle(&self) -> TaskResult {
        let ctx = &self.context;
        let bundler = Bundler::new(ctx.site().bundler.clone(), ctx.root());

        let outcome = bundler.run(ctx.run().mode()).await?;
        let problem = outcome.problem();

        if let BundleOutcome::Resident { handle, .. } = outcome {
            ctx.keep_bundler(handle);
        }

        match problem {
            Some(problem) => Err(TaskError::Warning(problem)),
            None => Ok(()),
        }
    }

    async fn generate(&self) -> TaskResult {
        let ctx = &self.context;
        let settings = &ctx.site().generator;
        let development = ctx.run().mode().is_development();

        if development && !ctx.gate().is_first_run() {
            ctx.notify(DevEvent::Notify {
                message: format!("Running: $ {}", generator::display_command(settings)),
            });
        }

        generator::run(settings, ctx.run(), ctx.root()).await?;

        if development && ctx.gate().should_reload() {
            ctx.notify(DevEvent::Reload);
        }
        Ok(())
    }

    async fn rename(&self) -> TaskResult {
        let site_dir = self.context.site_dir();
        let settings = self.context.site().rewrite.clone();

        tokio::task::spawn_blocking(move || rewrite::rename_all(&site_dir, &settings))
            .await
            .map_err(|err| CliError::Custom(format!("Rename task failed to complete: {err}")))??;
        Ok(())
    }

    async fn copy_js(&self) -> TaskResult {
        let ctx = &self.context;
        copy_into_site(ctx.root(), &ctx.site().artifacts.script, &ctx.site_dir())
            .await
            .map_err(|err| TaskError::Warning(err.to_string()))?;
        ctx.notify(DevEvent::Reload);
        Ok(())
    }

    async fn css(&self) -> TaskResult {
        let ctx = &self.context;
        let stylesheet = &ctx.site().artifacts.stylesheet;
        copy_into_site(ctx.root(), stylesheet, &ctx.site_dir())
            .await
            .map_err(|err| TaskError::Warning(err.to_string()))?;

        let url = format!("/{}", stylesheet.to_string_lossy().replace('\\', "/"));
        ctx.notify(DevEvent::CssUpdated { path: url });
        Ok(())
    }

    async fn serve(&self) -> TaskResult {
        let ctx = &self.context;
        let Some(state) = ctx.live().cloned() else {
            return Err(TaskError::Warning(
                "no dev server state in this run, nothing to serve".to_string(),
            ));
        };

        let config = ServerConfig::from_settings(&ctx.site().server, ctx.site_dir())?;
        let url = config.server_url();
        let open = config.open;
        let server = DevServer::new(config, state).listen().await?;

        if open {
            open_browser(&url);
        }

        let router = WatchRouter::new(ctx.root(), &ctx.site().watch.registrations)?;
        let (watcher, changes) = FileWatcher::new(&router.watch_targets())?;
        crate::ui::info(&format!("Watching {} director(ies)", watcher.watched().len()));

        ctx.install_session(DevSession {
            server,
            watcher,
            changes,
            router,
        });
        Ok(())
    }
}

#[async_trait]
impl TaskRunner for PipelineTasks {
    async fn run_task(&self, task: TaskName) -> TaskResult {
        match task {
            TaskName::Bundle => self.bundle().await,
            TaskName::Generate => self.generate().await,
            TaskName::Rename => self.rename().await,
            TaskName::Serve => self.serve().await,
            TaskName::CopyJs => self.copy_js().await,
            TaskName::Css => self.css().await,
        }
    }
}

/// Open the dev server in the default browser.
fn open_browser(url: &str) {
    #[cfg(target_os = "macos")]
    let result = std::process::Command::new("open").arg(url).spawn();

    #[cfg(target_os = "linux")]
    let result = std::process::Command::new("xdg-open").arg(url).spawn();

    #[cfg(target_os = "windows")]
    let result = std::process::Command::new("cmd")
        .args(["/C", "start", url])
        .spawn();

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    let result: std::io::Result<std::process::Child> = Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "no browser launcher for this platform",
    ));

    if let Err(e) = result {
        crate::ui::warning(&format!("Failed to open browser: {}", e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dev::DevServerState;
    use pressline_config::{GeneratorSettings, RunConfig, SiteConfig};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn live_context(root: PathBuf, site: SiteConfig) -> (Arc<TaskContext>, Arc<DevServerState>) {
        let state = Arc::new(DevServerState::new(root.join("_site")));
        let context = TaskContext::new(RunConfig::development(), root, site)
            .with_live(Arc::clone(&state));
        (Arc::new(context), state)
    }

    #[tokio::test]
    async fn test_css_copies_and_refreshes_styles() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().to_path_buf();
        fs::create_dir_all(root.join("css")).unwrap();
        fs::write(root.join("css/main.css"), "h1{}").unwrap();

        let (context, state) = live_context(root.clone(), SiteConfig::default());
        let (_id, mut rx) = state.register_client();

        PipelineTasks::new(context).run_task(TaskName::Css).await.unwrap();

        assert!(root.join("_site/css/main.css").is_file());
        assert_eq!(
            rx.recv().await.unwrap(),
            r#"{"type":"css-updated","path":"/css/main.css"}"#
        );
    }

    #[tokio::test]
    async fn test_copy_failure_is_a_warning() {
        let temp = TempDir::new().unwrap();
        let (context, _state) = live_context(temp.path().to_path_buf(), SiteConfig::default());

        let result = PipelineTasks::new(context).run_task(TaskName::CopyJs).await;
        assert!(matches!(result, Err(TaskError::Warning(_))));
    }

    #[tokio::test]
    async fn test_missing_generator_is_fatal() {
        let temp = TempDir::new().unwrap();
        let site = SiteConfig {
            generator: GeneratorSettings {
                program: "pressline-no-such-generator".to_string(),
                ..GeneratorSettings::default()
            },
            ..SiteConfig::default()
        };
        let context = Arc::new(TaskContext::new(RunConfig::production(), temp.path(), site));

        let result = PipelineTasks::new(context).run_task(TaskName::Generate).await;
        assert!(matches!(result, Err(TaskError::Fatal(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_generate_reloads_only_after_first_run() {
        let temp = TempDir::new().unwrap();
        let site = SiteConfig {
            generator: GeneratorSettings {
                program: "sh".to_string(),
                args: vec!["-c".to_string(), "true".to_string()],
                ..GeneratorSettings::default()
            },
            ..SiteConfig::default()
        };
        let (context, state) = live_context(temp.path().to_path_buf(), site);
        let (_id, mut rx) = state.register_client();
        let tasks = PipelineTasks::new(context);

        tasks.run_task(TaskName::Generate).await.unwrap();
        assert!(rx.try_recv().is_err());

        tasks.run_task(TaskName::Generate).await.unwrap();
        assert_eq!(
            rx.recv().await.unwrap(),
            r#"{"type":"notify","message":"Running: $ sh -c"}"#
        );
        assert_eq!(rx.recv().await.unwrap(), r#"{"type":"reload"}"#);
    }

    #[tokio::test]
    async fn test_rename_in_build_context() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("_site/a/b")).unwrap();
        fs::write(root.join("_site/a/index.html"), "").unwrap();
        fs::write(root.join("_site/a/b/index.html"), "").unwrap();

        let context = Arc::new(TaskContext::new(RunConfig::sharepoint(), root, SiteConfig::default()));
        PipelineTasks::new(context).run_task(TaskName::Rename).await.unwrap();

        assert!(root.join("_site/a/default.aspx").is_file());
        assert!(root.join("_site/a/b/default.aspx").is_file());
        assert!(!root.join("_site/a/index.html").exists());
    }
}
