//! Application wiring for the command-line front end.

use crate::ai::{GeminiIdeaClient, GeminiSiteClient, IdeaService, SiteGenerationService};
use crate::credits::{CreditKind, Plan};
use crate::error::Recovery;
use crate::models::{Config, GeneratedSite, UploadedImage, WebsiteIdea};
use crate::preview::{self, SiteFiles};
use crate::session::{failure_message, Session, SessionServices};
use crate::{Error, Result};
use chrono::Local;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};
use uuid::Uuid;

const SHELL_HELP: &str = "\
Commands:
  <text>            generate a website from the description
  :image <path>     attach a PNG, JPEG or WebP image to the next description
  :clear-image      drop the attached image
  :ideas <topic>    generate five website ideas
  :plan <name>      switch plan (free, basic, pro, business)
  :credits          show remaining credits
  :save             write the latest website again
  :dismiss          clear the last failure
  :help             show this help
  :quit             leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Empty,
    Prompt(String),
    Ideas(String),
    Image(PathBuf),
    ClearImage,
    Plan(Plan),
    Credits,
    Save,
    Dismiss,
    Help,
    Quit,
}

/// Parse one line of shell input. Lines starting with `:` are commands;
/// anything else is a website description.
pub fn parse_command(line: &str) -> Result<ShellCommand> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ShellCommand::Empty);
    }

    let Some(rest) = line.strip_prefix(':') else {
        return Ok(ShellCommand::Prompt(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match name {
        "ideas" => Ok(ShellCommand::Ideas(arg.to_string())),
        "image" if !arg.is_empty() => Ok(ShellCommand::Image(PathBuf::from(arg))),
        "image" => Err(Error::Validation("Usage: :image <path>".to_string())),
        "clear-image" => Ok(ShellCommand::ClearImage),
        "plan" => Ok(ShellCommand::Plan(arg.parse()?)),
        "credits" => Ok(ShellCommand::Credits),
        "save" => Ok(ShellCommand::Save),
        "dismiss" => Ok(ShellCommand::Dismiss),
        "help" => Ok(ShellCommand::Help),
        "quit" | "exit" => Ok(ShellCommand::Quit),
        other => Err(Error::Validation(format!(
            "Unknown command ':{}'. Type :help for a list.",
            other
        ))),
    }
}

pub fn format_idea_card(index: usize, idea: &WebsiteIdea) -> String {
    format!("{}. {}\n   {}", index + 1, idea.title, idea.description)
}

fn recovery_hint(recovery: Recovery) -> &'static str {
    match recovery {
        Recovery::Retry => "Try again when ready.",
        Recovery::UpgradePlan => "Upgrade with :plan <basic|pro|business>.",
    }
}

/// Read an image from disk and prepare it for upload.
pub async fn load_image(path: &Path) -> Result<UploadedImage> {
    let bytes = tokio::fs::read(path).await?;
    UploadedImage::from_bytes(&bytes)
}

/// Owns one session plus the directory generated sites are written into.
pub struct App {
    session: Session,
    output_dir: PathBuf,
    sites_written: AtomicUsize,
}

impl App {
    /// Build an app from concrete service dependencies.
    ///
    /// This is primarily useful for integration tests and local harnesses that
    /// need to inject mocks.
    pub fn with_services(services: SessionServices, plan: Plan, output_dir: PathBuf) -> Self {
        Self {
            session: Session::with_plan(services, plan),
            output_dir,
            sites_written: AtomicUsize::new(0),
        }
    }

    /// Construct an app from environment configuration (`Config::from_env`).
    pub fn new(plan: Plan) -> Result<Self> {
        let config = Config::from_env()?;

        let date = Local::now().format("%Y-%m-%d").to_string();
        let session_id = Uuid::new_v4();
        let output_dir = config
            .output_dir
            .join(format!("{}_{}", date, session_id));

        // Reuse one HTTP connection pool across both clients.
        let http_client = reqwest::Client::new();

        info!("Site model: {}", config.site_model);
        let site: Box<dyn SiteGenerationService> = Box::new(
            GeminiSiteClient::new_with_client(
                config.api_key.clone(),
                config.site_model.clone(),
                http_client.clone(),
            )
            .with_base_url(config.base_url.clone())
            .with_timeout(config.timeout),
        );

        info!("Idea model: {}", config.idea_model);
        let ideas: Box<dyn IdeaService> = Box::new(
            GeminiIdeaClient::new_with_client(
                config.api_key.clone(),
                config.idea_model.clone(),
                http_client,
            )
            .with_base_url(config.base_url.clone())
            .with_timeout(config.timeout),
        );

        Ok(Self::with_services(
            SessionServices { site, ideas },
            plan,
            output_dir,
        ))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Generate one site and write its bundle under the output directory.
    pub async fn generate_site(
        &self,
        prompt: &str,
        image: Option<UploadedImage>,
    ) -> Result<SiteFiles> {
        let site = self.session.generate_site(prompt, image).await?;
        self.save_site(&site)
    }

    /// Write the session's latest website again without regenerating it.
    pub fn save_latest_site(&self) -> Result<SiteFiles> {
        let site = self.session.latest_site().ok_or_else(|| {
            Error::Validation("No website has been generated yet.".to_string())
        })?;
        self.save_site(&site)
    }

    fn save_site(&self, site: &GeneratedSite) -> Result<SiteFiles> {
        let n = self.sites_written.fetch_add(1, Ordering::SeqCst) + 1;
        let dir = self.output_dir.join(format!("site-{}", n));
        let files = preview::write_site(&dir, site).map_err(|e| {
            warn!("Could not save website to {}: {}", dir.display(), e);
            e
        })?;

        info!("Saved website preview at: {}", files.index.display());
        Ok(files)
    }

    pub async fn generate_ideas(&self, topic: &str) -> Result<Vec<WebsiteIdea>> {
        self.session.generate_ideas(topic).await
    }

    fn print_credits<W: Write>(&self, out: &mut W) -> Result<()> {
        let credits = self.session.credits();
        writeln!(
            out,
            "Plan: {} | page credits: {} | idea credits: {}",
            credits.plan(),
            credits.page_credits(),
            credits.idea_credits()
        )?;
        Ok(())
    }

    fn print_failure<W: Write>(&self, kind: CreditKind, err: &Error, out: &mut W) -> Result<()> {
        writeln!(out, "{}", failure_message(kind, err))?;
        if matches!(err, Error::Io(_)) {
            writeln!(out, "Use :save to write it again.")?;
        } else {
            writeln!(out, "{}", recovery_hint(err.recovery()))?;
        }
        Ok(())
    }

    /// Interactive loop over `input`, writing user-facing text to `out`.
    pub async fn run_shell<R, W>(&self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();
        let mut attached: Option<UploadedImage> = None;

        writeln!(out, "Describe a website, or type :help.")?;
        self.print_credits(out)?;

        while let Some(line) = lines.next_line().await? {
            let command = match parse_command(&line) {
                Ok(command) => command,
                Err(e) => {
                    writeln!(out, "{}", e)?;
                    continue;
                }
            };

            match command {
                ShellCommand::Empty => {}
                ShellCommand::Quit => break,
                ShellCommand::Help => writeln!(out, "{}", SHELL_HELP)?,
                ShellCommand::Credits => self.print_credits(out)?,
                ShellCommand::Plan(plan) => {
                    self.session.select_plan(plan);
                    self.print_credits(out)?;
                }
                ShellCommand::Image(path) => match load_image(&path).await {
                    Ok(image) => {
                        writeln!(out, "Attached {} ({})", path.display(), image.mime_type())?;
                        attached = Some(image);
                    }
                    Err(e) => writeln!(out, "Could not attach {}: {}", path.display(), e)?,
                },
                ShellCommand::ClearImage => {
                    attached = None;
                    writeln!(out, "Image removed.")?;
                }
                ShellCommand::Save => match self.save_latest_site() {
                    Ok(files) => writeln!(out, "Preview written to {}", files.index.display())?,
                    Err(Error::Validation(message)) => writeln!(out, "{}", message)?,
                    Err(e) => self.print_failure(CreditKind::Page, &e, out)?,
                },
                ShellCommand::Dismiss => {
                    for kind in [CreditKind::Page, CreditKind::Idea] {
                        if let Some(recovery) = self.session.dismiss_failure(kind) {
                            writeln!(out, "Cleared {} failure. {}", kind, recovery_hint(recovery))?;
                        }
                    }
                }
                ShellCommand::Ideas(topic) => match self.generate_ideas(&topic).await {
                    Ok(ideas) => {
                        for (i, idea) in ideas.iter().enumerate() {
                            writeln!(out, "{}", format_idea_card(i, idea))?;
                        }
                        self.print_credits(out)?;
                    }
                    Err(e) => self.print_failure(CreditKind::Idea, &e, out)?,
                },
                ShellCommand::Prompt(text) => {
                    // The attachment belongs to this attempt only.
                    match self.generate_site(&text, attached.take()).await {
                        Ok(files) => {
                            writeln!(out, "Preview written to {}", files.index.display())?;
                            self.print_credits(out)?;
                        }
                        Err(e) => self.print_failure(CreditKind::Page, &e, out)?,
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{MockFailure, MockIdeaClient, MockSiteClient};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn build_test_app(output_dir: &Path, site: MockSiteClient, ideas: MockIdeaClient) -> App {
        App::with_services(
            SessionServices {
                site: Box::new(site),
                ideas: Box::new(ideas),
            },
            Plan::Free,
            output_dir.to_path_buf(),
        )
    }

    async fn run(app: &App, script: &str) -> String {
        let mut out = Vec::new();
        app.run_shell(script.as_bytes(), &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_command_variants() {
        assert_eq!(parse_command("  ").unwrap(), ShellCommand::Empty);
        assert_eq!(
            parse_command("A bakery site").unwrap(),
            ShellCommand::Prompt("A bakery site".to_string())
        );
        assert_eq!(
            parse_command(":ideas  pet grooming ").unwrap(),
            ShellCommand::Ideas("pet grooming".to_string())
        );
        assert_eq!(
            parse_command(":image ./logo.png").unwrap(),
            ShellCommand::Image(PathBuf::from("./logo.png"))
        );
        assert_eq!(parse_command(":plan pro").unwrap(), ShellCommand::Plan(Plan::Pro));
        assert_eq!(parse_command(":save").unwrap(), ShellCommand::Save);
        assert_eq!(parse_command(":quit").unwrap(), ShellCommand::Quit);
    }

    #[test]
    fn test_parse_command_errors() {
        assert!(matches!(parse_command(":plan gold"), Err(Error::Validation(_))));
        assert!(matches!(parse_command(":image"), Err(Error::Validation(_))));
        assert!(matches!(parse_command(":deploy"), Err(Error::Validation(_))));
    }

    #[test]
    fn test_format_idea_card() {
        let idea = WebsiteIdea {
            title: "Leaf Ledger".to_string(),
            description: "Track your houseplants.".to_string(),
        };
        assert_eq!(
            format_idea_card(0, &idea),
            "1. Leaf Ledger\n   Track your houseplants."
        );
    }

    #[tokio::test]
    async fn test_generate_site_writes_numbered_bundles() {
        let dir = tempdir().unwrap();
        let app = build_test_app(dir.path(), MockSiteClient::new(), MockIdeaClient::new());

        let first = app.generate_site("Bakery", None).await.unwrap();
        let second = app.generate_site("Florist", None).await.unwrap();

        assert_eq!(first.index, dir.path().join("site-1").join("index.html"));
        assert_eq!(second.index, dir.path().join("site-2").join("index.html"));
        assert!(std::fs::read_to_string(&second.index)
            .unwrap()
            .contains("Florist"));
    }

    #[tokio::test]
    async fn test_failed_generation_writes_nothing() {
        let dir = tempdir().unwrap();
        let app = build_test_app(
            dir.path(),
            MockSiteClient::new().with_failure(MockFailure::Upstream),
            MockIdeaClient::new(),
        );

        assert!(app.generate_site("Bakery", None).await.is_err());
        assert!(!dir.path().join("site-1").exists());
    }

    #[tokio::test]
    async fn test_shell_runs_out_of_credits_and_upgrades() {
        let dir = tempdir().unwrap();
        let site = MockSiteClient::new();
        let probe = site.clone();
        let app = build_test_app(dir.path(), site, MockIdeaClient::new());

        let output = run(
            &app,
            "A bakery\nA florist\nA bookshop\n:dismiss\n:plan pro\nA bookshop\n:quit\nignored\n",
        )
        .await;

        assert!(output.contains("You have run out of page generation credits"));
        assert!(output.contains("Upgrade with :plan"));
        assert!(output.contains("Plan: pro | page credits: 50 | idea credits: 20"));
        assert!(output.contains("Plan: pro | page credits: 49 | idea credits: 20"));
        assert_eq!(probe.get_call_count(), 3);
    }

    #[tokio::test]
    async fn test_shell_prints_idea_cards() {
        let dir = tempdir().unwrap();
        let app = build_test_app(dir.path(), MockSiteClient::new(), MockIdeaClient::new());

        let output = run(&app, ":ideas coffee\n").await;

        assert!(output.contains("1. coffee idea 1"));
        assert!(output.contains("5. coffee idea 5"));
        assert!(output.contains("idea credits: 1"));
    }

    #[tokio::test]
    async fn test_shell_attached_image_is_used_once() {
        let dir = tempdir().unwrap();
        let image_path = dir.path().join("hero.png");
        std::fs::write(&image_path, [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]).unwrap();

        let site = MockSiteClient::new();
        let probe = site.clone();
        let app = build_test_app(dir.path(), site, MockIdeaClient::new());

        let script = format!(":image {}\nA gallery\n", image_path.display());
        let output = run(&app, &script).await;
        assert!(output.contains("(image/png)"));
        assert!(probe.last_request().unwrap().image().is_some());

        run(&app, "Another gallery\n").await;
        assert!(probe.last_request().unwrap().image().is_none());
    }

    #[tokio::test]
    async fn test_shell_rejects_unsupported_image() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "not an image").unwrap();
        let app = build_test_app(dir.path(), MockSiteClient::new(), MockIdeaClient::new());

        let output = run(&app, &format!(":image {}\n", path.display())).await;
        assert!(output.contains("Could not attach"));
    }

    #[tokio::test]
    async fn test_save_failure_keeps_generated_site() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("output");
        std::fs::write(&output_dir, "occupied").unwrap();
        let app = build_test_app(&output_dir, MockSiteClient::new(), MockIdeaClient::new());

        let err = app.generate_site("A bakery", None).await.unwrap_err();

        assert!(matches!(err, Error::Io(_)));
        assert!(failure_message(CreditKind::Page, &err)
            .starts_with("Website generated but could not be saved"));
        assert_eq!(app.session().credits().page_credits(), 1);
        assert_eq!(
            app.session().state(CreditKind::Page),
            crate::session::RequestState::Succeeded
        );
        assert!(app.session().latest_site().unwrap().html.contains("A bakery"));

        std::fs::remove_file(&output_dir).unwrap();
        let files = app.save_latest_site().unwrap();
        assert!(std::fs::read_to_string(&files.index)
            .unwrap()
            .contains("A bakery"));
        assert_eq!(app.session().credits().page_credits(), 1);
    }

    #[tokio::test]
    async fn test_shell_reports_save_failure_and_offers_save() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("output");
        std::fs::write(&output_dir, "occupied").unwrap();
        let site = MockSiteClient::new();
        let probe = site.clone();
        let app = build_test_app(&output_dir, site, MockIdeaClient::new());

        let output = run(&app, "A bakery\n").await;
        assert!(output.contains("Website generated but could not be saved"));
        assert!(output.contains("Use :save to write it again."));
        assert!(!output.contains("check your prompt or API key"));

        std::fs::remove_file(&output_dir).unwrap();
        let output = run(&app, ":save\n").await;
        assert!(output.contains("Preview written to"));
        assert_eq!(probe.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_save_without_site_is_refused() {
        let dir = tempdir().unwrap();
        let app = build_test_app(dir.path(), MockSiteClient::new(), MockIdeaClient::new());

        assert!(matches!(app.save_latest_site(), Err(Error::Validation(_))));
        let output = run(&app, ":save\n").await;
        assert!(output.contains("No website has been generated yet."));
    }
}
