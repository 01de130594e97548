mod classifier;
mod content;
mod dispatch;
mod preferences;
mod render;
mod service;
mod session;
mod validate;

use clap::Parser;
use tokio::io::AsyncBufReadExt;

use content::{ContentKind, FileHandle};

#[derive(clap::Parser)]
struct Opts {
    #[clap(long, default_value = "config.toml")]
    config: std::path::PathBuf,

    /// Print one-shot results as JSON instead of the styled view.
    #[clap(long)]
    json: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Moderate a piece of text.
    Text { text: String },
    /// Moderate an image file.
    Image { path: std::path::PathBuf },
    /// Moderate a PDF, DOC, DOCX or TXT file.
    Document { path: std::path::PathBuf },
    /// Moderate a video file.
    Video { path: std::path::PathBuf },
    /// Show or change the persisted color theme.
    Theme { mode: Option<ThemeMode> },
    /// Interactive session with one input slot per content kind.
    Shell,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ThemeMode {
    Dark,
    Light,
    Toggle,
}

fn api_url_default() -> String {
    service::DEFAULT_API_URL.to_string()
}

fn preferences_path_default() -> std::path::PathBuf {
    "safeguard-preferences.toml".into()
}

#[derive(serde::Deserialize)]
struct Config {
    #[serde(default = "api_url_default")]
    api_url: String,
    #[serde(default = "preferences_path_default")]
    preferences_path: std::path::PathBuf,
    #[serde(default)]
    classifiers: std::collections::HashMap<String, toml::Value>,
}

impl Config {
    fn load(path: &std::path::Path) -> Result<Self, anyhow::Error> {
        let raw = match std::fs::read(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("{} not found, using defaults", path.display());
                vec![]
            }
            Err(e) => return Err(e.into()),
        };
        Ok(toml::from_str::<Config>(std::str::from_utf8(&raw)?)?)
    }

    fn build_dispatcher(&self) -> Result<dispatch::Dispatcher, anyhow::Error> {
        if let Some(key) = self.classifiers.keys().find(|k| k.parse::<ContentKind>().is_err()) {
            return Err(anyhow::format_err!("unknown content kind in [classifiers]: {}", key));
        }

        let mut classifiers = std::collections::HashMap::new();
        for kind in ContentKind::ALL {
            let config = self
                .classifiers
                .get(&kind.to_string())
                .cloned()
                .unwrap_or_else(|| toml::Value::Table(toml::value::Table::new()));
            let typ = config
                .get("type")
                .and_then(|t| t.as_str())
                .unwrap_or_else(|| classifier::default_type(kind))
                .to_string();

            log::info!("{} classifier: {}", kind, typ);
            classifiers.insert(kind, classifier::new_classifier_from_config(kind, &typ, config, &self.api_url)?);
        }
        Ok(dispatch::Dispatcher::new(classifiers))
    }
}

struct App {
    session: parking_lot::Mutex<session::Session>,
    dispatcher: dispatch::Dispatcher,
    settings: preferences::Settings,
    json: bool,
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("unable to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}

impl App {
    fn theme(&self) -> render::Theme {
        render::Theme {
            dark: self.settings.dark_mode(),
        }
    }

    fn print_outcome(&self) {
        if let Some(outcome) = self.session.lock().outcome() {
            if self.json {
                let value = match outcome {
                    session::Outcome::Result(result) => serde_json::to_value(result),
                    session::Outcome::Error(message) => Ok(serde_json::json!({ "error": message })),
                };
                match value.and_then(|v| serde_json::to_string_pretty(&v)) {
                    Ok(s) => println!("{}", s),
                    Err(e) => log::error!("unable to encode outcome: {}", e),
                }
                return;
            }
            print!(
                "{}",
                render::Styled {
                    inner: outcome,
                    theme: self.theme(),
                }
            );
        }
    }

    fn pick(&self, kind: ContentKind, path: &std::path::Path) -> bool {
        match FileHandle::open(path) {
            Ok(file) => self.session.lock().select_file(kind, file).is_ok(),
            Err(e) => {
                log::warn!("unable to open {}: {}", path.display(), e);
                self.session.lock().set_error(format!("Unable to open {}", path.display()));
                false
            }
        }
    }

    async fn submit(&self) {
        if self.dispatcher.submit(&self.session, ctrl_c()).await.is_err() {
            log::info!("submission refused");
        }
    }

    async fn one_shot(&self, kind: ContentKind, text: Option<String>, path: Option<&std::path::Path>) -> bool {
        self.session.lock().switch_tab(kind);
        if let Some(text) = text {
            self.session.lock().set_text(text);
        }
        if let Some(path) = path {
            if !self.pick(kind, path) {
                self.print_outcome();
                return false;
            }
        }

        self.submit().await;
        self.print_outcome();
        self.session.lock().result().is_some()
    }

    /// Runs until `quit`, end of input, or `interrupt` resolving at the prompt.
    /// `interrupt` is called afresh for every prompt, so a Ctrl-C that aborted a
    /// request does not also end the shell.
    async fn shell<F>(
        &mut self,
        input: impl tokio::io::AsyncBufRead + Unpin,
        interrupt: impl Fn() -> F,
    ) -> Result<(), anyhow::Error>
    where
        F: std::future::Future<Output = ()>,
    {
        let mut lines = input.lines();
        println!("tabs: text, image, document, video. type `help` for commands.");

        loop {
            let line = tokio::select! {
                line = lines.next_line() => match line? {
                    Some(line) => line,
                    None => break,
                },
                _ = interrupt() => {
                    println!();
                    break;
                }
            };
            let command = match parse_shell_command(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    println!("{}", e);
                    continue;
                }
            };

            match command {
                ShellCommand::Help => println!("{}", SHELL_HELP),
                ShellCommand::Quit => break,
                ShellCommand::Tab(kind) => {
                    self.session.lock().switch_tab(kind);
                    println!("[{}]", kind);
                }
                ShellCommand::Text(text) => {
                    self.session.lock().set_text(text);
                    println!("{}", self.session.lock().char_counter());
                }
                ShellCommand::Pick(path) => {
                    let kind = self.session.lock().active_tab();
                    if !kind.is_file() {
                        println!("switch to an image, document or video tab first");
                        continue;
                    }
                    if self.pick(kind, &path) {
                        if let Some(file) = self.session.lock().file(kind) {
                            println!("📎 {} ({}, {} bytes)", file.name, file.mime_type, file.size);
                        }
                    } else {
                        self.print_outcome();
                    }
                }
                ShellCommand::Submit => {
                    println!("⏳ Analyzing...");
                    self.submit().await;
                    self.print_outcome();
                }
                ShellCommand::Theme => {
                    let dark = self.settings.toggle_dark_mode()?;
                    println!("theme: {}", if dark { "dark" } else { "light" });
                }
                ShellCommand::Status => {
                    let session = self.session.lock();
                    println!("tab: {}", session.active_tab());
                    println!("text: {}", session.char_counter());
                    for kind in ContentKind::ALL.into_iter().filter(|k| k.is_file()) {
                        match session.file(kind) {
                            Some(file) => println!("{}: {}", kind, file.name),
                            None => println!("{}: -", kind),
                        }
                    }
                    println!("loading: {}", session.loading());
                }
            }
        }
        Ok(())
    }
}

const SHELL_HELP: &str = "tab <text|image|document|video>  switch input panel
text <content>                    set the text to moderate
pick <path>                       choose a file for the current tab
submit                            moderate the current tab's input
theme                             toggle dark mode
status                            show the session
quit                              leave";

#[derive(Debug, PartialEq)]
enum ShellCommand {
    Help,
    Quit,
    Tab(ContentKind),
    Text(String),
    Pick(std::path::PathBuf),
    Submit,
    Theme,
    Status,
}

fn parse_shell_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim_start();
    if line.trim().is_empty() {
        return Ok(None);
    }

    let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    Ok(Some(match head {
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        "tab" => ShellCommand::Tab(
            rest.trim()
                .parse()
                .map_err(|_| format!("unknown tab: {}", rest.trim()))?,
        ),
        "text" => ShellCommand::Text(rest.to_string()),
        "pick" => {
            if rest.trim().is_empty() {
                return Err("pick needs a path".to_string());
            }
            ShellCommand::Pick(rest.trim().into())
        }
        "submit" => ShellCommand::Submit,
        "theme" => ShellCommand::Theme,
        "status" => ShellCommand::Status,
        _ => return Err(format!("unknown command: {}", head)),
    }))
}

#[tokio::main]
async fn main() -> Result<std::process::ExitCode, anyhow::Error> {
    env_logger::builder()
        .filter_module("safeguard", log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let opts = Opts::parse();

    let config = Config::load(&opts.config)?;

    let mut app = App {
        session: parking_lot::Mutex::new(session::Session::new()),
        dispatcher: config.build_dispatcher()?,
        settings: preferences::Settings::load(Box::new(preferences::FileStore::new(&config.preferences_path))),
        json: opts.json,
    };

    let ok = match opts.command {
        Command::Text { text } => app.one_shot(ContentKind::Text, Some(text), None).await,
        Command::Image { path } => app.one_shot(ContentKind::Image, None, Some(&path)).await,
        Command::Document { path } => app.one_shot(ContentKind::Document, None, Some(&path)).await,
        Command::Video { path } => app.one_shot(ContentKind::Video, None, Some(&path)).await,
        Command::Theme { mode } => {
            match mode {
                Some(ThemeMode::Dark) => app.settings.set_dark_mode(true)?,
                Some(ThemeMode::Light) => app.settings.set_dark_mode(false)?,
                Some(ThemeMode::Toggle) => {
                    app.settings.toggle_dark_mode()?;
                }
                None => {}
            }
            println!("{}", if app.settings.dark_mode() { "dark" } else { "light" });
            true
        }
        Command::Shell => {
            app.shell(tokio::io::BufReader::new(tokio::io::stdin()), ctrl_c).await?;
            true
        }
    };

    Ok(if ok {
        std::process::ExitCode::SUCCESS
    } else {
        std::process::ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(raw: &str) -> Config {
        toml::from_str(raw).unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let c = config("");
        assert_eq!(c.api_url, "https://safeguard-ai.safeguardai.workers.dev");
        assert_eq!(c.preferences_path, std::path::PathBuf::from("safeguard-preferences.toml"));
        assert!(c.classifiers.is_empty());
        assert!(c.build_dispatcher().is_ok());
    }

    #[test]
    fn test_config_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let c = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(c.api_url, service::DEFAULT_API_URL);
    }

    #[test]
    fn test_config_classifier_tables() {
        let c = config(
            r#"
            api_url = "http://localhost:8787"

            [classifiers.document]
            type = "remote"
            timeout_secs = 10

            [classifiers.video]
            delay_ms = 5
            "#,
        );
        assert_eq!(c.classifiers.len(), 2);
        assert!(c.build_dispatcher().is_ok());

        let c = config(
            r#"
            [classifiers.text]
            type = "psychic"
            "#,
        );
        assert!(c.build_dispatcher().is_err());

        let c = config(
            r#"
            [classifiers.audio]
            type = "remote"
            "#,
        );
        assert!(c.build_dispatcher().is_err());
    }

    #[test]
    fn test_parse_shell_commands() {
        assert_eq!(parse_shell_command("   "), Ok(None));
        assert_eq!(parse_shell_command("tab video"), Ok(Some(ShellCommand::Tab(ContentKind::Video))));
        assert_eq!(
            parse_shell_command("text I hate you"),
            Ok(Some(ShellCommand::Text("I hate you".to_string())))
        );
        assert_eq!(
            parse_shell_command("pick ./cat.png "),
            Ok(Some(ShellCommand::Pick("./cat.png".into())))
        );
        assert_eq!(parse_shell_command("submit"), Ok(Some(ShellCommand::Submit)));
        assert!(parse_shell_command("tab audio").is_err());
        assert!(parse_shell_command("pick").is_err());
        assert!(parse_shell_command("dance").is_err());
    }

    fn app(prefs: &std::path::Path) -> App {
        App {
            session: parking_lot::Mutex::new(session::Session::new()),
            dispatcher: config("").build_dispatcher().unwrap(),
            settings: preferences::Settings::load(Box::new(preferences::FileStore::new(prefs))),
            json: false,
        }
    }

    #[tokio::test]
    async fn test_shell_interrupt_at_prompt_exits() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir.path().join("prefs.toml"));

        // The writer stays open, so only the interrupt can end the loop.
        let (_writer, reader) = tokio::io::duplex(64);
        app.shell(tokio::io::BufReader::new(reader), || async {}).await.unwrap();
    }

    #[tokio::test]
    async fn test_shell_runs_commands_until_eof() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir.path().join("prefs.toml"));

        let input: &[u8] = b"tab video\ntext hello\ntheme\n";
        app.shell(input, std::future::pending::<()>).await.unwrap();

        assert_eq!(app.session.lock().active_tab(), ContentKind::Video);
        assert!(app.settings.dark_mode());
    }

    #[tokio::test]
    async fn test_flagged_text_end_to_end() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/moderate/text"))
            .and(body_json(serde_json::json!({"text": "I hate you"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "verdict": "flagged",
                "confidence": 0.87,
                "categories": {"toxic": 0.8, "hateful": 0.75, "threatening": 0.1, "safe": 0.13},
                "requires_review": true,
                "content_id": "abc123",
                "timestamp": "2024-01-01T00:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dispatcher = config(&format!("api_url = \"{}\"", server.uri())).build_dispatcher().unwrap();
        let session = parking_lot::Mutex::new(session::Session::new());
        session.lock().set_text("I hate you");

        dispatcher.submit(&session, std::future::pending()).await.unwrap();

        let session = session.lock();
        assert!(!session.loading());
        let view = render::render(session.result().unwrap());
        assert_eq!(view.title, "Content Flagged");
        assert_eq!(view.confidence, "87.0%");
        assert_eq!(view.requires_review, "Yes");
    }

    #[tokio::test]
    async fn test_oversize_document_never_dispatched() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("big.pdf");
        std::fs::File::create(&pdf).unwrap().set_len(25 * 1024 * 1024).unwrap();

        let c = config(&format!(
            "api_url = \"{}\"\n[classifiers.document]\ntype = \"remote\"",
            server.uri()
        ));
        let app = App {
            session: parking_lot::Mutex::new(session::Session::new()),
            dispatcher: c.build_dispatcher().unwrap(),
            settings: preferences::Settings::load(Box::new(preferences::FileStore::new(dir.path().join("p.toml")))),
            json: false,
        };

        assert!(!app.one_shot(ContentKind::Document, None, Some(&pdf)).await);
        assert_eq!(app.session.lock().error(), Some("Document must be less than 20MB"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_video_is_simulated() {
        let dir = tempfile::tempdir().unwrap();
        let mp4 = dir.path().join("clip.mp4");
        std::fs::File::create(&mp4).unwrap().set_len(5 * 1024 * 1024).unwrap();

        // Points at a closed port: any network call would fail the request.
        let dispatcher = config("api_url = \"http://127.0.0.1:9\"").build_dispatcher().unwrap();
        let session = parking_lot::Mutex::new(session::Session::new());
        {
            let mut s = session.lock();
            s.select_file(ContentKind::Video, FileHandle::open(&mp4).unwrap()).unwrap();
            s.switch_tab(ContentKind::Video);
        }

        let started = tokio::time::Instant::now();
        dispatcher.submit(&session, std::future::pending()).await.unwrap();
        assert!(started.elapsed() >= std::time::Duration::from_secs(2));

        let session = session.lock();
        let result = session.result().unwrap();
        assert_eq!(result.verdict, content::Verdict::Safe);
        assert_eq!(result.frames_analyzed, Some(24));
        assert!(result.simulated);
        assert_eq!(render::render(result).confidence, "88.0%");
    }
}
