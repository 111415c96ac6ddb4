//! Command execution: turns a parsed [`Cli`] into calls on a [`RecipeApp`]
//! and collects what should be shown to the user in a [`Report`].

use std::process::ExitCode;

use crate::app::{Confirm, LoadOutcome, RecipeApp, RemoveOutcome};
use crate::cli::{Cli, Command, ListArguments};
use crate::client::RecipeApi;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::filter::RecipeFilter;
use crate::metadata::{PKG_NAME, PKG_VERSION};
use crate::notice::Notice;
use crate::render;
use crate::storage::{FileStore, KeyValueStore};
use crate::types::RecipeId;

/// Terminal interaction needed while executing a command.
pub trait Interaction: Confirm {
    fn password(&self, prompt: &str) -> ClientResult<String>;
}

pub struct TerminalInteraction {
    assume_yes: bool,
}

impl TerminalInteraction {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Confirm for TerminalInteraction {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        match dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
        {
            Ok(answer) => answer,
            Err(err) => {
                tracing::warn!(error = %err, "confirmation prompt failed; treating as no");
                false
            }
        }
    }
}

impl Interaction for TerminalInteraction {
    fn password(&self, prompt: &str) -> ClientResult<String> {
        dialoguer::Password::new()
            .with_prompt(prompt)
            .interact()
            .map_err(|err| ClientError::Io(std::io::Error::other(err)))
    }
}

/// Output of one command: notices first, then an optional body.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    pub notices: Vec<Notice>,
    pub body: Option<String>,
}

impl Report {
    fn notice(notice: Notice) -> Self {
        Self {
            notices: vec![notice],
            body: None,
        }
    }

    fn body(body: String) -> Self {
        Self {
            notices: Vec::new(),
            body: Some(body),
        }
    }

    fn with_notice(mut self, notice: Notice) -> Self {
        self.notices.push(notice);
        self
    }

    pub fn succeeded(&self) -> bool {
        !self.notices.iter().any(Notice::is_failure)
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.succeeded() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }

    pub fn print(&self) {
        for notice in &self.notices {
            if notice.is_failure() {
                eprintln!("{}", render::notice(notice));
            } else {
                println!("{}", render::notice(notice));
            }
        }
        if let Some(body) = &self.body {
            println!("{body}");
        }
    }
}

impl From<ClientError> for Report {
    fn from(err: ClientError) -> Self {
        Report::notice(Notice::from(&err))
    }
}

/// Run the command on a blocking worker, since the HTTP client is blocking.
pub async fn run(cli: Cli) -> ExitCode {
    let report = match tokio::task::spawn_blocking(move || run_blocking(cli)).await {
        Ok(report) => report,
        Err(err) => {
            tracing::error!(error = %err, "command task failed");
            Report::notice(Notice::error(format!("Command failed: {err}")))
        }
    };
    report.print();
    report.exit_code()
}

fn run_blocking(cli: Cli) -> Report {
    let Cli { settings, command } = cli;
    if let Command::Version = command {
        return version();
    }

    let config = match ClientConfig::from_settings(&settings) {
        Ok(config) => config,
        Err(err) => return err.into(),
    };
    tracing::debug!(api_url = %config.api_url, data_dir = %config.data_dir.display(), "resolved config");

    let storage = match FileStore::open(&config.data_dir) {
        Ok(storage) => storage,
        Err(err) => return ClientError::from(err).into(),
    };
    let assume_yes = matches!(command, Command::Delete { yes: true, .. });
    let mut app = RecipeApp::new(config.http_client(), storage);
    execute(&mut app, command, &TerminalInteraction::new(assume_yes))
}

fn version() -> Report {
    Report::body(format!("{PKG_NAME} {PKG_VERSION}"))
}

/// Execute one command against an application context. Every failure is
/// turned into a notice on the returned report.
pub fn execute<A, S>(app: &mut RecipeApp<A, S>, command: Command, io: &impl Interaction) -> Report
where
    A: RecipeApi,
    S: KeyValueStore,
{
    let reads_session = !matches!(command, Command::Version | Command::Health);
    if reads_session {
        if let Err(err) = app.restore() {
            return err.into();
        }
    }

    let result = match command {
        Command::Version => Ok(version()),
        Command::Health => Ok(health(app)),
        Command::Status => Ok(status(app)),
        Command::Login { username, password } => login(app, &username, password, io),
        Command::Register {
            username,
            email,
            password,
        } => register(app, &username, &email, password, io),
        Command::Logout => logout(app),
        Command::Generate { ingredients } => generate(app, &ingredients),
        Command::List(args) => list(app, args),
        Command::Show { id } => show(app, id),
        Command::Delete { id, .. } => delete(app, id, io),
    };
    result.unwrap_or_else(Report::from)
}

fn health<A: RecipeApi, S: KeyValueStore>(app: &RecipeApp<A, S>) -> Report {
    match app.health() {
        Ok(report) => {
            let notice = if report.status == "healthy" {
                Notice::success("Recipe service is healthy.")
            } else {
                Notice::warning(format!("Recipe service reports {}.", report.status))
            };
            Report::body(render::health(&report)).with_notice(notice)
        }
        Err(err) => err.into(),
    }
}

fn status<A: RecipeApi, S: KeyValueStore>(app: &RecipeApp<A, S>) -> Report {
    Report::body(render::session_status(app.state(), app.session()))
}

fn login<A, S>(
    app: &mut RecipeApp<A, S>,
    username: &str,
    password: Option<String>,
    io: &impl Interaction,
) -> ClientResult<Report>
where
    A: RecipeApi,
    S: KeyValueStore,
{
    let password = match password {
        Some(password) => password,
        None => io.password("Password")?,
    };
    let session = app.login(username, &password)?;
    Ok(Report::notice(Notice::success(format!(
        "Welcome back, {}! You have {} saved recipes.",
        session.username,
        app.recipes().len()
    ))))
}

fn register<A, S>(
    app: &mut RecipeApp<A, S>,
    username: &str,
    email: &str,
    password: Option<String>,
    io: &impl Interaction,
) -> ClientResult<Report>
where
    A: RecipeApi,
    S: KeyValueStore,
{
    let password = match password {
        Some(password) => password,
        None => io.password("Choose a password")?,
    };
    let notice = match app.register(username, email, &password)? {
        Some(session) => Notice::success(format!("Registration successful! Welcome, {}.", session.username)),
        None => Notice::info("Registration successful! Please log in."),
    };
    Ok(Report::notice(notice))
}

fn logout<A: RecipeApi, S: KeyValueStore>(app: &mut RecipeApp<A, S>) -> ClientResult<Report> {
    app.logout()?;
    Ok(Report::notice(Notice::success("Logged out.")))
}

fn generate<A: RecipeApi, S: KeyValueStore>(
    app: &mut RecipeApp<A, S>,
    ingredients: &[String],
) -> ClientResult<Report> {
    let outcome = app.generate(ingredients)?;
    let mut report = Report::body(render::recipe_list(&outcome.recipes, false)).with_notice(
        Notice::success(format!("Generated {} new recipes!", outcome.recipes.len())),
    );
    if !outcome.refreshed {
        report = report.with_notice(Notice::info("Your saved recipes could not be refreshed."));
    }
    Ok(report)
}

fn load_for_view<A: RecipeApi, S: KeyValueStore>(app: &mut RecipeApp<A, S>) -> ClientResult<()> {
    match app.load()? {
        LoadOutcome::NoSession => Err(ClientError::validation("Please login to view your recipes!")),
        LoadOutcome::Applied(_) | LoadOutcome::Stale => Ok(()),
    }
}

fn list<A: RecipeApi, S: KeyValueStore>(
    app: &mut RecipeApp<A, S>,
    args: ListArguments,
) -> ClientResult<Report> {
    load_for_view(app)?;
    let filter = RecipeFilter {
        difficulty: args.difficulty,
        time: args.time,
        max_minutes: args.max_minutes,
        search: args.search,
    };
    let recipes = app.filter(&filter);
    Ok(Report::body(render::recipe_list(&recipes, !filter.is_empty())))
}

fn show<A: RecipeApi, S: KeyValueStore>(
    app: &mut RecipeApp<A, S>,
    id: RecipeId,
) -> ClientResult<Report> {
    load_for_view(app)?;
    match app.recipe(id) {
        Some(recipe) => Ok(Report::body(render::recipe_detail(recipe))),
        None => Ok(Report::notice(Notice::warning(format!("Recipe {id} not found.")))),
    }
}

fn delete<A, S>(app: &mut RecipeApp<A, S>, id: RecipeId, io: &impl Interaction) -> ClientResult<Report>
where
    A: RecipeApi,
    S: KeyValueStore,
{
    // Load first so the prompt can name the recipe; deletion works without it.
    if app.session().is_some() {
        if let Err(err) = app.load() {
            tracing::warn!(error = %err, "could not load recipes before delete");
        }
    }

    let notice = match app.remove(id, io)? {
        RemoveOutcome::Cancelled => Notice::info("Deletion cancelled."),
        RemoveOutcome::Removed { refreshed: true } => Notice::success("Recipe deleted."),
        RemoveOutcome::Removed { refreshed: false } => {
            Notice::success("Recipe deleted. Your saved recipes could not be refreshed.")
        }
    };
    Ok(Report::notice(notice))
}
