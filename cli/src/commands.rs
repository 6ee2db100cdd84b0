//! What each subcommand does.
//!
//! Failures that were already shown to the user as a notification come back
//! as `ExitCode::FAILURE`; anything else propagates to `main`.

use crate::api::{ProductClient, ResourceClient, TaskClient, TaskMutations};
use crate::auth::AuthCoordinator;
use crate::cli::{Cli, Commands, TaskAction};
use crate::config::AppConfig;
use crate::controller::{ListController, LoadOutcome};
use crate::editor::{EditorMode, EditorOutcome, TaskEditor};
use crate::error::Error;
use crate::logger::Logger;
use crate::models::{Registration, Session, Task};
use crate::notify::{ConsoleNotifier, Notifier};
use crate::pagination;
use crate::storage::FileStore;
use crate::views;
use anyhow::{Context, Result};
use inquire::{Confirm, CustomType, Password, Select, Text};
use std::fmt;
use std::process::ExitCode;
use std::sync::Arc;

/// Config, notifier and session shared by every command.
pub struct App {
    pub config: AppConfig,
    pub notifier: Arc<dyn Notifier>,
    pub auth: AuthCoordinator<FileStore>,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);
        let path = match &config.storage.path {
            Some(path) => path.clone(),
            None => FileStore::default_path()?,
        };
        let store = match FileStore::open(&path) {
            Ok(store) => store,
            Err(e @ Error::MalformedState(_)) => {
                // Same recovery as a corrupt session: start over empty.
                Logger::warn(format!("{}. Starting with empty storage.", e));
                std::fs::remove_file(&path)
                    .with_context(|| format!("Could not remove {}", path.display()))?;
                FileStore::open(&path)?
            }
            Err(e) => return Err(e.into()),
        };
        let auth = AuthCoordinator::bootstrap(store, notifier.clone());

        Ok(Self {
            config,
            notifier,
            auth,
        })
    }

    fn session(&self) -> Result<Session> {
        Ok(self.auth.require_session()?)
    }

    fn product_list(&self, limit: Option<u32>) -> Result<ListController<ProductClient>> {
        let client = ProductClient::new(&self.config.api.products_url, self.config.product_timeout())?;
        let limit = limit.unwrap_or(self.config.pagination.page_size);
        if limit == 0 {
            return Err(Error::invalid("limit", "Page size must be greater than 0").into());
        }
        Ok(ListController::new(client, limit, self.notifier.clone())
            .with_failure_message("Failed to load products. Please try again.")
            .with_max_buttons(self.config.pagination.max_buttons))
    }

    fn task_list(&self) -> ListController<TaskClient> {
        let client = TaskClient::new(&self.config.api.tasks_url);
        ListController::new(client, self.config.pagination.page_size, self.notifier.clone())
            .with_failure_message("Failed to load tasks")
            .with_max_buttons(self.config.pagination.max_buttons)
    }
}

/// Entry point used by `main`.
pub async fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Init => init(),
        command => {
            let config = AppConfig::load(cli.products_url, cli.tasks_url)?;

            let mut app = App::new(config)?;
            dispatch(&mut app, command).await
        }
    }
}

async fn dispatch(app: &mut App, command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Init => init(),
        Commands::Register => register(app),
        Commands::Login { email } => login(app, email),
        Commands::Logout => {
            app.auth.logout()?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Whoami => whoami(app),
        Commands::Products { page, limit, once } => products(app, page, limit, once).await,
        Commands::Product { id } => product(app, &id).await,
        Commands::Tasks { page, once } => tasks(app, page, once).await,
        Commands::Task { action } => task(app, action).await,
    }
}

fn reported(ok: bool) -> ExitCode {
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn init() -> Result<ExitCode> {
    let path = AppConfig::default_path()?;
    if path.exists() {
        Logger::warn(format!("{} already exists", Logger::highlight(path.display())));
        return Ok(ExitCode::SUCCESS);
    }
    AppConfig::default().save_to(&path)?;
    Logger::success(format!("Created {}", Logger::highlight(path.display())));
    Ok(ExitCode::SUCCESS)
}

fn register(app: &mut App) -> Result<ExitCode> {
    if let Some(session) = app.auth.session() {
        Logger::info(format!(
            "Already logged in as {}",
            Logger::highlight(&session.user.email)
        ));
        return Ok(ExitCode::SUCCESS);
    }

    Logger::header("Create your account");
    let form = Registration {
        first_name: Text::new("First name:").prompt()?,
        last_name: Text::new("Last name:").prompt()?,
        username: Text::new("Username:").prompt()?.trim().to_string(),
        email: Text::new("Email:").prompt()?.trim().to_string(),
        password: Password::new("Password:")
            .with_display_mode(inquire::PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()?,
        confirm_password: Password::new("Confirm password:")
            .with_display_mode(inquire::PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()?,
        phone: Text::new("Phone (10 digits):").prompt()?.trim().to_string(),
        age: Some(CustomType::<u32>::new("Age:").prompt()?),
    };

    Ok(reported(app.auth.register(&form).is_ok()))
}

fn login(app: &mut App, email: Option<String>) -> Result<ExitCode> {
    let email = match email {
        Some(email) => email,
        None => Text::new("Email:").prompt()?,
    };
    let password = Password::new("Password:")
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;

    match app.auth.login(email.trim(), &password) {
        Ok(session) => {
            Logger::info(format!(
                "Welcome, {}!",
                Logger::highlight(session.user.display_name())
            ));
            Ok(ExitCode::SUCCESS)
        }
        Err(_) => Ok(ExitCode::FAILURE),
    }
}

fn whoami(app: &App) -> Result<ExitCode> {
    let session = app.session()?;
    Logger::banner(session.user.display_name());
    Logger::info(format!(
        "{} <{}>",
        Logger::highlight(&session.user.username),
        session.user.email
    ));
    Logger::info(Logger::dim(format!("token {}", session.token)));
    Ok(ExitCode::SUCCESS)
}

/// Loads page 1 to learn the totals, then jumps to `page` if it exists.
async fn open_at<C: ResourceClient>(list: &mut ListController<C>, noun: &str, page: u32) -> LoadOutcome {
    let first = views::with_spinner(format!("Loading {}...", noun), list.load_page(1)).await;
    if page == 1 || first != LoadOutcome::Loaded {
        return first;
    }
    match views::with_spinner(format!("Loading {}...", noun), list.load_page(page)).await {
        LoadOutcome::Ignored => {
            Logger::warn(format!(
                "Page {} is out of range (1-{}), showing page 1",
                page,
                list.total_pages()
            ));
            LoadOutcome::Loaded
        }
        other => other,
    }
}

fn print_page<C: ResourceClient>(
    list: &ListController<C>,
    noun: &str,
    table: impl Fn(&[C::Item]) -> comfy_table::Table,
) {
    if list.items().is_empty() {
        Logger::info(format!("No {} found", noun.to_lowercase()));
    } else {
        println!("\n{}", table(list.items()));
    }
    Logger::info(views::summary_line(
        noun,
        list.total_count(),
        list.current_page(),
        list.total_pages(),
    ));
    if let Some(window) = list.navigation() {
        println!("  {}", views::pager_line(&window));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PagerChoice {
    Previous,
    Next,
    GoTo,
    Refresh,
    Open,
    Add,
    Quit,
}

impl fmt::Display for PagerChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Previous => "‹ Previous page",
            Self::Next => "Next page ›",
            Self::GoTo => "Go to page...",
            Self::Refresh => "Refresh",
            Self::Open => "Open a task",
            Self::Add => "+ Add new task",
            Self::Quit => "Quit",
        })
    }
}

/// Menu entries for the current position. Disabled arrows are left out.
fn pager_choices<C: ResourceClient>(list: &ListController<C>, editable: bool) -> Vec<PagerChoice> {
    let mut choices = Vec::new();
    if let Some(window) = list.navigation() {
        if !window.prev_disabled {
            choices.push(PagerChoice::Previous);
        }
        if !window.next_disabled {
            choices.push(PagerChoice::Next);
        }
        choices.push(PagerChoice::GoTo);
    }
    if editable {
        if !list.items().is_empty() {
            choices.push(PagerChoice::Open);
        }
        choices.push(PagerChoice::Add);
    }
    choices.push(PagerChoice::Refresh);
    choices.push(PagerChoice::Quit);
    choices
}

/// Handles the navigation entries. Returns false for entries it does not own.
async fn navigate<C: ResourceClient>(list: &mut ListController<C>, noun: &str, choice: PagerChoice) -> Result<bool> {
    let current = list.current_page();
    let total = list.total_pages();

    let target = match choice {
        PagerChoice::Previous => pagination::navigate(current, total, current.saturating_sub(1)),
        PagerChoice::Next => pagination::navigate(current, total, current + 1),
        PagerChoice::GoTo => {
            let requested = CustomType::<u32>::new(&format!("Page (1-{}):", total)).prompt()?;
            pagination::navigate(current, total, requested)
        }
        PagerChoice::Refresh => {
            views::with_spinner(format!("Refreshing {}...", noun), list.refresh()).await;
            return Ok(true);
        }
        _ => return Ok(false),
    };

    if let Some(page) = target {
        views::with_spinner(format!("Loading {}...", noun), list.load_page(page)).await;
    }
    Ok(true)
}

async fn products(app: &App, page: u32, limit: Option<u32>, once: bool) -> Result<ExitCode> {
    app.session()?;
    let mut list = app.product_list(limit)?;

    if open_at(&mut list, "products", page).await == LoadOutcome::Failed {
        return Ok(ExitCode::FAILURE);
    }

    loop {
        print_page(&list, "Products", views::product_table);
        if once {
            return Ok(ExitCode::SUCCESS);
        }

        let choice = Select::new("Products", pager_choices(&list, false)).prompt()?;
        if choice == PagerChoice::Quit {
            return Ok(ExitCode::SUCCESS);
        }
        navigate(&mut list, "products", choice).await?;
    }
}

async fn product(app: &App, id: &str) -> Result<ExitCode> {
    app.session()?;
    let list = app.product_list(None)?;

    match views::with_spinner("Loading product...", list.client().get_by_id(id)).await {
        Ok(product) => {
            Logger::header(&product.title);
            println!("{}", views::product_details(&product));
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            app.notifier.error(&e.to_string());
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn tasks(app: &App, page: u32, once: bool) -> Result<ExitCode> {
    let session = app.session()?;
    let mut list = app.task_list();

    if !once {
        Logger::banner(session.user.display_name());
    }
    if open_at(&mut list, "tasks", page).await == LoadOutcome::Failed {
        return Ok(ExitCode::FAILURE);
    }

    loop {
        print_page(&list, "Tasks", views::task_table);
        if once {
            return Ok(ExitCode::SUCCESS);
        }

        let choice = Select::new("Tasks", pager_choices(&list, true)).prompt()?;
        match choice {
            PagerChoice::Quit => return Ok(ExitCode::SUCCESS),
            PagerChoice::Open => {
                let picked = Select::new("Task", list.items().to_vec())
                    .with_formatter(&|t| t.value.todo.clone())
                    .prompt()?;
                let opened = views::with_spinner(
                    "Loading task...",
                    TaskEditor::open(&list, &picked.id.to_string()),
                )
                .await;
                // A failed fetch was already reported.
                if let Ok(editor) = opened {
                    task_session(&mut list, editor).await?;
                }
            }
            PagerChoice::Add => {
                let todo = Text::new("New task:").prompt()?;
                let mut editor = TaskEditor::for_new(Some(session.user.id));
                editor.set_todo(todo);
                // Errors were already shown.
                let _ = editor.save(&mut list).await;
            }
            other => {
                navigate(&mut list, "tasks", other).await?;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetailChoice {
    Edit,
    Delete,
    Back,
}

impl fmt::Display for DetailChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Edit => "Edit",
            Self::Delete => "Delete",
            Self::Back => "Back",
        })
    }
}

/// Detail view of one task until it is deleted or the user goes back.
async fn task_session<C>(list: &mut ListController<C>, mut editor: TaskEditor) -> Result<()>
where
    C: ResourceClient<Item = Task> + TaskMutations,
{
    loop {
        let EditorMode::View(task) = editor.mode().clone() else {
            return Ok(());
        };
        Logger::header("Task Details");
        println!("{}", views::task_details(&task));

        let choice = Select::new(
            "Action",
            vec![DetailChoice::Edit, DetailChoice::Delete, DetailChoice::Back],
        )
        .prompt()?;

        match choice {
            DetailChoice::Back => return Ok(()),
            DetailChoice::Edit => {
                editor.edit();
                let todo = Text::new("Task:").with_initial_value(editor.todo()).prompt()?;
                let completed = Confirm::new("Completed?")
                    .with_default(editor.completed())
                    .prompt()?;
                editor.set_todo(todo);
                editor.set_completed(completed);
                if editor.save(list).await.is_err() {
                    editor.cancel();
                }
            }
            DetailChoice::Delete => {
                let sure = Confirm::new("Delete this task?").with_default(false).prompt()?;
                if sure && editor.delete(list).await.is_ok() {
                    return Ok(());
                }
            }
        }
    }
}

async fn task(app: &App, action: TaskAction) -> Result<ExitCode> {
    let session = app.session()?;
    let mut list = app.task_list();

    let ok = match action {
        TaskAction::Add { todo } => {
            let mut editor = TaskEditor::for_new(Some(session.user.id));
            editor.set_todo(todo.join(" "));
            match editor.save(&mut list).await {
                Ok(_) => {
                    if let Some(created) = list.items().first() {
                        println!("{}", views::task_details(created));
                    }
                    true
                }
                Err(_) => false,
            }
        }
        TaskAction::Show { id } => match TaskEditor::open(&list, &id).await {
            Ok(editor) => {
                if let EditorMode::View(task) = editor.mode() {
                    println!("{}", views::task_details(task));
                }
                true
            }
            Err(_) => false,
        },
        TaskAction::Edit { id, todo, completed } => {
            edit_task(&mut list, &id, todo, completed).await
        }
        TaskAction::Done { id } => edit_task(&mut list, &id, None, Some(true)).await,
        TaskAction::Delete { id, yes } => match TaskEditor::open(&list, &id).await {
            Ok(mut editor) => {
                let sure = yes
                    || Confirm::new(&format!("Delete task {}?", id))
                        .with_default(false)
                        .prompt()?;
                sure && editor.delete(&mut list).await.is_ok()
            }
            Err(_) => false,
        },
    };

    Ok(reported(ok))
}

async fn edit_task(
    list: &mut ListController<TaskClient>,
    id: &str,
    todo: Option<String>,
    completed: Option<bool>,
) -> bool {
    let Ok(mut editor) = TaskEditor::open(list, id).await else {
        return false;
    };
    editor.edit();
    if let Some(todo) = todo {
        editor.set_todo(todo);
    }
    if let Some(completed) = completed {
        editor.set_completed(completed);
    }
    match editor.save(list).await {
        Ok(EditorOutcome::Saved(task)) => {
            println!("{}", views::task_details(&task));
            true
        }
        Ok(EditorOutcome::Closed) => true,
        Err(_) => false,
    }
}
