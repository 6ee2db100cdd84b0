use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "taskdeck")]
#[command(about = "Personal to-do list and product catalog", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Override the product API URL
    #[arg(long, global = true)]
    pub products_url: Option<String>,

    /// Override the task API URL
    #[arg(long, global = true)]
    pub tasks_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default config file
    Init,
    /// Create a local account
    Register,
    /// Log in with a local or demo account
    Login {
        /// Account email (prompted when omitted)
        #[arg(long)]
        email: Option<String>,
    },
    /// Log out and forget the session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Browse the product catalog
    Products {
        /// Page to start on
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Products per page (defaults to the configured page size)
        #[arg(long)]
        limit: Option<u32>,
        /// Print one page and exit instead of browsing
        #[arg(long)]
        once: bool,
    },
    /// Show a single product
    Product {
        /// Product id
        id: String,
    },
    /// Browse and manage your tasks
    Tasks {
        /// Page to start on
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Print one page and exit instead of browsing
        #[arg(long)]
        once: bool,
    },
    /// Work with a single task
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaskAction {
    /// Show a task
    Show { id: String },
    /// Add a task
    Add {
        /// Task text
        #[arg(required = true, num_args = 1..)]
        todo: Vec<String>,
    },
    /// Change a task's text or status
    Edit {
        id: String,
        #[arg(long)]
        todo: Option<String>,
        #[arg(long)]
        completed: Option<bool>,
    },
    /// Mark a task as completed
    Done { id: String },
    /// Delete a task
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}
