use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use taskpro::board::{seed, BoardStore};
use taskpro::config::{self, Config};
use taskpro::models::Priority;
use taskpro::projects::ProjectCatalog;
use taskpro::query::{Direction, SortField, TaskQuery};
use taskpro::session::Session;
use taskpro::state;
use taskpro::users::UserDirectory;

/// Terminal task manager: kanban board, task table, users and projects.
#[derive(Debug, Parser)]
#[command(name = "taskpro", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the interactive interface (default)
    Ui,
    /// Print the board column by column
    Board,
    /// List tasks with filters and sorting
    Tasks {
        /// Match title, description or assignee
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        department: Option<String>,
        /// Column title, e.g. "Em Andamento"
        #[arg(long)]
        status: Option<String>,
        /// low, medium, high or urgent
        #[arg(long)]
        priority: Option<Priority>,
        /// Due month (1-12)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
        /// Due year
        #[arg(long)]
        year: Option<i32>,
        /// title, priority, department, due, created or status
        #[arg(long, default_value = "due")]
        sort: SortField,
        /// Sort descending
        #[arg(long)]
        desc: bool,
    },
    /// List users
    Users {
        #[arg(long)]
        search: Option<String>,
    },
    /// List projects
    Projects,
    /// Log in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the current configuration
    Show,
    /// Set the column that counts as done
    CompletedColumn { id: String },
    /// Set the log filter (trace, debug, info, warn, error)
    LogLevel { level: String },
}

/// 处理 CLI 命令
/// 返回 true 表示应该继续进入 TUI，false 表示已处理完毕应该退出
pub fn handle_cli(command: Option<Commands>, config: &mut Config) -> Result<bool> {
    let Some(command) = command else {
        return Ok(true);
    };

    match command {
        Commands::Ui => return Ok(true),
        Commands::Board => print_board(config)?,
        Commands::Tasks {
            search,
            department,
            status,
            priority,
            month,
            year,
            sort,
            desc,
        } => {
            let query = TaskQuery {
                search: search.unwrap_or_default(),
                department,
                status,
                priority,
                month,
                year,
                sort_field: sort,
                direction: if desc { Direction::Desc } else { Direction::Asc },
            };
            print_tasks(config, &query)?;
        }
        Commands::Users { search } => print_users(search.as_deref().unwrap_or("")),
        Commands::Projects => print_projects(),
        Commands::Login { email, password } => {
            let mut session = Session::init(&session_path()?)?;
            let users = UserDirectory::seeded();
            let identity = session.login(&users, &email, &password)?;
            println!("Logged in as {} <{}> ({})", identity.name, identity.email, identity.role.label());
        }
        Commands::Logout => {
            let mut session = Session::init(&session_path()?)?;
            if session.is_logged_in() {
                session.logout()?;
                println!("Logged out");
            } else {
                println!("Not logged in");
            }
        }
        Commands::Whoami => {
            let mut session = Session::init(&session_path()?)?;
            session.refresh(&UserDirectory::seeded())?;
            match session.identity() {
                Some(me) => {
                    println!("Name:       {}", me.name);
                    println!("Email:      {}", me.email);
                    println!("Role:       {}", me.role.label());
                    println!("Department: {}", me.department);
                }
                None => println!("Not logged in"),
            }
        }
        Commands::Config { action } => handle_config(action.unwrap_or(ConfigAction::Show), config)?,
    }
    Ok(false)
}

fn session_path() -> Result<PathBuf> {
    state::get_session_file_path().ok_or_else(|| anyhow!("could not determine home directory"))
}

fn store(config: &Config) -> Result<BoardStore> {
    BoardStore::seeded()
        .with_completed_column(&config.completed_column)
        .with_context(|| format!("invalid completed column '{}'", config.completed_column))
}

fn print_board(config: &Config) -> Result<()> {
    let store = store(config)?;
    let board = store.board();
    for column in board.ordered_columns() {
        let marker = if column.id == store.completed_column() { " ✓" } else { "" };
        println!("{} ({}){}", column.title, column.len(), marker);
        println!("  {:<10}  {:<8}  {:<10}  TITLE", "ID", "PRIORITY", "DUE");
        for task in board.tasks_in(&column.id) {
            let (done, total) = task.subtask_progress();
            let subtasks = if total > 0 {
                format!(" [{}/{}]", done, total)
            } else {
                String::new()
            };
            println!(
                "  {:<10}  {:<8}  {:<10}  {}{}",
                task.id,
                task.priority.as_str(),
                task.due_date.format("%Y-%m-%d"),
                task.title,
                subtasks
            );
        }
        println!();
    }
    Ok(())
}

fn print_tasks(config: &Config, query: &TaskQuery) -> Result<()> {
    let store = store(config)?;
    let rows = query.apply(store.board());
    if rows.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }

    println!(
        "{:<10}  {:<40}  {:<8}  {:<12}  {:<10}  DEPARTMENTS",
        "ID", "TITLE", "PRIORITY", "STATUS", "DUE"
    );
    println!(
        "{:-<10}  {:-<40}  {:-<8}  {:-<12}  {:-<10}  {:-<12}",
        "", "", "", "", "", ""
    );
    for row in rows {
        let task = row.task;
        println!(
            "{:<10}  {:<40}  {:<8}  {:<12}  {:<10}  {}",
            task.id,
            truncate(&task.title, 40),
            task.priority.as_str(),
            row.status(),
            task.due_date.format("%Y-%m-%d"),
            task.departments_label()
        );
    }
    Ok(())
}

fn print_users(search: &str) {
    let users = UserDirectory::seeded();
    let found = users.search(search);
    if found.is_empty() {
        println!("No users found.");
        return;
    }
    println!("{:<18}  {:<30}  {:<14}  {:<8}  STATUS", "NAME", "EMAIL", "DEPARTMENT", "ROLE");
    println!("{:-<18}  {:-<30}  {:-<14}  {:-<8}  {:-<8}", "", "", "", "", "");
    for user in found {
        println!(
            "{:<18}  {:<30}  {:<14}  {:<8}  {}",
            user.name,
            user.email,
            user.department,
            user.role.label(),
            user.status.label()
        );
    }
}

fn print_projects() {
    let catalog = ProjectCatalog::seeded();
    println!("{:<34}  {:<13}  {:>8}  {:<10}  MEMBERS", "NAME", "STATUS", "PROGRESS", "DUE");
    println!("{:-<34}  {:-<13}  {:->8}  {:-<10}  {:-<8}", "", "", "", "", "");
    for project in catalog.all() {
        let due = project
            .due_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<34}  {:<13}  {:>7}%  {:<10}  {}",
            truncate(&project.name, 34),
            project.status.label(),
            project.progress(),
            due,
            project.members.join(", ")
        );
    }
}

fn handle_config(action: ConfigAction, config: &mut Config) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let path = config::get_config_path()?;
            println!("Config file: {}", path.display());
            println!();
            print!("{}", toml::to_string_pretty(config)?);
            println!("log_path = \"{}\" (effective)", config.log_path().display());
        }
        ConfigAction::CompletedColumn { id } => {
            if !seed::columns().iter().any(|c| c.id == id) {
                let known: Vec<String> = seed::columns().into_iter().map(|c| c.id).collect();
                bail!("unknown column '{}' (expected one of: {})", id, known.join(", "));
            }
            config.completed_column = id;
            config::save_config(config)?;
            println!("✓ completed column set to {}", config.completed_column);
        }
        ConfigAction::LogLevel { level } => {
            tracing_subscriber::EnvFilter::try_new(&level)
                .with_context(|| format!("invalid log filter '{}'", level))?;
            config.log_level = level;
            config::save_config(config)?;
            println!("✓ log level set to {}", config.log_level);
        }
    }
    Ok(())
}

/// 按字符截断，超出部分用 … 表示
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
