use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use taskpro::config::{self, Config};
use taskpro::session::Session;
use taskpro::state;

mod app;
mod cli;
mod input;
mod ui;

use app::App;

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let (mut config, first_run) = match config::check_first_run() {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Warning: {}; using default configuration", e);
            (Config::default(), false)
        }
    };
    let _guard = init_logging(&config);
    if first_run {
        info!("first run, default configuration written");
    }

    // 处理 CLI 命令，已处理则直接退出
    if !cli::handle_cli(args.command, &mut config)? {
        return Ok(());
    }

    let mut app = match state::get_session_file_path() {
        Some(path) => App::new(config, &path)?,
        None => {
            warn!("no home directory, session will not be remembered");
            App::with_session(config, Session::in_memory())?
        }
    };

    // 设置终端
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // 恢复终端
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = %err, "application loop failed");
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

/// 日志写入文件，终端归 ratatui 使用
/// 返回的 guard 需要一直持有到退出，才能把缓冲的日志刷出去
fn init_logging(config: &Config) -> Option<WorkerGuard> {
    let log_path = config.log_path();
    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;
    std::fs::create_dir_all(log_dir).ok()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, app))?;
        app.clear_expired_notification();

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                // Windows 上按下和松开各触发一次
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if !app.handle_key(key) {
                    info!("quit");
                    return Ok(());
                }
            }
        }
    }
}
