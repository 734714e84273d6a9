use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use sheetchat_core::{
    decode_reply, fetch_google_sheet, parse_workbook, ChatConfig, GeminiBackend, Role, Session,
    Workbook,
};

mod render;

#[derive(Parser)]
#[command(name = "sheetchat")]
#[command(about = "Chat with a spreadsheet from the terminal", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to an .xlsx/.xls/.ods file to analyze
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Google Sheet URL or id to fetch instead of a local file
    #[arg(short, long, value_name = "URL_OR_ID", conflicts_with = "file")]
    sheet: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured model
    #[arg(short, long, value_name = "MODEL")]
    model: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = load_config(&cli)?;
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }

    let workbook = load_workbook(&cli, &config)?;

    let backend = match GeminiBackend::new(&config) {
        Ok(backend) => backend,
        Err(e) => bail!("{}", e),
    };

    let mut session = Session::new();
    session.install_workbook(session.generation(), workbook.clone());

    render::print_summary(&workbook);
    if let Some(greeting) = session.messages().first() {
        render::print_message(greeting.role, &greeting.content);
    }
    println!(
        "{}",
        "Commands: /table, /reset, /quit. Anything else is a question.".dimmed()
    );

    repl(&mut session, &workbook, &backend)
}

fn load_config(cli: &Cli) -> Result<ChatConfig> {
    if let Some(config_path) = &cli.config {
        return ChatConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()));
    }
    // Default config from the current directory if it exists
    let default_config_path = PathBuf::from("sheetchat.toml");
    if default_config_path.exists() {
        ChatConfig::from_file(&default_config_path).with_context(|| {
            format!(
                "Failed to load config from {}",
                default_config_path.display()
            )
        })
    } else {
        Ok(ChatConfig::default())
    }
}

fn load_workbook(cli: &Cli, config: &ChatConfig) -> Result<Workbook> {
    if let Some(path) = &cli.file {
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let display_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("workbook.xlsx");
        return parse_workbook(&bytes, display_name).map_err(|e| {
            log::debug!("ingestion failed: {}", e);
            anyhow::anyhow!("{}", e.user_message())
        });
    }
    if let Some(input) = &cli.sheet {
        return fetch_google_sheet(input, config).map_err(|e| {
            log::debug!("remote ingestion failed: {}", e);
            anyhow::anyhow!("{}", e.user_message())
        });
    }
    bail!("Provide a spreadsheet FILE or --sheet <URL_OR_ID>");
}

fn repl(session: &mut Session, workbook: &Workbook, backend: &GeminiBackend) -> Result<()> {
    let stdin = io::stdin();
    loop {
        print!("{} ", "you>".bold().cyan());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/quit" | "/exit" => break,
            "/table" => {
                for sheet in &workbook.sheets {
                    render::print_table(sheet);
                }
            }
            "/reset" => {
                // Same workbook, fresh conversation.
                session.reset();
                session.install_workbook(session.generation(), workbook.clone());
                if let Some(greeting) = session.messages().first() {
                    render::print_message(greeting.role, &greeting.content);
                }
            }
            question => {
                let reply = session.ask(question, backend)?;
                let decoded = decode_reply(&reply.content);
                render::print_message(Role::Model, &decoded.prose);
                if let Some(chart) = &decoded.chart {
                    render::print_chart(chart);
                }
            }
        }
    }
    Ok(())
}
