use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::{Value as JsonValue, json};
use tracing::Level;

use sql_template::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run a named SQL template against a SQLite database")]
struct Args {
    /// Directory holding `<id>.sql` templates (overrides the config file)
    #[arg(long)]
    templates: Option<PathBuf>,
    /// SQLite database file; in-memory when omitted
    #[arg(long)]
    db: Option<String>,
    /// JSON options file
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute a template and print its rows as JSON
    Run {
        template_id: String,
        /// Parameter as name=value; repeatable
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, RowValues)>,
        /// Return only this 1-based page
        #[arg(long)]
        page: Option<usize>,
        #[arg(long)]
        per_page: Option<usize>,
    },
}

/// `name=value`, where value is read as integer, float, `null`, then text.
fn parse_param(raw: &str) -> Result<(String, RowValues), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got {raw}"))?;
    let value = if let Ok(i) = value.parse::<i64>() {
        RowValues::Int(i)
    } else if let Ok(f) = value.parse::<f64>() {
        RowValues::Float(f)
    } else if value.eq_ignore_ascii_case("null") {
        RowValues::Null
    } else {
        RowValues::Text(value.to_string())
    };
    Ok((name.to_string(), value))
}

fn row_json(row: &HydratedRow) -> JsonValue {
    match row {
        HydratedRow::Record(record) => record.to_json(),
        HydratedRow::Entity(entity) => JsonValue::String(format!("{entity:?}")),
    }
}

fn run(args: Args) -> Result<JsonValue, SqlTemplateError> {
    let mut opts = match &args.config {
        Some(path) => EngineOptions::from_json_file(path)?,
        None => EngineOptions::default(),
    };
    if let Some(dir) = args.templates {
        opts.template_dir = dir;
    }
    if let Some(db) = args.db {
        opts.database_path = Some(db);
    }
    let default_per_page = opts.default_per_page;
    let mut exec = EngineOptionsBuilder::from_options(opts).build()?;

    let Command::Run {
        template_id,
        params,
        page,
        per_page,
    } = args.command;
    let params: ParamSet = params.into_iter().collect();

    if let Some(index) = page {
        let per_page = PerPage::Fixed(per_page.unwrap_or(default_per_page));
        let mut pager = exec.paginate(&template_id, &params, &per_page, FetchMode::Default)?;
        let page = pager.page(index)?;
        return Ok(json!({
            "page": page.index(),
            "per_page": page.per_page(),
            "total": page.total_count(),
            "has_next": page.has_next(),
            "has_previous": page.has_previous(),
            "rows": page.iter().map(row_json).collect::<Vec<_>>(),
        }));
    }

    Ok(match exec.execute(&template_id, &params, &FetchMode::Default)? {
        ExecutionResult::Empty { rows_affected } => json!({ "rows_affected": rows_affected }),
        other => JsonValue::Array(other.into_rows().iter().map(row_json).collect()),
    })
}

fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    match run(args) {
        Ok(output) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&output).unwrap_or_else(|_| output.to_string())
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
