use clap::Parser as ClapParser;
use monkey::config::{HELP_TEXT, VERSION, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use monkey::env::Environment;
use monkey::{run, run_line};
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor, Editor};
use std::path::PathBuf;

/// Interpreter for the Monkey language
#[derive(ClapParser, Debug)]
#[command(name = "monkey")]
#[command(version = VERSION)]
#[command(about = "A tree-walking interpreter for the Monkey language")]
struct CliArgs {
    /// Script file to execute (optional - if not provided, starts the REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    if let Some(script_path) = args.script {
        return run_script(&script_path);
    }

    run_repl()
}

/// Evaluates every top-level statement in `path` and prints nothing but
/// parse errors — matching spec.md's batch contract, where scripts only
/// produce output via `puts`.
fn run_script(path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read script file {}: {}", path.display(), e))?;

    let outcome = run(&source);
    if !outcome.parse_errors.is_empty() {
        for err in &outcome.parse_errors {
            eprintln!("{err}");
        }
        return Err("parsing failed".into());
    }

    Ok(())
}

fn run_repl() -> Result<(), Box<dyn std::error::Error>> {
    let env = Environment::new();
    let macro_env = Environment::new();

    let config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<(), _> = DefaultEditor::with_config(config)?;

    let history_file = ".monkey_history";
    let _ = rl.load_history(history_file);

    println!("{WELCOME_MESSAGE}");
    println!("{WELCOME_SUBTITLE}");
    println!("{HELP_TEXT}");

    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }

                let outcome = run_line(&line, &env, &macro_env);
                if !outcome.parse_errors.is_empty() {
                    for err in &outcome.parse_errors {
                        eprintln!("{err}");
                    }
                    continue;
                }
                for result in &outcome.results {
                    println!("{result}");
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }

    let _ = rl.save_history(history_file);
    Ok(())
}
