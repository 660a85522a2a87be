//! vgsales-console - numbered menu over the sales table.
//!
//! Usage:
//!   vgsales-console                 # loads ./vgsales.csv
//!   vgsales-console data.parquet    # any supported format
//!   VGSALES_DATA=... vgsales-console

use anyhow::{Context, Result};
use clap::Parser;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use vgsales_viewer::config::{CommonArgs, Settings};
use vgsales_viewer::console::{self, Action, Prompt};
use vgsales_viewer::data::loader::load_file;
use vgsales_viewer::engine::QueryEngine;

/// Console menu for browsing video-game sales.
#[derive(Parser)]
#[command(name = "vgsales-console", about = "Video-game sales console menu")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

/// Line editor with history, ending input on Ctrl-C / Ctrl-D.
struct EditorPrompt {
    editor: DefaultEditor,
}

impl Prompt for EditorPrompt {
    fn ask(&mut self, prompt: &str) -> Option<String> {
        println!("\n{prompt}");
        match self.editor.readline("- ") {
            Ok(line) => {
                let _ = self.editor.add_history_entry(line.as_str());
                Some(line)
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => None,
            Err(e) => {
                log::error!("reading input: {e}");
                None
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let settings = Settings::from(Cli::parse().common);

    let dataset = load_file(&settings.data_path)
        .with_context(|| format!("loading {}", settings.data_path.display()))?;
    let engine = QueryEngine::new(dataset);
    engine.report_discrepancies(settings.tolerance);

    let mut prompt = EditorPrompt {
        editor: DefaultEditor::new().context("starting line editor")?,
    };

    loop {
        match console::next_action(&mut prompt) {
            Ok(Action::Quit) => break,
            Ok(Action::ShowColumns) => {
                print!("{}", console::render_columns(&engine.dataset().column_names()))
            }
            Ok(Action::Run(request)) => match engine.execute(&request) {
                Ok(response) => print!("{}", console::render(&request, &response)),
                Err(e) => println!("Warning: {e}"),
            },
            Err(e) => println!("Warning: {e}"),
        }
    }
    Ok(())
}
