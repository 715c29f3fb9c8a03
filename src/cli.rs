//! Command-line argument parsing
//!
//! Supports:
//! - Opening one CSV file
//! - Cell edits (`--set ROW:COL=VALUE`, 1-based)
//! - Saving in place or to a new file
//! - Printing the resulting table

use clap::Parser;
use std::path::PathBuf;

/// A small CSV table editor
#[derive(Parser, Debug)]
#[command(name = "csvpad", version, about = "A small CSV table editor")]
pub struct CliArgs {
    /// CSV file to open
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Set a cell, e.g. `--set 2:1=Alice` (row and column are 1-based)
    #[arg(long = "set", value_name = "ROW:COL=VALUE")]
    pub set: Vec<String>,

    /// Save back to PATH after applying edits
    #[arg(short = 's', long, conflicts_with = "save_as")]
    pub save: bool,

    /// Save to another file after applying edits
    #[arg(long, value_name = "OUT")]
    pub save_as: Option<PathBuf>,

    /// Print the table to stdout
    #[arg(short = 'p', long)]
    pub print: bool,

    /// Exit successfully even if edits were not saved
    #[arg(short = 'f', long)]
    pub force: bool,
}

/// One cell edit, 0-based
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellAssignment {
    pub row: usize,
    pub column: usize,
    pub value: String,
}

/// Where the result is written
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveTarget {
    #[default]
    None,
    InPlace,
    As(PathBuf),
}

/// Validated command-line request
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub path: PathBuf,
    pub edits: Vec<CellAssignment>,
    pub save: SaveTarget,
    pub print: bool,
    pub force: bool,
}

impl CliArgs {
    /// Validate the arguments into a plan
    pub fn into_plan(self) -> Result<RunPlan, String> {
        let edits = self
            .set
            .iter()
            .map(|spec| parse_assignment(spec))
            .collect::<Result<Vec<_>, _>>()?;

        let save = match (self.save, self.save_as) {
            (true, Some(_)) => return Err("--save and --save-as are exclusive".to_string()),
            (true, None) => SaveTarget::InPlace,
            (false, Some(out)) => SaveTarget::As(out),
            (false, None) => SaveTarget::None,
        };

        Ok(RunPlan {
            path: self.path,
            edits,
            save,
            print: self.print,
            force: self.force,
        })
    }
}

/// Parse `ROW:COL=VALUE`, converting from 1-indexed (user input) to 0-indexed
fn parse_assignment(spec: &str) -> Result<CellAssignment, String> {
    let invalid = || format!("Invalid edit '{}', expected ROW:COL=VALUE", spec);

    let (cell, value) = spec.split_once('=').ok_or_else(invalid)?;
    let (row, column) = cell.split_once(':').ok_or_else(invalid)?;

    let index = |text: &str, what: &str| -> Result<usize, String> {
        match text.trim().parse::<usize>() {
            Ok(0) => Err(format!("{} numbers start at 1 in '{}'", what, spec)),
            Ok(n) => Ok(n - 1),
            Err(_) => Err(invalid()),
        }
    };

    Ok(CellAssignment {
        row: index(row, "Row")?,
        column: index(column, "Column")?,
        value: value.to_string(),
    })
}
