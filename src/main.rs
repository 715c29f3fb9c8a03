use std::io::Write;

use anyhow::{bail, Context, Result};
use clap::Parser;

use csvpad::bus::StateBus;
use csvpad::cli::{CliArgs, RunPlan, SaveTarget};
use csvpad::config::EditorConfig;
use csvpad::messages::StateChange;
use csvpad::App;

fn main() -> Result<()> {
    let plan = CliArgs::parse().into_plan().map_err(anyhow::Error::msg)?;

    csvpad::tracing::init();

    let mut app = App::new(EditorConfig::load());
    app.subscribe(csvpad::tracing::log_state_changes);
    app.subscribe(|change: &StateChange, _bus: &mut StateBus| {
        if let StateChange::StatusText { new, .. } = change {
            if !new.is_empty() {
                eprintln!("{}", new);
            }
        }
    });

    run(&mut app, &plan)?;
    app.close_document();
    Ok(())
}

fn run(app: &mut App, plan: &RunPlan) -> Result<()> {
    app.open_file(&plan.path)
        .with_context(|| format!("Failed to open {}", plan.path.display()))?;

    for edit in &plan.edits {
        let mut session = app
            .begin_edit(edit.row)
            .with_context(|| format!("Cannot edit row {}", edit.row + 1))?;

        if let Err(e) = session.set_field(edit.column, edit.value.as_str()) {
            app.cancel_edit(&mut session)?;
            return Err(e).with_context(|| format!("Cannot edit column {}", edit.column + 1));
        }

        app.commit_edit(&mut session)?;
    }

    match &plan.save {
        SaveTarget::None => {}
        SaveTarget::InPlace => app.request_save()?,
        SaveTarget::As(out) => app
            .request_save_as(out)
            .with_context(|| format!("Failed to save {}", out.display()))?,
    }

    if plan.print {
        let document = app.document();
        let text = csvpad::csv::encode(document.header(), document.rows())?;
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()?;
    }

    if app.has_unsaved_changes() && !plan.force {
        bail!(
            "{} has unsaved changes (use --save, --save-as or --force)",
            app.window_title()
        );
    }

    Ok(())
}
