//! Command-line host for the animal page.
//!
//! Bootstraps an `App` against a running server, replays scripted user
//! actions through the page's own forms and buttons, and leaves the final
//! document for the caller to print. Every request is executed as soon as
//! it is issued.

pub mod config;
pub mod script;
pub mod transport;

use animal_core::{App, AppError, FormFields, PendingRequest, Resolution, Transport};
use thiserror::Error;
use tracing::warn;

pub use config::ShellConfig;
pub use script::{Command, Fields, ScriptError};
pub use transport::UreqTransport;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    App(#[from] AppError),
}

/// How many requests changed the page and how many were refused.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub applied: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Summary {
    fn record(&mut self, resolution: &Resolution) {
        match resolution {
            Resolution::Applied => self.applied += 1,
            Resolution::Failed(_) => self.failed += 1,
            Resolution::Stale => self.skipped += 1,
        }
    }
}

fn type_into(app: &mut App, inputs: FormFields, fields: &Fields) -> Result<(), AppError> {
    let doc = app.document_mut();
    doc.set_value(inputs.name, &fields.name)?;
    doc.set_value(inputs.age, &fields.age)?;
    doc.set_checked(inputs.mammal, fields.mammal)?;
    Ok(())
}

fn issue(app: &mut App, command: &Command) -> Result<PendingRequest, AppError> {
    match command {
        Command::Create(fields) => {
            let draft = app.create()?;
            type_into(app, draft.fields, fields)?;
            app.submit(draft.key)
        }
        Command::Edit { id, fields } => {
            app.edit(*id)?;
            let inputs = app.edit_fields(*id).ok_or(AppError::NotEditing(*id))?;
            type_into(app, inputs, fields)?;
            app.save(*id)
        }
        Command::Remove(id) => app.remove(*id),
    }
}

/// Loads the page, then runs `commands` in order.
///
/// A command the page refuses (invalid input, an id that is not shown) is
/// logged and skipped; the remaining commands still run.
pub fn run<T: Transport + ?Sized>(
    app: &mut App,
    commands: &[Command],
    transport: &T,
) -> Result<Summary, ShellError> {
    let mut summary = Summary::default();
    let pending = app.bootstrap();
    summary.record(&app.settle(pending, transport)?);

    for command in commands {
        match issue(app, command) {
            Ok(pending) => summary.record(&app.settle(pending, transport)?),
            Err(e @ (AppError::Form(_) | AppError::UnknownResource(_))) => {
                warn!(?command, error = %e, "command skipped");
                summary.skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(summary)
}
