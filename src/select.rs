use std::io;

use dialoguer::{console::Term, theme::ColorfulTheme, Select};
use stacked_errors::{bail, Result, StackableErr};
use tracing::warn;

use crate::pipeline::Stage;

/// Presents `options` and returns the chosen one, or `None` if the operator
/// cancelled. Callers never pass an empty `options`.
pub trait Selector {
    fn choose(&self, options: &[String], stage: Stage) -> Result<Option<String>>;
}

/// Interactive menu on the controlling terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalSelector;

impl Selector for TerminalSelector {
    fn choose(&self, options: &[String], stage: Stage) -> Result<Option<String>> {
        if options.is_empty() {
            bail!("TerminalSelector::choose(stage: {stage:?}) -> called with no options")
        }
        let term = Term::stderr();
        let theme = ColorfulTheme::default();
        let choice = Select::with_theme(&theme)
            .with_prompt(stage.prompt())
            .items(options)
            .default(0)
            .interact_on_opt(&term);
        settle(choice, options, stage, &term)
    }
}

/// Maps the menu result to a choice. An interrupted menu returns before it
/// shows the cursor again, so that is done here.
fn settle(
    choice: dialoguer::Result<Option<usize>>,
    options: &[String],
    stage: Stage,
    term: &Term,
) -> Result<Option<String>> {
    match choice {
        Ok(choice) => Ok(choice.map(|i| options[i].clone())),
        Err(e) if is_interrupt(&e) => {
            if let Err(e) = term.show_cursor() {
                warn!("failed to show the cursor again: {e}");
            }
            Ok(None)
        }
        Err(e) => Err(e).stack_err_with(|| format!("TerminalSelector::choose(stage: {stage:?})")),
    }
}

/// Ctrl-C while the menu owns the terminal comes back as an interrupted read
fn is_interrupt(e: &dialoguer::Error) -> bool {
    matches!(e, dialoguer::Error::IO(e) if e.kind() == io::ErrorKind::Interrupted)
}
