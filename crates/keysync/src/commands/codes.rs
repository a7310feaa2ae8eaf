//! `keysync codes` -- read-only view of a lock's keypad codes.

use tabled::Tabled;

use keysync_core::{AccessCode, LockId};

use crate::cli::{CodesArgs, CodesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, Printer};

use super::Engine;

#[derive(Tabled)]
struct CodeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "PIN")]
    pin: String,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&AccessCode> for CodeRow {
    fn from(c: &AccessCode) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.name.clone(),
            pin: c.pin.clone().unwrap_or_default(),
            start: output::cell(c.date_start),
            end: output::cell(c.date_end),
            active: if c.active { "yes" } else { "no" }.into(),
            description: c.description.clone(),
        }
    }
}

pub async fn handle(sync: &Engine, args: CodesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        CodesCommand::List { lock_id } => {
            let codes = sync.list_codes(LockId::new(lock_id)).await?;
            Printer::new(global).list(&codes, |c| CodeRow::from(c), |c| c.id.to_string());
            Ok(())
        }
    }
}
