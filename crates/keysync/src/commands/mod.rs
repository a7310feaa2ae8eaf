//! Command dispatch.

pub mod bookings;
pub mod codes;
pub mod config_cmd;
pub mod run;

use keysync_core::Synchronizer;
use keysync_core::remote::{RemoteBookings, RemoteLocks, RemoteNotifier};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// The engine wired to the real services.
pub type Engine = Synchronizer<RemoteBookings, RemoteLocks, RemoteNotifier>;

/// Route a networked command to its handler.
pub async fn dispatch(cmd: Command, sync: &Engine, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Run(args) => run::handle(sync, args, global).await,
        Command::Codes(args) => codes::handle(sync, args, global).await,
        Command::Bookings(args) => bookings::handle(sync, args, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "command does not need a connection".into(),
        )),
    }
}

/// Today's local date, as the run sees it.
pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}
