//! Config subcommand handlers.

use std::fmt::Write;

use tracing::warn;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output::Printer;

const REDACTED: &str = "\"****\"";

fn quoted(value: &str) -> String {
    format!("\"{value}\"")
}

/// Format config for display, masking secrets.
fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();
    let secret = |v: Option<&String>| v.map(|_| REDACTED.to_owned());

    let _ = writeln!(out, "[booking]");
    write_opt(&mut out, "base_url", cfg.booking.base_url.as_deref().map(quoted));
    write_opt(&mut out, "api_key", secret(cfg.booking.api_key.as_ref()));
    write_opt(&mut out, "api_key_env", cfg.booking.api_key_env.as_deref().map(quoted));

    let _ = writeln!(out, "\n[lock]");
    write_opt(&mut out, "base_url", cfg.lock.base_url.as_deref().map(quoted));
    write_opt(&mut out, "username", cfg.lock.username.as_deref().map(quoted));
    write_opt(&mut out, "password", secret(cfg.lock.password.as_ref()));
    write_opt(&mut out, "password_env", cfg.lock.password_env.as_deref().map(quoted));
    let _ = writeln!(out, "insecure = {}", cfg.lock.insecure);
    if let Some(ref ca) = cfg.lock.ca_cert {
        let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
    }

    if let Some(ref sms) = cfg.sms {
        let _ = writeln!(out, "\n[sms]");
        write_opt(&mut out, "base_url", sms.base_url.as_deref().map(quoted));
        write_opt(&mut out, "api_token", secret(sms.api_token.as_ref()));
        write_opt(&mut out, "api_token_env", sms.api_token_env.as_deref().map(quoted));
        let recipients: Vec<String> = sms.recipients.iter().map(|r| quoted(r)).collect();
        let _ = writeln!(out, "recipients = [{}]", recipients.join(", "));
        let _ = writeln!(out, "sender = \"{}\"", sms.sender);
    }

    let s = &cfg.sync;
    let _ = writeln!(out, "\n[sync]");
    let _ = writeln!(out, "tag_prefix = \"{}\"", s.tag_prefix);
    let _ = writeln!(out, "retention_days = {}", s.retention_days);
    let _ = writeln!(out, "lookback_days = {}", s.lookback_days);
    let _ = writeln!(out, "lookahead_days = {}", s.lookahead_days);
    let _ = writeln!(out, "check_in = \"{}\"", s.check_in);
    let _ = writeln!(out, "check_out = \"{}\"", s.check_out);
    let _ = writeln!(out, "notify_guests = {}", s.notify_guests);
    let _ = writeln!(out, "timeout = {}", s.timeout);

    for (title, table) in [
        ("apartment_locks", &cfg.apartment_locks),
        ("lock_accessoires", &cfg.lock_accessoires),
        ("pin_prefixes", &cfg.pin_prefixes),
    ] {
        if table.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n[{title}]");
        for (key, value) in table {
            let _ = writeln!(out, "\"{key}\" = \"{value}\"");
        }
    }

    out
}

fn write_opt(out: &mut String, key: &str, value: Option<String>) {
    if let Some(value) = value {
        let _ = writeln!(out, "{key} = {value}");
    }
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            let path = config::active_path(global);
            Printer::new(global).line(&path.display().to_string());
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            Printer::new(global).line(format_config_redacted(&cfg).trim_end());
            Ok(())
        }

        ConfigCommand::Check => {
            let cfg = config::load(global)?;
            let sync = cfg.sync_config()?;
            cfg.connection_config()?;
            if sync.identity.is_empty() {
                warn!("no apartments are mapped to locks; every booking will be skipped");
            }
            let mapped = cfg.apartment_locks.len();
            let locks = sync.identity.locks().count();
            Printer::new(global).line(&format!(
                "configuration OK: {mapped} apartment(s), {locks} keypad lock(s)"
            ));
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let path = config::active_path(global);
            if path.exists() && !force {
                return Err(CliError::Validation {
                    field: "config".into(),
                    reason: format!(
                        "{} already exists (use --force to replace it)",
                        path.display()
                    ),
                });
            }
            keysync_config::save_config(&Config::default(), &path)?;
            Printer::new(global).line(&format!("wrote {}", path.display()));
            Ok(())
        }
    }
}
