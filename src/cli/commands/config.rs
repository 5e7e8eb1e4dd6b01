use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;
use crate::config::CONFIG_KEYS;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "View and manage preferences",
        "config [show|set <key> <value>|backup [note]|backups|restore <name>]",
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() || args[0].eq_ignore_ascii_case("show") {
        return show_config(context);
    }

    match args[0].to_lowercase().as_str() {
        "set" => {
            if args.len() < 3 {
                return Err(CommandError::InvalidArguments(format!(
                    "usage: config set <{}> <value>",
                    CONFIG_KEYS.join("|")
                )));
            }
            let key = args[1].to_lowercase();
            let mut updated = context.config.clone();
            updated.set_value(&key, &args[2..].join(" "))?;
            context.apply_config(updated)?;
            context.persist_config()?;
            io::print_success(format!("{} updated.", key));
            Ok(())
        }
        "backup" => {
            let note = if args.len() > 1 {
                Some(args[1..].join(" "))
            } else {
                None
            };
            let name = context
                .config_manager
                .backup(&context.config, note.as_deref())?;
            io::print_success(format!("Configuration backup written: {}", name));
            Ok(())
        }
        "backups" => {
            let backups = context.config_manager.list_backups()?;
            if backups.is_empty() {
                io::print_info("No configuration backups yet.");
            }
            for (idx, name) in backups.iter().enumerate() {
                io::print_info(format!("  {:>2}. {}", idx + 1, name));
            }
            Ok(())
        }
        "restore" => {
            let Some(name) = args.get(1) else {
                return Err(CommandError::InvalidArguments(
                    "usage: config restore <name>".into(),
                ));
            };
            let restored = context.config_manager.restore(name)?;
            context.apply_config(restored)?;
            io::print_success(format!("Configuration restored from {}", name));
            Ok(())
        }
        other => Err(CommandError::InvalidArguments(format!(
            "unknown config action `{}`",
            other
        ))),
    }
}

fn show_config(context: &ShellContext) -> CommandResult {
    output_section("Configuration");
    for (key, value) in context.config.entries() {
        io::print_info(format!("  {:<20} {}", key, value));
    }
    io::print_info(format!(
        "  {:<20} {}",
        "file",
        context.config_manager.path().display()
    ));
    Ok(())
}
