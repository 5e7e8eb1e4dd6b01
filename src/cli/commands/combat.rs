use crate::cli::core::{CommandError, CommandResult, LoopControl, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;
use crate::cli::shell::{parse_command_line, LineEvent};
use crate::cli::ui::banner::Banner;
use crate::core::combat::{CombatSession, TurnSignal};
use crate::domain::{CombatPhase, Displayable};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "combat",
        "Track initiative order",
        "combat <new|add <name> <initiative>|start|status>",
        cmd_combat,
    )]
}

fn cmd_combat(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if context.in_turn_loop {
        return Err(CommandError::Message(
            "combat is already running; type `next` or `finish`".into(),
        ));
    }
    match args.first().map(|action| action.to_lowercase()).as_deref() {
        Some("new") => {
            context.combat = Some(CombatSession::new());
            io::print_success("New combat. Add actors with `combat add <name> <initiative>`.");
            Ok(())
        }
        Some("add") => add_actor(context, &args[1..]),
        Some("start") => run_combat(context),
        Some("status") | None => {
            match context.combat.as_ref() {
                Some(session) => print_order(session),
                None => io::print_info("No combat. Start one with `combat new`."),
            }
            Ok(())
        }
        Some(other) => Err(CommandError::InvalidArguments(format!(
            "unknown combat action `{}` (expected new, add, start or status)",
            other
        ))),
    }
}

fn add_actor(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [name @ .., initiative] = args else {
        return Err(CommandError::InvalidArguments(
            "usage: combat add <name> <initiative>".into(),
        ));
    };
    if name.is_empty() {
        return Err(CommandError::InvalidArguments(
            "usage: combat add <name> <initiative>".into(),
        ));
    }
    let initiative = initiative.parse::<i32>().map_err(|_| {
        CommandError::InvalidArguments(format!("`{}` is not an initiative score", initiative))
    })?;
    let session = context.combat.get_or_insert_with(CombatSession::new);
    let actor = session.add_actor(&name.join(" "), initiative)?;
    io::print_success(format!("{} joins the fight", actor.display_label()));
    Ok(())
}

fn run_combat(context: &mut ShellContext) -> CommandResult {
    let Some(mut session) = context.combat.take() else {
        return Err(CommandError::Message(
            "no combat to start; use `combat new` first".into(),
        ));
    };
    if let Err(err) = session.start() {
        context.combat = Some(session);
        return Err(err.into());
    }

    io::print_success("Combat has begun!");
    io::print_info("To advance turn, type `next` or `exit`. To end combat, type `finish`.");
    context.in_turn_loop = true;
    let outcome = session.run_turns(|turn| await_turn(context, turn));
    context.in_turn_loop = false;
    context.combat = Some(session);
    outcome?;
    io::print_success("Combat is over.");
    Ok(())
}

/// Reads commands until one of them ends the current turn. Everything that
/// is not a turn command runs as a normal shell command.
fn await_turn(
    context: &mut ShellContext,
    turn: &CombatSession,
) -> Result<TurnSignal, CommandError> {
    let Some(actor) = turn.current() else {
        return Ok(TurnSignal::Finish);
    };
    io::print_info(format!(
        "[{} of {}] It is {}'s turn",
        turn.position() + 1,
        turn.actors().len(),
        actor.name
    ));

    loop {
        let prompt = Banner::turn_prompt(&actor.name, turn.round());
        let line = match context.read_line(&prompt)? {
            LineEvent::Line(line) => line,
            LineEvent::Interrupted | LineEvent::Eof => return Ok(TurnSignal::Finish),
        };
        let tokens = match parse_command_line(&line) {
            Ok(tokens) => tokens,
            Err(err) => {
                io::print_warning(err);
                continue;
            }
        };
        let Some(command) = tokens.first().map(|token| token.to_lowercase()) else {
            continue;
        };
        let subcommand = tokens.get(1).map(|token| token.to_lowercase());
        match (command.as_str(), subcommand.as_deref()) {
            ("next" | "next_turn" | "exit", _) => return Ok(TurnSignal::NextTurn),
            ("finish" | "end", _) => return Ok(TurnSignal::Finish),
            ("combat", Some("status") | None) => {
                print_order(turn);
                continue;
            }
            _ => {}
        }
        match context.process_line(&line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => return Ok(TurnSignal::Finish),
            Err(err) => context.report_error(err),
        }
    }
}

fn print_order(session: &CombatSession) {
    let heading = match session.phase() {
        CombatPhase::Forming => "Combat (forming)".to_string(),
        CombatPhase::Active => format!("Combat (round {})", session.round()),
        CombatPhase::Ended => format!("Combat (ended after round {})", session.round()),
    };
    output_section(heading);
    if session.actors().is_empty() {
        io::print_info("  No actors yet.");
    }
    let current = session.current().map(|_| session.position());
    for (idx, actor) in session.actors().iter().enumerate() {
        let marker = if Some(idx) == current { ">" } else { " " };
        io::print_info(format!("{} {}. {}", marker, idx + 1, actor.display_label()));
    }
}
