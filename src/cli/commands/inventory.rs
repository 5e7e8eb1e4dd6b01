use crate::cli::core::{
    parse_quantity, resolve, split_item_args, split_trailing_quantity, CommandError,
    CommandResult, Resolved, ShellContext,
};
use crate::cli::io;
use crate::cli::registry::CommandEntry;
use crate::cli::ui::item_table::render_items;
use crate::core::services::{format_amount, GainTarget, InventoryService, ItemService};
use crate::domain::ItemStack;
use crate::storage::ItemQuery;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "inventory",
            "List items you are carrying",
            "inventory [magic|mundane|bought|found]",
            cmd_inventory,
        ),
        CommandEntry::new(
            "purchased",
            "List everything you have bought",
            "purchased [magic|mundane]",
            cmd_purchased,
        ),
        CommandEntry::new("all", "List every stack ever tracked", "all", cmd_all),
        CommandEntry::new(
            "find",
            "Find items by name (% and _ are wildcards)",
            "find <pattern>",
            cmd_find,
        ),
        CommandEntry::new("show", "Show one item", "show <item>", cmd_show),
        CommandEntry::new(
            "buy",
            "Buy items at a store",
            "buy <qty> <name> price=<p> [weight=<w>] [notes=<text>] [magic]",
            cmd_buy,
        ),
        CommandEntry::new(
            "gain",
            "Pick up items without paying",
            "gain <qty> <item|name> [weight=<w>] [notes=<text>] [magic]",
            cmd_gain,
        ),
        CommandEntry::new(
            "drop",
            "Drop a stack, or consume some of it",
            "drop <item> [qty]",
            cmd_drop,
        ),
        CommandEntry::new("add", "Add items to a stack", "add <item> <qty>", cmd_add),
        CommandEntry::new(
            "sell",
            "Sell a stack, or part of it, at its purchase price",
            "sell <item> [qty]",
            cmd_sell,
        ),
        CommandEntry::new(
            "set",
            "Set how many items remain in a stack",
            "set <item> <qty>",
            cmd_set,
        ),
        CommandEntry::new(
            "edit",
            "Change price, weight, notes or magic",
            "edit <item> [price=<p>] [weight=<w>] [notes=<text>] [magic=<true|false>]",
            cmd_edit,
        ),
        CommandEntry::new(
            "weight",
            "Total weight carried",
            "weight [magic|mundane|bought|found]",
            cmd_weight,
        ),
        CommandEntry::new(
            "spent",
            "Gold spent on items",
            "spent [magic|mundane]",
            cmd_spent,
        ),
        CommandEntry::new(
            "backup",
            "Snapshot the inventory file",
            "backup [note]",
            cmd_backup,
        ),
        CommandEntry::new("backups", "List inventory snapshots", "backups", cmd_backups),
        CommandEntry::new(
            "restore",
            "Restore the inventory from a snapshot",
            "restore <name>",
            cmd_restore,
        ),
    ]
}

fn parse_filter(args: &[&str]) -> Result<ItemQuery, CommandError> {
    let mut filter = ItemQuery::all();
    for arg in args {
        filter = match arg.to_ascii_lowercase().as_str() {
            "magic" => filter.with_magic(true),
            "mundane" => filter.with_magic(false),
            "bought" => filter.with_bought(true),
            "found" => filter.with_bought(false),
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown filter `{}` (expected magic, mundane, bought or found)",
                    other
                )))
            }
        };
    }
    Ok(filter)
}

fn print_items(items: &[ItemStack]) {
    if items.is_empty() {
        io::print_info("Nothing here.");
    } else {
        io::print_info(render_items(items));
    }
}

fn cmd_inventory(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let filter = parse_filter(args)?;
    print_items(&InventoryService::list_held(&context.store, &filter)?);
    Ok(())
}

fn cmd_purchased(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let filter = parse_filter(args)?;
    print_items(&InventoryService::list_purchased(&context.store, &filter)?);
    Ok(())
}

fn cmd_all(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    print_items(&InventoryService::list_all(&context.store)?);
    Ok(())
}

fn cmd_find(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::InvalidArguments("usage: find <pattern>".into()));
    }
    let found = InventoryService::find_by_name(&context.store, &args.join(" "))?;
    if found.is_empty() {
        io::print_warning("Not found.");
    } else {
        print_items(&found);
    }
    Ok(())
}

fn cmd_show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::InvalidArguments("usage: show <item>".into()));
    }
    let item = context.resolve_item(&args.join(" "))?;
    print_items(std::slice::from_ref(&item));
    Ok(())
}

fn cmd_buy(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [quantity, rest @ ..] = args else {
        return Err(CommandError::InvalidArguments(
            "usage: buy <qty> <name> price=<p>".into(),
        ));
    };
    let quantity = parse_quantity(quantity, "quantity")?;
    let (words, attributes) = split_item_args(rest)?;
    let price = attributes.price;
    let item = ItemService::buy(&mut context.store, &words.join(" "), quantity, price, attributes)?;
    print_items(std::slice::from_ref(&item));
    Ok(())
}

fn cmd_gain(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [quantity, rest @ ..] = args else {
        return Err(CommandError::InvalidArguments(
            "usage: gain <qty> <item|name>".into(),
        ));
    };
    let quantity = parse_quantity(quantity, "quantity")?;
    let (words, attributes) = split_item_args(rest)?;
    if words.is_empty() {
        return Err(CommandError::InvalidArguments("missing item name".into()));
    }
    let target = match resolve(&context.store, &words.join(" "))? {
        Resolved::Item(item) => GainTarget::Existing(item.id),
        Resolved::Text(name) => GainTarget::New(name),
    };
    let item = ItemService::gain(&mut context.store, target, quantity, attributes)?;
    print_items(std::slice::from_ref(&item));
    Ok(())
}

fn cmd_drop(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (token, quantity) = split_trailing_quantity(args)?;
    let item = context.resolve_item(&token)?;
    io::print_success(ItemService::drop(&mut context.store, item.id, quantity)?);
    Ok(())
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (token, quantity) = split_trailing_quantity(args)?;
    let quantity = quantity.ok_or_else(|| {
        CommandError::InvalidArguments("usage: add <item> <qty>".into())
    })?;
    let item = context.resolve_item(&token)?;
    io::print_success(ItemService::add(&mut context.store, item.id, quantity)?);
    Ok(())
}

fn cmd_sell(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (token, quantity) = split_trailing_quantity(args)?;
    let item = context.resolve_item(&token)?;
    io::print_success(ItemService::sell(&mut context.store, item.id, quantity)?);
    Ok(())
}

fn cmd_set(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [item @ .., quantity] = args else {
        return Err(CommandError::InvalidArguments("usage: set <item> <qty>".into()));
    };
    if item.is_empty() {
        return Err(CommandError::InvalidArguments("usage: set <item> <qty>".into()));
    }
    let quantity = quantity.parse::<i64>().map_err(|_| {
        CommandError::InvalidArguments(format!("`{}` is not a whole number", quantity))
    })?;
    let item = context.resolve_item(&item.join(" "))?;
    io::print_success(ItemService::set_remaining(&mut context.store, item.id, quantity)?);
    Ok(())
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (words, attributes) = split_item_args(args)?;
    if words.is_empty() {
        return Err(CommandError::InvalidArguments(
            "usage: edit <item> key=value...".into(),
        ));
    }
    let item = context.resolve_item(&words.join(" "))?;
    let item = ItemService::edit(&mut context.store, item.id, &attributes)?;
    print_items(std::slice::from_ref(&item));
    Ok(())
}

fn cmd_weight(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let filter = parse_filter(args)?;
    let total = InventoryService::total_weight(&context.store, &filter)?;
    io::print_info(format!("{}lbs", format_amount(total)));
    Ok(())
}

fn cmd_spent(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let filter = parse_filter(args)?;
    let total = InventoryService::total_spent(&context.store, &filter)?;
    io::print_info(format!("{}gp", format_amount(total)));
    Ok(())
}

fn cmd_backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let note = if args.is_empty() {
        None
    } else {
        Some(args.join(" "))
    };
    let name = context.store.backup(note.as_deref())?;
    io::print_success(format!("Backup written: {}", name));
    Ok(())
}

fn cmd_backups(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let backups = context.store.list_backups()?;
    if backups.is_empty() {
        io::print_info("No backups yet.");
    }
    for (idx, name) in backups.iter().enumerate() {
        io::print_info(format!("  {:>2}. {}", idx + 1, name));
    }
    Ok(())
}

fn cmd_restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(reference) = args.first() else {
        return Err(CommandError::InvalidArguments("usage: restore <name>".into()));
    };
    let name = match reference.parse::<usize>() {
        Ok(index) if index > 0 => context
            .store
            .list_backups()?
            .into_iter()
            .nth(index - 1)
            .ok_or_else(|| CommandError::InvalidArguments(format!("no backup #{}", index)))?,
        _ => reference.to_string(),
    };
    context.store.restore(&name)?;
    io::print_success(format!("Inventory restored from {}", name));
    Ok(())
}
