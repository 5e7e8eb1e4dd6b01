use tabletop_ledger::{
    cli::{
        output::{set_preferences, OutputPreferences},
        ui::{
            item_table::{item_table, HEADINGS},
            table_renderer::{Alignment, Table, TableColumn},
        },
    },
    core::services::{GainTarget, InventoryService, ItemService},
    domain::ItemAttributes,
    storage::{ItemQuery, MemoryStore},
};

fn plain() {
    set_preferences(OutputPreferences {
        color_enabled: false,
        screen_reader_mode: false,
        high_contrast_mode: false,
    });
}

#[test]
fn multi_line_cells_grow_the_row() {
    plain();
    let table = Table {
        columns: vec![
            TableColumn::new("Item", Alignment::Left),
            TableColumn::new("Value", Alignment::Right),
        ],
        rows: vec![
            vec!["Rope".into(), "$1".into()],
            vec!["Potion\nheals 2d8".into(), "$25\n$50".into()],
        ],
        show_headers: true,
        padding: 1,
    };

    let rendered = table.render();
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[0], " Item      | Value");
    assert_eq!(lines[2], " Rope      |    $1");
    assert_eq!(lines[3], " Potion    |   $25");
    assert_eq!(lines[4], " heals 2d8 |   $50");
    assert_eq!(lines.len(), 5);
}

#[test]
fn item_listing_shows_every_heading_and_tag() {
    plain();
    let mut store = MemoryStore::new("Shalizara");
    ItemService::buy(
        &mut store,
        "Wand of Magic Missile",
        1,
        Some(750.0),
        ItemAttributes::default().magical().with_weight(0.1),
    )
    .unwrap();
    ItemService::gain(
        &mut store,
        GainTarget::New("Torch".into()),
        5,
        ItemAttributes::default().with_weight(1.0),
    )
    .unwrap();

    let items = InventoryService::list_held(&store, &ItemQuery::all()).unwrap();
    let rendered = item_table(&items).render();
    let header = rendered.lines().next().unwrap();
    for heading in HEADINGS {
        assert!(header.contains(heading), "missing heading {heading}");
    }
    assert!(rendered.contains("Wand of Magic Missile"));
    assert!(rendered.contains("Purchased"));
    assert!(rendered.contains("Magical"));
    assert!(rendered.contains("5lbs"));
}
