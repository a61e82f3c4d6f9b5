//! Headless walk through the docking API: build a layout, drag a tab around, save and restore.
//!
//! Run with `RUST_LOG=debug cargo run --example scripted_layout` to see the layout log.

use egui::{Rect, pos2, vec2};
use egui_split_dock::{
    BuilderSplit, ContentId, DockBuilder, DockOptions, DockSystem, PaneInfo,
};

const EDITOR: ContentId = ContentId(1);
const OUTLINE: ContentId = ContentId(2);
const TERMINAL: ContentId = ContentId(3);
const PROBLEMS: ContentId = ContentId(4);
const PREVIEW: ContentId = ContentId(5);

fn name(content: ContentId) -> &'static str {
    match content {
        EDITOR => "Editor",
        OUTLINE => "Outline",
        TERMINAL => "Terminal",
        PROBLEMS => "Problems",
        PREVIEW => "Preview",
        _ => "?",
    }
}

fn print_panes(title: &str, infos: &[PaneInfo]) {
    println!("{title}:");
    for info in infos {
        let tabs: Vec<&str> = info.tabs.iter().map(|&c| name(c)).collect();
        println!(
            "  {} {:>4.0}x{:<4.0} at ({:.0}, {:.0}) tabs={tabs:?} showing {}{}",
            info.pane_id,
            info.bounds.width(),
            info.bounds.height(),
            info.bounds.min.x,
            info.bounds.min.y,
            name(info.content_id),
            if info.is_active { " (active)" } else { "" },
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut b = DockBuilder::with_options(DockOptions {
        debug_event_log: true,
        debug_integrity: true,
        ..Default::default()
    });
    let dockspace = b.add_node();
    let (outline, main) = b.split_node(dockspace, BuilderSplit::Left, 0.2);
    let (bottom, editor) = b.split_node(main, BuilderSplit::Down, 0.3);
    b.dock_content(OUTLINE, outline)?;
    b.dock_content(EDITOR, editor)?;
    b.dock_contents([TERMINAL, PROBLEMS], bottom)?;
    b.set_active(EDITOR);

    let mut dock = DockSystem::from(b.finish()?);
    dock.set_on_layout_changed(|| log::info!("layout changed"));

    let canvas = Rect::from_min_size(pos2(0.0, 0.0), vec2(1280.0, 720.0));
    dock.update_layout(canvas);
    print_panes("initial", &dock.get_pane_infos());

    dock.split_right(PREVIEW, 0.5);
    dock.update_layout(canvas);
    print_panes("editor split right", &dock.get_pane_infos());

    // Drag the Problems tab onto the left edge of the outline pane.
    let start = dock
        .get_pane_infos()
        .into_iter()
        .find(|info| info.tabs.contains(&PROBLEMS))
        .map(|info| info.tab_strip.center())
        .unwrap_or(canvas.center());
    dock.begin_drag(PROBLEMS, start);
    let over = pos2(10.0, 360.0);
    let target = dock.update_drag(over);
    println!("drop target: {:?} on {:?}", target.zone, target.pane);
    dock.end_drag(over);
    dock.update_layout(canvas);
    print_panes("after drop", &dock.get_pane_infos());

    let saved = dock.split_view().try_serialize_pretty()?;
    println!("saved layout:\n{saved}");

    dock.reset_splits();
    dock.update_layout(canvas);
    print_panes("reset", &dock.get_pane_infos());

    dock.split_view_mut().try_deserialize(&saved)?;
    dock.update_layout(canvas);
    print_panes("restored", &dock.get_pane_infos());

    println!("event log:\n{}", dock.debug_log_text());
    Ok(())
}
