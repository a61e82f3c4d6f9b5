#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use eframe::egui;
use egui::{Align2, Color32, CursorIcon, FontId, Pos2, Rect, Stroke, StrokeKind};
use egui_split_dock::{
    BuilderSplit, ContentId, DockBuildError, DockBuilder, DockSystem, DropZone, PaneInfo,
    SplitDirection,
};

const HIERARCHY: ContentId = ContentId(1);
const PROJECT: ContentId = ContentId(2);
const SCENE_VIEW: ContentId = ContentId(3);
const GAME_VIEW: ContentId = ContentId(4);
const CONSOLE: ContentId = ContentId(5);
const INSPECTOR: ContentId = ContentId(6);

/// Pointer travel before a pressed tab turns into a dock drag.
const DRAG_THRESHOLD: f32 = 6.0;
const MAX_TAB_WIDTH: f32 = 120.0;

fn title(content: ContentId) -> String {
    match content {
        HIERARCHY => "Hierarchy".to_owned(),
        PROJECT => "Project".to_owned(),
        SCENE_VIEW => "Scene View".to_owned(),
        GAME_VIEW => "Game View".to_owned(),
        CONSOLE => "Console".to_owned(),
        INSPECTOR => "Inspector".to_owned(),
        ContentId(n) => format!("Panel {n}"),
    }
}

fn unity_like_layout() -> Result<DockSystem, DockBuildError> {
    // +-------------+-------------------------+-------------+
    // |  Hierarchy  |   Scene View | Game View |             |
    // |-------------|-------------------------|  Inspector  |
    // |   Project   |         Console         |             |
    // +-------------+-------------------------+-------------+
    let mut b = DockBuilder::new();
    let dockspace = b.add_node();
    let (inspector, rest) = b.split_node(dockspace, BuilderSplit::Right, 0.25);
    let (left, center) = b.split_node(rest, BuilderSplit::Left, 0.3);
    let (project, hierarchy) = b.split_node(left, BuilderSplit::Down, 0.4);
    let (console, scene) = b.split_node(center, BuilderSplit::Down, 0.3);

    b.dock_content(HIERARCHY, hierarchy)?;
    b.dock_content(PROJECT, project)?;
    b.dock_contents([SCENE_VIEW, GAME_VIEW], scene)?;
    b.dock_content(CONSOLE, console)?;
    b.dock_content(INSPECTOR, inspector)?;
    b.set_active(SCENE_VIEW);
    Ok(DockSystem::from(b.finish()?))
}

/// Rects of the tab buttons of one pane, left to right.
fn tab_rects(info: &PaneInfo) -> Vec<Rect> {
    let count = info.tabs.len().max(1) as f32;
    let width = (info.tab_strip.width() / count).min(MAX_TAB_WIDTH);
    (0..info.tabs.len())
        .map(|i| {
            Rect::from_min_size(
                info.tab_strip.min + egui::vec2(width * i as f32, 0.0),
                egui::vec2(width, info.tab_strip.height()),
            )
        })
        .collect()
}

fn tab_at(infos: &[PaneInfo], pos: Pos2) -> Option<(usize, usize)> {
    infos.iter().enumerate().find_map(|(pane, info)| {
        tab_rects(info)
            .iter()
            .position(|rect| rect.contains(pos))
            .map(|tab| (pane, tab))
    })
}

struct PressedTab {
    content: ContentId,
    origin: Pos2,
}

struct App {
    dock: DockSystem,
    pressed_tab: Option<PressedTab>,
    splitter_direction: Option<SplitDirection>,
    saved: Option<String>,
    next_content: u64,
    status: String,
}

impl App {
    fn new() -> Self {
        let dock = match unity_like_layout() {
            Ok(dock) => dock,
            Err(err) => {
                log::error!("default layout failed: {err}");
                DockSystem::with_options(HIERARCHY, Default::default())
            }
        };
        Self {
            dock,
            pressed_tab: None,
            splitter_direction: None,
            saved: None,
            next_content: 100,
            status: String::new(),
        }
    }

    fn fresh_content(&mut self) -> ContentId {
        self.next_content += 1;
        ContentId(self.next_content)
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Reset (Unity-like)").clicked() {
                match unity_like_layout() {
                    Ok(dock) => self.dock = dock,
                    Err(err) => self.status = err.to_string(),
                }
            }
            if ui.button("Split right").clicked() {
                let content = self.fresh_content();
                self.dock.split_right(content, 0.5);
            }
            if ui.button("Split down").clicked() {
                let content = self.fresh_content();
                self.dock.split_down(content, 0.5);
            }
            if ui.button("Close active").clicked() {
                let active = self.dock.active_figure_index();
                self.dock.close_split(active);
            }
            if ui.button("Single pane").clicked() {
                self.dock.reset_splits();
            }
            ui.separator();
            if ui.button("Save").clicked() {
                self.saved = Some(self.dock.serialize());
                self.status = "layout saved".to_owned();
            }
            if ui
                .add_enabled(self.saved.is_some(), egui::Button::new("Load"))
                .clicked()
                && let Some(saved) = &self.saved
            {
                self.status = match self.dock.split_view_mut().try_deserialize(saved) {
                    Ok(()) => "layout restored".to_owned(),
                    Err(err) => err.to_string(),
                };
            }
            ui.separator();
            ui.label(format!(
                "{} panes, active: {}",
                self.dock.pane_count(),
                title(self.dock.active_figure_index())
            ));
            ui.label(&self.status);
        });
    }

    fn handle_input(&mut self, ctx: &egui::Context, infos: &[PaneInfo]) {
        let (pos, pressed, down, released) = ctx.input(|i| {
            (
                i.pointer.interact_pos(),
                i.pointer.primary_pressed(),
                i.pointer.primary_down(),
                i.pointer.primary_released(),
            )
        });
        let Some(pos) = pos else {
            return;
        };

        if let Some(direction) = self.dock.splitter_direction_at(pos).or(self.splitter_direction) {
            ctx.set_cursor_icon(match direction {
                SplitDirection::Horizontal => CursorIcon::ResizeHorizontal,
                SplitDirection::Vertical => CursorIcon::ResizeVertical,
            });
        }

        if pressed {
            if let Some(direction) = self.dock.splitter_direction_at(pos)
                && self.dock.begin_splitter_drag(pos)
            {
                self.splitter_direction = Some(direction);
            } else if let Some((pane, tab)) = tab_at(infos, pos) {
                let info = &infos[pane];
                self.dock.activate_local_tab(info.pane_id, tab);
                self.pressed_tab = Some(PressedTab {
                    content: info.tabs[tab],
                    origin: pos,
                });
            } else {
                self.dock.activate_pane_at(pos);
            }
        }

        if down {
            if let Some(direction) = self.splitter_direction {
                let axis = match direction {
                    SplitDirection::Horizontal => pos.x,
                    SplitDirection::Vertical => pos.y,
                };
                self.dock.update_splitter_drag(axis);
            } else if self.dock.is_dragging() {
                self.dock.update_drag(pos);
            } else if let Some(pressed_tab) = &self.pressed_tab
                && pressed_tab.origin.distance(pos) > DRAG_THRESHOLD
            {
                self.dock.begin_drag(pressed_tab.content, pressed_tab.origin);
                self.dock.update_drag(pos);
            }
        }

        if released {
            if self.splitter_direction.take().is_some() {
                self.dock.end_splitter_drag();
            } else if self.dock.is_dragging() {
                self.dock.end_drag(pos);
            }
            self.pressed_tab = None;
        }
    }

    fn paint(&self, painter: &egui::Painter, visuals: &egui::Visuals, infos: &[PaneInfo]) {
        let font = FontId::proportional(13.0);
        for info in infos {
            painter.rect_filled(info.bounds, 0.0, visuals.panel_fill);
            painter.rect_filled(info.tab_strip, 0.0, visuals.faint_bg_color);

            for (i, (rect, &content)) in tab_rects(info).iter().zip(&info.tabs).enumerate() {
                let selected = i == info.active_tab;
                let fill = if selected {
                    visuals.selection.bg_fill
                } else {
                    visuals.widgets.inactive.bg_fill
                };
                painter.rect_filled(rect.shrink(1.0), 2.0, fill);
                painter.text(
                    rect.left_center() + egui::vec2(6.0, 0.0),
                    Align2::LEFT_CENTER,
                    title(content),
                    font.clone(),
                    visuals.text_color(),
                );
            }

            painter.text(
                info.bounds.center(),
                Align2::CENTER_CENTER,
                title(info.content_id),
                FontId::proportional(20.0),
                visuals.weak_text_color(),
            );

            let outline = if info.is_active {
                Stroke::new(2.0, visuals.selection.stroke.color)
            } else {
                Stroke::new(1.0, visuals.widgets.noninteractive.bg_stroke.color)
            };
            painter.rect_stroke(
                info.bounds.union(info.tab_strip),
                0.0,
                outline,
                StrokeKind::Inside,
            );
        }

        let target = self.dock.current_drop_target();
        if !target.is_none() {
            let color = if target.zone == DropZone::Center {
                Color32::from_rgba_unmultiplied(80, 160, 255, 40)
            } else {
                Color32::from_rgba_unmultiplied(80, 160, 255, 70)
            };
            painter.rect_filled(target.highlight, 4.0, color);
        }
        if let (Some(content), Some(pointer)) =
            (self.dock.dragging_content(), self.dock.drag_pointer())
        {
            painter.text(
                pointer + egui::vec2(12.0, 12.0),
                Align2::LEFT_TOP,
                title(content),
                font,
                visuals.strong_text_color(),
            );
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top").show(ctx, |ui| self.toolbar(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.dock.update_layout(ui.max_rect());
                let infos = self.dock.get_pane_infos();
                self.handle_input(ctx, &infos);

                // Input may have changed the layout.
                self.dock.update_layout(ui.max_rect());
                let infos = self.dock.get_pane_infos();
                self.paint(ui.painter(), ui.visuals(), &infos);
            });
    }
}

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("egui_split_dock: game engine layout"),
        ..Default::default()
    };
    eframe::run_native(
        "egui_split_dock: game engine layout",
        options,
        Box::new(|_cc| Ok(Box::new(App::new()))),
    )
}
