use chrono::NaiveDate;

use crate::config::TimelineConfig;
use crate::error::ConfigError;
use crate::model::{EdgeId, ItemId, Roadmap};
use crate::timeline::{DateSpan, Period, TimelineEngine, TimelineEvent, ZoomChange};
use crate::ui;
use crate::ui::dialogs::{DialogAction, EditDialog};
use crate::ui::gantt_chart::ChartState;

/// Main application state.
pub struct RoadmapApp {
    pub roadmap: Roadmap,
    pub engine: TimelineEngine,
    pub chart: ChartState,
    pub edit_dialog: Option<EditDialog>,
    pub status_message: String,
}

impl RoadmapApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: TimelineConfig) -> Result<Self, ConfigError> {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let today = Self::today();
        Self::headless(Roadmap::sample(today), config, today)
    }

    pub fn with_engine(roadmap: Roadmap, engine: TimelineEngine) -> Self {
        Self {
            roadmap,
            engine,
            chart: ChartState::default(),
            edit_dialog: None,
            status_message: "Ready".to_string(),
        }
    }

    /// Build an app around `roadmap` without a window, for tests.
    pub fn headless(roadmap: Roadmap, config: TimelineConfig, today: NaiveDate) -> Result<Self, ConfigError> {
        let engine = TimelineEngine::new(config, roadmap.timeline_range(today))?;
        Ok(Self::with_engine(roadmap, engine))
    }

    fn today() -> NaiveDate {
        chrono::Local::now().date_naive()
    }

    // --- View operations ---

    pub fn zoom_in(&mut self) {
        let change = self.engine.zoom_in(None);
        self.after_zoom(change);
    }

    pub fn zoom_out(&mut self) {
        let change = self.engine.zoom_out(None);
        self.after_zoom(change);
    }

    pub fn set_period(&mut self, period: Period) {
        let change = self.engine.set_period(period);
        self.after_zoom(change);
    }

    fn after_zoom(&mut self, change: Option<ZoomChange>) {
        if change.is_some() {
            self.chart.request_scroll(self.engine.viewport().scroll);
        }
    }

    /// Fit the timeline window to the items, keeping the view on the same
    /// dates when its start moves.
    fn sync_range(&mut self, today: NaiveDate) {
        let scroll = self.engine.viewport().scroll;
        self.engine.set_range(self.roadmap.timeline_range(today));
        if self.engine.viewport().scroll != scroll {
            self.chart.request_scroll(self.engine.viewport().scroll);
        }
    }

    pub fn scroll_to_today(&mut self) {
        self.chart.request_scroll_to_today();
    }

    // --- Timeline events ---

    /// Apply the outcome of this frame's gestures to the roadmap.
    pub fn apply_events(&mut self, events: Vec<TimelineEvent>) {
        for event in events {
            match event {
                TimelineEvent::Edit(item) => self.open_editor(item),
                TimelineEvent::CommitDates { item, start, end } => {
                    self.commit_dates(item, DateSpan::new(start, end));
                }
                TimelineEvent::CreateDependency {
                    predecessor,
                    successor,
                } => self.create_dependency(predecessor, successor),
                TimelineEvent::DeleteDependencyRequest(edge) => {
                    if self.confirm_delete(edge) {
                        self.delete_dependency(edge);
                    }
                }
            }
        }
    }

    pub fn open_editor(&mut self, item: ItemId) {
        self.edit_dialog = self.roadmap.item(item).map(EditDialog::new);
    }

    pub fn commit_dates(&mut self, item: ItemId, span: DateSpan) {
        if !self.roadmap.apply_dates(item, span) {
            tracing::debug!(%item, "ignoring dates for unknown item");
            return;
        }
        if let Some(item) = self.roadmap.item(item) {
            self.status_message = format!(
                "Updated '{}' ({} → {})",
                item.title,
                span.start.format("%Y-%m-%d"),
                span.end.format("%Y-%m-%d")
            );
        }
    }

    pub fn create_dependency(&mut self, predecessor: ItemId, successor: ItemId) {
        if self.roadmap.add_dependency(predecessor, successor).is_none() {
            self.status_message = "Dependency already exists".to_string();
            return;
        }
        let name = |id: ItemId| {
            self.roadmap
                .item(id)
                .map(|item| item.title.clone())
                .unwrap_or_default()
        };
        self.status_message = format!("Linked '{}' → '{}'", name(predecessor), name(successor));
    }

    fn confirm_delete(&self, edge: EdgeId) -> bool {
        let Some(dependency) = self.roadmap.dependencies.iter().find(|d| d.id == edge) else {
            return false;
        };
        let name = |id: ItemId| {
            self.roadmap
                .item(id)
                .map(|item| item.title.as_str())
                .unwrap_or("?")
        };
        let answer = rfd::MessageDialog::new()
            .set_title("Remove dependency")
            .set_description(format!(
                "Remove the link '{}' → '{}'?",
                name(dependency.predecessor),
                name(dependency.successor)
            ))
            .set_buttons(rfd::MessageButtons::YesNo)
            .show();
        answer == rfd::MessageDialogResult::Yes
    }

    pub fn delete_dependency(&mut self, edge: EdgeId) {
        if self.roadmap.remove_dependency(edge).is_some() {
            self.status_message = "Dependency removed".to_string();
        }
    }

    fn save_edit(&mut self, dialog: EditDialog) {
        if let Some(item) = self.roadmap.items.iter_mut().find(|i| i.id == dialog.item) {
            let title = dialog.title.trim();
            if !title.is_empty() && title != item.title {
                item.title = title.to_string();
                self.roadmap.touch();
            }
        }
        self.commit_dates(dialog.item, dialog.span());
    }
}

impl eframe::App for RoadmapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::apply_theme(ctx);
        let today = Self::today();

        // Items may have grown past the window since the last frame.
        self.sync_range(today);

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_HEADER)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .font(ui::theme::font_status())
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!(
                                "Items: {} · Links: {}",
                                self.roadmap.items.len(),
                                self.roadmap.dependencies.len()
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        // Central panel: Gantt chart
        let mut events = Vec::new();
        let chart_frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        egui::CentralPanel::default().frame(chart_frame).show(ctx, |ui| {
            ui::gantt_chart::show_gantt_chart(
                ui,
                &mut self.engine,
                &mut self.chart,
                &self.roadmap.items,
                &self.roadmap.dependencies,
                today,
                &mut events,
            );
        });
        self.apply_events(events);

        // Dialogs
        if let Some(dialog) = &mut self.edit_dialog {
            match ui::dialogs::show_edit_dialog(dialog, ctx) {
                DialogAction::None => {}
                DialogAction::Cancel => self.edit_dialog = None,
                DialogAction::Save => {
                    if let Some(dialog) = self.edit_dialog.take() {
                        self.save_edit(dialog);
                    }
                }
            }
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.engine.cancel_gestures();
    }
}
