use egui::{menu, RichText, Ui};
use egui_phosphor::regular::{CALENDAR_BLANK, MAGNIFYING_GLASS_MINUS, MAGNIFYING_GLASS_PLUS};

use crate::app::RoadmapApp;
use crate::timeline::Period;

/// Render the top toolbar / menu bar.
pub fn show_toolbar(app: &mut RoadmapApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button("  View  ", |ui| {
            if ui.button("  Zoom In        Ctrl+Scroll ↑").clicked() {
                app.zoom_in();
                ui.close_menu();
            }
            if ui.button("  Zoom Out      Ctrl+Scroll ↓").clicked() {
                app.zoom_out();
                ui.close_menu();
            }
            ui.separator();
            ui.label(RichText::new("Timeline Scale").small().weak());
            let current = app.engine.zoom().period();
            for period in Period::ALL {
                if ui.radio(current == period, period.label()).clicked() {
                    app.set_period(period);
                    ui.close_menu();
                }
            }
            ui.separator();
            if ui.button("  Go to Today").clicked() {
                app.scroll_to_today();
                ui.close_menu();
            }
        });

        ui.separator();

        let zoom = app.engine.zoom();
        let (can_zoom_in, can_zoom_out) = (zoom.can_zoom_in(), zoom.can_zoom_out());
        if ui
            .add_enabled(can_zoom_out, egui::Button::new(MAGNIFYING_GLASS_MINUS))
            .on_hover_text("Zoom out")
            .clicked()
        {
            app.zoom_out();
        }
        if ui
            .add_enabled(can_zoom_in, egui::Button::new(MAGNIFYING_GLASS_PLUS))
            .on_hover_text("Zoom in")
            .clicked()
        {
            app.zoom_in();
        }

        let current = app.engine.zoom().period();
        for period in Period::ALL {
            if ui.selectable_label(current == period, period.label()).clicked() {
                app.set_period(period);
            }
        }

        ui.separator();
        if ui
            .button(format!("{CALENDAR_BLANK}  Today"))
            .on_hover_text("Scroll to today")
            .clicked()
        {
            app.scroll_to_today();
        }

        // Right-aligned roadmap name and zoom status
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let zoom = app.engine.zoom();
            ui.label(
                RichText::new(format!(
                    "{} · level {}/{} · {:.1} px/day",
                    zoom.period().label(),
                    zoom.level(),
                    zoom.max_level(),
                    zoom.day_width()
                ))
                .size(11.0)
                .weak(),
            );
            ui.label(RichText::new(&app.roadmap.name).size(11.0).weak());
        });
    });
}
