use chrono::NaiveDate;
use egui::{Color32, Context, RichText, Window};

use crate::model::{Item, ItemId};
use crate::timeline::DateSpan;
use crate::ui::theme;

/// Fields of the item being edited. Changes apply only on save.
#[derive(Debug, Clone, PartialEq)]
pub struct EditDialog {
    pub item: ItemId,
    pub title: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl EditDialog {
    pub fn new(item: &Item) -> Self {
        Self {
            item: item.id,
            title: item.title.clone(),
            start: item.start,
            end: item.end,
        }
    }

    /// The edited dates, with an end before the start collapsed onto it.
    pub fn span(&self) -> DateSpan {
        DateSpan::new(self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    None,
    Save,
    Cancel,
}

/// Render the "Edit Item" dialog.
pub fn show_edit_dialog(dialog: &mut EditDialog, ctx: &Context) -> DialogAction {
    let mut action = DialogAction::None;
    Window::new(RichText::new("Edit Item").strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([theme::DIALOG_WIDTH, 0.0])
        .show(ctx, |ui| {
            ui.visuals_mut().extreme_bg_color = theme::BG_FIELD;
            ui.add_space(4.0);

            egui::Grid::new("edit_item_grid")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Title").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [220.0, 24.0],
                        egui::TextEdit::singleline(&mut dialog.title).hint_text("Item title..."),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Start").color(theme::TEXT_SECONDARY));
                    ui.add(egui_extras::DatePickerButton::new(&mut dialog.start).id_salt("edit_dp_start"));
                    ui.end_row();

                    ui.label(RichText::new("End").color(theme::TEXT_SECONDARY));
                    ui.add(egui_extras::DatePickerButton::new(&mut dialog.end).id_salt("edit_dp_end"));
                    ui.end_row();
                });

            if dialog.end < dialog.start {
                ui.label(
                    RichText::new("End is before start; it will be moved to the start date.")
                        .small()
                        .color(theme::TEXT_DIM),
                );
            }

            ui.add_space(6.0);
            ui.separator();
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                let save = egui::Button::new(RichText::new("Save").color(Color32::WHITE))
                    .fill(theme::ACCENT)
                    .rounding(egui::Rounding::same(4.0));
                if ui.add_sized([80.0, 28.0], save).clicked() {
                    action = DialogAction::Save;
                }
                if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
                    action = DialogAction::Cancel;
                }
            });
            ui.add_space(2.0);
        });

    if action == DialogAction::None && ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        action = DialogAction::Cancel;
    }
    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverted_dialog_dates_collapse() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let item = Item::new("Beta", start, start);
        let mut dialog = EditDialog::new(&item);
        dialog.end = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(dialog.span(), DateSpan::new(start, start));
    }
}
