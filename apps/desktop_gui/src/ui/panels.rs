//! Form and record list panels.

use client_core::{DraftKind, StoreOp};
use eframe::egui;
use shared::domain::CinemaField;

use crate::backend_bridge::commands::BackendCommand;
use crate::ui::app::CinemaApp;

fn placeholder(field: CinemaField) -> &'static str {
    match field {
        CinemaField::Movie => "Enter movie name",
        CinemaField::Description => "Enter description",
        CinemaField::Image => "Enter image URL",
    }
}

pub fn show_form(app: &mut CinemaApp, ui: &mut egui::Ui) {
    let editing = app.snapshot.draft.kind() == DraftKind::Edit;

    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.heading(if editing { "Edit Cinema" } else { "Add New Cinema" });
        ui.add_space(8.0);

        egui::Grid::new("cinema_form")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                for field in CinemaField::ALL {
                    ui.label(field.label());
                    let response = ui.add(
                        egui::TextEdit::singleline(app.form.get_mut(field))
                            .hint_text(placeholder(field))
                            .desired_width(f32::INFINITY),
                    );
                    if response.changed() {
                        let value = app.form.get(field).to_string();
                        app.send(BackendCommand::SetField { field, value });
                    }
                    ui.end_row();
                }
            });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            let in_flight = app.snapshot.submit_in_flight();
            let label = if editing { "Update" } else { "Save" };
            if ui
                .add_enabled(!in_flight, egui::Button::new(label))
                .clicked()
            {
                app.send(BackendCommand::Submit);
            }
            if in_flight {
                ui.spinner();
            }
            if editing && ui.button("Cancel").clicked() {
                app.send(BackendCommand::CancelEdit);
            }
        });
    });
}

pub fn show_records(app: &mut CinemaApp, ui: &mut egui::Ui) {
    if app.snapshot.is_loading {
        ui.vertical_centered(|ui| {
            ui.spinner();
            ui.label("Loading...");
        });
        return;
    }

    if app.snapshot.records.is_empty() {
        ui.vertical_centered(|ui| {
            ui.weak("No cinema records yet.");
        });
        return;
    }

    let records = app.snapshot.records.clone();
    for record in &records {
        let deleting = app.snapshot.is_pending(&StoreOp::Delete(record.id.clone()));
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(egui::RichText::new(record.movie.as_str()).heading().strong());
            ui.label(record.description.as_str());
            ui.hyperlink_to(record.image.as_str(), record.image.as_str());
            ui.horizontal(|ui| {
                if ui.button("Edit").clicked() {
                    app.send(BackendCommand::BeginEdit(record.clone()));
                }
                if ui
                    .add_enabled(!deleting, egui::Button::new("Delete"))
                    .clicked()
                {
                    app.send(BackendCommand::Delete {
                        id: record.id.clone(),
                    });
                }
                if deleting {
                    ui.spinner();
                }
            });
        });
        ui.add_space(8.0);
    }
}
