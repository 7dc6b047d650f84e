use std::time::Duration;

use client_core::ControllerSnapshot;
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::CinemaFields;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{events::UiEvent, orchestration::dispatch_backend_command};
use crate::ui::panels;

pub struct CinemaApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    pub(crate) snapshot: ControllerSnapshot,
    /// Local copy of the active draft so typing never waits on the worker.
    pub(crate) form: CinemaFields,
    form_revision: Option<u64>,
    pub(crate) alert: Option<String>,
    pub(crate) status: String,
    api_url: String,
}

impl CinemaApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>, api_url: String) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            snapshot: ControllerSnapshot {
                is_loading: true,
                ..ControllerSnapshot::default()
            },
            form: CinemaFields::default(),
            form_revision: None,
            alert: None,
            status: "Loading cinema records...".to_string(),
            api_url,
        }
    }

    pub(crate) fn send(&mut self, cmd: BackendCommand) {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status);
    }

    pub(crate) fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Snapshot(snapshot) => {
                // Field edits keep the revision; only wholesale draft swaps replace the form.
                if self.form_revision != Some(snapshot.draft_revision) {
                    self.form = snapshot.draft.fields().clone();
                    self.form_revision = Some(snapshot.draft_revision);
                }
                if !snapshot.is_loading && self.snapshot.is_loading {
                    self.status = format!("{} cinema records", snapshot.records.len());
                }
                self.snapshot = snapshot;
            }
            UiEvent::Info(message) => {
                self.status = message;
            }
            UiEvent::Alert(message) => {
                self.alert = Some(message);
            }
            UiEvent::Error(err) => {
                tracing::warn!(
                    category = ?err.category(),
                    context = ?err.context(),
                    detail = err.message(),
                    "request failed"
                );
                self.status = err.user_message();
            }
        }
    }

    fn show_alert(&mut self, ctx: &egui::Context) {
        let Some(message) = self.alert.clone() else {
            return;
        };
        egui::Window::new("Cinema Collection")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message.as_str());
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    self.alert = None;
                }
            });
    }
}

impl eframe::App for CinemaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(self.status.as_str());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(self.api_url.as_str());
                });
            });
        });

        let blocked = self.alert.is_some();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!blocked, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        ui.vertical_centered(|ui| {
                            ui.heading("Cinema Collection");
                        });
                        ui.add_space(12.0);
                        panels::show_form(self, ui);
                        ui.add_space(16.0);
                        panels::show_records(self, ui);
                    });
            });
        });

        self.show_alert(ctx);

        let poll = if self.snapshot.is_loading || !self.snapshot.pending.is_empty() {
            Duration::from_millis(16)
        } else {
            Duration::from_millis(100)
        };
        ctx.request_repaint_after(poll);
    }
}
