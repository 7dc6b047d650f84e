//! Backend worker: owns the tokio runtime and the cinema controller.

use std::{sync::Arc, thread};

use client_core::{
    CinemaController, ClientSettings, ControllerError, ControllerEvent, HttpCinemaStore,
    MutationOutcome, PreparedSubmit,
};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use tokio::{runtime::Runtime, sync::broadcast::error::RecvError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorCategory, UiErrorContext, UiEvent};

pub fn launch(settings: ClientSettings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                startup_failure(&ui_tx, format!("failed to build runtime: {err}"));
                return;
            }
        };

        let store = match HttpCinemaStore::from_settings(&settings) {
            Ok(store) => store,
            Err(err) => {
                startup_failure(&ui_tx, format!("{err:#}"));
                return;
            }
        };
        tracing::info!(api_url = %store.base_url(), "backend worker ready");
        let controller = Arc::new(CinemaController::new(Arc::new(store)));

        runtime.spawn(forward_events(
            Arc::clone(&controller),
            controller.subscribe(),
            ui_tx.clone(),
        ));
        runtime.spawn(run_network_command(
            Arc::clone(&controller),
            BackendCommand::Refresh,
            ui_tx.clone(),
        ));

        while let Ok(cmd) = cmd_rx.recv() {
            dispatch(&runtime, &controller, cmd, &ui_tx);
        }
        tracing::info!("ui command queue closed; backend worker exiting");
    });
}

fn startup_failure(ui_tx: &Sender<UiEvent>, message: String) {
    tracing::error!("backend worker startup failure: {message}");
    let _ = ui_tx.try_send(UiEvent::Error(UiError::new(
        UiErrorCategory::Unknown,
        UiErrorContext::BackendStartup,
        message,
    )));
}

fn dispatch(
    runtime: &Runtime,
    controller: &Arc<CinemaController>,
    cmd: BackendCommand,
    ui_tx: &Sender<UiEvent>,
) {
    match cmd {
        cmd if cmd.is_local() => runtime.block_on(apply_local_command(controller, cmd)),
        // The draft is captured in queue order; only the store call runs in the background.
        BackendCommand::Submit => match runtime.block_on(controller.prepare_submit()) {
            Ok(prepared) => {
                runtime.spawn(send_prepared(
                    Arc::clone(controller),
                    prepared,
                    ui_tx.clone(),
                ));
            }
            Err(err) => report_result("submit", Err(err), ui_tx),
        },
        cmd => {
            runtime.spawn(run_network_command(
                Arc::clone(controller),
                cmd,
                ui_tx.clone(),
            ));
        }
    }
}

async fn apply_local_command(controller: &CinemaController, cmd: BackendCommand) {
    match cmd {
        BackendCommand::SetField { field, value } => controller.set_field(field, value).await,
        BackendCommand::BeginEdit(record) => controller.begin_edit(&record).await,
        BackendCommand::CancelEdit => {
            controller.cancel_edit().await;
        }
        other => tracing::warn!(command = other.name(), "not a local command"),
    }
}

async fn send_prepared(
    controller: Arc<CinemaController>,
    prepared: PreparedSubmit,
    ui_tx: Sender<UiEvent>,
) {
    let result = controller.send(prepared).await.map(Some);
    report_result("submit", result, &ui_tx);
}

async fn run_network_command(
    controller: Arc<CinemaController>,
    cmd: BackendCommand,
    ui_tx: Sender<UiEvent>,
) {
    let name = cmd.name();
    let result = match cmd {
        BackendCommand::Refresh => controller.refresh().await.map(|_| None),
        BackendCommand::Submit => controller.submit().await.map(Some),
        BackendCommand::Delete { id } => controller.delete_record(&id).await.map(Some),
        other => {
            tracing::warn!(command = other.name(), "not a network command");
            return;
        }
    };
    report_result(name, result, &ui_tx);
}

fn report_result(
    name: &'static str,
    result: Result<Option<MutationOutcome>, ControllerError>,
    ui_tx: &Sender<UiEvent>,
) {
    let event = match result {
        Ok(None) => return,
        Ok(Some(outcome)) if outcome.refreshed => UiEvent::Info(format!("{} done", outcome.op)),
        Ok(Some(outcome)) => UiEvent::Info(format!(
            "{} done, but the list could not be reloaded",
            outcome.op
        )),
        Err(ControllerError::Validation(err)) => UiEvent::Alert(err.to_string()),
        Err(err) => {
            tracing::debug!(command = name, error = %err, "command failed");
            UiEvent::Error(UiError::from_controller(&err))
        }
    };
    let _ = ui_tx.try_send(event);
}

async fn forward_events(
    controller: Arc<CinemaController>,
    mut events: tokio::sync::broadcast::Receiver<ControllerEvent>,
    ui_tx: Sender<UiEvent>,
) {
    loop {
        let snapshot = match events.recv().await {
            Ok(ControllerEvent::StateChanged(snapshot)) => snapshot,
            Ok(ControllerEvent::RequestFailed { op, message }) => {
                tracing::debug!(%op, %message, "store request failed");
                continue;
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "controller events lagged; resyncing");
                controller.snapshot().await
            }
            Err(RecvError::Closed) => break,
        };
        if let Err(TrySendError::Disconnected(_)) = ui_tx.try_send(UiEvent::Snapshot(snapshot)) {
            break;
        }
    }
}
