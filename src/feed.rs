use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::analysis_fetch::{AnalysisService, CapabilityRequest};
use crate::narrative;
use crate::state::{Delta, ProviderCommand};

/// Receives invocation commands and runs each one on its own worker thread.
/// Results come back as `Delta::Resolved` in the order requests finish.
pub fn spawn_provider(
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
    service: Arc<dyn AnalysisService>,
) {
    thread::spawn(move || {
        let _ = tx.send(Delta::Log(format!(
            "[INFO] Analysis provider: {}",
            service.describe()
        )));
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::Invoke {
                    request_id,
                    request,
                } => spawn_invocation(tx.clone(), Arc::clone(&service), request_id, request),
            }
        }
    });
}

pub fn spawn_invocation(
    tx: Sender<Delta>,
    service: Arc<dyn AnalysisService>,
    request_id: u64,
    request: CapabilityRequest,
) {
    thread::spawn(move || {
        let _ = tx.send(resolve(service.as_ref(), request_id, &request));
    });
}

/// Runs one request to completion on the calling thread.
pub fn resolve(
    service: &dyn AnalysisService,
    request_id: u64,
    request: &CapabilityRequest,
) -> Delta {
    let outcome = service
        .invoke(request)
        .map(|result| narrative::render(&result));
    Delta::Resolved {
        request_id,
        capability: request.capability,
        outcome,
    }
}
