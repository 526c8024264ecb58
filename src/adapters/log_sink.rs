//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the ESP-IDF
//! logger (UART console in production). Telemetry is rendered as one JSON
//! object per line so it can be scraped off the console.

use log::{debug, info, warn};

use crate::app::events::{ActuationCause, AppEvent};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => info!("START | actuator parked at neutral"),
            AppEvent::CommandAccepted(token) => info!("CMD   | {:?}", token),
            AppEvent::WaitArmed { pending } => {
                info!("WAIT  | armed, {} GO pending", pending);
            }
            AppEvent::GoCancelled { remaining } => {
                info!("WAIT  | GO released, {} remaining", remaining);
            }
            AppEvent::EarlyConfirmation => {
                warn!("WAIT  | confirmation was latched before this GO");
            }
            AppEvent::Actuated { state, cause } => match cause {
                ActuationCause::Pressure => debug!("MOTOR | {:?} <- {:?}", state, cause),
                _ => info!("MOTOR | {:?} <- {:?}", state, cause),
            },
            AppEvent::GraceExpired { waited_ms } => {
                info!("WAIT  | {} ms without confirmation, proceeding", waited_ms);
            }
            AppEvent::SensorSuppressed { .. } => {
                debug!("FSR   | skipped (command interlock)");
            }
            AppEvent::Telemetry(t) => match serde_json::to_string(t) {
                Ok(json) => info!("TELEM | {}", json),
                Err(e) => warn!("TELEM | encode failed: {}", e),
            },
        }
    }
}
