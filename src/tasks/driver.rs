//! Controller task: the single logical thread all stimuli funnel into

use chrono::Utc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::state::{Button, Event, Intent, NapController, NapStatus};

/// Input coming from the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserInput {
    /// Physical button, interpreted according to the current mode
    Press(Button),
    /// Explicit intent
    Intent(Intent),
}

/// Answer to a user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputReply {
    pub status: NapStatus,
    /// Failure raised by this input, e.g. a denied wake request
    pub failure: Option<String>,
}

/// Messages accepted by `controller_task`
#[derive(Debug)]
pub enum Inbound {
    /// Timer and wake deliveries
    Event(Event),
    /// User input, optionally answered with the resulting status
    Input {
        input: UserInput,
        reply: Option<oneshot::Sender<InputReply>>,
    },
}

/// Own the controller and apply inbound messages one at a time until the
/// channel closes or `shutdown` fires. Publishes the status after each
/// message and returns the shut-down controller.
pub async fn controller_task(
    mut controller: NapController,
    mut inbound: mpsc::Receiver<Inbound>,
    status_tx: watch::Sender<NapStatus>,
    mut shutdown: oneshot::Receiver<()>,
) -> NapController {
    info!("Starting controller task in {} mode", controller.mode());

    loop {
        tokio::select! {
            message = inbound.recv() => {
                let Some(message) = message else {
                    debug!("Inbound channel closed");
                    break;
                };
                let now = Utc::now();
                // Handlers write the persisted records synchronously; each is a few bytes
                let reply = match message {
                    Inbound::Event(event) => {
                        debug!("Event: {:?}", event);
                        controller.handle(event, now);
                        None
                    }
                    Inbound::Input { input, reply } => {
                        debug!("Input: {:?}", input);
                        match input {
                            UserInput::Press(button) => controller.press(button, now),
                            UserInput::Intent(intent) => controller.handle(Event::Intent(intent), now),
                        }
                        reply
                    }
                };

                // Watchers see the new status before the requester is answered
                let failure = controller.take_failure();
                let status = controller.status();
                if status_tx.send(status.clone()).is_err() {
                    warn!("No status subscribers left");
                }
                if let Some(reply) = reply {
                    // The requester may have given up waiting
                    reply.send(InputReply { status, failure }).ok();
                }
            }
            _ = &mut shutdown => {
                info!("Controller task received shutdown");
                break;
            }
        }
    }

    controller.shutdown();
    status_tx.send(controller.status()).ok();
    controller
}
