//! Timer slots backed by tokio sleeps

use std::{collections::HashMap, time::Duration};
use tokio::{sync::mpsc, task::JoinHandle, time::sleep};
use tracing::debug;

use crate::{
    state::Event,
    timer::{TimerPort, TimerSlot},
};
use super::driver::Inbound;

/// Each armed slot is a spawned task that sleeps and then posts the tick
/// to the controller. Re-arming or disarming a slot aborts its task.
#[derive(Debug)]
pub struct TokioTimers {
    tx: mpsc::Sender<Inbound>,
    tasks: HashMap<TimerSlot, JoinHandle<()>>,
}

impl TokioTimers {
    pub fn new(tx: mpsc::Sender<Inbound>) -> Self {
        Self {
            tx,
            tasks: HashMap::new(),
        }
    }
}

impl TimerPort for TokioTimers {
    fn arm(&mut self, slot: TimerSlot, delay: Duration, generation: u64) {
        self.disarm(slot);

        let event = match slot {
            TimerSlot::Countdown => Event::Tick { generation },
            TimerSlot::Vibrate => Event::VibrateTick { generation },
        };
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            if tx.send(Inbound::Event(event)).await.is_err() {
                debug!("Controller gone, dropping {:?}", event);
            }
        });
        self.tasks.insert(slot, handle);
    }

    fn disarm(&mut self, slot: TimerSlot) {
        if let Some(handle) = self.tasks.remove(&slot) {
            handle.abort();
        }
    }
}

impl Drop for TokioTimers {
    fn drop(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }
}
