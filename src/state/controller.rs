//! Nap state machine
//!
//! `NapController` is the only owner of the mode, the countdown and alarm
//! timer slots, the wake request and the persisted records. Every stimulus
//! (button intent, countdown tick, wake delivery, pulse tick) goes through
//! [`NapController::handle`] and runs to completion before the next one.
//!
//! ```text
//!            toggle                     tick (remaining <= 1)
//!   Wake ────────────────► Sleep ──────────────────────────────► Alarm
//!    ▲ ▲                    │  │        wake fired                 │
//!    │ └────── toggle ──────┘  └───────────────────────────────────┤
//!    │                                                             │
//!    └──────────── any button / pulse limit reached ───────────────┘
//! ```

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tracing::{debug, info, warn};

use crate::{
    error::{NapError, NapResult},
    scheduler::{WakeId, WakeScheduler},
    services::Haptics,
    store::NapStore,
    timer::{
        countdown::align_to_deadline, AlarmSequencer, CountdownEngine, PulseOutcome, TimerPort,
        SECONDS_PER_MINUTE, TICK_INTERVAL,
    },
};
use super::{Button, Event, Intent, LaunchReason, Mode, NapStatus};

/// Shortest nap that can be configured, in minutes
pub const MIN_DURATION: u32 = 10;
/// Longest nap that can be configured, in minutes
pub const MAX_DURATION: u32 = 90;
/// Nap length used when nothing usable is stored
pub const DEFAULT_DURATION: u32 = 20;

/// Failure indications kept for the presentation layer
const MAX_ERRORS: usize = 5;

/// Bring a stored or requested duration into the allowed range
pub fn clamp_minutes(minutes: u32) -> u32 {
    let clamped = minutes.clamp(MIN_DURATION, MAX_DURATION);
    if clamped != minutes {
        debug!("Clamped nap duration {} to {}", minutes, clamped);
    }
    clamped
}

/// Collaborators handed to the controller at start-up
pub struct Parts {
    pub store: Box<dyn NapStore>,
    pub scheduler: Box<dyn WakeScheduler>,
    pub timers: Box<dyn TimerPort>,
    pub haptics: Box<dyn Haptics>,
}

/// Result of an increment or decrement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    /// The duration changed to this value
    Changed(u32),
    /// Already at the bound, unchanged
    AtBound(u32),
    /// Not in Wake mode, nothing to adjust
    Ignored,
}

pub struct NapController {
    store: Box<dyn NapStore>,
    scheduler: Box<dyn WakeScheduler>,
    timers: Box<dyn TimerPort>,
    countdown: CountdownEngine,
    alarm: AlarmSequencer,

    mode: Mode,
    configured_minutes: u32,
    remaining_minutes: u32,
    /// Mirror of the outstanding wake request; `Some` only in Sleep
    wake_id: Option<WakeId>,
    /// Wall-clock time of the previous event, for detecting a clock moving backwards
    last_seen: Option<DateTime<Utc>>,
    errors: Vec<String>,
    /// Failure raised by the most recent event, until taken
    last_failure: Option<String>,
}

impl NapController {
    /// Rebuild the controller at process start.
    ///
    /// Loads the configured duration, then reconciles against the wake
    /// request left behind by a previous process: a live future request
    /// resumes the countdown aligned to its deadline, a past one raises the
    /// alarm, an unresolvable one is discarded.
    pub fn recover(parts: Parts, launch: LaunchReason, now: DateTime<Utc>) -> Self {
        let configured_minutes = match parts.store.load() {
            Ok(Some(minutes)) => clamp_minutes(minutes),
            Ok(None) => DEFAULT_DURATION,
            Err(e) => {
                warn!("Failed to load nap duration, using default: {}", e);
                DEFAULT_DURATION
            }
        };

        let mut controller = Self {
            store: parts.store,
            scheduler: parts.scheduler,
            timers: parts.timers,
            countdown: CountdownEngine::new(),
            alarm: AlarmSequencer::new(parts.haptics),
            mode: Mode::Wake,
            configured_minutes,
            remaining_minutes: 0,
            wake_id: None,
            last_seen: Some(now),
            errors: Vec::new(),
            last_failure: None,
        };

        if launch == LaunchReason::WakeFired {
            info!("Launched by wake request, raising alarm");
            controller.forget_wake_id();
            controller.enter_alarm("launch");
            return controller;
        }

        let persisted = match controller.store.load_wake_id() {
            Ok(id) => id,
            Err(e) => {
                warn!("Failed to load pending wake id, discarding it: {}", e);
                controller.discard_stale_wake();
                None
            }
        };

        if let Some(id) = persisted {
            controller.reconcile(id, now);
        }

        info!(
            "Recovered in {} mode, configured={}min",
            controller.mode, controller.configured_minutes
        );
        controller
    }

    fn reconcile(&mut self, id: WakeId, now: DateTime<Utc>) {
        let fire_at = match self.scheduler.query(id) {
            Ok(Some(fire_at)) => fire_at,
            Ok(None) => {
                info!("Pending {} no longer resolves, staying awake", id);
                self.discard_stale_wake();
                return;
            }
            Err(e) => {
                warn!("Failed to query {}, treating it as stale: {}", id, e);
                self.discard_stale_wake();
                return;
            }
        };

        self.wake_id = Some(id);
        let seconds_left = (fire_at - now).num_seconds();
        if seconds_left <= 0 {
            info!("Pending {} passed at {}, raising alarm", id, fire_at);
            self.enter_alarm("recovery");
            return;
        }

        let (minutes, next_tick) = align_to_deadline(seconds_left as u64);
        self.remaining_minutes = minutes;
        self.mode = Mode::Sleep;
        self.countdown.schedule_tick(self.timers.as_mut(), next_tick);
        info!(
            "Resumed nap: {}min remaining, next tick in {}s",
            minutes,
            next_tick.as_secs()
        );
    }

    /// Dispatch one inbound event
    pub fn handle(&mut self, event: Event, now: DateTime<Utc>) {
        match event {
            Event::Intent(intent) => self.on_intent(intent, now),
            Event::Tick { generation } => self.on_tick(generation),
            Event::WakeFired { id } => self.on_wake_fired(id),
            Event::VibrateTick { generation } => self.on_vibrate_tick(generation),
        }
        // Adopt the current reading even after a correction, so one refusal is enough
        self.last_seen = Some(now);
    }

    /// Physical button press, mapped through the current mode
    pub fn press(&mut self, button: Button, now: DateTime<Utc>) {
        let intent = button.intent(self.mode);
        self.handle(Event::Intent(intent), now);
    }

    fn on_intent(&mut self, intent: Intent, now: DateTime<Utc>) {
        if self.mode == Mode::Alarm {
            // Every button stops the alarm
            self.dismiss();
            return;
        }

        match intent {
            Intent::Increment => {
                self.increment();
            }
            Intent::Decrement => {
                self.decrement();
            }
            Intent::Toggle => self.toggle(now),
            Intent::Dismiss => debug!("Dismiss ignored in {} mode", self.mode),
        }
    }

    /// Lengthen the nap by one minute, clamped at the maximum
    pub fn increment(&mut self) -> Adjustment {
        if self.mode != Mode::Wake {
            return Adjustment::Ignored;
        }
        if self.configured_minutes >= MAX_DURATION {
            return Adjustment::AtBound(self.configured_minutes);
        }
        self.configured_minutes += 1;
        debug!("Nap duration set to {}min", self.configured_minutes);
        Adjustment::Changed(self.configured_minutes)
    }

    /// Shorten the nap by one minute, clamped at the minimum
    pub fn decrement(&mut self) -> Adjustment {
        if self.mode != Mode::Wake {
            return Adjustment::Ignored;
        }
        if self.configured_minutes <= MIN_DURATION {
            return Adjustment::AtBound(self.configured_minutes);
        }
        self.configured_minutes -= 1;
        debug!("Nap duration set to {}min", self.configured_minutes);
        Adjustment::Changed(self.configured_minutes)
    }

    /// Start a nap from Wake or cancel it from Sleep
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        match self.mode {
            Mode::Wake => self.start_nap(now),
            Mode::Sleep => self.cancel_nap(),
            Mode::Alarm => self.dismiss(),
        }
    }

    fn start_nap(&mut self, now: DateTime<Utc>) {
        match self.try_start_nap(now) {
            Ok(()) => {
                self.errors.clear();
                info!(
                    "Nap started: {}min, wake request {}",
                    self.remaining_minutes,
                    self.wake_id.map(|id| id.to_string()).unwrap_or_default()
                );
            }
            Err(e) => {
                warn!("Nap not started: {}", e);
                let message = e.user_message();
                if self.errors.len() >= MAX_ERRORS {
                    self.errors.remove(0);
                }
                self.errors.push(message.clone());
                self.last_failure = Some(message);
            }
        }
    }

    fn try_start_nap(&mut self, now: DateTime<Utc>) -> NapResult<()> {
        if let Some(last) = self.last_seen {
            if now < last {
                return Err(NapError::ClockWentBackwards((last - now).num_seconds()));
            }
        }

        let minutes = self.configured_minutes;
        let seconds = i64::from(minutes) * SECONDS_PER_MINUTE as i64;
        let fire_at = now
            .checked_add_signed(ChronoDuration::seconds(seconds))
            .ok_or_else(|| NapError::ScheduleDenied("deadline out of range".to_string()))?;

        let id = self.scheduler.schedule(fire_at)?;
        if let Err(e) = self.store.save_wake_id(id) {
            // Without the mirror a restart could not find the request again
            if let Err(cancel_err) = self.scheduler.cancel_all() {
                warn!("Failed to withdraw {}: {}", id, cancel_err);
            }
            return Err(e);
        }

        self.wake_id = Some(id);
        self.remaining_minutes = minutes;
        self.mode = Mode::Sleep;
        self.countdown.schedule_tick(self.timers.as_mut(), TICK_INTERVAL);

        if let Err(e) = self.store.save(minutes) {
            warn!("Failed to save nap duration: {}", e);
        }
        Ok(())
    }

    fn cancel_nap(&mut self) {
        self.countdown.cancel_tick(self.timers.as_mut());
        self.release_wake();
        self.remaining_minutes = 0;
        self.mode = Mode::Wake;
        info!("Nap cancelled");
    }

    fn on_tick(&mut self, generation: u64) {
        if self.mode != Mode::Sleep || !self.countdown.accept(generation) {
            debug!("Ignoring stale countdown tick {}", generation);
            return;
        }

        if self.remaining_minutes > 1 {
            self.remaining_minutes -= 1;
            self.countdown.schedule_tick(self.timers.as_mut(), TICK_INTERVAL);
            debug!("{}min remaining", self.remaining_minutes);
        } else {
            self.remaining_minutes = 0;
            self.enter_alarm("countdown");
        }
    }

    fn on_wake_fired(&mut self, id: WakeId) {
        match self.mode {
            Mode::Alarm => debug!("{} fired while alarm already running", id),
            Mode::Wake => debug!("Ignoring {} delivered after the nap ended", id),
            Mode::Sleep if self.wake_id != Some(id) => {
                warn!("Ignoring {} which is not the pending request", id);
            }
            Mode::Sleep => {
                self.forget_wake_id();
                self.enter_alarm("wake request");
            }
        }
    }

    fn on_vibrate_tick(&mut self, generation: u64) {
        if self.mode != Mode::Alarm {
            debug!("Ignoring vibrate tick {} outside alarm", generation);
            return;
        }

        match self.alarm.on_tick(self.timers.as_mut(), generation) {
            None => debug!("Ignoring stale vibrate tick {}", generation),
            Some(PulseOutcome::Continue) => {}
            Some(PulseOutcome::Finished) => {
                self.alarm.stop(self.timers.as_mut());
                self.mode = Mode::Wake;
                info!("Alarm finished without dismissal");
            }
        }
    }

    /// Raise the alarm. Returns false if it was already running, so the
    /// countdown and the wake delivery racing for the same deadline only
    /// start one pulse sequence.
    fn enter_alarm(&mut self, trigger: &str) -> bool {
        if self.mode == Mode::Alarm {
            debug!("Alarm already running, ignoring {} trigger", trigger);
            return false;
        }

        self.countdown.cancel_tick(self.timers.as_mut());
        self.release_wake();
        self.remaining_minutes = 0;
        self.mode = Mode::Alarm;
        self.alarm.start(self.timers.as_mut());
        info!("Alarm raised by {}", trigger);
        true
    }

    fn dismiss(&mut self) {
        if self.mode != Mode::Alarm {
            return;
        }
        self.alarm.stop(self.timers.as_mut());
        self.mode = Mode::Wake;
        info!("Alarm dismissed");
    }

    /// Withdraw the wake request from the scheduler and drop the mirror
    fn release_wake(&mut self) {
        if let Err(e) = self.scheduler.cancel_all() {
            warn!("Failed to cancel wake request: {}", e);
        }
        self.forget_wake_id();
    }

    fn forget_wake_id(&mut self) {
        if let Err(e) = self.store.clear_wake_id() {
            warn!("Failed to clear pending wake id: {}", e);
        }
        self.wake_id = None;
    }

    fn discard_stale_wake(&mut self) {
        self.release_wake();
        self.mode = Mode::Wake;
    }

    /// Flush the configured duration and stop in-process timers.
    ///
    /// A pending wake request stays registered so it can fire while the
    /// process is gone.
    pub fn shutdown(&mut self) {
        if let Err(e) = self.store.save(self.configured_minutes) {
            warn!("Failed to save nap duration on shutdown: {}", e);
        }
        self.countdown.cancel_tick(self.timers.as_mut());
        self.alarm.stop(self.timers.as_mut());
        info!(
            "Controller shut down in {} mode, configured={}min",
            self.mode, self.configured_minutes
        );
    }

    pub fn status(&self) -> NapStatus {
        NapStatus {
            mode: self.mode,
            displayed_minutes: self.displayed_minutes(),
            configured_minutes: self.configured_minutes,
            vibrate_count: self.vibrate_count(),
            errors: self.errors.clone(),
        }
    }

    pub fn displayed_minutes(&self) -> Option<u32> {
        match self.mode {
            Mode::Wake => Some(self.configured_minutes),
            Mode::Sleep => Some(self.remaining_minutes),
            Mode::Alarm => None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn configured_minutes(&self) -> u32 {
        self.configured_minutes
    }

    pub fn remaining_minutes(&self) -> u32 {
        self.remaining_minutes
    }

    pub fn vibrate_count(&self) -> u32 {
        if self.mode == Mode::Alarm {
            self.alarm.vibrate_count()
        } else {
            0
        }
    }

    pub fn pending_wake(&self) -> Option<WakeId> {
        self.wake_id
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Failure raised since the last call, if any
    pub fn take_failure(&mut self) -> Option<String> {
        self.last_failure.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, time::Duration};
    use chrono::TimeZone;

    use crate::{
        scheduler::MemoryWakeScheduler,
        services::CountingHaptics,
        store::{DurationStore, MemoryStore, WakeIdStore},
        timer::{ManualTimers, TimerSlot, PULSE_INTERVAL, PULSE_LIMIT},
    };

    struct Harness {
        controller: NapController,
        store: Arc<MemoryStore>,
        scheduler: Arc<MemoryWakeScheduler>,
        timers: ManualTimers,
        haptics: CountingHaptics,
        now: DateTime<Utc>,
    }

    fn start_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 13, 0, 0).unwrap()
    }

    impl Harness {
        fn with(store: MemoryStore, scheduler: MemoryWakeScheduler, launch: LaunchReason) -> Self {
            let store = Arc::new(store);
            let scheduler = Arc::new(scheduler);
            let timers = ManualTimers::new();
            let haptics = CountingHaptics::new();
            let now = start_time();
            let controller = NapController::recover(
                Parts {
                    store: Box::new(Arc::clone(&store)),
                    scheduler: Box::new(Arc::clone(&scheduler)),
                    timers: Box::new(timers.clone()),
                    haptics: Box::new(haptics.clone()),
                },
                launch,
                now,
            );
            Self { controller, store, scheduler, timers, haptics, now }
        }

        fn new() -> Self {
            Self::with(MemoryStore::new(), MemoryWakeScheduler::new(), LaunchReason::User)
        }

        fn intent(&mut self, intent: Intent) {
            self.controller.handle(Event::Intent(intent), self.now);
        }

        fn tick(&mut self) {
            let armed = self.timers.armed(TimerSlot::Countdown).expect("no countdown armed");
            self.now += ChronoDuration::from_std(armed.delay).unwrap();
            self.controller.handle(Event::Tick { generation: armed.generation }, self.now);
        }

        fn vibrate_tick(&mut self) {
            let armed = self.timers.armed(TimerSlot::Vibrate).expect("no pulse armed");
            self.now += ChronoDuration::from_std(armed.delay).unwrap();
            self.controller.handle(Event::VibrateTick { generation: armed.generation }, self.now);
        }

        fn fire_wake(&mut self) {
            let request = self.scheduler.fire().expect("no wake request pending");
            self.controller.handle(Event::WakeFired { id: request.id }, self.now);
        }
    }

    #[test]
    fn test_defaults_without_stored_duration() {
        let h = Harness::new();
        assert_eq!(h.controller.mode(), Mode::Wake);
        assert_eq!(h.controller.configured_minutes(), DEFAULT_DURATION);
        assert_eq!(h.controller.displayed_minutes(), Some(DEFAULT_DURATION));
        assert!(h.timers.is_idle());
    }

    #[test]
    fn test_stored_duration_is_clamped() {
        let h = Harness::with(MemoryStore::with_minutes(500), MemoryWakeScheduler::new(), LaunchReason::User);
        assert_eq!(h.controller.configured_minutes(), MAX_DURATION);

        let h = Harness::with(MemoryStore::with_minutes(0), MemoryWakeScheduler::new(), LaunchReason::User);
        assert_eq!(h.controller.configured_minutes(), MIN_DURATION);
    }

    #[test]
    fn test_increment_and_decrement_stay_in_bounds() {
        let mut h = Harness::with(MemoryStore::with_minutes(88), MemoryWakeScheduler::new(), LaunchReason::User);
        assert_eq!(h.controller.increment(), Adjustment::Changed(89));
        assert_eq!(h.controller.increment(), Adjustment::Changed(90));
        assert_eq!(h.controller.increment(), Adjustment::AtBound(90));

        for _ in 0..200 {
            let before = h.controller.configured_minutes();
            h.intent(Intent::Decrement);
            let after = h.controller.configured_minutes();
            assert!(before - after <= 1);
            assert!(after >= MIN_DURATION);
        }
        assert_eq!(h.controller.decrement(), Adjustment::AtBound(MIN_DURATION));
    }

    #[test]
    fn test_start_schedules_wake_and_tick() {
        let mut h = Harness::new();
        h.intent(Intent::Toggle);

        assert_eq!(h.controller.mode(), Mode::Sleep);
        assert_eq!(h.controller.remaining_minutes(), 20);
        let request = h.scheduler.pending().unwrap();
        assert_eq!(request.fire_at, h.now + ChronoDuration::minutes(20));
        assert_eq!(h.store.load_wake_id().unwrap(), Some(request.id));
        assert_eq!(h.timers.armed(TimerSlot::Countdown).unwrap().delay, TICK_INTERVAL);
    }

    #[test]
    fn test_adjusting_is_ignored_while_sleeping() {
        let mut h = Harness::new();
        h.intent(Intent::Toggle);
        h.intent(Intent::Increment);
        h.intent(Intent::Dismiss);
        assert_eq!(h.controller.mode(), Mode::Sleep);
        assert_eq!(h.controller.configured_minutes(), 20);
        assert_eq!(h.controller.increment(), Adjustment::Ignored);
    }

    #[test]
    fn test_cancel_clears_wake_and_tick() {
        let mut h = Harness::new();
        h.intent(Intent::Toggle);
        h.tick();
        h.intent(Intent::Toggle);

        assert_eq!(h.controller.mode(), Mode::Wake);
        assert!(h.scheduler.pending().is_none());
        assert_eq!(h.store.load_wake_id().unwrap(), None);
        assert!(h.timers.is_idle());
        assert_eq!(h.controller.displayed_minutes(), Some(20));
    }

    #[test]
    fn test_schedule_denied_stays_awake_with_error() {
        let scheduler = MemoryWakeScheduler::new();
        scheduler.set_deny(true);
        let mut h = Harness::with(MemoryStore::new(), scheduler, LaunchReason::User);
        h.intent(Intent::Toggle);

        assert_eq!(h.controller.mode(), Mode::Wake);
        assert!(h.timers.is_idle());
        assert_eq!(h.controller.status().errors.len(), 1);
        assert!(h.controller.take_failure().is_some());
        assert!(h.controller.take_failure().is_none());

        for _ in 0..10 {
            h.intent(Intent::Toggle);
        }
        assert_eq!(h.controller.errors().len(), MAX_ERRORS);

        h.scheduler.set_deny(false);
        h.intent(Intent::Toggle);
        assert_eq!(h.controller.mode(), Mode::Sleep);
        assert!(h.controller.status().errors.is_empty());
    }

    #[test]
    fn test_backwards_clock_refuses_to_start() {
        let mut h = Harness::new();
        let earlier = h.now - ChronoDuration::minutes(5);
        h.controller.handle(Event::Intent(Intent::Toggle), earlier);

        assert_eq!(h.controller.mode(), Mode::Wake);
        assert!(h.scheduler.pending().is_none());
        assert!(!h.controller.errors().is_empty());
    }

    #[test]
    fn test_start_retried_after_clock_correction() {
        let mut h = Harness::new();
        let corrected = h.now - ChronoDuration::hours(2);
        h.controller.handle(Event::Intent(Intent::Toggle), corrected);
        assert_eq!(h.controller.mode(), Mode::Wake);
        assert!(h.controller.take_failure().is_some());

        h.controller.handle(Event::Intent(Intent::Toggle), corrected + ChronoDuration::minutes(1));
        assert_eq!(h.controller.mode(), Mode::Sleep);
        assert!(h.controller.take_failure().is_none());
        assert!(h.controller.errors().is_empty());
        assert!(h.scheduler.pending().is_some());
    }

    #[test]
    fn test_countdown_reaches_alarm() {
        let mut h = Harness::new();
        h.intent(Intent::Toggle);
        for _ in 0..19 {
            h.tick();
        }
        assert_eq!(h.controller.mode(), Mode::Sleep);
        assert_eq!(h.controller.remaining_minutes(), 1);

        h.tick();
        assert_eq!(h.controller.mode(), Mode::Alarm);
        assert_eq!(h.controller.displayed_minutes(), None);
        assert_eq!(h.haptics.count(), 1);
        assert!(h.scheduler.pending().is_none());
        assert_eq!(h.store.load_wake_id().unwrap(), None);
        assert!(h.timers.armed(TimerSlot::Countdown).is_none());
        assert_eq!(h.timers.armed(TimerSlot::Vibrate).unwrap().delay, PULSE_INTERVAL);
    }

    #[test]
    fn test_wake_fired_and_tick_raise_alarm_once() {
        let mut h = Harness::new();
        h.intent(Intent::Toggle);
        for _ in 0..19 {
            h.tick();
        }
        let last_tick = h.timers.armed(TimerSlot::Countdown).unwrap();

        h.fire_wake();
        assert_eq!(h.controller.mode(), Mode::Alarm);
        h.controller.handle(Event::Tick { generation: last_tick.generation }, h.now);

        assert_eq!(h.controller.mode(), Mode::Alarm);
        assert_eq!(h.haptics.count(), 1);
    }

    #[test]
    fn test_wake_fired_after_tick_is_ignored() {
        let mut h = Harness::new();
        h.intent(Intent::Toggle);
        let id = h.controller.pending_wake().unwrap();
        for _ in 0..20 {
            h.tick();
        }
        let pulse = h.timers.armed(TimerSlot::Vibrate).unwrap();

        h.controller.handle(Event::WakeFired { id }, h.now);
        assert_eq!(h.haptics.count(), 1);
        assert_eq!(h.timers.armed(TimerSlot::Vibrate).unwrap(), pulse);
    }

    #[test]
    fn test_stale_wake_in_wake_mode_is_ignored() {
        let mut h = Harness::new();
        h.intent(Intent::Toggle);
        let id = h.controller.pending_wake().unwrap();
        h.intent(Intent::Toggle);

        h.controller.handle(Event::WakeFired { id }, h.now);
        assert_eq!(h.controller.mode(), Mode::Wake);
        assert_eq!(h.haptics.count(), 0);
    }

    #[test]
    fn test_unrelated_wake_id_is_ignored_while_sleeping() {
        let mut h = Harness::new();
        h.intent(Intent::Toggle);
        h.controller.handle(Event::WakeFired { id: WakeId(999) }, h.now);
        assert_eq!(h.controller.mode(), Mode::Sleep);
    }

    #[test]
    fn test_any_button_dismisses_alarm() {
        for button in [Button::Up, Button::Down, Button::Select] {
            let mut h = Harness::new();
            h.intent(Intent::Toggle);
            h.fire_wake();
            let configured = h.controller.configured_minutes();

            h.controller.press(button, h.now);
            assert_eq!(h.controller.mode(), Mode::Wake);
            assert_eq!(h.controller.configured_minutes(), configured);
            assert!(h.timers.is_idle());
        }
    }

    #[test]
    fn test_alarm_ends_after_pulse_limit() {
        let mut h = Harness::new();
        h.intent(Intent::Toggle);
        h.fire_wake();

        for _ in 0..PULSE_LIMIT - 1 {
            h.vibrate_tick();
            assert_eq!(h.controller.mode(), Mode::Alarm);
        }
        assert_eq!(h.controller.vibrate_count(), PULSE_LIMIT);

        h.vibrate_tick();
        assert_eq!(h.controller.mode(), Mode::Wake);
        assert_eq!(h.haptics.count(), PULSE_LIMIT);
        assert!(h.timers.is_idle());
    }

    #[test]
    fn test_stale_vibrate_tick_after_dismiss() {
        let mut h = Harness::new();
        h.intent(Intent::Toggle);
        h.fire_wake();
        let pulse = h.timers.armed(TimerSlot::Vibrate).unwrap();
        h.intent(Intent::Dismiss);

        h.controller.handle(Event::VibrateTick { generation: pulse.generation }, h.now);
        assert_eq!(h.controller.mode(), Mode::Wake);
        assert_eq!(h.haptics.count(), 1);
    }

    #[test]
    fn test_recover_future_deadline_aligns_tick() {
        let scheduler = MemoryWakeScheduler::new();
        let id = scheduler.insert(start_time() + ChronoDuration::seconds(7 * 60 + 25));
        let h = Harness::with(MemoryStore::with_minutes(30).with_wake_id(id), scheduler, LaunchReason::User);

        assert_eq!(h.controller.mode(), Mode::Sleep);
        assert_eq!(h.controller.remaining_minutes(), 8);
        assert_eq!(h.controller.configured_minutes(), 30);
        assert_eq!(h.controller.pending_wake(), Some(id));
        assert_eq!(h.timers.armed(TimerSlot::Countdown).unwrap().delay, Duration::from_secs(25));
    }

    #[test]
    fn test_recover_whole_minutes_uses_full_tick() {
        let scheduler = MemoryWakeScheduler::new();
        let id = scheduler.insert(start_time() + ChronoDuration::minutes(12));
        let h = Harness::with(MemoryStore::new().with_wake_id(id), scheduler, LaunchReason::User);

        assert_eq!(h.controller.mode(), Mode::Sleep);
        assert_eq!(h.controller.remaining_minutes(), 12);
        assert_eq!(h.timers.armed(TimerSlot::Countdown).unwrap().delay, TICK_INTERVAL);
    }

    #[test]
    fn test_recovered_countdown_ends_on_deadline() {
        let scheduler = MemoryWakeScheduler::new();
        let deadline = start_time() + ChronoDuration::seconds(2 * 60 + 10);
        let id = scheduler.insert(deadline);
        let mut h = Harness::with(MemoryStore::new().with_wake_id(id), scheduler, LaunchReason::User);

        h.tick();
        h.tick();
        assert_eq!(h.controller.mode(), Mode::Sleep);
        h.tick();
        assert_eq!(h.controller.mode(), Mode::Alarm);
        assert_eq!(h.now, deadline);
    }

    #[test]
    fn test_recover_unresolvable_id_resets_to_wake() {
        let scheduler = MemoryWakeScheduler::new();
        let h = Harness::with(MemoryStore::new().with_wake_id(WakeId(41)), scheduler, LaunchReason::User);

        assert_eq!(h.controller.mode(), Mode::Wake);
        assert_eq!(h.store.load_wake_id().unwrap(), None);
        assert!(h.timers.is_idle());
    }

    #[test]
    fn test_recover_past_deadline_raises_alarm() {
        let scheduler = MemoryWakeScheduler::new();
        let id = scheduler.insert(start_time() - ChronoDuration::seconds(30));
        let h = Harness::with(MemoryStore::new().with_wake_id(id), scheduler, LaunchReason::User);

        assert_eq!(h.controller.mode(), Mode::Alarm);
        assert_eq!(h.haptics.count(), 1);
        assert!(h.scheduler.pending().is_none());
        assert_eq!(h.store.load_wake_id().unwrap(), None);
    }

    #[test]
    fn test_launch_by_wake_raises_alarm_directly() {
        let scheduler = MemoryWakeScheduler::new();
        let id = scheduler.insert(start_time() + ChronoDuration::minutes(10));
        let h = Harness::with(MemoryStore::new().with_wake_id(id), scheduler, LaunchReason::WakeFired);

        assert_eq!(h.controller.mode(), Mode::Alarm);
        assert_eq!(h.store.load_wake_id().unwrap(), None);
    }

    #[test]
    fn test_shutdown_flushes_duration_and_keeps_wake() {
        let mut h = Harness::new();
        h.intent(Intent::Increment);
        h.intent(Intent::Toggle);
        h.controller.shutdown();

        assert_eq!(DurationStore::load(&h.store).unwrap(), Some(21));
        assert!(h.scheduler.pending().is_some());
        assert!(h.timers.is_idle());
    }
}
