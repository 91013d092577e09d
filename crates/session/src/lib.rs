#![warn(clippy::pedantic)]
#![allow(clippy::too_many_lines)]

use std::fmt;

use log::{debug, warn};

use setpace_domain::{Effort, Exercise, SetMetricRecord};

pub mod gesture;
pub mod metrics;
pub mod timer;

use gesture::{Swipe, SwipeTracker, TapSide};
use metrics::{FormView, MetricsForm};
use timer::{Countdown, format_mm_ss};

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SessionError {
    #[error("Workout must contain at least one exercise")]
    NoExercises,
}

/// Current mode of workout progression. Each variant carries only the state
/// that exists in that phase, so a countdown or form cannot outlive the
/// phase it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Warmup,
    Active { countdown: Option<Countdown> },
    Rest { countdown: Countdown },
    Tracking { form: MetricsForm },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum PhaseKind {
    Warmup,
    Active,
    Rest,
    Tracking,
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                PhaseKind::Warmup => "warmup",
                PhaseKind::Active => "active",
                PhaseKind::Rest => "rest",
                PhaseKind::Tracking => "tracking",
            }
        )
    }
}

/// Result of a tracking form submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The session advanced to the next exercise.
    Advanced(SetMetricRecord),
    /// The last exercise was tracked. The session stays on it; ending the
    /// workout is up to the caller.
    WorkoutComplete(SetMetricRecord),
    /// Submission outside the tracking phase.
    Ignored,
}

/// State machine driving a single guided workout.
///
/// All progression happens through [`tap`](Self::tap), the touch methods and
/// [`tick`](Self::tick); the session never schedules timers itself. Leaving a
/// phase drops its countdown together with the phase variant, so a cancelled
/// countdown cannot fire afterwards.
#[derive(Debug)]
pub struct WorkoutSession {
    exercises: Vec<Exercise>,
    exercise_idx: usize,
    set: u32,
    phase: Phase,
    last_metrics: Option<SetMetricRecord>,
    swipe: SwipeTracker,
}

impl WorkoutSession {
    pub fn new(exercises: Vec<Exercise>) -> Result<Self, SessionError> {
        if exercises.is_empty() {
            return Err(SessionError::NoExercises);
        }
        Ok(Self {
            exercises,
            exercise_idx: 0,
            set: 1,
            phase: Phase::Warmup,
            last_metrics: None,
            swipe: SwipeTracker::default(),
        })
    }

    #[must_use]
    pub fn exercise_idx(&self) -> usize {
        self.exercise_idx
    }

    /// Current set number, 1-based.
    #[must_use]
    pub fn set(&self) -> u32 {
        self.set
    }

    #[must_use]
    pub fn phase_kind(&self) -> PhaseKind {
        match self.phase {
            Phase::Warmup => PhaseKind::Warmup,
            Phase::Active { .. } => PhaseKind::Active,
            Phase::Rest { .. } => PhaseKind::Rest,
            Phase::Tracking { .. } => PhaseKind::Tracking,
        }
    }

    #[must_use]
    pub fn current_exercise(&self) -> &Exercise {
        &self.exercises[self.exercise_idx]
    }

    #[must_use]
    pub fn last_metrics(&self) -> Option<&SetMetricRecord> {
        self.last_metrics.as_ref()
    }

    /// Handle a tap at horizontal position `x` on a screen of the given
    /// width. The right half advances, the left half goes back.
    pub fn tap(&mut self, x: f32, screen_width: f32) {
        match (TapSide::of(x, screen_width), self.phase_kind()) {
            (TapSide::Right, PhaseKind::Warmup) => self.enter_active(),
            (TapSide::Right, PhaseKind::Active) => self.enter_rest(),
            (TapSide::Left, PhaseKind::Active) => self.step_back(),
            (TapSide::Right, PhaseKind::Rest) => self.finish_rest(),
            (TapSide::Left, PhaseKind::Rest) => self.enter_active(),
            (_, PhaseKind::Tracking) | (TapSide::Left, PhaseKind::Warmup) => {
                debug!("ignored tap in {} phase", self.phase_kind());
            }
        }
    }

    /// Advance the running countdown, if any, by `delta_ms` milliseconds.
    ///
    /// Ticks outside the rest phase and time-based active sets are ignored,
    /// so a tick scheduled before a phase change cannot cause a duplicate
    /// transition.
    pub fn tick(&mut self, delta_ms: i64) {
        enum Elapsed {
            Rest,
            Set,
        }
        let elapsed = match &mut self.phase {
            Phase::Rest { countdown } => {
                countdown.advance(delta_ms);
                countdown.is_finished().then_some(Elapsed::Rest)
            }
            Phase::Active {
                countdown: Some(countdown),
            } => {
                countdown.advance(delta_ms);
                countdown.is_finished().then_some(Elapsed::Set)
            }
            _ => None,
        };
        match elapsed {
            Some(Elapsed::Rest) => self.finish_rest(),
            Some(Elapsed::Set) => self.enter_rest(),
            None => {}
        }
    }

    pub fn touch_start(&mut self, x: f32) {
        self.swipe.touch_start(x);
    }

    pub fn touch_move(&mut self, x: f32) {
        self.swipe.touch_move(x);
    }

    /// Finish the current gesture. A swipe navigates between exercises,
    /// clamped at both ends of the exercise list; any phase may swipe.
    pub fn touch_end(&mut self) {
        let Some(swipe) = self.swipe.touch_end() else {
            return;
        };
        match swipe {
            Swipe::Left if self.exercise_idx + 1 < self.exercises.len() => {
                self.exercise_idx += 1;
                self.restart_exercise();
            }
            Swipe::Right if self.exercise_idx > 0 => {
                self.exercise_idx -= 1;
                self.restart_exercise();
            }
            _ => debug!("swipe at the end of the exercise list ignored"),
        }
    }

    /// Replace the raw text of one tracking form cell.
    pub fn set_metric_input(&mut self, set_idx: usize, metric_idx: usize, input: &str) {
        if let Phase::Tracking { form } = &mut self.phase {
            form.set_value(set_idx, metric_idx, input);
        } else {
            warn!("metric input ignored in {} phase", self.phase_kind());
        }
    }

    /// Submit the tracking form, capture its record and advance to the next
    /// exercise if one exists.
    pub fn submit_metrics(&mut self) -> SubmitOutcome {
        let Phase::Tracking { form } = &self.phase else {
            warn!("metrics submitted in {} phase", self.phase_kind());
            return SubmitOutcome::Ignored;
        };
        let record = form.collect();
        self.last_metrics = Some(record.clone());
        if self.exercise_idx + 1 < self.exercises.len() {
            self.exercise_idx += 1;
            self.set = 1;
            self.enter_active();
            SubmitOutcome::Advanced(record)
        } else {
            debug!("last exercise tracked, workout complete");
            SubmitOutcome::WorkoutComplete(record)
        }
    }

    /// Snapshot of everything a presentation layer needs for one render.
    #[must_use]
    pub fn view(&self) -> View {
        let exercise = self.current_exercise();
        let (reps, countdown) = match (&self.phase, exercise.effort) {
            (
                Phase::Active {
                    countdown: Some(countdown),
                },
                _,
            ) => (None, Some(format_mm_ss(countdown.remaining_secs()))),
            (_, Effort::Reps(reps)) => (Some(u32::from(reps)), None),
            (_, Effort::Duration(time)) => (None, Some(format_mm_ss(u32::from(time)))),
        };
        View {
            exercise: exercise.name.to_string(),
            set: self.set,
            sets: u32::from(exercise.sets),
            phase: self.phase_kind(),
            reps,
            countdown,
            rest_progress: match &self.phase {
                Phase::Rest { countdown } => Some(countdown.progress()),
                _ => None,
            },
            form: match &self.phase {
                Phase::Tracking { form } => Some(form.view()),
                _ => None,
            },
            progress: self.progress(),
            video: exercise.video.clone(),
        }
    }

    /// Overall progress through the workout as a fraction in (0, 1].
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f32 {
        let sets = u32::from(self.current_exercise().sets);
        (self.exercise_idx as f32 * sets as f32 + self.set as f32)
            / (self.exercises.len() as f32 * sets as f32)
    }

    fn enter_active(&mut self) {
        let countdown = match self.current_exercise().effort {
            Effort::Duration(duration) => Some(Countdown::new(duration)),
            Effort::Reps(_) => None,
        };
        debug!(
            "entering active phase (exercise {}, set {})",
            self.exercise_idx, self.set
        );
        self.phase = Phase::Active { countdown };
    }

    fn enter_rest(&mut self) {
        self.phase = Phase::Rest {
            countdown: Countdown::new(self.current_exercise().rest),
        };
    }

    /// End the rest phase: next set if sets remain, otherwise the exercise
    /// is finished and tracking begins with cleared metrics.
    fn finish_rest(&mut self) {
        if self.set < u32::from(self.current_exercise().sets) {
            self.set += 1;
            self.enter_active();
        } else {
            debug!(
                "exercise {} finished, entering tracking phase",
                self.exercise_idx
            );
            self.last_metrics = None;
            let form = MetricsForm::new(self.current_exercise());
            self.phase = Phase::Tracking { form };
        }
    }

    /// Left tap during a set: previous set, previous exercise at its last
    /// set, or back to warmup at the very beginning.
    fn step_back(&mut self) {
        if self.set > 1 {
            self.set -= 1;
            self.enter_active();
        } else if self.exercise_idx > 0 {
            self.exercise_idx -= 1;
            self.set = u32::from(self.current_exercise().sets);
            self.enter_active();
        } else {
            debug!("returning to warmup");
            self.phase = Phase::Warmup;
        }
    }

    fn restart_exercise(&mut self) {
        self.set = 1;
        if !matches!(self.phase, Phase::Warmup) {
            self.enter_active();
        }
    }
}

/// Render-ready snapshot of the session.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct View {
    pub exercise: String,
    pub set: u32,
    pub sets: u32,
    pub phase: PhaseKind,
    /// Rep target of the current set, absent for time-based sets.
    pub reps: Option<u32>,
    /// Remaining time of a time-based set as `MM:SS`.
    pub countdown: Option<String>,
    /// Remaining rest as a percentage, 100 down to 0.
    pub rest_progress: Option<f32>,
    pub form: Option<FormView>,
    /// Overall progress through the workout as a fraction.
    pub progress: f32,
    pub video: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, sync::LazyLock};

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use setpace_domain::{MetricDefinition, Name, Reps, SetCount, Time, Unit};

    use super::*;

    const SCREEN_WIDTH: f32 = 400.0;

    static EXERCISES: LazyLock<Vec<Exercise>> = LazyLock::new(|| {
        vec![
            exercise("Push Up", Effort::Reps(Reps::new(10).unwrap())),
            exercise("Plank", Effort::Duration(Time::new(2).unwrap())),
        ]
    });

    fn exercise(name: &str, effort: Effort) -> Exercise {
        Exercise {
            name: Name::new(name).unwrap(),
            sets: SetCount::new(2).unwrap(),
            effort,
            rest: Time::new(1).unwrap(),
            equipment: None,
            video: None,
            notes: None,
            exercise_metrics: vec![],
            set_metrics: vec![MetricDefinition {
                name: Name::new("weight").unwrap(),
                unit: Unit::Kilograms,
            }],
        }
    }

    fn session() -> WorkoutSession {
        WorkoutSession::new(EXERCISES.clone()).unwrap()
    }

    fn tap_left(session: &mut WorkoutSession) {
        session.tap(10.0, SCREEN_WIDTH);
    }

    fn tap_right(session: &mut WorkoutSession) {
        session.tap(390.0, SCREEN_WIDTH);
    }

    fn swipe_left(session: &mut WorkoutSession) {
        session.touch_start(300.0);
        session.touch_move(100.0);
        session.touch_end();
    }

    fn swipe_right(session: &mut WorkoutSession) {
        session.touch_start(100.0);
        session.touch_move(300.0);
        session.touch_end();
    }

    /// Drive the session from warmup into the tracking phase of the first
    /// exercise (2 sets) by skipping both rests.
    fn drive_to_tracking(session: &mut WorkoutSession) {
        tap_right(session); // warmup -> active, set 1
        tap_right(session); // active -> rest
        tap_right(session); // skip rest -> active, set 2
        tap_right(session); // active -> rest
        tap_right(session); // skip rest, no sets remain -> tracking
        assert_eq!(session.phase_kind(), PhaseKind::Tracking);
    }

    #[test]
    fn test_new_requires_exercises() {
        assert_eq!(
            WorkoutSession::new(vec![]).unwrap_err(),
            SessionError::NoExercises
        );
    }

    #[test]
    fn test_initial_state() {
        let session = session();
        assert_eq!(session.phase_kind(), PhaseKind::Warmup);
        assert_eq!(session.exercise_idx(), 0);
        assert_eq!(session.set(), 1);
        assert_eq!(session.last_metrics(), None);
    }

    #[test]
    fn test_guided_session_with_automatic_rests() {
        let mut session = session();

        tap_right(&mut session);
        assert_eq!(session.phase_kind(), PhaseKind::Active);
        assert_eq!(session.set(), 1);

        tap_right(&mut session);
        assert_eq!(session.phase_kind(), PhaseKind::Rest);

        // rest = 1 s, sampled at 100 ms: progress falls from 100 to 0
        let mut previous = 100.0;
        for _ in 0..9 {
            session.tick(timer::TICK_INTERVAL_MS);
            assert_eq!(session.phase_kind(), PhaseKind::Rest);
            let progress = session.view().rest_progress.unwrap();
            assert!(progress < previous);
            previous = progress;
        }
        session.tick(timer::TICK_INTERVAL_MS);

        assert_eq!(session.phase_kind(), PhaseKind::Active);
        assert_eq!(session.set(), 2);

        tap_right(&mut session);
        for _ in 0..10 {
            session.tick(timer::TICK_INTERVAL_MS);
        }

        // no sets remain: the exercise is finished
        assert_eq!(session.phase_kind(), PhaseKind::Tracking);
        assert_eq!(session.last_metrics(), None);
    }

    #[test]
    fn test_rest_left_tap_returns_to_active_without_advancing() {
        let mut session = session();
        tap_right(&mut session);
        tap_right(&mut session);
        assert_eq!(session.phase_kind(), PhaseKind::Rest);

        tap_left(&mut session);
        assert_eq!(session.phase_kind(), PhaseKind::Active);
        assert_eq!(session.set(), 1);
    }

    #[test]
    fn test_rest_right_tap_skips_countdown() {
        let mut session = session();
        tap_right(&mut session);
        tap_right(&mut session);
        session.tick(timer::TICK_INTERVAL_MS);

        tap_right(&mut session);
        assert_eq!(session.phase_kind(), PhaseKind::Active);
        assert_eq!(session.set(), 2);
    }

    #[test]
    fn test_left_tap_traversal_visits_every_set() {
        let mut session = session();
        tap_right(&mut session); // warmup -> active (exercise 0, set 1)
        swipe_left(&mut session); // -> exercise 1, set 1
        tap_right(&mut session); // -> rest
        tap_right(&mut session); // skip -> set 2
        assert_eq!((session.exercise_idx(), session.set()), (1, 2));

        let mut active_steps = 1;
        while session.phase_kind() == PhaseKind::Active {
            tap_left(&mut session);
            if session.phase_kind() == PhaseKind::Active {
                active_steps += 1;
            }
        }

        // one active step per set of every exercise, then warmup
        assert_eq!(active_steps, 4);
        assert_eq!(session.phase_kind(), PhaseKind::Warmup);
        assert_eq!((session.exercise_idx(), session.set()), (0, 1));
    }

    #[test]
    fn test_swipe_navigation() {
        let mut session = session();

        swipe_right(&mut session);
        assert_eq!(session.exercise_idx(), 0, "swipe before first exercise");

        swipe_left(&mut session);
        assert_eq!(session.exercise_idx(), 1);
        assert_eq!(session.set(), 1);
        assert_eq!(session.phase_kind(), PhaseKind::Warmup);

        swipe_left(&mut session);
        assert_eq!(session.exercise_idx(), 1, "swipe past last exercise");
    }

    #[test]
    fn test_swipe_during_set_restarts_exercise() {
        let mut session = session();
        tap_right(&mut session);
        tap_right(&mut session);
        tap_right(&mut session);
        assert_eq!(session.set(), 2);

        swipe_left(&mut session);
        assert_eq!(session.exercise_idx(), 1);
        assert_eq!(session.set(), 1);
        assert_eq!(session.phase_kind(), PhaseKind::Active);
    }

    #[test]
    fn test_incomplete_swipe_is_ignored() {
        let mut session = session();
        session.touch_start(300.0);
        session.touch_end();
        assert_eq!(session.exercise_idx(), 0);
        assert_eq!(session.phase_kind(), PhaseKind::Warmup);
    }

    #[test]
    fn test_time_based_set_advances_to_rest_on_completion() {
        let mut session =
            WorkoutSession::new(vec![exercise("Plank", Effort::Duration(Time::new(2).unwrap()))])
                .unwrap();
        tap_right(&mut session);
        assert_eq!(session.phase_kind(), PhaseKind::Active);
        assert_eq!(session.view().countdown.as_deref(), Some("00:02"));
        assert_eq!(session.view().reps, None);

        session.tick(1_000);
        assert_eq!(session.view().countdown.as_deref(), Some("00:01"));

        session.tick(1_000);
        assert_eq!(session.phase_kind(), PhaseKind::Rest);
    }

    #[test]
    fn test_tick_outside_countdown_phases_is_ignored() {
        let mut session = session();
        session.tick(10_000);
        assert_eq!(session.phase_kind(), PhaseKind::Warmup);

        // rep-based active set has no countdown
        tap_right(&mut session);
        session.tick(10_000);
        assert_eq!(session.phase_kind(), PhaseKind::Active);
        assert_eq!(session.set(), 1);
    }

    #[test]
    fn test_submit_metrics_advances_to_next_exercise() {
        let mut session = session();
        drive_to_tracking(&mut session);

        session.set_metric_input(0, 0, "10");
        session.set_metric_input(1, 0, "");

        let expected = SetMetricRecord::from(vec![
            BTreeMap::from([(Name::new("weight").unwrap(), 10)]),
            BTreeMap::from([(Name::new("weight").unwrap(), 0)]),
        ]);
        assert_eq!(
            session.submit_metrics(),
            SubmitOutcome::Advanced(expected.clone())
        );
        assert_eq!(session.last_metrics(), Some(&expected));
        assert_eq!(session.exercise_idx(), 1);
        assert_eq!(session.set(), 1);
        assert_eq!(session.phase_kind(), PhaseKind::Active);
    }

    #[test]
    fn test_submit_metrics_on_last_exercise_signals_completion() {
        let mut session = session();
        swipe_left(&mut session);
        drive_to_tracking(&mut session);

        let outcome = session.submit_metrics();
        assert!(matches!(outcome, SubmitOutcome::WorkoutComplete(_)));
        assert_eq!(session.exercise_idx(), 1);
        assert_eq!(session.phase_kind(), PhaseKind::Tracking);
    }

    #[test]
    fn test_submit_metrics_outside_tracking_is_ignored() {
        let mut session = session();
        assert_eq!(session.submit_metrics(), SubmitOutcome::Ignored);
        assert_eq!(session.phase_kind(), PhaseKind::Warmup);
        assert_eq!(session.last_metrics(), None);
    }

    #[test]
    fn test_taps_ignored_during_tracking() {
        let mut session = session();
        drive_to_tracking(&mut session);
        tap_right(&mut session);
        tap_left(&mut session);
        assert_eq!(session.phase_kind(), PhaseKind::Tracking);
    }

    #[test]
    fn test_metric_input_ignored_outside_tracking() {
        let mut session = session();
        session.set_metric_input(0, 0, "10");
        drive_to_tracking(&mut session);
        let Some(form) = session.view().form else {
            panic!("no form in tracking phase")
        };
        assert_eq!(form.rows[0][0], "");
    }

    #[derive(Debug, Clone, Copy)]
    enum Event {
        TapLeft,
        TapRight,
        SwipeLeft,
        SwipeRight,
        Tick,
    }

    fn apply(session: &mut WorkoutSession, event: Event) {
        match event {
            Event::TapLeft => tap_left(session),
            Event::TapRight => tap_right(session),
            Event::SwipeLeft => swipe_left(session),
            Event::SwipeRight => swipe_right(session),
            Event::Tick => session.tick(timer::TICK_INTERVAL_MS),
        }
    }

    #[rstest]
    #[case(&[Event::TapLeft; 20])]
    #[case(&[Event::TapRight; 20])]
    #[case(&[Event::SwipeLeft, Event::SwipeLeft, Event::SwipeRight, Event::SwipeRight,
             Event::SwipeRight, Event::TapRight, Event::TapLeft, Event::TapLeft])]
    #[case(&[Event::TapRight, Event::Tick, Event::Tick, Event::TapRight, Event::Tick,
             Event::SwipeLeft, Event::TapRight, Event::TapRight, Event::Tick,
             Event::TapLeft, Event::TapLeft, Event::TapLeft, Event::TapLeft])]
    fn test_indices_stay_in_bounds(#[case] events: &[Event]) {
        let mut session = session();
        for event in events {
            apply(&mut session, *event);
            assert!(session.exercise_idx() < EXERCISES.len());
            assert!(session.set() >= 1);
            assert!(session.set() <= u32::from(session.current_exercise().sets));
        }
    }

    #[test]
    fn test_view_during_rest() {
        let mut session = session();
        tap_right(&mut session);
        tap_right(&mut session);
        session.tick(500);

        let view = session.view();
        assert_eq!(view.exercise, "Push Up");
        assert_eq!(view.set, 1);
        assert_eq!(view.sets, 2);
        assert_eq!(view.phase, PhaseKind::Rest);
        assert_eq!(view.reps, Some(10));
        assert_eq!(view.rest_progress, Some(50.0));
        assert_eq!(view.form, None);
        assert_eq!(view.progress, 0.25);
    }

    #[test]
    fn test_view_serialization() {
        let session = session();
        let value = serde_json::to_value(session.view()).unwrap();
        assert_eq!(value["exercise"], "Push Up");
        assert_eq!(value["phase"], "Warmup");
        assert_eq!(value["set"], 1);
        assert_eq!(value["rest_progress"], serde_json::Value::Null);
    }
}
