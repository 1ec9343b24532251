//! Sequence templates and the task which runs them

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::tc::action::{Action, Condition};
use log::{debug, info, warn};

use super::ActionSink;
use crate::sched::{Reqs, Task, TaskStatus};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Tolerance on time comparisons so that waits built from sums of cycle periods expire on the
/// cycle they should.
const TIME_EPS_S: f64 = 1e-9;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Apply an action, completing immediately
    Do(Action),

    /// Start all members together, completing when every member has
    Parallel(Vec<Step>),

    /// Wait for a fixed time
    Wait { duration_s: f64 },

    /// Wait until a condition holds, or until the timeout expires
    WaitUntil { cond: Condition, timeout_s: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeqState {
    Idle,

    /// Executing the step at this index
    Running(usize),

    Completed,
    Cancelled,
}

/// A started step which may not have finished yet.
#[derive(Debug, Clone)]
enum Active {
    Done,
    Timer { end_s: f64 },
    Until { cond: Condition, deadline_s: f64 },
    Group(Vec<Active>),
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A named template of steps.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    name: String,
    steps: Vec<Step>,

    /// Actions applied if a running instance is interrupted
    on_cancel: Vec<Action>,
}

/// A running instance of a [`Sequence`].
#[derive(Debug)]
pub struct SeqTask {
    seq: Sequence,
    reqs: Reqs,
    state: SeqState,
    active: Option<Active>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Step {
    fn reqs(&self) -> Reqs {
        match self {
            Step::Do(a) => Reqs::of(&a.mech_ids()),
            Step::Parallel(steps) => steps.iter().fold(Reqs::empty(), |r, s| r.union(s.reqs())),
            Step::Wait { .. } | Step::WaitUntil { .. } => Reqs::empty(),
        }
    }

    fn start<C: ActionSink>(&self, ctx: &mut C, now_s: f64) -> Active {
        match self {
            Step::Do(a) => {
                ctx.apply(a);
                Active::Done
            }
            Step::Parallel(steps) => {
                Active::Group(steps.iter().map(|s| s.start(ctx, now_s)).collect())
            }
            Step::Wait { duration_s } => Active::Timer { end_s: now_s + duration_s },
            Step::WaitUntil { cond, timeout_s } => Active::Until {
                cond: *cond,
                deadline_s: now_s + timeout_s,
            },
        }
    }
}

impl Active {
    /// Returns true once the step has finished.
    fn poll<C: ActionSink>(&mut self, ctx: &C, now_s: f64) -> bool {
        match self {
            Active::Done => true,
            Active::Timer { end_s } => now_s + TIME_EPS_S >= *end_s,
            Active::Until { cond, deadline_s } => {
                if ctx.check(cond) {
                    true
                } else if now_s + TIME_EPS_S >= *deadline_s {
                    warn!("Timed out waiting for {:?}, continuing", cond);
                    true
                } else {
                    false
                }
            }
            Active::Group(members) => {
                members.retain_mut(|m| !m.poll(ctx, now_s));
                members.is_empty()
            }
        }
    }
}

impl Sequence {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            steps: Vec::new(),
            on_cancel: Vec::new(),
        }
    }

    pub fn then(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn then_do(self, action: Action) -> Self {
        self.then(Step::Do(action))
    }

    pub fn then_wait(self, duration_s: f64) -> Self {
        self.then(Step::Wait { duration_s })
    }

    pub fn then_wait_until(self, cond: Condition, timeout_s: f64) -> Self {
        self.then(Step::WaitUntil { cond, timeout_s })
    }

    /// Set the actions applied if the sequence is interrupted.
    pub fn on_cancel(mut self, actions: Vec<Action>) -> Self {
        self.on_cancel = actions;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The mechanisms driven by any of the sequence's actions.
    pub fn reqs(&self) -> Reqs {
        self.steps.iter().fold(Reqs::empty(), |r, s| r.union(s.reqs()))
    }

    /// Make a fresh task running this sequence.
    pub fn instantiate(&self) -> SeqTask {
        SeqTask {
            reqs: self.reqs(),
            seq: self.clone(),
            state: SeqState::Idle,
            active: None,
        }
    }
}

impl SeqTask {
    pub fn state(&self) -> SeqState {
        self.state
    }

    /// Run steps until one has to wait or the sequence completes.
    fn advance<C: ActionSink>(&mut self, ctx: &mut C, now_s: f64) -> TaskStatus {
        let mut index = match self.state {
            SeqState::Running(i) => i,
            SeqState::Idle => 0,
            SeqState::Completed | SeqState::Cancelled => return TaskStatus::Done,
        };

        loop {
            if let Some(active) = self.active.as_mut() {
                if !active.poll(ctx, now_s) {
                    self.state = SeqState::Running(index);
                    return TaskStatus::Running;
                }
                self.active = None;
                index += 1;
            }

            match self.seq.steps.get(index) {
                Some(step) => self.active = Some(step.start(ctx, now_s)),
                None => {
                    self.state = SeqState::Completed;
                    return TaskStatus::Done;
                }
            }
        }
    }
}

impl<C: ActionSink> Task<C> for SeqTask {
    fn name(&self) -> &str {
        &self.seq.name
    }

    fn reqs(&self) -> Reqs {
        self.reqs
    }

    fn init(&mut self, _ctx: &mut C, now_s: f64) {
        info!("Starting {} at {:.3} s", self.seq.name, now_s);
        self.state = SeqState::Running(0);
        self.active = None;
    }

    fn exec(&mut self, ctx: &mut C, now_s: f64) -> TaskStatus {
        self.advance(ctx, now_s)
    }

    fn end(&mut self, ctx: &mut C, interrupted: bool, now_s: f64) {
        if interrupted && self.state != SeqState::Completed {
            info!("{} cancelled at {:.3} s", self.seq.name, now_s);
            self.state = SeqState::Cancelled;
            self.active = None;

            for a in self.seq.on_cancel.iter() {
                ctx.apply(a);
            }
        } else {
            debug!("{} finished at {:.3} s", self.seq.name, now_s);
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use comms_if::{
        eqpt::MechId,
        tc::action::{IntakeAction, ShooterAction},
    };

    /// Records every action applied, with the time it was applied at.
    #[derive(Default)]
    pub(crate) struct TraceSink {
        pub now_s: f64,
        pub applied: Vec<(f64, Action)>,
        pub note_loaded: bool,
    }

    impl ActionSink for TraceSink {
        fn apply(&mut self, action: &Action) {
            self.applied.push((self.now_s, *action));
        }

        fn check(&self, cond: &Condition) -> bool {
            match cond {
                Condition::NoteLoaded => self.note_loaded,
                _ => false,
            }
        }
    }

    /// Run the task at `now_s`, recording actions against that time.
    pub(crate) fn exec_at(task: &mut SeqTask, sink: &mut TraceSink, now_s: f64) -> TaskStatus {
        sink.now_s = now_s;
        task.exec(sink, now_s)
    }

    fn start(task: &mut SeqTask, sink: &mut TraceSink) {
        Task::<TraceSink>::init(task, sink, 0.0);
    }

    const STOP_SHOOTER: Action = Action::Shooter(ShooterAction::Stop);
    const STOP_ROLLERS: Action = Action::Intake(IntakeAction::StopRollers);

    #[test]
    fn test_run_to_suspend() {
        let seq = Sequence::new("instant")
            .then_do(STOP_SHOOTER)
            .then_wait(0.0)
            .then_do(STOP_ROLLERS);

        let mut task = seq.instantiate();
        let mut sink = TraceSink::default();
        start(&mut task, &mut sink);

        // Instant steps and elapsed waits all run in the same cycle
        assert_eq!(exec_at(&mut task, &mut sink, 0.0), TaskStatus::Done);
        assert_eq!(sink.applied, vec![(0.0, STOP_SHOOTER), (0.0, STOP_ROLLERS)]);
        assert_eq!(task.state(), SeqState::Completed);
    }

    #[test]
    fn test_parallel_waits_for_all() {
        let seq = Sequence::new("group")
            .then(Step::Parallel(vec![
                Step::Do(STOP_SHOOTER),
                Step::Wait { duration_s: 0.5 },
                Step::WaitUntil { cond: Condition::NoteLoaded, timeout_s: 0.25 },
            ]))
            .then_do(STOP_ROLLERS);

        assert_eq!(seq.reqs(), Reqs::of(&[MechId::Shooter, MechId::Intake]));

        let mut task = seq.instantiate();
        let mut sink = TraceSink::default();
        start(&mut task, &mut sink);

        assert_eq!(exec_at(&mut task, &mut sink, 0.0), TaskStatus::Running);
        assert_eq!(sink.applied.len(), 1);
        assert_eq!(task.state(), SeqState::Running(0));

        // The condition times out first, the group still waits on the timer
        assert_eq!(exec_at(&mut task, &mut sink, 0.25), TaskStatus::Running);
        assert_eq!(exec_at(&mut task, &mut sink, 0.5), TaskStatus::Done);
        assert_eq!(sink.applied[1], (0.5, STOP_ROLLERS));
    }

    #[test]
    fn test_cancel_applies_cleanup() {
        let seq = Sequence::new("cancellable")
            .then_do(Action::Shooter(ShooterAction::Run(0.5)))
            .then_wait(1.0)
            .then_do(STOP_ROLLERS)
            .on_cancel(vec![STOP_SHOOTER]);

        let mut task = seq.instantiate();
        let mut sink = TraceSink::default();
        start(&mut task, &mut sink);
        exec_at(&mut task, &mut sink, 0.0);

        sink.now_s = 0.5;
        task.end(&mut sink, true, 0.5);

        assert_eq!(task.state(), SeqState::Cancelled);
        assert_eq!(sink.applied.last(), Some(&(0.5, STOP_SHOOTER)));
        assert!(!sink.applied.iter().any(|(_, a)| *a == STOP_ROLLERS));

        // A fresh instance starts from the beginning
        let task = seq.instantiate();
        assert_eq!(task.state(), SeqState::Idle);
    }
}
