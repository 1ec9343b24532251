//! # Cooperative task scheduler
//!
//! Tasks declare the mechanisms they need through a [`Reqs`] set. At most one running task owns
//! each mechanism: scheduling a task whose requirements overlap a running task's interrupts the
//! running one, which is never resumed. A mechanism which nothing owns runs its default task, if
//! it has one.
//!
//! Tasks never block. Each call to [`Task::exec`] advances the task as far as it can go in the
//! current cycle and returns, so the whole scheduler runs inside one cycle of the main loop.
//!
//! The scheduler is generic over the context `C` the tasks act on, which in the executable is
//! the set of mechanisms.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt;

use comms_if::eqpt::MechId;
use log::{debug, warn};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

pub trait Task<C> {
    fn name(&self) -> &str;

    /// The mechanisms this task needs exclusive use of.
    fn reqs(&self) -> Reqs;

    /// Called once when the task starts running.
    fn init(&mut self, _ctx: &mut C, _now_s: f64) {}

    /// Advance the task.
    fn exec(&mut self, ctx: &mut C, now_s: f64) -> TaskStatus;

    /// Called once when the task stops running, either because it completed or because it was
    /// interrupted.
    fn end(&mut self, _ctx: &mut C, _interrupted: bool, _now_s: f64) {}
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Running,
    Done,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Set of mechanisms.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct Reqs(u8);

/// Builds a fresh default task for a mechanism.
pub type TaskFactory<C> = Box<dyn Fn() -> Box<dyn Task<C>>>;

pub struct Scheduler<C> {
    /// Running tasks, in the order they were started
    running: Vec<Box<dyn Task<C>>>,

    /// Tasks scheduled since the last step
    pending: Vec<Box<dyn Task<C>>>,

    /// Default task factories indexed by `MechId::index`
    defaults: [Option<TaskFactory<C>>; 4],
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Reqs {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn of(ids: &[MechId]) -> Self {
        ids.iter().fold(Self::empty(), |r, id| r.with(*id))
    }

    pub fn with(self, id: MechId) -> Self {
        Self(self.0 | (1 << id.index()))
    }

    pub fn union(self, other: Reqs) -> Self {
        Self(self.0 | other.0)
    }

    pub fn contains(&self, id: MechId) -> bool {
        self.0 & (1 << id.index()) != 0
    }

    pub fn intersects(&self, other: &Reqs) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = MechId> + '_ {
        MechId::ALL.iter().copied().filter(move |id| self.contains(*id))
    }
}

impl fmt::Debug for Reqs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Scheduler<C> {
    pub fn new() -> Self {
        Self {
            running: Vec::new(),
            pending: Vec::new(),
            defaults: [None, None, None, None],
        }
    }

    /// Schedule a task. It starts on the next step, interrupting any running task it conflicts
    /// with.
    pub fn schedule(&mut self, task: Box<dyn Task<C>>) {
        debug!("Scheduled {} requiring {:?}", task.name(), task.reqs());
        self.pending.push(task);
    }

    /// Set the task which runs on `id` whenever nothing else owns it.
    ///
    /// The factory's tasks must require `id` and nothing else.
    pub fn set_default<F>(&mut self, id: MechId, factory: F)
    where
        F: Fn() -> Box<dyn Task<C>> + 'static,
    {
        self.defaults[id.index()] = Some(Box::new(factory));
    }

    /// Run one cycle of the scheduler.
    ///
    /// Newly scheduled tasks start first, then defaults fill any mechanism left free, then every
    /// running task is advanced. Tasks which complete are ended and removed.
    pub fn step(&mut self, ctx: &mut C, now_s: f64) {
        // Start pending tasks
        let pending: Vec<_> = self.pending.drain(..).collect();
        for mut task in pending {
            self.interrupt_conflicts(&task.reqs(), ctx, now_s);
            task.init(ctx, now_s);
            self.running.push(task);
        }

        // Start defaults on free mechanisms
        for id in MechId::ALL.iter() {
            if self.is_claimed(*id) {
                continue;
            }

            if let Some(ref factory) = self.defaults[id.index()] {
                let mut task = factory();
                task.init(ctx, now_s);
                self.running.push(task);
            }
        }

        // Advance everything
        let mut i = 0;
        while i < self.running.len() {
            match self.running[i].exec(ctx, now_s) {
                TaskStatus::Running => i += 1,
                TaskStatus::Done => {
                    let mut task = self.running.remove(i);
                    debug!("{} completed", task.name());
                    task.end(ctx, false, now_s);
                }
            }
        }
    }

    /// Interrupt every running task and drop every pending one.
    pub fn cancel_all(&mut self, ctx: &mut C, now_s: f64) {
        self.pending.clear();

        for mut task in self.running.drain(..) {
            debug!("{} cancelled", task.name());
            task.end(ctx, true, now_s);
        }
    }

    /// True if a running task owns `id`.
    pub fn is_claimed(&self, id: MechId) -> bool {
        self.running.iter().any(|t| t.reqs().contains(id))
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.running.iter().any(|t| t.name() == name)
    }

    pub fn running_names(&self) -> Vec<&str> {
        self.running.iter().map(|t| t.name()).collect()
    }

    fn interrupt_conflicts(&mut self, reqs: &Reqs, ctx: &mut C, now_s: f64) {
        let mut i = 0;
        while i < self.running.len() {
            if self.running[i].reqs().intersects(reqs) {
                let mut task = self.running.remove(i);
                warn!("{} interrupted by a conflicting task", task.name());
                task.end(ctx, true, now_s);
            } else {
                i += 1;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Log of lifecycle events
    type Trace = Vec<String>;

    struct CountTask {
        name: &'static str,
        reqs: Reqs,
        cycles: usize,
    }

    impl CountTask {
        fn boxed(name: &'static str, ids: &[MechId], cycles: usize) -> Box<dyn Task<Trace>> {
            Box::new(Self { name, reqs: Reqs::of(ids), cycles })
        }
    }

    impl Task<Trace> for CountTask {
        fn name(&self) -> &str {
            self.name
        }

        fn reqs(&self) -> Reqs {
            self.reqs
        }

        fn init(&mut self, ctx: &mut Trace, _: f64) {
            ctx.push(format!("init {}", self.name));
        }

        fn exec(&mut self, ctx: &mut Trace, _: f64) -> TaskStatus {
            ctx.push(format!("exec {}", self.name));
            if self.cycles <= 1 {
                TaskStatus::Done
            } else {
                self.cycles -= 1;
                TaskStatus::Running
            }
        }

        fn end(&mut self, ctx: &mut Trace, interrupted: bool, _: f64) {
            ctx.push(format!("end {} {}", self.name, interrupted));
        }
    }

    #[test]
    fn test_reqs() {
        let a = Reqs::of(&[MechId::Intake, MechId::Shooter]);
        let b = Reqs::empty().with(MechId::ClimbLeft);

        assert!(a.contains(MechId::Shooter));
        assert!(!a.intersects(&b));
        assert!(a.union(b).intersects(&b));
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![MechId::Intake, MechId::Shooter]);
        assert!(Reqs::of(&[]).is_empty());
    }

    #[test]
    fn test_conflict_interrupts() {
        let mut sched = Scheduler::new();
        let mut trace = Trace::new();

        sched.schedule(CountTask::boxed("a", &[MechId::Intake, MechId::Shooter], 10));
        sched.schedule(CountTask::boxed("b", &[MechId::ClimbLeft], 10));
        sched.step(&mut trace, 0.0);
        assert_eq!(sched.running_names(), vec!["a", "b"]);

        trace.clear();
        sched.schedule(CountTask::boxed("c", &[MechId::Shooter], 10));
        sched.step(&mut trace, 0.02);

        assert_eq!(trace, vec!["end a true", "init c", "exec b", "exec c"]);
        assert_eq!(sched.running_names(), vec!["b", "c"]);
        assert!(!sched.is_claimed(MechId::Intake));
    }

    #[test]
    fn test_completion() {
        let mut sched = Scheduler::new();
        let mut trace = Trace::new();

        sched.schedule(CountTask::boxed("a", &[MechId::Intake], 2));
        sched.step(&mut trace, 0.0);
        sched.step(&mut trace, 0.02);

        assert_eq!(trace, vec!["init a", "exec a", "exec a", "end a false"]);
        assert!(!sched.is_running("a"));
    }

    #[test]
    fn test_defaults() {
        let mut sched = Scheduler::new();
        let mut trace = Trace::new();

        sched.set_default(MechId::ClimbLeft, || CountTask::boxed("drive", &[MechId::ClimbLeft], 1000));
        sched.step(&mut trace, 0.0);
        assert!(sched.is_running("drive"));

        // Any claim on the mechanism interrupts the default
        sched.schedule(CountTask::boxed("raise", &[MechId::ClimbLeft], 1));
        sched.step(&mut trace, 0.02);
        assert!(trace.contains(&"end drive true".to_string()));
        assert!(!sched.is_running("drive"));

        // It comes back once the mechanism is free again
        sched.step(&mut trace, 0.04);
        assert_eq!(sched.running_names(), vec!["drive"]);
    }

    #[test]
    fn test_cancel_all() {
        let mut sched = Scheduler::new();
        let mut trace = Trace::new();

        sched.schedule(CountTask::boxed("a", &[MechId::Intake], 10));
        sched.step(&mut trace, 0.0);
        sched.schedule(CountTask::boxed("b", &[MechId::Shooter], 10));

        trace.clear();
        sched.cancel_all(&mut trace, 0.02);

        assert_eq!(trace, vec!["end a true"]);
        assert!(sched.running_names().is_empty());
        sched.step(&mut trace, 0.04);
        assert!(sched.running_names().is_empty());
    }
}
