use crate::SimTime;

/// A simulation that can be advanced one discrete step at a time.
///
/// Implementors pop and process exactly one calendar entry per `step` call.
/// The executor uses `next_due` to honor time-bounded runs without
/// processing entries past the bound.
pub trait Step {
    /// Performs one step. Returns `true` if an entry was processed, and
    /// `false` if the calendar was empty.
    fn step(&mut self) -> bool;

    /// Due time of the next pending entry, or `None` if there is none.
    fn next_due(&self) -> Option<SimTime>;
}

/// Simulation execution trait.
pub trait Execute<S: Step> {
    /// Executes the simulation until some stopping condition is reached.
    /// The condition is implementation-specific.
    fn execute(self, sim: &mut S);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndCondition {
    Time(SimTime),
    NoEvents,
    Steps(usize),
}

/// Executor is used for simple execution of an entire simulation.
///
/// See the crate level documentation for examples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Executor {
    end_condition: EndCondition,
}

impl Executor {
    /// Run until the calendar drains. Only terminates for simulations whose
    /// event chains eventually stop rescheduling themselves.
    #[must_use]
    pub fn unbound() -> Self {
        Self {
            end_condition: EndCondition::NoEvents,
        }
    }

    /// Run no further than the given time. Entries due after it stay
    /// pending; the run may terminate early if the calendar drains.
    #[must_use]
    pub fn timed(time: SimTime) -> Self {
        Self {
            end_condition: EndCondition::Time(time),
        }
    }

    /// Execute exactly this many steps, unless the calendar drains first.
    #[must_use]
    pub fn steps(steps: usize) -> Self {
        Self {
            end_condition: EndCondition::Steps(steps),
        }
    }

    /// Registers a side effect that is called _after_ each step. Render
    /// layers use this to poll a snapshot between steps.
    #[must_use]
    pub fn side_effect<F>(self, func: F) -> ExecutorWithSideEffect<F> {
        ExecutorWithSideEffect {
            end_condition: self.end_condition,
            side_effect: func,
        }
    }
}

impl<S: Step> Execute<S> for Executor {
    fn execute(self, sim: &mut S) {
        run_with(sim, self.end_condition, |_| {});
    }
}

pub struct ExecutorWithSideEffect<F> {
    end_condition: EndCondition,
    side_effect: F,
}

impl<S, F> Execute<S> for ExecutorWithSideEffect<F>
where
    S: Step,
    F: Fn(&S),
{
    fn execute(self, sim: &mut S) {
        run_with(sim, self.end_condition, self.side_effect);
    }
}

fn run_with<S, F>(sim: &mut S, end_condition: EndCondition, side_effect: F)
where
    S: Step,
    F: Fn(&S),
{
    let step_fn = |sim: &mut S| {
        let result = sim.step();
        if result {
            side_effect(sim);
        }
        result
    };
    match end_condition {
        EndCondition::Time(time) => execute_until(sim, time, step_fn),
        EndCondition::NoEvents => execute_until_empty(sim, step_fn),
        EndCondition::Steps(steps) => execute_steps(sim, steps, step_fn),
    }
}

fn execute_until_empty<S, F>(sim: &mut S, step: F)
where
    S: Step,
    F: Fn(&mut S) -> bool,
{
    while step(sim) {}
}

fn execute_until<S, F>(sim: &mut S, time: SimTime, step: F)
where
    S: Step,
    F: Fn(&mut S) -> bool,
{
    while sim.next_due().is_some_and(|due| due <= time) {
        step(sim);
    }
}

fn execute_steps<S, F>(sim: &mut S, steps: usize, step: F)
where
    S: Step,
    F: Fn(&mut S) -> bool,
{
    for _ in 0..steps {
        if !step(sim) {
            break;
        }
    }
}
