/// Events emitted while a batch comparison runs.
///
/// A phase groups related tasks (e.g. one series of the trajectory analyzer); a task counts
/// individual comparisons.
#[derive(Debug, Clone)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards [`Progress`] events to an optional callback.
///
/// Comparisons may run on several threads, so the callback must be `Send + Sync`.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    /// Reports a task of `total` comparisons, runs `work`, then closes the task.
    pub(crate) fn task<T>(&self, total: usize, work: impl FnOnce() -> T) -> T {
        self.report(Progress::TaskStart {
            total_steps: total as u64,
        });
        let result = work();
        self.report(Progress::TaskFinish);
        result
    }
}
