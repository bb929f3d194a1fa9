/// Events emitted by the evaluation workflow and its tasks.
///
/// A workflow is a sequence of phases (census, one per backend). Inside a
/// phase, a task may announce a number of steps (rows for the serial
/// evaluator, work groups for a dispatch) and advance through them.
#[derive(Debug, Clone)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    TaskIncrement { amount: u64 },
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards events to an optional callback. Shared by reference across
/// accelerator worker threads, hence the `Send + Sync` bound on the callback.
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

    /// Runs `body` between a `PhaseStart` and a `PhaseFinish`. The phase is
    /// closed whatever `body` returns.
    pub fn phase<T>(&self, name: &'static str, body: impl FnOnce() -> T) -> T {
        self.report(Progress::PhaseStart { name });
        let result = body();
        self.report(Progress::PhaseFinish);
        result
    }

    pub fn start_task(&self, total_steps: usize) {
        self.report(Progress::TaskStart {
            total_steps: total_steps as u64,
        });
    }

    #[inline]
    pub fn advance(&self, amount: u64) {
        self.report(Progress::TaskIncrement { amount });
    }

    pub fn finish_task(&self) {
        self.report(Progress::TaskFinish);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording() -> (Arc<Mutex<Vec<String>>>, ProgressReporter<'static>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |event| {
            sink.lock().unwrap().push(format!("{event:?}"));
        }));
        (seen, reporter)
    }

    #[test]
    fn reporter_without_callback_ignores_events() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::PhaseStart { name: "Nothing" });
        reporter.advance(3);
        reporter.report(Progress::PhaseFinish);
    }

    #[test]
    fn reporter_forwards_events_to_callback() {
        let (seen, reporter) = recording();

        reporter.start_task(3);
        reporter.advance(1);
        reporter.finish_task();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen[0].contains("total_steps: 3"));
        assert!(seen[1].contains("amount: 1"));
        assert_eq!(seen[2], "TaskFinish");
    }

    #[test]
    fn phase_is_closed_even_when_the_body_fails() {
        let (seen, reporter) = recording();

        let result: Result<(), &str> = reporter.phase("Serial Evaluation", || Err("boom"));

        assert_eq!(result, Err("boom"));
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].contains("Serial Evaluation"));
        assert_eq!(seen[1], "PhaseFinish");
    }
}
