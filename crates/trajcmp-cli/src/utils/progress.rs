use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;
use trajcmp::engine::progress::{Progress, ProgressCallback};

const SPINNER_TICK_MS: u64 = 80;

/// Renders engine progress on stderr: a spinner while a phase loads or prepares, a bar while
/// its comparisons run.
#[derive(Clone)]
pub struct CliProgressHandler {
    bar: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr())
            .with_style(Self::spinner_style());
        bar.finish_and_clear();

        Self {
            bar: Arc::new(Mutex::new(bar)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let bar = Arc::clone(&self.bar);

        Box::new(move |progress: Progress| {
            let Ok(bar) = bar.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PhaseStart { name } => {
                    bar.reset();
                    bar.set_length(0);
                    bar.set_style(Self::spinner_style());
                    bar.set_message(name);
                    bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                }
                Progress::TaskStart { total_steps } => {
                    bar.disable_steady_tick();
                    bar.reset();
                    bar.set_length(total_steps);
                    bar.set_style(Self::comparison_style());
                }
                Progress::TaskIncrement => bar.inc(1),
                Progress::TaskFinish => bar.finish(),
                Progress::PhaseFinish => {
                    bar.disable_steady_tick();
                    bar.finish_with_message("✓ Done");
                }
                Progress::Message(msg) => bar.println(msg),
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn comparison_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{msg:<20} [{bar:40.cyan/blue}] {pos}/{len} comparisons ({per_sec}, {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn handler_starts_finished_and_empty() {
        let handler = CliProgressHandler::new();
        let bar = handler.bar.lock().unwrap();
        assert_eq!(bar.length(), Some(0));
        assert!(bar.is_finished());
    }

    #[test]
    fn callback_tracks_a_comparison_phase() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart { name: "to_base" });
        {
            let bar = handler.bar.lock().unwrap();
            assert_eq!(bar.message(), "to_base");
            assert!(!bar.is_finished());
        }

        callback(Progress::TaskStart { total_steps: 3 });
        for _ in 0..3 {
            callback(Progress::TaskIncrement);
        }
        {
            let bar = handler.bar.lock().unwrap();
            assert_eq!(bar.length(), Some(3));
            assert_eq!(bar.position(), 3);
        }

        callback(Progress::TaskFinish);
        assert!(handler.bar.lock().unwrap().is_finished());

        callback(Progress::PhaseFinish);
        assert_eq!(handler.bar.lock().unwrap().message(), "✓ Done");
    }

    #[test]
    fn increments_from_worker_threads_are_all_counted() {
        let handler = CliProgressHandler::new();
        let callback = Arc::new(handler.get_callback());
        callback(Progress::TaskStart { total_steps: 40 });

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let callback = Arc::clone(&callback);
                thread::spawn(move || {
                    for _ in 0..10 {
                        callback(Progress::TaskIncrement);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(handler.bar.lock().unwrap().position(), 40);
    }
}
