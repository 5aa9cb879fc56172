use std::sync::Arc;

use paint_by_numbers::diagnostics::{self, BuildMode, DiagnosticSink, DiagnosticsLog};
use parking_lot::Mutex;

#[derive(Default, Clone)]
struct Recorder {
    lines: Arc<Mutex<Vec<(log::Level, String)>>>,
}

impl Recorder {
    fn lines(&self) -> Vec<(log::Level, String)> {
        self.lines.lock().clone()
    }
}

impl DiagnosticSink for Recorder {
    fn emit(&self, level: log::Level, line: &str) {
        self.lines.lock().push((level, line.to_owned()));
    }
}

fn exercise(log: &DiagnosticsLog) {
    log.log("starting");
    log.debug(format_args!("{} colors", 16));
    log.warn("palette is large");
    log.time("facets");
    log.time_end("facets");
}

#[test]
fn test_release_mode_silences_everything_but_errors() {
    let recorder = Recorder::default();
    let log = DiagnosticsLog::with_sink(BuildMode::Release, recorder.clone());

    exercise(&log);
    assert!(recorder.lines().is_empty());

    log.error("Error in process button handler");
    assert_eq!(
        recorder.lines(),
        vec![(
            log::Level::Error,
            "[PaintByNumbers] Error in process button handler".to_owned()
        )]
    );
}

#[test]
fn test_development_mode_emits_all_levels() {
    let recorder = Recorder::default();
    let log = DiagnosticsLog::with_sink(BuildMode::Development, recorder.clone());

    exercise(&log);
    log.error("broken");

    let levels: Vec<_> = recorder.lines().into_iter().map(|(level, _)| level).collect();
    assert_eq!(
        levels,
        vec![
            log::Level::Info,
            log::Level::Debug,
            log::Level::Warn,
            log::Level::Debug,
            log::Level::Error,
        ]
    );
}

#[test]
fn test_error_carries_cause() {
    let recorder = Recorder::default();
    let log = DiagnosticsLog::with_sink(BuildMode::Release, recorder.clone());

    let cause = std::io::Error::other("disk full");
    log.error_with_cause("Could not save", &cause);

    assert_eq!(
        recorder.lines(),
        vec![(log::Level::Error, "[PaintByNumbers] Could not save: disk full".to_owned())]
    );
}

#[test]
fn test_mode_is_fixed_at_construction() {
    let log = DiagnosticsLog::new(BuildMode::Development);
    assert_eq!(log.mode(), BuildMode::Development);
    assert!(!BuildMode::Release.is_development());
}

#[test]
fn test_global_log_is_usable_before_install() {
    // Safe without any set-up; settles on a release-mode log.
    diagnostics::get().warn("ignored");
    diagnostics::get().error("always printed");
    assert_eq!(diagnostics::get().mode(), BuildMode::Release);

    // The gate cannot be changed once chosen.
    assert!(!diagnostics::install(DiagnosticsLog::new(BuildMode::Development)));
    assert_eq!(diagnostics::get().mode(), BuildMode::Release);
}
