use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar for long-running preparation phases.
pub fn get_progressbar(job_name: &str, len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    bar.set_message(job_name.to_string());
    bar.set_style(
        ProgressStyle::with_template(" {msg} {wide_bar} ({percent_precise}%) remaining: {eta_precise}")
            .unwrap(),
    );
    bar
}
