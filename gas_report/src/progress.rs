use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

const TEMPLATE: &str =
    "[{elapsed_precise}] {wide_bar:.green} {pos:>2}/{len:2} groups {msg}";

/// Progress over the groups of a results directory. It is also the writer
/// of the tracing subscriber, so log lines are printed above the bar.
#[derive(Clone)]
pub struct GroupProgress {
    bar: ProgressBar,
}

impl GroupProgress {
    /// Installs the global tracing subscriber. The bar has no length until
    /// `start` gives it the number of groups.
    pub fn init() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(ProgressStyle::default_bar().template(TEMPLATE));
        let progress = Self { bar };

        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(progress.clone())
            .init();

        progress
    }

    pub fn start(&self, groups: usize) {
        self.bar.set_length(groups as u64);
    }

    /// Marks `group` as rendered (or skipped).
    pub fn group_done(&self, group: &str) {
        self.bar.set_message(group.to_string());
        self.bar.inc(1);
    }

    pub fn finish(&self, output: &str) {
        self.bar.finish_with_message(format!("-> {}", output));
    }
}

impl std::io::Write for GroupProgress {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        // a single event may span several lines (e.g. error reports)
        for line in String::from_utf8_lossy(buf).lines() {
            self.bar.println(line);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for GroupProgress {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
