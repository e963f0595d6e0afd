/// Opens external links (website, mail-to) in a new browsing context.
/// Fire and forget: nothing is reported back.
pub trait Navigator {
    fn open(&mut self, url: &str);
}

/// Navigator for headless sessions; records and logs every request.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    opened: Vec<String>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> &[String] {
        &self.opened
    }
}

impl Navigator for RecordingNavigator {
    fn open(&mut self, url: &str) {
        tracing::info!("Opening {} in a new context", url);
        self.opened.push(url.to_string());
    }
}
