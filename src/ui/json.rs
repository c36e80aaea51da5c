use super::{Presenter, UiEvent};
use std::io::Write;
use tracing::error;

/// Writes one JSON object per event, for a frontend reading our stdout
pub struct JsonLinesPresenter<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesPresenter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Presenter for JsonLinesPresenter<W> {
    fn present(&mut self, event: UiEvent) {
        let line = match serde_json::to_string(&event) {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to serialize UI event: {}", e);
                return;
            }
        };
        if let Err(e) = writeln!(self.writer, "{}", line).and_then(|_| self.writer.flush()) {
            error!("Failed to write UI event: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::SearchResultsView;

    #[test]
    fn test_writes_one_line_per_event() {
        let mut presenter = JsonLinesPresenter::new(Vec::new());
        presenter.present(UiEvent::SearchResults(SearchResultsView { tracks: Vec::new() }));
        presenter.present(UiEvent::SearchResults(SearchResultsView { tracks: Vec::new() }));

        let output = String::from_utf8(presenter.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"event":"search-results","tracks":[]}"#);
    }
}
