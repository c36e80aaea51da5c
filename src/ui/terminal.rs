use super::{PlayerView, Presenter, QueueView, SearchResultsView, ToastView, UiEvent};
use crate::utils::truncate_text;
use std::io::Write;
use std::time::{Duration, Instant};
use tracing::error;

const TITLE_WIDTH: usize = 48;

/// Human-readable presenter. Progress overwrites the current line; every
/// other event starts on a fresh one.
pub struct TerminalPresenter<W: Write> {
    writer: W,
    toast_duration: Duration,
    toasts: Vec<(ToastView, Instant)>,
    progress_line_open: bool,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(writer: W, toast_duration: Duration) -> Self {
        Self {
            writer,
            toast_duration,
            toasts: Vec::new(),
            progress_line_open: false,
        }
    }

    /// Toasts that have not yet expired, oldest first
    pub fn active_toasts(&self) -> impl Iterator<Item = &ToastView> {
        self.toasts.iter().map(|(toast, _)| toast)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn expire_toasts(&mut self, now: Instant) {
        let duration = self.toast_duration;
        self.toasts
            .retain(|(_, shown_at)| now.duration_since(*shown_at) < duration);
    }

    fn render(&mut self, event: UiEvent) -> std::io::Result<()> {
        if let UiEvent::Progress(progress) = event {
            write!(
                self.writer,
                "\r  {} / {}",
                progress.position_label, progress.duration_label
            )?;
            self.progress_line_open = true;
            return self.writer.flush();
        }

        if self.progress_line_open {
            writeln!(self.writer)?;
            self.progress_line_open = false;
        }
        match event {
            UiEvent::Player(player) => self.render_player(&player)?,
            UiEvent::Queue(queue) => self.render_queue(&queue)?,
            UiEvent::SearchResults(results) => self.render_search(&results)?,
            UiEvent::Toast(toast) => {
                writeln!(self.writer, "[{}] {}", toast.name, toast.message)?;
                self.toasts.push((toast, Instant::now()));
            }
            UiEvent::Progress(_) => {}
        }
        self.writer.flush()
    }

    fn render_player(&mut self, player: &PlayerView) -> std::io::Result<()> {
        let status = match (player.connected, &player.track) {
            (false, _) => "offline",
            (true, None) => "idle",
            (true, Some(_)) if player.show_play => "paused",
            (true, Some(_)) => "playing",
        };
        match &player.track {
            Some(track) => write!(
                self.writer,
                "[{}] {} - {}  {} / {}",
                status,
                truncate_text(&track.title, TITLE_WIDTH),
                track.author,
                player.position_label,
                track.duration_label
            )?,
            None => write!(self.writer, "[{}] Nothing is playing", status)?,
        }
        // latest toast stays on the status line until it expires
        let latest = self
            .active_toasts()
            .last()
            .map(|toast| format!("  | {}: {}", toast.name, toast.message));
        if let Some(latest) = latest {
            write!(self.writer, "{}", latest)?;
        }
        writeln!(self.writer)
    }

    fn render_queue(&mut self, queue: &QueueView) -> std::io::Result<()> {
        writeln!(self.writer, "Queue ({} tracks)", queue.tracks.len())?;
        for (index, track) in queue.tracks.iter().enumerate() {
            let marker = if queue.current == Some(index) { ">" } else { " " };
            writeln!(
                self.writer,
                "{} {:>3}. {} - {} [{}]",
                marker,
                index + 1,
                truncate_text(&track.title, TITLE_WIDTH),
                track.author,
                track.duration_label
            )?;
        }
        Ok(())
    }

    fn render_search(&mut self, results: &SearchResultsView) -> std::io::Result<()> {
        writeln!(self.writer, "Search results")?;
        for (index, track) in results.tracks.iter().enumerate() {
            writeln!(
                self.writer,
                "  {:>2}. {} - {} [{}]",
                index + 1,
                truncate_text(&track.title, TITLE_WIDTH),
                track.author,
                track.duration_label
            )?;
        }
        Ok(())
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn present(&mut self, event: UiEvent) {
        self.expire_toasts(Instant::now());
        if let Err(e) = self.render(event) {
            error!("Failed to write to terminal: {}", e);
        }
    }
}
