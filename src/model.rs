//! Job state for the single in-flight download.

/// Represents the current state of a download
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DownloadStatus {
    /// Metadata lookup is running
    Fetching,
    /// yt-dlp is writing the file
    Downloading,
    /// The file landed on disk
    Done,
    /// The worker gave up; the message is in `DownloadJob::error`
    Failed,
}

/// One message from the worker to the UI thread.
#[derive(Clone, Debug, PartialEq)]
pub enum DownloadEvent {
    /// Real title from yt-dlp, replacing the placeholder
    Metadata { title: String },
    /// Progress fraction (0.0 to 1.0) plus a human-readable speed
    Progress { fraction: f32, speed: Option<String> },
    Completed,
    Failed { message: String },
}

/// Data structure for tracking the active download in the UI
#[derive(Clone, Debug)]
pub struct DownloadJob {
    /// Human-readable title (placeholder until metadata arrives)
    pub title: String,
    /// Video identifier extracted from the URL, when there was one
    pub video_id: Option<String>,
    /// Current status of the download
    pub status: DownloadStatus,
    /// Progress fraction (0.0 to 1.0)
    pub progress: f32,
    /// Current download speed, e.g. "3.21MiB/s"
    pub speed: Option<String>,
    /// Failure message once `status` is `Failed`
    pub error: Option<String>,
}

impl DownloadJob {
    pub fn new(title: String, video_id: Option<String>) -> Self {
        Self {
            title,
            video_id,
            status: DownloadStatus::Fetching,
            progress: 0.0,
            speed: None,
            error: None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            DownloadStatus::Fetching | DownloadStatus::Downloading
        )
    }

    /// Folds one worker event into the job. Progress never moves backward
    /// (yt-dlp restarts its percent counter for each stream it fetches),
    /// and terminal states absorb whatever still arrives on the channel.
    pub fn apply(&mut self, event: DownloadEvent) {
        if !self.is_active() {
            return;
        }
        match event {
            DownloadEvent::Metadata { title } => {
                self.title = title;
            }
            DownloadEvent::Progress { fraction, speed } => {
                self.status = DownloadStatus::Downloading;
                if fraction > self.progress {
                    self.progress = fraction.min(1.0);
                }
                if speed.is_some() {
                    self.speed = speed;
                }
            }
            DownloadEvent::Completed => {
                self.status = DownloadStatus::Done;
                self.progress = 1.0;
                self.speed = None;
            }
            DownloadEvent::Failed { message } => {
                self.status = DownloadStatus::Failed;
                self.error = Some(message);
                self.speed = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> DownloadJob {
        DownloadJob::new("placeholder".to_string(), Some("abc".to_string()))
    }

    #[test]
    fn progress_never_moves_backward() {
        let mut j = job();
        j.apply(DownloadEvent::Progress { fraction: 0.6, speed: None });
        j.apply(DownloadEvent::Progress { fraction: 0.1, speed: None });
        assert_eq!(j.progress, 0.6);
        assert_eq!(j.status, DownloadStatus::Downloading);
    }

    #[test]
    fn completion_comes_from_the_worker_not_from_percent() {
        let mut j = job();
        j.apply(DownloadEvent::Progress { fraction: 1.0, speed: None });
        assert!(j.is_active());
        j.apply(DownloadEvent::Completed);
        assert_eq!(j.status, DownloadStatus::Done);
        assert_eq!(j.progress, 1.0);
        assert!(j.speed.is_none());
    }

    #[test]
    fn metadata_replaces_the_placeholder_title() {
        let mut j = job();
        j.apply(DownloadEvent::Metadata { title: "Real Title".to_string() });
        assert_eq!(j.title, "Real Title");
        assert_eq!(j.status, DownloadStatus::Fetching);
    }

    #[test]
    fn speed_persists_across_updates_without_one() {
        let mut j = job();
        j.apply(DownloadEvent::Progress {
            fraction: 0.2,
            speed: Some("2.0MiB/s".to_string()),
        });
        j.apply(DownloadEvent::Progress { fraction: 0.3, speed: None });
        assert_eq!(j.speed.as_deref(), Some("2.0MiB/s"));
    }

    #[test]
    fn terminal_states_ignore_late_events() {
        let mut j = job();
        j.apply(DownloadEvent::Failed { message: "boom".to_string() });
        j.apply(DownloadEvent::Progress { fraction: 0.9, speed: None });
        j.apply(DownloadEvent::Completed);
        assert_eq!(j.status, DownloadStatus::Failed);
        assert_eq!(j.progress, 0.0);
        assert_eq!(j.error.as_deref(), Some("boom"));
    }
}
