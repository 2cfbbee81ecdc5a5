//! Main application for the YouTube Downloader GUI

// External downloader spawning logic (yt-dlp)
mod downloader;
// Typed error set
mod error;
// Data models for the download job and worker events
mod model;
// Progress parsing utilities
mod progress;
// Thumbnail fetching module
mod thumbnail;
// URL validation and video-id extraction
mod validate;

use std::sync::{Arc, Mutex};

use downloader::spawn_download;
use eframe::{App, Frame, egui};
use egui::{Color32, ColorImage, RichText, TextureOptions, Visuals};
use model::{DownloadEvent, DownloadJob, DownloadStatus};
use once_cell::sync::OnceCell;
use rfd::FileDialog;
use tokio::{
    runtime::Runtime,
    sync::mpsc::{UnboundedReceiver, unbounded_channel},
};
use tracing_subscriber::EnvFilter;
use validate::validate_url;

// Global Tokio runtime stored in a OnceCell for lazy init
static RUNTIME: OnceCell<Arc<Runtime>> = OnceCell::new();

fn runtime() -> &'static Arc<Runtime> {
    RUNTIME.get().expect("runtime is set before the UI starts")
}

/// Program entry point: initializes logging and the runtime, launches the GUI
fn main() -> Result<(), eframe::Error> {
    init_logging();

    let rt = Arc::new(Runtime::new().expect("failed to start tokio runtime"));
    RUNTIME.set(rt).expect("runtime set once");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 440.0])
            .with_min_inner_size([480.0, 360.0]),
        ..Default::default()
    };
    eframe::run_native(
        "YouTube Downloader",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(Visuals::dark());
            Box::new(DownloaderApp::default())
        }),
    )
}

/// Stderr logging with `RUST_LOG` override.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tubedown=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

/// Application state for the GUI
struct DownloaderApp {
    /// Input field for the YouTube URL
    url_input: String,
    /// Destination folder for downloads
    download_folder: String,
    /// The one in-flight (or finished) download
    job: Option<DownloadJob>,
    /// Worker-to-UI event stream for the current job
    events_rx: Option<UnboundedReceiver<DownloadEvent>>,
    /// Decoded thumbnail texture for the current job
    thumbnail: Option<egui::TextureHandle>,
    /// Completed thumbnail fetches waiting to become textures (video_id, image)
    thumbnail_results: Arc<Mutex<Vec<(String, ColorImage)>>>,
    /// Status line under the progress bar
    status: String,
    status_color: Color32,
}

impl Default for DownloaderApp {
    fn default() -> Self {
        Self {
            url_input: String::new(),
            download_folder: default_download_folder(),
            job: None,
            events_rx: None,
            thumbnail: None,
            thumbnail_results: Arc::new(Mutex::new(Vec::new())),
            status: String::new(),
            status_color: Color32::GRAY,
        }
    }
}

/// Platform Downloads directory, or `./downloads` when the platform has none.
fn default_download_folder() -> String {
    dirs::download_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "./downloads".to_string())
}

impl DownloaderApp {
    fn is_downloading(&self) -> bool {
        self.job.as_ref().map_or(false, DownloadJob::is_active)
    }

    fn set_status(&mut self, message: impl Into<String>, color: Color32) {
        self.status = message.into();
        self.status_color = color;
    }

    /// Validates the input and hands the download to the worker.
    fn start_download(&mut self, ctx: &egui::Context) {
        let video = match validate_url(&self.url_input) {
            Ok(v) => v,
            Err(err) => {
                self.set_status(err.to_string(), Color32::RED);
                return;
            }
        };

        let placeholder = video
            .video_id
            .as_deref()
            .map(|id| format!("Video {id}"))
            .unwrap_or_else(|| video.url.clone());
        self.job = Some(DownloadJob::new(placeholder, video.video_id.clone()));
        self.thumbnail = None;
        self.set_status("Starting download...", Color32::GRAY);

        // Fetch the preview on the blocking pool
        if let Some(id) = video.video_id.clone() {
            let results = Arc::clone(&self.thumbnail_results);
            let ctx = ctx.clone();
            runtime().spawn_blocking(move || {
                if let Some(img) = thumbnail::fetch_thumbnail(&id) {
                    results.lock().unwrap().push((id, img));
                    ctx.request_repaint();
                }
            });
        }

        // Create the event channel and launch the worker
        let (tx, rx) = unbounded_channel();
        self.events_rx = Some(rx);
        runtime().spawn(spawn_download(
            video.url,
            self.download_folder.clone(),
            tx,
        ));

        // Clear the URL input after starting the download
        self.url_input.clear();
    }

    /// Applies everything the worker sent since the last frame.
    fn drain_events(&mut self) {
        let mut dirty = false;
        if let (Some(rx), Some(job)) = (self.events_rx.as_mut(), self.job.as_mut()) {
            while let Ok(event) = rx.try_recv() {
                job.apply(event);
                dirty = true;
            }
        }
        if dirty {
            self.refresh_status();
        }
    }

    fn refresh_status(&mut self) {
        let Some(job) = self.job.as_ref() else { return };
        let (text, color) = match job.status {
            DownloadStatus::Fetching => {
                ("Fetching video information...".to_string(), Color32::GRAY)
            }
            DownloadStatus::Downloading => {
                let mut text = format!("Downloading... {:.1}%", job.progress * 100.0);
                if let Some(speed) = &job.speed {
                    text.push_str(&format!(" ({speed})"));
                }
                (text, Color32::LIGHT_BLUE)
            }
            DownloadStatus::Done => ("Download complete!".to_string(), Color32::GREEN),
            DownloadStatus::Failed => (
                job.error
                    .clone()
                    .unwrap_or_else(|| "Download failed".to_string()),
                Color32::RED,
            ),
        };
        self.status = text;
        self.status_color = color;
    }

    /// Turns completed thumbnail fetches into textures.
    fn drain_thumbnails(&mut self, ctx: &egui::Context) {
        let mut pending = self.thumbnail_results.lock().unwrap();
        for (vid, img) in pending.drain(..) {
            let current = self.job.as_ref().and_then(|j| j.video_id.as_deref());
            if current == Some(vid.as_str()) {
                self.thumbnail = Some(ctx.load_texture(&vid, img, TextureOptions::default()));
            }
        }
    }
}

/// GUI update loop: called each frame to redraw and handle interactions
impl App for DownloaderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.drain_events();
        self.drain_thumbnails(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("YouTube Downloader");
            ui.add_space(8.0);

            // URL input with clear button
            ui.label("Paste YouTube video URL:");
            ui.horizontal(|ui| {
                ui.text_edit_singleline(&mut self.url_input);
                if ui.button("Clear").clicked() {
                    self.url_input.clear();
                }
            });

            // Folder selection
            ui.horizontal(|ui| {
                ui.label("Download folder:");
                ui.text_edit_singleline(&mut self.download_folder);
                if ui.button("Browse…").clicked() {
                    if let Some(folder) = FileDialog::new()
                        .set_directory(&self.download_folder)
                        .pick_folder()
                    {
                        self.download_folder = folder.display().to_string();
                    }
                }
            });

            ui.add_space(8.0);

            // One download at a time
            let busy = self.is_downloading();
            ui.horizontal(|ui| {
                if ui.add_enabled(!busy, egui::Button::new("Download")).clicked() {
                    self.start_download(ctx);
                }
                if busy {
                    ui.spinner();
                }
            });

            ui.add_space(8.0);
            let fraction = self.job.as_ref().map_or(0.0, |j| j.progress);
            ui.add(egui::ProgressBar::new(fraction).show_percentage());

            if !self.status.is_empty() {
                ui.label(RichText::new(&self.status).color(self.status_color));
            }

            // Current job card: thumbnail, title, open-folder once done
            if let Some(job) = &self.job {
                ui.add_space(8.0);
                ui.group(|ui| {
                    ui.horizontal(|ui| {
                        if let Some(tex) = &self.thumbnail {
                            ui.add(egui::Image::new(tex).max_width(200.0));
                        }
                        ui.vertical(|ui| {
                            ui.label(&job.title);
                            if matches!(job.status, DownloadStatus::Done)
                                && ui.button("Open Folder").clicked()
                            {
                                open_folder(self.download_folder.clone());
                            }
                        });
                    });
                });
            }
        });

        // Request periodic repaint for progress updates
        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

/// Opens the destination folder in the platform file manager.
fn open_folder(folder: String) {
    std::thread::spawn(move || {
        #[cfg(target_os = "windows")]
        {
            let _ = std::process::Command::new("explorer").arg(&folder).spawn();
        }
        #[cfg(target_os = "macos")]
        {
            let _ = std::process::Command::new("open").arg(&folder).spawn();
        }
        #[cfg(all(unix, not(target_os = "macos")))]
        {
            let _ = std::process::Command::new("xdg-open").arg(&folder).spawn();
        }
    });
}
