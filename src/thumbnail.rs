use eframe::egui::ColorImage;
use tracing::debug;

/// Downloads and decodes the preview image for a video. Runs on the blocking
/// pool; any failure just means no thumbnail.
pub fn fetch_thumbnail(video_id: &str) -> Option<ColorImage> {
    // maxresdefault is missing for plenty of videos; hqdefault always exists.
    for variant in ["maxresdefault", "hqdefault"] {
        let url = format!("https://img.youtube.com/vi/{video_id}/{variant}.jpg");
        match fetch_and_decode(&url) {
            Some(img) => return Some(img),
            None => debug!(%url, "thumbnail fetch failed"),
        }
    }
    None
}

fn fetch_and_decode(url: &str) -> Option<ColorImage> {
    let resp = reqwest::blocking::get(url).ok()?;
    if !resp.status().is_success() {
        return None;
    }
    let bytes = resp.bytes().ok()?;
    let img = image::load_from_memory(&bytes).ok()?.to_rgba8();
    let size = [img.width() as usize, img.height() as usize];
    Some(ColorImage::from_rgba_unmultiplied(size, &img))
}
