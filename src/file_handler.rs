use eframe::egui;
use futures::FutureExt;
use futures::future::LocalBoxFuture;

use crate::diagnostics;
use crate::ingest::{
    ByteSource, DragEvent, DropZone, EventDisposition, EventLevel, IngestionRequest, media_type_from_name,
};

/// Stands in for a dropped file whose contents the platform did not expose.
struct UnavailableSource;

impl ByteSource for UnavailableSource {
    fn read_bytes(self: Box<Self>) -> LocalBoxFuture<'static, std::io::Result<Vec<u8>>> {
        async {
            Err::<Vec<u8>, _>(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "dropped file has no accessible data",
            ))
        }
        .boxed_local()
    }
}

/// Translates egui's per-frame hover/drop input into drag events and
/// ingestion requests.
#[derive(Debug, Default)]
pub struct FileHandler {
    drop_zone: DropZone,
    hovered: Vec<String>,
    last_disposition: Option<EventDisposition>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drop_zone(&self) -> &DropZone {
        &self.drop_zone
    }

    /// What the most recent drag event asked of the host.
    pub fn last_disposition(&self) -> Option<EventDisposition> {
        self.last_disposition
    }

    /// Advances the drag state from this frame's input. Returns a request
    /// per dropped file, in drop order. Suppressed drops are taken out of the
    /// frame's input so nothing else in the UI acts on them.
    pub fn update(&mut self, ctx: &egui::Context) -> Vec<IngestionRequest> {
        let hovered = ctx.input(|i| i.raw.hovered_files.clone());
        self.hovered = hovered.iter().map(hovered_name).collect();

        if ctx.input(|i| !i.raw.dropped_files.is_empty()) {
            let disposition = self.dispatch(DragEvent::Drop);
            let dropped = if disposition.prevent_default {
                ctx.input_mut(|i| std::mem::take(&mut i.raw.dropped_files))
            } else {
                ctx.input(|i| i.raw.dropped_files.clone())
            };
            let requests = dropped.iter().map(request_from_dropped).collect();
            self.drop_zone.finish_drop();
            return requests;
        }

        if !hovered.is_empty() {
            let event = if self.drop_zone.is_highlighted() {
                DragEvent::Over
            } else {
                DragEvent::Enter
            };
            self.dispatch(event);
        } else if self.drop_zone.is_highlighted() {
            self.dispatch(DragEvent::Leave);
        }

        Vec::new()
    }

    /// Delivers `event` at the surface and then the target level. The host
    /// suppresses it if either level asks to.
    fn dispatch(&mut self, event: DragEvent) -> EventDisposition {
        let [surface, target] =
            [EventLevel::Surface, EventLevel::Target].map(|level| self.drop_zone.handle(level, event));
        let disposition = EventDisposition {
            prevent_default: surface.prevent_default || target.prevent_default,
            stop_propagation: surface.stop_propagation || target.stop_propagation,
        };
        self.last_disposition = Some(disposition);
        disposition
    }

    /// Darkens the window and lists the hovered files while a drag is over it.
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, Id, LayerId, Order};

        if !self.drop_zone.is_highlighted() {
            return;
        }

        let mut text = "Drop image to load:\n".to_owned();
        for name in &self.hovered {
            text += &format!("\n{name}");
        }

        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            text,
            egui::TextStyle::Heading.resolve(&ctx.style()),
            Color32::WHITE,
        );
    }
}

fn hovered_name(file: &egui::HoveredFile) -> String {
    match &file.path {
        Some(path) => path.display().to_string(),
        None if !file.mime.is_empty() => file.mime.clone(),
        None => "(Path not available)".to_owned(),
    }
}

fn dropped_name(file: &egui::DroppedFile) -> String {
    if let Some(path) = &file.path {
        path.display().to_string()
    } else if !file.name.is_empty() {
        file.name.clone()
    } else {
        "unknown".to_owned()
    }
}

/// Builds a request from a dropped file, preferring the platform's MIME
/// type and falling back to the extension.
pub fn request_from_dropped(file: &egui::DroppedFile) -> IngestionRequest {
    let name = dropped_name(file);
    let media_type = if file.mime.is_empty() {
        media_type_from_name(&name)
    } else {
        file.mime.clone()
    };

    if let Some(bytes) = &file.bytes {
        return IngestionRequest::from_bytes(name, media_type, bytes.clone());
    }

    #[cfg(not(target_arch = "wasm32"))]
    if let Some(path) = &file.path {
        let size = std::fs::metadata(path).map(|meta| meta.len()).unwrap_or(0);
        return IngestionRequest::new(name, media_type, size, crate::ingest::PathSource(path.clone()));
    }

    diagnostics::get().warn(format_args!("Dropped file has no accessible data: {name}"));
    IngestionRequest::new(name, media_type, 0, UnavailableSource)
}

/// Opens the native file picker filtered to the allowed image types.
#[cfg(not(target_arch = "wasm32"))]
pub fn pick_file(allowed_types: &[String]) -> Option<IngestionRequest> {
    let extensions: Vec<&str> = allowed_types
        .iter()
        .filter_map(|t| t.strip_prefix("image/"))
        .collect();
    rfd::FileDialog::new()
        .add_filter("Images", &extensions)
        .pick_file()
        .map(|path| IngestionRequest::from_path(path))
}
