use std::cell::RefCell;
use std::rc::Rc;

use futures::executor::LocalPool;

use crate::diagnostics;
use crate::file_handler::FileHandler;
use crate::ingest::{DecodedImage, FileIngestor, IngestHandle, IngestionRequest};
use crate::notifications::{self, NotificationCenter, NotificationOptions};
use crate::settings::Settings;
use crate::util::task::FrameGate;
use crate::util::time::SystemClock;

/// The application shell. Owns the notification surface, the
/// single-threaded task pool ingestion runs on, and the loaded image.
pub struct PaintApp {
    pool: LocalPool,
    /// Released once per frame so an ingestion spans at least two frames.
    frames: FrameGate,
    notifications: NotificationCenter,
    ingestor: FileIngestor,
    file_handler: FileHandler,
    /// Filled by ingestion tasks, drained once per frame.
    delivered: Rc<RefCell<Option<DecodedImage>>>,
    image: Option<DecodedImage>,
    texture: Option<egui::TextureHandle>,
    in_flight: Vec<IngestHandle>,
}

impl PaintApp {
    /// Called once before the first frame.
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: Settings) -> Self {
        Self::with_settings(settings)
    }

    pub fn with_settings(settings: Settings) -> Self {
        let pool = LocalPool::new();
        let frames = FrameGate::new();
        let mut notifications = NotificationCenter::new(SystemClock::new());
        notifications.init();
        let ingestor = FileIngestor::new(settings.ingest, notifications.notifier(), pool.spawner())
            .with_frame_gate(frames.clone());

        Self {
            pool,
            frames,
            notifications,
            ingestor,
            file_handler: FileHandler::new(),
            delivered: Rc::new(RefCell::new(None)),
            image: None,
            texture: None,
            in_flight: Vec::new(),
        }
    }

    pub fn image(&self) -> Option<&DecodedImage> {
        self.image.as_ref()
    }

    fn ingest_all(&mut self, requests: Vec<IngestionRequest>) {
        let delivered = self.delivered.clone();
        let handle = self.ingestor.ingest_first(requests, move |image| {
            *delivered.borrow_mut() = Some(image);
        });
        self.in_flight.extend(handle);
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn open_file_picker(&mut self) {
        if let Some(request) = crate::file_handler::pick_file(&self.ingestor.settings().allowed_types) {
            self.ingest_all(vec![request]);
        }
    }

    fn cancel_in_flight(&mut self) {
        for handle in self.in_flight.drain(..) {
            handle.cancel();
        }
    }

    /// Uploads a freshly delivered image at its natural size. An image the
    /// GPU cannot hold in one texture is kept but not uploaded.
    fn take_delivered(&mut self, ctx: &egui::Context) {
        let Some(image) = self.delivered.borrow_mut().take() else {
            return;
        };
        let max_side = ctx.input(|i| i.max_texture_side);
        if !image.fits_texture(max_side) {
            diagnostics::get().warn(format_args!(
                "Image {}x{} exceeds the {max_side}px texture limit",
                image.width(),
                image.height()
            ));
            self.notifications.error(
                format!("Image too large to display. Maximum side: {max_side}px"),
                NotificationOptions::default(),
            );
            self.texture = None;
            self.image = Some(image);
            return;
        }
        self.texture = Some(ctx.load_texture(
            format!("source-image-{}", image.id()),
            image.to_color_image(),
            egui::TextureOptions::LINEAR,
        ));
        self.image = Some(image);
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            #[cfg(not(target_arch = "wasm32"))]
            if ui.button("Open image…").clicked() {
                self.open_file_picker();
            }
            if !self.in_flight.is_empty() && ui.button("Cancel").clicked() {
                self.cancel_in_flight();
            }
            if let Some(image) = &self.image {
                ui.label(format!("{} × {}", image.width(), image.height()));
            }
        });
    }

    fn canvas(&self, ui: &mut egui::Ui) {
        match (&self.texture, &self.image) {
            (Some(texture), _) => {
                egui::ScrollArea::both().show(ui, |ui| {
                    ui.add(egui::Image::new((texture.id(), texture.size_vec2())).fit_to_original_size(1.0));
                });
            }
            (None, Some(image)) => {
                ui.centered_and_justified(|ui| {
                    ui.label(format!("{} × {} image loaded, too large to display", image.width(), image.height()));
                });
            }
            (None, None) => {
                ui.centered_and_justified(|ui| {
                    ui.label("Drop an image here, or open one to get started");
                });
            }
        }
    }
}

impl eframe::App for PaintApp {
    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.frames.advance();

        let dropped = self.file_handler.update(ctx);
        if !dropped.is_empty() {
            self.ingest_all(dropped);
        }

        #[cfg(not(target_arch = "wasm32"))]
        if ctx.input_mut(|i| i.consume_key(egui::Modifiers::COMMAND, egui::Key::O)) {
            self.open_file_picker();
        }

        self.pool.run_until_stalled();
        self.take_delivered(ctx);
        self.in_flight.retain(|handle| !handle.is_finished());

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ui));
        egui::CentralPanel::default().show(ctx, |ui| self.canvas(ui));

        self.file_handler.preview_files_being_dropped(ctx);
        notifications::show_toasts(ctx, &mut self.notifications);

        // Parked tasks only resume when a frame runs.
        if !self.in_flight.is_empty() {
            ctx.request_repaint();
        }
    }
}
