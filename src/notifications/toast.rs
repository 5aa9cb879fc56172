use egui::{Align2, Color32, Context, Id, Order, RichText};

use crate::notifications::center::NotificationCenter;
use crate::notifications::lifecycle::Phase;
use crate::notifications::notification::{GRACE_WINDOW, NotificationId, Severity};

const TOAST_WIDTH: f32 = 280.0;
const SCREEN_MARGIN: f32 = 16.0;

fn accent(severity: Severity) -> Color32 {
    match severity {
        Severity::Success => Color32::from_rgb(100, 220, 140),
        Severity::Error => Color32::from_rgb(240, 100, 100),
        Severity::Warning => Color32::from_rgb(240, 180, 80),
        Severity::Info => Color32::from_rgb(100, 150, 255),
    }
}

/// Drives the center's timers and paints the active notifications into the
/// host area, top-right, oldest first.
pub fn show_toasts(ctx: &Context, center: &mut NotificationCenter) {
    center.poll();
    if center.is_empty() {
        return;
    }

    let host = center.init();
    let mut dismissed: Vec<NotificationId> = Vec::new();

    egui::Area::new(Id::new(("notification-host", host.id())))
        .anchor(Align2::RIGHT_TOP, [-SCREEN_MARGIN, SCREEN_MARGIN])
        .order(Order::Foreground)
        .show(ctx, |ui| {
            ui.set_width(TOAST_WIDTH);
            for notification in center.active() {
                // Fades in once visible and out while dismissing.
                let alpha = ctx.animate_bool_with_time(
                    Id::new(("notification", notification.id())),
                    notification.phase() == Phase::Visible,
                    GRACE_WINDOW.as_secs_f32(),
                );
                let accent = accent(notification.severity()).gamma_multiply(alpha);
                let fill = Color32::from_rgb(40, 40, 46).gamma_multiply(alpha);
                let text = Color32::WHITE.gamma_multiply(alpha);

                egui::Frame::none()
                    .fill(fill)
                    .rounding(8.0)
                    .stroke(egui::Stroke::new(1.0, accent))
                    .inner_margin(egui::Margin::symmetric(12.0, 8.0))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.label(RichText::new(notification.glyph()).color(accent).size(18.0).strong());
                            ui.add_space(6.0);
                            ui.label(RichText::new(notification.message()).color(text));
                            if notification.is_dismissible()
                                && ui
                                    .small_button("×")
                                    .on_hover_text("Close notification")
                                    .clicked()
                            {
                                dismissed.push(notification.id());
                            }
                        });
                    });
                ui.add_space(6.0);
            }
        });

    for id in dismissed {
        center.dismiss(id);
    }

    if let Some(wait) = center.time_until_next_deadline() {
        ctx.request_repaint_after(wait);
    }
}
