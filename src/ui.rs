// src/ui.rs

use crate::frame_timer::FrameTimer;
use crate::lessons::Lesson;

const CAMERA_HELP: &[&str] = &["W/A/S/D: move, mouse: look, wheel: zoom", "Escape: quit"];
const EXIT_HELP: &[&str] = &["Escape: quit"];

/// Key help for the controls the lesson actually responds to.
pub fn controls_help(uses_camera: bool) -> &'static [&'static str] {
    if uses_camera {
        CAMERA_HELP
    } else {
        EXIT_HELP
    }
}

pub fn build_ui(ctx: &egui::Context, frame_timer: &FrameTimer, lesson: &mut dyn Lesson) {
    egui::Window::new(lesson.name())
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(10.0, 10.0))
        .resizable(false)
        .show(ctx, |ui| {
            ui.vertical(|ui| {
                ui.label(format!(
                    "{:.1} ms/frame ({:.0} FPS)",
                    frame_timer.ms_per_frame(),
                    frame_timer.framerate()
                ));
                ui.separator();

                ui.horizontal(|ui| {
                    ui.label("Clear colour");
                    ui.color_edit_button_rgba_unmultiplied(lesson.clear_color_mut());
                });

                lesson.ui(ui);

                ui.separator();
                for line in controls_help(lesson.uses_camera()) {
                    ui.label(*line);
                }
            });
        });
}
