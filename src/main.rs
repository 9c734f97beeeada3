#[cfg(feature = "gui")]
use clap::Parser;
#[cfg(feature = "gui")]
use eframe::egui;

#[cfg(feature = "gui")]
use tonepad::{
    AudioOutput, Config, FileStorage, Note, Pad, SampleStore, SilentOutput, ToneEngine,
    STORAGE_KEY,
};

#[cfg(feature = "gui")]
fn main() -> Result<(), eframe::Error> {
    env_logger::init();
    let config = Config::parse();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([520.0, 620.0])
            .with_title("TONEPAD - Music Pad with Samples"),
        ..Default::default()
    };

    eframe::run_native(
        "TONEPAD",
        options,
        Box::new(move |_cc| Ok(Box::new(PadApp::new(&config)))),
    )
}

#[cfg(not(feature = "gui"))]
fn main() {
    eprintln!("This binary requires the 'gui' feature to be enabled");
    std::process::exit(1);
}

#[cfg(feature = "gui")]
struct PadApp {
    pad: Pad,

    // UI state
    pending_name: Option<String>,
    status: Option<String>,
}

#[cfg(feature = "gui")]
impl PadApp {
    fn new(config: &Config) -> Self {
        let storage = FileStorage::new(config.storage_dir());
        log::info!("samples stored in {}", storage.dir().display());
        let store = SampleStore::load(Box::new(storage), STORAGE_KEY);

        let pad = match AudioOutput::new(config.amplitude()) {
            Ok(output) => Pad::new(Box::new(output), store),
            Err(err) => {
                log::warn!("audio unavailable: {}", err);
                let fallback: Box<dyn ToneEngine> = Box::new(SilentOutput::new());
                Pad::with_audio_error(fallback, store, err)
            }
        };

        Self {
            pad,
            pending_name: None,
            status: None,
        }
    }

    fn confirm_save(&mut self, name: &str) {
        self.status = match self.pad.save_sample(name) {
            Ok(true) => Some(format!("Saved \"{}\"", name)),
            Ok(false) => None,
            Err(err) => Some(format!("Could not save sample: {}", err)),
        };
    }

    fn delete(&mut self, name: &str) {
        self.status = match self.pad.delete_sample(name) {
            Ok(()) => None,
            Err(err) => Some(format!("Could not delete sample: {}", err)),
        };
    }

    fn name_prompt(&mut self, ctx: &egui::Context) {
        let Some(mut name) = self.pending_name.take() else {
            return;
        };

        let mut confirmed = false;
        let mut cancelled = false;
        egui::Window::new("Save Sample")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("Enter a name for this sample:");
                let response = ui.text_edit_singleline(&mut name);
                response.request_focus();
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    confirmed = true;
                }
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        confirmed = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancelled = true;
                    }
                });
            });
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            cancelled = true;
        }

        if confirmed {
            self.confirm_save(&name);
        } else if !cancelled {
            self.pending_name = Some(name);
        }
    }
}

#[cfg(feature = "gui")]
impl eframe::App for PadApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint();

        self.pad.poll();

        let prompt_open = self.pending_name.is_some();
        let mut to_play = None;
        let mut to_delete = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!prompt_open, |ui| {
                ui.heading("Simple Music Game with Samples");
                ui.add_space(10.0);

                if let Some(err) = self.pad.audio_error() {
                    ui.colored_label(
                        egui::Color32::RED,
                        format!("⚠ Audio unavailable - notes are silent ({})", err),
                    );
                    ui.add_space(10.0);
                }

                // Note pads
                ui.horizontal(|ui| {
                    for note in Note::ALL {
                        let button = egui::Button::new(
                            egui::RichText::new(note.label())
                                .size(28.0)
                                .color(egui::Color32::WHITE),
                        )
                        .min_size(egui::vec2(96.0, 96.0))
                        .fill(egui::Color32::from_rgb(59, 130, 246));

                        if ui.add(button).clicked() {
                            self.pad.press(note);
                        }
                    }
                });

                ui.add_space(20.0);

                // Transport controls
                let has_recording = !self.pad.recording().is_empty();
                ui.horizontal(|ui| {
                    let (label, fill) = if self.pad.is_recording() {
                        ("⏹ Stop Recording", egui::Color32::from_rgb(200, 60, 60))
                    } else {
                        ("⏺ Start Recording", egui::Color32::from_rgb(34, 160, 90))
                    };
                    if ui.add(egui::Button::new(label).fill(fill)).clicked() {
                        self.pad.toggle_recording();
                    }

                    if ui
                        .add_enabled(has_recording, egui::Button::new("▶ Play Recording"))
                        .clicked()
                    {
                        self.pad.play_recording();
                    }

                    if ui
                        .add_enabled(has_recording, egui::Button::new("💾 Save Sample"))
                        .clicked()
                    {
                        self.pending_name = Some(String::new());
                    }

                    if self.pad.is_playing() && ui.button("Stop").clicked() {
                        self.pad.stop_playback();
                    }
                });

                if self.pad.is_recording() {
                    ui.label(format!("Recording... {} notes", self.pad.recording().len()));
                } else if has_recording {
                    ui.label(format!(
                        "{} notes, {:.1}s",
                        self.pad.recording().len(),
                        self.pad.recording().duration()
                    ));
                }

                ui.add_space(20.0);
                ui.separator();
                ui.heading("Saved Samples");
                ui.add_space(5.0);

                if self.pad.store().is_empty() {
                    ui.label("No saved samples yet");
                }

                egui::ScrollArea::vertical().show(ui, |ui| {
                    for name in self.pad.store().names() {
                        ui.horizontal(|ui| {
                            ui.label(name);
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                if ui.button("Delete").clicked() {
                                    to_delete = Some(name.to_string());
                                }
                                if ui.button("Play").clicked() {
                                    to_play = Some(name.to_string());
                                }
                            });
                        });
                    }
                });

                if let Some(status) = &self.status {
                    ui.separator();
                    ui.colored_label(egui::Color32::YELLOW, status);
                }
            });
        });

        if let Some(name) = to_play {
            self.pad.play_sample(&name);
        }
        if let Some(name) = to_delete {
            self.delete(&name);
        }

        self.name_prompt(ctx);
    }
}
