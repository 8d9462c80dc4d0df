use cgmath::vec2;
use eframe::egui;
use flow_field_particles::{
    AppError, Bounds, Canvas, ColorMode, ControlChange, InputQueue, Params, PerlinField,
    PointerState, Simulation,
};
use log::info;

const WINDOW_TITLE: &str = "Flow Field Particles";
const INITIAL_WIDTH: f32 = 1280.0;
const INITIAL_HEIGHT: f32 = 800.0;

/// Slider state mirrored from the simulation parameters.
struct ControlPanel {
    particle_count: usize,
    particle_size: i32,
    noise_scale: f64,
    noise_speed: f64,
    color_mode: ColorMode,
}

impl ControlPanel {
    fn new(params: &Params) -> Self {
        Self {
            particle_count: params.particle_count,
            particle_size: params.particle_size.round() as i32,
            noise_scale: params.noise_scale,
            noise_speed: params.noise_speed,
            color_mode: params.color_mode,
        }
    }

    /// Draws the controls and queues a change for every widget that moved.
    fn show(&mut self, ui: &mut egui::Ui, input: &mut InputQueue) {
        ui.horizontal(|ui| {
            ui.label("Particles: ");
            if ui
                .add(egui::Slider::new(&mut self.particle_count, 0..=2000))
                .changed()
            {
                input.push_control(ControlChange::ParticleCount(self.particle_count));
            }
        });

        ui.horizontal(|ui| {
            ui.label("Size: ");
            if ui
                .add(egui::Slider::new(&mut self.particle_size, 1..=10))
                .changed()
            {
                input.push_control(ControlChange::ParticleSize(self.particle_size));
            }
        });

        ui.horizontal(|ui| {
            ui.label("Noise Scale: ");
            if ui
                .add(egui::Slider::new(&mut self.noise_scale, 0.001..=0.05).drag_value_speed(0.001))
                .changed()
            {
                input.push_control(ControlChange::NoiseScale(self.noise_scale));
            }
        });

        ui.horizontal(|ui| {
            ui.label("Noise Speed: ");
            if ui
                .add(egui::Slider::new(&mut self.noise_speed, 0.0..=0.01).drag_value_speed(0.0001))
                .changed()
            {
                input.push_control(ControlChange::NoiseSpeed(self.noise_speed));
            }
        });

        let previous_mode = self.color_mode;
        egui::ComboBox::from_label("Color Mode")
            .selected_text(self.color_mode.as_str())
            .show_ui(ui, |ui| {
                for mode in ColorMode::ALL {
                    ui.selectable_value(&mut self.color_mode, mode, mode.as_str());
                }
            });
        if self.color_mode != previous_mode {
            input.push_control(ControlChange::ColorMode(self.color_mode));
        }
    }
}

struct FlowFieldApp {
    simulation: Simulation,
    field: PerlinField,
    input: InputQueue,
    panel: ControlPanel,
    canvas: Canvas,
    texture: Option<egui::TextureHandle>,
    frame_count: u64,
    last_frame_time: std::time::Instant,
    update_time: f64,
}

impl FlowFieldApp {
    fn new(_cc: &eframe::CreationContext) -> Self {
        let params = Params::default();
        let bounds = Bounds::new(INITIAL_WIDTH, INITIAL_HEIGHT);
        let panel = ControlPanel::new(&params);
        info!(
            "starting with {} particles in {} mode",
            params.particle_count, params.color_mode
        );

        Self {
            simulation: Simulation::new(params, bounds),
            field: PerlinField::random(),
            input: InputQueue::new(),
            panel,
            canvas: Canvas::new(bounds.width as usize, bounds.height as usize),
            texture: None,
            frame_count: 0,
            last_frame_time: std::time::Instant::now(),
            update_time: 0.0,
        }
    }

    fn render_ui_panel(&mut self, ui: &mut egui::Ui, frame_time: f32) {
        ui.label(format!("FPS: {:.3}", 1.0 / frame_time));
        ui.label(format!("Frame Time: {:.3}ms", frame_time * 1000.0));
        ui.label(format!("Update Time: {:.3}ms", self.update_time * 1000.0));
        ui.label(format!("Live Particles: {}", self.simulation.len()));
        ui.separator();
        self.panel.show(ui, &mut self.input);
    }

    /// Feeds pointer state for this frame into the input queue. Hover moves
    /// spawn ripples; a press held on the canvas repels particles.
    fn collect_pointer(&mut self, ctx: &egui::Context, response: &egui::Response, rect: egui::Rect) {
        let (hover, delta, down) =
            ctx.input(|i| (i.pointer.hover_pos(), i.pointer.delta(), i.pointer.primary_down()));
        let pressed = down && response.is_pointer_button_down_on();

        let Some(position) = hover else {
            let last = self.input.pointer().position;
            self.input.set_pointer(PointerState::new(last, pressed));
            return;
        };
        let local = position - rect.min;
        let local = vec2(local.x, local.y);
        self.input.set_pointer(PointerState::new(local, pressed));

        if delta != egui::Vec2::ZERO && !down && rect.contains(position) {
            self.input.push_pointer_move(local);
        }
    }

    fn sync_canvas_size(&mut self, rect: egui::Rect) {
        let width = rect.width().round().max(1.0) as usize;
        let height = rect.height().round().max(1.0) as usize;
        if (width, height) != (self.canvas.width(), self.canvas.height()) {
            self.canvas.resize(width, height);
            self.simulation
                .resize_canvas(Bounds::new(width as f32, height as f32));
        }
    }

    fn upload_canvas(&mut self, ctx: &egui::Context) -> egui::TextureId {
        let image = self.canvas.image().clone();
        match &mut self.texture {
            Some(texture) => {
                texture.set(image, egui::TextureOptions::LINEAR);
                texture.id()
            }
            None => {
                let texture = ctx.load_texture("flow-field-canvas", image, egui::TextureOptions::LINEAR);
                let id = texture.id();
                self.texture = Some(texture);
                id
            }
        }
    }
}

impl eframe::App for FlowFieldApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let current_time = std::time::Instant::now();
        let frame_time = current_time.duration_since(self.last_frame_time);
        self.last_frame_time = current_time;
        let ts = frame_time.as_secs_f32().max(f32::EPSILON);

        egui::SidePanel::left("Control Panel").show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.render_ui_panel(ui, ts);
                ui.allocate_space(ui.available_size());
            });
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                let (rect, response) =
                    ui.allocate_exact_size(ui.available_size(), egui::Sense::drag());

                self.sync_canvas_size(rect);
                self.collect_pointer(ctx, &response, rect);

                let start_update = std::time::Instant::now();
                self.simulation.drain_input(&mut self.input);
                self.frame_count += 1;
                self.simulation.frame(
                    &self.field,
                    self.input.pointer(),
                    self.frame_count,
                    &mut self.canvas,
                );
                self.update_time = start_update.elapsed().as_secs_f64();

                let texture_id = self.upload_canvas(ctx);
                ui.painter().image(
                    texture_id,
                    rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
            });

        log::trace!("frame {} simulated in {:.3}ms", self.frame_count, self.update_time * 1000.0);

        ctx.request_repaint();
    }
}

fn main() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    eframe::run_native(
        WINDOW_TITLE,
        eframe::NativeOptions {
            renderer: eframe::Renderer::Wgpu,
            initial_window_size: Some(egui::vec2(INITIAL_WIDTH, INITIAL_HEIGHT)),
            ..Default::default()
        },
        Box::new(|cc| Box::new(FlowFieldApp::new(cc))),
    )?;

    Ok(())
}
