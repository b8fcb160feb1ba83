//! Main GUI application loop.

use crate::config::RenderConfig;
use crate::controllers::session::RenderSession;
use crate::controllers::worker_pool::errors::WorkerPoolError;
use crate::core::actions::render_tile::MandelbrotTileRenderer;
use crate::core::data::complex::Complex;
use crate::core::data::point::Point;
use crate::core::fractals::mandelbrot::params::FractalParams;
use crate::core::util::pixel_to_complex_coords::pixel_to_complex_coords;
use crate::presenters::rgba_surface::RgbaSurface;
use log::{error, info, warn};
use pixels::{Pixels, SurfaceTexture};
use std::error::Error;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::{
    dpi::{LogicalSize, PhysicalPosition},
    event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::{Window, WindowBuilder},
};

/// How often the loop wakes to collect tiles while a frame is rendering.
const PUMP_INTERVAL: Duration = Duration::from_millis(16);

/// Zoom per wheel notch.
const ZOOM_STEP: f64 = 1.25;

struct App {
    pixels: Pixels<'static>,
    session: RenderSession<RgbaSurface>,
    cursor: Option<PhysicalPosition<f64>>,
    redraw_pending: bool,
}

impl App {
    fn new(window: &'static Window, config: &RenderConfig) -> Result<Self, Box<dyn Error>> {
        let size = window.inner_size();
        let surface_texture = SurfaceTexture::new(size.width, size.height, window);
        let pixels = Pixels::new(size.width, size.height, surface_texture)?;

        let mut session = RenderSession::new(
            config.session_config()?,
            RgbaSurface::default(),
            Arc::new(MandelbrotTileRenderer),
        )?;
        session.resize(size.width, size.height)?;

        Ok(Self {
            pixels,
            session,
            cursor: None,
            redraw_pending: true,
        })
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), Box<dyn Error>> {
        // Minimised windows report 0x0; keep the last frame.
        if width == 0 || height == 0 {
            return Ok(());
        }

        self.pixels.resize_surface(width, height)?;
        self.pixels.resize_buffer(width, height)?;
        self.session.resize(width, height)?;
        self.redraw_pending = true;

        Ok(())
    }

    fn pump(&mut self) -> Result<(), WorkerPoolError> {
        if self.session.pump()? > 0 {
            self.redraw_pending = true;
        }

        Ok(())
    }

    fn render(&mut self) -> Result<(), pixels::Error> {
        let surface = self.session.compositor().surface().pixels();
        let frame = self.pixels.frame_mut();

        // Sizes differ for a moment between a resize and the next frame.
        if frame.len() == surface.len() {
            frame.copy_from_slice(surface);
        }

        self.pixels.render()
    }

    fn cursor_coords(&self) -> Option<Complex> {
        let position = self.cursor?;
        // Float to int casts saturate, so a cursor left of or above the window clamps to 0.
        let point = Point {
            x: position.x as u32,
            y: position.y as u32,
        };
        let params = self.session.params();

        Some(pixel_to_complex_coords(point, self.session.viewport(), &params))
    }

    /// Zooms by `factor`, keeping the point under the cursor fixed.
    fn zoom(&mut self, factor: f64) -> Result<(), Box<dyn Error>> {
        let params = self.session.params();
        let center = params.center();
        let anchor = self.cursor_coords().unwrap_or(center);

        let new_center = Complex::new(
            anchor.real + (center.real - anchor.real) / factor,
            anchor.imag + (center.imag - anchor.imag) / factor,
        );

        self.apply_params(params.zoomed(factor)?.panned_to(new_center)?)
    }

    fn recentre(&mut self) -> Result<(), Box<dyn Error>> {
        let Some(center) = self.cursor_coords() else {
            return Ok(());
        };

        self.apply_params(self.session.params().panned_to(center)?)
    }

    fn apply_params(&mut self, params: FractalParams) -> Result<(), Box<dyn Error>> {
        let generation = self.session.set_params(params)?;
        info!(
            "view centre {} {:+}i, scale {:e}, {generation}",
            params.center().real,
            params.center().imag,
            params.scale()
        );

        Ok(())
    }

    fn handle_window_event(&mut self, event: &WindowEvent) -> Result<(), Box<dyn Error>> {
        match event {
            WindowEvent::Resized(size) => self.resize(size.width, size.height)?,
            WindowEvent::CursorMoved { position, .. } => self.cursor = Some(*position),
            WindowEvent::CursorLeft { .. } => self.cursor = None,
            WindowEvent::MouseWheel { delta, .. } => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, y) => f64::from(*y),
                    MouseScrollDelta::PixelDelta(position) => position.y / 50.0,
                };

                if notches != 0.0 {
                    self.zoom(ZOOM_STEP.powf(notches))?;
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => self.recentre()?,
            _ => {}
        }

        Ok(())
    }
}

/// Opens a window and keeps it filled with the fractal until it is closed.
///
/// Resizing re-renders at the new size, the mouse wheel zooms around the
/// cursor and a left click recentres on the clicked point.
pub fn run_gui(config: &RenderConfig) -> Result<(), Box<dyn Error>> {
    let event_loop = EventLoop::new()?;

    // Leak the window to get a 'static reference for pixels
    let window: &'static Window = Box::leak(Box::new(
        WindowBuilder::new()
            .with_title("Tile Fractal")
            .with_inner_size(LogicalSize::new(config.width as f64, config.height as f64))
            .with_min_inner_size(LogicalSize::new(200.0, 200.0))
            .build(&event_loop)?,
    ));

    let mut app = App::new(window, config)?;

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { ref event, window_id } if window_id == window.id() => match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::RedrawRequested => {
                app.redraw_pending = false;

                if let Err(err) = app.render() {
                    error!("render error: {err}");
                    elwt.exit();
                }
            }
            _ => {
                if let Err(err) = app.handle_window_event(event) {
                    warn!("{err}");
                }
            }
        },
        Event::AboutToWait => {
            if let Err(err) = app.pump() {
                error!("worker pool failed: {err}");
                elwt.exit();
                return;
            }

            if app.redraw_pending {
                window.request_redraw();
            }

            if app.session.is_busy() {
                elwt.set_control_flow(ControlFlow::WaitUntil(Instant::now() + PUMP_INTERVAL));
            } else {
                elwt.set_control_flow(ControlFlow::Wait);
            }
        }
        _ => {}
    })?;

    Ok(())
}
