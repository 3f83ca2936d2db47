//! The native window, its wgpu surface and the event pump.

use std::cell::RefCell;
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent as WinitWindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::context::Context;
use crate::error::Result;
use crate::event::{Action, Key, Modifiers, MouseButton, WindowEvent};

// winit allows a single EventLoop per program. It lives in thread-local
// storage so the canvas can pump it without owning it; EventLoop is not
// Send/Sync, which rules out a static Mutex.
thread_local! {
    static EVENT_LOOP: RefCell<Option<EventLoop<()>>> = const { RefCell::new(None) };
    static PENDING_EVENTS: RefCell<Vec<(WindowId, PendingEvent)>> =
        const { RefCell::new(Vec::new()) };
}

/// Raw event data captured by the pump, applied to canvas state afterwards.
#[derive(Clone, Copy)]
enum PendingEvent {
    Close,
    Resize { width: u32, height: u32 },
    CursorPos(f64, f64),
    MouseButton(MouseButton, Action),
    Scroll(f64, f64),
    Key(Key, Action),
    Modifiers(ModifiersState),
}

/// Canvas configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CanvasSetup {
    /// The window title.
    pub title: String,
    /// Initial window width, in logical pixels.
    pub width: u32,
    /// Initial window height, in logical pixels.
    pub height: u32,
    /// Whether presentation waits for vertical sync.
    pub vsync: bool,
}

impl Default for CanvasSetup {
    fn default() -> Self {
        Self {
            title: "tre3d".to_string(),
            width: 800,
            height: 600,
            vsync: true,
        }
    }
}

/// A native window with a wgpu surface, an input state table and an event
/// queue.
///
/// The canvas is a scoped resource: dropping it releases the window, the
/// surface and any frame still pending presentation. The typical frame loop
/// is `render`, [`poll_events`](Self::poll_events),
/// [`swap_buffers`](Self::swap_buffers), until
/// [`should_close`](Self::should_close) turns true.
pub struct Canvas {
    window: Arc<Window>,
    window_id: WindowId,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    pending_frame: Option<wgpu::SurfaceTexture>,
    events: Vec<WindowEvent>,
    cursor_pos: Option<(f64, f64)>,
    key_states: [Action; Key::COUNT],
    button_states: [Action; MouseButton::COUNT],
    modifiers: Modifiers,
    should_close: bool,
}

impl Canvas {
    /// Opens a window with the given title and default settings.
    pub fn open(title: &str) -> Result<Canvas> {
        Canvas::open_with_setup(CanvasSetup {
            title: title.to_string(),
            ..Default::default()
        })
    }

    /// Opens a window and initializes the wgpu context.
    ///
    /// The first canvas creates the shared [`Context`]; later canvases (after
    /// the first was dropped) reuse it.
    pub fn open_with_setup(setup: CanvasSetup) -> Result<Canvas> {
        let window_attrs = WindowAttributes::default()
            .with_title(&setup.title)
            .with_inner_size(LogicalSize::new(setup.width as f64, setup.height as f64));

        let window = EVENT_LOOP.with(|cell| -> Result<Window> {
            let mut event_loop = cell.borrow_mut();
            if event_loop.is_none() {
                *event_loop = Some(EventLoop::new()?);
            }
            #[allow(deprecated)]
            let window = event_loop
                .as_ref()
                .expect("event loop just created")
                .create_window(window_attrs)?;
            Ok(window)
        })?;
        let window = Arc::new(window);

        let surface = if Context::is_initialized() {
            let ctxt = Context::get();
            ctxt.instance.create_surface(window.clone())?
        } else {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });

            let surface = instance.create_surface(window.clone())?;

            let adapter = pollster::block_on(instance.request_adapter(
                &wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::default(),
                    compatible_surface: Some(&surface),
                    force_fallback_adapter: false,
                },
            ))?;

            let info = adapter.get_info();
            log::info!("using adapter `{}` ({:?})", info.name, info.backend);

            let (device, queue) = pollster::block_on(adapter.request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("tre3d device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                    trace: wgpu::Trace::Off,
                    experimental_features: wgpu::ExperimentalFeatures::default(),
                },
            ))?;

            // Prefer a non-sRGB surface format so colors come out the same
            // on every platform.
            let caps = surface.get_capabilities(&adapter);
            let surface_format = caps
                .formats
                .iter()
                .find(|f| !f.is_srgb())
                .copied()
                .unwrap_or(caps.formats[0]);

            Context::init(instance, adapter, device, queue, surface_format);
            surface
        };

        let ctxt = Context::get();
        let caps = surface.get_capabilities(&ctxt.adapter);

        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        let present_mode = if setup.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: ctxt.surface_format,
            width,
            height,
            present_mode,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&ctxt.device, &surface_config);

        let depth_view = Canvas::create_depth_texture(&ctxt, width, height);

        let window_id = window.id();
        Ok(Canvas {
            window,
            window_id,
            surface,
            surface_config,
            depth_view,
            pending_frame: None,
            events: Vec::new(),
            cursor_pos: None,
            key_states: [Action::Release; Key::COUNT],
            button_states: [Action::Release; MouseButton::COUNT],
            modifiers: Modifiers::empty(),
            should_close: false,
        })
    }

    // The view keeps the texture alive; nothing else needs the handle.
    fn create_depth_texture(ctxt: &Context, width: u32, height: u32) -> wgpu::TextureView {
        let texture = ctxt.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tre3d_depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Context::depth_format(),
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Polls all window events that occurred since the last call.
    ///
    /// Updates the key/button/cursor state tables, follows window resizes
    /// (reconfiguring the surface and depth texture) and buffers the frame's
    /// events for [`events`](Self::events). A close request or the Escape key
    /// flips [`should_close`](Self::should_close).
    pub fn poll_events(&mut self) {
        use winit::platform::pump_events::EventLoopExtPumpEvents;

        self.events.clear();

        struct EventCollector;

        impl ApplicationHandler for EventCollector {
            fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

            fn window_event(
                &mut self,
                _event_loop: &ActiveEventLoop,
                window_id: WindowId,
                event: WinitWindowEvent,
            ) {
                if let Some(pending) = translate_event(event) {
                    PENDING_EVENTS.with(|store| store.borrow_mut().push((window_id, pending)));
                }
            }
        }

        EVENT_LOOP.with(|cell| {
            if let Some(event_loop) = cell.borrow_mut().as_mut() {
                let mut collector = EventCollector;
                let _ = event_loop
                    .pump_app_events(Some(std::time::Duration::ZERO), &mut collector);
            }
        });

        // Events of other (dead) windows are discarded along the way.
        let pending: Vec<PendingEvent> = PENDING_EVENTS.with(|store| {
            store
                .borrow_mut()
                .drain(..)
                .filter(|(id, _)| *id == self.window_id)
                .map(|(_, event)| event)
                .collect()
        });

        for event in pending {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: PendingEvent) {
        let mods = self.modifiers;
        match event {
            PendingEvent::Close => {
                self.should_close = true;
                self.events.push(WindowEvent::Close);
            }
            PendingEvent::Resize { width, height } => {
                self.surface_config.width = width;
                self.surface_config.height = height;
                self.reconfigure();
                self.events.push(WindowEvent::FramebufferSize(width, height));
            }
            PendingEvent::CursorPos(x, y) => {
                self.cursor_pos = Some((x, y));
                self.events.push(WindowEvent::CursorPos(x, y, mods));
            }
            PendingEvent::MouseButton(button, action) => {
                self.button_states[button as usize] = action;
                self.events.push(WindowEvent::MouseButton(button, action, mods));
            }
            PendingEvent::Scroll(dx, dy) => {
                self.events.push(WindowEvent::Scroll(dx, dy, mods));
            }
            PendingEvent::Key(key, action) => {
                self.key_states[key as usize] = action;
                if key == Key::Escape && action == Action::Release {
                    self.should_close = true;
                }
                self.events.push(WindowEvent::Key(key, action, mods));
            }
            PendingEvent::Modifiers(state) => {
                self.modifiers = translate_modifiers(state);
            }
        }
    }

    /// The events gathered by the last [`poll_events`](Self::poll_events).
    pub fn events(&self) -> &[WindowEvent] {
        &self.events
    }

    /// Presents the last rendered frame, if any.
    pub fn swap_buffers(&mut self) {
        if let Some(frame) = self.pending_frame.take() {
            frame.present();
        }
    }

    /// Acquires the next surface frame and keeps it pending for
    /// [`swap_buffers`](Self::swap_buffers). Returns its color view.
    pub(crate) fn begin_frame(
        &mut self,
    ) -> std::result::Result<wgpu::TextureView, wgpu::SurfaceError> {
        // A frame rendered but never presented is dropped here.
        self.pending_frame = None;
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.pending_frame = Some(frame);
        Ok(view)
    }

    /// Reapplies the surface configuration and rebuilds the depth texture.
    pub(crate) fn reconfigure(&mut self) {
        let ctxt = Context::get();
        self.surface_config.width = self.surface_config.width.max(1);
        self.surface_config.height = self.surface_config.height.max(1);
        self.surface.configure(&ctxt.device, &self.surface_config);

        self.depth_view = Canvas::create_depth_texture(
            &ctxt,
            self.surface_config.width,
            self.surface_config.height,
        );
    }

    /// The depth attachment matching the current surface size.
    pub(crate) fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    /// Whether the window was asked to close.
    pub fn should_close(&self) -> bool {
        self.should_close
    }

    /// Requests the frame loop to stop.
    pub fn close(&mut self) {
        self.should_close = true;
    }

    /// The surface size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    /// The surface width in pixels.
    pub fn width(&self) -> u32 {
        self.surface_config.width
    }

    /// The surface height in pixels.
    pub fn height(&self) -> u32 {
        self.surface_config.height
    }

    /// The window scale factor.
    pub fn scale_factor(&self) -> f64 {
        self.window.scale_factor()
    }

    /// Sets the window title.
    pub fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    /// The state of a keyboard key.
    pub fn get_key(&self, key: Key) -> Action {
        self.key_states[key as usize]
    }

    /// The state of a mouse button.
    pub fn get_mouse_button(&self, button: MouseButton) -> Action {
        self.button_states[button as usize]
    }

    /// The last known cursor position, if the cursor entered the window.
    pub fn cursor_pos(&self) -> Option<(f64, f64)> {
        self.cursor_pos
    }
}

fn translate_event(event: WinitWindowEvent) -> Option<PendingEvent> {
    match event {
        WinitWindowEvent::CloseRequested => Some(PendingEvent::Close),
        WinitWindowEvent::Resized(size) => {
            if size.width > 0 && size.height > 0 {
                Some(PendingEvent::Resize {
                    width: size.width,
                    height: size.height,
                })
            } else {
                None
            }
        }
        WinitWindowEvent::CursorMoved { position, .. } => {
            Some(PendingEvent::CursorPos(position.x, position.y))
        }
        WinitWindowEvent::MouseInput { state, button, .. } => {
            translate_mouse_button(button).map(|b| {
                PendingEvent::MouseButton(b, translate_action(state))
            })
        }
        WinitWindowEvent::MouseWheel { delta, .. } => {
            let (dx, dy) = match delta {
                MouseScrollDelta::LineDelta(dx, dy) => (dx as f64 * 10.0, dy as f64 * 10.0),
                MouseScrollDelta::PixelDelta(delta) => (delta.x, delta.y),
            };
            Some(PendingEvent::Scroll(dx, dy))
        }
        WinitWindowEvent::KeyboardInput { event, .. } => Some(PendingEvent::Key(
            translate_key(event.physical_key),
            translate_action(event.state),
        )),
        WinitWindowEvent::ModifiersChanged(modifiers) => {
            Some(PendingEvent::Modifiers(modifiers.state()))
        }
        _ => None,
    }
}

fn translate_action(state: ElementState) -> Action {
    match state {
        ElementState::Pressed => Action::Press,
        ElementState::Released => Action::Release,
    }
}

fn translate_mouse_button(button: winit::event::MouseButton) -> Option<MouseButton> {
    match button {
        winit::event::MouseButton::Left => Some(MouseButton::Left),
        winit::event::MouseButton::Right => Some(MouseButton::Right),
        winit::event::MouseButton::Middle => Some(MouseButton::Middle),
        _ => None,
    }
}

fn translate_modifiers(state: ModifiersState) -> Modifiers {
    let mut modifiers = Modifiers::empty();
    if state.shift_key() {
        modifiers.insert(Modifiers::SHIFT);
    }
    if state.control_key() {
        modifiers.insert(Modifiers::CONTROL);
    }
    if state.alt_key() {
        modifiers.insert(Modifiers::ALT);
    }
    if state.super_key() {
        modifiers.insert(Modifiers::SUPER);
    }
    modifiers
}

fn translate_key(physical_key: PhysicalKey) -> Key {
    let PhysicalKey::Code(code) = physical_key else {
        return Key::Unknown;
    };
    match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::Enter => Key::Return,
        KeyCode::Space => Key::Space,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Back,
        KeyCode::ArrowLeft => Key::Left,
        KeyCode::ArrowRight => Key::Right,
        KeyCode::ArrowUp => Key::Up,
        KeyCode::ArrowDown => Key::Down,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::ShiftLeft => Key::LShift,
        KeyCode::ShiftRight => Key::RShift,
        KeyCode::ControlLeft => Key::LControl,
        KeyCode::ControlRight => Key::RControl,
        KeyCode::AltLeft => Key::LAlt,
        KeyCode::AltRight => Key::RAlt,
        _ => Key::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_tracked_mouse_buttons_translate() {
        assert_eq!(
            translate_mouse_button(winit::event::MouseButton::Left),
            Some(MouseButton::Left)
        );
        assert_eq!(
            translate_mouse_button(winit::event::MouseButton::Back),
            None
        );
    }

    #[test]
    fn modifiers_translate_individually() {
        let state = ModifiersState::SHIFT | ModifiersState::ALT;
        let modifiers = translate_modifiers(state);
        assert!(modifiers.contains(Modifiers::SHIFT));
        assert!(modifiers.contains(Modifiers::ALT));
        assert!(!modifiers.contains(Modifiers::CONTROL));
    }

    #[test]
    fn unknown_keys_collapse_to_the_unknown_slot() {
        assert_eq!(translate_key(PhysicalKey::Code(KeyCode::KeyQ)), Key::Unknown);
        assert_eq!(translate_key(PhysicalKey::Code(KeyCode::Escape)), Key::Escape);
    }
}
