use minifb::{Key, Window, WindowOptions};

use crate::foundation::core::Resolution;
use crate::foundation::error::{CheckergenError, CheckergenResult};
use crate::render::surface::FrameRGB;
use crate::session::display::Presenter;

/// Native window presenter. Escape or closing the window stops playback.
pub struct WindowPresenter {
    window: Window,
    width: usize,
    height: usize,
    buffer: Vec<u32>,
}

impl WindowPresenter {
    /// Open a window of `res` pixels; `fullscreen` drops decorations and keeps it on top.
    pub fn open(title: &str, res: Resolution, fullscreen: bool) -> CheckergenResult<Self> {
        let width = res.width as usize;
        let height = res.height as usize;
        let window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                borderless: fullscreen,
                topmost: fullscreen,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| CheckergenError::Other(anyhow::anyhow!("open window: {e}")))?;
        Ok(Self {
            window,
            width,
            height,
            buffer: Vec::with_capacity(width * height),
        })
    }
}

impl Presenter for WindowPresenter {
    fn present(&mut self, frame: &FrameRGB) -> CheckergenResult<()> {
        self.buffer = frame.to_xrgb();
        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)
            .map_err(|e| CheckergenError::Other(anyhow::anyhow!("present frame: {e}")))
    }

    fn close_requested(&self) -> bool {
        !self.window.is_open() || self.window.is_key_down(Key::Escape)
    }
}
