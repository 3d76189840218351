use bci_rs::render::{DrawCommand, InputEvent, RenderSurface};
use bci_rs::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Frames between status lines in the log
const STATUS_EVERY: u64 = 60;

/// Surface without a display. Reports `Quit` once the stop flag is raised.
pub struct HeadlessSurface {
    stop: Arc<AtomicBool>,
    frames: u64,
}

impl HeadlessSurface {
    pub fn new(stop: Arc<AtomicBool>) -> Self {
        Self { stop, frames: 0 }
    }

    /// Raise the stop flag on Ctrl-C. Must be called inside a tokio runtime.
    pub fn with_ctrl_c() -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                flag.store(true, Ordering::SeqCst);
            }
        });
        Self::new(stop)
    }
}

impl RenderSurface for HeadlessSurface {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        if self.stop.load(Ordering::SeqCst) {
            vec![InputEvent::Quit]
        } else {
            Vec::new()
        }
    }

    fn present(&mut self, scene: &[DrawCommand]) -> Result<()> {
        self.frames += 1;
        if self.frames % STATUS_EVERY == 0 {
            let text: Vec<&str> = scene
                .iter()
                .filter_map(|cmd| match cmd {
                    DrawCommand::Text { text, .. } => Some(text.as_str()),
                    _ => None,
                })
                .collect();
            log::info!("[frame {}] {}", self.frames, text.join(" | "));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_flag_quits() {
        let stop = Arc::new(AtomicBool::new(false));
        let mut surface = HeadlessSurface::new(stop.clone());
        assert!(surface.poll_events().is_empty());

        surface.present(&[DrawCommand::Clear(bci_rs::render::Rgb(0, 0, 0))]).unwrap();
        assert_eq!(surface.frames, 1);

        stop.store(true, Ordering::SeqCst);
        assert_eq!(surface.poll_events(), vec![InputEvent::Quit]);
    }
}
