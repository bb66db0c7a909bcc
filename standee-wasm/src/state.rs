use standee_core::LayoutConfig;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, Window};

/// UI state shared by the WASM callbacks behind an `Rc<RefCell<_>>`.
///
/// Only selections live here; every generation builds its own
/// `GenerationRequest` from the current inputs.
pub struct State {
    pub window: Window,
    pub document: Document,
    pub canvas: HtmlCanvasElement,
    pub ctx: CanvasRenderingContext2d,
    pub config: LayoutConfig,
    /// Background picked with the color buttons; `None` uses the config default.
    pub background: Option<String>,
    pub gate: GenerationGate,
}

/// Serializes generations. A trigger that arrives while one runs is folded
/// into a single extra pass over the latest inputs.
#[derive(Debug, Default)]
pub struct GenerationGate {
    busy: bool,
    pending: bool,
}

impl GenerationGate {
    /// `false` if a generation is already running; it will run once more.
    pub fn try_begin(&mut self) -> bool {
        if self.busy {
            self.pending = true;
            return false;
        }
        self.busy = true;
        true
    }

    /// Close one pass. `true` means a trigger came in meanwhile and the
    /// caller must generate again before the gate opens.
    pub fn finish_pass(&mut self) -> bool {
        if self.pending {
            self.pending = false;
            return true;
        }
        self.busy = false;
        false
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }
}
