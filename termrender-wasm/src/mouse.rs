//! Mouse-driven text selection.
//!
//! The renderer owns no terminal emulation — selection state arrives as
//! `TerminalUpdate::SelectionSet/Update/Clear` produced by
//! whatever drives the interpreter. `TerminalMouseHandler` only translates
//! browser mouse events into terminal cell coordinates and runs the drag
//! state machine; `DefaultSelectionHandler` turns completed drags into a
//! `termrender_core::Selection` and copies the extracted text to the
//! clipboard, leaving it to the host to feed that selection back through
//! `Renderer::apply_updates`.

use std::{cell::RefCell, rc::Rc};

use compact_str::CompactString;
use termrender_core::{Selection, SelectionKind, SelectionPoint, SelectionStatus, TerminalState};
use wasm_bindgen::{closure::Closure, JsCast};
use wasm_bindgen_futures::spawn_local;
use web_sys::console;

use crate::{error::Error, selection::selection_text};

/// Cell geometry needed to convert pixel offsets into grid coordinates;
/// refreshed by the host whenever the terminal resizes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MouseDimensions {
    pub columns: u16,
    pub rows: u16,
    pub cell_width: f32,
    pub cell_height: f32,
}

pub type MouseEventCallback = Box<dyn FnMut(TerminalMouseEvent) + 'static>;
type EventHandler = Rc<RefCell<dyn FnMut(TerminalMouseEvent) + 'static>>;

/// Attaches mousedown/mouseup/mousemove listeners to a canvas and converts
/// pixel coordinates into 0-based terminal cell coordinates before invoking
/// the supplied handler.
pub struct TerminalMouseHandler {
    canvas: web_sys::HtmlCanvasElement,
    on_mouse_down: Closure<dyn FnMut(web_sys::MouseEvent)>,
    on_mouse_up: Closure<dyn FnMut(web_sys::MouseEvent)>,
    on_mouse_move: Closure<dyn FnMut(web_sys::MouseEvent)>,
    dimensions: Rc<RefCell<MouseDimensions>>,
}

#[derive(Debug, Clone, Copy)]
pub struct TerminalMouseEvent {
    pub event_type: MouseEventType,
    pub col: u16,
    pub row: u16,
    pub button: i16,
    pub ctrl_key: bool,
    pub shift_key: bool,
    pub alt_key: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MouseEventType {
    MouseDown,
    MouseUp,
    MouseMove,
}

impl TerminalMouseHandler {
    pub fn new<F>(
        canvas: &web_sys::HtmlCanvasElement,
        dimensions: Rc<RefCell<MouseDimensions>>,
        event_handler: F,
    ) -> Result<Self, Error>
    where
        F: FnMut(TerminalMouseEvent) + 'static,
    {
        Self::new_internal(canvas, dimensions, Box::new(event_handler))
    }

    fn new_internal(
        canvas: &web_sys::HtmlCanvasElement,
        dimensions: Rc<RefCell<MouseDimensions>>,
        event_handler: MouseEventCallback,
    ) -> Result<Self, Error> {
        let shared_handler: EventHandler = Rc::new(RefCell::new(event_handler));

        let dims_for_convert = dimensions.clone();
        let pixel_to_cell = move |event: &web_sys::MouseEvent| -> Option<(u16, u16)> {
            let dims = *dims_for_convert.borrow();
            if dims.cell_width <= 0.0 || dims.cell_height <= 0.0 {
                return None;
            }
            let x = event.offset_x() as f32;
            let y = event.offset_y() as f32;
            let col = (x / dims.cell_width).floor() as u16;
            let row = (y / dims.cell_height).floor() as u16;
            if col < dims.columns && row < dims.rows {
                Some((col, row))
            } else {
                None
            }
        };

        use MouseEventType::*;
        let on_mouse_down =
            create_mouse_event_closure(MouseDown, shared_handler.clone(), pixel_to_cell.clone());
        let on_mouse_up = create_mouse_event_closure(MouseUp, shared_handler.clone(), pixel_to_cell.clone());
        let on_mouse_move = create_mouse_event_closure(MouseMove, shared_handler, pixel_to_cell);

        canvas
            .add_event_listener_with_callback("mousedown", on_mouse_down.as_ref().unchecked_ref())
            .map_err(|_| Error::Callback("failed to add mousedown listener".into()))?;
        canvas
            .add_event_listener_with_callback("mouseup", on_mouse_up.as_ref().unchecked_ref())
            .map_err(|_| Error::Callback("failed to add mouseup listener".into()))?;
        canvas
            .add_event_listener_with_callback("mousemove", on_mouse_move.as_ref().unchecked_ref())
            .map_err(|_| Error::Callback("failed to add mousemove listener".into()))?;

        Ok(Self { canvas: canvas.clone(), on_mouse_down, on_mouse_up, on_mouse_move, dimensions })
    }

    pub fn cleanup(&self) {
        let _ =
            self.canvas.remove_event_listener_with_callback("mousedown", self.on_mouse_down.as_ref().unchecked_ref());
        let _ =
            self.canvas.remove_event_listener_with_callback("mouseup", self.on_mouse_up.as_ref().unchecked_ref());
        let _ = self
            .canvas
            .remove_event_listener_with_callback("mousemove", self.on_mouse_move.as_ref().unchecked_ref());
    }

    pub fn update_dimensions(&self, columns: u16, rows: u16, cell_width: f32, cell_height: f32) {
        *self.dimensions.borrow_mut() = MouseDimensions { columns, rows, cell_width, cell_height };
    }
}

impl Drop for TerminalMouseHandler {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Built-in click-and-drag text selection with clipboard integration on
/// release. Produces `Selection` values for the host to apply via
/// `TerminalUpdate::SelectionSet/Update/Clear`; does not touch the renderer
/// directly.
pub struct DefaultSelectionHandler {
    state: Rc<RefCell<TerminalState>>,
    drag: Rc<RefCell<DragState>>,
    kind: SelectionKind,
    trim_trailing_whitespace: bool,
}

impl DefaultSelectionHandler {
    pub fn new(state: Rc<RefCell<TerminalState>>, kind: SelectionKind, trim_trailing_whitespace: bool) -> Self {
        Self { state, drag: Rc::new(RefCell::new(DragState::Idle)), kind, trim_trailing_whitespace }
    }

    /// Builds the mouse-event callback. `on_selection` is invoked with
    /// `Some(selection)` on every update during a drag and on completion, and
    /// with `None` when a single-cell click cancels the selection.
    pub fn create_event_handler(
        &self,
        mut on_selection: Box<dyn FnMut(Option<Selection>)>,
    ) -> MouseEventCallback {
        let drag = self.drag.clone();
        let kind = self.kind;
        let trim_trailing_whitespace = self.trim_trailing_whitespace;
        let state = self.state.clone();
        let mut ts_counter: u64 = 0;

        Box::new(move |event: TerminalMouseEvent| {
            let mut d = drag.borrow_mut();

            match event.event_type {
                MouseEventType::MouseDown if event.button == 0 => {
                    ts_counter += 1;
                    *d = DragState::Selecting { anchor: (event.col, event.row), ts: ts_counter };
                    let sel = selection_from_drag(&d, kind, event.col, event.row, ts_counter);
                    on_selection(sel);
                },
                MouseEventType::MouseMove if d.is_active() => {
                    ts_counter += 1;
                    let sel = selection_from_drag(&d, kind, event.col, event.row, ts_counter);
                    on_selection(sel);
                },
                MouseEventType::MouseUp if event.button == 0 => {
                    if let DragState::Selecting { anchor, ts } = *d {
                        *d = DragState::Idle;
                        if anchor == (event.col, event.row) {
                            on_selection(None);
                        } else {
                            let sel = Selection {
                                anchor: SelectionPoint { row: anchor.1 as i64, column: anchor.0, ts },
                                focus: SelectionPoint { row: event.row as i64, column: event.col, ts: ts + 1 },
                                kind,
                                status: SelectionStatus::Complete,
                            };
                            let text = selection_text(&state.borrow(), &sel, trim_trailing_whitespace);
                            copy_to_clipboard(text.into());
                            on_selection(Some(sel));
                        }
                    }
                },
                _ => {},
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragState {
    Idle,
    Selecting { anchor: (u16, u16), ts: u64 },
}

impl DragState {
    fn is_active(&self) -> bool {
        matches!(self, DragState::Selecting { .. })
    }
}

fn selection_from_drag(drag: &DragState, kind: SelectionKind, col: u16, row: u16, ts: u64) -> Option<Selection> {
    match *drag {
        DragState::Selecting { anchor, ts: anchor_ts } => Some(Selection {
            anchor: SelectionPoint { row: anchor.1 as i64, column: anchor.0, ts: anchor_ts },
            focus: SelectionPoint { row: row as i64, column: col, ts },
            kind,
            status: SelectionStatus::InProgress,
        }),
        DragState::Idle => None,
    }
}

fn create_mouse_event_closure(
    event_type: MouseEventType,
    event_handler: EventHandler,
    pixel_to_cell: impl Fn(&web_sys::MouseEvent) -> Option<(u16, u16)> + 'static,
) -> Closure<dyn FnMut(web_sys::MouseEvent)> {
    Closure::wrap(Box::new(move |event: web_sys::MouseEvent| {
        if let Some((col, row)) = pixel_to_cell(&event) {
            let terminal_event = TerminalMouseEvent {
                event_type,
                col,
                row,
                button: event.button(),
                ctrl_key: event.ctrl_key(),
                shift_key: event.shift_key(),
                alt_key: event.alt_key(),
            };
            event_handler.borrow_mut()(terminal_event);
        }
    }) as Box<dyn FnMut(_)>)
}

fn copy_to_clipboard(text: CompactString) {
    spawn_local(async move {
        let Some(window) = web_sys::window() else { return };
        let clipboard = window.navigator().clipboard();
        match wasm_bindgen_futures::JsFuture::from(clipboard.write_text(&text)).await {
            Ok(_) => console::log_1(&format!("copied {} characters to clipboard", text.chars().count()).into()),
            Err(err) => console::error_1(&format!("clipboard write failed: {err:?}").into()),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_cell_click_yields_no_selection() {
        let d = DragState::Selecting { anchor: (3, 3), ts: 1 };
        assert!(matches!(d, DragState::Selecting { anchor, .. } if anchor == (3, 3)));
    }

    #[test]
    fn drag_state_is_active_only_while_selecting() {
        assert!(!DragState::Idle.is_active());
        assert!(DragState::Selecting { anchor: (0, 0), ts: 0 }.is_active());
    }
}
