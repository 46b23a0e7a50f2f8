//! Engine-Layer: Koordinator, Adapter-Schnittstelle und Event-Typen.

pub mod adapter;
pub mod controller;
pub mod events;

pub use adapter::MapAdapter;
pub use controller::DrawController;
pub use events::{
    ChangeKind, DrawCallbacks, DrawEvent, FinishAction, FinishMeta, KeyEvent, PointerButton,
    PointerEvent,
};
