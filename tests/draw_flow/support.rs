//! Gemeinsames Test-Geschirr: aufzeichnender Adapter, Callback-Protokoll
//! und ein fertig verdrahteter Controller mit allen Modi.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::DVec2;
use serde_json::json;

use geodraw::{
    ChangeKind, CircleMode, CoordinateFlags, DrawCallbacks, DrawController, DrawOptions,
    FeatureFlags, FeatureId, FinishMeta, FreehandMode, GreatCircleMode, LineStringMode,
    MapAdapter, PointMode, PointerButton, PointerEvent, PolygonMode, Properties, RectangleMode,
    ResizeOrigin, SelectMode, SelectionFlags,
};

/// Lineare Test-Projektion: 1 Grad = 100 Pixel.
pub const PX_PER_DEGREE: f64 = 100.0;

#[derive(Default)]
pub struct AdapterLog {
    pub cursors: Vec<String>,
    pub draggability: Vec<bool>,
    pub double_click_zoom: Vec<bool>,
}

/// Adapter, der alle Hook-Aufrufe mitschreibt.
pub struct RecordingAdapter {
    pub log: Rc<RefCell<AdapterLog>>,
}

impl MapAdapter for RecordingAdapter {
    fn project(&self, lng_lat: DVec2) -> DVec2 {
        lng_lat * PX_PER_DEGREE
    }
    fn unproject(&self, px: DVec2) -> DVec2 {
        px / PX_PER_DEGREE
    }
    fn set_cursor(&mut self, cursor: &str) {
        self.log.borrow_mut().cursors.push(cursor.to_string());
    }
    fn set_map_draggability(&mut self, enabled: bool) {
        self.log.borrow_mut().draggability.push(enabled);
    }
    fn set_double_click_to_zoom(&mut self, enabled: bool) {
        self.log.borrow_mut().double_click_zoom.push(enabled);
    }
}

#[derive(Default)]
pub struct CallbackLog {
    /// Ein Eintrag je Batch-Bucket
    pub changes: Vec<(Vec<FeatureId>, ChangeKind)>,
    /// Select/Deselect in Aufruf-Reihenfolge, als "select:<id>" / "deselect:<id>"
    pub sequence: Vec<String>,
    pub finished: Vec<(FeatureId, FinishMeta)>,
}

impl CallbackLog {
    /// Alle Update-Buckets.
    pub fn updates(&self) -> Vec<&Vec<FeatureId>> {
        self.changes
            .iter()
            .filter(|(_, kind)| *kind == ChangeKind::Update)
            .map(|(ids, _)| ids)
            .collect()
    }
}

pub struct Fixture {
    pub controller: DrawController,
    pub adapter_log: Rc<RefCell<AdapterLog>>,
    pub callbacks: Rc<RefCell<CallbackLog>>,
}

impl Fixture {
    /// Controller mit allen Zeichen-Modi und dem übergebenen Select-Modus.
    pub fn with_select(select: SelectMode) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let adapter_log = Rc::new(RefCell::new(AdapterLog::default()));
        let adapter = RecordingAdapter {
            log: Rc::clone(&adapter_log),
        };
        let mut controller = DrawController::new(Box::new(adapter), DrawOptions::default());

        let callbacks = Rc::new(RefCell::new(CallbackLog::default()));
        controller.set_callbacks(DrawCallbacks {
            on_change: Some(Box::new({
                let log = Rc::clone(&callbacks);
                move |ids: &[FeatureId], kind| {
                    log.borrow_mut().changes.push((ids.to_vec(), kind));
                }
            })),
            on_select: Some(Box::new({
                let log = Rc::clone(&callbacks);
                move |id: &FeatureId| {
                    log.borrow_mut().sequence.push(format!("select:{id}"));
                }
            })),
            on_deselect: Some(Box::new({
                let log = Rc::clone(&callbacks);
                move |id: &FeatureId| {
                    log.borrow_mut().sequence.push(format!("deselect:{id}"));
                }
            })),
            on_finish: Some(Box::new({
                let log = Rc::clone(&callbacks);
                move |id: &FeatureId, meta: &FinishMeta| {
                    log.borrow_mut().finished.push((id.clone(), meta.clone()));
                }
            })),
        });

        controller
            .register_mode(Box::new(PointMode::new()))
            .unwrap();
        controller
            .register_mode(Box::new(LineStringMode::new()))
            .unwrap();
        controller
            .register_mode(Box::new(PolygonMode::new()))
            .unwrap();
        controller
            .register_mode(Box::new(CircleMode::new()))
            .unwrap();
        controller
            .register_mode(Box::new(RectangleMode::new()))
            .unwrap();
        controller
            .register_mode(Box::new(FreehandMode::new()))
            .unwrap();
        controller
            .register_mode(Box::new(GreatCircleMode::new()))
            .unwrap();
        controller.register_mode(Box::new(select)).unwrap();

        Self {
            controller,
            adapter_log,
            callbacks,
        }
    }

    /// Standard-Fixture: alles selektier- und editierbar.
    pub fn new() -> Self {
        Self::with_select(SelectMode::new(full_flags()))
    }

    /// Legt ein Feature direkt im Store an und verwirft die Seed-Batches.
    pub fn seed(&mut self, geometry: geodraw::Geometry, mode: &str) -> FeatureId {
        let mut properties = Properties::new();
        properties.insert("mode".to_string(), json!(mode));
        let ids = self
            .controller
            .store_mut()
            .create(vec![(geometry, properties)])
            .expect("Seed-Feature erwartet");
        self.controller.flush_changes();
        self.clear_logs();
        ids.into_iter().next().unwrap()
    }

    /// Leert beide Protokolle (z.B. nach dem Aufbau einer Ausgangslage).
    pub fn clear_logs(&mut self) {
        let mut log = self.callbacks.borrow_mut();
        log.changes.clear();
        log.sequence.clear();
        log.finished.clear();
    }
}

/// Flags mit allem, was der Select-Modus kann.
pub fn full_flags() -> HashMap<String, SelectionFlags> {
    let mut flags = HashMap::new();
    for mode in ["point", "linestring", "polygon", "circle", "rectangle"] {
        flags.insert(
            mode.to_string(),
            SelectionFlags {
                feature: FeatureFlags {
                    draggable: true,
                    coordinates: Some(CoordinateFlags {
                        draggable: true,
                        deletable: true,
                        midpoints: true,
                        resizable: Some(ResizeOrigin::Center),
                        rotatable: true,
                    }),
                },
            },
        );
    }
    flags
}

pub fn d(x: f64, y: f64) -> DVec2 {
    DVec2::new(x, y)
}

pub fn pointer(lng: f64, lat: f64, button: PointerButton, held: &[&str]) -> PointerEvent {
    PointerEvent {
        lng_lat: d(lng, lat),
        container_px: d(lng * PX_PER_DEGREE, lat * PX_PER_DEGREE),
        button,
        held_keys: held.iter().map(|k| k.to_string()).collect(),
    }
}

pub fn left(lng: f64, lat: f64) -> PointerEvent {
    pointer(lng, lat, PointerButton::Left, &[])
}

pub fn right(lng: f64, lat: f64) -> PointerEvent {
    pointer(lng, lat, PointerButton::Right, &[])
}

/// Geschlossener Ring eines Einheitsquadrats mit Ursprung `(x, y)`.
pub fn square_ring(x: f64, y: f64) -> Vec<DVec2> {
    vec![
        d(x, y),
        d(x, y + 1.0),
        d(x + 1.0, y + 1.0),
        d(x + 1.0, y),
        d(x, y),
    ]
}
