//! Der Koordinator: registriert Modi am Adapter, routet Events an den
//! aktiven Modus und liefert Change-Batches und Ereignisse an die Callbacks.
//!
//! Es ist höchstens ein Modus aktiv; Modus-Wechsel räumen den alten Modus
//! vollständig auf (Entwürfe löschen, Overlays entfernen, Cursor zurück),
//! bevor der neue startet. Events an gestoppte Modi werden verworfen.

use crate::core::{ChangeBatch, DrawError, FeatureStore};
use crate::modes::{DrawMode, ModeContext, ModeLifecycle, CURSOR_UNSET};
use crate::shared::DrawOptions;

use super::adapter::MapAdapter;
use super::events::{
    ChangeKind, DrawCallbacks, DrawEvent, FinishMeta, KeyEvent, PointerEvent,
};

/// Orchestriert Modi, Store und Adapter.
pub struct DrawController {
    store: FeatureStore,
    modes: Vec<Box<dyn DrawMode>>,
    active: Option<usize>,
    adapter: Box<dyn MapAdapter>,
    callbacks: DrawCallbacks,
    options: DrawOptions,
}

impl DrawController {
    /// Erstellt einen Koordinator ohne registrierte Modi.
    pub fn new(adapter: Box<dyn MapAdapter>, options: DrawOptions) -> Self {
        Self {
            store: FeatureStore::new(),
            modes: Vec::new(),
            active: None,
            adapter,
            callbacks: DrawCallbacks::default(),
            options,
        }
    }

    /// Hinterlegt die Adapter-Callbacks.
    pub fn set_callbacks(&mut self, callbacks: DrawCallbacks) {
        self.callbacks = callbacks;
    }

    /// Registriert einen Modus. Namenskollision oder Doppel-Registrierung
    /// schlagen mit `AlreadyRegistered` fehl.
    pub fn register_mode(&mut self, mut mode: Box<dyn DrawMode>) -> Result<(), DrawError> {
        let name = mode.name();
        if self.modes.iter().any(|m| m.name() == name) {
            return Err(DrawError::AlreadyRegistered(name.to_string()));
        }
        mode.common_mut().register(name)?;
        self.modes.push(mode);
        Ok(())
    }

    /// Aktiviert den Modus `name`; der bisherige Modus wird sauber gestoppt.
    pub fn set_mode(&mut self, name: &str) -> Result<(), DrawError> {
        let index = self
            .modes
            .iter()
            .position(|m| m.name() == name)
            .ok_or_else(|| DrawError::NotRegistered(name.to_string()))?;
        if self.active == Some(index) {
            return Ok(());
        }

        self.stop_active()?;

        self.modes[index].common_mut().start(name)?;
        self.active = Some(index);
        let cursor = self.modes[index].cursor();
        self.adapter.set_cursor(cursor);
        self.adapter.set_double_click_to_zoom(false);
        log::info!("Modus aktiv: {}", name);
        Ok(())
    }

    /// Stoppt den aktiven Modus (Cleanup inklusive).
    pub fn stop(&mut self) -> Result<(), DrawError> {
        self.stop_active()
    }

    /// Name des aktiven Modus, falls einer läuft.
    pub fn active_mode(&self) -> Option<&str> {
        self.active.map(|i| self.modes[i].name())
    }

    /// Read-only-Zugriff auf den Store.
    pub fn store(&self) -> &FeatureStore {
        &self.store
    }

    /// Direktzugriff für den Embedder (Seed-Daten, Import).
    ///
    /// Aufgelaufene Änderungen werden erst mit dem nächsten Event oder
    /// einem expliziten `flush_changes()` an die Callbacks gemeldet.
    pub fn store_mut(&mut self) -> &mut FeatureStore {
        &mut self.store
    }

    /// Liefert aufgelaufene Store-Änderungen sofort an die Callbacks aus.
    pub fn flush_changes(&mut self) {
        let batch = self.store.take_changes();
        self.deliver_batch(batch);
    }

    /// Löst die Styles eines Features über den zuständigen Modus auf.
    pub fn style_feature(
        &self,
        feature: &crate::core::Feature,
    ) -> serde_json::Map<String, serde_json::Value> {
        let owner = feature.mode().unwrap_or_default();
        self.modes
            .iter()
            .find(|m| m.name() == owner)
            .map(|m| m.style_feature(feature))
            .unwrap_or_default()
    }

    // ── Event-Eintrittspunkte ────────────────────────────────────────

    pub fn on_click(&mut self, event: &PointerEvent) {
        self.dispatch(|mode, ctx| mode.on_click(ctx, event));
    }

    pub fn on_mouse_move(&mut self, event: &PointerEvent) {
        self.dispatch(|mode, ctx| mode.on_mouse_move(ctx, event));
    }

    pub fn on_key_down(&mut self, event: &KeyEvent) {
        self.dispatch(|mode, ctx| mode.on_key_down(ctx, event));
    }

    pub fn on_key_up(&mut self, event: &KeyEvent) {
        self.dispatch(|mode, ctx| mode.on_key_up(ctx, event));
    }

    pub fn on_drag_start(&mut self, event: &PointerEvent) {
        self.dispatch(|mode, ctx| mode.on_drag_start(ctx, event));
    }

    pub fn on_drag(&mut self, event: &PointerEvent) {
        self.dispatch(|mode, ctx| mode.on_drag(ctx, event));
    }

    pub fn on_drag_end(&mut self, event: &PointerEvent) {
        self.dispatch(|mode, ctx| mode.on_drag_end(ctx, event));
    }

    // ── Intern ───────────────────────────────────────────────────────

    /// Routet ein Event an den aktiven Modus und flusht danach Batch + Events.
    fn dispatch(&mut self, f: impl FnOnce(&mut dyn DrawMode, &mut ModeContext<'_>)) {
        let Some(index) = self.active else {
            return;
        };
        if self.modes[index].common().state() != ModeLifecycle::Started {
            return;
        }
        let mode_name = self.modes[index].name();

        let mut emitted = Vec::new();
        {
            let mode = self.modes[index].as_mut();
            let mut ctx = ModeContext {
                store: &mut self.store,
                adapter: self.adapter.as_mut(),
                options: &self.options,
                emitted: &mut emitted,
            };
            f(mode, &mut ctx);
        }
        self.flush(mode_name, emitted);
    }

    fn stop_active(&mut self) -> Result<(), DrawError> {
        let Some(index) = self.active else {
            return Ok(());
        };
        let name = self.modes[index].name();

        let mut emitted = Vec::new();
        {
            let mode = self.modes[index].as_mut();
            let mut ctx = ModeContext {
                store: &mut self.store,
                adapter: self.adapter.as_mut(),
                options: &self.options,
                emitted: &mut emitted,
            };
            mode.clean_up(&mut ctx);
        }
        self.modes[index].common_mut().stop(name)?;
        self.active = None;
        self.adapter.set_cursor(CURSOR_UNSET);
        self.adapter.set_double_click_to_zoom(true);
        self.flush(name, emitted);
        Ok(())
    }

    /// Reicht Modus-Ereignisse und den Change-Batch an die Callbacks weiter.
    fn flush(&mut self, mode_name: &str, emitted: Vec<DrawEvent>) {
        for event in emitted {
            match event {
                DrawEvent::Select(id) => {
                    if let Some(cb) = &mut self.callbacks.on_select {
                        cb(&id);
                    }
                }
                DrawEvent::Deselect(id) => {
                    if let Some(cb) = &mut self.callbacks.on_deselect {
                        cb(&id);
                    }
                }
                DrawEvent::Finish { id, action } => {
                    if let Some(cb) = &mut self.callbacks.on_finish {
                        cb(
                            &id,
                            &FinishMeta {
                                action,
                                mode: mode_name.to_string(),
                            },
                        );
                    }
                }
            }
        }

        let batch = self.store.take_changes();
        self.deliver_batch(batch);
    }

    fn deliver_batch(&mut self, batch: ChangeBatch) {
        let Some(cb) = &mut self.callbacks.on_change else {
            return;
        };
        if !batch.created.is_empty() {
            cb(&batch.created, ChangeKind::Create);
        }
        if !batch.updated.is_empty() {
            cb(&batch.updated, ChangeKind::Update);
        }
        if !batch.deleted.is_empty() {
            cb(&batch.deleted, ChangeKind::Delete);
        }
    }
}
