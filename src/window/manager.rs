use std::collections::BTreeMap;
use std::time::Instant;

use crate::animation::Timeline;
use crate::config::{Settings, clamp_snap_threshold};
use crate::constants::{CONTENT_TICK, DEFAULT_WIDGET_POSITION, FADE_IN_DURATION};
use crate::error::{Result, WidgetError};
use crate::geometry::{Point, Rect};
use crate::layout::{DragEnv, Interaction, InteractionState, PointerOutcome, resize_grip};
use crate::persistence::{LayoutPersistence, WidgetDescriptor};
use crate::renderer::{ContentRenderer, RendererFactory, RendererState};

use super::{
    NativeWindowCapability, SizeClass, WidgetId, WidgetInstance, WidgetKind, WidgetRegistry,
    WindowStyleController, ZBand, clamp_opacity,
};

/// Whatever owns native windows and knows the monitor layout.
pub trait DesktopHost {
    /// Create a shown window with the given frame and starting opacity.
    fn create_window(
        &mut self,
        id: &WidgetId,
        frame: Rect,
        opacity: f32,
    ) -> Result<Box<dyn NativeWindowCapability>>;

    /// Bounds of the monitor under `point`.
    fn screen_at(&self, point: Point) -> Rect;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

/// Pointer input routed to one widget, in desktop coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub position: Point,
}

impl PointerEvent {
    pub fn down(x: i32, y: i32) -> Self {
        Self {
            kind: PointerKind::Down,
            position: Point::new(x, y),
        }
    }

    pub fn moved(x: i32, y: i32) -> Self {
        Self {
            kind: PointerKind::Move,
            position: Point::new(x, y),
        }
    }

    pub fn up(x: i32, y: i32) -> Self {
        Self {
            kind: PointerKind::Up,
            position: Point::new(x, y),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetSummary {
    pub id: WidgetId,
    pub kind: WidgetKind,
    pub name: String,
    pub frame: Rect,
    pub opacity: f32,
    pub click_through: bool,
    pub z_band: ZBand,
}

/// Engine-owned decorations drawn above the renderer's content, in
/// window-local frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayPaint {
    pub indicator: Option<Rect>,
    pub grip: [Point; 3],
    pub hover_resize: bool,
}

struct WidgetSlot {
    native: Box<dyn NativeWindowCapability>,
    renderer: Box<dyn ContentRenderer>,
    interaction: Interaction,
    indicator: Option<Rect>,
    hover_resize: bool,
}

/// Application root: owns every widget and routes all mutations.
pub struct WidgetManager {
    registry: WidgetRegistry,
    style: WindowStyleController,
    store: LayoutPersistence,
    settings: Settings,
    host: Box<dyn DesktopHost>,
    renderers: Box<dyn RendererFactory>,
    slots: BTreeMap<WidgetId, WidgetSlot>,
    fades: Timeline<WidgetId>,
    last_content_tick: Option<Instant>,
}

impl WidgetManager {
    pub fn new(
        host: Box<dyn DesktopHost>,
        renderers: Box<dyn RendererFactory>,
        store: LayoutPersistence,
    ) -> Self {
        Self {
            registry: WidgetRegistry::new(),
            style: WindowStyleController::new(),
            store,
            settings: Settings::default(),
            host,
            renderers,
            slots: BTreeMap::new(),
            fades: Timeline::new(),
            last_content_tick: None,
        }
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Session-only overrides; written out with the next save.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn renderer(&self, id: &WidgetId) -> Option<&dyn ContentRenderer> {
        self.slots.get(id).map(|s| s.renderer.as_ref())
    }

    pub fn renderer_mut(&mut self, id: &WidgetId) -> Option<&mut (dyn ContentRenderer + 'static)> {
        self.slots.get_mut(id).map(|s| s.renderer.as_mut())
    }

    pub fn interaction(&self, id: &WidgetId) -> Option<InteractionState> {
        self.slots.get(id).map(|s| s.interaction.state())
    }

    /// Rebuild widgets from the layout document. Returns how many were
    /// restored; entries that fail are logged and skipped.
    pub fn restore(&mut self) -> Result<usize> {
        let layout = self.store.load_all()?;
        self.settings = layout.settings;
        let mut restored = 0;
        for descriptor in layout.widgets {
            let id = descriptor.id.clone();
            match self.restore_one(descriptor) {
                Ok(()) => restored += 1,
                Err(err) => tracing::warn!(widget_id = %id, error = %err, "widget not restored"),
            }
        }
        tracing::info!(
            restored,
            skipped = layout.skipped,
            path = %self.store.path().display(),
            "layout restored"
        );
        Ok(restored)
    }

    fn restore_one(&mut self, d: WidgetDescriptor) -> Result<()> {
        let renderer = self.renderers.create(&d.state);
        let mut instance = WidgetInstance::new(d.id, d.state, d.size_class, d.origin);
        instance.name = d.name;
        match d.custom_content {
            Some(content) => {
                instance.request_content_size(content);
            }
            None => instance.set_default_content_size(renderer.default_content_size(d.size_class)),
        }
        match d.opacity.or_else(|| renderer.opacity_override()) {
            Some(opacity) => instance.set_opacity_override(opacity),
            None => instance.set_global_opacity(self.settings.widget_opacity),
        }
        let id = self.spawn(instance, renderer)?;

        // Styles need a live native window, so they follow creation.
        if d.click_through {
            self.with_widget(&id, |style, w, native| {
                style.set_click_through(w, native, true)
            })?;
        }
        if d.z_band != ZBand::Normal {
            self.with_widget(&id, |style, w, native| style.set_z_band(w, native, d.z_band))?;
        }
        Ok(())
    }

    /// Create a widget at the default position and persist the layout.
    pub fn add_widget(&mut self, state: RendererState, size_class: SizeClass) -> Result<WidgetId> {
        let mut id = WidgetId::generate();
        while self.registry.contains(&id) {
            id = WidgetId::generate();
        }
        let renderer = self.renderers.create(&state);
        let (x, y) = DEFAULT_WIDGET_POSITION;
        let mut instance = WidgetInstance::new(id, state, size_class, Point::new(x, y));
        instance.set_default_content_size(renderer.default_content_size(size_class));
        match renderer.opacity_override() {
            Some(opacity) => instance.set_opacity_override(opacity),
            None => instance.set_global_opacity(self.settings.widget_opacity),
        }
        let id = self.spawn(instance, renderer)?;
        tracing::info!(widget_id = %id, kind = %self.kind_of(&id), "widget added");
        self.persist();
        Ok(id)
    }

    fn spawn(
        &mut self,
        mut instance: WidgetInstance,
        mut renderer: Box<dyn ContentRenderer>,
    ) -> Result<WidgetId> {
        if self.registry.contains(&instance.id) {
            return Err(WidgetError::DuplicateId(instance.id));
        }
        let id = instance.id.clone();
        let native = self.host.create_window(&id, instance.frame(), 0.0)?;
        renderer.on_size_changed(instance.geometry().content);
        instance.visible = true;
        let target = instance.opacity();
        self.registry.register(instance)?;
        self.style.track(&id);
        self.slots.insert(
            id.clone(),
            WidgetSlot {
                native,
                renderer,
                interaction: Interaction::new(),
                indicator: None,
                hover_resize: false,
            },
        );
        self.fades.schedule(
            id.clone(),
            0.0,
            target,
            Instant::now(),
            FADE_IN_DURATION,
            Some(Box::new(|id: &WidgetId| {
                tracing::trace!(widget_id = %id, "fade-in finished");
            })),
        );
        Ok(id)
    }

    fn kind_of(&self, id: &WidgetId) -> String {
        self.registry
            .get(id)
            .map(|w| w.kind().to_string())
            .unwrap_or_default()
    }

    /// Close one widget and persist the layout without it.
    pub fn close_widget(&mut self, id: &WidgetId) -> Result<()> {
        self.detach(id)?;
        self.persist();
        Ok(())
    }

    /// Close every widget, saving once at the end.
    pub fn close_all(&mut self) -> usize {
        let ids = self.registry.ids();
        let mut closed = 0;
        for id in &ids {
            match self.detach(id) {
                Ok(()) => closed += 1,
                Err(err) => tracing::warn!(widget_id = %id, error = %err, "close failed"),
            }
        }
        self.persist();
        closed
    }

    fn detach(&mut self, id: &WidgetId) -> Result<()> {
        let mut slot = self
            .slots
            .remove(id)
            .ok_or_else(|| WidgetError::UnknownWidget(id.clone()))?;
        if slot.interaction.terminate() {
            tracing::debug!(widget_id = %id, "closed mid-interaction, capture discarded");
        }
        slot.renderer.on_close();
        if let Err(err) = slot.native.close() {
            tracing::warn!(widget_id = %id, error = %err, "native close failed");
        }
        self.style.forget(id);
        self.fades.cancel(id);
        self.registry.unregister(id);
        tracing::info!(widget_id = %id, "widget closed");
        Ok(())
    }

    pub fn enumerate(&self) -> Vec<WidgetSummary> {
        self.registry
            .all()
            .into_iter()
            .map(|w| WidgetSummary {
                id: w.id.clone(),
                kind: w.kind(),
                name: w.display_name().to_string(),
                frame: w.frame(),
                opacity: w.opacity(),
                click_through: w.click_through,
                z_band: w.z_band,
            })
            .collect()
    }

    /// Turn click-through off everywhere. Returns how many widgets changed.
    pub fn broadcast_disable_click_through(&mut self) -> usize {
        let mut changed = 0;
        for id in self.registry.ids() {
            let Some(w) = self.registry.get_mut(&id) else {
                continue;
            };
            if !w.click_through {
                continue;
            }
            if let Some(slot) = self.slots.get_mut(&id) {
                self.style
                    .set_click_through(w, slot.native.as_mut(), false);
                changed += 1;
            }
        }
        if changed > 0 {
            tracing::info!(changed, "click-through disabled on all widgets");
            self.persist();
        }
        changed
    }

    fn with_widget<T>(
        &mut self,
        id: &WidgetId,
        f: impl FnOnce(
            &mut WindowStyleController,
            &mut WidgetInstance,
            &mut dyn NativeWindowCapability,
        ) -> T,
    ) -> Result<T> {
        let w = self
            .registry
            .get_mut(id)
            .ok_or_else(|| WidgetError::UnknownWidget(id.clone()))?;
        let slot = self
            .slots
            .get_mut(id)
            .ok_or_else(|| WidgetError::UnknownWidget(id.clone()))?;
        Ok(f(&mut self.style, w, slot.native.as_mut()))
    }

    pub fn set_click_through(&mut self, id: &WidgetId, enabled: bool) -> Result<()> {
        self.with_widget(id, |style, w, native| {
            style.set_click_through(w, native, enabled)
        })?;
        self.persist();
        Ok(())
    }

    /// Flip click-through and return the new value.
    pub fn toggle_click_through(&mut self, id: &WidgetId) -> Result<bool> {
        let enabled = !self
            .registry
            .get(id)
            .ok_or_else(|| WidgetError::UnknownWidget(id.clone()))?
            .click_through;
        self.set_click_through(id, enabled)?;
        Ok(enabled)
    }

    pub fn set_z_band(&mut self, id: &WidgetId, band: ZBand) -> Result<()> {
        self.with_widget(id, |style, w, native| style.set_z_band(w, native, band))?;
        self.persist();
        Ok(())
    }

    /// Re-apply pinning to every pinned widget. Returns how many succeeded.
    pub fn reassert_pinned(&mut self) -> usize {
        let mut count = 0;
        for w in self.registry.all() {
            if let Some(slot) = self.slots.get_mut(&w.id)
                && self.style.reassert_pinned(w, slot.native.as_mut())
            {
                count += 1;
            }
        }
        count
    }

    pub fn raise(&mut self, id: &WidgetId) -> Result<()> {
        let slot = self
            .slots
            .get_mut(id)
            .ok_or_else(|| WidgetError::UnknownWidget(id.clone()))?;
        if let Err(err) = slot.native.raise() {
            tracing::warn!(widget_id = %id, error = %err, "raise failed");
        }
        Ok(())
    }

    /// Set the global opacity; widgets with their own opacity keep it.
    pub fn set_global_opacity(&mut self, opacity: f32) -> f32 {
        let opacity = clamp_opacity(opacity);
        self.settings.widget_opacity = opacity;
        for id in self.registry.ids() {
            let (Some(w), Some(slot)) = (self.registry.get_mut(&id), self.slots.get_mut(&id))
            else {
                continue;
            };
            if w.has_opacity_override() {
                continue;
            }
            w.set_global_opacity(opacity);
            self.fades.cancel(&id);
            if let Err(err) = slot.native.set_opacity(opacity) {
                tracing::warn!(widget_id = %id, error = %err, "opacity not applied");
            }
        }
        tracing::info!(opacity, "global opacity changed");
        self.persist();
        opacity
    }

    pub fn set_snap_enabled(&mut self, enabled: bool) {
        self.settings.snap_enabled = enabled;
        tracing::info!(enabled, "snapping toggled");
        self.persist();
    }

    /// Set the snap threshold, clamped to the accepted range.
    pub fn set_snap_threshold(&mut self, threshold: i32) -> i32 {
        let threshold = clamp_snap_threshold(threshold);
        self.settings.snap_threshold = threshold;
        tracing::info!(threshold, "snap threshold changed");
        self.persist();
        threshold
    }

    pub fn toggle_light_mode(&mut self) -> bool {
        self.settings.light_mode = !self.settings.light_mode;
        self.persist();
        self.settings.light_mode
    }

    /// A renderer changed its persisted payload outside a tick.
    pub fn notify_content_changed(&mut self, id: &WidgetId) -> Result<()> {
        if !self.slots.contains_key(id) {
            return Err(WidgetError::UnknownWidget(id.clone()));
        }
        self.persist();
        Ok(())
    }

    /// Route one pointer event to the widget's drag/resize machine.
    pub fn pointer(&mut self, id: &WidgetId, event: PointerEvent) -> Result<PointerOutcome> {
        let siblings = self.registry.sibling_frames(id);
        let screen = self.host.screen_at(event.position);
        let snap = self.settings.snap();
        let w = self
            .registry
            .get_mut(id)
            .ok_or_else(|| WidgetError::UnknownWidget(id.clone()))?;
        let slot = self
            .slots
            .get_mut(id)
            .ok_or_else(|| WidgetError::UnknownWidget(id.clone()))?;

        let outcome = match event.kind {
            PointerKind::Down => {
                slot.interaction
                    .pointer_down(event.position, w.frame(), w.geometry().content)
            }
            PointerKind::Move => {
                let env = DragEnv {
                    frame: w.frame(),
                    screen,
                    siblings: &siblings,
                    settings: snap,
                };
                slot.interaction.pointer_move(event.position, &env)
            }
            PointerKind::Up => slot.interaction.pointer_up(),
        };

        match outcome {
            PointerOutcome::Hover { on_resize_handle } => slot.hover_resize = on_resize_handle,
            PointerOutcome::DragStarted | PointerOutcome::ResizeStarted => {
                tracing::debug!(widget_id = %id, outcome = ?outcome, "pointer captured");
            }
            PointerOutcome::Moved { origin, snap } => {
                w.set_origin(origin);
                slot.indicator = snap.map(|s| s.indicator);
                if let Some(s) = snap {
                    tracing::trace!(
                        widget_id = %id,
                        x = ?s.x.map(|m| (m.side, m.source)),
                        y = ?s.y.map(|m| (m.side, m.source)),
                        "snapped"
                    );
                }
                if let Err(err) = slot.native.set_frame(w.frame()) {
                    tracing::warn!(widget_id = %id, error = %err, "move not applied");
                }
            }
            PointerOutcome::Resized { content } => {
                let content = w.request_content_size(content);
                slot.renderer.on_size_changed(content);
                if let Err(err) = slot.native.set_frame(w.frame()) {
                    tracing::warn!(widget_id = %id, error = %err, "resize not applied");
                }
            }
            PointerOutcome::Settled(kind) => {
                slot.indicator = None;
                let geometry = w.geometry();
                tracing::debug!(
                    widget_id = %id,
                    kind = ?kind,
                    x = geometry.origin.x,
                    y = geometry.origin.y,
                    width = geometry.content.width,
                    height = geometry.content.height,
                    "interaction settled"
                );
                self.persist();
            }
            PointerOutcome::Ignored => {}
        }
        Ok(outcome)
    }

    /// Advance fades and run the content tick when due. Returns whether
    /// anything visible may have changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut dirty = false;
        for step in self.fades.advance(now) {
            if let Some(slot) = self.slots.get_mut(&step.key) {
                dirty = true;
                if let Err(err) = slot.native.set_opacity(step.value) {
                    tracing::warn!(widget_id = %step.key, error = %err, "fade step not applied");
                }
            }
        }

        let due = self
            .last_content_tick
            .is_none_or(|last| now.saturating_duration_since(last) >= CONTENT_TICK);
        if due {
            self.last_content_tick = Some(now);
            dirty = true;
            let mut content_changed = false;
            for (id, slot) in self.slots.iter_mut() {
                slot.renderer.on_tick(now);
                if slot.renderer.take_content_changed() {
                    tracing::debug!(widget_id = %id, "renderer content changed");
                    content_changed = true;
                }
            }
            if content_changed {
                self.persist();
            }
        }
        dirty
    }

    pub fn paint_overlay(&self, id: &WidgetId) -> Option<OverlayPaint> {
        let w = self.registry.get(id)?;
        let slot = self.slots.get(id)?;
        Some(OverlayPaint {
            indicator: slot.indicator,
            grip: resize_grip(w.frame().size()),
            hover_resize: slot.hover_resize,
        })
    }

    /// Save the full layout; failures are logged and retried by the next
    /// mutation.
    fn persist(&mut self) {
        for (id, slot) in &self.slots {
            if let Some(w) = self.registry.get_mut(id) {
                w.renderer_state = slot.renderer.state();
            }
        }
        if let Err(err) = self.store.save_all(&self.registry, &self.settings) {
            tracing::error!(error = %err, "layout not saved");
        }
    }
}
