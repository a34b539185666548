//! Cell effects
//!
//! An effect is a time-driven mutator of a cell's actual appearance. It does
//! not know which cells it is bound to; the surface's binding table owns that.
//!
//! Two traits split the contract:
//! - [`CellEffect`] is what effect types implement. Each type states its kind
//!   (for persistence) and whether one instance may be shared by many cells
//!   ([`Sharing::Shared`]) or must be cloned for every bind
//!   ([`Sharing::PerInstance`]).
//! - [`DynEffect`] is the object-safe form stored behind an [`EffectHandle`].
//!   Every `CellEffect` gets it through a blanket impl.

mod blink;
mod composite;
mod delay;
mod fade;
mod recolor;
mod registry;

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::error::Result;

pub use blink::{Blink, BlinkGlyph};
pub use composite::{ConcurrentEffect, EffectsChain};
pub use delay::Delay;
pub use fade::Fade;
pub use recolor::Recolor;
pub use registry::{EffectDecoder, EffectRegistry};

/// How an effect instance may be bound to cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sharing {
    /// One instance drives every bound cell in lockstep
    #[default]
    Shared,
    /// Every bind gets a private clone of the instance
    PerInstance,
}

/// An effect type
pub trait CellEffect: fmt::Debug + Clone + 'static {
    /// Stable name used when persisting the effect
    const KIND: &'static str;

    /// Whether instances are shared between binds or cloned per bind
    const SHARING: Sharing = Sharing::Shared;

    /// Advance timers; called once per frame per instance
    fn update(&mut self, elapsed: f64);

    /// Write the current state into the cell's actual appearance.
    /// Returns true when the cell changed.
    fn apply(&self, cell: &mut Cell) -> bool;

    /// Called when the effect is detached from a cell
    fn clear(&self, cell: &mut Cell) {
        cell.reset_actual();
    }

    fn is_finished(&self) -> bool;

    fn remove_on_finished(&self) -> bool;

    /// Rewind to the initial state
    fn restart(&mut self);

    /// Encode for persistence
    fn save(&self) -> Result<SerializedEffect>;
}

/// Object-safe effect, implemented for every [`CellEffect`]
pub trait DynEffect: fmt::Debug {
    fn kind(&self) -> &'static str;
    fn sharing(&self) -> Sharing;
    fn update(&mut self, elapsed: f64);
    fn apply(&self, cell: &mut Cell) -> bool;
    fn clear(&self, cell: &mut Cell);
    fn is_finished(&self) -> bool;
    fn remove_on_finished(&self) -> bool;
    fn restart(&mut self);
    fn save(&self) -> Result<SerializedEffect>;
    fn box_clone(&self) -> Box<dyn DynEffect>;
}

impl<E: CellEffect> DynEffect for E {
    fn kind(&self) -> &'static str {
        E::KIND
    }

    fn sharing(&self) -> Sharing {
        E::SHARING
    }

    fn update(&mut self, elapsed: f64) {
        CellEffect::update(self, elapsed)
    }

    fn apply(&self, cell: &mut Cell) -> bool {
        CellEffect::apply(self, cell)
    }

    fn clear(&self, cell: &mut Cell) {
        CellEffect::clear(self, cell)
    }

    fn is_finished(&self) -> bool {
        CellEffect::is_finished(self)
    }

    fn remove_on_finished(&self) -> bool {
        CellEffect::remove_on_finished(self)
    }

    fn restart(&mut self) {
        CellEffect::restart(self)
    }

    fn save(&self) -> Result<SerializedEffect> {
        CellEffect::save(self)
    }

    fn box_clone(&self) -> Box<dyn DynEffect> {
        Box::new(self.clone())
    }
}

/// Owned, type-erased effect
pub type BoxedEffect = Box<dyn DynEffect>;

impl Clone for Box<dyn DynEffect> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Wraps any effect so that every bind receives its own clone
#[derive(Debug, Clone, PartialEq)]
pub struct PerCell<E>(pub E);

impl<E: CellEffect> CellEffect for PerCell<E> {
    const KIND: &'static str = E::KIND;
    const SHARING: Sharing = Sharing::PerInstance;

    fn update(&mut self, elapsed: f64) {
        CellEffect::update(&mut self.0, elapsed)
    }

    fn apply(&self, cell: &mut Cell) -> bool {
        CellEffect::apply(&self.0, cell)
    }

    fn clear(&self, cell: &mut Cell) {
        CellEffect::clear(&self.0, cell)
    }

    fn is_finished(&self) -> bool {
        CellEffect::is_finished(&self.0)
    }

    fn remove_on_finished(&self) -> bool {
        CellEffect::remove_on_finished(&self.0)
    }

    fn restart(&mut self) {
        CellEffect::restart(&mut self.0)
    }

    fn save(&self) -> Result<SerializedEffect> {
        let mut saved = CellEffect::save(&self.0)?;
        saved.sharing = Sharing::PerInstance;
        Ok(saved)
    }
}

/// Box an effect, wrapping it in [`PerCell`] when a per-instance binding was
/// requested for a type that is shared by default
pub fn box_with_sharing<E: CellEffect>(effect: E, sharing: Sharing) -> Box<dyn DynEffect> {
    if sharing == Sharing::PerInstance && E::SHARING == Sharing::Shared {
        Box::new(PerCell(effect))
    } else {
        Box::new(effect)
    }
}

/// Persisted form of an effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedEffect {
    pub kind: String,
    #[serde(default)]
    pub sharing: Sharing,
    #[serde(default)]
    pub state: serde_json::Value,
}

impl SerializedEffect {
    /// Encode an effect whose whole state is its serde representation
    pub fn encode<E: CellEffect + Serialize>(effect: &E) -> Result<Self> {
        Ok(Self {
            kind: E::KIND.to_string(),
            sharing: E::SHARING,
            state: serde_json::to_value(effect)?,
        })
    }

    /// Decode the state into a concrete effect type
    pub fn decode<E: DeserializeOwned>(&self) -> Result<E> {
        let state = if self.state.is_null() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            self.state.clone()
        };
        Ok(serde_json::from_value(state)?)
    }
}

/// Timing state shared by the built-in effects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectTiming {
    /// Seconds to wait before the effect starts running
    pub start_delay: f64,
    /// Detach from all cells once finished
    pub remove_on_finished: bool,
    /// On detach, write the effect's final colors into the desired appearance
    pub permanent: bool,
    finished: bool,
    elapsed: f64,
    delay_finished: bool,
}

impl EffectTiming {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add frame time. Returns true once the start delay has passed.
    ///
    /// Time left over after the delay elapses is carried into the run.
    pub fn advance(&mut self, elapsed: f64) -> bool {
        self.elapsed += elapsed;
        if !self.delay_finished && self.elapsed >= self.start_delay {
            self.delay_finished = true;
            self.elapsed -= self.start_delay;
        }
        self.delay_finished
    }

    /// Seconds since the delay finished (or since the last reset)
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn reset_elapsed(&mut self) {
        self.elapsed = 0.0;
    }

    pub fn delay_finished(&self) -> bool {
        self.delay_finished
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn finish(&mut self) {
        self.finished = true;
    }

    pub fn restart(&mut self) {
        self.finished = false;
        self.elapsed = 0.0;
        self.delay_finished = false;
    }
}

/// Builder methods for effects built on [`EffectTiming`]
pub trait Timed: Sized {
    fn timing(&self) -> &EffectTiming;
    fn timing_mut(&mut self) -> &mut EffectTiming;

    fn with_start_delay(mut self, seconds: f64) -> Self {
        self.timing_mut().start_delay = seconds;
        self
    }

    fn with_remove_on_finished(mut self, remove: bool) -> Self {
        self.timing_mut().remove_on_finished = remove;
        self
    }

    fn with_permanent(mut self, permanent: bool) -> Self {
        self.timing_mut().permanent = permanent;
        self
    }
}

/// Identity of a live effect instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(usize);

/// Shared handle to an effect instance.
///
/// Cloning the handle does not clone the effect: every clone refers to the
/// same instance and the binding table tells instances apart by identity.
/// Use [`EffectHandle::duplicate`] for an independent copy.
#[derive(Clone)]
pub struct EffectHandle {
    inner: Rc<RefCell<Box<dyn DynEffect>>>,
}

impl EffectHandle {
    pub fn new<E: CellEffect>(effect: E) -> Self {
        Self::from_boxed(Box::new(effect))
    }

    pub fn from_boxed(effect: Box<dyn DynEffect>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(effect)),
        }
    }

    pub fn id(&self) -> EffectId {
        EffectId(Rc::as_ptr(&self.inner) as usize)
    }

    pub fn ptr_eq(&self, other: &EffectHandle) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn kind(&self) -> &'static str {
        self.inner.borrow().kind()
    }

    pub fn sharing(&self) -> Sharing {
        self.inner.borrow().sharing()
    }

    pub fn is_finished(&self) -> bool {
        self.inner.borrow().is_finished()
    }

    pub fn remove_on_finished(&self) -> bool {
        self.inner.borrow().remove_on_finished()
    }

    /// Independent copy of the effect in its current state
    pub fn duplicate(&self) -> EffectHandle {
        Self::from_boxed(self.inner.borrow().box_clone())
    }

    pub fn save(&self) -> Result<SerializedEffect> {
        self.inner.borrow().save()
    }

    /// Borrow the effect. Must not be held across `update_effects`.
    pub fn borrow(&self) -> Ref<'_, Box<dyn DynEffect>> {
        self.inner.borrow()
    }

    /// Mutably borrow the effect. Must not be held across `update_effects`.
    pub fn borrow_mut(&self) -> RefMut<'_, Box<dyn DynEffect>> {
        self.inner.borrow_mut()
    }

    pub(crate) fn try_borrow(&self) -> Option<Ref<'_, Box<dyn DynEffect>>> {
        self.inner.try_borrow().ok()
    }

    pub(crate) fn try_borrow_mut(&self) -> Option<RefMut<'_, Box<dyn DynEffect>>> {
        self.inner.try_borrow_mut().ok()
    }
}

impl PartialEq for EffectHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for EffectHandle {}

impl fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(effect) => f
                .debug_struct("EffectHandle")
                .field("id", &self.id())
                .field("effect", &*effect)
                .finish(),
            Err(_) => f
                .debug_struct("EffectHandle")
                .field("id", &self.id())
                .finish_non_exhaustive(),
        }
    }
}

impl<E: CellEffect> From<E> for EffectHandle {
    fn from(effect: E) -> Self {
        EffectHandle::new(effect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_delay_carries_over() {
        let mut timing = EffectTiming {
            start_delay: 0.5,
            ..EffectTiming::default()
        };
        assert!(!timing.advance(0.25));
        assert!(timing.advance(0.5));
        assert!((timing.elapsed() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_timing_without_delay_starts_immediately() {
        let mut timing = EffectTiming::new();
        assert!(timing.advance(0.1));
        assert!((timing.elapsed() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_timing_restart() {
        let mut timing = EffectTiming::new();
        timing.advance(1.0);
        timing.finish();
        timing.restart();
        assert!(!timing.is_finished());
        assert!(!timing.delay_finished());
        assert_eq!(timing.elapsed(), 0.0);
    }

    #[test]
    fn test_handle_identity() {
        let a = EffectHandle::new(Delay::new(1.0));
        let b = a.clone();
        let c = a.duplicate();
        assert!(a.ptr_eq(&b));
        assert_eq!(a.id(), b.id());
        assert!(!a.ptr_eq(&c));
        assert_ne!(a.id(), c.id());
        assert_eq!(c.kind(), "delay");
    }

    #[test]
    fn test_sharing_is_declared_by_type() {
        let shared = EffectHandle::new(Delay::new(1.0));
        let per_cell = EffectHandle::new(PerCell(Delay::new(1.0)));
        assert_eq!(shared.sharing(), Sharing::Shared);
        assert_eq!(per_cell.sharing(), Sharing::PerInstance);
        assert_eq!(per_cell.kind(), "delay");
    }

    #[test]
    fn test_per_cell_save_records_sharing() {
        let saved = CellEffect::save(&PerCell(Delay::new(2.0))).unwrap();
        assert_eq!(saved.kind, "delay");
        assert_eq!(saved.sharing, Sharing::PerInstance);
    }

    #[test]
    fn test_box_with_sharing() {
        let boxed = box_with_sharing(Delay::new(1.0), Sharing::PerInstance);
        assert_eq!(boxed.sharing(), Sharing::PerInstance);
        let boxed = box_with_sharing(Delay::new(1.0), Sharing::Shared);
        assert_eq!(boxed.sharing(), Sharing::Shared);
    }
}
