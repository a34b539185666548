//! Effect registry
//!
//! Maps the persisted `kind` name of an effect to the function that rebuilds
//! it. A registry is an ordinary value owned by the host application and
//! handed to whatever restores surfaces or loads scenes.

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;

use super::{
    box_with_sharing, Blink, BlinkGlyph, BoxedEffect, CellEffect, ConcurrentEffect, Delay,
    EffectHandle, EffectsChain, Fade, Recolor, SerializedEffect,
};
use crate::error::{Error, Result};

/// Rebuilds an effect from its persisted form
pub type EffectDecoder = fn(&EffectRegistry, &SerializedEffect) -> Result<BoxedEffect>;

/// Table of effect kinds known to a loader
#[derive(Clone, Default)]
pub struct EffectRegistry {
    decoders: HashMap<String, EffectDecoder>,
}

impl EffectRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in effect
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register_serde::<Fade>();
        registry.register_serde::<Blink>();
        registry.register_serde::<BlinkGlyph>();
        registry.register_serde::<Delay>();
        registry.register_serde::<Recolor>();
        registry.register(EffectsChain::KIND, |registry, saved| {
            let chain = EffectsChain::from_serialized(registry, saved)?;
            Ok(box_with_sharing(chain, saved.sharing))
        });
        registry.register(ConcurrentEffect::KIND, |registry, saved| {
            let effect = ConcurrentEffect::from_serialized(registry, saved)?;
            Ok(box_with_sharing(effect, saved.sharing))
        });
        registry
    }

    /// Register a decoder for `kind`, replacing any previous one
    pub fn register(&mut self, kind: &str, decoder: EffectDecoder) {
        if self.decoders.insert(kind.to_string(), decoder).is_some() {
            log::debug!("replaced decoder for effect kind '{kind}'");
        }
    }

    /// Register an effect whose whole state is its serde representation
    pub fn register_serde<E: CellEffect + DeserializeOwned>(&mut self) {
        self.register(E::KIND, |_, saved| {
            let effect: E = saved.decode()?;
            Ok(box_with_sharing(effect, saved.sharing))
        });
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.decoders.contains_key(kind)
    }

    /// Registered kinds, sorted
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.decoders.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Rebuild an effect
    pub fn decode(&self, saved: &SerializedEffect) -> Result<BoxedEffect> {
        let decoder = self
            .decoders
            .get(&saved.kind)
            .ok_or_else(|| Error::UnknownEffect(saved.kind.clone()))?;
        decoder(self, saved)
    }

    /// Rebuild an effect into a fresh handle
    pub fn decode_handle(&self, saved: &SerializedEffect) -> Result<EffectHandle> {
        self.decode(saved).map(EffectHandle::from_boxed)
    }
}

impl fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::effect::{PerCell, Sharing};

    #[test]
    fn test_builtin_kinds() {
        let registry = EffectRegistry::with_builtin();
        assert_eq!(
            registry.kinds(),
            vec!["blink", "blink_glyph", "chain", "concurrent", "delay", "fade", "recolor"]
        );
    }

    #[test]
    fn test_unknown_kind() {
        let registry = EffectRegistry::new();
        let saved = SerializedEffect {
            kind: "sparkle".to_string(),
            sharing: Sharing::Shared,
            state: serde_json::Value::Null,
        };
        assert!(matches!(
            registry.decode(&saved),
            Err(Error::UnknownEffect(kind)) if kind == "sparkle"
        ));
    }

    #[test]
    fn test_decode_keeps_sharing() {
        let registry = EffectRegistry::with_builtin();
        let saved = CellEffect::save(&PerCell(Fade::new().with_foreground(Color::RED))).unwrap();
        let handle = registry.decode_handle(&saved).unwrap();
        assert_eq!(handle.kind(), "fade");
        assert_eq!(handle.sharing(), Sharing::PerInstance);
    }

    #[test]
    fn test_decode_null_state_uses_defaults() {
        let registry = EffectRegistry::with_builtin();
        let saved = SerializedEffect {
            kind: "delay".to_string(),
            sharing: Sharing::Shared,
            state: serde_json::Value::Null,
        };
        let handle = registry.decode_handle(&saved).unwrap();
        assert_eq!(handle.kind(), "delay");
    }

    #[test]
    fn test_nested_composites() {
        let registry = EffectRegistry::with_builtin();
        let chain = EffectsChain::new()
            .then(ConcurrentEffect::new().with(Delay::new(1.0)).with(Blink::new()))
            .then(Recolor::new(None, Some(Color::BLUE)));
        let saved = CellEffect::save(&chain).unwrap();
        let decoded = registry.decode(&saved).unwrap();
        let resaved = decoded.save().unwrap();
        assert_eq!(resaved, saved);
    }
}
