//! Commands accepted by the daemon.
//!
//! This module defines the vocabulary shared by command sources and the
//! engine: [`Command`] describes every request, [`CycleRequest`] carries an
//! inline cycle and [`TriggerRequest`] names a configured binding.
//!
//! Triggers are usually sent from compositor key bindings, so besides the
//! object form `{"binding": "halves", "modifiers": ["shift"]}` a trigger can
//! be written as a single string, `"halves shift"`: the binding name
//! followed by any held modifiers.

use crate::pipeline::{InvocationContext, Stage};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Cycle `target` through the positions of `spec`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleRequest {
    /// Window selector, also the key of the cycle memory bucket.
    pub target: String,
    /// Grid spec, e.g. `"2x1 0:0, 1:0"`.
    pub spec: String,
    /// Pipeline stages applied to the scaled candidates.
    #[serde(default)]
    pub stages: Vec<Stage>,
    #[serde(flatten)]
    pub context: InvocationContext,
}

/// Run the configured binding named `binding`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerRequest {
    pub binding: String,
    #[serde(flatten)]
    pub context: InvocationContext,
}

impl<'de> Deserialize<'de> for TriggerRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Visitor;
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = TriggerRequest;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "object {{binding, modifiers}} or string \"binding [modifier...]\"")
            }
            fn visit_map<A>(self, mut map: A) -> Result<TriggerRequest, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                let mut binding: Option<String> = None;
                let mut modifiers: Option<Vec<String>> = None;
                while let Some(k) = map.next_key::<String>()? {
                    match k.as_str() {
                        "binding" => binding = Some(map.next_value()?),
                        "modifiers" => modifiers = Some(map.next_value()?),
                        _ => { let _: serde::de::IgnoredAny = map.next_value()?; }
                    }
                }
                Ok(TriggerRequest {
                    binding: binding.ok_or_else(|| DeError::missing_field("binding"))?,
                    context: InvocationContext::with_modifiers(modifiers.unwrap_or_default()),
                })
            }
            fn visit_str<E>(self, s: &str) -> Result<TriggerRequest, E>
            where
                E: DeError,
            {
                let mut parts = s.split_whitespace();
                let binding = parts
                    .next()
                    .ok_or_else(|| DeError::custom("Trigger: expected \"binding [modifier...]\", got an empty string"))?;
                Ok(TriggerRequest {
                    binding: binding.to_string(),
                    context: InvocationContext::with_modifiers(parts),
                })
            }
        }
        deserializer.deserialize_any(V)
    }
}

/// Every request the engine can handle.
///
/// Commands are produced by [`CommandSource`](crate::traits::CommandSource)
/// implementations and consumed by the [`CycleEngine`](crate::engine::CycleEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Cycle a window with an inline spec and pipeline.
    Cycle(CycleRequest),

    /// Cycle using a binding from the config file.
    Trigger(TriggerRequest),

    /// Forget every remembered original.
    ///
    /// On the wire this is encoded as the JSON string `"ResetCycles"`.
    ResetCycles,

    /// Forget the remembered originals of one target identifier.
    ForgetTarget(String),
}

//  Tests
