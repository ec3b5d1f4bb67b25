//! Conflict Resolver Service
//!
//! Pure domain logic for reconciling two competing region-local writes to
//! the same record under a group's configured strategy.

use crate::domain::ports::ConflictHook;
use crate::domain::value_objects::ConflictStrategy;
use serde_json::Value;

/// The result of resolving one conflict.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// The value that survives
    pub value: Value,
    /// False when an external hook made the decision
    pub automatic: bool,
}

/// Conflict resolution engine.
///
/// Resolution is deterministic: fixed strategy, values, and timestamps always
/// produce the same resolved value. Ties on timestamp go to side A.
pub struct ConflictResolver;

impl ConflictResolver {
    /// Resolve a conflict between value A and value B.
    pub fn resolve(
        strategy: ConflictStrategy,
        value_a: &Value,
        ts_a_ms: u64,
        value_b: &Value,
        ts_b_ms: u64,
        hook: Option<&dyn ConflictHook>,
    ) -> Resolution {
        match strategy {
            ConflictStrategy::LastWriteWins
            | ConflictStrategy::VersionVector
            // Unresolvable strategies still need a deterministic answer when
            // a conflict is reported against them.
            | ConflictStrategy::None => Resolution {
                value: Self::last_write(value_a, ts_a_ms, value_b, ts_b_ms),
                automatic: true,
            },
            ConflictStrategy::FirstWriteWins => {
                let value = if ts_b_ms < ts_a_ms {
                    value_b.clone()
                } else {
                    value_a.clone()
                };
                Resolution {
                    value,
                    automatic: true,
                }
            }
            ConflictStrategy::Crdt => Resolution {
                value: Self::merge(value_a, ts_a_ms, value_b, ts_b_ms),
                automatic: true,
            },
            ConflictStrategy::Custom => match hook {
                Some(hook) => Resolution {
                    value: hook.resolve(value_a, value_b, ts_a_ms, ts_b_ms),
                    automatic: false,
                },
                // No hook installed: behave as last-write-wins.
                None => Resolution {
                    value: Self::last_write(value_a, ts_a_ms, value_b, ts_b_ms),
                    automatic: true,
                },
            },
        }
    }

    fn last_write(value_a: &Value, ts_a_ms: u64, value_b: &Value, ts_b_ms: u64) -> Value {
        if ts_b_ms > ts_a_ms {
            value_b.clone()
        } else {
            value_a.clone()
        }
    }

    /// Shallow-merge two structured values: region B's fields overlaid by
    /// region A's on key collision. Non-object values fall back to
    /// last-write-wins.
    fn merge(value_a: &Value, ts_a_ms: u64, value_b: &Value, ts_b_ms: u64) -> Value {
        match (value_a, value_b) {
            (Value::Object(a), Value::Object(b)) => {
                let mut merged = b.clone();
                for (key, val) in a {
                    merged.insert(key.clone(), val.clone());
                }
                Value::Object(merged)
            }
            _ => Self::last_write(value_a, ts_a_ms, value_b, ts_b_ms),
        }
    }
}
