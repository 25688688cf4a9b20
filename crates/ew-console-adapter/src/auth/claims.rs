/*
[INPUT]:  Subject uid plus a claim key/value
[OUTPUT]: The custom principal claims stored on the identity provider user
[POS]:    Auth layer - custom claim administration abstraction
[UPDATE]: When claim merge rules change
*/

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::http::Result;

/// Value that removes every custom claim from a user
pub const CLEAR_CLAIMS: &str = "CLEAR";

/// Read and write custom principal claims on identity provider users
#[async_trait]
pub trait ClaimsAdmin: Send + Sync {
    /// Current claims of `uid`, `{}` when none are set
    async fn get_custom_claims(&self, uid: &str) -> Result<Value>;

    /// Merge `{claim_key: claim_value}` into the claims of `uid` and return the result
    ///
    /// A value of [`CLEAR_CLAIMS`] removes every custom claim instead.
    async fn set_custom_claim(&self, uid: &str, claim_key: &str, claim_value: &str) -> Result<Value>;
}

/// Apply one claim update to `current`
pub fn merge_claim(current: Value, claim_key: &str, claim_value: &str) -> Value {
    if claim_value == CLEAR_CLAIMS {
        return Value::Object(Map::new());
    }
    let mut claims = match current {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    claims.insert(claim_key.to_string(), Value::String(claim_value.to_string()));
    Value::Object(claims)
}

/// In-memory claims store for testing
#[derive(Debug, Default)]
pub struct MockClaimsAdmin {
    users: Mutex<HashMap<String, Value>>,
}

impl MockClaimsAdmin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claims_of(&self, uid: &str) -> Option<Value> {
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(uid)
            .cloned()
    }
}

#[async_trait]
impl ClaimsAdmin for MockClaimsAdmin {
    async fn get_custom_claims(&self, uid: &str) -> Result<Value> {
        Ok(self
            .claims_of(uid)
            .unwrap_or_else(|| Value::Object(Map::new())))
    }

    async fn set_custom_claim(&self, uid: &str, claim_key: &str, claim_value: &str) -> Result<Value> {
        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        let current = users.remove(uid).unwrap_or(Value::Null);
        let updated = merge_claim(current, claim_key, claim_value);
        users.insert(uid.to_string(), updated.clone());
        Ok(updated)
    }
}
