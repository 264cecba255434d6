use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::AppError;

/// 获取当前 UTC 时间戳（秒）
pub fn now_secs() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

/// Merge `patch` into `target` in place.
///
/// Objects merge key by key (recursively), `null` in the patch leaves the
/// target untouched, anything else replaces the target value.
pub fn merge_json(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                if value.is_null() {
                    continue;
                }
                match target.get_mut(key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (_, Value::Null) => {}
        (target, patch) => *target = patch.clone(),
    }
}

/// Apply a partial update payload to a record through their JSON shapes
pub fn merge_record<T, U>(record: &T, patch: &U) -> Result<T, AppError>
where
    T: Serialize + DeserializeOwned,
    U: Serialize,
{
    let mut value = serde_json::to_value(record)
        .map_err(|e| AppError::invalid_response(format!("Cannot encode record: {e}")))?;
    let patch = serde_json::to_value(patch)
        .map_err(|e| AppError::validation(format!("Cannot encode update: {e}")))?;
    merge_json(&mut value, &patch);
    serde_json::from_value(value)
        .map_err(|e| AppError::validation(format!("Update produces an invalid record: {e}")))
}
