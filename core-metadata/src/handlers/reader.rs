//! Request body reader
//!
//! Decodes a request body holding either one JSON object or an array of
//! objects into typed items, then validates each item. Any failure rejects
//! the whole body with a `ParsingError`; nothing is partially read.

use serde::de::DeserializeOwned;
use validator::Validate;

use super::error::ApiError;

/// Decode and validate a one-or-many request body.
///
/// An empty (or all-whitespace) body yields no items. Item order follows
/// the body.
pub fn read_batch<T>(body: &[u8]) -> Result<Vec<T>, ApiError>
where
    T: DeserializeOwned + Validate,
{
    let items: Vec<T> = match body.iter().find(|byte| !byte.is_ascii_whitespace()) {
        None => return Ok(Vec::new()),
        Some(b'[') => serde_json::from_slice(body).map_err(decode_error)?,
        Some(b'{') => vec![serde_json::from_slice(body).map_err(decode_error)?],
        Some(_) => {
            return Err(ApiError::parsing(
                "request body must be a JSON object or an array of objects",
            ))
        }
    };

    for (index, item) in items.iter().enumerate() {
        item.validate().map_err(|errors| {
            ApiError::parsing(format!("item {index} failed validation: {errors}"))
                .with_debug_detail(format!("{errors:?}"))
        })?;
    }

    Ok(items)
}

fn decode_error(err: serde_json::Error) -> ApiError {
    ApiError::parsing(format!("failed to decode request body: {err}")).with_debug_detail(format!(
        "{:?} error at line {} column {}",
        err.classify(),
        err.line(),
        err.column()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::ApiErrorKind;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    #[serde(rename_all = "camelCase")]
    struct Item {
        #[serde(default)]
        request_id: String,
        #[validate(length(min = 1))]
        name: String,
    }

    #[test]
    fn test_single_object() {
        let items: Vec<Item> = read_batch(br#"{"requestId":"r1","name":"svc1"}"#).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].request_id, "r1");
    }

    #[test]
    fn test_array_preserves_order() {
        let items: Vec<Item> =
            read_batch(br#" [{"name":"a"},{"name":"b"},{"name":"c"}]"#).unwrap();
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn test_empty_body_is_no_items() {
        assert!(read_batch::<Item>(b"").unwrap().is_empty());
        assert!(read_batch::<Item>(b"  \n").unwrap().is_empty());
        assert!(read_batch::<Item>(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_json() {
        let err = read_batch::<Item>(br#"[{"name":"a"},"#).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::ParsingError);
        assert!(err.debug_detail.is_some());
    }

    #[test]
    fn test_wrong_shape() {
        let err = read_batch::<Item>(b"42").unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::ParsingError);
    }

    #[test]
    fn test_missing_required_field() {
        let err = read_batch::<Item>(br#"{"requestId":"r1"}"#).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::ParsingError);
        assert!(err.message.contains("name"));
    }

    #[test]
    fn test_validation_failure_rejects_whole_batch() {
        let err = read_batch::<Item>(br#"[{"name":"ok"},{"name":""}]"#).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::ParsingError);
        assert!(err.message.starts_with("item 1 failed validation"));
    }
}
