//! Multipart batch envelope codec

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{BatchRequestPart, BatchResultEntry};
use crate::util::BATCH_BOUNDARY;

/// Marker the response parts are split on (any `batch_*` boundary)
const RESPONSE_SPLIT_MARKER: &str = "--batch_";

/// `<response-request-N>` as echoed by the API for request N of a chunk
static RESPONSE_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<response-request-([0-9]+)>").expect("valid regex"));

/// `Content-Type` header value for an outgoing envelope
pub fn multipart_content_type() -> String {
    format!("multipart/mixed; boundary={}", BATCH_BOUNDARY)
}

/// Render one chunk of requests as a `multipart/mixed` body.
///
/// Each part is tagged `Content-ID: <request-N>` with its index in `parts`.
pub fn encode_envelope(parts: &[BatchRequestPart]) -> String {
    let mut envelope = String::from("\n");

    for (index, part) in parts.iter().enumerate() {
        envelope.push_str(&format!(
            "\n--{boundary}\n\
             Content-Type: application/http\n\
             Content-ID: <request-{index}>\n\
             \n\
             {method} {path} HTTP/1.1\n\
             Content-Type: application/json\n\
             \n\
             {body}\n\
             \n",
            boundary = BATCH_BOUNDARY,
            index = index,
            method = part.method,
            path = part.api_path,
            body = part.body,
        ));
    }

    envelope.push_str(&format!("\n--{}--\n", BATCH_BOUNDARY));
    envelope
}

/// Split a multipart response and pair each JSON part with its request.
///
/// Parts without a `<response-request-N>` id, with an index outside `parts`,
/// or whose payload (from the first `{`) is not valid `T` are dropped.
/// Output follows the order the parts appear in `text`.
pub fn decode_envelope<T: DeserializeOwned>(
    text: &str,
    parts: &[BatchRequestPart],
) -> Vec<BatchResultEntry<T>> {
    text.split(RESPONSE_SPLIT_MARKER)
        .filter_map(|candidate| decode_part(candidate, parts))
        .collect()
}

fn decode_part<T: DeserializeOwned>(
    candidate: &str,
    parts: &[BatchRequestPart],
) -> Option<BatchResultEntry<T>> {
    let id = RESPONSE_ID_PATTERN.captures(candidate)?.get(1)?.as_str();

    let Ok(index) = id.parse::<usize>() else {
        debug!(id, "Dropping batch part with unparsable index");
        return None;
    };

    let Some(request) = parts.get(index) else {
        debug!(index, chunk_len = parts.len(), "Dropping batch part with out-of-range index");
        return None;
    };

    let Some(start) = candidate.find('{') else {
        debug!(index, "Dropping batch part without JSON payload");
        return None;
    };

    match serde_json::from_str(&candidate[start..]) {
        Ok(response) => Some(BatchResultEntry {
            request: request.clone(),
            response,
        }),
        Err(e) => {
            debug!(index, error = %e, "Dropping batch part with invalid JSON");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn sample_parts() -> Vec<BatchRequestPart> {
        vec![
            BatchRequestPart::post("/v1/urlInspection/index:inspect", json!({"inspectionUrl": "https://a.test/"})),
            BatchRequestPart::put("/webmasters/v3/sites/x/sitemaps/y", json!({})),
        ]
    }

    fn response_part(boundary: &str, index: usize, json: &str) -> String {
        format!(
            "--{boundary}\r\n\
             Content-Type: application/http\r\n\
             Content-ID: <response-request-{index}>\r\n\
             \r\n\
             HTTP/1.1 200 OK\r\n\
             Content-Type: application/json; charset=UTF-8\r\n\
             \r\n\
             {json}\r\n\r\n"
        )
    }

    #[test]
    fn test_encode_layout() {
        let body = encode_envelope(&sample_parts());

        let expected_first = "\n--batch_boundary\n\
            Content-Type: application/http\n\
            Content-ID: <request-0>\n\
            \n\
            POST /v1/urlInspection/index:inspect HTTP/1.1\n\
            Content-Type: application/json\n\
            \n\
            {\"inspectionUrl\":\"https://a.test/\"}\n";
        assert!(body.contains(expected_first), "envelope was:\n{}", body);
        assert!(body.contains("Content-ID: <request-1>"));
        assert!(body.contains("PUT /webmasters/v3/sites/x/sitemaps/y HTTP/1.1"));
        assert!(body.trim_end().ends_with("--batch_boundary--"));
    }

    #[test]
    fn test_encode_indexes_are_chunk_local() {
        let parts = sample_parts();
        let body = encode_envelope(&parts[1..]);
        assert!(body.contains("Content-ID: <request-0>"));
        assert!(!body.contains("Content-ID: <request-1>"));
    }

    #[test]
    fn test_encode_empty_chunk_is_just_terminator() {
        let body = encode_envelope(&[]);
        assert_eq!(body.trim(), "--batch_boundary--");
    }

    #[test]
    fn test_multipart_content_type() {
        assert_eq!(multipart_content_type(), "multipart/mixed; boundary=batch_boundary");
    }

    #[test]
    fn test_decode_pairs_by_index() {
        let parts = sample_parts();
        let text = format!(
            "{}{}--batch_abc--\r\n",
            response_part("batch_abc", 0, r#"{"id": "zero"}"#),
            response_part("batch_abc", 1, r#"{"id": "one"}"#),
        );

        let entries: Vec<BatchResultEntry<Value>> = decode_envelope(&text, &parts);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].request, parts[0]);
        assert_eq!(entries[0].response["id"], "zero");
        assert_eq!(entries[1].request, parts[1]);
        assert_eq!(entries[1].response["id"], "one");
    }

    #[test]
    fn test_decode_follows_split_order_not_index_order() {
        let parts = sample_parts();
        let text = format!(
            "{}{}",
            response_part("batch_z", 1, r#"{"n": 1}"#),
            response_part("batch_z", 0, r#"{"n": 0}"#),
        );

        let entries: Vec<BatchResultEntry<Value>> = decode_envelope(&text, &parts);

        assert_eq!(entries[0].request, parts[1]);
        assert_eq!(entries[1].request, parts[0]);
    }

    #[test]
    fn test_decode_drops_bad_parts_silently() {
        let parts = vec![
            BatchRequestPart::get("/a"),
            BatchRequestPart::get("/b"),
            BatchRequestPart::get("/c"),
        ];
        let text = format!(
            "{}{}{}",
            "--batch_q\r\nContent-ID: <response-request-x>\r\n\r\n{\"bad\": \"id\"}\r\n",
            response_part("batch_q", 1, r#"{"truncated": "#),
            response_part("batch_q", 2, r#"{"ok": true}"#),
        );

        let entries: Vec<BatchResultEntry<Value>> = decode_envelope(&text, &parts);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].request.api_path, "/c");
        assert_eq!(entries[0].response, json!({"ok": true}));
    }

    #[test]
    fn test_decode_drops_out_of_range_index() {
        let parts = vec![BatchRequestPart::get("/only")];
        let text = response_part("batch_r", 5, r#"{"x": 1}"#);

        let entries: Vec<BatchResultEntry<Value>> = decode_envelope(&text, &parts);
        assert!(entries.is_empty());
    }

    #[test]
    fn test_decode_typed_mismatch_is_dropped() {
        #[derive(serde::Deserialize)]
        struct Typed {
            #[allow(dead_code)]
            count: u32,
        }

        let parts = vec![BatchRequestPart::get("/a"), BatchRequestPart::get("/b")];
        let text = format!(
            "{}{}",
            response_part("batch_t", 0, r#"{"count": 3}"#),
            response_part("batch_t", 1, r#"{"count": "three"}"#),
        );

        let entries: Vec<BatchResultEntry<Typed>> = decode_envelope(&text, &parts);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].request.api_path, "/a");
    }

    #[test]
    fn test_round_trip_through_synthetic_response() {
        let parts: Vec<BatchRequestPart> = (0..25)
            .map(|i| BatchRequestPart::post(format!("/v1/item/{}", i), json!({ "i": i })))
            .collect();

        let request_body = encode_envelope(&parts);

        // Echo every Content-ID back the way the API does
        let response: String = RESPONSE_ID_SOURCE
            .captures_iter(&request_body)
            .map(|c| {
                let index: usize = c[1].parse().unwrap();
                response_part("batch_rt", index, &json!({ "echo": index }).to_string())
            })
            .collect();

        let entries: Vec<BatchResultEntry<Value>> = decode_envelope(&response, &parts);

        assert_eq!(entries.len(), parts.len());
        for (i, entry) in entries.iter().enumerate() {
            assert_eq!(entry.request, parts[i]);
            assert_eq!(entry.response["echo"], i);
        }
    }

    static RESPONSE_ID_SOURCE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"Content-ID: <request-([0-9]+)>").unwrap());
}
