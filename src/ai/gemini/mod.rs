pub mod client;
pub mod ideas;
pub mod site;
pub mod types;

pub use client::GeminiHttpClient;
pub use ideas::GeminiIdeaClient;
pub use site::GeminiSiteClient;

#[cfg(test)]
pub(crate) mod test_support {
    use wiremock::matchers::{method, path_regex};
    use wiremock::{Mock, MockBuilder, ResponseTemplate};

    pub const GENERATE_CONTENT_PATH_REGEX: &str = r"^/v1beta/models/[^/]+:generateContent$";

    pub fn post_path_regex(regex: &str) -> MockBuilder {
        Mock::given(method("POST")).and(path_regex(regex))
    }

    /// A successful `generateContent` envelope whose only part is `text`.
    pub fn text_response(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": text }]
                }
            }]
        }))
    }

    /// A 200 envelope whose candidate was blocked and carries no content.
    pub fn blocked_response(reason: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{ "finishReason": reason, "index": 0 }]
        }))
    }
}
