use anyhow::Result;
use mockito::Matcher;
use serde_json::json;
use test_utils::jpeg_data_url_fixture;
use test_utils::png_data_url_fixture;
use test_utils::png_fixture;
use test_utils::png_fixture_base64;

use super::Candidate;
use super::ContentParts;
use super::ContentPartsBlob;
use super::Gemini;
use super::GenerateContentResponse;
use super::PromptFeedback;
use super::ResponseContent;
use super::ResponsePart;
use crate::domain::models::Backend;
use crate::domain::models::BackendPrompt;
use crate::domain::models::ImageRef;

impl Gemini {
    fn with_url(url: String) -> Gemini {
        return Gemini {
            url,
            token: "abc".to_string(),
            model: "model-1".to_string(),
            timeout: "200".to_string(),
        };
    }
}

fn image_response(mime_type: &str) -> Result<String> {
    return Ok(serde_json::to_string(&GenerateContentResponse {
        candidates: vec![Candidate {
            content: Some(ResponseContent {
                parts: vec![
                    ResponsePart {
                        text: Some("Here is your robot.".to_string()),
                        inline_data: None,
                    },
                    ResponsePart {
                        text: None,
                        inline_data: Some(ContentPartsBlob {
                            mime_type: mime_type.to_string(),
                            data: png_fixture_base64(),
                        }),
                    },
                ],
            }),
            finish_reason: Some("STOP".to_string()),
        }],
        prompt_feedback: None,
    })?);
}

#[test]
fn it_serializes_content_parts() -> Result<()> {
    let parts = vec![
        ContentParts::InlineData(ContentPartsBlob {
            mime_type: "image/png".to_string(),
            data: "abc=".to_string(),
        }),
        ContentParts::Text("make it neon".to_string()),
    ];

    insta::assert_snapshot!(serde_json::to_string(&parts)?, @r###"[{"inlineData":{"mimeType":"image/png","data":"abc="}},{"text":"make it neon"}]"###);
    return Ok(());
}

#[tokio::test]
async fn it_successfully_health_checks() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/v1beta/models/model-1?key=abc")
        .with_status(200)
        .create();

    let backend = Gemini::with_url(server.url());
    let res = backend.health_check().await;

    assert!(res.is_ok());
    mock.assert();
}

#[tokio::test]
async fn it_successfully_health_checks_with_official_api() {
    let token = match std::env::var("ANYTHINGEDIT_GEMINI_TOKEN") {
        Ok(token) => token,
        Err(_) => {
            println!("There is no token in environment defined, skipping test");
            return;
        }
    };
    let backend = Gemini {
        url: "https://generativelanguage.googleapis.com".to_string(),
        token,
        model: "models/gemini-2.5-flash-image".to_string(),
        timeout: "2000".to_string(),
    };

    let res = backend.health_check().await;
    assert!(res.is_ok());
}

#[tokio::test]
async fn it_fails_health_checks() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/v1beta/models/model-1?key=abc")
        .with_status(500)
        .create();

    let backend = Gemini::with_url(server.url());
    let res = backend.health_check().await;

    assert!(res.is_err());
    mock.assert();
}

#[tokio::test]
async fn it_fails_health_checks_without_token() {
    let mut backend = Gemini::with_url("http://localhost".to_string());
    backend.token = "".to_string();

    let err = backend.health_check().await.unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"Gemini token is not defined");
}

#[tokio::test]
async fn it_generates_images_from_scratch() -> Result<()> {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v1beta/models/model-1:generateContent?key=abc")
        .match_body(Matcher::Json(json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": "a cute futuristic robot in the park" }]
            }],
            "generationConfig": { "responseModalities": ["IMAGE", "TEXT"] }
        })))
        .with_status(200)
        .with_body(image_response("image/png")?)
        .create();

    let backend = Gemini::with_url(server.url());
    let res = backend
        .generate_image(&BackendPrompt::new(
            "a cute futuristic robot in the park",
            None,
        ))
        .await?;

    mock.assert();
    assert_eq!(res, ImageRef::new(&png_data_url_fixture()));

    return Ok(());
}

#[tokio::test]
async fn it_sends_base_image_for_edits() -> Result<()> {
    let base_image = ImageRef::new(&jpeg_data_url_fixture());
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v1beta/models/model-1:generateContent?key=abc")
        .match_body(Matcher::PartialJson(json!({
            "contents": [{
                "role": "user",
                "parts": [
                    {
                        "inlineData": {
                            "mimeType": "image/jpeg",
                            "data": base_image.base64_payload().unwrap()
                        }
                    },
                    { "text": "make the cat wear a tiny hawaiian shirt" }
                ]
            }]
        })))
        .with_status(200)
        .with_body(image_response("image/png")?)
        .create();

    let backend = Gemini::with_url(server.url());
    let res = backend
        .generate_image(&BackendPrompt::new(
            "make the cat wear a tiny hawaiian shirt",
            Some(base_image.clone()),
        ))
        .await?;

    mock.assert();
    assert_eq!(res.declared_mime_type(), Some("image/png"));

    return Ok(());
}

#[tokio::test]
async fn it_downloads_addressable_base_images() -> Result<()> {
    let mut server = mockito::Server::new();
    let image_mock = server
        .mock("GET", "/cat.png")
        .with_status(200)
        .with_body(png_fixture())
        .create();
    let mock = server
        .mock("POST", "/v1beta/models/model-1:generateContent?key=abc")
        .match_body(Matcher::PartialJson(json!({
            "contents": [{
                "parts": [
                    {
                        "inlineData": {
                            "mimeType": "image/png",
                            "data": png_fixture_base64()
                        }
                    },
                    { "text": "make it neon style" }
                ]
            }]
        })))
        .with_status(200)
        .with_body(image_response("image/png")?)
        .create();

    let backend = Gemini::with_url(server.url());
    let base_image = ImageRef::new(&format!("{}/cat.png", server.url()));
    backend
        .generate_image(&BackendPrompt::new("make it neon style", Some(base_image)))
        .await?;

    image_mock.assert();
    mock.assert();

    return Ok(());
}

#[tokio::test]
async fn it_reports_api_error_messages() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v1beta/models/model-1:generateContent?key=abc")
        .with_status(429)
        .with_body(r#"{"error":{"code":429,"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED"}}"#)
        .create();

    let backend = Gemini::with_url(server.url());
    let err = backend
        .generate_image(&BackendPrompt::new("a cute robot", None))
        .await
        .unwrap_err();

    mock.assert();
    insta::assert_snapshot!(err.to_string(), @"Gemini request failed, 429: Resource has been exhausted");
}

#[tokio::test]
async fn it_reports_status_without_api_error() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v1beta/models/model-1:generateContent?key=abc")
        .with_status(503)
        .with_body("upstream unavailable")
        .create();

    let backend = Gemini::with_url(server.url());
    let err = backend
        .generate_image(&BackendPrompt::new("a cute robot", None))
        .await
        .unwrap_err();

    mock.assert();
    insta::assert_snapshot!(err.to_string(), @"Gemini request failed, 503");
}

#[test]
fn it_fails_on_blocked_prompts() {
    let res = GenerateContentResponse {
        candidates: vec![],
        prompt_feedback: Some(PromptFeedback {
            block_reason: Some("SAFETY".to_string()),
            block_reason_message: None,
        }),
    };

    let err = res.into_image().unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"Prompt blocked: SAFETY");
}

#[test]
fn it_fails_on_safety_finish_reasons() {
    let res = GenerateContentResponse {
        candidates: vec![Candidate {
            content: None,
            finish_reason: Some("IMAGE_SAFETY".to_string()),
        }],
        prompt_feedback: None,
    };

    let err = res.into_image().unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"Content blocked by Gemini safety filter: IMAGE_SAFETY");
}

#[test]
fn it_fails_without_candidates() {
    let err = GenerateContentResponse::default().into_image().unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"Gemini returned no candidates");
}

#[test]
fn it_includes_model_text_when_no_image_is_returned() {
    let res = GenerateContentResponse {
        candidates: vec![Candidate {
            content: Some(ResponseContent {
                parts: vec![ResponsePart {
                    text: Some("I can't draw that, sorry.".to_string()),
                    inline_data: None,
                }],
            }),
            finish_reason: Some("STOP".to_string()),
        }],
        prompt_feedback: None,
    };

    let err = res.into_image().unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"Gemini did not return an image: I can't draw that, sorry.");
}

#[test]
fn it_parses_responses_with_unknown_fields() -> Result<()> {
    let body = json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [
                    { "inlineData": { "mimeType": "image/jpeg", "data": "abc=" }, "thoughtSignature": "xyz" }
                ]
            },
            "finishReason": "STOP",
            "index": 0
        }],
        "usageMetadata": { "totalTokenCount": 1290 }
    });

    let res = serde_json::from_value::<GenerateContentResponse>(body)?.into_image()?;
    assert_eq!(res, ImageRef::new("data:image/jpeg;base64,abc="));

    return Ok(());
}
