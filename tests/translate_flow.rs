//! Translation flow: language selection, the single result slot and its
//! error-as-text contract.

use crux_core::testing::AppTester;

use emergency_core::capabilities::{CallError, CallKind, HttpMethod, RemoteOperation};
use emergency_core::model::Lang;
use emergency_core::{App, Effect, Event, Model};

fn remote_ops(effects: &[Effect]) -> Vec<&RemoteOperation> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Remote(request) => Some(&request.operation),
            _ => None,
        })
        .collect()
}

#[test]
fn request_carries_the_selected_language_pair() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    app.update(Event::LanguageHelpOpened, &mut model);
    app.update(Event::TargetLangChanged { lang: Lang::Fr }, &mut model);

    let update = app.update(
        Event::TranslateRequested {
            text: "where is the hospital".into(),
        },
        &mut model,
    );

    let ops = remote_ops(&update.effects);
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].kind, CallKind::Translate);
    assert_eq!(ops[0].method, HttpMethod::Post);
    assert!(ops[0].url.ends_with("/api/translate/"));
    assert_eq!(ops[0].timeout_ms, emergency_core::TRANSLATE_TIMEOUT_MS);

    let body: serde_json::Value =
        serde_json::from_slice(ops[0].body.as_deref().unwrap()).unwrap();
    assert_eq!(body["text"], "where is the hospital");
    assert_eq!(body["source_lang"], "en-US");
    assert_eq!(body["target_lang"], "fr");
}

#[test]
fn empty_input_is_rejected_and_keeps_the_previous_result() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    app.update(Event::LanguageHelpOpened, &mut model);
    model.translation.result = Some("bonjour".into());

    let update = app.update(Event::TranslateRequested { text: "  ".into() }, &mut model);

    assert!(remote_ops(&update.effects).is_empty());
    assert_eq!(app.view(&model).translated_text, Some("bonjour".to_string()));
}

#[test]
fn success_replaces_the_result_slot() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    app.update(Event::LanguageHelpOpened, &mut model);
    app.update(Event::TranslateRequested { text: "help".into() }, &mut model);
    assert!(app.view(&model).translate_pending);

    let req = model.translation.req;
    app.update(
        Event::TranslateCompleted {
            req,
            result: Ok(br#"{"translated_text":"ayuda"}"#.to_vec()),
        },
        &mut model,
    );

    let view = app.view(&model);
    assert!(!view.translate_pending);
    assert_eq!(view.translated_text, Some("ayuda".to_string()));
}

#[test]
fn service_error_fills_the_slot_with_prefixed_text() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    app.update(Event::LanguageHelpOpened, &mut model);
    app.update(Event::TranslateRequested { text: "help".into() }, &mut model);

    let req = model.translation.req;
    app.update(
        Event::TranslateCompleted {
            req,
            result: Err(CallError::Service {
                status: 400,
                body: r#"{"error":"unsupported language pair"}"#.into(),
            }),
        },
        &mut model,
    );

    assert_eq!(
        app.view(&model).translated_text,
        Some("Error: unsupported language pair".to_string())
    );
}

#[test]
fn transport_failure_fills_the_slot_with_prefixed_text() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    app.update(Event::LanguageHelpOpened, &mut model);
    app.update(Event::TranslateRequested { text: "help".into() }, &mut model);

    let req = model.translation.req;
    app.update(
        Event::TranslateCompleted {
            req,
            result: Err(CallError::Timeout),
        },
        &mut model,
    );

    let text = app.view(&model).translated_text.unwrap();
    assert!(text.starts_with("Error:"), "{text}");
}

#[test]
fn translating_while_pending_is_rejected() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    app.update(Event::LanguageHelpOpened, &mut model);
    app.update(Event::TranslateRequested { text: "one".into() }, &mut model);

    let update = app.update(Event::TranslateRequested { text: "two".into() }, &mut model);
    assert!(remote_ops(&update.effects).is_empty());
}

#[test]
fn changing_languages_does_not_retranslate() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    app.update(Event::LanguageHelpOpened, &mut model);
    app.update(Event::TranslateRequested { text: "help".into() }, &mut model);
    let req = model.translation.req;
    app.update(
        Event::TranslateCompleted {
            req,
            result: Ok(br#"{"translated_text":"ayuda"}"#.to_vec()),
        },
        &mut model,
    );

    let update = app.update(Event::SourceLangChanged { lang: Lang::De }, &mut model);
    assert!(remote_ops(&update.effects).is_empty());

    let view = app.view(&model);
    assert_eq!(view.source_lang, "de");
    // The stale result stays until the user explicitly retranslates.
    assert_eq!(view.translated_text, Some("ayuda".to_string()));
}

#[test]
fn stale_translate_completion_is_dropped() {
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();
    app.update(Event::LanguageHelpOpened, &mut model);
    app.update(Event::TranslateRequested { text: "help".into() }, &mut model);

    let stale_req = model.translation.req;
    app.update(Event::BackPressed, &mut model);
    app.update(Event::LanguageHelpOpened, &mut model);

    app.update(
        Event::TranslateCompleted {
            req: stale_req,
            result: Ok(br#"{"translated_text":"late"}"#.to_vec()),
        },
        &mut model,
    );

    assert_eq!(app.view(&model).translated_text, None);
}
