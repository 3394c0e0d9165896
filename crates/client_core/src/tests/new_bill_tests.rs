use super::*;
use crate::{
    attachment::ExtensionMatch,
    session::StaticSession,
    store::InMemoryBillStore,
    test_support::{employee_session, RecordingNavigator, ScriptedStore, EMPLOYEE_EMAIL},
};

fn controller_with(
    store: Option<Arc<dyn RemoteBillStore>>,
) -> (NewBillController, Arc<RecordingNavigator>) {
    let navigator = Arc::new(RecordingNavigator::default());
    let controller = NewBillController::new(employee_session(), store, navigator.clone());
    (controller, navigator)
}

fn jpg(name: &str) -> SelectedFile {
    SelectedFile {
        path: format!("C:\\fakepath\\{name}"),
        bytes: b"image_test_unitaire.jpg".to_vec(),
        mime_type: Some("image/jpeg".into()),
    }
}

fn filled_form() -> NewBillForm {
    NewBillForm {
        expense_type: "Hôtel et logement".into(),
        name: "encore".into(),
        amount: "400".into(),
        date: "2004-04-04".into(),
        vat: "80".into(),
        pct: "20".into(),
        commentary: "séminaire billed".into(),
    }
}

#[tokio::test]
async fn valid_receipt_is_uploaded_and_cached() {
    let store = Arc::new(ScriptedStore::ok());
    let (controller, _) = controller_with(Some(store.clone()));
    let mut events = controller.subscribe_events();

    let outcome = controller
        .on_attachment_selected(jpg("image_test_unitaire.jpg"))
        .await
        .expect("session");
    assert!(outcome.rejection.is_none());
    let created = outcome
        .upload
        .expect("upload started")
        .await
        .expect("join")
        .expect("upload ok");

    assert_eq!(created, store.created());
    assert_eq!(
        controller.attachment().await,
        AttachmentState {
            file_url: Some(created.file_url.clone()),
            file_name: Some("image_test_unitaire.jpg".into()),
            bill_id: Some(created.key.clone()),
        }
    );
    assert!(!controller.format_error_visible().await);
    assert_eq!(
        controller.selected_file().await.as_deref(),
        Some("image_test_unitaire.jpg")
    );

    let uploads = store.creates();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].email, EMPLOYEE_EMAIL);
    assert_eq!(uploads[0].file_name, "image_test_unitaire.jpg");

    assert!(matches!(
        events.try_recv(),
        Ok(BillEvent::AttachmentUploaded { .. })
    ));
}

#[tokio::test]
async fn rejected_receipt_shows_error_and_skips_upload() {
    let store = Arc::new(ScriptedStore::ok());
    let (controller, _) = controller_with(Some(store.clone()));
    let mut events = controller.subscribe_events();

    let outcome = controller
        .on_attachment_selected(SelectedFile {
            path: "image.txt".into(),
            bytes: b"image.txt".to_vec(),
            mime_type: Some("image/txt".into()),
        })
        .await
        .expect("session");

    assert!(outcome.upload.is_none());
    assert_eq!(
        outcome.rejection,
        Some(ValidationError::UnsupportedExtension {
            file_name: "image.txt".into(),
            extension: "txt".into(),
        })
    );
    assert!(controller.format_error_visible().await);
    assert_eq!(controller.selected_file().await, None);
    assert!(store.creates().is_empty());
    assert!(matches!(
        events.try_recv(),
        Ok(BillEvent::AttachmentRejected(_))
    ));
}

#[tokio::test]
async fn always_upload_policy_uploads_rejected_receipt() {
    let store = Arc::new(ScriptedStore::ok());
    let (controller, _) = controller_with(Some(store.clone()));
    let controller = controller.with_upload_policy(UploadPolicy::AlwaysUpload);

    let outcome = controller
        .on_attachment_selected(SelectedFile {
            path: "image.txt".into(),
            bytes: Vec::new(),
            mime_type: None,
        })
        .await
        .expect("session");

    assert!(outcome.rejection.is_some());
    outcome
        .upload
        .expect("upload started anyway")
        .await
        .expect("join")
        .expect("upload ok");
    assert!(controller.format_error_visible().await);
    assert_eq!(store.creates().len(), 1);
    assert_eq!(
        controller.attachment().await.file_name.as_deref(),
        Some("image.txt")
    );
}

#[tokio::test]
async fn case_sensitive_validator_rejects_upper_case_extension() {
    let store = Arc::new(ScriptedStore::ok());
    let (controller, _) = controller_with(Some(store.clone()));
    let controller =
        controller.with_validator(AttachmentValidator::new(ExtensionMatch::CaseSensitive));

    let outcome = controller
        .on_attachment_selected(jpg("SCAN.JPG"))
        .await
        .expect("session");
    assert!(outcome.rejection.is_some());
    assert!(store.creates().is_empty());
}

#[tokio::test]
async fn failed_upload_leaves_attachment_empty() {
    let store = Arc::new(ScriptedStore::ok().failing_create("Erreur 500"));
    let (controller, _) = controller_with(Some(store.clone()));
    let mut events = controller.subscribe_events();

    let err = controller
        .on_attachment_selected(jpg("r.png"))
        .await
        .expect("session")
        .upload
        .expect("upload started")
        .await
        .expect("join")
        .expect_err("upload fails");

    assert!(matches!(err, PersistenceError::Upload(ref message) if message.contains("500")));
    assert_eq!(controller.attachment().await, AttachmentState::default());
    assert!(matches!(
        events.try_recv(),
        Ok(BillEvent::PersistenceFailed(PersistenceError::Upload(_)))
    ));

    let outcome = controller.on_submit(&filled_form()).await.expect("submit");
    assert_eq!(outcome.draft.file_url, None);
    assert_eq!(outcome.draft.file_name, None);
}

#[tokio::test]
async fn submit_after_upload_carries_uploaded_reference() {
    let store = Arc::new(ScriptedStore::ok());
    let (controller, navigator) = controller_with(Some(store.clone()));

    controller
        .on_attachment_selected(jpg("facture.jpg"))
        .await
        .expect("session")
        .upload
        .expect("upload started")
        .await
        .expect("join")
        .expect("upload ok");

    let outcome = controller.on_submit(&filled_form()).await.expect("submit");
    let created = store.created();
    assert_eq!(outcome.draft.file_url.as_deref(), Some(created.file_url.as_str()));
    assert_eq!(outcome.draft.file_name.as_deref(), Some("facture.jpg"));
    assert_eq!(outcome.draft.email, EMPLOYEE_EMAIL);
    assert_eq!(outcome.draft.amount, Some(400));
    assert_eq!(outcome.draft.status, BillStatus::Pending);

    let saved = outcome
        .persistence
        .expect("store configured")
        .await
        .expect("join")
        .expect("update ok");
    assert_eq!(saved.id, Some(created.key.clone()));

    let updates = store.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].selector, Some(created.key));
    let sent: Bill = serde_json::from_str(&updates[0].data).expect("draft json");
    assert_eq!(sent, outcome.draft);

    // Immediate navigation, then again once the store confirmed.
    assert_eq!(navigator.routes(), vec![Route::Bills, Route::Bills]);
}

#[tokio::test]
async fn submit_without_store_navigates_once() {
    let (controller, navigator) = controller_with(None);

    let outcome = controller
        .on_submit(&NewBillForm::default())
        .await
        .expect("submit");

    assert!(outcome.persistence.is_none());
    assert_eq!(outcome.draft.pct, DEFAULT_PCT);
    assert_eq!(outcome.draft.amount, None);
    assert_eq!(navigator.routes(), vec![Route::Bills]);
}

#[test]
fn pct_falls_back_to_default_on_empty_zero_or_garbage() {
    let state = AttachmentState::default();
    for raw in ["", "0", "abc", "  "] {
        let form = NewBillForm {
            pct: raw.into(),
            ..NewBillForm::default()
        };
        assert_eq!(form.to_draft("a@a", &state).pct, DEFAULT_PCT, "pct {raw:?}");
    }

    let form = NewBillForm {
        pct: "12".into(),
        amount: "31.9".into(),
        ..NewBillForm::default()
    };
    let draft = form.to_draft("a@a", &state);
    assert_eq!(draft.pct, 12);
    assert_eq!(draft.amount, Some(31));
}

#[tokio::test]
async fn update_failure_is_reported_without_second_navigation() {
    for code in ["404", "500"] {
        let store = Arc::new(ScriptedStore::ok().failing_update(code));
        let (controller, navigator) = controller_with(Some(store.clone()));
        let mut events = controller.subscribe_events();

        let outcome = controller.on_submit(&filled_form()).await.expect("submit");
        let err = outcome
            .persistence
            .expect("store configured")
            .await
            .expect("join")
            .expect_err("update fails");

        assert_eq!(err, PersistenceError::Update(format!("transport failure: {code}")));
        assert!(matches!(
            events.try_recv(),
            Ok(BillEvent::PersistenceFailed(PersistenceError::Update(_)))
        ));
        assert_eq!(navigator.routes(), vec![Route::Bills]);
        assert_eq!(store.updates()[0].selector, None);
    }
}

#[tokio::test]
async fn submit_racing_a_pending_upload_sends_empty_attachment() {
    let (store, gate) = ScriptedStore::ok().gated_create();
    let store = Arc::new(store);
    let (controller, _) = controller_with(Some(store.clone()));

    let upload = controller
        .on_attachment_selected(jpg("late.jpg"))
        .await
        .expect("session")
        .upload
        .expect("upload started");

    let outcome = controller.on_submit(&filled_form()).await.expect("submit");
    assert_eq!(outcome.draft.file_url, None);
    assert_eq!(outcome.draft.file_name, None);

    gate.notify_one();
    upload.await.expect("join").expect("upload ok");
    assert_eq!(
        controller.attachment().await.file_name.as_deref(),
        Some("late.jpg")
    );
}

#[tokio::test]
async fn double_submit_issues_two_updates() {
    let store = Arc::new(ScriptedStore::ok());
    let (controller, _) = controller_with(Some(store.clone()));

    let first = controller.on_submit(&filled_form()).await.expect("submit");
    let second = controller.on_submit(&filled_form()).await.expect("submit");
    for outcome in [first, second] {
        let _ = outcome.persistence.expect("store configured").await;
    }
    assert_eq!(store.updates().len(), 2);
}

#[tokio::test]
async fn missing_session_blocks_submit_and_navigation() {
    let navigator = Arc::new(RecordingNavigator::default());
    let controller = NewBillController::new(
        Arc::new(StaticSession::signed_out()),
        None,
        navigator.clone(),
    );

    let err = controller
        .on_submit(&filled_form())
        .await
        .expect_err("no session");
    assert_eq!(err, SessionError::Missing);
    assert!(navigator.routes().is_empty());
}

#[tokio::test]
async fn created_then_updated_bill_lists_unchanged() {
    let store = Arc::new(InMemoryBillStore::new("https://files.test"));
    let (controller, _) = controller_with(Some(store.clone()));

    controller
        .on_attachment_selected(jpg("hotel.png"))
        .await
        .expect("session")
        .upload
        .expect("upload started")
        .await
        .expect("join")
        .expect("upload ok");
    let outcome = controller.on_submit(&filled_form()).await.expect("submit");
    outcome
        .persistence
        .expect("store configured")
        .await
        .expect("join")
        .expect("update ok");

    let listed = store.list().await.expect("list");
    assert_eq!(listed.len(), 1);
    let mut expected = outcome.draft.clone();
    expected.id = controller.attachment().await.bill_id;
    assert_eq!(listed[0], expected);
    assert_eq!(listed[0].status, BillStatus::Pending);
}
