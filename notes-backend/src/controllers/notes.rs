//! Notes REST API.
//!
//! Every handler resolves the caller first and passes that id to the note
//! store; the owner named in a request body is never trusted.

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use uuid::Uuid;

use crate::events::{self, EventType, NoteEvent};
use crate::identity::resolve_caller;
use crate::models::Note;
use crate::notes::NoteStoreError;
use crate::AppState;

fn parse_note_id(raw: &str) -> Result<Uuid, HttpResponse> {
    Uuid::parse_str(raw).map_err(|_| {
        HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!("Invalid note id: {}", raw)
        }))
    })
}

fn not_found(note_id: Uuid) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({
        "error": format!("Note {} not found", note_id)
    }))
}

fn error_response(e: NoteStoreError) -> HttpResponse {
    match e {
        NoteStoreError::NotFound(note_id) => not_found(note_id),
        NoteStoreError::Validation(msg) => HttpResponse::BadRequest().json(serde_json::json!({
            "error": msg
        })),
        NoteStoreError::Store(_) | NoteStoreError::Format { .. } => {
            log::error!("[NOTES] Request failed: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}

/// List the caller's notes, newest first
async fn list_notes(data: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let caller = match resolve_caller(&data, &req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match data.notes.list(caller.user_id()).await {
        Ok(summaries) => HttpResponse::Ok().json(summaries),
        Err(e) => error_response(e),
    }
}

async fn get_note(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    let caller = match resolve_caller(&data, &req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let note_id = match parse_note_id(&path) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match data.notes.get(caller.user_id(), note_id).await {
        Ok(Some(note)) => {
            events::dispatch(
                &data.publisher,
                NoteEvent::new(EventType::NoteViewed, caller.user_id(), note_id),
            );
            HttpResponse::Ok().json(note)
        }
        Ok(None) => not_found(note_id),
        Err(e) => error_response(e),
    }
}

/// Create (no `noteId`) or edit (existing `noteId`) a note
async fn edit_note(
    data: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<Note>,
) -> impl Responder {
    let caller = match resolve_caller(&data, &req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match data.notes.save(caller.user_id(), body.into_inner()).await {
        Ok(saved) => {
            log::info!(
                "[NOTES] {} for user \"{}\"",
                saved.event_type,
                caller.user_id()
            );
            HttpResponse::Ok().json(serde_json::json!({
                "noteId": saved.note.note_id
            }))
        }
        Err(e) => error_response(e),
    }
}

async fn delete_note(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    let caller = match resolve_caller(&data, &req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let note_id = match parse_note_id(&path) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match data.notes.delete(caller.user_id(), note_id).await {
        Ok(true) => HttpResponse::Ok().json(serde_json::json!({
            "noteId": note_id
        })),
        Ok(false) => not_found(note_id),
        Err(e) => error_response(e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/notes")
            .route("", web::get().to(list_notes))
            .route("/edit", web::post().to(edit_note))
            .route("/{id}", web::get().to(get_note))
            .route("/{id}", web::delete().to(delete_note)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::USER_ID_HEADER;
    use crate::models::NoteSummary;
    use crate::test_support::{app_state, app_state_with_events};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};

    macro_rules! notes_app {
        ($state:expr) => {
            test::init_service(App::new().app_data($state.clone()).configure(config)).await
        };
    }

    fn create_request(user_id: &str, body: serde_json::Value) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/notes/edit")
            .insert_header((USER_ID_HEADER, user_id))
            .set_json(body)
    }

    #[actix_web::test]
    async fn test_create_get_list_delete() {
        let (state, mut log) = app_state_with_events(None);
        let app = notes_app!(state);

        let req = create_request("alice", serde_json::json!({"title": "Groceries", "content": "milk"}));
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        let id: Uuid = serde_json::from_value(body["noteId"].clone()).unwrap();
        assert_eq!(log.next().await.event_type, EventType::NoteCreated);

        let req = test::TestRequest::get()
            .uri(&format!("/notes/{}", id))
            .insert_header((USER_ID_HEADER, "alice"))
            .to_request();
        let note: Note = test::call_and_read_body_json(&app, req).await;
        assert_eq!(note.note_id, Some(id));
        assert_eq!(note.user_id, "alice");
        assert_eq!(note.title, "Groceries");
        assert_eq!(note.content, "milk");
        let viewed = log.next().await;
        assert_eq!(viewed.event_type, EventType::NoteViewed);
        assert_eq!(viewed.note_id, id);

        let req = test::TestRequest::get()
            .uri("/notes")
            .insert_header((USER_ID_HEADER, "alice"))
            .to_request();
        let list: Vec<NoteSummary> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].note_id, id);

        let req = test::TestRequest::delete()
            .uri(&format!("/notes/{}", id))
            .insert_header((USER_ID_HEADER, "alice"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(log.next().await.event_type, EventType::NoteDeleted);

        let req = test::TestRequest::get()
            .uri("/notes")
            .insert_header((USER_ID_HEADER, "alice"))
            .to_request();
        let list: Vec<NoteSummary> = test::call_and_read_body_json(&app, req).await;
        assert!(list.is_empty());
    }

    #[actix_web::test]
    async fn test_edit_existing_note() {
        let (state, mut log) = app_state_with_events(None);
        let app = notes_app!(state);

        let req = create_request("alice", serde_json::json!({"title": "Draft", "content": "v1"}));
        let body: serde_json::Value = test::call_and_read_body_json(&app, req.to_request()).await;
        let id: Uuid = serde_json::from_value(body["noteId"].clone()).unwrap();
        assert_eq!(log.next().await.event_type, EventType::NoteCreated);

        let req = test::TestRequest::get()
            .uri(&format!("/notes/{}", id))
            .insert_header((USER_ID_HEADER, "alice"))
            .to_request();
        let original: Note = test::call_and_read_body_json(&app, req).await;
        assert_eq!(log.next().await.event_type, EventType::NoteViewed);

        let req = create_request(
            "alice",
            serde_json::json!({
                "noteId": id,
                "title": "Final",
                "content": "v2",
                "createdAt": "2001-01-01T00:00:00Z"
            }),
        );
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["noteId"], id.to_string());
        assert_eq!(log.next().await.event_type, EventType::NoteEdited);

        let req = test::TestRequest::get()
            .uri(&format!("/notes/{}", id))
            .insert_header((USER_ID_HEADER, "alice"))
            .to_request();
        let edited: Note = test::call_and_read_body_json(&app, req).await;
        assert_eq!(edited.note_id, Some(id));
        assert_eq!(edited.user_id, "alice");
        assert_eq!(edited.title, "Final");
        assert_eq!(edited.content, "v2");
        assert_eq!(edited.created_at, original.created_at);

        let req = test::TestRequest::get()
            .uri("/notes")
            .insert_header((USER_ID_HEADER, "alice"))
            .to_request();
        let list: Vec<NoteSummary> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].title, "Final");
        assert_eq!(list[0].created_at, original.created_at);
    }

    #[actix_web::test]
    async fn test_payload_owner_is_ignored() {
        let state = app_state(None);
        let app = notes_app!(state);

        let req = create_request(
            "alice",
            serde_json::json!({"userId": "mallory", "title": "t", "content": "c"}),
        );
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/notes")
            .insert_header((USER_ID_HEADER, "mallory"))
            .to_request();
        let list: Vec<NoteSummary> = test::call_and_read_body_json(&app, req).await;
        assert!(list.is_empty());
    }

    #[actix_web::test]
    async fn test_missing_note_is_bad_request() {
        let state = app_state(Some("alice"));
        let app = notes_app!(state);
        let id = Uuid::new_v4();

        let req = test::TestRequest::get().uri(&format!("/notes/{}", id)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::delete().uri(&format!("/notes/{}", id)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/notes/edit")
            .set_json(serde_json::json!({"noteId": id, "title": "t", "content": "c"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains(&id.to_string()));
    }

    #[actix_web::test]
    async fn test_malformed_id_is_bad_request() {
        let state = app_state(Some("alice"));
        let app = notes_app!(state);

        let req = test::TestRequest::get().uri("/notes/not-a-uuid").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_invalid_user_is_bad_request() {
        let state = app_state(None);
        let app = notes_app!(state);

        let req = create_request("a/b", serde_json::json!({"title": "t", "content": "c"}));
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_requests_without_identity_are_unauthorized() {
        let state = app_state(None);
        let app = notes_app!(state);

        let req = test::TestRequest::get().uri("/notes").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_users_cannot_read_each_other() {
        let state = app_state(None);
        let app = notes_app!(state);

        let req = create_request("xavier", serde_json::json!({"title": "x", "content": "secret"}));
        let body: serde_json::Value = test::call_and_read_body_json(&app, req.to_request()).await;
        let id = body["noteId"].as_str().unwrap().to_string();

        let req = test::TestRequest::get()
            .uri(&format!("/notes/{}", id))
            .insert_header((USER_ID_HEADER, "yolanda"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
