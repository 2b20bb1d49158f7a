use crate::{
    data::student::{MissingFields, StudentForm},
    error::RosterResult,
    flash::{Flashes, store::FlashStore},
    maud_conveniences::{errors_list, form_submit_button, simple_form_element, title},
    routes::{
        create::{get_create, post_create},
        delete::post_delete,
        edit::{get_edit, post_edit},
        index::get_index_route,
    },
    state::RosterState,
};
use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use maud::{Markup, html};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tower_sessions::{Expiry, SessionManagerLayer, cookie::time::Duration};

pub mod create;
pub mod delete;
pub mod edit;
pub mod index;

const MAX_FORM_BYTES: usize = 16 * 1024;

pub fn router(state: RosterState, sessions: FlashStore) -> Router {
    let session_layer = SessionManagerLayer::new(sessions)
        .with_secure(state.config().secure_cookies())
        .with_expiry(Expiry::OnInactivity(Duration::hours(1)));

    Router::new()
        .route("/", get(get_index_route))
        .route("/create/", get(get_create).post(post_create))
        .route("/{id}/edit/", get(get_edit).post(post_edit))
        .route("/{id}/delete/", post(post_delete))
        .layer(session_layer)
        .layer(RequestBodyLimitLayer::new(MAX_FORM_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn student_form(
    heading: &str,
    action: &str,
    values: &StudentForm,
    missing: MissingFields,
) -> Markup {
    html! {
        div class="bg-gray-800 shadow-md rounded px-8 pt-6 pb-8 mb-4 w-full max-w-md mx-auto" {
            (title(heading))
            @if !missing.is_empty() {
                (errors_list(missing.as_nice_list()))
            }
            form method="post" action=(action) {
                (simple_form_element("firstname", "First Name", true, None, Some(values.firstname.as_str())))
                (simple_form_element("lastname", "Last Name", true, None, Some(values.lastname.as_str())))
                (simple_form_element("email", "Email", true, Some("email"), Some(values.email.as_str())))
                (form_submit_button(Some("Save Student")))
            }
        }
    }
}

/// Renders a rejected form along with whatever flashes explain why.
pub async fn reshow_student_form(
    state: &RosterState,
    flashes: &Flashes,
    status: StatusCode,
    form: Markup,
) -> RosterResult<Response> {
    let pending = flashes.take().await?;
    Ok((status, state.render(&pending, form)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{FreshDatabase, live_state, unique_email, unreachable_state};
    use axum::{
        body::Body,
        http::{
            Request,
            header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        },
    };
    use tower::ServiceExt;

    fn form_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn encode(value: &str) -> String {
        value.replace('@', "%40")
    }

    #[tokio::test]
    async fn list_degrades_to_empty_with_warning() {
        let app = router(unreachable_state(), FlashStore::default());

        let response = app.oneshot(get_request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_text(response).await;
        assert!(body.contains("Database connection could not be established."));
        assert!(body.contains("No students yet."));
    }

    #[tokio::test]
    async fn flash_shown_in_the_same_request_leaves_no_session_behind() {
        let sessions = FlashStore::default();
        let app = router(unreachable_state(), sessions.clone());

        let response = app
            .clone()
            .oneshot(form_request("/create/", "firstname=&lastname=&email="))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.headers().get(SET_COOKIE).is_none());

        let response = app.oneshot(get_request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(SET_COOKIE).is_none());

        assert_eq!(sessions.len().await, 0);
    }

    #[tokio::test]
    async fn create_form_is_shown_without_touching_the_store() {
        let app = router(unreachable_state(), FlashStore::default());

        let response = app.oneshot(get_request("/create/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_text(response).await;
        for field in ["firstname", "lastname", "email"] {
            assert!(body.contains(&format!(r#"name="{field}""#)));
        }
        assert!(body.contains(r#"action="/create/""#));
    }

    #[tokio::test]
    async fn create_with_empty_field_is_rejected_before_any_write() {
        let app = router(unreachable_state(), FlashStore::default());

        let response = app
            .oneshot(form_request(
                "/create/",
                "firstname=Ada&lastname=&email=ada%40x.com",
            ))
            .await
            .unwrap();
        //an attempted write would have been a 503 from the unreachable store
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_text(response).await;
        assert!(body.contains("All fields are required!"));
        assert!(body.contains("Last name is required"));
        assert!(!body.contains("First name is required"));
        assert!(body.contains(r#"value="Ada""#));
        assert!(body.contains(r#"value="ada@x.com""#));
    }

    #[tokio::test]
    async fn absent_fields_count_as_empty() {
        let app = router(unreachable_state(), FlashStore::default());

        let response = app.oneshot(form_request("/create/", "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_text(response).await;
        assert!(body.contains("First name is required"));
        assert!(body.contains("Email is required"));
    }

    #[tokio::test]
    async fn edit_with_empty_field_is_rejected_before_any_write() {
        let app = router(unreachable_state(), FlashStore::default());

        let response = app
            .oneshot(form_request(
                "/7/edit/",
                "firstname=Ada&lastname=Lovelace&email=",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_text(response).await;
        assert!(body.contains("Email is required"));
        assert!(body.contains(r#"action="/7/edit/""#));
    }

    #[tokio::test]
    async fn writes_report_an_unreachable_store() {
        let app = router(unreachable_state(), FlashStore::default());

        for request in [
            form_request("/create/", "firstname=Ada&lastname=Lovelace&email=ada%40x.com"),
            form_request("/7/edit/", "firstname=Ada&lastname=Lovelace&email=ada%40x.com"),
            form_request("/7/delete/", ""),
            get_request("/7/edit/"),
        ] {
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        }
    }

    #[tokio::test]
    async fn delete_only_accepts_post() {
        let app = router(unreachable_state(), FlashStore::default());

        let response = app.oneshot(get_request("/7/delete/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn non_numeric_ids_are_bad_requests() {
        let app = router(unreachable_state(), FlashStore::default());

        let response = app.oneshot(get_request("/ada/edit/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    /// Carries the session cookie between requests so flashes survive redirects.
    struct Browser {
        app: Router,
        cookie: Option<String>,
    }

    impl Browser {
        async fn send(&mut self, mut request: Request<Body>) -> (StatusCode, Option<String>, String) {
            if let Some(cookie) = &self.cookie {
                request
                    .headers_mut()
                    .insert(COOKIE, cookie.parse().unwrap());
            }

            let response = self.app.clone().oneshot(request).await.unwrap();
            if let Some(set_cookie) = response.headers().get(SET_COOKIE) {
                let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
                self.cookie = Some(pair.to_string());
            }

            let status = response.status();
            let location = response
                .headers()
                .get(LOCATION)
                .map(|l| l.to_str().unwrap().to_string());
            (status, location, body_text(response).await)
        }
    }

    #[tokio::test]
    #[ignore = "needs ROSTER_TEST_DATABASE_URL pointing at a PostgreSQL database"]
    async fn lovelace_lifecycle() {
        let Some(state) = live_state().await else {
            return;
        };
        let mut conn = state.get_connection().await.unwrap();
        let highest_before: Option<i32> = sqlx::query_scalar("SELECT MAX(id) FROM public.students")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        let mut browser = Browser {
            app: router(state.clone(), FlashStore::default()),
            cookie: None,
        };

        let first_email = unique_email("ada");
        let (status, location, _) = browser
            .send(form_request(
                "/create/",
                &format!("firstname=Ada&lastname=Lovelace&email={}", encode(&first_email)),
            ))
            .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.as_deref(), Some("/"));

        let (status, _, body) = browser.send(get_request("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Student created successfully!"));
        assert!(body.contains(&first_email));

        let id: i32 = sqlx::query_scalar("SELECT id FROM public.students WHERE email = $1")
            .bind(&first_email)
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert!(highest_before.is_none_or(|highest| id > highest));

        let (_, _, body) = browser.send(get_request("/")).await;
        assert!(!body.contains("Student created successfully!"));

        let (status, _, body) = browser.send(get_request(&format!("/{id}/edit/"))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(&format!(r#"value="{first_email}""#)));

        let second_email = unique_email("ada-moved");
        let (status, location, _) = browser
            .send(form_request(
                &format!("/{id}/edit/"),
                &format!("firstname=Ada&lastname=Lovelace&email={}", encode(&second_email)),
            ))
            .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.as_deref(), Some("/"));

        let (_, _, body) = browser.send(get_request("/")).await;
        assert!(body.contains("Student updated successfully!"));
        assert!(body.contains(&second_email));
        assert!(!body.contains(&first_email));

        let (status, _, body) = browser
            .send(form_request(
                "/create/",
                &format!("firstname=Ada&lastname=Again&email={}", encode(&second_email)),
            ))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.contains("already exists"));
        let holders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM public.students WHERE email = $1")
            .bind(&second_email)
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(holders, 1);

        let grace_email = unique_email("grace");
        let (status, _, _) = browser
            .send(form_request(
                "/create/",
                &format!("firstname=Grace&lastname=Hopper&email={}", encode(&grace_email)),
            ))
            .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        let grace_id: i32 = sqlx::query_scalar("SELECT id FROM public.students WHERE email = $1")
            .bind(&grace_email)
            .fetch_one(&mut *conn)
            .await
            .unwrap();

        let (status, _, body) = browser
            .send(form_request(
                &format!("/{grace_id}/edit/"),
                &format!("firstname=Grace&lastname=Hopper&email={}", encode(&second_email)),
            ))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.contains(&format!("A student with the email {second_email} already exists.")));
        assert!(body.contains(&format!(r#"action="/{grace_id}/edit/""#)));
        assert!(body.contains(r#"value="Grace""#));
        let grace_email_now: String =
            sqlx::query_scalar("SELECT email FROM public.students WHERE id = $1")
                .bind(grace_id)
                .fetch_one(&mut *conn)
                .await
                .unwrap();
        assert_eq!(grace_email_now, grace_email);

        let (status, _, _) = browser
            .send(form_request(&format!("/{grace_id}/delete/"), ""))
            .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        let (_, _, body) = browser.send(get_request("/")).await;
        assert!(body.contains("Grace Hopper&quot; was successfully deleted!"));

        let (status, _, _) = browser
            .send(form_request(&format!("/{id}/edit/"), "firstname=&lastname=&email="))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let (_, _, body) = browser.send(get_request(&format!("/{id}/edit/"))).await;
        assert!(body.contains(r#"value="Lovelace""#));

        let (status, location, _) = browser
            .send(form_request(&format!("/{id}/delete/"), ""))
            .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.as_deref(), Some("/"));

        let (_, _, body) = browser.send(get_request("/")).await;
        assert!(body.contains("Ada Lovelace&quot; was successfully deleted!"));
        assert!(!body.contains(&second_email));

        let (status, _, _) = browser
            .send(form_request(&format!("/{id}/delete/"), ""))
            .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        let (_, _, body) = browser.send(get_request("/")).await;
        assert!(body.contains("nothing was deleted"));

        let (status, _, _) = browser.send(get_request(&format!("/{id}/edit/"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    #[ignore = "needs ROSTER_TEST_DATABASE_URL pointing at a PostgreSQL database"]
    async fn empty_database_is_migrated_on_first_use() {
        let Some(fresh) = FreshDatabase::create().await else {
            return;
        };
        let app = router(fresh.state.clone(), FlashStore::default());

        let response = app.oneshot(get_request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("No students yet."));
        assert!(!body.contains("could not"));

        fresh.tear_down().await;
    }

    #[tokio::test]
    #[ignore = "needs ROSTER_TEST_DATABASE_URL pointing at a PostgreSQL database"]
    async fn failed_list_query_degrades_to_empty_with_warning() {
        let Some(fresh) = FreshDatabase::create().await else {
            return;
        };
        //no students table, so the select fails after connecting
        fresh.skip_preparation();
        let app = router(fresh.state.clone(), FlashStore::default());

        let response = app.oneshot(get_request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("The student list could not be loaded."));
        assert!(body.contains("No students yet."));

        fresh.tear_down().await;
    }
}
