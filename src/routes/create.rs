use crate::{
    data::{
        DataType, InsertOutcome,
        student::{MissingFields, Student, StudentForm},
    },
    error::RosterResult,
    flash::{FlashLevel, Flashes},
    routes::{reshow_student_form, student_form},
    state::RosterState,
};
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};

const HEADING: &str = "Add Student";
const ACTION: &str = "/create/";

pub async fn get_create(State(state): State<RosterState>, flashes: Flashes) -> RosterResult<Markup> {
    let flashes = flashes.take().await?;
    Ok(state.render(
        &flashes,
        html! {
            (student_form(HEADING, ACTION, &StudentForm::default(), MissingFields::empty()))
        },
    ))
}

pub async fn post_create(
    State(state): State<RosterState>,
    flashes: Flashes,
    Form(form): Form<StudentForm>,
) -> RosterResult<Response> {
    let missing = form.missing_fields();
    if !missing.is_empty() {
        flashes
            .surface(FlashLevel::Danger, "All fields are required!")
            .await?;
        return reshow_student_form(
            &state,
            &flashes,
            StatusCode::UNPROCESSABLE_ENTITY,
            student_form(HEADING, ACTION, &form, missing),
        )
        .await;
    }

    let outcome = Student::insert_into_database(form.clone(), &mut *state.get_connection().await?).await?;
    match outcome {
        InsertOutcome::Inserted(id) => {
            info!(id, "Created student");
            flashes
                .surface(FlashLevel::Success, "Student created successfully!")
                .await?;
            Ok(Redirect::to("/").into_response())
        }
        InsertOutcome::DuplicateKey => {
            flashes
                .surface(
                    FlashLevel::Danger,
                    format!("A student with the email {} already exists.", form.email),
                )
                .await?;
            reshow_student_form(
                &state,
                &flashes,
                StatusCode::CONFLICT,
                student_form(HEADING, ACTION, &form, MissingFields::empty()),
            )
            .await
        }
    }
}
